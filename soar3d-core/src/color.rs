//! RGB colours for flat shading
use serde::{Deserialize, Serialize};

/// An 8-bit-per-channel RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::new(255, 255, 255);
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const LIGHT_GRAY: Color = Color::new(192, 192, 192);
    pub const GRAY: Color = Color::new(128, 128, 128);
    pub const RED: Color = Color::new(255, 0, 0);
    pub const PINK: Color = Color::new(255, 175, 175);
    pub const ORANGE: Color = Color::new(255, 200, 0);
    pub const YELLOW: Color = Color::new(255, 255, 0);
    pub const GREEN: Color = Color::new(0, 255, 0);
    pub const MAGENTA: Color = Color::new(255, 0, 255);
    pub const BLUE: Color = Color::new(0, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build a colour from unclamped channel values, saturating into 0..=255
    pub fn from_f32(r: f32, g: f32, b: f32) -> Self {
        Self {
            r: channel(r),
            g: channel(g),
            b: channel(b),
        }
    }

    /// Scale every channel, e.g. by a light intensity
    pub fn mul(self, scale: f32) -> Self {
        Self::from_f32(
            self.r as f32 * scale,
            self.g as f32 * scale,
            self.b as f32 * scale,
        )
    }

    /// Linear interpolation toward `other`; `t = 0` is `self`, `t = 1` is `other`
    pub fn lerp(self, other: Color, t: f32) -> Self {
        let mix = |a: u8, b: u8| a as f32 + t * (b as f32 - a as f32);
        Self::from_f32(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
        )
    }

    /// Perceived brightness in `[0, 1]`
    pub fn luminance(self) -> f32 {
        (0.299 * self.r as f32 + 0.587 * self.g as f32 + 0.114 * self.b as f32) / 255.0
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

fn channel(v: f32) -> u8 {
    // `as` truncates like an int cast; NaN maps to 0
    v.clamp(0.0, 255.0) as u8
}
