//! The 2D raster target the pipeline draws onto
use crate::color::Color;

/// Font style flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontStyle {
    #[default]
    Plain,
    Bold,
    Italic,
    BoldItalic,
}

/// Font request; surfaces map it to whatever they can render
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Font {
    pub name: String,
    pub style: FontStyle,
    pub size: u32,
}

impl Font {
    pub fn new(name: impl Into<String>, style: FontStyle, size: u32) -> Self {
        Self {
            name: name.into(),
            style,
            size,
        }
    }
}

/// A drawing surface in integer pixel coordinates, origin top-left.
///
/// Calls are stateful in the immediate-mode style: `set_color` and
/// `set_font` affect every draw that follows.
pub trait Surface {
    fn set_color(&mut self, color: Color);

    fn set_font(&mut self, font: &Font);

    fn draw_line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32);

    /// Fill the polygon whose vertices are `(xs[i], ys[i])`
    fn fill_polygon(&mut self, xs: &[i32], ys: &[i32]);

    fn draw_string(&mut self, text: &str, x: i32, y: i32);

    fn fill_circle(&mut self, x: i32, y: i32, diameter: i32);
}
