//! Configuration for the view and the cinematic camera
//!
//! Every value has a tuned default; a TOML file may override any subset.
//!
//! ```toml
//! [view]
//! vision_depth = 60.0
//!
//! [cut]
//! cut_len = 90
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::color::Color;

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from a `.toml` file
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        ensure_toml(path)?;
        let contents = std::fs::read_to_string(path)?;
        let config = toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Save configuration to a `.toml` file
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        ensure_toml(path)?;
        let contents =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}

fn ensure_toml(path: &Path) -> Result<(), ConfigError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => Ok(()),
        _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Values that parse but cannot be used
    #[error("Invalid value: {0}")]
    Invalid(String),
}

/// Lens, lighting and fog settings for [`Camera`](crate::Camera)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Screen scale as a multiple of screen height; smaller is a wider lens
    pub lens_scale: f32,
    /// Brightness floor for any lit surface
    pub ambient_light: f32,
    /// Extra light on downward-facing surfaces
    pub underside_boost: f32,
    /// Distance beyond the focus at which fog is total
    pub vision_depth: f32,
    /// Fog and clear colour
    pub background: Color,
    /// Direction light travels (normalised on use)
    pub light_direction: [f32; 3],
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            lens_scale: 1.1,
            ambient_light: 0.3,
            underside_boost: 0.3,
            vision_depth: 50.0,
            background: Color::WHITE,
            light_direction: [1.0, 1.0, -3.0],
        }
    }
}

/// Timing and framing for [`CameraMan`](crate::CameraMan)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CutConfig {
    /// Steps to glide between viewpoints
    pub cut_len: u32,
    /// Steps spent accelerating, and again decelerating
    pub cut_ramp: u32,
    /// Group-mode cooldown as a multiple of `cut_len`
    pub cooldown_factor: u32,
    /// Eye height in plan view
    pub plan_height: f32,
    /// Plan view looks this far ahead of the subject along Y
    pub plan_y_offset: f32,
    /// Plan view eye X
    pub plan_eye_x: f32,
    /// Terrain tile edge, used for the empty plan overview
    pub tile_width: f32,
}

impl CutConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cut_ramp == 0 {
            return Err(ConfigError::Invalid("cut_ramp must be positive".into()));
        }
        let ramps = self
            .cut_ramp
            .checked_mul(2)
            .ok_or_else(|| ConfigError::Invalid(format!("cut_ramp {} is too large", self.cut_ramp)))?;
        if ramps > self.cut_len {
            return Err(ConfigError::Invalid(format!(
                "cut_len {} is shorter than two ramps of {}",
                self.cut_len, self.cut_ramp
            )));
        }
        Ok(())
    }

    /// Group cooldown in steps, saturating for oversized settings
    pub fn cooldown(&self) -> u32 {
        self.cut_len.saturating_mul(self.cooldown_factor)
    }
}

impl Default for CutConfig {
    fn default() -> Self {
        Self {
            cut_len: 75,
            cut_ramp: 12,
            cooldown_factor: 2,
            plan_height: 20.0,
            plan_y_offset: 4.0,
            plan_eye_x: 10.0,
            tile_width: 20.0,
        }
    }
}

/// Top-level engine settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub view: ViewConfig,
    pub cut: CutConfig,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.view.vision_depth <= 0.0 {
            return Err(ConfigError::Invalid("vision_depth must be positive".into()));
        }
        self.cut.validate()
    }
}

impl Config for EngineConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(EngineConfig::default().validate().is_ok());
        assert_eq!(CutConfig::default().cooldown(), 150);
    }

    #[test]
    fn test_huge_ramp_rejected_without_overflow() {
        let cut = CutConfig {
            cut_ramp: u32::MAX,
            cut_len: u32::MAX,
            ..CutConfig::default()
        };
        assert!(matches!(cut.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_long_cut_cooldown_saturates() {
        let cut = CutConfig {
            cut_len: 3_000_000_000,
            ..CutConfig::default()
        };
        assert!(cut.validate().is_ok());
        assert_eq!(cut.cooldown(), u32::MAX);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: EngineConfig = toml::from_str("[cut]\ncut_len = 90\n").unwrap();
        assert_eq!(config.cut.cut_len, 90);
        assert_eq!(config.cut.cut_ramp, 12);
        assert_eq!(config.view, ViewConfig::default());
    }

    #[test]
    fn test_ramp_longer_than_half_rejected() {
        let cut = CutConfig {
            cut_len: 20,
            cut_ramp: 12,
            ..CutConfig::default()
        };
        assert!(matches!(cut.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_round_trip_file() {
        let dir = std::env::temp_dir().join(format!("soar3d-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("engine.toml");

        let mut config = EngineConfig::default();
        config.view.vision_depth = 75.0;
        config.save_to_file(&path).unwrap();
        let loaded = EngineConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_unsupported_extension() {
        let err = EngineConfig::load_from_file("engine.ron").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
    }
}
