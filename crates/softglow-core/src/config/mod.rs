//! Configuration management for softglow.
//!
//! Configuration is loaded from the platform config directory with sensible
//! defaults. Every struct implements `Default` with the values of the
//! reference grading profile, so an empty file reproduces the stock look.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for softglow.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Input discovery settings
    pub processing: ProcessingConfig,

    /// Resource limits
    pub limits: LimitsConfig,

    /// Per-stage enhancement parameters
    pub enhance: EnhanceParams,

    /// Encoding and report settings
    pub output: OutputConfig,

    /// Watermark overlay settings
    pub watermark: WatermarkConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.softglow.softglow/config.toml
    /// - Linux: ~/.config/softglow/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\softglow\config\config.toml
    ///
    /// Falls back to ~/.softglow/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "softglow", "softglow")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".softglow").join("config.toml")
            })
    }

    /// Resolved watermark mask path (with ~ expansion), if one is configured.
    pub fn mask_path(&self) -> Option<PathBuf> {
        self.watermark.mask.as_ref().map(|mask| {
            let path_str = mask.to_string_lossy();
            PathBuf::from(shellexpand::tilde(&path_str).into_owned())
        })
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.enhance.resize.min_width, 1600);
        assert_eq!(config.enhance.resize.max_width, 3000);
        assert_eq!(config.output.jpeg_quality, 98);
        assert_eq!(config.watermark.text, "Tokyo Quilala");
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[enhance.denoise]"));
        assert!(toml.contains("[enhance.bloom]"));
        assert!(toml.contains("[watermark]"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[enhance.bloom]\npreset = \"helper\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.enhance.bloom.preset, BloomPreset::Helper);
        assert!((config.enhance.bloom.intensity() - 0.4).abs() < f32::EPSILON);
        assert!((config.enhance.smooth.sigma_s - 60.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_load_from_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[enhance.denoise]\nsearch_window = 20\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("search_window"));
    }

    #[test]
    fn test_mask_path_expands_tilde() {
        let mut config = Config::default();
        assert!(config.mask_path().is_none());
        config.watermark.mask = Some(PathBuf::from("~/marks/quilala.png"));
        let resolved = config.mask_path().unwrap();
        assert!(!resolved.to_string_lossy().starts_with('~'));
        assert!(resolved.ends_with("marks/quilala.png"));
    }
}
