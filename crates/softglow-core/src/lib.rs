//! Softglow Core - deterministic photo enhancement.
//!
//! A fixed, non-interactive look for portrait and product photos: the width
//! is normalized into a working range, the image is denoised, skin-smoothed,
//! graded bright and airy, sharpened only where there is texture, and given a
//! soft glow.
//!
//! # Architecture
//!
//! ```text
//! Decode → Resize → Denoise → Smooth → Grade → Sharpen → Bloom → Overlay → Encode
//! ```
//!
//! Every stage takes an owned [`PixelBuffer`] and returns a new one; the
//! codec and the overlay sit outside the pixel pipeline.
//!
//! # Usage
//!
//! ```rust,ignore
//! use softglow_core::{Config, Enhancer};
//!
//! fn main() -> softglow_core::Result<()> {
//!     let enhancer = Enhancer::new(Config::load()?)?;
//!     let report = enhancer.enhance_file("ring.jpg".as_ref(), "ring_enhanced.jpg".as_ref())?;
//!     println!("{}x{}", report.width, report.height);
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod codec;
pub mod color;
pub mod config;
pub mod error;
pub mod filter;
pub mod output;
pub mod overlay;
pub mod pipeline;
pub mod types;

use std::path::Path;

// Re-exports for convenient access
pub use config::{BloomPreset, Config};
pub use error::{ConfigError, PipelineError, PipelineResult, Result, SoftglowError};
pub use output::{OutputFormat, OutputWriter};
pub use overlay::{LayerOverlay, Overlay, WatermarkOverlay};
pub use pipeline::{ImageProcessor, Pipeline};
pub use types::{ChannelOrder, EnhanceReport, PixelBuffer, StageTimings};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Main entry point: the configured pipeline plus its file-level driver.
pub struct Enhancer {
    config: Config,
    processor: ImageProcessor,
}

impl Enhancer {
    /// Build an enhancer. Rejects out-of-range parameters and loads the
    /// watermark mask when one is configured.
    pub fn new(config: Config) -> Result<Self> {
        tracing::debug!("Initializing softglow v{}", VERSION);
        config.validate()?;
        let mut processor = ImageProcessor::new(&config);

        if config.watermark.enabled {
            match config.mask_path() {
                Some(mask) => {
                    let overlay = WatermarkOverlay::from_path(&mask, config.watermark.clone())?;
                    processor = processor.with_overlay(Box::new(overlay));
                }
                None => tracing::debug!("No watermark mask configured, overlay disabled"),
            }
        }

        Ok(Self { config, processor })
    }

    /// Build an enhancer from the config file at the default location.
    pub fn with_defaults() -> Result<Self> {
        Self::new(Config::load()?)
    }

    /// Replace the overlay chosen from the config.
    pub fn with_overlay(mut self, overlay: Box<dyn Overlay>) -> Self {
        self.processor = self.processor.with_overlay(overlay);
        self
    }

    pub fn with_bloom_intensity(mut self, intensity: f32) -> Self {
        self.processor = self.processor.with_bloom_intensity(intensity);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn processor(&self) -> &ImageProcessor {
        &self.processor
    }

    /// Run the six pixel stages on an in-memory buffer.
    pub fn enhance(&self, buf: PixelBuffer) -> PipelineResult<PixelBuffer> {
        self.processor.pipeline().run(buf).map(|(out, _)| out)
    }

    /// Decode, enhance, overlay and encode one file.
    pub fn enhance_file(&self, input: &Path, output: &Path) -> Result<EnhanceReport> {
        self.processor.process(input, output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_enhancer_without_mask_has_no_overlay() {
        let enhancer = Enhancer::new(Config::default()).unwrap();
        assert!(enhancer.config().watermark.enabled);
        assert_eq!(enhancer.processor().pipeline().bloom_intensity(), 0.25);
    }

    #[test]
    fn test_enhancer_rejects_even_mask_kernel() {
        let mut config = Config::default();
        config.enhance.sharpen.mask_blur_kernel = 4;
        assert!(matches!(
            Enhancer::new(config),
            Err(SoftglowError::Config(ConfigError::ValidationError(_)))
        ));
    }

    #[test]
    fn test_enhancer_rejects_even_template_window() {
        let mut config = Config::default();
        config.enhance.denoise.template_window = 6;
        assert!(Enhancer::new(config).is_err());
    }

    #[test]
    fn test_enhancer_rejects_missing_mask() {
        let mut config = Config::default();
        config.watermark.mask = Some("/nonexistent/mark.png".into());
        assert!(matches!(
            Enhancer::new(config),
            Err(SoftglowError::Pipeline(PipelineError::Overlay { .. }))
        ));
    }
}
