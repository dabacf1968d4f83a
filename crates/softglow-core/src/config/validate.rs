//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::{Config, EnhanceParams};

fn invalid(msg: &str) -> Result<(), ConfigError> {
    Err(ConfigError::ValidationError(msg.into()))
}

/// Finite and strictly positive. NaN fails every comparison, so it is
/// rejected here too.
fn positive(v: f32) -> bool {
    v.is_finite() && v > 0.0
}

fn non_negative(v: f32) -> bool {
    v.is_finite() && v >= 0.0
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.limits.max_file_size_mb == 0 {
            return invalid("limits.max_file_size_mb must be > 0");
        }
        if self.limits.max_image_dimension == 0 {
            return invalid("limits.max_image_dimension must be > 0");
        }

        self.enhance.validate()?;

        if self.output.jpeg_quality == 0 || self.output.jpeg_quality > 100 {
            return invalid("output.jpeg_quality must be between 1 and 100");
        }
        if self.watermark.font_divisor == 0 {
            return invalid("watermark.font_divisor must be > 0");
        }
        let wm = &self.watermark;
        if !(0.0..1.0).contains(&wm.margin_x) || !(0.0..1.0).contains(&wm.margin_y) {
            return invalid("watermark.margin_x and margin_y must be in [0.0, 1.0)");
        }
        Ok(())
    }
}

impl EnhanceParams {
    /// Range-check every stage knob.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.resize.min_width == 0 || self.resize.min_width > self.resize.max_width {
            return invalid("enhance.resize.min_width must be > 0 and <= max_width");
        }
        if !positive(self.denoise.h_luma) || !positive(self.denoise.h_color) {
            return invalid("enhance.denoise.h_luma and h_color must be > 0");
        }
        if self.denoise.template_window % 2 == 0 {
            return invalid("enhance.denoise.template_window must be odd");
        }
        if self.denoise.search_window % 2 == 0 {
            return invalid("enhance.denoise.search_window must be odd");
        }
        if !positive(self.smooth.sigma_s) || !positive(self.smooth.sigma_r) {
            return invalid("enhance.smooth.sigma_s and sigma_r must be > 0");
        }
        if !(0.0..=1.0).contains(&self.smooth.blend_original)
            || !(0.0..=1.0).contains(&self.smooth.blend_smoothed)
        {
            return invalid("enhance.smooth blend weights must be between 0.0 and 1.0");
        }
        if !non_negative(self.grade.contrast) {
            return invalid("enhance.grade.contrast must be >= 0");
        }
        if self.sharpen.mask_blur_kernel % 2 == 0 {
            return invalid("enhance.sharpen.mask_blur_kernel must be odd");
        }
        if !positive(self.sharpen.unsharp_sigma) {
            return invalid("enhance.sharpen.unsharp_sigma must be > 0");
        }
        if !positive(self.bloom.blur_sigma) {
            return invalid("enhance.bloom.blur_sigma must be > 0");
        }
        if !non_negative(self.bloom.intensity()) {
            return invalid("enhance.bloom.intensity must be >= 0");
        }
        Ok(())
    }
}
