//! Sub-configuration structs with defaults matching the reference grading profile.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Input discovery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Supported input extensions
    pub supported_formats: Vec<String>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            supported_formats: vec![
                "jpg".to_string(),
                "jpeg".to_string(),
                "png".to_string(),
                "webp".to_string(),
                "bmp".to_string(),
                "tif".to_string(),
                "tiff".to_string(),
            ],
        }
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum file size in megabytes
    pub max_file_size_mb: u64,

    /// Maximum decoded dimension (width or height)
    pub max_image_dimension: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 100,
            max_image_dimension: 20000,
        }
    }
}

/// The full parameter record handed to the pipeline driver.
///
/// Each stage only ever sees its own sub-record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EnhanceParams {
    pub resize: ResizeConfig,
    pub denoise: DenoiseConfig,
    pub smooth: SmoothConfig,
    pub grade: GradeConfig,
    pub sharpen: SharpenConfig,
    pub bloom: BloomConfig,
}

/// Working-resolution bounds. Only the width drives the decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResizeConfig {
    /// Narrower inputs are upscaled to exactly this width
    pub min_width: u32,

    /// Wider inputs are downscaled to exactly this width
    pub max_width: u32,
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self {
            min_width: 1600,
            max_width: 3000,
        }
    }
}

/// Non-local means denoising.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DenoiseConfig {
    /// Filter strength for the lightness channel
    pub h_luma: f32,

    /// Filter strength for the two chroma channels
    pub h_color: f32,

    /// Side of the square patch compared between pixels (odd)
    pub template_window: usize,

    /// Side of the square region searched for similar patches (odd)
    pub search_window: usize,
}

impl Default for DenoiseConfig {
    fn default() -> Self {
        Self {
            h_luma: 5.0,
            h_color: 5.0,
            template_window: 7,
            search_window: 21,
        }
    }
}

/// Edge-preserving "beauty" smoothing and detail blend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothConfig {
    /// Spatial extent of the recursive filter
    pub sigma_s: f32,

    /// Color-similarity range of the recursive filter
    pub sigma_r: f32,

    /// Weight of the unsmoothed input in the final mix
    pub blend_original: f32,

    /// Weight of the smoothed layer in the final mix
    pub blend_smoothed: f32,
}

impl Default for SmoothConfig {
    fn default() -> Self {
        Self {
            sigma_s: 60.0,
            sigma_r: 0.4,
            blend_original: 0.3,
            blend_smoothed: 0.7,
        }
    }
}

/// Lightness lift, contrast fade and warm/cool channel bias.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GradeConfig {
    /// Flat lift added to 8-bit lightness before the contrast map
    pub luma_offset: u8,

    /// Contrast factor around mid-gray (128)
    pub contrast: f32,

    /// Shadow lift added after recentering
    pub contrast_offset: f32,

    /// Saturating offset added to the blue channel
    pub cool_offset: u8,

    /// Saturating offset added to the red channel
    pub warm_offset: u8,
}

impl Default for GradeConfig {
    fn default() -> Self {
        Self {
            luma_offset: 15,
            contrast: 0.9,
            contrast_offset: 10.0,
            cool_offset: 5,
            warm_offset: 8,
        }
    }
}

/// Gradient-gated unsharp mask.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SharpenConfig {
    /// Sobel magnitude above which a pixel counts as texture
    pub edge_threshold: f32,

    /// Side of the binomial kernel that feathers the mask (odd)
    pub mask_blur_kernel: usize,

    /// Gaussian sigma of the unsharp blur
    pub unsharp_sigma: f32,

    /// Weight of the image in the unsharp mix
    pub unsharp_amount: f32,

    /// Weight of the blurred image in the unsharp mix
    pub unsharp_negative: f32,
}

impl Default for SharpenConfig {
    fn default() -> Self {
        Self {
            edge_threshold: 30.0,
            mask_blur_kernel: 5,
            unsharp_sigma: 2.0,
            unsharp_amount: 1.5,
            unsharp_negative: -0.5,
        }
    }
}

/// Named bloom strengths.
///
/// Two defaults exist for the same effect: the pipeline call site uses 0.25
/// while the standalone glow helper defaults to 0.4. Both are kept and
/// selected by name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BloomPreset {
    /// Strength used by the full enhancement pipeline
    #[default]
    Pipeline,
    /// Strength of the standalone glow helper
    Helper,
}

impl BloomPreset {
    pub fn intensity(self) -> f32 {
        match self {
            BloomPreset::Pipeline => 0.25,
            BloomPreset::Helper => 0.4,
        }
    }
}

/// Luminance bloom.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BloomConfig {
    /// Gaussian sigma of the glow layer (both axes)
    pub blur_sigma: f32,

    /// Named strength preset
    pub preset: BloomPreset,

    /// Explicit strength; overrides the preset when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intensity: Option<f32>,
}

impl Default for BloomConfig {
    fn default() -> Self {
        Self {
            blur_sigma: 5.0,
            preset: BloomPreset::Pipeline,
            intensity: None,
        }
    }
}

impl BloomConfig {
    /// A config using `preset` with no explicit override.
    pub fn from_preset(preset: BloomPreset) -> Self {
        Self {
            preset,
            ..Self::default()
        }
    }

    /// Effective glow strength.
    pub fn intensity(&self) -> f32 {
        self.intensity.unwrap_or_else(|| self.preset.intensity())
    }
}

/// Encoding and report settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// JPEG quality (1-100); chroma is never subsampled
    pub jpeg_quality: u8,

    /// Suffix appended to the input stem when no output path is given
    pub suffix: String,

    /// Report format ("json" or "jsonl")
    pub format: String,

    /// Pretty-print JSON reports
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: 98,
            suffix: "_enhanced".to_string(),
            format: "jsonl".to_string(),
            pretty: false,
        }
    }
}

/// Watermark overlay settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatermarkConfig {
    /// Whether the overlay collaborator is invoked at all
    pub enabled: bool,

    /// Text drawn in the bottom-right corner
    pub text: String,

    /// Pre-rendered text coverage image (alpha, or luma when opaque)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mask: Option<PathBuf>,

    /// Text height is `width / font_divisor`
    pub font_divisor: u32,

    /// Right margin as a fraction of width
    pub margin_x: f64,

    /// Bottom margin as a fraction of height
    pub margin_y: f64,

    /// Alpha of the white text fill
    pub fill_alpha: u8,

    /// Alpha of each drop-shadow copy
    pub shadow_alpha: u8,

    /// Number of one-pixel shadow offsets
    pub shadow_depth: u32,
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            text: "Tokyo Quilala".to_string(),
            mask: None,
            font_divisor: 28,
            margin_x: 0.05,
            margin_y: 0.04,
            fill_alpha: 220,
            shadow_alpha: 40,
            shadow_depth: 2,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bloom_presets_are_distinct() {
        assert!((BloomPreset::Pipeline.intensity() - 0.25).abs() < f32::EPSILON);
        assert!((BloomPreset::Helper.intensity() - 0.4).abs() < f32::EPSILON);
    }

    #[test]
    fn test_explicit_intensity_overrides_preset() {
        let mut bloom = BloomConfig::from_preset(BloomPreset::Helper);
        bloom.intensity = Some(0.0);
        assert_eq!(bloom.intensity(), 0.0);
    }

    #[test]
    fn test_smooth_weights_sum_to_one() {
        let smooth = SmoothConfig::default();
        assert_eq!(smooth.blend_original + smooth.blend_smoothed, 1.0);
    }
}
