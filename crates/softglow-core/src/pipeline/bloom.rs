//! Soft glow: a wide Gaussian blur added back on top of the image.

use rayon::prelude::*;

use crate::config::BloomConfig;
use crate::filter::{gaussian_blur, round_u8};
use crate::types::PixelBuffer;

/// Additive glow.
pub struct Bloom {
    sigma: f32,
    intensity: f32,
}

impl Bloom {
    pub fn new(config: &BloomConfig) -> Self {
        Self {
            sigma: config.blur_sigma,
            intensity: config.intensity(),
        }
    }

    /// Override the glow strength.
    /// Override the strength. Negative or non-finite values disable the glow.
    pub fn with_intensity(mut self, intensity: f32) -> Self {
        self.intensity = if intensity.is_finite() && intensity >= 0.0 {
            intensity
        } else {
            tracing::warn!("Ignoring bloom intensity {}, using 0", intensity);
            0.0
        };
        self
    }

    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    /// `saturate(round(img + intensity * blur(img)))`
    pub fn apply(&self, buf: PixelBuffer) -> PixelBuffer {
        if self.intensity == 0.0 {
            return buf;
        }
        let glow = gaussian_blur(&buf, self.sigma);
        let k = self.intensity;
        let data = buf
            .as_raw()
            .par_iter()
            .zip(glow.as_raw().par_iter())
            .map(|(&o, &g)| round_u8(o as f32 + g as f32 * k))
            .collect();
        buf.with_data(data)
    }
}
