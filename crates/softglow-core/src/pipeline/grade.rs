//! Bright, low-contrast color grade with a warm/cool channel bias.
//!
//! Lightness is lifted and faded in L*a*b* so chroma is untouched; the
//! per-channel offsets are applied afterwards in display RGB. Doing the
//! offsets first would brighten twice.

use rayon::prelude::*;

use crate::color::{lab8_to_rgb, rgb_to_lab8};
use crate::config::GradeConfig;
use crate::types::{Channel, PixelBuffer, CHANNELS};

/// Lightness lift/fade followed by channel offsets.
pub struct ColorGrader {
    config: GradeConfig,
    lightness: [u8; 256],
}

impl ColorGrader {
    pub fn new(config: GradeConfig) -> Self {
        let mut lightness = [0u8; 256];
        for (l, out) in lightness.iter_mut().enumerate() {
            *out = grade_lightness(&config, l as u8);
        }
        Self { config, lightness }
    }

    /// Graded 8-bit lightness for an 8-bit input lightness.
    pub fn lightness(&self, l: u8) -> u8 {
        self.lightness[l as usize]
    }

    /// Grade one `[r, g, b]` pixel.
    pub fn grade_rgb(&self, rgb: [u8; 3]) -> [u8; 3] {
        let mut lab = rgb_to_lab8(rgb);
        lab[0] = self.lightness(lab[0]);
        let [r, g, b] = lab8_to_rgb(lab);
        [
            r.saturating_add(self.config.warm_offset),
            g,
            b.saturating_add(self.config.cool_offset),
        ]
    }

    pub fn apply(&self, buf: PixelBuffer) -> PixelBuffer {
        let order = buf.order();
        tracing::trace!(
            "  Grade in {} order (warm -> {}, cool -> {})",
            order,
            order.index_of(Channel::Red),
            order.index_of(Channel::Blue)
        );
        let mut data = buf.as_raw().to_vec();
        data.par_chunks_mut(buf.stride()).for_each(|row| {
            for px in row.chunks_exact_mut(CHANNELS) {
                let graded = self.grade_rgb(order.to_rgb(px));
                order.write_rgb(px, graded);
            }
        });
        buf.with_data(data)
    }
}

/// Saturating lift, then `(L - 128) * contrast + 128 + offset`, clamped and truncated.
fn grade_lightness(config: &GradeConfig, l: u8) -> u8 {
    let lifted = l.saturating_add(config.luma_offset) as f32;
    let faded = (lifted - 128.0) * config.contrast + 128.0 + config.contrast_offset;
    faded.clamp(0.0, 255.0) as u8
}
