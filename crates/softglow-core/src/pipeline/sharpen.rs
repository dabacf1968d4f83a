//! Gradient-gated unsharp masking.
//!
//! Sharpening is only let through where the luma gradient is strong, so
//! flat skin that the smoother just cleaned stays clean. The binary gate is
//! feathered with a small blur to avoid seams along its border.

use rayon::prelude::*;

use crate::color::luma601;
use crate::config::SharpenConfig;
use crate::filter::{blur_plane, gaussian_blur, round_u8, sobel_xy};
use crate::types::{PixelBuffer, Plane, CHANNELS};

/// Edge-gated sharpener.
pub struct Sharpener {
    config: SharpenConfig,
}

impl Sharpener {
    pub fn new(config: SharpenConfig) -> Self {
        Self { config }
    }

    /// Feathered per-pixel gate in `[0, 1]`: 1 on texture, 0 on flat areas.
    pub fn edge_mask(&self, buf: &PixelBuffer) -> Plane {
        let (w, h) = (buf.width() as usize, buf.height() as usize);
        let order = buf.order();
        let gray: Vec<f32> = buf
            .as_raw()
            .chunks_exact(CHANNELS)
            .map(|px| luma601(order.to_rgb(px)) as f32)
            .collect();
        let (gx, gy) = sobel_xy(&Plane::from_vec(w, h, gray));

        let threshold = self.config.edge_threshold;
        let gate: Vec<f32> = gx
            .as_slice()
            .par_iter()
            .zip(gy.as_slice().par_iter())
            .map(|(&x, &y)| if x.hypot(y) > threshold { 1.0 } else { 0.0 })
            .collect();

        blur_plane(&Plane::from_vec(w, h, gate), self.config.mask_blur_kernel, 0.0)
    }

    /// Unsharp-masked copy of `buf` with no gating.
    pub fn unsharp(&self, buf: &PixelBuffer) -> PixelBuffer {
        let blurred = gaussian_blur(buf, self.config.unsharp_sigma);
        let (amount, negative) = (self.config.unsharp_amount, self.config.unsharp_negative);
        let data = buf
            .as_raw()
            .par_iter()
            .zip(blurred.as_raw().par_iter())
            .map(|(&o, &b)| round_u8(o as f32 * amount + b as f32 * negative))
            .collect();
        buf.with_data(data)
    }

    pub fn apply(&self, buf: PixelBuffer) -> PixelBuffer {
        let mask = self.edge_mask(&buf);
        let sharp = self.unsharp(&buf);
        let stride = buf.stride();

        let mut out = buf.as_raw().to_vec();
        out.par_chunks_mut(stride)
            .zip(sharp.as_raw().par_chunks(stride))
            .enumerate()
            .for_each(|(y, (row, sharp_row))| {
                let gate = mask.row(y);
                for (x, (px, sp)) in row
                    .chunks_exact_mut(CHANNELS)
                    .zip(sharp_row.chunks_exact(CHANNELS))
                    .enumerate()
                {
                    let m = gate[x];
                    for (o, &s) in px.iter_mut().zip(sp) {
                        // Truncating store.
                        *o = (s as f32 * m + *o as f32 * (1.0 - m)).clamp(0.0, 255.0) as u8;
                    }
                }
            });
        buf.with_data(out)
    }
}
