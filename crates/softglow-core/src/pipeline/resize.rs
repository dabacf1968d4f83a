//! Working-resolution normalization.
//!
//! Narrow inputs are upscaled with a Lanczos (windowed sinc) filter, wide
//! inputs are downscaled by area averaging. Only the width decides; the height
//! follows the same scale factor, rounded to the nearest pixel.

use image::imageops::{self, FilterType};
use image::RgbImage;
use rayon::prelude::*;

use crate::config::{LimitsConfig, ResizeConfig};
use crate::error::{PipelineError, PipelineResult};
use crate::filter::round_u8;
use crate::types::{PixelBuffer, CHANNELS};

/// Which way the resizer will go for a given input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeDirection {
    Upscale,
    Downscale,
    Unchanged,
}

/// Normalizes input width into `[min_width, max_width]`.
pub struct Resizer {
    config: ResizeConfig,
    max_dimension: u32,
}

impl Resizer {
    pub fn new(config: ResizeConfig) -> Self {
        Self {
            config,
            max_dimension: LimitsConfig::default().max_image_dimension,
        }
    }

    /// Largest width or height the resizer may produce.
    pub fn with_max_dimension(mut self, max_dimension: u32) -> Self {
        self.max_dimension = max_dimension;
        self
    }

    /// Target geometry for a `width` x `height` input.
    pub fn plan(&self, width: u32, height: u32) -> (ResizeDirection, u32, u32) {
        let target = if width < self.config.min_width {
            self.config.min_width
        } else if width > self.config.max_width {
            self.config.max_width
        } else {
            return (ResizeDirection::Unchanged, width, height);
        };

        let scale = target as f64 / width as f64;
        let new_height = ((height as f64 * scale).round() as u32).max(1);
        let direction = if target > width {
            ResizeDirection::Upscale
        } else {
            ResizeDirection::Downscale
        };
        (direction, target, new_height)
    }

    /// Resize `buf` into the working range.
    pub fn apply(&self, buf: PixelBuffer) -> PipelineResult<PixelBuffer> {
        let (width, height) = buf.dimensions();
        if width == 0 || height == 0 {
            return Err(PipelineError::InvalidDimensions { width, height });
        }

        let (direction, new_width, new_height) = self.plan(width, height);
        if new_width > self.max_dimension || new_height > self.max_dimension {
            return Err(PipelineError::WorkingSizeTooLarge {
                width: new_width,
                height: new_height,
                max_dim: self.max_dimension,
            });
        }
        tracing::trace!(
            "  Resize {:?}: {}x{} -> {}x{}",
            direction,
            width,
            height,
            new_width,
            new_height
        );

        match direction {
            ResizeDirection::Unchanged => Ok(buf),
            ResizeDirection::Upscale => lanczos_resize(buf, new_width, new_height),
            ResizeDirection::Downscale => area_resize(&buf, new_width, new_height),
        }
    }
}

/// Lanczos resampling through the `image` crate. Channel order is irrelevant
/// to resampling, so the raw bytes are wrapped as-is.
fn lanczos_resize(buf: PixelBuffer, width: u32, height: u32) -> PipelineResult<PixelBuffer> {
    let order = buf.order();
    let (w, h) = buf.dimensions();
    let src = RgbImage::from_raw(w, h, buf.into_raw()).ok_or_else(|| {
        PipelineError::UnsupportedChannelLayout {
            message: format!("{w}x{h} buffer does not hold packed 8-bit triples"),
        }
    })?;
    let resized = imageops::resize(&src, width, height, FilterType::Lanczos3);
    PixelBuffer::from_raw(width, height, CHANNELS, order, resized.into_raw())
}

/// Source taps and weights for each destination sample of an area resample.
fn area_weights(src_len: usize, dst_len: usize) -> Vec<Vec<(usize, f32)>> {
    let scale = src_len as f64 / dst_len as f64;
    (0..dst_len)
        .map(|i| {
            let start = i as f64 * scale;
            let end = ((i + 1) as f64 * scale).min(src_len as f64);
            let first = start.floor() as usize;
            let last = (end.ceil() as usize).min(src_len);
            (first..last)
                .filter_map(|s| {
                    let overlap = (end.min(s as f64 + 1.0) - start.max(s as f64)).max(0.0);
                    (overlap > 1e-9).then_some((s, (overlap / scale) as f32))
                })
                .collect()
        })
        .collect()
}

/// Box-filter minification: every destination pixel is the area-weighted
/// mean of the source pixels it covers.
fn area_resize(buf: &PixelBuffer, width: u32, height: u32) -> PipelineResult<PixelBuffer> {
    let (sw, sh) = (buf.width() as usize, buf.height() as usize);
    let (dw, dh) = (width as usize, height as usize);
    let src = buf.as_raw();
    let src_stride = sw * CHANNELS;
    let dst_stride = dw * CHANNELS;

    let wx = area_weights(sw, dw);
    let wy = area_weights(sh, dh);

    // Horizontal pass: sh rows of dw pixels.
    let mut tmp = vec![0.0f32; sh * dst_stride];
    tmp.par_chunks_mut(dst_stride)
        .zip(src.par_chunks(src_stride))
        .for_each(|(dst, row)| {
            for (x, taps) in wx.iter().enumerate() {
                for &(sx, w) in taps {
                    for c in 0..CHANNELS {
                        dst[x * CHANNELS + c] += row[sx * CHANNELS + c] as f32 * w;
                    }
                }
            }
        });

    // Vertical pass.
    let mut out = vec![0u8; dh * dst_stride];
    out.par_chunks_mut(dst_stride)
        .zip(wy.par_iter())
        .for_each(|(dst, taps)| {
            let mut acc = vec![0.0f32; dst_stride];
            for &(sy, w) in taps {
                let row = &tmp[sy * dst_stride..(sy + 1) * dst_stride];
                for (a, s) in acc.iter_mut().zip(row) {
                    *a += s * w;
                }
            }
            for (d, a) in dst.iter_mut().zip(acc) {
                *d = round_u8(a);
            }
        });

    PixelBuffer::from_raw(width, height, CHANNELS, buf.order(), out)
}
