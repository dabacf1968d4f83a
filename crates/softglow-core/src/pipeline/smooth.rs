//! Edge-preserving "beauty" smoothing with a detail blend.
//!
//! The smoothing layer is a recursive domain-transform filter: a 1-D
//! exponential smoother whose feedback coefficient is raised to a power that
//! grows with the local color difference, so it flows freely across flat skin
//! and stops at strong edges. Three horizontal+vertical passes with shrinking
//! sigma remove the streaks a single pass leaves.
//!
//! The smoothed layer is then mixed back with the input so some original
//! texture survives.

use rayon::prelude::*;

use crate::config::SmoothConfig;
use crate::filter::round_u8;
use crate::types::{PixelBuffer, CHANNELS};

/// Horizontal+vertical passes of the recursive filter.
const ITERATIONS: i32 = 3;

/// Edge-preserving smoother.
pub struct Smoother {
    config: SmoothConfig,
}

impl Smoother {
    pub fn new(config: SmoothConfig) -> Self {
        Self { config }
    }

    pub fn apply(&self, buf: PixelBuffer) -> PixelBuffer {
        let smoothed = edge_preserving_filter(&buf, self.config.sigma_s, self.config.sigma_r);
        let (wo, ws) = (self.config.blend_original, self.config.blend_smoothed);
        let mixed = buf
            .as_raw()
            .par_iter()
            .zip(smoothed.par_iter())
            .map(|(&o, &s)| round_u8(o as f32 * wo + s as f32 * ws))
            .collect();
        buf.with_data(mixed)
    }
}

/// Recursive-filter domain transform; returns bytes in the buffer's own layout.
pub fn edge_preserving_filter(buf: &PixelBuffer, sigma_s: f32, sigma_r: f32) -> Vec<u8> {
    let w = buf.width() as usize;
    let h = buf.height() as usize;
    let raw = buf.as_raw();
    let img: Vec<f32> = raw.iter().map(|&v| v as f32 / 255.0).collect();

    let ratio = sigma_s / sigma_r;
    let horiz = domain_derivative_rows(raw, w, h, ratio);
    let vert_t = domain_derivative_rows(&transpose(raw, w, h, CHANNELS), h, w, ratio);

    let mut out = img;
    let scale = (4.0f32.powi(ITERATIONS) - 1.0).sqrt();
    for i in 0..ITERATIONS {
        let sigma_h = sigma_s * 3.0f32.sqrt() * 2.0f32.powi(ITERATIONS - (i + 1)) / scale;
        recursive_filter_rows(&mut out, &horiz, w, sigma_h);
        let mut t = transpose(&out, w, h, CHANNELS);
        recursive_filter_rows(&mut t, &vert_t, h, sigma_h);
        out = transpose(&t, h, w, CHANNELS);
    }

    out.into_iter().map(|v| round_u8((v * 255.0).abs())).collect()
}

/// `1 + ratio * L1(pixel - left neighbor)` per pixel on the unit scale; the
/// first column has no neighbor. The L1 sum is taken on the bytes so it does
/// not depend on channel order.
fn domain_derivative_rows(img: &[u8], w: usize, h: usize, ratio: f32) -> Vec<f32> {
    let mut out = vec![1.0f32; w * h];
    out.par_chunks_mut(w)
        .zip(img.par_chunks(w * CHANNELS))
        .for_each(|(dst, row)| {
            for x in 1..w {
                let l1: u32 = (0..CHANNELS)
                    .map(|c| row[x * CHANNELS + c].abs_diff(row[(x - 1) * CHANNELS + c]) as u32)
                    .sum();
                dst[x] = 1.0 + ratio * (l1 as f32 / 255.0);
            }
        });
    out
}

/// One causal and one anti-causal sweep along every row.
fn recursive_filter_rows(img: &mut [f32], derivative: &[f32], w: usize, sigma_h: f32) {
    let a = (-(2.0f32.sqrt()) / sigma_h).exp();
    img.par_chunks_mut(w * CHANNELS)
        .zip(derivative.par_chunks(w))
        .for_each(|(row, d)| {
            let v: Vec<f32> = d.iter().map(|&dx| a.powf(dx)).collect();
            for x in 1..w {
                for c in 0..CHANNELS {
                    let prev = row[(x - 1) * CHANNELS + c];
                    let cur = &mut row[x * CHANNELS + c];
                    *cur += (prev - *cur) * v[x];
                }
            }
            for x in (0..w.saturating_sub(1)).rev() {
                for c in 0..CHANNELS {
                    let next = row[(x + 1) * CHANNELS + c];
                    let cur = &mut row[x * CHANNELS + c];
                    *cur += (next - *cur) * v[x + 1];
                }
            }
        });
}

/// Transpose a `w` x `h` interleaved image into `h` x `w`.
fn transpose<T>(src: &[T], w: usize, h: usize, channels: usize) -> Vec<T>
where
    T: Copy + Default + Send + Sync,
{
    let mut dst = vec![T::default(); src.len()];
    dst.par_chunks_mut(h * channels)
        .enumerate()
        .for_each(|(x, col)| {
            for y in 0..h {
                let s = (y * w + x) * channels;
                col[y * channels..(y + 1) * channels].copy_from_slice(&src[s..s + channels]);
            }
        });
    dst
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChannelOrder;

    fn step_edge(w: u32, h: u32, left: u8, right: u8) -> PixelBuffer {
        let mut data = Vec::new();
        for _y in 0..h {
            for x in 0..w {
                let v = if x < w / 2 { left } else { right };
                data.extend_from_slice(&[v, v, v]);
            }
        }
        PixelBuffer::from_raw(w, h, 3, ChannelOrder::Bgr, data).unwrap()
    }

    #[test]
    fn test_transpose_round_trip() {
        let src: Vec<f32> = (0..2 * 3 * 3).map(|v| v as f32).collect();
        let t = transpose(&src, 2, 3, 3);
        // pixel (x=1, y=0) becomes (x=0, y=1) of a 3-wide image
        assert_eq!(&t[9..12], &src[3..6]);
        // pixel (x=0, y=1) becomes (x=1, y=0)
        assert_eq!(&t[3..6], &src[6..9]);
        assert_eq!(transpose(&t, 3, 2, 3), src);
    }

    #[test]
    fn test_flat_field_is_unchanged() {
        let buf = PixelBuffer::filled(32, 20, ChannelOrder::Bgr, [128, 128, 128]).unwrap();
        let out = Smoother::new(SmoothConfig::default()).apply(buf.clone());
        assert_eq!(out, buf);
    }

    #[test]
    fn test_edge_survives_smoothing() {
        let buf = step_edge(64, 16, 40, 220);
        let smoothed = edge_preserving_filter(&buf, 60.0, 0.4);
        let at = |x: usize| smoothed[(8 * 64 + x) * 3] as i32;
        assert!(at(31) < 60, "dark side leaked: {}", at(31));
        assert!(at(32) > 200, "light side leaked: {}", at(32));
    }

    #[test]
    fn test_mild_texture_is_flattened() {
        let mut data = Vec::new();
        for y in 0..24u32 {
            for x in 0..24u32 {
                let v = if (x + y) % 2 == 0 { 126 } else { 130 };
                data.extend_from_slice(&[v, v, v]);
            }
        }
        let buf = PixelBuffer::from_raw(24, 24, 3, ChannelOrder::Rgb, data).unwrap();
        let smoothed = edge_preserving_filter(&buf, 60.0, 0.4);
        let spread = smoothed.iter().max().unwrap() - smoothed.iter().min().unwrap();
        assert!(spread <= 2, "spread {spread}");
    }

    #[test]
    fn test_blend_keeps_thirty_percent_of_original() {
        let buf = step_edge(64, 16, 40, 220);
        let smoothed = edge_preserving_filter(&buf, 60.0, 0.4);
        let out = Smoother::new(SmoothConfig::default()).apply(buf.clone());
        for ((&o, &s), &r) in buf.as_raw().iter().zip(&smoothed).zip(out.as_raw()) {
            let expected = (0.3 * o as f32 + 0.7 * s as f32).round() as u8;
            assert_eq!(r, expected);
        }
    }
}
