//! Joint-channel non-local means denoising.
//!
//! Works on the 8-bit L*a*b* form of the image so lightness and chroma noise
//! get separate strengths while patch similarity is measured on all three
//! channels at once.
//!
//! OpenCV's `fastNlMeansDenoisingColored` instead runs two passes, L alone
//! and a/b as a pair, each normalizing distances by its own channel count.
//! Here a single three-channel patch distance (divided by 3) drives both
//! weight tables, so chroma edges also protect lightness detail and vice
//! versa. Flat regions come out the same either way.
//!
//! For every search offset the squared patch distances of a whole band are
//! produced with two sliding box sums, so the cost per pixel is linear in the
//! search area rather than in search area × template area. Bands are
//! independent and run in parallel: each reads the shared padded source and
//! writes only its own rows.

use rayon::prelude::*;

use crate::color;
use crate::config::DenoiseConfig;
use crate::filter::reflect_101;
use crate::types::{PixelBuffer, CHANNELS};

/// Output rows handled by one parallel task.
const BAND_ROWS: usize = 32;

/// Weights below this are treated as zero.
const WEIGHT_CUTOFF: f32 = 0.001;

/// Non-local means denoiser.
pub struct Denoiser {
    config: DenoiseConfig,
}

impl Denoiser {
    pub fn new(config: DenoiseConfig) -> Self {
        Self { config }
    }

    pub fn apply(&self, buf: PixelBuffer) -> PixelBuffer {
        let width = buf.width() as usize;
        let height = buf.height() as usize;
        let lab = color::buffer_to_lab8(&buf);
        let filtered = nl_means(&lab, width, height, &self.config);
        let pixels = color::lab8_to_pixels(&filtered, buf.stride(), buf.order());
        buf.with_data(pixels)
    }
}

/// Source image mirrored outward by `pad` pixels on every side.
struct Padded {
    data: Vec<u8>,
    width: usize,
}

impl Padded {
    fn new(src: &[u8], width: usize, height: usize, pad: usize) -> Self {
        let pw = width + 2 * pad;
        let ph = height + 2 * pad;
        let mut data = vec![0u8; pw * ph * CHANNELS];
        for py in 0..ph {
            let sy = reflect_101(py as isize - pad as isize, height);
            for px in 0..pw {
                let sx = reflect_101(px as isize - pad as isize, width);
                let s = (sy * width + sx) * CHANNELS;
                let d = (py * pw + px) * CHANNELS;
                data[d..d + CHANNELS].copy_from_slice(&src[s..s + CHANNELS]);
            }
        }
        Self { data, width: pw }
    }

    #[inline]
    fn px(&self, x: usize, y: usize) -> &[u8] {
        let i = (y * self.width + x) * CHANNELS;
        &self.data[i..i + CHANNELS]
    }
}

/// Weight by summed squared template distance, truncated at the cutoff.
fn weight_lut(h: f32, template_area: usize) -> Vec<f32> {
    let denom = h * h * CHANNELS as f32;
    let mut lut = Vec::new();
    for s in 0u32.. {
        let dist = s as f32 / template_area as f32;
        let w = (-dist / denom).exp();
        if w < WEIGHT_CUTOFF {
            break;
        }
        lut.push(w);
    }
    lut
}

fn nl_means(lab: &[u8], width: usize, height: usize, config: &DenoiseConfig) -> Vec<u8> {
    let tw = config.template_window;
    let sw = config.search_window;
    let pad = tw / 2 + sw / 2;
    let padded = Padded::new(lab, width, height, pad);

    let template_area = tw * tw;
    let luts = [
        weight_lut(config.h_luma, template_area),
        weight_lut(config.h_color, template_area),
        weight_lut(config.h_color, template_area),
    ];

    let stride = width * CHANNELS;
    let mut out = vec![0u8; lab.len()];
    out.par_chunks_mut(BAND_ROWS * stride)
        .enumerate()
        .for_each(|(band, dst)| {
            let y0 = band * BAND_ROWS;
            let rows = dst.len() / stride;
            denoise_band(&padded, width, y0, rows, tw, sw, &luts, dst);
        });
    out
}

#[allow(clippy::too_many_arguments)]
fn denoise_band(
    src: &Padded,
    width: usize,
    y0: usize,
    rows: usize,
    tw: usize,
    sw: usize,
    luts: &[Vec<f32>; 3],
    dst: &mut [u8],
) {
    let tr = tw / 2;
    let sr = sw / 2;
    // Region of template centers: the band grown by the template radius.
    let rw = width + 2 * tr;
    let rh = rows + 2 * tr;
    let max_dist = luts.iter().map(|l| l.len()).max().unwrap_or(0);

    let mut acc = vec![0.0f32; rows * width * CHANNELS];
    let mut wsum = vec![0.0f32; rows * width * CHANNELS];
    let mut diff = vec![0u32; rh * rw];
    let mut hsum = vec![0u32; rh * width];
    let mut col = vec![0u32; width];

    for dy in 0..sw {
        for dx in 0..sw {
            // Per-pixel squared distance to the pixel displaced by (dx - sr, dy - sr).
            for ry in 0..rh {
                for rx in 0..rw {
                    let a = src.px(rx + sr, y0 + ry + sr);
                    let b = src.px(rx + dx, y0 + ry + dy);
                    let mut d = 0u32;
                    for c in 0..CHANNELS {
                        let e = a[c] as i32 - b[c] as i32;
                        d += (e * e) as u32;
                    }
                    diff[ry * rw + rx] = d;
                }
            }

            // Horizontal box sums.
            for ry in 0..rh {
                let row = &diff[ry * rw..(ry + 1) * rw];
                let out = &mut hsum[ry * width..(ry + 1) * width];
                let mut s: u32 = row[..tw].iter().sum();
                out[0] = s;
                for x in 1..width {
                    s = s + row[x + tw - 1] - row[x - 1];
                    out[x] = s;
                }
            }

            // Vertical box sums, then accumulate.
            for (x, c) in col.iter_mut().enumerate() {
                *c = (0..tw).map(|ry| hsum[ry * width + x]).sum();
            }
            for y in 0..rows {
                if y > 0 {
                    let add = &hsum[(y + tw - 1) * width..(y + tw) * width];
                    let sub = &hsum[(y - 1) * width..y * width];
                    for ((c, a), s) in col.iter_mut().zip(add).zip(sub) {
                        *c = *c + a - s;
                    }
                }
                for (x, &dist) in col.iter().enumerate() {
                    let dist = dist as usize;
                    if dist >= max_dist {
                        continue;
                    }
                    let nb = src.px(x + tr + dx, y0 + y + tr + dy);
                    let base = (y * width + x) * CHANNELS;
                    for c in 0..CHANNELS {
                        if let Some(&w) = luts[c].get(dist) {
                            acc[base + c] += w * nb[c] as f32;
                            wsum[base + c] += w;
                        }
                    }
                }
            }
        }
    }

    for ((d, a), w) in dst.iter_mut().zip(&acc).zip(&wsum) {
        *d = (a / w).round().clamp(0.0, 255.0) as u8;
    }
}
