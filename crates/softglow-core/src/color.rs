//! 8-bit color conversions shared by the denoise, grade and sharpen stages.
//!
//! L*a*b* is stored the usual 8-bit way: `L * 255 / 100`, `a + 128`,
//! `b + 128`, each rounded and saturated. Conversions go through sRGB gamma
//! and a D65 white point.

use rayon::prelude::*;
use std::sync::OnceLock;

use crate::types::{ChannelOrder, PixelBuffer, CHANNELS};

/// D65 reference white (X and Z; Y is 1).
const D65_X: f32 = 0.950456;
const D65_Z: f32 = 1.088754;

/// sRGB to XYZ matrix (D65)
const SRGB_TO_XYZ: [[f32; 3]; 3] = [
    [0.412453, 0.357580, 0.180423],
    [0.212671, 0.715160, 0.072169],
    [0.019334, 0.119193, 0.950227],
];

/// XYZ to sRGB matrix (D65)
const XYZ_TO_SRGB: [[f32; 3]; 3] = [
    [3.240479, -1.53715, -0.498535],
    [-0.969256, 1.875991, 0.041556],
    [0.055648, -0.204043, 1.057311],
];

const LAB_EPSILON: f32 = 0.008856;
const LAB_KAPPA: f32 = 903.3;
const LAB_LINEAR_SLOPE: f32 = 7.787;
const LAB_LINEAR_OFFSET: f32 = 16.0 / 116.0;

/// sRGB-encoded byte → linear light, tabulated once.
fn linear_lut() -> &'static [f32; 256] {
    static LUT: OnceLock<[f32; 256]> = OnceLock::new();
    LUT.get_or_init(|| {
        let mut lut = [0.0f32; 256];
        for (i, v) in lut.iter_mut().enumerate() {
            let c = i as f32 / 255.0;
            *v = if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            };
        }
        lut
    })
}

#[inline]
fn linear_to_srgb_byte(v: f32) -> u8 {
    let v = v.clamp(0.0, 1.0);
    let c = if v <= 0.003_130_8 {
        12.92 * v
    } else {
        1.055 * v.powf(1.0 / 2.4) - 0.055
    };
    (c * 255.0).round().clamp(0.0, 255.0) as u8
}

#[inline]
fn lab_f(t: f32) -> f32 {
    if t > LAB_EPSILON {
        t.cbrt()
    } else {
        LAB_LINEAR_SLOPE * t + LAB_LINEAR_OFFSET
    }
}

#[inline]
fn lab_f_inv(f: f32) -> f32 {
    if f > 0.206893 {
        f * f * f
    } else {
        (f - LAB_LINEAR_OFFSET) / LAB_LINEAR_SLOPE
    }
}

#[inline]
fn saturate(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// Convert an `[r, g, b]` pixel to 8-bit L*a*b*.
pub fn rgb_to_lab8(rgb: [u8; 3]) -> [u8; 3] {
    let lut = linear_lut();
    let r = lut[rgb[0] as usize];
    let g = lut[rgb[1] as usize];
    let b = lut[rgb[2] as usize];

    let m = &SRGB_TO_XYZ;
    let x = (m[0][0] * r + m[0][1] * g + m[0][2] * b) / D65_X;
    let y = m[1][0] * r + m[1][1] * g + m[1][2] * b;
    let z = (m[2][0] * r + m[2][1] * g + m[2][2] * b) / D65_Z;

    let fx = lab_f(x);
    let fy = lab_f(y);
    let fz = lab_f(z);

    let l = if y > LAB_EPSILON {
        116.0 * fy - 16.0
    } else {
        LAB_KAPPA * y
    };
    let a = 500.0 * (fx - fy);
    let bb = 200.0 * (fy - fz);

    [saturate(l * 255.0 / 100.0), saturate(a + 128.0), saturate(bb + 128.0)]
}

/// Convert an 8-bit L*a*b* pixel back to `[r, g, b]`.
pub fn lab8_to_rgb(lab: [u8; 3]) -> [u8; 3] {
    let l = lab[0] as f32 * 100.0 / 255.0;
    let a = lab[1] as f32 - 128.0;
    let b = lab[2] as f32 - 128.0;

    let (y, fy) = if l <= 8.0 {
        let y = l / LAB_KAPPA;
        (y, LAB_LINEAR_SLOPE * y + LAB_LINEAR_OFFSET)
    } else {
        let fy = (l + 16.0) / 116.0;
        (fy * fy * fy, fy)
    };
    let x = lab_f_inv(fy + a / 500.0) * D65_X;
    let z = lab_f_inv(fy - b / 200.0) * D65_Z;

    let m = &XYZ_TO_SRGB;
    let r = m[0][0] * x + m[0][1] * y + m[0][2] * z;
    let g = m[1][0] * x + m[1][1] * y + m[1][2] * z;
    let bl = m[2][0] * x + m[2][1] * y + m[2][2] * z;

    [
        linear_to_srgb_byte(r),
        linear_to_srgb_byte(g),
        linear_to_srgb_byte(bl),
    ]
}

/// ITU-R 601 luma with 14-bit fixed-point weights, rounded.
#[inline]
pub fn luma601(rgb: [u8; 3]) -> u8 {
    let v = rgb[0] as u32 * 4899 + rgb[1] as u32 * 9617 + rgb[2] as u32 * 1868;
    ((v + (1 << 13)) >> 14) as u8
}

/// Interleaved 8-bit L*a*b* copy of `buf`.
pub fn buffer_to_lab8(buf: &PixelBuffer) -> Vec<u8> {
    let order = buf.order();
    let mut lab = vec![0u8; buf.as_raw().len()];
    lab.par_chunks_mut(buf.stride())
        .zip(buf.as_raw().par_chunks(buf.stride()))
        .for_each(|(dst, src)| {
            for (d, s) in dst.chunks_exact_mut(CHANNELS).zip(src.chunks_exact(CHANNELS)) {
                d.copy_from_slice(&rgb_to_lab8(order.to_rgb(s)));
            }
        });
    lab
}

/// Convert interleaved 8-bit L*a*b* rows back into pixel data laid out in `order`.
pub fn lab8_to_pixels(lab: &[u8], stride: usize, order: ChannelOrder) -> Vec<u8> {
    let mut out = vec![0u8; lab.len()];
    out.par_chunks_mut(stride)
        .zip(lab.par_chunks(stride))
        .for_each(|(dst, src)| {
            for (d, s) in dst.chunks_exact_mut(CHANNELS).zip(src.chunks_exact(CHANNELS)) {
                order.write_rgb(d, lab8_to_rgb([s[0], s[1], s[2]]));
            }
        });
    out
}
