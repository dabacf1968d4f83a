//! Separable convolution, Gaussian kernels and Sobel gradients.
//!
//! A 2-D convolution with a separable kernel `K = k_y * k_x^T` is run as a
//! horizontal pass followed by a vertical pass. Out-of-range taps are
//! mirrored without repeating the edge sample (`dcb|abcd|cba`).
//!
//! Rows are independent within a pass, so both passes fan out over rayon.

use rayon::prelude::*;

use crate::types::{PixelBuffer, Plane, CHANNELS};

/// Sobel derivative taps.
const SOBEL_DERIV: [f32; 3] = [-1.0, 0.0, 1.0];
/// Sobel smoothing taps.
const SOBEL_SMOOTH: [f32; 3] = [1.0, 2.0, 1.0];

/// Fixed binomial kernels used when no sigma is given.
const SMALL_GAUSSIAN: [&[f32]; 4] = [
    &[1.0],
    &[0.25, 0.5, 0.25],
    &[0.0625, 0.25, 0.375, 0.25, 0.0625],
    &[0.03125, 0.109375, 0.21875, 0.28125, 0.21875, 0.109375, 0.03125],
];

/// Mirror an out-of-range index back into `0..n` (edge sample not repeated).
#[inline]
pub(crate) fn reflect_101(i: isize, n: usize) -> usize {
    if n == 1 {
        return 0;
    }
    let last = n as isize - 1;
    let mut i = i;
    loop {
        if i < 0 {
            i = -i;
        } else if i > last {
            i = 2 * last - i;
        } else {
            return i as usize;
        }
    }
}

/// Kernel side derived from sigma: ±3σ for byte images, ±4σ for float planes.
pub fn kernel_size_for_sigma(sigma: f32, byte_input: bool) -> usize {
    let reach = if byte_input { 3.0 } else { 4.0 };
    ((sigma * reach * 2.0 + 1.0).round() as usize) | 1
}

/// Normalized 1-D Gaussian kernel of odd length `ksize`.
///
/// With `sigma <= 0` and `ksize <= 7` the fixed binomial kernels are used;
/// otherwise sigma defaults to `0.3 * ((ksize - 1) * 0.5 - 1) + 0.8`.
pub fn gaussian_kernel(ksize: usize, sigma: f32) -> Vec<f32> {
    assert!(ksize % 2 == 1, "kernel length must be odd (got {ksize})");

    if sigma <= 0.0 && ksize <= 7 {
        return SMALL_GAUSSIAN[ksize / 2].to_vec();
    }

    let sigma = if sigma > 0.0 {
        sigma as f64
    } else {
        0.3 * ((ksize as f64 - 1.0) * 0.5 - 1.0) + 0.8
    };
    let scale = -0.5 / (sigma * sigma);
    let half = (ksize / 2) as f64;
    let raw: Vec<f64> = (0..ksize)
        .map(|i| {
            let x = i as f64 - half;
            (scale * x * x).exp()
        })
        .collect();
    let sum: f64 = raw.iter().sum();
    raw.iter().map(|v| (v / sum) as f32).collect()
}

/// Convolve interleaved `channels`-wide rows with `kx` horizontally, then `ky` vertically.
pub fn convolve_separable(
    src: &[f32],
    width: usize,
    height: usize,
    channels: usize,
    kx: &[f32],
    ky: &[f32],
) -> Vec<f32> {
    assert!(kx.len() % 2 == 1, "kernel length must be odd (got {})", kx.len());
    assert!(ky.len() % 2 == 1, "kernel length must be odd (got {})", ky.len());
    assert_eq!(src.len(), width * height * channels);

    let stride = width * channels;
    let half_x = (kx.len() / 2) as isize;
    let half_y = (ky.len() / 2) as isize;

    // Horizontal pass
    let mut tmp = vec![0.0f32; src.len()];
    tmp.par_chunks_mut(stride)
        .zip(src.par_chunks(stride))
        .for_each(|(dst, row)| {
            for x in 0..width {
                for c in 0..channels {
                    let mut acc = 0.0f32;
                    for (ki, &kv) in kx.iter().enumerate() {
                        let sx = reflect_101(x as isize + ki as isize - half_x, width);
                        acc += row[sx * channels + c] * kv;
                    }
                    dst[x * channels + c] = acc;
                }
            }
        });

    // Vertical pass
    let mut out = vec![0.0f32; src.len()];
    out.par_chunks_mut(stride)
        .enumerate()
        .for_each(|(y, dst)| {
            for (ki, &kv) in ky.iter().enumerate() {
                let sy = reflect_101(y as isize + ki as isize - half_y, height);
                let row = &tmp[sy * stride..(sy + 1) * stride];
                for (d, s) in dst.iter_mut().zip(row) {
                    *d += s * kv;
                }
            }
        });
    out
}

/// Gaussian blur of a byte image, rounded back to bytes.
pub fn gaussian_blur(buf: &PixelBuffer, sigma: f32) -> PixelBuffer {
    let ksize = kernel_size_for_sigma(sigma, true);
    let kernel = gaussian_kernel(ksize, sigma);
    let src: Vec<f32> = buf.as_raw().iter().map(|&v| v as f32).collect();
    let blurred = convolve_separable(
        &src,
        buf.width() as usize,
        buf.height() as usize,
        CHANNELS,
        &kernel,
        &kernel,
    );
    buf.with_data(blurred.into_iter().map(round_u8).collect())
}

/// Blur a plane with a fixed-size kernel (`sigma <= 0` selects the binomial one).
pub fn blur_plane(plane: &Plane, ksize: usize, sigma: f32) -> Plane {
    let kernel = gaussian_kernel(ksize, sigma);
    let data = convolve_separable(
        plane.as_slice(),
        plane.width(),
        plane.height(),
        1,
        &kernel,
        &kernel,
    );
    Plane::from_vec(plane.width(), plane.height(), data)
}

/// Horizontal and vertical 3×3 Sobel responses of a plane.
pub fn sobel_xy(plane: &Plane) -> (Plane, Plane) {
    let (w, h) = (plane.width(), plane.height());
    let gx = convolve_separable(plane.as_slice(), w, h, 1, &SOBEL_DERIV, &SOBEL_SMOOTH);
    let gy = convolve_separable(plane.as_slice(), w, h, 1, &SOBEL_SMOOTH, &SOBEL_DERIV);
    (Plane::from_vec(w, h, gx), Plane::from_vec(w, h, gy))
}

/// Round and saturate to a byte.
#[inline]
pub(crate) fn round_u8(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChannelOrder;

    #[test]
    fn test_reflect_101() {
        assert_eq!(reflect_101(-1, 5), 1);
        assert_eq!(reflect_101(-2, 5), 2);
        assert_eq!(reflect_101(5, 5), 3);
        assert_eq!(reflect_101(6, 5), 2);
        assert_eq!(reflect_101(3, 5), 3);
        assert_eq!(reflect_101(-7, 3), 1);
        assert_eq!(reflect_101(4, 1), 0);
    }

    #[test]
    fn test_kernel_size_for_sigma() {
        assert_eq!(kernel_size_for_sigma(2.0, true), 13);
        assert_eq!(kernel_size_for_sigma(5.0, true), 31);
        assert_eq!(kernel_size_for_sigma(2.0, false), 17);
    }

    #[test]
    fn test_gaussian_kernel_normalized_and_symmetric() {
        let k = gaussian_kernel(13, 2.0);
        let sum: f32 = k.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        for i in 0..6 {
            assert!((k[i] - k[12 - i]).abs() < 1e-7);
        }
        assert!(k[6] > k[5]);
    }

    #[test]
    fn test_small_gaussian_table() {
        assert_eq!(gaussian_kernel(5, 0.0), vec![0.0625, 0.25, 0.375, 0.25, 0.0625]);
    }

    #[test]
    fn test_blur_preserves_flat_field() {
        let buf = PixelBuffer::filled(20, 9, ChannelOrder::Bgr, [90, 140, 200]).unwrap();
        let blurred = gaussian_blur(&buf, 5.0);
        assert_eq!(blurred, buf);
    }

    #[test]
    fn test_horizontal_sobel_on_step_edge() {
        // Vertical step edge: left half = 0, right half = 100.
        let mut plane = Plane::new(20, 10);
        for y in 0..10 {
            for x in 10..20 {
                plane.set(x, y, 100.0);
            }
        }

        let (gx, gy) = sobel_xy(&plane);

        // (-1 * 0 + 1 * 100) * (1 + 2 + 1)
        assert_eq!(gx.get(10, 5), 400.0);
        assert_eq!(gx.get(5, 5), 0.0);
        assert_eq!(gy.get(10, 5), 0.0);
        // Mirrored border does not invent an edge.
        assert_eq!(gx.get(0, 0), 0.0);
    }
}
