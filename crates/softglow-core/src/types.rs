//! Core data types for the softglow enhancement pipeline.
//!
//! Every stage consumes a [`PixelBuffer`] by value and returns a fresh one, so
//! a buffer is never observed by two stages at once.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{PipelineError, PipelineResult};

/// Number of interleaved channels per pixel.
pub const CHANNELS: usize = 3;

/// A named display channel, independent of its position in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Red,
    Green,
    Blue,
}

/// Memory order of the three channels in a [`PixelBuffer`].
///
/// Stages that do channel-specific arithmetic (grading offsets, luma weights,
/// L*a*b* conversion) look channel positions up through this tag instead of
/// assuming an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelOrder {
    Rgb,
    Bgr,
}

impl ChannelOrder {
    /// Index of `channel` within a pixel triple.
    #[inline]
    pub fn index_of(self, channel: Channel) -> usize {
        match (self, channel) {
            (_, Channel::Green) => 1,
            (ChannelOrder::Rgb, Channel::Red) | (ChannelOrder::Bgr, Channel::Blue) => 0,
            (ChannelOrder::Rgb, Channel::Blue) | (ChannelOrder::Bgr, Channel::Red) => 2,
        }
    }

    /// Read a pixel triple as `[r, g, b]`.
    #[inline]
    pub fn to_rgb(self, px: &[u8]) -> [u8; 3] {
        match self {
            ChannelOrder::Rgb => [px[0], px[1], px[2]],
            ChannelOrder::Bgr => [px[2], px[1], px[0]],
        }
    }

    /// Write `[r, g, b]` into a pixel triple stored in this order.
    #[inline]
    pub fn write_rgb(self, px: &mut [u8], rgb: [u8; 3]) {
        match self {
            ChannelOrder::Rgb => px[..3].copy_from_slice(&rgb),
            ChannelOrder::Bgr => {
                px[0] = rgb[2];
                px[1] = rgb[1];
                px[2] = rgb[0];
            }
        }
    }
}

impl std::fmt::Display for ChannelOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChannelOrder::Rgb => write!(f, "rgb"),
            ChannelOrder::Bgr => write!(f, "bgr"),
        }
    }
}

/// An owned, dense, 8-bit, three-channel image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    order: ChannelOrder,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Wrap interleaved pixel data.
    ///
    /// Fails with `InvalidDimensions` for a zero width/height and with
    /// `UnsupportedChannelLayout` when `channels` is not 3 or the data length
    /// does not match `width * height * channels`.
    pub fn from_raw(
        width: u32,
        height: u32,
        channels: usize,
        order: ChannelOrder,
        data: Vec<u8>,
    ) -> PipelineResult<Self> {
        if width == 0 || height == 0 {
            return Err(PipelineError::InvalidDimensions { width, height });
        }
        if channels != CHANNELS {
            return Err(PipelineError::UnsupportedChannelLayout {
                message: format!("expected {CHANNELS} interleaved channels, got {channels}"),
            });
        }
        let expected = width as usize * height as usize * CHANNELS;
        if data.len() != expected {
            return Err(PipelineError::UnsupportedChannelLayout {
                message: format!(
                    "buffer holds {} bytes, {}x{}x{} needs {}",
                    data.len(),
                    width,
                    height,
                    CHANNELS,
                    expected
                ),
            });
        }
        Ok(Self {
            width,
            height,
            order,
            data,
        })
    }

    /// A buffer with every pixel set to `rgb`.
    pub fn filled(width: u32, height: u32, order: ChannelOrder, rgb: [u8; 3]) -> PipelineResult<Self> {
        if width == 0 || height == 0 {
            return Err(PipelineError::InvalidDimensions { width, height });
        }
        let mut px = [0u8; 3];
        order.write_rgb(&mut px, rgb);
        let data = px
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * CHANNELS)
            .collect();
        Ok(Self {
            width,
            height,
            order,
            data,
        })
    }

    /// Same geometry and order, new pixel data. Length is the caller's invariant.
    pub(crate) fn with_data(&self, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), self.data.len());
        Self {
            width: self.width,
            height: self.height,
            order: self.order,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn order(&self) -> ChannelOrder {
        self.order
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Bytes per row.
    #[inline]
    pub fn stride(&self) -> usize {
        self.width as usize * CHANNELS
    }

    /// The pixel at (x, y) as `[r, g, b]`.
    pub fn rgb_at(&self, x: u32, y: u32) -> [u8; 3] {
        let i = (y as usize * self.width as usize + x as usize) * CHANNELS;
        self.order.to_rgb(&self.data[i..i + CHANNELS])
    }

    /// Reorder channels in place of a copy. No-op when already in `order`.
    pub fn into_order(mut self, order: ChannelOrder) -> Self {
        if self.order != order {
            for px in self.data.chunks_exact_mut(CHANNELS) {
                px.swap(0, 2);
            }
            self.order = order;
        }
        self
    }

    /// True when every pixel equals the first one.
    pub fn is_uniform(&self) -> bool {
        let first = &self.data[..CHANNELS];
        self.data.chunks_exact(CHANNELS).all(|px| px == first)
    }
}

/// A single-channel `f32` plane (gray maps, gradients, masks).
#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl Plane {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; width * height],
        }
    }

    pub fn from_vec(width: usize, height: usize, data: Vec<f32>) -> Self {
        assert_eq!(data.len(), width * height, "plane data length mismatch");
        Self {
            width,
            height,
            data,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[y * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, v: f32) {
        self.data[y * self.width + x] = v;
    }

    #[inline]
    pub fn row(&self, y: usize) -> &[f32] {
        &self.data[y * self.width..(y + 1) * self.width]
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}

/// Wall time spent in each pipeline stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StageTimings {
    pub resize_ms: u64,
    pub denoise_ms: u64,
    pub smooth_ms: u64,
    pub grade_ms: u64,
    pub sharpen_ms: u64,
    pub bloom_ms: u64,
}

impl StageTimings {
    pub fn total(&self) -> Duration {
        Duration::from_millis(
            self.resize_ms
                + self.denoise_ms
                + self.smooth_ms
                + self.grade_ms
                + self.sharpen_ms
                + self.bloom_ms,
        )
    }
}

/// Summary of one enhanced file, written by the report writer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnhanceReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub original_width: u32,
    pub original_height: u32,
    pub width: u32,
    pub height: u32,
    pub bloom_intensity: f32,
    pub watermarked: bool,
    pub timings: StageTimings,
    /// Wall time including decode, overlay and encode
    pub total_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_positions() {
        assert_eq!(ChannelOrder::Rgb.index_of(Channel::Red), 0);
        assert_eq!(ChannelOrder::Rgb.index_of(Channel::Blue), 2);
        assert_eq!(ChannelOrder::Bgr.index_of(Channel::Red), 2);
        assert_eq!(ChannelOrder::Bgr.index_of(Channel::Blue), 0);
        assert_eq!(ChannelOrder::Bgr.index_of(Channel::Green), 1);
    }

    #[test]
    fn test_from_raw_rejects_zero_dimensions() {
        let err = PixelBuffer::from_raw(0, 10, 3, ChannelOrder::Rgb, vec![]).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidDimensions { .. }));
    }

    #[test]
    fn test_from_raw_rejects_rgba() {
        let err = PixelBuffer::from_raw(2, 2, 4, ChannelOrder::Rgb, vec![0; 16]).unwrap_err();
        assert!(matches!(err, PipelineError::UnsupportedChannelLayout { .. }));
    }

    #[test]
    fn test_from_raw_rejects_short_data() {
        let err = PixelBuffer::from_raw(2, 2, 3, ChannelOrder::Rgb, vec![0; 11]).unwrap_err();
        assert!(err.to_string().contains("11 bytes"));
    }

    #[test]
    fn test_into_order_swaps_red_and_blue() {
        let buf = PixelBuffer::from_raw(1, 1, 3, ChannelOrder::Rgb, vec![10, 20, 30]).unwrap();
        let bgr = buf.into_order(ChannelOrder::Bgr);
        assert_eq!(bgr.as_raw(), &[30, 20, 10]);
        assert_eq!(bgr.rgb_at(0, 0), [10, 20, 30]);
    }

    #[test]
    fn test_filled_respects_order() {
        let buf = PixelBuffer::filled(2, 1, ChannelOrder::Bgr, [1, 2, 3]).unwrap();
        assert_eq!(buf.as_raw(), &[3, 2, 1, 3, 2, 1]);
        assert!(buf.is_uniform());
    }
}
