//! Final overlay step: straight-alpha RGBA compositing on top of the graded image.
//!
//! The pipeline hands the overlay a straight RGBA copy of its buffer and
//! expects one of the same size back. Alpha is dropped on the way back in.
//! Glyph rasterization happens elsewhere: [`WatermarkOverlay`] takes an
//! already-rendered text coverage mask and only does the placement and
//! painting.

use std::path::Path;

use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, Rgba, RgbaImage};

use crate::config::WatermarkConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::filter::round_u8;
use crate::types::{ChannelOrder, PixelBuffer, CHANNELS};

/// Something painted over the finished image.
pub trait Overlay: Send + Sync {
    /// Composite onto `image` and return a buffer of the same dimensions.
    fn apply(&self, image: RgbaImage) -> PipelineResult<RgbaImage>;
}

/// Opaque straight-alpha copy of `buf`.
pub fn to_rgba(buf: &PixelBuffer) -> RgbaImage {
    let order = buf.order();
    let mut rgba = Vec::with_capacity(buf.as_raw().len() / CHANNELS * 4);
    for px in buf.as_raw().chunks_exact(CHANNELS) {
        let [r, g, b] = order.to_rgb(px);
        rgba.extend_from_slice(&[r, g, b, 255]);
    }
    let (w, h) = buf.dimensions();
    RgbaImage::from_raw(w, h, rgba).unwrap_or_else(|| RgbaImage::new(w, h))
}

/// Drop alpha and lay the pixels out in `order`.
pub fn from_rgba(image: &RgbaImage, order: ChannelOrder) -> PipelineResult<PixelBuffer> {
    let mut data = Vec::with_capacity(image.as_raw().len() / 4 * CHANNELS);
    for px in image.pixels() {
        let mut out = [0u8; CHANNELS];
        order.write_rgb(&mut out, [px[0], px[1], px[2]]);
        data.extend_from_slice(&out);
    }
    PixelBuffer::from_raw(image.width(), image.height(), CHANNELS, order, data)
}

/// Run `overlay` on `buf`; a size change is reported as an overlay error.
pub fn apply_overlay(buf: PixelBuffer, overlay: &dyn Overlay) -> PipelineResult<PixelBuffer> {
    let (w, h) = buf.dimensions();
    let order = buf.order();
    let result = overlay.apply(to_rgba(&buf))?;
    if result.dimensions() != (w, h) {
        return Err(PipelineError::Overlay {
            message: format!(
                "overlay returned {}x{}, expected {}x{}",
                result.width(),
                result.height(),
                w,
                h
            ),
        });
    }
    from_rgba(&result, order)
}

/// Bottom-right placement of a text block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatermarkLayout {
    pub font_size: u32,
    pub margin_x: u32,
    pub margin_y: u32,
    /// Left edge of the text; negative when the text is wider than the image
    pub x: i64,
    pub y: i64,
}

impl WatermarkLayout {
    pub fn compute(
        width: u32,
        height: u32,
        text_width: u32,
        text_height: u32,
        config: &WatermarkConfig,
    ) -> Self {
        let margin_x = (width as f64 * config.margin_x) as u32;
        let margin_y = (height as f64 * config.margin_y) as u32;
        Self {
            font_size: width / config.font_divisor.max(1),
            margin_x,
            margin_y,
            x: width as i64 - text_width as i64 - margin_x as i64,
            y: height as i64 - text_height as i64 - margin_y as i64,
        }
    }
}

/// Porter-Duff "over" of `src` placed at (`x`, `y`) onto `dst`, straight alpha.
pub fn alpha_over(dst: &mut RgbaImage, src: &RgbaImage, x: i64, y: i64) {
    for (sx, sy, s) in src.enumerate_pixels() {
        let (dx, dy) = (x + sx as i64, y + sy as i64);
        if dx < 0 || dy < 0 || dx >= dst.width() as i64 || dy >= dst.height() as i64 {
            continue;
        }
        if s[3] == 0 {
            continue;
        }
        let d = dst.get_pixel_mut(dx as u32, dy as u32);
        let sa = s[3] as f32 / 255.0;
        let da = d[3] as f32 / 255.0;
        let oa = sa + da * (1.0 - sa);
        for c in 0..3 {
            d[c] = round_u8((s[c] as f32 * sa + d[c] as f32 * da * (1.0 - sa)) / oa);
        }
        d[3] = round_u8(oa * 255.0);
    }
}

/// Fill `color` through a coverage mask into `layer`, replacing what is underneath.
fn paint(layer: &mut RgbaImage, mask: &GrayImage, x: i64, y: i64, color: Rgba<u8>) {
    for (mx, my, cov) in mask.enumerate_pixels() {
        let (lx, ly) = (x + mx as i64, y + my as i64);
        if lx < 0 || ly < 0 || lx >= layer.width() as i64 || ly >= layer.height() as i64 {
            continue;
        }
        let c = cov[0] as f32 / 255.0;
        if c == 0.0 {
            continue;
        }
        let px = layer.get_pixel_mut(lx as u32, ly as u32);
        for ch in 0..4 {
            px[ch] = round_u8(color[ch] as f32 * c + px[ch] as f32 * (1.0 - c));
        }
    }
}

/// Caller-rendered RGBA layer anchored bottom-right.
pub struct LayerOverlay {
    layer: RgbaImage,
    config: WatermarkConfig,
}

impl LayerOverlay {
    pub fn new(layer: RgbaImage, config: WatermarkConfig) -> Self {
        Self { layer, config }
    }
}

impl Overlay for LayerOverlay {
    fn apply(&self, mut image: RgbaImage) -> PipelineResult<RgbaImage> {
        let (w, h) = image.dimensions();
        let (lw, lh) = self.layer.dimensions();
        let layout = WatermarkLayout::compute(w, h, lw, lh, &self.config);
        alpha_over(&mut image, &self.layer, layout.x, layout.y);
        Ok(image)
    }
}

/// White text with a faint stepped drop shadow, from a pre-rendered coverage mask.
pub struct WatermarkOverlay {
    mask: GrayImage,
    config: WatermarkConfig,
}

impl WatermarkOverlay {
    pub fn new(mask: GrayImage, config: WatermarkConfig) -> Self {
        Self { mask, config }
    }

    /// Coverage is the alpha channel when present, luma otherwise.
    pub fn from_image(image: &DynamicImage, config: WatermarkConfig) -> Self {
        let mask = if image.color().has_alpha() {
            let rgba = image.to_rgba8();
            GrayImage::from_fn(rgba.width(), rgba.height(), |x, y| {
                image::Luma([rgba.get_pixel(x, y)[3]])
            })
        } else {
            image.to_luma8()
        };
        Self::new(mask, config)
    }

    pub fn from_path(path: &Path, config: WatermarkConfig) -> PipelineResult<Self> {
        let image = image::open(path).map_err(|e| PipelineError::Overlay {
            message: format!("cannot load watermark mask {}: {}", path.display(), e),
        })?;
        Ok(Self::from_image(&image, config))
    }

    /// Mask scaled so its height equals `font_size`.
    fn scaled_mask(&self, font_size: u32) -> GrayImage {
        let (mw, mh) = self.mask.dimensions();
        if mh == font_size || mw == 0 || mh == 0 {
            return self.mask.clone();
        }
        let new_w = ((mw as f64 * font_size as f64 / mh as f64).round() as u32).max(1);
        imageops::resize(&self.mask, new_w, font_size, FilterType::Lanczos3)
    }
}

impl Overlay for WatermarkOverlay {
    fn apply(&self, mut image: RgbaImage) -> PipelineResult<RgbaImage> {
        let (w, h) = image.dimensions();
        let font_size = w / self.config.font_divisor.max(1);
        if font_size == 0 {
            tracing::debug!("Image {}x{} too narrow for a watermark", w, h);
            return Ok(image);
        }

        let mask = self.scaled_mask(font_size);
        let layout = WatermarkLayout::compute(w, h, mask.width(), mask.height(), &self.config);
        tracing::trace!(
            "  Watermark {:?} at ({}, {}), size {}",
            self.config.text,
            layout.x,
            layout.y,
            layout.font_size
        );

        let mut layer = RgbaImage::new(w, h);
        let shadow = Rgba([0, 0, 0, self.config.shadow_alpha]);
        for off in 1..=self.config.shadow_depth as i64 {
            paint(&mut layer, &mask, layout.x + off, layout.y + off, shadow);
        }
        let fill = Rgba([255, 255, 255, self.config.fill_alpha]);
        paint(&mut layer, &mask, layout.x, layout.y, fill);

        alpha_over(&mut image, &layer, 0, 0);
        Ok(image)
    }
}
