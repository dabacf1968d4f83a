//! Container decode/encode through the `image` crate.
//!
//! Decoding always yields a 3-channel RGB buffer: grayscale is expanded and
//! alpha is dropped. Encoding writes JPEG for `.jpg`/`.jpeg` targets and
//! lets `image` pick the container from the extension otherwise.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageFormat, ImageReader, RgbImage};

use crate::error::{PipelineError, PipelineResult};
use crate::types::{ChannelOrder, PixelBuffer, CHANNELS};

/// Decode an image file into an RGB-ordered buffer.
pub fn decode_path(path: &Path) -> PipelineResult<PixelBuffer> {
    let decode_err = |message: String| PipelineError::DecodeFailure {
        path: path.to_path_buf(),
        message,
    };

    let reader = ImageReader::open(path)
        .map_err(|e| decode_err(format!("Cannot open file: {e}")))?
        .with_guessed_format()
        .map_err(|e| decode_err(format!("Cannot detect image format: {e}")))?;
    let image = reader.decode().map_err(|e| decode_err(e.to_string()))?;

    let rgb = image.into_rgb8();
    let (width, height) = rgb.dimensions();
    PixelBuffer::from_raw(width, height, CHANNELS, ChannelOrder::Rgb, rgb.into_raw())
}

/// Encode `buf` to `path`. JPEG output uses `quality` with full-resolution chroma.
pub fn encode_path(buf: &PixelBuffer, path: &Path, quality: u8) -> PipelineResult<()> {
    let encode_err = |message: String| PipelineError::Encode {
        path: path.to_path_buf(),
        message,
    };

    let (width, height) = buf.dimensions();
    let rgb = buf.clone().into_order(ChannelOrder::Rgb);
    let format = ImageFormat::from_path(path).map_err(|e| encode_err(e.to_string()))?;

    match format {
        ImageFormat::Jpeg => {
            let file = File::create(path).map_err(|e| encode_err(e.to_string()))?;
            let mut writer = BufWriter::new(file);
            JpegEncoder::new_with_quality(&mut writer, quality)
                .write_image(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)
                .map_err(|e| encode_err(e.to_string()))?;
            writer.flush().map_err(|e| encode_err(e.to_string()))?;
        }
        other => {
            let image = RgbImage::from_raw(width, height, rgb.into_raw()).ok_or_else(|| {
                encode_err(format!("{width}x{height} buffer has the wrong length"))
            })?;
            image
                .save_with_format(path, other)
                .map_err(|e| encode_err(e.to_string()))?;
        }
    }

    tracing::info!("Wrote {:?} ({}x{})", path, width, height);
    Ok(())
}
