//! Input checks run before decode and right after it.

use std::io::Read;
use std::path::Path;

use crate::config::LimitsConfig;
use crate::error::PipelineError;
use crate::types::PixelBuffer;

/// Leading bytes of the containers the codec can read.
const SIGNATURES: &[(&str, &[u8])] = &[
    ("jpeg", &[0xFF, 0xD8, 0xFF]),
    ("png", &[0x89, b'P', b'N', b'G']),
    ("gif", b"GIF8"),
    ("bmp", b"BM"),
    ("tiff", &[b'I', b'I', 0x2A, 0x00]),
    ("tiff", &[b'M', b'M', 0x00, 0x2A]),
];

/// Size and format gate for input files.
pub struct Validator {
    limits: LimitsConfig,
}

impl Validator {
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Checks existence, file size and magic bytes without decoding.
    pub fn validate(&self, path: &Path) -> Result<(), PipelineError> {
        if !path.exists() {
            return Err(PipelineError::DecodeFailure {
                path: path.to_path_buf(),
                message: "File not found".to_string(),
            });
        }

        let metadata = std::fs::metadata(path).map_err(|e| PipelineError::DecodeFailure {
            path: path.to_path_buf(),
            message: format!("Cannot read metadata: {}", e),
        })?;

        let max_bytes = self.limits.max_file_size_mb * 1024 * 1024;
        if metadata.len() > max_bytes {
            return Err(PipelineError::FileTooLarge {
                path: path.to_path_buf(),
                size_mb: metadata.len() / (1024 * 1024),
                max_mb: self.limits.max_file_size_mb,
            });
        }

        self.check_magic_bytes(path)
    }

    /// Rejects decoded buffers above the configured dimension limit.
    pub fn check_dimensions(&self, path: &Path, buf: &PixelBuffer) -> Result<(), PipelineError> {
        let (width, height) = buf.dimensions();
        let max_dim = self.limits.max_image_dimension;
        if width > max_dim || height > max_dim {
            return Err(PipelineError::ImageTooLarge {
                path: path.to_path_buf(),
                width,
                height,
                max_dim,
            });
        }
        Ok(())
    }

    fn check_magic_bytes(&self, path: &Path) -> Result<(), PipelineError> {
        let mut file = std::fs::File::open(path).map_err(|e| PipelineError::DecodeFailure {
            path: path.to_path_buf(),
            message: format!("Cannot open file: {}", e),
        })?;

        let mut header = [0u8; 12];
        let bytes_read = file.read(&mut header).unwrap_or(0);

        if bytes_read < 4 {
            return Err(PipelineError::DecodeFailure {
                path: path.to_path_buf(),
                message: "File too small to be a valid image".to_string(),
            });
        }

        if sniff_format(&header[..bytes_read]).is_none() {
            return Err(PipelineError::DecodeFailure {
                path: path.to_path_buf(),
                message: "Unrecognized image format (invalid magic bytes)".to_string(),
            });
        }
        Ok(())
    }
}

/// Container name for a file header, if recognized.
pub fn sniff_format(header: &[u8]) -> Option<&'static str> {
    if let Some((name, _)) = SIGNATURES.iter().find(|(_, sig)| header.starts_with(sig)) {
        return Some(name);
    }
    // RIFF....WEBP
    if header.len() >= 12 && header.starts_with(b"RIFF") && &header[8..12] == b"WEBP" {
        return Some("webp");
    }
    None
}
