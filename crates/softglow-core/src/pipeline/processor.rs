//! Pipeline orchestration - wires the six stages together and drives files
//! through decode, enhancement, overlay and encode.

use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::codec;
use crate::config::{Config, EnhanceParams};
use crate::error::{ConfigError, PipelineResult, Result};
use crate::overlay::{apply_overlay, Overlay};
use crate::types::{EnhanceReport, PixelBuffer, StageTimings};

use super::bloom::Bloom;
use super::denoise::Denoiser;
use super::discovery::{DiscoveredFile, FileDiscovery};
use super::grade::ColorGrader;
use super::resize::Resizer;
use super::sharpen::Sharpener;
use super::smooth::Smoother;
use super::validate::Validator;

/// Run `f` and return its result with the elapsed milliseconds.
fn timed<T>(stage: &str, f: impl FnOnce() -> T) -> (T, u64) {
    let start = Instant::now();
    let out = f();
    let elapsed = start.elapsed();
    tracing::trace!("  {}: {:?}", stage, elapsed);
    (out, elapsed.as_millis() as u64)
}

/// Fixed resize → denoise → smooth → grade → sharpen → bloom chain.
pub struct Pipeline {
    resizer: Resizer,
    denoiser: Denoiser,
    smoother: Smoother,
    grader: ColorGrader,
    sharpener: Sharpener,
    bloom: Bloom,
}

impl Pipeline {
    /// Check `params` and build the chain.
    pub fn try_new(params: &EnhanceParams) -> std::result::Result<Self, ConfigError> {
        params.validate()?;
        Ok(Self::new(params))
    }

    /// Build the chain from parameters that already passed
    /// [`EnhanceParams::validate`]. Even window or kernel sizes panic in the
    /// filters; use [`Pipeline::try_new`] for unchecked input.
    pub fn new(params: &EnhanceParams) -> Self {
        Self {
            resizer: Resizer::new(params.resize.clone()),
            denoiser: Denoiser::new(params.denoise.clone()),
            smoother: Smoother::new(params.smooth.clone()),
            grader: ColorGrader::new(params.grade.clone()),
            sharpener: Sharpener::new(params.sharpen.clone()),
            bloom: Bloom::new(&params.bloom),
        }
    }

    /// Override the bloom strength chosen by the config.
    pub fn with_bloom_intensity(mut self, intensity: f32) -> Self {
        self.bloom = self.bloom.with_intensity(intensity);
        self
    }

    /// Cap the resized width and height.
    pub fn with_max_dimension(mut self, max_dimension: u32) -> Self {
        self.resizer = self.resizer.with_max_dimension(max_dimension);
        self
    }

    pub fn bloom_intensity(&self) -> f32 {
        self.bloom.intensity()
    }

    /// Run every stage in order, recording per-stage wall time.
    pub fn run(&self, buf: PixelBuffer) -> PipelineResult<(PixelBuffer, StageTimings)> {
        let (w, h) = buf.dimensions();
        tracing::debug!("Enhancing {}x{} {} buffer", w, h, buf.order());

        let mut timings = StageTimings::default();
        let (resized, ms) = timed("Resize", || self.resizer.apply(buf));
        let buf = resized?;
        timings.resize_ms = ms;

        let (buf, ms) = timed("Denoise", || self.denoiser.apply(buf));
        timings.denoise_ms = ms;
        let (buf, ms) = timed("Smooth", || self.smoother.apply(buf));
        timings.smooth_ms = ms;
        let (buf, ms) = timed("Grade", || self.grader.apply(buf));
        timings.grade_ms = ms;
        let (buf, ms) = timed("Sharpen", || self.sharpener.apply(buf));
        timings.sharpen_ms = ms;
        let (buf, ms) = timed("Bloom", || self.bloom.apply(buf));
        timings.bloom_ms = ms;

        tracing::debug!(
            "Enhanced to {}x{} in {:?}",
            buf.width(),
            buf.height(),
            timings.total()
        );
        Ok((buf, timings))
    }
}

/// File-level driver: validate, decode, enhance, overlay, encode.
pub struct ImageProcessor {
    pipeline: Pipeline,
    validator: Validator,
    discovery: FileDiscovery,
    overlay: Option<Box<dyn Overlay>>,
    jpeg_quality: u8,
    suffix: String,
}

impl ImageProcessor {
    pub fn new(config: &Config) -> Self {
        Self {
            pipeline: Pipeline::new(&config.enhance)
                .with_max_dimension(config.limits.max_image_dimension),
            validator: Validator::new(config.limits.clone()),
            discovery: FileDiscovery::new(config.processing.clone())
                .skipping_suffix(config.output.suffix.clone()),
            overlay: None,
            jpeg_quality: config.output.jpeg_quality,
            suffix: config.output.suffix.clone(),
        }
    }

    pub fn with_overlay(mut self, overlay: Box<dyn Overlay>) -> Self {
        self.overlay = Some(overlay);
        self
    }

    pub fn with_bloom_intensity(mut self, intensity: f32) -> Self {
        self.pipeline = self.pipeline.with_bloom_intensity(intensity);
        self
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Enhance `input` and write the result to `output`.
    pub fn process(&self, input: &Path, output: &Path) -> Result<EnhanceReport> {
        let start = Instant::now();
        tracing::debug!("Processing: {:?}", input);

        self.validator.validate(input)?;
        let (decoded, _) = timed("Decode", || codec::decode_path(input));
        let buf = decoded?;
        self.validator.check_dimensions(input, &buf)?;
        let (original_width, original_height) = buf.dimensions();

        let (buf, timings) = self.pipeline.run(buf)?;

        let buf = match &self.overlay {
            Some(overlay) => timed("Overlay", || apply_overlay(buf, overlay.as_ref())).0?,
            None => buf,
        };

        timed("Encode", || codec::encode_path(&buf, output, self.jpeg_quality)).0?;

        let total_ms = start.elapsed().as_millis() as u64;
        tracing::debug!("Processed {:?} in {}ms", input, total_ms);

        Ok(EnhanceReport {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            original_width,
            original_height,
            width: buf.width(),
            height: buf.height(),
            bloom_intensity: self.pipeline.bloom_intensity(),
            watermarked: self.overlay.is_some(),
            timings,
            total_ms,
        })
    }

    /// Default output location: `<stem><suffix>.jpg` in `out_dir` or beside the input.
    pub fn output_path_for(&self, input: &Path, out_dir: Option<&Path>) -> PathBuf {
        let stem = input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("image");
        let name = format!("{}{}.jpg", stem, self.suffix);
        match out_dir {
            Some(dir) => dir.join(name),
            None => input.with_file_name(name),
        }
    }

    pub fn discover(&self, path: &Path) -> Vec<DiscoveredFile> {
        self.discovery.discover(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResizeConfig;
    use crate::types::ChannelOrder;

    /// Small working range so denoising stays fast in debug builds.
    fn small_config() -> Config {
        let mut config = Config::default();
        config.enhance.resize = ResizeConfig {
            min_width: 48,
            max_width: 96,
        };
        config
    }

    #[test]
    fn test_output_path_for() {
        let processor = ImageProcessor::new(&Config::default());
        assert_eq!(
            processor.output_path_for(Path::new("/photos/ring.png"), None),
            PathBuf::from("/photos/ring_enhanced.jpg")
        );
        assert_eq!(
            processor.output_path_for(Path::new("/photos/ring.png"), Some(Path::new("/out"))),
            PathBuf::from("/out/ring_enhanced.jpg")
        );
    }

    #[test]
    fn test_bloom_override() {
        let pipeline = Pipeline::new(&EnhanceParams::default()).with_bloom_intensity(0.4);
        assert_eq!(pipeline.bloom_intensity(), 0.4);
    }

    #[test]
    fn test_try_new_rejects_even_kernel() {
        let mut params = EnhanceParams::default();
        params.sharpen.mask_blur_kernel = 4;
        assert!(matches!(
            Pipeline::try_new(&params),
            Err(ConfigError::ValidationError(_))
        ));
        assert!(Pipeline::try_new(&EnhanceParams::default()).is_ok());
    }

    #[test]
    fn test_run_reports_final_geometry() {
        let pipeline = Pipeline::new(&small_config().enhance);
        let buf = PixelBuffer::filled(24, 10, ChannelOrder::Bgr, [128, 128, 128]).unwrap();
        let (out, _) = pipeline.run(buf).unwrap();
        assert_eq!(out.dimensions(), (48, 20));
        assert_eq!(out.order(), ChannelOrder::Bgr);
    }

    #[test]
    fn test_process_writes_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.png");
        let output = dir.path().join("in_enhanced.jpg");
        image::RgbImage::from_pixel(24, 16, image::Rgb([120, 110, 100]))
            .save(&input)
            .unwrap();

        let report = ImageProcessor::new(&small_config())
            .process(&input, &output)
            .unwrap();

        assert_eq!((report.original_width, report.original_height), (24, 16));
        assert_eq!((report.width, report.height), (48, 32));
        assert!(!report.watermarked);
        let written = image::open(&output).unwrap();
        assert_eq!((written.width(), written.height()), (48, 32));
    }

    #[test]
    fn test_process_rejects_oversized_working_size() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.png");
        image::RgbImage::from_pixel(24, 16, image::Rgb([120, 110, 100]))
            .save(&input)
            .unwrap();

        let mut config = small_config();
        config.limits.max_image_dimension = 40;
        let err = ImageProcessor::new(&config)
            .process(&input, &dir.path().join("out.jpg"))
            .unwrap_err();
        assert!(matches!(
            err,
            crate::SoftglowError::Pipeline(crate::PipelineError::WorkingSizeTooLarge { .. })
        ));
    }
}
