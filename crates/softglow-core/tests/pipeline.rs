//! End-to-end checks of the enhancement pipeline through the public API.

use image::{GrayImage, Luma, Rgb, RgbImage};
use softglow_core::color::{lab8_to_rgb, rgb_to_lab8};
use softglow_core::config::{EnhanceParams, GradeConfig, ResizeConfig};
use softglow_core::pipeline::{ColorGrader, Pipeline, ResizeDirection, Resizer};
use softglow_core::{ChannelOrder, Config, Enhancer, PipelineError, PixelBuffer, SoftglowError};

/// Working range that leaves small test images at their own size.
fn keep_size(min_width: u32, max_width: u32) -> EnhanceParams {
    EnhanceParams {
        resize: ResizeConfig {
            min_width,
            max_width,
        },
        ..EnhanceParams::default()
    }
}

fn textured(width: u32, height: u32, order: ChannelOrder) -> PixelBuffer {
    let mut data = Vec::new();
    for y in 0..height {
        for x in 0..width {
            let ring = if (x as i32 - 32).pow(2) + (y as i32 - 24).pow(2) < 100 {
                90
            } else {
                0
            };
            let rgb = [
                (120 + ring + (x * 3 % 17)) as u8,
                (100 + (y * 5 % 13)) as u8,
                (90 + ring / 2) as u8,
            ];
            let mut px = [0u8; 3];
            order.write_rgb(&mut px, rgb);
            data.extend_from_slice(&px);
        }
    }
    PixelBuffer::from_raw(width, height, 3, order, data).unwrap()
}

#[test]
fn uniform_gray_stays_uniform_and_matches_stage_math() {
    let buf = PixelBuffer::filled(200, 100, ChannelOrder::Bgr, [128, 128, 128]).unwrap();
    let pipeline = Pipeline::new(&keep_size(100, 300));

    let (out, _) = pipeline.run(buf).unwrap();

    assert_eq!(out.dimensions(), (200, 100));
    assert!(out.is_uniform());

    // Flat input: denoise is the color round trip, smoothing and sharpening
    // are identities, bloom adds `intensity` times the value.
    let denoised = lab8_to_rgb(rgb_to_lab8([128, 128, 128]));
    let graded = ColorGrader::new(GradeConfig::default()).grade_rgb(denoised);
    let expected = graded.map(|v| (v as f32 + v as f32 * 0.25).round().min(255.0) as u8);
    assert_eq!(out.rgb_at(0, 0), expected);
    assert_eq!(out.rgb_at(199, 99), expected);
}

#[test]
#[ignore = "full-resolution denoise; run with --release -- --ignored"]
fn uniform_gray_with_default_params() {
    let buf = PixelBuffer::filled(200, 100, ChannelOrder::Rgb, [128, 128, 128]).unwrap();
    let pipeline = Pipeline::try_new(&EnhanceParams::default()).unwrap();

    let (out, _) = pipeline.run(buf).unwrap();

    // 200 -> 1600 through the Lanczos path, height by the same factor.
    assert_eq!(out.dimensions(), (1600, 800));
    assert!(out.is_uniform());

    let denoised = lab8_to_rgb(rgb_to_lab8([128, 128, 128]));
    let graded = ColorGrader::new(GradeConfig::default()).grade_rgb(denoised);
    let expected = graded.map(|v| (v as f32 + v as f32 * 0.25).round().min(255.0) as u8);
    assert_eq!(out.rgb_at(0, 0), expected);
    assert_eq!(out.rgb_at(1599, 799), expected);
    assert_eq!(expected, [199, 189, 195]);
}

#[test]
fn widths_land_in_working_range() {
    let resizer = Resizer::new(ResizeConfig::default());
    assert_eq!(resizer.plan(500, 400), (ResizeDirection::Upscale, 1600, 1280));
    assert_eq!(resizer.plan(4000, 2000), (ResizeDirection::Downscale, 3000, 1500));
    assert_eq!(resizer.plan(2000, 1000), (ResizeDirection::Unchanged, 2000, 1000));

    let up = resizer
        .apply(PixelBuffer::filled(500, 2, ChannelOrder::Rgb, [9, 9, 9]).unwrap())
        .unwrap();
    assert_eq!(up.dimensions(), (1600, 6));
    let down = resizer
        .apply(PixelBuffer::filled(4000, 4, ChannelOrder::Rgb, [9, 9, 9]).unwrap())
        .unwrap();
    assert_eq!(down.dimensions(), (3000, 3));
}

#[test]
fn channel_order_does_not_change_the_look() {
    let pipeline = Pipeline::new(&keep_size(32, 128));
    let (rgb, _) = pipeline.run(textured(64, 48, ChannelOrder::Rgb)).unwrap();
    let (bgr, _) = pipeline.run(textured(64, 48, ChannelOrder::Bgr)).unwrap();

    assert_eq!(bgr.order(), ChannelOrder::Bgr);
    for y in 0..48 {
        for x in 0..64 {
            assert_eq!(rgb.rgb_at(x, y), bgr.rgb_at(x, y), "at ({x}, {y})");
        }
    }
}

#[test]
fn output_is_brighter_and_warmer() {
    let pipeline = Pipeline::new(&keep_size(32, 128));
    let input = textured(64, 48, ChannelOrder::Rgb);
    let (out, _) = pipeline.run(input.clone()).unwrap();

    let mean = |buf: &PixelBuffer, c: usize| {
        let raw = buf.as_raw();
        raw.iter().skip(c).step_by(3).map(|&v| v as f64).sum::<f64>() / (raw.len() / 3) as f64
    };
    for c in 0..3 {
        assert!(mean(&out, c) > mean(&input, c), "channel {c} got darker");
    }
    assert!(mean(&out, 0) - mean(&input, 0) > mean(&out, 1) - mean(&input, 1));
}

#[test]
fn enhance_file_with_watermark() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("ring.png");
    let mask = dir.path().join("mark.png");
    let output = dir.path().join("ring_enhanced.jpg");

    RgbImage::from_pixel(112, 80, Rgb([150, 120, 110]))
        .save(&input)
        .unwrap();
    GrayImage::from_pixel(20, 4, Luma([255])).save(&mask).unwrap();

    let mut config = Config::default();
    config.enhance = keep_size(64, 128);
    config.watermark.mask = Some(mask);

    let enhancer = Enhancer::new(config).unwrap();
    let report = enhancer.enhance_file(&input, &output).unwrap();

    assert!(report.watermarked);
    assert_eq!((report.width, report.height), (112, 80));
    assert_eq!(report.bloom_intensity, 0.25);
    assert!(output.exists());

    let json = serde_json::to_string(&report).unwrap();
    assert!(json.contains("\"watermarked\":true"));
}

#[test]
fn missing_input_is_reported_not_panicked() {
    let enhancer = Enhancer::new(Config::default()).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let result = enhancer.enhance_file(&dir.path().join("nope.jpg"), &dir.path().join("out.jpg"));
    assert!(matches!(
        result,
        Err(SoftglowError::Pipeline(PipelineError::DecodeFailure { .. }))
    ));
    assert!(!dir.path().join("out.jpg").exists());
}
