//! Benchmarks for the softglow enhancement stages.
//!
//! Run with: cargo bench -p softglow-core

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use softglow_core::config::{BloomConfig, DenoiseConfig, EnhanceParams, ResizeConfig, SmoothConfig};
use softglow_core::pipeline::{Bloom, Denoiser, Pipeline, Resizer, Smoother};
use softglow_core::{ChannelOrder, PixelBuffer};

/// Deterministic textured frame.
fn frame(width: u32, height: u32) -> PixelBuffer {
    let mut data = Vec::with_capacity((width * height * 3) as usize);
    for y in 0..height {
        for x in 0..width {
            let v = ((x * 7 + y * 13) % 64) as u8;
            data.extend_from_slice(&[100 + v, 90 + v / 2, 80 + v / 3]);
        }
    }
    PixelBuffer::from_raw(width, height, 3, ChannelOrder::Bgr, data).unwrap()
}

fn benchmark_resize(c: &mut Criterion) {
    let resizer = Resizer::new(ResizeConfig::default());
    let small = frame(800, 600);

    c.bench_function("resize_lanczos_800_to_1600", |b| {
        b.iter(|| resizer.apply(black_box(small.clone())))
    });
}

fn benchmark_denoise(c: &mut Criterion) {
    let denoiser = Denoiser::new(DenoiseConfig::default());
    let img = frame(256, 256);

    c.bench_function("denoise_nlm_256", |b| {
        b.iter(|| denoiser.apply(black_box(img.clone())))
    });
}

fn benchmark_smooth(c: &mut Criterion) {
    let smoother = Smoother::new(SmoothConfig::default());
    let img = frame(512, 512);

    c.bench_function("smooth_domain_transform_512", |b| {
        b.iter(|| smoother.apply(black_box(img.clone())))
    });
}

fn benchmark_bloom(c: &mut Criterion) {
    let bloom = Bloom::new(&BloomConfig::default());
    let img = frame(1600, 1066);

    c.bench_function("bloom_1600", |b| b.iter(|| bloom.apply(black_box(img.clone()))));
}

fn benchmark_full_pipeline(c: &mut Criterion) {
    let mut params = EnhanceParams::default();
    params.resize = ResizeConfig {
        min_width: 256,
        max_width: 256,
    };
    let pipeline = Pipeline::new(&params);
    let img = frame(256, 192);

    let mut group = c.benchmark_group("pipeline");
    group.sample_size(10);
    group.bench_function("full_256", |b| b.iter(|| pipeline.run(black_box(img.clone()))));
    group.finish();
}

criterion_group!(
    benches,
    benchmark_resize,
    benchmark_denoise,
    benchmark_smooth,
    benchmark_bloom,
    benchmark_full_pipeline,
);
criterion_main!(benches);
