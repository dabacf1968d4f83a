//! Turn CLI flags and config into a ready `Enhancer`.

use softglow_core::{Config, Enhancer, OutputFormat as CoreOutputFormat};

use super::EnhanceArgs;
use crate::cli::expand_path;

/// Fold command-line overrides into the loaded config.
pub fn apply_overrides(mut config: Config, args: &EnhanceArgs) -> Config {
    if let Some(preset) = args.bloom_preset {
        config.enhance.bloom.preset = preset.into();
        config.enhance.bloom.intensity = None;
    }
    if let Some(intensity) = args.intensity {
        config.enhance.bloom.intensity = Some(intensity);
    }
    if let Some(quality) = args.quality {
        config.output.jpeg_quality = quality;
    }
    if let Some(mask) = &args.watermark {
        config.watermark.enabled = true;
        config.watermark.mask = Some(expand_path(mask));
    }
    if args.no_watermark {
        config.watermark.enabled = false;
    }
    config
}

/// Report format from the flag, falling back to `[output].format`.
pub fn report_format(args: &EnhanceArgs, config: &Config) -> CoreOutputFormat {
    match args.format {
        Some(format) => format.into(),
        None => CoreOutputFormat::parse(&config.output.format).unwrap_or_else(|| {
            tracing::warn!(
                "Unknown output.format {:?} in config, using jsonl",
                config.output.format
            );
            CoreOutputFormat::JsonLines
        }),
    }
}

pub fn setup_enhancer(config: Config, args: &EnhanceArgs) -> anyhow::Result<Enhancer> {
    let config = apply_overrides(config, args);
    if args.intensity.is_some_and(|k| !(k.is_finite() && k >= 0.0)) {
        anyhow::bail!("--intensity must be a finite value >= 0");
    }
    if args.quality.is_some_and(|q| q == 0 || q > 100) {
        anyhow::bail!("--quality must be between 1 and 100");
    }

    tracing::debug!(
        "Bloom {:?} at {}, watermark {}",
        config.enhance.bloom.preset,
        config.enhance.bloom.intensity(),
        if config.watermark.enabled { "on" } else { "off" }
    );
    Ok(Enhancer::new(config)?)
}
