//! The `softglow enhance` command.

mod batch;
mod setup;
pub mod types;

pub use types::{BloomPresetArg, OutputFormat};

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use clap::Args;
use softglow_core::{Config, OutputWriter};

use batch::process_batch;
use setup::{report_format, setup_enhancer};

/// Arguments for the `enhance` command.
#[derive(Args, Debug)]
pub struct EnhanceArgs {
    /// Photo or directory of photos to enhance
    #[arg(required = true)]
    pub input: PathBuf,

    /// Output file (single input) or directory (directory input).
    /// Defaults to `<name>_enhanced.jpg` beside each input.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write reports to this file instead of stdout
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Report format (defaults to `[output].format`)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Named bloom strength
    #[arg(long, value_enum)]
    pub bloom_preset: Option<BloomPresetArg>,

    /// Explicit bloom strength; overrides the preset
    #[arg(long)]
    pub intensity: Option<f32>,

    /// JPEG quality (1-100)
    #[arg(short, long)]
    pub quality: Option<u8>,

    /// Pre-rendered watermark text mask (PNG with alpha, or white on black)
    #[arg(long, conflicts_with = "no_watermark")]
    pub watermark: Option<PathBuf>,

    /// Skip the watermark even if one is configured
    #[arg(long)]
    pub no_watermark: bool,
}

/// Execute the enhance command.
pub fn execute(args: EnhanceArgs, config: Config) -> anyhow::Result<()> {
    let format = report_format(&args, &config);
    let pretty = config.output.pretty;
    let enhancer = setup_enhancer(config, &args)?;

    let files = enhancer.processor().discover(&args.input);
    if files.is_empty() {
        tracing::warn!("No supported image files found at {:?}", args.input);
        return Ok(());
    }

    let sink: Box<dyn Write> = match &args.report {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout().lock()),
    };
    let mut writer = OutputWriter::new(sink, format, pretty);

    if args.input.is_file() {
        let output = args
            .output
            .clone()
            .unwrap_or_else(|| enhancer.processor().output_path_for(&args.input, None));
        let report = enhancer.enhance_file(&args.input, &output)?;
        writer.write(&report)?;
    } else {
        tracing::info!("Found {} image(s) to enhance", files.len());
        process_batch(&enhancer, &args, &files, &mut writer)?;
    }

    writer.finish()?;
    if let Some(path) = &args.report {
        tracing::info!("Reports written to {:?}", path);
    }
    Ok(())
}
