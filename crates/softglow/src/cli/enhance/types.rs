//! CLI enum types for the enhance command: report format and bloom preset.

use clap::ValueEnum;
use softglow_core::{BloomPreset, OutputFormat as CoreOutputFormat};

/// Report formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One JSON object, or an array for directories
    Json,
    /// One JSON object per line (newline-delimited)
    Jsonl,
}

impl From<OutputFormat> for CoreOutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => CoreOutputFormat::Json,
            OutputFormat::Jsonl => CoreOutputFormat::JsonLines,
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Jsonl => write!(f, "jsonl"),
        }
    }
}

/// Named bloom strengths.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum BloomPresetArg {
    /// 0.25, the full-pipeline strength
    Pipeline,
    /// 0.4, the standalone glow strength
    Helper,
}

impl From<BloomPresetArg> for BloomPreset {
    fn from(preset: BloomPresetArg) -> Self {
        match preset {
            BloomPresetArg::Pipeline => BloomPreset::Pipeline,
            BloomPresetArg::Helper => BloomPreset::Helper,
        }
    }
}
