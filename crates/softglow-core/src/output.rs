//! JSON and JSONL report output.
//!
//! JSON mode buffers every report and emits them on [`OutputWriter::finish`],
//! as a bare object for a single file and as an array otherwise. JSONL mode
//! streams one object per line as soon as it is written.

use serde::Serialize;
use std::io::{self, Write};

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// One JSON array of all reports
    Json,
    /// One JSON object per line (newline-delimited JSON)
    JsonLines,
}

impl OutputFormat {
    /// Parse format from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "jsonl" | "jsonlines" | "ndjson" => Some(Self::JsonLines),
            _ => None,
        }
    }
}

/// Serializes reports to JSON or JSONL.
pub struct OutputWriter<W: Write> {
    writer: W,
    format: OutputFormat,
    pretty: bool,
    pending: Vec<serde_json::Value>,
    items_written: usize,
}

impl<W: Write> OutputWriter<W> {
    /// `pretty` only affects JSON mode; JSONL is always one line per item.
    pub fn new(writer: W, format: OutputFormat, pretty: bool) -> Self {
        Self {
            writer,
            format,
            pretty,
            pending: Vec::new(),
            items_written: 0,
        }
    }

    pub fn write<T: Serialize>(&mut self, item: &T) -> io::Result<()> {
        match self.format {
            OutputFormat::Json => {
                self.pending
                    .push(serde_json::to_value(item).map_err(io::Error::other)?);
            }
            OutputFormat::JsonLines => {
                serde_json::to_writer(&mut self.writer, item).map_err(io::Error::other)?;
                writeln!(self.writer)?;
            }
        }
        self.items_written += 1;
        Ok(())
    }

    /// Flush buffered JSON output. A single report is written as a bare object.
    pub fn finish(mut self) -> io::Result<W> {
        if self.format == OutputFormat::Json && !self.pending.is_empty() {
            let pending = std::mem::take(&mut self.pending);
            let value = if pending.len() == 1 {
                pending.into_iter().next().unwrap_or_default()
            } else {
                serde_json::Value::Array(pending)
            };
            if self.pretty {
                serde_json::to_writer_pretty(&mut self.writer, &value)
                    .map_err(io::Error::other)?;
            } else {
                serde_json::to_writer(&mut self.writer, &value).map_err(io::Error::other)?;
            }
            writeln!(self.writer)?;
        }
        self.writer.flush()?;
        Ok(self.writer)
    }

    pub fn items_written(&self) -> usize {
        self.items_written
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EnhanceReport, StageTimings};
    use std::path::PathBuf;

    fn report(name: &str) -> EnhanceReport {
        EnhanceReport {
            input: PathBuf::from(format!("{name}.jpg")),
            output: PathBuf::from(format!("{name}_enhanced.jpg")),
            original_width: 500,
            original_height: 333,
            width: 1600,
            height: 1066,
            bloom_intensity: 0.25,
            watermarked: false,
            timings: StageTimings::default(),
            total_ms: 12,
        }
    }

    #[test]
    fn test_jsonl_streams_one_line_per_report() {
        let mut writer = OutputWriter::new(Vec::new(), OutputFormat::JsonLines, false);
        writer.write(&report("a")).unwrap();
        writer.write(&report("b")).unwrap();
        assert_eq!(writer.items_written(), 2);

        let output = String::from_utf8(writer.finish().unwrap()).unwrap();
        let lines: Vec<&str> = output.trim().split('\n').collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("\"input\":\"b.jpg\""));
    }

    #[test]
    fn test_json_single_report_is_object() {
        let mut writer = OutputWriter::new(Vec::new(), OutputFormat::Json, false);
        writer.write(&report("a")).unwrap();
        let output = String::from_utf8(writer.finish().unwrap()).unwrap();
        assert!(output.starts_with('{'));
        assert!(output.contains("\"width\":1600"));
    }

    #[test]
    fn test_json_batch_is_array() {
        let mut writer = OutputWriter::new(Vec::new(), OutputFormat::Json, true);
        writer.write(&report("a")).unwrap();
        writer.write(&report("b")).unwrap();
        let output = String::from_utf8(writer.finish().unwrap()).unwrap();
        let parsed: Vec<EnhanceReport> = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].height, 1066);
    }

    #[test]
    fn test_json_with_nothing_written_is_empty() {
        let writer = OutputWriter::new(Vec::new(), OutputFormat::Json, false);
        assert!(writer.finish().unwrap().is_empty());
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(OutputFormat::parse("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::parse("JSONL"), Some(OutputFormat::JsonLines));
        assert_eq!(OutputFormat::parse("csv"), None);
    }
}
