//! Directory runs: progress bar, per-file output paths and log-and-skip failures.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use softglow_core::pipeline::DiscoveredFile;
use softglow_core::{Enhancer, OutputWriter};

use super::EnhanceArgs;

/// Enhance every discovered file; failures are logged and skipped.
pub fn process_batch<W: Write>(
    enhancer: &Enhancer,
    args: &EnhanceArgs,
    files: &[DiscoveredFile],
    writer: &mut OutputWriter<W>,
) -> anyhow::Result<()> {
    if let Some(dir) = &args.output {
        std::fs::create_dir_all(dir)?;
    }

    let progress = create_progress_bar(files.len() as u64);
    let mut succeeded: u64 = 0;
    let mut failed: u64 = 0;
    let start_time = Instant::now();

    for file in files {
        let output = target_path(enhancer, &args.input, &file.path, args.output.as_deref());
        if let Some(parent) = output.parent() {
            std::fs::create_dir_all(parent)?;
        }

        match enhancer.enhance_file(&file.path, &output) {
            Ok(report) => {
                succeeded += 1;
                writer.write(&report)?;
            }
            Err(e) => {
                failed += 1;
                progress.suspend(|| tracing::error!("Failed: {:?} - {}", file.path, e));
            }
        }

        progress.inc(1);
        let elapsed = start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            let rate = (succeeded + failed) as f64 / elapsed;
            progress.set_message(format!("{:.2} img/sec", rate));
        }
    }

    progress.finish_and_clear();
    print_summary(succeeded, failed, start_time.elapsed());
    Ok(())
}

/// Output path for `file` found under `root`. With an output directory the
/// input's sub-directory layout is mirrored inside it.
fn target_path(enhancer: &Enhancer, root: &Path, file: &Path, out_dir: Option<&Path>) -> PathBuf {
    let processor = enhancer.processor();
    match out_dir {
        Some(dir) => {
            let rel_parent = file
                .strip_prefix(root)
                .ok()
                .and_then(|rel| rel.parent())
                .unwrap_or_else(|| Path::new(""));
            processor.output_path_for(file, Some(&dir.join(rel_parent)))
        }
        None => processor.output_path_for(file, None),
    }
}

fn create_progress_bar(total: u64) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
    pb.set_style(style);
    pb.set_message("starting...");
    pb
}

fn print_summary(succeeded: u64, failed: u64, elapsed: Duration) {
    let total = succeeded + failed;
    let rate = if elapsed.as_secs_f64() > 0.0 {
        succeeded as f64 / elapsed.as_secs_f64()
    } else {
        0.0
    };

    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Enhanced:     {:>8}", succeeded);
    if failed > 0 {
        eprintln!("    Failed:       {:>8}", failed);
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Total:        {:>8}", total);
    eprintln!("    Duration:     {:>7.1}s", elapsed.as_secs_f64());
    eprintln!("    Rate:         {:>7.2} img/sec", rate);
    eprintln!("  ====================================");
}
