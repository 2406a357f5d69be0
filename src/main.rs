/*!
 * Command-line interface for srcmerge
 */

use std::fs;
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::{CommandFactory, Parser};
use clap_complete::generate;
use indicatif::{ProgressBar, ProgressStyle};

use srcmerge::clipboard;
use srcmerge::config::{Args, Config};
use srcmerge::error::Result;
use srcmerge::report::{Reporter, ScanReport};
use srcmerge::scanner::Scanner;
use srcmerge::utils::count_files;
use srcmerge::writer::MarkdownWriter;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    if let Some(shell) = args.generate {
        generate(shell, &mut Args::command(), "srcmerge", &mut io::stdout());
        return Ok(());
    }

    // Create and validate configuration before the output file is touched
    let config = Config::from_args(args);
    config.validate()?;

    // Create progress bar
    let progress = ProgressBar::new(0);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} {wide_msg:.dim.white} {pos}/{len} ({percent}%)")
            .unwrap(),
    );
    progress.enable_steady_tick(Duration::from_millis(100));
    progress.set_prefix("📊 Merging");
    progress.set_message(format!(
        "📂 Scanning directory: {}",
        config.start_dir.display()
    ));

    // Count files for progress tracking
    let total_files = count_files(&config);
    progress.set_length(total_files);

    let start_time = Instant::now();

    // Open the output document, walk the tree, close the document
    let mut writer = MarkdownWriter::create(&config)?;
    let mut scanner = Scanner::new(config.clone(), Arc::new(progress.clone()));
    scanner.run(&mut writer)?;
    writer.finish()?;

    let duration = start_time.elapsed();
    progress.finish_and_clear();

    // Prepare and print the run report
    let stats = scanner.statistics().clone();
    let output_size = fs::metadata(&config.output_file).map(|m| m.len()).unwrap_or(0);
    let report = ScanReport {
        output_file: config.output_file.display().to_string(),
        output_size,
        duration,
        files_processed: stats.files_processed,
        files_skipped: stats.files_skipped,
        total_lines: stats.total_lines,
        total_chars: stats.total_chars,
        file_details: stats.file_details,
    };
    Reporter::new(config.report_format).print_report(&report);

    // Hand the finished document to the clipboard if requested; failure
    // here never fails the run
    if config.clip {
        match fs::read_to_string(&config.output_file) {
            Ok(document) => match clipboard::copy_to_clipboard(&document) {
                Ok(()) => println!("📎 Copied {} to clipboard", config.output_file.display()),
                Err(e) => eprintln!("Warning: failed to copy to clipboard: {}", e),
            },
            Err(e) => eprintln!(
                "Warning: failed to re-read {}: {}",
                config.output_file.display(),
                e
            ),
        }
    }

    Ok(())
}
