/*!
 * Utility functions for srcmerge
 */

use std::path::Path;

use ignore::WalkBuilder;
use walkdir::WalkDir;

use crate::config::Config;

/// Count the files the scan will accept, for progress tracking
///
/// Applies the same pruning and acceptance rules as the scanner. The count
/// only sizes the progress bar, so listing errors are simply skipped here.
pub fn count_files(config: &Config) -> u64 {
    let mut count = 0;

    if config.respect_gitignore {
        let ignore_dirs = config.ignore_dirs.clone();
        let mut builder = WalkBuilder::new(&config.start_dir);
        builder.filter_entry(move |entry| {
            if entry.depth() == 0 {
                return true;
            }
            let is_dir = entry.file_type().map_or(false, |ft| ft.is_dir());
            !(is_dir
                && entry
                    .file_name()
                    .to_str()
                    .map_or(false, |name| ignore_dirs.contains(name)))
        });
        for entry in builder.build().filter_map(Result::ok) {
            if entry.file_type().map_or(false, |ft| ft.is_file()) && accepts(config, entry.path())
            {
                count += 1;
            }
        }
    } else {
        let walker = WalkDir::new(&config.start_dir).into_iter();
        for entry in walker
            .filter_entry(|entry| {
                entry.depth() == 0
                    || !(entry.file_type().is_dir()
                        && entry
                            .file_name()
                            .to_str()
                            .map_or(false, |name| config.ignore_dirs.contains(name)))
            })
            .filter_map(Result::ok)
        {
            if entry.file_type().is_file() && accepts(config, entry.path()) {
                count += 1;
            }
        }
    }

    count
}

/// Mirror of the scanner's per-file acceptance checks
fn accepts(config: &Config, path: &Path) -> bool {
    let name = match path.file_name() {
        Some(name) => name.to_string_lossy().to_string(),
        None => return false,
    };
    if config.ignore_files.contains(&name) {
        return false;
    }
    if path.file_name() == config.output_file.file_name() {
        return false;
    }
    config.matches_extension(path)
}

/// Format a human-readable file size
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}
