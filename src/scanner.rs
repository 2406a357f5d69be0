/*!
 * Directory traversal and file selection
 */

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ignore::WalkBuilder;
use indicatif::ProgressBar;
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::Result;
use crate::report::FileReportInfo;
use crate::writer::{MarkdownWriter, WriteOutcome};

/// Statistics accumulated while writing records
#[derive(Debug, Clone, Default)]
pub struct ScanStatistics {
    /// Number of records written
    pub files_processed: usize,
    /// Number of files skipped (unreadable or not text)
    pub files_skipped: usize,
    /// Total number of lines written
    pub total_lines: usize,
    /// Total number of characters written
    pub total_chars: usize,
    /// Details for each written record
    pub file_details: HashMap<String, FileReportInfo>,
}

/// Remove files whose basename appears in the ignore set
///
/// Exact, case-sensitive match on the basename. Survivor order is
/// preserved, so filtering an already-filtered list changes nothing.
pub fn filter_ignored_files(files: Vec<PathBuf>, ignore_files: &HashSet<String>) -> Vec<PathBuf> {
    files
        .into_iter()
        .filter(|path| {
            path.file_name()
                .map_or(true, |name| !ignore_files.contains(name.to_string_lossy().as_ref()))
        })
        .collect()
}

/// Remove directories whose basename appears in the ignore set
///
/// Same semantics as `filter_ignored_files`, over directory names.
pub fn filter_ignored_dirs(dirs: Vec<PathBuf>, ignore_dirs: &HashSet<String>) -> Vec<PathBuf> {
    dirs.into_iter()
        .filter(|path| {
            path.file_name()
                .map_or(true, |name| !ignore_dirs.contains(name.to_string_lossy().as_ref()))
        })
        .collect()
}

/// Scanner driving the traversal and the writer
pub struct Scanner {
    /// Scanner configuration
    config: Config,
    /// Progress bar
    pub progress: Arc<ProgressBar>,
    /// Scan statistics
    statistics: ScanStatistics,
}

impl Scanner {
    /// Create a new scanner
    pub fn new(config: Config, progress: Arc<ProgressBar>) -> Self {
        Self {
            config,
            progress,
            statistics: ScanStatistics::default(),
        }
    }

    /// Get scan statistics
    pub fn statistics(&self) -> &ScanStatistics {
        &self.statistics
    }

    /// Walk the tree rooted at the configured start directory, writing one
    /// record per accepted file
    pub fn run(&mut self, writer: &mut MarkdownWriter) -> Result<()> {
        let root = self.config.start_dir.clone();
        self.scan_directory(&root, writer)
    }

    /// Process one directory level, then recurse into surviving subdirectories
    fn scan_directory(&mut self, dir: &Path, writer: &mut MarkdownWriter) -> Result<()> {
        let (dirs, files) = self.list_level(dir);
        let dirs = filter_ignored_dirs(dirs, &self.config.ignore_dirs);
        let files = filter_ignored_files(files, &self.config.ignore_files);

        for file in files {
            if self.is_output_file(&file) {
                continue;
            }
            if !self.config.matches_extension(&file) {
                continue;
            }
            self.progress.inc(1);
            self.progress
                .set_message(format!("Current file: {}", display_name(&file)));
            match writer.write_file(&file)? {
                WriteOutcome::Written { lines, chars } => {
                    self.statistics.files_processed += 1;
                    self.statistics.total_lines += lines;
                    self.statistics.total_chars += chars;
                    self.statistics.file_details.insert(
                        file.to_string_lossy().to_string(),
                        FileReportInfo { lines, chars },
                    );
                }
                WriteOutcome::Skipped => self.statistics.files_skipped += 1,
            }
        }

        for sub in dirs {
            self.scan_directory(&sub, writer)?;
        }

        Ok(())
    }

    /// List the immediate children of one directory
    ///
    /// Unreadable entries are reported and skipped; the run continues.
    fn list_level(&self, dir: &Path) -> (Vec<PathBuf>, Vec<PathBuf>) {
        let mut dirs = Vec::new();
        let mut files = Vec::new();

        if self.config.respect_gitignore {
            // Use the ignore crate's walker so .gitignore rules prune
            // entries before the name filters run
            let mut walker = WalkBuilder::new(dir);
            walker.max_depth(Some(1));

            for entry in walker.build() {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        eprintln!("Warning: skipping entry under {}: {}", dir.display(), e);
                        continue;
                    }
                };
                if entry.path() == dir {
                    continue;
                }
                if entry.file_type().map_or(false, |ft| ft.is_dir()) {
                    dirs.push(entry.into_path());
                } else {
                    files.push(entry.into_path());
                }
            }
        } else {
            for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        eprintln!("Warning: skipping entry under {}: {}", dir.display(), e);
                        continue;
                    }
                };
                if entry.file_type().is_dir() {
                    dirs.push(entry.into_path());
                } else {
                    files.push(entry.into_path());
                }
            }
        }

        (dirs, files)
    }

    /// Don't merge the output document into itself
    fn is_output_file(&self, path: &Path) -> bool {
        if path.file_name() != self.config.output_file.file_name() {
            return false;
        }
        match (fs::canonicalize(path), fs::canonicalize(&self.config.output_file)) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }
}

/// File name for the progress message, truncated to keep the line readable
fn display_name(path: &Path) -> String {
    let name = path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    if name.chars().count() <= 40 {
        return name;
    }
    let tail: String = name
        .chars()
        .rev()
        .take(37)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("...{}", tail)
}
