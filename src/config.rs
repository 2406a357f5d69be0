/*!
 * Configuration handling for srcmerge
 */

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use clap::Parser;
use clap_complete::Shell;

use crate::error::Result;
use crate::report::ReportFormat;
use crate::{bail, ensure};

/// Command-line arguments for srcmerge
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "srcmerge",
    version = env!("CARGO_PKG_VERSION"),
    about = "Merge source files into a single Markdown document",
    long_about = "Searches a directory tree for files with matching extensions and concatenates their contents into one Markdown document, suitable as context for Large Language Models (LLMs)."
)]
pub struct Args {
    /// Directory to start the search from
    #[clap(short = 's', long, default_value = ".")]
    pub start_dir: String,

    /// Comma-separated list of directory names to ignore
    #[clap(short = 'i', long = "ignore", value_delimiter = ',')]
    pub ignore_dirs: Vec<String>,

    /// Comma-separated list of file names to ignore
    #[clap(short = 'x', long = "ignore-files", value_delimiter = ',')]
    pub ignore_files: Vec<String>,

    /// Include all file types, disabling the extension filter
    #[clap(short = 'a', long)]
    pub all_types: bool,

    /// Comma-separated list of file extensions to include
    #[clap(
        short = 'e',
        long,
        value_delimiter = ',',
        default_value = ".html,.css,.js,.ejs,.py"
    )]
    pub extensions: Vec<String>,

    /// Base name of the output Markdown file
    #[clap(short = 'n', long, default_value = "project")]
    pub name: String,

    /// Minify file contents before writing them
    #[clap(short = 'm', long)]
    pub minify: bool,

    /// Respect .gitignore files while walking
    #[clap(long)]
    pub respect_gitignore: bool,

    /// Copy the generated document to the system clipboard
    #[clap(long)]
    pub clip: bool,

    /// Format of the run report
    #[clap(long = "report", value_enum, default_value_t = ReportFormat::Table)]
    pub report_format: ReportFormat,

    /// Generate shell completions
    #[clap(long = "generate", value_enum)]
    pub generate: Option<Shell>,
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// Root of the traversal
    pub start_dir: PathBuf,

    /// Directory names pruned at every level
    pub ignore_dirs: HashSet<String>,

    /// File names skipped at every level
    pub ignore_files: HashSet<String>,

    /// Accept every file regardless of extension
    pub all_types: bool,

    /// Extension allow-list, normalized to ".ext" lowercase form
    pub extensions: Vec<String>,

    /// Output file base name
    pub name: String,

    /// Output file path (`<name>.md`)
    pub output_file: PathBuf,

    /// Minify contents before writing
    pub minify: bool,

    /// Honor .gitignore rules while listing directories
    pub respect_gitignore: bool,

    /// Copy the finished document to the clipboard
    pub clip: bool,

    /// Format of the run report
    pub report_format: ReportFormat,
}

impl Config {
    /// Create configuration from command-line arguments
    pub fn from_args(args: Args) -> Self {
        let output_file = PathBuf::from(format!("{}.md", args.name));
        Self {
            start_dir: PathBuf::from(args.start_dir),
            ignore_dirs: args.ignore_dirs.into_iter().collect(),
            ignore_files: args.ignore_files.into_iter().collect(),
            all_types: args.all_types,
            extensions: args
                .extensions
                .iter()
                .map(|ext| normalize_extension(ext))
                .collect(),
            name: args.name,
            output_file,
            minify: args.minify,
            respect_gitignore: args.respect_gitignore,
            clip: args.clip,
            report_format: args.report_format,
        }
    }

    /// Validate the configuration
    ///
    /// Runs before the output file is created, so an invalid run leaves no
    /// partial document behind.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.start_dir.is_dir(),
            Config,
            "Start directory not found: {}",
            self.start_dir.display()
        );
        ensure!(!self.name.is_empty(), Config, "Output name must not be empty");
        if let Some(parent) = self.output_file.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                bail!(Config, "Output directory not found: {}", parent.display());
            }
        }
        Ok(())
    }

    /// Check a file against the extension allow-list
    ///
    /// Case-insensitive suffix match; `all_types` accepts everything.
    pub fn matches_extension(&self, path: &Path) -> bool {
        if self.all_types {
            return true;
        }
        let name = match path.file_name() {
            Some(name) => name.to_string_lossy().to_lowercase(),
            None => return false,
        };
        self.extensions.iter().any(|ext| name.ends_with(ext.as_str()))
    }
}

/// Normalize an extension to ".ext" lowercase form
fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim().to_lowercase();
    if ext.starts_with('.') {
        ext
    } else {
        format!(".{ext}")
    }
}
