/*!
 * Markdown writer implementation for srcmerge
 */

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::config::Config;
use crate::error::Result;
use crate::minify;
use crate::types::{fence_hint, FileTypeTag};

/// Result of handing one file to the writer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// A record was appended
    Written {
        /// Lines in the written contents
        lines: usize,
        /// Characters in the written contents
        chars: usize,
    },
    /// The file was skipped (unreadable or not text)
    Skipped,
}

/// Markdown writer for merged file contents
///
/// Owns the output document for the duration of one run: created once
/// (truncating any previous file), appended to per record, flushed once.
pub struct MarkdownWriter {
    out: BufWriter<File>,
    minify_enabled: bool,
}

impl MarkdownWriter {
    /// Create the output document and write its title
    pub fn create(config: &Config) -> Result<Self> {
        let file = File::create(&config.output_file)?;
        let mut out = BufWriter::new(file);
        writeln!(out, "# {}\n", config.name)?;
        Ok(Self {
            out,
            minify_enabled: config.minify,
        })
    }

    /// Append one record: a path header followed by a fenced code block
    ///
    /// Unreadable or non-UTF-8 files are skipped with a warning; a failing
    /// minifier falls back to the raw contents. Neither aborts the run;
    /// only a write failure on the output document itself does.
    pub fn write_file(&mut self, path: &Path) -> Result<WriteOutcome> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                eprintln!("Warning: skipping {}: {}", path.display(), e);
                return Ok(WriteOutcome::Skipped);
            }
        };
        let contents = match String::from_utf8(bytes) {
            Ok(contents) => contents,
            Err(_) => {
                eprintln!("Warning: skipping {}: not valid UTF-8 text", path.display());
                return Ok(WriteOutcome::Skipped);
            }
        };

        let tag = FileTypeTag::classify(path);
        let contents = if self.minify_enabled {
            match minify::minify(&contents, tag) {
                Ok(minified) => minified,
                Err(e) => {
                    eprintln!("Warning: writing {} unminified: {}", path.display(), e);
                    contents
                }
            }
        } else {
            contents
        };

        let lines = contents.lines().count();
        let chars = contents.chars().count();

        writeln!(self.out, "## {}\n", path.display())?;
        writeln!(self.out, "```{}", fence_hint(path))?;
        writeln!(self.out, "{}", contents)?;
        writeln!(self.out, "```")?;
        writeln!(self.out)?;

        Ok(WriteOutcome::Written { lines, chars })
    }

    /// Flush the document
    pub fn finish(mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}
