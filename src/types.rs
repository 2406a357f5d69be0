/*!
 * File type classification for srcmerge
 */

use std::path::Path;

use strum::{Display, EnumIter, EnumProperty};

/// Logical category of a file, derived from its extension
///
/// The tag selects the minifier applied to a file's contents and the
/// code-fence language hint used when the file is written into the output
/// document. Classification never inspects file contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumProperty)]
#[strum(serialize_all = "kebab-case")]
pub enum FileTypeTag {
    /// HTML documents
    #[strum(props(fence = "html"))]
    Markup,
    /// CSS stylesheets
    #[strum(props(fence = "css"))]
    Stylesheet,
    /// JavaScript sources
    #[strum(props(fence = "javascript"))]
    Script,
    /// EJS templates
    #[strum(props(fence = "ejs"))]
    TemplatedMarkup,
    /// Python sources
    #[strum(props(fence = "python"))]
    ScriptVariant,
    /// Everything else
    Unknown,
}

impl FileTypeTag {
    /// Classify a path by its final extension
    ///
    /// Total function: a missing or unmatched extension yields `Unknown`,
    /// never an error.
    pub fn classify(path: &Path) -> Self {
        let ext = match path.extension() {
            Some(ext) => ext.to_string_lossy().to_lowercase(),
            None => return Self::Unknown,
        };
        match ext.as_str() {
            "html" | "htm" => Self::Markup,
            "css" => Self::Stylesheet,
            "js" | "mjs" | "cjs" => Self::Script,
            "ejs" => Self::TemplatedMarkup,
            "py" => Self::ScriptVariant,
            _ => Self::Unknown,
        }
    }

    /// Code-fence language hint for this tag, if it has one
    pub fn fence(&self) -> Option<&'static str> {
        self.get_str("fence")
    }
}

/// Fence hint for a path: the tag's hint, or the file's own extension for
/// files outside the classification table
pub fn fence_hint(path: &Path) -> String {
    match FileTypeTag::classify(path).fence() {
        Some(fence) => fence.to_string(),
        None => path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default(),
    }
}
