use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::trace;

/// An image found in the images directory, not yet joined with its prompts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageCandidate {
    /// Absolute path to the image file
    pub path: PathBuf,

    /// File name as listed in the images directory
    pub file_name: String,

    /// File name without its extension, shared with the companion files
    pub base_name: String,
}

impl ImageCandidate {
    /// Builds a candidate from a directory entry if its name carries one of
    /// `extensions`.
    ///
    /// Returns `None` for everything that is not a recognized image.
    #[must_use]
    pub fn from_path(path: &Path, extensions: &[String]) -> Option<Self> {
        let file_name = path.file_name()?.to_str()?;
        if !has_image_extension(file_name, extensions) {
            return None;
        }

        Some(Self {
            path: path.to_path_buf(),
            file_name: file_name.to_string(),
            base_name: base_name(file_name).to_string(),
        })
    }
}

/// Case-insensitive suffix test of `.<ext>` against the file name.
///
/// `extensions` must already be lowercase without the leading dot.
#[must_use]
pub(crate) fn has_image_extension(file_name: &str, extensions: &[String]) -> bool {
    let lower = file_name.to_lowercase();
    extensions.iter().any(|ext| {
        lower
            .strip_suffix(ext.as_str())
            .is_some_and(|rest| rest.ends_with('.'))
    })
}

/// Strips the last extension from a file name.
///
/// A leading dot alone does not start an extension, so `.png` is its own
/// base name while `a.b.png` becomes `a.b`.
#[must_use]
pub(crate) fn base_name(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(idx) if file_name[..idx].chars().any(|c| c != '.') => &file_name[..idx],
        _ => file_name,
    }
}

/// Reads a prompt file as UTF-8 and trims surrounding whitespace.
///
/// # Errors
///
/// Returns [`Error::InvalidUtf8`] when the content is not valid UTF-8 and
/// [`Error::Io`] for every other read failure.
pub(crate) fn read_prompt(path: &Path) -> Result<String> {
    trace!("Reading prompt: {}", path.display());

    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::InvalidData {
            Error::invalid_utf8(path)
        } else {
            Error::io(path, e)
        }
    })?;

    Ok(content.trim().to_string())
}
