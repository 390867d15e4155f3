//! Common utility functions shared across the codebase.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::core::error::PipelineError;

/// Collapses runs of whitespace into single spaces and trims both ends.
///
/// # Examples
///
/// ```
/// use tsctl::utils::simplified;
///
/// assert_eq!(simplified("  Save\n  file.  "), "Save file.");
/// assert_eq!(simplified("\t"), "");
/// ```
pub fn simplified(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Replaces `path` with `content` all at once.
///
/// The data goes to a temporary file in the destination directory first and
/// is renamed over the target only when fully written, so a failure never
/// leaves a truncated file behind.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<(), PipelineError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = NamedTempFile::new_in(dir).map_err(|e| PipelineError::write(path, e))?;
    temp.write_all(content)
        .and_then(|_| temp.flush())
        .map_err(|e| PipelineError::write(path, e))?;
    temp.persist(path)
        .map_err(|e| PipelineError::write(path, e.error))?;
    Ok(())
}

/// Format a count with a singular/plural noun: `1 file`, `2 files`.
pub fn plural(count: usize, singular: &str, plural: &str) -> String {
    format!("{} {}", count, if count == 1 { singular } else { plural })
}
