//! The three batch jobs. Each one enumerates its items, runs them through
//! [`crate::batch::run_batch`] and prints a summary.

pub mod optimize;
pub mod picture;
pub mod widget;

use std::path::{Path, PathBuf};

use crate::error::Result;

/// Pages to process: the explicit `files` when given (missing ones are
/// dropped with a warning), else every match of `pattern` in `root`.
pub fn resolve_pages(root: &Path, pattern: &str, files: &[PathBuf]) -> Result<Vec<PathBuf>> {
    if files.is_empty() {
        return crate::path_utils::resolve_file_patterns(root, &[pattern.to_owned()], true)
    }
    let pages = files
        .iter()
        .map(|file| crate::path_utils::resolve_in(root, file))
        .filter(|path| {
            let exists = path.is_file();
            if !exists {
                tracing::warn!("skipping missing page {path:?}");
            }
            exists
        })
        .collect();
    Ok(pages)
}
