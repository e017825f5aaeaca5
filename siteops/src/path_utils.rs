use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};

use crate::error::Result;

/// Returns true if a link is an external URL and should not be rewritten.
///
/// # Example
///
/// ```rust
/// use siteops::path_utils::is_external_url;
///
/// assert!(is_external_url("https://example.com"));
/// assert!(is_external_url("//cdn.example.com/lib.css"));
/// assert!(is_external_url("mailto:hi@example.com"));
/// assert!(!is_external_url("pages/page1.html"));
/// ```
pub fn is_external_url(href: &str) -> bool {
    let lowered = href.trim().to_ascii_lowercase();
    lowered.starts_with("http://")
        || lowered.starts_with("https://")
        || lowered.starts_with("//")
        || lowered.starts_with("mailto:")
        || lowered.starts_with("data:")
        || lowered.starts_with("#")
}

/// Lists the regular files directly inside `directory` whose names match any of
/// the given unix style patterns (`*.html`). Not recursive; sorted.
pub fn resolve_file_patterns(
    directory: impl AsRef<Path>,
    patterns: &[String],
    case_sensitive: bool,
) -> Result<Vec<PathBuf>> {
    let directory = directory.as_ref();
    let base = Pattern::escape(&directory.to_string_lossy());
    let options = MatchOptions {
        case_sensitive,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    };
    let mut results = BTreeSet::<PathBuf>::new();
    for pattern in patterns {
        let full_pattern = format!("{base}/{pattern}");
        for entry in glob::glob_with(&full_pattern, options)? {
            let path = entry?;
            if path.is_file() {
                results.insert(path);
            }
        }
    }
    Ok(results.into_iter().collect())
}

/// Resolves `path` against `root` unless it is already absolute.
pub fn resolve_in(root: impl AsRef<Path>, path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    if path.is_absolute() {
        return path_clean::clean(path)
    }
    path_clean::clean(root.as_ref().join(path))
}

/// File name for console output.
pub fn display_name(path: impl AsRef<Path>) -> String {
    let path = path.as_ref();
    path.file_name()
        .map(|x| x.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}
