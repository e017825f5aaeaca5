use std::path::{Path, PathBuf};

use crate::backup::{BackupStore, WriteTransaction};
use crate::error::{Error, Result};
use crate::html::{Html, ParserMode};

/// One page, read once at the start of processing.
#[derive(Debug, Clone)]
pub struct Document {
    pub path: PathBuf,
    pub source: String,
}

impl Document {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let source = std::fs::read_to_string(&path).map_err(|source| Error::Read {
            path: path.clone(),
            source,
        })?;
        Ok(Document { path, source })
    }

    /// Backs up the text read by [`Document::load`], then writes `contents`.
    /// Returns the backup path.
    pub fn commit(&self, contents: &str, backups: &BackupStore) -> Result<PathBuf> {
        WriteTransaction::begin(backups, &self.path, &self.source).commit(contents)
    }
}

/// Parses page text into a tree that prints back like the source.
///
/// html5ever appends whitespace that follows `</body>` (and `</html>`) to the
/// end of `<body>`. That text is trimmed back to what preceded `</body>` in
/// the source, and whitespace between `</body>` and `</html>` goes back
/// after the body.
pub fn parse_page(source: &str) -> Html {
    let mut tree = Html::parse(source, ParserMode::Document);
    if let Some(tail) = BodyTail::read(source) {
        tail.restore(&mut tree);
    }
    tree
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct BodyTail {
    /// Whitespace right before `</body>`.
    before_close: String,
    /// Whitespace between `</body>` and `</html>`.
    after_close: String,
}

fn is_space(c: char) -> bool {
    c.is_ascii_whitespace()
}

impl BodyTail {
    fn read(source: &str) -> Option<Self> {
        let lowered = source.to_ascii_lowercase();
        let close = lowered.rfind("</body")?;
        let head = &source[..close];
        let before_close = &head[head.trim_end_matches(is_space).len()..];
        let after_tag = close + lowered[close..].find('>')? + 1;
        let after_close = match lowered[after_tag..].find("</html") {
            Some(end) if source[after_tag..after_tag + end].trim_matches(is_space).is_empty() => {
                &source[after_tag..after_tag + end]
            }
            _ => "",
        };
        Some(BodyTail {
            before_close: before_close.to_owned(),
            after_close: after_close.to_owned(),
        })
    }

    fn restore(&self, tree: &mut Html) {
        let Html::Fragment(nodes) = tree else {
            return
        };
        let Some(html) = nodes.iter_mut().find_map(|node| match node {
            Html::Element(element) if element.has_tag("html") => Some(element),
            _ => None,
        }) else {
            return
        };
        let Some(body_index) = html.children
            .iter()
            .rposition(|node| matches!(node, Html::Element(element) if element.has_tag("body")))
        else {
            return
        };
        let Html::Element(body) = &mut html.children[body_index] else {
            return
        };
        let Some(Html::Text(text)) = body.children.last_mut() else {
            return
        };
        let kept = text.trim_end_matches(is_space).len();
        text.truncate(kept);
        text.push_str(&self.before_close);
        let emptied = text.is_empty();
        if emptied {
            body.children.pop();
        }
        if !self.after_close.is_empty() {
            html.children.insert(body_index + 1, Html::text(self.after_close.clone()));
        }
    }
}

/// Prints a transformed tree as document text. A trailing newline in the
/// original is kept.
pub fn render_document(tree: &Html, original: &str) -> String {
    let mut output = tree.document_string();
    if original.ends_with('\n') && !output.ends_with('\n') {
        output.push('\n');
    }
    output
}
