//! `<img>` → `<picture>` migration: attribute extraction, the rewrite itself,
//! and the whole-document scan.

pub mod attributes;
pub mod rewrite;

use crate::document::{parse_page, render_document};
use crate::html_pass::picture::PictureScope;
use crate::manifest::PictureSettings;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOutcome {
    /// The rewritten document; `None` when nothing was converted.
    pub output: Option<String>,
    /// File names of the converted images, in document order.
    pub converted: Vec<String>,
    /// Matching images that were already inside a `<picture>`.
    pub already_wrapped: usize,
}

impl ScanOutcome {
    pub fn converted_count(&self) -> usize {
        self.converted.len()
    }
}

pub fn scan_document(source: &str, rules: &PictureSettings) -> ScanOutcome {
    let tree = parse_page(source);
    let state = tree.picture_pass(&PictureScope::new(rules));
    let converted = state.aggregator.converted_assets();
    let already_wrapped = state.aggregator.already_wrapped();
    let output = (!converted.is_empty()).then(|| render_document(&state.value, source));
    ScanOutcome { output, converted, already_wrapped }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "<!DOCTYPE html>
<html lang=\"en\">
<head>
    <title>Partners</title>
</head>
<body>
    <div class=\"clients\">
        <picture>
            <source srcset=\"images/kolimg/clients/1.webp\" type=\"image/webp\">
            <img src=\"images/kolimg/clients/1.png\" alt=\"One\">
        </picture>
        <img src=\"images/kolimg/clients/2.png\" alt=\"Two\">
        <img src=\"https://via.placeholder.com/150.png\" alt=\"Soon\">
    </div>
</body>
</html>
";

    #[test]
    fn converts_only_the_bare_element() {
        let outcome = scan_document(PAGE, &PictureSettings::default());
        assert_eq!(outcome.converted, vec![String::from("2.png")]);
        assert_eq!(outcome.already_wrapped, 1);
        let output = outcome.output.unwrap();
        assert!(output.starts_with("<!DOCTYPE html>\n<html lang=\"en\">"));
        assert_eq!(output.matches("<picture>").count(), 2);
        assert_eq!(output.matches("images/kolimg/clients/1.webp").count(), 1);
        assert!(output.contains(concat!(
            "<picture>\n",
            "    <source srcset=\"images/kolimg/clients/2.webp\" type=\"image/webp\">\n",
            "    <img src=\"images/kolimg/clients/2.png\" alt=\"Two\">\n",
            "</picture>",
        )));
        assert!(output.contains(r#"<img src="https://via.placeholder.com/150.png" alt="Soon">"#));
    }

    #[test]
    fn scanning_is_idempotent() {
        let rules = PictureSettings::default();
        let first = scan_document(PAGE, &rules).output.unwrap();
        let second = scan_document(&first, &rules);
        assert_eq!(second.output, None);
        assert_eq!(second.converted_count(), 0);
        assert_eq!(second.already_wrapped, 2);
    }

    #[test]
    fn legacy_doctype_survives_the_rewrite() {
        let source = concat!(
            "<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.0 Transitional//EN\" ",
            "\"http://www.w3.org/TR/xhtml1/DTD/xhtml1-transitional.dtd\">\n",
            "<html><head></head><body><img src=\"images/kolimg/a.png\" alt=\"A\"></body></html>\n",
        );
        let output = scan_document(source, &PictureSettings::default()).output.unwrap();
        assert!(output.starts_with(concat!(
            "<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.0 Transitional//EN\" ",
            "\"http://www.w3.org/TR/xhtml1/DTD/xhtml1-transitional.dtd\">\n<html>",
        )));
    }

    #[test]
    fn page_without_targets_is_left_alone() {
        let outcome = scan_document("<html><body><img src=\"img/logo.png\"></body></html>", &PictureSettings::default());
        assert_eq!(outcome.output, None);
        assert!(outcome.converted.is_empty());
    }
}
