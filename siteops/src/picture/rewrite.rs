use std::path::Path;

use crate::html::{Element, Html, ParserMode};
use crate::manifest::PictureSettings;
use crate::picture::attributes::ImageAttributes;

pub const WEBP_MIME_TYPE: &str = "image/webp";

const CONVERTIBLE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// A convertible image: original source, its WebP sibling, and what the
/// fallback `<img>` keeps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteRecord {
    pub source: String,
    pub webp: String,
    pub attributes: ImageAttributes,
}

/// `images/a.PNG` → `images/a.webp`. `None` unless the path ends in a
/// png/jpg/jpeg extension.
pub fn webp_source_path(src: &str) -> Option<String> {
    let (stem, extension) = src.rsplit_once('.')?;
    let extension = extension.to_ascii_lowercase();
    if !CONVERTIBLE_EXTENSIONS.contains(&extension.as_str()) {
        return None
    }
    Some(format!("{stem}.webp"))
}

/// Only local images in the target directory are rewritten; external and
/// placeholder-service images never are.
pub fn is_convertible_source(src: &str, rules: &PictureSettings) -> bool {
    if !src.contains(&rules.target_prefix) {
        return false
    }
    if crate::path_utils::is_external_url(src) {
        return false
    }
    let lowered = src.to_ascii_lowercase();
    !rules.placeholder_hosts
        .iter()
        .any(|host| lowered.contains(&host.to_ascii_lowercase()))
}

impl RewriteRecord {
    pub fn from_element(element: &Element, rules: &PictureSettings) -> Option<Self> {
        if !element.has_tag("img") {
            return None
        }
        let attributes = ImageAttributes::extract(element, &rules.preserved_attributes)?;
        if !is_convertible_source(&attributes.src, rules) {
            return None
        }
        let webp = webp_source_path(&attributes.src)?;
        Some(RewriteRecord { source: attributes.src.clone(), webp, attributes })
    }

    /// File name of the original image, for reports.
    pub fn asset_name(&self) -> String {
        crate::path_utils::display_name(&self.source)
    }

    /// ```html
    /// <picture>
    ///     <source srcset="{webp}" type="image/webp">
    ///     <img src="{source}" alt="..." ...>
    /// </picture>
    /// ```
    pub fn to_picture(&self) -> Element {
        let source = Element::new("source")
            .with_attr("srcset", self.webp.clone())
            .with_attr("type", WEBP_MIME_TYPE);
        Element::new("picture").with_children(vec![
            Html::text("\n    "),
            Html::Element(source),
            Html::text("\n    "),
            Html::Element(self.attributes.to_element()),
            Html::text("\n"),
        ])
    }
}

/// Rewrites the text of a single `<img>` element. Anything that is not one
/// convertible image comes back byte-for-byte unchanged. Whitespace around
/// the element is kept as is.
pub fn rewrite_img_tag(text: &str, rules: &PictureSettings) -> String {
    let is_space = |c: char| c.is_ascii_whitespace();
    let tag = text.trim_matches(is_space);
    let Html::Fragment(nodes) = Html::parse(tag, ParserMode::fragment("div")) else {
        return text.to_owned()
    };
    let [Html::Element(element)] = nodes.as_slice() else {
        return text.to_owned()
    };
    let Some(record) = RewriteRecord::from_element(element, rules) else {
        return text.to_owned()
    };
    let leading = &text[..text.len() - text.trim_start_matches(is_space).len()];
    let trailing = &text[text.trim_end_matches(is_space).len()..];
    format!("{leading}{}{trailing}", record.to_picture().html_string())
}

/// `3.png` → `3.webp`, for the per-file change list.
pub fn webp_file_name(asset: &str) -> String {
    let stem = Path::new(asset)
        .file_stem()
        .map(|x| x.to_string_lossy().to_string())
        .unwrap_or_else(|| asset.to_owned());
    format!("{stem}.webp")
}
