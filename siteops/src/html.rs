use std::collections::HashSet;
use once_cell::sync::Lazy;

// ————————————————————————————————————————————————————————————————————————————
// DATA MODEL
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Html {
    Element(Element),
    Text(String),
    Comment(String),
    Doctype(Doctype),
    Fragment(Vec<Html>),
}

/// `<!DOCTYPE name PUBLIC "public_id" "system_id">`; the ids are empty when absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Doctype {
    pub name: String,
    pub public_id: String,
    pub system_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attrs: Attributes,
    pub children: Vec<Html>,
}

/// Element attributes in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(Vec<(String, String)>);

impl Html {
    pub fn parse(source: &str, mode: ParserMode) -> Html {
        match mode {
            ParserMode::Document => crate::html_parser::parse_html_document(source),
            ParserMode::Fragment { context } => crate::html_parser::parse_html_fragment(source, &context),
        }
    }
    pub fn text(value: impl Into<String>) -> Html {
        Html::Text(value.into())
    }
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Element { tag: tag.into(), attrs: Attributes::default(), children: Vec::new() }
    }
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(key, value);
        self
    }
    pub fn with_children(mut self, children: Vec<Html>) -> Self {
        self.children = children;
        self
    }
    pub fn has_tag(&self, tag: impl AsRef<str>) -> bool {
        self.tag.eq_ignore_ascii_case(tag.as_ref())
    }
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key)
    }
    /// True if the whitespace separated `class` list contains every given class.
    pub fn has_classes(&self, classes: &[String]) -> bool {
        let Some(value) = self.attr("class") else {
            return false
        };
        let tokens = value.split_ascii_whitespace().collect::<HashSet<_>>();
        classes.iter().all(|class| tokens.contains(class.as_str()))
    }
}

impl Attributes {
    /// Case-insensitive lookup by name.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(key))
            .map(|(_, value)| value.as_str())
    }
    /// Replaces an existing value in place, otherwise appends.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(name, _)| name.eq_ignore_ascii_case(&key)) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key, value)),
        }
    }
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }
}

impl FromIterator<(String, String)> for Attributes {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        let mut attrs = Attributes::default();
        for (key, value) in iter {
            attrs.insert(key, value);
        }
        attrs
    }
}

// ————————————————————————————————————————————————————————————————————————————
// HTML API UTILITIES
// ————————————————————————————————————————————————————————————————————————————

impl Html {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(element) => Some(element),
            _ => None,
        }
    }
    /// Depth-first search for any element matching the predicate.
    pub fn any_element(&self, predicate: &impl Fn(&Element) -> bool) -> bool {
        match self {
            Self::Element(element) => {
                predicate(element) || element.children.iter().any(|x| x.any_element(predicate))
            }
            Self::Fragment(nodes) => nodes.iter().any(|x| x.any_element(predicate)),
            _ => false,
        }
    }
}

static VOID_TAGS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        "area", "base", "basefont", "bgsound", "br", "col", "embed", "frame",
        "hr", "img", "input", "keygen", "link", "meta", "param", "source",
        "track", "wbr",
    ])
});

/// Elements whose children the parser keeps as unescaped text.
static RAW_TEXT_TAGS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        "style", "script", "xmp", "iframe", "noembed", "noframes", "plaintext",
    ])
});

pub fn is_void_tag(tag: &str) -> bool {
    VOID_TAGS.contains(tag.to_ascii_lowercase().as_str())
}

pub fn is_raw_text_tag(tag: &str) -> bool {
    RAW_TEXT_TAGS.contains(tag.to_ascii_lowercase().as_str())
}

/// The parser drops one leading newline inside these.
pub fn is_leading_newline_tag(tag: &str) -> bool {
    matches!(tag.to_ascii_lowercase().as_str(), "pre" | "textarea" | "listing")
}

// ————————————————————————————————————————————————————————————————————————————
// PARSER
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParserMode {
    Document, Fragment { context: String }
}

impl ParserMode {
    pub fn fragment(context: impl AsRef<str>) -> Self {
        Self::Fragment { context: context.as_ref().to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attributes_keep_source_order_and_ignore_case() {
        let mut attrs = Attributes::default();
        attrs.insert("src", "a.png");
        attrs.insert("ALT", "x");
        attrs.insert("class", "logo");
        attrs.insert("alt", "y");
        let keys = attrs.iter().map(|(k, _)| k).collect::<Vec<_>>();
        assert_eq!(keys, vec!["src", "ALT", "class"]);
        assert_eq!(attrs.get("Alt"), Some("y"));
    }

    #[test]
    fn class_list_matching() {
        let element = Element::new("div").with_attr("class", "phone-call  cbh-phone cbh-green");
        assert!(element.has_classes(&["cbh-phone".into(), "phone-call".into()]));
        assert!(!element.has_classes(&["cbh-phone".into(), "cbh-red".into()]));
        assert!(!Element::new("div").has_classes(&["x".into()]));
    }

    #[test]
    fn tag_tables() {
        assert!(is_void_tag("IMG"));
        assert!(!is_void_tag("picture"));
        assert!(is_raw_text_tag("script"));
        assert!(!is_raw_text_tag("div"));
        assert!(!is_raw_text_tag("noscript"));
    }
}
