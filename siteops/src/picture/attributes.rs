use crate::html::Element;

/// The attributes of one `<img>` that survive the rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttributes {
    pub src: String,
    /// Empty when the source element has none.
    pub alt: String,
    /// Recognised attributes present on the element, in recognised order.
    pub preserved: Vec<(String, String)>,
}

impl ImageAttributes {
    /// Returns `None` for an element without `src`; such elements are left as
    /// they are. Attributes outside `recognised` are dropped.
    pub fn extract(element: &Element, recognised: &[String]) -> Option<Self> {
        let src = element.attrs.get("src")?.to_owned();
        let alt = element.attrs.get("alt").unwrap_or_default().to_owned();
        let preserved = recognised
            .iter()
            .filter(|name| !name.eq_ignore_ascii_case("src") && !name.eq_ignore_ascii_case("alt"))
            .filter_map(|name| {
                element.attrs
                    .get(name)
                    .map(|value| (name.to_ascii_lowercase(), value.to_owned()))
            })
            .collect();
        Some(ImageAttributes { src, alt, preserved })
    }

    /// The normalised `<img>`: `src`, `alt`, then the preserved attributes.
    pub fn to_element(&self) -> Element {
        let mut element = Element::new("img")
            .with_attr("src", self.src.clone())
            .with_attr("alt", self.alt.clone());
        for (key, value) in &self.preserved {
            element.attrs.insert(key.clone(), value.clone());
        }
        element
    }
}
