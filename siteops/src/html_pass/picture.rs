use crate::html::{Element, Html};
use crate::html_pass::system::{Change, State};
use crate::manifest::PictureSettings;
use crate::picture::rewrite::RewriteRecord;

#[derive(Debug, Clone, Copy)]
pub struct PictureScope<'a> {
    pub rules: &'a PictureSettings,
    /// The node being visited is a child of a `<picture>`.
    pub inside_picture: bool,
}

impl<'a> PictureScope<'a> {
    pub fn new(rules: &'a PictureSettings) -> Self {
        PictureScope { rules, inside_picture: false }
    }
    fn enter(&self, tag: &str) -> Self {
        PictureScope { rules: self.rules, inside_picture: tag.eq_ignore_ascii_case("picture") }
    }
    fn is_target(&self, element: &Element) -> bool {
        element.has_tag("img")
            && element
                .attr("src")
                .is_some_and(|src| src.starts_with(&self.rules.target_prefix))
    }
}

impl Html {
    /// Wraps every targeted `<img>` not already inside a `<picture>`.
    pub fn picture_pass(self, scope: &PictureScope) -> State<Self> {
        match self {
            Self::Element(element) => element.picture_pass(scope),
            Self::Fragment(nodes) => picture_pass_fragment(nodes, scope).map(Self::Fragment),
            other => State::wrap(other),
        }
    }
}

impl Element {
    pub fn picture_pass(self, scope: &PictureScope) -> State<Html> {
        if scope.is_target(&self) {
            return process_img_tag(self, scope)
        }
        let Element { tag, attrs, children } = self;
        let child_scope = scope.enter(&tag);
        picture_pass_fragment(children, &child_scope).map(|children| {
            Html::Element(Element { tag, attrs, children })
        })
    }
}

fn picture_pass_fragment(nodes: Vec<Html>, scope: &PictureScope) -> State<Vec<Html>> {
    let nodes_len = nodes.len();
    let nodes = nodes
        .into_iter()
        .map(|node| node.picture_pass(scope));
    State::flatten(nodes, Some(nodes_len))
}

fn process_img_tag(element: Element, scope: &PictureScope) -> State<Html> {
    let Some(record) = RewriteRecord::from_element(&element, scope.rules) else {
        return State::wrap(Html::Element(element))
    };
    State::wrap(element).map_with(|element, ctx| {
        if scope.inside_picture {
            ctx.record(Change::AlreadyWrapped { asset: record.asset_name() });
            return Html::Element(element)
        }
        tracing::debug!("wrapping {} with {}", record.source, record.webp);
        ctx.record(Change::Converted { asset: record.asset_name() });
        Html::Element(record.to_picture())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::ParserMode;

    fn run(source: &str) -> State<Html> {
        let rules = PictureSettings::default();
        Html::parse(source, ParserMode::fragment("div")).picture_pass(&PictureScope::new(&rules))
    }

    #[test]
    fn only_bare_images_are_wrapped() {
        let source = concat!(
            "<div><picture>\n",
            "    <source srcset=\"images/kolimg/a.webp\" type=\"image/webp\">\n",
            "    <img src=\"images/kolimg/a.png\" alt=\"A\">\n",
            "</picture>\n",
            "<img src=\"images/kolimg/b.jpg\" alt=\"B\"></div>",
        );
        let state = run(source);
        assert_eq!(state.aggregator.converted_assets(), vec![String::from("b.jpg")]);
        assert_eq!(state.aggregator.already_wrapped(), 1);
        let output = state.value.html_string();
        assert_eq!(output.matches("<picture>").count(), 2);
        assert_eq!(output.matches("images/kolimg/a.webp").count(), 1);
        assert!(output.contains("<source srcset=\"images/kolimg/b.webp\" type=\"image/webp\">"));
    }

    #[test]
    fn src_must_start_with_the_target_prefix() {
        let state = run(r#"<img src="/images/kolimg/a.png"><img src="assets/images/kolimg/b.png">"#);
        assert!(state.aggregator.changes.is_empty());
    }

    #[test]
    fn identical_markup_is_converted_at_every_occurrence() {
        let state = run(r#"<p><img src="images/kolimg/x.png" alt="X"></p><p><img src="images/kolimg/x.png" alt="X"></p>"#);
        assert_eq!(state.aggregator.converted_assets().len(), 2);
        assert_eq!(state.value.html_string().matches("<picture>").count(), 2);
    }

    #[test]
    fn noscript_fallback_images_are_wrapped() {
        let state = run(r#"<img class="lazy" data-src="x"><noscript><img src="images/kolimg/team/1.jpg" alt="One"></noscript>"#);
        assert_eq!(state.aggregator.converted_assets(), vec![String::from("1.jpg")]);
        assert!(state.value.html_string().contains("<noscript><picture>"));
    }

    #[test]
    fn second_run_changes_nothing() {
        let first = run(r#"<section><img src="images/kolimg/hero.jpeg" alt="Hero" class="w-100"></section>"#);
        let printed = first.value.html_string();
        let second = run(&printed);
        assert!(!second.aggregator.is_modified());
        assert_eq!(second.aggregator.already_wrapped(), 1);
        assert_eq!(second.value.html_string(), printed);
    }
}
