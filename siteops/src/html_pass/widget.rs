use crate::html::{Element, Html};
use crate::html_pass::system::{Change, State};
use crate::manifest::WidgetSettings;

const DEFAULT_INDENT: &str = "    ";

/// Where an include goes, decided once per document before the pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// The page already references it.
    Present,
    /// Right after the anchor element.
    AfterAnchor,
    /// At the end of `<head>` / `<body>`.
    AtEnd,
}

#[derive(Debug, Clone)]
pub struct WidgetPlan<'a> {
    pub settings: &'a WidgetSettings,
    pub stylesheet: Placement,
    pub script: Placement,
}

impl<'a> WidgetPlan<'a> {
    pub fn for_document(tree: &Html, settings: &'a WidgetSettings) -> Self {
        let stylesheet_name = crate::path_utils::display_name(&settings.stylesheet);
        let script_name = crate::path_utils::display_name(&settings.script);
        let stylesheet = if tree.any_element(&|x| references(x, "link", "href", &stylesheet_name)) {
            Placement::Present
        } else if tree.any_element(&|x| is_anchor(x, "link", "href", &settings.stylesheet_anchor)) {
            Placement::AfterAnchor
        } else {
            Placement::AtEnd
        };
        let script = if tree.any_element(&|x| references(x, "script", "src", &script_name)) {
            Placement::Present
        } else if tree.any_element(&|x| is_anchor(x, "script", "src", &settings.script_anchor)) {
            Placement::AfterAnchor
        } else {
            Placement::AtEnd
        };
        WidgetPlan { settings, stylesheet, script }
    }

    pub fn has_includes(&self) -> bool {
        self.stylesheet == Placement::Present && self.script == Placement::Present
    }

    fn stylesheet_element(&self) -> Element {
        Element::new("link")
            .with_attr("rel", "stylesheet")
            .with_attr("href", self.settings.stylesheet.clone())
    }

    fn script_element(&self) -> Element {
        Element::new("script").with_attr("src", self.settings.script.clone())
    }

    fn is_legacy_button(&self, element: &Element) -> bool {
        element.has_tag("div")
            && element.attr("id") == Some(self.settings.legacy_button_id.as_str())
            && element.has_classes(&self.settings.legacy_button_classes)
    }

    /// The include to put right after `node`, if `node` is an anchor.
    fn include_after(&self, node: &Html) -> Option<Element> {
        let element = node.as_element()?;
        if self.stylesheet == Placement::AfterAnchor
            && is_anchor(element, "link", "href", &self.settings.stylesheet_anchor)
        {
            return Some(self.stylesheet_element())
        }
        if self.script == Placement::AfterAnchor
            && is_anchor(element, "script", "src", &self.settings.script_anchor)
        {
            return Some(self.script_element())
        }
        None
    }
}

fn references(element: &Element, tag: &str, attr: &str, file_name: &str) -> bool {
    element.has_tag(tag) && element.attr(attr).is_some_and(|value| value.contains(file_name))
}

fn is_anchor(element: &Element, tag: &str, attr: &str, anchor: &str) -> bool {
    !anchor.is_empty() && element.has_tag(tag) && element.attr(attr) == Some(anchor)
}

fn reference_of(element: &Element) -> String {
    element.attr("href")
        .or_else(|| element.attr("src"))
        .unwrap_or_default()
        .to_owned()
}

impl Html {
    /// Adds the widget includes and drops the legacy floating button.
    pub fn widget_pass(self, plan: &WidgetPlan) -> State<Self> {
        match self {
            Self::Element(element) => element.widget_pass(plan),
            Self::Fragment(nodes) => widget_pass_fragment(nodes, plan).map(Self::Fragment),
            other => State::wrap(other),
        }
    }
}

impl Element {
    pub fn widget_pass(self, plan: &WidgetPlan) -> State<Html> {
        let Element { tag, attrs, children } = self;
        widget_pass_fragment(children, plan).map_with(|mut children, ctx| {
            let include = match tag.to_ascii_lowercase().as_str() {
                "head" if plan.stylesheet == Placement::AtEnd => Some(plan.stylesheet_element()),
                "body" if plan.script == Placement::AtEnd => Some(plan.script_element()),
                _ => None,
            };
            if let Some(include) = include {
                ctx.record(Change::Inserted { reference: reference_of(&include) });
                append_block(&mut children, include);
            }
            Html::Element(Element { tag, attrs, children })
        })
    }
}

fn widget_pass_fragment(nodes: Vec<Html>, plan: &WidgetPlan) -> State<Vec<Html>> {
    let mut state = State::<Vec<Html>>::default();
    for node in nodes {
        if let Html::Element(element) = &node {
            if plan.is_legacy_button(element) {
                tracing::debug!("removing legacy button #{}", plan.settings.legacy_button_id);
                state.aggregator.record(Change::Removed {
                    description: format!("div#{}", plan.settings.legacy_button_id),
                });
                continue
            }
        }
        let include = plan.include_after(&node);
        let State { aggregator, value } = node.widget_pass(plan);
        state.aggregator.include(aggregator);
        state.value.push(value);
        if let Some(include) = include {
            let reference = reference_of(&include);
            let already = state.aggregator.changes
                .iter()
                .any(|x| matches!(x, Change::Inserted { reference: r } if *r == reference));
            if !already {
                let indent = indent_before(&state.value);
                state.value.push(Html::text(format!("\n{indent}")));
                state.value.push(Html::Element(include));
                state.aggregator.record(Change::Inserted { reference });
            }
        }
    }
    state
}

/// Indentation of the last element in `nodes`, read from the whitespace text
/// in front of it.
fn indent_before(nodes: &[Html]) -> String {
    let preceding = nodes.len().checked_sub(2).and_then(|index| nodes.get(index));
    match preceding {
        Some(Html::Text(text)) => {
            let last_line = text.rsplit('\n').next().unwrap_or_default();
            if text.contains('\n') && last_line.chars().all(|c| c == ' ' || c == '\t') {
                return last_line.to_owned()
            }
            DEFAULT_INDENT.to_owned()
        }
        _ => DEFAULT_INDENT.to_owned(),
    }
}

/// Appends `element` on its own indented line before the closing tag.
fn append_block(children: &mut Vec<Html>, element: Element) {
    let ends_with_newline = matches!(children.last(), Some(Html::Text(text)) if text.ends_with('\n'));
    if !ends_with_newline {
        children.push(Html::text("\n"));
    }
    children.push(Html::text(DEFAULT_INDENT));
    children.push(Html::Element(element));
    children.push(Html::text("\n"));
}
