use html5ever::tree_builder::TreeBuilderOpts;
use html5ever::{parse_document, parse_fragment, ParseOpts};
use markup5ever::{namespace_url, ns, LocalName, QualName};
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use tendril::TendrilSink;

use crate::html::{Attributes, Doctype, Element, Html};

/// Scripting is off so `<noscript>` contents parse as markup.
fn parse_opts() -> ParseOpts {
    ParseOpts {
        tree_builder: TreeBuilderOpts {
            scripting_enabled: false,
            ..TreeBuilderOpts::default()
        },
        ..ParseOpts::default()
    }
}

pub fn parse_html_document(source: &str) -> Html {
    let dom = parse_document(RcDom::default(), parse_opts()).one(source);
    Html::Fragment(convert_children(&dom.document))
}

/// Parses `source` as the contents of a `<context>` element.
pub fn parse_html_fragment(source: &str, context: &str) -> Html {
    let context = QualName::new(None, ns!(html), LocalName::from(context));
    let dom = parse_fragment(RcDom::default(), parse_opts(), context, Vec::new()).one(source);
    // The fragment parser roots everything under a synthetic <html> element.
    let nodes = dom.document.children
        .borrow()
        .iter()
        .flat_map(|root| convert_children(root))
        .collect();
    Html::Fragment(nodes)
}

fn convert_children(handle: &Handle) -> Vec<Html> {
    handle.children
        .borrow()
        .iter()
        .filter_map(convert)
        .collect()
}

fn convert(handle: &Handle) -> Option<Html> {
    match handle.data {
        NodeData::Document => Some(Html::Fragment(convert_children(handle))),
        NodeData::Doctype { ref name, ref public_id, ref system_id } => Some(Html::Doctype(Doctype {
            name: name.to_string(),
            public_id: public_id.to_string(),
            system_id: system_id.to_string(),
        })),
        NodeData::Text { ref contents } => Some(Html::Text(contents.borrow().to_string())),
        NodeData::Comment { ref contents } => Some(Html::Comment(contents.to_string())),
        NodeData::Element { ref name, ref attrs, ref template_contents, .. } => {
            let attrs = attrs
                .borrow()
                .iter()
                .map(|attr| {
                    let key = match attr.name.prefix {
                        Some(ref prefix) => format!("{}:{}", prefix, attr.name.local),
                        None => attr.name.local.to_string(),
                    };
                    (key, attr.value.to_string())
                })
                .collect::<Attributes>();
            let children = match template_contents {
                Some(contents) => convert_children(contents),
                None => convert_children(handle),
            };
            Some(Html::Element(Element {
                tag: name.local.to_string(),
                attrs,
                children,
            }))
        }
        NodeData::ProcessingInstruction { .. } => None,
    }
}
