use crate::html::Html;
use crate::html::Element;
use crate::html::Attributes;
use crate::html::Doctype;

// ————————————————————————————————————————————————————————————————————————————
// PRINTER
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Copy, Default)]
pub struct Environment {
    /// Text children are printed verbatim (script, style, ...).
    raw_text: bool,
}

impl Environment {
    pub fn scope(&self, tag: &str) -> Environment {
        Environment { raw_text: crate::html::is_raw_text_tag(tag) }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl Html {
    /// Prints a whole document. The parser drops whitespace between the doctype
    /// and `<html>`, so a line break is put back there.
    pub fn document_string(&self) -> String {
        let nodes = match self {
            Self::Fragment(nodes) => nodes.as_slice(),
            other => std::slice::from_ref(other),
        };
        let mut output = String::new();
        for (index, node) in nodes.iter().enumerate() {
            node.write_html(&Environment::default(), &mut output);
            let next_is_text = matches!(nodes.get(index + 1), Some(Html::Text(_)) | None);
            if matches!(node, Html::Doctype(_)) && !next_is_text {
                output.push('\n');
            }
        }
        output
    }
    pub fn html_string(&self) -> String {
        let mut output = String::new();
        self.write_html(&Environment::default(), &mut output);
        output
    }
    fn write_html(&self, environment: &Environment, output: &mut String) {
        match self {
            Self::Element(element) => element.write_html(output),
            Self::Fragment(nodes) => format_fragment(nodes, environment, output),
            Self::Text(text) if environment.raw_text => output.push_str(text),
            Self::Text(text) => output.push_str(&escape_text(text)),
            Self::Comment(text) => {
                output.push_str("<!--");
                output.push_str(text);
                output.push_str("-->");
            }
            Self::Doctype(doctype) => doctype.write_html(output),
        }
    }
}

impl Element {
    pub fn html_string(&self) -> String {
        let mut output = String::new();
        self.write_html(&mut output);
        output
    }
    fn write_html(&self, output: &mut String) {
        let environment = Environment::default().scope(&self.tag);
        output.push('<');
        output.push_str(&self.tag);
        output.push_str(&format_attributes(&self.attrs));
        output.push('>');
        if crate::html::is_void_tag(&self.tag) {
            return
        }
        if crate::html::is_leading_newline_tag(&self.tag) {
            if let Some(Html::Text(text)) = self.children.first() {
                if text.starts_with('\n') {
                    output.push('\n');
                }
            }
        }
        format_fragment(&self.children, &environment, output);
        output.push_str("</");
        output.push_str(&self.tag);
        output.push('>');
    }
}

impl Doctype {
    fn write_html(&self, output: &mut String) {
        output.push_str("<!DOCTYPE ");
        output.push_str(&self.name);
        if !self.public_id.is_empty() {
            output.push_str(&format!(" PUBLIC \"{}\"", self.public_id));
            if !self.system_id.is_empty() {
                output.push_str(&format!(" \"{}\"", self.system_id));
            }
        } else if !self.system_id.is_empty() {
            output.push_str(&format!(" SYSTEM \"{}\"", self.system_id));
        }
        output.push('>');
    }
}

fn format_fragment(nodes: &[Html], environment: &Environment, output: &mut String) {
    for node in nodes {
        node.write_html(environment, output);
    }
}

fn format_attributes(attributes: &Attributes) -> String {
    attributes
        .iter()
        .map(|(key, value)| format!(" {key}=\"{}\"", escape_attribute(value)))
        .collect::<Vec<_>>()
        .join("")
}

fn escape_text(text: &str) -> String {
    html_escape::encode_text(text).replace('\u{a0}', "&nbsp;")
}

fn escape_attribute(value: &str) -> String {
    html_escape::encode_double_quoted_attribute(value).replace('\u{a0}', "&nbsp;")
}

#[cfg(test)]
mod tests {
    use crate::html::{Html, ParserMode};

    fn reprint(source: &str) -> String {
        Html::parse(source, ParserMode::fragment("div")).html_string()
    }

    #[test]
    fn void_elements_have_no_end_tag() {
        assert_eq!(reprint(r#"<img src="a.png" alt="">"#), r#"<img src="a.png" alt="">"#);
        assert_eq!(reprint(r#"<br/>"#), "<br>");
    }

    #[test]
    fn text_is_escaped_but_scripts_are_not() {
        assert_eq!(reprint("<p>a &amp; b &lt; c</p>"), "<p>a &amp; b &lt; c</p>");
        assert_eq!(reprint("<p>x&nbsp;y</p>"), "<p>x&nbsp;y</p>");
        assert_eq!(
            reprint("<script>if (a < b && c) {}</script>"),
            "<script>if (a < b && c) {}</script>",
        );
    }

    #[test]
    fn attribute_order_and_quotes() {
        assert_eq!(
            reprint(r#"<a title='say "hi"' href="/x?a=1&amp;b=2">x</a>"#),
            r#"<a title="say &quot;hi&quot;" href="/x?a=1&amp;b=2">x</a>"#,
        );
    }

    #[test]
    fn legacy_doctype_keeps_its_identifiers() {
        let source = concat!(
            "<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.0 Transitional//EN\" ",
            "\"http://www.w3.org/TR/xhtml1/DTD/xhtml1-transitional.dtd\">\n",
            "<html><head></head><body><img src=\"images/kolimg/a.png\"></body></html>",
        );
        let html = Html::parse(source, ParserMode::Document);
        assert_eq!(html.document_string(), source);

        let system_only = "<!DOCTYPE html SYSTEM \"about:legacy-compat\">\n<html><head></head><body></body></html>";
        let html = Html::parse(system_only, ParserMode::Document);
        assert_eq!(html.document_string(), system_only);
    }

    #[test]
    fn document_keeps_doctype_line() {
        let source = "<!DOCTYPE html>\n<html><head></head><body><!-- c --></body></html>";
        let html = Html::parse(source, ParserMode::Document);
        assert_eq!(html.document_string(), source);
    }
}
