//! Minimal read-only element tree over quick-xml's event reader.
//!
//! Doxygen output is small enough per file that materialising the tree keeps
//! the ingestion code declarative; the event loop below is the only place
//! that touches the wire format.

use std::collections::HashMap;

use quick_xml::Reader;
use quick_xml::events::Event;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("cannot read documentation file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid XML: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("invalid attribute: {0}")]
    Attr(#[from] quick_xml::events::attributes::AttrError),
    #[error("unbalanced closing tag </{0}>")]
    UnbalancedTag(String),
    #[error("document has no root element")]
    MissingRoot,
    #[error("missing required element <{0}>")]
    MissingElement(&'static str),
    #[error("missing required attribute `{0}`")]
    MissingAttribute(&'static str),
}

/// One XML element with its attributes, direct text and child elements.
/// Text and CDATA at the element's own level are accumulated in document
/// order into a single string.
#[derive(Debug, Clone, Default)]
pub struct Element {
    pub name: String,
    pub attrs: HashMap<String, String>,
    pub children: Vec<Element>,
    text: String,
}

impl Element {
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    /// First direct child with the given tag name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|child| child.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |child| child.name == name)
    }

    /// First element reachable along a `/`-separated path of tag names,
    /// taking the first match at each step.
    pub fn find(&self, path: &str) -> Option<&Element> {
        path.split('/')
            .try_fold(self, |element, segment| element.child(segment))
    }

    /// Every element reachable along a `/`-separated path, considering all
    /// matches at every step (ElementTree `findall` semantics).
    pub fn find_all(&self, path: &str) -> Vec<&Element> {
        let mut frontier = vec![self];
        for segment in path.split('/') {
            let mut next = Vec::new();
            for element in frontier {
                for child in &element.children {
                    if child.name == segment {
                        next.push(child);
                    }
                }
            }
            frontier = next;
        }
        frontier
    }

    /// Trimmed direct text, or `None` when only whitespace is present.
    pub fn text(&self) -> Option<&str> {
        let trimmed = self.text.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }

    /// Direct text exactly as written, for verbatim blocks.
    pub fn text_raw(&self) -> &str {
        &self.text
    }
}

/// Parse a full XML document into its root element.
pub fn parse_document(input: &str) -> Result<Element, ParseError> {
    let mut reader = Reader::from_str(input);
    let mut stack: Vec<Element> = Vec::new();
    let mut root = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                stack.push(element_from_start(&start)?);
            }
            Event::Empty(start) => {
                let element = element_from_start(&start)?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => root = Some(element),
                }
            }
            Event::End(end) => {
                let element = stack.pop().ok_or_else(|| {
                    ParseError::UnbalancedTag(String::from_utf8_lossy(end.name().as_ref()).into_owned())
                })?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => root = Some(element),
                }
            }
            Event::Text(text) => {
                if let Some(open) = stack.last_mut() {
                    open.text.push_str(&text.unescape()?);
                }
            }
            Event::CData(cdata) => {
                if let Some(open) = stack.last_mut() {
                    open.text.push_str(&String::from_utf8_lossy(&cdata.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    root.ok_or(ParseError::MissingRoot)
}

fn element_from_start(start: &quick_xml::events::BytesStart<'_>) -> Result<Element, ParseError> {
    let mut element = Element {
        name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
        ..Element::default()
    };
    for attr in start.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        element.attrs.insert(key, value);
    }
    Ok(element)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_attributes_and_nested_children() {
        let root = parse_document(
            r#"<doxygen version="1.9"><compounddef id="c1" kind="class"><compoundname>Foo</compoundname></compounddef></doxygen>"#,
        )
        .expect("well-formed document");

        assert_eq!(root.name, "doxygen");
        assert_eq!(root.attr("version"), Some("1.9"));
        let compound = root.child("compounddef").expect("compounddef child");
        assert_eq!(compound.attr("kind"), Some("class"));
        assert_eq!(
            compound.child("compoundname").and_then(Element::text),
            Some("Foo")
        );
    }

    #[test]
    fn accumulates_mixed_content_text() {
        let root = parse_document(
            r#"<type>const <ref refid="id1">Foo</ref> &amp;</type>"#,
        )
        .expect("well-formed document");

        assert_eq!(root.text(), Some("const  &"));
        assert_eq!(root.child("ref").and_then(|r| r.attr("refid")), Some("id1"));
    }

    #[test]
    fn find_all_follows_every_branch() {
        let root = parse_document(
            "<c><s><m>a</m><m>b</m></s><s><m>c</m></s></c>",
        )
        .expect("well-formed document");

        let names: Vec<_> = root
            .find_all("s/m")
            .into_iter()
            .filter_map(Element::text)
            .collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[test]
    fn empty_elements_become_childless_nodes() {
        let root = parse_document(r#"<member refid="m1"/>"#).expect("well-formed document");
        assert_eq!(root.attr("refid"), Some("m1"));
        assert!(root.children.is_empty());
        assert_eq!(root.text(), None);
    }

    #[test]
    fn malformed_input_is_an_error() {
        assert!(parse_document("<a><b></a>").is_err());
        assert!(parse_document("").is_err());
    }
}
