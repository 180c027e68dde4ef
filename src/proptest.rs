//! Proptest support for xmlson
//!
//! Generates arbitrary XML documents whose value trees survive a trip
//! through [`to_string`](crate::to_string) and back. This can be enabled
//! by adding the `proptest` feature to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! xmlson = { version = "0.1", features = ["proptest"] }
//! ```
//!
//! Generated elements hold either child elements (with comments mixed in)
//! or a single run of text, never both, and attribute values never start
//! or end with whitespace. Text and attribute values are written escaped.

use ahash::HashSet;
use proptest::prelude::*;

use crate::entity::escape;

const ELEMENT_NAMES: &[&str] = &["a", "b", "c", "d", "e"];
const ATTRIBUTE_NAMES: &[&str] = &["q", "r", "s"];
const XML_STRING: &str = "[\u{0020}-\u{D7FF}\u{E000}-\u{FFFD}]*";
const ATTRIBUTE_VALUE: &str = "([!-~]([ -~]{0,8}[!-~])?)?";

/// A generated element.
#[derive(Debug, Clone)]
pub struct FixedElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub content: FixedContent,
}

/// What a generated element holds.
#[derive(Debug, Clone)]
pub enum FixedContent {
    Text(String),
    Children(Vec<FixedChild>),
}

#[derive(Debug, Clone)]
pub enum FixedChild {
    Element(FixedElement),
    Comment(String),
}

impl FixedElement {
    /// Write the element as XML text.
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        self.write(&mut out);
        out
    }

    fn write(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (name, value) in &self.attributes {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&escape(value));
            out.push('"');
        }
        out.push('>');
        match &self.content {
            FixedContent::Text(text) => out.push_str(&escape(text)),
            FixedContent::Children(children) => {
                for child in children {
                    match child {
                        FixedChild::Element(element) => element.write(out),
                        FixedChild::Comment(comment) => {
                            out.push_str("<!--");
                            out.push_str(comment);
                            out.push_str("-->");
                        }
                    }
                }
            }
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }
}

fn arb_attributes() -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::vec(
        (prop::sample::select(ATTRIBUTE_NAMES), ATTRIBUTE_VALUE),
        0..4,
    )
    .prop_map(|attributes| {
        let mut seen = HashSet::default();
        attributes
            .into_iter()
            .filter(|(name, _)| seen.insert(*name))
            .map(|(name, value)| (name.to_string(), value))
            .collect()
    })
}

fn arb_comment() -> impl Strategy<Value = String> {
    "[a-z <>&]{0,10}".prop_map(String::from)
}

fn arb_leaf() -> impl Strategy<Value = FixedElement> {
    (
        prop::sample::select(ELEMENT_NAMES),
        arb_attributes(),
        XML_STRING,
    )
        .prop_map(|(name, attributes, text)| FixedElement {
            name: name.to_string(),
            attributes,
            content: FixedContent::Text(text),
        })
}

/// Generate a random XML document element.
///
/// ```notrust
/// use xmlson::proptest::arb_document;
///
/// proptest! {
///   #[test]
///   fn test_parses(root in arb_document()) {
///     prop_assert!(xmlson::parse_str(&root.to_xml()).is_ok());
///   }
/// }
/// ```
pub fn arb_document() -> impl Strategy<Value = FixedElement> {
    arb_leaf().prop_recursive(
        6,  // levels deep
        64, // maximum number of elements
        6,  // up to 6 children per element
        |inner| {
            (
                prop::sample::select(ELEMENT_NAMES),
                arb_attributes(),
                prop::collection::vec(
                    prop_oneof![
                        4 => inner.prop_map(FixedChild::Element),
                        1 => arb_comment().prop_map(FixedChild::Comment),
                    ],
                    0..6,
                ),
            )
                .prop_map(|(name, attributes, children)| FixedElement {
                    name: name.to_string(),
                    attributes,
                    content: FixedContent::Children(children),
                })
        },
    )
}
