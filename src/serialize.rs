//! Writing a value tree back out as XML.
//!
//! Serialization is the structural inverse of parsing: keys become element
//! names, arrays become repeated sibling elements, and the content key
//! becomes text. Attributes do not survive as attributes; they come back as
//! child elements.

use std::io::Write;

use crate::config::ParserConfiguration;
use crate::entity::escape;
use crate::error::Error;
use crate::value::Value;

/// Tag for array items that have no key to take a name from.
const ARRAY_TAG: &str = "array";

/// Serialize with the default configuration and no enclosing tag.
///
/// ```rust
/// use xmlson::{to_string, Map, Value};
///
/// let mut book = Map::new();
/// book.put("title", "A & B".into());
/// book.put("note", "".into());
/// let mut root = Map::new();
/// root.put("book", book.into());
/// assert_eq!(
///     to_string(&root.into()),
///     "<book><title>A &amp; B</title><note/></book>"
/// );
/// ```
pub fn to_string(value: &Value) -> String {
    to_string_with(value, None, &ParserConfiguration::default())
}

/// Serialize, optionally wrapped in an element called `tag`.
///
/// Text under the configuration's content key is written as character
/// data. A scalar with no tag comes out quoted.
pub fn to_string_with(value: &Value, tag: Option<&str>, config: &ParserConfiguration) -> String {
    let mut out = String::new();
    write_value(&mut out, value, tag, config);
    out
}

/// Serialize into a byte sink.
pub fn serialize(
    value: &Value,
    tag: Option<&str>,
    config: &ParserConfiguration,
    w: &mut impl Write,
) -> Result<(), Error> {
    w.write_all(to_string_with(value, tag, config).as_bytes())?;
    Ok(())
}

fn write_value(out: &mut String, value: &Value, tag: Option<&str>, config: &ParserConfiguration) {
    match value {
        Value::Object(map) => {
            if let Some(tag) = tag {
                open(out, tag);
            }
            for (key, value) in map.iter() {
                if key == config.cdata_tag_name() {
                    write_content(out, value);
                } else if let Value::Array(items) = value {
                    for item in items {
                        if let Value::Array(_) = item {
                            open(out, key);
                            write_value(out, item, None, config);
                            close(out, key);
                        } else {
                            write_value(out, item, Some(key), config);
                        }
                    }
                } else if value.is_empty_string() {
                    empty(out, key);
                } else {
                    write_value(out, value, Some(key), config);
                }
            }
            if let Some(tag) = tag {
                close(out, tag);
            }
        }
        Value::Array(items) => {
            let tag = tag.unwrap_or(ARRAY_TAG);
            for item in items {
                write_value(out, item, Some(tag), config);
            }
        }
        scalar => {
            let text = scalar.to_string();
            let text = escape(&text);
            match tag {
                None => {
                    out.push('"');
                    out.push_str(&text);
                    out.push('"');
                }
                Some(tag) if text.is_empty() => empty(out, tag),
                Some(tag) => {
                    open(out, tag);
                    out.push_str(&text);
                    close(out, tag);
                }
            }
        }
    }
}

/// Text content; the items of an array go on separate lines.
fn write_content(out: &mut String, value: &Value) {
    match value {
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push('\n');
                }
                out.push_str(&escape(&item.to_string()));
            }
        }
        value => out.push_str(&escape(&value.to_string())),
    }
}

fn open(out: &mut String, tag: &str) {
    out.push('<');
    out.push_str(tag);
    out.push('>');
}

fn close(out: &mut String, tag: &str) {
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

fn empty(out: &mut String, tag: &str) {
    out.push('<');
    out.push_str(tag);
    out.push_str("/>");
}
