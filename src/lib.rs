#![forbid(unsafe_code)]

//! Convert XML into an ordered value tree and back.
//!
//! Parsing turns every element into an entry of a [`Map`]: attributes and
//! child elements become keys, repeated names become arrays, and text
//! goes under a content key (`content` by default). Elements that hold
//! nothing but text collapse to the text itself, coerced to a boolean,
//! null or number where it looks like one.
//!
//! ```rust
//! use xmlson::{parse_str, Value};
//!
//! let map = parse_str(r#"<book id="7"><title>Dune</title><tag>a</tag><tag>b</tag></book>"#)?;
//! let book = map.get("book").unwrap();
//! assert_eq!(book.get("id"), Some(&Value::from(7)));
//! assert_eq!(book.get("title"), Some(&Value::from("Dune")));
//! assert_eq!(
//!     book.get("tag"),
//!     Some(&Value::Array(vec!["a".into(), "b".into()]))
//! );
//! # Ok::<(), xmlson::Error>(())
//! ```
//!
//! Single elements can be read or swapped out by path without building
//! the rest of the document, see [`extract`] and [`replace`]. The
//! [`to_string`] family writes a tree back out as XML.
//!
//! Parsing is controlled by a [`ParserConfiguration`]. Diagnostics are
//! emitted through [`tracing`](https://docs.rs/tracing); install a
//! subscriber to see them.

mod coerce;
mod config;
mod decimal;
mod entity;
mod error;
mod parse;
mod path;
mod serialize;
mod source;
mod task;
mod tokenizer;
mod value;

#[cfg(any(test, feature = "proptest"))]
pub mod proptest;

pub use coerce::{string_to_value, string_to_value_with, TypeConverter};
pub use config::{ParserConfiguration, DEFAULT_CONTENT_KEY, NIL_ATTRIBUTE, TYPE_ATTRIBUTE};
pub use decimal::{Decimal, ParseDecimalError};
pub use entity::{escape, no_space, unescape, unescape_entity};
pub use error::{Error, Position};
pub use parse::{
    parse_reader, parse_reader_with, parse_source, parse_source_with_keys, parse_str,
    parse_str_with,
};
pub use path::{extract, extract_str, replace, replace_str, KeyPath};
pub use serialize::{serialize, to_string, to_string_with};
pub use source::{CharSource, ReaderSource, SeekReaderSource, StrSource};
pub use task::{parse_async, ImmediateSpawner, Job, PoolSpawner, Spawner, DEFAULT_POOL_SIZE};
pub use tokenizer::{Token, Tokenizer};
pub use value::{Map, Number, Value};
