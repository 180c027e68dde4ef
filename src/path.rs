//! Reading and rewriting one element addressed by a slash-separated path.

use std::fmt;
use std::str::FromStr;

use tracing::{debug, trace};

use crate::config::ParserConfiguration;
use crate::error::Error;
use crate::parse::Parser;
use crate::source::{CharSource, StrSource};
use crate::tokenizer::{Token, Tokenizer};
use crate::value::{Map, Value};

/// A sequence of element names from the document root downwards.
///
/// Written as names separated by `/`. Leading and trailing slashes are
/// ignored, so `/catalog/book/` and `catalog/book` are the same path. The
/// empty path (`""` or `"/"`) addresses the whole document.
///
/// ```rust
/// let path: xmlson::KeyPath = "/catalog/book".parse()?;
/// assert_eq!(path.segments(), ["catalog", "book"]);
/// # Ok::<(), xmlson::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct KeyPath {
    segments: Vec<String>,
}

impl KeyPath {
    pub fn parse(path: &str) -> Result<Self, Error> {
        let trimmed = path.trim_matches('/');
        if trimmed.is_empty() {
            return Ok(KeyPath::default());
        }
        let segments: Vec<String> = trimmed.split('/').map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return Err(Error::Syntax {
                message: format!("Empty segment in key path {}", path),
                position: Default::default(),
            });
        }
        Ok(KeyPath { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    fn not_found(&self, index: usize) -> Error {
        Error::NotFound {
            path: self.to_string(),
            segment: self.segments[index].clone(),
        }
    }
}

impl FromStr for KeyPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KeyPath::parse(s)
    }
}

impl<S: Into<String>> FromIterator<S> for KeyPath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        KeyPath {
            segments: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "/{}", segment)?;
        }
        if self.segments.is_empty() {
            f.write_str("/")?;
        }
        Ok(())
    }
}

/// Read only the element at `path`.
///
/// At each level the first child with the segment's name is taken. Other
/// siblings are skipped without being turned into values, and reading stops
/// as soon as the target element closes. The result is the element's
/// value as a full parse would have produced it: an object, a scalar for a
/// text-only element, or `""` for an empty one. The empty path returns the
/// whole document.
///
/// ```rust
/// use xmlson::{extract, KeyPath, ParserConfiguration, StrSource, Value};
///
/// let path: KeyPath = "catalog/book/title".parse()?;
/// let xml = "<catalog><book><title>Dune</title></book></catalog>";
/// let title = extract(StrSource::new(xml), &path, &ParserConfiguration::default())?;
/// assert_eq!(title, Value::from("Dune"));
/// # Ok::<(), xmlson::Error>(())
/// ```
pub fn extract<S: CharSource>(
    source: S,
    path: &KeyPath,
    config: &ParserConfiguration,
) -> Result<Value, Error> {
    let mut parser = Parser::new(Tokenizer::new(source), config);
    if path.is_empty() {
        return parser.document().map(Value::Object);
    }
    let last = parser.locate(path)?;
    Ok(parser.element(last, None)?.into_value())
}

/// [`extract`] from a string.
pub fn extract_str(xml: &str, path: &KeyPath, config: &ParserConfiguration) -> Result<Value, Error> {
    extract(StrSource::new(xml), path, config)
}

/// Parse the whole document with the element at `path` swapped for
/// `replacement`.
///
/// The path is walked first the same way [`extract`] walks it, so a missing
/// target fails with [`Error::NotFound`] before anything is built. The source is then
/// rewound and parsed again; a source that cannot rewind fails with
/// [`Error::UnsupportedOperation`]. The original target element is skipped
/// over textually and never parsed. Only the first match is replaced.
///
/// With the empty path the result is `replacement` itself if it is an
/// object, and otherwise a map holding it under the content key.
pub fn replace<S: CharSource>(
    mut source: S,
    path: &KeyPath,
    replacement: Value,
    config: &ParserConfiguration,
) -> Result<Map, Error> {
    if !path.is_empty() {
        // the target itself is left unread so that its content never has to parse
        Parser::new(Tokenizer::new(&mut source), config).locate(path)?;
    }
    source.rewind()?;
    if path.is_empty() {
        return Ok(match replacement {
            Value::Object(map) => map,
            other => {
                let mut map = Map::new();
                map.put(config.cdata_tag_name(), other);
                map
            }
        });
    }
    debug!(%path, "replacing");
    Parser::new(Tokenizer::new(source), config)
        .with_splice(path.segments(), replacement)
        .document()
}

/// [`replace`] in a string.
pub fn replace_str(
    xml: &str,
    path: &KeyPath,
    replacement: Value,
    config: &ParserConfiguration,
) -> Result<Map, Error> {
    replace(StrSource::new(xml), path, replacement, config)
}

impl<S: CharSource> Parser<'_, S> {
    /// Walk down a non-empty `path`, stopping just after the name of the
    /// element at its end. Returns that name.
    fn locate<'p>(&mut self, path: &'p KeyPath) -> Result<&'p str, Error> {
        let segments = path.segments();
        let mut open: Option<&str> = None;
        for (index, segment) in segments.iter().enumerate() {
            if !self.seek_child(segment, open)? {
                return Err(path.not_found(index));
            }
            if index + 1 == segments.len() {
                return Ok(segment.as_str());
            }
            if self.skip_attributes()? {
                // a self-closing element has no children to descend into
                return Err(path.not_found(index + 1));
            }
            open = Some(segment.as_str());
        }
        Err(Error::NotFound {
            path: path.to_string(),
            segment: String::new(),
        })
    }

    /// Move to just after the name of the first child of `open` (or of the
    /// top level) called `name`. Returns false when `open` closes or the
    /// input ends first.
    fn seek_child(&mut self, name: &str, open: Option<&str>) -> Result<bool, Error> {
        loop {
            match open {
                None => {
                    if !self.tokenizer.try_skip_past("<")? || !self.tokenizer.more()? {
                        return Ok(false);
                    }
                }
                Some(open) => match self.tokenizer.next_content()? {
                    Token::Lt => {}
                    Token::Text(_) => continue,
                    _ => {
                        return Err(self
                            .tokenizer
                            .syntax_error(format!("Unclosed tag {}", open)))
                    }
                },
            }
            match self.tokenizer.next_token()? {
                Token::Name(tag) if tag == name => return Ok(true),
                Token::Name(tag) => {
                    trace!(tag = tag.as_str(), "skipping sibling");
                    self.skip_element(&tag)?;
                }
                Token::Slash => {
                    self.close_tag(open)?;
                    return Ok(false);
                }
                token => self.skip_markup(token)?,
            }
        }
    }

    /// Skip the rest of an element whose name has been read, checking that
    /// tags stay balanced.
    fn skip_element(&mut self, tag: &str) -> Result<(), Error> {
        if self.skip_attributes()? {
            return Ok(());
        }
        loop {
            match self.tokenizer.next_content()? {
                Token::Lt => {}
                Token::Text(_) => continue,
                _ => {
                    return Err(self
                        .tokenizer
                        .syntax_error(format!("Unclosed tag {}", tag)))
                }
            }
            match self.tokenizer.next_token()? {
                Token::Name(child) => self.skip_element(&child)?,
                Token::Slash => return self.close_tag(Some(tag)),
                token => self.skip_markup(token)?,
            }
        }
    }

    /// Skip comments, CDATA, declarations and processing instructions.
    fn skip_markup(&mut self, token: Token) -> Result<(), Error> {
        match token {
            Token::Bang => self.markup_declaration().map(drop),
            Token::Question => self.tokenizer.skip_past("?>"),
            Token::Eof => Err(self.tokenizer.syntax_error("Misshaped element")),
            _ => Err(self.tokenizer.syntax_error("Misshaped tag")),
        }
    }
}
