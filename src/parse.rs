//! Recursive descent from tokens to a value tree.
//!
//! One [`Parser`] drives every way of reading a document: a plain full
//! parse, a parse with renamed keys, and the reconstruction scan of
//! [`replace`](crate::replace), which splices a value in at the end of a
//! path and skips the original element unread.

use std::io::Read;

use tracing::debug;

use crate::coerce::{string_to_value, TypeConverter};
use crate::config::{ParserConfiguration, NIL_ATTRIBUTE, TYPE_ATTRIBUTE};
use crate::error::Error;
use crate::source::{CharSource, ReaderSource, StrSource};
use crate::tokenizer::{Token, Tokenizer};
use crate::value::{Map, Value};

/// Parse an XML string with the default configuration.
///
/// ```rust
/// let map = xmlson::parse_str("<a><b>1</b><b>2</b></a>")?;
/// assert_eq!(xmlson::to_string(&map.into()), "<a><b>1</b><b>2</b></a>");
/// # Ok::<(), xmlson::Error>(())
/// ```
pub fn parse_str(xml: &str) -> Result<Map, Error> {
    parse_str_with(xml, &ParserConfiguration::default())
}

/// Parse an XML string.
pub fn parse_str_with(xml: &str, config: &ParserConfiguration) -> Result<Map, Error> {
    parse_source(StrSource::new(xml), config)
}

/// Parse UTF-8 encoded XML from a reader with the default configuration.
pub fn parse_reader(reader: impl Read) -> Result<Map, Error> {
    parse_reader_with(reader, &ParserConfiguration::default())
}

/// Parse UTF-8 encoded XML from a reader.
pub fn parse_reader_with(reader: impl Read, config: &ParserConfiguration) -> Result<Map, Error> {
    parse_source(ReaderSource::new(reader), config)
}

/// Parse XML from any character source.
pub fn parse_source<S: CharSource>(source: S, config: &ParserConfiguration) -> Result<Map, Error> {
    Parser::new(Tokenizer::new(source), config).document()
}

/// Parse XML, passing every tag and attribute name through `keys` before
/// it becomes a key in the tree.
///
/// The content key is used as configured. Forced lists and the reserved
/// attributes are matched against the names as written in the document.
///
/// ```rust
/// use xmlson::{parse_source_with_keys, ParserConfiguration, StrSource};
///
/// let map = parse_source_with_keys(
///     StrSource::new(r#"<Book Id="7"><Title>A</Title></Book>"#),
///     &ParserConfiguration::default(),
///     &|name: &str| name.to_lowercase(),
/// )?;
/// let book = map.get("book").unwrap();
/// assert_eq!(book.get("id"), Some(&7.into()));
/// assert_eq!(book.get("title"), Some(&"A".into()));
/// # Ok::<(), xmlson::Error>(())
/// ```
pub fn parse_source_with_keys<S: CharSource>(
    source: S,
    config: &ParserConfiguration,
    keys: &dyn Fn(&str) -> String,
) -> Result<Map, Error> {
    Parser::new(Tokenizer::new(source), config)
        .with_keys(keys)
        .document()
}

/// A value to splice in at the end of a path during a reconstruction scan.
struct Splice<'c> {
    segments: &'c [String],
    /// Taken once spliced; everything after is parsed plainly.
    replacement: Option<Value>,
}

/// What to do with an element that was just opened.
enum Route {
    /// Build it, with no path tracking below it.
    Plain,
    /// Build it, matching children against the path segment at this index.
    Descend(usize),
    /// Replace it and skip its original content.
    Splice,
}

/// An element that has been read to its end.
pub(crate) enum Folded {
    /// No attributes, no content.
    Empty,
    Value(Value),
}

impl Folded {
    pub(crate) fn into_value(self) -> Value {
        match self {
            Folded::Empty => Value::String(String::new()),
            Folded::Value(value) => value,
        }
    }
}

pub(crate) struct Parser<'c, S> {
    pub(crate) tokenizer: Tokenizer<S>,
    config: &'c ParserConfiguration,
    keys: Option<&'c dyn Fn(&str) -> String>,
    splice: Option<Splice<'c>>,
}

impl<'c, S: CharSource> Parser<'c, S> {
    pub(crate) fn new(tokenizer: Tokenizer<S>, config: &'c ParserConfiguration) -> Self {
        Parser {
            tokenizer,
            config,
            keys: None,
            splice: None,
        }
    }

    pub(crate) fn with_keys(mut self, keys: &'c dyn Fn(&str) -> String) -> Self {
        self.keys = Some(keys);
        self
    }

    pub(crate) fn with_splice(mut self, segments: &'c [String], replacement: Value) -> Self {
        self.splice = Some(Splice {
            segments,
            replacement: Some(replacement),
        });
        self
    }

    fn key(&self, name: &str) -> String {
        match self.keys {
            Some(keys) => keys(name),
            None => name.to_string(),
        }
    }

    /// Parse every top-level element into one map. Text outside elements
    /// is ignored.
    pub(crate) fn document(mut self) -> Result<Map, Error> {
        debug!(splice = self.splice.is_some(), "parsing document");
        let depth = self.splice.as_ref().map(|_| 0);
        let mut root = Map::new();
        while self.tokenizer.try_skip_past("<")? {
            if self.tokenizer.more()? {
                self.parse(&mut root, None, depth)?;
            }
        }
        Ok(root)
    }

    /// Scan one piece of markup after its `<` and attach what it yields to
    /// `context`.
    ///
    /// Returns true when this was the close tag of `open`. `depth` is the
    /// index of the path segment an element opened here would match.
    fn parse(
        &mut self,
        context: &mut Map,
        open: Option<&str>,
        depth: Option<usize>,
    ) -> Result<bool, Error> {
        match self.tokenizer.next_token()? {
            Token::Bang => {
                if let Some(cdata) = self.markup_declaration()? {
                    if !cdata.is_empty() {
                        context.accumulate(self.config.cdata_tag_name(), Value::String(cdata));
                    }
                }
                Ok(false)
            }
            Token::Question => {
                self.tokenizer.skip_past("?>")?;
                Ok(false)
            }
            Token::Slash => {
                self.close_tag(open)?;
                Ok(true)
            }
            Token::Name(tag) => {
                let folded = match self.route(&tag, depth) {
                    Route::Splice => {
                        self.splice_element(context, &tag)?;
                        return Ok(false);
                    }
                    Route::Descend(child_depth) => self.element(&tag, Some(child_depth))?,
                    Route::Plain => self.element(&tag, None)?,
                };
                self.commit(context, &tag, folded);
                Ok(false)
            }
            Token::Eof => Err(self.tokenizer.syntax_error("Misshaped element")),
            _ => Err(self.tokenizer.syntax_error("Misshaped tag")),
        }
    }

    fn route(&self, tag: &str, depth: Option<usize>) -> Route {
        let (splice, depth) = match (&self.splice, depth) {
            (Some(splice), Some(depth)) if splice.replacement.is_some() => (splice, depth),
            _ => return Route::Plain,
        };
        match splice.segments.get(depth) {
            Some(segment) if segment == tag => {
                if depth + 1 == splice.segments.len() {
                    Route::Splice
                } else {
                    Route::Descend(depth + 1)
                }
            }
            _ => Route::Plain,
        }
    }

    /// Handle `<!` forms: comments and declarations are skipped, a CDATA
    /// section yields its text.
    pub(crate) fn markup_declaration(&mut self) -> Result<Option<String>, Error> {
        match self.tokenizer.next_char()? {
            Some('-') => {
                if self.tokenizer.next_char()? == Some('-') {
                    self.tokenizer.skip_past("-->")?;
                    return Ok(None);
                }
                self.tokenizer.back();
            }
            Some('[') => {
                if let Token::Name(name) = self.tokenizer.next_token()? {
                    if name == "CDATA" && self.tokenizer.next_char()? == Some('[') {
                        return self.tokenizer.next_cdata().map(Some);
                    }
                }
                return Err(self.tokenizer.syntax_error("Expected 'CDATA['"));
            }
            _ => {}
        }
        self.tokenizer.skip_declaration()?;
        Ok(None)
    }

    /// Read the rest of a close tag after `</` and check it closes `open`.
    pub(crate) fn close_tag(&mut self, open: Option<&str>) -> Result<(), Error> {
        let token = self.tokenizer.next_token()?;
        let open = match open {
            Some(open) => open,
            None => {
                return Err(self
                    .tokenizer
                    .syntax_error(format!("Mismatched close tag {}", describe(&token))))
            }
        };
        match &token {
            Token::Name(name) if name == open => {}
            _ => {
                return Err(self.tokenizer.syntax_error(format!(
                    "Mismatched {} and {}",
                    open,
                    describe(&token)
                )))
            }
        }
        if self.tokenizer.next_token()? != Token::Gt {
            return Err(self.tokenizer.syntax_error("Misshaped close tag"));
        }
        Ok(())
    }

    /// Read an element after its name: attributes, then either `/>` or
    /// content through the matching close tag.
    pub(crate) fn element(&mut self, tag: &str, child_depth: Option<usize>) -> Result<Folded, Error> {
        let config = self.config;
        let mut element = Map::new();
        let mut nil = false;
        let mut converter: Option<&TypeConverter> = None;
        let mut pending: Option<Token> = None;
        loop {
            let token = match pending.take() {
                Some(token) => token,
                None => self.tokenizer.next_token()?,
            };
            match token {
                Token::Name(attribute) => {
                    let next = self.tokenizer.next_token()?;
                    if next != Token::Eq {
                        element.accumulate(self.key(&attribute), Value::String(String::new()));
                        pending = Some(next);
                        continue;
                    }
                    let value = match self.tokenizer.next_token()? {
                        Token::Quoted(value) | Token::Name(value) => value,
                        _ => return Err(self.tokenizer.syntax_error("Missing value")),
                    };
                    if attribute == NIL_ATTRIBUTE && value.eq_ignore_ascii_case("true") {
                        // without conversion the marker is dropped and the element kept
                        nil |= config.convert_nil_attribute_to_null();
                    } else if config.has_type_converters() && attribute == TYPE_ATTRIBUTE {
                        converter = config.type_converter(&value);
                    } else if !nil {
                        element.accumulate(self.key(&attribute), self.coerce(value));
                    }
                }
                Token::Slash => {
                    if self.tokenizer.next_token()? != Token::Gt {
                        return Err(self.tokenizer.syntax_error("Misshaped tag"));
                    }
                    return Ok(fold(element, nil, None));
                }
                Token::Gt => loop {
                    match self.tokenizer.next_content()? {
                        Token::Text(text) => {
                            if !text.is_empty() {
                                let value = match converter {
                                    Some(converter) => converter.convert(&text),
                                    None => self.coerce(text),
                                };
                                element.accumulate(config.cdata_tag_name(), value);
                            }
                        }
                        Token::Lt => {
                            if self.parse(&mut element, Some(tag), child_depth)? {
                                return Ok(fold(element, nil, Some(config.cdata_tag_name())));
                            }
                        }
                        _ => {
                            return Err(self
                                .tokenizer
                                .syntax_error(format!("Unclosed tag {}", tag)))
                        }
                    }
                },
                Token::Eof => return Err(self.tokenizer.syntax_error("Misshaped element")),
                _ => return Err(self.tokenizer.syntax_error("Misshaped tag")),
            }
        }
    }

    fn coerce(&self, text: String) -> Value {
        if self.config.is_keep_strings() {
            Value::String(text)
        } else {
            string_to_value(&text)
        }
    }

    /// Attach a finished element to its parent under the tag name.
    fn commit(&self, context: &mut Map, tag: &str, folded: Folded) {
        let key = self.key(tag);
        if self.config.is_forced_list(tag) {
            match folded {
                Folded::Empty => {
                    if !context.contains_key(&key) {
                        context.put(key, Value::Array(Vec::new()));
                    }
                }
                Folded::Value(value) => context.append(key, value),
            }
        } else {
            context.accumulate(key, folded.into_value());
        }
    }

    /// Put the replacement where this element would go, then move past the
    /// element without reading its content.
    fn splice_element(&mut self, context: &mut Map, tag: &str) -> Result<(), Error> {
        let replacement = self
            .splice
            .as_mut()
            .and_then(|splice| splice.replacement.take())
            .unwrap_or_default();
        debug!(tag, "splicing replacement");
        self.commit(context, tag, Folded::Value(replacement));
        if !self.skip_attributes()? {
            self.tokenizer.skip_element_content(tag)?;
        }
        Ok(())
    }

    /// Consume the attributes of a start tag without keeping them. Returns
    /// true for a self-closing tag.
    pub(crate) fn skip_attributes(&mut self) -> Result<bool, Error> {
        loop {
            match self.tokenizer.next_token()? {
                Token::Name(_) | Token::Quoted(_) | Token::Eq => {}
                Token::Gt => return Ok(false),
                Token::Slash => {
                    if self.tokenizer.next_token()? != Token::Gt {
                        return Err(self.tokenizer.syntax_error("Misshaped tag"));
                    }
                    return Ok(true);
                }
                Token::Eof => return Err(self.tokenizer.syntax_error("Misshaped element")),
                _ => return Err(self.tokenizer.syntax_error("Misshaped tag")),
            }
        }
    }
}

/// Collapse an element map. With `content_key` set, an element holding only
/// text becomes that text.
fn fold(element: Map, nil: bool, content_key: Option<&str>) -> Folded {
    if nil {
        return Folded::Value(Value::Null);
    }
    if element.is_empty() {
        return Folded::Empty;
    }
    match content_key {
        Some(key) => match element.into_single(key) {
            Ok(value) => Folded::Value(value),
            Err(element) => Folded::Value(Value::Object(element)),
        },
        None => Folded::Value(Value::Object(element)),
    }
}

fn describe(token: &Token) -> String {
    match token {
        Token::Name(s) | Token::Quoted(s) | Token::Text(s) => s.clone(),
        Token::Lt => "<".to_string(),
        Token::Gt => ">".to_string(),
        Token::Slash => "/".to_string(),
        Token::Bang => "!".to_string(),
        Token::Question => "?".to_string(),
        Token::Eq => "=".to_string(),
        Token::Eof => "end of input".to_string(),
    }
}
