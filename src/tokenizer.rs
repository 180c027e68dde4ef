//! Lexical scanner for XML markup.
//!
//! The tokenizer pulls characters from a [`CharSource`] and hands out
//! [`Token`]s one at a time. It keeps one character and one token of
//! lookback; nothing else is buffered, so the input is read in a single
//! forward pass.

use tracing::trace;

use crate::entity::unescape_entity;
use crate::error::{Error, Position};
use crate::source::CharSource;

/// A lexical token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `/`
    Slash,
    /// `!`
    Bang,
    /// `?`
    Question,
    /// `=`
    Eq,
    /// A run of name characters.
    Name(String),
    /// A quoted attribute value with entities resolved, quotes removed.
    Quoted(String),
    /// Character data between markup, entities resolved, trimmed.
    Text(String),
    /// The input is exhausted.
    Eof,
}

pub struct Tokenizer<S> {
    source: S,
    previous: Option<char>,
    use_previous: bool,
    position: Position,
    previous_position: Position,
    pushed: Option<Token>,
}

impl<S: CharSource> Tokenizer<S> {
    pub fn new(source: S) -> Self {
        Tokenizer {
            source,
            previous: None,
            use_previous: false,
            position: Position {
                offset: 0,
                line: 1,
                column: 1,
            },
            previous_position: Position::default(),
            pushed: None,
        }
    }

    /// Give back the source. A character unread with `back` or a token
    /// restored with [`Tokenizer::push_back`] is lost.
    pub fn into_source(self) -> S {
        self.source
    }

    /// Where the next character will be read from.
    pub fn position(&self) -> Position {
        self.position
    }

    pub(crate) fn syntax_error(&self, message: impl Into<String>) -> Error {
        Error::syntax(message, self.position)
    }

    /// Read one character.
    pub(crate) fn next_char(&mut self) -> Result<Option<char>, Error> {
        let c = if self.use_previous {
            self.use_previous = false;
            self.previous
        } else {
            let c = self.source.next_char()?;
            self.previous = c;
            c
        };
        if let Some(c) = c {
            self.previous_position = self.position;
            self.position.offset += 1;
            if c == '\n' {
                self.position.line += 1;
                self.position.column = 1;
            } else {
                self.position.column += 1;
            }
        }
        Ok(c)
    }

    /// Unread the last character. Only one character can be unread.
    pub(crate) fn back(&mut self) {
        if !self.use_previous && self.previous.is_some() {
            self.use_previous = true;
            self.position = self.previous_position;
        }
    }

    /// Whether any input remains.
    pub fn more(&mut self) -> Result<bool, Error> {
        if self.pushed.is_some() {
            return Ok(true);
        }
        match self.next_char()? {
            Some(_) => {
                self.back();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn next_clean(&mut self) -> Result<Option<char>, Error> {
        loop {
            match self.next_char()? {
                Some(c) if c.is_whitespace() => continue,
                c => return Ok(c),
            }
        }
    }

    /// Restore a token so the next [`Tokenizer::next_token`] returns it
    /// again.
    pub fn push_back(&mut self, token: Token) {
        debug_assert!(self.pushed.is_none(), "only one token can be pushed back");
        self.pushed = Some(token);
    }

    /// Read the next token inside markup.
    ///
    /// Names end at whitespace or at one of `> / = ! ? [ ]`. Quoted
    /// values may use either quote character and have their entities
    /// resolved.
    pub fn next_token(&mut self) -> Result<Token, Error> {
        if let Some(token) = self.pushed.take() {
            return Ok(token);
        }
        let c = match self.next_clean()? {
            Some(c) => c,
            None => return Ok(Token::Eof),
        };
        match c {
            '<' => Err(self.syntax_error("Misplaced '<'")),
            '>' => Ok(Token::Gt),
            '/' => Ok(Token::Slash),
            '=' => Ok(Token::Eq),
            '!' => Ok(Token::Bang),
            '?' => Ok(Token::Question),
            '"' | '\'' => {
                let quote = c;
                let mut value = String::new();
                loop {
                    match self.next_char()? {
                        None => return Err(self.syntax_error("Unterminated string")),
                        Some(c) if c == quote => return Ok(Token::Quoted(value)),
                        Some('&') => value.push_str(&self.next_entity()?),
                        Some(c) => value.push(c),
                    }
                }
            }
            c => {
                let mut name = String::new();
                name.push(c);
                loop {
                    match self.next_char()? {
                        None => return Ok(Token::Name(name)),
                        Some(c) if c.is_whitespace() => return Ok(Token::Name(name)),
                        Some('>' | '/' | '=' | '!' | '?' | '[' | ']') => {
                            self.back();
                            return Ok(Token::Name(name));
                        }
                        Some('<' | '"' | '\'') => {
                            return Err(self.syntax_error("Bad character in a name"))
                        }
                        Some(c) => name.push(c),
                    }
                }
            }
        }
    }

    /// Read character data up to the next `<`.
    ///
    /// Returns [`Token::Text`] with surrounding whitespace removed,
    /// [`Token::Lt`] when markup starts immediately, or [`Token::Eof`].
    pub fn next_content(&mut self) -> Result<Token, Error> {
        let mut c = match self.next_clean()? {
            Some('<') => return Ok(Token::Lt),
            Some(c) => c,
            None => return Ok(Token::Eof),
        };
        let mut text = String::new();
        loop {
            match c {
                '<' => {
                    self.back();
                    break;
                }
                '&' => text.push_str(&self.next_entity()?),
                c => text.push(c),
            }
            c = match self.next_char()? {
                Some(c) => c,
                None => break,
            };
        }
        Ok(Token::Text(text.trim_matches(|c: char| c <= ' ').to_string()))
    }

    /// Read the body of a CDATA section, after `<![CDATA[`, through the
    /// closing `]]>`.
    pub fn next_cdata(&mut self) -> Result<String, Error> {
        let mut text = String::new();
        loop {
            match self.next_char()? {
                None => return Err(self.syntax_error("Unclosed CDATA")),
                Some(c) => text.push(c),
            }
            if text.ends_with("]]>") {
                text.truncate(text.len() - 3);
                return Ok(text);
            }
        }
    }

    /// Read an entity reference after its `&` and resolve it.
    fn next_entity(&mut self) -> Result<String, Error> {
        let mut entity = String::new();
        loop {
            match self.next_char()? {
                Some(c) if c.is_alphanumeric() || c == '#' => entity.push(c),
                Some(';') => break,
                _ => {
                    return Err(
                        self.syntax_error(format!("Missing ';' in XML entity: &{}", entity))
                    )
                }
            }
        }
        Ok(unescape_entity(&entity).into_owned())
    }

    /// Skip a markup declaration such as `<!DOCTYPE ...>`, balancing any
    /// nested `<` and `>`. Called after `<!`.
    pub fn skip_declaration(&mut self) -> Result<(), Error> {
        let mut depth = 1usize;
        while depth > 0 {
            let c = match self.next_clean()? {
                Some(c) => c,
                None => return Err(self.syntax_error("Missing '>' after '<!'.")),
            };
            match c {
                '<' => depth += 1,
                '>' => depth -= 1,
                '"' | '\'' => {
                    let quote = c;
                    loop {
                        match self.next_char()? {
                            None => return Err(self.syntax_error("Unterminated string")),
                            Some(c) if c == quote => break,
                            Some(_) => {}
                        }
                    }
                }
                _ => {}
            }
        }
        trace!("skipped markup declaration");
        Ok(())
    }

    /// Consume input up to and including the first occurrence of
    /// `marker`. Returns false when the input ends first.
    pub fn try_skip_past(&mut self, marker: &str) -> Result<bool, Error> {
        self.pushed = None;
        let target: Vec<char> = marker.chars().collect();
        if target.is_empty() {
            return Ok(true);
        }
        let mut window: Vec<char> = Vec::with_capacity(target.len());
        while let Some(c) = self.next_char()? {
            if window.len() == target.len() {
                window.remove(0);
            }
            window.push(c);
            if window == target {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Consume input up to and including the first occurrence of
    /// `marker`, failing when the input ends first.
    pub fn skip_past(&mut self, marker: &str) -> Result<(), Error> {
        trace!(marker, "skipping");
        if self.try_skip_past(marker)? {
            Ok(())
        } else {
            Err(self.syntax_error(format!("Expected '{}' before end of input", marker)))
        }
    }

    /// Skip the content and the close tag of element `tag`, whose start tag
    /// has just been read through its `>`.
    ///
    /// The content is scanned as text, never tokenized. Nested elements with
    /// the same name are balanced, a close tag only counts when the name is
    /// followed by whitespace or `>`, and comments, CDATA sections and
    /// processing instructions are passed over whole.
    pub fn skip_element_content(&mut self, tag: &str) -> Result<(), Error> {
        let mut depth = 0usize;
        loop {
            if !self.try_skip_past("<")? {
                return Err(self.syntax_error(format!(
                    "Expected '</{}' before end of input",
                    tag
                )));
            }
            match self.next_char()? {
                Some('/') => {
                    if self.match_name(tag)? {
                        if depth == 0 {
                            self.skip_past(">")?;
                            trace!(tag, "skipped element content");
                            return Ok(());
                        }
                        depth -= 1;
                    }
                }
                Some('!') => match self.next_char()? {
                    Some('-') => self.skip_past("-->")?,
                    Some('[') => self.skip_past("]]>")?,
                    _ => self.back(),
                },
                Some('?') => self.skip_past("?>")?,
                Some(_) => {
                    self.back();
                    if self.match_name(tag)? && !self.skip_start_tag()? {
                        depth += 1;
                    }
                }
                None => {}
            }
        }
    }

    /// Read `name` if it comes next as a whole name, ending at whitespace,
    /// `>` or `/`. The character that ended the attempt is unread.
    fn match_name(&mut self, name: &str) -> Result<bool, Error> {
        for expected in name.chars() {
            match self.next_char()? {
                Some(c) if c == expected => {}
                Some(_) => {
                    self.back();
                    return Ok(false);
                }
                None => return Ok(false),
            }
        }
        match self.next_char()? {
            Some(c) => {
                self.back();
                Ok(c.is_whitespace() || c == '>' || c == '/')
            }
            None => Ok(false),
        }
    }

    /// Read the rest of a start tag through its `>`. Returns true when the
    /// tag closes itself.
    fn skip_start_tag(&mut self) -> Result<bool, Error> {
        let mut last = None;
        loop {
            match self.next_char()? {
                None => return Err(self.syntax_error("Misshaped element")),
                Some('>') => return Ok(last == Some('/')),
                Some(quote @ ('"' | '\'')) => {
                    loop {
                        match self.next_char()? {
                            None => return Err(self.syntax_error("Unterminated string")),
                            Some(c) if c == quote => break,
                            Some(_) => {}
                        }
                    }
                    last = Some(quote);
                }
                Some(c) if c.is_whitespace() => {}
                Some(c) => last = Some(c),
            }
        }
    }
}

/// Tokens up to, not including, [`Token::Eof`].
impl<S: CharSource> Iterator for Tokenizer<S> {
    type Item = Result<Token, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_token() {
            Ok(Token::Eof) => None,
            result => Some(result),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::StrSource;
    use rstest::rstest;

    fn tokenizer(text: &str) -> Tokenizer<StrSource<'_>> {
        Tokenizer::new(StrSource::new(text))
    }

    #[test]
    fn test_markup_tokens() {
        let tokens: Vec<Token> = tokenizer(r#"a b='1 &amp; 2' c="x"/>"#)
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Name("a".to_string()),
                Token::Name("b".to_string()),
                Token::Eq,
                Token::Quoted("1 & 2".to_string()),
                Token::Name("c".to_string()),
                Token::Eq,
                Token::Quoted("x".to_string()),
                Token::Slash,
                Token::Gt,
            ]
        );
    }

    #[test]
    fn test_name_stops_at_bracket() {
        let mut t = tokenizer("CDATA[x]]>");
        assert_eq!(t.next_token().unwrap(), Token::Name("CDATA".to_string()));
        assert_eq!(t.next_char().unwrap(), Some('['));
        assert_eq!(t.next_cdata().unwrap(), "x");
    }

    #[test]
    fn test_misplaced_lt() {
        let err = tokenizer("<").next_token().unwrap_err();
        assert!(matches!(err, Error::Syntax { .. }));
    }

    #[test]
    fn test_bad_character_in_name() {
        let err = tokenizer("ab\"c").next_token().unwrap_err();
        assert!(err.to_string().starts_with("Bad character in a name"));
    }

    #[test]
    fn test_unterminated_string() {
        let err = tokenizer("'abc").next_token().unwrap_err();
        assert!(err.to_string().starts_with("Unterminated string"));
    }

    #[test]
    fn test_push_back() {
        let mut t = tokenizer("a>");
        let token = t.next_token().unwrap();
        t.push_back(token);
        assert_eq!(t.next_token().unwrap(), Token::Name("a".to_string()));
        assert_eq!(t.next_token().unwrap(), Token::Gt);
        assert_eq!(t.next_token().unwrap(), Token::Eof);
    }

    #[test]
    fn test_content() {
        let mut t = tokenizer("  hello &lt;world&gt; </a>");
        assert_eq!(
            t.next_content().unwrap(),
            Token::Text("hello <world>".to_string())
        );
        assert_eq!(t.next_content().unwrap(), Token::Lt);
        assert_eq!(t.next_token().unwrap(), Token::Slash);
    }

    #[test]
    fn test_content_eof() {
        let mut t = tokenizer("   ");
        assert_eq!(t.next_content().unwrap(), Token::Eof);
    }

    #[test]
    fn test_missing_entity_semicolon() {
        let err = tokenizer("AT&T rocks").next_content().unwrap_err();
        assert!(err.to_string().starts_with("Missing ';' in XML entity: &T"));
    }

    #[test]
    fn test_unclosed_cdata() {
        let err = tokenizer("abc]]").next_cdata().unwrap_err();
        assert!(err.to_string().starts_with("Unclosed CDATA"));
    }

    #[test]
    fn test_skip_past() {
        let mut t = tokenizer("ignored --> <a>");
        t.skip_past("-->").unwrap();
        assert_eq!(t.next_content().unwrap(), Token::Lt);
    }

    #[test]
    fn test_skip_past_overlapping() {
        let mut t = tokenizer("a]]]>b");
        t.skip_past("]]>").unwrap();
        assert_eq!(t.next_char().unwrap(), Some('b'));
    }

    #[test]
    fn test_skip_past_missing() {
        let mut t = tokenizer("no marker here");
        assert!(t.skip_past("?>").is_err());
    }

    #[test]
    fn test_skip_declaration_nested() {
        let mut t = tokenizer(r#"DOCTYPE a [<!ENTITY e "x>y">]> rest"#);
        t.skip_declaration().unwrap();
        assert_eq!(t.next_content().unwrap(), Token::Text("rest".to_string()));
    }

    #[test]
    fn test_position_tracks_lines() {
        let mut t = tokenizer("a\nbc");
        t.skip_past("b").unwrap();
        let position = t.position();
        assert_eq!(position.line, 2);
        assert_eq!(position.column, 2);
        assert_eq!(position.offset, 3);
    }

    #[test]
    fn test_into_source_continues_after_consumed_input() {
        let mut t = tokenizer("a>rest");
        assert_eq!(t.next_token().unwrap(), Token::Name("a".to_string()));
        assert_eq!(t.next_token().unwrap(), Token::Gt);
        let mut source = t.into_source();
        assert_eq!(source.next_char().unwrap(), Some('r'));
    }

    #[rstest]
    #[case("x</a> rest")]
    #[case("<as>1</as></a> rest")]
    #[case("<a><a>1</a></a></a> rest")]
    #[case("<a/><a x='/'/></a > rest")]
    #[case("<a x=\"</a>\">1</a></a> rest")]
    #[case("<!-- </a> --><![CDATA[</a>]]><?pi </a>?></a> rest")]
    #[case("<b><<&</b></a> rest")]
    fn test_skip_element_content(#[case] text: &str) {
        let mut t = tokenizer(text);
        t.skip_element_content("a").unwrap();
        assert_eq!(t.next_content().unwrap(), Token::Text("rest".to_string()));
    }

    #[test]
    fn test_skip_element_content_unclosed() {
        let mut t = tokenizer("<a>1</a>");
        let err = t.skip_element_content("a").unwrap_err();
        assert!(err
            .to_string()
            .starts_with("Expected '</a' before end of input"));
    }

    #[test]
    fn test_back_restores_position() {
        let mut t = tokenizer("ab");
        t.next_char().unwrap();
        let before = t.position();
        t.next_char().unwrap();
        t.back();
        assert_eq!(t.position(), before);
        assert_eq!(t.next_char().unwrap(), Some('b'));
    }
}
