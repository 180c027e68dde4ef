use std::borrow::Cow;

use crate::error::{Error, Position};

/// Whether a code point lies outside the XML `Char` production and must be
/// written as a numeric character reference.
fn must_escape(c: char) -> bool {
    !matches!(c as u32,
        0x09 | 0x0A | 0x0D | 0x20..=0xD7FF | 0xE000..=0xFFFD | 0x0001_0000..=0x0010_FFFF
    )
}

/// Escape text for use in XML content or attribute values.
///
/// The five predefined entities are used for `&`, `<`, `>`, `"` and `'`;
/// characters that XML does not allow are written as `&#xHEX;`.
pub fn escape(content: &str) -> Cow<'_, str> {
    if !content
        .chars()
        .any(|c| matches!(c, '&' | '<' | '>' | '"' | '\'') || must_escape(c))
    {
        return Cow::Borrowed(content);
    }
    let mut result = String::with_capacity(content.len() + 8);
    for c in content.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&apos;"),
            c if must_escape(c) => {
                result.push_str(&format!("&#x{:x};", c as u32));
            }
            c => result.push(c),
        }
    }
    Cow::Owned(result)
}

/// Resolve the body of an entity reference (the text between `&` and `;`).
///
/// Numeric references (`#65`, `#x41`) become their character; the five
/// predefined names become their character. Anything else is returned
/// as the literal reference, so unknown entities survive untouched.
pub fn unescape_entity(entity: &str) -> Cow<'static, str> {
    if entity.is_empty() {
        return Cow::Borrowed("");
    }
    if let Some(number) = entity.strip_prefix('#') {
        let code = match number.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16),
            None => number.parse::<u32>(),
        };
        return match code.ok().and_then(char::from_u32) {
            Some(c) => Cow::Owned(c.to_string()),
            None => Cow::Owned(format!("&{};", entity)),
        };
    }
    match entity {
        "amp" => Cow::Borrowed("&"),
        "apos" => Cow::Borrowed("'"),
        "gt" => Cow::Borrowed(">"),
        "lt" => Cow::Borrowed("<"),
        "quot" => Cow::Borrowed("\""),
        _ => Cow::Owned(format!("&{};", entity)),
    }
}

/// Replace entity references with the text they stand for.
///
/// An `&` without a following `;` is kept literally.
pub fn unescape(content: &str) -> Cow<'_, str> {
    if !content.contains('&') {
        return Cow::Borrowed(content);
    }
    let mut result = String::with_capacity(content.len());
    let mut rest = content;
    while let Some(amp) = rest.find('&') {
        result.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        match after.find(';') {
            Some(semicolon) => {
                result.push_str(&unescape_entity(&after[..semicolon]));
                rest = &after[semicolon + 1..];
            }
            None => {
                result.push('&');
                rest = after;
            }
        }
    }
    result.push_str(rest);
    Cow::Owned(result)
}

/// Reject names that are empty or contain whitespace.
pub fn no_space(name: &str) -> Result<(), Error> {
    if name.is_empty() {
        return Err(Error::syntax("Empty string.", Position::default()));
    }
    if name.chars().any(char::is_whitespace) {
        return Err(Error::syntax(
            format!("'{}' contains a space character.", name),
            Position::default(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unescape() {
        let text = "A &amp; B";
        assert_eq!(unescape(text), "A & B");
    }

    #[test]
    fn test_unescape_multiple() {
        let text = "&amp;&apos;&gt;&lt;&quot;";
        assert_eq!(unescape(text), "&'><\"");
    }

    #[test]
    fn test_unescape_numeric() {
        assert_eq!(unescape("&#65;&#x42;&#X43;"), "ABC");
    }

    #[test]
    fn test_unescape_unknown_entity() {
        assert_eq!(unescape("&unknown;"), "&unknown;");
    }

    #[test]
    fn test_unescape_unfinished_entity() {
        assert_eq!(unescape("a &amp b"), "a &amp b");
    }

    #[test]
    fn test_unescape_no_entities() {
        let text = "hello";
        let result = unescape(text);
        // this is the same slice
        assert!(std::ptr::eq(text, result.as_ref()));
    }

    #[test]
    fn test_escape() {
        let text = "A & B";
        assert_eq!(escape(text), "A &amp; B");
    }

    #[test]
    fn test_escape_multiple() {
        let text = "&'><\"";
        assert_eq!(escape(text), "&amp;&apos;&gt;&lt;&quot;");
    }

    #[test]
    fn test_escape_control_characters() {
        assert_eq!(escape("a\u{1}b\tc\u{FFFE}"), "a&#x1;b\tc&#xfffe;");
    }

    #[test]
    fn test_escape_keeps_supplementary_plane() {
        assert_eq!(escape("\u{1F600}"), "\u{1F600}");
    }

    #[test]
    fn test_escape_no_entities() {
        let text = "hello";
        let result = escape(text);
        // this is the same slice
        assert!(std::ptr::eq(text, result.as_ref()));
    }

    #[test]
    fn test_no_space() {
        assert!(no_space("tag").is_ok());
        assert!(no_space("").is_err());
        assert!(no_space("a b").is_err());
    }
}
