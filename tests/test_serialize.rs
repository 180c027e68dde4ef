use xmlson::{parse_str, serialize, to_string, to_string_with, Map, ParserConfiguration, Value};

fn reserialize(xml: &str) -> String {
    to_string(&Value::Object(parse_str(xml).unwrap()))
}

#[test]
fn test_serialize_elements() {
    assert_eq!(
        reserialize("<a><b>1</b><b>2</b><c>x</c></a>"),
        "<a><b>1</b><b>2</b><c>x</c></a>"
    );
}

#[test]
fn test_attributes_become_elements() {
    insta::assert_snapshot!(
        reserialize(r#"<a id="1" name="n"><b/></a>"#),
        @"<a><id>1</id><name>n</name><b/></a>"
    );
}

#[test]
fn test_empty_element_self_closes() {
    assert_eq!(reserialize("<a><b></b></a>"), "<a><b/></a>");
}

#[test]
fn test_text_with_attributes() {
    insta::assert_snapshot!(
        reserialize(r#"<a lang="en">hello</a>"#),
        @"<a><lang>en</lang>hello</a>"
    );
}

#[test]
fn test_escaping() {
    insta::assert_snapshot!(
        reserialize("<a>&lt;&amp;&gt;&quot;&apos;</a>"),
        @"<a>&lt;&amp;&gt;&quot;&apos;</a>"
    );
}

#[test]
fn test_illegal_characters_escaped() {
    let mut map = Map::new();
    map.put("a", "x\u{1}y\u{FFFE}".into());
    assert_eq!(to_string(&map.into()), "<a>x&#x1;y&#xfffe;</a>");
}

#[test]
fn test_numbers_and_literals() {
    let map = parse_str("<a><i>5</i><d>1.50</d><t>true</t><n>null</n></a>").unwrap();
    insta::assert_snapshot!(
        to_string(&map.into()),
        @"<a><i>5</i><d>1.50</d><t>true</t><n>null</n></a>"
    );
}

#[test]
fn test_wrapping_tag() {
    let map = parse_str("<b>1</b>").unwrap();
    let config = ParserConfiguration::default();
    assert_eq!(
        to_string_with(&map.into(), Some("root"), &config),
        "<root><b>1</b></root>"
    );
}

#[test]
fn test_top_level_scalars() {
    let config = ParserConfiguration::default();
    assert_eq!(to_string(&Value::from("x")), "\"x\"");
    assert_eq!(to_string(&Value::from(7)), "\"7\"");
    assert_eq!(to_string_with(&Value::from(7), Some("n"), &config), "<n>7</n>");
}

#[test]
fn test_top_level_array() {
    let config = ParserConfiguration::default();
    let value = Value::Array(vec!["x".into(), "".into()]);
    assert_eq!(to_string(&value), "<array>x</array><array/>");
    assert_eq!(
        to_string_with(&value, Some("item"), &config),
        "<item>x</item><item/>"
    );
}

#[test]
fn test_display_uses_serializer() {
    let map = parse_str("<a><b>1</b></a>").unwrap();
    assert_eq!(Value::Object(map).to_string(), "<a><b>1</b></a>");
}

#[test]
fn test_serialize_to_writer() {
    let map = parse_str("<a>1</a>").unwrap();
    let mut buf = Vec::new();
    serialize(&map.into(), None, &ParserConfiguration::default(), &mut buf).unwrap();
    assert_eq!(String::from_utf8(buf).unwrap(), "<a>1</a>");
}
