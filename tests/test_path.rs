use std::io::Cursor;

use rstest::rstest;

use xmlson::{
    extract, extract_str, replace, replace_str, Error, KeyPath, Map, ParserConfiguration,
    ReaderSource, SeekReaderSource, StrSource, Value,
};

const CATALOG: &str = "<catalog><book><title>A</title></book><cd>x</cd></catalog>";

fn path(s: &str) -> KeyPath {
    s.parse().unwrap()
}

fn title(value: &str) -> Value {
    let mut map = Map::new();
    map.put("title", value.into());
    Value::Object(map)
}

#[test]
fn test_extract_subtree() {
    let config = ParserConfiguration::default();
    let value = extract_str(CATALOG, &path("/catalog/book"), &config).unwrap();
    assert_eq!(value, title("A"));
}

#[test]
fn test_extract_scalar() {
    let config = ParserConfiguration::default();
    let value = extract_str(CATALOG, &path("/catalog/book/title"), &config).unwrap();
    assert_eq!(value, Value::from("A"));
}

#[test]
fn test_extract_missing() {
    let config = ParserConfiguration::default();
    let err = extract_str(CATALOG, &path("/catalog/missing"), &config).unwrap_err();
    match err {
        Error::NotFound { path, segment } => {
            assert_eq!(path, "/catalog/missing");
            assert_eq!(segment, "missing");
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_extract_wrong_root() {
    let config = ParserConfiguration::default();
    let err = extract_str(CATALOG, &path("/book"), &config).unwrap_err();
    assert!(matches!(err, Error::NotFound { segment, .. } if segment == "book"));
}

#[test]
fn test_extract_takes_first_match_without_backtracking() {
    let config = ParserConfiguration::default();
    let xml = "<r><b><x/></b><b><t>2</t></b></r>";
    let err = extract_str(xml, &path("/r/b/t"), &config).unwrap_err();
    assert!(matches!(err, Error::NotFound { segment, .. } if segment == "t"));

    let xml = "<r><b><t>1</t></b><b><t>2</t></b></r>";
    let value = extract_str(xml, &path("/r/b/t"), &config).unwrap();
    assert_eq!(value, Value::from(1));
}

#[test]
fn test_extract_does_not_match_deeper_descendants() {
    let config = ParserConfiguration::default();
    let xml = "<r><x><b>deep</b></x><b>near</b></r>";
    let value = extract_str(xml, &path("/r/b"), &config).unwrap();
    assert_eq!(value, Value::from("near"));
}

#[test]
fn test_extract_through_self_closing() {
    let config = ParserConfiguration::default();
    let err = extract_str("<r><b/></r>", &path("/r/b/t"), &config).unwrap_err();
    assert!(matches!(err, Error::NotFound { segment, .. } if segment == "t"));
}

#[test]
fn test_extract_empty_element() {
    let config = ParserConfiguration::default();
    let value = extract_str("<r><b/></r>", &path("/r/b"), &config).unwrap();
    assert_eq!(value, Value::from(""));
}

#[test]
fn test_extract_nil() {
    let config = ParserConfiguration::default().with_convert_nil_attribute_to_null(true);
    let value = extract_str(r#"<r><b xsi:nil="true"/></r>"#, &path("/r/b"), &config).unwrap();
    assert_eq!(value, Value::Null);
}

#[test]
fn test_extract_stops_after_target() {
    let config = ParserConfiguration::default();
    let value = extract_str("<r><b>1</b><oops", &path("/r/b"), &config).unwrap();
    assert_eq!(value, Value::from(1));
}

#[test]
fn test_extract_skips_comments_and_cdata() {
    let config = ParserConfiguration::default();
    let xml = "<r><!-- <b>no</b> --><![CDATA[<b>no</b>]]><?pi <b>?><b>yes</b></r>";
    let value = extract_str(xml, &path("/r/b"), &config).unwrap();
    assert_eq!(value, Value::from("yes"));
}

#[test]
fn test_extract_empty_path_is_whole_document() {
    let config = ParserConfiguration::default();
    let value = extract_str(CATALOG, &path("/"), &config).unwrap();
    assert_eq!(value.pointer(["catalog", "cd"]), Some(&Value::from("x")));
}

#[test]
fn test_extract_from_reader() {
    let config = ParserConfiguration::default();
    let value = extract(
        ReaderSource::new(CATALOG.as_bytes()),
        &path("/catalog/cd"),
        &config,
    )
    .unwrap();
    assert_eq!(value, Value::from("x"));
}

#[test]
fn test_replace() {
    let config = ParserConfiguration::default();
    let map = replace_str(CATALOG, &path("/catalog/book"), title("B"), &config).unwrap();
    let catalog = map.get("catalog").unwrap();
    assert_eq!(catalog.get("book"), Some(&title("B")));
    assert_eq!(catalog.get("cd"), Some(&Value::from("x")));
}

#[test]
fn test_replace_keeps_sibling_order() {
    let config = ParserConfiguration::default();
    let xml = "<r><a>1</a><b>2</b><c>3</c></r>";
    let map = replace_str(xml, &path("/r/b"), "X".into(), &config).unwrap();
    let r = map.get("r").unwrap().as_object().unwrap();
    assert_eq!(r.keys().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    assert_eq!(r.get("b"), Some(&Value::from("X")));
}

#[test]
fn test_replace_skips_malformed_target() {
    let config = ParserConfiguration::default();
    let xml = "<catalog><book><title>A<<&</book><cd>x</cd></catalog>";
    let map = replace_str(xml, &path("/catalog/book"), title("B"), &config).unwrap();
    let catalog = map.get("catalog").unwrap();
    assert_eq!(catalog.get("book"), Some(&title("B")));
    assert_eq!(catalog.get("cd"), Some(&Value::from("x")));
}

#[rstest]
#[case("<catalog><book><books>1</books></book><cd>x</cd></catalog>")]
#[case("<catalog><book><book>1</book></book><cd>x</cd></catalog>")]
#[case("<catalog><book><!-- </book> --><book/>1</book><cd>x</cd></catalog>")]
fn test_replace_skips_target_content_balanced(#[case] xml: &str) {
    let config = ParserConfiguration::default();
    let map = replace_str(xml, &path("/catalog/book"), "X".into(), &config).unwrap();
    let catalog = map.get("catalog").unwrap();
    assert_eq!(catalog.get("book"), Some(&Value::from("X")));
    assert_eq!(catalog.get("cd"), Some(&Value::from("x")));
}

#[test]
fn test_replace_only_first_match() {
    let config = ParserConfiguration::default();
    let map = replace_str("<r><b>1</b><b>2</b></r>", &path("/r/b"), "X".into(), &config).unwrap();
    assert_eq!(
        map.get("r").unwrap().get("b"),
        Some(&Value::Array(vec!["X".into(), 2.into()]))
    );
}

#[test]
fn test_replace_only_within_first_path() {
    let config = ParserConfiguration::default();
    let xml = "<r><b><t>1</t></b><b><t>2</t></b></r>";
    let map = replace_str(xml, &path("/r/b/t"), "X".into(), &config).unwrap();
    let books = map.get("r").unwrap().get("b").unwrap().as_array().unwrap();
    assert_eq!(books[0].get("t"), Some(&Value::from("X")));
    assert_eq!(books[1].get("t"), Some(&Value::from(2)));
}

#[test]
fn test_replace_self_closing_target() {
    let config = ParserConfiguration::default();
    let map = replace_str(r#"<r><b x="1"/><c>1</c></r>"#, &path("/r/b"), 5.into(), &config).unwrap();
    let r = map.get("r").unwrap();
    assert_eq!(r.get("b"), Some(&Value::from(5)));
    assert_eq!(r.get("c"), Some(&Value::from(1)));
}

#[test]
fn test_replace_forced_list() {
    let config = ParserConfiguration::default().with_force_list(["b"]);
    let map = replace_str("<r><b>1</b></r>", &path("/r/b"), "X".into(), &config).unwrap();
    assert_eq!(
        map.get("r").unwrap().get("b"),
        Some(&Value::Array(vec!["X".into()]))
    );
}

#[test]
fn test_replace_missing_path() {
    let config = ParserConfiguration::default();
    let err = replace_str(CATALOG, &path("/catalog/dvd"), "X".into(), &config).unwrap_err();
    assert!(matches!(err, Error::NotFound { segment, .. } if segment == "dvd"));
}

#[test]
fn test_replace_needs_rewind() {
    let config = ParserConfiguration::default();
    let err = replace(
        ReaderSource::new(CATALOG.as_bytes()),
        &path("/catalog/book"),
        "X".into(),
        &config,
    )
    .unwrap_err();
    assert!(matches!(err, Error::UnsupportedOperation(_)));
}

#[test]
fn test_replace_seekable_reader() {
    let config = ParserConfiguration::default();
    let map = replace(
        SeekReaderSource::new(Cursor::new(CATALOG.as_bytes().to_vec())),
        &path("/catalog/cd"),
        "y".into(),
        &config,
    )
    .unwrap();
    assert_eq!(map.get("catalog").unwrap().get("cd"), Some(&Value::from("y")));
}

#[test]
fn test_replace_borrowed_source() {
    let config = ParserConfiguration::default();
    let mut source = StrSource::new(CATALOG);
    let map = replace(&mut source, &path("/catalog/cd"), "y".into(), &config).unwrap();
    assert_eq!(map.get("catalog").unwrap().get("cd"), Some(&Value::from("y")));
}

#[test]
fn test_replace_empty_path() {
    let config = ParserConfiguration::default();
    let map = replace_str(CATALOG, &path(""), "X".into(), &config).unwrap();
    assert_eq!(map.get("content"), Some(&Value::from("X")));

    let map = replace_str(CATALOG, &path(""), title("B"), &config).unwrap();
    assert_eq!(Value::Object(map), title("B"));
}
