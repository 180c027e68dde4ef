#![cfg(feature = "serde")]

use xmlson::{parse_str, Value};

#[test]
fn test_json_output() {
    let map = parse_str(
        r#"<a id="7"><b>x</b><b>y</b><c/><d>1.50</d><e>99999999999999999999</e><f>null</f></a>"#,
    )
    .unwrap();
    let json = serde_json::to_string(&Value::Object(map)).unwrap();
    assert_eq!(
        json,
        r#"{"a":{"id":7,"b":["x","y"],"c":"","d":"1.50","e":"99999999999999999999","f":null}}"#
    );
}

#[test]
fn test_json_negative_zero() {
    let map = parse_str("<a>-0</a>").unwrap();
    let json = serde_json::to_string(&map).unwrap();
    assert_eq!(json, r#"{"a":-0.0}"#);
}
