use crate::value::{Document, Value};

fn doc(entries: &[(&str, Value)]) -> Document {
    entries.iter().cloned().collect()
}

#[test]
fn insert_replaces_in_place_and_keeps_position() {
    let mut d = doc(&[("name", "a".into()), ("foo", Value::Int(1)), ("id", Value::Int(7))]);

    let previous = d.insert("foo", Value::Document(doc(&[("x", Value::Bool(true))])));

    assert_eq!(previous, Some(Value::Int(1)));
    assert_eq!(d.keys().collect::<Vec<_>>(), vec!["name", "foo", "id"]);
    assert!(d.get("foo").and_then(Value::as_document).is_some());
}

#[test]
fn serializes_in_insertion_order_without_tags() {
    let d = doc(&[
        ("name", "a".into()),
        ("address", Value::Null),
        (
            "foos",
            Value::documents(vec![doc(&[("id", Value::Int(2))]), doc(&[("id", Value::Uint(3))])]),
        ),
        ("ratio", Value::Float(0.5)),
    ]);

    let json = serde_json::to_string(&d).expect("document encodes");

    assert_eq!(
        json,
        r#"{"name":"a","address":null,"foos":[{"id":2},{"id":3}],"ratio":0.5}"#
    );
}

#[test]
fn decodes_json_objects_preserving_key_order() {
    let parsed: serde_json::Value =
        serde_json::from_str(r#"{"z":1,"a":[true,"x"],"m":{"n":null},"big":18446744073709551615}"#)
            .expect("valid json");

    let value = Value::from(parsed);
    let d = value.as_document().expect("object decodes to a document");

    assert_eq!(d.keys().collect::<Vec<_>>(), vec!["z", "a", "m", "big"]);
    assert_eq!(d.get("z"), Some(&Value::Int(1)));
    assert_eq!(
        d.get("a"),
        Some(&Value::List(vec![Value::Bool(true), Value::Text("x".to_string())]))
    );
    assert_eq!(d.get("big"), Some(&Value::Uint(u64::MAX)));
}

#[test]
fn option_conversion_maps_none_to_null() {
    assert_eq!(Value::from(None::<i64>), Value::Null);
    assert_eq!(Value::from(Some("x")), Value::Text("x".to_string()));
    assert_eq!(Value::Null.kind(), "null");
}
