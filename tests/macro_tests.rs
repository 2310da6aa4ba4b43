use dx_codec::{dx, to_dense, DxDocument, DxMap, DxSection, DxValue};

#[test]
fn test_dx_macro_null() {
    let value = dx!(null);
    assert_eq!(value, DxValue::Null);
}

#[test]
fn test_dx_macro_booleans() {
    assert_eq!(dx!(true), DxValue::Bool(true));
    assert_eq!(dx!(false), DxValue::Bool(false));
}

#[test]
fn test_dx_macro_numbers() {
    assert_eq!(dx!(42), DxValue::Number(42.0));
    assert_eq!(dx!(3.5), DxValue::Number(3.5));
    assert_eq!(dx!(-123), DxValue::Number(-123.0));
}

#[test]
fn test_dx_macro_strings() {
    assert_eq!(dx!("hello world"), DxValue::String("hello world".to_string()));
    assert_eq!(dx!(""), DxValue::String(String::new()));
}

#[test]
fn test_dx_macro_refs() {
    assert_eq!(dx!(^"A"), DxValue::Ref("A".to_string()));
    assert_eq!(
        dx!([^"A", ^"B"]),
        DxValue::Array(vec![
            DxValue::Ref("A".to_string()),
            DxValue::Ref("B".to_string()),
        ])
    );
}

#[test]
fn test_dx_macro_arrays() {
    assert_eq!(dx!([]), DxValue::Array(vec![]));

    let mixed = dx!([1, "hello", true, null]);
    assert_eq!(
        mixed,
        DxValue::Array(vec![
            DxValue::Number(1.0),
            DxValue::String("hello".to_string()),
            DxValue::Bool(true),
            DxValue::Null,
        ])
    );

    let nested = dx!([[1, 2], [-3]]);
    assert_eq!(
        nested,
        DxValue::Array(vec![
            DxValue::Array(vec![DxValue::Number(1.0), DxValue::Number(2.0)]),
            DxValue::Array(vec![DxValue::Number(-3.0)]),
        ])
    );
}

#[test]
fn test_dx_macro_objects() {
    let empty = dx!({});
    assert_eq!(empty, DxValue::Object(DxMap::new()));

    let user = dx!({
        "nm": "Alice",
        "age": 30,
        "ac": true,
        "cmp": ^"A",
        "manager": null
    });
    let map = user.as_object().unwrap();
    assert_eq!(map.len(), 5);
    assert_eq!(map.get("nm"), Some(&DxValue::from("Alice")));
    assert_eq!(map.get("age").and_then(DxValue::as_i64), Some(30));
    assert_eq!(map.get("cmp").and_then(DxValue::as_ref_key), Some("A"));
    assert_eq!(map.get("manager"), Some(&DxValue::Null));
}

#[test]
fn test_dx_macro_preserves_field_order() {
    let value = dx!({ "z": 1, "a": 2, "m": 3 });
    let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
    assert_eq!(keys, vec!["z", "a", "m"]);
}

#[test]
fn test_dx_macro_nested_structures() {
    let value = dx!({
        "server": { "host": "localhost", "ports": [80, 443] },
        "tags": ["a", "b"],
        "offset": -5,
    });
    let server = value.as_object().unwrap().get("server").unwrap();
    let ports = server.as_object().unwrap().get("ports").unwrap();
    assert_eq!(ports.as_array().map(Vec::len), Some(2));
    assert_eq!(
        value.as_object().unwrap().get("offset"),
        Some(&DxValue::Number(-5.0))
    );
}

#[test]
fn test_dx_macro_variables() {
    let name = "Bob".to_string();
    let count = 7;
    let value = dx!({ "nm": name, "ct": count });
    let map = value.as_object().unwrap();
    assert_eq!(map.get("nm"), Some(&DxValue::from("Bob")));
    assert_eq!(map.get("ct"), Some(&DxValue::from(7)));
}

#[test]
fn test_dx_macro_feeds_a_section() {
    let mut section = DxSection::with_columns("users", &["id", "nm"]).unwrap();
    for (id, name) in [(1, "Alice"), (2, "Bob")] {
        let row = dx!([id, name]);
        section.push_row(row.as_array().cloned().unwrap()).unwrap();
    }
    let mut doc = DxDocument::new();
    doc.context.insert("tags".to_string(), dx!(["rust", "llm"]));
    doc.insert_section(section);

    assert_eq!(
        to_dense(&doc).unwrap(),
        "tags=[rust llm]\nusers:2(id nm)[1 Alice;2 Bob]"
    );
}
