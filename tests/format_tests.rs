//! Conformance tests for the dense and human grammars.

use dx_codec::de::{classify_line, DenseLine, Sigil};
use dx_codec::validate::{validate_dense, validate_human};
use dx_codec::{
    dense_to_human_with_options, from_dense, from_human, DenseOptions, DenseParser, DxValue,
    HumanOptions, ValidationErrorKind,
};

fn context_value(line: &str) -> DxValue {
    let doc = from_dense(line).unwrap();
    doc.context.get("k").cloned().unwrap_or_else(|| panic!("no value in {:?}", line))
}

fn human_value(line: &str) -> DxValue {
    let doc = from_human(line).unwrap();
    doc.context.get("k").cloned().unwrap_or_else(|| panic!("no value in {:?}", line))
}

#[test]
fn test_line_classification_order() {
    assert!(matches!(
        classify_line("a:1[x=1]"),
        DenseLine::InlineObject { name: "a", content: "x=1" }
    ));
    assert!(matches!(
        classify_line("t:2(a b)[1 2;3 4]"),
        DenseLine::Table { name: "t", schema: "a b", rows: "1 2;3 4" }
    ));
    assert!(matches!(
        classify_line("xs[3]=a b c"),
        DenseLine::Array { key: "xs", count: 3, values: "a b c" }
    ));
    assert!(matches!(classify_line("k|v"), DenseLine::Pair { key: "k", value: "v" }));
    assert_eq!(classify_line("# a note"), DenseLine::Comment);
    assert_eq!(classify_line("// a note"), DenseLine::Comment);
    assert_eq!(classify_line("   "), DenseLine::Comment);
}

#[test]
fn test_sigils() {
    assert_eq!(classify_line("#c"), DenseLine::Sigil(Sigil::Context));
    assert_eq!(
        classify_line("#:A|Acme Corp"),
        DenseLine::Sigil(Sigil::Reference { key: "A", value: Some("Acme Corp") })
    );
    assert_eq!(
        classify_line("#:A"),
        DenseLine::Sigil(Sigil::Reference { key: "A", value: None })
    );
    assert_eq!(
        classify_line("#t(a|b)["),
        DenseLine::Sigil(Sigil::Table { id: "t", schema: "a|b", bracketed: true })
    );
    assert_eq!(classify_line("#db"), DenseLine::Sigil(Sigil::Object { id: "db" }));
    assert_eq!(classify_line("#?"), DenseLine::Sigil(Sigil::Unknown("#?")));
}

#[test]
fn test_dense_values() {
    assert_eq!(context_value("k="), DxValue::Null);
    assert_eq!(context_value("k=null"), DxValue::Null);
    assert_eq!(context_value("k=true"), DxValue::Bool(true));
    assert_eq!(context_value("k=-3.5"), DxValue::Number(-3.5));
    assert_eq!(context_value("k=1e5"), DxValue::from("1e5"));
    assert_eq!(context_value("k=^A"), DxValue::Ref("A".to_string()));
    assert_eq!(context_value(r#"k="a \"b\"\n""#), DxValue::from("a \"b\"\n"));
    assert_eq!(context_value(r#"k='say "hi"'"#), DxValue::from("say \"hi\""));
    assert_eq!(context_value("k=James_Smith"), DxValue::from("James Smith"));
    assert_eq!(context_value("k=+"), DxValue::from("+"));
}

#[test]
fn test_dense_brackets() {
    let list = DxValue::Array(vec![DxValue::from("a"), DxValue::from("b")]);
    assert_eq!(context_value("k=[a b]"), list);
    assert_eq!(context_value("k=[a,b]"), list);

    let object = context_value("k=[x=1 y=two]");
    let map = object.as_object().unwrap();
    assert_eq!(map.get("x"), Some(&DxValue::from(1)));
    assert_eq!(map.get("y"), Some(&DxValue::from("two")));
}

#[test]
fn test_compact_symbols() {
    let parser = DenseParser::new(DenseOptions::compact());
    let doc = parser.parse("a=+\nb=-\nc=~\nd=*x,[1 2]").unwrap();
    assert_eq!(doc.context["a"], DxValue::Bool(true));
    assert_eq!(doc.context["b"], DxValue::Bool(false));
    assert_eq!(doc.context["c"], DxValue::Null);
    assert_eq!(
        doc.context["d"],
        DxValue::Array(vec![
            DxValue::from("x"),
            DxValue::Array(vec![DxValue::from(1), DxValue::from(2)]),
        ])
    );
}

#[test]
fn test_field_separator_ignores_nested_commas() {
    let doc = from_dense("p:2[tags=[x,y] b=2]").unwrap();
    let row = &doc.sections["p"].rows[0];
    assert_eq!(row[0].as_array().map(Vec::len), Some(2));
    assert_eq!(row[1], DxValue::from(2));
}

#[test]
fn test_quoted_cells_keep_whitespace() {
    let doc = from_dense(r#"t:2(id nm)[1 "Jane Doe";2 'Bo; B']"#).unwrap();
    let rows = &doc.sections["t"].rows;
    assert_eq!(rows[0][1], DxValue::from("Jane Doe"));
    assert_eq!(rows[1][1], DxValue::from("Bo; B"));
}

#[test]
fn test_human_document() {
    let text = "\
# comment
// another
name = Alice
age: 30

[server]
host = localhost
ports = 80, 443

[refs]
A = \"Acme Corp\"

Total: 3 items";
    let doc = from_human(text).unwrap();
    assert_eq!(doc.context["name"], DxValue::from("Alice"));
    assert_eq!(doc.context["age"], DxValue::from(30));
    assert_eq!(doc.refs["A"], "Acme Corp");

    let server = &doc.sections["server"];
    assert_eq!(server.column_names(), vec!["host", "ports"]);
    assert_eq!(
        server.rows[0][1],
        DxValue::Array(vec![DxValue::from(80), DxValue::from(443)])
    );
}

#[test]
fn test_human_values() {
    assert_eq!(human_value("k ="), DxValue::Null);
    assert_eq!(human_value("k = none"), DxValue::Null);
    assert_eq!(human_value("k = false"), DxValue::Bool(false));
    assert_eq!(human_value("k = \"true\""), DxValue::from("true"));
    assert_eq!(human_value("k = 'a, b'"), DxValue::from("a, b"));
    assert_eq!(human_value("k = a,b"), DxValue::from("a,b"));
    assert_eq!(human_value("k = ^A"), DxValue::Ref("A".to_string()));
    assert_eq!(
        human_value("k = [a, [b, c]]"),
        DxValue::Array(vec![
            DxValue::from("a"),
            DxValue::Array(vec![DxValue::from("b"), DxValue::from("c")]),
        ])
    );
}

#[test]
fn test_human_tables() {
    let options = HumanOptions::new().with_expand_keys(false);
    let human = dense_to_human_with_options("t:2(a b)[1 null;2 [x y]]", options).unwrap();
    assert_eq!(human, "[t]\n  a | b\n  1 | -\n  2 | [x, y]");

    let doc = from_human(&human).unwrap();
    assert_eq!(doc.sections["t"].rows[0][1], DxValue::Null);
    assert_eq!(doc.sections["t"].rows[1][1].as_array().map(Vec::len), Some(2));
}

#[test]
fn test_validators_by_format() {
    assert!(validate_dense("users:2(id nm)[1 Al;2 Bo]").success);
    assert!(validate_human("[a]\nx = 1").success);

    let err = validate_dense("#t(a|b)\n1|2|3").error.unwrap();
    assert_eq!(err.kind(), ValidationErrorKind::SchemaRowMismatch);
    assert_eq!(err.line(), 2);

    let err = validate_human("x = 'open").error.unwrap();
    assert_eq!(err.kind(), ValidationErrorKind::UnclosedString);
    assert_eq!(err.column(), 5);
}
