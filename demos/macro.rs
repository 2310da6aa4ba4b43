//! Building values with the dx! macro.
//!
//! Run with: cargo run --example macro

use dx_codec::{dx, to_dense, DxDocument, DxSection, DxValue};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    // Scalars
    println!("null:   {}", dx!(null));
    println!("bool:   {}", dx!(true));
    println!("number: {}", dx!(42));
    println!("string: {}", dx!("hello"));
    println!("ref:    {}", dx!(^"A"));

    // Arrays and objects
    let tags = dx!(["rust", "llm", -1]);
    println!("\narray:  {}", tags);

    let user = dx!({
        "nm": "Alice",
        "age": 30,
        "cmp": ^"A",
        "tags": ["admin", "dev"],
        "address": { "cy": "Paris", "zp": "75001" }
    });
    println!("object: {}", user);

    if let DxValue::Object(map) = &user {
        println!("\nFields:");
        for (key, value) in map {
            println!("  {} = {}", key, value);
        }
    }

    // Rows for a section
    let mut users = DxSection::with_columns("users", &["id", "nm", "ac"])?;
    for row in [dx!([1, "Alice", true]), dx!([2, "Bob", false])] {
        if let DxValue::Array(cells) = row {
            users.push_row(cells)?;
        }
    }

    let mut doc = DxDocument::new();
    doc.refs.insert("A".to_string(), "Acme Corp".to_string());
    doc.context.insert("tags".to_string(), tags);
    doc.insert_section(users);
    println!("\nDense document:\n{}", to_dense(&doc)?);

    Ok(())
}
