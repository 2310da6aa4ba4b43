//! Basic dense text parsing and writing.
//!
//! Run with: cargo run --example simple

use dx_codec::{from_dense, to_dense, DxValue};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let text = "nm=Demo\nvr=1.0\ntags=[rust llm]\nusers:2(id nm em)[1 Alice alice@example.com;2 Bob bob@example.com]";

    // Parse dense text
    let doc = from_dense(text)?;
    println!("Context: {:?}", doc.context);
    for row in &doc.sections["users"].rows {
        println!("User: {:?}", row);
    }
    assert_eq!(doc.context["nm"], DxValue::from("Demo"));

    // Write it back
    let dense = to_dense(&doc)?;
    println!("\nDense output:\n{}\n", dense);

    assert_eq!(from_dense(&dense)?, doc);
    println!("✓ Round-trip successful");

    Ok(())
}
