//! JSON envelope, binary encoding and validation.
//!
//! Run with: cargo run --example machine_formats

use dx_codec::{
    binary_info, deserialize_machine, from_binary, from_dense, serialize_machine, to_binary,
    validate, verify_binary,
};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let text = "#:A|Acme Corp\nnm=Test\ncmp=^A\nusers:2(id nm)[1 Alice;2 Bob]";

    let result = validate(text);
    println!("Valid: {}", result.is_ok());

    let doc = from_dense(text)?;

    // JSON envelope
    let json = serialize_machine(&doc)?;
    println!("\nJSON envelope ({} bytes):\n{}", json.len(), json);
    assert_eq!(deserialize_machine(&json)?, doc);

    // Binary
    let bytes = to_binary(&doc)?;
    let info = binary_info(&bytes)?;
    println!(
        "\nBinary: {} bytes, version {}, {} sections",
        info.size, info.version, info.section_count
    );
    assert!(verify_binary(&bytes));
    assert_eq!(from_binary(&bytes)?, doc);

    println!(
        "Sizes: dense {} / json {} / binary {}",
        text.len(),
        json.len(),
        bytes.len()
    );

    // Validation feedback
    let broken = "#users(id|nm)\n1|Alice\n2";
    if let Some(error) = validate(broken).error {
        println!("\n{}", error);
        println!("hint: {}", error.hint());
    }

    Ok(())
}
