//! Tables across the dense and human formats.
//!
//! Run with: cargo run --example tabular_sections

use dx_codec::{dense_to_human, from_dense, human_to_dense, to_human_with_options, HumanOptions};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    // Modern table, legacy table and legacy object in one document
    let dense = "\
#:A|Acme Corp
nm=Warehouse
products:3(id nm pr qt)[1 Widget 9.99 12;2 Gadget 14.5 3;3 \"Big Box\" 99 1]
#staff(id|nm|cmp)
1|Alice|^A
2|Bob|^A

#db
host|localhost
port|5432";

    let doc = from_dense(dense)?;
    println!("Sections: {:?}", doc.section_order);
    println!("Products: {} rows\n", doc.sections["products"].row_count());

    // Human view with expanded keys
    let human = dense_to_human(dense)?;
    println!("Human format:\n{}\n", human);

    // References resolved and a summary after each table
    let options = HumanOptions::new()
        .with_resolve_refs(true)
        .with_summary(true)
        .with_key_padding(8);
    println!("Resolved:\n{}\n", to_human_with_options(&doc, options)?);

    // Back to dense, with keys abbreviated again
    let back = human_to_dense(&human)?;
    println!("Dense again:\n{}", back);

    Ok(())
}
