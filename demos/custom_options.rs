//! Customizing dense and human output.
//!
//! Run with: cargo run --example custom_options

use dx_codec::{
    from_dense, minify, to_dense_with_options, to_human_with_options, DenseOptions,
    HumanOptions, Separator, SymbolSet,
};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let doc = from_dense("nm=MyApp\nvr=\"1.0.0\"\ndebug=true\nflags=[a b c]\nsrv:3[host=localhost port=8080 tags[2]=web api]")?;

    // Default: verbose symbols, space separators
    println!("Default:");
    println!("{}\n", to_dense_with_options(&doc, DenseOptions::default())?);

    // Compact symbols: + - ~ and *a,b arrays
    println!("Compact symbols:");
    let compact = DenseOptions::new().with_symbols(SymbolSet::Compact);
    println!("{}\n", to_dense_with_options(&doc, compact)?);

    // Comma-separated fields and items
    println!("Comma separator:");
    let comma = DenseOptions::new().with_separator(Separator::Comma);
    println!("{}\n", to_dense_with_options(&doc, comma)?);

    // Minify straight from human text
    println!("Minified from human text:");
    println!("{}\n", minify("[config]\nname = MyApp\nports = 80, 443")?);

    // Human layout
    println!("Human, raw keys, wide padding, 4-space indent:");
    let human = HumanOptions::new()
        .with_expand_keys(false)
        .with_key_padding(10)
        .with_indent(4);
    println!("{}", to_human_with_options(&doc, human)?);

    Ok(())
}
