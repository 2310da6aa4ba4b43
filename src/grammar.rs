//! Grammars of the DX text and binary encodings.
//!
//! This module documents the formats as this library reads and writes them.
//! It contains no code.
//!
//! # Dense (LLM) format
//!
//! One logical line per entry. A modern table or object whose brackets are
//! still open at the end of a line continues on the following lines.
//!
//! ```text
//! document   := line*
//! line       := comment | inline_obj | table | array | scalar | pair | sigil
//! comment    := "//" text | "#" (" " text)?
//! inline_obj := ident ":" count "[" field* "]"
//! field      := ident "=" value | ident "[" count "]=" value*
//! table      := ident ":" count "(" column* ")" "[" (row (";" row)*)? "]"
//! row        := value (" " value)*
//! array      := ident "[" count "]=" list
//! scalar     := ident "=" value
//! pair       := ident "|" value
//! sigil      := "#c" | "#:" ident "|" text | "#" ident ("(" columns ")" "["?)?
//! ident      := [A-Za-z_][A-Za-z0-9_.-]*
//! ```
//!
//! Lines are classified in a fixed order, so `a:1[x=1]` is an inline object
//! and never a scalar:
//!
//! 1. inline object, table
//! 2. `key=` scalar, `key[n]=` array
//! 3. `key|` pair
//! 4. `#` sigils
//!
//! ## Separators
//!
//! - Schema columns: comma if a top-level comma appears, else whitespace.
//! - Object fields: comma if a top-level comma follows some `=`, else
//!   whitespace.
//! - Table rows: the first top-level `,`, `;`, `:` or newline, defaulting to `;`.
//! - Cells within a row: whitespace.
//!
//! Commas and whitespace inside quotes or brackets never separate.
//!
//! ## Values
//!
//! | Text                 | Value                             |
//! |----------------------|-----------------------------------|
//! | empty                | null                              |
//! | `"…"`                | string, `\" \\ \n \r \t` escapes  |
//! | `'…'`                | string, verbatim                  |
//! | `^key`               | reference                         |
//! | `[k=v k2=v2]`        | object                            |
//! | `[a b]`, `[a,b]`     | array                             |
//! | `true` `false` `null`| literals                          |
//! | `+` `-` `~` `*a,b`   | compact symbols (compact set only)|
//! | `-?\d+(\.\d+)?`      | number                            |
//! | `First_Last`         | `First Last` (TitleCase parts)    |
//! | anything else        | string                            |
//!
//! ## Legacy dialect
//!
//! ```text
//! #c
//! nm|Test
//! #:A|Acme Corp
//! #users(id|nm)
//! 1|Alice
//! 2|Bob
//!
//! #db
//! host|localhost
//! ```
//!
//! A `#id(a|b)` table collects `v|v` rows until a blank line or the next `#`
//! line. `#id(a|b)[` collects rows until a line ending in `]`. `#id` opens an
//! object of `key|value` lines.
//!
//! # Human format
//!
//! ```text
//! document   := line*
//! line       := comment | summary | header | array_open | array_item | kv | row
//! comment    := ("#" | "//") text
//! summary    := "Total: " digits " items"
//! header     := "[" ident "]" | "[\"" ident "\"]"     unindented
//! kv         := ident " = " value | ident ": " value
//! array_open := ident ":"
//! array_item := "- " value                          inside an array block
//! row        := indent cell (" | " cell)*           inside a data section
//! ```
//!
//! `[config]` holds the context and `[references]` (or `[refs]`) the
//! reference table. A quoted header always opens a data section, so a
//! section may be called `refs`. Key/value lines before any header also go to the
//! context, and array blocks there become standalone arrays.
//!
//! Values: empty and `none` are null, `true`/`false` booleans, a quoted
//! string loses its quotes without unescaping, `-?\d+(\.\d+)?` is a number,
//! `^key` a reference and `[a, b]` or `a, b` an array. In table cells `-` is
//! null.
//!
//! # Machine envelope
//!
//! See [`crate::machine`] for the JSON layout and [`crate::binary`] for the
//! binary layout.
