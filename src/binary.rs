//! Compact binary encoding.
//!
//! # Layout
//!
//! ```text
//! header   := "DXMB" version:u8 reserved:u8 section_count:u16le
//! section  := 0x01 count:u16 (short value)*                  context
//!           | 0x02 count:u16 (short string)*                 references
//!           | 0x03 short ncols:u16 short* nrows:u16 value*   data, row-major
//!           | 0x04 short count:u16 (short value)*            object
//!           | 0x05 short count:u16 value*                    standalone array
//! short    := len:u8 utf8          (truncated to 255 bytes)
//! string   := len:u16le utf8
//! ```
//!
//! Values carry a one-byte tag. Whole numbers use the narrowest of int8, int16
//! and int32; everything else is a float64.
//!
//! | Tag    | Value                       |
//! |--------|-----------------------------|
//! | `0x00` | null                        |
//! | `0x01` | false                       |
//! | `0x02` | true                        |
//! | `0x03` | int8                        |
//! | `0x04` | int16 LE                    |
//! | `0x05` | int32 LE                    |
//! | `0x06` | float64 LE                  |
//! | `0x07` | string                      |
//! | `0x08` | count:u16 value*            |
//! | `0x09` | reference key (short)       |
//! | `0x0A` | count:u16 (short value)*    |
//!
//! Column array flags are not stored; decoded schemas are plain columns.

use crate::document::{DxDocument, DxSection, FieldDef};
use crate::{DxMap, DxValue, Error, Result};

/// The four bytes every binary document starts with.
pub const MAGIC: &[u8; 4] = b"DXMB";
pub const BINARY_VERSION: u8 = 1;
const HEADER_LEN: usize = 8;
const MAX_DEPTH: usize = 128;

const SECTION_CONTEXT: u8 = 0x01;
const SECTION_REFS: u8 = 0x02;
const SECTION_DATA: u8 = 0x03;
const SECTION_OBJECT: u8 = 0x04;
const SECTION_ARRAY: u8 = 0x05;

const TAG_NULL: u8 = 0x00;
const TAG_FALSE: u8 = 0x01;
const TAG_TRUE: u8 = 0x02;
const TAG_I8: u8 = 0x03;
const TAG_I16: u8 = 0x04;
const TAG_I32: u8 = 0x05;
const TAG_F64: u8 = 0x06;
const TAG_STRING: u8 = 0x07;
const TAG_ARRAY: u8 = 0x08;
const TAG_REF: u8 = 0x09;
const TAG_OBJECT: u8 = 0x0A;

/// Header facts read by [`binary_info`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BinaryInfo {
    pub version: u8,
    pub section_count: u16,
    /// Total length of the input in bytes.
    pub size: usize,
}

fn count_u16(what: &'static str, len: usize) -> Result<u16> {
    u16::try_from(len).map_err(|_| Error::LengthOverflow {
        what,
        len,
        max: u16::MAX as usize,
    })
}

struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    fn u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn count(&mut self, what: &'static str, len: usize) -> Result<()> {
        let n = count_u16(what, len)?;
        self.u16(n);
        Ok(())
    }

    fn short(&mut self, s: &str) {
        let mut end = s.len().min(u8::MAX as usize);
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        if end < s.len() {
            log::debug!("binary key truncated from {} to {} bytes", s.len(), end);
        }
        self.u8(end as u8);
        self.buf.extend_from_slice(&s.as_bytes()[..end]);
    }

    fn string(&mut self, s: &str) -> Result<()> {
        self.count("string", s.len())?;
        self.buf.extend_from_slice(s.as_bytes());
        Ok(())
    }

    fn number(&mut self, n: f64) {
        let whole = n.is_finite() && n.fract() == 0.0 && !(n == 0.0 && n.is_sign_negative());
        if whole && n >= f64::from(i8::MIN) && n <= f64::from(i8::MAX) {
            self.u8(TAG_I8);
            self.buf.extend_from_slice(&(n as i8).to_le_bytes());
        } else if whole && n >= f64::from(i16::MIN) && n <= f64::from(i16::MAX) {
            self.u8(TAG_I16);
            self.buf.extend_from_slice(&(n as i16).to_le_bytes());
        } else if whole && n >= f64::from(i32::MIN) && n <= f64::from(i32::MAX) {
            self.u8(TAG_I32);
            self.buf.extend_from_slice(&(n as i32).to_le_bytes());
        } else {
            self.u8(TAG_F64);
            self.buf.extend_from_slice(&n.to_le_bytes());
        }
    }

    fn value(&mut self, value: &DxValue) -> Result<()> {
        match value {
            DxValue::Null => self.u8(TAG_NULL),
            DxValue::Bool(false) => self.u8(TAG_FALSE),
            DxValue::Bool(true) => self.u8(TAG_TRUE),
            DxValue::Number(n) => self.number(*n),
            DxValue::String(s) => {
                self.u8(TAG_STRING);
                self.string(s)?;
            }
            DxValue::Array(items) => {
                self.u8(TAG_ARRAY);
                self.count("array", items.len())?;
                for item in items {
                    self.value(item)?;
                }
            }
            DxValue::Ref(key) => {
                self.u8(TAG_REF);
                self.short(key);
            }
            DxValue::Object(map) => {
                self.u8(TAG_OBJECT);
                self.pairs(map.iter())?;
            }
        }
        Ok(())
    }

    fn pairs<'a>(&mut self, pairs: impl ExactSizeIterator<Item = (&'a String, &'a DxValue)>) -> Result<()> {
        self.count("map", pairs.len())?;
        for (key, value) in pairs {
            self.short(key);
            self.value(value)?;
        }
        Ok(())
    }
}

/// Encodes a document.
///
/// # Errors
///
/// Returns [`Error::LengthOverflow`] when a string, array, map, row count or
/// the section count does not fit in 16 bits, and [`Error::SchemaMismatch`]
/// for malformed sections.
///
/// ```rust
/// use dx_codec::{from_binary, to_binary, DxDocument, DxValue};
///
/// let mut doc = DxDocument::new();
/// doc.context.insert("port".to_string(), DxValue::from(8080));
/// let bytes = to_binary(&doc)?;
/// assert_eq!(&bytes[..4], b"DXMB");
/// assert_eq!(from_binary(&bytes)?, doc);
/// # Ok::<(), dx_codec::Error>(())
/// ```
pub fn to_binary(doc: &DxDocument) -> Result<Vec<u8>> {
    let ids = doc.ordered_ids();
    let sections = usize::from(!doc.context.is_empty())
        + usize::from(!doc.refs.is_empty())
        + ids.len()
        + doc.arrays.len();

    let mut w = Writer {
        buf: Vec::with_capacity(64),
    };
    w.buf.extend_from_slice(MAGIC);
    w.u8(BINARY_VERSION);
    w.u8(0);
    w.count("section", sections)?;

    if !doc.context.is_empty() {
        w.u8(SECTION_CONTEXT);
        w.pairs(doc.context.iter())?;
    }

    if !doc.refs.is_empty() {
        w.u8(SECTION_REFS);
        w.count("reference", doc.refs.len())?;
        for (key, value) in &doc.refs {
            w.short(key);
            w.string(value)?;
        }
    }

    for id in ids {
        if let Some(section) = doc.sections.get(id) {
            section.check_rows()?;
            w.u8(SECTION_DATA);
            w.short(id);
            w.count("column", section.schema.len())?;
            for field in &section.schema {
                w.short(&field.name);
            }
            w.count("row", section.rows.len())?;
            for value in section.rows.iter().flatten() {
                w.value(value)?;
            }
        } else if let Some(object) = doc.objects.get(id) {
            w.u8(SECTION_OBJECT);
            w.short(id);
            w.pairs(object.iter())?;
        }
    }

    for (key, items) in &doc.arrays {
        w.u8(SECTION_ARRAY);
        w.short(key);
        w.count("array", items.len())?;
        for item in items {
            w.value(item)?;
        }
    }

    log::debug!("encoded binary document: {} sections, {} bytes", sections, w.buf.len());
    Ok(w.buf)
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self.pos.checked_add(n).filter(|end| *end <= self.bytes.len());
        match end {
            Some(end) => {
                let slice = &self.bytes[self.pos..end];
                self.pos = end;
                Ok(slice)
            }
            None => Err(Error::truncated(self.pos)),
        }
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.array::<1>()?[0])
    }

    fn u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.array()?))
    }

    fn utf8(&mut self, len: usize) -> Result<String> {
        let offset = self.pos;
        let bytes = self.take(len)?;
        std::str::from_utf8(bytes)
            .map(str::to_string)
            .map_err(|_| Error::InvalidUtf8 { offset })
    }

    fn short(&mut self) -> Result<String> {
        let len = self.u8()?;
        self.utf8(usize::from(len))
    }

    fn string(&mut self) -> Result<String> {
        let len = self.u16()?;
        self.utf8(usize::from(len))
    }

    fn value(&mut self, depth: usize) -> Result<DxValue> {
        if depth > MAX_DEPTH {
            return Err(Error::custom(format!(
                "binary values nest deeper than {} levels at offset {}",
                MAX_DEPTH, self.pos
            )));
        }
        let offset = self.pos;
        let value = match self.u8()? {
            TAG_NULL => DxValue::Null,
            TAG_FALSE => DxValue::Bool(false),
            TAG_TRUE => DxValue::Bool(true),
            TAG_I8 => DxValue::Number(f64::from(i8::from_le_bytes(self.array()?))),
            TAG_I16 => DxValue::Number(f64::from(i16::from_le_bytes(self.array()?))),
            TAG_I32 => DxValue::Number(f64::from(i32::from_le_bytes(self.array()?))),
            TAG_F64 => DxValue::Number(f64::from_le_bytes(self.array()?)),
            TAG_STRING => DxValue::String(self.string()?),
            TAG_ARRAY => {
                let count = self.u16()?;
                let mut items = Vec::with_capacity(usize::from(count).min(1024));
                for _ in 0..count {
                    items.push(self.value(depth + 1)?);
                }
                DxValue::Array(items)
            }
            TAG_REF => DxValue::Ref(self.short()?),
            TAG_OBJECT => DxValue::Object(self.pairs(depth + 1)?),
            tag => return Err(Error::UnknownValueTag { tag, offset }),
        };
        Ok(value)
    }

    fn pairs(&mut self, depth: usize) -> Result<DxMap> {
        let count = self.u16()?;
        let mut map = DxMap::with_capacity(usize::from(count).min(1024));
        for _ in 0..count {
            let key = self.short()?;
            map.insert(key, self.value(depth)?);
        }
        Ok(map)
    }
}

fn read_header(bytes: &[u8]) -> Result<BinaryInfo> {
    if bytes.len() < MAGIC.len() || &bytes[..MAGIC.len()] != MAGIC {
        return Err(Error::InvalidMagic);
    }
    let mut r = Reader { bytes, pos: MAGIC.len() };
    let version = r.u8()?;
    if version != BINARY_VERSION {
        return Err(Error::UnsupportedVersion(u64::from(version)));
    }
    let _reserved = r.u8()?;
    let section_count = r.u16()?;
    Ok(BinaryInfo {
        version,
        section_count,
        size: bytes.len(),
    })
}

/// Decodes a document.
///
/// # Errors
///
/// Returns [`Error::InvalidMagic`], [`Error::UnsupportedVersion`],
/// [`Error::Truncated`], [`Error::UnknownSectionTag`],
/// [`Error::UnknownValueTag`] or [`Error::InvalidUtf8`] for malformed input.
pub fn from_binary(bytes: &[u8]) -> Result<DxDocument> {
    let info = read_header(bytes)?;
    let mut r = Reader {
        bytes,
        pos: HEADER_LEN,
    };
    let mut doc = DxDocument::new();

    for _ in 0..info.section_count {
        let offset = r.pos;
        match r.u8()? {
            SECTION_CONTEXT => {
                for (key, value) in r.pairs(0)? {
                    doc.context.insert(key, value);
                }
            }
            SECTION_REFS => {
                let count = r.u16()?;
                for _ in 0..count {
                    let key = r.short()?;
                    let value = r.string()?;
                    doc.refs.insert(key, value);
                }
            }
            SECTION_DATA => {
                let id = r.short()?;
                let columns = r.u16()?;
                let schema = (0..columns)
                    .map(|_| r.short().map(FieldDef::new))
                    .collect::<Result<Vec<_>>>()?;
                let rows = r.u16()?;
                let mut section = DxSection::new(id, schema)?;
                for _ in 0..rows {
                    let row = (0..columns)
                        .map(|_| r.value(0))
                        .collect::<Result<Vec<_>>>()?;
                    section.push_row(row)?;
                }
                doc.insert_section(section);
            }
            SECTION_OBJECT => {
                let id = r.short()?;
                let object = r.pairs(0)?;
                doc.insert_object(id, object);
            }
            SECTION_ARRAY => {
                let key = r.short()?;
                let count = r.u16()?;
                let items = (0..count)
                    .map(|_| r.value(0))
                    .collect::<Result<Vec<_>>>()?;
                doc.arrays.insert(key, items);
            }
            tag => return Err(Error::UnknownSectionTag { tag, offset }),
        }
    }

    if r.pos < bytes.len() {
        log::debug!("binary document has {} trailing bytes", bytes.len() - r.pos);
    }
    Ok(doc)
}

/// Returns `true` if `bytes` start with a valid header.
#[must_use]
pub fn verify_binary(bytes: &[u8]) -> bool {
    read_header(bytes).is_ok()
}

/// Reads the header without decoding any section.
///
/// # Errors
///
/// Returns [`Error::InvalidMagic`], [`Error::UnsupportedVersion`] or
/// [`Error::Truncated`] for a bad header.
pub fn binary_info(bytes: &[u8]) -> Result<BinaryInfo> {
    read_header(bytes)
}
