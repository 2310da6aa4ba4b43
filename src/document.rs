//! The in-memory document shared by every encoding.
//!
//! A [`DxDocument`] holds root context values, named objects, schema'd row
//! tables ([`DxSection`]), standalone arrays and a reference table. Parsers
//! create one empty and fill it in source order; serializers only read it.
//!
//! ```rust
//! use dx_codec::{DxDocument, DxSection, DxValue, FieldDef};
//!
//! let mut section = DxSection::new("users", vec![FieldDef::new("id"), FieldDef::new("nm")])?;
//! section.push_row(vec![DxValue::from(1), DxValue::from("Alice")])?;
//!
//! let mut doc = DxDocument::new();
//! doc.context.insert("version".to_string(), DxValue::from("1.0"));
//! doc.insert_section(section);
//! assert_eq!(doc.ordered_ids(), vec!["users"]);
//! # Ok::<(), dx_codec::Error>(())
//! ```

use crate::abbrev::{compress_key, expand_key};
use crate::{DxMap, DxValue, Error, Result};
use indexmap::IndexMap;
use std::collections::HashSet;

/// A column descriptor.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct FieldDef {
    pub name: String,
    /// Nested columns, reserved for structured fields.
    pub fields: Vec<FieldDef>,
    pub is_array: bool,
}

impl FieldDef {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        FieldDef {
            name: name.into(),
            fields: Vec::new(),
            is_array: false,
        }
    }

    /// A column whose cells hold arrays.
    #[must_use]
    pub fn array(name: impl Into<String>) -> Self {
        FieldDef {
            is_array: true,
            ..FieldDef::new(name)
        }
    }
}

/// A named table with a fixed schema.
///
/// Every row holds exactly `schema.len()` cells. Parsers go through
/// [`push_row_lenient`](Self::push_row_lenient), which repairs rows; builders
/// use [`push_row`](Self::push_row), which rejects them. Serializers re-check
/// with [`check_rows`](Self::check_rows) because the fields are public.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct DxSection {
    pub id: String,
    pub schema: Vec<FieldDef>,
    pub rows: Vec<Vec<DxValue>>,
}

impl DxSection {
    /// Creates an empty section.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateField`] if two columns share a name.
    pub fn new(id: impl Into<String>, schema: Vec<FieldDef>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(schema.len());
        for field in &schema {
            if !seen.insert(field.name.as_str()) {
                return Err(Error::duplicate_field(&field.name));
            }
        }
        Ok(DxSection {
            id: id.into(),
            schema,
            rows: Vec::new(),
        })
    }

    /// Creates an empty section from plain column names.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateField`] if two columns share a name.
    pub fn with_columns(id: impl Into<String>, columns: &[&str]) -> Result<Self> {
        Self::new(id, columns.iter().map(|c| FieldDef::new(*c)).collect())
    }

    /// Appends a row, rejecting it if its length differs from the schema.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dx_codec::{DxSection, DxValue, Error};
    ///
    /// let mut section = DxSection::with_columns("t", &["a", "b"])?;
    /// let err = section.push_row(vec![DxValue::from(1)]).unwrap_err();
    /// assert_eq!(err, Error::RowLength { expected: 2, found: 1 });
    /// # Ok::<(), dx_codec::Error>(())
    /// ```
    pub fn push_row(&mut self, row: Vec<DxValue>) -> Result<()> {
        if row.len() != self.schema.len() {
            return Err(Error::RowLength {
                expected: self.schema.len(),
                found: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Appends a row, padding short rows with `Null` and truncating long ones.
    pub fn push_row_lenient(&mut self, mut row: Vec<DxValue>) {
        let width = self.schema.len();
        if row.len() != width {
            log::debug!(
                "section '{}': row {} has {} values for {} columns, repairing",
                self.id,
                self.rows.len(),
                row.len(),
                width
            );
            row.resize(width, DxValue::Null);
        }
        self.rows.push(row);
    }

    /// Checks every row against the schema width.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SchemaMismatch`] for the first offending row.
    pub fn check_rows(&self) -> Result<()> {
        let expected = self.schema.len();
        match self.rows.iter().position(|r| r.len() != expected) {
            Some(row) => Err(Error::SchemaMismatch {
                section: self.id.clone(),
                row,
                expected,
                found: self.rows[row].len(),
            }),
            None => Ok(()),
        }
    }

    /// Column names in schema order.
    #[must_use]
    pub fn column_names(&self) -> Vec<&str> {
        self.schema.iter().map(|f| f.name.as_str()).collect()
    }

    #[inline]
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// The root aggregate.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct DxDocument {
    /// Root-level scalars and arrays.
    pub context: IndexMap<String, DxValue>,
    /// Legacy single objects.
    pub objects: IndexMap<String, DxMap>,
    pub sections: IndexMap<String, DxSection>,
    /// Standalone named arrays.
    pub arrays: IndexMap<String, Vec<DxValue>>,
    /// Reference key to resolved string.
    pub refs: IndexMap<String, String>,
    /// Section and object ids in order of first appearance.
    pub section_order: Vec<String>,
}

impl DxDocument {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn record_order(&mut self, id: &str) {
        if !self.section_order.iter().any(|s| s == id) {
            self.section_order.push(id.to_string());
        }
    }

    /// Inserts a section under its id, returning any section it replaced.
    pub fn insert_section(&mut self, section: DxSection) -> Option<DxSection> {
        self.record_order(&section.id);
        self.sections.insert(section.id.clone(), section)
    }

    /// Inserts a named object, returning any object it replaced.
    pub fn insert_object(&mut self, id: impl Into<String>, object: DxMap) -> Option<DxMap> {
        let id = id.into();
        self.record_order(&id);
        self.objects.insert(id, object)
    }

    /// Section and object ids in emission order.
    ///
    /// Ids recorded in `section_order` come first; ids present in the maps
    /// but never recorded follow in map order (sections before objects).
    #[must_use]
    pub fn ordered_ids(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut ids = Vec::with_capacity(self.sections.len() + self.objects.len());
        let recorded = self.section_order.iter().map(String::as_str);
        let unrecorded = self
            .sections
            .keys()
            .chain(self.objects.keys())
            .map(String::as_str);
        for id in recorded.chain(unrecorded) {
            let known = self.sections.contains_key(id) || self.objects.contains_key(id);
            if known && seen.insert(id) {
                ids.push(id);
            }
        }
        ids
    }

    /// Returns `true` if the document holds nothing at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.context.is_empty()
            && self.objects.is_empty()
            && self.sections.is_empty()
            && self.arrays.is_empty()
            && self.refs.is_empty()
    }

    /// Fails on the first NaN or infinite number anywhere in the document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NonFiniteNumber`] with the offending value.
    pub fn check_finite(&self) -> Result<()> {
        let rows = self.sections.values().flat_map(|s| s.rows.iter().flatten());
        let fields = self.objects.values().flat_map(|o| o.iter().map(|(_, v)| v));
        let values = self
            .context
            .values()
            .chain(self.arrays.values().flatten())
            .chain(rows)
            .chain(fields);
        for value in values {
            if let Some(n) = non_finite(value) {
                return Err(Error::NonFiniteNumber(n));
            }
        }
        Ok(())
    }

    /// Returns a copy with every `Ref` whose key is defined in `refs` replaced
    /// by the referenced string. Unknown references are left as they are.
    ///
    /// ```rust
    /// use dx_codec::{DxDocument, DxValue};
    ///
    /// let mut doc = DxDocument::new();
    /// doc.refs.insert("A".to_string(), "Acme Corp".to_string());
    /// doc.context.insert("cmp".to_string(), DxValue::Ref("A".to_string()));
    /// doc.context.insert("other".to_string(), DxValue::Ref("B".to_string()));
    ///
    /// let resolved = doc.resolve_refs();
    /// assert_eq!(resolved.context["cmp"], DxValue::from("Acme Corp"));
    /// assert_eq!(resolved.context["other"], DxValue::Ref("B".to_string()));
    /// ```
    #[must_use]
    pub fn resolve_refs(&self) -> DxDocument {
        let mut doc = self.clone();
        let refs = &self.refs;
        for value in doc.context.values_mut() {
            resolve_value(value, refs);
        }
        for object in doc.objects.values_mut() {
            for value in object.values_mut() {
                resolve_value(value, refs);
            }
        }
        for section in doc.sections.values_mut() {
            for value in section.rows.iter_mut().flatten() {
                resolve_value(value, refs);
            }
        }
        for value in doc.arrays.values_mut().flatten() {
            resolve_value(value, refs);
        }
        doc
    }

    /// Returns a copy with keys, column names and ids abbreviated.
    #[must_use]
    pub fn compress_keys(&self) -> DxDocument {
        self.rename_keys(compress_key)
    }

    /// Returns a copy with keys, column names and ids expanded to full names.
    #[must_use]
    pub fn expand_keys(&self) -> DxDocument {
        self.rename_keys(expand_key)
    }

    // A renamed key that would collide with an existing key keeps its raw name.
    fn rename_keys(&self, rename: fn(&str) -> &str) -> DxDocument {
        let is_id = |id: &str| self.sections.contains_key(id) || self.objects.contains_key(id);
        let new_id = |id: &str| pick_name(id, rename, is_id);

        let mut doc = DxDocument {
            context: rename_map(&self.context, rename),
            arrays: rename_map(&self.arrays, rename),
            refs: self.refs.clone(),
            ..DxDocument::default()
        };
        doc.section_order = self.section_order.iter().map(|id| new_id(id)).collect();
        for (id, object) in &self.objects {
            let fields: IndexMap<String, DxValue> = object.clone().into();
            doc.objects
                .insert(new_id(id), DxMap::from(rename_map(&fields, rename)));
        }
        for (id, section) in &self.sections {
            let id = new_id(id);
            doc.sections.insert(
                id.clone(),
                DxSection {
                    id,
                    schema: rename_fields(&section.schema, rename),
                    rows: section.rows.clone(),
                },
            );
        }
        doc
    }
}

fn resolve_value(value: &mut DxValue, refs: &IndexMap<String, String>) {
    match value {
        DxValue::Ref(key) => {
            if let Some(resolved) = refs.get(key.as_str()) {
                *value = DxValue::String(resolved.clone());
            }
        }
        DxValue::Array(items) => {
            for item in items {
                resolve_value(item, refs);
            }
        }
        DxValue::Object(map) => {
            for item in map.values_mut() {
                resolve_value(item, refs);
            }
        }
        _ => {}
    }
}

fn non_finite(value: &DxValue) -> Option<f64> {
    match value {
        DxValue::Number(n) if !n.is_finite() => Some(*n),
        DxValue::Array(items) => items.iter().find_map(non_finite),
        DxValue::Object(map) => map.iter().find_map(|(_, v)| non_finite(v)),
        _ => None,
    }
}

fn pick_name(key: &str, rename: fn(&str) -> &str, taken: impl Fn(&str) -> bool) -> String {
    let candidate = rename(key);
    if candidate != key && taken(candidate) {
        key.to_string()
    } else {
        candidate.to_string()
    }
}

fn rename_map<V: Clone>(
    map: &IndexMap<String, V>,
    rename: fn(&str) -> &str,
) -> IndexMap<String, V> {
    map.iter()
        .map(|(k, v)| (pick_name(k, rename, |c| map.contains_key(c)), v.clone()))
        .collect()
}

fn rename_fields(fields: &[FieldDef], rename: fn(&str) -> &str) -> Vec<FieldDef> {
    let taken = |c: &str| fields.iter().any(|f| f.name == c);
    fields
        .iter()
        .map(|f| FieldDef {
            name: pick_name(&f.name, rename, taken),
            fields: rename_fields(&f.fields, rename),
            is_array: f.is_array,
        })
        .collect()
}

const fn assert_send_sync<T: Send + Sync>() {}
const _: () = {
    assert_send_sync::<DxValue>();
    assert_send_sync::<DxSection>();
    assert_send_sync::<DxDocument>();
};

#[cfg(test)]
mod tests {
    use super::*;

    fn users() -> DxSection {
        let mut s = DxSection::with_columns("users", &["id", "nm"]).unwrap();
        s.push_row(vec![DxValue::from(1), DxValue::from("Alice")]).unwrap();
        s
    }

    #[test]
    fn test_duplicate_columns_rejected() {
        let err = DxSection::with_columns("t", &["a", "b", "a"]).unwrap_err();
        assert_eq!(err, Error::duplicate_field("a"));
    }

    #[test]
    fn test_lenient_rows_are_repaired() {
        let mut s = DxSection::with_columns("t", &["a", "b"]).unwrap();
        s.push_row_lenient(vec![DxValue::from(1)]);
        s.push_row_lenient(vec![DxValue::from(1), DxValue::from(2), DxValue::from(3)]);
        assert_eq!(s.rows[0], vec![DxValue::from(1), DxValue::Null]);
        assert_eq!(s.rows[1].len(), 2);
        assert!(s.check_rows().is_ok());
    }

    #[test]
    fn test_check_rows_reports_offender() {
        let mut s = users();
        s.rows.push(vec![DxValue::from(2)]);
        assert_eq!(
            s.check_rows(),
            Err(Error::SchemaMismatch {
                section: "users".to_string(),
                row: 1,
                expected: 2,
                found: 1,
            })
        );
    }

    #[test]
    fn test_ordered_ids() {
        let mut doc = DxDocument::new();
        doc.insert_object("cfg", DxMap::new());
        doc.insert_section(users());
        doc.sections.insert("late".to_string(), DxSection::default());
        doc.section_order.push("missing".to_string());
        assert_eq!(doc.ordered_ids(), vec!["cfg", "users", "late"]);
    }

    #[test]
    fn test_reinsert_keeps_first_position() {
        let mut doc = DxDocument::new();
        doc.insert_section(users());
        doc.insert_object("o", DxMap::new());
        doc.insert_section(users());
        assert_eq!(doc.section_order, vec!["users", "o"]);
    }

    #[test]
    fn test_resolve_refs_nested() {
        let mut doc = DxDocument::new();
        doc.refs.insert("k".to_string(), "v".to_string());
        doc.arrays
            .insert("xs".to_string(), vec![DxValue::Array(vec![DxValue::Ref("k".into())])]);
        let resolved = doc.resolve_refs();
        assert_eq!(
            resolved.arrays["xs"][0],
            DxValue::Array(vec![DxValue::from("v")])
        );
    }

    #[test]
    fn test_key_renaming() {
        let mut doc = DxDocument::new();
        doc.context.insert("nm".to_string(), DxValue::from("x"));
        doc.insert_section(users());
        let expanded = doc.expand_keys();
        assert!(expanded.context.contains_key("name"));
        assert_eq!(expanded.sections["users"].column_names(), vec!["id", "name"]);
        assert_eq!(expanded.compress_keys(), doc);
    }

    #[test]
    fn test_renaming_collision_keeps_raw_key() {
        let mut doc = DxDocument::new();
        doc.context.insert("nm".to_string(), DxValue::from(1));
        doc.context.insert("name".to_string(), DxValue::from(2));
        let expanded = doc.expand_keys();
        let keys: Vec<_> = expanded.context.keys().cloned().collect();
        assert_eq!(keys, vec!["nm", "name"]);
    }
}
