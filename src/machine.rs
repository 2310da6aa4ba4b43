//! JSON machine envelope.
//!
//! ```json
//! {
//!   "version": 1,
//!   "context": { "name": { "t": "s", "v": "Test" } },
//!   "refs": { "A": "Acme Corp" },
//!   "sections": {
//!     "users": {
//!       "id": "users",
//!       "schema": ["id", "nm"],
//!       "rows": [[{ "t": "n", "v": 1 }, { "t": "s", "v": "Alice" }]]
//!     }
//!   }
//! }
//! ```
//!
//! # Value tags
//!
//! | Tag | Payload                      |
//! |-----|------------------------------|
//! | `s` | string                       |
//! | `n` | number                       |
//! | `b` | boolean                      |
//! | `x` | `null`                       |
//! | `a` | array of tagged values       |
//! | `r` | reference key                |
//! | `o` | object of tagged values      |
//!
//! `objects`, `arrays` and `sectionOrder` are optional and omitted when empty.
//! Unknown top-level fields are ignored.

use crate::document::{DxDocument, DxSection, FieldDef};
use crate::{DxMap, DxValue, Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value as JsonValue};

/// The only envelope version this crate reads and writes.
pub const MACHINE_VERSION: u64 = 1;

/// The JSON envelope.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineDocument {
    pub version: u64,
    #[serde(default)]
    pub context: IndexMap<String, MachineValue>,
    #[serde(default)]
    pub refs: IndexMap<String, String>,
    #[serde(default)]
    pub sections: IndexMap<String, MachineSection>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub objects: IndexMap<String, IndexMap<String, MachineValue>>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub arrays: IndexMap<String, Vec<MachineValue>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub section_order: Vec<String>,
}

/// One table of the envelope.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineSection {
    pub id: String,
    pub schema: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<MachineValue>>,
    /// Columns whose `FieldDef::is_array` flag is set.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub array_fields: Vec<String>,
}

/// A `{ "t": tag, "v": payload }` value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "JsonValue", into = "JsonValue")]
pub enum MachineValue {
    String(String),
    Number(f64),
    Bool(bool),
    Null,
    Array(Vec<MachineValue>),
    Ref(String),
    Object(IndexMap<String, MachineValue>),
}

impl MachineValue {
    /// The one-letter tag written as `t`.
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            MachineValue::String(_) => "s",
            MachineValue::Number(_) => "n",
            MachineValue::Bool(_) => "b",
            MachineValue::Null => "x",
            MachineValue::Array(_) => "a",
            MachineValue::Ref(_) => "r",
            MachineValue::Object(_) => "o",
        }
    }
}

impl From<MachineValue> for JsonValue {
    fn from(value: MachineValue) -> Self {
        let tag = value.tag();
        let payload = match value {
            MachineValue::String(s) | MachineValue::Ref(s) => JsonValue::String(s),
            MachineValue::Number(n) => Number::from_f64(n).map_or(JsonValue::Null, JsonValue::Number),
            MachineValue::Bool(b) => JsonValue::Bool(b),
            MachineValue::Null => JsonValue::Null,
            MachineValue::Array(items) => {
                JsonValue::Array(items.into_iter().map(JsonValue::from).collect())
            }
            MachineValue::Object(map) => JsonValue::Object(
                map.into_iter()
                    .map(|(k, v)| (k, JsonValue::from(v)))
                    .collect::<Map<String, JsonValue>>(),
            ),
        };
        let mut object = Map::with_capacity(2);
        object.insert("t".to_string(), JsonValue::String(tag.to_string()));
        object.insert("v".to_string(), payload);
        JsonValue::Object(object)
    }
}

impl TryFrom<JsonValue> for MachineValue {
    type Error = String;

    fn try_from(json: JsonValue) -> std::result::Result<Self, Self::Error> {
        let JsonValue::Object(mut object) = json else {
            return Err("value must be an object with 't' and 'v'".to_string());
        };
        let tag = match object.remove("t") {
            Some(JsonValue::String(tag)) => tag,
            _ => return Err("value is missing its 't' tag".to_string()),
        };
        let payload = object.remove("v").unwrap_or(JsonValue::Null);
        let wrong = |expected: &str| format!("'{}' value must carry {}", tag, expected);

        let value = match (tag.as_str(), payload) {
            ("s", JsonValue::String(s)) => MachineValue::String(s),
            ("r", JsonValue::String(key)) => MachineValue::Ref(key),
            ("n", JsonValue::Number(n)) => match n.as_f64() {
                Some(n) => MachineValue::Number(n),
                None => return Err(wrong("a number")),
            },
            ("b", JsonValue::Bool(b)) => MachineValue::Bool(b),
            ("x", _) => MachineValue::Null,
            ("a", JsonValue::Array(items)) => MachineValue::Array(
                items
                    .into_iter()
                    .map(MachineValue::try_from)
                    .collect::<std::result::Result<_, _>>()?,
            ),
            ("o", JsonValue::Object(map)) => MachineValue::Object(
                map.into_iter()
                    .map(|(k, v)| MachineValue::try_from(v).map(|v| (k, v)))
                    .collect::<std::result::Result<_, _>>()?,
            ),
            ("s" | "r", _) => return Err(wrong("a string")),
            ("n", _) => return Err(wrong("a number")),
            ("b", _) => return Err(wrong("a boolean")),
            ("a", _) => return Err(wrong("an array")),
            ("o", _) => return Err(wrong("an object")),
            (other, _) => return Err(format!("unknown value tag '{}'", other)),
        };
        Ok(value)
    }
}

fn encode_value(value: &DxValue) -> Result<MachineValue> {
    Ok(match value {
        DxValue::String(s) => MachineValue::String(s.clone()),
        DxValue::Number(n) if !n.is_finite() => return Err(Error::NonFiniteNumber(*n)),
        DxValue::Number(n) => MachineValue::Number(*n),
        DxValue::Bool(b) => MachineValue::Bool(*b),
        DxValue::Null => MachineValue::Null,
        DxValue::Array(items) => MachineValue::Array(encode_list(items)?),
        DxValue::Object(map) => MachineValue::Object(encode_map(map.iter())?),
        DxValue::Ref(key) => MachineValue::Ref(key.clone()),
    })
}

fn encode_list(items: &[DxValue]) -> Result<Vec<MachineValue>> {
    items.iter().map(encode_value).collect()
}

fn encode_map<'a>(
    pairs: impl Iterator<Item = (&'a String, &'a DxValue)>,
) -> Result<IndexMap<String, MachineValue>> {
    pairs
        .map(|(k, v)| Ok((k.clone(), encode_value(v)?)))
        .collect()
}

fn decode_value(value: MachineValue) -> DxValue {
    match value {
        MachineValue::String(s) => DxValue::String(s),
        MachineValue::Number(n) => DxValue::Number(n),
        MachineValue::Bool(b) => DxValue::Bool(b),
        MachineValue::Null => DxValue::Null,
        MachineValue::Array(items) => DxValue::Array(items.into_iter().map(decode_value).collect()),
        MachineValue::Ref(key) => DxValue::Ref(key),
        MachineValue::Object(map) => DxValue::Object(decode_map(map)),
    }
}

fn decode_map(map: IndexMap<String, MachineValue>) -> DxMap {
    map.into_iter().map(|(k, v)| (k, decode_value(v))).collect()
}

/// Converts a document to its envelope.
///
/// # Errors
///
/// Returns [`Error::NonFiniteNumber`] for NaN or infinite numbers, which JSON
/// cannot carry, and [`Error::SchemaMismatch`] for malformed sections.
pub fn to_machine(doc: &DxDocument) -> Result<MachineDocument> {
    let mut sections = IndexMap::with_capacity(doc.sections.len());
    for (id, section) in &doc.sections {
        section.check_rows()?;
        let rows = section
            .rows
            .iter()
            .map(|row| encode_list(row))
            .collect::<Result<Vec<_>>>()?;
        sections.insert(
            id.clone(),
            MachineSection {
                id: id.clone(),
                schema: section.schema.iter().map(|f| f.name.clone()).collect(),
                rows,
                array_fields: section
                    .schema
                    .iter()
                    .filter(|f| f.is_array)
                    .map(|f| f.name.clone())
                    .collect(),
            },
        );
    }

    let mut objects = IndexMap::with_capacity(doc.objects.len());
    for (id, object) in &doc.objects {
        objects.insert(id.clone(), encode_map(object.iter())?);
    }

    let mut arrays = IndexMap::with_capacity(doc.arrays.len());
    for (key, items) in &doc.arrays {
        arrays.insert(key.clone(), encode_list(items)?);
    }

    Ok(MachineDocument {
        version: MACHINE_VERSION,
        context: encode_map(doc.context.iter())?,
        refs: doc.refs.clone(),
        sections,
        objects,
        arrays,
        section_order: doc.section_order.clone(),
    })
}

/// Converts an envelope back to a document.
///
/// # Errors
///
/// Returns [`Error::UnsupportedVersion`] for any version but 1,
/// [`Error::DuplicateField`] for repeated schema columns and
/// [`Error::SchemaMismatch`] for rows that do not match their schema.
pub fn from_machine(machine: MachineDocument) -> Result<DxDocument> {
    if machine.version != MACHINE_VERSION {
        return Err(Error::UnsupportedVersion(machine.version));
    }

    let mut doc = DxDocument::new();
    doc.context = machine
        .context
        .into_iter()
        .map(|(k, v)| (k, decode_value(v)))
        .collect();
    doc.refs = machine.refs;

    for (id, raw) in machine.sections {
        if raw.id != id {
            log::debug!("machine section '{}' carries id '{}', using the key", id, raw.id);
        }
        let schema = raw
            .schema
            .into_iter()
            .map(|name| {
                if raw.array_fields.contains(&name) {
                    FieldDef::array(name)
                } else {
                    FieldDef::new(name)
                }
            })
            .collect();
        let mut section = DxSection::new(id, schema)?;
        section.rows = raw
            .rows
            .into_iter()
            .map(|row| row.into_iter().map(decode_value).collect())
            .collect();
        section.check_rows()?;
        doc.insert_section(section);
    }

    for (id, object) in machine.objects {
        doc.insert_object(id, decode_map(object));
    }
    doc.arrays = machine
        .arrays
        .into_iter()
        .map(|(k, items)| (k, items.into_iter().map(decode_value).collect()))
        .collect();
    if !machine.section_order.is_empty() {
        doc.section_order = machine.section_order;
    }
    Ok(doc)
}

/// Serializes a document to envelope JSON text.
///
/// # Errors
///
/// See [`to_machine`].
pub fn serialize_machine(doc: &DxDocument) -> Result<String> {
    let machine = to_machine(doc)?;
    serde_json::to_string(&machine).map_err(Error::custom)
}

/// Parses envelope JSON text into a document.
///
/// # Errors
///
/// Returns [`Error::InvalidJson`] for text that is not JSON,
/// [`Error::UnsupportedVersion`] for a version other than 1 and
/// [`Error::InvalidEnvelope`] for JSON of the wrong shape.
///
/// ```rust
/// use dx_codec::{deserialize_machine, Error};
///
/// let doc = deserialize_machine(r#"{"version":1,"context":{"k":{"t":"b","v":true}}}"#)?;
/// assert_eq!(doc.context["k"].as_bool(), Some(true));
///
/// let err = deserialize_machine(r#"{"version":2}"#).unwrap_err();
/// assert_eq!(err, Error::UnsupportedVersion(2));
/// # Ok::<(), Error>(())
/// ```
pub fn deserialize_machine(text: &str) -> Result<DxDocument> {
    let json: JsonValue = serde_json::from_str(text).map_err(|e| Error::InvalidJson(e.to_string()))?;
    match json.get("version") {
        Some(version) => match version.as_u64() {
            Some(MACHINE_VERSION) => {}
            Some(other) => return Err(Error::UnsupportedVersion(other)),
            None => return Err(Error::invalid_envelope("'version' must be an unsigned integer")),
        },
        None => return Err(Error::invalid_envelope("missing 'version'")),
    }
    let machine: MachineDocument = serde_json::from_value(json).map_err(Error::invalid_envelope)?;
    from_machine(machine)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DxDocument {
        let mut doc = DxDocument::new();
        doc.context.insert("name".into(), "Test".into());
        doc.context.insert("cmp".into(), DxValue::Ref("A".into()));
        doc.context.insert("none".into(), DxValue::Null);
        doc.refs.insert("A".into(), "Acme".into());
        let mut users =
            DxSection::new("users", vec![FieldDef::new("id"), FieldDef::array("tags")]).unwrap();
        users
            .push_row(vec![1.into(), DxValue::Array(vec!["a".into()])])
            .unwrap();
        doc.insert_section(users);
        let mut db = DxMap::new();
        db.insert("port".into(), 5432.into());
        doc.insert_object("db", db);
        doc.arrays.insert("ids".into(), vec![1.into(), 2.into()]);
        doc.section_order = vec!["db".into(), "users".into()];
        doc
    }

    #[test]
    fn test_envelope_shape() {
        let json = serialize_machine(&sample()).unwrap();
        let value: JsonValue = serde_json::from_str(&json).unwrap();
        assert_eq!(value["version"], 1);
        assert_eq!(value["context"]["name"]["t"], "s");
        assert_eq!(value["context"]["cmp"]["t"], "r");
        assert_eq!(value["context"]["none"]["t"], "x");
        assert_eq!(value["refs"]["A"], "Acme");
        assert_eq!(value["sections"]["users"]["schema"][1], "tags");
        assert_eq!(value["sections"]["users"]["rows"][0][1]["t"], "a");
        assert_eq!(value["sectionOrder"][0], "db");
    }

    #[test]
    fn test_round_trip_is_lossless() {
        let doc = sample();
        assert_eq!(deserialize_machine(&serialize_machine(&doc).unwrap()).unwrap(), doc);
    }

    #[test]
    fn test_optional_fields_omitted() {
        let json = serialize_machine(&DxDocument::new()).unwrap();
        assert_eq!(json, r#"{"version":1,"context":{},"refs":{},"sections":{}}"#);
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let doc = deserialize_machine(r#"{"version":1,"extra":true,"context":{}}"#).unwrap();
        assert!(doc.is_empty());
    }

    #[test]
    fn test_decode_errors() {
        assert!(matches!(deserialize_machine("{"), Err(Error::InvalidJson(_))));
        assert!(matches!(deserialize_machine("{}"), Err(Error::InvalidEnvelope(_))));
        assert!(matches!(
            deserialize_machine(r#"{"version":1,"context":{"k":{"t":"q","v":1}}}"#),
            Err(Error::InvalidEnvelope(msg)) if msg.contains("'q'")
        ));
        assert!(matches!(
            deserialize_machine(r#"{"version":1,"context":{"k":{"t":"n","v":"1"}}}"#),
            Err(Error::InvalidEnvelope(_))
        ));
        assert!(matches!(
            deserialize_machine(
                r#"{"version":1,"sections":{"t":{"id":"t","schema":["a"],"rows":[[]]}}}"#
            ),
            Err(Error::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn test_non_finite_rejected() {
        let mut doc = DxDocument::new();
        doc.context.insert("x".into(), DxValue::Number(f64::NAN));
        assert!(matches!(serialize_machine(&doc), Err(Error::NonFiniteNumber(_))));
    }
}
