//! Value serializers
//!
//! A serializer sits between a store's domain [`Value`] and the bytes a
//! backend persists. Validation happens in [`Serializer::serialize`], before
//! any backend I/O.

use serde::{Deserialize, Serialize};

use super::error::{StoreError, StoreResult};
use crate::domain::{Cell, Table, Value};

/// Serialization named in store configuration; absent means raw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SerializationType {
    Json,
    Csv,
}

/// The active value encoding of a store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Serializer {
    /// Text and bytes pass through unchanged
    #[default]
    Raw,
    /// JSON documents, pretty-printed
    Json,
    /// Tables rendered as comma-separated text; write-only
    Csv,
}

impl From<Option<SerializationType>> for Serializer {
    fn from(kind: Option<SerializationType>) -> Self {
        match kind {
            None => Serializer::Raw,
            Some(SerializationType::Json) => Serializer::Json,
            Some(SerializationType::Csv) => Serializer::Csv,
        }
    }
}

impl Serializer {
    pub fn name(&self) -> &'static str {
        match self {
            Serializer::Raw => "raw",
            Serializer::Json => "json",
            Serializer::Csv => "csv",
        }
    }

    /// Returns false if values written through this serializer cannot be read back
    pub fn supports_deserialize(&self) -> bool {
        !matches!(self, Serializer::Csv)
    }

    pub fn serialize(&self, value: &Value) -> StoreResult<Vec<u8>> {
        match (self, value) {
            (Serializer::Raw, Value::Text(text)) => Ok(text.as_bytes().to_vec()),
            (Serializer::Raw, Value::Bytes(bytes)) => Ok(bytes.clone()),
            (Serializer::Json, Value::Json(doc)) => {
                let mut out = serde_json::to_string_pretty(doc)?;
                out.push('\n');
                Ok(out.into_bytes())
            }
            (Serializer::Csv, Value::Table(table)) => Ok(render_csv(table).into_bytes()),
            (serializer, other) => Err(StoreError::InvalidValue {
                serializer: serializer.name(),
                reason: format!("expected {}, got {}", serializer.accepts(), other.type_name()),
            }),
        }
    }

    pub fn deserialize(&self, bytes: Vec<u8>) -> StoreResult<Value> {
        match self {
            Serializer::Raw => Ok(match String::from_utf8(bytes) {
                Ok(text) => Value::Text(text),
                Err(err) => Value::Bytes(err.into_bytes()),
            }),
            Serializer::Json => Ok(Value::Json(serde_json::from_slice(&bytes)?)),
            Serializer::Csv => Err(StoreError::DeserializationUnsupported(self.name())),
        }
    }

    fn accepts(&self) -> &'static str {
        match self {
            Serializer::Raw => "text or bytes",
            Serializer::Json => "json",
            Serializer::Csv => "table",
        }
    }
}

/// Renders a table: header row, then one line per row, each ending in `\n`
fn render_csv(table: &Table) -> String {
    let mut out = String::new();

    let header: Vec<String> = table.columns().iter().map(|c| quote_field(c)).collect();
    out.push_str(&header.join(","));
    out.push('\n');

    for row in table.rows() {
        let fields: Vec<String> = row.iter().map(render_cell).collect();
        out.push_str(&fields.join(","));
        out.push('\n');
    }

    out
}

fn render_cell(cell: &Cell) -> String {
    match cell {
        Cell::Null => String::new(),
        Cell::Bool(true) => "True".to_string(),
        Cell::Bool(false) => "False".to_string(),
        Cell::Int(v) => v.to_string(),
        Cell::Float(v) if v.is_nan() => String::new(),
        Cell::Float(v) => render_float(*v),
        Cell::Text(s) => quote_field(s),
    }
}

/// Python float repr: `1.0`, `1e+16`, `2.5e-07`
///
/// Debug already keeps the fractional part and switches to exponent form at
/// the same magnitudes; only the exponent needs a sign and two digits.
fn render_float(v: f64) -> String {
    let debug = format!("{:?}", v);
    let Some((mantissa, exponent)) = debug.split_once('e') else {
        return debug;
    };

    let (sign, digits) = match exponent.strip_prefix('-') {
        Some(digits) => ('-', digits),
        None => ('+', exponent),
    };
    format!("{}e{}{:0>2}", mantissa, sign, digits)
}

fn quote_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
