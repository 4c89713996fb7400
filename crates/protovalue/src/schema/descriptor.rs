//! Serializable message descriptors
//!
//! A descriptor is the plain-data form of a message type, suitable for
//! shipping schemas as JSON. [`super::SchemaRegistry::load`] turns one into
//! a [`super::MessageDef`].

use serde::{Deserialize, Serialize};

use super::{FieldType, Label};
use crate::error::{Result, SchemaError};
use crate::value::{Value, ValueKind};

/// A message type in descriptor form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageDescriptor {
    /// Fully qualified type name
    pub name: String,

    /// Fields in slot order
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
}

/// A field in descriptor form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Field name
    pub name: String,

    /// Wire number
    pub number: u32,

    /// Declared type
    #[serde(rename = "type")]
    pub field_type: FieldType,

    /// Cardinality (optional when omitted)
    #[serde(default)]
    pub label: Label,

    /// Message type name for message and group fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,

    /// Explicit default as a JSON scalar
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
}

impl FieldDescriptor {
    /// Convert the JSON default into a typed value for this field.
    pub(crate) fn default_value(&self) -> Result<Option<Value>> {
        let Some(json) = &self.default else {
            return Ok(None);
        };
        let kind = self.field_type.kind();
        let value = match kind {
            ValueKind::Bool => json.as_bool().map(Value::Bool),
            ValueKind::I32 => json.as_i64().and_then(|n| i32::try_from(n).ok()).map(Value::I32),
            ValueKind::I64 => json.as_i64().map(Value::I64),
            ValueKind::U32 => json.as_u64().and_then(|n| u32::try_from(n).ok()).map(Value::U32),
            ValueKind::U64 => json.as_u64().map(Value::U64),
            ValueKind::F32 => json.as_f64().map(|n| Value::F32(n as f32)),
            ValueKind::F64 => json.as_f64().map(Value::F64),
            ValueKind::String => json.as_str().map(Value::string),
            ValueKind::Bytes => json.as_str().map(|s| Value::bytes(s.as_bytes())),
            ValueKind::Array | ValueKind::Message => {
                return Err(SchemaError::DefaultNotAllowed {
                    field: self.name.clone(),
                })
            }
        };
        value.map(Some).ok_or_else(|| SchemaError::DefaultTypeMismatch {
            field: self.name.clone(),
            expected: kind,
            got: json.to_string(),
        })
    }
}
