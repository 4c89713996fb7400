//! Schema metadata consumed by messages and arrays
//!
//! Messages and arrays are schema-agnostic containers. Every access goes
//! through a [`FieldDef`], which supplies the field's type, its slot index
//! (also its presence bit), and its default. A [`MessageDef`] fixes the
//! number of slots and the size of the presence bitset for one message type.

mod descriptor;
mod registry;

pub use descriptor::{FieldDescriptor, MessageDescriptor};
pub use registry::SchemaRegistry;

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::array::Array;
use crate::error::{Result, SchemaError};
use crate::message::Message;
use crate::value::{Value, ValueKind};

/// Largest field number allowed by the wire format.
pub const MAX_FIELD_NUMBER: u32 = (1 << 29) - 1;

/// Field numbers reserved for the protocol buffer implementation.
pub const RESERVED_FIELD_NUMBERS: std::ops::RangeInclusive<u32> = 19_000..=19_999;

// ═══════════════════════════════════════════════════════════════════════
// Type Table
// ═══════════════════════════════════════════════════════════════════════

/// Declared type of a field, as written in a schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// 64-bit float
    Double,
    /// 32-bit float
    Float,
    /// Varint-encoded signed 64-bit
    Int64,
    /// Varint-encoded unsigned 64-bit
    UInt64,
    /// Varint-encoded signed 32-bit
    Int32,
    /// Fixed-width unsigned 64-bit
    Fixed64,
    /// Fixed-width unsigned 32-bit
    Fixed32,
    /// Boolean
    Bool,
    /// UTF-8 string
    String,
    /// Group-delimited submessage
    Group,
    /// Length-delimited submessage
    Message,
    /// Raw bytes
    Bytes,
    /// Varint-encoded unsigned 32-bit
    UInt32,
    /// Enum number
    Enum,
    /// Fixed-width signed 32-bit
    SFixed32,
    /// Fixed-width signed 64-bit
    SFixed64,
    /// Zigzag-encoded signed 32-bit
    SInt32,
    /// Zigzag-encoded signed 64-bit
    SInt64,
}

impl FieldType {
    /// In-memory kind of a single value of this type.
    pub fn kind(self) -> ValueKind {
        match self {
            FieldType::Double => ValueKind::F64,
            FieldType::Float => ValueKind::F32,
            FieldType::Int64 | FieldType::SFixed64 | FieldType::SInt64 => ValueKind::I64,
            FieldType::UInt64 | FieldType::Fixed64 => ValueKind::U64,
            FieldType::Int32 | FieldType::SFixed32 | FieldType::SInt32 | FieldType::Enum => {
                ValueKind::I32
            }
            FieldType::UInt32 | FieldType::Fixed32 => ValueKind::U32,
            FieldType::Bool => ValueKind::Bool,
            FieldType::String => ValueKind::String,
            FieldType::Bytes => ValueKind::Bytes,
            FieldType::Group | FieldType::Message => ValueKind::Message,
        }
    }

    /// Inline width of one value in bytes; managed types store a pointer.
    pub fn size(self) -> usize {
        match self.kind() {
            ValueKind::Bool => 1,
            ValueKind::I32 | ValueKind::U32 | ValueKind::F32 => 4,
            ValueKind::I64 | ValueKind::U64 | ValueKind::F64 => 8,
            _ => std::mem::size_of::<usize>(),
        }
    }

    /// Whether values of this type are reference counted.
    pub fn is_managed(self) -> bool {
        self.kind().is_managed()
    }

    /// Whether this is a submessage type (message or group).
    pub fn is_submessage(self) -> bool {
        matches!(self, FieldType::Message | FieldType::Group)
    }
}

/// Field cardinality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    /// Zero or one value
    #[default]
    Optional,
    /// Exactly one value (not enforced by the containers)
    Required,
    /// Zero or more values, stored in an [`Array`]
    Repeated,
}

// ═══════════════════════════════════════════════════════════════════════
// Field Definitions
// ═══════════════════════════════════════════════════════════════════════

/// Input to [`MessageDefBuilder::field`].
#[derive(Debug, Clone)]
pub struct FieldSpec {
    name: String,
    number: u32,
    field_type: FieldType,
    label: Label,
    message_def: Option<Arc<MessageDef>>,
    default: Option<Value>,
}

impl FieldSpec {
    /// An optional field of the given type.
    pub fn new(name: impl Into<String>, number: u32, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            number,
            field_type,
            label: Label::Optional,
            message_def: None,
            default: None,
        }
    }

    /// An optional submessage field.
    pub fn message(name: impl Into<String>, number: u32, def: Arc<MessageDef>) -> Self {
        Self::new(name, number, FieldType::Message).with_message(def)
    }

    /// Set the label.
    pub fn label(mut self, label: Label) -> Self {
        self.label = label;
        self
    }

    /// Mark the field repeated.
    pub fn repeated(self) -> Self {
        self.label(Label::Repeated)
    }

    /// Mark the field required.
    pub fn required(self) -> Self {
        self.label(Label::Required)
    }

    /// Attach the nested definition of a submessage field.
    pub fn with_message(mut self, def: Arc<MessageDef>) -> Self {
        self.message_def = Some(def);
        self
    }

    /// Set an explicit default value.
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    fn into_def(self, index: usize) -> Result<FieldDef> {
        if self.number == 0
            || self.number > MAX_FIELD_NUMBER
            || RESERVED_FIELD_NUMBERS.contains(&self.number)
        {
            return Err(SchemaError::InvalidFieldNumber {
                field: self.name,
                number: self.number,
            });
        }

        match (&self.message_def, self.field_type.is_submessage()) {
            (None, true) => return Err(SchemaError::MissingMessageType { field: self.name }),
            (Some(def), false) => {
                return Err(SchemaError::UnexpectedMessageType {
                    type_name: def.name().to_string(),
                    field: self.name,
                })
            }
            _ => {}
        }

        let kind = self.field_type.kind();
        let default = match self.default {
            Some(_) if self.label == Label::Repeated || self.field_type.is_submessage() => {
                return Err(SchemaError::DefaultNotAllowed { field: self.name });
            }
            Some(value) if value.kind() != kind => {
                return Err(SchemaError::DefaultTypeMismatch {
                    field: self.name,
                    expected: kind,
                    got: value.kind().to_string(),
                });
            }
            Some(value) => value,
            None if self.label == Label::Repeated => Value::array(Array::new()),
            None => match &self.message_def {
                Some(def) => Value::message(Message::new(def)),
                None => Value::zero(kind),
            },
        };

        Ok(FieldDef {
            name: self.name,
            number: self.number,
            field_type: self.field_type,
            label: self.label,
            index,
            message_def: self.message_def,
            default,
        })
    }
}

/// Read-only metadata for one field of a message type.
#[derive(Debug, Clone)]
pub struct FieldDef {
    name: String,
    number: u32,
    field_type: FieldType,
    label: Label,
    index: usize,
    message_def: Option<Arc<MessageDef>>,
    default: Value,
}

impl FieldDef {
    /// Field name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Field number on the wire
    pub fn number(&self) -> u32 {
        self.number
    }

    /// Declared type
    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    /// Cardinality
    pub fn label(&self) -> Label {
        self.label
    }

    /// Slot index within the message, also the presence bit index
    pub fn index(&self) -> usize {
        self.index
    }

    /// Nested definition of a submessage field
    pub fn message_def(&self) -> Option<&Arc<MessageDef>> {
        self.message_def.as_ref()
    }

    /// Value returned by `Message::get` while the field is absent.
    ///
    /// Shared and read-only: an empty array for repeated fields, an empty
    /// message for submessage fields.
    pub fn default_value(&self) -> &Value {
        &self.default
    }

    /// Whether the field holds an array of values
    pub fn is_repeated(&self) -> bool {
        self.label == Label::Repeated
    }

    /// Whether the element type is message or group
    pub fn is_submessage(&self) -> bool {
        self.field_type.is_submessage()
    }

    /// Whether the field's slot holds a reference-counted value
    pub fn is_managed(&self) -> bool {
        self.is_repeated() || self.elem_is_managed()
    }

    /// Whether a single element of this field is reference counted
    pub fn elem_is_managed(&self) -> bool {
        self.field_type.is_managed()
    }

    /// Kind of a single element
    pub fn elem_kind(&self) -> ValueKind {
        self.field_type.kind()
    }

    /// Kind stored in the message slot: an array for repeated fields
    pub fn slot_kind(&self) -> ValueKind {
        if self.is_repeated() {
            ValueKind::Array
        } else {
            self.elem_kind()
        }
    }

    /// Byte and bit mask of this field's presence flag
    pub fn presence_mask(&self) -> (usize, u8) {
        (self.index / 8, 1 << (self.index % 8))
    }

    /// A newly allocated empty element (string, bytes, or submessage).
    pub fn fresh_element(&self) -> Value {
        match &self.message_def {
            Some(def) => Value::message(Message::new(def)),
            None => Value::zero(self.elem_kind()),
        }
    }

    /// A newly allocated empty slot value (an array for repeated fields).
    pub fn fresh_value(&self) -> Value {
        if self.is_repeated() {
            Value::array(Array::new())
        } else {
            self.fresh_element()
        }
    }

    /// Panic unless `value` can be stored in this field's slot.
    pub fn check_value(&self, value: &Value) {
        assert!(
            value.kind() == self.slot_kind(),
            "field '{}' holds {}, got {}",
            self.name,
            self.slot_kind(),
            value.kind()
        );
        self.check_nested(value);
    }

    /// Panic unless `value` can be stored as an element of this field.
    pub fn check_element(&self, value: &Value) {
        assert!(
            value.kind() == self.elem_kind(),
            "elements of field '{}' are {}, got {}",
            self.name,
            self.elem_kind(),
            value.kind()
        );
        self.check_nested(value);
    }

    fn check_nested(&self, value: &Value) {
        if let (Value::Message(m), Some(def)) = (value, &self.message_def) {
            debug_assert_eq!(
                m.slot_count(),
                def.field_count(),
                "submessage does not match type '{}'",
                def.name()
            );
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Message Definitions
// ═══════════════════════════════════════════════════════════════════════

/// Layout of one message type.
///
/// Fields are kept in definition order, which is also their slot order.
#[derive(Debug)]
pub struct MessageDef {
    name: String,
    fields: IndexMap<String, FieldDef>,
    by_number: HashMap<u32, usize>,
    data_size: usize,
}

impl MessageDef {
    /// Start building a message type.
    pub fn builder(name: impl Into<String>) -> MessageDefBuilder {
        MessageDefBuilder {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Fully qualified type name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up a field by name
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.get(name)
    }

    /// Look up a field by wire number
    pub fn field_by_number(&self, number: u32) -> Option<&FieldDef> {
        self.by_number
            .get(&number)
            .and_then(|&i| self.field_at(i))
    }

    /// Look up a field by slot index
    pub fn field_at(&self, index: usize) -> Option<&FieldDef> {
        self.fields.get_index(index).map(|(_, f)| f)
    }

    /// All fields in slot order
    pub fn fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.values()
    }

    /// Number of fields (and slots)
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Bytes needed for the presence bitset
    pub fn set_flags_bytes(&self) -> usize {
        self.fields.len().div_ceil(8)
    }

    /// Total inline width of all fields
    pub fn data_size(&self) -> usize {
        self.data_size
    }
}

/// Builder returned by [`MessageDef::builder`].
#[derive(Debug)]
pub struct MessageDefBuilder {
    name: String,
    fields: Vec<FieldSpec>,
}

impl MessageDefBuilder {
    /// Add a field; slot indices follow call order.
    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.fields.push(spec);
        self
    }

    /// Validate the fields and freeze the layout.
    pub fn build(self) -> Result<Arc<MessageDef>> {
        let mut fields = IndexMap::with_capacity(self.fields.len());
        let mut by_number = HashMap::with_capacity(self.fields.len());
        let mut data_size = 0;

        for (index, spec) in self.fields.into_iter().enumerate() {
            if fields.contains_key(&spec.name) {
                return Err(SchemaError::DuplicateFieldName {
                    message: self.name,
                    field: spec.name,
                });
            }
            if by_number.insert(spec.number, index).is_some() {
                return Err(SchemaError::DuplicateFieldNumber {
                    message: self.name,
                    number: spec.number,
                });
            }
            let def = spec.into_def(index)?;
            data_size += if def.is_repeated() {
                std::mem::size_of::<usize>()
            } else {
                def.field_type.size()
            };
            fields.insert(def.name.clone(), def);
        }

        Ok(Arc::new(MessageDef {
            name: self.name,
            fields,
            by_number,
            data_size,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_table() {
        assert_eq!(FieldType::SInt32.kind(), ValueKind::I32);
        assert_eq!(FieldType::Fixed64.size(), 8);
        assert_eq!(FieldType::Bool.size(), 1);
        assert!(FieldType::Bytes.is_managed());
        assert!(FieldType::Group.is_submessage());
        assert!(!FieldType::Enum.is_managed());
    }

    #[test]
    fn test_indices_follow_definition_order() {
        let def = MessageDef::builder("Pair")
            .field(FieldSpec::new("a", 5, FieldType::Int32))
            .field(FieldSpec::new("b", 2, FieldType::String))
            .build()
            .unwrap();
        assert_eq!(def.field("a").unwrap().index(), 0);
        assert_eq!(def.field_by_number(2).unwrap().name(), "b");
        assert_eq!(def.field_at(1).unwrap().number(), 2);
        assert_eq!(def.set_flags_bytes(), 1);
    }

    #[test]
    fn test_presence_mask_spans_bytes() {
        let mut builder = MessageDef::builder("Wide");
        for n in 1..=10 {
            builder = builder.field(FieldSpec::new(format!("f{}", n), n, FieldType::Bool));
        }
        let def = builder.build().unwrap();
        assert_eq!(def.set_flags_bytes(), 2);
        assert_eq!(def.field("f10").unwrap().presence_mask(), (1, 0b10));
        assert_eq!(def.data_size(), 10);
    }

    #[test]
    fn test_defaults() {
        let inner = MessageDef::builder("Inner").build().unwrap();
        let def = MessageDef::builder("Outer")
            .field(FieldSpec::new("n", 1, FieldType::UInt32))
            .field(FieldSpec::new("s", 2, FieldType::String).with_default("dflt"))
            .field(FieldSpec::new("r", 3, FieldType::Int64).repeated())
            .field(FieldSpec::message("m", 4, inner))
            .build()
            .unwrap();
        assert_eq!(def.field("n").unwrap().default_value(), &Value::U32(0));
        assert_eq!(def.field("s").unwrap().default_value().as_str(), Some("dflt"));
        assert!(def.field("r").unwrap().default_value().as_array().unwrap().is_empty());
        assert!(def.field("m").unwrap().default_value().as_message().is_some());
    }

    #[test]
    fn test_managed_classification() {
        let def = MessageDef::builder("M")
            .field(FieldSpec::new("ints", 1, FieldType::Int32).repeated())
            .field(FieldSpec::new("n", 2, FieldType::Int32))
            .build()
            .unwrap();
        let ints = def.field("ints").unwrap();
        assert!(ints.is_managed());
        assert!(!ints.elem_is_managed());
        assert_eq!(ints.slot_kind(), ValueKind::Array);
        assert!(!def.field("n").unwrap().is_managed());
    }
}
