//! Value representation for message fields and array elements

mod display;
mod impls;
mod refs;

pub use refs::ValueMut;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::array::Array;
use crate::message::Message;

/// A field or element value.
///
/// Values come in two tiers:
/// - Unmanaged scalars stored inline (no ownership, no refcount)
/// - Managed references (strings, byte strings, arrays, submessages)
///   held through an `Arc`, so cloning a value takes a reference and
///   dropping it releases one
///
/// A value does not know which schema field it belongs to. Every container
/// access asserts the value's [`ValueKind`] against the kind declared by the
/// field definition supplied by the caller.
#[derive(Clone)]
pub enum Value {
    // ═══════════════════════════════════════════════════════════════════
    // Unmanaged Scalars
    // ═══════════════════════════════════════════════════════════════════
    /// Boolean
    Bool(bool),

    /// 32-bit signed integer (int32, sint32, sfixed32, enum)
    I32(i32),
    /// 64-bit signed integer (int64, sint64, sfixed64)
    I64(i64),
    /// 32-bit unsigned integer (uint32, fixed32)
    U32(u32),
    /// 64-bit unsigned integer (uint64, fixed64)
    U64(u64),

    /// 32-bit floating point
    F32(f32),
    /// 64-bit floating point
    F64(f64),

    // ═══════════════════════════════════════════════════════════════════
    // Managed References
    // ═══════════════════════════════════════════════════════════════════
    /// UTF-8 string
    String(Arc<String>),

    /// Raw byte string
    Bytes(Arc<Vec<u8>>),

    /// Repeated field storage
    Array(Arc<Array>),

    /// Submessage
    Message(Arc<Message>),
}

/// The in-memory shape of a [`Value`], independent of wire encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// `Value::Bool`
    Bool,
    /// `Value::I32`
    I32,
    /// `Value::I64`
    I64,
    /// `Value::U32`
    U32,
    /// `Value::U64`
    U64,
    /// `Value::F32`
    F32,
    /// `Value::F64`
    F64,
    /// `Value::String`
    String,
    /// `Value::Bytes`
    Bytes,
    /// `Value::Array`
    Array,
    /// `Value::Message`
    Message,
}

impl ValueKind {
    /// Whether values of this kind are reference counted.
    pub fn is_managed(self) -> bool {
        matches!(
            self,
            ValueKind::String | ValueKind::Bytes | ValueKind::Array | ValueKind::Message
        )
    }

    /// Lowercase name used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Bool => "bool",
            ValueKind::I32 => "i32",
            ValueKind::I64 => "i64",
            ValueKind::U32 => "u32",
            ValueKind::U64 => "u64",
            ValueKind::F32 => "f32",
            ValueKind::F64 => "f64",
            ValueKind::String => "string",
            ValueKind::Bytes => "bytes",
            ValueKind::Array => "array",
            ValueKind::Message => "message",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
