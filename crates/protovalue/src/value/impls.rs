//! Value constructors, predicates, extractors, From traits, PartialEq

use std::sync::Arc;

use super::*;

// ═══════════════════════════════════════════════════════════════════
// Convenience Constructors
// ═══════════════════════════════════════════════════════════════════

impl Value {
    /// Create a string value
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(Arc::new(s.into()))
    }

    /// Create a byte string value
    pub fn bytes(b: impl Into<Vec<u8>>) -> Self {
        Value::Bytes(Arc::new(b.into()))
    }

    /// Wrap an array as a value
    pub fn array(a: Array) -> Self {
        Value::Array(Arc::new(a))
    }

    /// Wrap a message as a value
    pub fn message(m: Message) -> Self {
        Value::Message(Arc::new(m))
    }

    /// The zero value of an unmanaged kind, or an empty string/bytes/array.
    ///
    /// Panics for [`ValueKind::Message`]: an empty message needs its
    /// definition, see [`crate::FieldDef::fresh_element`].
    pub fn zero(kind: ValueKind) -> Self {
        match kind {
            ValueKind::Bool => Value::Bool(false),
            ValueKind::I32 => Value::I32(0),
            ValueKind::I64 => Value::I64(0),
            ValueKind::U32 => Value::U32(0),
            ValueKind::U64 => Value::U64(0),
            ValueKind::F32 => Value::F32(0.0),
            ValueKind::F64 => Value::F64(0.0),
            ValueKind::String => Value::string(String::new()),
            ValueKind::Bytes => Value::bytes(Vec::new()),
            ValueKind::Array => Value::array(Array::new()),
            ValueKind::Message => panic!("a zero message requires a message definition"),
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Type Predicates
    // ═══════════════════════════════════════════════════════════════════

    /// The kind of this value
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Bool(_) => ValueKind::Bool,
            Value::I32(_) => ValueKind::I32,
            Value::I64(_) => ValueKind::I64,
            Value::U32(_) => ValueKind::U32,
            Value::U64(_) => ValueKind::U64,
            Value::F32(_) => ValueKind::F32,
            Value::F64(_) => ValueKind::F64,
            Value::String(_) => ValueKind::String,
            Value::Bytes(_) => ValueKind::Bytes,
            Value::Array(_) => ValueKind::Array,
            Value::Message(_) => ValueKind::Message,
        }
    }

    /// Check if value is reference counted
    pub fn is_managed(&self) -> bool {
        self.kind().is_managed()
    }

    /// Check if value is any integer type
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            Value::I32(_) | Value::I64(_) | Value::U32(_) | Value::U64(_)
        )
    }

    /// Check if value is any float type
    pub fn is_float(&self) -> bool {
        matches!(self, Value::F32(_) | Value::F64(_))
    }

    // ═══════════════════════════════════════════════════════════════════
    // Extractors (return Option for safe access)
    // ═══════════════════════════════════════════════════════════════════

    /// Extract boolean value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Extract i32 value
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::I32(n) => Some(*n),
            _ => None,
        }
    }

    /// Extract as i64 (widens i32 and u32)
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I32(n) => Some(*n as i64),
            Value::I64(n) => Some(*n),
            Value::U32(n) => Some(*n as i64),
            Value::U64(n) => (*n).try_into().ok(),
            _ => None,
        }
    }

    /// Extract as u64 (widens u32, rejects negatives)
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::U32(n) => Some(*n as u64),
            Value::U64(n) => Some(*n),
            Value::I32(n) => (*n).try_into().ok(),
            Value::I64(n) => (*n).try_into().ok(),
            _ => None,
        }
    }

    /// Extract as f64 (converts from f32)
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::F32(n) => Some(*n as f64),
            Value::F64(n) => Some(*n),
            _ => None,
        }
    }

    /// Extract string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Extract byte slice
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b.as_slice()),
            Value::String(s) => Some(s.as_bytes()),
            _ => None,
        }
    }

    /// Extract array
    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Value::Array(a) => Some(&**a),
            _ => None,
        }
    }

    /// Extract submessage
    pub fn as_message(&self) -> Option<&Message> {
        match self {
            Value::Message(m) => Some(&**m),
            _ => None,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════
// PartialEq Implementation
// ═══════════════════════════════════════════════════════════════════

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::I32(a), Value::I32(b)) => a == b,
            (Value::I64(a), Value::I64(b)) => a == b,
            (Value::U32(a), Value::U32(b)) => a == b,
            (Value::U64(a), Value::U64(b)) => a == b,
            (Value::F32(a), Value::F32(b)) => a == b,
            (Value::F64(a), Value::F64(b)) => a == b,
            (Value::String(a), Value::String(b)) => Arc::ptr_eq(a, b) || a == b,
            (Value::Bytes(a), Value::Bytes(b)) => Arc::ptr_eq(a, b) || a == b,
            (Value::Array(a), Value::Array(b)) => Arc::ptr_eq(a, b) || a == b,
            (Value::Message(a), Value::Message(b)) => Arc::ptr_eq(a, b) || a == b,
            _ => false,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════
// From Implementations
// ═══════════════════════════════════════════════════════════════════

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::I32(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::I64(n)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::U32(n)
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::U64(n)
    }
}

impl From<f32> for Value {
    fn from(n: f32) -> Self {
        Value::F32(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::F64(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::string(s)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::bytes(b)
    }
}

impl From<Array> for Value {
    fn from(a: Array) -> Self {
        Value::array(a)
    }
}

impl From<Message> for Value {
    fn from(m: Message) -> Self {
        Value::message(m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_matches_variant() {
        assert_eq!(Value::I32(1).kind(), ValueKind::I32);
        assert_eq!(Value::string("x").kind(), ValueKind::String);
        assert_eq!(Value::array(Array::new()).kind(), ValueKind::Array);
    }

    #[test]
    fn test_zero_values() {
        assert_eq!(Value::zero(ValueKind::U64), Value::U64(0));
        assert_eq!(Value::zero(ValueKind::String).as_str(), Some(""));
        assert!(!Value::zero(ValueKind::Bool).is_managed());
    }

    #[test]
    #[should_panic(expected = "message definition")]
    fn test_zero_message_panics() {
        let _ = Value::zero(ValueKind::Message);
    }

    #[test]
    fn test_widening_extractors() {
        assert_eq!(Value::U32(7).as_i64(), Some(7));
        assert_eq!(Value::I32(-1).as_u64(), None);
        assert_eq!(Value::F32(1.5).as_f64(), Some(1.5));
        assert_eq!(Value::U64(u64::MAX).as_i64(), None);
    }
}
