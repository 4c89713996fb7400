//! Shared ownership of managed values
//!
//! Managed values are `Arc` handles. Cloning a [`Value`] takes a reference,
//! dropping it releases one, and the backing object is destroyed exactly once
//! by whichever holder drops the last reference. Destroying an array or a
//! message drops every value it stores, which releases nested references in
//! turn.

use std::sync::Arc;

use super::Value;
use crate::array::Array;
use crate::message::Message;

/// Mutable access to the object behind a managed value.
///
/// Returned by the mutators that hand out a writable instance for the caller
/// to populate in place (`Message::get_mutable`, `Array::append_mutable`).
#[derive(Debug)]
pub enum ValueMut<'a> {
    /// A string to fill
    String(&'a mut String),
    /// A byte string to fill
    Bytes(&'a mut Vec<u8>),
    /// An array to append to
    Array(&'a mut Array),
    /// A submessage to populate
    Message(&'a mut Message),
}

impl<'a> ValueMut<'a> {
    /// Unwrap a mutable string. Panics on any other kind.
    pub fn into_string(self) -> &'a mut String {
        match self {
            ValueMut::String(s) => s,
            other => panic!("expected mutable string, got {}", other.kind_name()),
        }
    }

    /// Unwrap a mutable byte string. Panics on any other kind.
    pub fn into_bytes(self) -> &'a mut Vec<u8> {
        match self {
            ValueMut::Bytes(b) => b,
            other => panic!("expected mutable bytes, got {}", other.kind_name()),
        }
    }

    /// Unwrap a mutable array. Panics on any other kind.
    pub fn into_array(self) -> &'a mut Array {
        match self {
            ValueMut::Array(a) => a,
            other => panic!("expected mutable array, got {}", other.kind_name()),
        }
    }

    /// Unwrap a mutable submessage. Panics on any other kind.
    pub fn into_message(self) -> &'a mut Message {
        match self {
            ValueMut::Message(m) => m,
            other => panic!("expected mutable message, got {}", other.kind_name()),
        }
    }

    fn kind_name(&self) -> &'static str {
        match self {
            ValueMut::String(_) => "string",
            ValueMut::Bytes(_) => "bytes",
            ValueMut::Array(_) => "array",
            ValueMut::Message(_) => "message",
        }
    }
}

impl Value {
    /// Number of live references to a managed value, `None` for scalars.
    pub fn ref_count(&self) -> Option<usize> {
        match self {
            Value::String(s) => Some(Arc::strong_count(s)),
            Value::Bytes(b) => Some(Arc::strong_count(b)),
            Value::Array(a) => Some(Arc::strong_count(a)),
            Value::Message(m) => Some(Arc::strong_count(m)),
            _ => None,
        }
    }

    /// Whether this handle is the only reference to its managed object.
    ///
    /// Always false for scalars. Takes `&mut self` because exclusivity is
    /// decided by `Arc::get_mut`, which also rules out outstanding weak
    /// handles.
    pub fn is_exclusive(&mut self) -> bool {
        match self {
            Value::String(s) => Arc::get_mut(s).is_some(),
            Value::Bytes(b) => Arc::get_mut(b).is_some(),
            Value::Array(a) => Arc::get_mut(a).is_some(),
            Value::Message(m) => Arc::get_mut(m).is_some(),
            _ => false,
        }
    }

    /// Reference identity for managed values, equality for scalars.
    pub fn ptr_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::String(a), Value::String(b)) => Arc::ptr_eq(a, b),
            (Value::Bytes(a), Value::Bytes(b)) => Arc::ptr_eq(a, b),
            (Value::Array(a), Value::Array(b)) => Arc::ptr_eq(a, b),
            (Value::Message(a), Value::Message(b)) => Arc::ptr_eq(a, b),
            (a, b) if !a.is_managed() && !b.is_managed() => a == b,
            _ => false,
        }
    }

    /// Mutable access to a managed value.
    ///
    /// An exclusively owned object is returned in place. A shared one is
    /// copied first so other holders never observe the mutation. Panics for
    /// scalars, which are overwritten with `set` instead.
    pub fn as_value_mut(&mut self) -> ValueMut<'_> {
        match self {
            Value::String(s) => ValueMut::String(Arc::make_mut(s)),
            Value::Bytes(b) => ValueMut::Bytes(Arc::make_mut(b)),
            Value::Array(a) => ValueMut::Array(Arc::make_mut(a)),
            Value::Message(m) => ValueMut::Message(Arc::make_mut(m)),
            other => panic!("{} is not a managed value", other.kind()),
        }
    }

    /// Empty an exclusively owned managed value without reallocating.
    pub(crate) fn reset_in_place(&mut self) {
        match self.as_value_mut() {
            ValueMut::String(s) => s.clear(),
            ValueMut::Bytes(b) => b.clear(),
            ValueMut::Array(a) => a.clear(),
            ValueMut::Message(m) => m.clear(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ref_count_tracks_clones() {
        let v = Value::string("hello");
        assert_eq!(v.ref_count(), Some(1));
        let w = v.clone();
        assert_eq!(v.ref_count(), Some(2));
        drop(w);
        assert_eq!(v.ref_count(), Some(1));
        assert_eq!(Value::I32(3).ref_count(), None);
    }

    #[test]
    fn test_as_value_mut_copies_shared() {
        let mut v = Value::string("abc");
        let other = v.clone();
        v.as_value_mut().into_string().push('d');
        assert_eq!(v.as_str(), Some("abcd"));
        assert_eq!(other.as_str(), Some("abc"));
        assert!(!v.ptr_eq(&other));
    }

    #[test]
    #[should_panic(expected = "not a managed value")]
    fn test_as_value_mut_scalar_panics() {
        let mut v = Value::I64(1);
        let _ = v.as_value_mut();
    }
}
