//! Growable arrays backing repeated fields

use std::fmt;

use tracing::debug;

use crate::config::RuntimeConfig;
use crate::schema::FieldDef;
use crate::value::{Value, ValueMut};

/// A reference-counted sequence of values for one repeated field.
///
/// Every access takes the field's [`FieldDef`] as element metadata. Values
/// past `len()` are stale elements left behind by [`Array::clear`]; they are
/// not observable, but `append_mutable` reuses them when nothing else holds
/// a reference.
///
/// # Example
///
/// ```
/// use protovalue::{Array, FieldSpec, FieldType, MessageDef, Value};
///
/// let def = MessageDef::builder("Scores")
///     .field(FieldSpec::new("score", 1, FieldType::Int32).repeated())
///     .build()
///     .unwrap();
/// let score = def.field("score").unwrap();
///
/// let mut scores = Array::new();
/// scores.append(score, Value::I32(10));
/// scores.append(score, Value::I32(20));
/// scores.set(score, 0, Value::I32(15));
///
/// assert_eq!(scores.len(), 2);
/// assert_eq!(scores.get(score, 0), &Value::I32(15));
/// ```
#[derive(Default)]
pub struct Array {
    len: usize,
    elements: Vec<Value>,
}

impl Array {
    /// Create an empty array.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty array with room for `capacity` elements.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            len: 0,
            elements: Vec::with_capacity(capacity),
        }
    }

    /// Number of live elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the array has no live elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Allocated element slots; never less than `len()`.
    pub fn capacity(&self) -> usize {
        self.elements.capacity()
    }

    /// Live elements in order.
    pub fn as_slice(&self) -> &[Value] {
        &self.elements[..self.len]
    }

    /// Iterate over live elements.
    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.as_slice().iter()
    }

    /// Read the element at `index`. Panics if `index >= len()`.
    pub fn get(&self, elem: &FieldDef, index: usize) -> &Value {
        self.check_index(index);
        let value = &self.elements[index];
        debug_assert_eq!(value.kind(), elem.elem_kind());
        value
    }

    /// Replace the element at `index`, releasing the previous value.
    ///
    /// Does not extend the array; use [`Array::append`] or
    /// [`Array::append_mutable`] for that. Panics if `index >= len()` or if
    /// `value` has the wrong kind.
    pub fn set(&mut self, elem: &FieldDef, index: usize, value: Value) {
        self.check_index(index);
        elem.check_element(&value);
        self.elements[index] = value;
    }

    /// Make room for one more element, doubling capacity when full.
    pub fn ensure_capacity(&mut self, config: &RuntimeConfig) {
        let capacity = self.elements.capacity();
        if self.len < capacity {
            return;
        }
        let target = (capacity * 2).max(config.min_array_capacity);
        self.elements.reserve_exact(target - self.elements.len());
        debug!(
            old_capacity = capacity,
            new_capacity = self.elements.capacity(),
            "array grown"
        );
    }

    /// Append a caller-owned value. See [`Array::append_in`].
    pub fn append(&mut self, elem: &FieldDef, value: Value) {
        self.append_in(elem, value, &RuntimeConfig::default());
    }

    /// Append a scalar, string, or bytes value.
    ///
    /// Submessage elements are only added through
    /// [`Array::append_mutable_in`]. Panics on a submessage field or a value
    /// of the wrong kind.
    pub fn append_in(&mut self, elem: &FieldDef, value: Value, config: &RuntimeConfig) {
        assert!(
            !elem.is_submessage(),
            "submessage field '{}' must be appended with append_mutable",
            elem.name()
        );
        elem.check_element(&value);
        self.ensure_capacity(config);
        if self.len < self.elements.len() {
            self.elements[self.len] = value;
        } else {
            self.elements.push(value);
        }
        self.len += 1;
    }

    /// Append an empty managed element. See [`Array::append_mutable_in`].
    pub fn append_mutable(&mut self, elem: &FieldDef) -> ValueMut<'_> {
        self.append_mutable_in(elem, &RuntimeConfig::default())
    }

    /// Append an empty string, bytes, or submessage element and return it
    /// for the caller to fill in place.
    ///
    /// A stale element left in the new slot is reused when it is exclusively
    /// owned and `config` allows recycling. Panics if the element type is
    /// unmanaged.
    pub fn append_mutable_in(&mut self, elem: &FieldDef, config: &RuntimeConfig) -> ValueMut<'_> {
        assert!(
            elem.elem_is_managed(),
            "append_mutable on unmanaged field '{}'",
            elem.name()
        );
        self.ensure_capacity(config);
        let index = self.len;
        self.len += 1;

        if index < self.elements.len() {
            config.recycle.try_recycle(&mut self.elements[index], elem.elem_kind(), || {
                elem.fresh_element()
            })
        } else {
            self.elements.push(elem.fresh_element());
            self.elements[index].as_value_mut()
        }
    }

    /// Drop all live elements from view.
    ///
    /// The values stay in place as recycling candidates and are released when
    /// overwritten or when the array is dropped.
    pub fn clear(&mut self) {
        self.len = 0;
    }

    fn check_index(&self, index: usize) {
        assert!(
            index < self.len,
            "array index {} out of bounds (len {})",
            index,
            self.len
        );
    }
}

impl Clone for Array {
    /// Copies live elements only; stale ones stay with the source.
    fn clone(&self) -> Self {
        Self {
            len: self.len,
            elements: self.as_slice().to_vec(),
        }
    }
}

impl PartialEq for Array {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl fmt::Debug for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a> IntoIterator for &'a Array {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldSpec, FieldType, MessageDef};

    fn ints() -> std::sync::Arc<MessageDef> {
        MessageDef::builder("Ints")
            .field(FieldSpec::new("n", 1, FieldType::Int64).repeated())
            .field(FieldSpec::new("s", 2, FieldType::String).repeated())
            .build()
            .unwrap()
    }

    #[test]
    fn test_first_growth_uses_floor() {
        let def = ints();
        let n = def.field("n").unwrap();
        let mut a = Array::new();
        assert_eq!(a.capacity(), 0);
        a.append_in(n, Value::I64(1), &RuntimeConfig::new().with_min_array_capacity(8));
        assert!(a.capacity() >= 8);
    }

    #[test]
    fn test_clear_keeps_stale_elements() {
        let def = ints();
        let s = def.field("s").unwrap();
        let mut a = Array::new();
        a.append(s, Value::string("x"));
        a.clear();
        assert!(a.is_empty());
        assert_eq!(a.elements.len(), 1);
        assert_eq!(a.iter().count(), 0);
    }

    #[test]
    fn test_clone_drops_stale() {
        let def = ints();
        let s = def.field("s").unwrap();
        let mut a = Array::new();
        a.append(s, Value::string("x"));
        a.append(s, Value::string("y"));
        a.clear();
        a.append(s, Value::string("z"));
        let b = a.clone();
        assert_eq!(b.elements.len(), 1);
        assert_eq!(a, b);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_get_past_len_panics() {
        let def = ints();
        let n = def.field("n").unwrap();
        let mut a = Array::new();
        a.append(n, Value::I64(1));
        a.clear();
        let _ = a.get(n, 0);
    }
}
