//! Messages: schema-shaped slots plus a presence bitset

use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::array::Array;
use crate::config::RuntimeConfig;
use crate::schema::{FieldDef, MessageDef};
use crate::value::{Value, ValueMut};

/// A decoded message of some [`MessageDef`] type.
///
/// A message holds one slot per field and one presence bit per field. It
/// does not keep its definition; callers pass the relevant [`FieldDef`] to
/// every access, the way a decoder walks the schema.
///
/// A field is present only after it has been written (`set`, `get_mutable`,
/// `append_value`, `append_mutable_message`). Absent fields read as their
/// schema default.
///
/// # Example
///
/// ```
/// use protovalue::{FieldSpec, FieldType, Message, MessageDef, Value};
///
/// let def = MessageDef::builder("Person")
///     .field(FieldSpec::new("id", 1, FieldType::Int32))
///     .field(FieldSpec::new("email", 2, FieldType::String).repeated())
///     .build()
///     .unwrap();
/// let id = def.field("id").unwrap();
/// let email = def.field("email").unwrap();
///
/// let mut person = Message::new(&def);
/// assert!(!person.has(id));
/// assert_eq!(person.get(id), &Value::I32(0));
///
/// person.set(id, Value::I32(42));
/// person.append_value(email, Value::string("a@example.com"));
///
/// assert_eq!(person.get(id), &Value::I32(42));
/// assert_eq!(person.get(email).as_array().unwrap().len(), 1);
/// ```
pub struct Message {
    presence: Box<[u8]>,
    slots: Box<[Option<Value>]>,
}

impl Message {
    /// Create a message with every field absent.
    pub fn new(def: &MessageDef) -> Self {
        trace!(
            message = def.name(),
            fields = def.field_count(),
            data_size = def.data_size(),
            "creating message"
        );
        Self {
            presence: vec![0; def.set_flags_bytes()].into_boxed_slice(),
            slots: (0..def.field_count()).map(|_| None).collect(),
        }
    }

    /// Obtain an empty message in `slot`. See [`Message::recycle_in`].
    pub fn recycle<'a>(slot: &'a mut Option<Arc<Message>>, def: &MessageDef) -> &'a mut Message {
        Self::recycle_in(slot, def, &RuntimeConfig::default())
    }

    /// Obtain an empty message of type `def` in `slot`.
    ///
    /// The message already in `slot` is cleared and reused when nothing else
    /// references it and `config` allows recycling. Otherwise a new message
    /// replaces it and the old reference is released.
    pub fn recycle_in<'a>(
        slot: &'a mut Option<Arc<Message>>,
        def: &MessageDef,
        config: &RuntimeConfig,
    ) -> &'a mut Message {
        let reuse =
            config.recycle.reuses() && slot.as_mut().is_some_and(|m| Arc::get_mut(m).is_some());
        if !reuse {
            trace!(message = def.name(), "allocating message for recycle");
            *slot = Some(Arc::new(Message::new(def)));
        }

        let message = Arc::make_mut(slot.get_or_insert_with(|| Arc::new(Message::new(def))));
        if reuse {
            trace!(message = def.name(), "reusing exclusively owned message");
            debug_assert_eq!(message.slot_count(), def.field_count());
            message.clear();
        }
        message
    }

    /// Check whether `field` has been written.
    pub fn has(&self, field: &FieldDef) -> bool {
        let (byte, mask) = field.presence_mask();
        self.presence[byte] & mask != 0
    }

    /// Mark every field absent.
    ///
    /// Values already in the slots are not released here. They stay owned by
    /// the message as recycling candidates for `get_mutable`, and are
    /// released when the slot is overwritten or the message is dropped.
    pub fn clear(&mut self) {
        self.presence.fill(0);
    }

    /// The field's value if present, otherwise its schema default.
    ///
    /// Managed values returned here are read-only; clone the value to keep a
    /// reference, or use [`Message::get_mutable`] to modify it.
    pub fn get<'a>(&'a self, field: &'a FieldDef) -> &'a Value {
        match &self.slots[field.index()] {
            Some(value) if self.has(field) => {
                debug_assert_eq!(value.kind(), field.slot_kind());
                value
            }
            _ => field.default_value(),
        }
    }

    /// Writable access to a string, bytes, array, or submessage field.
    /// See [`Message::get_mutable_in`].
    pub fn get_mutable(&mut self, field: &FieldDef) -> ValueMut<'_> {
        self.get_mutable_in(field, &RuntimeConfig::default())
    }

    /// Writable access to a string, bytes, array, or submessage field.
    ///
    /// A present field is returned as it is (copied first if another holder
    /// shares it). An absent field is marked present and given an empty
    /// value, reusing whatever the slot still holds from before a `clear`
    /// when `config` allows. Panics on an unmanaged scalar field.
    pub fn get_mutable_in(&mut self, field: &FieldDef, config: &RuntimeConfig) -> ValueMut<'_> {
        assert!(
            field.is_managed(),
            "get_mutable on scalar field '{}'",
            field.name()
        );
        let present = self.has(field);
        if !present {
            self.mark_present(field);
        }

        let slot = &mut self.slots[field.index()];
        if present {
            slot.get_or_insert_with(|| field.fresh_value())
                .as_value_mut()
        } else {
            config
                .recycle
                .fill_slot(slot, field.slot_kind(), || field.fresh_value())
        }
    }

    /// Writable submessage for a singular message field.
    pub fn mutable_message(&mut self, field: &FieldDef) -> &mut Message {
        self.get_mutable(field).into_message()
    }

    /// Writable array for a repeated field.
    pub fn mutable_array(&mut self, field: &FieldDef) -> &mut Array {
        self.get_mutable(field).into_array()
    }

    /// Writable string for a singular string field.
    pub fn mutable_string(&mut self, field: &FieldDef) -> &mut String {
        self.get_mutable(field).into_string()
    }

    /// Writable bytes for a singular bytes field.
    pub fn mutable_bytes(&mut self, field: &FieldDef) -> &mut Vec<u8> {
        self.get_mutable(field).into_bytes()
    }

    /// Write a field and mark it present.
    ///
    /// Any value previously in the slot, present or stale, is released.
    /// Panics if `value` does not match the field's slot kind.
    pub fn set(&mut self, field: &FieldDef, value: Value) {
        field.check_value(&value);
        self.slots[field.index()] = Some(value);
        self.mark_present(field);
    }

    /// Append a value to a repeated field. See [`Message::append_value_in`].
    pub fn append_value(&mut self, field: &FieldDef, value: Value) {
        self.append_value_in(field, value, &RuntimeConfig::default());
    }

    /// Append `value` to a repeated field, creating its array on first use;
    /// on a singular field, overwrite the current value.
    ///
    /// Panics on submessage fields, which go through
    /// [`Message::append_mutable_message_in`].
    pub fn append_value_in(&mut self, field: &FieldDef, value: Value, config: &RuntimeConfig) {
        assert!(
            !field.is_submessage(),
            "append_value on submessage field '{}'",
            field.name()
        );
        if field.is_repeated() {
            self.get_mutable_in(field, config)
                .into_array()
                .append_in(field, value, config);
        } else {
            self.set(field, value);
        }
    }

    /// Append an empty submessage. See [`Message::append_mutable_message_in`].
    pub fn append_mutable_message(&mut self, field: &FieldDef) -> &mut Message {
        self.append_mutable_message_in(field, &RuntimeConfig::default())
    }

    /// Append a submessage to a repeated message field and return it for the
    /// caller to populate. Panics unless the field is a repeated submessage.
    pub fn append_mutable_message_in(
        &mut self,
        field: &FieldDef,
        config: &RuntimeConfig,
    ) -> &mut Message {
        assert!(
            field.is_repeated() && field.is_submessage(),
            "append_mutable_message on field '{}', which is not a repeated submessage",
            field.name()
        );
        self.get_mutable_in(field, config)
            .into_array()
            .append_mutable_in(field, config)
            .into_message()
    }

    /// Present fields with their values, in slot order.
    pub fn present_fields<'a>(
        &'a self,
        def: &'a MessageDef,
    ) -> impl Iterator<Item = (&'a FieldDef, &'a Value)> + 'a {
        def.fields()
            .filter(move |f| self.has(f))
            .map(move |f| (f, self.get(f)))
    }

    pub(crate) fn slot_count(&self) -> usize {
        self.slots.len()
    }

    fn mark_present(&mut self, field: &FieldDef) {
        let (byte, mask) = field.presence_mask();
        self.presence[byte] |= mask;
    }

    fn is_set(&self, index: usize) -> bool {
        self.presence[index / 8] & (1 << (index % 8)) != 0
    }

    fn present_slots(&self) -> impl Iterator<Item = (usize, &Value)> {
        self.slots
            .iter()
            .enumerate()
            .filter(move |(i, _)| self.is_set(*i))
            .filter_map(|(i, slot)| slot.as_ref().map(|v| (i, v)))
    }
}

impl Clone for Message {
    /// Copies present fields only; stale slot values stay with the source.
    fn clone(&self) -> Self {
        Self {
            presence: self.presence.clone(),
            slots: self
                .slots
                .iter()
                .enumerate()
                .map(|(i, slot)| if self.is_set(i) { slot.clone() } else { None })
                .collect(),
        }
    }
}

impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        self.slots.len() == other.slots.len()
            && self.presence == other.presence
            && self.present_slots().eq(other.present_slots())
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.present_slots()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldSpec, FieldType};

    fn def() -> Arc<MessageDef> {
        MessageDef::builder("T")
            .field(FieldSpec::new("a", 1, FieldType::Int32))
            .field(FieldSpec::new("b", 2, FieldType::String))
            .build()
            .unwrap()
    }

    #[test]
    fn test_clone_skips_stale_slots() {
        let def = def();
        let b = def.field("b").unwrap();
        let mut m = Message::new(&def);
        m.set(b, Value::string("stale"));
        m.clear();
        let copy = m.clone();
        assert!(copy.slots[1].is_none());
        assert!(m.slots[1].is_some());
        assert_eq!(copy, m);
    }

    #[test]
    fn test_debug_lists_present_slots() {
        let def = def();
        let mut m = Message::new(&def);
        m.set(def.field("a").unwrap(), Value::I32(7));
        assert_eq!(format!("{:?}", m), "{0: 7i32}");
    }

    #[test]
    #[should_panic(expected = "holds i32, got string")]
    fn test_set_wrong_kind_panics() {
        let def = def();
        let mut m = Message::new(&def);
        m.set(def.field("a").unwrap(), Value::string("nope"));
    }

    #[test]
    #[should_panic(expected = "get_mutable on scalar field")]
    fn test_get_mutable_scalar_panics() {
        let def = def();
        let mut m = Message::new(&def);
        let _ = m.get_mutable(def.field("a").unwrap());
    }
}
