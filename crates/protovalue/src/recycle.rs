//! Slot recycling: reuse an exclusively owned value instead of reallocating
//!
//! Decode loops write the same fields over and over. When the value already
//! sitting in a slot is held by nobody else, emptying it in place is
//! indistinguishable from allocating a new one, and much cheaper.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::value::{Value, ValueKind, ValueMut};

/// Strategy for obtaining a fresh mutable value for a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecyclePolicy {
    /// Reuse the slot's current value when it is exclusively owned
    #[default]
    Reuse,

    /// Always allocate, dropping the slot's previous reference
    AlwaysAllocate,
}

impl RecyclePolicy {
    /// Whether this policy ever reuses a value.
    pub fn reuses(self) -> bool {
        self == RecyclePolicy::Reuse
    }

    /// Turn the value in `current` into an empty, writable value of `kind`.
    ///
    /// The existing object is emptied and returned when it has the expected
    /// kind and this handle is its only reference. Otherwise `fresh` builds a
    /// replacement and the old handle is dropped, which releases a shared
    /// object without touching what other holders see.
    pub fn try_recycle<'a>(
        self,
        current: &'a mut Value,
        kind: ValueKind,
        fresh: impl FnOnce() -> Value,
    ) -> ValueMut<'a> {
        assert!(kind.is_managed(), "cannot recycle unmanaged {}", kind);

        if self.reuses() && current.kind() == kind && current.is_exclusive() {
            trace!(%kind, "reusing exclusively owned value");
            current.reset_in_place();
        } else {
            trace!(%kind, refs = ?current.ref_count(), "allocating fresh value");
            *current = fresh();
            debug_assert_eq!(current.kind(), kind);
        }
        current.as_value_mut()
    }

    /// Like [`RecyclePolicy::try_recycle`], for a slot that may never have
    /// held a value.
    pub fn fill_slot<'a>(
        self,
        slot: &'a mut Option<Value>,
        kind: ValueKind,
        fresh: impl FnOnce() -> Value,
    ) -> ValueMut<'a> {
        match slot {
            Some(current) => self.try_recycle(current, kind, fresh),
            None => {
                trace!(%kind, "allocating value for empty slot");
                slot.insert(fresh()).as_value_mut()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh_string() -> Value {
        Value::string(String::new())
    }

    #[test]
    fn test_reuse_exclusive_string() {
        let mut slot = Value::string("stale");
        let ptr = slot.as_str().map(|s| s.as_ptr());

        let s = RecyclePolicy::Reuse.try_recycle(&mut slot, ValueKind::String, fresh_string);
        assert!(s.into_string().is_empty());
        // Same heap buffer: cleared, not reallocated.
        assert_eq!(slot.as_str().map(|s| s.as_ptr()), ptr);
    }

    #[test]
    fn test_shared_value_is_replaced() {
        let mut slot = Value::string("shared");
        let other = slot.clone();

        RecyclePolicy::Reuse
            .try_recycle(&mut slot, ValueKind::String, fresh_string)
            .into_string()
            .push_str("new");

        assert_eq!(other.as_str(), Some("shared"));
        assert_eq!(other.ref_count(), Some(1));
        assert_eq!(slot.as_str(), Some("new"));
    }

    #[test]
    fn test_always_allocate_replaces_exclusive() {
        let mut slot = Value::string("stale");
        let weak = match &slot {
            Value::String(s) => std::sync::Arc::downgrade(s),
            _ => unreachable!(),
        };
        // The replaced string had no other holder, so it is freed.
        RecyclePolicy::AlwaysAllocate.try_recycle(&mut slot, ValueKind::String, fresh_string);
        assert!(weak.upgrade().is_none());
        assert_eq!(slot.as_str(), Some(""));
    }

    #[test]
    fn test_kind_mismatch_is_replaced() {
        let mut slot = Value::bytes(vec![1, 2, 3]);
        RecyclePolicy::Reuse.try_recycle(&mut slot, ValueKind::String, fresh_string);
        assert_eq!(slot.kind(), ValueKind::String);
    }

    #[test]
    fn test_fill_empty_slot() {
        let mut slot = None;
        RecyclePolicy::Reuse
            .fill_slot(&mut slot, ValueKind::String, fresh_string)
            .into_string()
            .push('x');
        assert_eq!(slot.and_then(|v| v.as_str().map(str::to_owned)), Some("x".to_string()));
    }

    #[test]
    #[should_panic(expected = "cannot recycle unmanaged")]
    fn test_unmanaged_kind_panics() {
        let mut slot = Value::I32(1);
        RecyclePolicy::Reuse.try_recycle(&mut slot, ValueKind::I32, || Value::I32(0));
    }
}
