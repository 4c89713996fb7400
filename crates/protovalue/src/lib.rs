//! # protovalue
//!
//! The in-memory value model for schema-driven protocol buffer messages.
//!
//! Decoded messages, repeated-field arrays, and field values live here,
//! together with the ownership rules that let a decoder write into them over
//! and over without churning the allocator.
//!
//! ## Architecture
//!
//! - **Values**: inline scalars, or `Arc` references to strings, byte
//!   strings, arrays, and submessages
//! - **Arrays**: growable sequences for repeated fields
//! - **Messages**: one typed slot per field plus a presence bitset
//! - **Recycling**: exclusively owned values are emptied and reused instead
//!   of being freed and reallocated
//! - **Schema**: read-only field and message metadata that drives every
//!   access
//!
//! Containers are schema-agnostic: callers pass the [`FieldDef`] for every
//! read and write. Reference counts are atomic, so independent holders can
//! release the same value from different threads. Mutation needs `&mut`
//! access, so a shared value is never modified behind another holder's back.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod array;
pub mod config;
pub mod error;
pub mod message;
pub mod recycle;
pub mod schema;
pub mod value;

// Re-export main types
pub use array::Array;
pub use config::{RuntimeConfig, DEFAULT_MIN_ARRAY_CAPACITY};
pub use error::{Result, SchemaError};
pub use message::Message;
pub use recycle::RecyclePolicy;
pub use schema::{
    FieldDef, FieldDescriptor, FieldSpec, FieldType, Label, MessageDef, MessageDefBuilder,
    MessageDescriptor, SchemaRegistry,
};
pub use value::{Value, ValueKind, ValueMut};

/// protovalue version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_shared_types_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Value>();
        assert_send_sync::<Message>();
        assert_send_sync::<Array>();
        assert_send_sync::<SchemaRegistry>();
    }
}
