//! Concurrent registry of message definitions

use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use super::{FieldSpec, MessageDef, MessageDescriptor};
use crate::error::{Result, SchemaError};

/// Message definitions by fully qualified name.
///
/// Shared between threads behind `&self`; decoders look definitions up
/// while loaders add new ones.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    defs: DashMap<String, Arc<MessageDef>>,
}

impl SchemaRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a definition, returning the one it replaced.
    pub fn register(&self, def: Arc<MessageDef>) -> Option<Arc<MessageDef>> {
        debug!(
            message = def.name(),
            fields = def.field_count(),
            "registering message definition"
        );
        self.defs.insert(def.name().to_string(), def)
    }

    /// Look up a definition by name.
    pub fn get(&self, name: &str) -> Option<Arc<MessageDef>> {
        self.defs.get(name).map(|entry| Arc::clone(entry.value()))
    }

    /// Check whether a name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.defs.contains_key(name)
    }

    /// Number of registered definitions.
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Build a definition from a descriptor and register it.
    ///
    /// Message and group fields resolve `type_name` against definitions
    /// already in the registry, so descriptors must be loaded dependencies
    /// first.
    pub fn load(&self, descriptor: &MessageDescriptor) -> Result<Arc<MessageDef>> {
        let mut builder = MessageDef::builder(&descriptor.name);
        for field in &descriptor.fields {
            let mut spec = FieldSpec::new(&field.name, field.number, field.field_type)
                .label(field.label);
            if let Some(type_name) = &field.type_name {
                let nested = self
                    .get(type_name)
                    .ok_or_else(|| SchemaError::UnknownType(type_name.clone()))?;
                spec = spec.with_message(nested);
            }
            if let Some(default) = field.default_value()? {
                spec = spec.with_default(default);
            }
            builder = builder.field(spec);
        }
        let def = builder.build()?;
        self.register(Arc::clone(&def));
        Ok(def)
    }

    /// Load a JSON array of descriptors in order.
    pub fn load_json(&self, json: &str) -> Result<Vec<Arc<MessageDef>>> {
        let descriptors: Vec<MessageDescriptor> = serde_json::from_str(json)?;
        descriptors.iter().map(|d| self.load(d)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_get() {
        let registry = SchemaRegistry::new();
        assert!(registry.is_empty());
        let def = MessageDef::builder("pkg.Empty").build().unwrap();
        assert!(registry.register(Arc::clone(&def)).is_none());
        assert!(registry.contains("pkg.Empty"));
        assert!(Arc::ptr_eq(&registry.get("pkg.Empty").unwrap(), &def));
        assert!(registry.register(def).is_some());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unknown_nested_type() {
        let registry = SchemaRegistry::new();
        let result = registry.load_json(
            r#"[{ "name": "A", "fields": [
                { "name": "b", "number": 1, "type": "message", "type_name": "B" }
            ] }]"#,
        );
        assert!(matches!(result, Err(SchemaError::UnknownType(name)) if name == "B"));
    }
}
