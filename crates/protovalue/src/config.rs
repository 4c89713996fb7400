//! Runtime configuration for allocation-capable operations

use serde::{Deserialize, Serialize};

use crate::recycle::RecyclePolicy;

/// Smallest capacity an array grows to on its first append.
pub const DEFAULT_MIN_ARRAY_CAPACITY: usize = 4;

/// Configuration for operations that may allocate.
///
/// This is passed to the `*_in` forms of the mutators (`get_mutable_in`,
/// `append_mutable_in`, ...). The plain forms use [`RuntimeConfig::default`].
///
/// Hosts can load it from JSON:
///
/// ```
/// use protovalue::{RecyclePolicy, RuntimeConfig};
///
/// let config: RuntimeConfig =
///     serde_json::from_str(r#"{ "recycle": "always_allocate" }"#).unwrap();
/// assert_eq!(config.recycle, RecyclePolicy::AlwaysAllocate);
/// assert_eq!(config.min_array_capacity, 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Whether exclusively owned values are reused for fresh slots
    pub recycle: RecyclePolicy,

    /// Capacity floor for array growth
    pub min_array_capacity: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl RuntimeConfig {
    /// Create a config with default settings.
    pub const fn new() -> Self {
        Self {
            recycle: RecyclePolicy::Reuse,
            min_array_capacity: DEFAULT_MIN_ARRAY_CAPACITY,
        }
    }

    /// Create a config that always allocates instead of recycling.
    pub const fn no_recycling() -> Self {
        Self {
            recycle: RecyclePolicy::AlwaysAllocate,
            min_array_capacity: DEFAULT_MIN_ARRAY_CAPACITY,
        }
    }

    /// Set the recycling policy.
    pub fn with_recycle(mut self, recycle: RecyclePolicy) -> Self {
        self.recycle = recycle;
        self
    }

    /// Set the array capacity floor (at least 1).
    pub fn with_min_array_capacity(mut self, min: usize) -> Self {
        self.min_array_capacity = min.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_reuses() {
        let config = RuntimeConfig::default();
        assert_eq!(config.recycle, RecyclePolicy::Reuse);
        assert_eq!(config.min_array_capacity, DEFAULT_MIN_ARRAY_CAPACITY);
    }

    #[test]
    fn test_min_capacity_floor() {
        let config = RuntimeConfig::new().with_min_array_capacity(0);
        assert_eq!(config.min_array_capacity, 1);
    }

    #[test]
    fn test_json_roundtrip() {
        let config = RuntimeConfig::no_recycling().with_min_array_capacity(16);
        let json = serde_json::to_string(&config).unwrap();
        let back: RuntimeConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
