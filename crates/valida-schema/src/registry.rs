//! Named-validator registry

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;
use valida_validation::ValidatorRef;

/// A registry entry
#[derive(Debug, Clone)]
pub enum Registered {
    Instance(ValidatorRef),
    /// Instantiated on first lookup, then replaced by the instance
    Producer(fn() -> ValidatorRef),
}

/// Thread-safe registry of named validators
#[derive(Debug, Default)]
pub struct Registry {
    entries: DashMap<String, Registered>,
}

impl Registry {
    /// Create a new empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to a validator, replacing any previous binding
    pub fn register(&self, name: impl Into<String>, validator: ValidatorRef) {
        self.entries.insert(name.into(), Registered::Instance(validator));
    }

    /// Bind `name` to a producer instantiated lazily
    pub fn register_producer(&self, name: impl Into<String>, producer: fn() -> ValidatorRef) {
        self.entries.insert(name.into(), Registered::Producer(producer));
    }

    /// Look up a validator, instantiating and caching a producer entry
    ///
    /// The producer runs without holding any shard lock. If another lookup
    /// cached an instance first, that instance is returned instead.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<ValidatorRef> {
        let produce = match self.entries.get(name)?.value() {
            Registered::Instance(validator) => return Some(Arc::clone(validator)),
            Registered::Producer(produce) => *produce,
        };
        let validator = produce();
        match self.entries.entry(name.to_string()) {
            Entry::Occupied(mut occupied) => {
                if let Registered::Instance(cached) = occupied.get() {
                    return Some(Arc::clone(cached));
                }
                occupied.insert(Registered::Instance(Arc::clone(&validator)));
            }
            Entry::Vacant(vacant) => {
                vacant.insert(Registered::Instance(Arc::clone(&validator)));
            }
        }
        debug!("Instantiated registered validator: {}", name);
        Some(validator)
    }

    /// Check if a name is registered
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered names, in no particular order
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.key().clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use valida_validation::{Enum, Type};

    fn gender() -> ValidatorRef {
        Arc::new(Enum::new(["male", "female"]).named("gender"))
    }

    #[test]
    fn test_register_and_overwrite() {
        let registry = Registry::new();
        registry.register("number", Arc::new(Type::number()));
        registry.register("number", Arc::new(Type::integer()));

        let found = registry.get("number").unwrap();
        assert_eq!(found.name(), Some("integer"));
        assert!(registry.get("missing").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_producer_is_cached_after_first_lookup() {
        let registry = Registry::new();
        registry.register_producer("gender", gender);

        let first = registry.get("gender").unwrap();
        let second = registry.get("gender").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(matches!(
            registry.entries.get("gender").map(|e| e.value().clone()),
            Some(Registered::Instance(_))
        ));
    }

    #[test]
    fn test_concurrent_lookups_share_one_instance() {
        let registry = Registry::new();
        registry.register_producer("gender", gender);

        let found: Vec<ValidatorRef> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| registry.get("gender").unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        let cached = registry.get("gender").unwrap();
        assert!(found.iter().all(|v| Arc::ptr_eq(v, &cached)));
    }
}
