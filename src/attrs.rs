//! Type-keyed request attributes.
//!
//! Each slot is keyed by a Rust type, one value per type. The map is
//! concurrent; context clones share it.

use std::any::{Any, TypeId};
use std::fmt;

use dashmap::DashMap;

/// Concurrent type-keyed attribute map.
#[derive(Default)]
pub struct Attributes {
    map: DashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under its type, returning the previous value if any.
    pub fn set<T: Send + Sync + 'static>(&self, value: T) -> Option<T> {
        self.map
            .insert(TypeId::of::<T>(), Box::new(value))
            .and_then(|prev| prev.downcast::<T>().ok())
            .map(|boxed| *boxed)
    }

    /// Clone out the value stored under `T`.
    pub fn get<T: Clone + Send + Sync + 'static>(&self) -> Option<T> {
        self.map
            .get(&TypeId::of::<T>())
            .and_then(|v| v.value().downcast_ref::<T>().cloned())
    }

    /// Run `f` against the value stored under `T` without cloning it.
    pub fn with<T: Send + Sync + 'static, R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        self.map
            .get(&TypeId::of::<T>())
            .and_then(|v| v.value().downcast_ref::<T>().map(f))
    }

    /// Remove and return the value stored under `T`.
    pub fn remove<T: Send + Sync + 'static>(&self) -> Option<T> {
        self.map
            .remove(&TypeId::of::<T>())
            .and_then(|(_, v)| v.downcast::<T>().ok())
            .map(|boxed| *boxed)
    }

    pub fn contains<T: Send + Sync + 'static>(&self) -> bool {
        self.map.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl fmt::Debug for Attributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attributes").field("len", &self.len()).finish()
    }
}
