//! Type-erased factory tables for builders and model handlers.
//!
//! # Invariants
//! - One factory per key; registering again replaces the previous one.
//! - Lookups never cache: every call runs the factory.
//! - Factories run outside the table lock, so they may query the registry.

use super::{CapabilityKey, RegistryError, RegistryResult, TableKind};
use log::{error, info};
use parking_lot::RwLock;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

type Factory<T> = Arc<dyn Fn() -> Box<T> + Send + Sync>;

pub(crate) struct FactoryTable {
    kind: TableKind,
    entries: RwLock<HashMap<CapabilityKey, Box<dyn Any + Send + Sync>>>,
}

impl FactoryTable {
    pub(crate) fn new(kind: TableKind) -> Self {
        Self {
            kind,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Stores `factory` under `T`'s key. Returns whether an entry was replaced.
    pub(crate) fn register<T, F>(&self, factory: F) -> bool
    where
        T: ?Sized + 'static,
        F: Fn() -> Box<T> + Send + Sync + 'static,
    {
        let key = CapabilityKey::of::<T>();
        let handle: Factory<T> = Arc::new(factory);
        let replaced = self.entries.write().insert(key, Box::new(handle)).is_some();
        info!(
            "event=factory_register module=registry status=ok table={} key={} replaced={}",
            self.kind, key, replaced
        );
        replaced
    }

    /// Runs the factory registered for `T`.
    pub(crate) fn create<T: ?Sized + 'static>(&self) -> RegistryResult<Box<T>> {
        let key = CapabilityKey::of::<T>();
        let factory = self
            .entries
            .read()
            .get(&key)
            .and_then(|entry| entry.downcast_ref::<Factory<T>>())
            .cloned();

        match factory {
            Some(factory) => Ok(factory()),
            None => {
                error!(
                    "event=factory_lookup module=registry status=error table={} key={} error_code=not_registered",
                    self.kind, key
                );
                Err(RegistryError::NotRegistered {
                    table: self.kind,
                    key,
                })
            }
        }
    }

    pub(crate) fn contains<T: ?Sized + 'static>(&self) -> bool {
        self.entries.read().contains_key(&CapabilityKey::of::<T>())
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.read().len()
    }
}
