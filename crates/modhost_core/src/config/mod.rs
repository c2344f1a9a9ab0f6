//! File-backed configuration sections.
//!
//! # Responsibility
//! - Describe how a config type is seeded on disk (`ConfigDefault`).
//! - Load each config once, cache it, and hand out the shared instance.
//!
//! # Invariants
//! - A config file is only ever created, never rewritten, by this module.
//! - The seed is either a serialized default value or a verbatim template copy.

pub mod codec;
mod file;
pub mod host;
pub mod resources;
pub(crate) mod store;

pub use codec::YamlCodec;
pub use host::{DatabaseMode, DatabaseSettings, HostConfig, HOST_CONFIG_FILE};
pub use resources::{TemplateResources, HOST_CONFIG_TEMPLATE};

use parking_lot::RwLock;
use std::sync::Arc;

/// Shared, in-memory mutable handle to a cached config instance.
pub type SharedConfig<T> = Arc<RwLock<T>>;

/// How a missing config file gets its initial contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigDefault<T> {
    /// Serialize this value as YAML.
    Value(T),
    /// Copy the named bundled template byte-for-byte.
    Template(String),
}

impl<T> ConfigDefault<T> {
    pub fn template(name: impl Into<String>) -> Self {
        Self::Template(name.into())
    }
}

/// Counters for config materialization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfigStats {
    /// Files created from a default.
    pub seeded: usize,
    /// Files read and deserialized into the cache.
    pub loaded: usize,
}
