//! Core of the modhost server-extension host.
//! Extensions share builders, configs, tables and commands through one
//! capability registry owned by the host.

pub mod bootstrap;
pub mod builders;
pub mod commands;
pub mod config;
pub mod db;
pub mod extension;
pub mod logging;
pub mod registry;
pub mod schema;

pub use bootstrap::{register_builtin, start, StartError};
pub use commands::{
    CommandContext, CommandDispatcher, CommandError, CommandOutcome, CommandRegistrar,
    CommandSpec, PendingCommands,
};
pub use config::{ConfigDefault, ConfigStats, HostConfig, SharedConfig};
pub use db::{Database, DbError, DbResult};
pub use extension::kernel::{Extension, ExtensionKernel, ExtensionKernelError, InitError};
pub use extension::manifest::{ExtensionManifest, ManifestValidationError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use registry::{CapabilityKey, CapabilityRegistry, RegistryError, RegistryResult, TableKind};
pub use schema::{Column, ColumnType, SchemaError, SchemaSync, TableSchema};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

pub(crate) fn build_mode() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "release"
    }
}
