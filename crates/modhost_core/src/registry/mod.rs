//! Process-wide capability registry shared by the host and its extensions.
//!
//! # Responsibility
//! - Keep the builder, model-handler and config tables keyed by type.
//! - Route schema registration to the attached database.
//! - Forward command registration to the host command registrar.
//!
//! # Invariants
//! - Registration overwrites silently: the last writer for a key wins.
//! - Builder and model-handler lookups construct a fresh instance per call.
//! - Config lookups materialize once per key and return the cached instance.
//!
//! The registry is an explicit value. The host builds one, wraps it in an
//! `Arc`, and hands the same handle to every extension during init.

mod factory;
mod key;

pub use key::CapabilityKey;

use crate::commands::{CommandBridge, CommandDispatcher, CommandError, CommandRegistrar};
use crate::config::store::ConfigStore;
use crate::config::{ConfigDefault, ConfigStats, SharedConfig};
use crate::db::Database;
use crate::schema::{self, SchemaError, SchemaSync, TableSchema};
use factory::FactoryTable;
use log::{error, info};
use once_cell::sync::OnceCell;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub type RegistryResult<T> = Result<T, RegistryError>;

/// Registry table a lookup was served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Builders,
    ModelHandlers,
    Configs,
}

impl TableKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Builders => "builders",
            Self::ModelHandlers => "model_handlers",
            Self::Configs => "configs",
        }
    }
}

impl Display for TableKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors surfaced by registry operations.
///
/// None of these are retried or papered over with defaults.
#[derive(Debug)]
pub enum RegistryError {
    /// Lookup for a key nobody registered. Usually a missing extension dependency.
    NotRegistered {
        table: TableKind,
        key: CapabilityKey,
    },
    ConfigIo {
        path: PathBuf,
        source: std::io::Error,
    },
    ConfigFormat {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    /// The registered default value could not be rendered as YAML.
    DefaultEncode {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    /// A config names a bundled template that was never bundled.
    MissingTemplate {
        resource: String,
    },
    Schema(SchemaError),
    DatabaseUnavailable,
    DatabaseAlreadyAttached,
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotRegistered { table, key } => {
                write!(f, "no {table} entry registered for `{key}`")
            }
            Self::ConfigIo { path, source } => {
                write!(f, "config file `{}` I/O failed: {source}", path.display())
            }
            Self::ConfigFormat { path, source } => {
                write!(f, "config file `{}` is malformed: {source}", path.display())
            }
            Self::DefaultEncode { path, source } => write!(
                f,
                "default value for config file `{}` could not be serialized: {source}",
                path.display()
            ),
            Self::MissingTemplate { resource } => {
                write!(f, "bundled config template is missing: {resource}")
            }
            Self::Schema(err) => write!(f, "{err}"),
            Self::DatabaseUnavailable => write!(f, "no database attached to the registry"),
            Self::DatabaseAlreadyAttached => {
                write!(f, "a database is already attached to the registry")
            }
        }
    }
}

impl Error for RegistryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::ConfigIo { source, .. } => Some(source),
            Self::ConfigFormat { source, .. } => Some(source),
            Self::DefaultEncode { source, .. } => Some(source),
            Self::Schema(err) => Some(err),
            Self::NotRegistered { .. }
            | Self::MissingTemplate { .. }
            | Self::DatabaseUnavailable
            | Self::DatabaseAlreadyAttached => None,
        }
    }
}

impl From<SchemaError> for RegistryError {
    fn from(value: SchemaError) -> Self {
        Self::Schema(value)
    }
}

/// Type-keyed registry of builders, model handlers, configs and schemas.
pub struct CapabilityRegistry {
    builders: FactoryTable,
    model_handlers: FactoryTable,
    configs: ConfigStore,
    commands: CommandBridge,
    database: OnceCell<Arc<Database>>,
}

impl CapabilityRegistry {
    /// Creates an empty registry.
    ///
    /// `config_dir` is the host configuration directory every config file
    /// name is resolved against. `commands` receives forwarded command
    /// registrations.
    pub fn new(config_dir: impl Into<PathBuf>, commands: Arc<dyn CommandRegistrar>) -> Self {
        let config_dir = config_dir.into();
        info!(
            "event=registry_init module=registry status=ok config_dir={}",
            config_dir.display()
        );
        Self {
            builders: FactoryTable::new(TableKind::Builders),
            model_handlers: FactoryTable::new(TableKind::ModelHandlers),
            configs: ConfigStore::new(config_dir),
            commands: CommandBridge::new(commands),
            database: OnceCell::new(),
        }
    }

    pub fn config_dir(&self) -> &Path {
        self.configs.config_dir()
    }

    /// Registers the builder factory answering `get_builder::<T>()`.
    ///
    /// `T` is usually a builder trait object such as `dyn TextBuilder`.
    pub fn register_builder<T, F>(&self, factory: F)
    where
        T: ?Sized + 'static,
        F: Fn() -> Box<T> + Send + Sync + 'static,
    {
        self.builders.register::<T, F>(factory);
    }

    /// Returns a freshly built instance from the factory registered for `T`.
    ///
    /// # Errors
    /// - `NotRegistered` when no extension registered `T`.
    pub fn get_builder<T: ?Sized + 'static>(&self) -> RegistryResult<Box<T>> {
        self.builders.create::<T>()
    }

    pub fn has_builder<T: ?Sized + 'static>(&self) -> bool {
        self.builders.contains::<T>()
    }

    pub fn builder_count(&self) -> usize {
        self.builders.len()
    }

    /// Registers the model-handler factory answering `get_model_handler::<T>()`.
    pub fn register_model_handler<T, F>(&self, factory: F)
    where
        T: ?Sized + 'static,
        F: Fn() -> Box<T> + Send + Sync + 'static,
    {
        self.model_handlers.register::<T, F>(factory);
    }

    /// Returns a new model handler from the factory registered for `T`.
    ///
    /// # Errors
    /// - `NotRegistered` when no extension registered `T`.
    pub fn get_model_handler<T: ?Sized + 'static>(&self) -> RegistryResult<Box<T>> {
        self.model_handlers.create::<T>()
    }

    pub fn has_model_handler<T: ?Sized + 'static>(&self) -> bool {
        self.model_handlers.contains::<T>()
    }

    /// Associates config type `T` with a file under the config directory.
    ///
    /// Only consulted on the first `get_config::<T>()`; registering again
    /// after that does not touch the cached instance.
    pub fn register_config<T>(&self, file_name: impl Into<String>, default: ConfigDefault<T>)
    where
        T: Serialize + Send + Sync + 'static,
    {
        self.configs.register(file_name.into(), default);
    }

    /// Returns the cached config for `T`, loading it on first access.
    ///
    /// The first call creates the file from its default when missing, then
    /// deserializes it. Concurrent first callers block until that finishes
    /// and all receive the same instance.
    ///
    /// # Errors
    /// - `NotRegistered` when `T` has no descriptor.
    /// - `ConfigIo` / `ConfigFormat` / `DefaultEncode` / `MissingTemplate` from
    ///   materialization;
    ///   nothing is cached in that case.
    pub fn get_config<T>(&self) -> RegistryResult<SharedConfig<T>>
    where
        T: DeserializeOwned + Send + Sync + 'static,
    {
        self.configs.get::<T>()
    }

    /// Adds a bundled template that config descriptors may name.
    pub fn register_resource(&self, name: impl Into<String>, bytes: &'static [u8]) {
        self.configs.register_resource(name.into(), bytes);
    }

    pub fn config_stats(&self) -> ConfigStats {
        self.configs.stats()
    }

    /// Installs the host's shared database handle. Allowed once.
    pub fn attach_database(&self, database: Arc<Database>) -> RegistryResult<()> {
        self.database
            .set(database)
            .map_err(|_| RegistryError::DatabaseAlreadyAttached)?;
        info!("event=database_attach module=registry status=ok");
        Ok(())
    }

    pub fn database(&self) -> Option<&Arc<Database>> {
        self.database.get()
    }

    /// Creates the table and any missing columns described by `table`.
    ///
    /// Runs in one transaction; a failure leaves the database untouched.
    /// Repeating the call with the same schema reports no changes.
    ///
    /// # Errors
    /// - `DatabaseUnavailable` before `attach_database`.
    /// - `Schema` when the existing table cannot be reconciled non-destructively.
    pub fn register_table(&self, table: &TableSchema) -> RegistryResult<SchemaSync> {
        let database = self.database.get().ok_or(RegistryError::DatabaseUnavailable)?;
        match schema::register_table(database, table) {
            Ok(sync) => Ok(sync),
            Err(err) => {
                error!(
                    "event=table_register module=registry status=error table={} error={}",
                    table.name(),
                    err
                );
                Err(err.into())
            }
        }
    }

    /// Forwards a command registration callback to the host, available in
    /// every server mode.
    ///
    /// # Errors
    /// Whatever the host registrar reports, unchanged.
    pub fn register_command<F>(&self, callback: F) -> Result<(), CommandError>
    where
        F: FnOnce(&mut CommandDispatcher) -> Result<(), CommandError> + Send + 'static,
    {
        self.commands.register_command(callback)
    }
}
