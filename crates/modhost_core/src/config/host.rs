//! The host's own configuration section.

use crate::db::{Database, DbResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File name the host config is registered under.
pub const HOST_CONFIG_FILE: &str = "modhost.yaml";

/// Storage backing for the shared database handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatabaseMode {
    Sqlite,
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    pub mode: DatabaseMode,
    /// Relative paths resolve against the config directory.
    pub file: String,
}

/// Settings loaded from `modhost.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostConfig {
    pub database: DatabaseSettings,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            database: DatabaseSettings {
                mode: DatabaseMode::Sqlite,
                file: "modhost.db".to_string(),
            },
            log_level: default_log_level(),
        }
    }
}

impl HostConfig {
    /// Opens the database these settings describe.
    pub fn open_database(&self, config_dir: &Path) -> DbResult<Database> {
        match self.database.mode {
            DatabaseMode::Memory => Database::open_in_memory(),
            DatabaseMode::Sqlite => Database::open(config_dir.join(&self.database.file)),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::{DatabaseMode, HostConfig};
    use crate::config::{TemplateResources, YamlCodec, HOST_CONFIG_TEMPLATE};

    #[test]
    fn bundled_template_matches_defaults() {
        let bytes = TemplateResources::builtin()
            .get(HOST_CONFIG_TEMPLATE)
            .expect("bundled template");
        let parsed: HostConfig = YamlCodec::new().from_slice(bytes).expect("template parses");
        assert_eq!(parsed, HostConfig::default());
    }

    #[test]
    fn log_level_defaults_when_omitted() {
        let parsed: HostConfig = YamlCodec::new()
            .from_slice(b"database:\n  mode: memory\n  file: unused.db\n")
            .expect("parse");
        assert_eq!(parsed.database.mode, DatabaseMode::Memory);
        assert_eq!(parsed.log_level, "info");
    }

    #[test]
    fn opens_in_memory_database() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut config = HostConfig::default();
        config.database.mode = DatabaseMode::Memory;
        config.open_database(dir.path()).expect("open memory db");
        assert!(!dir.path().join("modhost.db").exists());
    }
}
