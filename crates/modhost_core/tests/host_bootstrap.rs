use modhost_core::builders::{ChestGuiBuilder, SidebarInfoBuilder};
use modhost_core::commands::info::INFO_COMMAND;
use modhost_core::config::{DatabaseMode, HOST_CONFIG_FILE, HOST_CONFIG_TEMPLATE, TemplateResources};
use modhost_core::{
    start, CapabilityRegistry, Column, CommandDispatcher, CommandError, ConfigDefault, Extension,
    ExtensionKernel, ExtensionKernelError, ExtensionManifest, HostConfig, InitError,
    PendingCommands, StartError, TableSchema,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

trait HomeStore: Send {
    fn table(&self) -> &'static str;
}

struct SqliteHomes;

impl HomeStore for SqliteHomes {
    fn table(&self) -> &'static str {
        "homes"
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct HomesConfig {
    max_homes: u32,
}

struct HomesExtension {
    manifest: ExtensionManifest,
}

impl HomesExtension {
    fn boxed() -> Box<dyn Extension> {
        Box::new(Self {
            manifest: ExtensionManifest::new("homes", "1.2.0"),
        })
    }
}

impl Extension for HomesExtension {
    fn manifest(&self) -> &ExtensionManifest {
        &self.manifest
    }

    fn initialize(&self, registry: &CapabilityRegistry) -> Result<(), InitError> {
        registry.register_config(
            "homes/homes.yaml",
            ConfigDefault::Value(HomesConfig { max_homes: 3 }),
        );
        registry.register_model_handler::<dyn HomeStore, _>(|| Box::new(SqliteHomes));

        // Built-ins are visible during init.
        let gui = registry
            .get_builder::<dyn ChestGuiBuilder>()?
            .title("Homes")
            .rows(1)
            .build()?;
        if gui.slot_count() != 9 {
            return Err(format!("unexpected slot count {}", gui.slot_count()).into());
        }

        registry.register_command(|dispatcher: &mut CommandDispatcher| {
            dispatcher.literal("homes", "List your homes.", |ctx| {
                ctx.reply(format!("homes for {}", ctx.source()));
                Ok(1)
            })
        })?;
        Ok(())
    }
}

struct DependsOnMissing {
    manifest: ExtensionManifest,
}

impl Extension for DependsOnMissing {
    fn manifest(&self) -> &ExtensionManifest {
        &self.manifest
    }

    fn initialize(&self, registry: &CapabilityRegistry) -> Result<(), InitError> {
        registry.get_model_handler::<dyn HomeStore>()?;
        Ok(())
    }
}

#[test]
fn startup_seeds_host_config_from_bundled_template() {
    let dir = tempfile::tempdir().unwrap();
    let registry = CapabilityRegistry::new(dir.path(), Arc::new(PendingCommands::new()));
    start(&registry, &ExtensionKernel::new()).unwrap();

    let host = registry.get_config::<HostConfig>().unwrap();
    assert_eq!(*host.read(), HostConfig::default());
    assert_eq!(host.read().database.mode, DatabaseMode::Sqlite);

    let written = std::fs::read(dir.path().join(HOST_CONFIG_FILE)).unwrap();
    let bundled = TemplateResources::builtin().get(HOST_CONFIG_TEMPLATE).unwrap();
    assert_eq!(written, bundled);
}

#[test]
fn extension_registers_capabilities_and_commands() {
    let dir = tempfile::tempdir().unwrap();
    let commands = Arc::new(PendingCommands::new());
    let registry = CapabilityRegistry::new(dir.path(), commands.clone());
    let mut kernel = ExtensionKernel::new();
    kernel.register(HomesExtension::boxed()).unwrap();

    assert_eq!(start(&registry, &kernel).unwrap(), 1);

    let store = registry.get_model_handler::<dyn HomeStore>().unwrap();
    assert_eq!(store.table(), "homes");
    let homes = registry.get_config::<HomesConfig>().unwrap();
    assert_eq!(homes.read().max_homes, 3);
    assert!(dir.path().join("homes/homes.yaml").exists());
    assert!(registry.has_builder::<dyn SidebarInfoBuilder>());

    let host = registry.get_config::<HostConfig>().unwrap().read().clone();
    let mut memory = host;
    memory.database.mode = DatabaseMode::Memory;
    registry
        .attach_database(Arc::new(memory.open_database(dir.path()).unwrap()))
        .unwrap();
    let sync = registry
        .register_table(
            &TableSchema::new("homes")
                .column(Column::integer("id").primary_key())
                .column(Column::text("owner")),
        )
        .unwrap();
    assert!(sync.created);

    let mut dispatcher = CommandDispatcher::new();
    assert_eq!(commands.install(&mut dispatcher, false).unwrap(), 2);
    assert_eq!(dispatcher.names(), vec!["homes", INFO_COMMAND]);

    let outcome = dispatcher.execute("homes", "alex").unwrap();
    assert_eq!(outcome.status, 1);
    assert_eq!(outcome.feedback, vec!["homes for alex".to_string()]);

    let late = registry.register_command(|_: &mut CommandDispatcher| Ok(()));
    assert_eq!(late, Err(CommandError::RegistrationClosed));
}

#[test]
fn missing_dependency_fails_startup_with_extension_id() {
    let dir = tempfile::tempdir().unwrap();
    let registry = CapabilityRegistry::new(dir.path(), Arc::new(PendingCommands::new()));
    let mut kernel = ExtensionKernel::new();
    kernel
        .register(Box::new(DependsOnMissing {
            manifest: ExtensionManifest::new("warps", "0.3.0"),
        }))
        .unwrap();

    let err = start(&registry, &kernel).unwrap_err();
    match err {
        StartError::Extension(ExtensionKernelError::InitFailed { id, source }) => {
            assert_eq!(id, "warps");
            assert!(source.to_string().contains("HomeStore"));
        }
        other => panic!("unexpected error: {other}"),
    }
}
