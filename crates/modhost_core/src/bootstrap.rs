//! Startup wiring of built-in capabilities.
//!
//! # Invariants
//! - Built-ins are registered before any extension initializes, so
//!   extensions can look them up or override them.

use crate::builders::{
    ChestGuiBuilder, CommandBuilder, DefaultChestGuiBuilder, DefaultCommandBuilder,
    DefaultSidebarInfoBuilder, DefaultTeleportRequestBuilder, DefaultTextBuilder,
    SidebarInfoBuilder, TeleportRequestBuilder, TextBuilder,
};
use crate::commands::{info as info_command, CommandError};
use crate::config::{ConfigDefault, HostConfig, HOST_CONFIG_FILE, HOST_CONFIG_TEMPLATE};
use crate::extension::kernel::{ExtensionKernel, ExtensionKernelError};
use crate::registry::CapabilityRegistry;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Registers the host config descriptor, the built-in builder families and
/// the info command.
pub fn register_builtin(registry: &CapabilityRegistry) -> Result<(), CommandError> {
    registry.register_config::<HostConfig>(
        HOST_CONFIG_FILE,
        ConfigDefault::template(HOST_CONFIG_TEMPLATE),
    );

    registry.register_builder::<dyn CommandBuilder, _>(|| Box::new(DefaultCommandBuilder::new()));
    registry.register_builder::<dyn TeleportRequestBuilder, _>(|| {
        Box::new(DefaultTeleportRequestBuilder::new())
    });
    registry.register_builder::<dyn TextBuilder, _>(|| Box::new(DefaultTextBuilder::new()));
    registry.register_builder::<dyn ChestGuiBuilder, _>(|| Box::new(DefaultChestGuiBuilder::new()));
    registry.register_builder::<dyn SidebarInfoBuilder, _>(|| {
        Box::new(DefaultSidebarInfoBuilder::new())
    });

    registry.register_command(info_command::register)?;

    info!(
        "event=builtin_register module=bootstrap status=ok builders={}",
        registry.builder_count()
    );
    Ok(())
}

/// Registers built-ins, then initializes every extension in `kernel`.
///
/// Returns the number of initialized extensions.
pub fn start(registry: &CapabilityRegistry, kernel: &ExtensionKernel) -> Result<usize, StartError> {
    register_builtin(registry).map_err(StartError::Builtin)?;
    let initialized = kernel
        .initialize_all(registry)
        .map_err(StartError::Extension)?;
    info!(
        "event=host_start module=bootstrap status=ok extensions={}",
        initialized
    );
    Ok(initialized)
}

#[derive(Debug)]
pub enum StartError {
    Builtin(CommandError),
    Extension(ExtensionKernelError),
}

impl Display for StartError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Builtin(err) => write!(f, "built-in registration failed: {err}"),
            Self::Extension(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StartError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Builtin(err) => Some(err),
            Self::Extension(err) => Some(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::register_builtin;
    use crate::builders::{
        ChestGuiBuilder, CommandBuilder, SidebarInfoBuilder, TeleportRequestBuilder, TextBuilder,
    };
    use crate::commands::{info::INFO_COMMAND, CommandDispatcher, PendingCommands};
    use crate::registry::CapabilityRegistry;
    use std::sync::Arc;

    #[test]
    fn registers_every_builtin_family_and_the_info_command() {
        let dir = tempfile::tempdir().expect("tempdir");
        let commands = Arc::new(PendingCommands::new());
        let registry = CapabilityRegistry::new(dir.path(), commands.clone());

        register_builtin(&registry).expect("builtins");

        assert!(registry.has_builder::<dyn CommandBuilder>());
        assert!(registry.has_builder::<dyn TeleportRequestBuilder>());
        assert!(registry.has_builder::<dyn TextBuilder>());
        assert!(registry.has_builder::<dyn ChestGuiBuilder>());
        assert!(registry.has_builder::<dyn SidebarInfoBuilder>());
        assert_eq!(registry.builder_count(), 5);

        let mut dispatcher = CommandDispatcher::new();
        commands.install(&mut dispatcher, false).expect("install");
        assert_eq!(dispatcher.names(), vec![INFO_COMMAND]);
    }
}
