//! Extension kernel: declaration checks and ordered initialization.

use crate::extension::manifest::{ExtensionManifest, ManifestValidationError};
use crate::registry::CapabilityRegistry;
use log::{error, info};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Boxed error an extension reports from `initialize`.
pub type InitError = Box<dyn Error + Send + Sync>;

/// A module the host links in and initializes against the registry.
pub trait Extension: Send + Sync {
    fn manifest(&self) -> &ExtensionManifest;

    /// Registers this extension's capabilities and may look up others'.
    fn initialize(&self, registry: &CapabilityRegistry) -> Result<(), InitError>;
}

/// Ordered set of extensions awaiting initialization.
#[derive(Default)]
pub struct ExtensionKernel {
    extensions: Vec<Box<dyn Extension>>,
    ids: BTreeSet<String>,
}

impl ExtensionKernel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one extension after manifest validation.
    pub fn register(&mut self, extension: Box<dyn Extension>) -> Result<(), ExtensionKernelError> {
        let manifest = extension.manifest();
        manifest
            .validate()
            .map_err(ExtensionKernelError::InvalidManifest)?;
        let id = manifest.id.trim().to_string();
        if self.ids.contains(&id) {
            return Err(ExtensionKernelError::DuplicateExtensionId(id));
        }

        self.ids.insert(id);
        self.extensions.push(extension);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    /// Registered ids in registration order.
    pub fn ids(&self) -> Vec<&str> {
        self.extensions
            .iter()
            .map(|extension| extension.manifest().id.as_str())
            .collect()
    }

    /// Initializes every extension in registration order.
    ///
    /// Stops at the first failure; later extensions are not initialized.
    pub fn initialize_all(&self, registry: &CapabilityRegistry) -> Result<usize, ExtensionKernelError> {
        for extension in &self.extensions {
            let manifest = extension.manifest();
            let started_at = Instant::now();
            if let Err(source) = extension.initialize(registry) {
                error!(
                    "event=extension_init module=extension status=error id={} version={} duration_ms={} error={}",
                    manifest.id,
                    manifest.version,
                    started_at.elapsed().as_millis(),
                    source
                );
                return Err(ExtensionKernelError::InitFailed {
                    id: manifest.id.clone(),
                    source,
                });
            }
            info!(
                "event=extension_init module=extension status=ok id={} version={} duration_ms={}",
                manifest.id,
                manifest.version,
                started_at.elapsed().as_millis()
            );
        }
        Ok(self.extensions.len())
    }
}

#[derive(Debug)]
pub enum ExtensionKernelError {
    InvalidManifest(ManifestValidationError),
    DuplicateExtensionId(String),
    InitFailed { id: String, source: InitError },
}

impl Display for ExtensionKernelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidManifest(err) => write!(f, "invalid extension manifest: {err}"),
            Self::DuplicateExtensionId(value) => {
                write!(f, "extension id already registered: {value}")
            }
            Self::InitFailed { id, source } => {
                write!(f, "extension `{id}` failed to initialize: {source}")
            }
        }
    }
}

impl Error for ExtensionKernelError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidManifest(err) => Some(err),
            Self::InitFailed { source, .. } => Some(source.as_ref()),
            Self::DuplicateExtensionId(_) => None,
        }
    }
}
