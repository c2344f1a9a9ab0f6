//! Bundled template resources used to seed config files.

use std::collections::BTreeMap;

/// Template name of the host's own config file.
pub const HOST_CONFIG_TEMPLATE: &str = "modhost.yaml";

const HOST_CONFIG_TEMPLATE_BYTES: &[u8] = include_bytes!("../../resources/modhost.yaml");

/// Read-only files compiled into the binary, addressed by name.
#[derive(Debug, Clone, Default)]
pub struct TemplateResources {
    entries: BTreeMap<String, &'static [u8]>,
}

impl TemplateResources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resources shipped with the host itself.
    pub fn builtin() -> Self {
        let mut resources = Self::new();
        resources.insert(HOST_CONFIG_TEMPLATE, HOST_CONFIG_TEMPLATE_BYTES);
        resources
    }

    /// Adds or replaces a resource. Returns whether one was replaced.
    pub fn insert(&mut self, name: impl Into<String>, bytes: &'static [u8]) -> bool {
        self.entries.insert(name.into(), bytes).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&'static [u8]> {
        self.entries.get(name).copied()
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }
}
