//! Extension manifests and the init-phase kernel.
//!
//! Extensions are linked in by the host; this module only validates their
//! declarations and drives their `initialize` hook against the shared
//! capability registry.

pub mod kernel;
pub mod manifest;
