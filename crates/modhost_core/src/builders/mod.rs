//! Built-in builder families published through the registry.
//!
//! Each family is an object-safe trait so extensions can swap the
//! implementation by registering a new factory for the trait object type.
//! Fluent methods take `Box<Self>` and hand back the boxed trait object.

pub mod chest_gui;
pub mod command;
pub mod sidebar;
pub mod teleport;
pub mod text;

pub use chest_gui::{ChestGui, ChestGuiBuilder, DefaultChestGuiBuilder, GuiButton};
pub use command::{CommandBuilder, DefaultCommandBuilder};
pub use sidebar::{DefaultSidebarInfoBuilder, SidebarInfo, SidebarInfoBuilder};
pub use teleport::{DefaultTeleportRequestBuilder, Facing, Position, TeleportRequest, TeleportRequestBuilder};
pub use text::{DefaultTextBuilder, Text, TextBuilder, TextColor, TextSegment};

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Validation failures raised by `build()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuilderError {
    MissingField(&'static str),
    OutOfRange {
        field: &'static str,
        value: usize,
        max: usize,
    },
    Invalid {
        field: &'static str,
        reason: String,
    },
}

impl Display for BuilderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "builder field is required: {field}"),
            Self::OutOfRange { field, value, max } => {
                write!(f, "builder field `{field}` is out of range: {value} (max {max})")
            }
            Self::Invalid { field, reason } => write!(f, "builder field `{field}` is invalid: {reason}"),
        }
    }
}

impl Error for BuilderError {}
