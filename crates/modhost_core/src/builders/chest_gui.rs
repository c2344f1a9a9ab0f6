//! Chest-style inventory menus.

use super::BuilderError;
use std::collections::BTreeMap;

pub const SLOTS_PER_ROW: usize = 9;
pub const MAX_ROWS: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuiButton {
    pub label: String,
    /// Opaque id the owning extension reacts to on click.
    pub action: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChestGui {
    pub title: String,
    pub rows: usize,
    pub buttons: BTreeMap<usize, GuiButton>,
}

impl ChestGui {
    pub fn slot_count(&self) -> usize {
        self.rows * SLOTS_PER_ROW
    }
}

pub trait ChestGuiBuilder: Send {
    fn title(self: Box<Self>, title: &str) -> Box<dyn ChestGuiBuilder>;
    fn rows(self: Box<Self>, rows: usize) -> Box<dyn ChestGuiBuilder>;
    /// Places a button; a later button on the same slot replaces it.
    fn button(self: Box<Self>, slot: usize, label: &str, action: &str) -> Box<dyn ChestGuiBuilder>;
    fn build(self: Box<Self>) -> Result<ChestGui, BuilderError>;
}

#[derive(Debug)]
pub struct DefaultChestGuiBuilder {
    title: String,
    rows: usize,
    buttons: BTreeMap<usize, GuiButton>,
}

impl Default for DefaultChestGuiBuilder {
    fn default() -> Self {
        Self {
            title: "Chest".to_string(),
            rows: 3,
            buttons: BTreeMap::new(),
        }
    }
}

impl DefaultChestGuiBuilder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ChestGuiBuilder for DefaultChestGuiBuilder {
    fn title(mut self: Box<Self>, title: &str) -> Box<dyn ChestGuiBuilder> {
        self.title = title.to_string();
        self
    }

    fn rows(mut self: Box<Self>, rows: usize) -> Box<dyn ChestGuiBuilder> {
        self.rows = rows;
        self
    }

    fn button(mut self: Box<Self>, slot: usize, label: &str, action: &str) -> Box<dyn ChestGuiBuilder> {
        self.buttons.insert(
            slot,
            GuiButton {
                label: label.to_string(),
                action: action.to_string(),
            },
        );
        self
    }

    fn build(self: Box<Self>) -> Result<ChestGui, BuilderError> {
        if self.rows == 0 || self.rows > MAX_ROWS {
            return Err(BuilderError::OutOfRange {
                field: "rows",
                value: self.rows,
                max: MAX_ROWS,
            });
        }
        let slot_count = self.rows * SLOTS_PER_ROW;
        if let Some((&slot, _)) = self.buttons.range(slot_count..).next() {
            return Err(BuilderError::OutOfRange {
                field: "slot",
                value: slot,
                max: slot_count - 1,
            });
        }

        Ok(ChestGui {
            title: self.title,
            rows: self.rows,
            buttons: self.buttons,
        })
    }
}
