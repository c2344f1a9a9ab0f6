//! Builder for literal host commands.

use super::BuilderError;
use crate::commands::{CommandHandler, CommandSpec};

pub trait CommandBuilder: Send {
    fn name(self: Box<Self>, name: &str) -> Box<dyn CommandBuilder>;
    fn description(self: Box<Self>, description: &str) -> Box<dyn CommandBuilder>;
    fn executes(self: Box<Self>, handler: CommandHandler) -> Box<dyn CommandBuilder>;
    fn build(self: Box<Self>) -> Result<CommandSpec, BuilderError>;
}

#[derive(Default)]
pub struct DefaultCommandBuilder {
    name: Option<String>,
    description: String,
    handler: Option<CommandHandler>,
}

impl DefaultCommandBuilder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CommandBuilder for DefaultCommandBuilder {
    fn name(mut self: Box<Self>, name: &str) -> Box<dyn CommandBuilder> {
        self.name = Some(name.trim().to_string());
        self
    }

    fn description(mut self: Box<Self>, description: &str) -> Box<dyn CommandBuilder> {
        self.description = description.to_string();
        self
    }

    fn executes(mut self: Box<Self>, handler: CommandHandler) -> Box<dyn CommandBuilder> {
        self.handler = Some(handler);
        self
    }

    fn build(self: Box<Self>) -> Result<CommandSpec, BuilderError> {
        let name = self
            .name
            .filter(|value| !value.is_empty())
            .ok_or(BuilderError::MissingField("name"))?;
        let handler = self.handler.ok_or(BuilderError::MissingField("executes"))?;
        Ok(CommandSpec {
            name,
            description: self.description,
            handler,
        })
    }
}
