//! Host command plumbing: the dispatcher and the registration bridge.
//!
//! # Responsibility
//! - Hold literal commands registered by the host and its extensions.
//! - Forward extension registration callbacks to the host registrar.
//!
//! # Invariants
//! - Command names are unique, lowercase literals.
//! - Resolution is by exact name; argument parsing belongs to handlers.

mod bridge;
pub mod info;

pub use bridge::{CommandBridge, CommandRegistrar, PendingCommands, RegistrationCallback};

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Handler invoked when a command runs. Returns a status code.
pub type CommandHandler = Arc<dyn Fn(&mut CommandContext) -> Result<i32, CommandError> + Send + Sync>;

/// Wraps a closure as a [`CommandHandler`].
pub fn handler<F>(f: F) -> CommandHandler
where
    F: Fn(&mut CommandContext) -> Result<i32, CommandError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// A command ready to be added to a dispatcher.
#[derive(Clone)]
pub struct CommandSpec {
    pub name: String,
    pub description: String,
    pub handler: CommandHandler,
}

impl std::fmt::Debug for CommandSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandSpec")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Execution context handed to a handler.
#[derive(Debug)]
pub struct CommandContext {
    source: String,
    feedback: Vec<String>,
}

impl CommandContext {
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Sends one feedback line back to the command source.
    pub fn reply(&mut self, message: impl Into<String>) {
        self.feedback.push(message.into());
    }
}

/// Result of one command execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    pub status: i32,
    pub feedback: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    InvalidName(String),
    DuplicateCommand(String),
    UnknownCommand(String),
    RegistrationClosed,
    Failed { command: String, message: String },
}

impl Display for CommandError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName(value) => write!(f, "command name is invalid: {value}"),
            Self::DuplicateCommand(value) => write!(f, "command already registered: {value}"),
            Self::UnknownCommand(value) => write!(f, "unknown command: {value}"),
            Self::RegistrationClosed => {
                write!(f, "command registration is closed; commands were already installed")
            }
            Self::Failed { command, message } => write!(f, "command `{command}` failed: {message}"),
        }
    }
}

impl Error for CommandError {}

/// Literal-name command table.
#[derive(Default)]
pub struct CommandDispatcher {
    commands: BTreeMap<String, CommandSpec>,
}

impl CommandDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `spec`; fails on an invalid or already-taken name.
    pub fn register(&mut self, spec: CommandSpec) -> Result<(), CommandError> {
        if !is_valid_command_name(&spec.name) {
            return Err(CommandError::InvalidName(spec.name));
        }
        if self.commands.contains_key(&spec.name) {
            return Err(CommandError::DuplicateCommand(spec.name));
        }
        self.commands.insert(spec.name.clone(), spec);
        Ok(())
    }

    pub fn literal<F>(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        f: F,
    ) -> Result<(), CommandError>
    where
        F: Fn(&mut CommandContext) -> Result<i32, CommandError> + Send + Sync + 'static,
    {
        self.register(CommandSpec {
            name: name.into(),
            description: description.into(),
            handler: handler(f),
        })
    }

    /// Runs the command named exactly `name` on behalf of `source`.
    pub fn execute(&self, name: &str, source: &str) -> Result<CommandOutcome, CommandError> {
        let spec = self
            .commands
            .get(name)
            .ok_or_else(|| CommandError::UnknownCommand(name.to_string()))?;
        let mut context = CommandContext {
            source: source.to_string(),
            feedback: Vec::new(),
        };
        let status = (spec.handler)(&mut context)?;
        Ok(CommandOutcome {
            status,
            feedback: context.feedback,
        })
    }

    pub fn description(&self, name: &str) -> Option<&str> {
        self.commands.get(name).map(|spec| spec.description.as_str())
    }

    /// Sorted command names.
    pub fn names(&self) -> Vec<&str> {
        self.commands.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

fn is_valid_command_name(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
}
