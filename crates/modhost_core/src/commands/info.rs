//! Built-in `/modhost` information command.

use super::{handler, CommandDispatcher, CommandError};
use crate::builders::{CommandBuilder, DefaultCommandBuilder};

pub const INFO_COMMAND: &str = "modhost";

/// Adds the info command to `dispatcher`.
pub fn register(dispatcher: &mut CommandDispatcher) -> Result<(), CommandError> {
    let spec = Box::new(DefaultCommandBuilder::new())
        .name(INFO_COMMAND)
        .description("Show modhost version information.")
        .executes(handler(|ctx| {
            ctx.reply(format!("modhost core v{}", crate::core_version()));
            ctx.reply(format!(
                "running on {} ({} build)",
                std::env::consts::OS,
                crate::build_mode()
            ));
            Ok(1)
        }))
        .build()
        .map_err(|err| CommandError::Failed {
            command: INFO_COMMAND.to_string(),
            message: err.to_string(),
        })?;
    dispatcher.register(spec)
}

#[cfg(test)]
mod tests {
    use super::{register, INFO_COMMAND};
    use crate::commands::CommandDispatcher;

    #[test]
    fn reports_core_version() {
        let mut dispatcher = CommandDispatcher::new();
        register(&mut dispatcher).expect("register info");

        let outcome = dispatcher.execute(INFO_COMMAND, "console").expect("run info");
        assert_eq!(outcome.status, 1);
        assert!(outcome.feedback[0].contains(crate::core_version()));
        assert_eq!(outcome.feedback.len(), 2);
    }
}
