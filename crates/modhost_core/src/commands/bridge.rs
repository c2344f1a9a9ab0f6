//! Forwarding of extension command registrations to the host.

use super::{CommandDispatcher, CommandError};
use log::{error, info};
use parking_lot::Mutex;
use std::sync::Arc;

/// Callback that adds commands to the host dispatcher.
pub type RegistrationCallback =
    Box<dyn FnOnce(&mut CommandDispatcher) -> Result<(), CommandError> + Send>;

/// Host-side command registration entry point.
pub trait CommandRegistrar: Send + Sync {
    /// `dedicated_only` limits the callback to dedicated-server hosts.
    fn register(
        &self,
        dedicated_only: bool,
        callback: RegistrationCallback,
    ) -> Result<(), CommandError>;
}

/// Registry-side adapter; every command it forwards is available in all
/// server modes.
pub struct CommandBridge {
    registrar: Arc<dyn CommandRegistrar>,
}

impl CommandBridge {
    pub fn new(registrar: Arc<dyn CommandRegistrar>) -> Self {
        Self { registrar }
    }

    pub fn register_command<F>(&self, callback: F) -> Result<(), CommandError>
    where
        F: FnOnce(&mut CommandDispatcher) -> Result<(), CommandError> + Send + 'static,
    {
        self.registrar.register(false, Box::new(callback))
    }
}

struct PendingRegistration {
    dedicated_only: bool,
    callback: RegistrationCallback,
}

#[derive(Default)]
struct PendingState {
    queue: Vec<PendingRegistration>,
    closed: bool,
}

/// Queues registrations until the host installs them into its dispatcher.
#[derive(Default)]
pub struct PendingCommands {
    state: Mutex<PendingState>,
}

impl PendingCommands {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending_len(&self) -> usize {
        self.state.lock().queue.len()
    }

    /// Applies every queued callback to `dispatcher` and closes registration.
    ///
    /// Dedicated-only callbacks are skipped unless `dedicated` is set.
    /// A failing callback does not stop the ones queued after it; the first
    /// failure is returned once all have run. Returns how many callbacks
    /// succeeded.
    pub fn install(
        &self,
        dispatcher: &mut CommandDispatcher,
        dedicated: bool,
    ) -> Result<usize, CommandError> {
        let queue = {
            let mut state = self.state.lock();
            state.closed = true;
            std::mem::take(&mut state.queue)
        };

        let mut applied = 0;
        let mut first_error = None;
        for pending in queue {
            if pending.dedicated_only && !dedicated {
                continue;
            }
            match (pending.callback)(dispatcher) {
                Ok(()) => applied += 1,
                Err(err) => {
                    error!(
                        "event=commands_install module=commands status=error error={}",
                        err
                    );
                    if first_error.is_none() {
                        first_error = Some(err);
                    }
                }
            }
        }

        if let Some(err) = first_error {
            return Err(err);
        }
        info!(
            "event=commands_install module=commands status=ok applied={} commands={} dedicated={}",
            applied,
            dispatcher.len(),
            dedicated
        );
        Ok(applied)
    }
}

impl CommandRegistrar for PendingCommands {
    fn register(
        &self,
        dedicated_only: bool,
        callback: RegistrationCallback,
    ) -> Result<(), CommandError> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(CommandError::RegistrationClosed);
        }
        state.queue.push(PendingRegistration {
            dedicated_only,
            callback,
        });
        Ok(())
    }
}
