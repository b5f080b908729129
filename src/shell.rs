//! Standard wiring of the privileged shell: channel names, the handlers
//! behind them, and the operations the (out of scope) menu layer calls into.

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::{json, Value};
use tracing::debug;

use crate::bridge::{CommandRouter, PushSender};
use crate::dialogs::{DialogMode, DialogOptions, DialogOutcome, DialogProvider};
use crate::error::{CommandError, ResultExt};
use crate::generators::{run_generator, RunGeneratorRequest};
use crate::plugins::{apply_plugin_actions, ApplyPluginRequest, PluginRegistry};
use crate::probe;
use crate::store::ConfigStore;

/// Request channels served by this shell.
pub mod channels {
    pub const OPEN_DIALOG: &str = "open-dialog";
    pub const IMPORT_CONFIG: &str = "import-config";
    pub const APPLY_PLUGIN_ACTIONS: &str = "apply-plugin-actions";
    pub const COMMAND_EXISTS: &str = "command-exists";
    pub const RUN_PLOP_GENERATOR: &str = "run-plop-generator";
}

/// Push channels emitted by this shell. No replies, best-effort delivery.
pub mod pushes {
    pub const SHORTCUT_TRIGGERED: &str = "shortcut-triggered";
    pub const SET_FOCUSED: &str = "set-focused";
    pub const RELOAD: &str = "reload";
}

/// The privileged half of the bridge: owns the store, the plugin registry,
/// and the dialog capability, and binds the standard channels to them.
#[derive(Clone)]
pub struct Shell {
    store: Arc<Mutex<ConfigStore>>,
    plugins: Arc<PluginRegistry>,
    dialogs: Arc<dyn DialogProvider>,
    pusher: PushSender,
}

impl Shell {
    pub fn new(
        store: Arc<Mutex<ConfigStore>>,
        plugins: Arc<PluginRegistry>,
        dialogs: Arc<dyn DialogProvider>,
        pusher: PushSender,
    ) -> Self {
        Shell {
            store,
            plugins,
            dialogs,
            pusher,
        }
    }

    /// Bind every standard request channel on `router`.
    pub fn register_channels(&self, router: &mut CommandRouter) {
        let dialogs = self.dialogs.clone();
        router.register(channels::OPEN_DIALOG, move |payload| {
            let dialogs = dialogs.clone();
            async move {
                let options = parse_options(channels::OPEN_DIALOG, payload)?;
                let outcome = dialogs.pick(options).await?;
                // Cancellation is a distinct non-error outcome: null.
                Ok(match outcome {
                    DialogOutcome::Chosen(path) => {
                        Value::String(path.to_string_lossy().into_owned())
                    }
                    DialogOutcome::Cancelled => Value::Null,
                })
            }
        });

        let shell = self.clone();
        router.register(channels::IMPORT_CONFIG, move |_payload| {
            let shell = shell.clone();
            async move {
                shell.import_config().await;
                Ok(Value::Null)
            }
        });

        let plugins = self.plugins.clone();
        router.register(channels::APPLY_PLUGIN_ACTIONS, move |payload| {
            let plugins = plugins.clone();
            async move {
                let request: ApplyPluginRequest = serde_json::from_value(payload)
                    .map_err(|e| {
                        CommandError::invalid_payload(channels::APPLY_PLUGIN_ACTIONS, e)
                    })?;
                let outcomes = apply_plugin_actions(&plugins, request).await?;
                serde_json::to_value(outcomes).map_err(CommandError::internal)
            }
        });

        router.register(channels::COMMAND_EXISTS, move |payload| async move {
            let name: String = serde_json::from_value(payload)
                .map_err(|e| CommandError::invalid_payload(channels::COMMAND_EXISTS, e))?;
            let exists = probe::command_exists(&name).await?;
            Ok(json!(exists))
        });

        router.register(channels::RUN_PLOP_GENERATOR, move |payload| async move {
            let request: RunGeneratorRequest = serde_json::from_value(payload)
                .map_err(|e| CommandError::invalid_payload(channels::RUN_PLOP_GENERATOR, e))?;
            let outcomes = run_generator(request).await?;
            serde_json::to_value(outcomes).map_err(CommandError::internal)
        });
    }

    /// Ask the user for a config file and replace the store with it.
    ///
    /// All failures are caught and logged here; the store is left untouched
    /// and the UI is only told to reload after a successful replace. Also
    /// reachable from the application menu.
    pub async fn import_config(&self) {
        let options = DialogOptions {
            mode: DialogMode::OpenFile,
            ..DialogOptions::default()
        };
        match self.dialogs.pick(options).await.log_err() {
            Some(DialogOutcome::Chosen(path)) => {
                if self.store.lock().import(&path).log_err().is_some() {
                    self.pusher.push(pushes::RELOAD, Value::Null);
                }
            }
            Some(DialogOutcome::Cancelled) => debug!("Config import cancelled"),
            None => {}
        }
    }

    /// Ask the user for a directory and export the store into it.
    ///
    /// Fire-and-forget from the caller's perspective; failures are logged
    /// and never propagated. Menu-only, no request channel.
    pub async fn export_config(&self) {
        match self.dialogs.pick(DialogOptions::default()).await.log_err() {
            Some(DialogOutcome::Chosen(dir)) => {
                self.store.lock().export(&dir).log_err();
            }
            Some(DialogOutcome::Cancelled) => debug!("Config export cancelled"),
            None => {}
        }
    }

    /// Clear the store and tell the UI to reload, as one operation.
    pub fn reset_cache(&self) {
        if self.store.lock().clear().log_err().is_some() {
            self.pusher.push(pushes::RELOAD, Value::Null);
        }
    }

    /// Relay a menu shortcut to the UI process.
    pub fn relay_shortcut(&self, descriptor: Value) {
        self.pusher.push(pushes::SHORTCUT_TRIGGERED, descriptor);
    }

    /// Tell the UI process whether its window holds focus.
    pub fn set_focused(&self, focused: bool) {
        self.pusher.push(pushes::SET_FOCUSED, json!(focused));
    }

    /// On-disk location of the settings document, for the edit-in-editor
    /// menu entry.
    pub fn config_path(&self) -> std::path::PathBuf {
        self.store.lock().path().to_path_buf()
    }
}

fn parse_options(channel: &str, payload: Value) -> Result<DialogOptions, CommandError> {
    if payload.is_null() {
        return Ok(DialogOptions::default());
    }
    serde_json::from_value(payload).map_err(|e| CommandError::invalid_payload(channel, e))
}

#[cfg(test)]
#[path = "shell_tests.rs"]
mod shell_tests;
