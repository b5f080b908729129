//! Error taxonomy for the command bridge and its privileged executors.
//!
//! Every failure the UI process can observe flows through [`CommandError`],
//! which carries a stable wire code so the UI can branch on failure class
//! without string matching. Module-local errors (store, plugins, generators,
//! dialogs, probe) convert into it at the handler boundary.

use std::path::PathBuf;

use thiserror::Error;
use tracing::{error, warn};

use crate::plugins::ActionKind;

/// Failure of a routed command, as surfaced to the requesting caller.
#[derive(Error, Debug)]
pub enum CommandError {
    /// Request on a channel with no registered handler. Always surfaced,
    /// never silently resolved.
    #[error("no handler registered for channel '{channel}'")]
    NoSuchChannel { channel: String },

    /// The request payload did not match the channel's expected shape.
    #[error("invalid payload for channel '{channel}': {message}")]
    InvalidPayload { channel: String, message: String },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Plugin(#[from] PluginError),

    #[error(transparent)]
    Generator(#[from] GeneratorError),

    #[error(transparent)]
    Dialog(#[from] DialogError),

    #[error(transparent)]
    Probe(#[from] ProbeError),

    /// Serialization or bookkeeping failure inside the shell itself.
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl CommandError {
    /// Stable wire code for this failure class.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoSuchChannel { .. } => "ROUTING",
            Self::InvalidPayload { .. } => "BAD_PAYLOAD",
            Self::Store(_) => "CONFIG_IO",
            Self::Plugin(PluginError::ProjectPath { .. }) => "PROJECT_PATH",
            Self::Plugin(PluginError::ActionFailed { .. }) => "PLUGIN_ACTION",
            Self::Plugin(_) => "PLUGIN_RESOLUTION",
            Self::Generator(GeneratorError::ProjectPath { .. }) => "PROJECT_PATH",
            Self::Generator(GeneratorError::ActionFailed { .. }) => "GENERATOR_ACTION",
            Self::Generator(_) => "GENERATOR_RESOLUTION",
            Self::Dialog(_) => "DIALOG",
            Self::Probe(_) => "PROBE",
            Self::Internal { .. } => "INTERNAL",
        }
    }

    pub fn invalid_payload(channel: &str, err: impl std::fmt::Display) -> Self {
        Self::InvalidPayload {
            channel: channel.to_string(),
            message: err.to_string(),
        }
    }

    pub fn internal(err: impl std::fmt::Display) -> Self {
        Self::Internal {
            message: err.to_string(),
        }
    }
}

/// Failures of the persisted configuration store.
///
/// Import-side failures (`Read`, `Parse`, `NotAnObject`) leave the prior
/// document untouched; write-side failures never leave a partially written
/// file on disk.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config file {} is not valid JSON: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("config file {} must contain a JSON object at the top level", path.display())]
    NotAnObject { path: PathBuf },

    #[error("failed to write config file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failures while applying a plugin's action batch. All of these abort the
/// batch and surface to the requesting caller.
#[derive(Error, Debug)]
pub enum PluginError {
    #[error("no plugin named '{0}' is registered")]
    UnknownPlugin(String),

    #[error("plugin '{plugin}' has no handler for '{kind}' actions (supports: {supported})")]
    UnsupportedAction {
        plugin: String,
        kind: ActionKind,
        supported: String,
    },

    #[error("project path {} is not an accessible directory", path.display())]
    ProjectPath { path: PathBuf },

    #[error("action {index} ({kind}) failed: {message}")]
    ActionFailed {
        index: usize,
        kind: ActionKind,
        message: String,
    },
}

/// Failures while resolving or running a project generator.
///
/// "Definitions not found" and "definitions invalid" are deliberately distinct
/// variants so the UI can tell a missing generator file from a broken one.
#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("no generator definitions: {} does not exist", path.display())]
    DefinitionsNotFound { path: PathBuf },

    #[error("generator definitions in {} are invalid: {message}", path.display())]
    DefinitionsInvalid { path: PathBuf, message: String },

    #[error("{} defines no generator named '{name}' (available: {available})", path.display())]
    UnknownGenerator {
        path: PathBuf,
        name: String,
        available: String,
    },

    #[error("cannot evaluate {}: no 'node' executable on the search path", path.display())]
    RuntimeUnavailable { path: PathBuf },

    #[error("project path {} is not an accessible directory", path.display())]
    ProjectPath { path: PathBuf },

    #[error("generator action {index} ({kind}) failed: {message}")]
    ActionFailed {
        index: usize,
        kind: ActionKind,
        message: String,
    },
}

/// Mechanism failure while showing a native dialog. Cancellation is not an
/// error; it is a normal [`crate::dialogs::DialogOutcome::Cancelled`].
#[derive(Error, Debug)]
#[error("dialog failed: {0}")]
pub struct DialogError(pub String);

/// Mechanism failure while probing for an external command. "Command not
/// found" is a normal `false` result, never a `ProbeError`.
#[derive(Error, Debug)]
#[error("command probe failed for '{name}': {message}")]
pub struct ProbeError {
    pub name: String,
    pub message: String,
}

/// Extension trait for "caught at the point of use, logged, operation
/// aborted" call sites. Uses `#[track_caller]` so the log carries the real
/// origin instead of this module.
pub trait ResultExt<T> {
    /// Log the error and return `None`. Use for recoverable failures.
    fn log_err(self) -> Option<T>;
    /// Log as a warning and return `None`. Use for expected failures.
    fn warn_on_err(self) -> Option<T>;
}

impl<T, E: std::fmt::Debug> ResultExt<T> for std::result::Result<T, E> {
    #[track_caller]
    fn log_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(err) => {
                let caller = std::panic::Location::caller();
                error!(
                    error = ?err,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation failed"
                );
                None
            }
        }
    }

    #[track_caller]
    fn warn_on_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(err) => {
                let caller = std::panic::Location::caller();
                warn!(
                    error = ?err,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation had warning"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routing_errors_carry_the_channel_name() {
        let err = CommandError::NoSuchChannel {
            channel: "bogus".into(),
        };
        assert_eq!(err.code(), "ROUTING");
        assert!(err.to_string().contains("bogus"));
    }

    #[test]
    fn plugin_resolution_and_action_failures_have_distinct_codes() {
        let resolution = CommandError::from(PluginError::UnknownPlugin("styled".into()));
        let action = CommandError::from(PluginError::ActionFailed {
            index: 1,
            kind: ActionKind::Add,
            message: "boom".into(),
        });
        assert_eq!(resolution.code(), "PLUGIN_RESOLUTION");
        assert_eq!(action.code(), "PLUGIN_ACTION");
    }

    #[test]
    fn generator_not_found_is_distinguishable_from_invalid() {
        let missing = GeneratorError::DefinitionsNotFound {
            path: PathBuf::from("/p/plopfile.js"),
        };
        let invalid = GeneratorError::DefinitionsInvalid {
            path: PathBuf::from("/p/plopfile.js"),
            message: "unexpected token".into(),
        };
        assert!(missing.to_string().contains("does not exist"));
        assert!(invalid.to_string().contains("invalid"));
    }

    #[test]
    fn log_err_swallows_the_error() {
        let failed: Result<(), &str> = Err("nope");
        assert_eq!(failed.log_err(), None);
        let ok: Result<u8, &str> = Ok(7);
        assert_eq!(ok.log_err(), Some(7));
    }
}
