//! Native file and folder choosers behind an injectable provider.
//!
//! Handlers depend on [`DialogProvider`] rather than a toolkit type, so the
//! shell can run headless (tests, embedding) with a scripted provider while
//! production uses the desktop portal. Cancellation is a first-class outcome,
//! not an error: a user closing the chooser is routine.

use std::collections::VecDeque;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use parking_lot::Mutex;
use serde::Deserialize;

use crate::error::DialogError;

/// What the chooser should pick. Defaults to a directory, which is what
/// every project-selection flow wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DialogMode {
    #[default]
    OpenDirectory,
    OpenFile,
}

/// Caller-supplied chooser configuration. Every field is optional; an empty
/// payload means "choose a directory".
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogOptions {
    #[serde(default)]
    pub mode: DialogMode,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub start_path: Option<String>,
}

/// Result of one chooser invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogOutcome {
    Chosen(PathBuf),
    Cancelled,
}

impl DialogOutcome {
    pub fn chosen(&self) -> Option<&PathBuf> {
        match self {
            DialogOutcome::Chosen(path) => Some(path),
            DialogOutcome::Cancelled => None,
        }
    }
}

/// Future returned by one chooser invocation. Not `Send`: dialogs resolve on
/// the bridge thread like every other handler suspension.
pub type DialogFuture = Pin<Box<dyn Future<Output = Result<DialogOutcome, DialogError>>>>;

/// The capability handlers use to ask the user for a path.
pub trait DialogProvider: Send + Sync {
    fn pick(&self, options: DialogOptions) -> DialogFuture;
}

/// Desktop implementation over the XDG portal.
#[derive(Debug, Default)]
pub struct NativeDialogs;

impl DialogProvider for NativeDialogs {
    fn pick(&self, options: DialogOptions) -> DialogFuture {
        Box::pin(async move {
            let mut dialog = rfd::AsyncFileDialog::new();
            if let Some(title) = &options.title {
                dialog = dialog.set_title(title);
            }
            if let Some(start) = &options.start_path {
                dialog = dialog.set_directory(shellexpand::tilde(start).as_ref());
            }

            let handle = match options.mode {
                DialogMode::OpenDirectory => dialog.pick_folder().await,
                DialogMode::OpenFile => dialog.pick_file().await,
            };

            Ok(match handle {
                Some(file) => DialogOutcome::Chosen(file.path().to_path_buf()),
                None => DialogOutcome::Cancelled,
            })
        })
    }
}

/// Scripted provider: answers picks from a queue, then cancels. Used by
/// tests and headless embeddings.
#[derive(Debug, Default)]
pub struct ScriptedDialogs {
    outcomes: Mutex<VecDeque<DialogOutcome>>,
}

impl ScriptedDialogs {
    pub fn new(outcomes: impl IntoIterator<Item = DialogOutcome>) -> Self {
        ScriptedDialogs {
            outcomes: Mutex::new(outcomes.into_iter().collect()),
        }
    }

    pub fn always_cancel() -> Self {
        ScriptedDialogs::default()
    }
}

impl DialogProvider for ScriptedDialogs {
    fn pick(&self, _options: DialogOptions) -> DialogFuture {
        let outcome = self
            .outcomes
            .lock()
            .pop_front()
            .unwrap_or(DialogOutcome::Cancelled);
        Box::pin(async move { Ok(outcome) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_default_to_directory_mode() {
        let options: DialogOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options.mode, DialogMode::OpenDirectory);

        let options: DialogOptions =
            serde_json::from_str(r#"{"mode":"openFile","title":"Pick a config"}"#).unwrap();
        assert_eq!(options.mode, DialogMode::OpenFile);
        assert_eq!(options.title.as_deref(), Some("Pick a config"));
    }

    #[tokio::test]
    async fn scripted_dialogs_drain_then_cancel() {
        let dialogs = ScriptedDialogs::new([DialogOutcome::Chosen(PathBuf::from("/tmp/p"))]);

        let first = dialogs.pick(DialogOptions::default()).await.unwrap();
        assert_eq!(first.chosen(), Some(&PathBuf::from("/tmp/p")));

        let second = dialogs.pick(DialogOptions::default()).await.unwrap();
        assert_eq!(second, DialogOutcome::Cancelled);
    }
}
