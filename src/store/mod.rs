//! Persisted configuration store.
//!
//! One JSON object backs all application settings. It lives at a stable
//! per-user location, loads lazily on first access, and is written back in
//! full on every mutation, so memory and disk never disagree for longer than
//! a single call. Writes go through a temp file plus rename and a reader can
//! never observe a partially written document.
//!
//! Import and reset replace the whole document; there is no merging. The
//! store is shared last-writer-wins between command handlers (wrapped in a
//! mutex by the shell), with no finer-grained locking on purpose.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::error::StoreError;


/// Environment override for the config directory.
pub const CONFIG_DIR_ENV: &str = "JSUI_CONFIG_DIR";

const CONFIG_FILE: &str = "config.json";

/// The persisted settings document and its on-disk home.
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    /// `None` until first access; loaded lazily.
    document: Option<Map<String, Value>>,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ConfigStore {
            path: path.into(),
            document: None,
        }
    }

    /// Store at the per-user default location, honoring `JSUI_CONFIG_DIR`.
    pub fn at_default_location() -> Self {
        let dir = match std::env::var(CONFIG_DIR_ENV) {
            Ok(dir) if !dir.trim().is_empty() => {
                PathBuf::from(shellexpand::tilde(dir.trim()).as_ref())
            }
            _ => dirs::config_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("jsui"),
        };
        ConfigStore::new(dir.join(CONFIG_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current document, loading from disk on first access.
    ///
    /// A missing file is an empty document. An unreadable or corrupt file is
    /// logged and treated as empty rather than wedging every handler that
    /// touches settings; an explicit [`ConfigStore::import`] stays strict.
    pub fn document(&mut self) -> &Map<String, Value> {
        self.load()
    }

    pub fn get(&mut self, key: &str) -> Option<Value> {
        self.load().get(key).cloned()
    }

    /// Set one key and persist.
    pub fn set(&mut self, key: &str, value: Value) -> Result<(), StoreError> {
        let mut next = self.load().clone();
        next.insert(key.to_string(), value);
        self.persist(&next)?;
        self.document = Some(next);
        Ok(())
    }

    /// Replace the whole document and persist. Disk is written before memory
    /// is updated, so a failed write leaves both sides on the old document.
    pub fn replace(&mut self, document: Map<String, Value>) -> Result<(), StoreError> {
        self.persist(&document)?;
        self.document = Some(document);
        Ok(())
    }

    /// Reset to an empty document.
    pub fn clear(&mut self) -> Result<(), StoreError> {
        info!(path = %self.path.display(), "Clearing config store");
        self.replace(Map::new())
    }

    /// Replace the store with the contents of `file`. All or nothing: any
    /// read or parse failure leaves the prior document untouched.
    pub fn import(&mut self, file: &Path) -> Result<(), StoreError> {
        let raw = std::fs::read_to_string(file).map_err(|source| StoreError::Read {
            path: file.to_path_buf(),
            source,
        })?;
        let parsed: Value =
            serde_json::from_str(&raw).map_err(|source| StoreError::Parse {
                path: file.to_path_buf(),
                source,
            })?;
        let Value::Object(document) = parsed else {
            return Err(StoreError::NotAnObject {
                path: file.to_path_buf(),
            });
        };

        info!(
            from = %file.display(),
            keys = document.len(),
            "Imported config document"
        );
        self.replace(document)
    }

    /// Serialize the current document into `target_dir` under a timestamped
    /// file name, and return the written path.
    pub fn export(&mut self, target_dir: &Path) -> Result<PathBuf, StoreError> {
        let document = self.load().clone();
        let serialized =
            serde_json::to_string(&Value::Object(document)).map_err(|source| {
                StoreError::Parse {
                    path: self.path.clone(),
                    source,
                }
            })?;

        let target = target_dir.join(export_file_name(Local::now()));
        std::fs::write(&target, serialized).map_err(|source| StoreError::Write {
            path: target.clone(),
            source,
        })?;
        info!(to = %target.display(), "Exported config document");
        Ok(target)
    }

    fn load(&mut self) -> &Map<String, Value> {
        if self.document.is_none() {
            self.document = Some(read_document(&self.path));
        }
        self.document.get_or_insert_with(Map::new)
    }

    /// Write the document atomically: temp file in the same directory, then
    /// rename over the destination.
    fn persist(&self, document: &Map<String, Value>) -> Result<(), StoreError> {
        let write_err = |source| StoreError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }

        let serialized = serde_json::to_string_pretty(&Value::Object(document.clone()))
            .map_err(|source| StoreError::Parse {
                path: self.path.clone(),
                source,
            })?;

        let temp = self.path.with_extension("json.tmp");
        std::fs::write(&temp, serialized).map_err(write_err)?;
        std::fs::rename(&temp, &self.path).map_err(write_err)?;
        Ok(())
    }
}

fn read_document(path: &Path) -> Map<String, Value> {
    if !path.is_file() {
        debug!(path = %path.display(), "No config file yet, starting empty");
        return Map::new();
    }

    match std::fs::read_to_string(path) {
        Ok(raw) => match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(document)) => document,
            Ok(_) => {
                warn!(path = %path.display(), "Config file is not an object, starting empty");
                Map::new()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Config file is corrupt, starting empty");
                Map::new()
            }
        },
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Config file unreadable, starting empty");
            Map::new()
        }
    }
}

/// Export file name with an embedded creation timestamp, so repeated exports
/// into the same directory do not collide.
pub fn export_file_name(now: DateTime<Local>) -> String {
    format!("jsui-config ({}).json", now.format("%m-%d-%Y %H:%M"))
}
