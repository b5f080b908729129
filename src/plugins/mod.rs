//! Plugin registry and per-kind action dispatch tables.
//!
//! A plugin is a named set of action handlers keyed by [`ActionKind`],
//! resolved once at registration time. The executor looks handlers up per
//! action and fails fast with a typed error when a plugin does not cover an
//! action's kind; it never guesses or skips silently.
//!
//! Plugin lookup itself is an injected capability: the shell owns a
//! [`PluginRegistry`] and hands it to the executor, so hosts decide which
//! plugins exist without the executor knowing how they were found.

mod actions;
mod executor;

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tracing::warn;

use crate::error::PluginError;

pub use actions::{run_action, ActionContext, ActionKind, ActionOutcome, PluginAction};
pub use executor::{apply_plugin_actions, ApplyPluginRequest};

#[cfg(test)]
#[path = "executor_tests.rs"]
mod executor_tests;

/// Future returned by an action handler.
pub type ActionFuture = Pin<Box<dyn Future<Output = Result<ActionOutcome, String>> + Send>>;

/// One registered handler. Receives owned copies of the context and action
/// so the returned future borrows nothing.
pub type ActionHandler = Box<dyn Fn(ActionContext, PluginAction) -> ActionFuture + Send + Sync>;

/// A named plugin with its dispatch table.
pub struct Plugin {
    name: String,
    handlers: HashMap<ActionKind, ActionHandler>,
}

impl Plugin {
    pub fn builder(name: &str) -> PluginBuilder {
        PluginBuilder {
            name: name.to_string(),
            handlers: HashMap::new(),
        }
    }

    /// A plugin wired to the built-in interpreter for every action kind.
    pub fn with_default_handlers(name: &str) -> Self {
        Plugin::builder(name)
            .default_handler(ActionKind::Add)
            .default_handler(ActionKind::Modify)
            .default_handler(ActionKind::Append)
            .default_handler(ActionKind::RunCommand)
            .build()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handler_for(&self, kind: ActionKind) -> Option<&ActionHandler> {
        self.handlers.get(&kind)
    }

    /// Kinds this plugin covers, sorted for stable error messages.
    pub fn supported_kinds(&self) -> Vec<ActionKind> {
        let mut kinds: Vec<ActionKind> = self.handlers.keys().copied().collect();
        kinds.sort();
        kinds
    }
}

impl std::fmt::Debug for Plugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Plugin")
            .field("name", &self.name)
            .field("kinds", &self.supported_kinds())
            .finish()
    }
}

pub struct PluginBuilder {
    name: String,
    handlers: HashMap<ActionKind, ActionHandler>,
}

impl PluginBuilder {
    /// Bind a handler for one action kind. Later bindings replace earlier
    /// ones for the same kind.
    pub fn handler<F, Fut>(mut self, kind: ActionKind, handler: F) -> Self
    where
        F: Fn(ActionContext, PluginAction) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ActionOutcome, String>> + Send + 'static,
    {
        self.handlers.insert(
            kind,
            Box::new(move |ctx, action| -> ActionFuture { Box::pin(handler(ctx, action)) }),
        );
        self
    }

    /// Bind the built-in interpreter for one action kind.
    pub fn default_handler(self, kind: ActionKind) -> Self {
        self.handler(kind, |ctx, action| async move {
            actions::run_action(&ctx, &action).await
        })
    }

    pub fn build(self) -> Plugin {
        Plugin {
            name: self.name,
            handlers: self.handlers,
        }
    }
}

/// All plugins known to this shell instance.
#[derive(Debug, Default)]
pub struct PluginRegistry {
    plugins: HashMap<String, Arc<Plugin>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plugin. A plugin re-registered under the same name
    /// replaces the previous one.
    pub fn register(&mut self, plugin: Plugin) {
        let name = plugin.name().to_string();
        if self.plugins.insert(name.clone(), Arc::new(plugin)).is_some() {
            warn!(plugin = %name, "Replacing previously registered plugin");
        }
    }

    pub fn resolve(&self, name: &str) -> Result<Arc<Plugin>, PluginError> {
        self.plugins
            .get(name)
            .cloned()
            .ok_or_else(|| PluginError::UnknownPlugin(name.to_string()))
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.plugins.keys().map(String::as_str).collect();
        names.sort();
        names
    }
}
