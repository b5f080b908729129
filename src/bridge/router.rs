//! Channel-to-handler routing table.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

use serde_json::Value;
use tracing::warn;

use crate::error::CommandError;

/// Future produced by one dispatched handler. Not `Send`: handlers run as
/// local tasks on the bridge thread.
pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<Value, CommandError>>>>;

type Handler = Rc<dyn Fn(Value) -> HandlerFuture>;

/// Registry of command handlers, one per named channel.
///
/// The router owns no I/O and holds no locks; handlers capture whatever
/// state they need (store handle, plugin registry, dialog provider).
#[derive(Default)]
pub struct CommandRouter {
    handlers: HashMap<String, Handler>,
}

impl CommandRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the handler for a channel. A channel has exactly one active
    /// handler; registering again replaces the previous binding.
    pub fn register<F, Fut>(&mut self, channel: &str, handler: F)
    where
        F: Fn(Value) -> Fut + 'static,
        Fut: Future<Output = Result<Value, CommandError>> + 'static,
    {
        let boxed: Handler =
            Rc::new(move |payload| -> HandlerFuture { Box::pin(handler(payload)) });
        if self.handlers.insert(channel.to_string(), boxed).is_some() {
            warn!(channel, "Replacing previously registered handler");
        }
    }

    /// Invoke the handler bound to `channel`.
    ///
    /// The returned future is detached from the router, so callers can spawn
    /// it while continuing to dispatch other requests. An unregistered
    /// channel yields [`CommandError::NoSuchChannel`], never a hang.
    pub fn dispatch(&self, channel: &str, payload: Value) -> HandlerFuture {
        match self.handlers.get(channel) {
            Some(handler) => handler(payload),
            None => {
                let channel = channel.to_string();
                Box::pin(async move { Err(CommandError::NoSuchChannel { channel }) })
            }
        }
    }

    /// Registered channel names, sorted.
    pub fn channels(&self) -> Vec<&str> {
        let mut channels: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        channels.sort();
        channels
    }
}
