//! The command bridge between the privileged shell and the UI process.
//!
//! Two halves:
//!
//! - [`CommandRouter`]: the registry mapping named channels to async
//!   handlers. Exactly one handler per channel; dispatching an unregistered
//!   channel fails deterministically instead of hanging.
//! - [`BridgeConnection`]: the serve loop that pairs wire requests with
//!   responses by correlation id and carries one-way pushes back to the UI.
//!
//! Scheduling is single-threaded and cooperative: each request runs as a
//! local task on the same thread, interleaving with other requests only at
//! await points. There is no cancellation and no timeout; a hung handler
//! parks its own caller's pending response and nothing else.

mod connection;
mod router;

pub use connection::{BridgeConnection, PushSender};
pub use router::{CommandRouter, HandlerFuture};

#[cfg(test)]
pub(crate) use connection::Outbound;
