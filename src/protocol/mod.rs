//! Wire protocol between the privileged shell and the sandboxed UI process.
//!
//! Envelopes are exchanged as newline-delimited JSON (JSONL), each tagged by
//! a `type` field:
//!
//! - `request` (UI → shell): named channel plus payload, correlated by `id`
//! - `response` (shell → UI): exactly one per request, success or failure,
//!   matched to its caller by `id` and in no other way; responses may arrive
//!   out of order when handlers finish out of order
//! - `push` (shell → UI): one-way notification, no reply, at-most-once
//!
//! # Module Structure
//!
//! - `message`: the [`Envelope`] enum, wire error shape, constructors
//! - `io`: JSONL parsing with graceful handling of malformed input,
//!   serialization, log-safe previews

mod io;
mod message;

pub use io::*;
pub use message::*;
