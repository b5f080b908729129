//! The JSONL serve loop and the push side of the bridge.

use std::rc::Rc;

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::error::CommandError;
use crate::protocol::{
    log_preview, parse_envelope_graceful, serialize_envelope, Envelope, ParseOutcome,
};

use super::router::CommandRouter;

/// Everything headed for the UI process goes through one queue so responses
/// and pushes never interleave mid-line.
pub(crate) enum Outbound {
    Deliver(Envelope),
    Shutdown,
}

/// Handle for one-way notifications to the UI process.
///
/// Sending is best-effort by contract: a closed or absent peer drops the
/// push silently, and the sender never observes a failure.
#[derive(Clone)]
pub struct PushSender {
    tx: mpsc::UnboundedSender<Outbound>,
}

impl PushSender {
    pub fn push(&self, channel: &str, payload: Value) {
        let envelope = Envelope::push(channel, payload);
        if self.tx.send(Outbound::Deliver(envelope)).is_err() {
            debug!(channel, "Push dropped, bridge connection is closed");
        }
    }

    #[cfg(test)]
    pub(crate) fn test_pair() -> (Self, mpsc::UnboundedReceiver<Outbound>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (PushSender { tx }, rx)
    }
}

/// One bridge connection to the UI process.
///
/// Create it first so [`PushSender`] handles can be woven into handlers and
/// the menu layer, then hand the router and the transport to
/// [`BridgeConnection::serve`].
pub struct BridgeConnection {
    tx: mpsc::UnboundedSender<Outbound>,
    rx: mpsc::UnboundedReceiver<Outbound>,
}

impl Default for BridgeConnection {
    fn default() -> Self {
        Self::new()
    }
}

impl BridgeConnection {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        BridgeConnection { tx, rx }
    }

    pub fn pusher(&self) -> PushSender {
        PushSender {
            tx: self.tx.clone(),
        }
    }

    /// Run the bridge until the UI side closes its end.
    ///
    /// Every request becomes its own local task, so a slow handler on one
    /// channel never blocks dispatch on another and responses go out in
    /// completion order, matched to callers by correlation id. Must run
    /// inside a `LocalSet` on a current-thread runtime; that is what keeps
    /// command execution cooperative rather than parallel.
    pub async fn serve<R, W>(
        self,
        router: CommandRouter,
        reader: R,
        writer: W,
    ) -> std::io::Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin + 'static,
    {
        let BridgeConnection { tx, mut rx } = self;
        let router = Rc::new(router);

        let writer_task = tokio::task::spawn_local(async move {
            let mut writer = writer;
            while let Some(outbound) = rx.recv().await {
                match outbound {
                    Outbound::Deliver(envelope) => {
                        let line = match serialize_envelope(&envelope) {
                            Ok(line) => line,
                            Err(e) => {
                                warn!(error = %e, "Failed to serialize outbound envelope");
                                continue;
                            }
                        };
                        if writer.write_all(line.as_bytes()).await.is_err()
                            || writer.write_all(b"\n").await.is_err()
                        {
                            debug!("UI side of the bridge is gone, stopping writer");
                            break;
                        }
                        let _ = writer.flush().await;
                    }
                    Outbound::Shutdown => break,
                }
            }
        });

        let mut lines = BufReader::new(reader).lines();
        let mut inflight: JoinSet<()> = JoinSet::new();

        while let Some(line) = lines.next_line().await? {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let (preview, raw_len) = log_preview(trimmed);
            match parse_envelope_graceful(trimmed) {
                ParseOutcome::Ok(Envelope::Request {
                    id,
                    channel,
                    payload,
                }) => {
                    debug!(%id, %channel, "Dispatching request");
                    let fut = router.dispatch(&channel, payload);
                    let tx = tx.clone();
                    inflight.spawn_local(async move {
                        let response = match fut.await {
                            Ok(value) => Envelope::ok(id, value),
                            Err(err) => {
                                debug!(%id, code = err.code(), error = %err, "Request failed");
                                Envelope::err(id, &err)
                            }
                        };
                        let _ = tx.send(Outbound::Deliver(response));
                    });
                }
                ParseOutcome::Ok(Envelope::Response { .. }) => {
                    warn!(
                        raw_preview = %preview,
                        "Ignoring response envelope from the UI process"
                    );
                }
                ParseOutcome::Ok(Envelope::Push { channel, .. }) => {
                    warn!(%channel, "Ignoring push envelope from the UI process");
                }
                ParseOutcome::MissingType { .. } => {
                    warn!(
                        raw_preview = %preview,
                        raw_len,
                        "Skipping wire line with no 'type' field"
                    );
                }
                ParseOutcome::UnknownType { envelope_type, .. } => {
                    warn!(
                        %envelope_type,
                        raw_preview = %preview,
                        raw_len,
                        "Skipping unknown envelope type"
                    );
                }
                ParseOutcome::InvalidPayload {
                    envelope_type,
                    id,
                    channel,
                    error,
                    ..
                } => {
                    warn!(
                        %envelope_type,
                        error = %error,
                        raw_preview = %preview,
                        raw_len,
                        "Skipping envelope with invalid payload"
                    );
                    // A request with a recoverable id still gets an answer;
                    // silence would strand the caller's pending promise.
                    if envelope_type == "request" {
                        if let Some(id) = id {
                            let err = CommandError::InvalidPayload {
                                channel: channel.unwrap_or_else(|| "unknown".to_string()),
                                message: error,
                            };
                            let _ = tx.send(Outbound::Deliver(Envelope::err(id, &err)));
                        }
                    }
                }
                ParseOutcome::ParseError(e) => {
                    warn!(
                        error = %e,
                        raw_preview = %preview,
                        raw_len,
                        "Skipping malformed wire line"
                    );
                }
            }
        }

        // EOF from the UI: let in-flight handlers resolve, flush their
        // responses, then stop the writer. Pushes sent after this point are
        // dropped, which is the documented best-effort contract.
        while inflight.join_next().await.is_some() {}
        let _ = tx.send(Outbound::Shutdown);
        drop(tx);
        let _ = writer_task.await;
        Ok(())
    }
}
