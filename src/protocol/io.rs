//! JSONL parsing and serialization for bridge envelopes.
//!
//! A misbehaving UI process must never be able to kill the serve loop with a
//! bad line, so parsing is graceful: every line is classified rather than
//! failed, and the caller decides what to log, skip, or answer.

use super::message::Envelope;

/// Maximum length of raw JSON echoed into logs. Keeps oversized payloads
/// (file contents, templates) out of the log file.
const MAX_RAW_LOG_PREVIEW: usize = 200;

/// Truncated preview of a raw line for logging, plus its full length.
pub fn log_preview(raw: &str) -> (&str, usize) {
    let len = raw.len();
    if len > MAX_RAW_LOG_PREVIEW {
        (&raw[..MAX_RAW_LOG_PREVIEW], len)
    } else {
        (raw, len)
    }
}

/// Classified result of parsing one wire line.
#[derive(Debug)]
pub enum ParseOutcome {
    /// A well-formed envelope.
    Ok(Envelope),
    /// Valid JSON with no `type` field.
    MissingType { raw: String },
    /// Valid JSON with a `type` value this protocol does not know.
    UnknownType { envelope_type: String, raw: String },
    /// Known `type` but the rest of the object does not fit the variant.
    /// `id` and `channel` are recovered when present so requests can still
    /// be answered with an error instead of silence.
    InvalidPayload {
        envelope_type: String,
        id: Option<String>,
        channel: Option<String>,
        error: String,
        raw: String,
    },
    /// Not JSON at all.
    ParseError(serde_json::Error),
}

/// Parse one JSONL line into a classified outcome.
///
/// Parses to `serde_json::Value` first and converts from there, so a line is
/// only ever parsed once regardless of how it is classified.
pub fn parse_envelope_graceful(line: &str) -> ParseOutcome {
    let (preview, _len) = log_preview(line);

    let value: serde_json::Value = match serde_json::from_str(line) {
        Ok(v) => v,
        Err(e) => return ParseOutcome::ParseError(e),
    };

    let envelope_type: String = match value.get("type").and_then(|t| t.as_str()) {
        Some(t) => t.to_string(),
        None => {
            return ParseOutcome::MissingType {
                raw: preview.to_string(),
            }
        }
    };

    let id = value
        .get("id")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string());
    let channel = value
        .get("channel")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string());

    match serde_json::from_value::<Envelope>(value) {
        Ok(envelope) => ParseOutcome::Ok(envelope),
        Err(e) => {
            let error = e.to_string();
            // serde reports unrecognized tag values as "unknown variant".
            if error.contains("unknown variant") {
                ParseOutcome::UnknownType {
                    envelope_type,
                    raw: preview.to_string(),
                }
            } else {
                ParseOutcome::InvalidPayload {
                    envelope_type,
                    id,
                    channel,
                    error,
                    raw: preview.to_string(),
                }
            }
        }
    }
}

/// Serialize an envelope to one JSONL line (no trailing newline).
pub fn serialize_envelope(envelope: &Envelope) -> Result<String, serde_json::Error> {
    serde_json::to_string(envelope)
}
