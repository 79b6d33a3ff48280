//! Socket.IO v5 over Engine.IO v4, WebSocket transport only.
//!
//! Text frame layout:
//!
//! ```text
//! <engine type>[<socket type>[<attachments>-][<namespace>,][<ack id>][json]]
//! ```
//!
//! Engine types: 0 open, 1 close, 2 ping, 3 pong, 4 message, 6 noop.
//! Socket types (inside an engine message): 0 connect, 1 disconnect,
//! 2 event, 3 ack, 4 connect error, 5 binary event, 6 binary ack.
//!
//! A binary event carries placeholders in its JSON and is followed by one
//! binary WebSocket frame per attachment.

use bytes::Bytes;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, thiserror::Error)]
pub enum WireError {
    #[error("empty frame")]
    Empty,
    #[error("unknown engine packet type {0:?}")]
    UnknownEnginePacket(char),
    #[error("unknown socket packet type {0:?}")]
    UnknownSocketPacket(char),
    #[error("malformed packet: {0}")]
    Malformed(String),
    #[error("binary frame without a pending binary event")]
    UnexpectedBinary,
    #[error("event payload must serialize to a JSON object, got {0}")]
    NotAnEvent(String),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

/// One WebSocket frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Text(String),
    Binary(Bytes),
}

/// Event payload as handed to the transport.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Sent as the single event argument; `Null` sends no argument.
    Json(Value),
    /// Sent as a single binary attachment.
    Binary(Bytes),
}

/// Engine.IO handshake parameters from the open packet.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenInfo {
    pub sid: String,
    #[serde(default)]
    pub upgrades: Vec<String>,
    pub ping_interval: u64,
    pub ping_timeout: u64,
    #[serde(default)]
    pub max_payload: Option<u64>,
}

/// An event received from the relay.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundEvent {
    pub name: String,
    /// First event argument, `Null` when absent.
    pub data: Value,
    pub attachments: Vec<Bytes>,
}

/// Everything the decoder can yield.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    Open(OpenInfo),
    Close,
    Ping,
    Pong,
    Connected { sid: Option<String> },
    Disconnected,
    ConnectError(String),
    Event(InboundEvent),
}

// ── Encoding ──────────────────────────────────────────────────────────────────

pub fn encode_connect() -> Frame {
    Frame::Text("40".into())
}

pub fn encode_disconnect() -> Frame {
    Frame::Text("41".into())
}

pub fn encode_pong() -> Frame {
    Frame::Text("3".into())
}

/// Frames for one event. Binary payloads yield two frames.
pub fn encode_event(name: &str, payload: &Payload) -> Result<Vec<Frame>, WireError> {
    match payload {
        Payload::Json(Value::Null) => {
            let args = serde_json::to_string(&json!([name]))?;
            Ok(vec![Frame::Text(format!("42{args}"))])
        }
        Payload::Json(data) => {
            let args = serde_json::to_string(&json!([name, data]))?;
            Ok(vec![Frame::Text(format!("42{args}"))])
        }
        Payload::Binary(bytes) => {
            let args = serde_json::to_string(&json!([name, {"_placeholder": true, "num": 0}]))?;
            Ok(vec![
                Frame::Text(format!("451-{args}")),
                Frame::Binary(bytes.clone()),
            ])
        }
    }
}

// ── Decoding ──────────────────────────────────────────────────────────────────

struct PendingBinary {
    name: String,
    data: Value,
    expected: usize,
    attachments: Vec<Bytes>,
}

/// Most attachments one binary event may declare. The relay sends one.
pub const MAX_ATTACHMENTS: usize = 16;

/// Stateful decoder; holds a binary event until its attachments arrive.
#[derive(Default)]
pub struct Decoder {
    pending: Option<PendingBinary>,
}

impl Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode one text frame. `None` for packets with nothing to act on
    /// (noop, acks, or a binary event still waiting for attachments).
    pub fn decode_text(&mut self, text: &str) -> Result<Option<Inbound>, WireError> {
        let mut chars = text.chars();
        let engine = chars.next().ok_or(WireError::Empty)?;
        let rest = chars.as_str();
        match engine {
            '0' => Ok(Some(Inbound::Open(serde_json::from_str(rest)?))),
            '1' => Ok(Some(Inbound::Close)),
            '2' => Ok(Some(Inbound::Ping)),
            '3' => Ok(Some(Inbound::Pong)),
            '4' => self.decode_socket(rest),
            '6' => Ok(None),
            other => Err(WireError::UnknownEnginePacket(other)),
        }
    }

    /// Feed one binary frame to the pending binary event.
    pub fn decode_binary(&mut self, data: Bytes) -> Result<Option<Inbound>, WireError> {
        let pending = self.pending.as_mut().ok_or(WireError::UnexpectedBinary)?;
        pending.attachments.push(data);
        if pending.attachments.len() < pending.expected {
            return Ok(None);
        }
        let done = self.pending.take().ok_or(WireError::UnexpectedBinary)?;
        Ok(Some(Inbound::Event(InboundEvent {
            name: done.name,
            data: done.data,
            attachments: done.attachments,
        })))
    }

    fn decode_socket(&mut self, packet: &str) -> Result<Option<Inbound>, WireError> {
        let mut chars = packet.chars();
        let kind = chars.next().ok_or(WireError::Empty)?;
        let mut rest = chars.as_str();

        let mut attachments = 0usize;
        if kind == '5' || kind == '6' {
            let dash = rest
                .find('-')
                .ok_or_else(|| WireError::Malformed(packet.to_string()))?;
            attachments = rest[..dash]
                .parse()
                .map_err(|_| WireError::Malformed(packet.to_string()))?;
            if attachments > MAX_ATTACHMENTS {
                return Err(WireError::Malformed(format!(
                    "{attachments} attachments declared, at most {MAX_ATTACHMENTS} allowed"
                )));
            }
            rest = &rest[dash + 1..];
        }
        if rest.starts_with('/') {
            // Non-default namespace; we only ever join "/".
            rest = match rest.find(',') {
                Some(i) => &rest[i + 1..],
                None => "",
            };
        }
        let body = rest.trim_start_matches(|c: char| c.is_ascii_digit());

        match kind {
            '0' => {
                let sid = if body.is_empty() {
                    None
                } else {
                    let v: Value = serde_json::from_str(body)?;
                    v.get("sid").and_then(Value::as_str).map(str::to_string)
                };
                Ok(Some(Inbound::Connected { sid }))
            }
            '1' => Ok(Some(Inbound::Disconnected)),
            '2' | '5' => {
                let (name, data) = split_event(body)?;
                if attachments == 0 {
                    return Ok(Some(Inbound::Event(InboundEvent {
                        name,
                        data,
                        attachments: Vec::new(),
                    })));
                }
                self.pending = Some(PendingBinary {
                    name,
                    data,
                    expected: attachments,
                    attachments: Vec::new(),
                });
                Ok(None)
            }
            '3' | '6' => Ok(None),
            '4' => {
                let message = serde_json::from_str::<Value>(body)
                    .ok()
                    .and_then(|v| match v {
                        Value::String(s) => Some(s),
                        v => v.get("message").and_then(Value::as_str).map(str::to_string),
                    })
                    .unwrap_or_else(|| body.to_string());
                Ok(Some(Inbound::ConnectError(message)))
            }
            other => Err(WireError::UnknownSocketPacket(other)),
        }
    }
}

fn split_event(body: &str) -> Result<(String, Value), WireError> {
    let args: Vec<Value> = serde_json::from_str(body)?;
    let mut args = args.into_iter();
    let name = match args.next() {
        Some(Value::String(s)) => s,
        _ => return Err(WireError::Malformed(body.to_string())),
    };
    Ok((name, args.next().unwrap_or(Value::Null)))
}
