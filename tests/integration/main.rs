//! Urchin integration test harness.
//!
//! Most tests drive a real `Client` over a `RecordingTransport` that keeps
//! every emitted event, then inspect what would have gone to the relay.
//! `sessions` also runs a loopback Socket.IO relay on 127.0.0.1.
//!
//!   cargo test --test integration
//!
//! Set RUST_LOG=urchin_client=debug to see emissions.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::Value;
use urchin_client::{Client, ClientError, Transport};
use urchin_core::{InboundEvent, Payload, UrchinConfig};

mod atlas;
mod objects;
mod transfer;

// ── Harness ───────────────────────────────────────────────────────────────────

/// Keeps every event instead of sending it.
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<(String, Payload)>>,
    closed: AtomicBool,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Drain and return everything sent so far.
    pub fn take(&self) -> Vec<(String, Payload)> {
        std::mem::take(&mut *self.sent.lock().unwrap())
    }

    /// Drain and return event names only.
    pub fn take_names(&self) -> Vec<String> {
        self.take().into_iter().map(|(name, _)| name).collect()
    }

    /// Drain, expecting exactly one JSON event.
    pub fn take_one(&self) -> (String, Value) {
        let mut sent = self.take();
        assert_eq!(sent.len(), 1, "expected one event, got {sent:?}");
        match sent.remove(0) {
            (name, Payload::Json(v)) => (name, v),
            (name, Payload::Binary(b)) => panic!("{name} carried {} binary bytes", b.len()),
        }
    }
}

impl Transport for RecordingTransport {
    fn send(&self, event: &str, payload: Payload) -> Result<(), ClientError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(ClientError::NotConnected);
        }
        self.sent.lock().unwrap().push((event.to_string(), payload));
        Ok(())
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    fn is_open(&self) -> bool {
        !self.closed.load(Ordering::SeqCst)
    }
}

pub fn test_config() -> UrchinConfig {
    let mut config = UrchinConfig::default();
    config.session.id = "itest".into();
    config.viewer.standalone = true;
    config
}

/// A client connected over a fresh recorder. The identify event has
/// already been drained.
pub fn connected_client(config: UrchinConfig) -> (Client, Arc<RecordingTransport>) {
    init_tracing();
    let client = Client::new(config);
    let transport = RecordingTransport::new();
    client
        .connect_with(transport.clone())
        .expect("recording transport accepts the identify event");
    transport.take();
    (client, transport)
}

pub fn inbound(name: &str, data: Value) -> InboundEvent {
    InboundEvent {
        name: name.into(),
        data,
        attachments: vec![],
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
