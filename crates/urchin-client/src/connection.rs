//! Connection lifecycle: Disconnected → Connecting → Connected → Disconnected.

use std::sync::Arc;

use parking_lot::Mutex;
use urchin_core::{Payload, RendererEvent};

use crate::error::ClientError;
use crate::transport::Transport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

struct Slot {
    state: ConnectionState,
    transport: Option<Arc<dyn Transport>>,
}

/// Holds the active transport, if any.
pub struct Connection {
    slot: Mutex<Slot>,
}

impl Default for Connection {
    fn default() -> Self {
        Self::new()
    }
}

impl Connection {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(Slot {
                state: ConnectionState::Disconnected,
                transport: None,
            }),
        }
    }

    /// Current state. A transport that closed underneath us reads as
    /// Disconnected.
    pub fn state(&self) -> ConnectionState {
        let mut slot = self.slot.lock();
        if slot.state == ConnectionState::Connected
            && !slot.transport.as_ref().is_some_and(|t| t.is_open())
        {
            slot.state = ConnectionState::Disconnected;
            slot.transport = None;
        }
        slot.state
    }

    /// Claim the right to connect. False if already connecting or connected.
    pub(crate) fn begin(&self) -> bool {
        if self.state() != ConnectionState::Disconnected {
            return false;
        }
        let mut slot = self.slot.lock();
        if slot.state != ConnectionState::Disconnected {
            return false;
        }
        slot.state = ConnectionState::Connecting;
        true
    }

    pub(crate) fn establish(&self, transport: Arc<dyn Transport>) {
        let mut slot = self.slot.lock();
        slot.transport = Some(transport);
        slot.state = ConnectionState::Connected;
    }

    pub(crate) fn fail(&self) {
        let mut slot = self.slot.lock();
        slot.transport = None;
        slot.state = ConnectionState::Disconnected;
    }

    /// Close the transport and drop back to Disconnected.
    pub fn close(&self) {
        let transport = {
            let mut slot = self.slot.lock();
            slot.state = ConnectionState::Disconnected;
            slot.transport.take()
        };
        if let Some(t) = transport {
            t.close();
        }
    }

    pub fn emit(&self, event: RendererEvent) -> Result<(), ClientError> {
        let transport = {
            let slot = self.slot.lock();
            match (&slot.state, &slot.transport) {
                (ConnectionState::Connected, Some(t)) => t.clone(),
                _ => return Err(ClientError::NotConnected),
            }
        };
        let (name, payload) = event.into_wire()?;
        if let Payload::Binary(bytes) = &payload {
            tracing::debug!(event = %name, bytes = bytes.len(), "emit");
        } else {
            tracing::debug!(event = %name, "emit");
        }
        transport.send(&name, payload)
    }
}
