//! Inbound reassembly keyed by transfer name.

use bytes::{Bytes, BytesMut};
use dashmap::DashMap;
use tokio::time::Instant;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransferError {
    #[error("{name}: received {received} bytes, declared {declared}")]
    Overflow {
        name: String,
        declared: usize,
        received: usize,
    },
    #[error("data for {0} arrived before its metadata")]
    UnknownTransfer(String),
}

pub type OnComplete = Box<dyn Fn(&str, Bytes) + Send + Sync>;

struct Assembly {
    declared: usize,
    buf: BytesMut,
    started: Instant,
}

/// Accumulates chunks per name and fires `on_complete` once when the
/// declared length is reached.
pub struct Reassembler {
    active: DashMap<String, Assembly>,
    on_complete: OnComplete,
}

impl Reassembler {
    pub fn new(on_complete: impl Fn(&str, Bytes) + Send + Sync + 'static) -> Self {
        Self {
            active: DashMap::new(),
            on_complete: Box::new(on_complete),
        }
    }

    /// Start (or restart) a transfer. Any earlier assembly for `name` is
    /// discarded.
    pub fn begin(&self, name: &str, declared: usize) {
        if self.active.remove(name).is_some() {
            tracing::warn!(name, "restarting transfer, discarding partial data");
        }
        if declared == 0 {
            (self.on_complete)(name, Bytes::new());
            return;
        }
        self.active.insert(
            name.to_string(),
            Assembly {
                declared,
                buf: BytesMut::with_capacity(declared),
                started: Instant::now(),
            },
        );
    }

    /// Append a chunk. Returns true when this chunk completed the transfer.
    pub fn push(&self, name: &str, data: &[u8]) -> Result<bool, TransferError> {
        let (received, declared) = {
            let mut entry = self
                .active
                .get_mut(name)
                .ok_or_else(|| TransferError::UnknownTransfer(name.to_string()))?;
            entry.buf.extend_from_slice(data);
            (entry.buf.len(), entry.declared)
        };

        if received > declared {
            self.active.remove(name);
            return Err(TransferError::Overflow {
                name: name.to_string(),
                declared,
                received,
            });
        }
        if received < declared {
            return Ok(false);
        }
        if let Some((_, assembly)) = self.active.remove(name) {
            tracing::debug!(
                name,
                bytes = declared,
                elapsed_ms = assembly.started.elapsed().as_millis() as u64,
                "transfer complete"
            );
            (self.on_complete)(name, assembly.buf.freeze());
        }
        Ok(true)
    }

    /// Drop a partial transfer. Returns whether one existed.
    pub fn abandon(&self, name: &str) -> bool {
        let existed = self.active.remove(name).is_some();
        if existed {
            tracing::debug!(name, "transfer abandoned");
        }
        existed
    }

    pub fn in_progress(&self) -> Vec<String> {
        self.active.iter().map(|e| e.key().clone()).collect()
    }
}
