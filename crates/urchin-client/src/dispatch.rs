//! Routes inbound relay events to handlers by event name.

use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;
use urchin_core::event::{LOG, LOG_ERROR, LOG_WARNING};
use urchin_core::InboundEvent;

use crate::error::ClientError;

pub type Handler = Arc<dyn Fn(&InboundEvent) -> Result<(), ClientError> + Send + Sync>;

/// Maps event names to handlers. Registering a name twice replaces the
/// earlier handler.
#[derive(Default)]
pub struct EventDispatcher {
    handlers: DashMap<String, Handler>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&self, name: &str, handler: F)
    where
        F: Fn(&InboundEvent) -> Result<(), ClientError> + Send + Sync + 'static,
    {
        self.handlers.insert(name.to_string(), Arc::new(handler));
    }

    pub fn unregister(&self, name: &str) -> bool {
        self.handlers.remove(name).is_some()
    }

    /// Dispatch one event. Returns false if nothing handles this name.
    pub fn dispatch(&self, event: &InboundEvent) -> bool {
        // Clone out so a handler may (un)register without deadlocking.
        let handler = self.handlers.get(&event.name).map(|h| h.value().clone());
        match handler {
            Some(handler) => {
                if let Err(e) = handler(event) {
                    tracing::warn!(event = %event.name, error = %e, "inbound handler failed");
                }
                true
            }
            None => {
                tracing::debug!(event = %event.name, "no handler for inbound event");
                false
            }
        }
    }

    /// Forward renderer log lines to tracing. Info and warnings only when
    /// `verbose`; errors always.
    pub fn register_renderer_logs(&self, verbose: bool) {
        self.register(LOG, move |ev| {
            if verbose {
                tracing::info!("(Renderer) {}", log_text(&ev.data));
            }
            Ok(())
        });
        self.register(LOG_WARNING, move |ev| {
            if verbose {
                tracing::warn!("(Renderer) {}", log_text(&ev.data));
            }
            Ok(())
        });
        self.register(LOG_ERROR, |ev| {
            tracing::error!("(Renderer) {}", log_text(&ev.data));
            Ok(())
        });
    }
}

fn log_text(data: &Value) -> String {
    match data {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
