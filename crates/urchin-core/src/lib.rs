//! urchin-core — wire format, event schema, sanitizers, and configuration.
//! The runtime client in `urchin-client` builds on this crate.

pub mod atlas;
pub mod color;
pub mod colormap;
pub mod config;
pub mod event;
pub mod sanitize;
pub mod wire;

pub use color::{sanitize_color, Color, ColorInput, Rgba};
pub use config::UrchinConfig;
pub use event::{ClearTarget, IdMap, NeuronShape, RendererEvent};
pub use sanitize::{OneOrMany, SanitizeError, Side, Vector3};
pub use wire::{Frame, InboundEvent, Payload};
