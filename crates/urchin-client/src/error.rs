use std::time::Duration;

use urchin_core::atlas::OntologyError;
use urchin_core::colormap::ColormapError;
use urchin_core::config::ConfigError;
use urchin_core::wire::WireError;
use urchin_core::SanitizeError;

use crate::chunk::receive::TransferError;
use crate::session::Category;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Sanitize(#[from] SanitizeError),
    #[error("{category} {id} does not exist in the renderer, call create first")]
    StaleObject { category: Category, id: String },
    #[error("not connected to the relay")]
    NotConnected,
    #[error("connection failed: {0}")]
    Connect(String),
    #[error(transparent)]
    Wire(#[from] WireError),
    #[error("image size {width}x{height} is outside 1..={max} pixels per side")]
    ImageSize { width: u32, height: u32, max: u32 },
    #[error("a screenshot from {0} is already pending")]
    RequestInFlight(String),
    #[error("timed out after {waited:?} waiting for {what}")]
    Timeout { waited: Duration, what: String },
    #[error("request for {0} was cancelled")]
    Cancelled(String),
    #[error(transparent)]
    Transfer(#[from] TransferError),
    #[error(transparent)]
    Ontology(#[from] OntologyError),
    #[error(transparent)]
    Colormap(#[from] ColormapError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("atlas {0} is already loaded")]
    AtlasAlreadyLoaded(String),
    #[error("atlas {0} is not loaded, call load first")]
    AtlasNotLoaded(String),
    #[error("unknown area {acronym} in atlas {atlas}")]
    UnknownArea { atlas: String, acronym: String },
    #[error("volume data has {actual} values, shape needs {expected}")]
    VolumeShape { expected: usize, actual: usize },
    #[error("image data has {actual} bytes, expected a multiple of {pixels} pixels")]
    TextureShape { pixels: usize, actual: usize },
    #[error("failed to decode image: {0}")]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
