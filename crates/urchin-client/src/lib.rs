//! urchin-client — drives a remote Urchin renderer over the Socket.IO relay.
//!
//! A [`Client`] owns one session and connection. Object proxies (meshes,
//! particles, probes, ...) are created through its managers and emit
//! renderer events as their attributes change.

pub mod atlas;
pub mod camera;
pub mod chunk;
pub mod client;
pub mod connection;
pub mod custom;
pub mod dispatch;
pub mod error;
pub mod lines;
pub mod meshes;
pub mod neurons;
pub mod object;
pub mod particles;
pub mod probes;
pub mod scene;
pub mod session;
pub mod setup;
pub mod text;
pub mod texture;
pub mod transport;
pub mod volumes;

pub use atlas::{Area, AreaSet, Atlas};
pub use camera::{Camera, Screenshot, MAIN_CAMERA};
pub use client::Client;
pub use connection::ConnectionState;
pub use error::ClientError;
pub use object::{BatchReport, RemoteObject};
pub use session::Category;
pub use setup::{setup, setup_from_env};
pub use transport::Transport;
