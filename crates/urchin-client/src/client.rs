//! The client handle shared by every proxy.

use std::sync::Arc;
use std::time::Duration;

use urchin_core::{RendererEvent, UrchinConfig};

use crate::atlas::Atlas;
use crate::camera::{Cameras, ImageRequests};
use crate::connection::{Connection, ConnectionState};
use crate::custom::CustomMeshes;
use crate::dispatch::EventDispatcher;
use crate::error::ClientError;
use crate::lines::Lines;
use crate::meshes::Meshes;
use crate::neurons::Neurons;
use crate::particles::Particles;
use crate::probes::Probes;
use crate::scene::Scene;
use crate::session::{Category, Session};
use crate::text::Texts;
use crate::texture::Textures;
use crate::transport::{SocketIoTransport, Transport};
use crate::volumes::Volumes;

/// Cheap to clone; all clones share one session and connection.
#[derive(Clone)]
pub struct Client {
    inner: Arc<Inner>,
}

struct Inner {
    config: UrchinConfig,
    session: Session,
    connection: Connection,
    dispatcher: Arc<EventDispatcher>,
    images: Arc<ImageRequests>,
}

impl Client {
    pub fn new(config: UrchinConfig) -> Self {
        let dispatcher = Arc::new(EventDispatcher::new());
        dispatcher.register_renderer_logs(config.logging.verbose);
        let images = Arc::new(ImageRequests::new());
        images.register(&dispatcher);

        Self {
            inner: Arc::new(Inner {
                session: Session::new(&config.session.id),
                config,
                connection: Connection::new(),
                dispatcher,
                images,
            }),
        }
    }

    pub fn config(&self) -> &UrchinConfig {
        &self.inner.config
    }

    pub fn session_id(&self) -> &str {
        &self.inner.session.id
    }

    pub fn dispatcher(&self) -> &Arc<EventDispatcher> {
        &self.inner.dispatcher
    }

    pub fn state(&self) -> ConnectionState {
        self.inner.connection.state()
    }

    pub fn connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Connect to the configured relay. No-op if already connected.
    pub async fn connect(&self) -> Result<(), ClientError> {
        if !self.inner.connection.begin() {
            tracing::info!(session = %self.session_id(), "client is already connected");
            return Ok(());
        }
        let conn = &self.inner.config.connection;
        let endpoint = conn.endpoint().to_string();
        let timeout = Duration::from_secs(conn.handshake_timeout_secs);
        match SocketIoTransport::connect(&endpoint, self.inner.dispatcher.clone(), timeout).await {
            Ok(transport) => self.finish_connect(Arc::new(transport)),
            Err(e) => {
                self.inner.connection.fail();
                tracing::warn!(%endpoint, error = %e, "could not connect to relay");
                Err(e)
            }
        }
    }

    /// Connect over a caller-supplied transport. No-op if already connected.
    pub fn connect_with(&self, transport: Arc<dyn Transport>) -> Result<(), ClientError> {
        if !self.inner.connection.begin() {
            tracing::info!(session = %self.session_id(), "client is already connected");
            return Ok(());
        }
        self.finish_connect(transport)
    }

    fn finish_connect(&self, transport: Arc<dyn Transport>) -> Result<(), ClientError> {
        self.inner.connection.establish(transport);
        let id = self.session_id().to_string();
        if let Err(e) = self.emit(RendererEvent::Identify(vec![id.clone(), "send".into()])) {
            self.inner.connection.close();
            return Err(e);
        }
        tracing::info!(session = %id, "registered with relay");
        Ok(())
    }

    pub fn disconnect(&self) {
        self.inner.connection.close();
        tracing::info!(session = %self.session_id(), "disconnected");
    }

    pub fn emit(&self, event: RendererEvent) -> Result<(), ClientError> {
        self.inner.connection.emit(event)
    }

    pub(crate) fn next_id(&self, category: Category) -> String {
        self.inner.session.ids.next(category)
    }

    pub(crate) fn images(&self) -> &Arc<ImageRequests> {
        &self.inner.images
    }

    // ── Proxy managers ──────────────────────────────────────────────────────

    pub fn meshes(&self) -> Meshes {
        Meshes::new(self.clone())
    }

    pub fn neurons(&self) -> Neurons {
        Neurons::new(self.clone())
    }

    pub fn particles(&self) -> Particles {
        Particles::new(self.clone())
    }

    pub fn probes(&self) -> Probes {
        Probes::new(self.clone())
    }

    pub fn lines(&self) -> Lines {
        Lines::new(self.clone())
    }

    pub fn texts(&self) -> Texts {
        Texts::new(self.clone())
    }

    pub fn cameras(&self) -> Cameras {
        Cameras::new(self.clone())
    }

    pub fn textures(&self) -> Textures {
        Textures::new(self.clone())
    }

    pub fn volumes(&self) -> Volumes {
        Volumes::new(self.clone())
    }

    pub fn custom_meshes(&self) -> CustomMeshes {
        CustomMeshes::new(self.clone())
    }

    pub fn scene(&self) -> Scene {
        Scene::new(self.clone())
    }

    /// Parse the named atlas from `atlas.data_dir`. Call [`Atlas::load`]
    /// before setting area attributes.
    pub fn atlas(&self, name: &str) -> Result<Atlas, ClientError> {
        Atlas::open(self.clone(), name)
    }
}
