//! Session bootstrap: connect, then point a viewer at the session.

use urchin_core::config::ViewerLaunch;
use urchin_core::UrchinConfig;

use crate::client::Client;
use crate::error::ClientError;

impl Client {
    /// Web viewer URL for this session.
    pub fn viewer_url(&self) -> String {
        format!("{}{}", self.config().viewer.url, self.session_id())
    }

    /// Connect and open the viewer. Calling this on a connected client
    /// only logs a notice.
    pub async fn setup(&self) -> Result<(), ClientError> {
        if self.connected() {
            tracing::info!(session = %self.session_id(), "client is already connected");
            return Ok(());
        }
        self.connect().await?;

        let viewer = &self.config().viewer;
        if viewer.standalone {
            tracing::info!(session = %self.session_id(), "standalone renderer, not opening a viewer");
            return Ok(());
        }
        let url = self.viewer_url();
        match viewer.launch {
            ViewerLaunch::Browser => match open::that(&url) {
                Ok(()) => tracing::info!(%url, "viewer opened"),
                Err(e) => tracing::warn!(%url, error = %e, "could not open a browser, open the viewer manually"),
            },
            ViewerLaunch::Log => tracing::info!(%url, "viewer ready"),
        }
        Ok(())
    }
}

/// Build a client from `config` and run [`Client::setup`].
pub async fn setup(config: UrchinConfig) -> Result<Client, ClientError> {
    let client = Client::new(config);
    client.setup().await?;
    Ok(client)
}

/// [`setup`] with configuration resolved from the environment and the
/// config file.
pub async fn setup_from_env() -> Result<Client, ClientError> {
    setup(UrchinConfig::load()?).await
}
