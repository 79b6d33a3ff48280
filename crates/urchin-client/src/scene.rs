//! Scene-wide controls: clearing, lighting, save and load.

use urchin_core::sanitize::sanitize_vector3;
use urchin_core::{ClearTarget, RendererEvent, Vector3};

use crate::camera::Camera;
use crate::client::Client;
use crate::error::ClientError;

pub struct Scene {
    client: Client,
}

impl Scene {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    /// Remove every object of `target` from the renderer. Local proxies are
    /// not touched.
    pub fn clear(&self, target: ClearTarget) -> Result<(), ClientError> {
        self.client.emit(RendererEvent::Clear(target))
    }

    /// Reattach the light to the main camera.
    pub fn reset_light_link(&self) -> Result<(), ClientError> {
        self.client.emit(RendererEvent::ResetLightLink)
    }

    /// Make the light follow `camera`.
    pub fn set_light_link(&self, camera: &Camera) -> Result<(), ClientError> {
        self.client
            .emit(RendererEvent::SetLightLink(camera.id().to_string()))
    }

    /// Fixed light rotation in degrees. Unlinks the light from any camera.
    pub fn set_light_rotation(&self, angles: Vector3) -> Result<(), ClientError> {
        let angles = sanitize_vector3(&angles)?;
        self.client.emit(RendererEvent::SetLightRotation(angles))
    }

    /// Ask the renderer to save the current scene.
    pub fn save(&self) -> Result<(), ClientError> {
        self.client.emit(RendererEvent::SaveScene)
    }

    /// Load a scene previously saved to `url`.
    pub fn load(&self, url: &str) -> Result<(), ClientError> {
        self.client.emit(RendererEvent::LoadScene(url.to_string()))
    }
}
