//! Cameras and screenshots.
//!
//! A screenshot is one request/response exchange: the client emits
//! `RequestCameraImg`, the renderer answers with `ReceiveCameraImgMeta`
//! (total PNG size) followed by `ReceiveCameraImg` chunks. Chunks are
//! reassembled per camera id and resolve the request's oneshot channel.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::Deserialize;
use tokio::sync::oneshot;
use urchin_core::event::{id_map, parse_inbound, CameraMode, CameraPosition, ImageChunk, ImageMeta, ScreenshotRequest, IMAGE_CHUNK, IMAGE_META};
use urchin_core::sanitize::{sanitize_float, sanitize_vector3};
use urchin_core::{InboundEvent, RendererEvent, Vector3};

use crate::chunk::{Reassembler, TransferError};
use crate::client::Client;
use crate::dispatch::EventDispatcher;
use crate::error::ClientError;
use crate::object::{create_handle, ObjectHandle, RemoteObject};
use crate::session::Category;

/// Id of the camera every renderer starts with.
pub const MAIN_CAMERA: &str = "CameraMain";

// ── Camera ────────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct Camera {
    handle: ObjectHandle,
    target: Vector3,
    position: Option<Vector3>,
    rotation: Vector3,
    target_area: Option<String>,
    zoom: f64,
    pan: [f64; 2],
    mode: CameraMode,
    y_angle: f64,
}

impl RemoteObject for Camera {
    fn handle(&self) -> &ObjectHandle {
        &self.handle
    }
    fn handle_mut(&mut self) -> &mut ObjectHandle {
        &mut self.handle
    }
}

impl Camera {
    fn new(handle: ObjectHandle) -> Self {
        Self {
            handle,
            target: [0.0; 3],
            position: None,
            rotation: [0.0; 3],
            target_area: None,
            zoom: 1.0,
            pan: [0.0, 0.0],
            mode: CameraMode::Orthographic,
            y_angle: 0.0,
        }
    }

    pub fn id(&self) -> &str {
        self.handle.id()
    }

    pub fn target(&self) -> Vector3 {
        self.target
    }

    /// Last position set through [`Camera::set_position`].
    pub fn position(&self) -> Option<Vector3> {
        self.position
    }

    pub fn rotation(&self) -> Vector3 {
        self.rotation
    }

    pub fn target_area(&self) -> Option<&str> {
        self.target_area.as_deref()
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn pan(&self) -> [f64; 2] {
        self.pan
    }

    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    pub fn y_angle(&self) -> f64 {
        self.y_angle
    }

    /// Point the camera at a coordinate (micrometers, sent as given).
    pub fn set_target(&mut self, target: Vector3) -> Result<(), ClientError> {
        self.handle.ensure_live()?;
        let target = sanitize_vector3(&target)?;
        self.target = target;
        self.handle.emit(RendererEvent::SetCameraTarget(id_map(self.handle.id(), target)))
    }

    /// Move the camera (micrometers, sent as given). With `preserve_target`
    /// it keeps aiming at its target; otherwise it keeps its rotation.
    pub fn set_position(&mut self, position: Vector3, preserve_target: bool) -> Result<(), ClientError> {
        self.handle.ensure_live()?;
        let position = sanitize_vector3(&position)?;
        self.position = Some(position);
        self.handle.emit(RendererEvent::SetCameraPosition(id_map(
            self.handle.id(),
            CameraPosition::new(position, preserve_target),
        )))
    }

    /// Pitch, yaw, roll in degrees.
    pub fn set_rotation(&mut self, rotation: Vector3) -> Result<(), ClientError> {
        self.handle.ensure_live()?;
        let rotation = sanitize_vector3(&rotation)?;
        self.rotation = rotation;
        self.handle
            .emit(RendererEvent::SetCameraRotation(id_map(self.handle.id(), rotation)))
    }

    /// Center on an atlas area, e.g. `"VISp"` or `"VISp-lh"`.
    pub fn set_target_area(&mut self, area: &str) -> Result<(), ClientError> {
        self.handle.ensure_live()?;
        self.target_area = Some(area.to_string());
        self.handle
            .emit(RendererEvent::SetCameraTargetArea(id_map(self.handle.id(), area.to_string())))
    }

    pub fn set_zoom(&mut self, zoom: f64) -> Result<(), ClientError> {
        self.handle.ensure_live()?;
        let zoom = sanitize_float(&zoom)?;
        self.zoom = zoom;
        self.handle.emit(RendererEvent::SetCameraZoom(id_map(self.handle.id(), zoom)))
    }

    pub fn set_pan(&mut self, x: f64, y: f64) -> Result<(), ClientError> {
        self.handle.ensure_live()?;
        let pan = [sanitize_float(&x)?, sanitize_float(&y)?];
        self.pan = pan;
        self.handle.emit(RendererEvent::SetCameraPan(id_map(self.handle.id(), pan)))
    }

    pub fn set_mode(&mut self, mode: CameraMode) -> Result<(), ClientError> {
        self.handle.ensure_live()?;
        self.mode = mode;
        self.handle.emit(RendererEvent::SetCameraMode(id_map(self.handle.id(), mode)))
    }

    /// Spin around the vertical axis, in degrees.
    pub fn set_y_angle(&mut self, angle: f64) -> Result<(), ClientError> {
        self.handle.ensure_live()?;
        let angle = sanitize_float(&angle)?;
        self.y_angle = angle;
        self.handle.emit(RendererEvent::SetCameraYAngle(id_map(self.handle.id(), angle)))
    }

    /// Hand mouse and keyboard control to this camera.
    pub fn set_control(&self) -> Result<(), ClientError> {
        self.handle
            .emit(RendererEvent::SetCameraControl(self.handle.id().to_string()))
    }

    pub fn delete(&mut self) -> Result<(), ClientError> {
        let ids = vec![self.handle.id().to_string()];
        self.handle.delete_with(RendererEvent::DeleteCamera(ids))
    }

    /// Render `[width, height]` pixels from this camera and wait for the PNG.
    ///
    /// Only one request per camera may be outstanding. On timeout the
    /// request and any partial image are dropped.
    pub async fn screenshot(&self, size: [u32; 2]) -> Result<Screenshot, ClientError> {
        self.handle.ensure_live()?;
        let client = self.handle.client().clone();
        let transfer = &client.config().transfer;
        let [width, height] = size;
        let max = transfer.max_image_dimension;
        if width == 0 || height == 0 || width > max || height > max {
            return Err(ClientError::ImageSize { width, height, max });
        }
        let waited = Duration::from_secs(transfer.screenshot_timeout_secs);

        let id = self.id().to_string();
        let images = client.images();
        let rx = images.request(&id)?;
        let request = RendererEvent::RequestCameraImg(ScreenshotRequest {
            name: id.clone(),
            size,
        });
        if let Err(e) = self.handle.emit(request) {
            images.cancel(&id);
            return Err(e);
        }
        tracing::debug!(camera = %id, width, height, "screenshot requested");

        match tokio::time::timeout(waited, rx).await {
            Ok(Ok(png)) => {
                tracing::info!(camera = %id, bytes = png.len(), "screenshot received");
                Ok(Screenshot { camera: id, png })
            }
            Ok(Err(_)) => Err(ClientError::Cancelled(id)),
            Err(_) => {
                images.cancel(&id);
                Err(ClientError::Timeout {
                    waited,
                    what: format!("screenshot from {id}"),
                })
            }
        }
    }
}

pub struct Cameras {
    client: Client,
}

impl Cameras {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn create(&self) -> Result<Camera, ClientError> {
        let handle = create_handle(&self.client, Category::Camera, RendererEvent::CreateCamera)?;
        Ok(Camera::new(handle))
    }

    /// The renderer's built-in camera. Nothing is emitted.
    pub fn main(&self) -> Camera {
        let mut handle = ObjectHandle::new(self.client.clone(), Category::Camera, MAIN_CAMERA.to_string());
        handle.mark_live();
        Camera::new(handle)
    }
}

// ── Screenshot ────────────────────────────────────────────────────────────────

/// A PNG rendered by the renderer.
#[derive(Debug, Clone)]
pub struct Screenshot {
    pub camera: String,
    pub png: Bytes,
}

impl Screenshot {
    pub fn decode(&self) -> Result<image::RgbaImage, ClientError> {
        let img = image::load_from_memory_with_format(&self.png, image::ImageFormat::Png)?;
        Ok(img.to_rgba8())
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ClientError> {
        std::fs::write(path.as_ref(), &self.png)?;
        tracing::info!(camera = %self.camera, path = %path.as_ref().display(), "screenshot saved");
        Ok(())
    }
}

// ── Inbound image requests ────────────────────────────────────────────────────

#[derive(Deserialize)]
struct ChunkName {
    name: String,
}

/// Outstanding screenshot requests keyed by camera id.
pub(crate) struct ImageRequests {
    pending: Arc<DashMap<String, oneshot::Sender<Bytes>>>,
    assembler: Reassembler,
}

impl ImageRequests {
    pub fn new() -> Self {
        let pending: Arc<DashMap<String, oneshot::Sender<Bytes>>> = Arc::new(DashMap::new());
        let waiting = pending.clone();
        let assembler = Reassembler::new(move |name, png| match waiting.remove(name) {
            Some((_, tx)) => {
                if tx.send(png).is_err() {
                    tracing::debug!(camera = name, "screenshot requester went away");
                }
            }
            None => {
                tracing::warn!(camera = name, bytes = png.len(), "screenshot with no pending request");
            }
        });
        Self { pending, assembler }
    }

    /// Install the `ReceiveCameraImgMeta` / `ReceiveCameraImg` handlers.
    pub fn register(self: &Arc<Self>, dispatcher: &EventDispatcher) {
        let this = self.clone();
        dispatcher.register(IMAGE_META, move |ev| this.on_meta(ev));
        let this = self.clone();
        dispatcher.register(IMAGE_CHUNK, move |ev| this.on_chunk(ev));
    }

    /// Claim the slot for `camera`. A slot whose requester has gone away
    /// is reclaimed.
    pub fn request(&self, camera: &str) -> Result<oneshot::Receiver<Bytes>, ClientError> {
        let (tx, rx) = oneshot::channel();
        match self.pending.entry(camera.to_string()) {
            Entry::Occupied(mut slot) => {
                if !slot.get().is_closed() {
                    return Err(ClientError::RequestInFlight(camera.to_string()));
                }
                slot.insert(tx);
            }
            Entry::Vacant(slot) => {
                slot.insert(tx);
            }
        }
        self.assembler.abandon(camera);
        Ok(rx)
    }

    pub fn cancel(&self, camera: &str) {
        self.pending.remove(camera);
        self.assembler.abandon(camera);
    }

    pub fn is_pending(&self, camera: &str) -> bool {
        self.pending.contains_key(camera)
    }

    fn on_meta(&self, ev: &InboundEvent) -> Result<(), ClientError> {
        let meta: ImageMeta = parse_inbound(&ev.data)?;
        if !self.pending.contains_key(&meta.name) {
            tracing::warn!(camera = %meta.name, "image metadata for a camera with no pending request");
        }
        self.assembler.begin(&meta.name, meta.total_bytes);
        Ok(())
    }

    fn on_chunk(&self, ev: &InboundEvent) -> Result<(), ClientError> {
        let (name, data) = match ev.attachments.first() {
            Some(bytes) => (parse_inbound::<ChunkName>(&ev.data)?.name, bytes.clone()),
            None => {
                let chunk: ImageChunk = parse_inbound(&ev.data)?;
                (chunk.name, Bytes::from(chunk.data))
            }
        };
        match self.assembler.push(&name, &data) {
            Ok(_) => Ok(()),
            Err(e @ TransferError::Overflow { .. }) => {
                // Dropping the sender fails the waiting request.
                self.pending.remove(&name);
                Err(e.into())
            }
            Err(e) => Err(e.into()),
        }
    }
}
