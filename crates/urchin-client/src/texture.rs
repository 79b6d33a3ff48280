//! Image planes ("FOVs" in the renderer) placed by their four corners.
//!
//! Pixel uploads go out as a meta-init event, then one meta/data pair per
//! chunk. Only the last meta marks the texture ready to apply.

use bytes::Bytes;
use urchin_core::event::id_map;
use urchin_core::sanitize::{sanitize_float, sanitize_vector3};
use urchin_core::{OneOrMany, RendererEvent, Vector3};

use crate::chunk::split;
use crate::client::Client;
use crate::error::ClientError;
use crate::object::{apply_batch, create_handle, create_handles, delete_batch, BatchReport, ObjectHandle, RemoteObject};
use crate::session::Category;

pub type Corners = [Vector3; 4];

fn sanitize_corners(corners: &Corners) -> Result<Corners, ClientError> {
    Ok([
        sanitize_vector3(&corners[0])?,
        sanitize_vector3(&corners[1])?,
        sanitize_vector3(&corners[2])?,
        sanitize_vector3(&corners[3])?,
    ])
}

#[derive(Debug)]
pub struct Texture {
    handle: ObjectHandle,
    corners: Option<Corners>,
    offset: f64,
    visible: bool,
    size: Option<(u32, u32)>,
}

impl RemoteObject for Texture {
    fn handle(&self) -> &ObjectHandle {
        &self.handle
    }
    fn handle_mut(&mut self) -> &mut ObjectHandle {
        &mut self.handle
    }
}

impl Texture {
    fn new(handle: ObjectHandle) -> Self {
        Self {
            handle,
            corners: None,
            offset: 0.0,
            visible: true,
            size: None,
        }
    }

    pub fn id(&self) -> &str {
        self.handle.id()
    }

    pub fn corners(&self) -> Option<&Corners> {
        self.corners.as_ref()
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    /// `(width, height)` of the last uploaded image.
    pub fn image_size(&self) -> Option<(u32, u32)> {
        self.size
    }

    /// Corner positions relative to the atlas origin, in millimeters.
    pub fn set_position(&mut self, corners: Corners) -> Result<(), ClientError> {
        self.handle.ensure_live()?;
        let corners = sanitize_corners(&corners)?;
        self.corners = Some(corners);
        self.handle.emit(RendererEvent::SetFovPos(id_map(self.handle.id(), corners)))
    }

    /// Vertical offset in millimeters.
    pub fn set_offset(&mut self, offset: f64) -> Result<(), ClientError> {
        self.handle.ensure_live()?;
        let offset = sanitize_float(&offset)?;
        self.offset = offset;
        self.handle.emit(RendererEvent::SetFovOffset(id_map(self.handle.id(), offset)))
    }

    pub fn set_visibility(&mut self, visible: bool) -> Result<(), ClientError> {
        self.handle.ensure_live()?;
        self.visible = visible;
        self.handle
            .emit(RendererEvent::SetFovVisibility(id_map(self.handle.id(), visible)))
    }

    /// Upload row-major pixel data. `data.len()` must be a non-zero
    /// multiple of `width * height` (one or more bytes per pixel).
    pub fn set_image(&mut self, width: u32, height: u32, data: impl Into<Bytes>) -> Result<usize, ClientError> {
        self.handle.ensure_live()?;
        let data = data.into();
        let transfer = &self.handle.client().config().transfer;
        let max = transfer.max_image_dimension;
        if width == 0 || height == 0 || width > max || height > max {
            return Err(ClientError::ImageSize { width, height, max });
        }
        let pixels = width as usize * height as usize;
        if data.is_empty() || data.len() % pixels != 0 {
            return Err(ClientError::TextureShape {
                pixels,
                actual: data.len(),
            });
        }

        let chunks = split(data, transfer.chunk_bytes);
        let id = self.handle.id().to_string();
        self.handle.emit(RendererEvent::SetFovTextureDataMetaInit(
            id.clone(),
            chunks.len(),
            height,
            width,
            "array".to_string(),
        ))?;
        for chunk in &chunks {
            self.handle
                .emit(RendererEvent::SetFovTextureDataMeta(id.clone(), chunk.index, chunk.is_final))?;
            self.handle
                .emit(RendererEvent::SetFovTextureData(chunk.payload.clone()))?;
        }
        self.size = Some((width, height));
        tracing::debug!(%id, width, height, chunks = chunks.len(), "texture uploaded");
        Ok(chunks.len())
    }

    pub fn delete(&mut self) -> Result<(), ClientError> {
        let ids = vec![self.handle.id().to_string()];
        self.handle.delete_with(RendererEvent::DeleteFov(ids))
    }
}

pub struct Textures {
    client: Client,
}

impl Textures {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn create(&self) -> Result<Texture, ClientError> {
        let handle = create_handle(&self.client, Category::Texture, RendererEvent::CreateFov)?;
        Ok(Texture::new(handle))
    }

    pub fn create_many(&self, n: usize) -> Result<Vec<Texture>, ClientError> {
        let handles = create_handles(&self.client, Category::Texture, n, RendererEvent::CreateFov)?;
        Ok(handles.into_iter().map(Texture::new).collect())
    }

    pub fn delete_many(&self, textures: &mut [Texture]) -> Result<BatchReport, ClientError> {
        delete_batch(&self.client, textures, RendererEvent::DeleteFov)
    }

    pub fn set_positions(
        &self,
        textures: &mut [Texture],
        corners: OneOrMany<Corners>,
    ) -> Result<BatchReport, ClientError> {
        apply_batch(
            &self.client,
            textures,
            corners,
            |c| sanitize_corners(&c),
            |t, c| t.corners = Some(*c),
            RendererEvent::SetFovPos,
        )
    }

    pub fn set_offsets(
        &self,
        textures: &mut [Texture],
        offsets: OneOrMany<f64>,
    ) -> Result<BatchReport, ClientError> {
        apply_batch(
            &self.client,
            textures,
            offsets,
            |o| Ok(sanitize_float(&o)?),
            |t, o| t.offset = *o,
            RendererEvent::SetFovOffset,
        )
    }

    pub fn set_visibilities(
        &self,
        textures: &mut [Texture],
        visible: OneOrMany<bool>,
    ) -> Result<BatchReport, ClientError> {
        apply_batch(
            &self.client,
            textures,
            visible,
            Ok,
            |t, v| t.visible = *v,
            RendererEvent::SetFovVisibility,
        )
    }
}
