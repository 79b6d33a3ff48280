//! Voxel volumes drawn through a colormap.
//!
//! Voxels are uint8 indexes into a 256-entry colormap (255 is transparent).
//! The volume is zlib-compressed once; `UpdateVolume` announces the
//! compressed size and look, then `SetVolumeData` carries the bytes in
//! chunks of `transfer.chunk_bytes`.

use std::io::Write;

use bytes::Bytes;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use urchin_core::colormap::{compress_volume, COLORMAP_SLOTS};
use urchin_core::event::{parse_inbound, VolumeChunk, VolumeClick, VolumeMeta, VOLUME_CLICK};
use urchin_core::{ClearTarget, Color, RendererEvent};

use crate::chunk::split;
use crate::client::Client;
use crate::error::ClientError;
use crate::object::{ObjectHandle, RemoteObject};
use crate::session::Category;

/// Entries in the default all-black colormap.
const DEFAULT_COLORMAP_LEN: usize = 255;

fn default_colormap() -> Vec<Color> {
    vec![Color::black(); DEFAULT_COLORMAP_LEN]
}

fn zlib(data: &[u8]) -> Result<Vec<u8>, ClientError> {
    let mut enc = ZlibEncoder::new(Vec::with_capacity(data.len() / 4), Compression::default());
    enc.write_all(data)?;
    Ok(enc.finish()?)
}

#[derive(Debug)]
pub struct Volume {
    handle: ObjectHandle,
    shape: [usize; 3],
    n_compressed_bytes: usize,
    visible: bool,
    colormap: Vec<Color>,
}

impl RemoteObject for Volume {
    fn handle(&self) -> &ObjectHandle {
        &self.handle
    }
    fn handle_mut(&mut self) -> &mut ObjectHandle {
        &mut self.handle
    }
}

impl Volume {
    pub fn id(&self) -> &str {
        self.handle.id()
    }

    pub fn shape(&self) -> [usize; 3] {
        self.shape
    }

    pub fn n_compressed_bytes(&self) -> usize {
        self.n_compressed_bytes
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn colormap(&self) -> &[Color] {
        &self.colormap
    }

    fn meta(&self) -> RendererEvent {
        RendererEvent::UpdateVolume(VolumeMeta {
            name: self.handle.id().to_string(),
            n_compressed_bytes: self.n_compressed_bytes,
            visible: self.visible,
            colormap: self.colormap.clone(),
        })
    }

    pub fn set_visible(&mut self, visible: bool) -> Result<(), ClientError> {
        self.handle.ensure_live()?;
        self.visible = visible;
        self.handle.emit(self.meta())
    }

    pub fn set_colormap(&mut self, colormap: Vec<Color>) -> Result<(), ClientError> {
        self.handle.ensure_live()?;
        self.colormap = colormap;
        self.handle.emit(self.meta())
    }

    pub fn delete(&mut self) -> Result<(), ClientError> {
        let id = self.handle.id().to_string();
        self.handle.delete_with(RendererEvent::DeleteVolume(id))
    }
}

pub struct Volumes {
    client: Client,
}

impl Volumes {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    /// Send a uint8 volume. `data` is flattened in row-major order and
    /// must hold exactly `shape[0] * shape[1] * shape[2]` voxels.
    pub fn create(
        &self,
        data: &[u8],
        shape: [usize; 3],
        colormap: Option<Vec<Color>>,
    ) -> Result<Volume, ClientError> {
        // An overflowing shape saturates, which no slice can match.
        let expected = shape
            .iter()
            .try_fold(1usize, |acc, &d| acc.checked_mul(d))
            .unwrap_or(usize::MAX);
        if data.len() != expected {
            return Err(ClientError::VolumeShape {
                expected,
                actual: data.len(),
            });
        }
        let compressed = Bytes::from(zlib(data)?);

        let id = self.client.next_id(Category::Volume);
        let mut volume = Volume {
            handle: ObjectHandle::new(self.client.clone(), Category::Volume, id.clone()),
            shape,
            n_compressed_bytes: compressed.len(),
            visible: true,
            colormap: colormap.unwrap_or_else(default_colormap),
        };
        self.client.emit(volume.meta())?;
        volume.handle.mark_live();

        let chunks = split(compressed, self.client.config().transfer.chunk_bytes);
        for chunk in &chunks {
            self.client.emit(RendererEvent::SetVolumeData(VolumeChunk {
                name: id.clone(),
                offset: chunk.offset,
                compressed_byte_chunk: chunk.payload.to_vec(),
            }))?;
        }
        tracing::info!(
            %id,
            voxels = expected,
            bytes = volume.n_compressed_bytes,
            chunks = chunks.len(),
            "volume sent"
        );
        Ok(volume)
    }

    /// Quantile-compress float voxels (NaN and infinities are transparent)
    /// and send them.
    /// Also returns the bin edges used.
    pub fn create_from_floats(
        &self,
        values: &[f64],
        shape: [usize; 3],
        colormap: Option<Vec<Color>>,
    ) -> Result<(Volume, Vec<f64>), ClientError> {
        let (voxels, edges) = compress_volume(values, COLORMAP_SLOTS);
        let volume = self.create(&voxels, shape, colormap)?;
        Ok((volume, edges))
    }

    pub fn clear(&self) -> Result<(), ClientError> {
        self.client.emit(RendererEvent::Clear(ClearTarget::Volumes))
    }

    /// Called with the clicked atlas coordinate.
    pub fn on_click(&self, callback: impl Fn(VolumeClick) + Send + Sync + 'static) {
        self.client.dispatcher().register(VOLUME_CLICK, move |ev| {
            callback(parse_inbound(&ev.data)?);
            Ok(())
        });
    }
}
