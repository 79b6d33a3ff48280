//! The event schema spoken with the renderer.
//!
//! Outbound events are one enum; serde's adjacent tagging gives
//! `{"event": <name>, "data": <payload>}`, which [`RendererEvent::into_wire`]
//! splits into the Socket.IO event name and argument. Payloads the renderer
//! parses as JSON text are serialized through [`json_string`].

use std::collections::BTreeMap;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::color::Color;
use crate::sanitize::Vector3;
use crate::wire::{Payload, WireError};

/// `{id: value}` maps. Ordered so emissions are deterministic.
pub type IdMap<T> = BTreeMap<String, T>;

/// Single-entry [`IdMap`].
pub fn id_map<T>(id: &str, value: T) -> IdMap<T> {
    let mut m = IdMap::new();
    m.insert(id.to_string(), value);
    m
}

/// Targets of the `Clear` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClearTarget {
    All,
    Neurons,
    Particle,
    Probes,
    Areas,
    Area,
    Volumes,
    Texts,
    #[serde(rename = "custommesh")]
    CustomMesh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraMode {
    Orthographic,
    Perspective,
}

/// Neuron glyphs. Cubes render faster in the tens of thousands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NeuronShape {
    #[default]
    Sphere,
    Cube,
}

/// Camera placement on the wire: `[x, y, z, preserve_target]`. With
/// `preserve_target` the camera keeps aiming at its target, otherwise it
/// keeps its rotation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPosition(pub f64, pub f64, pub f64, pub bool);

impl CameraPosition {
    pub fn new(position: Vector3, preserve_target: bool) -> Self {
        Self(position[0], position[1], position[2], preserve_target)
    }
}

// ── JSON-text payloads ────────────────────────────────────────────────────────

/// Screenshot request; `size` is `[width, height]` in pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenshotRequest {
    pub name: String,
    pub size: [u32; 2],
}

/// Volume header sent before (and whenever the look of) a volume changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeMeta {
    pub name: String,
    pub n_compressed_bytes: usize,
    pub visible: bool,
    pub colormap: Vec<Color>,
}

/// One slice of the zlib-compressed voxel stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeChunk {
    pub name: String,
    pub offset: usize,
    pub compressed_byte_chunk: Vec<u8>,
}

/// Unity-style vector record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3Record {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl From<Vector3> for Vec3Record {
    fn from(v: Vector3) -> Self {
        Vec3Record { x: v[0], y: v[1], z: v[2] }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomMeshData {
    #[serde(rename = "ID")]
    pub id: String,
    pub vertices: Vec<Vec3Record>,
    pub triangles: Vec<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normals: Option<Vec<Vec3Record>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomMeshPosition {
    #[serde(rename = "ID")]
    pub id: String,
    pub position: Vec3Record,
    pub use_reference: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomMeshScale {
    #[serde(rename = "ID")]
    pub id: String,
    pub value: Vec3Record,
}

/// Serialize a payload as a JSON string instead of a JSON value.
pub mod json_string {
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<T: Serialize, S: Serializer>(value: &T, s: S) -> Result<S::Ok, S::Error> {
        let text = serde_json::to_string(value).map_err(serde::ser::Error::custom)?;
        s.serialize_str(&text)
    }

    pub fn deserialize<'de, T: DeserializeOwned, D: Deserializer<'de>>(d: D) -> Result<T, D::Error> {
        let text = String::deserialize(d)?;
        serde_json::from_str(&text).map_err(serde::de::Error::custom)
    }
}

// ── Outbound ──────────────────────────────────────────────────────────────────

/// Every event the client sends. Variant names are the wire names.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum RendererEvent {
    /// `[session_id, "send"]`
    #[serde(rename = "ID")]
    Identify(Vec<String>),
    Clear(ClearTarget),

    // meshes
    CreateMesh(Vec<String>),
    DeleteMesh(Vec<String>),
    SetPosition(IdMap<Vector3>),
    SetScale(IdMap<Vector3>),
    SetColor(IdMap<Color>),
    SetMaterial(IdMap<String>),

    // particles
    CreateParticles(Vec<String>),
    DeleteParticles(Vec<String>),
    SetParticlePos(IdMap<Vector3>),
    SetParticleSize(IdMap<f64>),
    SetParticleColor(IdMap<Color>),
    SetParticleMaterial(String),

    // neurons
    CreateNeurons(Vec<String>),
    DeleteNeurons(Vec<String>),
    SetNeuronPos(IdMap<Vector3>),
    SetNeuronSize(IdMap<f64>),
    SetNeuronColor(IdMap<Color>),
    SetNeuronShape(IdMap<NeuronShape>),
    SetNeuronMaterial(IdMap<String>),

    // probes
    CreateProbes(Vec<String>),
    DeleteProbes(Vec<String>),
    SetProbePos(IdMap<Vector3>),
    SetProbeAngles(IdMap<Vector3>),
    SetProbeColors(IdMap<Color>),
    SetProbeStyle(IdMap<String>),
    SetProbeSize(IdMap<Vector3>),

    // lines
    CreateLine(Vec<String>),
    DeleteLine(Vec<String>),
    SetLinePosition(IdMap<Vec<Vector3>>),
    SetLineColor(IdMap<Color>),

    // text
    CreateText(Vec<String>),
    DeleteText(Vec<String>),
    SetTextText(IdMap<String>),
    SetTextColors(IdMap<Color>),
    SetTextSizes(IdMap<u32>),
    SetTextPositions(IdMap<[f64; 2]>),

    // cameras
    CreateCamera(Vec<String>),
    DeleteCamera(Vec<String>),
    SetCameraTarget(IdMap<Vector3>),
    SetCameraPosition(IdMap<CameraPosition>),
    SetCameraRotation(IdMap<Vector3>),
    SetCameraTargetArea(IdMap<String>),
    SetCameraZoom(IdMap<f64>),
    SetCameraPan(IdMap<[f64; 2]>),
    SetCameraMode(IdMap<CameraMode>),
    SetCameraYAngle(IdMap<f64>),
    SetCameraControl(String),
    RequestCameraImg(#[serde(with = "json_string")] ScreenshotRequest),

    // lights
    ResetLightLink,
    SetLightLink(String),
    SetLightRotation(Vector3),

    // textures
    #[serde(rename = "CreateFOV")]
    CreateFov(Vec<String>),
    #[serde(rename = "DeleteFOV")]
    DeleteFov(Vec<String>),
    #[serde(rename = "SetFOVPos")]
    SetFovPos(IdMap<[Vector3; 4]>),
    #[serde(rename = "SetFOVOffset")]
    SetFovOffset(IdMap<f64>),
    #[serde(rename = "SetFOVVisibility")]
    SetFovVisibility(IdMap<bool>),
    /// `[id, n_chunks, height, width, "array"]`
    #[serde(rename = "SetFOVTextureDataMetaInit")]
    SetFovTextureDataMetaInit(String, usize, u32, u32, String),
    /// `[id, chunk_index, apply_now]`; `apply_now` marks the last chunk.
    #[serde(rename = "SetFOVTextureDataMeta")]
    SetFovTextureDataMeta(String, usize, bool),
    /// Raw bytes, sent as a binary attachment.
    #[serde(skip)]
    SetFovTextureData(Bytes),

    // volumes
    UpdateVolume(#[serde(with = "json_string")] VolumeMeta),
    SetVolumeData(#[serde(with = "json_string")] VolumeChunk),
    DeleteVolume(String),

    // atlas
    LoadAtlas(String),
    LoadDefaultAreas(String),
    SetAreaVisibility(IdMap<bool>),
    SetAreaColors(IdMap<Color>),
    SetAreaAlpha(IdMap<f64>),
    SetAreaMaterial(IdMap<String>),
    SetAreaIntensity(IdMap<f64>),
    SetAreaColormap(String),
    SetAreaData(IdMap<Vec<f64>>),
    SetAreaIndex(i64),

    // custom meshes
    CustomMeshCreate(#[serde(with = "json_string")] CustomMeshData),
    CustomMeshDelete(String),
    CustomMeshPosition(#[serde(with = "json_string")] CustomMeshPosition),
    CustomMeshScale(#[serde(with = "json_string")] CustomMeshScale),

    // scene persistence
    #[serde(rename = "urchin-save")]
    SaveScene,
    #[serde(rename = "urchin-load")]
    LoadScene(String),
}

impl RendererEvent {
    /// Event name and argument as they go on the wire.
    pub fn into_wire(self) -> Result<(String, Payload), WireError> {
        if let RendererEvent::SetFovTextureData(bytes) = self {
            return Ok(("SetFOVTextureData".to_string(), Payload::Binary(bytes)));
        }
        let mut obj = match serde_json::to_value(&self)? {
            Value::Object(obj) => obj,
            other => return Err(WireError::NotAnEvent(other.to_string())),
        };
        let name = match obj.remove("event") {
            Some(Value::String(name)) => name,
            _ => return Err(WireError::NotAnEvent(format!("{self:?}"))),
        };
        let data = obj.remove("data").unwrap_or(Value::Null);
        Ok((name, Payload::Json(data)))
    }
}

// ── Inbound ───────────────────────────────────────────────────────────────────

pub const LOG: &str = "log";
pub const LOG_WARNING: &str = "log-warning";
pub const LOG_ERROR: &str = "log-error";
pub const IMAGE_META: &str = "ReceiveCameraImgMeta";
pub const IMAGE_CHUNK: &str = "ReceiveCameraImg";
pub const MESH_CLICK: &str = "NeuronCallback";
pub const VOLUME_CLICK: &str = "VolumeClick";

/// Announces an incoming screenshot and its total size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageMeta {
    pub name: String,
    pub total_bytes: usize,
}

/// One slice of a PNG screenshot, bytes as a JSON array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageChunk {
    pub name: String,
    pub data: Vec<u8>,
}

/// Atlas voxel index under a click on a volume slice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeClick {
    pub ap: f64,
    pub ml: f64,
    pub dv: f64,
}

/// Parse an inbound payload, accepting either a JSON value or JSON text.
pub fn parse_inbound<T: serde::de::DeserializeOwned>(data: &Value) -> Result<T, WireError> {
    match data {
        Value::String(text) => match serde_json::from_str(text) {
            Ok(v) => Ok(v),
            Err(_) => Ok(serde_json::from_value(data.clone())?),
        },
        other => Ok(serde_json::from_value(other.clone())?),
    }
}
