//! Arbitrary triangle meshes built from vertex and face lists.

use urchin_core::event::{CustomMeshData, CustomMeshPosition, CustomMeshScale, Vec3Record};
use urchin_core::sanitize::sanitize_vector3;
use urchin_core::{ClearTarget, RendererEvent, Vector3};

use crate::client::Client;
use crate::error::ClientError;
use crate::object::{ObjectHandle, RemoteObject};
use crate::session::Category;

#[derive(Debug)]
pub struct CustomMesh {
    handle: ObjectHandle,
    position: Vector3,
    use_reference: bool,
    scale: Vector3,
}

impl RemoteObject for CustomMesh {
    fn handle(&self) -> &ObjectHandle {
        &self.handle
    }
    fn handle_mut(&mut self) -> &mut ObjectHandle {
        &mut self.handle
    }
}

impl CustomMesh {
    pub fn id(&self) -> &str {
        self.handle.id()
    }

    pub fn position(&self) -> Vector3 {
        self.position
    }

    pub fn uses_reference(&self) -> bool {
        self.use_reference
    }

    pub fn scale(&self) -> Vector3 {
        self.scale
    }

    /// AP/ML/DV position. With `use_reference` the origin is the reference
    /// coordinate (Bregma), otherwise the atlas origin.
    pub fn set_position(&mut self, position: Vector3, use_reference: bool) -> Result<(), ClientError> {
        self.handle.ensure_live()?;
        let position = sanitize_vector3(&position)?;
        self.position = position;
        self.use_reference = use_reference;
        self.handle.emit(RendererEvent::CustomMeshPosition(CustomMeshPosition {
            id: self.handle.id().to_string(),
            position: position.into(),
            use_reference,
        }))
    }

    pub fn set_scale(&mut self, scale: Vector3) -> Result<(), ClientError> {
        self.handle.ensure_live()?;
        let scale = sanitize_vector3(&scale)?;
        self.scale = scale;
        self.handle.emit(RendererEvent::CustomMeshScale(CustomMeshScale {
            id: self.handle.id().to_string(),
            value: scale.into(),
        }))
    }

    pub fn delete(&mut self) -> Result<(), ClientError> {
        let id = self.handle.id().to_string();
        self.handle.delete_with(RendererEvent::CustomMeshDelete(id))
    }
}

pub struct CustomMeshes {
    client: Client,
}

impl CustomMeshes {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a mesh from vertices and triangle faces. Without `normals`
    /// the renderer computes them.
    pub fn create(
        &self,
        vertices: &[Vector3],
        triangles: &[[u32; 3]],
        normals: Option<&[Vector3]>,
    ) -> Result<CustomMesh, ClientError> {
        let records = |vs: &[Vector3]| -> Result<Vec<Vec3Record>, ClientError> {
            vs.iter()
                .map(|v| Ok(Vec3Record::from(sanitize_vector3(v)?)))
                .collect()
        };
        let vertices = records(vertices)?;
        let normals = normals.map(records).transpose()?;

        let id = self.client.next_id(Category::CustomMesh);
        self.client.emit(RendererEvent::CustomMeshCreate(CustomMeshData {
            id: id.clone(),
            vertices,
            triangles: triangles.iter().flatten().copied().collect(),
            normals,
        }))?;
        tracing::debug!(%id, faces = triangles.len(), "custom mesh created");

        let mut handle = ObjectHandle::new(self.client.clone(), Category::CustomMesh, id);
        handle.mark_live();
        Ok(CustomMesh {
            handle,
            position: [0.0; 3],
            use_reference: true,
            scale: [1.0; 3],
        })
    }

    pub fn clear(&self) -> Result<(), ClientError> {
        self.client.emit(RendererEvent::Clear(ClearTarget::CustomMesh))
    }
}
