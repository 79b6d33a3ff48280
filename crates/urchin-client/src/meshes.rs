//! Primitive meshes (cubes, spheres, ...). Positions are micrometers
//! locally and millimeters on the wire.

use urchin_core::event::{id_map, MESH_CLICK};
use urchin_core::sanitize::sanitize_vector3;
use urchin_core::{sanitize_color, ClearTarget, Color, ColorInput, OneOrMany, RendererEvent, Vector3};

use crate::client::Client;
use crate::error::ClientError;
use crate::object::{apply_batch, create_handle, create_handles, delete_batch, BatchReport, ObjectHandle, RemoteObject};
use crate::session::Category;

pub(crate) fn to_wire_units(um: Vector3) -> Vector3 {
    [um[0] / 1000.0, um[1] / 1000.0, um[2] / 1000.0]
}

/// Initial attributes for [`Meshes::create`]. Unset fields are not sent.
#[derive(Debug, Clone, Default)]
pub struct MeshOptions {
    pub position: Option<Vector3>,
    pub scale: Option<Vector3>,
    pub color: Option<ColorInput>,
    pub material: Option<String>,
}

#[derive(Debug)]
pub struct Mesh {
    handle: ObjectHandle,
    position: Vector3,
    scale: Vector3,
    color: Color,
    material: String,
}

impl RemoteObject for Mesh {
    fn handle(&self) -> &ObjectHandle {
        &self.handle
    }
    fn handle_mut(&mut self) -> &mut ObjectHandle {
        &mut self.handle
    }
}

impl Mesh {
    fn new(handle: ObjectHandle) -> Self {
        Self {
            handle,
            position: [0.0; 3],
            scale: [1.0; 3],
            color: Color::white(),
            material: "default".into(),
        }
    }

    pub fn id(&self) -> &str {
        self.handle.id()
    }

    /// Micrometers.
    pub fn position(&self) -> Vector3 {
        self.position
    }

    pub fn scale(&self) -> Vector3 {
        self.scale
    }

    pub fn color(&self) -> &Color {
        &self.color
    }

    pub fn material(&self) -> &str {
        &self.material
    }

    /// Position in micrometers.
    pub fn set_position(&mut self, position: Vector3) -> Result<(), ClientError> {
        self.handle.ensure_live()?;
        let position = sanitize_vector3(&position)?;
        self.position = position;
        self.handle
            .emit(RendererEvent::SetPosition(id_map(self.handle.id(), to_wire_units(position))))
    }

    pub fn set_scale(&mut self, scale: Vector3) -> Result<(), ClientError> {
        self.handle.ensure_live()?;
        let scale = sanitize_vector3(&scale)?;
        self.scale = scale;
        self.handle.emit(RendererEvent::SetScale(id_map(self.handle.id(), scale)))
    }

    pub fn set_color(&mut self, color: impl Into<ColorInput>) -> Result<(), ClientError> {
        self.handle.ensure_live()?;
        let color = sanitize_color(color)?;
        self.color = color.clone();
        self.handle.emit(RendererEvent::SetColor(id_map(self.handle.id(), color)))
    }

    pub fn set_material(&mut self, material: &str) -> Result<(), ClientError> {
        self.handle.ensure_live()?;
        self.material = material.to_string();
        self.handle
            .emit(RendererEvent::SetMaterial(id_map(self.handle.id(), material.to_string())))
    }

    pub fn delete(&mut self) -> Result<(), ClientError> {
        let ids = vec![self.handle.id().to_string()];
        self.handle.delete_with(RendererEvent::DeleteMesh(ids))
    }

    fn apply(&mut self, opts: MeshOptions) -> Result<(), ClientError> {
        if let Some(p) = opts.position {
            self.set_position(p)?;
        }
        if let Some(s) = opts.scale {
            self.set_scale(s)?;
        }
        if let Some(c) = opts.color {
            self.set_color(c)?;
        }
        if let Some(m) = opts.material {
            self.set_material(&m)?;
        }
        Ok(())
    }
}

pub struct Meshes {
    client: Client,
}

impl Meshes {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    /// Create one mesh, then send whichever initial attributes are set.
    pub fn create(&self, opts: MeshOptions) -> Result<Mesh, ClientError> {
        // Fail before anything is created if the options are malformed.
        if let Some(p) = &opts.position {
            sanitize_vector3(p)?;
        }
        if let Some(s) = &opts.scale {
            sanitize_vector3(s)?;
        }
        if let Some(c) = &opts.color {
            sanitize_color(c.clone())?;
        }
        let handle = create_handle(&self.client, Category::Mesh, RendererEvent::CreateMesh)?;
        let mut mesh = Mesh::new(handle);
        mesh.apply(opts)?;
        Ok(mesh)
    }

    pub fn create_many(&self, n: usize) -> Result<Vec<Mesh>, ClientError> {
        let handles = create_handles(&self.client, Category::Mesh, n, RendererEvent::CreateMesh)?;
        Ok(handles.into_iter().map(Mesh::new).collect())
    }

    pub fn delete_many(&self, meshes: &mut [Mesh]) -> Result<BatchReport, ClientError> {
        delete_batch(&self.client, meshes, RendererEvent::DeleteMesh)
    }

    /// Positions in micrometers.
    pub fn set_positions(
        &self,
        meshes: &mut [Mesh],
        positions: OneOrMany<Vector3>,
    ) -> Result<BatchReport, ClientError> {
        apply_batch(
            &self.client,
            meshes,
            positions,
            |p| Ok(sanitize_vector3(&p)?),
            |m, p| m.position = *p,
            |map| RendererEvent::SetPosition(map.into_iter().map(|(k, v)| (k, to_wire_units(v))).collect()),
        )
    }

    pub fn set_scales(
        &self,
        meshes: &mut [Mesh],
        scales: OneOrMany<Vector3>,
    ) -> Result<BatchReport, ClientError> {
        apply_batch(
            &self.client,
            meshes,
            scales,
            |s| Ok(sanitize_vector3(&s)?),
            |m, s| m.scale = *s,
            RendererEvent::SetScale,
        )
    }

    pub fn set_colors(
        &self,
        meshes: &mut [Mesh],
        colors: OneOrMany<ColorInput>,
    ) -> Result<BatchReport, ClientError> {
        apply_batch(
            &self.client,
            meshes,
            colors,
            |c| Ok(sanitize_color(c)?),
            |m, c| m.color = c.clone(),
            RendererEvent::SetColor,
        )
    }

    pub fn set_materials(
        &self,
        meshes: &mut [Mesh],
        materials: OneOrMany<String>,
    ) -> Result<BatchReport, ClientError> {
        apply_batch(
            &self.client,
            meshes,
            materials,
            Ok,
            |m, s| m.material = s.clone(),
            RendererEvent::SetMaterial,
        )
    }

    /// Remove every mesh from the renderer. Existing handles are not marked deleted.
    pub fn clear(&self) -> Result<(), ClientError> {
        self.client.emit(RendererEvent::Clear(ClearTarget::Neurons))
    }

    /// Called with the mesh id whenever a mesh is clicked in the renderer.
    pub fn on_click(&self, callback: impl Fn(&str) + Send + Sync + 'static) {
        self.client.dispatcher().register(MESH_CLICK, move |ev| {
            match ev.data.as_str() {
                Some(id) => callback(id),
                None => callback(&ev.data.to_string()),
            }
            Ok(())
        });
    }
}
