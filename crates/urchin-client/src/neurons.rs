//! Neurons: glyphs with a shape and material of their own. Positions go
//! to the renderer as given, in its atlas coordinates.

use urchin_core::event::id_map;
use urchin_core::sanitize::{sanitize_float, sanitize_vector3};
use urchin_core::{
    sanitize_color, ClearTarget, Color, ColorInput, NeuronShape, OneOrMany, RendererEvent, Vector3,
};

use crate::client::Client;
use crate::error::ClientError;
use crate::object::{apply_batch, create_handle, create_handles, delete_batch, BatchReport, ObjectHandle, RemoteObject};
use crate::session::Category;

const DEFAULT_SIZE: f64 = 0.02;
const DEFAULT_MATERIAL: &str = "lit-transparent";

/// Initial attributes for [`Neurons::create`]. Unset fields are not sent.
#[derive(Debug, Clone, Default)]
pub struct NeuronOptions {
    pub position: Option<Vector3>,
    pub size: Option<f64>,
    pub color: Option<ColorInput>,
    pub shape: Option<NeuronShape>,
    pub material: Option<String>,
}

#[derive(Debug)]
pub struct Neuron {
    handle: ObjectHandle,
    position: Vector3,
    size: f64,
    color: Color,
    shape: NeuronShape,
    material: String,
}

impl RemoteObject for Neuron {
    fn handle(&self) -> &ObjectHandle {
        &self.handle
    }
    fn handle_mut(&mut self) -> &mut ObjectHandle {
        &mut self.handle
    }
}

impl Neuron {
    fn new(handle: ObjectHandle) -> Self {
        Self {
            handle,
            position: [0.0; 3],
            size: DEFAULT_SIZE,
            color: Color::white(),
            shape: NeuronShape::Sphere,
            material: DEFAULT_MATERIAL.to_string(),
        }
    }

    pub fn id(&self) -> &str {
        self.handle.id()
    }

    pub fn position(&self) -> Vector3 {
        self.position
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    pub fn color(&self) -> &Color {
        &self.color
    }

    pub fn shape(&self) -> NeuronShape {
        self.shape
    }

    pub fn material(&self) -> &str {
        &self.material
    }

    pub fn set_position(&mut self, position: Vector3) -> Result<(), ClientError> {
        self.handle.ensure_live()?;
        let position = sanitize_vector3(&position)?;
        self.position = position;
        self.handle
            .emit(RendererEvent::SetNeuronPos(id_map(self.handle.id(), position)))
    }

    pub fn set_size(&mut self, size: f64) -> Result<(), ClientError> {
        self.handle.ensure_live()?;
        let size = sanitize_float(&size)?;
        self.size = size;
        self.handle.emit(RendererEvent::SetNeuronSize(id_map(self.handle.id(), size)))
    }

    pub fn set_color(&mut self, color: impl Into<ColorInput>) -> Result<(), ClientError> {
        self.handle.ensure_live()?;
        let color = sanitize_color(color)?;
        self.color = color.clone();
        self.handle.emit(RendererEvent::SetNeuronColor(id_map(self.handle.id(), color)))
    }

    pub fn set_shape(&mut self, shape: NeuronShape) -> Result<(), ClientError> {
        self.handle.ensure_live()?;
        self.shape = shape;
        self.handle.emit(RendererEvent::SetNeuronShape(id_map(self.handle.id(), shape)))
    }

    /// `lit-transparent` (the default), `lit` or `unlit`.
    pub fn set_material(&mut self, material: &str) -> Result<(), ClientError> {
        self.handle.ensure_live()?;
        self.material = material.to_string();
        self.handle
            .emit(RendererEvent::SetNeuronMaterial(id_map(self.handle.id(), material.to_string())))
    }

    pub fn delete(&mut self) -> Result<(), ClientError> {
        let ids = vec![self.handle.id().to_string()];
        self.handle.delete_with(RendererEvent::DeleteNeurons(ids))
    }
}

pub struct Neurons {
    client: Client,
}

impl Neurons {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn create(&self, opts: NeuronOptions) -> Result<Neuron, ClientError> {
        if let Some(p) = &opts.position {
            sanitize_vector3(p)?;
        }
        if let Some(s) = &opts.size {
            sanitize_float(s)?;
        }
        if let Some(c) = &opts.color {
            sanitize_color(c.clone())?;
        }
        let handle = create_handle(&self.client, Category::Neuron, RendererEvent::CreateNeurons)?;
        let mut neuron = Neuron::new(handle);
        if let Some(p) = opts.position {
            neuron.set_position(p)?;
        }
        if let Some(s) = opts.size {
            neuron.set_size(s)?;
        }
        if let Some(c) = opts.color {
            neuron.set_color(c)?;
        }
        if let Some(shape) = opts.shape {
            neuron.set_shape(shape)?;
        }
        if let Some(m) = opts.material {
            neuron.set_material(&m)?;
        }
        Ok(neuron)
    }

    /// One `CreateNeurons` event for all `n`.
    pub fn create_many(&self, n: usize) -> Result<Vec<Neuron>, ClientError> {
        let handles = create_handles(&self.client, Category::Neuron, n, RendererEvent::CreateNeurons)?;
        Ok(handles.into_iter().map(Neuron::new).collect())
    }

    pub fn delete_many(&self, neurons: &mut [Neuron]) -> Result<BatchReport, ClientError> {
        delete_batch(&self.client, neurons, RendererEvent::DeleteNeurons)
    }

    pub fn set_positions(
        &self,
        neurons: &mut [Neuron],
        positions: OneOrMany<Vector3>,
    ) -> Result<BatchReport, ClientError> {
        apply_batch(
            &self.client,
            neurons,
            positions,
            |p| Ok(sanitize_vector3(&p)?),
            |o, p| o.position = *p,
            RendererEvent::SetNeuronPos,
        )
    }

    pub fn set_sizes(
        &self,
        neurons: &mut [Neuron],
        sizes: OneOrMany<f64>,
    ) -> Result<BatchReport, ClientError> {
        apply_batch(
            &self.client,
            neurons,
            sizes,
            |s| Ok(sanitize_float(&s)?),
            |o, s| o.size = *s,
            RendererEvent::SetNeuronSize,
        )
    }

    pub fn set_colors(
        &self,
        neurons: &mut [Neuron],
        colors: OneOrMany<ColorInput>,
    ) -> Result<BatchReport, ClientError> {
        apply_batch(
            &self.client,
            neurons,
            colors,
            |c| Ok(sanitize_color(c)?),
            |o, c| o.color = c.clone(),
            RendererEvent::SetNeuronColor,
        )
    }

    pub fn set_shapes(
        &self,
        neurons: &mut [Neuron],
        shapes: OneOrMany<NeuronShape>,
    ) -> Result<BatchReport, ClientError> {
        apply_batch(
            &self.client,
            neurons,
            shapes,
            Ok,
            |o, s| o.shape = *s,
            RendererEvent::SetNeuronShape,
        )
    }

    pub fn set_materials(
        &self,
        neurons: &mut [Neuron],
        materials: OneOrMany<String>,
    ) -> Result<BatchReport, ClientError> {
        apply_batch(
            &self.client,
            neurons,
            materials,
            Ok,
            |o, m| o.material = m.clone(),
            RendererEvent::SetNeuronMaterial,
        )
    }

    /// Remove every neuron from the renderer. Existing handles are not marked deleted.
    pub fn clear(&self) -> Result<(), ClientError> {
        self.client.emit(RendererEvent::Clear(ClearTarget::Neurons))
    }
}
