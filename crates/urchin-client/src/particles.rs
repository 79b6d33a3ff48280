//! Particles. Positions are micrometers locally and millimeters on the
//! wire. The material is shared by all of them.

use urchin_core::event::id_map;
use urchin_core::sanitize::{sanitize_float, sanitize_vector3};
use urchin_core::{sanitize_color, ClearTarget, Color, ColorInput, OneOrMany, RendererEvent, Vector3};

use crate::client::Client;
use crate::error::ClientError;
use crate::meshes::to_wire_units;
use crate::object::{apply_batch, create_handle, create_handles, delete_batch, BatchReport, ObjectHandle, RemoteObject};
use crate::session::Category;

#[derive(Debug, Clone, Default)]
pub struct ParticleOptions {
    pub position: Option<Vector3>,
    pub size: Option<f64>,
    pub color: Option<ColorInput>,
}

#[derive(Debug)]
pub struct Particle {
    handle: ObjectHandle,
    position: Vector3,
    size: f64,
    color: Color,
}

impl RemoteObject for Particle {
    fn handle(&self) -> &ObjectHandle {
        &self.handle
    }
    fn handle_mut(&mut self) -> &mut ObjectHandle {
        &mut self.handle
    }
}

impl Particle {
    fn new(handle: ObjectHandle) -> Self {
        Self {
            handle,
            position: [0.0; 3],
            size: 1.0,
            color: Color::white(),
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

    /// Position in micrometers.
    pub fn set_position(&mut self, position: Vector3) -> Result<(), ClientError> {
        self.handle.ensure_live()?;
        let position = sanitize_vector3(&position)?;
        self.position = position;
        self.handle
            .emit(RendererEvent::SetParticlePos(id_map(self.handle.id(), to_wire_units(position))))
    }

    pub fn set_size(&mut self, size: f64) -> Result<(), ClientError> {
        self.handle.ensure_live()?;
        let size = sanitize_float(&size)?;
        self.size = size;
        self.handle.emit(RendererEvent::SetParticleSize(id_map(self.handle.id(), size)))
    }

    pub fn set_color(&mut self, color: impl Into<ColorInput>) -> Result<(), ClientError> {
        self.handle.ensure_live()?;
        let color = sanitize_color(color)?;
        self.color = color.clone();
        self.handle.emit(RendererEvent::SetParticleColor(id_map(self.handle.id(), color)))
    }

    pub fn delete(&mut self) -> Result<(), ClientError> {
        let ids = vec![self.handle.id().to_string()];
        self.handle.delete_with(RendererEvent::DeleteParticles(ids))
    }
}

pub struct Particles {
    client: Client,
}

impl Particles {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn create(&self, opts: ParticleOptions) -> Result<Particle, ClientError> {
        if let Some(p) = &opts.position {
            sanitize_vector3(p)?;
        }
        if let Some(s) = &opts.size {
            sanitize_float(s)?;
        }
        if let Some(c) = &opts.color {
            sanitize_color(c.clone())?;
        }
        let handle = create_handle(&self.client, Category::Particle, RendererEvent::CreateParticles)?;
        let mut particle = Particle::new(handle);
        if let Some(p) = opts.position {
            particle.set_position(p)?;
        }
        if let Some(s) = opts.size {
            particle.set_size(s)?;
        }
        if let Some(c) = opts.color {
            particle.set_color(c)?;
        }
        Ok(particle)
    }

    /// One `CreateParticles` event for all `n`.
    pub fn create_many(&self, n: usize) -> Result<Vec<Particle>, ClientError> {
        let handles =
            create_handles(&self.client, Category::Particle, n, RendererEvent::CreateParticles)?;
        Ok(handles.into_iter().map(Particle::new).collect())
    }

    pub fn delete_many(&self, particles: &mut [Particle]) -> Result<BatchReport, ClientError> {
        delete_batch(&self.client, particles, RendererEvent::DeleteParticles)
    }

    pub fn set_positions(
        &self,
        particles: &mut [Particle],
        positions: OneOrMany<Vector3>,
    ) -> Result<BatchReport, ClientError> {
        apply_batch(
            &self.client,
            particles,
            positions,
            |p| Ok(sanitize_vector3(&p)?),
            |o, p| o.position = *p,
            |map| RendererEvent::SetParticlePos(map.into_iter().map(|(k, v)| (k, to_wire_units(v))).collect()),
        )
    }

    pub fn set_sizes(
        &self,
        particles: &mut [Particle],
        sizes: OneOrMany<f64>,
    ) -> Result<BatchReport, ClientError> {
        apply_batch(
            &self.client,
            particles,
            sizes,
            |s| Ok(sanitize_float(&s)?),
            |o, s| o.size = *s,
            RendererEvent::SetParticleSize,
        )
    }

    pub fn set_colors(
        &self,
        particles: &mut [Particle],
        colors: OneOrMany<ColorInput>,
    ) -> Result<BatchReport, ClientError> {
        apply_batch(
            &self.client,
            particles,
            colors,
            |c| Ok(sanitize_color(c)?),
            |o, c| o.color = c.clone(),
            RendererEvent::SetParticleColor,
        )
    }

    pub fn clear(&self) -> Result<(), ClientError> {
        self.client.emit(RendererEvent::Clear(ClearTarget::Particle))
    }

    /// Material shared by every particle.
    pub fn set_material(&self, material: &str) -> Result<(), ClientError> {
        self.client
            .emit(RendererEvent::SetParticleMaterial(material.to_string()))
    }
}
