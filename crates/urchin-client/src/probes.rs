//! Recording probes. Positions are micrometers and sent as given.

use urchin_core::event::id_map;
use urchin_core::sanitize::sanitize_vector3;
use urchin_core::{sanitize_color, ClearTarget, Color, ColorInput, OneOrMany, RendererEvent, Vector3};

use crate::client::Client;
use crate::error::ClientError;
use crate::object::{apply_batch, create_handle, create_handles, delete_batch, BatchReport, ObjectHandle, RemoteObject};
use crate::session::Category;

#[derive(Debug, Clone, Default)]
pub struct ProbeOptions {
    pub position: Option<Vector3>,
    /// Yaw, pitch, roll in degrees.
    pub angles: Option<Vector3>,
    pub color: Option<ColorInput>,
    pub style: Option<String>,
    /// Width, height, depth in millimeters.
    pub size: Option<Vector3>,
}

#[derive(Debug)]
pub struct Probe {
    handle: ObjectHandle,
    position: Vector3,
    angles: Vector3,
    color: Color,
    style: String,
    size: Vector3,
}

impl RemoteObject for Probe {
    fn handle(&self) -> &ObjectHandle {
        &self.handle
    }
    fn handle_mut(&mut self) -> &mut ObjectHandle {
        &mut self.handle
    }
}

impl Probe {
    fn new(handle: ObjectHandle) -> Self {
        Self {
            handle,
            position: [0.0; 3],
            angles: [0.0; 3],
            color: Color::white(),
            style: "line".into(),
            size: [0.07, 3.84, 0.02],
        }
    }

    pub fn id(&self) -> &str {
        self.handle.id()
    }

    pub fn position(&self) -> Vector3 {
        self.position
    }

    pub fn angles(&self) -> Vector3 {
        self.angles
    }

    pub fn color(&self) -> &Color {
        &self.color
    }

    pub fn style(&self) -> &str {
        &self.style
    }

    pub fn size(&self) -> Vector3 {
        self.size
    }

    pub fn set_position(&mut self, position: Vector3) -> Result<(), ClientError> {
        self.handle.ensure_live()?;
        let position = sanitize_vector3(&position)?;
        self.position = position;
        self.handle.emit(RendererEvent::SetProbePos(id_map(self.handle.id(), position)))
    }

    pub fn set_angles(&mut self, angles: Vector3) -> Result<(), ClientError> {
        self.handle.ensure_live()?;
        let angles = sanitize_vector3(&angles)?;
        self.angles = angles;
        self.handle.emit(RendererEvent::SetProbeAngles(id_map(self.handle.id(), angles)))
    }

    pub fn set_color(&mut self, color: impl Into<ColorInput>) -> Result<(), ClientError> {
        self.handle.ensure_live()?;
        let color = sanitize_color(color)?;
        self.color = color.clone();
        self.handle.emit(RendererEvent::SetProbeColors(id_map(self.handle.id(), color)))
    }

    /// `"line"` or `"probe-model"`; the renderer decides what it accepts.
    pub fn set_style(&mut self, style: &str) -> Result<(), ClientError> {
        self.handle.ensure_live()?;
        self.style = style.to_string();
        self.handle
            .emit(RendererEvent::SetProbeStyle(id_map(self.handle.id(), style.to_string())))
    }

    pub fn set_size(&mut self, size: Vector3) -> Result<(), ClientError> {
        self.handle.ensure_live()?;
        let size = sanitize_vector3(&size)?;
        self.size = size;
        self.handle.emit(RendererEvent::SetProbeSize(id_map(self.handle.id(), size)))
    }

    pub fn delete(&mut self) -> Result<(), ClientError> {
        let ids = vec![self.handle.id().to_string()];
        self.handle.delete_with(RendererEvent::DeleteProbes(ids))
    }
}

pub struct Probes {
    client: Client,
}

impl Probes {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn create(&self, opts: ProbeOptions) -> Result<Probe, ClientError> {
        for v in [&opts.position, &opts.angles, &opts.size].into_iter().flatten() {
            sanitize_vector3(v)?;
        }
        if let Some(c) = &opts.color {
            sanitize_color(c.clone())?;
        }
        let handle = create_handle(&self.client, Category::Probe, RendererEvent::CreateProbes)?;
        let mut probe = Probe::new(handle);
        if let Some(p) = opts.position {
            probe.set_position(p)?;
        }
        if let Some(a) = opts.angles {
            probe.set_angles(a)?;
        }
        if let Some(c) = opts.color {
            probe.set_color(c)?;
        }
        if let Some(s) = opts.style {
            probe.set_style(&s)?;
        }
        if let Some(s) = opts.size {
            probe.set_size(s)?;
        }
        Ok(probe)
    }

    pub fn create_many(&self, n: usize) -> Result<Vec<Probe>, ClientError> {
        let handles = create_handles(&self.client, Category::Probe, n, RendererEvent::CreateProbes)?;
        Ok(handles.into_iter().map(Probe::new).collect())
    }

    pub fn delete_many(&self, probes: &mut [Probe]) -> Result<BatchReport, ClientError> {
        delete_batch(&self.client, probes, RendererEvent::DeleteProbes)
    }

    pub fn set_positions(
        &self,
        probes: &mut [Probe],
        positions: OneOrMany<Vector3>,
    ) -> Result<BatchReport, ClientError> {
        apply_batch(
            &self.client,
            probes,
            positions,
            |p| Ok(sanitize_vector3(&p)?),
            |o, p| o.position = *p,
            RendererEvent::SetProbePos,
        )
    }

    pub fn set_angles(
        &self,
        probes: &mut [Probe],
        angles: OneOrMany<Vector3>,
    ) -> Result<BatchReport, ClientError> {
        apply_batch(
            &self.client,
            probes,
            angles,
            |a| Ok(sanitize_vector3(&a)?),
            |o, a| o.angles = *a,
            RendererEvent::SetProbeAngles,
        )
    }

    pub fn set_colors(
        &self,
        probes: &mut [Probe],
        colors: OneOrMany<ColorInput>,
    ) -> Result<BatchReport, ClientError> {
        apply_batch(
            &self.client,
            probes,
            colors,
            |c| Ok(sanitize_color(c)?),
            |o, c| o.color = c.clone(),
            RendererEvent::SetProbeColors,
        )
    }

    pub fn set_sizes(
        &self,
        probes: &mut [Probe],
        sizes: OneOrMany<Vector3>,
    ) -> Result<BatchReport, ClientError> {
        apply_batch(
            &self.client,
            probes,
            sizes,
            |s| Ok(sanitize_vector3(&s)?),
            |o, s| o.size = *s,
            RendererEvent::SetProbeSize,
        )
    }

    pub fn clear(&self) -> Result<(), ClientError> {
        self.client.emit(RendererEvent::Clear(ClearTarget::Probes))
    }
}
