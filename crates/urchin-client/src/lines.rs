//! Polylines through a list of vertices (micrometers, sent as given).

use urchin_core::event::id_map;
use urchin_core::sanitize::sanitize_vector3;
use urchin_core::{sanitize_color, Color, ColorInput, OneOrMany, RendererEvent, Vector3};

use crate::client::Client;
use crate::error::ClientError;
use crate::object::{apply_batch, create_handle, create_handles, delete_batch, BatchReport, ObjectHandle, RemoteObject};
use crate::session::Category;

#[derive(Debug, Clone, Default)]
pub struct LineOptions {
    pub positions: Option<Vec<Vector3>>,
    pub color: Option<ColorInput>,
}

#[derive(Debug)]
pub struct Line {
    handle: ObjectHandle,
    positions: Vec<Vector3>,
    color: Color,
}

impl RemoteObject for Line {
    fn handle(&self) -> &ObjectHandle {
        &self.handle
    }
    fn handle_mut(&mut self) -> &mut ObjectHandle {
        &mut self.handle
    }
}

fn sanitize_vertices(vertices: &[Vector3]) -> Result<Vec<Vector3>, ClientError> {
    Ok(vertices
        .iter()
        .map(|v| sanitize_vector3(v))
        .collect::<Result<Vec<_>, _>>()?)
}

impl Line {
    fn new(handle: ObjectHandle) -> Self {
        Self {
            handle,
            positions: Vec::new(),
            color: Color::white(),
        }
    }

    pub fn id(&self) -> &str {
        self.handle.id()
    }

    pub fn positions(&self) -> &[Vector3] {
        &self.positions
    }

    pub fn color(&self) -> &Color {
        &self.color
    }

    pub fn set_positions(&mut self, vertices: &[Vector3]) -> Result<(), ClientError> {
        self.handle.ensure_live()?;
        let vertices = sanitize_vertices(vertices)?;
        self.positions = vertices.clone();
        self.handle
            .emit(RendererEvent::SetLinePosition(id_map(self.handle.id(), vertices)))
    }

    pub fn set_color(&mut self, color: impl Into<ColorInput>) -> Result<(), ClientError> {
        self.handle.ensure_live()?;
        let color = sanitize_color(color)?;
        self.color = color.clone();
        self.handle.emit(RendererEvent::SetLineColor(id_map(self.handle.id(), color)))
    }

    pub fn delete(&mut self) -> Result<(), ClientError> {
        let ids = vec![self.handle.id().to_string()];
        self.handle.delete_with(RendererEvent::DeleteLine(ids))
    }
}

pub struct Lines {
    client: Client,
}

impl Lines {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn create(&self, opts: LineOptions) -> Result<Line, ClientError> {
        if let Some(p) = &opts.positions {
            sanitize_vertices(p)?;
        }
        if let Some(c) = &opts.color {
            sanitize_color(c.clone())?;
        }
        let handle = create_handle(&self.client, Category::Line, RendererEvent::CreateLine)?;
        let mut line = Line::new(handle);
        if let Some(p) = opts.positions {
            line.set_positions(&p)?;
        }
        if let Some(c) = opts.color {
            line.set_color(c)?;
        }
        Ok(line)
    }

    pub fn create_many(&self, n: usize) -> Result<Vec<Line>, ClientError> {
        let handles = create_handles(&self.client, Category::Line, n, RendererEvent::CreateLine)?;
        Ok(handles.into_iter().map(Line::new).collect())
    }

    pub fn delete_many(&self, lines: &mut [Line]) -> Result<BatchReport, ClientError> {
        delete_batch(&self.client, lines, RendererEvent::DeleteLine)
    }

    pub fn set_positions(
        &self,
        lines: &mut [Line],
        vertices: OneOrMany<Vec<Vector3>>,
    ) -> Result<BatchReport, ClientError> {
        apply_batch(
            &self.client,
            lines,
            vertices,
            |v| sanitize_vertices(&v),
            |o, v| o.positions = v.clone(),
            RendererEvent::SetLinePosition,
        )
    }

    pub fn set_colors(
        &self,
        lines: &mut [Line],
        colors: OneOrMany<ColorInput>,
    ) -> Result<BatchReport, ClientError> {
        apply_batch(
            &self.client,
            lines,
            colors,
            |c| Ok(sanitize_color(c)?),
            |o, c| o.color = c.clone(),
            RendererEvent::SetLineColor,
        )
    }
}
