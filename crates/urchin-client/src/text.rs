//! Screen-space text. Positions are canvas coordinates in [-1, 1].

use urchin_core::event::id_map;
use urchin_core::sanitize::{sanitize_float, SanitizeError};
use urchin_core::{sanitize_color, ClearTarget, Color, ColorInput, OneOrMany, RendererEvent};

use crate::client::Client;
use crate::error::ClientError;
use crate::object::{apply_batch, create_handle, create_handles, delete_batch, BatchReport, ObjectHandle, RemoteObject};
use crate::session::Category;

#[derive(Debug, Clone, Default)]
pub struct TextOptions {
    pub text: Option<String>,
    pub color: Option<ColorInput>,
    pub font_size: Option<u32>,
    pub position: Option<[f64; 2]>,
}

#[derive(Debug)]
pub struct Text {
    handle: ObjectHandle,
    text: String,
    color: Color,
    font_size: u32,
    position: [f64; 2],
}

impl RemoteObject for Text {
    fn handle(&self) -> &ObjectHandle {
        &self.handle
    }
    fn handle_mut(&mut self) -> &mut ObjectHandle {
        &mut self.handle
    }
}

fn sanitize_vector2(v: [f64; 2]) -> Result<[f64; 2], SanitizeError> {
    Ok([sanitize_float(&v[0])?, sanitize_float(&v[1])?])
}

impl Text {
    fn new(handle: ObjectHandle) -> Self {
        Self {
            handle,
            text: String::new(),
            color: Color::white(),
            font_size: 12,
            position: [0.0, 0.0],
        }
    }

    pub fn id(&self) -> &str {
        self.handle.id()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn color(&self) -> &Color {
        &self.color
    }

    pub fn font_size(&self) -> u32 {
        self.font_size
    }

    pub fn position(&self) -> [f64; 2] {
        self.position
    }

    pub fn set_text(&mut self, text: &str) -> Result<(), ClientError> {
        self.handle.ensure_live()?;
        self.text = text.to_string();
        self.handle
            .emit(RendererEvent::SetTextText(id_map(self.handle.id(), text.to_string())))
    }

    pub fn set_color(&mut self, color: impl Into<ColorInput>) -> Result<(), ClientError> {
        self.handle.ensure_live()?;
        let color = sanitize_color(color)?;
        self.color = color.clone();
        self.handle.emit(RendererEvent::SetTextColors(id_map(self.handle.id(), color)))
    }

    pub fn set_font_size(&mut self, size: u32) -> Result<(), ClientError> {
        self.handle.ensure_live()?;
        self.font_size = size;
        self.handle.emit(RendererEvent::SetTextSizes(id_map(self.handle.id(), size)))
    }

    pub fn set_position(&mut self, position: [f64; 2]) -> Result<(), ClientError> {
        self.handle.ensure_live()?;
        let position = sanitize_vector2(position)?;
        self.position = position;
        self.handle.emit(RendererEvent::SetTextPositions(id_map(self.handle.id(), position)))
    }

    pub fn delete(&mut self) -> Result<(), ClientError> {
        let ids = vec![self.handle.id().to_string()];
        self.handle.delete_with(RendererEvent::DeleteText(ids))
    }
}

pub struct Texts {
    client: Client,
}

impl Texts {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn create(&self, opts: TextOptions) -> Result<Text, ClientError> {
        if let Some(c) = &opts.color {
            sanitize_color(c.clone())?;
        }
        if let Some(p) = opts.position {
            sanitize_vector2(p)?;
        }
        let handle = create_handle(&self.client, Category::Text, RendererEvent::CreateText)?;
        let mut text = Text::new(handle);
        if let Some(t) = opts.text {
            text.set_text(&t)?;
        }
        if let Some(c) = opts.color {
            text.set_color(c)?;
        }
        if let Some(s) = opts.font_size {
            text.set_font_size(s)?;
        }
        if let Some(p) = opts.position {
            text.set_position(p)?;
        }
        Ok(text)
    }

    pub fn create_many(&self, n: usize) -> Result<Vec<Text>, ClientError> {
        let handles = create_handles(&self.client, Category::Text, n, RendererEvent::CreateText)?;
        Ok(handles.into_iter().map(Text::new).collect())
    }

    pub fn delete_many(&self, texts: &mut [Text]) -> Result<BatchReport, ClientError> {
        delete_batch(&self.client, texts, RendererEvent::DeleteText)
    }

    pub fn set_texts(
        &self,
        texts: &mut [Text],
        values: OneOrMany<String>,
    ) -> Result<BatchReport, ClientError> {
        apply_batch(
            &self.client,
            texts,
            values,
            Ok,
            |o, t| o.text = t.clone(),
            RendererEvent::SetTextText,
        )
    }

    pub fn set_colors(
        &self,
        texts: &mut [Text],
        colors: OneOrMany<ColorInput>,
    ) -> Result<BatchReport, ClientError> {
        apply_batch(
            &self.client,
            texts,
            colors,
            |c| Ok(sanitize_color(c)?),
            |o, c| o.color = c.clone(),
            RendererEvent::SetTextColors,
        )
    }

    pub fn set_font_sizes(
        &self,
        texts: &mut [Text],
        sizes: OneOrMany<u32>,
    ) -> Result<BatchReport, ClientError> {
        apply_batch(
            &self.client,
            texts,
            sizes,
            Ok,
            |o, s| o.font_size = *s,
            RendererEvent::SetTextSizes,
        )
    }

    pub fn set_positions(
        &self,
        texts: &mut [Text],
        positions: OneOrMany<[f64; 2]>,
    ) -> Result<BatchReport, ClientError> {
        apply_batch(
            &self.client,
            texts,
            positions,
            |p| Ok(sanitize_vector2(p)?),
            |o, p| o.position = *p,
            RendererEvent::SetTextPositions,
        )
    }

    pub fn clear(&self) -> Result<(), ClientError> {
        self.client.emit(RendererEvent::Clear(ClearTarget::Texts))
    }
}
