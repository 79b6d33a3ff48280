//! Brain atlases and their area meshes.
//!
//! An [`Atlas`] wraps a parsed [`Ontology`]. Areas are addressed by acronym,
//! with an optional hemisphere suffix (`-lh` / `-rh`) chosen by [`Side`].
//! Area setters need the atlas loaded in the renderer first.

use std::sync::Arc;

use urchin_core::atlas::{Ontology, Structure};
use urchin_core::event::id_map;
use urchin_core::sanitize::{sanitize_float, sanitize_side};
use urchin_core::{sanitize_color, ClearTarget, ColorInput, IdMap, OneOrMany, RendererEvent, Side};

use crate::client::Client;
use crate::error::ClientError;

/// Pre-built area groupings the renderer can show in one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AreaSet {
    /// Left and right default areas.
    Default,
    Beryl,
    Cosmos,
}

impl AreaSet {
    fn wire_name(self) -> &'static str {
        match self {
            AreaSet::Default => "",
            AreaSet::Beryl => "beryl",
            AreaSet::Cosmos => "cosmos",
        }
    }
}

pub struct Atlas {
    client: Client,
    ontology: Arc<Ontology>,
    loaded: bool,
}

impl Atlas {
    /// Read `<atlas.data_dir>/<name>.structures.json`.
    pub(crate) fn open(client: Client, name: &str) -> Result<Self, ClientError> {
        let ontology = Ontology::load(&client.config().atlas.data_dir, name)?;
        tracing::debug!(atlas = name, areas = ontology.len(), "ontology loaded");
        Ok(Self::from_ontology(client, Arc::new(ontology)))
    }

    pub fn from_ontology(client: Client, ontology: Arc<Ontology>) -> Self {
        Self {
            client,
            ontology,
            loaded: false,
        }
    }

    pub fn name(&self) -> &str {
        self.ontology.name()
    }

    pub fn ontology(&self) -> &Ontology {
        &self.ontology
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Load the atlas in the renderer. Only once per atlas.
    pub fn load(&mut self) -> Result<(), ClientError> {
        if self.loaded {
            return Err(ClientError::AtlasAlreadyLoaded(self.name().to_string()));
        }
        self.client.emit(RendererEvent::LoadAtlas(self.name().to_string()))?;
        self.loaded = true;
        tracing::info!(atlas = %self.name(), "atlas loaded");
        Ok(())
    }

    /// Hide every area.
    pub fn clear(&self) -> Result<(), ClientError> {
        self.client.emit(RendererEvent::Clear(ClearTarget::Area))
    }

    pub fn load_defaults(&self) -> Result<(), ClientError> {
        self.load_area_set(AreaSet::Default)
    }

    pub fn load_area_set(&self, set: AreaSet) -> Result<(), ClientError> {
        self.client
            .emit(RendererEvent::LoadDefaultAreas(set.wire_name().to_string()))
    }

    pub fn area(&self, acronym: &str) -> Result<Area<'_>, ClientError> {
        let structure = self
            .ontology
            .get(acronym)
            .ok_or_else(|| ClientError::UnknownArea {
                atlas: self.name().to_string(),
                acronym: acronym.to_string(),
            })?;
        Ok(Area {
            atlas: self,
            structure,
        })
    }

    /// Look up several areas; fails on the first unknown acronym.
    pub fn get_areas(&self, acronyms: &[&str]) -> Result<Vec<Area<'_>>, ClientError> {
        acronyms.iter().map(|a| self.area(a)).collect()
    }

    fn ensure_loaded(&self) -> Result<(), ClientError> {
        if self.loaded {
            Ok(())
        } else {
            Err(ClientError::AtlasNotLoaded(self.name().to_string()))
        }
    }

    /// Pair each area with its value under the sided name.
    fn sided_map<V: Clone, T>(
        &self,
        areas: &[Area<'_>],
        values: OneOrMany<V>,
        side: Side,
        sanitize: impl Fn(V) -> Result<T, ClientError>,
    ) -> Result<IdMap<T>, ClientError> {
        self.ensure_loaded()?;
        let values = values.for_count(areas.len())?;
        areas
            .iter()
            .zip(values)
            .map(|(area, v)| Ok((sanitize_side(area.acronym(), side), sanitize(v)?)))
            .collect()
    }

    /// An empty selection sends nothing.
    fn emit_areas<T>(
        &self,
        map: IdMap<T>,
        event: impl FnOnce(IdMap<T>) -> RendererEvent,
    ) -> Result<(), ClientError> {
        if map.is_empty() {
            return Ok(());
        }
        self.client.emit(event(map))
    }

    // ── Batch setters ─────────────────────────────────────────────────────

    pub fn set_visibilities(
        &self,
        areas: &[Area<'_>],
        visible: OneOrMany<bool>,
        side: Side,
    ) -> Result<(), ClientError> {
        let map = self.sided_map(areas, visible, side, Ok)?;
        self.emit_areas(map, RendererEvent::SetAreaVisibility)
    }

    pub fn set_colors(
        &self,
        areas: &[Area<'_>],
        colors: OneOrMany<ColorInput>,
        side: Side,
    ) -> Result<(), ClientError> {
        let map = self.sided_map(areas, colors, side, |c| Ok(sanitize_color(c)?))?;
        self.emit_areas(map, RendererEvent::SetAreaColors)
    }

    /// Alpha in 0..=1. Needs a transparent material to show.
    pub fn set_alphas(
        &self,
        areas: &[Area<'_>],
        alphas: OneOrMany<f64>,
        side: Side,
    ) -> Result<(), ClientError> {
        let map = self.sided_map(areas, alphas, side, |a| Ok(sanitize_float(&a)?))?;
        self.emit_areas(map, RendererEvent::SetAreaAlpha)
    }

    /// `opaque-lit` (or `default`), `opaque-unlit`, `transparent-lit`,
    /// `transparent-unlit`.
    pub fn set_materials(
        &self,
        areas: &[Area<'_>],
        materials: OneOrMany<String>,
        side: Side,
    ) -> Result<(), ClientError> {
        let map = self.sided_map(areas, materials, side, Ok)?;
        self.emit_areas(map, RendererEvent::SetAreaMaterial)
    }

    /// Colormap position per area, in 0..=1.
    pub fn set_intensities(
        &self,
        areas: &[Area<'_>],
        intensities: OneOrMany<f64>,
        side: Side,
    ) -> Result<(), ClientError> {
        let map = self.sided_map(areas, intensities, side, |i| Ok(sanitize_float(&i)?))?;
        self.emit_areas(map, RendererEvent::SetAreaIntensity)
    }

    /// Colormap used for intensities and data arrays, e.g. `"cool"`.
    pub fn set_colormap(&self, name: &str) -> Result<(), ClientError> {
        self.ensure_loaded()?;
        self.client.emit(RendererEvent::SetAreaColormap(name.to_string()))
    }

    /// One intensity series per area, stepped through with
    /// [`Atlas::set_data_index`].
    pub fn set_data(
        &self,
        areas: &[Area<'_>],
        data: OneOrMany<Vec<f64>>,
        side: Side,
    ) -> Result<(), ClientError> {
        let map = self.sided_map(areas, data, side, |series| {
            Ok(series
                .iter()
                .map(sanitize_float)
                .collect::<Result<Vec<_>, _>>()?)
        })?;
        self.emit_areas(map, RendererEvent::SetAreaData)
    }

    pub fn set_data_index(&self, index: i64) -> Result<(), ClientError> {
        self.ensure_loaded()?;
        self.client.emit(RendererEvent::SetAreaIndex(index))
    }
}

impl std::fmt::Debug for Atlas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Atlas")
            .field("name", &self.name())
            .field("areas", &self.ontology.len())
            .field("loaded", &self.loaded)
            .finish()
    }
}

// ── Area ──────────────────────────────────────────────────────────────────────

/// One atlas structure, borrowed from its atlas.
#[derive(Clone, Copy)]
pub struct Area<'a> {
    atlas: &'a Atlas,
    structure: &'a Structure,
}

impl<'a> Area<'a> {
    pub fn acronym(&self) -> &'a str {
        &self.structure.acronym
    }

    pub fn structure(&self) -> &'a Structure {
        self.structure
    }

    fn key(&self, side: Side) -> String {
        sanitize_side(self.acronym(), side)
    }

    pub fn set_visibility(&self, visible: bool, side: Side) -> Result<(), ClientError> {
        self.atlas.ensure_loaded()?;
        self.atlas
            .client
            .emit(RendererEvent::SetAreaVisibility(id_map(&self.key(side), visible)))
    }

    pub fn set_color(&self, color: impl Into<ColorInput>, side: Side) -> Result<(), ClientError> {
        self.atlas.ensure_loaded()?;
        let color = sanitize_color(color)?;
        self.atlas
            .client
            .emit(RendererEvent::SetAreaColors(id_map(&self.key(side), color)))
    }

    pub fn set_alpha(&self, alpha: f64, side: Side) -> Result<(), ClientError> {
        self.atlas.ensure_loaded()?;
        let alpha = sanitize_float(&alpha)?;
        self.atlas
            .client
            .emit(RendererEvent::SetAreaAlpha(id_map(&self.key(side), alpha)))
    }

    pub fn set_material(&self, material: &str, side: Side) -> Result<(), ClientError> {
        self.atlas.ensure_loaded()?;
        self.atlas.client.emit(RendererEvent::SetAreaMaterial(id_map(
            &self.key(side),
            material.to_string(),
        )))
    }

    pub fn set_intensity(&self, intensity: f64, side: Side) -> Result<(), ClientError> {
        self.atlas.ensure_loaded()?;
        let intensity = sanitize_float(&intensity)?;
        self.atlas
            .client
            .emit(RendererEvent::SetAreaIntensity(id_map(&self.key(side), intensity)))
    }
}

impl std::fmt::Debug for Area<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Area")
            .field("atlas", &self.atlas.name())
            .field("acronym", &self.acronym())
            .finish()
    }
}
