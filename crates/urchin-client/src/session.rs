//! Session identity and per-category object ids.

use std::fmt;

use dashmap::DashMap;
use rand::distributions::Alphanumeric;
use rand::Rng;

/// Kinds of renderer objects. Each has its own id sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Mesh,
    Particle,
    Neuron,
    Probe,
    Line,
    Text,
    Camera,
    Texture,
    Volume,
    CustomMesh,
}

impl Category {
    pub fn prefix(self) -> &'static str {
        match self {
            Category::Mesh => "",
            Category::Particle | Category::Neuron => "n",
            Category::Probe => "p",
            Category::Line => "l",
            Category::Text => "t",
            Category::Camera => "Camera",
            Category::Texture => "tex",
            Category::Volume => "volume",
            Category::CustomMesh => "custom",
        }
    }

    /// Categories sharing a prefix draw from one counter.
    fn sequence(self) -> Category {
        match self {
            Category::Neuron => Category::Particle,
            other => other,
        }
    }

    /// Meshes, volumes and custom meshes count from zero, the rest from one.
    pub fn first_index(self) -> u64 {
        match self {
            Category::Mesh | Category::Volume | Category::CustomMesh => 0,
            _ => 1,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Mesh => "mesh",
            Category::Particle => "particle",
            Category::Neuron => "neuron",
            Category::Probe => "probe",
            Category::Line => "line",
            Category::Text => "text",
            Category::Camera => "camera",
            Category::Texture => "texture",
            Category::Volume => "volume",
            Category::CustomMesh => "custom mesh",
        };
        f.write_str(name)
    }
}

/// Hands out ids per category. Ids are never reused within a session.
#[derive(Default)]
pub struct IdAllocator {
    counters: DashMap<Category, u64>,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self, category: Category) -> String {
        let mut counter = self
            .counters
            .entry(category.sequence())
            .or_insert(category.first_index());
        let id = format!("{}{}", category.prefix(), *counter);
        *counter += 1;
        id
    }
}

pub(crate) struct Session {
    pub id: String,
    pub ids: IdAllocator,
}

impl Session {
    /// Empty `configured` means a fresh random id.
    pub fn new(configured: &str) -> Self {
        let id = if configured.is_empty() {
            random_session_id()
        } else {
            configured.to_string()
        };
        Self {
            id,
            ids: IdAllocator::new(),
        }
    }
}

/// Eight lowercase alphanumerics.
pub fn random_session_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(|b| (b as char).to_ascii_lowercase())
        .collect()
}
