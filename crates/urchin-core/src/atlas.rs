//! Brain atlas ontologies (`<atlas>.structures.json`).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::color::{sanitize_color, Color};

#[derive(Debug, thiserror::Error)]
pub enum OntologyError {
    #[error("failed to read {0}: {1}")]
    ReadFailed(PathBuf, std::io::Error),
    #[error("failed to parse ontology: {0}")]
    ParseFailed(#[from] serde_json::Error),
    #[error("duplicate acronym {0}")]
    DuplicateAcronym(String),
    #[error("structure {acronym} has an invalid color: {source}")]
    BadColor {
        acronym: String,
        source: crate::sanitize::SanitizeError,
    },
}

/// One brain region.
#[derive(Debug, Clone, PartialEq)]
pub struct Structure {
    pub id: u32,
    pub acronym: String,
    pub name: String,
    pub rgb_triplet: [u8; 3],
    /// Ancestor ids from the root down to this structure.
    pub structure_id_path: Vec<u32>,
    pub color: Color,
}

#[derive(Deserialize)]
struct RawStructure {
    id: u32,
    acronym: String,
    #[serde(default)]
    name: String,
    rgb_triplet: [u8; 3],
    #[serde(default, alias = "path")]
    structure_id_path: PathField,
}

/// Allen files store the path either as a list or as "/997/8/567/".
#[derive(Deserialize, Default)]
#[serde(untagged)]
enum PathField {
    List(Vec<u32>),
    Text(String),
    #[default]
    Missing,
}

impl PathField {
    fn into_ids(self) -> Vec<u32> {
        match self {
            PathField::List(ids) => ids,
            PathField::Text(s) => s.split('/').filter_map(|p| p.parse().ok()).collect(),
            PathField::Missing => Vec::new(),
        }
    }
}

/// All structures of an atlas, in file order, with acronym lookup.
#[derive(Debug, Clone)]
pub struct Ontology {
    name: String,
    structures: Vec<Structure>,
    by_acronym: HashMap<String, usize>,
}

impl Ontology {
    pub fn from_json(name: &str, text: &str) -> Result<Self, OntologyError> {
        let raw: Vec<RawStructure> = serde_json::from_str(text)?;
        let mut structures = Vec::with_capacity(raw.len());
        let mut by_acronym = HashMap::with_capacity(raw.len());
        for r in raw {
            if by_acronym.contains_key(&r.acronym) {
                return Err(OntologyError::DuplicateAcronym(r.acronym));
            }
            let color = sanitize_color(r.rgb_triplet).map_err(|source| OntologyError::BadColor {
                acronym: r.acronym.clone(),
                source,
            })?;
            by_acronym.insert(r.acronym.clone(), structures.len());
            structures.push(Structure {
                id: r.id,
                acronym: r.acronym,
                name: r.name,
                rgb_triplet: r.rgb_triplet,
                structure_id_path: r.structure_id_path.into_ids(),
                color,
            });
        }
        Ok(Self {
            name: name.to_string(),
            structures,
            by_acronym,
        })
    }

    /// Load `<dir>/<name>.structures.json`.
    pub fn load(dir: &Path, name: &str) -> Result<Self, OntologyError> {
        let path = dir.join(format!("{name}.structures.json"));
        let text =
            std::fs::read_to_string(&path).map_err(|e| OntologyError::ReadFailed(path.clone(), e))?;
        Self::from_json(name, &text)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, acronym: &str) -> Option<&Structure> {
        self.by_acronym.get(acronym).map(|&i| &self.structures[i])
    }

    pub fn acronyms(&self) -> impl Iterator<Item = &str> {
        self.structures.iter().map(|s| s.acronym.as_str())
    }

    pub fn structures(&self) -> &[Structure] {
        &self.structures
    }

    pub fn len(&self) -> usize {
        self.structures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.structures.is_empty()
    }
}
