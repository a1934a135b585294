//! In-memory scene graph produced from a decoded mesh container

use crate::animation::AnimationClip;
use crate::error::Diagnostic;
use hashbrown::HashMap;
use serde::Serialize;

/// Finished scene ready for the container writer
#[derive(Debug, Clone)]
pub struct Scene {
    pub nodes: Vec<SceneNode>,
    /// Nodes whose parent name does not resolve
    pub roots: Vec<usize>,
    pub materials: Vec<SceneMaterial>,
    /// One inverse bind matrix per node when any node is skinned
    pub inverse_bind_matrices: Option<Vec<[f32; 16]>>,
    pub animations: Vec<AnimationClip>,
    pub names: NameIndex,
    pub diagnostics: Vec<Diagnostic>,
}

impl Scene {
    pub fn is_skinned(&self) -> bool {
        self.inverse_bind_matrices.is_some()
    }

    pub fn primitives(&self) -> impl Iterator<Item = &Primitive> {
        self.nodes.iter().flat_map(|n| n.primitives.iter())
    }

    pub fn summary(&self) -> ConversionSummary {
        ConversionSummary {
            material_count: self.materials.len(),
            node_count: self.nodes.len(),
            primitive_count: self.primitives().count(),
            vertex_count: self.primitives().map(|p| p.positions.len()).sum(),
            index_count: self.primitives().map(|p| p.indices.len()).sum(),
            animation_count: self.animations.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub name: String,
    /// Column-major local transform
    pub matrix: [f32; 16],
    pub children: Vec<usize>,
    pub primitives: Vec<Primitive>,
}

/// One triangle list sharing a material
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Primitive {
    pub material: Option<usize>,
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub joints: Vec<[u16; 4]>,
    pub weights: Vec<[f32; 4]>,
    pub indices: Vec<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlphaMode {
    Opaque,
    Mask,
    Blend,
}

/// Output material derived from a legacy material record
#[derive(Debug, Clone, PartialEq)]
pub struct SceneMaterial {
    pub name: String,
    pub roughness: f32,
    pub alpha_mode: AlphaMode,
    pub alpha_cutoff: Option<f32>,
    pub double_sided: bool,
    /// Resolved URI of the diffuse map
    pub base_color_texture: Option<String>,
    pub extras: serde_json::Value,
}

/// Counts reported per converted model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionSummary {
    pub material_count: usize,
    pub node_count: usize,
    pub primitive_count: usize,
    pub vertex_count: usize,
    pub index_count: usize,
    pub animation_count: usize,
}

/// Node name lookups, exact and lowercased; the first occurrence of a name wins
#[derive(Debug, Clone, Default)]
pub struct NameIndex {
    exact: HashMap<String, usize>,
    lower: HashMap<String, usize>,
    len: usize,
}

impl NameIndex {
    /// Index names in order, reporting every repeated name
    pub fn build(names: impl IntoIterator<Item = String>) -> (Self, Vec<Diagnostic>) {
        let mut index = NameIndex::default();
        let mut diagnostics = Vec::new();

        for (i, name) in names.into_iter().enumerate() {
            index.len += 1;
            index.lower.entry(name.to_lowercase()).or_insert(i);
            match index.exact.get(&name) {
                Some(&first) => diagnostics.push(Diagnostic::DuplicateNodeName {
                    name,
                    first,
                    duplicate: i,
                }),
                None => {
                    index.exact.insert(name, i);
                }
            }
        }

        (index, diagnostics)
    }

    pub fn exact(&self, name: &str) -> Option<usize> {
        self.exact.get(name).copied()
    }

    pub fn case_insensitive(&self, name: &str) -> Option<usize> {
        self.lower.get(&name.to_lowercase()).copied()
    }

    /// Number of indexed nodes, duplicates included
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
