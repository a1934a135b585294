//! Decoded mesh container model

use crate::formats::{MAX_INFLUENCES, MaterialFlags};

/// Decoded mesh container
#[derive(Debug, Clone)]
pub struct EluModel {
    pub version: u32,
    pub materials: Vec<EluMaterial>,
    pub nodes: Vec<EluNode>,
}

/// One material table entry
#[derive(Debug, Clone)]
pub struct EluMaterial {
    pub id: i32,
    /// -1 for a base material, otherwise the sub-material slot
    pub sub_id: i32,
    /// Declared sub-material count (meaningful on base entries)
    pub sub_count: i32,
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    /// Stored power scaled by 100
    pub power: f32,
    pub diffuse_map: String,
    pub opacity_map: String,
    pub alpha_test_value: i32,
    pub flags: MaterialFlags,
}

/// One node record: transform, geometry and skin influences
#[derive(Debug, Clone)]
pub struct EluNode {
    pub name: String,
    /// Empty when the node is a root
    pub parent: String,
    /// Base local transform in stored (row-major) order
    pub base_matrix: [f32; 16],
    pub pivot_scale: [f32; 3],
    pub points: Vec<[f32; 3]>,
    pub faces: Vec<EluFace>,
    pub material_id: i32,
    /// One record per point when the node is skinned
    pub influences: Vec<InfluenceRecord>,
}

impl EluNode {
    pub fn is_skinned(&self) -> bool {
        !self.influences.is_empty()
    }

    pub fn has_geometry(&self) -> bool {
        !self.points.is_empty() && !self.faces.is_empty()
    }
}

/// One triangle
#[derive(Debug, Clone, PartialEq)]
pub struct EluFace {
    pub point_indices: [i32; 3],
    /// Per-corner UVW; only u and v are used
    pub uvs: [[f32; 3]; 3],
    /// Sub-material selector
    pub material_selector: i32,
    pub smoothing_group: i32,
    pub face_normal: Option<[f32; 3]>,
    pub corner_normals: Option<[[f32; 3]; 3]>,
}

/// Skin influences of one point
#[derive(Debug, Clone, PartialEq)]
pub struct InfluenceRecord {
    pub bone_names: [String; MAX_INFLUENCES],
    pub weights: [f32; MAX_INFLUENCES],
    pub bone_ids: [i32; MAX_INFLUENCES],
    /// Number of slots in use; may be out of range in damaged files
    pub used: i32,
    pub offsets: [[f32; 3]; MAX_INFLUENCES],
}

impl InfluenceRecord {
    /// Slots to consider: min(4, max(0, used))
    pub fn slot_count(&self) -> usize {
        (self.used.max(0) as usize).min(MAX_INFLUENCES)
    }
}
