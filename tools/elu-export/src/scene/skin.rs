//! Per-vertex skin influence resolution

use crate::formats::MAX_INFLUENCES;
use crate::mesh::InfluenceRecord;
use crate::scene::types::NameIndex;

const WEIGHT_SUM_EPSILON: f32 = 1e-8;

/// Resolved joints and weights of one vertex
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexSkin {
    pub joints: [usize; MAX_INFLUENCES],
    pub weights: [f32; MAX_INFLUENCES],
}

impl VertexSkin {
    /// Full weight on a single bone
    pub fn rigid(bone: usize) -> Self {
        Self {
            joints: [bone, 0, 0, 0],
            weights: [1.0, 0.0, 0.0, 0.0],
        }
    }
}

/// Resolve a bone reference: exact name, then case-insensitive name, then id
pub fn resolve_bone(names: &NameIndex, name: &str, id: i32) -> Option<usize> {
    let name = name.trim();
    if let Some(index) = names.exact(name) {
        return Some(index);
    }
    if !name.is_empty() {
        if let Some(index) = names.case_insensitive(name) {
            return Some(index);
        }
    }
    usize::try_from(id).ok().filter(|&i| i < names.len())
}

/// Resolve the influences of one vertex owned by node `own_bone`
///
/// Unresolved and non-positive influences are dropped. Survivors are padded
/// with `(own_bone, 0)` and renormalized. With no survivors the vertex is
/// bound rigidly to `own_bone`.
pub fn resolve_vertex(
    record: Option<&InfluenceRecord>,
    names: &NameIndex,
    own_bone: usize,
) -> VertexSkin {
    let Some(record) = record else {
        return VertexSkin::rigid(own_bone);
    };

    let mut joints = [own_bone; MAX_INFLUENCES];
    let mut weights = [0.0f32; MAX_INFLUENCES];
    let mut used = 0;

    for slot in 0..record.slot_count() {
        let weight = record.weights[slot];
        if weight <= 0.0 || weight.is_nan() {
            continue;
        }
        let Some(bone) = resolve_bone(names, &record.bone_names[slot], record.bone_ids[slot])
        else {
            continue;
        };
        joints[used] = bone;
        weights[used] = weight;
        used += 1;
    }

    if used == 0 {
        return VertexSkin::rigid(own_bone);
    }

    let sum: f32 = weights.iter().sum();
    let divisor = if sum > WEIGHT_SUM_EPSILON { sum } else { 1.0 };
    for w in &mut weights {
        *w /= divisor;
    }

    VertexSkin { joints, weights }
}
