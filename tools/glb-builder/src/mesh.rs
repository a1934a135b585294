//! Triangle-list primitive construction

use crate::buffer::{AccessorIndex, BufferBuilder};

/// Accessor indices for one primitive
#[derive(Debug, Clone)]
pub struct MeshAccessors {
    pub positions: AccessorIndex,
    pub normals: Option<AccessorIndex>,
    pub uvs: Option<AccessorIndex>,
    pub joints: Option<AccessorIndex>,
    pub weights: Option<AccessorIndex>,
    pub indices: Option<AccessorIndex>,
    pub material: Option<u32>,
}

/// JOINTS_0/WEIGHTS_0 pair; one entry per vertex in each slice
#[derive(Clone, Copy)]
struct Skinning<'a> {
    joints: &'a [[u16; 4]],
    weights: &'a [[f32; 4]],
}

/// Borrows vertex streams for one primitive until they are packed
#[derive(Clone, Copy, Default)]
pub struct MeshBuilder<'a> {
    positions: &'a [[f32; 3]],
    normals: Option<&'a [[f32; 3]]>,
    uvs: Option<&'a [[f32; 2]]>,
    skinning: Option<Skinning<'a>>,
    indices: Option<&'a [u32]>,
    material: Option<u32>,
}

impl<'a> MeshBuilder<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn positions(self, positions: &'a [[f32; 3]]) -> Self {
        Self { positions, ..self }
    }

    pub fn normals(self, normals: &'a [[f32; 3]]) -> Self {
        Self {
            normals: Some(normals),
            ..self
        }
    }

    pub fn uvs(self, uvs: &'a [[f32; 2]]) -> Self {
        Self {
            uvs: Some(uvs),
            ..self
        }
    }

    /// Skinned primitives carry both streams or neither
    pub fn skinning(self, joints: &'a [[u16; 4]], weights: &'a [[f32; 4]]) -> Self {
        Self {
            skinning: Some(Skinning { joints, weights }),
            ..self
        }
    }

    pub fn indices(self, indices: &'a [u32]) -> Self {
        Self {
            indices: Some(indices),
            ..self
        }
    }

    pub fn material(self, material: Option<u32>) -> Self {
        Self { material, ..self }
    }

    /// Pack the streams in blob order: positions, normals, UVs, joints,
    /// weights, indices
    pub fn build(self, buffer: &mut BufferBuilder) -> MeshAccessors {
        let positions = buffer.pack_positions(self.positions);
        let normals = self.normals.map(|n| buffer.pack_vec3(n));
        let uvs = self.uvs.map(|uv| buffer.pack_vec2(uv));
        let joints = self.skinning.map(|s| buffer.pack_joints(s.joints));
        let weights = self.skinning.map(|s| buffer.pack_vec4(s.weights));
        let indices = self.indices.map(|i| buffer.pack_indices(i));

        MeshAccessors {
            positions,
            normals,
            uvs,
            joints,
            weights,
            indices,
            material: self.material,
        }
    }
}
