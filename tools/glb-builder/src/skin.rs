//! Skin (joint list + inverse bind matrices) construction

use crate::buffer::{AccessorIndex, BufferBuilder};

/// Packed skin data ready to be referenced from the document
#[derive(Debug, Clone)]
pub struct SkinAccessors {
    pub joints: Vec<u32>,
    pub skeleton: Option<u32>,
    pub inverse_bind_matrices: AccessorIndex,
}

/// Builder for a single skin
///
/// Joints and inverse bind matrices are pushed in lockstep so the i-th matrix
/// always belongs to the i-th joint.
pub struct SkinBuilder {
    joints: Vec<u32>,
    inverse_bind_matrices: Vec<[f32; 16]>,
    skeleton: Option<u32>,
}

impl SkinBuilder {
    pub fn new() -> Self {
        Self {
            joints: Vec::new(),
            inverse_bind_matrices: Vec::new(),
            skeleton: None,
        }
    }

    /// Add a joint node with its column-major inverse bind matrix
    pub fn joint(mut self, node: u32, inverse_bind_matrix: [f32; 16]) -> Self {
        self.joints.push(node);
        self.inverse_bind_matrices.push(inverse_bind_matrix);
        self
    }

    /// Set the skeleton root node
    pub fn skeleton(mut self, node: u32) -> Self {
        self.skeleton = Some(node);
        self
    }

    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    /// Pack the inverse bind matrices into the buffer
    pub fn build(self, buffer: &mut BufferBuilder) -> SkinAccessors {
        let inverse_bind_matrices = buffer.pack_mat4(&self.inverse_bind_matrices);
        SkinAccessors {
            joints: self.joints,
            skeleton: self.skeleton,
            inverse_bind_matrices,
        }
    }
}

impl Default for SkinBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IDENTITY_MAT4: [f32; 16] = [
        1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0,
    ];

    #[test]
    fn test_skin_builder() {
        let mut buffer = BufferBuilder::new();
        let builder = SkinBuilder::new()
            .joint(0, IDENTITY_MAT4)
            .joint(1, IDENTITY_MAT4)
            .skeleton(0);
        assert_eq!(builder.joint_count(), 2);

        let skin = builder.build(&mut buffer);
        assert_eq!(skin.inverse_bind_matrices, AccessorIndex(0));
        assert_eq!(skin.joints, vec![0, 1]);
        assert_eq!(skin.skeleton, Some(0));
        // 2 matrices * 64 bytes
        assert_eq!(buffer.data().len(), 128);
    }
}
