//! Binary blob packing with 4-byte pre-alignment and accessor creation
//!
//! Every append pads the blob to a 4-byte boundary with zero bytes *before*
//! the payload is written, then records a buffer view over exactly the
//! payload bytes. The blob itself is left unpadded at the end; the GLB
//! assembler pads the binary chunk.

use crate::utils::{align_buffer, compute_bounds, scalar_bounds};
use gltf_json as json;
use gltf_json::validation::Checked::Valid;

/// Accessor index returned by buffer operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessorIndex(pub u32);

impl AccessorIndex {
    pub fn as_json_index(&self) -> json::Index<json::Accessor> {
        json::Index::new(self.0)
    }
}

/// Byte range of one buffer view inside the blob
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewRange {
    pub offset: usize,
    pub length: usize,
}

/// Builder for the single binary buffer of a GLB document
pub struct BufferBuilder {
    buffer: Vec<u8>,
    ranges: Vec<ViewRange>,
    views: Vec<json::buffer::View>,
    accessors: Vec<json::Accessor>,
}

impl BufferBuilder {
    /// Create a new empty buffer builder
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            ranges: Vec::new(),
            views: Vec::new(),
            accessors: Vec::new(),
        }
    }

    /// Get the current accessor count
    pub fn accessor_count(&self) -> u32 {
        self.accessors.len() as u32
    }

    /// Get the binary buffer data (unpadded)
    pub fn data(&self) -> &[u8] {
        &self.buffer
    }

    /// Get the buffer views
    pub fn views(&self) -> &[json::buffer::View] {
        &self.views
    }

    /// Byte ranges of all views, in creation order
    pub fn view_ranges(&self) -> &[ViewRange] {
        &self.ranges
    }

    /// Get the accessors
    pub fn accessors(&self) -> &[json::Accessor] {
        &self.accessors
    }

    /// Pack Vec3 positions with bounds calculation
    pub fn pack_positions(&mut self, positions: &[[f32; 3]]) -> AccessorIndex {
        let bytes = f32_bytes(bytemuck::cast_slice(positions));
        let view = self.push_view(&bytes, Some(json::buffer::Target::ArrayBuffer));
        let (min, max) = compute_bounds(positions);
        self.push_accessor(
            view,
            positions.len(),
            json::accessor::ComponentType::F32,
            json::accessor::Type::Vec3,
            Some((min, max)),
        )
    }

    /// Pack Vec3 vertex attributes (normals)
    pub fn pack_vec3(&mut self, data: &[[f32; 3]]) -> AccessorIndex {
        let bytes = f32_bytes(bytemuck::cast_slice(data));
        let view = self.push_view(&bytes, Some(json::buffer::Target::ArrayBuffer));
        self.push_accessor(
            view,
            data.len(),
            json::accessor::ComponentType::F32,
            json::accessor::Type::Vec3,
            None,
        )
    }

    /// Pack Vec2 vertex attributes (UVs)
    pub fn pack_vec2(&mut self, data: &[[f32; 2]]) -> AccessorIndex {
        let bytes = f32_bytes(bytemuck::cast_slice(data));
        let view = self.push_view(&bytes, Some(json::buffer::Target::ArrayBuffer));
        self.push_accessor(
            view,
            data.len(),
            json::accessor::ComponentType::F32,
            json::accessor::Type::Vec2,
            None,
        )
    }

    /// Pack Vec4 vertex attributes (weights)
    pub fn pack_vec4(&mut self, data: &[[f32; 4]]) -> AccessorIndex {
        let bytes = f32_bytes(bytemuck::cast_slice(data));
        let view = self.push_view(&bytes, Some(json::buffer::Target::ArrayBuffer));
        self.push_accessor(
            view,
            data.len(),
            json::accessor::ComponentType::F32,
            json::accessor::Type::Vec4,
            None,
        )
    }

    /// Pack joint indices (Vec4<u16>)
    pub fn pack_joints(&mut self, joints: &[[u16; 4]]) -> AccessorIndex {
        let bytes: Vec<u8> = joints
            .iter()
            .flatten()
            .flat_map(|j| j.to_le_bytes())
            .collect();
        let view = self.push_view(&bytes, Some(json::buffer::Target::ArrayBuffer));
        self.push_accessor(
            view,
            joints.len(),
            json::accessor::ComponentType::U16,
            json::accessor::Type::Vec4,
            None,
        )
    }

    /// Pack triangle-list indices
    ///
    /// Stored as u16 when every index fits, otherwise as u32.
    pub fn pack_indices(&mut self, indices: &[u32]) -> AccessorIndex {
        let max_index = indices.iter().copied().max().unwrap_or(0);
        let (bytes, component) = if max_index <= u16::MAX as u32 {
            let bytes: Vec<u8> = indices
                .iter()
                .flat_map(|&i| (i as u16).to_le_bytes())
                .collect();
            (bytes, json::accessor::ComponentType::U16)
        } else {
            let bytes: Vec<u8> = indices.iter().flat_map(|i| i.to_le_bytes()).collect();
            (bytes, json::accessor::ComponentType::U32)
        };

        let view = self.push_view(&bytes, Some(json::buffer::Target::ElementArrayBuffer));
        self.push_accessor(
            view,
            indices.len(),
            component,
            json::accessor::Type::Scalar,
            None,
        )
    }

    /// Pack Mat4 data (inverse bind matrices)
    pub fn pack_mat4(&mut self, matrices: &[[f32; 16]]) -> AccessorIndex {
        let bytes = f32_bytes(bytemuck::cast_slice(matrices));
        let view = self.push_view(&bytes, None);
        self.push_accessor(
            view,
            matrices.len(),
            json::accessor::ComponentType::F32,
            json::accessor::Type::Mat4,
            None,
        )
    }

    /// Pack animation output values (translations)
    pub fn pack_track_vec3(&mut self, data: &[[f32; 3]]) -> AccessorIndex {
        let bytes = f32_bytes(bytemuck::cast_slice(data));
        let view = self.push_view(&bytes, None);
        self.push_accessor(
            view,
            data.len(),
            json::accessor::ComponentType::F32,
            json::accessor::Type::Vec3,
            None,
        )
    }

    /// Pack animation output values (rotations)
    pub fn pack_track_vec4(&mut self, data: &[[f32; 4]]) -> AccessorIndex {
        let bytes = f32_bytes(bytemuck::cast_slice(data));
        let view = self.push_view(&bytes, None);
        self.push_accessor(
            view,
            data.len(),
            json::accessor::ComponentType::F32,
            json::accessor::Type::Vec4,
            None,
        )
    }

    /// Pack scalar f32 data with min/max (animation times)
    pub fn pack_scalars_with_bounds(&mut self, scalars: &[f32]) -> AccessorIndex {
        let bytes = f32_bytes(scalars);
        let view = self.push_view(&bytes, None);

        let (min_val, max_val) = scalar_bounds(scalars);

        self.push_accessor(
            view,
            scalars.len(),
            json::accessor::ComponentType::F32,
            json::accessor::Type::Scalar,
            Some((vec![min_val], vec![max_val])),
        )
    }

    /// Align, append, and record a buffer view over the appended bytes
    fn push_view(
        &mut self,
        bytes: &[u8],
        target: Option<json::buffer::Target>,
    ) -> json::Index<json::buffer::View> {
        align_buffer(&mut self.buffer);
        let offset = self.buffer.len();
        self.buffer.extend_from_slice(bytes);

        self.ranges.push(ViewRange {
            offset,
            length: bytes.len(),
        });
        self.views.push(json::buffer::View {
            buffer: json::Index::new(0),
            byte_length: bytes.len().into(),
            byte_offset: Some((offset as u64).into()),
            byte_stride: None,
            extensions: Default::default(),
            extras: Default::default(),
            name: None,
            target: target.map(Valid),
        });

        json::Index::new(self.views.len() as u32 - 1)
    }

    fn push_accessor(
        &mut self,
        view: json::Index<json::buffer::View>,
        count: usize,
        component: json::accessor::ComponentType,
        type_: json::accessor::Type,
        bounds: Option<(Vec<f32>, Vec<f32>)>,
    ) -> AccessorIndex {
        let (min, max) = match bounds {
            Some((min, max)) => (
                Some(json::Value::Array(
                    min.into_iter().map(json::Value::from).collect(),
                )),
                Some(json::Value::Array(
                    max.into_iter().map(json::Value::from).collect(),
                )),
            ),
            None => (None, None),
        };

        let accessor_idx = self.accessors.len() as u32;
        self.accessors.push(json::Accessor {
            buffer_view: Some(view),
            byte_offset: Some(0u64.into()),
            count: count.into(),
            component_type: Valid(json::accessor::GenericComponentType(component)),
            extensions: Default::default(),
            extras: Default::default(),
            type_: Valid(type_),
            min,
            max,
            name: None,
            normalized: false,
            sparse: None,
        });

        AccessorIndex(accessor_idx)
    }
}

impl Default for BufferBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn f32_bytes(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}
