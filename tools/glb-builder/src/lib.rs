//! GLB container writer for the legacy model export tools
//!
//! This library provides builder-pattern APIs for constructing GLB files:
//! - BufferBuilder: Pack the binary blob with 4-byte alignment per view
//! - MeshBuilder: Triangle-list primitives with optional skinning
//! - SkinBuilder: Joint list and inverse bind matrices
//! - AnimationBuilder: LINEAR translation/rotation channels
//! - GltfBuilder: Top-level GLTF document with materials and textures
//!
//! # Example
//!
//! ```no_run
//! use glb_builder::*;
//!
//! let mut buffer = BufferBuilder::new();
//! let mesh = MeshBuilder::new()
//!     .positions(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.5, 1.0, 0.0]])
//!     .normals(&[[0.0, 0.0, 1.0]; 3])
//!     .indices(&[0, 1, 2])
//!     .build(&mut buffer);
//!
//! let mut gltf = GltfBuilder::new();
//! let mesh_index = gltf.add_mesh("Triangle", &[mesh]);
//! let mut node = named_node("Triangle");
//! node.mesh = Some(json::Index::new(mesh_index));
//! let root_node = gltf.add_node(node);
//! gltf.add_scene("Scene", &[root_node]);
//!
//! let root = gltf.build(&buffer, "glb-builder");
//! let glb_bytes = assemble_glb(&root, buffer.data()).unwrap();
//! ```

pub mod animation;
pub mod buffer;
pub mod document;
pub mod error;
pub mod material;
pub mod mesh;
pub mod skin;
pub mod utils;

pub use animation::{AnimationBuilder, TrackValues};
pub use buffer::{AccessorIndex, BufferBuilder, ViewRange};
pub use document::{GltfBuilder, named_node};
pub use error::GlbError;
pub use material::{MaterialSpec, TextureTable};
pub use mesh::{MeshAccessors, MeshBuilder};
pub use skin::{SkinAccessors, SkinBuilder};
pub use utils::{align_buffer, assemble_glb, compute_bounds, scalar_bounds, split_glb};

// Re-export commonly used gltf-json types
pub use gltf_json as json;
pub use gltf_json::validation::Checked::Valid;
