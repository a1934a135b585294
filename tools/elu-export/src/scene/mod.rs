//! Scene graph builder
//!
//! Links nodes by parent name, groups faces into primitives by resolved
//! material, resolves skin influences and computes inverse bind matrices.

mod builder;
pub mod material;
pub mod math;
mod skin;
mod types;

pub use builder::build_scene;
pub use skin::{VertexSkin, resolve_bone, resolve_vertex};
pub use types::{
    AlphaMode, ConversionSummary, NameIndex, Primitive, Scene, SceneMaterial, SceneNode,
};
