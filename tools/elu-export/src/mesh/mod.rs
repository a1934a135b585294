//! Mesh container (ELU) decoding
//!
//! The container holds a material table followed by node records. Each node
//! carries its base transform, points, faces and optional per-point skin
//! influences. Which fields are present depends on the version word; see
//! [`crate::formats::MeshSchema`].

mod decode;
mod types;

pub use decode::{EluHeader, decode_elu, read_header};
pub use types::{EluFace, EluMaterial, EluModel, EluNode, InfluenceRecord};
