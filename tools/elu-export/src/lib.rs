//! elu-export library
//!
//! Converts legacy ELU mesh containers and their ANI animation clips into
//! self-contained GLB files. The in-memory pipeline is [`convert_to_memory`];
//! [`manifest`] drives batch conversion from an assets.toml file.

pub mod animation;
pub mod convert;
pub mod error;
pub mod export;
pub mod formats;
pub mod inspect;
pub mod manifest;
pub mod mesh;
pub mod reader;
pub mod scene;
pub mod texture;

pub use animation::{ClipReport, ClipSource, ClipStatus};
pub use convert::{ConvertOptions, ConvertedModel, convert_to_memory};
pub use error::{ConvertError, DecodeError, Diagnostic};
pub use texture::{FsTextureResolver, NoTextures, TextureResolver};
