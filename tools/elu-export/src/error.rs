//! Error and diagnostic types for legacy container conversion

use thiserror::Error;

/// Fatal decode failures for one container
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("signature mismatch: expected {expected:#010x}, found {found:#010x}")]
    FormatMismatch { expected: u32, found: u32 },

    #[error(
        "unexpected end of data at offset {offset}: requested {requested} bytes, {available} available"
    )]
    EndOfData {
        offset: usize,
        requested: usize,
        available: usize,
    },

    #[error("unsupported {container} layout: {detail}")]
    UnsupportedSchema {
        container: &'static str,
        detail: String,
    },
}

/// Per-target conversion failure
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("failed to decode mesh: {0}")]
    Mesh(#[from] DecodeError),

    #[error(transparent)]
    Glb(#[from] glb_builder::GlbError),
}

/// Non-fatal conditions found while building the scene
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Diagnostic {
    /// Inverse bind matrix replaced by identity
    DegenerateTransform { node: String },
    /// A later node reuses an earlier node's name; the first one wins lookups
    DuplicateNodeName {
        name: String,
        first: usize,
        duplicate: usize,
    },
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::DegenerateTransform { node } => {
                write!(f, "node '{node}' has a non-invertible base transform")
            }
            Diagnostic::DuplicateNodeName {
                name,
                first,
                duplicate,
            } => write!(
                f,
                "node name '{name}' used by nodes {first} and {duplicate}"
            ),
        }
    }
}
