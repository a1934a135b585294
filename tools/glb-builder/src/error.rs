//! GLB writer error types

use thiserror::Error;

/// Errors raised while assembling or splitting a GLB container
#[derive(Debug, Error)]
pub enum GlbError {
    #[error("failed to serialize glTF JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("GLB output of {0} bytes exceeds the 32-bit length field")]
    TooLarge(usize),

    #[error("not a GLB container (bad magic)")]
    BadMagic,

    #[error("GLB header length {header} does not match buffer length {actual}")]
    LengthMismatch { header: usize, actual: usize },

    #[error("unexpected chunk header at offset {0}")]
    BadChunk(usize),

    #[error("GLB truncated at offset {0}")]
    Truncated(usize),
}
