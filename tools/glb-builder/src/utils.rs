//! Utility functions for GLB construction

use gltf_json as json;

use crate::error::GlbError;

/// GLB header magic ("glTF")
pub const GLB_MAGIC: u32 = 0x4654_6C67;
/// GLB container version written in the header
pub const GLB_VERSION: u32 = 2;
/// JSON chunk type tag ("JSON")
pub const CHUNK_JSON: u32 = 0x4E4F_534A;
/// Binary chunk type tag ("BIN\0")
pub const CHUNK_BIN: u32 = 0x004E_4942;

const HEADER_LEN: usize = 12;
const CHUNK_HEADER_LEN: usize = 8;

/// Compute bounding box for positions
///
/// Non-finite components are left out so min/max stay valid JSON numbers.
/// An axis with no finite value gets 0.
pub fn compute_bounds(positions: &[[f32; 3]]) -> (Vec<f32>, Vec<f32>) {
    let mut min = [f32::INFINITY; 3];
    let mut max = [f32::NEG_INFINITY; 3];
    let mut skipped = 0usize;

    for pos in positions {
        for i in 0..3 {
            if pos[i].is_finite() {
                min[i] = min[i].min(pos[i]);
                max[i] = max[i].max(pos[i]);
            } else {
                skipped += 1;
            }
        }
    }
    if skipped > 0 {
        tracing::warn!(skipped, "Non-finite position components left out of bounds");
    }

    let (min, max): (Vec<f32>, Vec<f32>) = min
        .into_iter()
        .zip(max)
        .map(|(lo, hi)| if lo <= hi { (lo, hi) } else { (0.0, 0.0) })
        .unzip();
    (min, max)
}

/// Min and max over the finite values of a scalar stream, 0 when there are none
pub fn scalar_bounds(values: &[f32]) -> (f32, f32) {
    let finite = || values.iter().copied().filter(|v| v.is_finite());
    let skipped = values.len() - finite().count();
    if skipped > 0 {
        tracing::warn!(skipped, "Non-finite scalars left out of bounds");
    }

    let min = finite().fold(f32::INFINITY, f32::min);
    let max = finite().fold(f32::NEG_INFINITY, f32::max);
    if min <= max { (min, max) } else { (0.0, 0.0) }
}

/// Number of padding bytes needed to reach the next 4-byte boundary
pub fn padding_for(len: usize) -> usize {
    (4 - (len % 4)) % 4
}

/// Align buffer to 4-byte boundary with zero bytes
pub fn align_buffer(buffer: &mut Vec<u8>) {
    buffer.resize(buffer.len() + padding_for(buffer.len()), 0);
}

/// Assemble GLB binary from JSON and buffer data
///
/// Layout: 12-byte header, JSON chunk padded with spaces, BIN chunk padded
/// with zeros. The header length covers every byte including padding.
pub fn assemble_glb(root: &json::Root, buffer_data: &[u8]) -> Result<Vec<u8>, GlbError> {
    let json_string = json::serialize::to_string(root)?;
    let json_bytes = json_string.as_bytes();

    let json_padding = padding_for(json_bytes.len());
    let json_chunk_length = json_bytes.len() + json_padding;

    let buffer_padding = padding_for(buffer_data.len());
    let buffer_chunk_length = buffer_data.len() + buffer_padding;

    let total_length =
        HEADER_LEN + CHUNK_HEADER_LEN + json_chunk_length + CHUNK_HEADER_LEN + buffer_chunk_length;
    let total_u32 = u32::try_from(total_length).map_err(|_| GlbError::TooLarge(total_length))?;

    let mut glb = Vec::with_capacity(total_length);

    // Header
    glb.extend_from_slice(&GLB_MAGIC.to_le_bytes());
    glb.extend_from_slice(&GLB_VERSION.to_le_bytes());
    glb.extend_from_slice(&total_u32.to_le_bytes());

    // JSON chunk
    glb.extend_from_slice(&(json_chunk_length as u32).to_le_bytes());
    glb.extend_from_slice(&CHUNK_JSON.to_le_bytes());
    glb.extend_from_slice(json_bytes);
    glb.extend(std::iter::repeat_n(0x20u8, json_padding));

    // BIN chunk
    glb.extend_from_slice(&(buffer_chunk_length as u32).to_le_bytes());
    glb.extend_from_slice(&CHUNK_BIN.to_le_bytes());
    glb.extend_from_slice(buffer_data);
    glb.extend(std::iter::repeat_n(0u8, buffer_padding));

    debug_assert_eq!(glb.len(), total_length);
    tracing::debug!(
        json = json_chunk_length,
        bin = buffer_chunk_length,
        total = total_length,
        "assembled GLB"
    );

    Ok(glb)
}

/// Convert an optional JSON value into glTF `extras`
pub fn to_extras(value: Option<&serde_json::Value>) -> Result<json::extras::Extras, GlbError> {
    Ok(value.map(serde_json::value::to_raw_value).transpose()?)
}

/// Split a GLB container into its JSON text and binary chunk payload
///
/// Only the two-chunk layout produced by [`assemble_glb`] is understood.
pub fn split_glb(glb: &[u8]) -> Result<(&str, &[u8]), GlbError> {
    let word = |at: usize| -> Result<u32, GlbError> {
        glb.get(at..at + 4)
            .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .ok_or(GlbError::Truncated(at))
    };

    if word(0)? != GLB_MAGIC {
        return Err(GlbError::BadMagic);
    }
    let total = word(8)? as usize;
    if total != glb.len() {
        return Err(GlbError::LengthMismatch {
            header: total,
            actual: glb.len(),
        });
    }

    let json_len = word(12)? as usize;
    if word(16)? != CHUNK_JSON {
        return Err(GlbError::BadChunk(16));
    }
    let json_start = HEADER_LEN + CHUNK_HEADER_LEN;
    let json_bytes = glb
        .get(json_start..json_start + json_len)
        .ok_or(GlbError::Truncated(json_start))?;
    let json_text = std::str::from_utf8(json_bytes).map_err(|_| GlbError::BadChunk(json_start))?;

    let bin_header = json_start + json_len;
    let bin_len = word(bin_header)? as usize;
    if word(bin_header + 4)? != CHUNK_BIN {
        return Err(GlbError::BadChunk(bin_header + 4));
    }
    let bin_start = bin_header + CHUNK_HEADER_LEN;
    let bin = glb
        .get(bin_start..bin_start + bin_len)
        .ok_or(GlbError::Truncated(bin_start))?;

    Ok((json_text, bin))
}
