//! Animation container decoder

use crate::animation::types::{
    AniFile, AniNodeSummary, BoneTrack, PositionKey, RotationKey,
};
use crate::error::DecodeError;
use crate::formats::{AniSchema, AnimationKind, EXPORTER_SIG, NAME_LEN};
use crate::reader::ByteReader;

/// Bytes per matrix-track key (matrix + frame)
const MATRIX_KEY_LEN: usize = 64 + 4;

/// Bytes per visibility key (value + frame)
const VISIBILITY_KEY_LEN: usize = 4 + 4;

/// Animation container header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AniHeader {
    pub version: u32,
    pub max_frame: i32,
    pub node_count: usize,
    pub kind: AnimationKind,
}

/// Decode a complete animation container
pub fn decode_ani(data: &[u8]) -> Result<AniFile, DecodeError> {
    let mut r = ByteReader::new(data);
    let header = read_header(&mut r)?;
    let schema = AniSchema(header.version);

    let mut bones = Vec::new();
    let mut summaries = Vec::new();

    for _ in 0..header.node_count {
        match header.kind {
            AnimationKind::Bone => bones.push(read_bone(&mut r, schema)?),
            AnimationKind::MatrixTrack => summaries.push(read_matrix_track(&mut r, schema)?),
            AnimationKind::Vertex => summaries.push(read_vertex_track(&mut r, schema)?),
        }
    }

    tracing::debug!(
        version = header.version,
        kind = ?header.kind,
        nodes = header.node_count,
        "decoded animation container"
    );

    Ok(AniFile {
        version: header.version,
        max_frame: header.max_frame,
        kind: header.kind,
        bones,
        summaries,
    })
}

/// Read and validate the header
pub fn read_header(r: &mut ByteReader<'_>) -> Result<AniHeader, DecodeError> {
    let signature = r.u32()?;
    if signature != EXPORTER_SIG {
        return Err(DecodeError::FormatMismatch {
            expected: EXPORTER_SIG,
            found: signature,
        });
    }
    let version = r.u32()?;
    let max_frame = r.i32()?;
    let node_count = r.count()?;
    let raw_kind = r.i32()?;
    let kind = AnimationKind::from_raw(raw_kind).ok_or_else(|| DecodeError::UnsupportedSchema {
        container: "animation",
        detail: format!("unknown animation type {raw_kind}"),
    })?;

    Ok(AniHeader {
        version,
        max_frame,
        node_count,
        kind,
    })
}

/// Convert an angle (radians) about an axis into an (x, y, z, w) quaternion
///
/// The axis is used as stored, without normalization.
pub fn angle_axis_to_quat(axis: [f32; 3], angle: f32) -> [f32; 4] {
    let half = f64::from(angle) * 0.5;
    let (s, c) = half.sin_cos();
    [
        (f64::from(axis[0]) * s) as f32,
        (f64::from(axis[1]) * s) as f32,
        (f64::from(axis[2]) * s) as f32,
        c as f32,
    ]
}

fn read_bone(r: &mut ByteReader<'_>, schema: AniSchema) -> Result<BoneTrack, DecodeError> {
    let name = r.fixed_string(NAME_LEN)?;
    let base_matrix = r.mat4()?;

    let position_count = r.count()?;
    let mut position_keys = Vec::with_capacity(position_count.min(r.remaining() / 16));
    for _ in 0..position_count {
        let value = r.vec3()?;
        let frame = r.i32()?;
        position_keys.push(PositionKey { frame, value });
    }

    let rotation_count = r.count()?;
    let mut rotation_keys = Vec::with_capacity(rotation_count.min(r.remaining() / 20));
    for _ in 0..rotation_count {
        let [x, y, z, w] = r.vec4()?;
        let frame = r.i32()?;
        let value = if schema.rotation_is_angle_axis() {
            angle_axis_to_quat([x, y, z], w)
        } else {
            [x, y, z, w]
        };
        rotation_keys.push(RotationKey { frame, value });
    }

    let visibility_key_count = skip_visibility_keys(r, schema)?;

    Ok(BoneTrack {
        name,
        base_matrix,
        position_keys,
        rotation_keys,
        visibility_key_count,
    })
}

fn read_matrix_track(
    r: &mut ByteReader<'_>,
    schema: AniSchema,
) -> Result<AniNodeSummary, DecodeError> {
    let name = r.fixed_string(NAME_LEN)?;
    let key_count = r.count()?;
    r.skip_records(key_count, MATRIX_KEY_LEN)?;
    let visibility_key_count = skip_visibility_keys(r, schema)?;

    Ok(AniNodeSummary {
        name,
        key_count,
        vertex_count: 0,
        visibility_key_count,
    })
}

fn read_vertex_track(
    r: &mut ByteReader<'_>,
    schema: AniSchema,
) -> Result<AniNodeSummary, DecodeError> {
    let name = r.fixed_string(NAME_LEN)?;
    let vertex_count = r.count()?;
    let frame_count = r.count()?;
    // frame table, then one vec3 per vertex per frame
    r.skip_records(vertex_count, 4)?;
    for _ in 0..vertex_count {
        r.skip_records(frame_count, 12)?;
    }
    let visibility_key_count = skip_visibility_keys(r, schema)?;

    Ok(AniNodeSummary {
        name,
        key_count: frame_count,
        vertex_count,
        visibility_key_count,
    })
}

fn skip_visibility_keys(r: &mut ByteReader<'_>, schema: AniSchema) -> Result<usize, DecodeError> {
    if !schema.has_visibility_keys() {
        return Ok(0);
    }
    let count = r.u32()? as usize;
    r.skip_records(count, VISIBILITY_KEY_LEN)?;
    Ok(count)
}
