//! Mesh container decoder

use crate::error::DecodeError;
use crate::formats::{
    EXPORTER_SIG, FACE_NORMAL_RECORD_LEN, INFLUENCE_RECORD_LEN, MAX_INFLUENCES, MaterialFlags,
    MeshSchema, NAME_LEN,
};
use crate::mesh::types::{EluFace, EluMaterial, EluModel, EluNode, InfluenceRecord};
use crate::reader::ByteReader;

/// Mesh container header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EluHeader {
    pub version: u32,
    pub material_count: usize,
    pub node_count: usize,
}

/// Decode a complete mesh container
pub fn decode_elu(data: &[u8]) -> Result<EluModel, DecodeError> {
    let mut r = ByteReader::new(data);
    let header = read_header(&mut r)?;
    let schema = MeshSchema(header.version);

    let mut materials = Vec::with_capacity(header.material_count.min(r.remaining() / 64));
    for _ in 0..header.material_count {
        materials.push(read_material(&mut r, schema)?);
    }

    let mut nodes = Vec::with_capacity(header.node_count.min(r.remaining() / 128));
    for _ in 0..header.node_count {
        let node = read_node(&mut r, schema)?;
        tracing::debug!(
            name = %node.name,
            points = node.points.len(),
            faces = node.faces.len(),
            influences = node.influences.len(),
            "decoded mesh node"
        );
        nodes.push(node);
    }

    if r.remaining() > 0 {
        tracing::debug!(trailing = r.remaining(), "mesh container has trailing bytes");
    }

    Ok(EluModel {
        version: header.version,
        materials,
        nodes,
    })
}

/// Read and validate the header
pub fn read_header(r: &mut ByteReader<'_>) -> Result<EluHeader, DecodeError> {
    let signature = r.u32()?;
    if signature != EXPORTER_SIG {
        return Err(DecodeError::FormatMismatch {
            expected: EXPORTER_SIG,
            found: signature,
        });
    }
    let version = r.u32()?;
    let material_count = r.count()?;
    let node_count = r.count()?;

    Ok(EluHeader {
        version,
        material_count,
        node_count,
    })
}

fn read_texture_name(r: &mut ByteReader<'_>, schema: MeshSchema) -> Result<String, DecodeError> {
    Ok(r.fixed_string(schema.texture_name_len())?.replace('\\', "/"))
}

fn read_material(r: &mut ByteReader<'_>, schema: MeshSchema) -> Result<EluMaterial, DecodeError> {
    let id = r.i32()?;
    let sub_id = r.i32()?;
    let ambient = r.vec4()?;
    let diffuse = r.vec4()?;
    let specular = r.vec4()?;
    let power = r.f32()? * 100.0;
    let sub_count = r.i32()?;
    let diffuse_map = read_texture_name(r, schema)?;
    let opacity_map = read_texture_name(r, schema)?;

    let two_sided = schema.has_two_sided() && r.i32()? != 0;
    let additive = schema.has_additive() && r.i32()? != 0;
    let alpha_test_value = if schema.has_alpha_test() { r.i32()? } else { 0 };

    let mut flags = MaterialFlags::empty();
    flags.set(MaterialFlags::USE_OPACITY, !opacity_map.is_empty());
    flags.set(MaterialFlags::USE_ALPHA_TEST, alpha_test_value != 0);
    flags.set(MaterialFlags::ADDITIVE, additive);
    flags.set(MaterialFlags::TWO_SIDED, two_sided);

    Ok(EluMaterial {
        id,
        sub_id,
        sub_count,
        ambient,
        diffuse,
        specular,
        power,
        diffuse_map,
        opacity_map,
        alpha_test_value,
        flags,
    })
}

fn read_node(r: &mut ByteReader<'_>, schema: MeshSchema) -> Result<EluNode, DecodeError> {
    let name = r.fixed_string(NAME_LEN)?;
    let parent = r.fixed_string(NAME_LEN)?;
    let base_matrix = r.mat4()?;

    let pivot_scale = if schema.has_pivot_scale() {
        r.vec3()?
    } else {
        [1.0, 1.0, 1.0]
    };

    if schema.has_axis_block() {
        // axis rotation + angle, axis scale + angle, extra matrix
        r.skip(12 + 4 + 12 + 4 + 64)?;
    }

    let point_count = r.count()?;
    let mut points = Vec::with_capacity(point_count.min(r.remaining() / 12));
    for _ in 0..point_count {
        points.push(r.vec3()?);
    }

    let face_count = r.count()?;
    let faces = read_faces(r, schema, face_count)?;

    if schema.has_point_colors() {
        let color_count = r.count()?;
        r.skip_records(color_count, 12)?;
    }

    let material_id = r.i32()?;
    let influence_count = r.count()?;
    let mut influences =
        Vec::with_capacity(influence_count.min(r.remaining() / INFLUENCE_RECORD_LEN));
    for _ in 0..influence_count {
        influences.push(read_influence(r)?);
    }

    Ok(EluNode {
        name,
        parent,
        base_matrix,
        pivot_scale,
        points,
        faces,
        material_id,
        influences,
    })
}

fn read_faces(
    r: &mut ByteReader<'_>,
    schema: MeshSchema,
    count: usize,
) -> Result<Vec<EluFace>, DecodeError> {
    let mut faces = Vec::with_capacity(count.min(r.remaining() / schema.face_record_len()));
    for _ in 0..count {
        let point_indices = [r.i32()?, r.i32()?, r.i32()?];
        let uvs = [r.vec3()?, r.vec3()?, r.vec3()?];
        let material_selector = r.i32()?;
        let smoothing_group = if schema.has_smoothing_group() {
            r.i32()?
        } else {
            0
        };
        faces.push(EluFace {
            point_indices,
            uvs,
            material_selector,
            smoothing_group,
            face_normal: None,
            corner_normals: None,
        });
    }

    if schema.has_face_normals() {
        if r.remaining() < count.saturating_mul(FACE_NORMAL_RECORD_LEN) {
            return Err(DecodeError::EndOfData {
                offset: r.position(),
                requested: count.saturating_mul(FACE_NORMAL_RECORD_LEN),
                available: r.remaining(),
            });
        }
        for face in &mut faces {
            face.face_normal = Some(r.vec3()?);
            face.corner_normals = Some([r.vec3()?, r.vec3()?, r.vec3()?]);
        }
    }

    Ok(faces)
}

fn read_influence(r: &mut ByteReader<'_>) -> Result<InfluenceRecord, DecodeError> {
    let bone_names = [
        r.fixed_string(NAME_LEN)?,
        r.fixed_string(NAME_LEN)?,
        r.fixed_string(NAME_LEN)?,
        r.fixed_string(NAME_LEN)?,
    ];
    let mut weights = [0.0; MAX_INFLUENCES];
    for w in &mut weights {
        *w = r.f32()?;
    }
    let mut bone_ids = [0; MAX_INFLUENCES];
    for id in &mut bone_ids {
        *id = r.i32()?;
    }
    let used = r.i32()?;
    let offsets = [r.vec3()?, r.vec3()?, r.vec3()?, r.vec3()?];

    Ok(InfluenceRecord {
        bone_names,
        weights,
        bone_ids,
        used,
        offsets,
    })
}
