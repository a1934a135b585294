//! Programmatic legacy container generation for integration tests.
//!
//! Writes ELU mesh and ANI animation byte buffers for any schema version,
//! emitting exactly the fields that version carries.

#![allow(dead_code)]

use elu_export::formats::{AniSchema, EXPORTER_SIG, MeshSchema, NAME_LEN};

pub const IDENTITY: [f32; 16] = [
    1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0,
];

/// Stored (row-major) matrix translating by `t`
pub fn translation(t: [f32; 3]) -> [f32; 16] {
    let mut m = IDENTITY;
    m[3] = t[0];
    m[7] = t[1];
    m[11] = t[2];
    m
}

#[derive(Debug, Clone)]
pub struct MaterialDef {
    pub id: i32,
    pub sub_id: i32,
    pub sub_count: i32,
    pub power: f32,
    pub diffuse_map: String,
    pub opacity_map: String,
    pub two_sided: bool,
    pub additive: bool,
    pub alpha_test: i32,
}

impl MaterialDef {
    pub fn base(id: i32) -> Self {
        Self {
            id,
            sub_id: -1,
            sub_count: 0,
            power: 0.2,
            diffuse_map: String::new(),
            opacity_map: String::new(),
            two_sided: false,
            additive: false,
            alpha_test: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FaceDef {
    pub indices: [i32; 3],
    pub uvs: [[f32; 3]; 3],
    pub selector: i32,
}

impl FaceDef {
    pub fn new(indices: [i32; 3]) -> Self {
        Self {
            indices,
            uvs: [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            selector: 0,
        }
    }
}

/// Up to four (bone name, weight, bone id) slots
#[derive(Debug, Clone, Default)]
pub struct InfluenceDef {
    pub slots: Vec<(String, f32, i32)>,
}

impl InfluenceDef {
    pub fn rigid(bone: &str) -> Self {
        Self {
            slots: vec![(bone.to_string(), 1.0, 0)],
        }
    }
}

#[derive(Debug, Clone)]
pub struct NodeDef {
    pub name: String,
    pub parent: String,
    /// Stored row-major
    pub matrix: [f32; 16],
    pub points: Vec<[f32; 3]>,
    pub faces: Vec<FaceDef>,
    pub material_id: i32,
    pub influences: Vec<InfluenceDef>,
}

impl NodeDef {
    pub fn new(name: &str, parent: &str) -> Self {
        Self {
            name: name.to_string(),
            parent: parent.to_string(),
            matrix: IDENTITY,
            points: Vec::new(),
            faces: Vec::new(),
            material_id: 0,
            influences: Vec::new(),
        }
    }

    /// One triangle in the XY plane
    pub fn with_triangle(mut self) -> Self {
        self.points = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        self.faces = vec![FaceDef::new([0, 1, 2])];
        self
    }
}

/// Little-endian byte sink
#[derive(Default)]
struct Writer {
    out: Vec<u8>,
}

impl Writer {
    fn u32(&mut self, v: u32) {
        self.out.extend_from_slice(&v.to_le_bytes());
    }

    fn i32(&mut self, v: i32) {
        self.out.extend_from_slice(&v.to_le_bytes());
    }

    fn f32(&mut self, v: f32) {
        self.out.extend_from_slice(&v.to_le_bytes());
    }

    fn floats(&mut self, values: &[f32]) {
        for &v in values {
            self.f32(v);
        }
    }

    fn name(&mut self, s: &str, len: usize) {
        let mut field = vec![0u8; len];
        let bytes = s.as_bytes();
        let n = bytes.len().min(len - 1);
        field[..n].copy_from_slice(&bytes[..n]);
        self.out.extend_from_slice(&field);
    }
}

/// Serialize a mesh container at `version`
pub fn write_elu(version: u32, materials: &[MaterialDef], nodes: &[NodeDef]) -> Vec<u8> {
    let schema = MeshSchema(version);
    let mut w = Writer::default();
    w.u32(EXPORTER_SIG);
    w.u32(version);
    w.i32(materials.len() as i32);
    w.i32(nodes.len() as i32);

    for m in materials {
        write_material(&mut w, schema, m);
    }
    for n in nodes {
        write_node(&mut w, schema, n);
    }
    w.out
}

/// Byte length of one material record as written by [`write_elu`]
pub fn material_bytes(version: u32) -> usize {
    let mut w = Writer::default();
    write_material(&mut w, MeshSchema(version), &MaterialDef::base(0));
    w.out.len()
}

fn write_material(w: &mut Writer, schema: MeshSchema, m: &MaterialDef) {
    w.i32(m.id);
    w.i32(m.sub_id);
    w.floats(&[0.2, 0.2, 0.2, 1.0]);
    w.floats(&[0.8, 0.8, 0.8, 1.0]);
    w.floats(&[0.0, 0.0, 0.0, 1.0]);
    w.f32(m.power);
    w.i32(m.sub_count);
    w.name(&m.diffuse_map, schema.texture_name_len());
    w.name(&m.opacity_map, schema.texture_name_len());
    if schema.has_two_sided() {
        w.i32(m.two_sided as i32);
    }
    if schema.has_additive() {
        w.i32(m.additive as i32);
    }
    if schema.has_alpha_test() {
        w.i32(m.alpha_test);
    }
}

fn write_node(w: &mut Writer, schema: MeshSchema, n: &NodeDef) {
    w.name(&n.name, NAME_LEN);
    w.name(&n.parent, NAME_LEN);
    w.floats(&n.matrix);
    if schema.has_pivot_scale() {
        w.floats(&[1.0, 1.0, 1.0]);
    }
    if schema.has_axis_block() {
        w.floats(&[0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
        w.floats(&IDENTITY);
    }

    w.i32(n.points.len() as i32);
    for p in &n.points {
        w.floats(p);
    }

    w.i32(n.faces.len() as i32);
    for f in &n.faces {
        for &i in &f.indices {
            w.i32(i);
        }
        for uv in &f.uvs {
            w.floats(uv);
        }
        w.i32(f.selector);
        if schema.has_smoothing_group() {
            w.i32(1);
        }
    }
    if schema.has_face_normals() {
        for _ in &n.faces {
            for _ in 0..4 {
                w.floats(&[0.0, 0.0, 1.0]);
            }
        }
    }

    if schema.has_point_colors() {
        w.i32(n.points.len() as i32);
        for _ in &n.points {
            w.floats(&[1.0, 1.0, 1.0]);
        }
    }

    w.i32(n.material_id);

    w.i32(n.influences.len() as i32);
    for inf in &n.influences {
        let slot = |i: usize| inf.slots.get(i);
        for i in 0..4 {
            w.name(slot(i).map(|s| s.0.as_str()).unwrap_or(""), NAME_LEN);
        }
        for i in 0..4 {
            w.f32(slot(i).map(|s| s.1).unwrap_or(0.0));
        }
        for i in 0..4 {
            w.i32(slot(i).map(|s| s.2).unwrap_or(0));
        }
        w.i32(inf.slots.len() as i32);
        for _ in 0..4 {
            w.floats(&[0.0, 0.0, 0.0]);
        }
    }
}

#[derive(Debug, Clone)]
pub struct BoneDef {
    pub name: String,
    /// (x, y, z, frame)
    pub position_keys: Vec<([f32; 3], i32)>,
    /// Stored values as written: angle-axis (x, y, z, angle) or quaternion (x, y, z, w)
    pub rotation_keys: Vec<([f32; 4], i32)>,
}

impl BoneDef {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            position_keys: Vec::new(),
            rotation_keys: Vec::new(),
        }
    }
}

/// Serialize a bone animation container at `version`
pub fn write_bone_ani(version: u32, max_frame: i32, bones: &[BoneDef]) -> Vec<u8> {
    let schema = AniSchema(version);
    let mut w = ani_header(version, max_frame, bones.len(), 2);
    for b in bones {
        w.name(&b.name, NAME_LEN);
        w.floats(&IDENTITY);
        w.i32(b.position_keys.len() as i32);
        for (value, frame) in &b.position_keys {
            w.floats(value);
            w.i32(*frame);
        }
        w.i32(b.rotation_keys.len() as i32);
        for (value, frame) in &b.rotation_keys {
            w.floats(value);
            w.i32(*frame);
        }
        if schema.has_visibility_keys() {
            w.u32(1);
            w.f32(1.0);
            w.i32(0);
        }
    }
    w.out
}

/// Serialize a matrix-track animation container with `keys` keys per node
pub fn write_matrix_ani(version: u32, names: &[&str], keys: usize) -> Vec<u8> {
    let schema = AniSchema(version);
    let mut w = ani_header(version, keys as i32, names.len(), 3);
    for name in names {
        w.name(name, NAME_LEN);
        w.i32(keys as i32);
        for frame in 0..keys {
            w.floats(&IDENTITY);
            w.i32(frame as i32);
        }
        if schema.has_visibility_keys() {
            w.u32(0);
        }
    }
    w.out
}

/// Serialize a vertex animation container
///
/// Every node gets `vertices` frame-table entries, `vertices * frames`
/// positions and `visibility_keys` visibility keys when the version has them.
pub fn write_vertex_ani(
    version: u32,
    names: &[&str],
    vertices: usize,
    frames: usize,
    visibility_keys: usize,
) -> Vec<u8> {
    let schema = AniSchema(version);
    let mut w = ani_header(version, frames as i32, names.len(), 1);
    for name in names {
        w.name(name, NAME_LEN);
        w.i32(vertices as i32);
        w.i32(frames as i32);
        for v in 0..vertices {
            w.i32(v as i32);
        }
        for v in 0..vertices {
            for f in 0..frames {
                w.floats(&[v as f32, f as f32, 0.0]);
            }
        }
        if schema.has_visibility_keys() {
            w.u32(visibility_keys as u32);
            for k in 0..visibility_keys {
                w.f32(1.0);
                w.i32(k as i32);
            }
        }
    }
    w.out
}

fn ani_header(version: u32, max_frame: i32, node_count: usize, kind: i32) -> Writer {
    let mut w = Writer::default();
    w.u32(EXPORTER_SIG);
    w.u32(version);
    w.i32(max_frame);
    w.i32(node_count as i32);
    w.i32(kind);
    w
}
