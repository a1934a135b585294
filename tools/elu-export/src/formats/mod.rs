//! Legacy exporter container constants and version-gated schema rules
//!
//! Both containers start with the same exporter signature followed by a
//! version word. Fields were only ever appended across versions, so each
//! optional field gets its own decision function instead of one branch per
//! record shape.

/// Signature shared by mesh and animation containers
pub const EXPORTER_SIG: u32 = 0x0107_F060;

pub const MESH_VER2: u32 = 0x5001;
pub const MESH_VER3: u32 = 0x5002;
pub const MESH_VER4: u32 = 0x5003;
pub const MESH_VER6: u32 = 0x5005;
pub const MESH_VER7: u32 = 0x5006;

pub const ANI_VER1: u32 = 0x12;
pub const ANI_VER3: u32 = 0x1002;

/// Width of name fields that never changed size
pub const NAME_LEN: usize = 40;

/// Influence slots stored per skinned vertex
pub const MAX_INFLUENCES: usize = 4;

bitflags::bitflags! {
    /// Render flags derived from a legacy material record
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct MaterialFlags: u32 {
        /// Opacity map name is non-empty
        const USE_OPACITY = 0x01;
        /// Alpha-test value is non-zero
        const USE_ALPHA_TEST = 0x02;
        const ADDITIVE = 0x04;
        const TWO_SIDED = 0x08;
    }
}

/// Field presence rules for one mesh container version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshSchema(pub u32);

impl MeshSchema {
    pub fn version(self) -> u32 {
        self.0
    }

    /// Width of the diffuse/opacity texture name fields
    pub fn texture_name_len(self) -> usize {
        if self.0 < MESH_VER7 { 40 } else { 256 }
    }

    pub fn has_two_sided(self) -> bool {
        self.0 > MESH_VER3
    }

    pub fn has_additive(self) -> bool {
        self.0 > MESH_VER4
    }

    pub fn has_alpha_test(self) -> bool {
        self.0 > MESH_VER7
    }

    /// Per-node pivot scale vector
    pub fn has_pivot_scale(self) -> bool {
        self.0 >= MESH_VER2
    }

    /// Per-node axis rotation/scale block and extra matrix
    pub fn has_axis_block(self) -> bool {
        self.0 >= MESH_VER4
    }

    pub fn has_smoothing_group(self) -> bool {
        self.0 > MESH_VER2
    }

    /// Face and corner normals stored as a second pass over all faces
    pub fn has_face_normals(self) -> bool {
        self.0 >= MESH_VER6
    }

    pub fn has_point_colors(self) -> bool {
        self.0 >= MESH_VER6
    }

    /// Byte size of one material record
    pub fn material_record_len(self) -> usize {
        let mut len = 4 + 4 + 3 * 16 + 4 + 4 + 2 * self.texture_name_len();
        len += 4 * [self.has_two_sided(), self.has_additive(), self.has_alpha_test()]
            .iter()
            .filter(|&&present| present)
            .count();
        len
    }

    /// Byte size of one first-pass face record
    pub fn face_record_len(self) -> usize {
        let base = 3 * 4 + 3 * 12 + 4;
        if self.has_smoothing_group() { base + 4 } else { base }
    }
}

/// Byte size of one influence record (names, weights, ids, count, offsets)
pub const INFLUENCE_RECORD_LEN: usize = MAX_INFLUENCES * NAME_LEN + 4 * 4 + 4 * 4 + 4 + 4 * 12;

/// Byte size of one second-pass face normal record
pub const FACE_NORMAL_RECORD_LEN: usize = 4 * 12;

/// Field presence rules for one animation container version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AniSchema(pub u32);

impl AniSchema {
    pub fn version(self) -> u32 {
        self.0
    }

    /// Rotation keys hold angle (w) plus axis (x, y, z) instead of a quaternion
    pub fn rotation_is_angle_axis(self) -> bool {
        self.0 <= ANI_VER3
    }

    pub fn has_visibility_keys(self) -> bool {
        self.0 > ANI_VER1
    }
}

/// Animation container type discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationKind {
    Vertex,
    Bone,
    MatrixTrack,
}

impl AnimationKind {
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            1 => Some(AnimationKind::Vertex),
            2 => Some(AnimationKind::Bone),
            3 => Some(AnimationKind::MatrixTrack),
            _ => None,
        }
    }

    pub fn as_raw(self) -> i32 {
        match self {
            AnimationKind::Vertex => 1,
            AnimationKind::Bone => 2,
            AnimationKind::MatrixTrack => 3,
        }
    }
}
