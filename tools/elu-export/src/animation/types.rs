//! Decoded animation container model

use crate::formats::AnimationKind;

/// Decoded animation container
#[derive(Debug, Clone)]
pub struct AniFile {
    pub version: u32,
    pub max_frame: i32,
    pub kind: AnimationKind,
    /// Bone keyframe tracks; empty unless `kind` is [`AnimationKind::Bone`]
    pub bones: Vec<BoneTrack>,
    /// Per-node counts for matrix-track and vertex containers
    pub summaries: Vec<AniNodeSummary>,
}

/// Keyframes of one bone
#[derive(Debug, Clone)]
pub struct BoneTrack {
    pub name: String,
    pub base_matrix: [f32; 16],
    pub position_keys: Vec<PositionKey>,
    /// Always quaternions (x, y, z, w), converted from angle-axis if needed
    pub rotation_keys: Vec<RotationKey>,
    pub visibility_key_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionKey {
    pub frame: i32,
    pub value: [f32; 3],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationKey {
    pub frame: i32,
    pub value: [f32; 4],
}

/// Counts kept for nodes whose payload is only skipped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AniNodeSummary {
    pub name: String,
    /// Matrix keys (matrix-track) or frames per vertex (vertex)
    pub key_count: usize,
    pub vertex_count: usize,
    pub visibility_key_count: usize,
}
