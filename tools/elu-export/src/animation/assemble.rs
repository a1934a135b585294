//! Clip assembly: bone keyframes to per-node time-sampled channels

use crate::animation::decode::decode_ani;
use crate::animation::types::{AniFile, BoneTrack};
use crate::formats::AnimationKind;
use crate::scene::NameIndex;
use hashbrown::HashSet;
use serde::Serialize;

/// One animation clip reference supplied by the caller
#[derive(Debug, Clone)]
pub struct ClipSource {
    pub name: String,
    /// Secondary clip attribute used to disambiguate duplicate names
    pub motion_type: i32,
    /// Source path recorded in reports and clip extras
    pub source: String,
    /// Container bytes; `None` when the source could not be found
    pub bytes: Option<Vec<u8>>,
}

/// Keyframe values of one channel
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelValues {
    Translation(Vec<[f32; 3]>),
    Rotation(Vec<[f32; 4]>),
}

/// One LINEAR channel targeting a scene node
#[derive(Debug, Clone, PartialEq)]
pub struct ClipChannel {
    pub node: usize,
    /// Seconds
    pub times: Vec<f32>,
    pub values: ChannelValues,
}

impl ClipChannel {
    pub fn path(&self) -> ChannelPath {
        match self.values {
            ChannelValues::Translation(_) => ChannelPath::Translation,
            ChannelValues::Rotation(_) => ChannelPath::Rotation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelPath {
    Translation,
    Rotation,
}

/// Assembled clip ready for the container writer
#[derive(Debug, Clone)]
pub struct AnimationClip {
    /// Unique output name
    pub name: String,
    pub original_name: String,
    pub motion_type: i32,
    pub source_file: String,
    pub channels: Vec<ClipChannel>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SkipReason {
    /// Container is a vertex or matrix-track animation
    NotBoneAnimation,
    /// No bone name matched a scene node
    NoChannels,
}

/// Outcome of one clip
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ClipStatus {
    Added {
        #[serde(rename = "outputName")]
        output_name: String,
    },
    Skipped {
        reason: SkipReason,
    },
    Missing,
    Error {
        message: String,
    },
}

/// Per-clip report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipReport {
    pub clip_name: String,
    pub motion_type: i32,
    pub source_file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animation_kind: Option<AnimationKind>,
    #[serde(flatten)]
    pub status: ClipStatus,
}

/// Turns decoded clips into channels against one scene's node names
///
/// Output names are unique across every clip passed to one assembler.
pub struct AnimationAssembler<'a> {
    names: &'a NameIndex,
    frames_per_second: f32,
    used_names: HashSet<String>,
}

impl<'a> AnimationAssembler<'a> {
    pub fn new(names: &'a NameIndex, frames_per_second: f32) -> Self {
        Self {
            names,
            frames_per_second,
            used_names: HashSet::new(),
        }
    }

    /// Decode and assemble one clip
    ///
    /// Failures are reported in the returned [`ClipReport`], never propagated.
    pub fn assemble(&mut self, source: &ClipSource) -> (ClipReport, Option<AnimationClip>) {
        let report = |kind: Option<AnimationKind>, status: ClipStatus| ClipReport {
            clip_name: source.name.clone(),
            motion_type: source.motion_type,
            source_file: source.source.clone(),
            animation_kind: kind,
            status,
        };

        let Some(bytes) = source.bytes.as_deref() else {
            tracing::warn!(clip = %source.name, source = %source.source, "animation source missing");
            return (report(None, ClipStatus::Missing), None);
        };

        let ani = match decode_ani(bytes) {
            Ok(ani) => ani,
            Err(e) => {
                tracing::warn!(clip = %source.name, "failed to decode animation: {e}");
                let status = ClipStatus::Error {
                    message: e.to_string(),
                };
                return (report(None, status), None);
            }
        };

        match self.assemble_decoded(source, &ani) {
            Ok(clip) => {
                let status = ClipStatus::Added {
                    output_name: clip.name.clone(),
                };
                (report(Some(ani.kind), status), Some(clip))
            }
            Err(reason) => {
                tracing::warn!(clip = %source.name, ?reason, "animation skipped");
                let status = ClipStatus::Skipped { reason };
                (report(Some(ani.kind), status), None)
            }
        }
    }

    /// Assemble an already decoded container
    pub fn assemble_decoded(
        &mut self,
        source: &ClipSource,
        ani: &AniFile,
    ) -> Result<AnimationClip, SkipReason> {
        if ani.kind != AnimationKind::Bone {
            return Err(SkipReason::NotBoneAnimation);
        }

        let mut channels = Vec::new();
        for bone in &ani.bones {
            let Some(node) = self.names.exact(&bone.name) else {
                continue;
            };
            self.push_channels(node, bone, &mut channels);
        }

        if channels.is_empty() {
            return Err(SkipReason::NoChannels);
        }

        let name = self.unique_name(&source.name, source.motion_type);
        tracing::debug!(clip = %name, channels = channels.len(), "assembled animation");

        Ok(AnimationClip {
            name,
            original_name: source.name.clone(),
            motion_type: source.motion_type,
            source_file: source.source.clone(),
            channels,
        })
    }

    fn push_channels(&self, node: usize, bone: &BoneTrack, channels: &mut Vec<ClipChannel>) {
        if !bone.position_keys.is_empty() {
            channels.push(ClipChannel {
                node,
                times: bone
                    .position_keys
                    .iter()
                    .map(|k| self.frame_time(k.frame))
                    .collect(),
                values: ChannelValues::Translation(
                    bone.position_keys.iter().map(|k| k.value).collect(),
                ),
            });
        }

        if !bone.rotation_keys.is_empty() {
            channels.push(ClipChannel {
                node,
                times: bone
                    .rotation_keys
                    .iter()
                    .map(|k| self.frame_time(k.frame))
                    .collect(),
                values: ChannelValues::Rotation(
                    bone.rotation_keys.iter().map(|k| k.value).collect(),
                ),
            });
        }
    }

    fn frame_time(&self, frame: i32) -> f32 {
        (f64::from(frame) / f64::from(self.frames_per_second)) as f32
    }

    /// `name`, then `name#m<motion>`, then `name#m<motion>_<n>` from 2
    fn unique_name(&mut self, name: &str, motion_type: i32) -> String {
        let mut candidate = name.to_string();
        if self.used_names.contains(&candidate) {
            candidate = format!("{name}#m{motion_type}");
            if self.used_names.contains(&candidate) {
                let mut n = 2;
                while self.used_names.contains(&format!("{candidate}_{n}")) {
                    n += 1;
                }
                candidate = format!("{candidate}_{n}");
            }
        }
        self.used_names.insert(candidate.clone());
        candidate
    }
}
