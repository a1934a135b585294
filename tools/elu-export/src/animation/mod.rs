//! Animation container (ANI) decoding and clip assembly

mod assemble;
mod decode;
mod types;

pub use assemble::{
    AnimationAssembler, AnimationClip, ChannelPath, ChannelValues, ClipChannel, ClipReport,
    ClipSource, ClipStatus, SkipReason,
};
pub use decode::{AniHeader, angle_axis_to_quat, decode_ani, read_header};
pub use types::{AniFile, AniNodeSummary, BoneTrack, PositionKey, RotationKey};
