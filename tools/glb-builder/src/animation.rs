//! Keyframe animation construction
//!
//! Each channel owns its own time input, so translation and rotation tracks
//! of the same node may have different key counts.

use crate::buffer::BufferBuilder;
use crate::error::GlbError;
use crate::utils::to_extras;
use gltf_json as json;
use gltf_json::validation::Checked::Valid;

/// Output values of one channel
#[derive(Debug, Clone)]
pub enum TrackValues {
    Translation(Vec<[f32; 3]>),
    Rotation(Vec<[f32; 4]>),
}

impl TrackValues {
    pub fn len(&self) -> usize {
        match self {
            TrackValues::Translation(v) => v.len(),
            TrackValues::Rotation(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn property(&self) -> json::animation::Property {
        match self {
            TrackValues::Translation(_) => json::animation::Property::Translation,
            TrackValues::Rotation(_) => json::animation::Property::Rotation,
        }
    }
}

/// Builder for one animation clip with LINEAR channels
pub struct AnimationBuilder {
    name: String,
    channels: Vec<(u32, Vec<f32>, TrackValues)>,
    extras: Option<serde_json::Value>,
}

impl AnimationBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            channels: Vec::new(),
            extras: None,
        }
    }

    /// Add a channel targeting `node`. Empty tracks are ignored.
    pub fn channel(mut self, node: u32, times: &[f32], values: TrackValues) -> Self {
        if !times.is_empty() && !values.is_empty() {
            self.channels.push((node, times.to_vec(), values));
        }
        self
    }

    /// Attach application-specific extras to the clip
    pub fn extras(mut self, extras: serde_json::Value) -> Self {
        self.extras = Some(extras);
        self
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Pack inputs and outputs and produce the animation object
    ///
    /// For each channel the time input is packed first, then its output.
    pub fn build(self, buffer: &mut BufferBuilder) -> Result<json::Animation, GlbError> {
        let mut samplers = Vec::with_capacity(self.channels.len());
        let mut channels = Vec::with_capacity(self.channels.len());

        for (node, times, values) in &self.channels {
            let input = buffer.pack_scalars_with_bounds(times);
            let output = match values {
                TrackValues::Translation(v) => buffer.pack_track_vec3(v),
                TrackValues::Rotation(v) => buffer.pack_track_vec4(v),
            };

            samplers.push(json::animation::Sampler {
                input: input.as_json_index(),
                interpolation: Valid(json::animation::Interpolation::Linear),
                output: output.as_json_index(),
                extensions: Default::default(),
                extras: Default::default(),
            });
            channels.push(json::animation::Channel {
                sampler: json::Index::new(samplers.len() as u32 - 1),
                target: json::animation::Target {
                    node: json::Index::new(*node),
                    path: Valid(values.property()),
                    extensions: Default::default(),
                    extras: Default::default(),
                },
                extensions: Default::default(),
                extras: Default::default(),
            });
        }

        Ok(json::Animation {
            channels,
            extensions: Default::default(),
            extras: to_extras(self.extras.as_ref())?,
            name: Some(self.name),
            samplers,
        })
    }
}
