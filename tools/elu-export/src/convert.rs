//! Per-target conversion pipeline: decode, build scene, add clips, write GLB

use crate::animation::{AnimationAssembler, ClipReport, ClipSource};
use crate::error::{ConvertError, Diagnostic};
use crate::export::write_glb;
use crate::mesh::decode_elu;
use crate::scene::{ConversionSummary, build_scene};
use crate::texture::TextureResolver;

/// Default keyframe rate of the legacy exporter
pub const DEFAULT_FPS: f32 = 30.0;

/// Generator string written into the GLB asset block
pub const DEFAULT_GENERATOR: &str = "elu-export";

/// Caller-supplied conversion settings
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub frames_per_second: f32,
    pub generator: String,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            frames_per_second: DEFAULT_FPS,
            generator: DEFAULT_GENERATOR.to_string(),
        }
    }
}

impl ConvertOptions {
    pub fn with_fps(frames_per_second: f32) -> Self {
        Self {
            frames_per_second,
            ..Default::default()
        }
    }

    /// Frame rate used for timing; non-positive or non-finite values fall back to the default
    fn effective_fps(&self) -> f32 {
        if self.frames_per_second.is_finite() && self.frames_per_second > 0.0 {
            self.frames_per_second
        } else {
            DEFAULT_FPS
        }
    }
}

/// Result of in-memory conversion of one target
#[derive(Debug, Clone)]
pub struct ConvertedModel {
    /// Complete GLB container
    pub glb: Vec<u8>,
    pub summary: ConversionSummary,
    pub clips: Vec<ClipReport>,
    pub diagnostics: Vec<Diagnostic>,
    pub mesh_version: u32,
}

/// Convert one mesh container and its clips to GLB bytes
///
/// Clip failures are recorded in [`ConvertedModel::clips`]; only mesh decode
/// and container write failures are returned as errors.
pub fn convert_to_memory(
    mesh_bytes: &[u8],
    clips: &[ClipSource],
    resolver: &dyn TextureResolver,
    options: &ConvertOptions,
) -> Result<ConvertedModel, ConvertError> {
    let model = decode_elu(mesh_bytes)?;
    let mut scene = build_scene(&model, resolver)?;

    let mut reports = Vec::with_capacity(clips.len());
    let mut animations = Vec::new();
    {
        let mut assembler = AnimationAssembler::new(&scene.names, options.effective_fps());
        for clip in clips {
            let (report, assembled) = assembler.assemble(clip);
            reports.push(report);
            animations.extend(assembled);
        }
    }
    scene.animations = animations;

    let glb = write_glb(&scene, &options.generator)?;
    let summary = scene.summary();

    tracing::info!(
        version = %format!("{:#x}", model.version),
        nodes = summary.node_count,
        primitives = summary.primitive_count,
        vertices = summary.vertex_count,
        animations = summary.animation_count,
        bytes = glb.len(),
        "converted model"
    );

    Ok(ConvertedModel {
        glb,
        summary,
        clips: reports,
        diagnostics: scene.diagnostics,
        mesh_version: model.version,
    })
}
