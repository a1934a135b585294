//! Human-readable dumps of legacy containers

use anyhow::{Context, Result};
use std::path::Path;

use crate::animation::decode_ani;
use crate::formats::{AnimationKind, EXPORTER_SIG};
use crate::mesh::decode_elu;
use crate::reader::ByteReader;

/// Container family, told apart by the version word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Mesh,
    Animation,
}

/// Mesh versions live in the 0x5000 range; animation versions are far below it
pub fn detect(data: &[u8]) -> Option<ContainerKind> {
    let mut r = ByteReader::new(data);
    if r.u32().ok()? != EXPORTER_SIG {
        return None;
    }
    let version = r.u32().ok()?;
    if (0x5000..0x6000).contains(&version) {
        Some(ContainerKind::Mesh)
    } else {
        Some(ContainerKind::Animation)
    }
}

/// Describe a mesh or animation file
pub fn describe_file(path: &Path) -> Result<String> {
    let data = std::fs::read(path).with_context(|| format!("Failed to read {:?}", path))?;
    describe(&data).with_context(|| format!("Failed to decode {:?}", path))
}

pub fn describe(data: &[u8]) -> Result<String> {
    match detect(data) {
        Some(ContainerKind::Mesh) => describe_mesh(data),
        Some(ContainerKind::Animation) => describe_animation(data),
        None => anyhow::bail!("not a legacy exporter container"),
    }
}

fn describe_mesh(data: &[u8]) -> Result<String> {
    let model = decode_elu(data)?;
    let mut out = vec![format!(
        "mesh version {:#x}: {} materials, {} nodes",
        model.version,
        model.materials.len(),
        model.nodes.len()
    )];

    for m in &model.materials {
        out.push(format!(
            "  material {}/{} flags={:#x} diffuse='{}' opacity='{}'",
            m.id,
            m.sub_id,
            m.flags.bits(),
            m.diffuse_map,
            m.opacity_map
        ));
    }
    for n in &model.nodes {
        let parent = if n.parent.is_empty() { "-" } else { &n.parent };
        out.push(format!(
            "  node '{}' parent={} points={} faces={} material={}{}",
            n.name,
            parent,
            n.points.len(),
            n.faces.len(),
            n.material_id,
            if n.is_skinned() { " skinned" } else { "" }
        ));
    }
    Ok(out.join("\n"))
}

fn describe_animation(data: &[u8]) -> Result<String> {
    let ani = decode_ani(data)?;
    let mut out = vec![format!(
        "animation version {:#x}: kind={:?} max_frame={}",
        ani.version, ani.kind, ani.max_frame
    )];

    match ani.kind {
        AnimationKind::Bone => {
            for b in &ani.bones {
                out.push(format!(
                    "  bone '{}' position_keys={} rotation_keys={} visibility_keys={}",
                    b.name,
                    b.position_keys.len(),
                    b.rotation_keys.len(),
                    b.visibility_key_count
                ));
            }
        }
        AnimationKind::MatrixTrack | AnimationKind::Vertex => {
            for s in &ani.summaries {
                out.push(format!(
                    "  node '{}' keys={} vertices={} visibility_keys={}",
                    s.name, s.key_count, s.vertex_count, s.visibility_key_count
                ));
            }
        }
    }
    Ok(out.join("\n"))
}
