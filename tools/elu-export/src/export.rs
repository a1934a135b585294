//! Scene graph to GLB serialization
//!
//! Blob order: inverse bind matrices first, then per node and primitive the
//! positions, normals, UVs, joints/weights and indices, then every
//! animation input/output pair in clip and channel order.

use crate::animation::{AnimationClip, ChannelValues};
use crate::scene::{AlphaMode, Scene, SceneMaterial};
use glb_builder::{
    AnimationBuilder, BufferBuilder, GlbError, GltfBuilder, MaterialSpec, MeshBuilder,
    SkinBuilder, TrackValues, assemble_glb, json, named_node,
};

/// Serialize a finished scene into GLB bytes
pub fn write_glb(scene: &Scene, generator: &str) -> Result<Vec<u8>, GlbError> {
    let mut buffer = BufferBuilder::new();
    let mut gltf = GltfBuilder::new();

    let skin = scene.inverse_bind_matrices.as_ref().map(|ibms| {
        let builder = ibms
            .iter()
            .enumerate()
            .fold(SkinBuilder::new(), |b, (joint, ibm)| b.joint(joint as u32, *ibm));
        let accessors = builder.skeleton(0).build(&mut buffer);
        gltf.add_skin("skin", &accessors)
    });

    for node in &scene.nodes {
        let mut out = named_node(&node.name);
        out.matrix = Some(node.matrix);
        if !node.children.is_empty() {
            out.children = Some(
                node.children
                    .iter()
                    .map(|&c| json::Index::new(c as u32))
                    .collect(),
            );
        }
        gltf.add_node(out);
    }

    for material in &scene.materials {
        gltf.add_material(&material_spec(material))?;
    }

    for (index, node) in scene.nodes.iter().enumerate() {
        if node.primitives.is_empty() {
            continue;
        }

        let primitives: Vec<_> = node
            .primitives
            .iter()
            .map(|p| {
                let mut mesh = MeshBuilder::new()
                    .positions(&p.positions)
                    .normals(&p.normals)
                    .uvs(&p.uvs);
                if skin.is_some() {
                    mesh = mesh.skinning(&p.joints, &p.weights);
                }
                mesh.indices(&p.indices)
                    .material(p.material.map(|m| m as u32))
                    .build(&mut buffer)
            })
            .collect();

        let mesh = gltf.add_mesh(&format!("{}_mesh", node.name), &primitives);
        if let Some(out) = gltf.node_mut(index as u32) {
            out.mesh = Some(json::Index::new(mesh));
            out.skin = skin.map(json::Index::new);
        }
    }

    for clip in &scene.animations {
        let animation = animation_builder(clip).build(&mut buffer)?;
        gltf.add_animation(animation);
    }

    let roots: Vec<u32> = scene.roots.iter().map(|&r| r as u32).collect();
    gltf.add_scene("Scene", &roots);

    let root = gltf.build(&buffer, generator);
    assemble_glb(&root, buffer.data())
}

fn material_spec(material: &SceneMaterial) -> MaterialSpec {
    let mut spec = MaterialSpec::new(&material.name);
    spec.roughness = material.roughness;
    spec.alpha_mode = match material.alpha_mode {
        AlphaMode::Opaque => json::material::AlphaMode::Opaque,
        AlphaMode::Mask => json::material::AlphaMode::Mask,
        AlphaMode::Blend => json::material::AlphaMode::Blend,
    };
    spec.alpha_cutoff = material.alpha_cutoff;
    spec.double_sided = material.double_sided;
    spec.base_color_texture = material.base_color_texture.clone();
    spec.extras = Some(material.extras.clone());
    spec
}

fn animation_builder(clip: &AnimationClip) -> AnimationBuilder {
    let builder = clip
        .channels
        .iter()
        .fold(AnimationBuilder::new(&clip.name), |b, channel| {
            let values = match &channel.values {
                ChannelValues::Translation(v) => TrackValues::Translation(v.clone()),
                ChannelValues::Rotation(v) => TrackValues::Rotation(v.clone()),
            };
            b.channel(channel.node as u32, &channel.times, values)
        });

    builder.extras(serde_json::json!({
        "originalName": clip.original_name,
        "motionType": clip.motion_type,
        "sourceFile": clip.source_file,
    }))
}
