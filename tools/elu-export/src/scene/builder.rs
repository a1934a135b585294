//! Scene graph construction from a decoded mesh container

use crate::error::{DecodeError, Diagnostic};
use crate::mesh::{EluModel, EluNode};
use crate::scene::material::{MaterialTable, convert_material};
use crate::scene::math::{IDENTITY, flat_normal, transpose, try_inverse};
use crate::scene::skin::resolve_vertex;
use crate::scene::types::{NameIndex, Primitive, Scene, SceneNode};
use crate::texture::TextureResolver;
use hashbrown::HashMap;

/// Joint indices are written as u16
const MAX_JOINTS: usize = u16::MAX as usize + 1;

/// Build the scene graph for a decoded model
///
/// Animations are left empty; see [`crate::animation::AnimationAssembler`].
pub fn build_scene(model: &EluModel, resolver: &dyn TextureResolver) -> Result<Scene, DecodeError> {
    let (names, mut diagnostics) = NameIndex::build(model.nodes.iter().map(|n| n.name.clone()));

    let mut nodes: Vec<SceneNode> = model
        .nodes
        .iter()
        .map(|n| SceneNode {
            name: n.name.clone(),
            matrix: transpose(&n.base_matrix),
            children: Vec::new(),
            primitives: Vec::new(),
        })
        .collect();

    let roots = link_hierarchy(model, &names, &mut nodes);

    let materials = model
        .materials
        .iter()
        .map(|m| convert_material(m, resolver))
        .collect();
    let table = MaterialTable::build(&model.materials);

    let skinned = model.nodes.iter().any(EluNode::is_skinned);
    let inverse_bind_matrices = if skinned {
        if nodes.len() > MAX_JOINTS {
            return Err(DecodeError::UnsupportedSchema {
                container: "mesh",
                detail: format!("{} skinned nodes exceed the joint index range", nodes.len()),
            });
        }
        Some(
            nodes
                .iter()
                .map(|n| {
                    try_inverse(&n.matrix).unwrap_or_else(|| {
                        diagnostics.push(Diagnostic::DegenerateTransform {
                            node: n.name.clone(),
                        });
                        IDENTITY
                    })
                })
                .collect(),
        )
    } else {
        None
    };

    for (index, source) in model.nodes.iter().enumerate() {
        if source.has_geometry() {
            nodes[index].primitives = build_primitives(source, index, &names, &table, skinned);
        }
    }

    for diagnostic in &diagnostics {
        tracing::warn!("{diagnostic}");
    }

    Ok(Scene {
        nodes,
        roots,
        materials,
        inverse_bind_matrices,
        animations: Vec::new(),
        names,
        diagnostics,
    })
}

/// Attach every node to its named parent and return the roots
///
/// A node whose parent name is unknown, is itself, or would close a cycle
/// becomes a root.
fn link_hierarchy(model: &EluModel, names: &NameIndex, nodes: &mut [SceneNode]) -> Vec<usize> {
    let parent_of: Vec<Option<usize>> = model
        .nodes
        .iter()
        .map(|n| {
            if n.parent.is_empty() {
                None
            } else {
                names.exact(&n.parent)
            }
        })
        .collect();

    let reaches = |start: Option<usize>, target: usize| {
        let mut current = start;
        for _ in 0..parent_of.len() {
            match current {
                Some(i) if i == target => return true,
                Some(i) => current = parent_of[i],
                None => return false,
            }
        }
        false
    };

    let mut roots = Vec::new();
    for (index, parent) in parent_of.iter().enumerate() {
        match parent {
            Some(p) if !reaches(Some(*p), index) => nodes[*p].children.push(index),
            _ => roots.push(index),
        }
    }
    roots
}

/// Expand faces into per-corner vertices grouped by resolved material
fn build_primitives(
    node: &EluNode,
    own_bone: usize,
    names: &NameIndex,
    table: &MaterialTable,
    skinned: bool,
) -> Vec<Primitive> {
    let mut primitives: Vec<Primitive> = Vec::new();
    let mut slot_by_material: HashMap<Option<usize>, usize> = HashMap::new();

    let point = |index: i32| -> [f32; 3] {
        usize::try_from(index)
            .ok()
            .and_then(|i| node.points.get(i).copied())
            .unwrap_or([0.0; 3])
    };

    for face in &node.faces {
        let corners = face.point_indices.map(point);
        let flat = flat_normal(corners[0], corners[1], corners[2]);

        let material = table.resolve(node.material_id, face.material_selector);
        let slot = *slot_by_material.entry(material).or_insert_with(|| {
            primitives.push(Primitive {
                material,
                ..Default::default()
            });
            primitives.len() - 1
        });
        let primitive = &mut primitives[slot];

        for corner in 0..3 {
            let point_index = face.point_indices[corner];
            let vertex = primitive.positions.len() as u32;

            primitive.positions.push(corners[corner]);
            primitive.normals.push(
                face.corner_normals
                    .map(|normals| normals[corner])
                    .unwrap_or(flat),
            );
            let [u, v, _] = face.uvs[corner];
            primitive.uvs.push([u, 1.0 - v]);

            if skinned {
                let record = usize::try_from(point_index)
                    .ok()
                    .and_then(|i| node.influences.get(i));
                let skin = resolve_vertex(record, names, own_bone);
                primitive.joints.push(skin.joints.map(|j| j as u16));
                primitive.weights.push(skin.weights);
            }

            primitive.indices.push(vertex);
        }
    }

    primitives
}
