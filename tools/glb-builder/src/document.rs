//! GLTF document construction

use crate::buffer::BufferBuilder;
use crate::error::GlbError;
use crate::material::{MaterialSpec, TextureTable, build_material};
use crate::mesh::MeshAccessors;
use crate::skin::SkinAccessors;
use gltf_json as json;
use gltf_json::validation::Checked::Valid;
use std::collections::BTreeMap;

/// Builder for complete GLTF documents
///
/// Every `add_*` method returns the index of the object it created.
pub struct GltfBuilder {
    nodes: Vec<json::Node>,
    meshes: Vec<json::Mesh>,
    skins: Vec<json::Skin>,
    materials: Vec<json::Material>,
    textures: TextureTable,
    animations: Vec<json::Animation>,
    scenes: Vec<json::Scene>,
}

impl GltfBuilder {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            meshes: Vec::new(),
            skins: Vec::new(),
            materials: Vec::new(),
            textures: TextureTable::new(),
            animations: Vec::new(),
            scenes: Vec::new(),
        }
    }

    /// Add a node
    pub fn add_node(&mut self, node: json::Node) -> u32 {
        self.nodes.push(node);
        self.nodes.len() as u32 - 1
    }

    pub fn node_mut(&mut self, index: u32) -> Option<&mut json::Node> {
        self.nodes.get_mut(index as usize)
    }

    /// Get the current node count
    pub fn node_count(&self) -> u32 {
        self.nodes.len() as u32
    }

    /// Add a mesh with one triangle-list primitive per accessor set
    pub fn add_mesh(&mut self, name: &str, primitives: &[MeshAccessors]) -> u32 {
        let primitives = primitives.iter().map(primitive_from_accessors).collect();

        self.meshes.push(json::Mesh {
            extensions: Default::default(),
            extras: Default::default(),
            name: Some(name.to_string()),
            primitives,
            weights: None,
        });
        self.meshes.len() as u32 - 1
    }

    /// Add a skin
    pub fn add_skin(&mut self, name: &str, accessors: &SkinAccessors) -> u32 {
        self.skins.push(json::Skin {
            extensions: Default::default(),
            extras: Default::default(),
            inverse_bind_matrices: Some(accessors.inverse_bind_matrices.as_json_index()),
            joints: accessors
                .joints
                .iter()
                .map(|j| json::Index::new(*j))
                .collect(),
            name: Some(name.to_string()),
            skeleton: accessors.skeleton.map(json::Index::new),
        });
        self.skins.len() as u32 - 1
    }

    /// Add a material, registering its texture if it has one
    pub fn add_material(&mut self, spec: &MaterialSpec) -> Result<u32, GlbError> {
        let material = build_material(spec, &mut self.textures)?;
        self.materials.push(material);
        Ok(self.materials.len() as u32 - 1)
    }

    pub fn material_count(&self) -> u32 {
        self.materials.len() as u32
    }

    /// Add an animation built by [`crate::AnimationBuilder`]
    pub fn add_animation(&mut self, animation: json::Animation) -> u32 {
        self.animations.push(animation);
        self.animations.len() as u32 - 1
    }

    pub fn animation_count(&self) -> u32 {
        self.animations.len() as u32
    }

    /// Add a scene. The first scene added becomes the default scene.
    pub fn add_scene(&mut self, name: &str, root_nodes: &[u32]) -> u32 {
        self.scenes.push(json::Scene {
            extensions: Default::default(),
            extras: Default::default(),
            name: Some(name.to_string()),
            nodes: root_nodes.iter().map(|n| json::Index::new(*n)).collect(),
        });
        self.scenes.len() as u32 - 1
    }

    /// Build the final GLTF Root against the packed buffer
    ///
    /// The single buffer's byte length is the unpadded blob length.
    pub fn build(self, buffer: &BufferBuilder, generator: &str) -> json::Root {
        let buffers = vec![json::Buffer {
            byte_length: (buffer.data().len() as u64).into(),
            extensions: Default::default(),
            extras: Default::default(),
            name: None,
            uri: None,
        }];
        let (images, textures, samplers) = self.textures.into_parts();

        json::Root {
            accessors: buffer.accessors().to_vec(),
            animations: self.animations,
            asset: json::Asset {
                copyright: None,
                extensions: Default::default(),
                extras: Default::default(),
                generator: Some(generator.to_string()),
                min_version: None,
                version: "2.0".to_string(),
            },
            buffers,
            buffer_views: buffer.views().to_vec(),
            cameras: Vec::new(),
            extensions: Default::default(),
            extensions_required: Vec::new(),
            extensions_used: Vec::new(),
            extras: Default::default(),
            images,
            materials: self.materials,
            meshes: self.meshes,
            nodes: self.nodes,
            samplers,
            scene: if self.scenes.is_empty() {
                None
            } else {
                Some(json::Index::new(0))
            },
            scenes: self.scenes,
            skins: self.skins,
            textures,
        }
    }
}

impl Default for GltfBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A node with only its name set
pub fn named_node(name: &str) -> json::Node {
    json::Node {
        camera: None,
        children: None,
        extensions: Default::default(),
        extras: Default::default(),
        matrix: None,
        mesh: None,
        name: Some(name.to_string()),
        rotation: None,
        scale: None,
        translation: None,
        skin: None,
        weights: None,
    }
}

fn primitive_from_accessors(accessors: &MeshAccessors) -> json::mesh::Primitive {
    use json::mesh::Semantic;

    let streams = [
        (Semantic::Positions, Some(accessors.positions)),
        (Semantic::Normals, accessors.normals),
        (Semantic::TexCoords(0), accessors.uvs),
        (Semantic::Joints(0), accessors.joints),
        (Semantic::Weights(0), accessors.weights),
    ];
    let attributes: BTreeMap<_, _> = streams
        .into_iter()
        .filter_map(|(semantic, accessor)| Some((Valid(semantic), accessor?.as_json_index())))
        .collect();

    json::mesh::Primitive {
        attributes,
        extensions: Default::default(),
        extras: Default::default(),
        indices: accessors.indices.map(|i| i.as_json_index()),
        material: accessors.material.map(json::Index::new),
        mode: Valid(json::mesh::Mode::Triangles),
        targets: None,
    }
}
