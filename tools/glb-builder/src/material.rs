//! PBR material and texture table construction

use crate::error::GlbError;
use crate::utils::to_extras;
use gltf_json as json;
use gltf_json::validation::Checked::Valid;
use hashbrown::HashMap;

/// Description of one metallic-roughness material
#[derive(Debug, Clone)]
pub struct MaterialSpec {
    pub name: String,
    pub base_color_factor: [f32; 4],
    pub metallic: f32,
    pub roughness: f32,
    pub alpha_mode: json::material::AlphaMode,
    pub alpha_cutoff: Option<f32>,
    pub double_sided: bool,
    /// Image URI for the base color texture
    pub base_color_texture: Option<String>,
    pub extras: Option<serde_json::Value>,
}

impl MaterialSpec {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            base_color_factor: [1.0, 1.0, 1.0, 1.0],
            metallic: 0.0,
            roughness: 1.0,
            alpha_mode: json::material::AlphaMode::Opaque,
            alpha_cutoff: None,
            double_sided: false,
            base_color_texture: None,
            extras: None,
        }
    }
}

/// Images, textures and the shared sampler, deduplicated by image URI
#[derive(Default)]
pub struct TextureTable {
    by_uri: HashMap<String, u32>,
    images: Vec<json::Image>,
    textures: Vec<json::Texture>,
    sampler: Option<json::texture::Sampler>,
}

impl TextureTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Texture index for `uri`, creating image and texture on first use
    ///
    /// The sampler (linear, trilinear mip, repeat) is created with the first
    /// texture and shared by all of them.
    pub fn texture_for(&mut self, uri: &str) -> u32 {
        if let Some(&index) = self.by_uri.get(uri) {
            return index;
        }

        if self.sampler.is_none() {
            self.sampler = Some(json::texture::Sampler {
                mag_filter: Some(Valid(json::texture::MagFilter::Linear)),
                min_filter: Some(Valid(json::texture::MinFilter::LinearMipmapLinear)),
                wrap_s: Valid(json::texture::WrappingMode::Repeat),
                wrap_t: Valid(json::texture::WrappingMode::Repeat),
                ..Default::default()
            });
        }

        let image = self.images.len() as u32;
        self.images.push(json::Image {
            buffer_view: None,
            mime_type: None,
            name: None,
            uri: Some(uri.to_string()),
            extensions: Default::default(),
            extras: Default::default(),
        });

        let index = self.textures.len() as u32;
        self.textures.push(json::Texture {
            name: None,
            sampler: Some(json::Index::new(0)),
            source: json::Index::new(image),
            extensions: Default::default(),
            extras: Default::default(),
        });
        self.by_uri.insert(uri.to_string(), index);
        index
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Consume the table into (images, textures, samplers)
    pub fn into_parts(
        self,
    ) -> (
        Vec<json::Image>,
        Vec<json::Texture>,
        Vec<json::texture::Sampler>,
    ) {
        (self.images, self.textures, self.sampler.into_iter().collect())
    }
}

/// Turn a spec into a glTF material, registering its texture in `textures`
pub fn build_material(
    spec: &MaterialSpec,
    textures: &mut TextureTable,
) -> Result<json::Material, GlbError> {
    let base_color_texture = spec
        .base_color_texture
        .as_deref()
        .map(|uri| json::texture::Info {
            index: json::Index::new(textures.texture_for(uri)),
            tex_coord: 0,
            extensions: Default::default(),
            extras: Default::default(),
        });

    Ok(json::Material {
        name: Some(spec.name.clone()),
        alpha_mode: Valid(spec.alpha_mode),
        alpha_cutoff: spec.alpha_cutoff.map(json::material::AlphaCutoff),
        double_sided: spec.double_sided,
        pbr_metallic_roughness: json::material::PbrMetallicRoughness {
            base_color_factor: json::material::PbrBaseColorFactor(spec.base_color_factor),
            base_color_texture,
            metallic_factor: json::material::StrengthFactor(spec.metallic),
            roughness_factor: json::material::StrengthFactor(spec.roughness),
            ..Default::default()
        },
        extras: to_extras(spec.extras.as_ref())?,
        ..Default::default()
    })
}
