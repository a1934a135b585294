//! Legacy material conversion and face material resolution

use crate::formats::MaterialFlags;
use crate::mesh::EluMaterial;
use crate::scene::types::{AlphaMode, SceneMaterial};
use crate::texture::TextureResolver;
use hashbrown::{HashMap, HashSet};
use serde_json::json;

/// Power at which the legacy specular highlight is considered fully glossy
const GLOSSY_POWER: f32 = 120.0;

/// Cutoff used when an alpha-tested material carries no test value
const DEFAULT_ALPHA_TEST: i32 = 128;

/// Lookup tables from legacy (id, sub id) pairs to output material indices
#[derive(Debug, Default)]
pub struct MaterialTable {
    by_key: HashMap<(i32, i32), usize>,
    base_by_id: HashMap<i32, usize>,
    sub_count_by_id: HashMap<i32, i32>,
    has_sub: HashSet<i32>,
    len: usize,
}

impl MaterialTable {
    /// Index materials in table order
    pub fn build(materials: &[EluMaterial]) -> Self {
        let mut table = MaterialTable {
            len: materials.len(),
            ..Default::default()
        };

        for (i, m) in materials.iter().enumerate() {
            table.by_key.insert((m.id, m.sub_id), i);
            if m.sub_id == -1 || !table.base_by_id.contains_key(&m.id) {
                table.base_by_id.insert(m.id, i);
            }
            if m.sub_id >= 0 {
                table.has_sub.insert(m.id);
            }
            if m.sub_id == -1 && m.sub_count > 0 {
                table.sub_count_by_id.insert(m.id, m.sub_count);
            }
        }

        table
    }

    /// Output material for a face of a node using `node_material`
    ///
    /// Materials with sub-materials are keyed by the face selector, wrapped
    /// into the declared sub count. Misses fall back to the base material for
    /// the id, then to index 0. Returns `None` only for an empty table.
    pub fn resolve(&self, node_material: i32, selector: i32) -> Option<usize> {
        if self.len == 0 {
            return None;
        }

        if self.has_sub.contains(&node_material) {
            let sub = match self.sub_count_by_id.get(&node_material) {
                Some(&count) if count > 0 => wrap_selector(selector, count),
                _ => selector,
            };
            if let Some(&index) = self.by_key.get(&(node_material, sub)) {
                return Some(index);
            }
        }

        Some(self.base_by_id.get(&node_material).copied().unwrap_or(0))
    }
}

/// Euclidean modulo; the result is always in `0..count`
pub fn wrap_selector(selector: i32, count: i32) -> i32 {
    selector.rem_euclid(count)
}

/// Roughness from legacy specular power: 1 - power/120, kept in [0.04, 1]
pub fn roughness_from_power(power: f32) -> f32 {
    let glossiness = (power / GLOSSY_POWER).clamp(0.0, 1.0);
    (1.0 - glossiness).clamp(0.04, 1.0)
}

pub fn alpha_mode(flags: MaterialFlags) -> AlphaMode {
    if flags.contains(MaterialFlags::ADDITIVE) {
        AlphaMode::Blend
    } else if flags.contains(MaterialFlags::USE_ALPHA_TEST) {
        AlphaMode::Mask
    } else if flags.contains(MaterialFlags::USE_OPACITY) {
        AlphaMode::Blend
    } else {
        AlphaMode::Opaque
    }
}

/// Convert one legacy material, resolving its texture names through `resolver`
pub fn convert_material(m: &EluMaterial, resolver: &dyn TextureResolver) -> SceneMaterial {
    let mode = alpha_mode(m.flags);
    let alpha_cutoff = (mode == AlphaMode::Mask).then(|| {
        let value = if m.alpha_test_value != 0 {
            m.alpha_test_value
        } else {
            DEFAULT_ALPHA_TEST
        };
        (value as f32 / 255.0).clamp(0.01, 1.0)
    });

    let base_color_texture = resolve_name(resolver, &m.diffuse_map);
    let opacity_texture = resolve_name(resolver, &m.opacity_map);

    let mut extras = json!({
        "legacyMtrlId": m.id,
        "legacySubMtrlId": m.sub_id,
        "legacyFlags": m.flags.bits(),
        "sourceDiffuseMap": m.diffuse_map,
        "sourceOpacityMap": m.opacity_map,
        "legacyPower": m.power,
    });
    if let Some(uri) = opacity_texture {
        extras["opacityTexture"] = json!(uri);
    }

    SceneMaterial {
        name: format!("mtrl_{}", m.id),
        roughness: roughness_from_power(m.power),
        alpha_mode: mode,
        alpha_cutoff,
        double_sided: m.flags.contains(MaterialFlags::TWO_SIDED),
        base_color_texture,
        extras,
    }
}

fn resolve_name(resolver: &dyn TextureResolver, name: &str) -> Option<String> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    let resolved = resolver.resolve(name);
    if resolved.is_none() {
        tracing::debug!(texture = name, "texture not resolved");
    }
    resolved.filter(|uri| !uri.is_empty())
}
