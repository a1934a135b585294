//! Integration tests for the ELU/ANI to GLB pipeline.
//!
//! Tests the complete flow:
//! 1. Generate legacy containers programmatically
//! 2. Convert through elu-export
//! 3. Re-read the GLB with the gltf crate and validate it

mod legacy_generator;

use elu_export::animation::{SkipReason, decode_ani};
use elu_export::formats::{
    ANI_VER1, ANI_VER3, AnimationKind, MESH_VER2, MESH_VER3, MESH_VER4, MESH_VER6, MESH_VER7,
    MaterialFlags, MeshSchema,
};
use elu_export::mesh::decode_elu;
use elu_export::{
    ClipSource, ClipStatus, ConvertOptions, DecodeError, NoTextures, convert_to_memory,
};
use legacy_generator::{
    BoneDef, FaceDef, InfluenceDef, MaterialDef, NodeDef, translation, write_bone_ani, write_elu,
    write_matrix_ani, write_vertex_ani,
};

const HEADER_LEN: usize = 16;

const ALL_MESH_VERSIONS: [u32; 9] = [
    MESH_VER2 - 1,
    MESH_VER2,
    MESH_VER3,
    MESH_VER4,
    MESH_VER4 + 1,
    MESH_VER6,
    MESH_VER7,
    MESH_VER7 + 1,
    MESH_VER7 + 2,
];

fn gltf_from(glb: &[u8]) -> gltf::Gltf {
    gltf::Gltf::from_slice(glb).expect("Failed to parse GLB")
}

fn clip(name: &str, bytes: Option<Vec<u8>>) -> ClipSource {
    ClipSource {
        name: name.to_string(),
        motion_type: 0,
        source: format!("model/{name}.ani"),
        bytes,
    }
}

fn full_material() -> MaterialDef {
    MaterialDef {
        opacity_map: "alpha.tga".to_string(),
        two_sided: true,
        additive: true,
        alpha_test: 200,
        ..MaterialDef::base(0)
    }
}

fn pelvis_chest() -> Vec<NodeDef> {
    vec![
        NodeDef::new("pelvis", "").with_triangle(),
        NodeDef {
            matrix: translation([0.0, 1.0, 0.0]),
            ..NodeDef::new("chest", "pelvis").with_triangle()
        },
    ]
}

fn pelvis_clip() -> Vec<u8> {
    let mut pelvis = BoneDef::new("pelvis");
    pelvis.position_keys = vec![([0.0, 0.0, 0.0], 0), ([0.0, 2.0, 0.0], 30)];
    write_bone_ani(0x1003, 30, &[pelvis])
}

#[test]
fn test_material_record_lengths_per_version() {
    let expected = [
        (MESH_VER3, 4 + 4 + 48 + 4 + 4 + 80),
        (MESH_VER4, 4 + 4 + 48 + 4 + 4 + 80 + 4),
        (MESH_VER6, 4 + 4 + 48 + 4 + 4 + 80 + 8),
        (MESH_VER7, 4 + 4 + 48 + 4 + 4 + 512 + 8),
        (MESH_VER7 + 1, 4 + 4 + 48 + 4 + 4 + 512 + 12),
    ];
    for (version, len) in expected {
        assert_eq!(legacy_generator::material_bytes(version), len, "{version:#x}");
        assert_eq!(MeshSchema(version).material_record_len(), len, "{version:#x}");
    }
}

#[test]
fn test_version_boundaries_decode_documented_fields() {
    // One triangle node, no influences. Base record is 196 bytes plus the face:
    // +12 pivot from 0x5001, 56-byte faces from 0x5002, +96 axis block from
    // 0x5003, +48 face normals and +40 point colors from 0x5005.
    let node_lens = [248, 260, 264, 360, 360, 448, 448, 448, 448];
    for (version, node_len) in ALL_MESH_VERSIONS.into_iter().zip(node_lens) {
        let data = write_elu(version, &[full_material()], &[NodeDef::new("n", "").with_triangle()]);
        let model = decode_elu(&data).unwrap_or_else(|e| panic!("{version:#x}: {e}"));

        assert_eq!(model.version, version);
        let m = &model.materials[0];
        assert!(m.flags.contains(MaterialFlags::USE_OPACITY));
        assert_eq!(m.flags.contains(MaterialFlags::TWO_SIDED), version > MESH_VER3);
        assert_eq!(m.flags.contains(MaterialFlags::ADDITIVE), version > MESH_VER4);
        assert_eq!(m.flags.contains(MaterialFlags::USE_ALPHA_TEST), version > MESH_VER7);
        assert_eq!(m.alpha_test_value, if version > MESH_VER7 { 200 } else { 0 });

        let face = &model.nodes[0].faces[0];
        assert_eq!(face.smoothing_group, if version > MESH_VER2 { 1 } else { 0 });
        assert_eq!(face.face_normal.is_some(), version >= MESH_VER6);
        assert_eq!(face.corner_normals.is_some(), version >= MESH_VER6);

        assert_eq!(
            data.len(),
            HEADER_LEN + legacy_generator::material_bytes(version) + node_len,
            "{version:#x}"
        );
    }
}

#[test]
fn test_truncation_by_one_byte_is_end_of_data() {
    for version in ALL_MESH_VERSIONS {
        let data = write_elu(version, &[full_material()], &pelvis_chest());
        let err = decode_elu(&data[..data.len() - 1]).unwrap_err();
        assert!(
            matches!(err, DecodeError::EndOfData { .. }),
            "{version:#x}: {err:?}"
        );
    }
}

#[test]
fn test_trailing_bytes_do_not_change_decode() {
    let mut data = write_elu(MESH_VER7, &[], &pelvis_chest());
    let model = decode_elu(&data).unwrap();
    data.extend_from_slice(&[0xAB; 8]);
    let padded = decode_elu(&data).unwrap();
    assert_eq!(model.nodes.len(), padded.nodes.len());
}

#[test]
fn test_angle_axis_keys_below_quaternion_version() {
    let mut bone = BoneDef::new("pelvis");
    bone.rotation_keys = vec![([0.0, 0.0, 1.0, std::f32::consts::PI], 0)];

    let ani = decode_ani(&write_bone_ani(ANI_VER3, 0, &[bone.clone()])).unwrap();
    let q = ani.bones[0].rotation_keys[0].value;
    assert!(q[0].abs() < 1e-6 && q[1].abs() < 1e-6);
    assert!((q[2] - 1.0).abs() < 1e-6);
    assert!(q[3].abs() < 1e-6);
    assert_eq!(ani.bones[0].visibility_key_count, 1);

    // Above the threshold the stored values are already a quaternion
    let ani = decode_ani(&write_bone_ani(ANI_VER3 + 1, 0, &[bone])).unwrap();
    assert_eq!(
        ani.bones[0].rotation_keys[0].value,
        [0.0, 0.0, 1.0, std::f32::consts::PI]
    );
}

#[test]
fn test_oldest_animation_version_has_no_visibility_keys() {
    let mut bone = BoneDef::new("pelvis");
    bone.position_keys = vec![([1.0, 2.0, 3.0], 5)];
    let data = write_bone_ani(ANI_VER1, 5, &[bone]);
    let ani = decode_ani(&data).unwrap();
    assert_eq!(ani.bones[0].visibility_key_count, 0);
    assert_eq!(ani.bones[0].position_keys[0].value, [1.0, 2.0, 3.0]);
}

#[test]
fn test_matrix_track_is_summarized() {
    let ani = decode_ani(&write_matrix_ani(0x1003, &["a", "b"], 3)).unwrap();
    assert!(ani.bones.is_empty());
    assert_eq!(ani.summaries.len(), 2);
    assert_eq!(ani.summaries[1].name, "b");
    assert_eq!(ani.summaries[1].key_count, 3);
}

#[test]
fn test_vertex_animation_layout() {
    // header 20; per node: name 40, counts 8, frame table 3 * 4,
    // positions 3 * 2 * 12, visibility count 4 + 1 * 8
    let data = write_vertex_ani(0x1003, &["body", "head"], 3, 2, 1);
    assert_eq!(data.len(), 20 + 2 * 144);

    let ani = decode_ani(&data).unwrap();
    assert_eq!(ani.kind, AnimationKind::Vertex);
    assert!(ani.bones.is_empty());
    assert_eq!(ani.summaries.len(), 2);
    for (summary, name) in ani.summaries.iter().zip(["body", "head"]) {
        assert_eq!(summary.name, name);
        assert_eq!(summary.vertex_count, 3);
        assert_eq!(summary.key_count, 2);
        assert_eq!(summary.visibility_key_count, 1);
    }

    // The last byte belongs to the final visibility key
    let err = decode_ani(&data[..data.len() - 1]).unwrap_err();
    assert!(matches!(err, DecodeError::EndOfData { .. }), "{err:?}");
}

#[test]
fn test_vertex_animation_without_visibility_keys() {
    let data = write_vertex_ani(ANI_VER1, &["body"], 2, 4, 0);
    assert_eq!(data.len(), 20 + 40 + 8 + 2 * 4 + 2 * 4 * 12);

    let ani = decode_ani(&data).unwrap();
    assert_eq!(ani.summaries[0].key_count, 4);
    assert_eq!(ani.summaries[0].visibility_key_count, 0);
}

#[test]
fn test_vertex_clip_is_skipped() {
    let data = write_elu(MESH_VER7, &[MaterialDef::base(0)], &pelvis_chest());
    let clips = [clip("morph", Some(write_vertex_ani(0x1003, &["pelvis"], 3, 2, 1)))];
    let converted =
        convert_to_memory(&data, &clips, &NoTextures, &ConvertOptions::default()).unwrap();

    assert_eq!(
        converted.clips[0].status,
        ClipStatus::Skipped {
            reason: SkipReason::NotBoneAnimation
        }
    );
    assert_eq!(converted.clips[0].animation_kind, Some(AnimationKind::Vertex));
    assert_eq!(gltf_from(&converted.glb).animations().count(), 0);
}

#[test]
fn test_unskinned_model_has_no_skin() {
    let data = write_elu(MESH_VER7, &[MaterialDef::base(0)], &pelvis_chest());
    let converted =
        convert_to_memory(&data, &[], &NoTextures, &ConvertOptions::default()).unwrap();

    let gltf = gltf_from(&converted.glb);
    assert_eq!(gltf.skins().count(), 0);
    for mesh in gltf.meshes() {
        for primitive in mesh.primitives() {
            assert!(primitive.get(&gltf::Semantic::Positions).is_some());
            assert!(primitive.get(&gltf::Semantic::Normals).is_some());
            assert!(primitive.get(&gltf::Semantic::TexCoords(0)).is_some());
            assert!(primitive.get(&gltf::Semantic::Joints(0)).is_none());
            assert!(primitive.get(&gltf::Semantic::Weights(0)).is_none());
        }
    }
    for node in gltf.nodes() {
        assert!(node.skin().is_none());
    }
}

#[test]
fn test_skinned_model_has_one_skin_over_all_nodes() {
    let mut nodes = pelvis_chest();
    nodes[1].influences = vec![
        InfluenceDef::rigid("chest"),
        InfluenceDef {
            slots: vec![("pelvis".to_string(), 0.2, 0), ("chest".to_string(), 0.3, 1)],
        },
        InfluenceDef::rigid("pelvis"),
    ];
    let data = write_elu(MESH_VER7, &[MaterialDef::base(0)], &nodes);
    let converted =
        convert_to_memory(&data, &[], &NoTextures, &ConvertOptions::default()).unwrap();

    let gltf = gltf_from(&converted.glb);
    let blob = gltf.blob.as_deref();
    assert_eq!(gltf.skins().count(), 1);
    let skin = gltf.skins().next().unwrap();
    assert_eq!(skin.joints().count(), 2);

    let chest = gltf.nodes().nth(1).unwrap();
    let primitive = chest.mesh().unwrap().primitives().next().unwrap();
    let reader = primitive.reader(|_| blob);
    let weights: Vec<[f32; 4]> = reader.read_weights(0).unwrap().into_f32().collect();
    let joints: Vec<[u16; 4]> = reader.read_joints(0).unwrap().into_u16().collect();

    // Face (0, 1, 2): second corner carries the renormalized pair
    assert_eq!(joints[0][0], 1);
    assert!((weights[1][0] - 0.4).abs() < 1e-6);
    assert!((weights[1][1] - 0.6).abs() < 1e-6);
    assert_eq!(joints[1][..2], [0, 1]);
    for w in &weights {
        assert!((w.iter().sum::<f32>() - 1.0).abs() < 1e-6);
    }

    // Translated chest gets the inverse translation as its bind matrix
    let ibms: Vec<[[f32; 4]; 4]> = skin
        .reader(|_| blob)
        .read_inverse_bind_matrices()
        .unwrap()
        .collect();
    assert_eq!(ibms[1][3][1], -1.0);
}

#[test]
fn test_pelvis_chest_scenario() {
    let data = write_elu(MESH_VER7, &[MaterialDef::base(0)], &pelvis_chest());
    let converted = convert_to_memory(
        &data,
        &[clip("walk", Some(pelvis_clip()))],
        &NoTextures,
        &ConvertOptions::default(),
    )
    .unwrap();

    let gltf = gltf_from(&converted.glb);
    let nodes: Vec<_> = gltf.nodes().collect();
    assert_eq!(nodes.len(), 2);
    assert_eq!(nodes[0].name(), Some("pelvis"));
    let children: Vec<usize> = nodes[0].children().map(|c| c.index()).collect();
    assert_eq!(children, vec![1]);

    // Stored row-major translation lands in the column-major translation slot
    match nodes[1].transform() {
        gltf::scene::Transform::Matrix { matrix } => assert_eq!(matrix[3][1], 1.0),
        _ => panic!("expected matrix transform"),
    }

    let scene = gltf.scenes().next().unwrap();
    let roots: Vec<usize> = scene.nodes().map(|n| n.index()).collect();
    assert_eq!(roots, vec![0]);

    assert_eq!(gltf.animations().count(), 1);
    let animation = gltf.animations().next().unwrap();
    assert_eq!(animation.name(), Some("walk"));
    let channels: Vec<_> = animation.channels().collect();
    assert_eq!(channels.len(), 1);
    assert_eq!(channels[0].target().node().index(), 0);
    assert_eq!(
        channels[0].target().property(),
        gltf::animation::Property::Translation
    );
    assert_eq!(
        channels[0].sampler().interpolation(),
        gltf::animation::Interpolation::Linear
    );

    assert_eq!(
        converted.clips[0].status,
        ClipStatus::Added {
            output_name: "walk".to_string()
        }
    );
}

#[test]
fn test_round_trip_geometry_and_keys() {
    let data = write_elu(MESH_VER7, &[MaterialDef::base(0)], &pelvis_chest());
    let mut pelvis = BoneDef::new("pelvis");
    pelvis.position_keys = vec![([0.0, 0.0, 0.0], 0), ([0.0, 2.0, 0.0], 30)];
    pelvis.rotation_keys = vec![
        ([0.0, 0.0, 0.0, 1.0], 0),
        ([0.0, 0.0, 0.70710677, 0.70710677], 30),
    ];
    let walk = write_bone_ani(0x1003, 30, &[pelvis]);
    let decoded = decode_ani(&walk).unwrap();
    let converted = convert_to_memory(
        &data,
        &[clip("walk", Some(walk))],
        &NoTextures,
        &ConvertOptions::with_fps(15.0),
    )
    .unwrap();

    let gltf = gltf_from(&converted.glb);
    let blob = gltf.blob.as_deref();

    let pelvis = gltf.nodes().next().unwrap();
    let primitive = pelvis.mesh().unwrap().primitives().next().unwrap();
    assert_eq!(primitive.mode(), gltf::mesh::Mode::Triangles);
    let reader = primitive.reader(|_| blob);
    let positions: Vec<[f32; 3]> = reader.read_positions().unwrap().collect();
    assert_eq!(
        positions,
        vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]
    );
    let indices: Vec<u32> = reader.read_indices().unwrap().into_u32().collect();
    assert_eq!(indices, vec![0, 1, 2]);
    let normals: Vec<[f32; 3]> = reader.read_normals().unwrap().collect();
    assert_eq!(normals[0], [0.0, 0.0, 1.0]);
    let uvs: Vec<[f32; 2]> = reader.read_tex_coords(0).unwrap().into_f32().collect();
    assert_eq!(uvs[1], [1.0, 1.0]);

    let animation = gltf.animations().next().unwrap();
    let channels: Vec<_> = animation.channels().collect();
    assert_eq!(channels.len(), 2);
    for channel in &channels {
        assert_eq!(channel.target().node().name(), Some("pelvis"));
    }

    let reader = channels[0].reader(|_| blob);
    let times: Vec<f32> = reader.read_inputs().unwrap().collect();
    assert_eq!(times, vec![0.0, 2.0]);
    match reader.read_outputs().unwrap() {
        gltf::animation::util::ReadOutputs::Translations(values) => {
            let values: Vec<[f32; 3]> = values.collect();
            assert_eq!(values, vec![[0.0, 0.0, 0.0], [0.0, 2.0, 0.0]]);
        }
        _ => panic!("expected translation outputs"),
    }

    let reader = channels[1].reader(|_| blob);
    let times: Vec<f32> = reader.read_inputs().unwrap().collect();
    assert_eq!(times, vec![0.0, 2.0]);
    let expected: Vec<[f32; 4]> = decoded.bones[0]
        .rotation_keys
        .iter()
        .map(|k| k.value)
        .collect();
    assert_eq!(expected[1], [0.0, 0.0, 0.70710677, 0.70710677]);
    match reader.read_outputs().unwrap() {
        gltf::animation::util::ReadOutputs::Rotations(values) => {
            let values: Vec<[f32; 4]> = values.into_f32().collect();
            assert_eq!(values, expected);
        }
        _ => panic!("expected rotation outputs"),
    }

    assert_eq!(converted.summary.node_count, 2);
    assert_eq!(converted.summary.vertex_count, 6);
    assert_eq!(converted.summary.index_count, 6);
    assert_eq!(converted.summary.animation_count, 1);
}

#[test]
fn test_clip_failures_do_not_abort_target() {
    let data = write_elu(MESH_VER7, &[MaterialDef::base(0)], &pelvis_chest());
    let clips = [
        clip("gone", None),
        clip("broken", Some(vec![1, 2, 3])),
        clip("morph", Some(write_matrix_ani(0x1003, &["pelvis"], 2))),
        clip("other", Some(write_bone_ani(0x1003, 1, &[BoneDef::new("tail")]))),
        clip("walk", Some(pelvis_clip())),
        clip("walk", Some(pelvis_clip())),
    ];
    let converted =
        convert_to_memory(&data, &clips, &NoTextures, &ConvertOptions::default()).unwrap();

    let statuses: Vec<_> = converted.clips.iter().map(|c| c.status.clone()).collect();
    assert_eq!(statuses[0], ClipStatus::Missing);
    assert!(matches!(statuses[1], ClipStatus::Error { .. }));
    assert!(matches!(statuses[2], ClipStatus::Skipped { .. }));
    assert!(matches!(statuses[3], ClipStatus::Skipped { .. }));
    assert_eq!(
        statuses[5],
        ClipStatus::Added {
            output_name: "walk#m0".to_string()
        }
    );

    let gltf = gltf_from(&converted.glb);
    let names: Vec<_> = gltf.animations().filter_map(|a| a.name().map(str::to_string)).collect();
    assert_eq!(names, vec!["walk", "walk#m0"]);
}

#[test]
fn test_signature_mismatch_fails_target() {
    let mut data = write_elu(MESH_VER7, &[], &pelvis_chest());
    data[0] ^= 0xFF;
    let err = convert_to_memory(&data, &[], &NoTextures, &ConvertOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        elu_export::ConvertError::Mesh(DecodeError::FormatMismatch { .. })
    ));
}

#[test]
fn test_submaterials_and_shared_textures() {
    let base = MaterialDef {
        sub_count: 2,
        ..MaterialDef::base(0)
    };
    let sub = |sub_id: i32, map: &str| MaterialDef {
        sub_id,
        diffuse_map: map.to_string(),
        ..MaterialDef::base(0)
    };
    let materials = [base, sub(0, "skin.bmp"), sub(1, "skin.bmp")];

    let mut node = NodeDef::new("body", "").with_triangle();
    node.faces = vec![
        FaceDef {
            selector: 0,
            ..FaceDef::new([0, 1, 2])
        },
        FaceDef {
            selector: -1,
            ..FaceDef::new([0, 2, 1])
        },
    ];
    let data = write_elu(MESH_VER7, &materials, &[node]);

    let resolver = |name: &str| Some(format!("textures/{name}"));
    let converted = convert_to_memory(&data, &[], &resolver, &ConvertOptions::default()).unwrap();

    let gltf = gltf_from(&converted.glb);
    assert_eq!(gltf.materials().count(), 3);
    assert_eq!(gltf.images().count(), 1);
    assert_eq!(gltf.textures().count(), 1);
    assert_eq!(gltf.samplers().count(), 1);

    // Selector 0 resolves to sub 0, selector -1 wraps to sub 1
    let mesh = gltf.meshes().next().unwrap();
    let materials: Vec<_> = mesh
        .primitives()
        .map(|p| p.material().index())
        .collect();
    assert_eq!(materials, vec![Some(1), Some(2)]);
}
