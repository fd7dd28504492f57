// Host-side tests for draw-list construction.
// The main crate is wasm-only, so we include the pure-Rust module directly.

#![allow(dead_code)]
mod draws {
    include!("../src/draws.rs");
}

use draws::*;
use glam::{Mat4, Vec3};
use metro_core::model::{MeshData, NodeData, Primitive, SkinData};
use metro_core::{ModelData, ModelInstance, ModelKey, Transform};
use std::sync::Arc;

fn triangle(color: [f32; 4]) -> Primitive {
    Primitive {
        positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]],
        normals: vec![[0.0, 1.0, 0.0]; 3],
        joints: vec![[0; 4]; 3],
        weights: vec![[1.0, 0.0, 0.0, 0.0]; 3],
        indices: vec![0, 2, 1],
        base_color: color,
    }
}

// Group node 0 holding a two-primitive mesh on node 1, offset by +1 on x.
fn two_primitive_model(skin: Option<usize>) -> ModelData {
    ModelData {
        nodes: vec![
            NodeData {
                name: Some("Group".into()),
                children: vec![1],
                ..Default::default()
            },
            NodeData {
                name: Some("Body".into()),
                transform: Transform::from_translation(Vec3::new(1.0, 0.0, 0.0)),
                mesh: Some(0),
                skin,
                ..Default::default()
            },
        ],
        roots: vec![0],
        meshes: vec![MeshData {
            name: Some("Body".into()),
            primitives: vec![triangle([1.0, 0.0, 0.0, 1.0]), triangle([0.0, 0.0, 1.0, 1.0])],
        }],
        skins: vec![SkinData {
            joints: vec![1],
            inverse_bind: vec![Mat4::IDENTITY],
        }],
        clips: Vec::new(),
    }
}

#[test]
fn one_draw_per_primitive_with_world_transform() {
    let mut inst = ModelInstance::new(Arc::new(two_primitive_model(None)));
    inst.root.scale = Vec3::splat(2.0);
    let list = collect(std::iter::once((ModelKey::Environment, &inst)));

    assert_eq!(list.items.len(), 2);
    let first = &list.items[0];
    assert_eq!(first.key, ModelKey::Environment);
    assert_eq!((first.mesh, first.primitive), (0, 0));
    assert_eq!(list.items[1].primitive, 1);
    // root scale 2 applied to the node's +1 offset
    assert_eq!(first.uniforms.model[3], [2.0, 0.0, 0.0, 1.0]);
    assert_eq!(first.uniforms.base_color, [1.0, 0.0, 0.0, 1.0]);
    assert_eq!(list.items[1].uniforms.base_color, [0.0, 0.0, 1.0, 1.0]);
    assert_eq!(first.uniforms.flags[0], 0);
}

#[test]
fn skinned_nodes_flag_their_draws_and_emit_a_palette() {
    let inst = ModelInstance::new(Arc::new(two_primitive_model(Some(0))));
    let list = collect(std::iter::once((ModelKey::Player, &inst)));

    assert!(list.items.iter().all(|d| d.skin == Some(0)));
    assert!(list.items.iter().all(|d| d.uniforms.flags[0] == 1));
    assert_eq!(list.skins.len(), 1);
    let world = inst.world_matrices();
    assert_eq!(list.skins[0].joints, vec![world[1]]);
}

#[test]
fn dangling_skin_index_draws_unskinned() {
    let inst = ModelInstance::new(Arc::new(two_primitive_model(Some(5))));
    let list = collect(std::iter::once((ModelKey::Npc(0), &inst)));
    assert!(list.items.iter().all(|d| d.skin.is_none()));
    assert!(list.items.iter().all(|d| d.uniforms.flags[0] == 0));
}

#[test]
fn keys_follow_their_models() {
    let a = ModelInstance::new(Arc::new(two_primitive_model(None)));
    let b = ModelInstance::new(Arc::new(two_primitive_model(None)));
    let models = vec![(ModelKey::Npc(0), &a), (ModelKey::Npc(1), &b)];
    let list = collect(models.into_iter());
    let keys: Vec<ModelKey> = list.items.iter().map(|d| d.key).collect();
    assert_eq!(
        keys,
        vec![ModelKey::Npc(0), ModelKey::Npc(0), ModelKey::Npc(1), ModelKey::Npc(1)]
    );
}

#[test]
fn normal_matrix_undoes_non_uniform_scale() {
    let mut inst = ModelInstance::new(Arc::new(two_primitive_model(None)));
    inst.root.scale = Vec3::new(3.0, 1.5, 3.0);
    let list = collect(std::iter::once((ModelKey::Environment, &inst)));
    let normal = Mat4::from_cols_array_2d(&list.items[0].uniforms.normal);
    let n = normal.transform_vector3(Vec3::Y).normalize();
    assert!((n - Vec3::Y).length() < 1e-5);
}
