// Flatten loaded model instances into draw records for the scene pass.
//
// Pure glam math; kept free of wgpu so it can be tested on the host.

use glam::Mat4;
use metro_core::{ModelInstance, ModelKey};

/// Per-draw uniform block (layout shared with `scene.wgsl`).
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DrawUniforms {
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 4],
    pub base_color: [f32; 4],
    pub flags: [u32; 4],
}

impl DrawUniforms {
    pub fn new(model: Mat4, base_color: [f32; 4], skinned: bool) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            normal: model.inverse().transpose().to_cols_array_2d(),
            base_color,
            flags: [skinned as u32, 0, 0, 0],
        }
    }
}

#[derive(Clone, Debug)]
pub struct DrawItem {
    pub key: ModelKey,
    pub mesh: usize,
    pub primitive: usize,
    pub skin: Option<usize>,
    pub uniforms: DrawUniforms,
}

/// Joint palette for one skin of one model instance.
#[derive(Clone, Debug)]
pub struct SkinPose {
    pub key: ModelKey,
    pub skin: usize,
    pub joints: Vec<Mat4>,
}

#[derive(Clone, Debug, Default)]
pub struct DrawList {
    pub items: Vec<DrawItem>,
    pub skins: Vec<SkinPose>,
}

/// One draw per primitive of every mesh-bearing node, in model order.
pub fn collect<'a>(models: impl Iterator<Item = (ModelKey, &'a ModelInstance)>) -> DrawList {
    let mut list = DrawList::default();
    for (key, inst) in models {
        let data = &inst.data;
        let world = inst.world_matrices();
        for skin in 0..data.skins.len() {
            list.skins.push(SkinPose {
                key,
                skin,
                joints: inst.joint_matrices(skin, &world),
            });
        }
        for (node_index, node) in data.nodes.iter().enumerate() {
            let Some(mesh) = node.mesh else {
                continue;
            };
            let Some(mesh_data) = data.meshes.get(mesh) else {
                continue;
            };
            let skin = node.skin.filter(|s| *s < data.skins.len());
            let model = world[node_index];
            for (primitive, prim) in mesh_data.primitives.iter().enumerate() {
                list.items.push(DrawItem {
                    key,
                    mesh,
                    primitive,
                    skin,
                    uniforms: DrawUniforms::new(model, prim.base_color, skin.is_some()),
                });
            }
        }
    }
    list
}
