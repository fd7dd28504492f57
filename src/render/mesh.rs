//! GPU copies of imported models: vertex/index buffers per primitive and a
//! joint palette buffer per skin.

use crate::constants::MAX_JOINTS;
use glam::Mat4;
use metro_core::model::Primitive;
use metro_core::ModelData;
use wgpu;
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
    joints: [u32; 4],
    weights: [f32; 4],
}

impl Vertex {
    const ATTRIBS: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
        2 => Uint32x4,
        3 => Float32x4,
    ];

    pub(crate) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

fn vertices(prim: &Primitive) -> Vec<Vertex> {
    (0..prim.positions.len())
        .map(|i| Vertex {
            position: prim.positions[i],
            normal: prim.normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
            joints: prim.joints.get(i).copied().unwrap_or([0; 4]),
            weights: prim.weights.get(i).copied().unwrap_or([0.0; 4]),
        })
        .collect()
}

pub(crate) struct GpuPrimitive {
    pub(crate) vertex_buffer: wgpu::Buffer,
    pub(crate) index_buffer: wgpu::Buffer,
    pub(crate) index_count: u32,
}

struct GpuSkin {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

pub(crate) struct GpuModel {
    primitives: Vec<Vec<Option<GpuPrimitive>>>,
    skins: Vec<GpuSkin>,
}

pub(crate) fn create_joints_bgl(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("joints_bgl"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Storage { read_only: true },
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    })
}

/// Single identity joint, bound for unskinned draws.
pub(crate) fn create_dummy_joints(
    device: &wgpu::Device,
    bgl: &wgpu::BindGroupLayout,
) -> (wgpu::Buffer, wgpu::BindGroup) {
    let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("joints_dummy"),
        contents: bytemuck::bytes_of(&Mat4::IDENTITY.to_cols_array()),
        usage: wgpu::BufferUsages::STORAGE,
    });
    let bind_group = joints_bind_group(device, bgl, &buffer);
    (buffer, bind_group)
}

fn joints_bind_group(
    device: &wgpu::Device,
    bgl: &wgpu::BindGroupLayout,
    buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("bg_joints"),
        layout: bgl,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }],
    })
}

impl GpuModel {
    pub(crate) fn upload(
        device: &wgpu::Device,
        joints_bgl: &wgpu::BindGroupLayout,
        data: &ModelData,
        label: &str,
    ) -> Self {
        let primitives = data
            .meshes
            .iter()
            .map(|mesh| {
                mesh.primitives
                    .iter()
                    .map(|prim| {
                        if prim.indices.is_empty() || prim.positions.is_empty() {
                            return None;
                        }
                        let vertex_buffer =
                            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                                label: Some(label),
                                contents: bytemuck::cast_slice(&vertices(prim)),
                                usage: wgpu::BufferUsages::VERTEX,
                            });
                        let index_buffer =
                            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                                label: Some(label),
                                contents: bytemuck::cast_slice(&prim.indices),
                                usage: wgpu::BufferUsages::INDEX,
                            });
                        Some(GpuPrimitive {
                            vertex_buffer,
                            index_buffer,
                            index_count: prim.indices.len() as u32,
                        })
                    })
                    .collect()
            })
            .collect();
        let skins = data
            .skins
            .iter()
            .map(|skin| {
                if skin.joints.len() > MAX_JOINTS {
                    log::warn!(
                        "[render] {}: skin has {} joints, palette holds {}",
                        label,
                        skin.joints.len(),
                        MAX_JOINTS
                    );
                }
                let buffer = device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some(label),
                    size: (MAX_JOINTS * std::mem::size_of::<Mat4>()) as u64,
                    usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                });
                let bind_group = joints_bind_group(device, joints_bgl, &buffer);
                GpuSkin { buffer, bind_group }
            })
            .collect();
        Self { primitives, skins }
    }

    pub(crate) fn primitive(&self, mesh: usize, primitive: usize) -> Option<&GpuPrimitive> {
        self.primitives.get(mesh)?.get(primitive)?.as_ref()
    }

    pub(crate) fn skin_bind_group(&self, skin: usize) -> Option<&wgpu::BindGroup> {
        self.skins.get(skin).map(|s| &s.bind_group)
    }

    pub(crate) fn write_joints(&self, queue: &wgpu::Queue, skin: usize, joints: &[Mat4]) {
        let Some(s) = self.skins.get(skin) else {
            return;
        };
        let n = joints.len().min(MAX_JOINTS);
        if n > 0 {
            queue.write_buffer(&s.buffer, 0, bytemuck::cast_slice(&joints[..n]));
        }
    }
}
