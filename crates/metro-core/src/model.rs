//! glTF import into plain data, and mutable instances of that data.

use crate::animation::{AnimationClip, Channel, ChannelValues, Interpolation};
use crate::error::LoadError;
use crate::transform::Transform;
use glam::{Mat4, Quat, Vec3};
use gltf::animation::util::ReadOutputs;
use gltf::animation::Property;
use gltf::mesh::Mode;
use std::sync::Arc;

#[derive(Clone, Debug, Default)]
pub struct NodeData {
    pub name: Option<String>,
    pub transform: Transform,
    pub children: Vec<usize>,
    pub mesh: Option<usize>,
    pub skin: Option<usize>,
}

/// One triangle list. Attribute vectors all have `positions.len()` entries.
#[derive(Clone, Debug, Default)]
pub struct Primitive {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub joints: Vec<[u32; 4]>,
    pub weights: Vec<[f32; 4]>,
    pub indices: Vec<u32>,
    pub base_color: [f32; 4],
}

#[derive(Clone, Debug, Default)]
pub struct MeshData {
    pub name: Option<String>,
    pub primitives: Vec<Primitive>,
}

#[derive(Clone, Debug, Default)]
pub struct SkinData {
    pub joints: Vec<usize>,
    pub inverse_bind: Vec<Mat4>,
}

/// Immutable contents of one model file.
#[derive(Clone, Debug, Default)]
pub struct ModelData {
    pub nodes: Vec<NodeData>,
    pub roots: Vec<usize>,
    pub meshes: Vec<MeshData>,
    pub skins: Vec<SkinData>,
    pub clips: Vec<Arc<AnimationClip>>,
}

impl ModelData {
    /// Parse a binary `.glb` or a `.gltf` with embedded (data URI) buffers.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LoadError> {
        let gltf = gltf::Gltf::from_slice(bytes)?;
        let buffers = gltf::import_buffers(&gltf.document, None, gltf.blob.clone())?;
        let document = gltf.document;

        let nodes: Vec<NodeData> = document
            .nodes()
            .map(|node| {
                let (t, r, s) = node.transform().decomposed();
                NodeData {
                    name: node.name().map(str::to_string),
                    transform: Transform {
                        translation: Vec3::from_array(t),
                        rotation: Quat::from_array(r).normalize(),
                        scale: Vec3::from_array(s),
                    },
                    children: node.children().map(|c| c.index()).collect(),
                    mesh: node.mesh().map(|m| m.index()),
                    skin: node.skin().map(|s| s.index()),
                }
            })
            .collect();
        if nodes.is_empty() {
            return Err(LoadError::NoScene);
        }

        let roots = match document.default_scene().or_else(|| document.scenes().next()) {
            Some(scene) => scene.nodes().map(|n| n.index()).collect(),
            None => parentless(&nodes),
        };

        let mut meshes = Vec::new();
        for mesh in document.meshes() {
            let mut primitives = Vec::new();
            for primitive in mesh.primitives() {
                if primitive.mode() != Mode::Triangles {
                    continue;
                }
                let reader = primitive.reader(|b| buffers.get(b.index()).map(|d| d.0.as_slice()));
                let Some(positions) = reader.read_positions() else {
                    continue;
                };
                let positions: Vec<[f32; 3]> = positions.collect();
                if positions.is_empty() {
                    continue;
                }
                let n = positions.len();
                let indices: Vec<u32> = reader
                    .read_indices()
                    .map(|it| it.into_u32().collect())
                    .unwrap_or_else(|| (0..n as u32).collect());
                let normals: Vec<[f32; 3]> = match reader.read_normals() {
                    Some(it) => it.collect(),
                    None => compute_normals(&positions, &indices),
                };
                let joints: Vec<[u32; 4]> = reader
                    .read_joints(0)
                    .map(|it| {
                        it.into_u16()
                            .map(|j| [j[0] as u32, j[1] as u32, j[2] as u32, j[3] as u32])
                            .collect()
                    })
                    .unwrap_or_default();
                let weights: Vec<[f32; 4]> = reader
                    .read_weights(0)
                    .map(|it| it.into_f32().collect())
                    .unwrap_or_default();
                primitives.push(Primitive {
                    positions,
                    normals: pad_to(normals, n, [0.0, 1.0, 0.0]),
                    joints: pad_to(joints, n, [0; 4]),
                    weights: pad_to(weights, n, [0.0; 4]),
                    indices,
                    base_color: primitive
                        .material()
                        .pbr_metallic_roughness()
                        .base_color_factor(),
                });
            }
            meshes.push(MeshData {
                name: mesh.name().map(str::to_string),
                primitives,
            });
        }

        let skins = document
            .skins()
            .map(|skin| {
                let joints: Vec<usize> = skin.joints().map(|j| j.index()).collect();
                let mut inverse_bind: Vec<Mat4> = skin
                    .reader(|b| buffers.get(b.index()).map(|d| d.0.as_slice()))
                    .read_inverse_bind_matrices()
                    .map(|it| it.map(|m| Mat4::from_cols_array_2d(&m)).collect())
                    .unwrap_or_default();
                inverse_bind.resize(joints.len(), Mat4::IDENTITY);
                SkinData {
                    joints,
                    inverse_bind,
                }
            })
            .collect();

        let mut clips = Vec::new();
        for (anim_index, animation) in document.animations().enumerate() {
            let name = animation
                .name()
                .map(str::to_string)
                .unwrap_or_else(|| format!("animation_{anim_index}"));
            let mut channels = Vec::new();
            for channel in animation.channels() {
                let target = channel.target();
                let interpolation = match channel.sampler().interpolation() {
                    gltf::animation::Interpolation::Linear => Interpolation::Linear,
                    gltf::animation::Interpolation::Step => Interpolation::Step,
                    gltf::animation::Interpolation::CubicSpline => {
                        log::warn!(
                            "[model] animation '{}' uses CubicSpline interpolation; skipping channel (node {})",
                            name,
                            target.node().index()
                        );
                        continue;
                    }
                };
                let reader = channel.reader(|b| buffers.get(b.index()).map(|d| d.0.as_slice()));
                let Some(inputs) = reader.read_inputs() else {
                    continue;
                };
                let times: Vec<f32> = inputs.collect();
                let Some(outputs) = reader.read_outputs() else {
                    continue;
                };
                let values = match (target.property(), outputs) {
                    (Property::Translation, ReadOutputs::Translations(v)) => {
                        ChannelValues::Translation(v.map(Vec3::from_array).collect())
                    }
                    (Property::Scale, ReadOutputs::Scales(v)) => {
                        ChannelValues::Scale(v.map(Vec3::from_array).collect())
                    }
                    (Property::Rotation, ReadOutputs::Rotations(v)) => ChannelValues::Rotation(
                        v.into_f32()
                            .map(|q| {
                                let q = Quat::from_array(q);
                                if q.length_squared() > 0.0 {
                                    q.normalize()
                                } else {
                                    Quat::IDENTITY
                                }
                            })
                            .collect(),
                    ),
                    // morph weights are not consumed
                    _ => continue,
                };
                if times.is_empty() || value_count(&values) != times.len() {
                    log::warn!(
                        "[model] animation '{}' channel on node {} has mismatched keyframes; skipped",
                        name,
                        target.node().index()
                    );
                    continue;
                }
                channels.push(Channel {
                    node: target.node().index(),
                    interpolation,
                    times,
                    values,
                });
            }
            clips.push(Arc::new(AnimationClip::new(name, channels)));
        }

        Ok(Self {
            nodes,
            roots,
            meshes,
            skins,
            clips,
        })
    }

    /// Single unnamed node carrying the given clips. Used when only the
    /// animation side of a model matters.
    pub fn with_clips(clips: Vec<AnimationClip>) -> Self {
        Self {
            nodes: vec![NodeData::default()],
            roots: vec![0],
            clips: clips.into_iter().map(Arc::new).collect(),
            ..Default::default()
        }
    }

    /// Depth-first node order starting at the roots; each node visited once.
    pub fn traversal(&self) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut seen = vec![false; self.nodes.len()];
        let mut stack: Vec<usize> = self.roots.iter().rev().copied().collect();
        while let Some(i) = stack.pop() {
            if i >= self.nodes.len() || seen[i] {
                continue;
            }
            seen[i] = true;
            order.push(i);
            stack.extend(self.nodes[i].children.iter().rev().copied());
        }
        order
    }

    pub fn find_node(&self, name: &str) -> Option<usize> {
        self.traversal()
            .into_iter()
            .find(|&i| self.nodes[i].name.as_deref() == Some(name))
    }
}

fn parentless(nodes: &[NodeData]) -> Vec<usize> {
    let mut has_parent = vec![false; nodes.len()];
    for node in nodes {
        for &c in &node.children {
            if let Some(flag) = has_parent.get_mut(c) {
                *flag = true;
            }
        }
    }
    (0..nodes.len()).filter(|&i| !has_parent[i]).collect()
}

fn value_count(values: &ChannelValues) -> usize {
    match values {
        ChannelValues::Translation(v) | ChannelValues::Scale(v) => v.len(),
        ChannelValues::Rotation(v) => v.len(),
    }
}

fn pad_to<T: Copy>(mut v: Vec<T>, n: usize, fill: T) -> Vec<T> {
    v.resize(n, fill);
    v
}

fn compute_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut acc = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let (a, b, c) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
        if a >= positions.len() || b >= positions.len() || c >= positions.len() {
            continue;
        }
        let pa = Vec3::from_array(positions[a]);
        let pb = Vec3::from_array(positions[b]);
        let pc = Vec3::from_array(positions[c]);
        let n = (pb - pa).cross(pc - pa);
        acc[a] += n;
        acc[b] += n;
        acc[c] += n;
    }
    acc.into_iter()
        .map(|n| n.try_normalize().unwrap_or(Vec3::Y).to_array())
        .collect()
}

/// Mutable copy of a model placed in the scene: a root transform (the glTF
/// scene group) plus a local transform per node.
#[derive(Clone, Debug)]
pub struct ModelInstance {
    pub data: Arc<ModelData>,
    pub root: Transform,
    pub pose: Vec<Transform>,
}

impl ModelInstance {
    pub fn new(data: Arc<ModelData>) -> Self {
        let pose = data.nodes.iter().map(|n| n.transform).collect();
        Self {
            data,
            root: Transform::IDENTITY,
            pose,
        }
    }

    /// World matrix per node. Nodes unreachable from the roots are placed
    /// directly under the root transform.
    pub fn world_matrices(&self) -> Vec<Mat4> {
        let root = self.root.matrix();
        let mut world: Vec<Mat4> = self.pose.iter().map(|t| root * t.matrix()).collect();
        let mut stack: Vec<(usize, Mat4)> = self.data.roots.iter().map(|&r| (r, root)).collect();
        let mut seen = vec![false; self.pose.len()];
        while let Some((i, parent)) = stack.pop() {
            if i >= self.pose.len() || seen[i] {
                continue;
            }
            seen[i] = true;
            let m = parent * self.pose[i].matrix();
            world[i] = m;
            for &c in &self.data.nodes[i].children {
                stack.push((c, m));
            }
        }
        world
    }

    /// Joint palette for `skin`: world(joint) * inverse_bind(joint).
    pub fn joint_matrices(&self, skin: usize, world: &[Mat4]) -> Vec<Mat4> {
        let Some(skin) = self.data.skins.get(skin) else {
            return Vec::new();
        };
        skin.joints
            .iter()
            .zip(skin.inverse_bind.iter())
            .map(|(&j, ibm)| world.get(j).copied().unwrap_or(Mat4::IDENTITY) * *ibm)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLATFORMS_GLTF: &str = r#"{
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [ { "nodes": [0] } ],
        "nodes": [
            { "name": "Carriage", "children": [1, 2] },
            { "name": "SM_MERGED_Floor_Platform_01", "translation": [0.0, 0.0, 4.0] },
            { "name": "SM_MERGED_Floor_Platform_01001", "translation": [0.0, 0.0, -6.0] }
        ]
    }"#;

    #[test]
    fn imports_named_nodes_from_gltf_json() {
        let data = ModelData::from_bytes(PLATFORMS_GLTF.as_bytes()).expect("import");
        assert_eq!(data.roots, vec![0]);
        assert_eq!(data.find_node("SM_MERGED_Floor_Platform_01"), Some(1));
        assert_eq!(data.find_node("SM_MERGED_Floor_Platform_01001"), Some(2));
        assert_eq!(data.nodes[2].transform.translation.z, -6.0);
        assert!(data.clips.is_empty());
    }

    #[test]
    fn world_matrices_include_root_scale() {
        let data = Arc::new(ModelData::from_bytes(PLATFORMS_GLTF.as_bytes()).unwrap());
        let mut inst = ModelInstance::new(data);
        inst.root.scale = Vec3::new(3.0, 1.5, 3.0);
        let world = inst.world_matrices();
        let p = world[1].transform_point3(Vec3::ZERO);
        assert!((p - Vec3::new(0.0, 0.0, 12.0)).length() < 1e-5);
    }

    #[test]
    fn garbage_bytes_fail_to_import() {
        assert!(ModelData::from_bytes(b"not a model").is_err());
    }

    #[test]
    fn computed_normals_face_up_for_ccw_floor() {
        let positions = [[0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0]];
        let normals = compute_normals(&positions, &[0, 1, 2]);
        assert!((normals[0][1] - 1.0).abs() < 1e-6);
    }
}
