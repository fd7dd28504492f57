use crate::constants::{CLEAR_COLOR, DRAW_UNIFORM_SIZE, DRAW_UNIFORM_STRIDE, MAX_DRAWS};
use crate::draws;
use fnv::FnvHashMap;
use metro_core::{
    light_color_vec3, FrameReport, ModelKey, PassKind, SceneContext, AMBIENT_INTENSITY,
    DIRECTIONAL_INTENSITY, DIRECTIONAL_POSITION, GLITCH_DISPLACEMENT_SIZE, POST_WGSL, SCENE_WGSL,
};
use web_sys as web;
use wgpu;

mod helpers;
mod mesh;
mod post;
mod targets;

use mesh::GpuModel;
use targets::{RenderTargets, DEPTH_FORMAT, HDR_FORMAT};

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct Globals {
    view_proj: [[f32; 4]; 4],
    light_dir: [f32; 4],
    light_color: [f32; 4],
    ambient: [f32; 4],
}

pub struct GpuState<'a> {
    surface: wgpu::Surface<'a>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    #[allow(dead_code)]
    config: wgpu::SurfaceConfiguration,

    targets: RenderTargets,
    scene_pipeline: wgpu::RenderPipeline,
    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
    draw_buffer: wgpu::Buffer,
    draw_bind_group: wgpu::BindGroup,
    draw_staging: Vec<u8>,
    joints_bgl: wgpu::BindGroupLayout,
    #[allow(dead_code)]
    dummy_joints_buffer: wgpu::Buffer,
    dummy_joints: wgpu::BindGroup,

    post: post::PostResources,
    post_bind_group: wgpu::BindGroup,

    // Uploaded lazily, the first frame a model is ready
    models: FnvHashMap<ModelKey, GpuModel>,
    overflow_warned: bool,
    clear_color: wgpu::Color,
}

impl<'a> GpuState<'a> {
    pub async fn new(
        canvas: &'a web::HtmlCanvasElement,
        displacement_rgba: &[u8],
    ) -> anyhow::Result<Self> {
        let width = canvas.width().max(1);
        let height = canvas.height().max(1);

        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No WebGPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: None,
                },
                None,
            )
            .await
            .map_err(|e| anyhow::anyhow!(format!("request_device error: {:?}", e)))?;
        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| {
                matches!(
                    f,
                    wgpu::TextureFormat::Bgra8UnormSrgb | wgpu::TextureFormat::Rgba8UnormSrgb
                )
            })
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| anyhow::anyhow!("surface reports no formats"))?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let targets = RenderTargets::new(&device, width, height);

        // Scene pass: globals (0), per-draw dynamic uniforms (1), joint palette (2)
        let scene_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(SCENE_WGSL.into()),
        });
        let globals_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("globals_bgl"),
            entries: &[helpers::uniform_entry(
                0,
                wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                false,
                None,
            )],
        });
        let draw_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("draw_bgl"),
            entries: &[helpers::uniform_entry(
                0,
                wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                true,
                wgpu::BufferSize::new(DRAW_UNIFORM_SIZE),
            )],
        });
        let joints_bgl = mesh::create_joints_bgl(&device);

        let globals_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("globals"),
            size: std::mem::size_of::<Globals>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("bg_globals"),
            layout: &globals_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });
        let draw_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("draw_uniforms"),
            size: MAX_DRAWS as u64 * DRAW_UNIFORM_STRIDE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let draw_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("bg_draw"),
            layout: &draw_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &draw_buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(DRAW_UNIFORM_SIZE),
                }),
            }],
        });
        let (dummy_joints_buffer, dummy_joints) = mesh::create_dummy_joints(&device, &joints_bgl);

        let scene_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pl_scene"),
            bind_group_layouts: &[&globals_bgl, &draw_bgl, &joints_bgl],
            push_constant_ranges: &[],
        });
        let scene_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("scene_pipeline"),
            layout: Some(&scene_layout),
            vertex: wgpu::VertexState {
                module: &scene_shader,
                entry_point: Some("vs_main"),
                buffers: &[mesh::Vertex::layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &scene_shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: HDR_FORMAT,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            cache: None,
            multiview: None,
        });

        // Output pass: copy or glitch, scene color -> swapchain
        let post_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("post_shader"),
            source: wgpu::ShaderSource::Wgsl(POST_WGSL.into()),
        });
        let post = post::create_post_resources(
            &device,
            &queue,
            &post_shader,
            format,
            displacement_rgba,
            GLITCH_DISPLACEMENT_SIZE,
        );
        let linear_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("linear_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });
        let post_bind_group =
            post::create_bind_group(&device, &post, &linear_sampler, &targets.hdr_view);

        log::info!("[render] WebGPU ready ({}x{}, {:?})", width, height, format);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            targets,
            scene_pipeline,
            globals_buffer,
            globals_bind_group,
            draw_buffer,
            draw_bind_group,
            draw_staging: Vec::new(),
            joints_bgl,
            dummy_joints_buffer,
            dummy_joints,
            post,
            post_bind_group,
            models: FnvHashMap::default(),
            overflow_warned: false,
            clear_color: wgpu::Color {
                r: CLEAR_COLOR[0],
                g: CLEAR_COLOR[1],
                b: CLEAR_COLOR[2],
                a: CLEAR_COLOR[3],
            },
        })
    }

    fn sync_models(&mut self, scene: &SceneContext) {
        for (key, inst) in scene.models() {
            if self.models.contains_key(&key) {
                continue;
            }
            let label = format!("{:?}", key);
            let gpu = GpuModel::upload(&self.device, &self.joints_bgl, &inst.data, &label);
            self.models.insert(key, gpu);
        }
    }

    fn write_globals(&self, scene: &SceneContext) {
        let light = light_color_vec3();
        let light = [
            helpers::srgb_to_linear(light.x),
            helpers::srgb_to_linear(light.y),
            helpers::srgb_to_linear(light.z),
        ];
        let dir = DIRECTIONAL_POSITION.normalize();
        let g = Globals {
            view_proj: scene.camera.view_proj().to_cols_array_2d(),
            light_dir: [dir.x, dir.y, dir.z, 0.0],
            light_color: [light[0], light[1], light[2], DIRECTIONAL_INTENSITY],
            ambient: [light[0], light[1], light[2], AMBIENT_INTENSITY],
        };
        self.queue
            .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&g));
    }

    /// Draw every ready model, then run the output pass chosen by `report`.
    pub fn render(
        &mut self,
        scene: &SceneContext,
        report: &FrameReport,
    ) -> Result<(), wgpu::SurfaceError> {
        self.sync_models(scene);
        self.write_globals(scene);

        let list = draws::collect(scene.models());
        for pose in &list.skins {
            if let Some(model) = self.models.get(&pose.key) {
                model.write_joints(&self.queue, pose.skin, &pose.joints);
            }
        }
        if list.items.len() > MAX_DRAWS && !self.overflow_warned {
            log::warn!(
                "[render] {} draws requested, drawing the first {}",
                list.items.len(),
                MAX_DRAWS
            );
            self.overflow_warned = true;
        }
        let count = list.items.len().min(MAX_DRAWS);
        let stride = DRAW_UNIFORM_STRIDE as usize;
        let size = DRAW_UNIFORM_SIZE as usize;
        self.draw_staging.clear();
        self.draw_staging.resize(count * stride, 0);
        for (i, item) in list.items.iter().take(count).enumerate() {
            self.draw_staging[i * stride..i * stride + size]
                .copy_from_slice(bytemuck::bytes_of(&item.uniforms));
        }
        if count > 0 {
            self.queue
                .write_buffer(&self.draw_buffer, 0, &self.draw_staging);
        }

        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("encoder"),
            });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.targets.hdr_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.targets.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            rpass.set_pipeline(&self.scene_pipeline);
            rpass.set_bind_group(0, &self.globals_bind_group, &[]);
            for (i, item) in list.items.iter().take(count).enumerate() {
                let Some(model) = self.models.get(&item.key) else {
                    continue;
                };
                let Some(prim) = model.primitive(item.mesh, item.primitive) else {
                    continue;
                };
                let joints = item
                    .skin
                    .and_then(|s| model.skin_bind_group(s))
                    .unwrap_or(&self.dummy_joints);
                let offset = (i as u64 * DRAW_UNIFORM_STRIDE) as u32;
                rpass.set_bind_group(1, &self.draw_bind_group, &[offset]);
                rpass.set_bind_group(2, joints, &[]);
                rpass.set_vertex_buffer(0, prim.vertex_buffer.slice(..));
                rpass.set_index_buffer(prim.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                rpass.draw_indexed(0..prim.index_count, 0, 0..1);
            }
        }

        let glitch = if report.passes.contains(&PassKind::Glitch) {
            report.glitch
        } else {
            None
        };
        let pipeline = match glitch {
            Some(u) => {
                post::write_glitch_uniforms(&self.queue, &self.post.uniform_buffer, &u);
                &self.post.glitch_pipeline
            }
            None => &self.post.copy_pipeline,
        };
        post::blit(
            &mut encoder,
            "output_pass",
            &view,
            pipeline,
            &self.post_bind_group,
        );

        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}

