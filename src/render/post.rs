use super::helpers;
use metro_core::GlitchUniforms;
use wgpu;
use wgpu::util::DeviceExt;

/// Output-pass resources: one layout shared by the copy and glitch pipelines.
///
/// Bindings: 0 scene color, 1 sampler, 2 glitch uniforms, 3 displacement map.
/// The copy pipeline ignores 2 and 3.
pub(crate) struct PostResources {
    pub(crate) bgl: wgpu::BindGroupLayout,
    pub(crate) uniform_buffer: wgpu::Buffer,
    pub(crate) copy_pipeline: wgpu::RenderPipeline,
    pub(crate) glitch_pipeline: wgpu::RenderPipeline,
    #[allow(dead_code)]
    displacement: wgpu::Texture,
    pub(crate) displacement_view: wgpu::TextureView,
}

pub(crate) fn create_post_resources(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    post_shader: &wgpu::ShaderModule,
    swap_format: wgpu::TextureFormat,
    displacement_rgba: &[u8],
    displacement_size: u32,
) -> PostResources {
    let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("post_bgl"),
        entries: &[
            helpers::texture_entry(0),
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
            helpers::uniform_entry(2, wgpu::ShaderStages::FRAGMENT, false, None),
            helpers::texture_entry(3),
        ],
    });
    let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("glitch_uniforms"),
        size: std::mem::size_of::<GlitchUniforms>() as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let displacement = device.create_texture_with_data(
        queue,
        &wgpu::TextureDescriptor {
            label: Some("glitch_displacement"),
            size: wgpu::Extent3d {
                width: displacement_size,
                height: displacement_size,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        },
        wgpu::util::TextureDataOrder::LayerMajor,
        displacement_rgba,
    );
    let displacement_view = displacement.create_view(&wgpu::TextureViewDescriptor::default());
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("pl_post"),
        bind_group_layouts: &[&bgl],
        push_constant_ranges: &[],
    });
    let copy_pipeline =
        helpers::make_post_pipeline(device, &layout, post_shader, "fs_copy", swap_format);
    let glitch_pipeline =
        helpers::make_post_pipeline(device, &layout, post_shader, "fs_glitch", swap_format);

    PostResources {
        bgl,
        uniform_buffer,
        copy_pipeline,
        glitch_pipeline,
        displacement,
        displacement_view,
    }
}

pub(crate) fn create_bind_group(
    device: &wgpu::Device,
    post: &PostResources,
    sampler: &wgpu::Sampler,
    source: &wgpu::TextureView,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("bg_post"),
        layout: &post.bgl,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(source),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: post.uniform_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 3,
                resource: wgpu::BindingResource::TextureView(&post.displacement_view),
            },
        ],
    })
}

#[inline]
pub(crate) fn write_glitch_uniforms(queue: &wgpu::Queue, buffer: &wgpu::Buffer, u: &GlitchUniforms) {
    queue.write_buffer(buffer, 0, bytemuck::bytes_of(u));
}

pub(crate) fn blit(
    encoder: &mut wgpu::CommandEncoder,
    label: &str,
    target: &wgpu::TextureView,
    pipeline: &wgpu::RenderPipeline,
    bind_group: &wgpu::BindGroup,
) {
    let mut r = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: target,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
    });
    r.set_pipeline(pipeline);
    r.set_bind_group(0, bind_group, &[]);
    r.draw(0..3, 0..1);
    drop(r);
}
