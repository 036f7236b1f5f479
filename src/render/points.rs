use super::fbo::ParticleBuffers;
use super::helpers;
use super::targets::HDR_FORMAT;
use particles_core::PointUniforms;

/// Quad corners per particle instance.
const QUAD_VERTICES: u32 = 6;

pub(crate) struct PointResources {
    pipeline: wgpu::RenderPipeline,
    pub(crate) uniform_buffer: wgpu::Buffer,
    /// Indexed by the ping-pong slot holding the positions to draw.
    bind_groups: [wgpu::BindGroup; 2],
}

pub(crate) fn create_point_resources(
    device: &wgpu::Device,
    buffers: &ParticleBuffers,
) -> PointResources {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("particles_shader"),
        source: wgpu::ShaderSource::Wgsl(particles_core::PARTICLES_WGSL.into()),
    });
    let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("points_bgl"),
        entries: &[
            helpers::uniform_entry(0, wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT),
            helpers::texture_entry(1, wgpu::ShaderStages::VERTEX, false),
        ],
    });
    let pl = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("points_pl"),
        bind_group_layouts: &[&bgl],
        push_constant_ranges: &[],
    });
    let lookup_attrs = [wgpu::VertexAttribute {
        format: wgpu::VertexFormat::Float32x2,
        offset: 0,
        shader_location: 0,
    }];
    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("points_pipeline"),
        layout: Some(&pl),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_points"),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<[f32; 2]>() as u64,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &lookup_attrs,
            }],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        primitive: wgpu::PrimitiveState::default(),
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_points"),
            targets: &[Some(wgpu::ColorTargetState {
                format: HDR_FORMAT,
                blend: Some(helpers::ADDITIVE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        cache: None,
        multiview: None,
    });
    let uniform_buffer =
        helpers::uniform_buffer(device, "points_uniforms", std::mem::size_of::<PointUniforms>());

    let make_bg = |label: &str, positions: &wgpu::TextureView| {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(positions),
                },
            ],
        })
    };
    let [slot0, slot1] = buffers.positions.slots();
    let bind_groups = [
        make_bg("points_bg_slot0", &slot0.view),
        make_bg("points_bg_slot1", &slot1.view),
    ];

    PointResources {
        pipeline,
        uniform_buffer,
        bind_groups,
    }
}

impl PointResources {
    pub(crate) fn write(&self, queue: &wgpu::Queue, uniforms: &PointUniforms) {
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(uniforms));
    }

    /// Draw every particle from the position texture in `slot`.
    pub(crate) fn draw(&self, rpass: &mut wgpu::RenderPass<'_>, buffers: &ParticleBuffers, slot: usize) {
        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &self.bind_groups[slot], &[]);
        rpass.set_vertex_buffer(0, buffers.lookup.slice(..));
        rpass.draw(0..QUAD_VERTICES, 0..buffers.count());
    }
}
