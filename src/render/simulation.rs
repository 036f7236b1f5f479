use super::fbo::{ParticleBuffers, POSITION_FORMAT};
use super::helpers;
use particles_core::SimUniforms;

/// Full-screen pass over the particle texture running `fs_simulate`.
pub(crate) struct SimulationResources {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    /// Indexed by the readable ping-pong slot.
    bind_groups: [wgpu::BindGroup; 2],
}

pub(crate) fn create_simulation_resources(
    device: &wgpu::Device,
    buffers: &ParticleBuffers,
) -> SimulationResources {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("simulation_shader"),
        source: wgpu::ShaderSource::Wgsl(particles_core::SIMULATION_WGSL.into()),
    });
    let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("simulation_bgl"),
        entries: &[
            helpers::uniform_entry(0, wgpu::ShaderStages::FRAGMENT),
            helpers::texture_entry(1, wgpu::ShaderStages::FRAGMENT, false),
            helpers::texture_entry(2, wgpu::ShaderStages::FRAGMENT, false),
        ],
    });
    let pl = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("simulation_pl"),
        bind_group_layouts: &[&bgl],
        push_constant_ranges: &[],
    });
    let pipeline = helpers::make_post_pipeline(
        device,
        "simulation_pipeline",
        &pl,
        &shader,
        "fs_simulate",
        POSITION_FORMAT,
        None,
    );
    let uniform_buffer =
        helpers::uniform_buffer(device, "simulation_uniforms", std::mem::size_of::<SimUniforms>());

    let make_bg = |label: &str, read: &wgpu::TextureView| {
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
                    resource: wgpu::BindingResource::TextureView(read),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&buffers.targets.view),
                },
            ],
        })
    };
    let [slot0, slot1] = buffers.positions.slots();
    let bind_groups = [
        make_bg("simulation_bg_read0", &slot0.view),
        make_bg("simulation_bg_read1", &slot1.view),
    ];

    SimulationResources {
        pipeline,
        uniform_buffer,
        bind_groups,
    }
}

impl SimulationResources {
    /// Encode one step reading slot `read` and writing the other one.
    /// Returns the slot now holding the fresh positions; roles are only
    /// swapped once the frame is submitted.
    pub(crate) fn encode_step(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        queue: &wgpu::Queue,
        buffers: &ParticleBuffers,
        read: usize,
        uniforms: &SimUniforms,
    ) -> usize {
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(uniforms));
        let write = 1 - read;
        helpers::blit(
            encoder,
            "simulation_pass",
            &buffers.positions.slots()[write].view,
            wgpu::Color::TRANSPARENT,
            &self.pipeline,
            &self.bind_groups[read],
            None,
        );
        write
    }
}
