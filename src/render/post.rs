use super::helpers;
use super::targets::{ColorTarget, RenderTargets, HDR_FORMAT};
use particles_core::bloom::blur_offset;
use particles_core::{BloomSettings, BloomUniforms, MipSize};
use wgpu;

pub(crate) struct PostResources {
    pub(crate) bgl0: wgpu::BindGroupLayout, // tex+sampler+uniform
    pub(crate) bgl1: wgpu::BindGroupLayout, // tex+sampler
    pub(crate) threshold_pipeline: wgpu::RenderPipeline,
    pub(crate) blur_pipeline: wgpu::RenderPipeline,
    pub(crate) composite_pipeline: wgpu::RenderPipeline,
}

pub(crate) fn create_post_resources(
    device: &wgpu::Device,
    swap_format: wgpu::TextureFormat,
) -> PostResources {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("bloom_shader"),
        source: wgpu::ShaderSource::Wgsl(particles_core::BLOOM_WGSL.into()),
    });
    let bgl0 = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("post_bgl0"),
        entries: &[
            helpers::texture_entry(0, wgpu::ShaderStages::FRAGMENT, true),
            helpers::sampler_entry(1),
            helpers::uniform_entry(2, wgpu::ShaderStages::FRAGMENT),
        ],
    });
    let bgl1 = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("post_bgl1"),
        entries: &[
            helpers::texture_entry(0, wgpu::ShaderStages::FRAGMENT, true),
            helpers::sampler_entry(1),
        ],
    });
    let pl_single = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("pl_post_0"),
        bind_group_layouts: &[&bgl0],
        push_constant_ranges: &[],
    });
    let pl_composite = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("pl_post_comp"),
        bind_group_layouts: &[&bgl0, &bgl1],
        push_constant_ranges: &[],
    });
    let threshold_pipeline = helpers::make_post_pipeline(
        device,
        "threshold_pipeline",
        &pl_single,
        &shader,
        "fs_threshold",
        HDR_FORMAT,
        None,
    );
    let blur_pipeline = helpers::make_post_pipeline(
        device,
        "blur_pipeline",
        &pl_single,
        &shader,
        "fs_blur",
        HDR_FORMAT,
        None,
    );
    let composite_pipeline = helpers::make_post_pipeline(
        device,
        "composite_pipeline",
        &pl_composite,
        &shader,
        "fs_composite",
        swap_format,
        Some(wgpu::BlendState::REPLACE),
    );

    PostResources {
        bgl0,
        bgl1,
        threshold_pipeline,
        blur_pipeline,
        composite_pipeline,
    }
}

/// One post pass: its own uniform block plus the bind group sampling its
/// source. Separate buffers keep queued writes from clobbering each other
/// within a single submission.
pub(crate) struct PostPass {
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    /// Bloom base size; blur offsets are measured in its texels.
    grid: MipSize,
}

impl PostPass {
    fn new(
        device: &wgpu::Device,
        post: &PostResources,
        sampler: &wgpu::Sampler,
        label: &str,
        source: &ColorTarget,
        grid: MipSize,
    ) -> Self {
        let uniform_buffer =
            helpers::uniform_buffer(device, label, std::mem::size_of::<BloomUniforms>());
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &post.bgl0,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&source.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: uniform_buffer.as_entire_binding(),
                },
            ],
        });
        Self {
            uniform_buffer,
            bind_group,
            grid,
        }
    }

    fn write(&self, queue: &wgpu::Queue, settings: &BloomSettings, blur: f32) {
        let u = BloomUniforms::for_pass(settings, self.grid, blur);
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&u));
    }
}

/// Every bloom pass bound against the current render targets. Rebuilt
/// whenever the targets are.
pub(crate) struct BloomPasses {
    threshold: PostPass,
    /// (first, second) blur pass per mip level.
    blurs: Vec<(PostPass, PostPass)>,
    composite: PostPass,
    composite_bloom: wgpu::BindGroup,
}

pub(crate) fn build_bloom_passes(
    device: &wgpu::Device,
    post: &PostResources,
    sampler: &wgpu::Sampler,
    targets: &RenderTargets,
) -> BloomPasses {
    let grid = targets.base.size();
    let threshold = PostPass::new(device, post, sampler, "threshold_pass", &targets.hdr, grid);
    let mut blurs = Vec::with_capacity(targets.levels.len());
    let mut input = &targets.base;
    for (i, level) in targets.levels.iter().enumerate() {
        let first = PostPass::new(device, post, sampler, &format!("blur_h{}", i), input, grid);
        let second = PostPass::new(
            device,
            post,
            sampler,
            &format!("blur_v{}", i),
            &level.horizontal,
            grid,
        );
        blurs.push((first, second));
        input = &level.vertical;
    }
    let composite = PostPass::new(device, post, sampler, "composite_pass", &targets.hdr, grid);
    let composite_bloom = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("bg_bloom_output"),
        layout: &post.bgl1,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&targets.bloom_output().view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    });
    BloomPasses {
        threshold,
        blurs,
        composite,
        composite_bloom,
    }
}

impl BloomPasses {
    /// Threshold → per-level kawase blur → tinted composite onto `output`.
    pub(crate) fn encode(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        queue: &wgpu::Queue,
        post: &PostResources,
        targets: &RenderTargets,
        settings: &BloomSettings,
        output: &wgpu::TextureView,
    ) {
        self.threshold.write(queue, settings, 0.0);
        helpers::blit(
            encoder,
            "threshold_pass",
            &targets.base.view,
            wgpu::Color::BLACK,
            &post.threshold_pipeline,
            &self.threshold.bind_group,
            None,
        );

        for (i, ((first, second), level)) in self.blurs.iter().zip(targets.levels.iter()).enumerate() {
            let offset = blur_offset(i);
            first.write(queue, settings, offset);
            helpers::blit(
                encoder,
                "blur_h",
                &level.horizontal.view,
                wgpu::Color::BLACK,
                &post.blur_pipeline,
                &first.bind_group,
                None,
            );
            second.write(queue, settings, offset);
            helpers::blit(
                encoder,
                "blur_v",
                &level.vertical.view,
                wgpu::Color::BLACK,
                &post.blur_pipeline,
                &second.bind_group,
                None,
            );
        }

        self.composite.write(queue, settings, 0.0);
        helpers::blit(
            encoder,
            "composite",
            output,
            wgpu::Color::BLACK,
            &post.composite_pipeline,
            &self.composite.bind_group,
            Some(&self.composite_bloom),
        );
    }
}
