use crate::constants::{CLEAR_COLOR, MAX_FRAME_LATENCY};
use particles_core::fbo::sphere_targets;
use particles_core::{
    BloomChainPlan, BloomSettings, Error, GpuPipeline, ParticleLayout, PointUniforms, SimUniforms,
    TriangleInstance, Viewport, PARTICLE_TEX_HEIGHT, PARTICLE_TEX_WIDTH, SPHERE_RADIUS,
    TARGET_SEED, TRIANGLE_COUNT,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use web_sys as web;

mod fbo;
mod helpers;
mod points;
mod post;
mod simulation;
mod targets;
mod triangles;

use fbo::ParticleBuffers;
use points::PointResources;
use post::{BloomPasses, PostResources};
use simulation::SimulationResources;
use targets::RenderTargets;
use triangles::TriangleResources;

/// Everything recorded for one displayed frame.
pub struct GpuFrame {
    surface: wgpu::SurfaceTexture,
    view: wgpu::TextureView,
    encoder: wgpu::CommandEncoder,
    /// Ping-pong slot the draw reads; differs from the current slot once a
    /// step has been encoded.
    read_slot: usize,
}

/// WebGPU device, surface and every texture and pipeline the frame touches.
/// Dropping it releases all GPU resources at once.
pub struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    device_lost: Arc<AtomicBool>,

    particles: ParticleBuffers,
    simulation: SimulationResources,
    points: PointResources,
    triangles: TriangleResources,

    targets: RenderTargets,
    linear_sampler: wgpu::Sampler,
    post: PostResources,
    bloom: BloomPasses,

    clear_color: wgpu::Color,
}

impl GpuState {
    pub async fn new(
        canvas: web::HtmlCanvasElement,
        viewport: Viewport,
        plan: &BloomChainPlan,
    ) -> anyhow::Result<Self> {
        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas))?;
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
                    // Use default limits on web to avoid passing unknown fields to older WebGPU impls
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: Some("particles_device"),
                },
                None,
            )
            .await
            .map_err(|e| anyhow::anyhow!(format!("request_device error: {:?}", e)))?;

        let device_lost = Arc::new(AtomicBool::new(false));
        let lost_flag = device_lost.clone();
        device.set_device_lost_callback(move |reason, message| {
            log::error!("[gpu] device lost ({:?}): {}", reason, message);
            lost_flag.store(true, Ordering::SeqCst);
        });

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
            width: viewport.width,
            height: viewport.height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: MAX_FRAME_LATENCY,
        };
        surface.configure(&device, &config);

        let layout = ParticleLayout::new(PARTICLE_TEX_WIDTH, PARTICLE_TEX_HEIGHT);
        let target_data = sphere_targets(layout, SPHERE_RADIUS, TARGET_SEED);
        let particles = ParticleBuffers::new(&device, &queue, layout, &target_data);
        let simulation = simulation::create_simulation_resources(&device, &particles);
        let points = points::create_point_resources(&device, &particles);
        let triangles =
            triangles::create_triangle_resources(&device, &points.uniform_buffer, TRIANGLE_COUNT);

        let targets = RenderTargets::new(&device, viewport, plan);
        let linear_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("linear_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let post = post::create_post_resources(&device, format);
        let bloom = post::build_bloom_passes(&device, &post, &linear_sampler, &targets);

        log::info!(
            "[gpu] ready: {} particles, {}x{} surface, {} bloom mips",
            layout.count(),
            viewport.width,
            viewport.height,
            plan.n_mips()
        );

        let [r, g, b, a] = CLEAR_COLOR;
        Ok(Self {
            surface,
            device,
            queue,
            config,
            device_lost,
            particles,
            simulation,
            points,
            triangles,
            targets,
            linear_sampler,
            post,
            bloom,
            clear_color: wgpu::Color { r, g, b, a },
        })
    }

    fn rebuild_bloom_passes(&mut self) {
        self.bloom = post::build_bloom_passes(
            &self.device,
            &self.post,
            &self.linear_sampler,
            &self.targets,
        );
    }

    fn check_device(&self) -> Result<(), Error> {
        if self.device_lost.load(Ordering::SeqCst) {
            return Err(Error::ContextLost);
        }
        Ok(())
    }
}

impl GpuPipeline for GpuState {
    type Frame = GpuFrame;

    fn resize(&mut self, viewport: Viewport, bloom: &BloomChainPlan) -> Result<(), Error> {
        self.check_device()?;
        self.config.width = viewport.width;
        self.config.height = viewport.height;
        self.surface.configure(&self.device, &self.config);
        self.targets.recreate(&self.device, viewport, bloom);
        self.rebuild_bloom_passes();
        log::info!(
            "[gpu] resized to {}x{} (bloom base {}x{})",
            viewport.width,
            viewport.height,
            bloom.base.width,
            bloom.base.height
        );
        Ok(())
    }

    fn reallocate_bloom(&mut self, bloom: &BloomChainPlan) -> Result<(), Error> {
        self.check_device()?;
        self.targets.reallocate_bloom(&self.device, bloom);
        self.rebuild_bloom_passes();
        Ok(())
    }

    fn begin_frame(&mut self) -> Result<GpuFrame, Error> {
        self.check_device()?;
        let surface = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return Err(Error::SurfaceUnavailable("surface reconfigured".into()));
            }
            Err(wgpu::SurfaceError::OutOfMemory) => return Err(Error::ContextLost),
            Err(e) => return Err(Error::SurfaceUnavailable(e.to_string())),
        };
        let view = surface
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame_encoder"),
            });
        Ok(GpuFrame {
            surface,
            view,
            encoder,
            read_slot: self.particles.positions.current_index(),
        })
    }

    fn step_simulation(&mut self, frame: &mut GpuFrame, uniforms: &SimUniforms) -> Result<(), Error> {
        frame.read_slot = self.simulation.encode_step(
            &mut frame.encoder,
            &self.queue,
            &self.particles,
            frame.read_slot,
            uniforms,
        );
        Ok(())
    }

    fn draw_particles(
        &mut self,
        frame: &mut GpuFrame,
        uniforms: &PointUniforms,
        triangles: &[TriangleInstance],
    ) -> Result<(), Error> {
        self.points.write(&self.queue, uniforms);
        let triangle_count = self.triangles.write(&self.queue, triangles);

        let mut rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("scene_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &self.targets.hdr.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_color),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        self.points.draw(&mut rpass, &self.particles, frame.read_slot);
        self.triangles.draw(&mut rpass, triangle_count);
        drop(rpass);
        Ok(())
    }

    fn composite_bloom(&mut self, frame: &mut GpuFrame, settings: &BloomSettings) -> Result<(), Error> {
        self.bloom.encode(
            &mut frame.encoder,
            &self.queue,
            &self.post,
            &self.targets,
            settings,
            &frame.view,
        );
        Ok(())
    }

    fn present(&mut self, frame: GpuFrame) -> Result<(), Error> {
        let GpuFrame {
            surface,
            encoder,
            read_slot,
            ..
        } = frame;
        self.queue.submit(Some(encoder.finish()));
        surface.present();
        if read_slot != self.particles.positions.current_index() {
            self.particles.positions.swap();
        }
        self.check_device()
    }
}
