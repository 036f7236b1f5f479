//! Per-frame orchestration: audio → uniforms → simulation step → particle
//! draw → bloom composite → present, against an abstract GPU pipeline.

use crate::audio::{AudioAnalyzer, AudioBands, CaptureStream};
use crate::bloom::{BloomChainPlan, BloomSettings};
use crate::constants::TRIANGLE_COUNT;
use crate::controls::ControlSurface;
use crate::error::{Error, Result, Viewport};
use crate::points::{PointFrame, PointUniforms};
use crate::simulation::SimUniforms;
use crate::state::{Camera, GroupRotation};
use crate::triangles::{TriangleField, TriangleInstance};

/// GPU side of one frame. Implementations own every texture, render target
/// and shader program; the orchestrator only ever sees them through this
/// trait, so dropping the implementation discards all GPU handles at once.
///
/// Work recorded into a `Frame` takes effect only in a successful `present`.
/// A frame dropped after any failing call must leave the ping-pong roles as
/// they were, so the next frame steps from the same positions.
pub trait GpuPipeline {
    /// Per-frame recording state (command encoder, acquired surface, ...).
    type Frame;

    /// Reallocate every viewport-dependent target.
    fn resize(&mut self, viewport: Viewport, bloom: &BloomChainPlan) -> Result<()>;
    /// Reallocate the bloom mip chain only.
    fn reallocate_bloom(&mut self, bloom: &BloomChainPlan) -> Result<()>;

    fn begin_frame(&mut self) -> Result<Self::Frame>;
    /// Run the simulation shader once over every texel. Later calls in the
    /// same frame read the fresh positions; the roles swap on `present`.
    fn step_simulation(&mut self, frame: &mut Self::Frame, uniforms: &SimUniforms) -> Result<()>;
    /// Draw the particle set (sampling the current position texture) and the
    /// decorative sprites into the scene colour target.
    fn draw_particles(
        &mut self,
        frame: &mut Self::Frame,
        uniforms: &PointUniforms,
        triangles: &[TriangleInstance],
    ) -> Result<()>;
    fn composite_bloom(&mut self, frame: &mut Self::Frame, settings: &BloomSettings) -> Result<()>;
    fn present(&mut self, frame: Self::Frame) -> Result<()>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FramePhase {
    Idle,
    Running,
    /// GPU context lost; waiting for a rebuilt pipeline.
    Suspended,
    Disposed,
}

pub struct FrameOrchestrator<P: GpuPipeline, S: CaptureStream> {
    phase: FramePhase,
    pipeline: Option<P>,
    audio: AudioAnalyzer<S>,
    controls: ControlSurface,
    sim: SimUniforms,
    camera: Camera,
    rotation: GroupRotation,
    triangles: TriangleField,
    viewport: Viewport,
    pixel_ratio: f32,
    frames_presented: u64,
    rejected_size: Option<(i64, i64)>,
}

impl<P: GpuPipeline, S: CaptureStream> FrameOrchestrator<P, S> {
    pub fn new(pipeline: P, viewport: Viewport, pixel_ratio: f32, controls: ControlSurface) -> Self {
        let sim = SimUniforms::initial(&controls.sim);
        Self {
            phase: FramePhase::Idle,
            pipeline: Some(pipeline),
            audio: AudioAnalyzer::new(),
            controls,
            sim,
            camera: Camera::looking_at_origin(viewport.aspect()),
            rotation: GroupRotation::default(),
            triangles: TriangleField::new(TRIANGLE_COUNT, crate::constants::TARGET_SEED),
            viewport,
            pixel_ratio,
            frames_presented: 0,
            rejected_size: None,
        }
    }

    pub fn phase(&self) -> FramePhase {
        self.phase
    }

    /// Idle → Running. Returns `false` if the loop was already started or the
    /// orchestrator is disposed.
    pub fn start(&mut self) -> bool {
        if self.phase != FramePhase::Idle {
            return false;
        }
        self.phase = FramePhase::Running;
        log::info!("[frame] running at {}x{}", self.viewport.width, self.viewport.height);
        true
    }

    pub fn audio(&self) -> &AudioAnalyzer<S> {
        &self.audio
    }

    pub fn audio_mut(&mut self) -> &mut AudioAnalyzer<S> {
        &mut self.audio
    }

    pub fn controls(&self) -> &ControlSurface {
        &self.controls
    }

    pub fn controls_mut(&mut self) -> &mut ControlSurface {
        &mut self.controls
    }

    pub fn sim_uniforms(&self) -> &SimUniforms {
        &self.sim
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn pipeline(&self) -> Option<&P> {
        self.pipeline.as_ref()
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    pub fn bloom_plan(&self) -> Result<BloomChainPlan> {
        BloomChainPlan::new(self.viewport, &self.controls.bloom)
    }

    pub fn set_pixel_ratio(&mut self, pixel_ratio: f32) {
        self.pixel_ratio = pixel_ratio;
    }

    /// Resize every resolution-dependent target. Zero or negative sizes are
    /// rejected and the previous targets are kept.
    pub fn resize(&mut self, width: i64, height: i64) -> Result<()> {
        let viewport = Viewport::new(width, height)?;
        if viewport == self.viewport {
            return Ok(());
        }
        self.viewport = viewport;
        self.camera.aspect = viewport.aspect();
        let plan = self.bloom_plan()?;
        if let Some(p) = self.pipeline.as_mut() {
            if let Err(e) = p.resize(viewport, &plan) {
                self.handle_fault(e);
            }
        }
        Ok(())
    }

    /// Follow the host's surface size once per frame. An invalid size is
    /// reported only when it differs from the last one rejected, so a hidden
    /// canvas does not flood the log.
    pub fn follow_host_size(&mut self, width: i64, height: i64) -> Option<Error> {
        match self.resize(width, height) {
            Ok(()) => {
                self.rejected_size = None;
                None
            }
            Err(_) if self.rejected_size == Some((width, height)) => None,
            Err(e) => {
                self.rejected_size = Some((width, height));
                Some(e)
            }
        }
    }

    /// The pipeline was dropped after a context loss and a replacement is
    /// needed before frames resume.
    pub fn needs_pipeline(&self) -> bool {
        self.phase == FramePhase::Suspended && self.pipeline.is_none()
    }

    /// Install a freshly built pipeline after a context loss. Its targets are
    /// sized for the current viewport before it is used.
    pub fn install_pipeline(&mut self, mut pipeline: P) {
        if self.phase == FramePhase::Disposed {
            return;
        }
        self.controls.take_bloom_chain_dirty();
        let sized = self
            .bloom_plan()
            .and_then(|plan| pipeline.resize(self.viewport, &plan));
        if let Err(e) = sized {
            log::error!("[frame] rebuilt pipeline failed to size: {}", e);
            return;
        }
        self.pipeline = Some(pipeline);
        if self.phase == FramePhase::Suspended {
            self.phase = FramePhase::Running;
            log::info!("[frame] pipeline rebuilt; resuming");
        }
    }

    /// Tear down GPU resources and audio capture. Terminal.
    pub fn destroy(&mut self) {
        self.audio.stop();
        self.pipeline = None;
        self.phase = FramePhase::Disposed;
        log::info!("[frame] disposed");
    }

    fn handle_fault(&mut self, e: Error) {
        match e {
            Error::ContextLost => {
                log::error!("[frame] GPU context lost; discarding pipeline");
                self.pipeline = None;
                if self.phase != FramePhase::Disposed {
                    self.phase = FramePhase::Suspended;
                }
            }
            other => log::warn!("[frame] skipped frame: {}", other),
        }
    }

    /// One display refresh. Faults are handled internally: the frame is
    /// skipped and a lost context suspends the loop until a new pipeline is
    /// installed.
    pub fn tick(&mut self, now_ms: f64) {
        if self.phase != FramePhase::Running {
            return;
        }
        let bands = self.audio.update();
        if let Err(e) = self.render(bands, now_ms) {
            self.handle_fault(e);
        }
    }

    fn render(&mut self, bands: AudioBands, now_ms: f64) -> Result<()> {
        let Some(pipeline) = self.pipeline.as_mut() else {
            return Ok(());
        };

        if self.controls.take_bloom_chain_dirty() {
            let plan = BloomChainPlan::new(self.viewport, &self.controls.bloom)?;
            log::info!("[bloom] reallocating {} mip levels", plan.n_mips());
            pipeline.reallocate_bloom(&plan)?;
        }

        let next_sim = self.sim.advanced(&self.controls.sim, bands);
        self.rotation.advance(now_ms);
        self.triangles.update();
        let point_frame = PointFrame {
            view_proj: self.camera.view_proj(),
            model: self.rotation.model_matrix(),
            viewport: [self.viewport.width as f32, self.viewport.height as f32],
            pixel_ratio: self.pixel_ratio,
            max_distance: self.controls.sim.max_distance,
        };
        let points = PointUniforms::build(&self.controls.points, &point_frame, bands);

        let mut frame = pipeline.begin_frame()?;
        pipeline.step_simulation(&mut frame, &next_sim)?;
        pipeline.draw_particles(&mut frame, &points, self.triangles.instances())?;
        pipeline.composite_bloom(&mut frame, &self.controls.bloom)?;
        pipeline.present(frame)?;
        self.sim = next_sim;
        self.frames_presented += 1;
        Ok(())
    }
}
