// Frame orchestration against a recording pipeline.

use particles_core::*;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Clone, Debug, PartialEq)]
enum Call {
    Resize(u32, u32, usize),
    Reallocate(usize),
    Begin,
    Step(f32),
    Draw,
    Composite,
    Present,
}

#[derive(Default)]
struct Script {
    calls: Vec<Call>,
    lose_context_on_step: bool,
    fail_begin_with: Option<Error>,
    fail_draw_with: Option<Error>,
}

#[derive(Clone)]
struct Recorder(Rc<RefCell<Script>>);

impl Recorder {
    fn new() -> Self {
        Self(Rc::new(RefCell::new(Script::default())))
    }

    fn push(&self, call: Call) {
        self.0.borrow_mut().calls.push(call);
    }

    fn calls(&self) -> Vec<Call> {
        self.0.borrow().calls.clone()
    }

    fn clear(&self) {
        self.0.borrow_mut().calls.clear();
    }
}

impl GpuPipeline for Recorder {
    type Frame = ();

    fn resize(&mut self, viewport: Viewport, bloom: &BloomChainPlan) -> Result<()> {
        self.push(Call::Resize(viewport.width, viewport.height, bloom.n_mips()));
        Ok(())
    }

    fn reallocate_bloom(&mut self, bloom: &BloomChainPlan) -> Result<()> {
        self.push(Call::Reallocate(bloom.n_mips()));
        Ok(())
    }

    fn begin_frame(&mut self) -> Result<()> {
        if let Some(e) = self.0.borrow_mut().fail_begin_with.take() {
            return Err(e);
        }
        self.push(Call::Begin);
        Ok(())
    }

    fn step_simulation(&mut self, _: &mut (), uniforms: &SimUniforms) -> Result<()> {
        if self.0.borrow().lose_context_on_step {
            return Err(Error::ContextLost);
        }
        self.push(Call::Step(uniforms.timer));
        Ok(())
    }

    fn draw_particles(
        &mut self,
        _: &mut (),
        _: &PointUniforms,
        triangles: &[TriangleInstance],
    ) -> Result<()> {
        assert_eq!(triangles.len(), TRIANGLE_COUNT);
        if let Some(e) = self.0.borrow_mut().fail_draw_with.take() {
            return Err(e);
        }
        self.push(Call::Draw);
        Ok(())
    }

    fn composite_bloom(&mut self, _: &mut (), _: &BloomSettings) -> Result<()> {
        self.push(Call::Composite);
        Ok(())
    }

    fn present(&mut self, _: ()) -> Result<()> {
        self.push(Call::Present);
        Ok(())
    }
}

struct SilentMic;

impl CaptureStream for SilentMic {
    fn byte_frequency_data(&mut self, out: &mut [u8]) {
        out.fill(0);
    }

    fn release(&mut self) {}
}

type Orchestrator = FrameOrchestrator<Recorder, SilentMic>;

fn running(width: i64, height: i64) -> (Orchestrator, Recorder) {
    let rec = Recorder::new();
    let vp = Viewport::new(width, height).unwrap();
    let mut o = FrameOrchestrator::new(rec.clone(), vp, 1.0, ControlSurface::default());
    assert!(o.start());
    (o, rec)
}

fn steps(calls: &[Call]) -> usize {
    calls.iter().filter(|c| matches!(c, Call::Step(_))).count()
}

#[test]
fn frame_runs_stages_in_order() {
    let (mut o, rec) = running(640, 480);
    o.tick(16.0);
    let timer = o.sim_uniforms().timer;
    assert_eq!(
        rec.calls(),
        vec![
            Call::Begin,
            Call::Step(timer),
            Call::Draw,
            Call::Composite,
            Call::Present,
        ]
    );
    assert_eq!(o.frames_presented(), 1);
}

#[test]
fn failed_draw_leaves_the_timer_for_the_next_frame() {
    let (mut o, rec) = running(640, 480);
    let before = o.sim_uniforms().timer;
    rec.0.borrow_mut().fail_draw_with = Some(Error::SurfaceUnavailable("draw".into()));
    o.tick(0.0);
    assert_eq!(o.sim_uniforms().timer, before);
    assert_eq!(o.frames_presented(), 0);
    assert_eq!(o.phase(), FramePhase::Running);
    let failed: Vec<Call> = rec.calls();
    rec.clear();

    o.tick(16.0);
    let retried = rec.calls();
    // the retried frame steps with the same uniforms the dropped one used
    assert_eq!(failed[1], retried[1]);
    assert_eq!(retried[1], Call::Step(o.sim_uniforms().timer));
    assert!(o.sim_uniforms().timer > before);
    assert_eq!(o.frames_presented(), 1);
}

#[test]
fn simulation_steps_exactly_once_per_frame() {
    let (mut o, rec) = running(640, 480);
    for i in 0..10 {
        o.tick(i as f64 * 16.0);
    }
    assert_eq!(steps(&rec.calls()), 10);
    assert_eq!(o.frames_presented(), 10);
}

#[test]
fn timer_advances_with_each_step() {
    let (mut o, rec) = running(320, 200);
    o.tick(0.0);
    o.tick(16.0);
    let timers: Vec<f32> = rec
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            Call::Step(t) => Some(t),
            _ => None,
        })
        .collect();
    assert_eq!(timers.len(), 2);
    assert!(timers[1] > timers[0]);
    assert_eq!(o.sim_uniforms().timer, timers[1]);
}

#[test]
fn idle_orchestrator_draws_nothing() {
    let rec = Recorder::new();
    let vp = Viewport::new(100, 100).unwrap();
    let mut o: Orchestrator = FrameOrchestrator::new(rec.clone(), vp, 1.0, ControlSurface::default());
    o.tick(0.0);
    assert!(rec.calls().is_empty());
    assert!(o.start());
    assert!(!o.start());
}

#[test]
fn mip_count_change_reallocates_before_compositing() {
    let (mut o, rec) = running(1280, 720);
    o.tick(0.0);
    rec.clear();

    o.controls_mut().set("n_mips", 5.0).unwrap();
    o.tick(16.0);
    let calls = rec.calls();
    assert_eq!(calls[0], Call::Reallocate(5));
    let realloc = calls.iter().position(|c| *c == Call::Reallocate(5));
    let composite = calls.iter().position(|c| *c == Call::Composite);
    assert!(realloc < composite);

    rec.clear();
    o.tick(32.0);
    assert!(!rec.calls().contains(&Call::Reallocate(5)));
}

#[test]
fn resize_resizes_every_target() {
    let (mut o, rec) = running(1280, 720);
    o.resize(640, 360).unwrap();
    o.resize(1280, 720).unwrap();
    assert_eq!(
        rec.calls(),
        vec![Call::Resize(640, 360, 3), Call::Resize(1280, 720, 3)]
    );
    assert_eq!(o.bloom_plan().unwrap().levels[0].width, 640);
}

#[test]
fn repeated_invalid_host_size_is_reported_once() {
    let (mut o, _rec) = running(800, 600);
    assert!(o.follow_host_size(0, 0).is_some());
    for _ in 0..60 {
        assert!(o.follow_host_size(0, 0).is_none());
    }
    // a different bad size is new information
    assert!(o.follow_host_size(0, 10).is_some());
    assert!(o.follow_host_size(0, 10).is_none());
    assert_eq!(o.viewport(), Viewport::new(800, 600).unwrap());

    // after a valid size the same bad size is reported again
    assert!(o.follow_host_size(640, 480).is_none());
    assert_eq!(o.viewport(), Viewport::new(640, 480).unwrap());
    assert!(o.follow_host_size(0, 0).is_some());
}

#[test]
fn degenerate_resize_keeps_previous_size() {
    let (mut o, rec) = running(800, 600);
    assert_eq!(
        o.resize(0, 600),
        Err(Error::InvalidResize {
            width: 0,
            height: 600
        })
    );
    assert!(o.resize(800, -4).is_err());
    assert_eq!(o.viewport(), Viewport::new(800, 600).unwrap());
    assert!(rec.calls().is_empty());
    o.tick(0.0);
    assert_eq!(o.frames_presented(), 1);
}

#[test]
fn context_loss_suspends_until_a_new_pipeline_arrives() {
    let (mut o, rec) = running(640, 480);
    o.tick(0.0);
    let timer_before = o.sim_uniforms().timer;

    rec.0.borrow_mut().lose_context_on_step = true;
    o.tick(16.0);
    assert_eq!(o.phase(), FramePhase::Suspended);
    assert!(o.needs_pipeline());
    assert!(o.pipeline().is_none());
    // the failed step must not advance the timer
    assert_eq!(o.sim_uniforms().timer, timer_before);

    o.tick(32.0);
    assert_eq!(o.frames_presented(), 1);

    let fresh = Recorder::new();
    o.install_pipeline(fresh.clone());
    assert_eq!(o.phase(), FramePhase::Running);
    assert_eq!(fresh.calls(), vec![Call::Resize(640, 480, 3)]);

    o.tick(48.0);
    assert_eq!(o.frames_presented(), 2);
    assert_eq!(steps(&fresh.calls()), 1);
}

#[test]
fn other_faults_skip_only_the_current_frame() {
    let (mut o, rec) = running(640, 480);
    rec.0.borrow_mut().fail_begin_with = Some(Error::SurfaceUnavailable("timeout".into()));
    o.tick(0.0);
    assert_eq!(o.phase(), FramePhase::Running);
    assert_eq!(o.frames_presented(), 0);
    o.tick(16.0);
    assert_eq!(o.frames_presented(), 1);
}

#[test]
fn destroy_is_terminal() {
    let (mut o, rec) = running(640, 480);
    o.destroy();
    assert_eq!(o.phase(), FramePhase::Disposed);
    assert!(o.pipeline().is_none());
    o.tick(0.0);
    assert!(rec.calls().is_empty());
    o.install_pipeline(Recorder::new());
    assert_eq!(o.phase(), FramePhase::Disposed);
    assert!(o.pipeline().is_none());
    assert!(!o.start());
}

#[test]
fn destroy_releases_audio() {
    let (mut o, _) = running(64, 64);
    let ticket = o.audio_mut().start().unwrap();
    assert!(o.audio_mut().resolve(ticket, Ok(SilentMic)));
    o.destroy();
    assert_eq!(o.audio().phase(), CapturePhase::Disabled);
}
