use crate::audio::{self, WebMicrophone};
use crate::render::GpuState;
use crate::{dom, overlay};
use particles_core::{CapturePhase, FrameOrchestrator, FramePhase};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

pub type Orchestrator = FrameOrchestrator<GpuState, WebMicrophone>;
pub type SharedFrame = Rc<RefCell<FrameContext>>;

pub struct FrameContext {
    pub orchestrator: Orchestrator,
    pub canvas: web::HtmlCanvasElement,
    /// A pipeline rebuilt after context loss, installed on the next frame.
    pub pending_gpu: Rc<RefCell<Option<GpuState>>>,
    pub rebuilding: Rc<Cell<bool>>,
}

impl FrameContext {
    pub fn new(orchestrator: Orchestrator, canvas: web::HtmlCanvasElement) -> Self {
        Self {
            orchestrator,
            canvas,
            pending_gpu: Rc::new(RefCell::new(None)),
            rebuilding: Rc::new(Cell::new(false)),
        }
    }

    pub fn frame(&mut self) {
        let rebuilt = self.pending_gpu.borrow_mut().take();
        if let Some(gpu) = rebuilt {
            self.orchestrator.install_pipeline(gpu);
        }
        if self.orchestrator.needs_pipeline() && !self.rebuilding.get() {
            self.spawn_rebuild();
        }

        let (w, h) = (self.canvas.width() as i64, self.canvas.height() as i64);
        if let Some(e) = self.orchestrator.follow_host_size(w, h) {
            log::warn!("[frame] resize ignored: {}", e);
        }
        self.orchestrator.set_pixel_ratio(dom::device_pixel_ratio());
        self.orchestrator.tick(js_sys::Date::now());
    }

    fn spawn_rebuild(&mut self) {
        let plan = match self.orchestrator.bloom_plan() {
            Ok(p) => p,
            Err(e) => {
                log::error!("[gpu] cannot plan bloom chain for rebuild: {}", e);
                return;
            }
        };
        let viewport = self.orchestrator.viewport();
        let canvas = self.canvas.clone();
        let slot = self.pending_gpu.clone();
        let rebuilding = self.rebuilding.clone();
        rebuilding.set(true);
        log::info!("[gpu] rebuilding pipeline");
        spawn_local(async move {
            match GpuState::new(canvas, viewport, &plan).await {
                Ok(gpu) => *slot.borrow_mut() = Some(gpu),
                Err(e) => log::error!("[gpu] rebuild failed: {:?}", e),
            }
            rebuilding.set(false);
        });
    }
}

fn refresh_audio_label(ctx: &SharedFrame) {
    if let Some(doc) = dom::window_document() {
        overlay::set_audio_label(&doc, ctx.borrow().orchestrator.audio().phase());
    }
}

/// Flip microphone capture. Enabling is asynchronous; a toggle while the
/// permission prompt is open cancels that request.
pub fn toggle_audio(ctx: &SharedFrame) {
    let ticket = {
        let mut c = ctx.borrow_mut();
        let audio = c.orchestrator.audio_mut();
        match audio.phase() {
            CapturePhase::Disabled => audio.start(),
            CapturePhase::Acquiring | CapturePhase::Enabled => {
                audio.stop();
                None
            }
        }
    };
    refresh_audio_label(ctx);

    if let Some(ticket) = ticket {
        let ctx = ctx.clone();
        spawn_local(async move {
            let outcome = audio::request_microphone().await;
            ctx.borrow_mut()
                .orchestrator
                .audio_mut()
                .resolve(ticket, outcome);
            refresh_audio_label(&ctx);
        });
    }
}

type TickSlot = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

fn request_frame(tick: &TickSlot) {
    if let (Some(w), Some(cb)) = (web::window(), tick.borrow().as_ref()) {
        _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
    }
}

/// Drive `FrameContext::frame` from requestAnimationFrame until disposed.
pub fn start_loop(frame_ctx: SharedFrame) {
    let tick: TickSlot = Rc::new(RefCell::new(None));
    let tick_clone = tick.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        frame_ctx.borrow_mut().frame();
        if frame_ctx.borrow().orchestrator.phase() == FramePhase::Disposed {
            log::info!("[frame] loop stopped");
            return;
        }
        request_frame(&tick_clone);
    }) as Box<dyn FnMut()>));
    request_frame(&tick);
}
