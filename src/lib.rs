#![cfg(target_arch = "wasm32")]
use particles_core::{BloomChainPlan, ControlSurface, Viewport};
use std::cell::RefCell;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

mod audio;
mod constants;
mod dom;
mod events;
mod frame;
mod overlay;
mod render;

use frame::{FrameContext, Orchestrator, SharedFrame};

thread_local! {
    static APP: RefCell<Option<SharedFrame>> = const { RefCell::new(None) };
}

fn wire_canvas_resize(canvas: &web::HtmlCanvasElement) {
    dom::sync_canvas_backing_size(canvas);
    let canvas_resize = canvas.clone();
    let resize_closure = Closure::wrap(Box::new(move || {
        dom::sync_canvas_backing_size(&canvas_resize);
    }) as Box<dyn FnMut()>);
    if let Some(window) = web::window() {
        _ = window
            .add_event_listener_with_callback("resize", resize_closure.as_ref().unchecked_ref());
    }
    resize_closure.forget();
}

fn with_app<R>(f: impl FnOnce(&SharedFrame) -> R) -> Option<R> {
    APP.with(|slot| slot.borrow().as_ref().map(f))
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("particles-web starting");

    spawn_local(async move {
        if let Err(e) = init().await {
            log::error!("init error: {:?}", e);
        }
    });
    Ok(())
}

async fn init() -> anyhow::Result<()> {
    let document = dom::window_document().ok_or_else(|| anyhow::anyhow!("no document"))?;
    let canvas: web::HtmlCanvasElement = document
        .get_element_by_id(constants::CANVAS_ID)
        .ok_or_else(|| anyhow::anyhow!("missing #{}", constants::CANVAS_ID))?
        .dyn_into::<web::HtmlCanvasElement>()
        .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;

    // Backing store tracks CSS size * devicePixelRatio; the frame loop picks it up.
    wire_canvas_resize(&canvas);

    let viewport = Viewport::new(canvas.width() as i64, canvas.height() as i64)?;
    let controls = ControlSurface::default();
    let plan = BloomChainPlan::new(viewport, &controls.bloom)?;
    let gpu = render::GpuState::new(canvas.clone(), viewport, &plan).await?;

    let mut orchestrator: Orchestrator =
        Orchestrator::new(gpu, viewport, dom::device_pixel_ratio(), controls);
    orchestrator.start();

    let ctx: SharedFrame = std::rc::Rc::new(RefCell::new(FrameContext::new(
        orchestrator,
        canvas,
    )));

    events::wire_audio_toggle(&document, ctx.clone());
    events::wire_global_keydown(ctx.clone());
    {
        let c = ctx.borrow();
        overlay::update_hint(&document, c.orchestrator.controls());
        overlay::set_audio_label(&document, c.orchestrator.audio().phase());
    }

    APP.with(|slot| *slot.borrow_mut() = Some(ctx.clone()));
    frame::start_loop(ctx);
    Ok(())
}

/// Set a named tunable from the page (debug panel). Takes effect next frame.
#[wasm_bindgen]
pub fn set_param(name: &str, value: f32) -> Result<(), JsValue> {
    with_app(|ctx| {
        let mut c = ctx.borrow_mut();
        let controls = c.orchestrator.controls_mut();
        controls
            .set(name, value)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        if let Some(doc) = dom::window_document() {
            overlay::update_hint(&doc, controls);
        }
        Ok(())
    })
    .unwrap_or_else(|| Err(JsValue::from_str("visualization not started")))
}

/// Release the GPU pipeline and microphone and stop the frame loop.
#[wasm_bindgen]
pub fn destroy() {
    let taken = APP.with(|slot| slot.borrow_mut().take());
    if let Some(ctx) = taken {
        ctx.borrow_mut().orchestrator.destroy();
        if let Some(doc) = dom::window_document() {
            overlay::set_audio_label(&doc, ctx.borrow().orchestrator.audio().phase());
        }
    }
}
