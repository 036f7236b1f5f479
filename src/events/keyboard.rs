use super::keymap::{action_for_key, KeyAction};
use crate::constants::AUDIO_TOGGLE_ID;
use crate::frame::{self, SharedFrame};
use crate::{dom, overlay};
use wasm_bindgen::JsCast;
use web_sys as web;

/// Apply a control change and refresh the hint overlay.
fn apply_control(ctx: &SharedFrame, name: &str, value: f32) {
    let mut c = ctx.borrow_mut();
    let controls = c.orchestrator.controls_mut();
    match controls.set(name, value) {
        Ok(()) => {
            log::info!("[keys] {} = {}", name, value);
            if let Some(doc) = dom::window_document() {
                overlay::update_hint(&doc, controls);
                overlay::show_hint(&doc);
            }
        }
        Err(e) => log::warn!("[keys] {}", e),
    }
}

pub fn handle_global_keydown(ev: &web::KeyboardEvent, ctx: &SharedFrame) {
    if ev.ctrl_key() || ev.meta_key() || ev.alt_key() {
        return;
    }
    let key = ev.key();
    let action = action_for_key(&key, ctx.borrow().orchestrator.controls());
    match action {
        Some(KeyAction::ToggleAudio) => {
            frame::toggle_audio(ctx);
            ev.prevent_default();
        }
        Some(KeyAction::ToggleHint) => {
            if let Some(doc) = dom::window_document() {
                overlay::toggle_hint(&doc);
            }
            ev.prevent_default();
        }
        Some(KeyAction::Set { name, value }) => apply_control(ctx, name, value),
        None => {}
    }
}

pub fn wire_global_keydown(ctx: SharedFrame) {
    if let Some(window) = web::window() {
        let closure =
            wasm_bindgen::closure::Closure::wrap(Box::new(move |ev: web::KeyboardEvent| {
                handle_global_keydown(&ev, &ctx);
            }) as Box<dyn FnMut(_)>);
        _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

pub fn wire_audio_toggle(document: &web::Document, ctx: SharedFrame) {
    dom::add_click_listener(document, AUDIO_TOGGLE_ID, move || frame::toggle_audio(&ctx));
}
