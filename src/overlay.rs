use crate::constants::*;
use particles_core::{CapturePhase, ControlSurface};
use web_sys as web;

#[inline]
pub fn show_hint(document: &web::Document) {
    if let Some(el) = document.get_element_by_id(HINT_OVERLAY_ID) {
        _ = el.class_list().remove_1("hidden");
        // fallback for environments without CSS class
        _ = el.set_attribute("style", "");
    }
}

#[inline]
pub fn hide_hint(document: &web::Document) {
    if let Some(el) = document.get_element_by_id(HINT_OVERLAY_ID) {
        _ = el.class_list().add_1("hidden");
        _ = el.set_attribute("style", "display:none");
    }
}

#[inline]
pub fn hint_hidden(document: &web::Document) -> bool {
    if let Some(el) = document.get_element_by_id(HINT_OVERLAY_ID) {
        if el.class_list().contains("hidden") {
            return true;
        }
        return el
            .get_attribute("style")
            .map(|s| s.contains("display:none"))
            .unwrap_or(false);
    }
    false
}

#[inline]
pub fn toggle_hint(document: &web::Document) {
    if hint_hidden(document) {
        show_hint(document);
    } else {
        hide_hint(document);
    }
}

/// Render the live bloom and colour settings into the hint overlay.
pub fn update_hint(document: &web::Document, controls: &ControlSurface) {
    if let Some(el) = document.get_element_by_id(HINT_OVERLAY_ID) {
        let b = &controls.bloom;
        let mode = if controls.get("color_mode").unwrap_or(0.0) >= 0.5 {
            "hue"
        } else {
            "gradient"
        };
        let hint_html = format!(
            "<div style='color: #d5efe5; font: 13px system-ui; background: rgba(1, 1, 1, 0.8); padding: 8px 12px; border-radius: 6px; border: 1px solid rgba(121, 0, 0, 0.45);'>Threshold: {:.2} • Strength: {:.1} • Mips: {} • Res: {:.2} • Colour: {}</div>",
            b.threshold, b.bloom_strength, b.n_mips, b.resolution, mode
        );
        el.set_inner_html(&hint_html);
    }
}

pub fn set_audio_label(document: &web::Document, phase: CapturePhase) {
    let label = match phase {
        CapturePhase::Disabled => AUDIO_LABEL_OFF,
        CapturePhase::Acquiring => AUDIO_LABEL_PENDING,
        CapturePhase::Enabled => AUDIO_LABEL_ON,
    };
    crate::dom::set_text(document, AUDIO_TOGGLE_ID, label);
}
