// Host-side checks on the web front-end constants.
// The main crate is wasm-only, so the pure modules are included directly.

#![allow(dead_code)]
mod constants {
    include!("../src/constants.rs");
}

use constants::*;
use particles_core::{BLOOM_RESOLUTION_MAX, BLOOM_RESOLUTION_MIN};

#[test]
fn resolution_presets_are_ascending_and_accepted() {
    assert!(RESOLUTION_PRESETS.windows(2).all(|w| w[0] < w[1]));
    for r in RESOLUTION_PRESETS {
        assert!((BLOOM_RESOLUTION_MIN..=BLOOM_RESOLUTION_MAX).contains(&r));
    }
}

#[test]
fn clear_color_is_near_black_and_opaque() {
    let [r, g, b, a] = CLEAR_COLOR;
    assert_eq!(r, g);
    assert_eq!(g, b);
    assert!(r > 0.0 && r < 0.01);
    assert_eq!(a, 1.0);
}

#[test]
fn key_steps_are_positive() {
    assert!(BLOOM_STRENGTH_KEY_STEP > 0.0);
    assert!(BLOOM_STRENGTH_KEY_MAX > BLOOM_STRENGTH_KEY_STEP);
    assert!(THRESHOLD_KEY_STEP > 0.0 && THRESHOLD_KEY_STEP < 1.0);
}

#[test]
fn element_ids_are_distinct() {
    assert_ne!(CANVAS_ID, AUDIO_TOGGLE_ID);
    assert_ne!(CANVAS_ID, HINT_OVERLAY_ID);
    assert_ne!(AUDIO_TOGGLE_ID, HINT_OVERLAY_ID);
}
