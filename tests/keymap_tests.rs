// Host-side tests for the keyboard mapping.
// The main crate is wasm-only, so the pure modules are included directly.

#![allow(dead_code)]
mod constants {
    include!("../src/constants.rs");
}
mod keymap {
    include!("../src/events/keymap.rs");
}

use keymap::*;
use particles_core::ControlSurface;

fn set_value(action: Option<KeyAction>, expected_name: &str) -> f32 {
    match action {
        Some(KeyAction::Set { name, value }) => {
            assert_eq!(name, expected_name);
            value
        }
        other => panic!("expected Set for {}, got {:?}", expected_name, other),
    }
}

#[test]
fn toggles_map_in_both_cases() {
    let c = ControlSurface::default();
    assert_eq!(action_for_key("m", &c), Some(KeyAction::ToggleAudio));
    assert_eq!(action_for_key("M", &c), Some(KeyAction::ToggleAudio));
    assert_eq!(action_for_key("h", &c), Some(KeyAction::ToggleHint));
    assert_eq!(action_for_key("x", &c), None);
}

#[test]
fn digits_select_mip_count_within_range() {
    assert_eq!(mips_for_digit("1"), Some(1));
    assert_eq!(mips_for_digit("5"), Some(5));
    assert_eq!(mips_for_digit("0"), None);
    assert_eq!(mips_for_digit("6"), None);
    assert_eq!(mips_for_digit("a"), None);
}

#[test]
fn strength_steps_are_clamped() {
    let mut c = ControlSurface::default();
    c.set("bloom_strength", 0.05).unwrap();
    let v = set_value(action_for_key("[", &c), "bloom_strength");
    assert_eq!(v, 0.0);
    c.set("bloom_strength", 3.0).unwrap();
    let v = set_value(action_for_key("]", &c), "bloom_strength");
    assert_eq!(v, 3.0);
}

#[test]
fn threshold_steps_are_accepted_by_the_controls() {
    let mut c = ControlSurface::default();
    for _ in 0..40 {
        let v = set_value(action_for_key("=", &c), "threshold");
        c.set("threshold", v).unwrap();
    }
    assert_eq!(c.bloom.threshold, 1.0);
    for _ in 0..40 {
        let v = set_value(action_for_key("-", &c), "threshold");
        c.set("threshold", v).unwrap();
    }
    assert_eq!(c.bloom.threshold, 0.0);
}

#[test]
fn resolution_cycles_through_presets() {
    assert_eq!(next_resolution(0.25), 0.5);
    assert_eq!(next_resolution(0.5), 1.0);
    assert_eq!(next_resolution(1.0), 0.25);
    assert_eq!(next_resolution(0.3), 0.5);
}

#[test]
fn colour_key_flips_mode() {
    let mut c = ControlSurface::default();
    let v = set_value(action_for_key("c", &c), "color_mode");
    c.set("color_mode", v).unwrap();
    let back = set_value(action_for_key("c", &c), "color_mode");
    assert_ne!(v, back);
}
