use crate::constants::*;
use particles_core::{ControlSurface, BLOOM_MIPS_MAX, BLOOM_MIPS_MIN};

/// What a key press asks the page to do.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum KeyAction {
    ToggleAudio,
    ToggleHint,
    Set { name: &'static str, value: f32 },
}

#[inline]
pub fn mips_for_digit(key: &str) -> Option<u32> {
    let n = key.parse::<u32>().ok()?;
    (BLOOM_MIPS_MIN..=BLOOM_MIPS_MAX).contains(&n).then_some(n)
}

/// Next entry of `RESOLUTION_PRESETS` after `current`, wrapping around.
pub fn next_resolution(current: f32) -> f32 {
    RESOLUTION_PRESETS
        .iter()
        .copied()
        .find(|r| *r > current + 1e-4)
        .unwrap_or(RESOLUTION_PRESETS[0])
}

/// Map a key to an action against the current control values. Steps are
/// clamped so the resulting `Set` is always accepted by the control surface.
pub fn action_for_key(key: &str, controls: &ControlSurface) -> Option<KeyAction> {
    let bloom = &controls.bloom;
    let set = |name, value| Some(KeyAction::Set { name, value });
    match key {
        "m" | "M" => Some(KeyAction::ToggleAudio),
        "h" | "H" => Some(KeyAction::ToggleHint),
        "[" => set(
            "bloom_strength",
            (bloom.bloom_strength - BLOOM_STRENGTH_KEY_STEP).max(0.0),
        ),
        "]" => set(
            "bloom_strength",
            (bloom.bloom_strength + BLOOM_STRENGTH_KEY_STEP).min(BLOOM_STRENGTH_KEY_MAX),
        ),
        "-" => set("threshold", (bloom.threshold - THRESHOLD_KEY_STEP).max(0.0)),
        "=" | "+" => set("threshold", (bloom.threshold + THRESHOLD_KEY_STEP).min(1.0)),
        "r" | "R" => set("resolution", next_resolution(bloom.resolution)),
        "c" | "C" => {
            let current = controls.get("color_mode").unwrap_or(0.0);
            set("color_mode", if current >= 0.5 { 0.0 } else { 1.0 })
        }
        _ => mips_for_digit(key).map(|n| KeyAction::Set {
            name: "n_mips",
            value: n as f32,
        }),
    }
}
