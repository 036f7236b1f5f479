// Page wiring and renderer tuning constants for the web front-end.
// Simulation, audio and bloom defaults live in `particles_core::constants`.

// DOM element ids
pub const CANVAS_ID: &str = "app-canvas";
pub const AUDIO_TOGGLE_ID: &str = "audio-toggle";
pub const HINT_OVERLAY_ID: &str = "hint-overlay";

// Scene clear colour (#010101), linear RGBA
pub const CLEAR_COLOR: [f64; 4] = [1.0 / 255.0, 1.0 / 255.0, 1.0 / 255.0, 1.0];

// Keyboard tuning steps
pub const BLOOM_STRENGTH_KEY_STEP: f32 = 0.1;
pub const BLOOM_STRENGTH_KEY_MAX: f32 = 3.0;
pub const THRESHOLD_KEY_STEP: f32 = 0.05;
pub const RESOLUTION_PRESETS: [f32; 3] = [0.25, 0.5, 1.0];

// Button labels for the capture toggle
pub const AUDIO_LABEL_OFF: &str = "Enable microphone";
pub const AUDIO_LABEL_PENDING: &str = "Connecting…";
pub const AUDIO_LABEL_ON: &str = "Disable microphone";

// Swapchain frames kept in flight
pub const MAX_FRAME_LATENCY: u32 = 2;
