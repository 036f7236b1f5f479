mod keyboard;
pub mod keymap;

pub use keyboard::{wire_audio_toggle, wire_global_keydown};
