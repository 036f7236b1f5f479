//! Per-texel particle update rule and its per-frame uniform policy.
//!
//! [`step_particle`] is the CPU twin of `fs_simulate` in
//! `shaders/simulation.wgsl`; keep the two in sync.

use crate::audio::AudioBands;
use crate::constants::*;
use glam::{Vec3, Vec4, Vec4Swizzles};

/// Tunable bases and audio coefficients for the simulation uniforms.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimParams {
    pub timer_step: f32,
    pub frequency: f32,
    pub amplitude: f32,
    pub max_distance: f32,
    pub timer_mid_coeff: f32,
    pub frequency_mid_coeff: f32,
    pub amplitude_bass_coeff: f32,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            timer_step: BASE_TIMER_STEP,
            frequency: BASE_FREQUENCY,
            amplitude: BASE_AMPLITUDE,
            max_distance: MAX_DISTANCE,
            timer_mid_coeff: TIMER_MID_COEFF,
            frequency_mid_coeff: FREQUENCY_MID_COEFF,
            amplitude_bass_coeff: AMPLITUDE_BASS_COEFF,
        }
    }
}

/// Uniform block consumed by the simulation shader.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SimUniforms {
    pub timer: f32,
    pub frequency: f32,
    pub amplitude: f32,
    pub max_distance: f32,
    pub bass: f32,
    pub mid: f32,
    pub treble: f32,
    pub _pad: f32,
}

impl SimUniforms {
    pub fn initial(params: &SimParams) -> Self {
        Self {
            timer: 0.0,
            frequency: params.frequency,
            amplitude: params.amplitude,
            max_distance: params.max_distance,
            bass: 0.0,
            mid: 0.0,
            treble: 0.0,
            _pad: 0.0,
        }
    }

    /// Uniforms for the next step. The caller commits the result only once
    /// the step actually ran so `timer` never drifts from buffer advancement.
    pub fn advanced(&self, params: &SimParams, bands: AudioBands) -> Self {
        Self {
            timer: self.timer + params.timer_step + bands.mid * params.timer_mid_coeff,
            frequency: params.frequency + bands.mid * params.frequency_mid_coeff,
            amplitude: params.amplitude + bands.bass * params.amplitude_bass_coeff,
            max_distance: params.max_distance,
            bass: bands.bass,
            mid: bands.mid,
            treble: bands.treble,
            _pad: 0.0,
        }
    }
}

const TREBLE_PUSH: f32 = 8.0;

#[inline]
fn relax_rate(bass: f32) -> f32 {
    (RELAX_BASE + bass * RELAX_BASS_COEFF).clamp(0.0, 1.0)
}

/// Animated anchor around `target`: a sum of phase-shifted sines whose
/// magnitude per axis never exceeds `amplitude`.
pub fn wave_offset(target: Vec3, u: &SimUniforms) -> Vec3 {
    let f = u.frequency;
    let t = u.timer;
    let primary = Vec3::new(
        (target.y * f + t).sin(),
        (target.z * f + t * 1.1).sin(),
        (target.x * f + t * 0.9).sin(),
    );
    let secondary = Vec3::new(
        (target.z * f * 1.7 + t * 0.6).sin(),
        (target.x * f * 1.7 + t * 0.7).sin(),
        (target.y * f * 1.7 + t * 0.8).sin(),
    );
    (primary + secondary * 0.5) * (u.amplitude / 1.5)
}

/// Advance one particle. Deterministic in its inputs; the result stays within
/// `max_distance` of `target`.
pub fn step_particle(prev: Vec4, target: Vec4, u: &SimUniforms) -> Vec4 {
    let anchor = target.xyz();
    let mut desired = anchor + wave_offset(anchor, u);
    if anchor.length_squared() > 0.0 {
        desired += anchor.normalize() * (u.treble * TREBLE_PUSH);
    }
    let mut p = prev.xyz().lerp(desired, relax_rate(u.bass));

    let d = p - anchor;
    let len = d.length();
    if len > u.max_distance {
        p = anchor + d * (u.max_distance / len);
    }
    p.extend(1.0)
}

/// Run the rule over a whole texel array (CPU reference of one GPU step).
pub fn step_all(prev: &[[f32; 4]], targets: &[[f32; 4]], u: &SimUniforms, out: &mut Vec<[f32; 4]>) {
    out.clear();
    out.extend(prev.iter().zip(targets.iter()).map(|(p, t)| {
        step_particle(Vec4::from_array(*p), Vec4::from_array(*t), u).to_array()
    }));
}
