//! Uniform derivation for the point-sprite render pass.

use crate::audio::AudioBands;
use crate::constants::*;
use glam::Mat4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ColorMode {
    /// Lerp between the small and big colours.
    #[default]
    Gradient,
    /// Replace the big colour with a hue driven by the mid band.
    HueFromMid,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointParams {
    pub base_size: f32,
    pub treble_coeff: f32,
    pub color_small: [f32; 3],
    pub color_big: [f32; 3],
    pub color_mode: ColorMode,
}

impl Default for PointParams {
    fn default() -> Self {
        Self {
            base_size: BASE_POINT_SIZE,
            treble_coeff: POINT_SIZE_TREBLE_COEFF,
            color_small: COLOR_SMALL,
            color_big: COLOR_BIG,
            color_mode: ColorMode::Gradient,
        }
    }
}

impl PointParams {
    pub fn point_size(&self, bands: AudioBands) -> f32 {
        self.base_size + bands.treble * self.treble_coeff
    }

    pub fn big_color(&self, bands: AudioBands) -> [f32; 3] {
        match self.color_mode {
            ColorMode::Gradient => self.color_big,
            ColorMode::HueFromMid => {
                let hue_deg = (bands.mid * 360.0) % 360.0;
                hsl_to_rgb(hue_deg / 360.0, HUE_SATURATION, HUE_LIGHTNESS)
            }
        }
    }
}

/// Uniform block consumed by `shaders/particles.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    pub color_small: [f32; 4],
    pub color_big: [f32; 4],
    pub viewport: [f32; 2],
    pub pixel_ratio: f32,
    pub point_size: f32,
    pub bass: f32,
    pub mid: f32,
    pub treble: f32,
    pub radius: f32,
    /// Width of the shell the colour gradient spans, either side of `radius`.
    pub max_distance: f32,
    pub _pad: [f32; 3],
}

/// Per-frame inputs the render pass needs from the host scene.
#[derive(Clone, Copy, Debug)]
pub struct PointFrame {
    pub view_proj: Mat4,
    pub model: Mat4,
    pub viewport: [f32; 2],
    pub pixel_ratio: f32,
    pub max_distance: f32,
}

impl PointUniforms {
    pub fn build(params: &PointParams, frame: &PointFrame, bands: AudioBands) -> Self {
        let [sr, sg, sb] = params.color_small;
        let [br, bg, bb] = params.big_color(bands);
        Self {
            view_proj: frame.view_proj.to_cols_array_2d(),
            model: frame.model.to_cols_array_2d(),
            color_small: [sr, sg, sb, 1.0],
            color_big: [br, bg, bb, 1.0],
            viewport: frame.viewport,
            pixel_ratio: frame.pixel_ratio.min(MAX_PIXEL_RATIO),
            point_size: params.point_size(bands),
            bass: bands.bass,
            mid: bands.mid,
            treble: bands.treble,
            radius: SPHERE_RADIUS,
            max_distance: frame.max_distance,
            _pad: [0.0; 3],
        }
    }
}

/// Position of a particle within its colour gradient: 0 at the inner edge of
/// the displacement shell, 1 at the outer edge.
pub fn gradient_factor(distance_from_center: f32, radius: f32, max_distance: f32) -> f32 {
    if max_distance <= 0.0 {
        return 0.0;
    }
    ((distance_from_center - (radius - max_distance)) / (2.0 * max_distance)).clamp(0.0, 1.0)
}

/// On-screen sprite diameter in pixels for a point at view depth `depth`.
/// Mirrors the vertex stage: size shrinks with distance, never below 1px.
pub fn sprite_size_px(point_size: f32, pixel_ratio: f32, depth: f32) -> f32 {
    (point_size * pixel_ratio / depth.max(1e-3)).max(MIN_POINT_SIZE_PX)
}

/// HSL (all components in \[0, 1\]) to linear RGB.
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> [f32; 3] {
    if s <= 0.0 {
        return [l, l, l];
    }
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    let channel = |mut t: f32| {
        if t < 0.0 {
            t += 1.0;
        }
        if t > 1.0 {
            t -= 1.0;
        }
        if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 0.5 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * 6.0 * (2.0 / 3.0 - t)
        } else {
            p
        }
    };
    [channel(h + 1.0 / 3.0), channel(h), channel(h - 1.0 / 3.0)]
}
