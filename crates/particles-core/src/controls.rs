//! Named tunables for an external debug panel.
//!
//! Every field is independently settable by name and takes effect on the next
//! frame. Fields that change render-target sizes (`n_mips`, `resolution`) mark
//! the bloom chain for reallocation instead of being applied in place.

use crate::bloom::BloomSettings;
use crate::constants::*;
use crate::error::{Error, Result};
use crate::points::{ColorMode, PointParams};
use crate::simulation::SimParams;

#[derive(Clone, Debug, Default)]
pub struct ControlSurface {
    pub sim: SimParams,
    pub points: PointParams,
    pub bloom: BloomSettings,
    bloom_chain_dirty: bool,
}

pub const CONTROL_NAMES: &[&str] = &[
    "threshold",
    "bloom_strength",
    "tint_r",
    "tint_g",
    "tint_b",
    "tint_strength",
    "n_mips",
    "resolution",
    "point_size",
    "amplitude",
    "frequency",
    "max_distance",
    "color_mode",
];

fn in_range(name: &str, value: f32, lo: f32, hi: f32) -> Result<f32> {
    if value.is_finite() && (lo..=hi).contains(&value) {
        Ok(value)
    } else {
        Err(Error::InvalidControlValue {
            name: name.to_string(),
            value,
        })
    }
}

impl ControlSurface {
    pub fn set(&mut self, name: &str, value: f32) -> Result<()> {
        match name {
            "threshold" => self.bloom.threshold = in_range(name, value, 0.0, 1.0)?,
            "bloom_strength" => self.bloom.bloom_strength = in_range(name, value, 0.0, 3.0)?,
            "tint_r" => self.bloom.tint_color[0] = in_range(name, value, 0.0, 1.0)?,
            "tint_g" => self.bloom.tint_color[1] = in_range(name, value, 0.0, 1.0)?,
            "tint_b" => self.bloom.tint_color[2] = in_range(name, value, 0.0, 1.0)?,
            "tint_strength" => self.bloom.tint_strength = in_range(name, value, 0.0, 1.0)?,
            "n_mips" => {
                let n = in_range(name, value, BLOOM_MIPS_MIN as f32, BLOOM_MIPS_MAX as f32)?;
                let n = n.round() as u32;
                if n != self.bloom.n_mips {
                    self.bloom.n_mips = n;
                    self.bloom_chain_dirty = true;
                }
            }
            "resolution" => {
                let r = in_range(name, value, BLOOM_RESOLUTION_MIN, BLOOM_RESOLUTION_MAX)?;
                if r != self.bloom.resolution {
                    self.bloom.resolution = r;
                    self.bloom_chain_dirty = true;
                }
            }
            "point_size" => self.points.base_size = in_range(name, value, 0.0, 4096.0)?,
            "amplitude" => self.sim.amplitude = in_range(name, value, 0.0, 512.0)?,
            "frequency" => self.sim.frequency = in_range(name, value, 0.0, 1.0)?,
            "max_distance" => self.sim.max_distance = in_range(name, value, 0.0, 512.0)?,
            "color_mode" => {
                self.points.color_mode = if in_range(name, value, 0.0, 1.0)? >= 0.5 {
                    ColorMode::HueFromMid
                } else {
                    ColorMode::Gradient
                }
            }
            _ => return Err(Error::UnknownControl(name.to_string())),
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<f32> {
        let v = match name {
            "threshold" => self.bloom.threshold,
            "bloom_strength" => self.bloom.bloom_strength,
            "tint_r" => self.bloom.tint_color[0],
            "tint_g" => self.bloom.tint_color[1],
            "tint_b" => self.bloom.tint_color[2],
            "tint_strength" => self.bloom.tint_strength,
            "n_mips" => self.bloom.n_mips as f32,
            "resolution" => self.bloom.resolution,
            "point_size" => self.points.base_size,
            "amplitude" => self.sim.amplitude,
            "frequency" => self.sim.frequency,
            "max_distance" => self.sim.max_distance,
            "color_mode" => match self.points.color_mode {
                ColorMode::Gradient => 0.0,
                ColorMode::HueFromMid => 1.0,
            },
            _ => return None,
        };
        Some(v)
    }

    /// Returns whether the bloom chain needs reallocating, clearing the flag.
    pub fn take_bloom_chain_dirty(&mut self) -> bool {
        std::mem::take(&mut self.bloom_chain_dirty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_listed_control_round_trips() {
        let surface = ControlSurface::default();
        for name in CONTROL_NAMES {
            assert!(surface.get(name).is_some(), "missing getter for {}", name);
        }
    }

    #[test]
    fn chain_dirty_only_on_size_changes() {
        let mut s = ControlSurface::default();
        s.set("threshold", 0.4).unwrap();
        assert!(!s.take_bloom_chain_dirty());
        s.set("n_mips", 5.0).unwrap();
        assert!(s.take_bloom_chain_dirty());
        assert!(!s.take_bloom_chain_dirty());
        s.set("n_mips", 5.0).unwrap();
        assert!(!s.take_bloom_chain_dirty());
        s.set("resolution", 0.25).unwrap();
        assert!(s.take_bloom_chain_dirty());
    }

    #[test]
    fn rejects_unknown_and_out_of_range() {
        let mut s = ControlSurface::default();
        assert_eq!(
            s.set("glow", 1.0),
            Err(Error::UnknownControl("glow".into()))
        );
        assert!(s.set("n_mips", 9.0).is_err());
        assert!(s.set("threshold", f32::NAN).is_err());
        assert_eq!(s.bloom.n_mips, BLOOM_MIPS);
    }

    #[test]
    fn color_mode_is_a_switch() {
        let mut s = ControlSurface::default();
        s.set("color_mode", 1.0).unwrap();
        assert_eq!(s.points.color_mode, ColorMode::HueFromMid);
        s.set("color_mode", 0.0).unwrap();
        assert_eq!(s.points.color_mode, ColorMode::Gradient);
    }
}
