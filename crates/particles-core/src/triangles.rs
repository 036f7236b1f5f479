//! Decorative instanced triangle sprites with a simple life cycle.

use crate::constants::*;
use rand::prelude::*;

/// Equilateral unit triangle centred on its centroid, with UVs.
pub const TRIANGLE_VERTICES: [[f32; 4]; 3] = [
    // x, y, u, v
    [-0.5, -0.288675, 0.0, 0.0],
    [0.5, -0.288675, 1.0, 0.0],
    [0.0, 0.577350, 0.5, 1.0],
];

/// Per-instance attributes, laid out for an instance-step vertex buffer.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TriangleInstance {
    pub position: [f32; 3],
    pub scale: f32,
    pub color: [f32; 3],
    pub rotation: f32,
    pub life: f32,
    pub _pad: [f32; 3],
}

pub struct TriangleField {
    instances: Vec<TriangleInstance>,
    rng: StdRng,
}

fn random_position(rng: &mut StdRng) -> [f32; 3] {
    [
        (rng.gen::<f32>() - 0.5) * TRIANGLE_SPREAD,
        (rng.gen::<f32>() - 0.5) * TRIANGLE_SPREAD,
        (rng.gen::<f32>() - 0.5) * TRIANGLE_SPREAD,
    ]
}

impl TriangleField {
    pub fn new(count: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let instances = (0..count)
            .map(|_| TriangleInstance {
                position: random_position(&mut rng),
                scale: rng.gen::<f32>() * TRIANGLE_SCALE_SPAN + TRIANGLE_SCALE_MIN,
                color: [rng.gen(), rng.gen(), rng.gen()],
                rotation: rng.gen::<f32>() * std::f32::consts::TAU,
                life: rng.gen(),
                _pad: [0.0; 3],
            })
            .collect();
        Self { instances, rng }
    }

    pub fn instances(&self) -> &[TriangleInstance] {
        &self.instances
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// One frame: spin, age, and respawn expired sprites at a new position.
    pub fn update(&mut self) {
        for inst in &mut self.instances {
            inst.rotation += TRIANGLE_SPIN_PER_FRAME;
            inst.life -= TRIANGLE_LIFE_DECAY_PER_FRAME;
            if inst.life <= 0.0 {
                inst.life = 1.0;
                inst.position = random_position(&mut self.rng);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expired_sprites_respawn_inside_the_cube() {
        let mut field = TriangleField::new(64, 1);
        for _ in 0..500 {
            field.update();
        }
        let half = TRIANGLE_SPREAD / 2.0;
        for inst in field.instances() {
            assert!(inst.life > 0.0 && inst.life <= 1.0);
            assert!(inst.position.iter().all(|c| c.abs() <= half));
            assert!(inst.scale >= TRIANGLE_SCALE_MIN);
        }
    }

    #[test]
    fn instance_stride_is_aligned() {
        assert_eq!(std::mem::size_of::<TriangleInstance>(), 48);
    }
}
