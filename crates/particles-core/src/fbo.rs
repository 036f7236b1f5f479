//! Particle state layout and ping-pong role bookkeeping.
//!
//! Particle state lives entirely in two same-sized float textures. This module
//! owns the CPU-side facts about them: how a particle index maps to a texel,
//! which of the pair is currently readable, and the initial target data.

use glam::Vec3;
use rand::prelude::*;

/// Size of the particle state texture; one texel per particle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParticleLayout {
    pub width: u32,
    pub height: u32,
}

impl ParticleLayout {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    pub fn count(&self) -> u32 {
        self.width * self.height
    }

    #[inline]
    pub fn texel(&self, index: u32) -> (u32, u32) {
        (index % self.width, index / self.width)
    }

    /// Texel-centre UV for a particle index.
    #[inline]
    pub fn uv(&self, index: u32) -> [f32; 2] {
        let (x, y) = self.texel(index);
        [
            (x as f32 + 0.5) / self.width as f32,
            (y as f32 + 0.5) / self.height as f32,
        ]
    }

    /// Per-point lookup attribute: one UV per particle, in index order.
    pub fn lookup_uvs(&self) -> Vec<[f32; 2]> {
        (0..self.count()).map(|i| self.uv(i)).collect()
    }
}

/// Which member of a pair is read this step; the other one is written.
///
/// Holding both members in one value keeps the write target from ever being
/// handed out as a sampling source in the same step.
#[derive(Debug)]
pub struct PingPong<T> {
    pair: [T; 2],
    current: usize,
}

impl<T> PingPong<T> {
    /// `initial` becomes the readable member.
    pub fn new(initial: T, other: T) -> Self {
        Self {
            pair: [initial, other],
            current: 0,
        }
    }

    pub fn current(&self) -> &T {
        &self.pair[self.current]
    }

    pub fn next(&self) -> &T {
        &self.pair[1 - self.current]
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Both members in slot order, for building per-slot resources.
    pub fn slots(&self) -> &[T; 2] {
        &self.pair
    }

    pub fn swap(&mut self) {
        self.current = 1 - self.current;
    }

    /// Run one read→write step and swap roles afterwards.
    pub fn step<R>(&mut self, f: impl FnOnce(&T, &T) -> R) -> R {
        let out = f(&self.pair[self.current], &self.pair[1 - self.current]);
        self.swap();
        out
    }

    /// Same as [`PingPong::step`] with mutable access to the write member.
    pub fn step_mut<R>(&mut self, f: impl FnOnce(&T, &mut T) -> R) -> R {
        let (a, b) = self.pair.split_at_mut(1);
        let out = if self.current == 0 {
            f(&a[0], &mut b[0])
        } else {
            f(&b[0], &mut a[0])
        };
        self.swap();
        out
    }
}

/// Uniform point on a sphere surface via rejection sampling in the unit cube.
fn sphere_point<R: Rng>(rng: &mut R, radius: f32) -> Vec3 {
    loop {
        let v = Vec3::new(
            rng.gen::<f32>() * 2.0 - 1.0,
            rng.gen::<f32>() * 2.0 - 1.0,
            rng.gen::<f32>() * 2.0 - 1.0,
        );
        let len = v.length();
        if len <= 1.0 && len > 1e-6 {
            return v / len * radius;
        }
    }
}

/// RGBA32F texel data with one sphere-surface target per particle (w = 0).
pub fn sphere_targets(layout: ParticleLayout, radius: f32, seed: u64) -> Vec<[f32; 4]> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..layout.count())
        .map(|_| {
            let p = sphere_point(&mut rng, radius);
            [p.x, p.y, p.z, 0.0]
        })
        .collect()
}

/// Targets taken from mesh vertices, shuffled as whole xyz triples. The layout
/// is `ceil(sqrt(n))` texels wide; trailing texels stay at the origin.
pub fn mesh_targets(vertices: &[Vec3], seed: u64) -> (ParticleLayout, Vec<[f32; 4]>) {
    let n = vertices.len().max(1);
    let width = (n as f64).sqrt().ceil() as u32;
    let height = (n as u32).div_ceil(width);
    let layout = ParticleLayout::new(width, height);

    let mut shuffled = vertices.to_vec();
    shuffled.shuffle(&mut StdRng::seed_from_u64(seed));

    let mut data = vec![[0.0; 4]; layout.count() as usize];
    for (texel, v) in data.iter_mut().zip(shuffled.iter()) {
        *texel = [v.x, v.y, v.z, 0.0];
    }
    (layout, data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn texel_mapping_is_row_major() {
        let layout = ParticleLayout::new(4, 3);
        assert_eq!(layout.count(), 12);
        assert_eq!(layout.texel(0), (0, 0));
        assert_eq!(layout.texel(5), (1, 1));
        assert_eq!(layout.texel(11), (3, 2));
        assert_eq!(layout.uv(0), [0.125, 1.0 / 6.0]);
    }

    #[test]
    fn step_reads_current_and_writes_next() {
        let mut pp = PingPong::new("a", "b");
        let (read, write) = pp.step(|r, w| (*r, *w));
        assert_eq!((read, write), ("a", "b"));
        assert_eq!(*pp.current(), "b");
    }

    #[test]
    fn step_mut_writes_the_non_current_member() {
        let mut pp = PingPong::new(1, 0);
        pp.step_mut(|r, w| *w = *r + 1);
        assert_eq!(*pp.current(), 2);
        pp.step_mut(|r, w| *w = *r + 1);
        assert_eq!(*pp.current(), 3);
        assert_eq!(*pp.next(), 2);
    }

    #[test]
    fn sphere_targets_lie_on_the_sphere() {
        let layout = ParticleLayout::new(16, 16);
        let data = sphere_targets(layout, 128.0, 7);
        assert_eq!(data.len(), 256);
        for t in &data {
            let r = Vec3::new(t[0], t[1], t[2]).length();
            assert!((r - 128.0).abs() < 1e-2, "radius {}", r);
            assert_eq!(t[3], 0.0);
        }
    }

    #[test]
    fn mesh_targets_keep_every_vertex() {
        let verts: Vec<Vec3> = (0..10).map(|i| Vec3::splat(i as f32)).collect();
        let (layout, data) = mesh_targets(&verts, 3);
        assert_eq!(layout, ParticleLayout::new(4, 3));
        let mut xs: Vec<f32> = data[..10].iter().map(|t| t[0]).collect();
        xs.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(xs, (0..10).map(|i| i as f32).collect::<Vec<_>>());
        // triples stay intact
        assert!(data[..10].iter().all(|t| t[0] == t[1] && t[1] == t[2]));
        assert_eq!(data[10], [0.0; 4]);
    }
}
