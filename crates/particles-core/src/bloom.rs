//! Bloom settings, mip-chain planning and a CPU reference of the three
//! post-process stages in `shaders/bloom.wgsl`.
//!
//! - threshold: keep only the excess over `threshold`, scaled by itself
//! - blur: per mip level, two 4-tap kawase passes at offset `(i + 1) * 2`
//!   texels of the bloom base resolution, whatever the level's own size
//! - composite: `original + mix(bloom, bloom * tint, tint_strength) * strength`

use crate::constants::*;
use crate::error::{Error, Result, Viewport};
use smallvec::SmallVec;

/// Live-tunable bloom parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BloomSettings {
    pub threshold: f32,
    pub bloom_strength: f32,
    pub tint_color: [f32; 3],
    pub tint_strength: f32,
    pub n_mips: u32,
    /// Post-process base resolution as a fraction of the viewport.
    pub resolution: f32,
}

impl Default for BloomSettings {
    fn default() -> Self {
        Self {
            threshold: BLOOM_THRESHOLD,
            bloom_strength: BLOOM_STRENGTH,
            tint_color: BLOOM_TINT,
            tint_strength: BLOOM_TINT_STRENGTH,
            n_mips: BLOOM_MIPS,
            resolution: BLOOM_RESOLUTION,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MipSize {
    pub width: u32,
    pub height: u32,
}

/// Render-target sizes for one viewport/settings combination.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BloomChainPlan {
    /// Brightness-extraction target.
    pub base: MipSize,
    /// One entry per mip level; each level holds a horizontal and a vertical
    /// target of this size.
    pub levels: SmallVec<[MipSize; 5]>,
}

impl BloomChainPlan {
    pub fn new(viewport: Viewport, settings: &BloomSettings) -> Result<Self> {
        if !(BLOOM_MIPS_MIN..=BLOOM_MIPS_MAX).contains(&settings.n_mips) {
            return Err(Error::InvalidControlValue {
                name: "n_mips".into(),
                value: settings.n_mips as f32,
            });
        }
        let scale = settings
            .resolution
            .clamp(BLOOM_RESOLUTION_MIN, BLOOM_RESOLUTION_MAX);
        let base = MipSize {
            width: ((viewport.width as f32 * scale) as u32).max(1),
            height: ((viewport.height as f32 * scale) as u32).max(1),
        };
        let levels = (0..settings.n_mips)
            .map(|i| MipSize {
                width: (base.width >> i).max(1),
                height: (base.height >> i).max(1),
            })
            .collect();
        Ok(Self { base, levels })
    }

    pub fn n_mips(&self) -> usize {
        self.levels.len()
    }
}

/// Blur offset in base-resolution texels for mip level `level` (0-indexed).
#[inline]
pub fn blur_offset(level: usize) -> f32 {
    (level as f32 + 1.0) * BLUR_OFFSET_STEP
}

/// Uniform block shared by all bloom fragment entry points. One buffer is
/// written per pass so every pass sees its own offset. `resolution` is always
/// the bloom base size, so deeper mips blur by the same texel step.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BloomUniforms {
    pub resolution: [f32; 2],
    pub blur: f32,
    pub threshold: f32,
    pub tint: [f32; 4],
    pub bloom_strength: f32,
    pub tint_strength: f32,
    pub _pad: [f32; 2],
}

impl BloomUniforms {
    pub fn for_pass(settings: &BloomSettings, base: MipSize, blur: f32) -> Self {
        let [r, g, b] = settings.tint_color;
        Self {
            resolution: [base.width as f32, base.height as f32],
            blur,
            threshold: settings.threshold,
            tint: [r, g, b, 1.0],
            bloom_strength: settings.bloom_strength,
            tint_strength: settings.tint_strength,
            _pad: [0.0; 2],
        }
    }
}

#[inline]
fn scale(c: [f32; 4], k: f32) -> [f32; 4] {
    [c[0] * k, c[1] * k, c[2] * k, c[3] * k]
}

/// Soft brightness threshold of a single pixel.
pub fn threshold_pixel(c: [f32; 4], threshold: f32) -> [f32; 4] {
    let brightness = c[0].max(c[1]).max(c[2]);
    let contribution = (brightness - threshold).max(0.0);
    scale(c, contribution)
}

/// Tint and add one bloom sample onto the original pixel.
pub fn composite_pixel(original: [f32; 4], bloom: [f32; 4], settings: &BloomSettings) -> [f32; 4] {
    let ts = settings.tint_strength;
    let mut b = bloom;
    for (ch, tint) in b.iter_mut().zip(settings.tint_color.iter()) {
        let tinted = *ch * tint;
        *ch = *ch + (tinted - *ch) * ts;
    }
    let mut out = original;
    for (o, v) in out.iter_mut().zip(b.iter()) {
        *o += v * settings.bloom_strength;
    }
    out
}

/// Minimal RGBA float image used by the reference passes.
#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<[f32; 4]>,
}

impl Image {
    pub fn filled(width: u32, height: u32, color: [f32; 4]) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; (width * height) as usize],
        }
    }

    pub fn from_fn(width: u32, height: u32, f: impl Fn(u32, u32) -> [f32; 4]) -> Self {
        let pixels = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .map(|(x, y)| f(x, y))
            .collect();
        Self {
            width,
            height,
            pixels,
        }
    }

    #[inline]
    pub fn get(&self, x: i64, y: i64) -> [f32; 4] {
        let x = x.clamp(0, self.width as i64 - 1) as u32;
        let y = y.clamp(0, self.height as i64 - 1) as u32;
        self.pixels[(y * self.width + x) as usize]
    }

    /// Bilinear sample with clamp-to-edge addressing.
    pub fn sample(&self, u: f32, v: f32) -> [f32; 4] {
        let fx = u * self.width as f32 - 0.5;
        let fy = v * self.height as f32 - 0.5;
        let x0 = fx.floor();
        let y0 = fy.floor();
        let tx = fx - x0;
        let ty = fy - y0;
        let (x0, y0) = (x0 as i64, y0 as i64);
        let mut out = [0.0; 4];
        let taps = [
            (x0, y0, (1.0 - tx) * (1.0 - ty)),
            (x0 + 1, y0, tx * (1.0 - ty)),
            (x0, y0 + 1, (1.0 - tx) * ty),
            (x0 + 1, y0 + 1, tx * ty),
        ];
        for (x, y, w) in taps {
            let c = self.get(x, y);
            for k in 0..4 {
                out[k] += c[k] * w;
            }
        }
        out
    }
}

fn full_screen(target: MipSize, shade: impl Fn(f32, f32) -> [f32; 4]) -> Image {
    Image::from_fn(target.width, target.height, |x, y| {
        let u = (x as f32 + 0.5) / target.width as f32;
        let v = (y as f32 + 0.5) / target.height as f32;
        shade(u, v)
    })
}

pub fn threshold_pass(src: &Image, target: MipSize, threshold: f32) -> Image {
    full_screen(target, |u, v| threshold_pixel(src.sample(u, v), threshold))
}

/// Four diagonal taps at `offset` texels of `grid`, weighted 0.25 each.
pub fn kawase_pass(src: &Image, target: MipSize, offset: f32, grid: MipSize) -> Image {
    let px = offset / grid.width as f32;
    let py = offset / grid.height as f32;
    full_screen(target, |u, v| {
        let mut o = [0.0; 4];
        for (dx, dy) in [(-px, -py), (px, -py), (-px, py), (px, py)] {
            let c = src.sample(u + dx, v + dy);
            for k in 0..4 {
                o[k] += c[k] * 0.25;
            }
        }
        o
    })
}

pub fn composite_pass(original: &Image, bloom: &Image, settings: &BloomSettings) -> Image {
    let (w, h) = (original.width as f32, original.height as f32);
    Image::from_fn(original.width, original.height, |x, y| {
        let u = (x as f32 + 0.5) / w;
        let v = (y as f32 + 0.5) / h;
        composite_pixel(original.get(x as i64, y as i64), bloom.sample(u, v), settings)
    })
}

/// Whole bloom pipeline on the CPU, using the same plan the GPU allocates.
pub fn reference_bloom(frame: &Image, settings: &BloomSettings) -> Result<Image> {
    let viewport = Viewport::new(frame.width as i64, frame.height as i64)?;
    let plan = BloomChainPlan::new(viewport, settings)?;
    let mut input = threshold_pass(frame, plan.base, settings.threshold);
    for (i, level) in plan.levels.iter().enumerate() {
        let horizontal = kawase_pass(&input, *level, blur_offset(i), plan.base);
        input = kawase_pass(&horizontal, *level, blur_offset(i), plan.base);
    }
    Ok(composite_pass(frame, &input, settings))
}
