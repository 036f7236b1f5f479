use super::helpers;
use particles_core::{BloomChainPlan, MipSize, Viewport};
use wgpu;

pub(crate) const HDR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

const TARGET_USAGE: wgpu::TextureUsages = wgpu::TextureUsages::RENDER_ATTACHMENT
    .union(wgpu::TextureUsages::TEXTURE_BINDING);

pub(crate) struct ColorTarget {
    pub(crate) tex: wgpu::Texture,
    pub(crate) view: wgpu::TextureView,
}

impl ColorTarget {
    fn new(device: &wgpu::Device, label: &str, size: MipSize) -> Self {
        let (tex, view) = helpers::create_color_texture(
            device,
            label,
            size.width,
            size.height,
            HDR_FORMAT,
            TARGET_USAGE,
        );
        Self { tex, view }
    }

    pub(crate) fn size(&self) -> MipSize {
        MipSize {
            width: self.tex.width(),
            height: self.tex.height(),
        }
    }
}

/// One bloom mip level: the first blur pass writes `horizontal`, the second
/// reads it and writes `vertical`.
pub(crate) struct MipLevel {
    pub(crate) horizontal: ColorTarget,
    pub(crate) vertical: ColorTarget,
}

/// Offscreen colour targets for the frame.
///
/// - `hdr` holds the scene (particles and sprites) in Rgba16Float.
/// - `base` receives the brightness threshold at the post-process resolution.
/// - `levels` is the bloom mip chain, each level half the size of the last.
pub(crate) struct RenderTargets {
    pub(crate) hdr: ColorTarget,
    pub(crate) base: ColorTarget,
    pub(crate) levels: Vec<MipLevel>,
}

fn build_levels(device: &wgpu::Device, plan: &BloomChainPlan) -> Vec<MipLevel> {
    plan.levels
        .iter()
        .enumerate()
        .map(|(i, size)| MipLevel {
            horizontal: ColorTarget::new(device, &format!("bloom_h{}", i), *size),
            vertical: ColorTarget::new(device, &format!("bloom_v{}", i), *size),
        })
        .collect()
}

impl RenderTargets {
    pub(crate) fn new(device: &wgpu::Device, viewport: Viewport, plan: &BloomChainPlan) -> Self {
        let hdr = ColorTarget::new(
            device,
            "hdr_tex",
            MipSize {
                width: viewport.width,
                height: viewport.height,
            },
        );
        Self {
            hdr,
            base: ColorTarget::new(device, "bloom_base", plan.base),
            levels: build_levels(device, plan),
        }
    }

    /// Replace every target. The old textures are dropped here, so nothing
    /// may still hold bind groups built against them.
    pub(crate) fn recreate(&mut self, device: &wgpu::Device, viewport: Viewport, plan: &BloomChainPlan) {
        *self = Self::new(device, viewport, plan);
    }

    /// Replace the bloom chain only; the scene target keeps its size.
    pub(crate) fn reallocate_bloom(&mut self, device: &wgpu::Device, plan: &BloomChainPlan) {
        self.base = ColorTarget::new(device, "bloom_base", plan.base);
        self.levels = build_levels(device, plan);
    }

    /// Output of the last blur pass, sampled by the composite.
    pub(crate) fn bloom_output(&self) -> &ColorTarget {
        self.levels
            .last()
            .map(|l| &l.vertical)
            .unwrap_or(&self.base)
    }
}
