use super::helpers;
use particles_core::{ParticleLayout, PingPong};
use wgpu::util::DeviceExt;

pub(crate) const POSITION_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba32Float;

pub(crate) struct StateTexture {
    pub(crate) tex: wgpu::Texture,
    pub(crate) view: wgpu::TextureView,
}

impl StateTexture {
    fn new(device: &wgpu::Device, label: &str, layout: ParticleLayout) -> Self {
        let (tex, view) = helpers::create_color_texture(
            device,
            label,
            layout.width,
            layout.height,
            POSITION_FORMAT,
            wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_DST,
        );
        Self { tex, view }
    }

    fn upload(&self, queue: &wgpu::Queue, layout: ParticleLayout, data: &[[f32; 4]]) {
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.tex,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            bytemuck::cast_slice(data),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(layout.width * 16),
                rows_per_image: Some(layout.height),
            },
            wgpu::Extent3d {
                width: layout.width,
                height: layout.height,
                depth_or_array_layers: 1,
            },
        );
    }
}

/// GPU side of the particle state: two position textures that trade read and
/// write roles every step, the static target texture, and the per-instance
/// lookup UVs the point pass uses to find each particle's texel.
pub(crate) struct ParticleBuffers {
    pub(crate) layout: ParticleLayout,
    pub(crate) positions: PingPong<StateTexture>,
    pub(crate) targets: StateTexture,
    pub(crate) lookup: wgpu::Buffer,
}

impl ParticleBuffers {
    /// Both the target texture and the initial readable position texture are
    /// seeded with `target_data`, so the first frame is already on the shape.
    pub(crate) fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: ParticleLayout,
        target_data: &[[f32; 4]],
    ) -> Self {
        let targets = StateTexture::new(device, "particle_targets", layout);
        targets.upload(queue, layout, target_data);
        let initial = StateTexture::new(device, "particle_positions_a", layout);
        initial.upload(queue, layout, target_data);
        let other = StateTexture::new(device, "particle_positions_b", layout);

        let uvs = layout.lookup_uvs();
        let lookup = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("particle_lookup"),
            contents: bytemuck::cast_slice(&uvs),
            usage: wgpu::BufferUsages::VERTEX,
        });

        Self {
            layout,
            positions: PingPong::new(initial, other),
            targets,
            lookup,
        }
    }

    pub(crate) fn count(&self) -> u32 {
        self.layout.count()
    }
}
