//! Canonical packed-scalar textures.
//!
//! A tile is a grid of `f32` scalars stored as raw IEEE-754 bytes in an
//! `Rgba8Uint` texture (one texel per scalar, four channels = four bytes),
//! byte order per the process endianness flag. Calc-style passes re-emit the
//! same packing, so intermediate targets chain into any draw variant.

use crate::error::{PipelineError, PipelineResult};
use crate::gpu::align_copy_bpr;

pub const TILE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Uint;

/// Pack scalars into canonical bytes in the given order.
pub fn pack_values(values: &[f32], little_endian: bool) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(values.len() * 4);
    for v in values {
        if little_endian {
            bytes.extend_from_slice(&v.to_le_bytes());
        } else {
            bytes.extend_from_slice(&v.to_be_bytes());
        }
    }
    bytes
}

/// Inverse of [`pack_values`]; used by the readback path.
pub fn unpack_values(bytes: &[u8], little_endian: bool) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|c| {
            let b = [c[0], c[1], c[2], c[3]];
            if little_endian {
                f32::from_le_bytes(b)
            } else {
                f32::from_be_bytes(b)
            }
        })
        .collect()
}

/// A canonical packed-scalar texture: one tile, or a shared atlas holding
/// several tiles addressed via per-tile [`crate::bounds::TextureBounds`].
pub struct TileTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub size: [u32; 2],
}

impl TileTexture {
    /// Allocate an empty texture (atlas backing or write_region target).
    pub fn empty(device: &wgpu::Device, width: u32, height: u32, label: &str) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TILE_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            size: [width, height],
        }
    }

    /// Upload a full grid of scalars as one texture.
    pub fn from_values(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        width: u32,
        height: u32,
        values: &[f32],
        little_endian: bool,
        label: &str,
    ) -> PipelineResult<Self> {
        let tex = Self::empty(device, width, height, label);
        tex.write_region(queue, [0, 0], width, height, values, little_endian)?;
        Ok(tex)
    }

    /// Write one tile's scalars into a sub-region (atlas placement).
    pub fn write_region(
        &self,
        queue: &wgpu::Queue,
        origin: [u32; 2],
        width: u32,
        height: u32,
        values: &[f32],
        little_endian: bool,
    ) -> PipelineResult<()> {
        if values.len() != (width * height) as usize {
            return Err(PipelineError::upload(format!(
                "expected {} values for a {}x{} region, got {}",
                width * height,
                width,
                height,
                values.len()
            )));
        }
        if origin[0] + width > self.size[0] || origin[1] + height > self.size[1] {
            return Err(PipelineError::upload("region exceeds texture extent"));
        }
        let bytes = pack_values(values, little_endian);
        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d {
                    x: origin[0],
                    y: origin[1],
                    z: 0,
                },
                aspect: wgpu::TextureAspect::All,
            },
            &bytes,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        Ok(())
    }

    /// 1x1 placeholder bound to unused band slots. Never sampled by an
    /// active band; exists only to satisfy the bind group layout.
    pub fn dummy(device: &wgpu::Device, queue: &wgpu::Queue, little_endian: bool) -> Self {
        let tex = Self::empty(device, 1, 1, "tileshade.texture.dummy");
        tex.write_region(queue, [0, 0], 1, 1, &[0.0], little_endian)
            .expect("dummy upload cannot fail");
        tex
    }
}

/// Off-screen canonical target written by Calc-style passes and consumed by
/// later Draw passes. The caller must sequence Calc-before-Draw itself; the
/// pipeline provides no dependency tracking.
pub struct IntermediateTarget {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub size: [u32; 2],
}

impl IntermediateTarget {
    pub fn new(device: &wgpu::Device, width: u32, height: u32, label: &str) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TILE_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            size: [width, height],
        }
    }

    /// Reinterpret this target as a sampleable input for a chained pass.
    pub fn as_tile_input(&self) -> TileTextureRef<'_> {
        TileTextureRef {
            view: &self.view,
            size: self.size,
        }
    }

    /// Read the target back as scalars (debug/test path). Blocks on the GPU.
    pub fn read_values(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        little_endian: bool,
    ) -> PipelineResult<Vec<f32>> {
        let [width, height] = self.size;
        let unpadded = 4 * width;
        let padded = align_copy_bpr(unpadded);
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("tileshade.readback"),
            size: (padded * height) as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("tileshade.readback.encoder"),
        });
        encoder.copy_texture_to_buffer(
            wgpu::ImageCopyTexture {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::ImageCopyBuffer {
                buffer: &buffer,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(padded),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        queue.submit(Some(encoder.finish()));

        let slice = buffer.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |r| {
            let _ = tx.send(r);
        });
        device.poll(wgpu::Maintain::Wait);
        rx.recv()
            .map_err(|_| PipelineError::readback("map_async callback dropped"))?
            .map_err(|e| PipelineError::readback(e.to_string()))?;

        let data = slice.get_mapped_range();
        let mut rows = Vec::with_capacity((width * height) as usize * 4);
        for row in 0..height {
            let start = (row * padded) as usize;
            rows.extend_from_slice(&data[start..start + unpadded as usize]);
        }
        drop(data);
        buffer.unmap();
        Ok(unpack_values(&rows, little_endian))
    }
}

/// Borrowed view of a canonical texture, accepted by every draw variant so
/// tiles, atlases, and intermediate targets are interchangeable inputs.
#[derive(Clone, Copy)]
pub struct TileTextureRef<'a> {
    pub view: &'a wgpu::TextureView,
    pub size: [u32; 2],
}

impl<'a> From<&'a TileTexture> for TileTextureRef<'a> {
    fn from(t: &'a TileTexture) -> Self {
        Self {
            view: &t.view,
            size: t.size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_unpack_round_trips_both_orders() {
        let values = [0.0f32, -9999.0, 1.5, f32::MAX, -0.0];
        for le in [true, false] {
            assert_eq!(unpack_values(&pack_values(&values, le), le), values);
        }
    }

    #[test]
    fn packing_honors_byte_order() {
        let le = pack_values(&[1.0], true);
        let be = pack_values(&[1.0], false);
        assert_eq!(le, [0x00, 0x00, 0x80, 0x3f]);
        assert_eq!(be, [0x3f, 0x80, 0x00, 0x00]);
    }
}
