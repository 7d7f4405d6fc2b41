//! Tile ingestion adapter.
//!
//! Decodes a tile's native packed byte encoding (Terrain-RGB DEM PNGs) into
//! the canonical packed-scalar representation consumed by every variant.
//! The byte-order flag from [`crate::config::CommonDrawConfig`] fixes how
//! the canonical bytes are laid out; producer and kernels must agree.

use crate::config::CommonDrawConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::texture::TileTexture;

/// Decode one Terrain-RGB sample to elevation in meters.
/// `elevation = (R * 65536 + G * 256 + B) / 10 - 10000`
#[inline]
pub fn decode_terrain_rgb(r: u8, g: u8, b: u8) -> f32 {
    (r as u32 as f32 * 65536.0 + g as u32 as f32 * 256.0 + b as u32 as f32) / 10.0 - 10000.0
}

/// Decode an encoded DEM PNG into a scalar grid. Fully transparent pixels
/// become the configured nodata value.
pub fn decode_dem_png(png_bytes: &[u8], nodata_value: f32) -> PipelineResult<(Vec<f32>, u32, u32)> {
    let img = image::load_from_memory(png_bytes)
        .map_err(|e| PipelineError::upload(format!("failed to decode DEM PNG: {}", e)))?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    let values = rgba
        .pixels()
        .map(|p| {
            if p[3] == 0 {
                nodata_value
            } else {
                decode_terrain_rgb(p[0], p[1], p[2])
            }
        })
        .collect();
    Ok((values, width, height))
}

/// Decode a DEM PNG tile and upload it as a canonical tile texture.
pub fn tile_from_dem_png(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    config: &CommonDrawConfig,
    png_bytes: &[u8],
) -> PipelineResult<TileTexture> {
    let (values, width, height) = decode_dem_png(png_bytes, config.nodata_value)?;
    if width != config.tile_size || height != config.tile_size {
        return Err(PipelineError::upload(format!(
            "DEM tile is {}x{}, expected {}x{}",
            width, height, config.tile_size, config.tile_size
        )));
    }
    log::debug!("ingested {}x{} DEM tile", width, height);
    TileTexture::from_values(
        device,
        queue,
        width,
        height,
        &values,
        config.little_endian,
        "tileshade.texture.dem",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terrain_rgb_reference_values() {
        // all-zero bytes sit at the encoding floor
        assert_eq!(decode_terrain_rgb(0, 0, 0), -10000.0);
        // (1, 134, 160) encodes exactly sea level
        assert_eq!(decode_terrain_rgb(1, 134, 160), 0.0);
        // one blue step is a decimeter
        assert_eq!(decode_terrain_rgb(1, 134, 161), 0.1);
    }
}
