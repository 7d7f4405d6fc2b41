//! Shared draw configuration merged into every variant.

use bytemuck::{Pod, Zeroable};

use crate::error::{PipelineError, PipelineResult};
use crate::util;

/// Immutable configuration shared (read-only) by all variants for one
/// surface/tile-size configuration: tile geometry, the nodata sentinel, and
/// the process-wide byte-order flag. Constructed once and reused; per-draw
/// state (scales, filters, bounds) never lives here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommonDrawConfig {
    pub tile_size: u32,
    pub nodata_value: f32,
    /// Machine byte order, probed once at construction and constant for the
    /// process lifetime. Producers and kernels must agree on it to
    /// reinterpret packed bytes as IEEE floats.
    pub little_endian: bool,
}

impl CommonDrawConfig {
    pub fn new(tile_size: u32, nodata_value: f32) -> PipelineResult<Self> {
        if tile_size == 0 {
            return Err(PipelineError::configuration("tile size must be nonzero"));
        }
        Ok(Self {
            tile_size,
            nodata_value,
            little_endian: util::machine_is_little_endian(),
        })
    }

    /// Screen-space quad for a tile anchored at `canvas_coordinates`
    /// (pixels, origin top-left), in triangle-strip order
    /// (top-left, top-right, bottom-left, bottom-right).
    pub fn quad_positions(&self, canvas_coordinates: [f32; 2]) -> [[f32; 2]; 4] {
        let [left, top] = canvas_coordinates;
        let right = left + self.tile_size as f32;
        let bottom = top + self.tile_size as f32;
        [[left, top], [right, top], [left, bottom], [right, bottom]]
    }

    /// Globals uniform for one invocation, re-derived from the current
    /// canvas size.
    pub fn globals(&self, canvas_size: [u32; 2]) -> GlobalsRaw {
        GlobalsRaw {
            transform: util::transform_matrix(canvas_size[0], canvas_size[1]).to_cols_array_2d(),
            nodata_value: self.nodata_value,
            little_endian: self.little_endian as u32,
            _pad: [0; 2],
        }
    }
}

/// `Globals` uniform block shared by all kernels.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct GlobalsRaw {
    pub transform: [[f32; 4]; 4],
    pub nodata_value: f32,
    pub little_endian: u32,
    pub _pad: [u32; 2],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_matches_tile_extent() {
        let cfg = CommonDrawConfig::new(256, -9999.0).unwrap();
        assert_eq!(
            cfg.quad_positions([10.0, 20.0]),
            [
                [10.0, 20.0],
                [266.0, 20.0],
                [10.0, 276.0],
                [266.0, 276.0]
            ]
        );
    }

    #[test]
    fn zero_tile_size_rejected() {
        assert!(CommonDrawConfig::new(0, -9999.0).is_err());
    }

    #[test]
    fn globals_layout_size() {
        assert_eq!(std::mem::size_of::<GlobalsRaw>(), 80);
    }
}
