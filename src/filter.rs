//! Per-band gating filters for the multi-band analyze variants.
//!
//! Each input slot A–F carries a `[low, high]` gate and a multiplier. A raw
//! value that passes its gate contributes `raw * multiplier` to the
//! per-pixel aggregate; a failing band is excluded from the sum (not
//! zero-weighted into an average).

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, PipelineResult};

/// Maximum number of input slots a multi-band draw can sample.
pub const MAX_BANDS: usize = 6;

/// Gating range plus multiplier for one input slot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandFilter {
    pub low: f32,
    pub high: f32,
    pub multiplier: f32,
}

impl BandFilter {
    pub fn new(low: f32, high: f32, multiplier: f32) -> Self {
        Self {
            low,
            high,
            multiplier,
        }
    }

    /// Pass-through filter: every value contributes unscaled.
    pub fn open() -> Self {
        Self::new(f32::NEG_INFINITY, f32::INFINITY, 1.0)
    }

    pub fn passes(&self, raw: f32) -> bool {
        raw >= self.low && raw <= self.high
    }

    /// This band's contribution to the aggregate, or `None` when gated out.
    pub fn contribution(&self, raw: f32) -> Option<f32> {
        self.passes(raw).then(|| raw * self.multiplier)
    }
}

/// Fixed-capacity set of band filters with a runtime band count, shared by
/// the Calc and Draw stages of one multi-band invocation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandSet {
    filters: [BandFilter; MAX_BANDS],
    count: usize,
}

impl BandSet {
    /// Build from 1–6 filters. The slot count fixes the variant's
    /// cardinality; textures and bounds passed alongside must match it.
    pub fn new(filters: &[BandFilter]) -> PipelineResult<Self> {
        if filters.is_empty() || filters.len() > MAX_BANDS {
            return Err(PipelineError::configuration(format!(
                "band count must be 1..={}, got {}",
                MAX_BANDS,
                filters.len()
            )));
        }
        let mut fixed = [BandFilter::open(); MAX_BANDS];
        fixed[..filters.len()].copy_from_slice(filters);
        Ok(Self {
            filters: fixed,
            count: filters.len(),
        })
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn filters(&self) -> &[BandFilter] {
        &self.filters[..self.count]
    }

    /// The Calc-stage aggregation contract: inclusion sum of passing bands.
    /// `values` must supply exactly one raw value per active slot.
    pub fn aggregate(&self, values: &[f32]) -> PipelineResult<f32> {
        if values.len() != self.count {
            return Err(PipelineError::configuration(format!(
                "expected {} band values, got {}",
                self.count,
                values.len()
            )));
        }
        Ok(self
            .filters()
            .iter()
            .zip(values)
            .filter_map(|(f, &v)| f.contribution(v))
            .sum())
    }

    pub fn to_raw(&self) -> BandSetRaw {
        let mut raw = BandSetRaw::zeroed();
        for (dst, src) in raw.bands.iter_mut().zip(self.filters.iter()) {
            *dst = [src.low, src.high, src.multiplier, 0.0];
        }
        raw.band_count = self.count as u32;
        raw
    }
}

/// GPU uniform layout: one vec4 per slot (`low, high, multiplier, pad`).
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct BandSetRaw {
    pub bands: [[f32; 4]; MAX_BANDS],
    pub band_count: u32,
    pub _pad: [u32; 3],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_band_aggregate_sums_passing_contributions() {
        let set = BandSet::new(&[
            BandFilter::new(0.0, 100.0, 1.0),
            BandFilter::new(50.0, 200.0, 2.0),
        ])
        .unwrap();
        assert_eq!(set.aggregate(&[60.0, 80.0]).unwrap(), 220.0);
    }

    #[test]
    fn failing_band_is_excluded_not_zero_weighted() {
        let set = BandSet::new(&[
            BandFilter::new(0.0, 10.0, 1.0),
            BandFilter::new(0.0, 10.0, 3.0),
        ])
        .unwrap();
        // second band gated out entirely; sum is just the first band
        assert_eq!(set.aggregate(&[5.0, 50.0]).unwrap(), 5.0);
        // all bands gated out yields an empty sum
        assert_eq!(set.aggregate(&[50.0, 50.0]).unwrap(), 0.0);
    }

    #[test]
    fn gate_bounds_are_inclusive() {
        let f = BandFilter::new(0.0, 100.0, 2.0);
        assert_eq!(f.contribution(0.0), Some(0.0));
        assert_eq!(f.contribution(100.0), Some(200.0));
        assert_eq!(f.contribution(100.1), None);
    }

    #[test]
    fn band_cardinality_is_validated() {
        assert!(BandSet::new(&[]).is_err());
        assert!(BandSet::new(&[BandFilter::open(); 7]).is_err());

        let set = BandSet::new(&[BandFilter::open(); 2]).unwrap();
        assert!(matches!(
            set.aggregate(&[1.0, 2.0, 3.0]),
            Err(PipelineError::Configuration(_))
        ));
    }

    #[test]
    fn raw_layout_size_matches_wgsl() {
        assert_eq!(std::mem::size_of::<BandSetRaw>(), 16 * MAX_BANDS + 16);
    }
}
