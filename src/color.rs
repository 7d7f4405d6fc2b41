//! Color scales and sentinel overrides.
//!
//! A [`ColorScale`] is an ordered, bounded list of value→color stops; a
//! [`SentinelTable`] is a bounded set of exact-match overrides. Both are
//! rebuilt per invocation from current visualization settings and uploaded
//! as fixed-size uniform arrays. The CPU-side
//! [`ColorBinding::resolve_with_nodata`] function is the normative statement
//! of the per-pixel colorization contract (sentinel, then nodata, then
//! scale); the WGSL kernels mirror it.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, PipelineResult};

/// Hard ceiling on color scale length, imposed by the shared uniform layout.
/// A longer scale cannot be bound and is a configuration error.
pub const SCALE_MAX_LENGTH: usize = 16;

/// Hard ceiling on sentinel table length.
pub const SENTINEL_MAX_LENGTH: usize = 16;

/// RGBA color with channels in `[0, 1]`.
pub type Rgba = [f32; 4];

pub const TRANSPARENT: Rgba = [0.0, 0.0, 0.0, 0.0];

/// A single value→color stop. `offset` is the value threshold at which the
/// scale passes exactly through `color`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    pub offset: f32,
    pub color: Rgba,
}

/// An exact-match raw value mapped to a fixed override color, bypassing
/// scale interpolation entirely.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentinelValue {
    pub value: f32,
    pub color: Rgba,
}

/// Ordered list of color stops, strictly ascending by offset, at most
/// [`SCALE_MAX_LENGTH`] entries. Deserializes from a plain stop list with
/// the same validation as [`ColorScale::new`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<ColorStop>", into = "Vec<ColorStop>")]
pub struct ColorScale {
    stops: Vec<ColorStop>,
}

impl TryFrom<Vec<ColorStop>> for ColorScale {
    type Error = PipelineError;

    fn try_from(stops: Vec<ColorStop>) -> PipelineResult<Self> {
        Self::new(stops)
    }
}

impl From<ColorScale> for Vec<ColorStop> {
    fn from(scale: ColorScale) -> Self {
        scale.stops
    }
}

impl ColorScale {
    /// Validate and build a scale. Fails fast on over-length input rather
    /// than truncating, and rejects non-finite or non-ascending offsets.
    pub fn new(stops: Vec<ColorStop>) -> PipelineResult<Self> {
        if stops.len() > SCALE_MAX_LENGTH {
            return Err(PipelineError::configuration(format!(
                "color scale has {} stops, maximum is {}",
                stops.len(),
                SCALE_MAX_LENGTH
            )));
        }
        if stops.iter().any(|s| !s.offset.is_finite()) {
            return Err(PipelineError::configuration(
                "color scale offsets must be finite",
            ));
        }
        for pair in stops.windows(2) {
            if pair[0].offset >= pair[1].offset {
                return Err(PipelineError::configuration(format!(
                    "color scale offsets must be strictly ascending ({} then {})",
                    pair[0].offset, pair[1].offset
                )));
            }
        }
        Ok(Self { stops })
    }

    /// An empty scale; every value resolves transparent unless a sentinel
    /// matches first.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn stops(&self) -> &[ColorStop] {
        &self.stops
    }

    /// Resolve a value to a color: clamp to the first/last stop's color
    /// outside the covered range, otherwise linearly interpolate each
    /// channel between the bracketing pair.
    pub fn resolve(&self, v: f32) -> Rgba {
        let Some(first) = self.stops.first() else {
            return TRANSPARENT;
        };
        let last = self.stops.last().unwrap();
        if v <= first.offset {
            return first.color;
        }
        if v >= last.offset {
            return last.color;
        }
        for pair in self.stops.windows(2) {
            let (lo, hi) = (pair[0], pair[1]);
            if v >= lo.offset && v <= hi.offset {
                let t = ((v - lo.offset) / (hi.offset - lo.offset)).clamp(0.0, 1.0);
                return lerp_rgba(lo.color, hi.color, t);
            }
        }
        last.color
    }
}

/// Unordered set of exact-match overrides, at most [`SENTINEL_MAX_LENGTH`]
/// entries. Matching is bit-exact (so NaN sentinels also match).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<SentinelValue>", into = "Vec<SentinelValue>")]
pub struct SentinelTable {
    values: Vec<SentinelValue>,
}

impl TryFrom<Vec<SentinelValue>> for SentinelTable {
    type Error = PipelineError;

    fn try_from(values: Vec<SentinelValue>) -> PipelineResult<Self> {
        Self::new(values)
    }
}

impl From<SentinelTable> for Vec<SentinelValue> {
    fn from(table: SentinelTable) -> Self {
        table.values
    }
}

impl SentinelTable {
    pub fn new(values: Vec<SentinelValue>) -> PipelineResult<Self> {
        if values.len() > SENTINEL_MAX_LENGTH {
            return Err(PipelineError::configuration(format!(
                "sentinel table has {} entries, maximum is {}",
                values.len(),
                SENTINEL_MAX_LENGTH
            )));
        }
        Ok(Self { values })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[SentinelValue] {
        &self.values
    }

    /// Exact-match lookup; no tolerance, no interpolation toward neighbors.
    pub fn lookup(&self, v: f32) -> Option<Rgba> {
        self.values
            .iter()
            .find(|s| s.value.to_bits() == v.to_bits())
            .map(|s| s.color)
    }
}

/// A scale plus its sentinel overrides, passed together wherever a variant
/// colorizes. Sentinels are checked before scale resolution and win on a
/// match.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColorBinding {
    pub scale: ColorScale,
    pub sentinels: SentinelTable,
}

impl ColorBinding {
    pub fn new(scale: ColorScale, sentinels: SentinelTable) -> Self {
        Self { scale, sentinels }
    }

    /// The per-pixel colorization contract shared by every draw variant:
    /// sentinel override first, then the nodata rule (transparent), then
    /// scale resolution. A sentinel registered for the nodata value wins
    /// over the transparent default.
    pub fn resolve_with_nodata(&self, v: f32, nodata_value: f32) -> Rgba {
        if let Some(color) = self.sentinels.lookup(v) {
            return color;
        }
        if v.to_bits() == nodata_value.to_bits() {
            return TRANSPARENT;
        }
        self.scale.resolve(v)
    }

    /// Sentinel override then scale resolution, with no nodata rule.
    /// [`Self::resolve_with_nodata`] is the full kernel check order.
    pub fn resolve(&self, v: f32) -> Rgba {
        if let Some(color) = self.sentinels.lookup(v) {
            return color;
        }
        self.scale.resolve(v)
    }

    /// Pack into the fixed-size uniform layout. Entries beyond the active
    /// lengths are inert padding; the kernels scan only the first
    /// `scale_len`/`sentinel_len` entries.
    pub fn to_raw(&self) -> ColorBindingRaw {
        let mut raw = ColorBindingRaw::zeroed();
        for (dst, src) in raw.scale.iter_mut().zip(self.scale.stops()) {
            dst.color = src.color;
            dst.offset = src.offset;
        }
        for (dst, src) in raw.sentinels.iter_mut().zip(self.sentinels.values()) {
            dst.color = src.color;
            dst.value = src.value;
        }
        raw.scale_len = self.scale.len() as u32;
        raw.sentinel_len = self.sentinels.len() as u32;
        raw
    }
}

fn lerp_rgba(a: Rgba, b: Rgba, t: f32) -> Rgba {
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
        a[3] + (b[3] - a[3]) * t,
    ]
}

/// Channel-wise color blend used by the color-interpolation variants.
pub fn mix_rgba(a: Rgba, b: Rgba, t: f32) -> Rgba {
    lerp_rgba(a, b, t.clamp(0.0, 1.0))
}

// ---------- GPU uniform layout (std140-compatible, 16-byte strides) ----------

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct ScaleStopRaw {
    pub color: [f32; 4],
    pub offset: f32,
    pub _pad: [f32; 3],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct SentinelRaw {
    pub color: [f32; 4],
    pub value: f32,
    pub _pad: [f32; 3],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct ColorBindingRaw {
    pub scale: [ScaleStopRaw; SCALE_MAX_LENGTH],
    pub sentinels: [SentinelRaw; SENTINEL_MAX_LENGTH],
    pub scale_len: u32,
    pub sentinel_len: u32,
    pub _pad: [u32; 2],
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scale(stops: &[(f32, Rgba)]) -> ColorScale {
        ColorScale::new(
            stops
                .iter()
                .map(|&(offset, color)| ColorStop { offset, color })
                .collect(),
        )
        .unwrap()
    }

    const BLUE: Rgba = [0.0, 0.0, 1.0, 1.0];
    const WHITE: Rgba = [1.0, 1.0, 1.0, 1.0];
    const RED: Rgba = [1.0, 0.0, 0.0, 1.0];

    #[test]
    fn clamps_below_first_and_above_last_stop() {
        let s = scale(&[(-10.0, BLUE), (0.0, WHITE), (10.0, RED)]);
        assert_eq!(s.resolve(-100.0), BLUE);
        assert_eq!(s.resolve(-10.0), BLUE);
        assert_eq!(s.resolve(10.0), RED);
        assert_eq!(s.resolve(1e6), RED);
    }

    #[test]
    fn midpoint_is_halfway_between_bracketing_stops() {
        let s = scale(&[(-10.0, BLUE), (0.0, WHITE), (10.0, RED)]);
        let c = s.resolve(5.0);
        assert_eq!(c, [1.0, 0.5, 0.5, 1.0]);
    }

    #[test]
    fn interpolation_never_overshoots_endpoint_channels() {
        let s = scale(&[(0.0, [0.2, 0.8, 0.1, 1.0]), (1.0, [0.9, 0.3, 0.4, 0.5])]);
        let mut prev = s.resolve(0.0);
        for i in 1..=100 {
            let c = s.resolve(i as f32 / 100.0);
            for ch in 0..4 {
                let (lo, hi) = if s.stops()[0].color[ch] <= s.stops()[1].color[ch] {
                    (s.stops()[0].color[ch], s.stops()[1].color[ch])
                } else {
                    (s.stops()[1].color[ch], s.stops()[0].color[ch])
                };
                assert!(c[ch] >= lo - 1e-6 && c[ch] <= hi + 1e-6);
                // monotone per channel within the bracket
                if s.stops()[0].color[ch] <= s.stops()[1].color[ch] {
                    assert!(c[ch] >= prev[ch] - 1e-6);
                } else {
                    assert!(c[ch] <= prev[ch] + 1e-6);
                }
            }
            prev = c;
        }
    }

    #[test]
    fn sentinel_overrides_scale_anywhere_in_domain() {
        let binding = ColorBinding::new(
            scale(&[(-10.0, BLUE), (10.0, RED)]),
            SentinelTable::new(vec![SentinelValue {
                value: 0.0,
                color: [0.0, 1.0, 0.0, 1.0],
            }])
            .unwrap(),
        );
        // 0.0 sits mid-scale but the sentinel wins
        assert_eq!(binding.resolve(0.0), [0.0, 1.0, 0.0, 1.0]);
        assert_ne!(binding.resolve(0.1), [0.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn nodata_sentinel_yields_transparent() {
        let binding = ColorBinding::new(
            scale(&[(-10.0, BLUE), (10.0, RED)]),
            SentinelTable::new(vec![SentinelValue {
                value: -9999.0,
                color: TRANSPARENT,
            }])
            .unwrap(),
        );
        assert_eq!(binding.resolve(-9999.0), TRANSPARENT);
    }

    #[test]
    fn nodata_blanks_before_scale_resolution() {
        // a scale spanning the nodata value must not colorize it; the
        // nodata check sits between sentinels and the scale
        let binding = ColorBinding::new(
            scale(&[(-10000.0, BLUE), (10000.0, RED)]),
            SentinelTable::empty(),
        );
        assert_eq!(binding.resolve_with_nodata(-9999.0, -9999.0), TRANSPARENT);
        // neighboring values still resolve through the scale
        assert_ne!(binding.resolve_with_nodata(-9998.0, -9999.0), TRANSPARENT);
    }

    #[test]
    fn sentinel_for_the_nodata_value_beats_the_transparent_default() {
        let binding = ColorBinding::new(
            scale(&[(-10.0, BLUE), (10.0, RED)]),
            SentinelTable::new(vec![SentinelValue {
                value: -9999.0,
                color: RED,
            }])
            .unwrap(),
        );
        assert_eq!(binding.resolve_with_nodata(-9999.0, -9999.0), RED);
    }

    #[test]
    fn nan_sentinel_matches_bit_exactly() {
        let table = SentinelTable::new(vec![SentinelValue {
            value: f32::NAN,
            color: RED,
        }])
        .unwrap();
        assert_eq!(table.lookup(f32::NAN), Some(RED));
        assert_eq!(table.lookup(0.0), None);
    }

    #[test]
    fn over_length_scale_is_a_configuration_error() {
        let stops = (0..SCALE_MAX_LENGTH + 1)
            .map(|i| ColorStop {
                offset: i as f32,
                color: WHITE,
            })
            .collect();
        assert!(matches!(
            ColorScale::new(stops),
            Err(PipelineError::Configuration(_))
        ));
    }

    #[test]
    fn non_ascending_offsets_rejected() {
        let stops = vec![
            ColorStop {
                offset: 1.0,
                color: WHITE,
            },
            ColorStop {
                offset: 1.0,
                color: RED,
            },
        ];
        assert!(ColorScale::new(stops).is_err());
    }

    #[test]
    fn raw_layout_sizes_match_wgsl() {
        assert_eq!(std::mem::size_of::<ScaleStopRaw>(), 32);
        assert_eq!(std::mem::size_of::<SentinelRaw>(), 32);
        assert_eq!(
            std::mem::size_of::<ColorBindingRaw>(),
            32 * (SCALE_MAX_LENGTH + SENTINEL_MAX_LENGTH) + 16
        );
    }

    #[test]
    fn padding_entries_are_inert() {
        let binding = ColorBinding::new(scale(&[(0.0, BLUE), (1.0, RED)]), SentinelTable::empty());
        let raw = binding.to_raw();
        assert_eq!(raw.scale_len, 2);
        // entries beyond the active length stay zeroed
        assert_eq!(raw.scale[2].offset, 0.0);
        assert_eq!(raw.scale[2].color, TRANSPARENT);
    }
}
