//! CPU-side contract tests for the colorization and aggregation semantics
//! every kernel mirrors.

use std::io::Cursor;

use tileshade::color::{mix_rgba, Rgba, TRANSPARENT};
use tileshade::convert::{decode_dem_png, decode_terrain_rgb};
use tileshade::texture::{pack_values, unpack_values};
use tileshade::{
    BandFilter, BandSet, ColorBinding, ColorScale, ColorStop, CommonDrawConfig, PipelineError,
    SentinelTable, SentinelValue,
};

const BLUE: Rgba = [0.0, 0.0, 1.0, 1.0];
const WHITE: Rgba = [1.0, 1.0, 1.0, 1.0];
const RED: Rgba = [1.0, 0.0, 0.0, 1.0];

fn diverging_binding() -> ColorBinding {
    ColorBinding::new(
        ColorScale::new(vec![
            ColorStop {
                offset: -10.0,
                color: BLUE,
            },
            ColorStop {
                offset: 0.0,
                color: WHITE,
            },
            ColorStop {
                offset: 10.0,
                color: RED,
            },
        ])
        .unwrap(),
        SentinelTable::empty(),
    )
}

#[test]
fn value_crossfade_endpoints_match_single_draws() {
    let colors = diverging_binding();
    let (va, vb) = (-4.0_f32, 6.0_f32);
    // fraction 0 draws A alone, fraction 1 draws B alone
    let blend = |f: f32| va + (vb - va) * f;
    assert_eq!(colors.resolve(blend(0.0)), colors.resolve(va));
    assert_eq!(colors.resolve(blend(1.0)), colors.resolve(vb));
}

#[test]
fn color_crossfade_midpoint_averages_both_resolutions() {
    let colors_a = diverging_binding();
    let colors_b = ColorBinding::new(
        ColorScale::new(vec![
            ColorStop {
                offset: -10.0,
                color: RED,
            },
            ColorStop {
                offset: 10.0,
                color: BLUE,
            },
        ])
        .unwrap(),
        SentinelTable::empty(),
    );
    let v = 0.0;
    let ca = colors_a.resolve(v);
    let cb = colors_b.resolve(v);
    let mid = mix_rgba(ca, cb, 0.5);
    for ch in 0..4 {
        assert!((mid[ch] - (ca[ch] + cb[ch]) / 2.0).abs() < 1e-6);
    }
}

#[test]
fn diff_is_b_minus_a() {
    // a=2, b=5: the difference is +3, which must land on the warm side of a
    // diverging scale. A sign flip would turn it cool.
    let colors = diverging_binding();
    let (a, b) = (2.0_f32, 5.0_f32);
    let d = b - a;
    assert_eq!(d, 3.0);
    let c = colors.resolve(d);
    assert!(c[0] > c[2], "positive difference must resolve warm, got {c:?}");
}

#[test]
fn aggregate_feeds_sentinels_before_the_scale() {
    let bands = BandSet::new(&[
        BandFilter::new(0.0, 100.0, 1.0),
        BandFilter::new(50.0, 200.0, 2.0),
    ])
    .unwrap();
    let total = bands.aggregate(&[60.0, 80.0]).unwrap();
    assert_eq!(total, 220.0);

    let colors = ColorBinding::new(
        ColorScale::new(vec![
            ColorStop {
                offset: 0.0,
                color: WHITE,
            },
            ColorStop {
                offset: 400.0,
                color: RED,
            },
        ])
        .unwrap(),
        SentinelTable::new(vec![SentinelValue {
            value: 220.0,
            color: BLUE,
        }])
        .unwrap(),
    );
    // the sentinel matches the aggregate exactly and bypasses interpolation
    assert_eq!(colors.resolve(total), BLUE);
}

#[test]
fn six_band_aggregate_uses_every_slot() {
    let bands = BandSet::new(&[BandFilter::new(0.0, 10.0, 1.0); 6]).unwrap();
    let total = bands.aggregate(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
    assert_eq!(total, 21.0);
}

#[test]
fn band_cardinality_mismatch_fails_before_any_draw() {
    let bands = BandSet::new(&[BandFilter::open(); 4]).unwrap();
    assert!(matches!(
        bands.aggregate(&[1.0, 2.0]),
        Err(PipelineError::Configuration(_))
    ));
}

#[test]
fn resolution_order_is_sentinel_then_nodata_then_scale() {
    // a scale wide enough to span the nodata value must not colorize it
    let colors = ColorBinding::new(
        ColorScale::new(vec![
            ColorStop {
                offset: -10000.0,
                color: BLUE,
            },
            ColorStop {
                offset: 10000.0,
                color: RED,
            },
        ])
        .unwrap(),
        SentinelTable::empty(),
    );
    assert_eq!(colors.resolve_with_nodata(-9999.0, -9999.0), TRANSPARENT);
    assert_ne!(colors.resolve_with_nodata(0.0, -9999.0), TRANSPARENT);

    // but a sentinel registered for the nodata value wins over the
    // transparent default, matching the kernel check order
    let colors = ColorBinding::new(
        colors.scale,
        SentinelTable::new(vec![SentinelValue {
            value: -9999.0,
            color: RED,
        }])
        .unwrap(),
    );
    assert_eq!(colors.resolve_with_nodata(-9999.0, -9999.0), RED);
}

#[test]
fn packing_agrees_with_the_probed_byte_order() {
    let config = CommonDrawConfig::new(256, -9999.0).unwrap();
    let packed = pack_values(&[1.5], config.little_endian);
    assert_eq!(packed, 1.5_f32.to_ne_bytes());
    assert_eq!(unpack_values(&packed, config.little_endian), vec![1.5]);
}

fn encode_png(pixels: &[(u8, u8, u8, u8)], width: u32, height: u32) -> Vec<u8> {
    let mut img = image::RgbaImage::new(width, height);
    for (i, &(r, g, b, a)) in pixels.iter().enumerate() {
        let x = i as u32 % width;
        let y = i as u32 / width;
        img.put_pixel(x, y, image::Rgba([r, g, b, a]));
    }
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

#[test]
fn dem_png_decodes_elevations_and_nodata() {
    let png = encode_png(
        &[
            (0, 0, 0, 255),     // encoding floor
            (1, 134, 160, 255), // sea level
            (1, 134, 161, 255), // one decimeter up
            (255, 255, 255, 0), // fully transparent
        ],
        2,
        2,
    );
    let (values, width, height) = decode_dem_png(&png, -9999.0).unwrap();
    assert_eq!((width, height), (2, 2));
    assert_eq!(values, vec![-10000.0, 0.0, 0.1, -9999.0]);
}

#[test]
fn terrain_rgb_is_a_decimeter_ladder() {
    let base = decode_terrain_rgb(10, 20, 30);
    assert!((decode_terrain_rgb(10, 20, 31) - base - 0.1).abs() < 1e-4);
    assert!((decode_terrain_rgb(10, 21, 30) - base - 25.6).abs() < 1e-4);
}

#[test]
fn color_configuration_loads_from_json() {
    // scales and sentinel tables arrive as caller-side JSON settings and
    // validate during deserialization
    let scale: ColorScale = serde_json::from_str(
        r#"[
            {"offset": -10.0, "color": [0.0, 0.0, 1.0, 1.0]},
            {"offset": 10.0, "color": [1.0, 0.0, 0.0, 1.0]}
        ]"#,
    )
    .unwrap();
    assert_eq!(scale.resolve(-10.0), BLUE);

    let table: SentinelTable =
        serde_json::from_str(r#"[{"value": -9999.0, "color": [0.0, 0.0, 0.0, 0.0]}]"#).unwrap();
    assert_eq!(table.lookup(-9999.0), Some(TRANSPARENT));
}

#[test]
fn invalid_json_configuration_fails_to_deserialize() {
    // non-ascending offsets are rejected at the deserialization boundary
    let bad: Result<ColorScale, _> = serde_json::from_str(
        r#"[
            {"offset": 1.0, "color": [1.0, 1.0, 1.0, 1.0]},
            {"offset": 1.0, "color": [1.0, 0.0, 0.0, 1.0]}
        ]"#,
    );
    assert!(bad.is_err());
}

#[test]
fn garbage_png_is_an_upload_error() {
    assert!(matches!(
        decode_dem_png(b"not a png", -9999.0),
        Err(PipelineError::Upload(_))
    ));
}
