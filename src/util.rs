//! Small shared helpers: byte-order probe, viewport transform, WGSL macro
//! splicing for shader composition.

use glam::Mat4;

/// One-time machine byte-order probe. The result is captured into
/// [`crate::config::CommonDrawConfig`] at construction and treated as a
/// process-lifetime constant; it is never re-probed.
pub fn machine_is_little_endian() -> bool {
    0x1234_5678u32.to_ne_bytes()[0] == 0x78
}

/// Orthographic transform mapping canvas pixel coordinates (origin top-left,
/// y down) onto normalized device coordinates. Re-derived each invocation
/// from the current viewport dimensions.
pub fn transform_matrix(viewport_width: u32, viewport_height: u32) -> Mat4 {
    Mat4::orthographic_rh(
        0.0,
        viewport_width as f32,
        viewport_height as f32,
        0.0,
        -1.0,
        1.0,
    )
}

/// Splice shared constants and common WGSL snippets into a variant's shader
/// source. The uniform array bounds (`SCALE_MAX_LENGTH` etc.) live in Rust
/// constants; every kernel sees the same values, so the variants stay
/// composable.
pub fn compose_shader(parts: &[&str], macros: &[(&str, u32)]) -> String {
    let mut out = String::new();
    for (name, value) in macros {
        out.push_str(&format!("const {}: u32 = {}u;\n", name, value));
    }
    for part in parts {
        out.push('\n');
        out.push_str(part);
    }
    out
}
