//! Texture-space addressing for tiles packed in a shared atlas.

use serde::{Deserialize, Serialize};

/// Normalized sub-rectangle addressing one tile's region inside a (possibly
/// shared) texture. Each input slot of a multi-input draw carries its own
/// bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextureBounds {
    pub top_left: [f32; 2],
    pub bottom_right: [f32; 2],
}

impl TextureBounds {
    pub fn new(top_left: [f32; 2], bottom_right: [f32; 2]) -> Self {
        Self {
            top_left,
            bottom_right,
        }
    }

    /// Bounds covering an entire texture.
    pub fn full() -> Self {
        Self::new([0.0, 0.0], [1.0, 1.0])
    }

    /// The four texture-coordinate vertices of the draw quad, in the same
    /// triangle-strip order as the screen-space positions
    /// (top-left, top-right, bottom-left, bottom-right).
    pub fn tex_coord_vertices(&self) -> [[f32; 2]; 4] {
        let [left, top] = self.top_left;
        let [right, bottom] = self.bottom_right;
        [[left, top], [right, top], [left, bottom], [right, bottom]]
    }

    /// Uniform-friendly `[left, top, right, bottom]` form, used by kernels
    /// that clamp neighborhood samples to the tile's region.
    pub fn as_vec4(&self) -> [f32; 4] {
        [
            self.top_left[0],
            self.top_left[1],
            self.bottom_right[0],
            self.bottom_right[1],
        ]
    }
}

impl Default for TextureBounds {
    fn default() -> Self {
        Self::full()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertices_follow_quad_strip_order() {
        let b = TextureBounds::new([0.25, 0.5], [0.75, 1.0]);
        assert_eq!(
            b.tex_coord_vertices(),
            [[0.25, 0.5], [0.75, 0.5], [0.25, 1.0], [0.75, 1.0]]
        );
    }

    #[test]
    fn full_covers_unit_square() {
        assert_eq!(TextureBounds::full().as_vec4(), [0.0, 0.0, 1.0, 1.0]);
    }
}
