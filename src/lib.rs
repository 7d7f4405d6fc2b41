//! GPU colorization and compositing for geospatial raster tiles.
//!
//! Tiles are grids of `f32` scalars packed into `Rgba8Uint` textures (one
//! texel per scalar, IEEE-754 bytes in the machine's byte order). Draw
//! variants decode, optionally combine, and colorize them onto a caller's
//! surface; Calc variants write numeric intermediates that chain into any
//! other variant. All invocations execute serially on one device; the
//! library performs no cross-invocation scheduling.

pub mod bounds;
pub mod color;
pub mod config;
pub mod convert;
pub mod error;
pub mod filter;
pub mod gpu;
pub mod pipeline;
pub mod texture;
pub mod util;

pub use bounds::TextureBounds;
pub use color::{ColorBinding, ColorScale, ColorStop, SentinelTable, SentinelValue};
pub use config::CommonDrawConfig;
pub use error::{PipelineError, PipelineResult};
pub use filter::{BandFilter, BandSet, MAX_BANDS};
pub use pipeline::{DrawTarget, TilePipelines};
pub use texture::{IntermediateTarget, TileTexture, TileTextureRef, TILE_FORMAT};
