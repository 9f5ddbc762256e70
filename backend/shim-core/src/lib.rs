//! Conversion core that re-renders an arcade tile/object video board and its controls on the
//! A3X tile-and-sprite display controller, one frame at a time.

pub mod api;
pub mod colors;
pub mod dma;
pub mod input;
pub mod memory;
pub mod objects;
pub mod playfield;

pub use api::{FrameReport, ShimCore, ShimLoadError, TileRoms};
pub use memory::{ArcadeMemory, TargetVideo};
