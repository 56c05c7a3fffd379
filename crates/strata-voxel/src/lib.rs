//! Per-chunk voxel arrays and their runtime compaction.
//!
//! Chunks keep each kind of per-cell data in a [`VoxelArray`], either dense or
//! sparse. A [`Deflator`] rewrites arrays into the smaller shape when enough
//! of their Y layers are uniform, without changing any cell's value.

pub mod array;
pub mod deflate;
pub mod extent;
pub mod layers;
pub mod nibble;

pub use array::{DenseArray, InflatedRows, SparseArray, VoxelArray, VoxelArrayError};
pub use deflate::{
    DEFLATE_MINIMUM_4BIT, DEFLATE_MINIMUM_8BIT, DEFLATE_MINIMUM_16BIT, DeflateError,
    DeflateThresholds, Deflator, NullDeflator, StandardDeflator, TypedDeflator, deflator_for,
};
pub use extent::{BitDepth, Extent};
pub use layers::{ChunkLayers, DeflationReport, Layer, LayerSavings};
