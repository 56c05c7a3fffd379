//! Chunk dimensions and cell bit depths.
//!
//! A chunk is addressed row-major by Y, then by `(x, z)` within a row, with
//! `x` varying fastest.

use serde::{Deserialize, Serialize};

use crate::nibble;

/// Default chunk width along X.
pub const DEFAULT_SIZE_X: usize = 16;

/// Default chunk height along Y.
pub const DEFAULT_SIZE_Y: usize = 256;

/// Default chunk depth along Z.
pub const DEFAULT_SIZE_Z: usize = 16;

/// Dimensions of one chunk's cell volume.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Extent {
    /// Cells along X.
    pub size_x: usize,
    /// Cells along Y (number of rows).
    pub size_y: usize,
    /// Cells along Z.
    pub size_z: usize,
}

impl Extent {
    /// Creates an extent from its three dimensions.
    pub const fn new(size_x: usize, size_y: usize, size_z: usize) -> Self {
        Self {
            size_x,
            size_y,
            size_z,
        }
    }

    /// Number of cells in one Y layer (`size_x * size_z`).
    pub const fn row_size(&self) -> usize {
        self.size_x * self.size_z
    }

    /// Total number of cells.
    pub const fn volume(&self) -> usize {
        self.row_size() * self.size_y
    }

    /// Returns `true` if any dimension is zero.
    pub const fn is_empty(&self) -> bool {
        self.size_x == 0 || self.size_y == 0 || self.size_z == 0
    }

    /// Returns `true` if `(x, y, z)` lies inside the extent.
    pub const fn contains(&self, x: usize, y: usize, z: usize) -> bool {
        x < self.size_x && y < self.size_y && z < self.size_z
    }

    /// Index of the cell `(x, z)` within its row.
    pub const fn row_index(&self, x: usize, z: usize) -> usize {
        x + z * self.size_x
    }
}

impl Default for Extent {
    fn default() -> Self {
        Self::new(DEFAULT_SIZE_X, DEFAULT_SIZE_Y, DEFAULT_SIZE_Z)
    }
}

/// Bits stored per cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BitDepth {
    /// Two cells per byte.
    Four,
    /// One byte per cell.
    Eight,
    /// Two bytes per cell.
    Sixteen,
}

impl BitDepth {
    /// Number of bits per cell.
    pub const fn bits(self) -> u8 {
        match self {
            Self::Four => 4,
            Self::Eight => 8,
            Self::Sixteen => 16,
        }
    }

    /// Largest value a cell of this depth can hold.
    pub const fn max_value(self) -> u16 {
        match self {
            Self::Four => 0x0F,
            Self::Eight => 0xFF,
            Self::Sixteen => u16::MAX,
        }
    }

    /// Number of backing buffer elements needed for a row of `row_size` cells.
    pub const fn row_len(self, row_size: usize) -> usize {
        match self {
            Self::Four => nibble::bytes_for(row_size),
            Self::Eight | Self::Sixteen => row_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_extent_is_16_256_16() {
        let extent = Extent::default();
        assert_eq!(extent.row_size(), 256);
        assert_eq!(extent.volume(), 65_536);
        assert!(!extent.is_empty());
    }

    #[test]
    fn test_row_index_x_fastest() {
        let extent = Extent::new(4, 2, 3);
        assert_eq!(extent.row_index(0, 0), 0);
        assert_eq!(extent.row_index(3, 0), 3);
        assert_eq!(extent.row_index(0, 1), 4);
        assert_eq!(extent.row_index(3, 2), 11);
    }

    #[test]
    fn test_contains_bounds() {
        let extent = Extent::new(2, 3, 4);
        assert!(extent.contains(1, 2, 3));
        assert!(!extent.contains(2, 0, 0));
        assert!(!extent.contains(0, 3, 0));
        assert!(!extent.contains(0, 0, 4));
    }

    #[test]
    fn test_row_len_per_depth() {
        assert_eq!(BitDepth::Four.row_len(256), 128);
        assert_eq!(BitDepth::Eight.row_len(256), 256);
        assert_eq!(BitDepth::Sixteen.row_len(256), 256);
        assert_eq!(BitDepth::Four.max_value(), 15);
    }
}
