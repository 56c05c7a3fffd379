//! Per-chunk voxel arrays in dense and sparse shapes.
//!
//! A [`VoxelArray`] holds one chunk's cells at a fixed [`BitDepth`]. The dense
//! shapes store every row; the sparse shapes store a single value for each
//! uniform row and keep full rows only where a layer is mixed. A sparse array
//! whose layers all share one value collapses further to a whole-array fill
//! with no per-layer tables at all.
//!
//! 4-bit arrays store nibble-packed bytes (see [`crate::nibble`]); their
//! per-layer values and fill are whole bytes.

use std::mem::size_of;

use crate::extent::{BitDepth, Extent};
use crate::nibble;

/// Errors that can occur when constructing a voxel array.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VoxelArrayError {
    /// One of the dimensions is zero.
    #[error("extent {size_x}x{size_y}x{size_z} has a zero dimension")]
    EmptyExtent {
        /// Cells along X.
        size_x: usize,
        /// Cells along Y.
        size_y: usize,
        /// Cells along Z.
        size_z: usize,
    },
    /// 4-bit rows must hold a whole number of bytes.
    #[error("4-bit arrays need an even row size, got {0}")]
    OddRowSize(usize),
    /// A buffer or table has the wrong number of elements.
    #[error("length mismatch: expected {expected}, got {actual}")]
    LengthMismatch {
        /// Required element count.
        expected: usize,
        /// Supplied element count.
        actual: usize,
    },
    /// An array has a different bit depth than its slot requires.
    #[error("depth mismatch: expected {expected:?}, got {actual:?}")]
    DepthMismatch {
        /// Required depth.
        expected: BitDepth,
        /// Supplied depth.
        actual: BitDepth,
    },
    /// Two arrays that must share dimensions do not.
    #[error("extent mismatch: expected {expected:?}, got {actual:?}")]
    ExtentMismatch {
        /// Required extent.
        expected: Extent,
        /// Supplied extent.
        actual: Extent,
    },
}

/// Full rows of a sparse array, one slot per Y layer.
pub type InflatedRows<T> = Box<[Option<Box<[T]>>]>;

/// Checks that `extent` can back an array of the given depth and returns the
/// row length in buffer elements.
fn row_len_for(depth: BitDepth, extent: Extent) -> Result<usize, VoxelArrayError> {
    if extent.is_empty() {
        return Err(VoxelArrayError::EmptyExtent {
            size_x: extent.size_x,
            size_y: extent.size_y,
            size_z: extent.size_z,
        });
    }
    let row_size = extent.row_size();
    if depth == BitDepth::Four && row_size % 2 != 0 {
        return Err(VoxelArrayError::OddRowSize(row_size));
    }
    Ok(depth.row_len(row_size))
}

fn check_len(expected: usize, actual: usize) -> Result<(), VoxelArrayError> {
    if expected == actual {
        Ok(())
    } else {
        Err(VoxelArrayError::LengthMismatch { expected, actual })
    }
}

// ---------------------------------------------------------------------------
// Dense
// ---------------------------------------------------------------------------

/// A flat buffer with one element per cell (or per nibble pair for 4-bit).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DenseArray<T> {
    extent: Extent,
    row_len: usize,
    data: Box<[T]>,
}

impl<T: Copy> DenseArray<T> {
    fn new(extent: Extent, row_len: usize, data: Box<[T]>) -> Result<Self, VoxelArrayError> {
        check_len(extent.size_y * row_len, data.len())?;
        Ok(Self {
            extent,
            row_len,
            data,
        })
    }

    /// Dimensions of the array.
    pub fn extent(&self) -> Extent {
        self.extent
    }

    /// Buffer elements per row.
    pub fn row_len(&self) -> usize {
        self.row_len
    }

    /// The whole backing buffer, row-major by Y.
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// The buffer elements of layer `y`.
    pub fn row(&self, y: usize) -> &[T] {
        let start = y * self.row_len;
        &self.data[start..start + self.row_len]
    }

    fn row_mut(&mut self, y: usize) -> &mut [T] {
        let start = y * self.row_len;
        &mut self.data[start..start + self.row_len]
    }

    fn element(&self, y: usize, i: usize) -> T {
        self.data[y * self.row_len + i]
    }

    fn element_mut(&mut self, y: usize, i: usize) -> &mut T {
        &mut self.data[y * self.row_len + i]
    }

    fn estimated_memory_bytes(&self) -> usize {
        size_of::<Self>() + self.data.len() * size_of::<T>()
    }
}

// ---------------------------------------------------------------------------
// Sparse
// ---------------------------------------------------------------------------

/// Per-layer storage: a single value for each uniform row plus full copies of
/// the mixed rows.
///
/// `deflated[y]` is only meaningful where `inflated[y]` is `None`. With both
/// tables absent every cell reads as `fill`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SparseArray<T> {
    extent: Extent,
    row_len: usize,
    inflated: Option<InflatedRows<T>>,
    deflated: Option<Box<[T]>>,
    fill: T,
}

impl<T: Copy + PartialEq> SparseArray<T> {
    /// A sparse array where every cell reads as `fill`.
    pub(crate) fn filled(extent: Extent, row_len: usize, fill: T) -> Self {
        Self {
            extent,
            row_len,
            inflated: None,
            deflated: None,
            fill,
        }
    }

    /// Assembles a sparse array from tables whose lengths are already known to
    /// match the extent.
    pub(crate) fn from_tables(
        extent: Extent,
        row_len: usize,
        inflated: Option<InflatedRows<T>>,
        deflated: Option<Box<[T]>>,
        fill: T,
    ) -> Self {
        debug_assert!(inflated.as_ref().is_none_or(|rows| rows.len() == extent.size_y));
        debug_assert!(deflated.as_ref().is_none_or(|d| d.len() == extent.size_y));
        Self {
            extent,
            row_len,
            inflated,
            deflated,
            fill,
        }
    }

    fn with_tables(
        extent: Extent,
        row_len: usize,
        inflated: Option<Vec<Option<Vec<T>>>>,
        deflated: Option<Vec<T>>,
        fill: T,
    ) -> Result<Self, VoxelArrayError> {
        let inflated = match inflated {
            Some(rows) => {
                check_len(extent.size_y, rows.len())?;
                let mut table = Vec::with_capacity(rows.len());
                for row in rows {
                    if let Some(row) = &row {
                        check_len(row_len, row.len())?;
                    }
                    table.push(row.map(Vec::into_boxed_slice));
                }
                Some(table.into_boxed_slice())
            }
            None => None,
        };
        if let Some(values) = &deflated {
            check_len(extent.size_y, values.len())?;
        }
        Ok(Self::from_tables(
            extent,
            row_len,
            inflated,
            deflated.map(Vec::into_boxed_slice),
            fill,
        ))
    }

    /// Dimensions of the array.
    pub fn extent(&self) -> Extent {
        self.extent
    }

    /// Buffer elements per row.
    pub fn row_len(&self) -> usize {
        self.row_len
    }

    /// Full rows, if any layer is stored inflated.
    pub fn inflated(&self) -> Option<&[Option<Box<[T]>>]> {
        self.inflated.as_deref()
    }

    /// Per-layer values, if the array is not a pure fill.
    pub fn deflated(&self) -> Option<&[T]> {
        self.deflated.as_deref()
    }

    /// Whole-array fill value.
    pub fn fill(&self) -> T {
        self.fill
    }

    /// Number of layers stored as full rows.
    pub fn inflated_row_count(&self) -> usize {
        self.inflated
            .as_ref()
            .map_or(0, |rows| rows.iter().filter(|row| row.is_some()).count())
    }

    /// Value shared by every cell of layer `y`, ignoring any inflated row.
    fn layer_value(&self, y: usize) -> T {
        self.deflated.as_ref().map_or(self.fill, |values| values[y])
    }

    fn inflated_row(&self, y: usize) -> Option<&[T]> {
        self.inflated.as_ref().and_then(|rows| rows[y].as_deref())
    }

    fn element(&self, y: usize, i: usize) -> T {
        match self.inflated_row(y) {
            Some(row) => row[i],
            None => self.layer_value(y),
        }
    }

    /// Writes one element, inflating layer `y` if it was packed to a
    /// different value.
    fn set_element(&mut self, y: usize, i: usize, value: T) {
        if let Some(row) = self
            .inflated
            .as_mut()
            .and_then(|rows| rows[y].as_deref_mut())
        {
            row[i] = value;
            return;
        }

        let current = self.layer_value(y);
        if current == value {
            return;
        }

        let size_y = self.extent.size_y;
        let fill = self.fill;
        self.deflated
            .get_or_insert_with(|| vec![fill; size_y].into_boxed_slice());
        let rows = self
            .inflated
            .get_or_insert_with(|| vec![None; size_y].into_boxed_slice());
        let mut row = vec![current; self.row_len].into_boxed_slice();
        row[i] = value;
        rows[y] = Some(row);
    }

    fn estimated_memory_bytes(&self) -> usize {
        let slot = size_of::<Option<Box<[T]>>>();
        let inflated = self.inflated.as_ref().map_or(0, |rows| {
            rows.len() * slot
                + rows
                    .iter()
                    .flatten()
                    .map(|row| row.len() * size_of::<T>())
                    .sum::<usize>()
        });
        let deflated = self
            .deflated
            .as_ref()
            .map_or(0, |values| values.len() * size_of::<T>());
        size_of::<Self>() + inflated + deflated
    }
}

// ---------------------------------------------------------------------------
// VoxelArray
// ---------------------------------------------------------------------------

/// One chunk's cell data, tagged by bit depth and shape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VoxelArray {
    /// Nibble-packed dense buffer.
    Dense4(DenseArray<u8>),
    /// One byte per cell.
    Dense8(DenseArray<u8>),
    /// Two bytes per cell.
    Dense16(DenseArray<u16>),
    /// Sparse layers over nibble-packed rows.
    Sparse4(SparseArray<u8>),
    /// Sparse layers of bytes.
    Sparse8(SparseArray<u8>),
    /// Sparse layers of 16-bit values.
    Sparse16(SparseArray<u16>),
}

impl VoxelArray {
    /// Creates a dense array with every cell set to zero.
    pub fn new_dense(depth: BitDepth, extent: Extent) -> Result<Self, VoxelArrayError> {
        let row_len = row_len_for(depth, extent)?;
        let len = extent.size_y * row_len;
        Ok(match depth {
            BitDepth::Four => Self::Dense4(DenseArray::new(extent, row_len, vec![0; len].into())?),
            BitDepth::Eight => {
                Self::Dense8(DenseArray::new(extent, row_len, vec![0; len].into())?)
            }
            BitDepth::Sixteen => {
                Self::Dense16(DenseArray::new(extent, row_len, vec![0; len].into())?)
            }
        })
    }

    /// Creates a dense array whose cell `(x, y, z)` holds `f(x, y, z)`.
    ///
    /// Values wider than the bit depth are truncated to it.
    pub fn from_fn(
        depth: BitDepth,
        extent: Extent,
        mut f: impl FnMut(usize, usize, usize) -> u16,
    ) -> Result<Self, VoxelArrayError> {
        let mut array = Self::new_dense(depth, extent)?;
        for y in 0..extent.size_y {
            for z in 0..extent.size_z {
                for x in 0..extent.size_x {
                    array.set(x, y, z, f(x, y, z));
                }
            }
        }
        Ok(array)
    }

    /// Wraps a nibble-packed buffer of `extent.volume() / 2` bytes.
    pub fn dense4(extent: Extent, data: Vec<u8>) -> Result<Self, VoxelArrayError> {
        let row_len = row_len_for(BitDepth::Four, extent)?;
        Ok(Self::Dense4(DenseArray::new(extent, row_len, data.into())?))
    }

    /// Wraps a buffer of `extent.volume()` bytes.
    pub fn dense8(extent: Extent, data: Vec<u8>) -> Result<Self, VoxelArrayError> {
        let row_len = row_len_for(BitDepth::Eight, extent)?;
        Ok(Self::Dense8(DenseArray::new(extent, row_len, data.into())?))
    }

    /// Wraps a buffer of `extent.volume()` 16-bit values.
    pub fn dense16(extent: Extent, data: Vec<u16>) -> Result<Self, VoxelArrayError> {
        let row_len = row_len_for(BitDepth::Sixteen, extent)?;
        Ok(Self::Dense16(DenseArray::new(extent, row_len, data.into())?))
    }

    /// Builds a 16-bit sparse array from explicit tables.
    ///
    /// `inflated` must hold `size_y` slots of `row_size` values each, and
    /// `deflated` must hold `size_y` values.
    pub fn sparse16(
        extent: Extent,
        inflated: Option<Vec<Option<Vec<u16>>>>,
        deflated: Option<Vec<u16>>,
        fill: u16,
    ) -> Result<Self, VoxelArrayError> {
        let row_len = row_len_for(BitDepth::Sixteen, extent)?;
        SparseArray::with_tables(extent, row_len, inflated, deflated, fill).map(Self::Sparse16)
    }

    /// Builds an 8-bit sparse array from explicit tables.
    pub fn sparse8(
        extent: Extent,
        inflated: Option<Vec<Option<Vec<u8>>>>,
        deflated: Option<Vec<u8>>,
        fill: u8,
    ) -> Result<Self, VoxelArrayError> {
        let row_len = row_len_for(BitDepth::Eight, extent)?;
        SparseArray::with_tables(extent, row_len, inflated, deflated, fill).map(Self::Sparse8)
    }

    /// Builds a 4-bit sparse array from explicit tables of nibble-packed bytes.
    pub fn sparse4(
        extent: Extent,
        inflated: Option<Vec<Option<Vec<u8>>>>,
        deflated: Option<Vec<u8>>,
        fill: u8,
    ) -> Result<Self, VoxelArrayError> {
        let row_len = row_len_for(BitDepth::Four, extent)?;
        SparseArray::with_tables(extent, row_len, inflated, deflated, fill).map(Self::Sparse4)
    }

    /// Bits stored per cell.
    pub fn bit_depth(&self) -> BitDepth {
        match self {
            Self::Dense4(_) | Self::Sparse4(_) => BitDepth::Four,
            Self::Dense8(_) | Self::Sparse8(_) => BitDepth::Eight,
            Self::Dense16(_) | Self::Sparse16(_) => BitDepth::Sixteen,
        }
    }

    /// Dimensions of the array.
    pub fn extent(&self) -> Extent {
        match self {
            Self::Dense4(a) | Self::Dense8(a) => a.extent(),
            Self::Dense16(a) => a.extent(),
            Self::Sparse4(a) | Self::Sparse8(a) => a.extent(),
            Self::Sparse16(a) => a.extent(),
        }
    }

    /// Returns `true` for the sparse shapes.
    pub fn is_sparse(&self) -> bool {
        matches!(
            self,
            Self::Sparse4(_) | Self::Sparse8(_) | Self::Sparse16(_)
        )
    }

    /// Number of layers stored as full rows, or `None` for dense arrays.
    pub fn inflated_row_count(&self) -> Option<usize> {
        match self {
            Self::Dense4(_) | Self::Dense8(_) | Self::Dense16(_) => None,
            Self::Sparse4(a) | Self::Sparse8(a) => Some(a.inflated_row_count()),
            Self::Sparse16(a) => Some(a.inflated_row_count()),
        }
    }

    /// Returns the value at `(x, y, z)`.
    ///
    /// Each coordinate must lie inside [`extent`](Self::extent).
    pub fn get(&self, x: usize, y: usize, z: usize) -> u16 {
        debug_assert!(self.extent().contains(x, y, z), "({x}, {y}, {z}) out of bounds");
        let i = self.extent().row_index(x, z);
        match self {
            Self::Dense4(a) => u16::from(nibble::get(a.row(y), i)),
            Self::Dense8(a) => u16::from(a.element(y, i)),
            Self::Dense16(a) => a.element(y, i),
            Self::Sparse4(a) => u16::from(nibble::unpack(a.element(y, i / 2), i)),
            Self::Sparse8(a) => u16::from(a.element(y, i)),
            Self::Sparse16(a) => a.element(y, i),
        }
    }

    /// Sets the value at `(x, y, z)`, keeping only the low bits that fit the
    /// bit depth.
    ///
    /// Writing into a packed layer of a sparse array inflates that layer; the
    /// array should be deflated again once editing settles.
    pub fn set(&mut self, x: usize, y: usize, z: usize, value: u16) {
        debug_assert!(self.extent().contains(x, y, z), "({x}, {y}, {z}) out of bounds");
        let value = value & self.bit_depth().max_value();
        let i = self.extent().row_index(x, z);
        match self {
            Self::Dense4(a) => nibble::set(a.row_mut(y), i, value as u8),
            Self::Dense8(a) => *a.element_mut(y, i) = value as u8,
            Self::Dense16(a) => *a.element_mut(y, i) = value,
            Self::Sparse4(a) => {
                let byte = nibble::repack(a.element(y, i / 2), i, value as u8);
                a.set_element(y, i / 2, byte);
            }
            Self::Sparse8(a) => a.set_element(y, i, value as u8),
            Self::Sparse16(a) => a.set_element(y, i, value),
        }
    }

    /// Approximate heap and inline bytes used by this array.
    pub fn estimated_memory_bytes(&self) -> usize {
        match self {
            Self::Dense4(a) | Self::Dense8(a) => a.estimated_memory_bytes(),
            Self::Dense16(a) => a.estimated_memory_bytes(),
            Self::Sparse4(a) | Self::Sparse8(a) => a.estimated_memory_bytes(),
            Self::Sparse16(a) => a.estimated_memory_bytes(),
        }
    }

    /// Returns `true` if both arrays have the same depth and extent and every
    /// cell reads the same, regardless of shape.
    pub fn value_eq(&self, other: &Self) -> bool {
        if self.bit_depth() != other.bit_depth() || self.extent() != other.extent() {
            return false;
        }
        let extent = self.extent();
        (0..extent.size_y).all(|y| {
            (0..extent.size_z)
                .all(|z| (0..extent.size_x).all(|x| self.get(x, y, z) == other.get(x, y, z)))
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
