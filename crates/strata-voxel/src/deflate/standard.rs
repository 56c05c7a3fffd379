//! Row-uniformity deflation.
//!
//! Dense arrays are scanned layer by layer. A layer whose elements are all
//! equal is recorded as a single value; any other layer is copied out as a
//! full row. If every layer collapses to the same value the result is a pure
//! fill. Otherwise the sparse form is only kept once enough layers pack to
//! pay for the per-layer bookkeeping.

use std::sync::Arc;

use tracing::trace;

use super::thresholds::DeflateThresholds;
use super::{Deflator, TypedDeflator, visit};
use crate::array::{InflatedRows, SparseArray, VoxelArray};
use crate::extent::{BitDepth, Extent};

/// The standard deflator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StandardDeflator {
    thresholds: DeflateThresholds,
}

impl StandardDeflator {
    /// Creates a deflator with the tuned thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a deflator with custom thresholds.
    pub fn with_thresholds(thresholds: DeflateThresholds) -> Self {
        Self { thresholds }
    }

    /// The thresholds in use.
    pub fn thresholds(&self) -> DeflateThresholds {
        self.thresholds
    }
}

impl Deflator for StandardDeflator {
    fn deflate(&self, array: &Arc<VoxelArray>) -> Arc<VoxelArray> {
        visit(self, array)
    }
}

impl TypedDeflator for StandardDeflator {
    fn deflate_dense_4bit(
        &self,
        data: &[u8],
        row_len: usize,
        extent: Extent,
    ) -> Option<VoxelArray> {
        let minimum = self.thresholds.minimum(BitDepth::Four);
        deflate_dense(data, row_len, extent, minimum).map(VoxelArray::Sparse4)
    }

    fn deflate_dense_8bit(
        &self,
        data: &[u8],
        row_len: usize,
        extent: Extent,
    ) -> Option<VoxelArray> {
        let minimum = self.thresholds.minimum(BitDepth::Eight);
        deflate_dense(data, row_len, extent, minimum).map(VoxelArray::Sparse8)
    }

    fn deflate_dense_16bit(
        &self,
        data: &[u16],
        row_len: usize,
        extent: Extent,
    ) -> Option<VoxelArray> {
        let minimum = self.thresholds.minimum(BitDepth::Sixteen);
        deflate_dense(data, row_len, extent, minimum).map(VoxelArray::Sparse16)
    }

    // TODO: repack 4-bit sparse arrays the way the 8- and 16-bit ones are.
    fn deflate_sparse_4bit(
        &self,
        _inflated: Option<&[Option<Box<[u8]>>]>,
        _deflated: Option<&[u8]>,
        _fill: u8,
        _row_len: usize,
        _extent: Extent,
    ) -> Option<VoxelArray> {
        None
    }

    fn deflate_sparse_8bit(
        &self,
        inflated: Option<&[Option<Box<[u8]>>]>,
        deflated: Option<&[u8]>,
        fill: u8,
        row_len: usize,
        extent: Extent,
    ) -> Option<VoxelArray> {
        Some(VoxelArray::Sparse8(repack_sparse(
            inflated, deflated, fill, row_len, extent,
        )))
    }

    fn deflate_sparse_16bit(
        &self,
        inflated: Option<&[Option<Box<[u16]>>]>,
        deflated: Option<&[u16]>,
        fill: u16,
        row_len: usize,
        extent: Extent,
    ) -> Option<VoxelArray> {
        Some(VoxelArray::Sparse16(repack_sparse(
            inflated, deflated, fill, row_len, extent,
        )))
    }
}

/// Returns the value shared by every element of `row`, if there is one.
fn uniform_value<T: Copy + PartialEq>(row: &[T]) -> Option<T> {
    let (&first, rest) = row.split_first()?;
    rest.iter().all(|&v| v == first).then_some(first)
}

/// Drops the inflated table when none of its slots is used.
fn keep_if_used<T>(rows: InflatedRows<T>) -> Option<InflatedRows<T>> {
    rows.iter().any(Option::is_some).then_some(rows)
}

fn deflate_dense<T: Copy + Default + PartialEq>(
    data: &[T],
    row_len: usize,
    extent: Extent,
    minimum: usize,
) -> Option<SparseArray<T>> {
    let size_y = extent.size_y;
    let mut inflated: Vec<Option<Box<[T]>>> = vec![None; size_y];
    let mut deflated = vec![T::default(); size_y];
    let mut packed = 0;

    for (y, row) in data.chunks_exact(row_len).take(size_y).enumerate() {
        match uniform_value(row) {
            Some(value) => {
                deflated[y] = value;
                packed += 1;
            }
            None => inflated[y] = Some(row.into()),
        }
    }

    if packed == size_y
        && let Some(fill) = uniform_value(&deflated)
    {
        trace!(size_y, "every layer shares one value, collapsing to fill");
        return Some(SparseArray::filled(extent, row_len, fill));
    }

    if packed > minimum {
        trace!(packed, size_y, minimum, "dense array made sparse");
        return Some(SparseArray::from_tables(
            extent,
            row_len,
            keep_if_used(inflated.into_boxed_slice()),
            Some(deflated.into_boxed_slice()),
            T::default(),
        ));
    }

    trace!(packed, size_y, minimum, "too few uniform layers, keeping dense");
    None
}

fn repack_sparse<T: Copy + PartialEq>(
    inflated: Option<&[Option<Box<[T]>>]>,
    deflated: Option<&[T]>,
    fill: T,
    row_len: usize,
    extent: Extent,
) -> SparseArray<T> {
    let Some(rows) = inflated else {
        return SparseArray::from_tables(
            extent,
            row_len,
            None,
            deflated.map(Box::from),
            fill,
        );
    };

    let size_y = extent.size_y;
    let mut new_rows: Vec<Option<Box<[T]>>> = vec![None; size_y];
    let mut new_deflated = Vec::with_capacity(size_y);
    let mut repacked = 0;

    for (y, slot) in rows.iter().enumerate().take(size_y) {
        let layer = deflated.map_or(fill, |values| values[y]);
        match slot.as_deref() {
            Some(row) => match uniform_value(row) {
                Some(value) => {
                    new_deflated.push(value);
                    repacked += 1;
                }
                None => {
                    new_deflated.push(layer);
                    new_rows[y] = Some(row.into());
                }
            },
            None => new_deflated.push(layer),
        }
    }

    trace!(repacked, size_y, "sparse array repacked");
    SparseArray::from_tables(
        extent,
        row_len,
        keep_if_used(new_rows.into_boxed_slice()),
        Some(new_deflated.into_boxed_slice()),
        fill,
    )
}
