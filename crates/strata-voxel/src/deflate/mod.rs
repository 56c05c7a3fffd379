//! Runtime compaction of voxel arrays.
//!
//! A [`Deflator`] turns an array into a value-equivalent, possibly smaller one.
//! Deflators never touch their input: arrays are shared behind [`Arc`], and a
//! deflator either hands back a new array or the same `Arc` it was given.
//!
//! Concrete algorithms implement [`TypedDeflator`], one operation per
//! bit-depth and shape, and get their [`Deflator`] impl from [`visit`], which
//! performs the single dispatch on the array variant.

mod standard;
mod thresholds;

use std::sync::Arc;

pub use standard::StandardDeflator;
pub use thresholds::{
    DEFLATE_MINIMUM_4BIT, DEFLATE_MINIMUM_8BIT, DEFLATE_MINIMUM_16BIT, DeflateThresholds,
};

use crate::array::VoxelArray;
use crate::extent::Extent;

/// Errors reported by [`Deflator::try_deflate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DeflateError {
    /// No array was supplied.
    #[error("cannot deflate a missing array")]
    NullArgument,
}

/// Converts an array into a value-equivalent, possibly smaller representation.
pub trait Deflator: Send + Sync {
    /// Returns a value-equivalent array, which may be `array` itself.
    fn deflate(&self, array: &Arc<VoxelArray>) -> Arc<VoxelArray>;

    /// Like [`deflate`](Self::deflate), but for a slot that may be empty.
    ///
    /// # Errors
    ///
    /// Returns [`DeflateError::NullArgument`] if `array` is `None`; nothing is
    /// dispatched in that case.
    fn try_deflate(
        &self,
        array: Option<&Arc<VoxelArray>>,
    ) -> Result<Arc<VoxelArray>, DeflateError> {
        let array = array.ok_or(DeflateError::NullArgument)?;
        Ok(self.deflate(array))
    }
}

/// Pass-through deflator used when compaction is disabled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NullDeflator;

impl Deflator for NullDeflator {
    fn deflate(&self, array: &Arc<VoxelArray>) -> Arc<VoxelArray> {
        Arc::clone(array)
    }
}

/// One operation per bit-depth and shape.
///
/// Each returns `Some(replacement)` or `None` when it has nothing better than
/// the input. Row buffers hold `row_len` elements; for 4-bit arrays those are
/// nibble-packed bytes.
pub trait TypedDeflator {
    /// Compacts a dense 4-bit array.
    fn deflate_dense_4bit(&self, data: &[u8], row_len: usize, extent: Extent)
    -> Option<VoxelArray>;

    /// Compacts a dense 8-bit array.
    fn deflate_dense_8bit(&self, data: &[u8], row_len: usize, extent: Extent)
    -> Option<VoxelArray>;

    /// Compacts a dense 16-bit array.
    fn deflate_dense_16bit(
        &self,
        data: &[u16],
        row_len: usize,
        extent: Extent,
    ) -> Option<VoxelArray>;

    /// Repacks a sparse 4-bit array.
    fn deflate_sparse_4bit(
        &self,
        inflated: Option<&[Option<Box<[u8]>>]>,
        deflated: Option<&[u8]>,
        fill: u8,
        row_len: usize,
        extent: Extent,
    ) -> Option<VoxelArray>;

    /// Repacks a sparse 8-bit array.
    fn deflate_sparse_8bit(
        &self,
        inflated: Option<&[Option<Box<[u8]>>]>,
        deflated: Option<&[u8]>,
        fill: u8,
        row_len: usize,
        extent: Extent,
    ) -> Option<VoxelArray>;

    /// Repacks a sparse 16-bit array.
    fn deflate_sparse_16bit(
        &self,
        inflated: Option<&[Option<Box<[u16]>>]>,
        deflated: Option<&[u16]>,
        fill: u16,
        row_len: usize,
        extent: Extent,
    ) -> Option<VoxelArray>;
}

/// Routes `array` to the typed operation matching its variant and returns the
/// replacement, or `array` itself when the operation reports no change.
pub fn visit<D: TypedDeflator + ?Sized>(deflator: &D, array: &Arc<VoxelArray>) -> Arc<VoxelArray> {
    let replacement = match array.as_ref() {
        VoxelArray::Dense4(a) => deflator.deflate_dense_4bit(a.data(), a.row_len(), a.extent()),
        VoxelArray::Dense8(a) => deflator.deflate_dense_8bit(a.data(), a.row_len(), a.extent()),
        VoxelArray::Dense16(a) => deflator.deflate_dense_16bit(a.data(), a.row_len(), a.extent()),
        VoxelArray::Sparse4(a) => deflator.deflate_sparse_4bit(
            a.inflated(),
            a.deflated(),
            a.fill(),
            a.row_len(),
            a.extent(),
        ),
        VoxelArray::Sparse8(a) => deflator.deflate_sparse_8bit(
            a.inflated(),
            a.deflated(),
            a.fill(),
            a.row_len(),
            a.extent(),
        ),
        VoxelArray::Sparse16(a) => deflator.deflate_sparse_16bit(
            a.inflated(),
            a.deflated(),
            a.fill(),
            a.row_len(),
            a.extent(),
        ),
    };
    match replacement {
        Some(new_array) => Arc::new(new_array),
        None => Arc::clone(array),
    }
}

/// Picks the deflator for a configuration: [`StandardDeflator`] with the given
/// thresholds when compaction is enabled, [`NullDeflator`] otherwise.
pub fn deflator_for(enabled: bool, thresholds: DeflateThresholds) -> Box<dyn Deflator> {
    if enabled {
        Box::new(StandardDeflator::with_thresholds(thresholds))
    } else {
        Box::new(NullDeflator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extent::BitDepth;

    /// Records which typed operation ran and never replaces anything.
    #[derive(Default)]
    struct Recorder {
        calls: std::sync::Mutex<Vec<&'static str>>,
    }

    impl Recorder {
        fn record(&self, name: &'static str) -> Option<VoxelArray> {
            self.calls.lock().unwrap().push(name);
            None
        }
    }

    impl TypedDeflator for Recorder {
        fn deflate_dense_4bit(&self, _: &[u8], _: usize, _: Extent) -> Option<VoxelArray> {
            self.record("dense4")
        }
        fn deflate_dense_8bit(&self, _: &[u8], _: usize, _: Extent) -> Option<VoxelArray> {
            self.record("dense8")
        }
        fn deflate_dense_16bit(&self, _: &[u16], _: usize, _: Extent) -> Option<VoxelArray> {
            self.record("dense16")
        }
        fn deflate_sparse_4bit(
            &self,
            _: Option<&[Option<Box<[u8]>>]>,
            _: Option<&[u8]>,
            _: u8,
            _: usize,
            _: Extent,
        ) -> Option<VoxelArray> {
            self.record("sparse4")
        }
        fn deflate_sparse_8bit(
            &self,
            _: Option<&[Option<Box<[u8]>>]>,
            _: Option<&[u8]>,
            _: u8,
            _: usize,
            _: Extent,
        ) -> Option<VoxelArray> {
            self.record("sparse8")
        }
        fn deflate_sparse_16bit(
            &self,
            _: Option<&[Option<Box<[u16]>>]>,
            _: Option<&[u16]>,
            _: u16,
            _: usize,
            _: Extent,
        ) -> Option<VoxelArray> {
            self.record("sparse16")
        }
    }

    fn extent() -> Extent {
        Extent::new(2, 2, 2)
    }

    #[test]
    fn test_visit_dispatches_by_depth_and_shape() {
        let recorder = Recorder::default();
        let arrays = [
            VoxelArray::new_dense(BitDepth::Four, extent()).unwrap(),
            VoxelArray::new_dense(BitDepth::Eight, extent()).unwrap(),
            VoxelArray::new_dense(BitDepth::Sixteen, extent()).unwrap(),
            VoxelArray::sparse4(extent(), None, None, 0).unwrap(),
            VoxelArray::sparse8(extent(), None, None, 0).unwrap(),
            VoxelArray::sparse16(extent(), None, None, 0).unwrap(),
        ];
        for array in arrays {
            let array = Arc::new(array);
            let result = visit(&recorder, &array);
            assert!(Arc::ptr_eq(&array, &result), "no change returns the input");
        }
        assert_eq!(
            *recorder.calls.lock().unwrap(),
            ["dense4", "dense8", "dense16", "sparse4", "sparse8", "sparse16"]
        );
    }

    #[test]
    fn test_null_deflator_returns_same_arc() {
        let array = Arc::new(VoxelArray::new_dense(BitDepth::Sixteen, extent()).unwrap());
        let result = NullDeflator.deflate(&array);
        assert!(Arc::ptr_eq(&array, &result));
    }

    #[test]
    fn test_missing_array_rejected_by_every_deflator() {
        let deflators: [&dyn Deflator; 2] = [&NullDeflator, &StandardDeflator::new()];
        for deflator in deflators {
            assert_eq!(deflator.try_deflate(None), Err(DeflateError::NullArgument));
        }
    }

    #[test]
    fn test_missing_array_never_dispatches() {
        struct Visiting(Recorder);
        impl Deflator for Visiting {
            fn deflate(&self, array: &Arc<VoxelArray>) -> Arc<VoxelArray> {
                visit(&self.0, array)
            }
        }
        let deflator = Visiting(Recorder::default());
        assert!(deflator.try_deflate(None).is_err());
        assert!(deflator.0.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_deflator_for_respects_enabled_flag() {
        let uniform = Arc::new(VoxelArray::dense16(extent(), vec![3; 8]).unwrap());

        let disabled = deflator_for(false, DeflateThresholds::default());
        assert!(Arc::ptr_eq(&uniform, &disabled.deflate(&uniform)));

        let enabled = deflator_for(true, DeflateThresholds::default());
        let result = enabled.deflate(&uniform);
        assert!(result.is_sparse());
        assert!(result.value_eq(&uniform));
    }
}
