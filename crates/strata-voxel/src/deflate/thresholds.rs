//! Minimum packed-layer counts below which sparse storage is not worth it.

use std::mem::size_of;

use serde::{Deserialize, Serialize};

use crate::extent::{BitDepth, Extent};

/// Packed layers a dense 4-bit array must exceed before it is made sparse.
pub const DEFLATE_MINIMUM_4BIT: usize = 31;

/// Packed layers a dense 8-bit array must exceed before it is made sparse.
pub const DEFLATE_MINIMUM_8BIT: usize = 16;

/// Packed layers a dense 16-bit array must exceed before it is made sparse.
pub const DEFLATE_MINIMUM_16BIT: usize = 8;

/// Per-depth packed-layer minimums.
///
/// A dense array becomes sparse only when more than `minimum(depth)` of its
/// layers are uniform (or when every layer shares a single value).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeflateThresholds {
    /// Minimum for 4-bit arrays.
    pub four_bit: usize,
    /// Minimum for 8-bit arrays.
    pub eight_bit: usize,
    /// Minimum for 16-bit arrays.
    pub sixteen_bit: usize,
}

impl DeflateThresholds {
    /// Constants tuned for 16×256×16 chunks.
    pub const TUNED: Self = Self {
        four_bit: DEFLATE_MINIMUM_4BIT,
        eight_bit: DEFLATE_MINIMUM_8BIT,
        sixteen_bit: DEFLATE_MINIMUM_16BIT,
    };

    /// Derives the minimums from the chunk dimensions.
    ///
    /// Each sparse layer costs one row slot plus one packed value whether it
    /// is used or not. The minimum is the number of packed rows whose bytes
    /// cover that fixed cost: `ceil(size_y * (slot + value) / row_bytes)`.
    pub fn derived(extent: Extent) -> Self {
        let row_size = extent.row_size();
        Self {
            four_bit: derived_minimum::<u8>(extent.size_y, BitDepth::Four.row_len(row_size)),
            eight_bit: derived_minimum::<u8>(extent.size_y, BitDepth::Eight.row_len(row_size)),
            sixteen_bit: derived_minimum::<u16>(
                extent.size_y,
                BitDepth::Sixteen.row_len(row_size),
            ),
        }
    }

    /// Minimum for the given depth.
    pub fn minimum(&self, depth: BitDepth) -> usize {
        match depth {
            BitDepth::Four => self.four_bit,
            BitDepth::Eight => self.eight_bit,
            BitDepth::Sixteen => self.sixteen_bit,
        }
    }
}

impl Default for DeflateThresholds {
    fn default() -> Self {
        Self::TUNED
    }
}

fn derived_minimum<T>(size_y: usize, row_len: usize) -> usize {
    let overhead = size_y * (size_of::<Option<Box<[T]>>>() + size_of::<T>());
    let row_bytes = (row_len * size_of::<T>()).max(1);
    overhead.div_ceil(row_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_tuned() {
        let t = DeflateThresholds::default();
        assert_eq!(t.minimum(BitDepth::Four), 31);
        assert_eq!(t.minimum(BitDepth::Eight), 16);
        assert_eq!(t.minimum(BitDepth::Sixteen), 8);
    }

    #[test]
    fn test_derived_for_default_chunk() {
        // Row slots are fat pointers (16 bytes on 64-bit targets).
        if size_of::<Option<Box<[u8]>>>() != 16 {
            return;
        }
        let t = DeflateThresholds::derived(Extent::default());
        assert_eq!(t.sixteen_bit, 9); // 256 * 18 / 512
        assert_eq!(t.eight_bit, 17); // 256 * 17 / 256
        assert_eq!(t.four_bit, 34); // 256 * 17 / 128
    }

    #[test]
    fn test_derived_scales_with_height() {
        let short = DeflateThresholds::derived(Extent::new(16, 64, 16));
        let tall = DeflateThresholds::derived(Extent::new(16, 256, 16));
        assert!(short.sixteen_bit < tall.sixteen_bit);
        // Wider rows make each packed layer worth more.
        let wide = DeflateThresholds::derived(Extent::new(32, 256, 32));
        assert!(wide.eight_bit < tall.eight_bit);
    }
}
