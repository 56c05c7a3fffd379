//! Packing of 4-bit cells, two per byte.
//!
//! Even cell indices live in the low nibble, odd indices in the high nibble.
//! A row whose cells all hold `v` packs every byte to [`splat(v)`](splat), so
//! whole-byte equality across a packed row implies every nibble pair is equal.
//! The deflator relies on this when it compares 4-bit rows byte by byte.

/// Bytes needed to hold `cells` 4-bit values.
pub const fn bytes_for(cells: usize) -> usize {
    cells.div_ceil(2)
}

/// Returns the byte with both nibbles set to `value`.
pub const fn splat(value: u8) -> u8 {
    (value & 0x0F) * 0x11
}

/// Extracts the nibble for `index` from a packed byte.
pub const fn unpack(byte: u8, index: usize) -> u8 {
    if index % 2 == 0 { byte & 0x0F } else { byte >> 4 }
}

/// Returns `byte` with the nibble for `index` replaced by `value`.
pub const fn repack(byte: u8, index: usize, value: u8) -> u8 {
    let value = value & 0x0F;
    if index % 2 == 0 {
        (byte & 0xF0) | value
    } else {
        (byte & 0x0F) | (value << 4)
    }
}

/// Reads the 4-bit value at `index` from a packed buffer.
pub fn get(bytes: &[u8], index: usize) -> u8 {
    unpack(bytes[index / 2], index)
}

/// Writes the low four bits of `value` at `index` into a packed buffer.
pub fn set(bytes: &mut [u8], index: usize, value: u8) {
    let byte = &mut bytes[index / 2];
    *byte = repack(*byte, index, value);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nibble_roundtrip() {
        let mut bytes = vec![0u8; bytes_for(32)];
        for i in 0..32 {
            set(&mut bytes, i, (i % 16) as u8);
        }
        for i in 0..32 {
            assert_eq!(get(&bytes, i), (i % 16) as u8);
        }
    }

    #[test]
    fn test_low_nibble_is_even_index() {
        let mut bytes = vec![0u8; 1];
        set(&mut bytes, 0, 0x3);
        set(&mut bytes, 1, 0xA);
        assert_eq!(bytes[0], 0xA3);
    }

    #[test]
    fn test_uniform_row_packs_to_equal_bytes() {
        for v in 0..16u8 {
            let mut bytes = vec![0u8; bytes_for(16)];
            for i in 0..16 {
                set(&mut bytes, i, v);
            }
            assert!(bytes.iter().all(|&b| b == splat(v)), "value {v}");
        }
    }

    #[test]
    fn test_equal_bytes_imply_repeating_nibble_pair() {
        // Rows that are not uniform cell-wise can still pack to equal bytes;
        // reading back through the nibble accessors stays value-correct.
        let bytes = vec![0x21u8; 4];
        for i in 0..8 {
            assert_eq!(get(&bytes, i), if i % 2 == 0 { 1 } else { 2 });
        }
    }

    #[test]
    fn test_bytes_for_odd_count() {
        assert_eq!(bytes_for(0), 0);
        assert_eq!(bytes_for(1), 1);
        assert_eq!(bytes_for(256), 128);
    }
}
