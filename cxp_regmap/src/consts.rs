//! Register map constants.
//!
//! Single source of truth for word geometry and natural field widths.

/// Width of one register word in bytes.
pub const WORD_BYTES: usize = 4;

/// Width of one register word in bits.
pub const WORD_BITS: u32 = 32;

/// Natural width of a `uint_be` field when `bit_size` is omitted.
pub const DEFAULT_UINT_BITS: u32 = WORD_BITS;

/// Natural width of a `float_be` field (IEEE-754 binary32).
pub const FLOAT_BITS: u32 = 32;

/// Natural width of a `string` field when `bit_size` is omitted (one word).
pub const DEFAULT_STRING_BITS: u32 = WORD_BITS;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_geometry_is_consistent() {
        assert_eq!(WORD_BITS as usize, WORD_BYTES * 8);
        assert_eq!(FLOAT_BITS, WORD_BITS);
    }
}
