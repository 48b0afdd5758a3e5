//! Hex text for raw register spans.

use thiserror::Error;

/// Error types for hex span parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HexError {
    #[error("no hex digits given")]
    Empty,

    #[error("odd number of hex digits ({0})")]
    OddLength(usize),

    #[error("invalid hex digit {0:?}")]
    InvalidDigit(char),
}

/// Parse a span such as `00 00 07 80`, `0x00000780` or `0x0000_0780`.
///
/// Whitespace separates groups, each group may carry a `0x` prefix and `_`
/// is ignored. Digits are read in memory order, two per byte.
pub fn parse_hex_bytes(text: &str) -> Result<Vec<u8>, HexError> {
    let mut digits = Vec::new();
    for group in text.split_whitespace() {
        let group = group
            .strip_prefix("0x")
            .or_else(|| group.strip_prefix("0X"))
            .unwrap_or(group);
        for c in group.chars().filter(|c| *c != '_') {
            let d = c.to_digit(16).ok_or(HexError::InvalidDigit(c))?;
            digits.push(d as u8);
        }
    }

    if digits.is_empty() {
        return Err(HexError::Empty);
    }
    if digits.len() % 2 != 0 {
        return Err(HexError::OddLength(digits.len()));
    }
    Ok(digits.chunks_exact(2).map(|p| p[0] << 4 | p[1]).collect())
}

/// Space-separated upper-case bytes.
pub fn format_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepted_forms() {
        let expected = vec![0x00, 0x00, 0x07, 0x80];
        assert_eq!(parse_hex_bytes("00 00 07 80").unwrap(), expected);
        assert_eq!(parse_hex_bytes("0x00000780").unwrap(), expected);
        assert_eq!(parse_hex_bytes("0X0000_0780").unwrap(), expected);
        assert_eq!(parse_hex_bytes(" 0x00 0x00 0x07 0x80 ").unwrap(), expected);
        assert_eq!(parse_hex_bytes("3f800000").unwrap(), vec![0x3F, 0x80, 0, 0]);
    }

    #[test]
    fn rejected_forms() {
        assert_eq!(parse_hex_bytes("   ").unwrap_err(), HexError::Empty);
        assert_eq!(parse_hex_bytes("0x780").unwrap_err(), HexError::OddLength(3));
        assert_eq!(
            parse_hex_bytes("00 0g").unwrap_err(),
            HexError::InvalidDigit('g')
        );
    }

    #[test]
    fn format() {
        assert_eq!(format_hex(&[0x00, 0x05, 0x01, 0xAB]), "00 05 01 AB");
        assert_eq!(format_hex(&[]), "");
    }
}
