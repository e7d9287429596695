use crate::error::{Error, Result};
use std::convert::TryFrom;
use std::fmt;

/// Byte width of the integers a session searches for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Width(usize);

impl Width {
    pub const BYTE: Width = Width(1);
    pub const WORD: Width = Width(2);
    pub const DWORD: Width = Width(4);
    pub const QWORD: Width = Width(8);

    pub fn bytes(self) -> usize {
        self.0
    }

    /// Largest multiple of the width that fits in `len`
    pub fn align_down(self, len: usize) -> usize {
        len - len % self.0
    }
}

impl Default for Width {
    fn default() -> Self {
        Width::DWORD
    }
}

impl TryFrom<usize> for Width {
    type Error = Error;

    fn try_from(bytes: usize) -> Result<Self> {
        match bytes {
            1 | 2 | 4 | 8 => Ok(Width(bytes)),
            _ => Err(Error::InvalidWidth(bytes)),
        }
    }
}

impl fmt::Display for Width {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Little endian needle of a fixed width
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    bytes: Vec<u8>,
}

impl Pattern {
    /// Splits `value` into `width` bytes, least significant first.
    /// Bits above `width * 8` are dropped.
    pub fn encode(value: u64, width: Width) -> Pattern {
        let bytes = (0..width.bytes())
            .map(|i| ((value >> (8 * i)) & 0xff) as u8)
            .collect();
        Pattern { bytes }
    }

    /// Inverse of `encode`
    pub fn decode(bytes: &[u8]) -> u64 {
        bytes
            .iter()
            .take(8)
            .enumerate()
            .fold(0, |value, (i, &byte)| value | (u64::from(byte) << (8 * i)))
    }

    pub fn value(&self) -> u64 {
        Pattern::decode(&self.bytes)
    }

    pub fn width(&self) -> Width {
        Width(self.bytes.len())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Checks every stride aligned window of `haystack` and returns the offsets that match.
    /// Occurrences starting between two strides are not reported.
    pub fn aligned_matches<'a>(&'a self, haystack: &'a [u8]) -> impl Iterator<Item = usize> + 'a {
        let width = self.bytes.len();
        haystack
            .chunks_exact(width)
            .enumerate()
            .filter(move |(_, window)| *window == self.bytes.as_slice())
            .map(move |(index, _)| index * width)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.bytes.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// Parses user input: decimal, negative decimal (two's complement) or 0x prefixed hex
pub fn parse_value(input: &str) -> Result<u64> {
    let trimmed = input.trim();
    let parsed = if let Some(hex) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        u64::from_str_radix(hex, 16).ok()
    } else if trimmed.starts_with('-') {
        trimmed.parse::<i64>().ok().map(|v| v as u64)
    } else {
        trimmed.parse::<u64>().ok()
    };
    parsed.ok_or_else(|| Error::InvalidValue(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_little_endian() {
        let pattern = Pattern::encode(0x1234_5678, Width::DWORD);
        assert_eq!(pattern.as_bytes(), &[0x78, 0x56, 0x34, 0x12]);
        assert_eq!(pattern.to_string(), "78 56 34 12");
    }

    #[test]
    fn test_decode_inverts_encode() {
        for &width in &[Width::BYTE, Width::WORD, Width::DWORD, Width::QWORD] {
            for &value in &[0u64, 1, 255, 256, 65_535, 12_039_487, u32::MAX as u64, u64::MAX] {
                let modulus_mask = if width.bytes() == 8 {
                    u64::MAX
                } else {
                    (1u64 << (8 * width.bytes())) - 1
                };
                let pattern = Pattern::encode(value, width);
                assert_eq!(pattern.value(), value & modulus_mask, "width {}", width);
            }
        }
    }

    #[test]
    fn test_truncates_wide_values() {
        let pattern = Pattern::encode(0x1_0000_0001, Width::DWORD);
        assert_eq!(pattern.as_bytes(), &[1, 0, 0, 0]);
        assert_eq!(pattern.value(), 1);
    }

    #[test]
    fn test_width_validation() {
        assert_eq!(Width::try_from(2usize).unwrap(), Width::WORD);
        assert!(matches!(Width::try_from(3usize), Err(Error::InvalidWidth(3))));
        assert!(matches!(Width::try_from(0usize), Err(Error::InvalidWidth(0))));
        assert_eq!(Width::DWORD.align_down(4097), 4096);
    }

    #[test]
    fn test_aligned_matches() {
        let pattern = Pattern::encode(0xdead_beef, Width::DWORD);
        let mut haystack = vec![0u8; 16];
        haystack[4..8].copy_from_slice(pattern.as_bytes());
        haystack[12..16].copy_from_slice(pattern.as_bytes());
        assert_eq!(pattern.aligned_matches(&haystack).collect::<Vec<_>>(), vec![4, 12]);

        let mut unaligned = vec![0u8; 8];
        unaligned[2..6].copy_from_slice(pattern.as_bytes());
        assert_eq!(pattern.aligned_matches(&unaligned).count(), 0);
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value(" 42\n").unwrap(), 42);
        assert_eq!(parse_value("0xff").unwrap(), 255);
        assert_eq!(parse_value("-1").unwrap(), u64::MAX);
        assert_eq!(Pattern::encode(parse_value("-1").unwrap(), Width::DWORD).value(), 0xffff_ffff);
        assert!(matches!(parse_value("abc"), Err(Error::InvalidValue(_))));
        assert!(parse_value("").is_err());
    }
}
