use std::fmt::{Display, Formatter};

/// Running checksum over the byte count, address and data bytes of one
/// record. Only the low byte of the sum matters, so it is kept as a
/// wrapping `u8`.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Checksum {
    sum: u8,
}

impl Checksum {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checksum of a complete byte sequence.
    pub fn of<'a, I>(bytes: I) -> Self
        where I: IntoIterator<Item=&'a u8>
    {
        let mut checksum = Self::new();
        for byte in bytes {
            checksum.add(*byte);
        }
        checksum
    }

    #[inline]
    pub fn add(&mut self, byte: u8) {
        self.sum = self.sum.wrapping_add(byte);
    }

    /// The checksum byte a well-formed record carries: the one's complement
    /// of the low byte of the sum.
    #[inline]
    pub fn expected(&self) -> u8 {
        !self.sum
    }

    /// Compare against a transmitted checksum byte.
    pub fn verify(&self, found: u8) -> Result<(), ChecksumMismatch> {
        let expected = self.expected();
        if expected == found {
            Ok(())
        } else {
            Err(ChecksumMismatch {
                line: 0,
                expected,
                found,
            })
        }
    }
}

/// A record whose transmitted checksum disagrees with its contents. This is
/// advisory only; the record's data is still applied.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ChecksumMismatch {
    pub line: usize,
    pub expected: u8,
    pub found: u8,
}

impl Display for ChecksumMismatch {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "checksum mismatch on line {}: expected {:02X}, found {:02X}",
               self.line, self.expected, self.found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected() {
        // S1 06 0004 AA BB CC: 0x06 + 0x04 + 0xAA + 0xBB + 0xCC = 0x23B.
        let checksum = Checksum::of(&[0x06, 0x00, 0x04, 0xAA, 0xBB, 0xCC]);
        assert_eq!(checksum.expected(), 0xC4);
        assert!(checksum.verify(0xC4).is_ok());
    }

    #[test]
    fn test_empty() {
        assert_eq!(Checksum::new().expected(), 0xFF);
    }

    /// Any single-bit difference must be detected.
    #[test]
    fn test_every_bit_flip_detected() {
        let checksum = Checksum::of(&[0x13, 0x7A, 0xF0, 0x0A, 0x0A, 0x0D]);
        let good = checksum.expected();
        for bit in 0..8 {
            let bad = good ^ (1 << bit);
            let mismatch = checksum.verify(bad).unwrap_err();
            assert_eq!(mismatch.expected, good);
            assert_eq!(mismatch.found, bad);
        }
    }

    #[test]
    fn test_display() {
        let mismatch = ChecksumMismatch { line: 3, expected: 0xC4, found: 0x00 };
        assert_eq!(mismatch.to_string(),
                   "checksum mismatch on line 3: expected C4, found 00");
    }
}
