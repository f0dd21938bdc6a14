//! Single hex digit conversions.

const DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Decode one ASCII hex digit (either case) into its 4-bit value.
#[inline]
pub fn nibble(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'A'..=b'F' => Some(c - b'A' + 10),
        b'a'..=b'f' => Some(c - b'a' + 10),
        _ => None,
    }
}

/// Append `byte` as two upper-case hex digits.
#[inline]
pub fn push_hex_byte(out: &mut String, byte: u8) {
    out.push(DIGITS[usize::from(byte >> 4)].into());
    out.push(DIGITS[usize::from(byte & 0x0F)].into());
}
