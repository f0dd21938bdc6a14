use log::trace;
use srec2bin_utils::hexprint::pretty_print_hex_block_zero;
use std::fmt::{Display, Formatter};

/// A flat ROM image of fixed size. Later writes overwrite earlier ones,
/// which is what lets several S-Record files be overlaid onto one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryImage {
    data: Vec<u8>,
    blank: u8,
    high_water_mark: u64,
    dropped_writes: u64,
}

impl BinaryImage {
    /// Create an image of `rom_size` bytes, all set to `blank`.
    pub fn new(rom_size: usize, blank: u8) -> Self {
        Self {
            data: vec![blank; rom_size],
            blank,
            high_water_mark: 0,
            dropped_writes: 0,
        }
    }

    /// Commit `value` at `address` if it lies within the image; writes
    /// beyond the end are dropped. Either way the high-water mark grows to
    /// cover the address. Returns whether the byte was stored.
    pub fn write(&mut self, address: u64, value: u8) -> bool {
        self.high_water_mark = self.high_water_mark.max(address + 1);
        match usize::try_from(address).ok().and_then(|a| self.data.get_mut(a)) {
            Some(byte) => {
                *byte = value;
                true
            }
            None => {
                trace!("Dropped write of {:02X} at {:#010X}", value, address);
                self.dropped_writes += 1;
                false
            }
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// The configured ROM size.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn blank(&self) -> u8 {
        self.blank
    }

    /// The smallest image size that would have held every byte written so
    /// far, including dropped ones.
    pub fn high_water_mark(&self) -> u64 {
        self.high_water_mark
    }

    /// How many writes fell outside the image.
    pub fn dropped_writes(&self) -> u64 {
        self.dropped_writes
    }
}

impl Display for BinaryImage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", pretty_print_hex_block_zero(&self.data))
    }
}
