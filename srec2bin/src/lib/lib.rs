#[macro_use]
mod error;
mod checksum;
mod convert;
mod decoder;
mod hex;
mod image;
mod record;

#[cfg(test)]
mod tests;

// Public API.
pub use checksum::{Checksum, ChecksumMismatch};
pub use convert::{convert, ConversionReport, Converter, FileReport};
pub use decoder::{Decoder, Event, RecordHeader, State};
pub use error::{ErrorKind, SrecError, SrecResult};
pub use hex::nibble;
pub use image::BinaryImage;
pub use record::{DecodedRecord, RecordType};
