use std::fmt::{Display, Formatter};

use crate::checksum::Checksum;
use crate::error::{ErrorKind, SrecError, SrecResult};
use crate::hex::push_hex_byte;

/// The record types this tool understands. S4 and S6 are deliberately absent.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum RecordType {
    /// S0: header, no address.
    Header,
    /// S1: data with a 16-bit address.
    Data16,
    /// S2: data with a 24-bit address.
    Data24,
    /// S3: data with a 32-bit address.
    Data32,
    /// S5: record count, no address.
    Count16,
    /// S7: termination with a 32-bit start address.
    Start32,
    /// S8: termination with a 24-bit start address.
    Start24,
    /// S9: termination with a 16-bit start address.
    Start16,
}

impl RecordType {
    /// Look up the record type for the digit following `S`.
    pub fn from_digit(c: u8) -> SrecResult<Self> {
        match c {
            b'0' => Ok(RecordType::Header),
            b'1' => Ok(RecordType::Data16),
            b'2' => Ok(RecordType::Data24),
            b'3' => Ok(RecordType::Data32),
            b'5' => Ok(RecordType::Count16),
            b'7' => Ok(RecordType::Start32),
            b'8' => Ok(RecordType::Start24),
            b'9' => Ok(RecordType::Start16),
            b'4' | b'6' => Err(SrecError::new(ErrorKind::UnsupportedRecordType,
                format!("S{} records are not supported", char::from(c)))),
            _ => Err(malformed!("expected a record type digit, found {:?}",
                                char::from(c))),
        }
    }

    /// The ASCII digit for this type.
    pub fn digit(self) -> u8 {
        match self {
            RecordType::Header => b'0',
            RecordType::Data16 => b'1',
            RecordType::Data24 => b'2',
            RecordType::Data32 => b'3',
            RecordType::Count16 => b'5',
            RecordType::Start32 => b'7',
            RecordType::Start24 => b'8',
            RecordType::Start16 => b'9',
        }
    }

    /// Width of the address field in bytes.
    pub fn address_width(self) -> u8 {
        match self {
            RecordType::Header | RecordType::Count16 => 0,
            RecordType::Data16 | RecordType::Start16 => 2,
            RecordType::Data24 | RecordType::Start24 => 3,
            RecordType::Data32 | RecordType::Start32 => 4,
        }
    }

    /// Only S1, S2 and S3 carry bytes destined for the image.
    pub fn writes_data(self) -> bool {
        matches!(self, RecordType::Data16 | RecordType::Data24 | RecordType::Data32)
    }
}

impl Display for RecordType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "S{}", char::from(self.digit()))
    }
}

/// One fully decoded record. `byte_count` always equals the address width
/// plus the data length plus one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedRecord {
    pub record_type: RecordType,
    pub byte_count: u8,
    pub address: u32,
    pub data: Vec<u8>,
    pub checksum: u8,
}

impl DecodedRecord {
    /// Build a well-formed record with a correct checksum. The address is
    /// truncated to the width of `record_type`. Returns `None` if the data
    /// does not fit in a single record.
    pub fn new(record_type: RecordType, address: u32, data: Vec<u8>) -> Option<Self> {
        let width = record_type.address_width();
        let byte_count = u8::try_from(data.len() + usize::from(width) + 1).ok()?;
        let address = match width {
            4 => address,
            w => address & ((1 << (8 * u32::from(w))) - 1),
        };
        let mut record = DecodedRecord {
            record_type,
            byte_count,
            address,
            data,
            checksum: 0,
        };
        record.checksum = record.expected_checksum();
        Some(record)
    }

    /// The address field exactly as transmitted, big-endian.
    pub fn address_bytes(&self) -> Vec<u8> {
        let width = usize::from(self.record_type.address_width());
        self.address.to_be_bytes()[4 - width..].to_vec()
    }

    /// The checksum this record's contents call for.
    pub fn expected_checksum(&self) -> u8 {
        Checksum::of([self.byte_count].iter()
                .chain(self.address_bytes().iter())
                .chain(self.data.iter()))
            .expected()
    }

    pub fn checksum_matches(&self) -> bool {
        self.checksum == self.expected_checksum()
    }
}

/// Encode back into the textual form, without a line terminator.
impl Display for DecodedRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut line = String::with_capacity(4 + 2 * usize::from(self.byte_count));
        line.push('S');
        line.push(self.record_type.digit().into());
        push_hex_byte(&mut line, self.byte_count);
        for byte in self.address_bytes().iter().chain(self.data.iter()) {
            push_hex_byte(&mut line, *byte);
        }
        push_hex_byte(&mut line, self.checksum);
        f.write_str(&line)
    }
}
