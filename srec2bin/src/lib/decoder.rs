use log::trace;
use std::fmt::{Display, Formatter};
use std::mem;

use crate::checksum::{Checksum, ChecksumMismatch};
use crate::error::SrecResult;
use crate::hex::nibble;
use crate::record::{DecodedRecord, RecordType};

/// Everything known about a record once its byte count has been read.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RecordHeader {
    pub record_type: RecordType,
    pub byte_count: u8,
    pub data_len: u8,
}

impl RecordHeader {
    /// Move on from the address field: straight to the checksum if the
    /// record carries no data.
    fn begin_data(self, checksum: Checksum, address: u32) -> State {
        if self.data_len > 0 {
            State::Data {
                header: self,
                checksum,
                address,
                data: Vec::with_capacity(usize::from(self.data_len)),
                high: None,
            }
        } else {
            State::Checksum {
                header: self,
                checksum,
                address,
                data: Vec::new(),
                high: None,
            }
        }
    }
}

/// Decoder phases. Each carries only what that phase needs; `high` holds the
/// first nibble of a byte whose second nibble has not arrived yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum State {
    LineStart,
    RecordType,
    ByteCount {
        record_type: RecordType,
        high: Option<u8>,
    },
    Address {
        header: RecordHeader,
        checksum: Checksum,
        address: u32,
        remaining: u8,
        high: Option<u8>,
    },
    Data {
        header: RecordHeader,
        checksum: Checksum,
        address: u32,
        data: Vec<u8>,
        high: Option<u8>,
    },
    Checksum {
        header: RecordHeader,
        checksum: Checksum,
        address: u32,
        data: Vec<u8>,
        high: Option<u8>,
    },
    EndOfLine,
}

impl Display for State {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            State::LineStart => "line start",
            State::RecordType => "record type",
            State::ByteCount { .. } => "byte count",
            State::Address { .. } => "address",
            State::Data { .. } => "data",
            State::Checksum { .. } => "checksum",
            State::EndOfLine => "end of line",
        };
        f.write_str(name)
    }
}

/// Something a transition produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A data byte of an S1/S2/S3 record, at its absolute address.
    Data { address: u64, value: u8 },
    /// A record's checksum byte arrived. `mismatch` is advisory.
    Record {
        record: DecodedRecord,
        mismatch: Option<ChecksumMismatch>,
    },
    /// The newline closing a record.
    LineEnd,
}

/// Result of feeding one hex digit into a byte under assembly.
enum Assembled {
    High(u8),
    Byte(u8),
}

fn assemble(high: Option<u8>, c: u8) -> SrecResult<Assembled> {
    let value = nibble(c)
        .ok_or_else(|| malformed!("expected a hex digit, found {:?}", char::from(c)))?;
    Ok(match high {
        None => Assembled::High(value),
        Some(high) => Assembled::Byte(high << 4 | value),
    })
}

impl State {
    /// The transition function: consume one input character.
    pub fn step(self, c: u8) -> SrecResult<(State, Option<Event>)> {
        match self {
            State::LineStart => match c {
                b'\n' | b'\r' | b' ' | b'\t' => Ok((State::LineStart, None)),
                b'S' | b's' => Ok((State::RecordType, None)),
                _ => Err(malformed!("expected 'S' at the start of a record, found {:?}",
                                    char::from(c))),
            },

            State::RecordType => {
                let record_type = RecordType::from_digit(c)?;
                Ok((State::ByteCount { record_type, high: None }, None))
            }

            State::ByteCount { record_type, high } => match assemble(high, c)? {
                Assembled::High(h) => {
                    Ok((State::ByteCount { record_type, high: Some(h) }, None))
                }
                Assembled::Byte(byte_count) => {
                    let width = record_type.address_width();
                    let data_len = byte_count.checked_sub(width + 1)
                        .ok_or_else(|| malformed!(
                            "byte count {} is too small for an {} record",
                            byte_count, record_type))?;
                    let header = RecordHeader { record_type, byte_count, data_len };
                    let mut checksum = Checksum::new();
                    checksum.add(byte_count);
                    let next = if width > 0 {
                        State::Address {
                            header,
                            checksum,
                            address: 0,
                            remaining: width,
                            high: None,
                        }
                    } else {
                        header.begin_data(checksum, 0)
                    };
                    Ok((next, None))
                }
            },

            State::Address { header, mut checksum, address, remaining, high } => {
                match assemble(high, c)? {
                    Assembled::High(h) => Ok((State::Address {
                        header,
                        checksum,
                        address,
                        remaining,
                        high: Some(h),
                    }, None)),
                    Assembled::Byte(byte) => {
                        checksum.add(byte);
                        let address = address << 8 | u32::from(byte);
                        let next = if remaining > 1 {
                            State::Address {
                                header,
                                checksum,
                                address,
                                remaining: remaining - 1,
                                high: None,
                            }
                        } else {
                            header.begin_data(checksum, address)
                        };
                        Ok((next, None))
                    }
                }
            }

            State::Data { header, mut checksum, address, mut data, high } => {
                match assemble(high, c)? {
                    Assembled::High(h) => Ok((State::Data {
                        header,
                        checksum,
                        address,
                        data,
                        high: Some(h),
                    }, None)),
                    Assembled::Byte(byte) => {
                        checksum.add(byte);
                        // Successive bytes land at successive addresses.
                        let event = header.record_type.writes_data().then(|| Event::Data {
                            address: u64::from(address) + data.len() as u64,
                            value: byte,
                        });
                        data.push(byte);
                        let next = if data.len() < usize::from(header.data_len) {
                            State::Data { header, checksum, address, data, high: None }
                        } else {
                            State::Checksum { header, checksum, address, data, high: None }
                        };
                        Ok((next, event))
                    }
                }
            }

            State::Checksum { header, checksum, address, data, high } => {
                match assemble(high, c)? {
                    Assembled::High(h) => Ok((State::Checksum {
                        header,
                        checksum,
                        address,
                        data,
                        high: Some(h),
                    }, None)),
                    Assembled::Byte(found) => {
                        let mismatch = checksum.verify(found).err();
                        let record = DecodedRecord {
                            record_type: header.record_type,
                            byte_count: header.byte_count,
                            address,
                            data,
                            checksum: found,
                        };
                        Ok((State::EndOfLine, Some(Event::Record { record, mismatch })))
                    }
                }
            }

            // Anything between the checksum and the newline is ignored.
            State::EndOfLine => match c {
                b'\n' => Ok((State::LineStart, Some(Event::LineEnd))),
                _ => Ok((State::EndOfLine, None)),
            },
        }
    }
}

/// Drives `State` over one input stream, keeping track of the position so
/// errors and checksum mismatches can point at their line. A decoder must
/// not be fed again after it returned an error.
#[derive(Debug)]
pub struct Decoder {
    state: State,
    line: usize,
    column: usize,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder {
    pub fn new() -> Self {
        Self {
            state: State::LineStart,
            line: 1,
            column: 0,
        }
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    /// The current 1-based line number.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Consume one character.
    pub fn feed(&mut self, c: u8) -> SrecResult<Option<Event>> {
        self.column += 1;
        trace!("{}:{} {:?} ({})", self.line, self.column, char::from(c), self.state);
        let state = mem::replace(&mut self.state, State::LineStart);
        let (state, mut event) = state.step(c)
            .map_err(|e| e.at(self.line, self.column))?;
        self.state = state;
        if let Some(Event::Record { mismatch: Some(mismatch), .. }) = &mut event {
            mismatch.line = self.line;
        }
        if c == b'\n' {
            self.line += 1;
            self.column = 0;
        }
        Ok(event)
    }

    /// Signal the end of input. A record whose checksum has been read counts
    /// as complete even without a final newline; anything less is an error.
    pub fn finish(self) -> SrecResult<Option<Event>> {
        match self.state {
            State::LineStart => Ok(None),
            State::EndOfLine => Ok(Some(Event::LineEnd)),
            state => Err(malformed!("unexpected end of input while reading {}", state)
                .at(self.line, self.column + 1)),
        }
    }
}
