use itertools::Itertools;
use log::{debug, info, trace, warn};
use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::checksum::ChecksumMismatch;
use crate::decoder::{Decoder, Event};
use crate::error::{ErrorKind, SrecError};
use crate::image::BinaryImage;

/// The outcome of processing one input.
#[derive(Debug)]
pub struct FileReport {
    pub name: String,
    /// Records read in full, up to and including their line ending.
    pub records: usize,
    /// Data bytes that landed inside the image.
    pub bytes_written: u64,
    pub checksum_mismatches: Vec<ChecksumMismatch>,
    /// Why processing of this input stopped early, if it did.
    pub error: Option<SrecError>,
}

impl FileReport {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            records: 0,
            bytes_written: 0,
            checksum_mismatches: Vec::new(),
            error: None,
        }
    }

    /// No errors and no checksum mismatches.
    pub fn is_clean(&self) -> bool {
        self.error.is_none() && self.checksum_mismatches.is_empty()
    }
}

impl Display for FileReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let plural = if self.records == 1 { "" } else { "s" };
        write!(f, "<{}>: {} record{}", self.name, self.records, plural)?;
        if !self.checksum_mismatches.is_empty() {
            write!(f, ", checksum failed on line(s) {}",
                   self.checksum_mismatches.iter().map(|m| m.line).join(", "))?;
        }
        if let Some(e) = &self.error {
            write!(f, "; stopped: {}", e)?;
        }
        Ok(())
    }
}

/// The outcome of a whole run.
#[derive(Debug)]
pub struct ConversionReport {
    pub image: BinaryImage,
    pub files: Vec<FileReport>,
}

impl ConversionReport {
    /// See `BinaryImage::high_water_mark`.
    pub fn high_water_mark(&self) -> u64 {
        self.image.high_water_mark()
    }

    pub fn total_records(&self) -> usize {
        self.files.iter().map(|f| f.records).sum()
    }

    pub fn is_clean(&self) -> bool {
        self.files.iter().all(FileReport::is_clean)
    }
}

impl Display for ConversionReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "ROM size:......... {}", self.image.len())?;
        writeln!(f, "Blank value:...... {:#04X}", self.image.blank())?;
        writeln!(f, "SREC files:....... {}", self.files.len())?;
        for file in self.files.iter() {
            writeln!(f, "  {}", file)?;
        }
        write!(f, "Minimum ROM size:. {}", self.high_water_mark())?;
        if self.high_water_mark() > self.image.len() as u64 {
            write!(f, " ({} bytes fell outside the image)", self.image.dropped_writes())?;
        }
        Ok(())
    }
}

/// Streams S-Record inputs onto a shared image, one input at a time.
#[derive(Debug)]
pub struct Converter {
    image: BinaryImage,
}

impl Converter {
    pub fn new(image: BinaryImage) -> Self {
        Self { image }
    }

    pub fn into_image(self) -> BinaryImage {
        self.image
    }

    /// Open and process the file at `path`. A file that cannot be opened is
    /// reported and otherwise skipped.
    pub fn process_file(&mut self, path: &Path) -> FileReport {
        let name = path.display().to_string();
        info!("Processing '{}'.", name);
        let report = match File::open(path) {
            Ok(file) => self.process_reader(&name, file),
            Err(e) => {
                let mut report = FileReport::new(&name);
                report.error = Some(SrecError::new(ErrorKind::FileOpenFailure,
                    format!("couldn't open '{}': {}", name, e)));
                report
            }
        };
        // The run summary repeats this line, so keep it out of the way.
        debug!("{}", report);
        report
    }

    /// Decode everything `reader` yields. Decoding stops at the first
    /// malformed character; whatever was decoded before it stays applied.
    pub fn process_reader<R: Read>(&mut self, name: &str, reader: R) -> FileReport {
        let mut report = FileReport::new(name);
        let mut decoder = Decoder::new();

        for byte in BufReader::new(reader).bytes() {
            let event = byte.map_err(SrecError::from)
                .and_then(|c| decoder.feed(c));
            match event {
                Ok(Some(event)) => self.apply(&mut report, event),
                Ok(None) => {}
                Err(e) => {
                    report.error = Some(e);
                    return report;
                }
            }
        }
        match decoder.finish() {
            Ok(Some(event)) => self.apply(&mut report, event),
            Ok(None) => {}
            Err(e) => report.error = Some(e),
        }

        report
    }

    fn apply(&mut self, report: &mut FileReport, event: Event) {
        match event {
            Event::Data { address, value } => {
                if self.image.write(address, value) {
                    report.bytes_written += 1;
                }
            }
            Event::Record { record, mismatch } => {
                debug!("{} {} at {:#010X}, {} data bytes",
                       report.name, record.record_type, record.address, record.data.len());
                if let Some(mismatch) = mismatch {
                    warn!("{}: {}", report.name, mismatch);
                    report.checksum_mismatches.push(mismatch);
                }
            }
            Event::LineEnd => report.records += 1,
        }
    }
}

/// Build an image of `rom_size` bytes of `blank`, then overlay every input
/// onto it in order. Later inputs win where addresses overlap.
pub fn convert<I, P>(rom_size: usize, blank: u8, inputs: I) -> ConversionReport
    where I: IntoIterator<Item=P>,
          P: AsRef<Path>
{
    let mut converter = Converter::new(BinaryImage::new(rom_size, blank));
    let files: Vec<FileReport> = inputs.into_iter()
        .map(|path| converter.process_file(path.as_ref()))
        .collect();
    let image = converter.into_image();
    trace!("Final image:\n{}", image);

    ConversionReport { image, files }
}
