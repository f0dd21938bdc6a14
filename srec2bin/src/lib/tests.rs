use super::*;

use insta::assert_snapshot;
use std::fs;
use std::io::Write;

/// Initialise logging.
pub fn init() {
    // The logger can only be initialised once, but we don't know the order of
    // tests. Therefore we use `try_init` and ignore the result.
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("debug"))
        .format(|out, record| {
            writeln!(out, "{:>7} {}", record.level(), record.args())
        })
        .is_test(true)
        .try_init();
}

/// Overlay the given fixture files onto a 64-byte image of 0xFF.
macro_rules! convert_files {
    ($($f:literal),+) => {{
        init();
        convert(64, 0xFF, [$(concat!("testdata/", $f)),+])
    }};
}

/// Process in-memory text as a single input.
fn convert_str(rom_size: usize, blank: u8, input: &str) -> (BinaryImage, FileReport) {
    init();
    let mut converter = Converter::new(BinaryImage::new(rom_size, blank));
    let report = converter.process_reader("input", input.as_bytes());
    (converter.into_image(), report)
}

/// A single S1 record lands at its address and nowhere else.
#[test]
fn test_single_record() {
    let (image, report) = convert_str(16, 0xFF, "S1060004AABBCCC4\n");
    assert!(report.is_clean());
    assert_eq!(report.records, 1);
    assert_eq!(report.bytes_written, 3);
    assert_eq!(image.high_water_mark(), 7);
    assert_snapshot!(image.to_string(),
        @"0x00000000    FF FF FF FF  AA BB CC FF  FF FF FF FF  FF FF FF FF  |................|");
}

/// A bad checksum is reported, but the data is still applied.
#[test]
fn test_bad_checksum_still_applied() {
    let (good, _) = convert_str(16, 0xFF, "S1060004AABBCCC4\n");
    let (image, report) = convert_str(16, 0xFF, "S1060004AABBCC00\n");
    assert_eq!(image, good);
    assert_eq!(report.records, 1);
    assert!(report.error.is_none());
    assert_eq!(report.checksum_mismatches,
               vec![ChecksumMismatch { line: 1, expected: 0xC4, found: 0x00 }]);
}

/// A write exactly one past the end is dropped, but the mark covers it.
#[test]
fn test_write_at_rom_size() {
    let record = DecodedRecord::new(RecordType::Data16, 16, vec![0x42]).unwrap();
    let (image, report) = convert_str(16, 0xFF, &format!("{}\n", record));
    assert!(report.is_clean());
    assert_eq!(report.bytes_written, 0);
    assert_eq!(image.as_bytes(), vec![0xFF; 16].as_slice());
    assert_eq!(image.high_water_mark(), 17);
}

#[test]
fn test_single_file() {
    let result = convert_files!("boot.s19");
    assert!(result.is_clean());
    assert_eq!(result.files.len(), 1);
    assert_eq!(result.files[0].records, 5);
    assert_eq!(result.high_water_mark(), 0x14);
    let bytes = result.image.as_bytes();
    assert_eq!(&bytes[..4], &[0x10, 0x11, 0x12, 0x13]);
    assert_eq!(&bytes[0x10..0x14], &[0xDE, 0xAD, 0xBE, 0xEF]);
    assert!(bytes[0x14..].iter().all(|b| *b == 0xFF));
}

/// The later file wins where the two overlap, and bytes past the end of the
/// image only show up in the high-water mark.
#[test]
fn test_overlay() {
    let result = convert_files!("boot.s19", "patch.s28");
    assert!(result.is_clean());
    assert_eq!(result.total_records(), 9);
    assert_eq!(result.files[1].records, 4);
    assert_eq!(result.files[1].bytes_written, 4);
    assert_eq!(result.high_water_mark(), 0x42);
    assert_eq!(result.image.dropped_writes(), 2);
    assert_snapshot!(result.image.to_string(), @r###"
    0x00000000    10 11 22 33  14 15 16 17  18 19 1A 1B  1C 1D 1E 1F  |.."3............|
    0x00000010    DE AD BE EF  FF FF FF FF  FF FF FF FF  FF FF FF FF  |................|
    0x00000020    FF FF FF FF  FF FF FF FF  FF FF FF FF  FF FF FF FF  |................|
    0x00000030    FF FF FF FF  FF FF FF FF  FF FF FF FF  FF FF 01 02  |................|
    "###);
}

/// Reversing the order reverses which file wins.
#[test]
fn test_overlay_order() {
    let result = convert_files!("patch.s28", "boot.s19");
    assert_eq!(&result.image.as_bytes()[..4], &[0x10, 0x11, 0x12, 0x13]);
    assert_eq!(&result.image.as_bytes()[0x3E..], &[0x01, 0x02]);
}

#[test]
fn test_overlay_same_address() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first.s19");
    let second = dir.path().join("second.s19");
    let write = |path: &std::path::Path, value: u8| {
        let record = DecodedRecord::new(RecordType::Data16, 2, vec![value]).unwrap();
        fs::write(path, format!("{}\n", record)).unwrap();
    };
    write(&first, 0x11);
    write(&second, 0x22);
    init();
    let result = convert(8, 0x00, [&first, &second]);
    assert!(result.is_clean());
    assert_eq!(result.image.as_bytes(), &[0, 0, 0x22, 0, 0, 0, 0, 0]);
}

#[test]
fn test_checksum_file() {
    let result = convert_files!("checksum.s37");
    let report = &result.files[0];
    assert_eq!(report.records, 4);
    assert!(report.error.is_none());
    assert_eq!(report.checksum_mismatches,
               vec![ChecksumMismatch { line: 2, expected: 0x91, found: 0x00 }]);
    assert_eq!(&result.image.as_bytes()[0x20..0x25], &[0xA0, 0xA1, 0xA2, 0xA3, 0xA4]);
    assert_eq!(report.to_string(),
               "<testdata/checksum.s37>: 4 records, checksum failed on line(s) 2");
}

/// A malformed line stops its own file but nothing else.
#[test]
fn test_corrupt_file_isolated() {
    let result = convert_files!("corrupt.s19", "boot.s19");
    let corrupt = &result.files[0];
    assert_eq!(corrupt.records, 1);
    let e = corrupt.error.as_ref().unwrap();
    assert_eq!(e.kind, ErrorKind::MalformedLine);
    assert_eq!((e.line, e.column), (2, 3));
    let bytes = result.image.as_bytes();
    assert_eq!(&bytes[0x30..0x34], &[0x30, 0x31, 0xFF, 0xFF]);
    // The next file is processed as normal.
    assert!(result.files[1].is_clean());
    assert_eq!(result.files[1].records, 5);
    assert_eq!(bytes[0], 0x10);
    assert!(!result.is_clean());
}

#[test]
fn test_missing_file_skipped() {
    let result = convert_files!("does-not-exist.s19", "boot.s19");
    let missing = &result.files[0];
    assert_eq!(missing.records, 0);
    assert_eq!(missing.error.as_ref().unwrap().kind, ErrorKind::FileOpenFailure);
    assert_eq!(result.files[1].records, 5);
    assert_eq!(result.high_water_mark(), 0x14);
}

/// An unsupported record type only stops the file it appears in.
#[test]
fn test_unsupported_type_is_file_scoped() {
    let (image, report) = convert_str(8, 0x00, "S1040001AA50\nS4040001BB00\nS1040002CC2D\n");
    assert_eq!(report.records, 1);
    assert_eq!(report.error.as_ref().unwrap().kind, ErrorKind::UnsupportedRecordType);
    assert_eq!(image.as_bytes(), &[0, 0xAA, 0, 0, 0, 0, 0, 0]);
}

/// Nothing processed: the image is entirely blank fill.
#[test]
fn test_no_inputs() {
    init();
    let result = convert(32, 0xA5, Vec::<&str>::new());
    assert!(result.files.is_empty());
    assert!(result.image.as_bytes().iter().all(|b| *b == 0xA5));
    assert_eq!(result.high_water_mark(), 0);
}

#[test]
fn test_summary() {
    let result = convert_files!("boot.s19", "patch.s28");
    assert_snapshot!(result.to_string(), @r###"
    ROM size:......... 64
    Blank value:...... 0xFF
    SREC files:....... 2
      <testdata/boot.s19>: 5 records
      <testdata/patch.s28>: 4 records
    Minimum ROM size:. 66 (2 bytes fell outside the image)
    "###);
}
