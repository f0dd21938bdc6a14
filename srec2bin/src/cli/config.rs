use clap::ArgMatches;
use log::LevelFilter;
use std::path::PathBuf;

use crate::error::RunError;
use crate::{BINFILE, BLANK, SIZE_BYTES, SIZE_GIGABYTES, SIZE_KILOBYTES,
            SIZE_MEGABYTES, SREC_FILES, VERBOSITY};

/// Everything a run needs, gathered from the command line.
#[derive(Debug, PartialEq, Eq)]
pub struct Config {
    pub output: PathBuf,
    pub rom_size: usize,
    pub blank: u8,
    pub verbosity: u8,
    pub inputs: Vec<PathBuf>,
}

impl Config {
    pub fn from_matches(args: &ArgMatches) -> Result<Self, RunError> {
        Ok(Self {
            output: args.get_one::<PathBuf>(BINFILE).cloned()
                .ok_or_else(|| RunError("No binary file given.".into()))?,
            rom_size: rom_size(args)?,
            blank: args.get_one::<u8>(BLANK).copied().unwrap_or(0xFF),
            verbosity: verbosity(args),
            inputs: args.get_many::<PathBuf>(SREC_FILES)
                .map(|files| files.cloned().collect())
                .unwrap_or_default(),
        })
    }
}

/// The requested log level; also needed before the rest of the config is
/// validated, so errors in it can be logged.
pub fn verbosity(args: &ArgMatches) -> u8 {
    args.get_one::<u8>(VERBOSITY).copied().unwrap_or(1)
}

pub fn log_level(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Off,
        1 => LevelFilter::Info,
        _ => LevelFilter::Trace,
    }
}

/// Scale whichever size flag was given by the matching power of 1024.
fn rom_size(args: &ArgMatches) -> Result<usize, RunError> {
    let units = [
        (SIZE_BYTES, 0),
        (SIZE_KILOBYTES, 1),
        (SIZE_MEGABYTES, 2),
        (SIZE_GIGABYTES, 3),
    ];
    let (count, power) = units.iter()
        .find_map(|(id, power)| args.get_one::<u64>(id).map(|n| (*n, *power)))
        .ok_or_else(|| RunError("One of -B, -K, -M or -G is required.".into()))?;
    count.checked_mul(1024u64.pow(power))
        .and_then(|size| usize::try_from(size).ok())
        .ok_or_else(|| RunError("ROM size is too large for this platform.".into()))
}

/// Parse a blank value given in decimal, or in hex with a `0x` prefix.
pub fn parse_blank(s: &str) -> Result<u8, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => s.parse::<u8>(),
    };
    parsed.map_err(|_| format!("'{}' is not a byte value (0-255 or 0x00-0xFF)", s))
}
