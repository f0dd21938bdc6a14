mod config;
mod error;

use clap::{value_parser, Arg, ArgAction, ArgGroup, ArgMatches, Command};
use log::{error, info, LevelFilter};
use srec2bin_utils::file::TransientFile;
use std::io::{self, Write};
use std::path::PathBuf;

use crate::config::Config;
use crate::error::RunError;

const BINFILE: &str = "BINFILE";
const SIZE_BYTES: &str = "bytes";
const SIZE_KILOBYTES: &str = "kilobytes";
const SIZE_MEGABYTES: &str = "megabytes";
const SIZE_GIGABYTES: &str = "gigabytes";
const ROM_SIZE: &str = "rom-size";
const BLANK: &str = "blank";
const VERBOSITY: &str = "verbosity";
const SREC_FILES: &str = "SREC_FILES";

fn cli() -> Command {
    // Hack to make the build dirty when the toml changes.
    include_str!("../../Cargo.toml");

    clap::command!()
        .after_help("\
Existing binary files are overwritten. Later SREC files in the list take \
precedence, and writes beyond the ROM size are ignored (the minimum ROM size \
that would have held them is reported).\n\n\
Examples:\n    \
    srec2bin image.bin -K 256 -d 0\n    \
    srec2bin fred.bin -M 2 -s f1.s19 f2.mot f3.s37\n    \
    srec2bin fred.bin -K 128 -v 0 -s f1.s19")
        .arg(Arg::new(BINFILE)
            .help("The binary image file to create.")
            .action(ArgAction::Set)
            .required(true)
            .value_parser(value_parser!(PathBuf)))
        .arg(size_arg(SIZE_BYTES, 'B', "ROM size in bytes."))
        .arg(size_arg(SIZE_KILOBYTES, 'K', "ROM size in KiB (1024 bytes)."))
        .arg(size_arg(SIZE_MEGABYTES, 'M', "ROM size in MiB (1024 KiB)."))
        .arg(size_arg(SIZE_GIGABYTES, 'G', "ROM size in GiB (1024 MiB)."))
        .group(ArgGroup::new(ROM_SIZE)
            .args([SIZE_BYTES, SIZE_KILOBYTES, SIZE_MEGABYTES, SIZE_GIGABYTES])
            .required(true))
        .arg(Arg::new(BLANK)
            .help("Value for addresses not covered by any SREC file \
                   (decimal, or hex with a 0x prefix).")
            .short('d')
            .value_name("BV")
            .action(ArgAction::Set)
            .default_value("0xFF")
            .value_parser(config::parse_blank))
        .arg(Arg::new(VERBOSITY)
            .help("0 is silent, 1 gives a summary, 2 or more traces every \
                   record and character.")
            .short('v')
            .value_name("LEVEL")
            .action(ArgAction::Set)
            .default_value("1")
            .value_parser(value_parser!(u8)))
        .arg(Arg::new(SREC_FILES)
            .help("SREC files to overlay, in order. Must come last.")
            .short('s')
            .value_name("SREC")
            .num_args(1..)
            .allow_hyphen_values(true)
            .action(ArgAction::Append)
            .value_parser(value_parser!(PathBuf)))
}

fn size_arg(id: &'static str, short: char, help: &'static str) -> Arg {
    Arg::new(id)
        .help(help)
        .short(short)
        .value_name("SIZE")
        .action(ArgAction::Set)
        .value_parser(value_parser!(u64))
}

fn logging_format(formatter: &mut env_logger::fmt::Formatter,
                  record: &log::Record) -> io::Result<()> {
    let style = formatter.default_level_style(record.level());
    writeln!(formatter, "{:>7}  {}", style.value(record.level()), record.args())
}

/// Logging setup for normal build (not testing).
#[cfg(not(test))]
fn init_logging(level: LevelFilter) {
    env_logger::Builder::new()
        .filter_level(level)
        .format(logging_format)
        .target(env_logger::Target::Stdout)
        .init();
}

/// Logging setup for testing build (properly captures stdout and ignores
/// multiple invocations).
#[cfg(test)]
fn init_logging(level: LevelFilter) {
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .format(logging_format)
        .is_test(true)
        .try_init();
}

/// Main run function; returns an exit code.
fn run(args: ArgMatches) -> u8 {
    init_logging(config::log_level(config::verbosity(&args)));

    return match _run(args) {
        Ok(()) => 0,
        Err(e) => {
            error!("{}", e.0);
            1
        }
    };

    fn _run(args: ArgMatches) -> Result<(), RunError> {
        let config = Config::from_matches(&args)?;

        // Create the output up front so a bad path fails before any work.
        let path = config.output.display().to_string();
        let mut output = TransientFile::create(&config.output)
            .map_err(|e| {
                RunError(format!("Failed to open target binary file '{}': {}", path, e))
            })?;
        info!("BIN file:......... {}", output.path().display());
        info!("Verbosity:........ {}", config.verbosity);

        let report = srec2bin::convert(config.rom_size, config.blank, &config.inputs);
        for line in report.to_string().lines() {
            info!("{}", line);
        }

        output.write_all(report.image.as_bytes())
            .and_then(|()| output.persist())
            .map_err(|e| {
                RunError(format!("Failed to write '{}': {}", path, e))
            })?;
        info!("Image written.");

        Ok(())
    }
}

fn main() {
    // With no arguments at all, just explain ourselves.
    if std::env::args_os().len() < 2 {
        let _ = cli().print_help();
        println!();
        return;
    }
    let args = cli().get_matches();
    std::process::exit(run(args).into());
}
