//! Command-line plumbing shared by the `huffman1` and `huffdiff` tools.

use std::path::PathBuf;
use std::process;

use clap::{error::ErrorKind, Args, Parser, ValueEnum};
use log::LevelFilter;

use crate::CompressionReport;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Compress the input file
    #[value(name = "c")]
    Compress,
    /// Decompress the input file
    #[value(name = "d")]
    Decompress,
}

#[derive(Args, Debug)]
pub struct CodecArgs {
    /// `c` to compress, `d` to decompress
    #[arg(value_enum)]
    pub mode: Mode,
    /// Source filename
    pub input: PathBuf,
    /// Destination filename
    pub output: PathBuf,
    /// Print a JSON summary of the compression on stdout
    #[arg(long, default_value_t = false)]
    pub stats: bool,
    /// Log more (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Parses the arguments; usage errors exit with status 1, help and version with 0.
pub fn parse_or_exit<P: Parser>() -> P {
    match P::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => process::exit(0),
                _ => process::exit(1),
            }
        }
    }
}

pub fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    let _ = env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .try_init();
}

pub fn print_stats(report: &CompressionReport) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

/// Reports `result` and terminates: status 0 on success, 1 on any failure.
pub fn finish(result: anyhow::Result<()>) -> ! {
    match result {
        Ok(()) => process::exit(0),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}
