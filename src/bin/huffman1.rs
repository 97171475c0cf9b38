use std::{fs::{self, File}, io::BufWriter, time::Instant};

use anyhow::Context;
use clap::Parser;
use log::info;
use huffdiff_rust::{cli::{self, CodecArgs, Mode}, codec};

#[derive(Parser, Debug)]
#[command(about = "Huffman-compress any file, or restore a file compressed by this tool")]
struct Args {
    #[command(flatten)]
    codec: CodecArgs,
}

fn run(args: Args) -> anyhow::Result<()> {
    let args = args.codec;
    let comp_time = Instant::now();

    let input = fs::read(&args.input)
        .with_context(|| format!("Could not open {}", args.input.display()))?;

    match args.mode {
        Mode::Compress => {
            let output = File::create(&args.output)
                .with_context(|| format!("Could not create {}", args.output.display()))?;

            let report = codec::compress(&input, BufWriter::new(output))
                .context("Failed compressing the input")?;

            info!(
                "compressed {} bytes into {} bytes ({} codes) in {}ns",
                report.symbols,
                report.compressed_bytes,
                report.table_entries,
                comp_time.elapsed().as_nanos()
            );

            if args.stats {
                cli::print_stats(&report)?;
            }
        }
        Mode::Decompress => {
            let data = codec::decompress(&input).context("Failed decoding the input")?;

            fs::write(&args.output, &data)
                .with_context(|| format!("Could not write {}", args.output.display()))?;

            info!("decompressed {} bytes in {}ns", data.len(), comp_time.elapsed().as_nanos());
        }
    }

    Ok(())
}

fn main() {
    let args: Args = cli::parse_or_exit();
    cli::init_logger(args.codec.verbose);

    cli::finish(run(args));
}
