use std::{fs::{self, File}, io::BufWriter, path::PathBuf, time::Instant};

use anyhow::{bail, Context};
use clap::Parser;
use log::info;
use huffdiff_rust::{
    cli::{self, CodecArgs, Mode},
    codec,
    delta,
    pam::{self, PamImage, PamSamples},
};

#[derive(Parser, Debug)]
#[command(about = "Delta-transform a grayscale PAM image and Huffman-compress the residuals, or restore it")]
struct Args {
    #[command(flatten)]
    codec: CodecArgs,
    /// Also write the residuals as a viewable grayscale PAM (compression only)
    #[arg(long)]
    residuals: Option<PathBuf>,
}

fn run(args: Args) -> anyhow::Result<()> {
    let Args { codec: codec_args, residuals } = args;
    let comp_time = Instant::now();

    match codec_args.mode {
        Mode::Compress => {
            let image = PamImage::open(&codec_args.input)
                .with_context(|| format!("Could not read the image {}", codec_args.input.display()))?;

            let grid = match image.samples {
                PamSamples::Gray8(grid) => grid,
                PamSamples::Gray16(_) => bail!("Only 8-bit grayscale images are supported (MAXVAL {})", image.maxval),
            };

            if let Some(path) = residuals {
                let preview = delta::residual_preview(&delta::forward_delta(&grid));
                pam::write_gray8(&path, &preview)
                    .with_context(|| format!("Could not write {}", path.display()))?;
            }

            let output = File::create(&codec_args.output)
                .with_context(|| format!("Could not create {}", codec_args.output.display()))?;

            let report = codec::compress_grid(&grid, BufWriter::new(output))
                .context("Failed compressing the image")?;

            info!(
                "compressed a {}x{} image into {} bytes ({} codes) in {}ns",
                grid.cols(),
                grid.rows(),
                report.compressed_bytes,
                report.table_entries,
                comp_time.elapsed().as_nanos()
            );

            if codec_args.stats {
                cli::print_stats(&report)?;
            }
        }
        Mode::Decompress => {
            let input = fs::read(&codec_args.input)
                .with_context(|| format!("Could not open {}", codec_args.input.display()))?;

            let grid = codec::decompress_grid::<u8>(&input).context("Failed decoding the input")?;

            pam::write_gray8(&codec_args.output, &grid)
                .with_context(|| format!("Could not write {}", codec_args.output.display()))?;

            info!(
                "decompressed a {}x{} image in {}ns",
                grid.cols(),
                grid.rows(),
                comp_time.elapsed().as_nanos()
            );
        }
    }

    Ok(())
}

fn main() {
    let args: Args = cli::parse_or_exit();
    cli::init_logger(args.codec.verbose);

    cli::finish(run(args));
}
