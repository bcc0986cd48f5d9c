use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use log::{info, LevelFilter};

use baseline_jpeg::bmp::write_bmp;
use baseline_jpeg::{decode_with_options, DecodeOptions, Upsampling};

#[derive(Copy, Clone, Debug, ValueEnum)]
enum UpsamplingArg {
    Bilinear,
    Nearest,
}

impl From<UpsamplingArg> for Upsampling {
    fn from(arg: UpsamplingArg) -> Self {
        match arg {
            UpsamplingArg::Bilinear => Upsampling::Bilinear,
            UpsamplingArg::Nearest => Upsampling::NearestNeighbor,
        }
    }
}

/// Decode a baseline JPEG and write it out as a BMP.
#[derive(Parser)]
struct Cli {
    file: PathBuf,
    /// Where to write the BMP; defaults to the input path with a .bmp extension.
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// How subsampled chroma is stretched to full resolution.
    #[arg(long, value_enum, default_value_t = UpsamplingArg::Bilinear)]
    upsampling: UpsamplingArg,
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), anyhow::Error> {
    let args = Cli::parse();
    env_logger::builder()
        .filter_level(if args.verbose { LevelFilter::Debug } else { LevelFilter::Info })
        .parse_default_env()
        .init();

    let input = std::fs::read(&args.file).with_context(|| format!("reading {}", args.file.display()))?;
    let options = DecodeOptions { upsampling: args.upsampling.into() };
    let image = decode_with_options(&input, &options).with_context(|| format!("decoding {}", args.file.display()))?;
    info!("decoded {}x{} image from {}", image.width(), image.height(), args.file.display());

    let output = args.output.unwrap_or_else(|| args.file.with_extension("bmp"));
    std::fs::write(&output, write_bmp(&image)).with_context(|| format!("writing {}", output.display()))?;
    info!("wrote {}", output.display());

    Ok(())
}
