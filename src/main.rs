//! rawconv - batch conversion of raw sensor captures to JPEG/TIFF.
//!
//! ```bash
//! # A directory of NV12 frames
//! rawconv ./captures --format nv12 --width 1936 --height 1112
//!
//! # One 10-bit Bayer frame, outputs collected elsewhere
//! rawconv frame.raw --format bayer --pattern grbg --width 1936 --height 1112 -o ./jpg
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing::{error, info, warn};

use rawconv_rs::image_pipeline::{
    BitDepthScaling, CfaPattern, ConfigError, ConversionConfig, Coordinator, DemosaicMethod, OutputFormat,
    PipelineError, PixelFormat, TiffCompression,
};
use rawconv_rs::logger;

/// Convert raw NV12/NV21 and 10-bit Bayer captures to standard images.
#[derive(Parser, Debug)]
#[command(name = "rawconv")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Capture file, or directory of capture files
    input: PathBuf,

    /// Pixel format of the input
    #[arg(short, long, value_enum)]
    format: FormatArg,

    /// Bayer CFA pattern (required for --format bayer)
    #[arg(short, long, value_enum)]
    pattern: Option<PatternArg>,

    /// Frame width in pixels
    #[arg(long)]
    width: usize,

    /// Frame height in pixels
    #[arg(long)]
    height: usize,

    /// Worker threads (defaults to available parallelism)
    #[arg(short, long, env = "RAWCONV_WORKERS")]
    workers: Option<usize>,

    /// Maximum queued files; unbounded when omitted
    #[arg(long)]
    queue_capacity: Option<usize>,

    /// Write outputs here instead of next to each input
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output image format
    #[arg(long, value_enum, default_value = "jpeg")]
    output_format: OutputFormatArg,

    /// JPEG quality (1-100)
    #[arg(short, long, default_value = "90")]
    quality: u8,

    /// TIFF compression
    #[arg(long, value_enum, default_value = "none")]
    tiff_compression: TiffCompressionArg,

    /// Apply horizontal differencing before TIFF compression
    #[arg(long)]
    tiff_predictor: bool,

    /// Demosaic algorithm for Bayer input
    #[arg(long, value_enum, default_value = "bilinear")]
    demosaic: DemosaicArg,

    /// 10-bit to 8-bit mapping for Bayer input
    #[arg(long, value_enum, default_value = "linear")]
    scaling: ScalingArg,

    /// Enable verbose (debug) logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json_logs: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatArg {
    Nv12,
    Nv21,
    Bayer,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PatternArg {
    Bggr,
    Gbrg,
    Rggb,
    Grbg,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormatArg {
    Jpeg,
    Tiff,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum TiffCompressionArg {
    None,
    Lzw,
    DeflateFast,
    DeflateBalanced,
    DeflateBest,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DemosaicArg {
    Bilinear,
    Nearest,
    Cubic,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ScalingArg {
    /// s * 255 / 1023, rounded
    Linear,
    /// s / 4, rounded (legacy)
    Shift,
}

impl From<PatternArg> for CfaPattern {
    fn from(arg: PatternArg) -> Self {
        match arg {
            PatternArg::Bggr => CfaPattern::Bggr,
            PatternArg::Gbrg => CfaPattern::Gbrg,
            PatternArg::Rggb => CfaPattern::Rggb,
            PatternArg::Grbg => CfaPattern::Grbg,
        }
    }
}

impl Cli {
    fn pixel_format(&self) -> Result<PixelFormat, ConfigError> {
        let yuv = match self.format {
            FormatArg::Bayer => {
                let pattern = self.pattern.ok_or(ConfigError::MissingPattern)?;
                return Ok(PixelFormat::Bayer(pattern.into()));
            }
            FormatArg::Nv12 => PixelFormat::Nv12,
            FormatArg::Nv21 => PixelFormat::Nv21,
        };
        if let Some(pattern) = self.pattern {
            warn!("--pattern {:?} ignored for {} input", pattern, yuv);
        }
        Ok(yuv)
    }

    fn to_config(&self) -> Result<ConversionConfig, ConfigError> {
        let output_format = match self.output_format {
            OutputFormatArg::Jpeg => OutputFormat::Jpeg,
            OutputFormatArg::Tiff => OutputFormat::Tiff,
        };
        let tiff_compression = match self.tiff_compression {
            TiffCompressionArg::None => TiffCompression::None,
            TiffCompressionArg::Lzw => TiffCompression::Lzw,
            TiffCompressionArg::DeflateFast => TiffCompression::DeflateFast,
            TiffCompressionArg::DeflateBalanced => TiffCompression::DeflateBalanced,
            TiffCompressionArg::DeflateBest => TiffCompression::DeflateBest,
        };
        let demosaic = match self.demosaic {
            DemosaicArg::Bilinear => DemosaicMethod::Bilinear,
            DemosaicArg::Nearest => DemosaicMethod::NearestNeighbour,
            DemosaicArg::Cubic => DemosaicMethod::Cubic,
        };
        let scaling = match self.scaling {
            ScalingArg::Linear => BitDepthScaling::Linear,
            ScalingArg::Shift => BitDepthScaling::Shift,
        };

        Ok(ConversionConfig::builder()
            .format(self.pixel_format()?)
            .dimensions(self.width, self.height)
            .workers(self.workers)
            .queue_capacity(self.queue_capacity)
            .output_dir(self.output_dir.clone())
            .output_format(output_format)
            .jpeg_quality(self.quality)
            .tiff_compression(tiff_compression)
            .tiff_predictor(self.tiff_predictor)
            .demosaic(demosaic)
            .scaling(scaling)
            .build())
    }
}

fn run(cli: &Cli) -> anyhow::Result<ExitCode> {
    let config = cli.to_config().context("invalid arguments")?;
    let coordinator = Coordinator::new(config).context("invalid arguments")?;

    info!(
        "Converting {} as {} {}x{}",
        cli.input.display(),
        coordinator.config().format,
        coordinator.config().width,
        coordinator.config().height
    );

    let report = match coordinator.run(&cli.input) {
        Ok(report) => report,
        Err(PipelineError::Config(e)) => return Err(e).context("invalid arguments"),
        Err(e) => return Err(e.into()),
    };

    if report.no_files_found() {
        error!("No input files found");
        return Ok(ExitCode::FAILURE);
    }
    if report.all_failed() {
        error!("All {} file(s) failed", report.failed);
        return Ok(ExitCode::FAILURE);
    }
    if report.failed > 0 {
        warn!("{} of {} file(s) failed", report.failed, report.discovered);
    }
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init(cli.verbose, cli.json_logs);

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
