use clap::{Args, Parser, Subcommand};
use image::ImageReader;
use serde::Serialize;
use std::path::PathBuf;

use drawbox::batch::{self, BatchOptions};
use drawbox::detection::{DEFAULT_HIGH_THRESHOLD, DEFAULT_LOW_THRESHOLD};
use drawbox::postprocess;
use drawbox::{Detection, DirectorySink, RegionDetector};

#[derive(Parser)]
#[command(name = "drawbox")]
#[command(about = "Find the drawing region in a screenshot or scanned page")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Detect the drawing box in a single image
    Detect {
        /// Path to input image file
        #[arg(value_name = "IMAGE")]
        image_path: PathBuf,

        #[command(flatten)]
        thresholds: Thresholds,

        /// Save debug outputs to directory (cleared first)
        #[arg(long, value_name = "DIR")]
        debug_out: Option<PathBuf>,

        /// Save the cropped region to this path
        #[arg(long, value_name = "PATH")]
        crop_out: Option<PathBuf>,

        /// Simplify the saved crop into tiles of this size (needs --crop-out)
        #[arg(long, value_name = "N", requires = "crop_out")]
        simplify_blocks: Option<u32>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Detect and crop every image in a folder
    Batch {
        /// Folder containing the images
        #[arg(value_name = "INPUT_DIR")]
        input_dir: PathBuf,

        /// Folder for cropped images
        #[arg(short, long, value_name = "DIR")]
        output: PathBuf,

        /// Folder for per-image debug outputs
        #[arg(long, value_name = "DIR")]
        steps: Option<PathBuf>,

        /// Skip images whose cropped output already exists
        #[arg(long)]
        skip_existing: bool,

        #[command(flatten)]
        thresholds: Thresholds,

        /// Simplify each crop into tiles of this size
        #[arg(long, value_name = "N")]
        simplify_blocks: Option<u32>,
    },
}

#[derive(Args)]
struct Thresholds {
    /// Lower Canny hysteresis threshold
    #[arg(long, default_value_t = DEFAULT_LOW_THRESHOLD)]
    low: f32,

    /// Upper Canny hysteresis threshold
    #[arg(long, default_value_t = DEFAULT_HIGH_THRESHOLD)]
    high: f32,
}

#[derive(Serialize)]
struct Report<'a> {
    image: &'a std::path::Path,
    image_width: u32,
    image_height: u32,
    #[serde(flatten)]
    detection: Detection,
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let default_filter = if args.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    match args.command {
        Command::Detect {
            image_path,
            thresholds,
            debug_out,
            crop_out,
            simplify_blocks,
            json,
        } => {
            let detector = RegionDetector::new()
                .with_thresholds(thresholds.low, thresholds.high)
                .with_verbose(args.verbose);

            log::info!("Loading image: {:?}", image_path);
            let img = ImageReader::open(&image_path)?
                .with_guessed_format()?
                .decode()
                .map_err(|e| anyhow::anyhow!("Failed to decode image: {}", e))?
                .to_rgb8();
            log::info!("Image loaded: {}x{}", img.width(), img.height());

            let detection = match debug_out {
                Some(dir) => detector.detect_with_sink(&img, &mut DirectorySink::new(dir))?,
                None => detector.detect(&img)?,
            };

            if json {
                let report = Report {
                    image: &image_path,
                    image_width: img.width(),
                    image_height: img.height(),
                    detection,
                };
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                let bbox = detection.bbox();
                println!("x={} y={} w={} h={}", bbox.x, bbox.y, bbox.width, bbox.height);
                if detection.is_fallback() {
                    println!("No drawing box detected; the full image was returned and may not be a reliable crop.");
                }
            }

            if let Some(path) = crop_out {
                let mut cropped = postprocess::crop(&img, detection.bbox());
                if let Some(block_size) = simplify_blocks {
                    cropped = postprocess::simplify_blocks(&cropped, block_size)?;
                }
                cropped
                    .save(&path)
                    .map_err(|e| anyhow::anyhow!("Failed to save {}: {}", path.display(), e))?;
                log::info!("Cropped image saved to {}", path.display());
            }
        }
        Command::Batch {
            input_dir,
            output,
            steps,
            skip_existing,
            thresholds,
            simplify_blocks,
        } => {
            let detector = RegionDetector::new()
                .with_thresholds(thresholds.low, thresholds.high)
                .with_verbose(args.verbose);

            let options = BatchOptions {
                input_dir,
                output_dir: output,
                steps_dir: steps,
                skip_existing,
                simplify_blocks,
            };
            let summary = batch::run(&options, &detector)?;

            println!("\n=== Batch Results ===");
            println!("Processed: {}", summary.processed());
            println!("  Detected: {}", summary.detected);
            println!("  Fallback (full image): {}", summary.fallback);
            println!("Skipped: {}", summary.skipped);
            println!("Failed: {}", summary.failed.len());
            for path in &summary.failed {
                println!("  {}", path.display());
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simplify_blocks_requires_crop_out() {
        let result = Cli::try_parse_from(["drawbox", "detect", "page.png", "--simplify-blocks", "8"]);
        assert_eq!(
            result.err().map(|e| e.kind()),
            Some(clap::error::ErrorKind::MissingRequiredArgument)
        );
    }

    #[test]
    fn test_simplify_blocks_with_crop_out_parses() {
        let cli = Cli::try_parse_from([
            "drawbox", "detect", "page.png", "--crop-out", "out.png", "--simplify-blocks", "8",
        ])
        .expect("arguments should parse");

        match cli.command {
            Command::Detect { crop_out, simplify_blocks, .. } => {
                assert_eq!(crop_out, Some(PathBuf::from("out.png")));
                assert_eq!(simplify_blocks, Some(8));
            }
            Command::Batch { .. } => panic!("expected the detect subcommand"),
        }
    }
}
