//! Detect-and-crop over every image in a folder.

use anyhow::{Context, Result};
use image::ImageReader;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::detection::RegionDetector;
use crate::diagnostics::DirectorySink;
use crate::models::Detection;
use crate::postprocess;

/// File extensions picked up from the input folder (compared case-insensitively)
pub const SUPPORTED_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "bmp", "tif", "tiff"];

#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Folder scanned (non-recursively) for images
    pub input_dir: PathBuf,
    /// Folder receiving `<stem>_cropped.<ext>`
    pub output_dir: PathBuf,
    /// Parent folder for per-image `<stem>_debug` diagnostics
    pub steps_dir: Option<PathBuf>,
    /// Leave files alone when their cropped output already exists
    pub skip_existing: bool,
    /// Tile size for dominant-color simplification of the crop
    pub simplify_blocks: Option<u32>,
}

impl BatchOptions {
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            steps_dir: None,
            skip_existing: false,
            simplify_blocks: None,
        }
    }
}

/// Per-run counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub detected: usize,
    pub fallback: usize,
    pub skipped: usize,
    pub failed: Vec<PathBuf>,
}

impl BatchSummary {
    pub fn processed(&self) -> usize {
        self.detected + self.fallback
    }
}

/// List supported image files in `dir`, sorted by path
pub fn collect_inputs(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read input directory {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && is_supported(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SUPPORTED_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Output path for one input: `<output_dir>/<stem>_cropped.<ext>`
pub fn cropped_path(output_dir: &Path, input: &Path) -> PathBuf {
    let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("image");
    let file_name = match input.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}_cropped.{}", stem, ext),
        None => format!("{}_cropped.png", stem),
    };
    output_dir.join(file_name)
}

/// Process every supported image in `options.input_dir`.
///
/// A failure on one file is logged and recorded in the summary; only
/// problems with the folders themselves abort the run.
pub fn run(options: &BatchOptions, detector: &RegionDetector) -> Result<BatchSummary> {
    let inputs = collect_inputs(&options.input_dir)?;
    if inputs.is_empty() {
        log::warn!("No supported image files found in {}", options.input_dir.display());
    } else {
        log::info!("Found {} files to process", inputs.len());
    }

    std::fs::create_dir_all(&options.output_dir).with_context(|| {
        format!("Failed to create output directory {}", options.output_dir.display())
    })?;

    let mut summary = BatchSummary::default();
    for input in inputs {
        let output = cropped_path(&options.output_dir, &input);
        if options.skip_existing && output.exists() {
            log::info!("Skipping {}, output already exists", input.display());
            summary.skipped += 1;
            continue;
        }

        log::info!("Processing {}", input.display());
        match process_file(options, detector, &input, &output) {
            Ok(Detection::Detected(_)) => summary.detected += 1,
            Ok(Detection::Fallback(_)) => summary.fallback += 1,
            Err(e) => {
                log::error!("Failed to process {}: {:#}", input.display(), e);
                summary.failed.push(input);
            }
        }
    }

    Ok(summary)
}

fn process_file(
    options: &BatchOptions,
    detector: &RegionDetector,
    input: &Path,
    output: &Path,
) -> Result<Detection> {
    let img = ImageReader::open(input)?
        .with_guessed_format()?
        .decode()
        .map_err(|e| anyhow::anyhow!("Failed to decode image: {}", e))?
        .to_rgb8();
    log::debug!("Image loaded: {}x{}", img.width(), img.height());

    let started = Instant::now();
    let detection = match &options.steps_dir {
        Some(steps_dir) => {
            let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("image");
            let mut sink = DirectorySink::new(steps_dir.join(format!("{}_debug", stem)));
            detector.detect_with_sink(&img, &mut sink)?
        }
        None => detector.detect(&img)?,
    };
    log::debug!("Contour detection finished in {:.2?}", started.elapsed());

    if detection.is_fallback() {
        log::warn!("No drawing box found in {}, saving the full image", input.display());
    }

    let mut cropped = postprocess::crop(&img, detection.bbox());
    if let Some(block_size) = options.simplify_blocks {
        cropped = postprocess::simplify_blocks(&cropped, block_size)?;
    }
    cropped
        .save(output)
        .map_err(|e| anyhow::anyhow!("Failed to save {}: {}", output.display(), e))?;
    log::info!("Saved {}", output.display());

    Ok(detection)
}
