pub mod preprocessing;
pub mod contours;
pub mod filters;

use anyhow::Result;
use image::RgbImage;
use log::Level;

use crate::diagnostics::{self, Artifact, ArtifactImage, DiagnosticsSink, NoopSink, ALL_CONTOURS_COLOR};
use crate::models::{BoundingBox, Detection};

/// Default lower hysteresis threshold for Canny
pub const DEFAULT_LOW_THRESHOLD: f32 = 50.0;
/// Default upper hysteresis threshold for Canny
pub const DEFAULT_HIGH_THRESHOLD: f32 = 150.0;

/// Locates the main rectangular drawing region of an image.
///
/// Grayscale, 5x5 blur, Canny, border tracing, then a greedy area-ranked
/// filter chain (see [`filters`]). A miss returns the full-image box as
/// [`Detection::Fallback`].
#[derive(Debug, Clone)]
pub struct RegionDetector {
    pub low_threshold: f32,
    pub high_threshold: f32,
    pub verbose: bool,
}

impl RegionDetector {
    pub fn new() -> Self {
        Self {
            low_threshold: DEFAULT_LOW_THRESHOLD,
            high_threshold: DEFAULT_HIGH_THRESHOLD,
            verbose: false,
        }
    }

    pub fn with_thresholds(mut self, low: f32, high: f32) -> Self {
        self.low_threshold = low;
        self.high_threshold = high;
        self
    }

    /// Log progress at `Info` instead of `Debug`
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    fn progress_level(&self) -> Level {
        if self.verbose { Level::Info } else { Level::Debug }
    }

    /// Run detection without diagnostics
    pub fn detect(&self, img: &RgbImage) -> Result<Detection> {
        self.detect_with_sink(img, &mut NoopSink)
    }

    /// Run detection, emitting intermediate images to `sink`.
    ///
    /// Sink failures are logged and never change the result. Errors only for
    /// an empty image, before the sink is touched.
    pub fn detect_with_sink(&self, img: &RgbImage, sink: &mut dyn DiagnosticsSink) -> Result<Detection> {
        let (width, height) = img.dimensions();
        if width == 0 || height == 0 {
            anyhow::bail!("Cannot detect a region in an empty {}x{} image", width, height);
        }

        let level = self.progress_level();
        let emit = sink.is_enabled();
        if emit {
            if let Err(e) = sink.clear() {
                log::warn!("Failed to clear diagnostics: {:#}", e);
            }
        }

        log::log!(level, "Detecting drawing region in {}x{} image", width, height);

        // Step 1: Preprocess image
        let gray = preprocessing::to_grayscale(img);
        if emit {
            diagnostics::record(sink, Artifact::Gray, ArtifactImage::Luma(&gray));
        }

        let blurred = preprocessing::apply_blur(&gray);
        if emit {
            diagnostics::record(sink, Artifact::Blurred, ArtifactImage::Luma(&blurred));
        }

        // Step 2: Detect edges
        let edges = preprocessing::detect_edges(&blurred, self.low_threshold, self.high_threshold);
        if emit {
            diagnostics::record(sink, Artifact::Edges, ArtifactImage::Luma(&edges));
        }

        // Step 3: Find contours
        let all_contours = contours::find_contours(&edges);
        log::log!(level, "Found {} contours", all_contours.len());
        if emit {
            let overlay = diagnostics::draw_contours(img, &all_contours, ALL_CONTOURS_COLOR);
            diagnostics::record(sink, Artifact::AllContours, ArtifactImage::Rgb(&overlay));
        }

        // Step 4: Filter for the drawing box
        match filters::select_candidate(all_contours, width, height) {
            Some(candidate) => {
                let bbox = candidate.bbox;
                log::log!(
                    level,
                    "Selected box x={}, y={}, w={}, h={} (area {:.0}, rank {})",
                    bbox.x, bbox.y, bbox.width, bbox.height, candidate.area, candidate.rank
                );
                if emit {
                    let overlay = diagnostics::draw_chosen(img, &candidate.contour, bbox);
                    diagnostics::record(sink, Artifact::ChosenContour, ArtifactImage::Rgb(&overlay));
                }
                Ok(Detection::Detected(bbox))
            }
            None => {
                log::log!(
                    level,
                    "No suitable large rectangular contour found, falling back to full image"
                );
                Ok(Detection::Fallback(BoundingBox::full(width, height)))
            }
        }
    }
}

impl Default for RegionDetector {
    fn default() -> Self {
        Self::new()
    }
}
