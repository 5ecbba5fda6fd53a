use anyhow::{Context, Result};
use image::{DynamicImage, GrayImage, Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use std::path::{Path, PathBuf};

use crate::models::{BoundingBox, Contour};

/// Color for the overlay of every extracted contour
pub const ALL_CONTOURS_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
/// Color for the outline of the chosen contour
pub const CHOSEN_CONTOUR_COLOR: Rgb<u8> = Rgb([0, 0, 255]);
/// Color for the bounding rectangle of the chosen contour
pub const CHOSEN_BOX_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

/// Named intermediate images, in the order the detector emits them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Artifact {
    Gray,
    Blurred,
    Edges,
    AllContours,
    ChosenContour,
}

impl Artifact {
    pub const ALL: [Artifact; 5] = [
        Artifact::Gray,
        Artifact::Blurred,
        Artifact::Edges,
        Artifact::AllContours,
        Artifact::ChosenContour,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Artifact::Gray => "debug_1_gray",
            Artifact::Blurred => "debug_2_blurred",
            Artifact::Edges => "debug_3_canny_edges",
            Artifact::AllContours => "debug_4_all_contours",
            Artifact::ChosenContour => "debug_5_best_contour_box",
        }
    }
}

/// Borrowed image handed to a sink; single-channel or color
#[derive(Clone, Copy)]
pub enum ArtifactImage<'a> {
    Luma(&'a GrayImage),
    Rgb(&'a RgbImage),
}

impl ArtifactImage<'_> {
    /// Three-channel copy; single-channel images are replicated into each channel
    pub fn to_rgb(&self) -> RgbImage {
        match self {
            ArtifactImage::Luma(img) => DynamicImage::ImageLuma8((*img).clone()).to_rgb8(),
            ArtifactImage::Rgb(img) => (*img).clone(),
        }
    }
}

/// Destination for diagnostic snapshots.
///
/// A sink is cleared once at the start of a detection call and then
/// receives artifacts in a fixed order. Failures are reported to the
/// detector, which logs them and carries on.
pub trait DiagnosticsSink {
    /// Whether the detector should bother building artifacts at all
    fn is_enabled(&self) -> bool {
        true
    }

    /// Remove every artifact left over from a previous call
    fn clear(&mut self) -> Result<()>;

    /// Persist one artifact
    fn write(&mut self, artifact: Artifact, image: ArtifactImage<'_>) -> Result<()>;
}

/// Sink that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl DiagnosticsSink for NoopSink {
    fn is_enabled(&self) -> bool {
        false
    }

    fn clear(&mut self) -> Result<()> {
        Ok(())
    }

    fn write(&mut self, _artifact: Artifact, _image: ArtifactImage<'_>) -> Result<()> {
        Ok(())
    }
}

/// Sink writing `<dir>/<artifact name>.png`.
///
/// `clear` deletes the directory with everything in it and recreates it,
/// so the directory must not be shared with anything else.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    output_dir: PathBuf,
}

impl DirectorySink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn artifact_path(&self, artifact: Artifact) -> PathBuf {
        self.output_dir.join(format!("{}.png", artifact.name()))
    }
}

impl DiagnosticsSink for DirectorySink {
    fn clear(&mut self) -> Result<()> {
        if self.output_dir.exists() {
            std::fs::remove_dir_all(&self.output_dir).with_context(|| {
                format!("Failed to clear debug directory {}", self.output_dir.display())
            })?;
        }
        std::fs::create_dir_all(&self.output_dir).with_context(|| {
            format!("Failed to create debug directory {}", self.output_dir.display())
        })?;
        log::info!("Saving visualization steps to {}", self.output_dir.display());
        Ok(())
    }

    fn write(&mut self, artifact: Artifact, image: ArtifactImage<'_>) -> Result<()> {
        let path = self.artifact_path(artifact);
        image
            .to_rgb()
            .save(&path)
            .map_err(|e| anyhow::anyhow!("Failed to save debug image {}: {}", path.display(), e))?;
        log::debug!("Debug: saved {}", path.display());
        Ok(())
    }
}

/// Sink keeping promoted RGB copies in memory, in write order
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub artifacts: Vec<(Artifact, RgbImage)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.artifacts.iter().map(|(a, _)| a.name()).collect()
    }

    pub fn get(&self, artifact: Artifact) -> Option<&RgbImage> {
        self.artifacts
            .iter()
            .find(|(a, _)| *a == artifact)
            .map(|(_, img)| img)
    }
}

impl DiagnosticsSink for MemorySink {
    fn clear(&mut self) -> Result<()> {
        self.artifacts.clear();
        Ok(())
    }

    fn write(&mut self, artifact: Artifact, image: ArtifactImage<'_>) -> Result<()> {
        self.artifacts.push((artifact, image.to_rgb()));
        Ok(())
    }
}

/// Write an artifact, logging instead of failing
pub(crate) fn record(sink: &mut dyn DiagnosticsSink, artifact: Artifact, image: ArtifactImage<'_>) {
    if let Err(e) = sink.write(artifact, image) {
        log::warn!("Failed to write diagnostic artifact {}: {:#}", artifact.name(), e);
    }
}

/// Copy of `image` with every contour point painted in `color`
pub fn draw_contours(image: &RgbImage, contours: &[Contour], color: Rgb<u8>) -> RgbImage {
    let mut canvas = image.clone();
    for contour in contours {
        paint_points(&mut canvas, contour, color, 1);
    }
    canvas
}

/// Copy of `image` with the chosen contour and its bounding rectangle outlined
pub fn draw_chosen(image: &RgbImage, contour: &Contour, bbox: BoundingBox) -> RgbImage {
    let mut canvas = image.clone();
    paint_points(&mut canvas, contour, CHOSEN_CONTOUR_COLOR, 2);

    // Corners (x, y) and (x + w, y + h), stroked 2px with a second inner outline
    let outer = Rect::at(bbox.x as i32, bbox.y as i32).of_size(bbox.width + 1, bbox.height + 1);
    draw_hollow_rect_mut(&mut canvas, outer, CHOSEN_BOX_COLOR);
    if bbox.width > 1 && bbox.height > 1 {
        let inner = Rect::at(bbox.x as i32 + 1, bbox.y as i32 + 1).of_size(bbox.width - 1, bbox.height - 1);
        draw_hollow_rect_mut(&mut canvas, inner, CHOSEN_BOX_COLOR);
    }
    canvas
}

fn paint_points(canvas: &mut RgbImage, contour: &Contour, color: Rgb<u8>, thickness: i32) {
    let (width, height) = canvas.dimensions();
    let offsets = -(thickness / 2)..thickness - thickness / 2;
    for p in &contour.points {
        for dy in offsets.clone() {
            for dx in offsets.clone() {
                let (x, y) = (p.x + dx, p.y + dy);
                if x >= 0 && y >= 0 && (x as u32) < width && (y as u32) < height {
                    canvas.put_pixel(x as u32, y as u32, color);
                }
            }
        }
    }
}
