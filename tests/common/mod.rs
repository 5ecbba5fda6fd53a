#![allow(dead_code, unused_imports)]

mod fixtures;
pub use fixtures::*;

pub use imageproc::point::Point;

// Re-export commonly used types from drawbox for tests
pub use drawbox::detection::contours::find_contours;
pub use drawbox::detection::filters::{check_candidate, select_candidate, Rejection};
pub use drawbox::{
    Artifact, ArtifactImage, BoundingBox, Contour, Detection, DiagnosticsSink, DirectorySink, MemorySink,
    NoopSink, RegionDetector,
};
