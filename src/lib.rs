pub mod batch;
pub mod detection;
pub mod diagnostics;
pub mod models;
pub mod postprocess;

pub use models::{BoundingBox, Contour, Detection};
pub use detection::RegionDetector;
pub use diagnostics::{
    Artifact, ArtifactImage, DiagnosticsSink, DirectorySink, MemorySink, NoopSink
};
