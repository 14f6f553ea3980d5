mod tracker;

pub use tracker::{ChildProgressTracker, PipelineStage, ProgressCallback, ProgressTracker};
