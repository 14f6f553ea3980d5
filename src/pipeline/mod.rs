pub mod core;

pub use self::core::{EpisodePlan, MediaAssets, PipelineCore, SUBTITLES_FILE};
