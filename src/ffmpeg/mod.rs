mod runner;

pub use runner::{reframe_args, EncodeSettings, FfmpegRunner, MediaInfo, ReframeOptions};
