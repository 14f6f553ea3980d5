pub mod models;
pub mod parser;
pub mod srt;

pub use models::{AudioCue, CueKind, Subtitle, SubtitleTrack};
pub use parser::SrtParser;
pub use srt::SrtGenerator;
