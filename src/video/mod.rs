//! Сборка ролика: раскладка текста, таймер, временная шкала и граф фильтров ffmpeg.

mod composer;
pub mod filter;
pub mod layout;
pub mod timeline;
pub mod timer;

pub use composer::{ComposerScript, RenderJob, SceneSegment, VideoComposer};
pub use layout::{wrap_text, BoxStyle, QuizLayout, TextBox};
pub use timeline::{QuestionSegment, SegmentTimes, Timeline};
pub use timer::CountdownTimer;
