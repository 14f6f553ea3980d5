use crate::error::Result;
use std::future::Future;

mod engine;
mod narration;
mod openai;

pub use engine::{QuestionAudio, TtsEngine};
pub use narration::NarrationScript;
pub use openai::{
    OpenAiAudioFormat, OpenAiTts, OpenAiTtsModel, OpenAiVoice, TtsOptions, TtsSegment,
};

/// Интерфейс для TTS провайдеров
pub trait TtsProvider: Send + Sync {
    /// Генерирует TTS для текста
    fn generate_speech(&self, text: &str) -> impl Future<Output = Result<Vec<u8>>>;

    /// Генерирует озвученный фрагмент
    fn generate_segment(&self, text: &str) -> impl Future<Output = Result<TtsSegment>>;
}

impl TtsProvider for OpenAiTts {
    fn generate_speech(&self, text: &str) -> impl Future<Output = Result<Vec<u8>>> {
        self.generate_speech(text)
    }

    fn generate_segment(&self, text: &str) -> impl Future<Output = Result<TtsSegment>> {
        self.generate_segment(text)
    }
}
