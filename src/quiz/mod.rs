use crate::error::Result;
use std::future::Future;

mod generator;
mod mistral;
pub mod models;
pub mod parser;

pub use generator::QuestionGenerator;
pub use mistral::{ChatMessage, MistralClient};
pub use models::{Question, QuestionSet};
pub use parser::{build_prompt, extract_json_object, parse_questions};

/// Интерфейс для LLM провайдеров
pub trait LlmProvider: Send + Sync {
    /// Возвращает текст ответа модели на промпт
    fn complete(&self, prompt: &str) -> impl Future<Output = Result<String>>;
}

impl LlmProvider for MistralClient {
    fn complete(&self, prompt: &str) -> impl Future<Output = Result<String>> {
        self.complete(prompt)
    }
}
