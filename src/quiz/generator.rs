use crate::error::{Error, Result};
use crate::logging::{log_debug, log_info, log_warning};
use crate::quiz::models::Question;
use crate::quiz::parser::{build_prompt, parse_questions};
use crate::quiz::LlmProvider;

/// Генератор вопросов через LLM с повторной генерацией при невалидном ответе
pub struct QuestionGenerator<'a, L: LlmProvider> {
    provider: &'a L,
    num_questions: usize,
    max_attempts: u32,
}

impl<'a, L: LlmProvider> QuestionGenerator<'a, L> {
    pub fn new(provider: &'a L, num_questions: usize, max_attempts: u32) -> Self {
        Self {
            provider,
            num_questions,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Генерирует вопросы по теме.
    ///
    /// Ошибки транспорта прерывают генерацию сразу; ответ, который не удалось
    /// разобрать, приводит к новому запросу, пока не исчерпаны попытки.
    pub async fn generate(&self, theme: &str) -> Result<Vec<Question>> {
        let prompt = build_prompt(theme, self.num_questions);
        let mut last_error = String::new();

        for attempt in 1..=self.max_attempts {
            log_info(&format!(
                "Генерация вопросов по теме '{}', попытка {}/{}",
                theme, attempt, self.max_attempts
            ));

            let response = self.provider.complete(&prompt).await?;
            log_debug(&format!("Ответ LLM: {} символов", response.chars().count()));

            match parse_questions(&response) {
                Ok(mut questions) => {
                    if questions.len() < self.num_questions {
                        log_warning(&format!(
                            "Получено {} валидных вопросов вместо {}",
                            questions.len(),
                            self.num_questions
                        ));
                    }
                    questions.truncate(self.num_questions);
                    log_info(&format!("{} вопросов сгенерировано", questions.len()));
                    return Ok(questions);
                }
                Err(e) => {
                    log_warning(&format!("Невалидный ответ LLM (попытка {}): {}", attempt, e));
                    last_error = e.to_string();
                }
            }
        }

        Err(Error::QuestionGeneration(format!(
            "no valid questions after {} attempts: {}",
            self.max_attempts, last_error
        )))
    }
}
