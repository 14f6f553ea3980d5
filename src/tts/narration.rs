use crate::error::{Error, Result};
use crate::quiz::Question;

/// Тексты озвучки одного вопроса
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NarrationScript {
    /// Вопрос и варианты ответа, каждый на своей строке
    pub question: String,
    /// Объявление правильного ответа
    pub answer: String,
}

impl NarrationScript {
    pub fn for_question(question: &Question, answer_prefix: &str) -> Result<Self> {
        question.validate()?;

        let mut text = format!("{}\n", question.question);
        for (key, choice) in question.ordered_choices() {
            text.push_str(&format!("{}. {}\n", key, choice));
        }

        let correct = question
            .correct_choice()
            .ok_or_else(|| Error::InvalidParameters(format!("no choice for answer {}", question.answer)))?;
        let answer = format!("{}{}", answer_prefix, correct);

        Ok(Self {
            question: text,
            answer,
        })
    }
}
