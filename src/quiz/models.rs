use crate::error::{Error, Result};
use crate::logging::{log_debug, log_info};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// Максимальная длина текста вопроса
pub const MAX_QUESTION_LEN: usize = 200;

/// Ключи вариантов ответа
pub const CHOICE_KEYS: [&str; 4] = ["1", "2", "3", "4"];

/// Вопрос с четырьмя вариантами ответа (QCM)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Текст вопроса
    pub question: String,
    /// Варианты ответа с ключами "1".."4"
    pub choices: BTreeMap<String, String>,
    /// Ключ правильного варианта
    pub answer: String,
}

impl Question {
    pub fn new(question: &str, choices: [&str; 4], answer: &str) -> Self {
        let choices = CHOICE_KEYS
            .iter()
            .zip(choices.iter())
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        Self {
            question: question.to_string(),
            choices,
            answer: answer.to_string(),
        }
    }

    /// Проверяет формат и содержимое вопроса
    pub fn validate(&self) -> Result<()> {
        if self.question.trim().is_empty() {
            return Err(Error::InvalidParameters("question text is empty".to_string()));
        }
        if self.question.chars().count() > MAX_QUESTION_LEN {
            return Err(Error::InvalidParameters(format!(
                "question longer than {} characters",
                MAX_QUESTION_LEN
            )));
        }
        if self.choices.len() != CHOICE_KEYS.len() {
            return Err(Error::InvalidParameters(format!(
                "expected 4 choices, got {}",
                self.choices.len()
            )));
        }
        if let Some(missing) = CHOICE_KEYS.iter().find(|k| !self.choices.contains_key(**k)) {
            return Err(Error::InvalidParameters(format!("choice \"{}\" is missing", missing)));
        }
        if !CHOICE_KEYS.contains(&self.answer.as_str()) {
            return Err(Error::InvalidParameters(format!(
                "answer must be one of 1-4, got \"{}\"",
                self.answer
            )));
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Текст правильного варианта
    pub fn correct_choice(&self) -> Option<&str> {
        self.choices.get(&self.answer).map(String::as_str)
    }

    /// Номер правильного варианта (1..=4)
    pub fn answer_index(&self) -> Option<usize> {
        CHOICE_KEYS.iter().position(|k| *k == self.answer).map(|i| i + 1)
    }

    /// Варианты в порядке "1".."4"
    pub fn ordered_choices(&self) -> Vec<(&str, &str)> {
        CHOICE_KEYS
            .iter()
            .filter_map(|k| self.choices.get(*k).map(|v| (*k, v.as_str())))
            .collect()
    }
}

/// Набор вопросов в формате `{ "questions": [...] }`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionSet {
    pub questions: Vec<Question>,
}

impl QuestionSet {
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Удаляет повторы пары (вопрос, ответ), сохраняя первое вхождение.
    /// Возвращает число удаленных вопросов.
    pub fn dedup(&mut self) -> usize {
        let before = self.questions.len();
        let mut seen: HashSet<(String, String)> = HashSet::new();
        self.questions
            .retain(|q| seen.insert((q.question.clone(), q.answer.clone())));
        let removed = before - self.questions.len();
        log_debug(&format!("Удалено дубликатов: {} из {}", removed, before));
        removed
    }

    /// Загружает набор вопросов из JSON файла
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let value: serde_json::Value = serde_json::from_str(&content)?;
        if value.get("questions").map(|q| q.is_array()) != Some(true) {
            return Err(Error::InvalidParameters(format!(
                "{}: missing \"questions\" array",
                path.as_ref().display()
            )));
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Сохраняет набор вопросов в JSON файл (с отступами, без экранирования не-ASCII)
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        log_info(&format!(
            "Сохранено {} вопросов в {}",
            self.questions.len(),
            path.as_ref().display()
        ));
        Ok(())
    }
}
