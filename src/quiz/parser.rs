use crate::error::{Error, Result};
use crate::logging::{log_debug, log_warning};
use crate::quiz::models::Question;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

static BLOCK_TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<(style|script)[^>]*>.*?</(style|script)>").expect("valid regex")
});
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"</?[a-zA-Z][^<>]*>").expect("valid regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Извлекает первый JSON объект из ответа модели.
///
/// Ответ может содержать пояснения до и после JSON, markdown-ограждения и HTML.
/// Фигурные скобки внутри строк JSON не учитываются при поиске конца объекта.
pub fn extract_json_object(text: &str) -> Result<String> {
    let text = text.trim();

    let start = text
        .find('{')
        .ok_or_else(|| Error::QuestionGeneration("no JSON object in response".to_string()))?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    let mut end = None;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    end = Some(start + offset);
                    break;
                }
            }
            _ => {}
        }
    }

    let end = end.ok_or_else(|| Error::QuestionGeneration("invalid JSON format".to_string()))?;
    let raw = &text[start..=end];

    let cleaned = BLOCK_TAG_RE.replace_all(raw, "");
    let cleaned = TAG_RE.replace_all(&cleaned, "");
    let cleaned = WHITESPACE_RE.replace_all(&cleaned, " ");

    log_debug(&format!("Извлечен JSON ({} символов)", cleaned.len()));
    Ok(cleaned.into_owned())
}

/// Разбирает ответ модели в список валидных вопросов.
///
/// Невалидные вопросы отбрасываются; если не осталось ни одного, возвращается ошибка.
pub fn parse_questions(response: &str) -> Result<Vec<Question>> {
    let json = extract_json_object(response)?;
    let value: serde_json::Value = serde_json::from_str(&json)?;

    let items = value
        .get("questions")
        .and_then(|q| q.as_array())
        .ok_or_else(|| {
            Error::QuestionGeneration("invalid response: 'questions' must be a list".to_string())
        })?;

    let mut questions = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        match question_from_value(item) {
            Some(question) => questions.push(question),
            None => log_warning(&format!("Вопрос {} отклонен: неверный формат", i + 1)),
        }
    }

    if questions.is_empty() {
        return Err(Error::QuestionGeneration("no valid question generated".to_string()));
    }

    Ok(questions)
}

/// Строит вопрос из JSON значения; ответ может прийти строкой или числом
fn question_from_value(value: &serde_json::Value) -> Option<Question> {
    let text = value.get("question")?.as_str()?.trim().to_string();
    let answer = match value.get("answer")? {
        serde_json::Value::String(s) => s.trim().to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        _ => return None,
    };

    let mut choices = BTreeMap::new();
    for (key, choice) in value.get("choices")?.as_object()? {
        choices.insert(key.trim().to_string(), choice.as_str()?.trim().to_string());
    }

    let question = Question {
        question: text,
        choices,
        answer,
    };
    question.is_valid().then_some(question)
}

/// Промпт для генерации вопросов по теме
pub fn build_prompt(theme: &str, num_questions: usize) -> String {
    format!(
        r#"Génère {n} questions de type QCM sur le thème de '{theme}'.

Pour chaque question :
- Propose 4 choix de réponse numérotés ("1", "2", "3", "4").
- Indique laquelle est la bonne réponse.
- La réponse doit être correcte et vérifiable scientifiquement.
- Les questions doivent être variées et couvrir différents aspects du thème.
- Une question ne doit pas dépasser 200 caractères.

Le format de sortie doit être strictement en JSON comme ceci :

{{
  "questions": [
    {{
      "question": "Texte de la question",
      "choices": {{
        "1": "Choix 1",
        "2": "Choix 2",
        "3": "Choix 3",
        "4": "Choix 4"
      }},
      "answer": "3"
    }}
  ]
}}

A toi de me donner le QCM en JSON :"#,
        n = num_questions,
        theme = theme
    )
}
