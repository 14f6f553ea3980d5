use std::collections::VecDeque;
use std::future::Future;
use std::sync::Mutex;

use quiz_shorts::{
    error::{Error, Result},
    quiz::{LlmProvider, QuestionGenerator},
};

// Мок LLM, отдающий заранее заданные ответы по очереди
struct ScriptedLlm {
    responses: Mutex<VecDeque<std::result::Result<String, String>>>,
    calls: Mutex<usize>,
}

impl ScriptedLlm {
    fn new(responses: Vec<std::result::Result<&str, &str>>) -> Self {
        Self {
            responses: Mutex::new(
                responses
                    .into_iter()
                    .map(|r| r.map(str::to_string).map_err(str::to_string))
                    .collect(),
            ),
            calls: Mutex::new(0),
        }
    }

    fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

impl LlmProvider for ScriptedLlm {
    fn complete(&self, prompt: &str) -> impl Future<Output = Result<String>> {
        assert!(prompt.contains("QCM"));
        *self.calls.lock().unwrap() += 1;
        let next = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("pas de JSON".to_string()));
        async move { next.map_err(Error::Llm) }
    }
}

const TWO_QUESTIONS: &str = r#"Voici les questions :
```json
{
  "questions": [
    {
      "question": "Quelle planète est la plus proche du Soleil ?",
      "choices": {"1": "Vénus", "2": "Mercure", "3": "Mars", "4": "Terre"},
      "answer": "2"
    },
    {
      "question": "Combien de lunes possède Mars ?",
      "choices": {"1": "Une", "2": "Deux", "3": "Trois", "4": "Aucune"},
      "answer": 2
    }
  ]
}
```"#;

#[tokio::test]
async fn test_retries_after_unparsable_response() {
    let llm = ScriptedLlm::new(vec![Ok("Désolé, je ne peux pas."), Ok(TWO_QUESTIONS)]);
    let generator = QuestionGenerator::new(&llm, 2, 3);

    let questions = generator.generate("l'espace").await.unwrap();

    assert_eq!(llm.calls(), 2);
    assert_eq!(questions.len(), 2);
    assert_eq!(questions[0].correct_choice(), Some("Mercure"));
    assert_eq!(questions[1].answer, "2");
}

#[tokio::test]
async fn test_transport_error_aborts_immediately() {
    let llm = ScriptedLlm::new(vec![Err("503 Service Unavailable"), Ok(TWO_QUESTIONS)]);
    let generator = QuestionGenerator::new(&llm, 2, 3);

    let result = generator.generate("l'espace").await;

    assert!(matches!(result, Err(Error::Llm(_))));
    assert_eq!(llm.calls(), 1);
}

#[tokio::test]
async fn test_gives_up_after_max_attempts() {
    let llm = ScriptedLlm::new(vec![Ok("{\"questions\": 3}"), Ok("{}")]);
    let generator = QuestionGenerator::new(&llm, 2, 2);

    let result = generator.generate("les animaux").await;

    assert!(matches!(result, Err(Error::QuestionGeneration(_))));
    assert_eq!(llm.calls(), 2);
}

#[tokio::test]
async fn test_extra_questions_are_truncated() {
    let llm = ScriptedLlm::new(vec![Ok(TWO_QUESTIONS)]);
    let generator = QuestionGenerator::new(&llm, 1, 3);

    let questions = generator.generate("l'espace").await.unwrap();

    assert_eq!(questions.len(), 1);
    assert_eq!(questions[0].question, "Quelle planète est la plus proche du Soleil ?");
}
