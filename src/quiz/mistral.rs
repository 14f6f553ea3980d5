use crate::config::LlmSettings;
use crate::error::{Error, ErrorType, Result};
use crate::logging::{log_debug, log_error};
use serde::{Deserialize, Serialize};

/// Сообщение чата
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Запрос к chat completions API
#[derive(Debug, Clone, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Клиент Mistral chat completions API
pub struct MistralClient {
    api_key: String,
    settings: LlmSettings,
    client: reqwest::Client,
}

impl MistralClient {
    pub fn new(api_key: String, settings: LlmSettings) -> Self {
        Self {
            api_key,
            settings,
            client: reqwest::Client::new(),
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.settings.endpoint.trim_end_matches('/'))
    }

    /// Отправляет промпт одним сообщением пользователя и возвращает текст ответа
    pub async fn complete(&self, prompt: &str) -> Result<String> {
        log_debug(&format!(
            "LLM запрос: модель {}, {} символов промпта",
            self.settings.model,
            prompt.chars().count()
        ));

        let request = ChatRequest {
            model: &self.settings.model,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
            top_p: self.settings.top_p,
        };

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::new(
                ErrorType::Llm,
                &format!("Ошибка при отправке запроса к LLM API: {}", e),
            ))?;

        let status = response.status();
        log_debug(&format!("Получен ответ от LLM API, статус: {}", status));

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Не удалось получить текст ошибки".to_string());
            let _ = log_error::<(), _>(&error_text, &format!("LLM API вернул ошибку {}", status));
            return Err(Error::new(
                ErrorType::Llm,
                &format!("{}. {}", status, error_text),
            ));
        }

        let body: ChatResponse = response.json().await.map_err(|e| {
            Error::new(ErrorType::Llm, &format!("Неожиданный формат ответа LLM: {}", e))
        })?;

        body.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| Error::new(ErrorType::Llm, "Пустой список choices в ответе LLM"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completions_url_trims_slash() {
        let settings = LlmSettings {
            endpoint: "https://api.mistral.ai/".to_string(),
            ..LlmSettings::default()
        };
        let client = MistralClient::new("key".to_string(), settings);
        assert_eq!(client.completions_url(), "https://api.mistral.ai/v1/chat/completions");
    }

    #[test]
    fn test_request_serialization() {
        let request = ChatRequest {
            model: "open-mistral-nemo",
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: "Bonjour".to_string(),
            }],
            temperature: 0.7,
            max_tokens: 2000,
            top_p: 0.95,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "open-mistral-nemo");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["max_tokens"], 2000);
    }

    #[test]
    fn test_response_deserialization() {
        let raw = r#"{"id": "x", "choices": [{"index": 0, "message": {"role": "assistant", "content": "{}"}}]}"#;
        let response: ChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.choices[0].message.content, "{}");
    }
}
