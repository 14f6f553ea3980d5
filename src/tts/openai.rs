use crate::config::TtsSettings;
use crate::error::{Error, ErrorType, Result};
use crate::logging::{log_debug, log_error, log_warning};
use serde::{Deserialize, Serialize};

const SPEECH_URL: &str = "https://api.openai.com/v1/audio/speech";

/// Модели голосов OpenAI TTS
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpenAiVoice {
    /// Alloy: универсальный голос с нейтральным тоном
    Alloy,
    /// Echo: голос с низким тоном и ясной артикуляцией
    Echo,
    /// Fable: выразительный голос, подходящий для повествования
    Fable,
    /// Onyx: глубокий мужской голос
    Onyx,
    /// Nova: женский голос с мягким тоном
    Nova,
    /// Shimmer: молодой женский голос с ясной артикуляцией
    Shimmer,
}

impl Default for OpenAiVoice {
    fn default() -> Self {
        Self::Onyx
    }
}

impl OpenAiVoice {
    /// Возвращает строковое представление голоса
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Alloy => "alloy",
            Self::Echo => "echo",
            Self::Fable => "fable",
            Self::Onyx => "onyx",
            Self::Nova => "nova",
            Self::Shimmer => "shimmer",
        }
    }

    /// Создает OpenAiVoice из строки
    pub fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "alloy" => Ok(Self::Alloy),
            "echo" => Ok(Self::Echo),
            "fable" => Ok(Self::Fable),
            "onyx" => Ok(Self::Onyx),
            "nova" => Ok(Self::Nova),
            "shimmer" => Ok(Self::Shimmer),
            _ => Err(Error::InvalidParameters(format!("Unknown voice: {}", s))),
        }
    }
}

/// Модели для TTS OpenAI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpenAiTtsModel {
    /// tts-1: стандартная модель TTS
    #[serde(rename = "tts-1")]
    Tts1,
    /// tts-1-hd: модель TTS высокого качества
    #[serde(rename = "tts-1-hd")]
    Tts1Hd,
}

impl Default for OpenAiTtsModel {
    fn default() -> Self {
        Self::Tts1
    }
}

impl OpenAiTtsModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tts1 => "tts-1",
            Self::Tts1Hd => "tts-1-hd",
        }
    }

    pub fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "tts-1" => Ok(Self::Tts1),
            "tts-1-hd" => Ok(Self::Tts1Hd),
            _ => Err(Error::InvalidParameters(format!("Unknown model: {}", s))),
        }
    }
}

/// Формат аудио для OpenAI TTS.
///
/// Длительность озвучки измеряется декодером MP3, поэтому для видео
/// используется только `Mp3`; остальные форматы годятся для сохранения в файл.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpenAiAudioFormat {
    Mp3,
    Aac,
    Flac,
    Opus,
    Wav,
}

impl Default for OpenAiAudioFormat {
    fn default() -> Self {
        Self::Mp3
    }
}

impl OpenAiAudioFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Aac => "aac",
            Self::Flac => "flac",
            Self::Opus => "opus",
            Self::Wav => "wav",
        }
    }
}

/// Настройки для генерации TTS
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtsOptions {
    pub model: OpenAiTtsModel,
    pub voice: OpenAiVoice,
    /// Скорость речи (0.25 - 4.0)
    pub speed: f32,
    pub response_format: OpenAiAudioFormat,
}

impl Default for TtsOptions {
    fn default() -> Self {
        Self {
            model: OpenAiTtsModel::default(),
            voice: OpenAiVoice::default(),
            speed: 1.0,
            response_format: OpenAiAudioFormat::default(),
        }
    }
}

impl TtsOptions {
    /// Собирает опции из настроек приложения
    pub fn from_settings(settings: &TtsSettings) -> Result<Self> {
        Ok(Self {
            model: OpenAiTtsModel::from_str(&settings.model)?,
            voice: OpenAiVoice::from_str(&settings.voice)?,
            speed: settings.speed,
            response_format: OpenAiAudioFormat::Mp3,
        })
    }
}

/// Запрос к OpenAI TTS API
#[derive(Debug, Clone, Serialize)]
struct TtsRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    response_format: &'a str,
    speed: f32,
}

/// Озвученный фрагмент текста
#[derive(Debug, Clone)]
pub struct TtsSegment {
    /// Текст фрагмента
    pub text: String,
    /// Аудио данные (MP3)
    pub audio_data: Vec<u8>,
    /// Длительность аудио в секундах, если провайдер ее знает
    pub duration: Option<f64>,
}

/// Клиент для работы с OpenAI TTS API
pub struct OpenAiTts {
    api_key: String,
    options: TtsOptions,
    client: reqwest::Client,
}

impl OpenAiTts {
    pub fn new(api_key: String, options: TtsOptions) -> Self {
        Self {
            api_key,
            options,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_api_key(api_key: String) -> Self {
        Self::new(api_key, TtsOptions::default())
    }

    pub fn options(&self) -> &TtsOptions {
        &self.options
    }

    /// Генерирует речь для указанного текста
    pub async fn generate_speech(&self, text: &str) -> Result<Vec<u8>> {
        if text.trim().is_empty() {
            return Err(Error::new(ErrorType::Tts, "Пустой текст для озвучки"));
        }

        log_debug(&format!(
            "OpenAI TTS запрос: {} символов, голос {}, модель {}",
            text.chars().count(),
            self.options.voice.as_str(),
            self.options.model.as_str()
        ));

        let request = TtsRequest {
            model: self.options.model.as_str(),
            input: text,
            voice: self.options.voice.as_str(),
            response_format: self.options.response_format.as_str(),
            speed: self.options.speed,
        };

        let response = self
            .client
            .post(SPEECH_URL)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::new(
                ErrorType::Tts,
                &format!("Ошибка при отправке запроса к OpenAI TTS API: {}", e),
            ))?;

        let status = response.status();
        log_debug(&format!("Получен ответ от OpenAI API, статус: {}", status));

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Не удалось получить текст ошибки".to_string());

            let _ = log_error::<(), _>(&error_text, &format!("OpenAI API вернул ошибку: {}", status));

            return Err(Error::new(
                ErrorType::Tts,
                &format!("Ошибка OpenAI API: {}. {}", status, error_text),
            ));
        }

        let audio_data = response.bytes().await.map_err(|e| Error::new(
            ErrorType::Tts,
            &format!("Ошибка при получении данных от OpenAI TTS API: {}", e),
        ))?;

        let bytes = audio_data.to_vec();
        if bytes.len() < 100 {
            log_warning(&format!(
                "Получены подозрительно малые данные от OpenAI TTS: {} байт",
                bytes.len()
            ));
        } else {
            log_debug(&format!("Получено {} байт аудио от OpenAI TTS API", bytes.len()));
        }

        Ok(bytes)
    }

    /// Генерирует сегмент; длительность определяется позже декодером
    pub async fn generate_segment(&self, text: &str) -> Result<TtsSegment> {
        let audio_data = self.generate_speech(text).await?;

        Ok(TtsSegment {
            text: text.to_string(),
            audio_data,
            duration: None,
        })
    }
}
