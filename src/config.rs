//! Настройки генератора.
//!
//! Загружаются из `config/settings.json`. Ключи API берутся из окружения
//! (файл `.env` подхватывается через `dotenvy`).

use crate::error::{Error, Result};
use crate::logging::{log_debug, log_info};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Путь к файлу настроек по умолчанию
pub const DEFAULT_SETTINGS_PATH: &str = "config/settings.json";

/// Настройки LLM
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Базовый адрес API
    pub endpoint: String,
    /// Модель
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
    /// Максимальное число попыток получить валидный JSON
    pub max_attempts: u32,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://api.mistral.ai".to_string(),
            model: "open-mistral-nemo".to_string(),
            temperature: 0.7,
            max_tokens: 2000,
            top_p: 0.95,
            max_attempts: 3,
        }
    }
}

/// Настройки синтеза речи
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TtsSettings {
    pub model: String,
    pub voice: String,
    /// Скорость речи (0.25 - 4.0)
    pub speed: f32,
    /// Фраза перед объявлением правильного ответа
    pub answer_prefix: String,
}

impl Default for TtsSettings {
    fn default() -> Self {
        Self {
            model: "tts-1".to_string(),
            voice: "onyx".to_string(),
            speed: 1.0,
            answer_prefix: "La réponse est : ".to_string(),
        }
    }
}

/// Параметры видео
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoSettings {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    /// Длительность таймера между вопросом и ответом, в секундах
    pub timer_duration: f64,
    pub question_font_size: u32,
    pub choice_font_size: u32,
    /// Вертикальный отступ между блоками текста
    pub spacing: u32,
    /// Внутренний отступ блока текста
    pub box_padding: u32,
    pub font_path: String,
    /// Громкость фоновой музыки (1.0 - без изменений)
    pub music_volume: f32,
    pub video_codec: String,
    pub audio_codec: String,
    pub preset: String,
    pub threads: u32,
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self {
            width: 1080,
            height: 1920,
            fps: 30,
            timer_duration: 3.0,
            question_font_size: 90,
            choice_font_size: 70,
            spacing: 110,
            box_padding: 30,
            font_path: "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf".to_string(),
            music_volume: 0.1,
            video_codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
            preset: "ultrafast".to_string(),
            threads: 8,
        }
    }
}

/// Настройки субтитров
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SubtitleSettings {
    /// Вжигать ли субтитры в итоговое видео
    pub enabled: bool,
    /// Один субтитр на слово
    pub word_by_word: bool,
    pub font_size: u32,
}

impl Default for SubtitleSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            word_by_word: true,
            font_size: 18,
        }
    }
}

/// Расположение ресурсов
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    pub backgrounds: PathBuf,
    pub music: PathBuf,
    pub sound_effects: PathBuf,
    pub temp: PathBuf,
    pub generated: PathBuf,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            backgrounds: PathBuf::from("assets/backgrounds"),
            music: PathBuf::from("assets/music"),
            sound_effects: PathBuf::from("assets/sound_effects"),
            temp: PathBuf::from("assets/temp"),
            generated: PathBuf::from("assets/generated"),
        }
    }
}

/// Куда сохранять готовое видео
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageProvider {
    Local,
    Gcs,
}

impl Default for StorageProvider {
    fn default() -> Self {
        Self::Local
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub provider: StorageProvider,
    pub local_path: PathBuf,
    pub bucket: Option<String>,
    /// Префикс имени объекта в бакете
    pub prefix: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            provider: StorageProvider::Local,
            local_path: PathBuf::from("assets/generated"),
            bucket: None,
            prefix: "videos/".to_string(),
        }
    }
}

/// Поиск фонового видео
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundSettings {
    pub pexels_endpoint: String,
    /// Добавляется к теме в поисковом запросе
    pub search_query_suffix: String,
    /// Минимальная желаемая высота кадра
    pub min_height: u32,
}

impl Default for BackgroundSettings {
    fn default() -> Self {
        Self {
            pexels_endpoint: "https://api.pexels.com".to_string(),
            search_query_suffix: String::new(),
            min_height: 1920,
        }
    }
}

/// Все настройки генератора
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub themes: Vec<String>,
    pub num_questions: usize,
    pub llm: LlmSettings,
    pub tts: TtsSettings,
    pub video: VideoSettings,
    pub subtitles: SubtitleSettings,
    pub paths: PathSettings,
    pub storage: StorageSettings,
    pub background: BackgroundSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            themes: Vec::new(),
            num_questions: 6,
            llm: LlmSettings::default(),
            tts: TtsSettings::default(),
            video: VideoSettings::default(),
            subtitles: SubtitleSettings::default(),
            paths: PathSettings::default(),
            storage: StorageSettings::default(),
            background: BackgroundSettings::default(),
        }
    }
}

impl Settings {
    /// Загружает настройки из JSON файла
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        log_debug(&format!("Загрузка настроек из {}", path.display()));

        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read {}: {}", path.display(), e))
        })?;

        let settings = Self::from_json(&content)?;
        log_info(&format!(
            "Настройки загружены: {} тем, {} вопросов на видео",
            settings.themes.len(),
            settings.num_questions
        ));
        Ok(settings)
    }

    /// Разбирает настройки из строки JSON и проверяет их
    pub fn from_json(content: &str) -> Result<Self> {
        let settings: Settings = serde_json::from_str(content)
            .map_err(|e| Error::Config(format!("invalid settings JSON: {}", e)))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Проверяет согласованность настроек
    pub fn validate(&self) -> Result<()> {
        if self.themes.iter().all(|t| t.trim().is_empty()) {
            return Err(Error::Config("at least one theme is required".to_string()));
        }
        if self.num_questions == 0 {
            return Err(Error::Config("num_questions must be at least 1".to_string()));
        }
        if self.llm.max_attempts == 0 {
            return Err(Error::Config("llm.max_attempts must be at least 1".to_string()));
        }
        if self.video.width == 0 || self.video.height == 0 || self.video.fps == 0 {
            return Err(Error::Config("video dimensions and fps must be positive".to_string()));
        }
        let fonts = [self.video.question_font_size, self.video.choice_font_size];
        if fonts.iter().any(|size| *size == 0 || *size > self.video.height) {
            return Err(Error::Config(format!(
                "font sizes must be between 1 and the frame height: {:?}",
                fonts
            )));
        }
        if self.video.box_padding.saturating_mul(2) >= self.video.width {
            return Err(Error::Config(format!(
                "video.box_padding {} leaves no room for text",
                self.video.box_padding
            )));
        }
        if !(self.video.timer_duration > 0.0) {
            return Err(Error::Config("video.timer_duration must be positive".to_string()));
        }
        if !(0.25..=4.0).contains(&self.tts.speed) {
            return Err(Error::Config(format!("tts.speed out of range: {}", self.tts.speed)));
        }
        if self.storage.provider == StorageProvider::Gcs && self.storage.bucket.is_none() {
            return Err(Error::Config("storage.bucket is required for gcs".to_string()));
        }
        Ok(())
    }

    /// Создает рабочие каталоги, если их нет
    pub fn ensure_directories(&self) -> Result<()> {
        let directories = [
            &self.paths.backgrounds,
            &self.paths.music,
            &self.paths.temp,
            &self.paths.generated,
            &self.storage.local_path,
        ];
        for directory in directories {
            std::fs::create_dir_all(directory)?;
        }
        log_debug("Рабочие каталоги созданы");
        Ok(())
    }
}

/// Ключи внешних API
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    pub mistral: Option<String>,
    pub openai: Option<String>,
    pub pexels: Option<String>,
    pub gcs_token: Option<String>,
}

impl ApiKeys {
    /// Читает ключи из окружения, предварительно подгрузив `.env`
    pub fn from_env() -> Self {
        if dotenvy::dotenv().is_ok() {
            log_debug("Переменные окружения загружены из .env");
        }
        Self {
            mistral: non_empty_var("MISTRAL_API_KEY"),
            openai: non_empty_var("OPENAI_API_KEY"),
            pexels: non_empty_var("PEXELS_API_KEY"),
            gcs_token: non_empty_var("GCS_ACCESS_TOKEN"),
        }
    }

    /// Возвращает ключ или ошибку конфигурации с именем переменной
    pub fn require<'a>(key: &'a Option<String>, name: &str) -> Result<&'a str> {
        key.as_deref()
            .ok_or_else(|| Error::Config(format!("environment variable {} is not set", name)))
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_settings_use_defaults() {
        let settings = Settings::from_json(r#"{"themes": ["Histoire"]}"#).unwrap();
        assert_eq!(settings.num_questions, 6);
        assert_eq!(settings.video.width, 1080);
        assert_eq!(settings.video.height, 1920);
        assert_eq!(settings.video.timer_duration, 3.0);
        assert_eq!(settings.llm.model, "open-mistral-nemo");
        assert_eq!(settings.storage.provider, StorageProvider::Local);
        assert!(settings.subtitles.word_by_word);
    }

    #[test]
    fn test_empty_themes_rejected() {
        assert!(Settings::from_json(r#"{"themes": []}"#).is_err());
        assert!(Settings::from_json(r#"{"themes": ["  "]}"#).is_err());
    }

    #[test]
    fn test_gcs_requires_bucket() {
        let json = r#"{"themes": ["Art"], "storage": {"provider": "gcs"}}"#;
        assert!(matches!(Settings::from_json(json), Err(Error::Config(_))));

        let json = r#"{"themes": ["Art"], "storage": {"provider": "gcs", "bucket": "quiz"}}"#;
        let settings = Settings::from_json(json).unwrap();
        assert_eq!(settings.storage.bucket.as_deref(), Some("quiz"));
    }

    #[test]
    fn test_require_missing_key() {
        let keys = ApiKeys::default();
        let err = ApiKeys::require(&keys.mistral, "MISTRAL_API_KEY").unwrap_err();
        assert!(err.to_string().contains("MISTRAL_API_KEY"));
    }
}
