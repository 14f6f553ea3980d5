use thiserror::Error;

/// Типы ошибок, которые могут возникнуть при генерации видео
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorType {
    /// Ошибка ввода/вывода
    Io,
    /// Ошибка конфигурации
    Config,
    /// Ошибка LLM API
    Llm,
    /// Не удалось получить валидные вопросы
    QuestionGeneration,
    /// Ошибка TTS API
    Tts,
    /// Ошибка обработки аудио
    AudioProcessingError,
    /// Ошибка генерации субтитров
    Subtitles,
    /// Ошибка сборки видео
    Video,
    /// Ошибка запуска ffmpeg/ffprobe
    Ffmpeg,
    /// Ошибка получения фонового видео
    Background,
    /// Ошибка сохранения результата
    Storage,
    /// Неверные параметры
    InvalidParameters,
}

/// Ошибки, которые могут возникнуть при генерации видео
#[derive(Debug, Error)]
pub enum Error {
    #[error("Ошибка ввода/вывода: {0}")]
    Io(#[from] std::io::Error),

    #[error("Ошибка конфигурации: {0}")]
    Config(String),

    #[error("Ошибка LLM API: {0}")]
    Llm(String),

    #[error("Ошибка генерации вопросов: {0}")]
    QuestionGeneration(String),

    #[error("Ошибка TTS API: {0}")]
    Tts(String),

    #[error("Ошибка обработки аудио: {0}")]
    AudioProcessing(String),

    #[error("Ошибка субтитров: {0}")]
    Subtitles(String),

    #[error("Ошибка сборки видео: {0}")]
    Video(String),

    #[error("Ошибка ffmpeg: {0}")]
    Ffmpeg(String),

    #[error("Ошибка фонового видео: {0}")]
    Background(String),

    #[error("Ошибка сохранения: {0}")]
    Storage(String),

    #[error("Неверные параметры: {0}")]
    InvalidParameters(String),

    #[error("Ошибка HTTP запроса: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Ошибка JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    LoggedError(String),
}

impl Error {
    /// Создает новую ошибку указанного типа с сообщением
    pub fn new(error_type: ErrorType, message: &str) -> Self {
        match error_type {
            ErrorType::Io => Self::Io(std::io::Error::new(std::io::ErrorKind::Other, message)),
            ErrorType::Config => Self::Config(message.to_string()),
            ErrorType::Llm => Self::Llm(message.to_string()),
            ErrorType::QuestionGeneration => Self::QuestionGeneration(message.to_string()),
            ErrorType::Tts => Self::Tts(message.to_string()),
            ErrorType::AudioProcessingError => Self::AudioProcessing(message.to_string()),
            ErrorType::Subtitles => Self::Subtitles(message.to_string()),
            ErrorType::Video => Self::Video(message.to_string()),
            ErrorType::Ffmpeg => Self::Ffmpeg(message.to_string()),
            ErrorType::Background => Self::Background(message.to_string()),
            ErrorType::Storage => Self::Storage(message.to_string()),
            ErrorType::InvalidParameters => Self::InvalidParameters(message.to_string()),
        }
    }

    /// Тип ошибки
    pub fn error_type(&self) -> Option<ErrorType> {
        match self {
            Self::Io(_) => Some(ErrorType::Io),
            Self::Config(_) => Some(ErrorType::Config),
            Self::Llm(_) | Self::Http(_) => Some(ErrorType::Llm),
            Self::QuestionGeneration(_) | Self::Json(_) => Some(ErrorType::QuestionGeneration),
            Self::Tts(_) => Some(ErrorType::Tts),
            Self::AudioProcessing(_) => Some(ErrorType::AudioProcessingError),
            Self::Subtitles(_) => Some(ErrorType::Subtitles),
            Self::Video(_) => Some(ErrorType::Video),
            Self::Ffmpeg(_) => Some(ErrorType::Ffmpeg),
            Self::Background(_) => Some(ErrorType::Background),
            Self::Storage(_) => Some(ErrorType::Storage),
            Self::InvalidParameters(_) => Some(ErrorType::InvalidParameters),
            Self::LoggedError(_) => None,
        }
    }
}

/// Результат с обработкой ошибок
pub type Result<T> = std::result::Result<T, Error>;
