pub mod audio;
pub mod background;
pub mod config;
pub mod error;
pub mod ffmpeg;
pub mod logging;
pub mod pipeline;
pub mod progress;
pub mod quiz;
pub mod storage;
pub mod subtitles;
pub mod theme;
pub mod tts;
pub mod video;

pub use background::{find_tick_sound, BackgroundManager, MusicLibrary, PexelsClient};
pub use config::{ApiKeys, Settings, StorageProvider};
pub use error::{Error, ErrorType, Result};
pub use ffmpeg::{FfmpegRunner, MediaInfo, ReframeOptions};
pub use logging::{
    log_debug, log_error, log_info, log_trace, log_warning, setup_logging, setup_test_logging,
};
pub use pipeline::{EpisodePlan, MediaAssets, PipelineCore};
pub use progress::{ChildProgressTracker, PipelineStage, ProgressCallback, ProgressTracker};
pub use quiz::{LlmProvider, MistralClient, Question, QuestionGenerator, QuestionSet};
pub use storage::{build_storage, GcsStorage, LocalStorage, Storage, StorageBackend};
pub use subtitles::{AudioCue, CueKind, SrtGenerator, SrtParser, Subtitle, SubtitleTrack};
pub use theme::ThemeSelector;
pub use tts::{OpenAiTts, QuestionAudio, TtsEngine, TtsOptions, TtsProvider, TtsSegment};
pub use video::{QuizLayout, Timeline, VideoComposer};

use pipeline::core::stage_result;

/// Итог генерации одного ролика
#[derive(Debug, Clone)]
pub struct GeneratedVideo {
    pub theme: String,
    /// Путь или URI, который вернуло хранилище
    pub location: String,
    pub duration: f64,
    pub question_count: usize,
}

/// Основной интерфейс генерации квиз-роликов
pub struct QuizVideo {
    settings: Settings,
    keys: ApiKeys,
    progress_tracker: ProgressTracker,
    runner: FfmpegRunner,
    theme: Option<String>,
    keep_temp: bool,
}

impl QuizVideo {
    /// Создает генератор с заданными настройками и ключами
    pub fn new(settings: Settings, keys: ApiKeys) -> Self {
        log_info(&format!(
            "Создан генератор: {} вопросов, {} тем",
            settings.num_questions,
            settings.themes.len()
        ));

        Self {
            settings,
            keys,
            progress_tracker: ProgressTracker::new(),
            runner: FfmpegRunner::new(),
            theme: None,
            keep_temp: false,
        }
    }

    /// Загружает настройки из файла, ключи берет из окружения
    pub fn from_config<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let settings = Settings::load(path)?;
        Ok(Self::new(settings, ApiKeys::from_env()))
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Устанавливает функцию обратного вызова для отслеживания прогресса
    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        log_debug("Установлена функция обратного вызова для отслеживания прогресса");
        self.progress_tracker = ProgressTracker::with_callback(callback);
        self
    }

    /// Фиксирует тему вместо случайной
    pub fn with_theme(mut self, theme: &str) -> Self {
        log_debug(&format!("Установлена тема: {}", theme));
        self.theme = Some(theme.to_string());
        self
    }

    pub fn with_num_questions(mut self, num_questions: usize) -> Self {
        log_debug(&format!("Установлено число вопросов: {}", num_questions));
        self.settings.num_questions = num_questions;
        self
    }

    /// Оставляет временные файлы после сборки
    pub fn with_keep_temp(mut self, keep_temp: bool) -> Self {
        log_debug(&format!("Сохранение временных файлов: {}", keep_temp));
        self.keep_temp = keep_temp;
        self
    }

    pub fn with_ffmpeg(mut self, runner: FfmpegRunner) -> Self {
        self.runner = runner;
        self
    }

    fn pick_theme(&self) -> Result<String> {
        match &self.theme {
            Some(theme) => Ok(theme.clone()),
            None => Ok(ThemeSelector::new(self.settings.themes.clone())?.next_theme()),
        }
    }

    async fn collect_media(&self, theme: &str) -> Result<MediaAssets> {
        let backgrounds = BackgroundManager::new(
            &self.settings.paths,
            self.settings.background.clone(),
            self.keys.pexels.clone(),
        );
        let background = backgrounds.get_background(theme).await?;
        if background.is_none() {
            log_warning("Фоновое видео не найдено, используется однотонный фон");
        }

        let music = MusicLibrary::new(&self.settings.paths.music).pick()?;
        if music.is_none() {
            log_warning("Музыка не найдена, ролик будет без фоновой музыки");
        }

        Ok(MediaAssets {
            background,
            music,
            tick_sound: find_tick_sound(&self.settings.paths.sound_effects),
        })
    }

    /// Генерирует ролик и сохраняет его в настроенное хранилище
    pub async fn generate_video(&self) -> Result<GeneratedVideo> {
        self.settings.validate()?;
        self.settings.ensure_directories()?;

        self.progress_tracker.stage(PipelineStage::Theme)?;
        let theme = self.pick_theme()?;
        log_info(&format!("Тема выпуска: {}", theme));

        let llm = MistralClient::new(
            ApiKeys::require(&self.keys.mistral, "MISTRAL_API_KEY")?.to_string(),
            self.settings.llm.clone(),
        );
        let tts = OpenAiTts::new(
            ApiKeys::require(&self.keys.openai, "OPENAI_API_KEY")?.to_string(),
            TtsOptions::from_settings(&self.settings.tts)?,
        );
        let storage = build_storage(&self.settings.storage, &self.keys)?;

        let core = PipelineCore::new(&self.settings, &llm, &tts, self.progress_tracker.clone())
            .with_runner(self.runner.clone());

        // При ошибке временные файлы остаются для разбора
        let video = self.run(&core, &storage, &theme).await?;

        if self.keep_temp {
            log_info(&format!(
                "Временные файлы оставлены в {}",
                self.settings.paths.temp.display()
            ));
        } else if let Err(e) = core.cleanup() {
            log_warning(&format!("Не удалось очистить временные файлы: {}", e));
        }

        self.progress_tracker.stage(PipelineStage::Done)?;
        log_info(&format!("Ролик готов: {}", video.location));
        Ok(video)
    }

    async fn run<L: LlmProvider, T: TtsProvider>(
        &self,
        core: &PipelineCore<'_, L, T>,
        storage: &Storage,
        theme: &str,
    ) -> Result<GeneratedVideo> {
        let plan = core.prepare(theme).await?;

        self.progress_tracker.stage(PipelineStage::Background)?;
        let media = stage_result(PipelineStage::Background, self.collect_media(theme).await)?;

        let rendered = core.render(&plan, &media).await?;

        self.progress_tracker.stage(PipelineStage::Upload)?;
        let location = stage_result(PipelineStage::Upload, storage.save(&rendered, None).await)?;

        Ok(GeneratedVideo {
            theme: plan.theme.clone(),
            location,
            duration: plan.total_duration(),
            question_count: plan.questions.len(),
        })
    }
}
