use crate::config::Settings;
use crate::error::{Error, Result};
use crate::ffmpeg::FfmpegRunner;
use crate::logging::{log_debug, log_error, log_info, log_warning};
use crate::progress::{PipelineStage, ProgressTracker};
use crate::quiz::{LlmProvider, Question, QuestionGenerator};
use crate::subtitles::{AudioCue, SrtGenerator};
use crate::tts::{QuestionAudio, TtsEngine, TtsProvider};
use crate::video::{QuestionSegment, QuizLayout, RenderJob, SceneSegment, Timeline, VideoComposer};
use std::path::{Path, PathBuf};

/// Имя файла субтитров во временном каталоге
pub const SUBTITLES_FILE: &str = "subtitles.srt";

/// Подготовленный выпуск: все, кроме фона и музыки
#[derive(Debug, Clone)]
pub struct EpisodePlan {
    pub theme: String,
    pub questions: Vec<Question>,
    pub audio: Vec<QuestionAudio>,
    pub timeline: Timeline,
    pub cues: Vec<AudioCue>,
    /// SRT файл, если субтитры включены
    pub subtitles: Option<PathBuf>,
}

impl EpisodePlan {
    pub fn total_duration(&self) -> f64 {
        self.timeline.total_duration()
    }
}

/// Фон, музыка и звук таймера
#[derive(Debug, Clone, Default)]
pub struct MediaAssets {
    pub background: Option<PathBuf>,
    pub music: Option<PathBuf>,
    pub tick_sound: Option<PathBuf>,
}

/// Логирует ошибку этапа и возвращает ее без изменений
pub(crate) fn stage_result<T>(stage: PipelineStage, result: Result<T>) -> Result<T> {
    if let Err(e) = &result {
        let _ = log_error::<(), _>(e, &format!("Этап '{}' завершился ошибкой", stage.label()));
    }
    result
}

/// Ядро генерации: вопросы, озвучка, шкала, субтитры и сборка
pub struct PipelineCore<'a, L: LlmProvider, T: TtsProvider> {
    settings: &'a Settings,
    llm: &'a L,
    tts: &'a T,
    progress: ProgressTracker,
    runner: FfmpegRunner,
}

impl<'a, L: LlmProvider, T: TtsProvider> PipelineCore<'a, L, T> {
    pub fn new(settings: &'a Settings, llm: &'a L, tts: &'a T, progress: ProgressTracker) -> Self {
        Self {
            settings,
            llm,
            tts,
            progress,
            runner: FfmpegRunner::new(),
        }
    }

    pub fn with_runner(mut self, runner: FfmpegRunner) -> Self {
        self.runner = runner;
        self
    }

    fn temp_dir(&self) -> &Path {
        &self.settings.paths.temp
    }

    fn engine(&self) -> TtsEngine<'a, T> {
        TtsEngine::new(self.tts, self.temp_dir(), &self.settings.tts.answer_prefix)
    }

    /// Вопросы, озвучка, шкала и субтитры для темы
    pub async fn prepare(&self, theme: &str) -> Result<EpisodePlan> {
        self.progress.stage(PipelineStage::Questions)?;
        let generator = QuestionGenerator::new(
            self.llm,
            self.settings.num_questions,
            self.settings.llm.max_attempts,
        );
        let questions = stage_result(PipelineStage::Questions, generator.generate(theme).await)?;

        self.progress.stage(PipelineStage::Narration)?;
        let audio = stage_result(PipelineStage::Narration, self.narrate(&questions).await)?;

        let timer = self.settings.video.timer_duration;
        let segments: Vec<QuestionSegment> = audio
            .iter()
            .map(|a| QuestionSegment::from_audio(a, timer))
            .collect();
        let timeline = Timeline::build(&segments)?;
        let cues = timeline.audio_cues(&audio)?;
        log_info(&format!(
            "Шкала: {} вопросов, {:.1}с",
            timeline.len(),
            timeline.total_duration()
        ));

        self.progress.stage(PipelineStage::Subtitles)?;
        let subtitles = if self.settings.subtitles.enabled {
            let generator = SrtGenerator::new(timer, self.settings.subtitles.word_by_word);
            let path = self.temp_dir().join(SUBTITLES_FILE);
            stage_result(PipelineStage::Subtitles, generator.write(&cues, &path))?;
            Some(path)
        } else {
            log_debug("Субтитры отключены");
            None
        };

        Ok(EpisodePlan {
            theme: theme.to_string(),
            questions,
            audio,
            timeline,
            cues,
            subtitles,
        })
    }

    async fn narrate(&self, questions: &[Question]) -> Result<Vec<QuestionAudio>> {
        let engine = self.engine();
        let child = self.progress.stage_child(PipelineStage::Narration);
        let mut audio = Vec::with_capacity(questions.len());

        for (i, question) in questions.iter().enumerate() {
            child.step(i, questions.len(), &format!("Озвучка вопроса {}/{}", i + 1, questions.len()))?;
            audio.push(engine.synthesize(i + 1, question).await?);
        }
        Ok(audio)
    }

    /// Задание для ffmpeg по плану
    pub fn render_job(&self, plan: &EpisodePlan, media: &MediaAssets) -> Result<RenderJob> {
        if plan.questions.len() != plan.timeline.len() {
            return Err(Error::Video(format!(
                "{} questions for {} timeline segments",
                plan.questions.len(),
                plan.timeline.len()
            )));
        }

        let segments = plan
            .questions
            .iter()
            .zip(plan.timeline.segments())
            .map(|(question, times)| {
                Ok(SceneSegment {
                    layout: QuizLayout::compute(question, &self.settings.video)?,
                    times: *times,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(RenderJob {
            segments,
            cues: plan.cues.clone(),
            total_duration: plan.total_duration(),
            background: media.background.clone(),
            music: media.music.clone(),
            tick_sound: media.tick_sound.clone(),
            subtitles: plan.subtitles.clone(),
        })
    }

    /// Проверяет фон, музыку и звук таймера через ffprobe.
    ///
    /// Нечитаемый файл выбрасывается с предупреждением, ролик собирается без него.
    pub async fn verify_media(&self, media: &MediaAssets, total_duration: f64) -> MediaAssets {
        let background = match &media.background {
            Some(path) => match self.runner.probe(path).await {
                Ok(info) if info.width.is_some() => {
                    if info.duration < total_duration {
                        log_debug(&format!(
                            "Фон {:.1}с короче ролика {:.1}с, будет зациклен",
                            info.duration, total_duration
                        ));
                    }
                    Some(path.clone())
                }
                Ok(_) => {
                    log_warning(&format!("В файле {} нет видеопотока, используется однотонный фон", path.display()));
                    None
                }
                Err(e) => {
                    log_warning(&format!("Фон {} не читается ({}), используется однотонный фон", path.display(), e));
                    None
                }
            },
            None => None,
        };
        MediaAssets {
            background,
            music: self.checked_audio(media.music.as_deref(), "Музыка").await,
            tick_sound: self.checked_audio(media.tick_sound.as_deref(), "Звук таймера").await,
        }
    }

    async fn checked_audio(&self, path: Option<&Path>, kind: &str) -> Option<PathBuf> {
        let path = path?;
        match self.runner.probe_duration(path).await {
            Ok(duration) => {
                log_debug(&format!("{} {}: {:.1}с", kind, path.display(), duration));
                Some(path.to_path_buf())
            }
            Err(e) => {
                log_warning(&format!("{} {} не читается, пропускаем: {}", kind, path.display(), e));
                None
            }
        }
    }

    /// Собирает ролик во временном каталоге
    pub async fn render(&self, plan: &EpisodePlan, media: &MediaAssets) -> Result<PathBuf> {
        self.progress.stage(PipelineStage::Render)?;
        let media = self.verify_media(media, plan.total_duration()).await;
        let job = self.render_job(plan, &media)?;
        let composer = VideoComposer::new(
            self.settings.video.clone(),
            self.settings.subtitles.clone(),
            self.runner.clone(),
            self.temp_dir(),
        );
        stage_result(PipelineStage::Render, composer.render(&job, self.temp_dir()).await)
    }

    /// Удаляет озвучку, надписи и субтитры из временного каталога
    pub fn cleanup(&self) -> Result<usize> {
        self.progress.stage(PipelineStage::Cleanup)?;
        let mut removed = self.engine().cleanup()?;

        let entries = match std::fs::read_dir(self.temp_dir()) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(removed),
            Err(e) => return Err(e.into()),
        };
        for entry in entries {
            let path = entry?.path();
            let temporary = matches!(
                path.extension().and_then(|e| e.to_str()),
                Some("txt") | Some("srt")
            );
            if !temporary {
                continue;
            }
            match std::fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) => log_warning(&format!("Не удалось удалить {}: {}", path.display(), e)),
            }
        }

        log_info(&format!("Временные файлы удалены: {}", removed));
        Ok(removed)
    }
}
