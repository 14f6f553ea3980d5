use std::future::Future;
use std::path::Path;
use std::sync::{Arc, Mutex};

use quiz_shorts::{
    config::Settings,
    error::Result,
    pipeline::{MediaAssets, PipelineCore},
    progress::ProgressTracker,
    quiz::LlmProvider,
    subtitles::{CueKind, SrtParser},
    tts::{TtsProvider, TtsSegment},
    video::VideoComposer,
    FfmpegRunner,
};

const ANSWER_PREFIX: &str = "La réponse est : ";

// Мок LLM, всегда отдающий два валидных вопроса
struct FixedLlm;

impl LlmProvider for FixedLlm {
    fn complete(&self, _prompt: &str) -> impl Future<Output = Result<String>> {
        async move {
            Ok(r#"{"questions": [
                {"question": "Quel est le symbole chimique de l'or ?",
                 "choices": {"1": "Ag", "2": "Au", "3": "Or", "4": "Fe"}, "answer": "2"},
                {"question": "Quel gaz respirons-nous ?",
                 "choices": {"1": "Azote", "2": "Hélium", "3": "Oxygène", "4": "Argon"}, "answer": "3"}
            ]}"#
            .to_string())
        }
    }
}

// Мок TTS: вопрос длится 4 с, ответ 1.5 с
struct FixedTts;

impl TtsProvider for FixedTts {
    fn generate_speech(&self, text: &str) -> impl Future<Output = Result<Vec<u8>>> {
        let bytes = text.as_bytes().to_vec();
        async move { Ok(bytes) }
    }

    fn generate_segment(&self, text: &str) -> impl Future<Output = Result<TtsSegment>> {
        let duration = if text.starts_with(ANSWER_PREFIX) { 1.5 } else { 4.0 };
        let segment = TtsSegment {
            text: text.to_string(),
            audio_data: vec![0u8; 32],
            duration: Some(duration),
        };
        async move { Ok(segment) }
    }
}

fn test_settings(temp: &Path, subtitles: bool) -> Settings {
    let mut settings = Settings::default();
    settings.themes = vec!["la chimie".to_string()];
    settings.num_questions = 2;
    settings.tts.answer_prefix = ANSWER_PREFIX.to_string();
    settings.video.timer_duration = 3.0;
    settings.subtitles.enabled = subtitles;
    settings.paths.temp = temp.to_path_buf();
    settings
}

fn assert_close(actual: f64, expected: f64) {
    assert!((actual - expected).abs() < 1e-6, "{} != {}", actual, expected);
}

#[tokio::test]
async fn test_prepare_builds_timeline_and_subtitles() -> Result<()> {
    let dir = tempfile::tempdir().unwrap();
    let settings = test_settings(dir.path(), true);
    let statuses = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&statuses);
    let tracker = ProgressTracker::with_callback(Box::new(move |progress, _status| {
        recorded.lock().unwrap().push(progress);
    }));

    let core = PipelineCore::new(&settings, &FixedLlm, &FixedTts, tracker.clone());
    let plan = core.prepare("la chimie").await?;

    assert_eq!(plan.theme, "la chimie");
    assert_eq!(plan.questions.len(), 2);
    assert_eq!(plan.audio.len(), 2);
    assert!(plan.audio.iter().all(|a| a.question_path.exists() && a.answer_path.exists()));

    // 4 + 3 + 1.5 на вопрос
    assert_close(plan.total_duration(), 17.0);
    let second = plan.timeline.segments()[1];
    assert_close(second.start, 8.5);
    assert_close(second.answer_start, 15.5);

    assert_eq!(plan.cues.len(), 4);
    assert_eq!(plan.cues[1].kind, CueKind::Answer);
    assert_close(plan.cues[1].start_time, 7.0);
    assert_eq!(plan.cues[3].text, "La réponse est : Oxygène");

    let srt = plan.subtitles.clone().expect("subtitles enabled");
    let track = SrtParser::parse_file(&srt)?;
    assert!(!track.is_empty());
    assert_close(track[0].start_time, 0.0);
    assert_close(track.total_duration(), 17.0);
    assert!(track.iter().all(|s| !s.text.contains(' ')));

    let progress = statuses.lock().unwrap().clone();
    assert!(progress.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(tracker.get_progress(), 45.0);
    Ok(())
}

#[tokio::test]
async fn test_prepare_without_subtitles() -> Result<()> {
    let dir = tempfile::tempdir().unwrap();
    let settings = test_settings(dir.path(), false);

    let core = PipelineCore::new(&settings, &FixedLlm, &FixedTts, ProgressTracker::new());
    let plan = core.prepare("la chimie").await?;

    assert!(plan.subtitles.is_none());
    assert!(!dir.path().join("subtitles.srt").exists());
    Ok(())
}

#[tokio::test]
async fn test_render_job_and_cleanup() -> Result<()> {
    let dir = tempfile::tempdir().unwrap();
    let settings = test_settings(dir.path(), true);

    let core = PipelineCore::new(&settings, &FixedLlm, &FixedTts, ProgressTracker::new());
    let plan = core.prepare("la chimie").await?;

    let job = core.render_job(&plan, &MediaAssets::default())?;
    assert_eq!(job.segments.len(), 2);
    assert_close(job.total_duration, 17.0);
    assert!(job.background.is_none());
    assert_eq!(job.subtitles, plan.subtitles);
    assert!(job.segments[1].layout.correct < 4);

    let composer = VideoComposer::new(
        settings.video.clone(),
        settings.subtitles.clone(),
        FfmpegRunner::new(),
        dir.path(),
    );
    let script = composer.build_script(&job)?;
    assert!(script.filter.contains("[vout]"));
    assert!(script.filter.contains("[aout]"));

    std::fs::write(dir.path().join("final_1.mp4"), b"video").unwrap();
    // 4 файла озвучки и субтитры
    assert_eq!(core.cleanup()?, 5);
    assert!(dir.path().join("final_1.mp4").exists());
    Ok(())
}

#[tokio::test]
async fn test_unreadable_media_is_dropped() {
    let dir = tempfile::tempdir().unwrap();
    let settings = test_settings(dir.path(), false);
    let background = dir.path().join("bg.mp4");
    let music = dir.path().join("music.mp3");
    std::fs::write(&background, b"not a video").unwrap();
    std::fs::write(&music, b"not audio").unwrap();

    let core = PipelineCore::new(&settings, &FixedLlm, &FixedTts, ProgressTracker::new())
        .with_runner(FfmpegRunner::with_paths("/nonexistent/ffmpeg", "/nonexistent/ffprobe"));
    let media = MediaAssets {
        background: Some(background),
        music: Some(music),
        tick_sound: Some(dir.path().join("missing_tick.wav")),
    };

    let checked = core.verify_media(&media, 17.0).await;
    assert!(checked.background.is_none());
    assert!(checked.music.is_none());
    assert!(checked.tick_sound.is_none());

    let empty = core.verify_media(&MediaAssets::default(), 17.0).await;
    assert!(empty.background.is_none() && empty.music.is_none() && empty.tick_sound.is_none());
}
