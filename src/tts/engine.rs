use crate::audio::mp3_duration;
use crate::error::{Error, ErrorType, Result};
use crate::logging::{log_debug, log_info, log_warning};
use crate::quiz::Question;
use crate::tts::narration::NarrationScript;
use crate::tts::{TtsProvider, TtsSegment};
use std::path::{Path, PathBuf};

/// Озвучка одного вопроса: два MP3 файла и их длительности
#[derive(Debug, Clone)]
pub struct QuestionAudio {
    /// Номер вопроса, начиная с 1
    pub index: usize,
    pub question_path: PathBuf,
    pub answer_path: PathBuf,
    pub question_duration: f64,
    pub answer_duration: f64,
    pub script: NarrationScript,
}

/// Озвучивает вопросы и складывает аудио во временный каталог
pub struct TtsEngine<'a, T: TtsProvider> {
    provider: &'a T,
    temp_dir: PathBuf,
    answer_prefix: String,
}

impl<'a, T: TtsProvider> TtsEngine<'a, T> {
    pub fn new<P: AsRef<Path>>(provider: &'a T, temp_dir: P, answer_prefix: &str) -> Self {
        Self {
            provider,
            temp_dir: temp_dir.as_ref().to_path_buf(),
            answer_prefix: answer_prefix.to_string(),
        }
    }

    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    /// Озвучивает вопрос с вариантами и ответ.
    ///
    /// Файлы называются `q{index}_question.mp3` и `q{index}_answer.mp3`.
    pub async fn synthesize(&self, index: usize, question: &Question) -> Result<QuestionAudio> {
        let script = NarrationScript::for_question(question, &self.answer_prefix)?;
        tokio::fs::create_dir_all(&self.temp_dir).await?;

        let question_path = self.temp_dir.join(format!("q{}_question.mp3", index));
        let answer_path = self.temp_dir.join(format!("q{}_answer.mp3", index));

        let question_duration = self.synthesize_part(&script.question, &question_path).await?;
        let answer_duration = self.synthesize_part(&script.answer, &answer_path).await?;

        log_info(&format!(
            "Вопрос {} озвучен: {:.2}с вопрос, {:.2}с ответ",
            index, question_duration, answer_duration
        ));

        Ok(QuestionAudio {
            index,
            question_path,
            answer_path,
            question_duration,
            answer_duration,
            script,
        })
    }

    async fn synthesize_part(&self, text: &str, path: &Path) -> Result<f64> {
        let segment = self.provider.generate_segment(text).await?;
        tokio::fs::write(path, &segment.audio_data).await?;
        log_debug(&format!("Аудио сохранено в {}", path.display()));
        segment_duration(&segment)
    }

    /// Удаляет MP3 файлы из временного каталога, возвращает их число
    pub fn cleanup(&self) -> Result<usize> {
        let entries = match std::fs::read_dir(&self.temp_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(Error::Io(e)),
        };

        let mut removed = 0;
        for entry in entries {
            let path = entry?.path();
            let is_mp3 = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.eq_ignore_ascii_case("mp3"))
                .unwrap_or(false);
            if !is_mp3 {
                continue;
            }
            match std::fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) => log_warning(&format!("Не удалось удалить {}: {}", path.display(), e)),
            }
        }

        log_debug(&format!("Удалено {} временных аудио файлов", removed));
        Ok(removed)
    }
}

fn segment_duration(segment: &TtsSegment) -> Result<f64> {
    let duration = match segment.duration {
        Some(duration) => duration,
        None => mp3_duration(&segment.audio_data)?,
    };
    if !(duration > 0.0) {
        return Err(Error::new(
            ErrorType::AudioProcessingError,
            &format!("Нулевая длительность озвучки: \"{}\"", segment.text),
        ));
    }
    Ok(duration)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;

    struct FixedTts;

    impl TtsProvider for FixedTts {
        fn generate_speech(&self, text: &str) -> impl Future<Output = Result<Vec<u8>>> {
            let bytes = text.as_bytes().to_vec();
            async move { Ok(bytes) }
        }

        fn generate_segment(&self, text: &str) -> impl Future<Output = Result<TtsSegment>> {
            let segment = TtsSegment {
                text: text.to_string(),
                audio_data: vec![0u8; 16],
                duration: Some(text.len() as f64 / 10.0),
            };
            async move { Ok(segment) }
        }
    }

    #[tokio::test]
    async fn test_synthesize_writes_files() {
        let dir = tempfile::tempdir().unwrap();
        let provider = FixedTts;
        let engine = TtsEngine::new(&provider, dir.path(), "Réponse : ");
        let question = Question::new("Q ?", ["a", "b", "c", "d"], "3");

        let audio = engine.synthesize(2, &question).await.unwrap();

        assert!(audio.question_path.ends_with("q2_question.mp3"));
        assert!(audio.answer_path.ends_with("q2_answer.mp3"));
        assert!(audio.question_path.exists());
        assert_eq!(audio.script.answer, "Réponse : c");
        assert!((audio.question_duration - audio.script.question.len() as f64 / 10.0).abs() < 1e-9);

        std::fs::write(dir.path().join("keep.txt"), "x").unwrap();
        assert_eq!(engine.cleanup().unwrap(), 2);
        assert!(dir.path().join("keep.txt").exists());
    }

    #[test]
    fn test_cleanup_missing_dir() {
        let provider = FixedTts;
        let engine = TtsEngine::new(&provider, "/nonexistent/quiz-temp", "");
        assert_eq!(engine.cleanup().unwrap(), 0);
    }

    #[test]
    fn test_zero_duration_rejected() {
        let segment = TtsSegment {
            text: "x".to_string(),
            audio_data: Vec::new(),
            duration: Some(0.0),
        };
        assert!(segment_duration(&segment).is_err());
    }
}
