use crate::error::{Error, Result};
use crate::logging::{log_debug, log_info};
use crate::subtitles::models::{AudioCue, CueKind, Subtitle, SubtitleTrack};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

// Пунктуация прикрепляется к предыдущему слову
static WORD_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\w+(?:[.,!?;])?|\S").expect("valid word regex")
});

/// Генератор SRT с равномерным распределением времени по словам
#[derive(Debug, Clone)]
pub struct SrtGenerator {
    /// Пауза с таймером между вопросом и ответом
    timer_duration: f64,
    /// Один субтитр на слово или на весь фрагмент
    word_by_word: bool,
}

impl SrtGenerator {
    pub fn new(timer_duration: f64, word_by_word: bool) -> Self {
        Self {
            timer_duration,
            word_by_word,
        }
    }

    /// Делит текст на слова
    pub fn split_words(text: &str) -> Vec<String> {
        WORD_REGEX
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .filter(|w| !w.trim().is_empty())
            .collect()
    }

    /// Раскладывает фрагменты на субтитры.
    ///
    /// Ответ, начинающийся раньше конца предыдущего вопроса плюс таймер,
    /// сдвигается целиком на это время.
    pub fn allocate(&self, cues: &[AudioCue]) -> SubtitleTrack {
        let mut track = SubtitleTrack::new();
        let mut previous: Option<(CueKind, f64)> = None;

        for cue in cues {
            let mut start = cue.start_time;
            let mut end = cue.end_time;

            if let Some((CueKind::Question, prev_end)) = previous {
                let expected_start = prev_end + self.timer_duration;
                if cue.kind == CueKind::Answer && start < expected_start {
                    log_debug(&format!(
                        "Сдвиг ответа на {:.3}с для паузы с таймером",
                        expected_start - start
                    ));
                    end += expected_start - start;
                    start = expected_start;
                }
            }
            previous = Some((cue.kind, end));

            let words = if self.word_by_word {
                Self::split_words(&cue.text)
            } else if cue.text.trim().is_empty() {
                Vec::new()
            } else {
                vec![cue.text.clone()]
            };

            if words.is_empty() {
                continue;
            }

            let word_duration = (end - start) / words.len() as f64;
            let mut current = start;
            for word in words {
                track.add(Subtitle::new(current, current + word_duration, word));
                current += word_duration;
            }
        }

        track
    }

    /// Время в формате SRT `HH:MM:SS,mmm`, миллисекунды отбрасываются
    pub fn format_time(seconds: f64) -> String {
        // 1e-6 гасит ошибку представления, например 2.3 * 1000 = 2299.999...
        let total_ms = ((seconds.max(0.0) + 1e-6) * 1000.0).floor() as u64;
        let hours = total_ms / 3_600_000;
        let minutes = (total_ms % 3_600_000) / 60_000;
        let secs = (total_ms % 60_000) / 1000;
        let millis = total_ms % 1000;
        format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
    }

    /// Нумерованные блоки SRT
    pub fn render(track: &SubtitleTrack) -> String {
        let mut output = String::new();
        for (i, subtitle) in track.iter().enumerate() {
            output.push_str(&format!(
                "{}\n{} --> {}\n{}\n\n",
                i + 1,
                Self::format_time(subtitle.start_time),
                Self::format_time(subtitle.end_time),
                subtitle.text
            ));
        }
        output
    }

    /// Раскладывает фрагменты и записывает SRT файл
    pub fn write<P: AsRef<Path>>(&self, cues: &[AudioCue], path: P) -> Result<SubtitleTrack> {
        let path = path.as_ref();
        let track = self.allocate(cues);
        if track.is_empty() {
            return Err(Error::Subtitles("no words to write".to_string()));
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, Self::render(&track))?;

        log_info(&format!("Файл SRT создан: {} субтитров, {}", track.len(), path.display()));
        Ok(track)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn cue(text: &str, start: f64, end: f64, kind: CueKind) -> AudioCue {
        AudioCue {
            path: PathBuf::from("a.mp3"),
            text: text.to_string(),
            start_time: start,
            end_time: end,
            kind,
        }
    }

    #[test]
    fn test_split_words_keeps_punctuation() {
        let words = SrtGenerator::split_words("Bonjour, le monde ! Ça va?");
        assert_eq!(words, vec!["Bonjour,", "le", "monde", "!", "Ça", "va?"]);
        assert!(SrtGenerator::split_words("   ").is_empty());
    }

    #[test]
    fn test_format_time() {
        assert_eq!(SrtGenerator::format_time(0.0), "00:00:00,000");
        assert_eq!(SrtGenerator::format_time(2.3), "00:00:02,300");
        assert_eq!(SrtGenerator::format_time(3725.4567), "01:02:05,456");
    }

    #[test]
    fn test_uniform_allocation() {
        let generator = SrtGenerator::new(3.0, true);
        let track = generator.allocate(&[cue("un deux trois quatre", 1.0, 3.0, CueKind::Other)]);

        assert_eq!(track.len(), 4);
        assert_eq!(track[0].start_time, 1.0);
        assert_eq!(track[1].start_time, 1.5);
        assert_eq!(track[3].end_time, 3.0);
    }

    #[test]
    fn test_answer_shifted_after_timer() {
        let generator = SrtGenerator::new(3.0, false);
        let track = generator.allocate(&[
            cue("Question ?", 0.0, 2.0, CueKind::Question),
            cue("Réponse", 2.0, 3.0, CueKind::Answer),
        ]);

        assert_eq!(track.len(), 2);
        assert_eq!(track[1].start_time, 5.0);
        assert_eq!(track[1].end_time, 6.0);
    }

    #[test]
    fn test_render_blocks() {
        let track = SubtitleTrack::from_subtitles(vec![Subtitle::new(0.0, 0.5, "Salut".to_string())]);
        assert_eq!(SrtGenerator::render(&track), "1\n00:00:00,000 --> 00:00:00,500\nSalut\n\n");
    }
}
