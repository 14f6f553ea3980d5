use crate::error::{Error, Result};
use crate::subtitles::{AudioCue, CueKind};
use crate::tts::QuestionAudio;

/// Длительности трех частей одного вопроса
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuestionSegment {
    pub question_duration: f64,
    pub timer_duration: f64,
    pub answer_duration: f64,
}

impl QuestionSegment {
    pub fn from_audio(audio: &QuestionAudio, timer_duration: f64) -> Self {
        Self {
            question_duration: audio.question_duration,
            timer_duration,
            answer_duration: audio.answer_duration,
        }
    }

    pub fn total(&self) -> f64 {
        self.question_duration + self.timer_duration + self.answer_duration
    }
}

/// Абсолютные времена частей вопроса в итоговом ролике
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentTimes {
    pub start: f64,
    /// Вопрос и варианты `[start, timer_start)`
    pub timer_start: f64,
    /// Ответ `[answer_start, end)`
    pub answer_start: f64,
    pub end: f64,
    /// Длительность таймера как задана, а не разность накопленных сумм
    pub timer_length: f64,
}

impl SegmentTimes {
    pub fn timer_duration(&self) -> f64 {
        self.timer_length
    }
}

/// Склейка сегментов вопросов встык
#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    segments: Vec<SegmentTimes>,
}

impl Timeline {
    pub fn build(segments: &[QuestionSegment]) -> Result<Self> {
        if segments.is_empty() {
            return Err(Error::Video("no segments to concatenate".to_string()));
        }

        let mut start = 0.0;
        let mut times = Vec::with_capacity(segments.len());
        for (i, segment) in segments.iter().enumerate() {
            let parts = [segment.question_duration, segment.timer_duration, segment.answer_duration];
            if parts.iter().any(|d| !(*d > 0.0)) {
                return Err(Error::Video(format!(
                    "segment {} has a non-positive duration: {:?}",
                    i + 1,
                    parts
                )));
            }

            let timer_start = start + segment.question_duration;
            let answer_start = timer_start + segment.timer_duration;
            let end = answer_start + segment.answer_duration;
            times.push(SegmentTimes {
                start,
                timer_start,
                answer_start,
                end,
                timer_length: segment.timer_duration,
            });
            start = end;
        }

        Ok(Self { segments: times })
    }

    pub fn segments(&self) -> &[SegmentTimes] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn total_duration(&self) -> f64 {
        self.segments.last().map(|s| s.end).unwrap_or(0.0)
    }

    /// Фрагменты озвучки на шкале ролика: вопрос и ответ каждого сегмента
    pub fn audio_cues(&self, audio: &[QuestionAudio]) -> Result<Vec<AudioCue>> {
        if audio.len() != self.segments.len() {
            return Err(Error::Video(format!(
                "{} audio entries for {} segments",
                audio.len(),
                self.segments.len()
            )));
        }

        let mut cues = Vec::with_capacity(audio.len() * 2);
        for (times, audio) in self.segments.iter().zip(audio) {
            cues.push(AudioCue {
                path: audio.question_path.clone(),
                text: audio.script.question.clone(),
                start_time: times.start,
                end_time: times.timer_start,
                kind: CueKind::Question,
            });
            cues.push(AudioCue {
                path: audio.answer_path.clone(),
                text: audio.script.answer.clone(),
                start_time: times.answer_start,
                end_time: times.end,
                kind: CueKind::Answer,
            });
        }
        Ok(cues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_positive_part_rejected() {
        let segment = QuestionSegment {
            question_duration: 2.0,
            timer_duration: 0.0,
            answer_duration: 1.0,
        };
        assert!(Timeline::build(&[segment]).is_err());
        assert!(Timeline::build(&[]).is_err());
    }

    #[test]
    fn test_timer_duration_exact_after_fractional_offsets() {
        let segments = [
            QuestionSegment {
                question_duration: 4.1,
                timer_duration: 3.0,
                answer_duration: 1.3,
            },
            QuestionSegment {
                question_duration: 5.27,
                timer_duration: 3.0,
                answer_duration: 1.9,
            },
        ];
        let timeline = Timeline::build(&segments).unwrap();
        let second = timeline.segments()[1];

        assert_eq!(second.timer_duration(), 3.0);
        assert!((second.start - 8.4).abs() < 1e-9);
        assert!((timeline.total_duration() - 18.57).abs() < 1e-9);
    }
}
