use std::path::PathBuf;

/// Субтитр с абсолютными временами в секундах
#[derive(Debug, Clone, PartialEq)]
pub struct Subtitle {
    pub start_time: f64,
    pub end_time: f64,
    pub text: String,
}

impl Subtitle {
    pub fn new(start_time: f64, end_time: f64, text: String) -> Self {
        Self {
            start_time,
            end_time,
            text,
        }
    }

    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }
}

/// Дорожка субтитров
#[derive(Debug, Clone, Default)]
pub struct SubtitleTrack {
    pub subtitles: Vec<Subtitle>,
}

impl SubtitleTrack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_subtitles(subtitles: Vec<Subtitle>) -> Self {
        Self { subtitles }
    }

    pub fn add(&mut self, subtitle: Subtitle) {
        self.subtitles.push(subtitle);
    }

    pub fn len(&self) -> usize {
        self.subtitles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subtitles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Subtitle> {
        self.subtitles.iter()
    }

    /// Сортирует субтитры по времени начала
    pub fn sort(&mut self) {
        self.subtitles.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));
    }

    /// Время от начала первого до конца последнего субтитра
    pub fn total_duration(&self) -> f64 {
        if self.subtitles.is_empty() {
            return 0.0;
        }

        let min_start = self
            .subtitles
            .iter()
            .map(|s| s.start_time)
            .fold(f64::INFINITY, f64::min);
        let max_end = self.subtitles.iter().map(|s| s.end_time).fold(0.0, f64::max);

        max_end - min_start
    }
}

impl std::ops::Index<usize> for SubtitleTrack {
    type Output = Subtitle;

    fn index(&self, index: usize) -> &Self::Output {
        &self.subtitles[index]
    }
}

/// Роль аудио фрагмента в ролике
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CueKind {
    Question,
    Answer,
    Other,
}

/// Озвученный фрагмент, размещенный на временной шкале ролика
#[derive(Debug, Clone, PartialEq)]
pub struct AudioCue {
    pub path: PathBuf,
    pub text: String,
    pub start_time: f64,
    pub end_time: f64,
    pub kind: CueKind,
}

impl AudioCue {
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }
}
