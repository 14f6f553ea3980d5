use crate::error::Result;
use crate::logging::{log_debug, log_info};
use std::sync::{Arc, Mutex, MutexGuard};

/// Тип для функций обратного вызова прогресса
pub type ProgressCallback = Box<dyn Fn(f32, &str) + Send + Sync + 'static>;

/// Этапы генерации ролика
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Theme,
    Questions,
    Narration,
    Subtitles,
    Background,
    Render,
    Upload,
    Cleanup,
    Done,
}

impl PipelineStage {
    /// Прогресс в процентах на начало этапа
    pub fn percent(&self) -> f32 {
        match self {
            Self::Theme => 0.0,
            Self::Questions => 5.0,
            Self::Narration => 20.0,
            Self::Subtitles => 45.0,
            Self::Background => 50.0,
            Self::Render => 60.0,
            Self::Upload => 90.0,
            Self::Cleanup => 97.0,
            Self::Done => 100.0,
        }
    }

    /// Этап, следующий за текущим
    pub fn next(&self) -> Self {
        match self {
            Self::Theme => Self::Questions,
            Self::Questions => Self::Narration,
            Self::Narration => Self::Subtitles,
            Self::Subtitles => Self::Background,
            Self::Background => Self::Render,
            Self::Render => Self::Upload,
            Self::Upload => Self::Cleanup,
            Self::Cleanup | Self::Done => Self::Done,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Theme => "Выбор темы",
            Self::Questions => "Генерация вопросов",
            Self::Narration => "Озвучка",
            Self::Subtitles => "Субтитры",
            Self::Background => "Фон и музыка",
            Self::Render => "Сборка видео",
            Self::Upload => "Сохранение",
            Self::Cleanup => "Очистка",
            Self::Done => "Готово",
        }
    }
}

/// Трекер прогресса
#[derive(Clone)]
pub struct ProgressTracker {
    /// Текущий прогресс (от 0.0 до 100.0)
    progress: Arc<Mutex<f32>>,
    status: Arc<Mutex<String>>,
    callback: Option<Arc<ProgressCallback>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // Значения простые, после паники в колбэке их можно читать дальше
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self {
            progress: Arc::new(Mutex::new(0.0)),
            status: Arc::new(Mutex::new(String::new())),
            callback: None,
        }
    }

    pub fn with_callback(callback: ProgressCallback) -> Self {
        Self {
            callback: Some(Arc::new(callback)),
            ..Self::new()
        }
    }

    /// Обновляет прогресс
    pub fn update(&self, progress: f32, status: &str) -> Result<()> {
        let clamped = progress.clamp(0.0, 100.0);

        *lock(&self.progress) = clamped;
        *lock(&self.status) = status.to_string();
        log_debug(&format!("Прогресс {:.0}%: {}", clamped, status));

        if let Some(callback) = &self.callback {
            callback(clamped, status);
        }
        Ok(())
    }

    /// Отмечает начало этапа
    pub fn stage(&self, stage: PipelineStage) -> Result<()> {
        log_info(&format!("Этап: {}", stage.label()));
        self.update(stage.percent(), stage.label())
    }

    /// Трекер для прогресса внутри этапа
    pub fn stage_child(&self, stage: PipelineStage) -> ChildProgressTracker {
        self.create_child(stage.percent(), stage.next().percent())
    }

    pub fn get_progress(&self) -> f32 {
        *lock(&self.progress)
    }

    pub fn get_status(&self) -> String {
        lock(&self.status).clone()
    }

    /// Создает дочерний трекер прогресса с заданным диапазоном
    pub fn create_child(&self, start: f32, end: f32) -> ChildProgressTracker {
        ChildProgressTracker {
            parent: self.clone(),
            start,
            end,
        }
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Дочерний трекер, отображающий 0-100% в диапазон родителя
#[derive(Clone)]
pub struct ChildProgressTracker {
    parent: ProgressTracker,
    start: f32,
    end: f32,
}

impl ChildProgressTracker {
    pub fn update(&self, progress: f32, status: &str) -> Result<()> {
        let clamped = progress.clamp(0.0, 100.0);
        let parent_progress = self.start + (self.end - self.start) * clamped / 100.0;
        self.parent.update(parent_progress, status)
    }

    /// Прогресс по числу обработанных элементов
    pub fn step(&self, done: usize, total: usize, status: &str) -> Result<()> {
        let percent = if total == 0 {
            100.0
        } else {
            done as f32 * 100.0 / total as f32
        };
        self.update(percent, status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn test_progress_is_clamped() {
        let tracker = ProgressTracker::new();
        assert_eq!(tracker.get_progress(), 0.0);
        assert_eq!(tracker.get_status(), "");

        tracker.update(150.0, "Over").unwrap();
        assert_eq!(tracker.get_progress(), 100.0);

        tracker.update(-10.0, "Under").unwrap();
        assert_eq!(tracker.get_progress(), 0.0);
        assert_eq!(tracker.get_status(), "Under");
    }

    #[test]
    fn test_stage_reports_through_callback() {
        let (tx, rx) = mpsc::channel();
        let tx = Mutex::new(tx);
        let tracker = ProgressTracker::with_callback(Box::new(move |progress, status| {
            let _ = lock(&tx).send((progress, status.to_string()));
        }));

        tracker.stage(PipelineStage::Render).unwrap();
        let (progress, status) = rx.recv().unwrap();
        assert_eq!(progress, 60.0);
        assert_eq!(status, "Сборка видео");
    }

    #[test]
    fn test_stage_child_maps_into_stage_range() {
        let tracker = ProgressTracker::new();
        let child = tracker.stage_child(PipelineStage::Narration);

        child.step(1, 2, "Вопрос 1").unwrap();
        // 20 + (45 - 20) * 0.5
        assert_eq!(tracker.get_progress(), 32.5);

        child.step(0, 0, "Пусто").unwrap();
        assert_eq!(tracker.get_progress(), 45.0);
    }

    #[test]
    fn test_stage_percentages_increase() {
        let mut stage = PipelineStage::Theme;
        while stage != PipelineStage::Done {
            assert!(stage.next().percent() > stage.percent());
            stage = stage.next();
        }
    }
}
