use crate::error::{Error, Result};
use crate::logging::log_debug;
use rand::seq::SliceRandom;

/// Выбор темы для очередного видео
#[derive(Debug, Clone)]
pub struct ThemeSelector {
    themes: Vec<String>,
}

impl ThemeSelector {
    /// Создает селектор, отбрасывая пустые темы
    pub fn new(themes: Vec<String>) -> Result<Self> {
        let themes: Vec<String> = themes
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();

        if themes.is_empty() {
            return Err(Error::InvalidParameters("theme list is empty".to_string()));
        }

        Ok(Self { themes })
    }

    /// Выбирает случайную тему
    pub fn next_theme(&self) -> String {
        let mut rng = rand::thread_rng();
        // список не пуст, см. new()
        let theme = self
            .themes
            .choose(&mut rng)
            .cloned()
            .unwrap_or_default();
        log_debug(&format!("Выбрана тема '{}' из {}", theme, self.themes.len()));
        theme
    }

    pub fn themes(&self) -> &[String] {
        &self.themes
    }
}

/// Имя темы, пригодное для имени файла
pub fn theme_slug(theme: &str) -> String {
    theme.trim().to_lowercase().replace(' ', "_")
}
