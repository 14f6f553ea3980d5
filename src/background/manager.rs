use crate::background::pexels::{select_video_file, PexelsClient};
use crate::config::{BackgroundSettings, PathSettings};
use crate::error::Result;
use crate::logging::{log_debug, log_info, log_warning};
use crate::theme::theme_slug;
use rand::seq::SliceRandom;
use std::path::{Path, PathBuf};

/// Подбирает фоновое видео для темы
pub struct BackgroundManager {
    backgrounds_dir: PathBuf,
    settings: BackgroundSettings,
    pexels: Option<PexelsClient>,
}

impl BackgroundManager {
    pub fn new(paths: &PathSettings, settings: BackgroundSettings, pexels_key: Option<String>) -> Self {
        let pexels = pexels_key.map(|key| PexelsClient::new(key, settings.clone()));
        Self {
            backgrounds_dir: paths.backgrounds.clone(),
            settings,
            pexels,
        }
    }

    /// Каталог кэша видео по темам
    pub fn videos_dir(&self) -> PathBuf {
        self.backgrounds_dir.join("videos")
    }

    pub fn cached_path(&self, theme: &str) -> PathBuf {
        self.videos_dir().join(format!("{}.mp4", theme_slug(theme)))
    }

    /// Видео из кэша, затем из Pexels, затем любое локальное; `None`, если ничего нет
    pub async fn get_background(&self, theme: &str) -> Result<Option<PathBuf>> {
        let cached = self.cached_path(theme);
        if cached.is_file() {
            log_info(&format!("Фон из кэша: {}", cached.display()));
            return Ok(Some(cached));
        }

        if let Some(pexels) = &self.pexels {
            match self.fetch_from_pexels(pexels, theme, &cached).await {
                Ok(Some(path)) => return Ok(Some(path)),
                Ok(None) => log_warning(&format!("Pexels не нашел видео для темы '{}'", theme)),
                Err(e) => log_warning(&format!("Не удалось получить фон из Pexels: {}", e)),
            }
        } else {
            log_debug("PEXELS_API_KEY не задан, поиск фона пропущен");
        }

        let local = self.any_local_video()?;
        match &local {
            Some(path) => log_info(&format!("Случайный локальный фон: {}", path.display())),
            None => log_warning("Фоновые видео не найдены, будет использован сплошной цвет"),
        }
        Ok(local)
    }

    async fn fetch_from_pexels(&self, pexels: &PexelsClient, theme: &str, destination: &Path) -> Result<Option<PathBuf>> {
        let videos = pexels.search(theme).await?;
        let file = match select_video_file(&videos, self.settings.min_height) {
            Some(file) => file,
            None => return Ok(None),
        };

        log_info(&format!(
            "Загрузка фона {}x{} из Pexels",
            file.width.unwrap_or(0),
            file.height.unwrap_or(0)
        ));
        pexels.download(&file.link, destination).await?;
        Ok(Some(destination.to_path_buf()))
    }

    /// Случайное MP4 из каталога фонов или его подкаталога `videos`
    pub fn any_local_video(&self) -> Result<Option<PathBuf>> {
        let mut videos = list_files(&self.videos_dir(), &["mp4"])?;
        videos.extend(list_files(&self.backgrounds_dir, &["mp4"])?);
        Ok(videos.choose(&mut rand::thread_rng()).cloned())
    }
}

/// Файлы каталога с указанными расширениями; отсутствующий каталог - пустой список
pub(crate) fn list_files(dir: &Path, extensions: &[&str]) -> Result<Vec<PathBuf>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| extensions.iter().any(|x| e.eq_ignore_ascii_case(x)))
            .unwrap_or(false);
        if matches && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
