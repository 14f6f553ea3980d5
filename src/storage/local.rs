use crate::error::{Error, Result};
use crate::logging::{log_debug, log_info};
use std::path::{Path, PathBuf};

/// Перемещает готовые видео в локальный каталог
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Перемещает файл; между файловыми системами копирует и удаляет исходник
    pub async fn save(&self, video_path: &Path, filename: Option<&str>) -> Result<String> {
        let filename = resolve_filename(video_path, filename)?;
        tokio::fs::create_dir_all(&self.root).await?;
        let destination = self.root.join(&filename);

        if video_path == destination {
            return Ok(destination.to_string_lossy().into_owned());
        }

        if let Err(e) = tokio::fs::rename(video_path, &destination).await {
            log_debug(&format!("rename не удался ({}), копируем", e));
            tokio::fs::copy(video_path, &destination).await?;
            tokio::fs::remove_file(video_path).await?;
        }

        log_info(&format!("Видео сохранено: {}", destination.display()));
        Ok(destination.to_string_lossy().into_owned())
    }
}

/// Имя файла назначения: заданное или имя исходного файла
pub(crate) fn resolve_filename(video_path: &Path, filename: Option<&str>) -> Result<String> {
    if let Some(name) = filename.map(str::trim).filter(|n| !n.is_empty()) {
        if name.contains('/') || name.contains('\\') {
            return Err(Error::Storage(format!("filename must not contain a path: {}", name)));
        }
        return Ok(name.to_string());
    }

    video_path
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| Error::Storage(format!("no file name in {}", video_path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_filename() {
        let path = Path::new("/tmp/final_1.mp4");
        assert_eq!(resolve_filename(path, None).unwrap(), "final_1.mp4");
        assert_eq!(resolve_filename(path, Some("quiz.mp4")).unwrap(), "quiz.mp4");
        assert_eq!(resolve_filename(path, Some("  ")).unwrap(), "final_1.mp4");
        assert!(resolve_filename(path, Some("../quiz.mp4")).is_err());
    }
}
