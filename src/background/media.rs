use crate::background::manager::list_files;
use crate::error::Result;
use crate::logging::{log_info, log_warning};
use rand::seq::SliceRandom;
use std::path::{Path, PathBuf};

/// Звуки таймера в порядке предпочтения
pub const TICK_SOUND_NAMES: [&str; 3] = ["beep_10.wav", "tick.wav", "beep.wav"];

/// Фоновая музыка
pub struct MusicLibrary {
    dir: PathBuf,
}

impl MusicLibrary {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn tracks(&self) -> Result<Vec<PathBuf>> {
        list_files(&self.dir, &["mp3", "wav"])
    }

    /// Случайный трек или `None`, если каталог пуст
    pub fn pick(&self) -> Result<Option<PathBuf>> {
        let track = self.tracks()?.choose(&mut rand::thread_rng()).cloned();
        match &track {
            Some(path) => log_info(&format!("Музыка: {}", path.display())),
            None => log_warning(&format!("Нет музыки в {}", self.dir.display())),
        }
        Ok(track)
    }
}

/// Первый найденный звук таймера
pub fn find_tick_sound<P: AsRef<Path>>(dir: P) -> Option<PathBuf> {
    let dir = dir.as_ref();
    let found = TICK_SOUND_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file());
    if found.is_none() {
        log_warning(&format!("Звук таймера не найден в {}", dir.display()));
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pick_music() {
        let dir = tempfile::tempdir().unwrap();
        let library = MusicLibrary::new(dir.path());
        assert!(library.pick().unwrap().is_none());

        std::fs::write(dir.path().join("back_10.mp3"), b"x").unwrap();
        std::fs::write(dir.path().join("cover.jpg"), b"x").unwrap();
        assert_eq!(library.pick().unwrap(), Some(dir.path().join("back_10.mp3")));
    }

    #[test]
    fn test_tick_sound_preference() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_tick_sound(dir.path()).is_none());

        std::fs::write(dir.path().join("beep.wav"), b"x").unwrap();
        std::fs::write(dir.path().join("tick.wav"), b"x").unwrap();
        assert_eq!(find_tick_sound(dir.path()), Some(dir.path().join("tick.wav")));
    }
}
