use crate::config::{ApiKeys, StorageProvider, StorageSettings};
use crate::error::{Error, Result};
use std::future::Future;
use std::path::Path;

mod gcs;
mod local;

pub use gcs::GcsStorage;
pub use local::LocalStorage;

/// Куда складываются готовые видео
pub trait StorageBackend: Send + Sync {
    /// Сохраняет видео и возвращает его итоговое расположение
    fn save(&self, video_path: &Path, filename: Option<&str>) -> impl Future<Output = Result<String>>;
}

impl StorageBackend for LocalStorage {
    fn save(&self, video_path: &Path, filename: Option<&str>) -> impl Future<Output = Result<String>> {
        self.save(video_path, filename)
    }
}

impl StorageBackend for GcsStorage {
    fn save(&self, video_path: &Path, filename: Option<&str>) -> impl Future<Output = Result<String>> {
        self.save(video_path, filename)
    }
}

/// Хранилище, выбранное в настройках
pub enum Storage {
    Local(LocalStorage),
    Gcs(GcsStorage),
}

impl StorageBackend for Storage {
    async fn save(&self, video_path: &Path, filename: Option<&str>) -> Result<String> {
        match self {
            Self::Local(local) => local.save(video_path, filename).await,
            Self::Gcs(gcs) => gcs.save(video_path, filename).await,
        }
    }
}

/// Создает хранилище по `storage.provider`
pub fn build_storage(settings: &StorageSettings, keys: &ApiKeys) -> Result<Storage> {
    let local = LocalStorage::new(&settings.local_path);
    match settings.provider {
        StorageProvider::Local => Ok(Storage::Local(local)),
        StorageProvider::Gcs => {
            let bucket = settings
                .bucket
                .clone()
                .ok_or_else(|| Error::Config("storage.bucket is required for gcs".to_string()))?;
            let token = ApiKeys::require(&keys.gcs_token, "GCS_ACCESS_TOKEN")?;
            Ok(Storage::Gcs(GcsStorage::new(
                bucket,
                settings.prefix.clone(),
                token.to_string(),
                local,
            )))
        }
    }
}
