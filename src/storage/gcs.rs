use crate::error::{Error, Result};
use crate::logging::{log_debug, log_info};
use crate::storage::local::{resolve_filename, LocalStorage};
use std::path::Path;

const UPLOAD_ENDPOINT: &str = "https://storage.googleapis.com/upload/storage/v1";

/// Загрузка в Google Cloud Storage через JSON API с сохранением локальной копии
pub struct GcsStorage {
    bucket: String,
    prefix: String,
    access_token: String,
    endpoint: String,
    local: LocalStorage,
    client: reqwest::Client,
}

impl GcsStorage {
    pub fn new(bucket: String, prefix: String, access_token: String, local: LocalStorage) -> Self {
        Self {
            bucket,
            prefix,
            access_token,
            endpoint: UPLOAD_ENDPOINT.to_string(),
            local,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.trim_end_matches('/').to_string();
        self
    }

    pub fn object_name(&self, filename: &str) -> String {
        format!("{}{}", self.prefix, filename)
    }

    fn upload_url(&self) -> String {
        format!("{}/b/{}/o", self.endpoint, self.bucket)
    }

    /// Загружает видео и возвращает `gs://bucket/object`
    pub async fn save(&self, video_path: &Path, filename: Option<&str>) -> Result<String> {
        let filename = resolve_filename(video_path, filename)?;
        let object = self.object_name(&filename);
        let data = tokio::fs::read(video_path).await?;
        log_debug(&format!("Загрузка {} байт в gs://{}/{}", data.len(), self.bucket, object));

        let response = self
            .client
            .post(self.upload_url())
            .bearer_auth(&self.access_token)
            .query(&[("uploadType", "media"), ("name", object.as_str())])
            .header(reqwest::header::CONTENT_TYPE, "video/mp4")
            .body(data)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Storage(format!("GCS upload {}: {}", status, body)));
        }

        let uri = format!("gs://{}/{}", self.bucket, object);
        log_info(&format!("Видео загружено: {}", uri));

        self.local.save(video_path, Some(&filename)).await?;
        Ok(uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage() -> GcsStorage {
        GcsStorage::new(
            "quiz-bucket".to_string(),
            "videos/".to_string(),
            "token".to_string(),
            LocalStorage::new("/tmp/quiz-generated"),
        )
    }

    #[test]
    fn test_object_name_and_url() {
        let gcs = storage();
        assert_eq!(gcs.object_name("final_1.mp4"), "videos/final_1.mp4");
        assert_eq!(
            gcs.upload_url(),
            "https://storage.googleapis.com/upload/storage/v1/b/quiz-bucket/o"
        );
        let custom = storage().with_endpoint("http://localhost:4443/upload/storage/v1/");
        assert_eq!(custom.upload_url(), "http://localhost:4443/upload/storage/v1/b/quiz-bucket/o");
    }

    #[tokio::test]
    async fn test_missing_file_fails_before_upload() {
        let result = storage().save(Path::new("/nonexistent/final.mp4"), None).await;
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
