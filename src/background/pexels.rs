use crate::config::BackgroundSettings;
use crate::error::{Error, Result};
use crate::logging::{log_debug, log_info};
use serde::Deserialize;
use std::path::Path;
use tokio::io::AsyncWriteExt;

const RESULTS_PER_PAGE: u32 = 15;

#[derive(Debug, Clone, Deserialize)]
pub struct VideoFile {
    pub link: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub file_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PexelsVideo {
    pub id: u64,
    #[serde(default)]
    pub video_files: Vec<VideoFile>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    videos: Vec<PexelsVideo>,
}

/// Выбирает файл с наибольшей высотой не меньше `min_height`,
/// а если таких нет, то просто самый высокий. Учитываются только MP4.
pub fn select_video_file(videos: &[PexelsVideo], min_height: u32) -> Option<&VideoFile> {
    let candidates: Vec<&VideoFile> = videos
        .iter()
        .flat_map(|v| v.video_files.iter())
        .filter(|f| f.file_type.as_deref().map(|t| t == "video/mp4").unwrap_or(true))
        .filter(|f| f.height.is_some())
        .collect();

    candidates
        .iter()
        .copied()
        .filter(|f| f.height.unwrap_or(0) >= min_height)
        .max_by_key(|f| f.height)
        .or_else(|| candidates.iter().copied().max_by_key(|f| f.height))
}

/// Клиент поиска стоковых видео Pexels
pub struct PexelsClient {
    api_key: String,
    settings: BackgroundSettings,
    client: reqwest::Client,
}

impl PexelsClient {
    pub fn new(api_key: String, settings: BackgroundSettings) -> Self {
        Self {
            api_key,
            settings,
            client: reqwest::Client::new(),
        }
    }

    fn search_url(&self) -> String {
        format!("{}/videos/search", self.settings.pexels_endpoint.trim_end_matches('/'))
    }

    /// Поисковый запрос для темы
    pub fn query_for(&self, theme: &str) -> String {
        format!("{} {}", theme, self.settings.search_query_suffix).trim().to_string()
    }

    /// Ищет вертикальные видео по теме
    pub async fn search(&self, theme: &str) -> Result<Vec<PexelsVideo>> {
        let query = self.query_for(theme);
        log_debug(&format!("Поиск фонового видео в Pexels: '{}'", query));

        let per_page = RESULTS_PER_PAGE.to_string();
        let response = self
            .client
            .get(self.search_url())
            .header("Authorization", &self.api_key)
            .query(&[
                ("query", query.as_str()),
                ("orientation", "portrait"),
                ("per_page", per_page.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Background(format!("Pexels API {}: {}", status, body)));
        }

        let result: SearchResponse = response.json().await?;
        log_debug(&format!("Pexels вернул {} видео", result.videos.len()));
        Ok(result.videos)
    }

    /// Скачивает файл потоково
    pub async fn download(&self, url: &str, destination: &Path) -> Result<u64> {
        let mut response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(Error::Background(format!(
                "загрузка {} завершилась со статусом {}",
                url,
                response.status()
            )));
        }

        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Недокачанное видео не должно попасть в кэш
        let partial = destination.with_extension("part");
        let result = async {
            let written = write_body(&mut response, &partial).await?;
            tokio::fs::rename(&partial, destination).await?;
            Ok::<_, Error>(written)
        }
        .await;
        let written = match result {
            Ok(written) => written,
            Err(e) => {
                if let Err(remove) = tokio::fs::remove_file(&partial).await {
                    log_debug(&format!("Не удалось удалить {}: {}", partial.display(), remove));
                }
                return Err(e);
            }
        };

        log_info(&format!("Скачано {} байт в {}", written, destination.display()));
        Ok(written)
    }
}

async fn write_body(response: &mut reqwest::Response, path: &Path) -> Result<u64> {
    let mut file = tokio::fs::File::create(path).await?;
    let mut written = 0u64;
    while let Some(chunk) = response.chunk().await? {
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    // Отдает один HTTP ответ с заявленной длиной `declared` и телом `body`
    async fn serve_once(declared: usize, body: &'static [u8]) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 2048];
            let _ = socket.read(&mut request).await;
            let head = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: video/mp4\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                declared
            );
            let _ = socket.write_all(head.as_bytes()).await;
            let _ = socket.write_all(body).await;
            let _ = socket.shutdown().await;
        });
        format!("http://{}/clip.mp4", address)
    }

    #[tokio::test]
    async fn test_download_moves_complete_file() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("videos").join("clip.mp4");
        let url = serve_once(10, b"0123456789").await;

        let client = PexelsClient::new("key".to_string(), BackgroundSettings::default());
        let written = client.download(&url, &destination).await.unwrap();

        assert_eq!(written, 10);
        assert_eq!(std::fs::read(&destination).unwrap(), b"0123456789");
        assert!(!destination.with_extension("part").exists());
    }

    #[tokio::test]
    async fn test_truncated_download_leaves_no_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("clip.mp4");
        let url = serve_once(1000, b"only a few bytes").await;

        let client = PexelsClient::new("key".to_string(), BackgroundSettings::default());
        assert!(client.download(&url, &destination).await.is_err());

        assert!(!destination.exists());
        assert!(!destination.with_extension("part").exists());
    }

    fn file(height: u32, file_type: &str) -> VideoFile {
        VideoFile {
            link: format!("https://example.com/{}.mp4", height),
            width: Some(height * 9 / 16),
            height: Some(height),
            file_type: Some(file_type.to_string()),
        }
    }

    #[test]
    fn test_select_tallest_above_minimum() {
        let videos = vec![
            PexelsVideo {
                id: 1,
                video_files: vec![file(1280, "video/mp4"), file(2560, "video/mp4")],
            },
            PexelsVideo {
                id: 2,
                video_files: vec![file(1920, "video/mp4"), file(4096, "video/webm")],
            },
        ];
        let selected = select_video_file(&videos, 1920).unwrap();
        assert_eq!(selected.height, Some(2560));
    }

    #[test]
    fn test_select_falls_back_to_tallest() {
        let videos = vec![PexelsVideo {
            id: 1,
            video_files: vec![file(720, "video/mp4"), file(1280, "video/mp4")],
        }];
        assert_eq!(select_video_file(&videos, 1920).unwrap().height, Some(1280));
        assert!(select_video_file(&[], 1920).is_none());
    }

    #[test]
    fn test_parse_search_response() {
        let json = r#"{"page": 1, "videos": [{"id": 7, "video_files": [
            {"link": "https://x/1.mp4", "width": 1080, "height": 1920, "file_type": "video/mp4", "quality": "hd"}
        ]}]}"#;
        let response: SearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.videos[0].id, 7);
        assert_eq!(response.videos[0].video_files[0].height, Some(1920));
    }

    #[test]
    fn test_query_for_theme() {
        let settings = BackgroundSettings {
            search_query_suffix: "nature".to_string(),
            ..BackgroundSettings::default()
        };
        let client = PexelsClient::new("key".to_string(), settings);
        assert_eq!(client.query_for("Géographie"), "Géographie nature");
        assert_eq!(client.search_url(), "https://api.pexels.com/videos/search");
    }
}
