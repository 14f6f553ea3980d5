use crate::config::VideoSettings;
use crate::error::{Error, ErrorType, Result};
use crate::logging::{log_debug, log_info};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// Сколько последних строк stderr попадает в текст ошибки
const STDERR_TAIL_LINES: usize = 15;

/// Сведения о файле из ffprobe
#[derive(Debug, Clone, PartialEq)]
pub struct MediaInfo {
    pub duration: f64,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub has_audio: bool,
}

/// Параметры кодирования результата
#[derive(Debug, Clone)]
pub struct EncodeSettings {
    pub fps: u32,
    pub video_codec: String,
    pub audio_codec: String,
    pub preset: String,
    pub threads: u32,
}

impl Default for EncodeSettings {
    fn default() -> Self {
        Self::from_video_settings(&VideoSettings::default())
    }
}

impl EncodeSettings {
    pub fn from_video_settings(settings: &VideoSettings) -> Self {
        Self {
            fps: settings.fps,
            video_codec: settings.video_codec.clone(),
            audio_codec: settings.audio_codec.clone(),
            preset: settings.preset.clone(),
            threads: settings.threads,
        }
    }

    /// Аргументы кодеков для выходного файла
    pub fn output_args(&self) -> Vec<String> {
        vec![
            "-r".to_string(),
            self.fps.to_string(),
            "-c:v".to_string(),
            self.video_codec.clone(),
            "-preset".to_string(),
            self.preset.clone(),
            "-pix_fmt".to_string(),
            "yuv420p".to_string(),
            "-c:a".to_string(),
            self.audio_codec.clone(),
            "-threads".to_string(),
            self.threads.to_string(),
            "-movflags".to_string(),
            "+faststart".to_string(),
        ]
    }
}

/// Параметры перекадрирования в вертикальный фон
#[derive(Debug, Clone)]
pub struct ReframeOptions {
    pub width: u32,
    pub height: u32,
    /// Начало фрагмента в секундах
    pub start: Option<f64>,
    /// Конец фрагмента в секундах
    pub end: Option<f64>,
    /// Размытая подложка вместо обрезки
    pub blur: bool,
    pub blur_radius: u32,
    pub encode: EncodeSettings,
}

impl Default for ReframeOptions {
    fn default() -> Self {
        Self {
            width: 1080,
            height: 1920,
            start: None,
            end: None,
            blur: false,
            blur_radius: 20,
            encode: EncodeSettings::default(),
        }
    }
}

/// Запуск ffmpeg и ffprobe
#[derive(Debug, Clone)]
pub struct FfmpegRunner {
    ffmpeg_path: PathBuf,
    ffprobe_path: PathBuf,
}

impl Default for FfmpegRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl FfmpegRunner {
    /// Бинарники ищутся в PATH
    pub fn new() -> Self {
        Self::with_paths("ffmpeg", "ffprobe")
    }

    pub fn with_paths<P: Into<PathBuf>, Q: Into<PathBuf>>(ffmpeg: P, ffprobe: Q) -> Self {
        Self {
            ffmpeg_path: ffmpeg.into(),
            ffprobe_path: ffprobe.into(),
        }
    }

    /// Запускает ffmpeg; при ошибке возвращает хвост stderr
    pub async fn run(&self, args: &[String]) -> Result<()> {
        log_debug(&format!("ffmpeg {}", args.join(" ")));

        let output = Command::new(&self.ffmpeg_path)
            .arg("-hide_banner")
            .arg("-y")
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| Error::new(
                ErrorType::Ffmpeg,
                &format!("не удалось запустить {}: {}", self.ffmpeg_path.display(), e),
            ))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Ffmpeg(format!(
                "ffmpeg завершился с {}: {}",
                output.status,
                stderr_tail(&stderr)
            )));
        }

        Ok(())
    }

    /// Читает длительность и размеры через ffprobe
    pub async fn probe(&self, input: &Path) -> Result<MediaInfo> {
        if !input.exists() {
            return Err(Error::InvalidParameters(format!(
                "файл не найден: {}",
                input.display()
            )));
        }

        let output = Command::new(&self.ffprobe_path)
            .args(["-v", "quiet", "-print_format", "json", "-show_format", "-show_streams"])
            .arg(input)
            .output()
            .await
            .map_err(|e| Error::new(
                ErrorType::Ffmpeg,
                &format!("не удалось запустить {}: {}", self.ffprobe_path.display(), e),
            ))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Ffmpeg(format!("ffprobe: {}", stderr_tail(&stderr))));
        }

        parse_probe_output(&String::from_utf8_lossy(&output.stdout))
    }

    pub async fn probe_duration(&self, input: &Path) -> Result<f64> {
        let info = self.probe(input).await?;
        if !(info.duration > 0.0) {
            return Err(Error::Ffmpeg(format!("нулевая длительность: {}", input.display())));
        }
        Ok(info.duration)
    }

    /// Перекадрирует любое видео в вертикальный фон без звука
    pub async fn reframe_vertical(&self, input: &Path, output: &Path, options: &ReframeOptions) -> Result<()> {
        if let (Some(start), Some(end)) = (options.start, options.end) {
            if end <= start {
                return Err(Error::InvalidParameters(format!(
                    "конец фрагмента {} раньше начала {}",
                    end, start
                )));
            }
        }

        if let Some(parent) = output.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        log_info(&format!(
            "Перекадрирование {} в {}x{}",
            input.display(),
            options.width,
            options.height
        ));
        self.run(&reframe_args(input, output, options)).await?;
        log_info(&format!("Фон сохранен: {}", output.display()));
        Ok(())
    }
}

/// Аргументы ffmpeg для перекадрирования
pub fn reframe_args(input: &Path, output: &Path, options: &ReframeOptions) -> Vec<String> {
    let (w, h) = (options.width, options.height);
    let mut args = Vec::new();

    if let Some(start) = options.start {
        args.push("-ss".to_string());
        args.push(format!("{:.3}", start));
    }
    if let Some(end) = options.end {
        args.push("-to".to_string());
        args.push(format!("{:.3}", end));
    }
    args.push("-i".to_string());
    args.push(input.to_string_lossy().into_owned());

    let filter = if options.blur {
        format!(
            "split=2[bg][fg];\
             [bg]scale={w}:{h}:force_original_aspect_ratio=increase,crop={w}:{h},boxblur={r}[bgb];\
             [fg]scale={w}:{h}:force_original_aspect_ratio=decrease[fgs];\
             [bgb][fgs]overlay=(W-w)/2:(H-h)/2,setsar=1",
            w = w,
            h = h,
            r = options.blur_radius
        )
    } else {
        format!("scale={w}:{h}:force_original_aspect_ratio=increase,crop={w}:{h},setsar=1", w = w, h = h)
    };

    args.push("-vf".to_string());
    args.push(filter);
    args.push("-an".to_string());
    args.extend(options.encode.output_args());
    args.push(output.to_string_lossy().into_owned());
    args
}

fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}

fn parse_probe_output(json_str: &str) -> Result<MediaInfo> {
    let json: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|e| Error::Ffmpeg(format!("не удалось разобрать вывод ffprobe: {}", e)))?;

    let format = json
        .get("format")
        .ok_or_else(|| Error::Ffmpeg("в выводе ffprobe нет format".to_string()))?;

    let duration = format
        .get("duration")
        .and_then(|d| d.as_str())
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.0);

    let streams = json
        .get("streams")
        .and_then(|s| s.as_array())
        .cloned()
        .unwrap_or_default();

    let video = streams
        .iter()
        .find(|s| s.get("codec_type").and_then(|c| c.as_str()) == Some("video"));
    let dimension = |key: &str| {
        video
            .and_then(|v| v.get(key))
            .and_then(|v| v.as_u64())
            .map(|v| v as u32)
    };
    let has_audio = streams
        .iter()
        .any(|s| s.get("codec_type").and_then(|c| c.as_str()) == Some("audio"));

    Ok(MediaInfo {
        duration,
        width: dimension("width"),
        height: dimension("height"),
        has_audio,
    })
}
