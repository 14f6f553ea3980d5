use crate::error::{Error, ErrorType, Result};
use crate::logging::{log_debug, log_warning};
use std::io::Cursor;
use std::path::Path;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::default::{get_codecs, get_probe};

/// Определяет длительность аудио (MP3, WAV, OGG) в секундах.
///
/// Длительность считается по числу декодированных кадров, так как у MP3
/// без заголовка Xing/VBRI общее число кадров в метаданных отсутствует.
pub fn audio_duration(data: &[u8], extension: Option<&str>) -> Result<f64> {
    log_debug(&format!("Определение длительности аудио размером {} байт", data.len()));

    if data.len() < 4 {
        return Err(Error::new(ErrorType::AudioProcessingError, "Некорректные аудио данные"));
    }

    let cursor = Cursor::new(data.to_vec());
    let mss = MediaSourceStream::new(Box::new(cursor), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = extension {
        hint.with_extension(ext);
    }

    let format_opts = FormatOptions {
        enable_gapless: true,
        ..Default::default()
    };

    let probed = get_probe()
        .format(&hint, mss, &format_opts, &MetadataOptions::default())
        .map_err(|e| Error::new(
            ErrorType::AudioProcessingError,
            &format!("Ошибка определения формата: {}", e),
        ))?;

    let mut format = probed.format;
    let track = format
        .default_track()
        .ok_or_else(|| Error::new(ErrorType::AudioProcessingError, "Не найден аудио поток"))?;

    if track.codec_params.codec == CODEC_TYPE_NULL {
        return Err(Error::new(ErrorType::AudioProcessingError, "Поток не является аудио"));
    }

    let track_id = track.id;
    let codec_params = track.codec_params.clone();
    let mut sample_rate = codec_params.sample_rate;

    // Если контейнер знает длину, декодирование не нужно
    if let (Some(n_frames), Some(rate)) = (codec_params.n_frames, sample_rate) {
        if rate > 0 && n_frames > 0 {
            let duration = n_frames as f64 / rate as f64;
            log_debug(&format!("Длительность по метаданным: {:.3}с", duration));
            return Ok(duration);
        }
    }

    let mut decoder = get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| Error::new(
            ErrorType::AudioProcessingError,
            &format!("Ошибка создания декодера: {}", e),
        ))?;

    let mut total_frames: u64 = 0;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::IoError(_))
            | Err(symphonia::core::errors::Error::ResetRequired) => break,
            Err(err) => {
                log_warning(&format!("Ошибка чтения пакета: {}, остановка", err));
                break;
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                if sample_rate.is_none() {
                    sample_rate = Some(decoded.spec().rate);
                }
                total_frames += decoded.frames() as u64;
            }
            Err(symphonia::core::errors::Error::DecodeError(err)) => {
                log_warning(&format!("Ошибка декодирования пакета: {}, пропускаем", err));
            }
            Err(err) => {
                return Err(Error::new(
                    ErrorType::AudioProcessingError,
                    &format!("Ошибка декодирования: {}", err),
                ));
            }
        }
    }

    let rate = sample_rate
        .filter(|r| *r > 0)
        .ok_or_else(|| Error::new(ErrorType::AudioProcessingError, "Неизвестная частота дискретизации"))?;

    if total_frames == 0 {
        return Err(Error::new(ErrorType::AudioProcessingError, "Не получены аудио кадры"));
    }

    let duration = total_frames as f64 / rate as f64;
    log_debug(&format!("Декодировано {} кадров, длительность {:.3}с", total_frames, duration));
    Ok(duration)
}

/// Длительность MP3 данных
pub fn mp3_duration(data: &[u8]) -> Result<f64> {
    audio_duration(data, Some("mp3"))
}

/// Длительность аудио файла
pub fn file_duration<P: AsRef<Path>>(path: P) -> Result<f64> {
    let path = path.as_ref();
    let data = std::fs::read(path)?;
    let extension = path.extension().and_then(|e| e.to_str());
    audio_duration(&data, extension)
}

/// Минимальный WAV: PCM 16 бит, моно, тишина
pub fn silent_wav_bytes(sample_rate: u32, samples: u32) -> Vec<u8> {
    let data_len = samples * 2;
    let mut bytes = Vec::with_capacity(44 + data_len as usize);
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
    bytes.extend_from_slice(b"WAVE");
    bytes.extend_from_slice(b"fmt ");
    bytes.extend_from_slice(&16u32.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&sample_rate.to_le_bytes());
    bytes.extend_from_slice(&(sample_rate * 2).to_le_bytes());
    bytes.extend_from_slice(&2u16.to_le_bytes());
    bytes.extend_from_slice(&16u16.to_le_bytes());
    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&data_len.to_le_bytes());
    bytes.resize(bytes.len() + data_len as usize, 0);
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wav_duration() {
        let data = silent_wav_bytes(8000, 12000);
        let duration = audio_duration(&data, Some("wav")).unwrap();
        assert!((duration - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_file_duration_uses_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("silence.wav");
        std::fs::write(&path, silent_wav_bytes(16000, 8000)).unwrap();
        let duration = file_duration(&path).unwrap();
        assert!((duration - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(mp3_duration(&[]).is_err());
        assert!(mp3_duration(&[0u8; 64]).is_err());
    }
}
