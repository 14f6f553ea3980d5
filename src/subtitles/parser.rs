use crate::error::{Error, Result};
use crate::subtitles::models::{Subtitle, SubtitleTrack};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{2}):(\d{2}):(\d{2}),(\d{3})\s*-->\s*(\d{2}):(\d{2}):(\d{2}),(\d{3})")
        .expect("valid timestamp regex")
});

/// Парсер SRT файлов
pub struct SrtParser;

impl SrtParser {
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<SubtitleTrack> {
        let file = File::open(path)?;
        Self::parse_reader(BufReader::new(file))
    }

    pub fn parse_str(content: &str) -> Result<SubtitleTrack> {
        Self::parse_reader(BufReader::new(content.as_bytes()))
    }

    /// Разбирает нумерованные блоки; многострочный текст склеивается через пробел
    pub fn parse_reader<R: BufRead>(reader: R) -> Result<SubtitleTrack> {
        let mut track = SubtitleTrack::new();
        let mut current: Option<(f64, f64)> = None;
        let mut text = String::new();

        for line in reader.lines() {
            let line = line?;
            let trimmed = line.trim().trim_start_matches('\u{feff}');

            if let Some(captures) = TIMESTAMP_REGEX.captures(trimmed) {
                Self::flush(&mut track, current.take(), &mut text);
                let start = Self::parse_timestamp(&captures[1], &captures[2], &captures[3], &captures[4])?;
                let end = Self::parse_timestamp(&captures[5], &captures[6], &captures[7], &captures[8])?;
                current = Some((start, end));
            } else if trimmed.is_empty() {
                Self::flush(&mut track, current.take(), &mut text);
            } else if current.is_some() {
                if !text.is_empty() {
                    text.push(' ');
                }
                text.push_str(trimmed);
            }
            // Номера блоков вне блока пропускаются
        }
        Self::flush(&mut track, current, &mut text);

        track.sort();
        Ok(track)
    }

    fn flush(track: &mut SubtitleTrack, times: Option<(f64, f64)>, text: &mut String) {
        if let Some((start, end)) = times {
            if !text.trim().is_empty() {
                track.add(Subtitle::new(start, end, text.trim().to_string()));
            }
        }
        text.clear();
    }

    fn parse_timestamp(hours: &str, minutes: &str, seconds: &str, milliseconds: &str) -> Result<f64> {
        let parse = |value: &str, name: &str| -> Result<f64> {
            value
                .parse::<u32>()
                .map(f64::from)
                .map_err(|_| Error::Subtitles(format!("Invalid {}: {}", name, value)))
        };

        Ok(parse(hours, "hours")? * 3600.0
            + parse(minutes, "minutes")? * 60.0
            + parse(seconds, "seconds")?
            + parse(milliseconds, "milliseconds")? / 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp() {
        assert_eq!(SrtParser::parse_timestamp("00", "00", "01", "000").unwrap(), 1.0);
        assert_eq!(SrtParser::parse_timestamp("01", "30", "45", "500").unwrap(), 5445.5);
    }

    #[test]
    fn test_parse_blocks() {
        let srt = "1\n00:00:01,000 --> 00:00:02,500\nBonjour\n\n2\n00:00:03,000 --> 00:00:04,000\nLa réponse\nest Paris\n";
        let track = SrtParser::parse_str(srt).unwrap();

        assert_eq!(track.len(), 2);
        assert_eq!(track[0].start_time, 1.0);
        assert_eq!(track[0].end_time, 2.5);
        assert_eq!(track[1].text, "La réponse est Paris");
    }

    #[test]
    fn test_parse_empty() {
        assert!(SrtParser::parse_str("").unwrap().is_empty());
    }
}
