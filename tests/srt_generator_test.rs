use std::path::PathBuf;

use quiz_shorts::subtitles::{AudioCue, CueKind, SrtGenerator, SrtParser};

fn cue(text: &str, start: f64, end: f64, kind: CueKind) -> AudioCue {
    AudioCue {
        path: PathBuf::from("unused.mp3"),
        text: text.to_string(),
        start_time: start,
        end_time: end,
        kind,
    }
}

#[test]
fn test_written_file_parses_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("subs/quiz.srt");
    let cues = vec![
        cue("Quelle est la capitale ?", 0.0, 2.0, CueKind::Question),
        cue("Paris.", 5.0, 6.0, CueKind::Answer),
    ];

    let generator = SrtGenerator::new(3.0, true);
    let track = generator.write(&cues, &path).unwrap();
    let parsed = SrtParser::parse_file(&path).unwrap();

    assert_eq!(track.len(), 6);
    assert_eq!(parsed.len(), 6);
    assert_eq!(parsed[0].text, "Quelle");
    assert_eq!(parsed[4].text, "?");
    assert_eq!(parsed[5].text, "Paris.");
    assert!((parsed[5].start_time - 5.0).abs() < 1e-3);
    assert!((parsed[5].end_time - 6.0).abs() < 1e-3);
}

#[test]
fn test_early_answer_is_shifted_by_timer() {
    let cues = vec![
        cue("Deux plus deux ?", 0.0, 1.5, CueKind::Question),
        cue("Quatre", 1.5, 2.5, CueKind::Answer),
    ];

    let track = SrtGenerator::new(3.0, true).allocate(&cues);
    let answer = &track[track.len() - 1];

    assert!((answer.start_time - 4.5).abs() < 1e-9);
    assert!((answer.end_time - 5.5).abs() < 1e-9);
}

#[test]
fn test_whole_cue_mode_and_blank_text() {
    let cues = vec![
        cue("Une phrase entière", 0.0, 2.0, CueKind::Other),
        cue("   ", 2.0, 3.0, CueKind::Other),
    ];

    let track = SrtGenerator::new(3.0, false).allocate(&cues);

    assert_eq!(track.len(), 1);
    assert_eq!(track[0].text, "Une phrase entière");

    let rendered = SrtGenerator::render(&track);
    assert_eq!(rendered, "1\n00:00:00,000 --> 00:00:02,000\nUne phrase entière\n\n");
}

#[test]
fn test_empty_track_is_not_written() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.srt");
    let cues = vec![cue("", 0.0, 1.0, CueKind::Question)];

    assert!(SrtGenerator::new(3.0, true).write(&cues, &path).is_err());
    assert!(!path.exists());
}
