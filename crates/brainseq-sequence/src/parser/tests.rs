use super::*;
use crate::options::GainLevel;
use crate::voice::{amplitude_from_percent, NoiseColor, Voice};
use pretty_assertions::assert_eq;

fn parse(text: &str) -> SequenceResult<Sequence> {
    let mut parser = Parser::new();
    parser.parse_str(text)?;
    parser.finish(&CompileOptions::default())
}

fn parse_err(text: &str) -> SequenceError {
    parse(text).unwrap_err()
}

fn line_of(err: &SequenceError) -> usize {
    match err {
        SequenceError::Line { line, .. } => *line,
        other => panic!("expected a line error, got {other:?}"),
    }
}

const TAIL: &str = "00:00:00 silence\n00:01:00 silence\n";

#[test]
fn test_options_are_applied() {
    let seq = parse(&format!(
        "@volume 75\n@gainlevel high\n@samplerate 48000\n{TAIL}"
    ))
    .unwrap();
    let options = seq.options();
    assert_eq!(options.volume, 75);
    assert_eq!(options.gain_level, GainLevel::High);
    assert_eq!(options.sample_rate, Some(48_000));
    assert_eq!(options.background, None);
}

#[test]
fn test_option_after_content_is_rejected() {
    let err = parse_err("00:00:00 silence\n@volume 50\n00:01:00 silence\n");
    assert_eq!(err.code(), Some(ErrorCode::InvalidOption));
    assert_eq!(line_of(&err), 2);
}

#[test]
fn test_option_values_are_checked() {
    let cases = [
        ("@volume 101", ErrorCode::InvalidOption, "Volume value must be between 0 and 100"),
        ("@volume loud", ErrorCode::InvalidOption, "Invalid volume value"),
        ("@gainlevel max", ErrorCode::InvalidOption, "Invalid gain level"),
        ("@samplerate 0", ErrorCode::InvalidOption, "Invalid samplerate value"),
        ("@tempo 120", ErrorCode::InvalidOption, "Invalid option"),
        ("@volume 50 junk", ErrorCode::InvalidSyntax, "Invalid syntax"),
        ("@background a.wav b.wav", ErrorCode::InvalidSyntax, "Invalid syntax"),
        ("@gainlevel low high", ErrorCode::InvalidSyntax, "Invalid syntax"),
    ];
    for (line, code, message) in cases {
        let err = parse_err(&format!("{line}\n{TAIL}"));
        assert_eq!(err.code(), Some(code), "{line}");
        assert!(err.to_string().contains(message), "{line}: {err}");
    }
}

#[test]
fn test_background_only_once() {
    let err = parse_err(&format!("@background a.wav\n@background b.wav\n{TAIL}"));
    assert_eq!(err.code(), Some(ErrorCode::DuplicateBackground));
    assert!(err.to_string().contains("Background file already set"));
}

#[test]
fn test_background_resolves_next_to_sequence_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("brainseq-parser-rain.raw"), [0u8; 8]).unwrap();
    let seq_path = dir.path().join("s.bseq");
    std::fs::write(
        &seq_path,
        format!("@background brainseq-parser-rain.raw\n{TAIL}"),
    )
    .unwrap();

    let mut parser = Parser::new();
    parser.parse_file(&seq_path).unwrap();
    let seq = parser.finish(&CompileOptions::default()).unwrap();
    assert_eq!(
        seq.options().background.as_deref(),
        Some(dir.path().join("brainseq-parser-rain.raw").as_path())
    );
}

#[test]
fn test_missing_background_is_kept_as_written() {
    let dir = tempfile::tempdir().unwrap();
    let seq_path = dir.path().join("s.bseq");
    std::fs::write(&seq_path, format!("@background nowhere.raw\n{TAIL}")).unwrap();

    let mut parser = Parser::new();
    parser.parse_file(&seq_path).unwrap();
    let seq = parser.finish(&CompileOptions::default()).unwrap();
    assert_eq!(
        seq.options().background.as_deref(),
        Some(Path::new("nowhere.raw"))
    );
}

#[test]
fn test_background_voice_sets_flag() {
    let seq = parse(&format!(
        "@background rain.wav\nrain\n  background amplitude 60\n  \
         effect pulse 4 intensity 30\n00:00:00 rain\n00:01:00 silence\n"
    ))
    .unwrap();
    assert!(seq.uses_background());
    assert_eq!(
        seq.options().background.as_deref(),
        Some(std::path::Path::new("rain.wav"))
    );
}

#[test]
fn test_indentation_must_be_two_spaces() {
    for bad in [" tone 1 binaural 1 amplitude 1", "   tone 1 binaural 1 amplitude 1"] {
        let err = parse_err(&format!("alpha\n{bad}\n{TAIL}"));
        assert_eq!(err.code(), Some(ErrorCode::InvalidIndentation));
        assert_eq!(line_of(&err), 2);
        assert!(err.to_string().contains("exactly 2 spaces"));
    }
}

#[test]
fn test_empty_definition() {
    let err = parse_err(&format!("alpha\n{TAIL}"));
    assert_eq!(err.code(), Some(ErrorCode::EmptyDefinition));
    assert!(err.to_string().contains("Empty definition for 'alpha'"));

    let at_eof = parse_err("alpha\n");
    assert_eq!(at_eof.code(), Some(ErrorCode::EmptyDefinition));
    assert_eq!(line_of(&at_eof), 1);
}

#[test]
fn test_too_many_voices() {
    let mut text = String::from("busy\n");
    for _ in 0..17 {
        text.push_str("  noise pink amplitude 1\n");
    }
    text.push_str(TAIL);
    let err = parse_err(&text);
    assert_eq!(err.code(), Some(ErrorCode::TooManyVoices));
    assert_eq!(line_of(&err), 18);
    assert!(err.to_string().contains("Too many voice definitions in 'busy' (max 16)"));
}

#[test]
fn test_silence_is_reserved() {
    let err = parse_err(&format!("silence\n  noise pink amplitude 10\n{TAIL}"));
    assert_eq!(err.code(), Some(ErrorCode::ReservedName));
}

#[test]
fn test_header_with_extra_words() {
    let err = parse_err(&format!("alpha beta\n  noise pink amplitude 10\n{TAIL}"));
    assert_eq!(err.code(), Some(ErrorCode::InvalidSyntax));
}

#[test]
fn test_definition_is_normalized() {
    let mut parser = Parser::new();
    parser
        .parse_str("loud\n  noise pink amplitude 60\n  noise white amplitude 60\n")
        .unwrap();
    let def = parser.names.get("loud").unwrap();
    let expected = amplitude_from_percent(60.0) * (100.0 / 120.0);
    assert!((def.voices[0].amplitude() - expected).abs() < 1e-9);
    assert!((def.voices[1].amplitude() - expected).abs() < 1e-9);
}

#[test]
fn test_later_definition_wins() {
    let mut parser = Parser::new();
    parser
        .parse_str("a\n  noise pink amplitude 10\na\n  noise brown amplitude 20\n00:00:00 a\n")
        .unwrap();
    let head = parser.ring.head().unwrap();
    assert_eq!(
        parser.ring.get(head).start[0],
        Voice::Noise {
            color: NoiseColor::Brown,
            amplitude: amplitude_from_percent(20.0)
        }
    );
}

#[test]
fn test_timeline_errors() {
    let err = parse_err("00:00:00 nothing\n");
    assert_eq!(err.code(), Some(ErrorCode::UndefinedPreset));
    assert!(err.to_string().contains("Preset \"nothing\" not defined"));

    let err = parse_err("0:0 silence\n");
    assert_eq!(err.code(), Some(ErrorCode::InvalidTime));
    assert!(err.to_string().contains("Invalid time \"0:0\""));

    let err = parse_err("00:00:00\n");
    assert_eq!(err.code(), Some(ErrorCode::InvalidSyntax));

    let err = parse_err("00:00:00 silence now\n");
    assert_eq!(err.code(), Some(ErrorCode::InvalidSyntax));
    assert!(err.to_string().contains("Bad sequence line"));
}

#[test]
fn test_error_carries_line_text() {
    let err = parse_err("alpha\n  tone 440 binaural 4 amplitude 150\n");
    match err {
        SequenceError::Line {
            code, line, text, ..
        } => {
            assert_eq!(code, ErrorCode::ValueOutOfRange);
            assert_eq!(line, 2);
            assert_eq!(text, "tone 440 binaural 4 amplitude 150");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_each_entry_adds_steady_and_slide_nodes() {
    let mut parser = Parser::new();
    parser.parse_str(TAIL).unwrap();
    assert_eq!(parser.ring.len(), 4);
    assert_eq!(parser.entry_times, vec![0, 60_000]);
    let marks: Vec<_> = parser
        .ring
        .iter()
        .map(|i| parser.ring.get(i).transition)
        .collect();
    assert_eq!(
        marks,
        vec![None, Some(TransitionMark::Slide), None, Some(TransitionMark::Slide)]
    );
}

#[test]
fn test_out_of_order_timeline() {
    let err = parse_err("00:00:10 silence\n00:00:00 silence\n");
    assert_eq!(err.code(), Some(ErrorCode::OutOfOrder));
}

#[test]
fn test_comment_echo() {
    let mut echoed = Vec::new();
    {
        let mut parser = Parser::new().with_echo(|s| echoed.push(s.to_string()));
        parser.parse_str("## hello\n00:00:00 silence ## start\n").unwrap();
    }
    assert_eq!(echoed, vec![" hello", " start"]);
}

#[test]
fn test_multiple_sources_share_presets() {
    let mut parser = Parser::new();
    parser.parse_str("@volume 50\nalpha\n  noise pink amplitude 10\n").unwrap();
    parser.parse_str("@gainlevel low\n00:00:00 alpha\n00:01:00 silence\n").unwrap();
    let seq = parser.finish(&CompileOptions::default()).unwrap();
    assert_eq!(seq.options().volume, 50);
    assert_eq!(seq.options().gain_level, GainLevel::Low);
}

#[test]
fn test_parse_file_reports_missing_file() {
    let mut parser = Parser::new();
    let err = parser
        .parse_file(Path::new("/nonexistent/session.bseq"))
        .unwrap_err();
    assert!(matches!(err, SequenceError::Io { .. }));
    assert_eq!(err.code(), None);
}

#[test]
fn test_definition_header_detection() {
    assert!(is_definition_header("alpha"));
    assert!(is_definition_header("deep-sleep_2"));
    assert!(is_definition_header("alpha extra"));
    assert!(!is_definition_header("00:00:00 alpha"));
    assert!(!is_definition_header("alpha:"));
}
