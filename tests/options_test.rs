//! Options loading and compatibility presets through the public API.

use std::io::Write;

use tempfile::NamedTempFile;

use trimcss::{Error, Minifier, OptimizationLevel, Options};

fn options_file(json: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(json.as_bytes()).expect("Failed to write options");
    file
}

// ============================================================================
// Options files
// ============================================================================

#[test]
fn test_from_path() {
    let file = options_file(r#"{"level": 2, "level2": {"restructureRules": true}}"#);
    let options = Options::from_path(file.path()).unwrap();
    assert_eq!(options.level, OptimizationLevel::Two);
    assert!(options.level2.restructure_rules);
    assert!(options.level2.merge_adjacent_rules);
}

#[test]
fn test_from_missing_path() {
    let result = Options::from_path("/nonexistent/trimcss.json");
    assert!(matches!(result, Err(Error::Io(_))));
}

#[test]
fn test_malformed_json() {
    let file = options_file(r#"{"level": 2"#);
    assert!(matches!(Options::from_path(file.path()), Err(Error::Json(_))));
}

#[test]
fn test_invalid_level() {
    assert!(matches!(Options::from_json(r#"{"level": 3}"#), Err(Error::Json(_))));
}

#[test]
fn test_invalid_rounding_precision() {
    let result = Options::from_json(r#"{"level1": {"roundingPrecision": "sometimes"}}"#);
    assert!(matches!(result, Err(Error::InvalidOption(_))));
}

// ============================================================================
// Compatibility
// ============================================================================

#[test]
fn test_unknown_preset() {
    let options = Options::from_json(r#"{"compatibility": "netscape4"}"#).unwrap();
    assert!(matches!(Minifier::new(options), Err(Error::InvalidCompatibility(_))));
}

#[test]
fn test_unknown_flag() {
    let options = Options::from_json(r#"{"compatibility": "ie9,+units.furlong"}"#).unwrap();
    assert!(matches!(Minifier::new(options), Err(Error::InvalidCompatibility(_))));
}

#[test]
fn test_invalid_unsafe_pattern() {
    let options = Options::from_json(r#"{"level2": {"unsafeSelectorPattern": "("}}"#).unwrap();
    assert!(matches!(Minifier::new(options), Err(Error::InvalidPattern(_))));
}

#[test]
fn test_ie8_preset() {
    let options = Options::from_json(r#"{"compatibility": "ie8"}"#).unwrap();
    let minifier = Minifier::new(options).unwrap();
    assert!(!minifier.compatibility().colors.opacity);
    assert!(!minifier.compatibility().units.rem);
}

#[test]
fn test_compatibility_table() {
    let options = Options::from_json(
        r#"{"level": 2, "compatibility": {"properties": {"merging": false}}}"#,
    )
    .unwrap();
    let minifier = Minifier::new(options).unwrap();
    assert!(!minifier.compatibility().properties.merging);
    assert!(minifier.compatibility().properties.zero_units);
}

#[test]
fn test_minifier_is_reusable() {
    let minifier = Minifier::new(Options::with_level(OptimizationLevel::Two)).unwrap();
    let first = minifier.minify("a{color:#ff0000}");
    let second = minifier.minify("a{color:#ff0000}");
    assert_eq!(first.css, second.css);
    assert_eq!(first.css, "a{color:red}");
}
