//! Minifier configuration.
//!
//! Every struct deserializes from camelCase JSON with defaults for missing
//! fields, so `{"level": 2, "level2": {"restructureRules": true}}` is a
//! complete options file.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::compat::CompatibilitySource;
use crate::error::{Error, Result};

/// Which optimizer levels run. Each level includes the ones below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Deserialize)]
#[serde(try_from = "u8")]
pub enum OptimizationLevel {
    /// Structural cleanup only
    Zero,
    /// Plus value and property rewriting
    #[default]
    One,
    /// Plus cross-rule merging and restructuring
    Two,
}

impl TryFrom<u8> for OptimizationLevel {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(OptimizationLevel::Zero),
            1 => Ok(OptimizationLevel::One),
            2 => Ok(OptimizationLevel::Two),
            other => Err(format!("optimization level must be 0, 1 or 2, got {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Options {
    pub level: OptimizationLevel,
    pub compatibility: CompatibilitySource,
    pub level0: Level0Options,
    pub level1: Level1Options,
    pub level2: Level2Options,
}

impl Options {
    /// Options for a level with every default sub-flag.
    pub fn with_level(level: OptimizationLevel) -> Self {
        Self {
            level,
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let options: Options = serde_json::from_str(json)?;
        options.check()?;
        Ok(options)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Reject values the type system cannot rule out.
    pub fn check(&self) -> Result<()> {
        self.level1.rounding_precision.check()
    }
}

// ============================================================================
// Level 0
// ============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Level0Options {
    /// Keep only the first `@charset` and move it to the front
    pub normalize_charset: bool,
    pub remove_empty: bool,
    /// Drop `@import` rules that follow other content
    pub remove_misplaced_imports: bool,
    pub selectors_sorting_method: SortingMethod,
    pub special_comments: SpecialComments,
    pub tidy_at_rules: bool,
    pub tidy_block_scopes: bool,
    pub tidy_selectors: bool,
}

impl Default for Level0Options {
    fn default() -> Self {
        Self {
            normalize_charset: true,
            remove_empty: true,
            remove_misplaced_imports: true,
            selectors_sorting_method: SortingMethod::Standard,
            special_comments: SpecialComments::All,
            tidy_at_rules: true,
            tidy_block_scopes: true,
            tidy_selectors: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortingMethod {
    #[default]
    Standard,
    Natural,
    None,
}

/// How many `/*! ... */` comments survive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "RawCount")]
pub enum SpecialComments {
    #[default]
    All,
    /// Keep the first N
    First(usize),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCount {
    Number(usize),
    Text(String),
}

impl TryFrom<RawCount> for SpecialComments {
    type Error = String;

    fn try_from(raw: RawCount) -> std::result::Result<Self, Self::Error> {
        match raw {
            RawCount::Number(n) => Ok(SpecialComments::First(n)),
            RawCount::Text(text) => match text.as_str() {
                "all" | "*" => Ok(SpecialComments::All),
                other => other
                    .parse()
                    .map(SpecialComments::First)
                    .map_err(|_| format!("invalid specialComments value '{other}'")),
            },
        }
    }
}

impl SpecialComments {
    pub fn keeps(&self, index: usize) -> bool {
        match self {
            SpecialComments::All => true,
            SpecialComments::First(n) => index < *n,
        }
    }
}

// ============================================================================
// Level 1
// ============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Level1Options {
    pub normalize_urls: bool,
    pub optimize_background: bool,
    pub optimize_border_radius: bool,
    pub optimize_filter: bool,
    pub optimize_font: bool,
    pub optimize_font_weight: bool,
    pub optimize_outline: bool,
    pub remove_negative_paddings: bool,
    pub remove_quotes: bool,
    pub remove_whitespace: bool,
    pub replace_multiple_zeros: bool,
    pub replace_time_units: bool,
    pub replace_zero_units: bool,
    pub rounding_precision: RoundingPrecision,
}

impl Default for Level1Options {
    fn default() -> Self {
        Self {
            normalize_urls: true,
            optimize_background: true,
            optimize_border_radius: true,
            optimize_filter: true,
            optimize_font: true,
            optimize_font_weight: true,
            optimize_outline: true,
            remove_negative_paddings: true,
            remove_quotes: true,
            remove_whitespace: true,
            replace_multiple_zeros: true,
            replace_time_units: true,
            replace_zero_units: true,
            rounding_precision: RoundingPrecision::default(),
        }
    }
}

/// Decimal places for one unit: a count or `"off"`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Precision {
    Places(u32),
    Keyword(String),
}

impl Precision {
    fn places(&self) -> Option<u32> {
        match self {
            Precision::Places(places) => Some(*places),
            Precision::Keyword(_) => None,
        }
    }

    fn check(&self) -> Result<()> {
        match self {
            Precision::Keyword(keyword) if keyword != "off" => Err(Error::InvalidOption(format!(
                "rounding precision must be a number or \"off\", got \"{keyword}\""
            ))),
            _ => Ok(()),
        }
    }
}

/// `"off"`, a single precision, or a per-unit map with an optional `"*"` fallback.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RoundingPrecision {
    All(Precision),
    PerUnit(BTreeMap<String, Precision>),
}

impl Default for RoundingPrecision {
    fn default() -> Self {
        RoundingPrecision::All(Precision::Keyword("off".to_string()))
    }
}

impl RoundingPrecision {
    /// Decimal places to keep for `unit` (`""` for unitless), if rounding applies.
    pub fn for_unit(&self, unit: &str) -> Option<u32> {
        match self {
            RoundingPrecision::All(precision) => precision.places(),
            RoundingPrecision::PerUnit(map) => map
                .get(&unit.to_ascii_lowercase())
                .or_else(|| map.get("*"))
                .and_then(Precision::places),
        }
    }

    pub fn is_enabled(&self) -> bool {
        match self {
            RoundingPrecision::All(precision) => precision.places().is_some(),
            RoundingPrecision::PerUnit(map) => map.values().any(|p| p.places().is_some()),
        }
    }

    fn check(&self) -> Result<()> {
        match self {
            RoundingPrecision::All(precision) => precision.check(),
            RoundingPrecision::PerUnit(map) => map.values().try_for_each(Precision::check),
        }
    }
}

// ============================================================================
// Level 2
// ============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Level2Options {
    pub merge_adjacent_rules: bool,
    pub merge_into_shorthands: bool,
    pub merge_media: bool,
    pub merge_non_adjacent_rules: NonAdjacentMerge,
    pub merge_semantically: bool,
    pub override_properties: bool,
    pub reduce_non_adjacent_rules: bool,
    pub remove_duplicate_font_rules: bool,
    pub remove_duplicate_media_blocks: bool,
    pub remove_duplicate_rules: bool,
    pub remove_empty: bool,
    pub remove_unused_at_rules: bool,
    pub restructure_rules: bool,
    /// Property names left untouched by level-2 property optimization
    pub skip_properties: Vec<String>,
    /// Selectors matching this regex never merge by body
    pub unsafe_selector_pattern: Option<String>,
}

impl Default for Level2Options {
    fn default() -> Self {
        Self {
            merge_adjacent_rules: true,
            merge_into_shorthands: true,
            merge_media: true,
            merge_non_adjacent_rules: NonAdjacentMerge::All,
            merge_semantically: false,
            override_properties: true,
            reduce_non_adjacent_rules: true,
            remove_duplicate_font_rules: true,
            remove_duplicate_media_blocks: true,
            remove_duplicate_rules: true,
            remove_empty: true,
            remove_unused_at_rules: false,
            restructure_rules: false,
            skip_properties: Vec::new(),
            unsafe_selector_pattern: None,
        }
    }
}

impl Level2Options {
    /// Every level-2 pass switched on.
    pub fn all() -> Self {
        Self {
            merge_semantically: true,
            remove_unused_at_rules: true,
            restructure_rules: true,
            ..Self::default()
        }
    }
}

/// Which non-adjacent merges run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "RawMerge")]
pub enum NonAdjacentMerge {
    Off,
    #[default]
    All,
    Selector,
    Body,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawMerge {
    Flag(bool),
    Mode(String),
}

impl TryFrom<RawMerge> for NonAdjacentMerge {
    type Error = String;

    fn try_from(raw: RawMerge) -> std::result::Result<Self, Self::Error> {
        match raw {
            RawMerge::Flag(true) => Ok(NonAdjacentMerge::All),
            RawMerge::Flag(false) => Ok(NonAdjacentMerge::Off),
            RawMerge::Mode(mode) => match mode.as_str() {
                "selector" => Ok(NonAdjacentMerge::Selector),
                "body" => Ok(NonAdjacentMerge::Body),
                other => Err(format!("invalid mergeNonAdjacentRules value '{other}'")),
            },
        }
    }
}

impl NonAdjacentMerge {
    pub fn by_selector(self) -> bool {
        matches!(self, NonAdjacentMerge::All | NonAdjacentMerge::Selector)
    }

    pub fn by_body(self) -> bool {
        matches!(self, NonAdjacentMerge::All | NonAdjacentMerge::Body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_json() {
        let options = Options::from_json("{}").unwrap();
        assert_eq!(options, Options::default());
        assert_eq!(options.level, OptimizationLevel::One);
        assert!(!options.level2.restructure_rules);
    }

    #[test]
    fn test_partial_json() {
        let options = Options::from_json(
            r#"{"level": 2, "compatibility": "ie8", "level2": {"mergeNonAdjacentRules": "body"}}"#,
        )
        .unwrap();
        assert_eq!(options.level, OptimizationLevel::Two);
        assert_eq!(options.compatibility, CompatibilitySource::Preset("ie8".to_string()));
        assert!(options.level2.merge_non_adjacent_rules.by_body());
        assert!(!options.level2.merge_non_adjacent_rules.by_selector());
        assert!(options.level2.merge_media);
    }

    #[test]
    fn test_invalid_level() {
        assert!(Options::from_json(r#"{"level": 3}"#).is_err());
    }

    #[test]
    fn test_rounding_precision_forms() {
        let options = Options::from_json(r#"{"level1": {"roundingPrecision": 2}}"#).unwrap();
        assert_eq!(options.level1.rounding_precision.for_unit("px"), Some(2));

        let options =
            Options::from_json(r#"{"level1": {"roundingPrecision": {"*": 3, "px": 0, "em": "off"}}}"#)
                .unwrap();
        let precision = &options.level1.rounding_precision;
        assert_eq!(precision.for_unit("px"), Some(0));
        assert_eq!(precision.for_unit("%"), Some(3));
        assert_eq!(precision.for_unit("em"), None);

        let options = Options::from_json(r#"{"level1": {"roundingPrecision": "off"}}"#).unwrap();
        assert!(!options.level1.rounding_precision.is_enabled());

        assert!(Options::from_json(r#"{"level1": {"roundingPrecision": "max"}}"#).is_err());
    }

    #[test]
    fn test_special_comments() {
        let options = Options::from_json(r#"{"level0": {"specialComments": 1}}"#).unwrap();
        assert!(options.level0.special_comments.keeps(0));
        assert!(!options.level0.special_comments.keeps(1));

        let options = Options::from_json(r#"{"level0": {"specialComments": "all"}}"#).unwrap();
        assert!(options.level0.special_comments.keeps(100));
    }

    #[test]
    fn test_non_adjacent_flag() {
        let options =
            Options::from_json(r#"{"level2": {"mergeNonAdjacentRules": false}}"#).unwrap();
        assert_eq!(options.level2.merge_non_adjacent_rules, NonAdjacentMerge::Off);
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("options.json");
        std::fs::write(&path, r#"{"level": 0}"#).unwrap();
        let options = Options::from_path(&path).unwrap();
        assert_eq!(options.level, OptimizationLevel::Zero);

        assert!(Options::from_path(dir.path().join("missing.json")).is_err());
    }
}
