//! Browser compatibility matrix.
//!
//! A [`Compatibility`] table is resolved once per minifier from either a
//! preset string or a JSON object and is read-only during optimization.
//!
//! ## Preset strings
//!
//! ```text
//! *                          modern browsers (default)
//! ie11 | ie10 | ie9 | ie8 | ie7
//! ie8,+units.rem,-properties.merging
//! ```
//!
//! Each `+group.flag` / `-group.flag` entry switches a single boolean.

pub mod validator;

pub use validator::Validator;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Which rewrites and merges the target browsers tolerate.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Compatibility {
    pub colors: Colors,
    pub properties: Properties,
    pub selectors: Selectors,
    pub units: Units,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Colors {
    /// `#rrggbbaa` and `#rgba` notation
    pub hex_alpha: bool,
    /// `rgba()` / `hsla()` and `transparent`
    pub opacity: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Properties {
    pub background_clip_merging: bool,
    pub background_origin_merging: bool,
    pub background_size_merging: bool,
    /// Color value rewriting
    pub colors: bool,
    /// `color: red !ie`
    pub ie_bang_hack: bool,
    /// `filter` / `-ms-filter` with `progid:`
    pub ie_filters: bool,
    /// `*zoom`, `_height`
    pub ie_prefix_hack: bool,
    /// `color: red\9`
    pub ie_suffix_hack: bool,
    /// Shorthand merging in level 2
    pub merging: bool,
    /// `12pt` instead of `16px`
    pub shorter_length_units: bool,
    pub space_after_closing_brace: bool,
    pub url_quotes: bool,
    pub zero_units: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Selectors {
    pub adjacent_space: bool,
    /// Keep `*+html` and `*:first-child+html`
    pub ie7_hack: bool,
    pub mergeable_pseudo_classes: Vec<String>,
    pub mergeable_pseudo_elements: Vec<String>,
    /// Maximum selector-list length produced by a merge
    pub merge_limit: usize,
    pub multiple_pseudo_merging: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Units {
    pub ch: bool,
    #[serde(rename = "in")]
    pub inch: bool,
    pub pc: bool,
    pub pt: bool,
    pub rem: bool,
    pub vh: bool,
    pub vm: bool,
    pub vmax: bool,
    pub vmin: bool,
    pub vw: bool,
}

// ============================================================================
// Defaults
// ============================================================================

const MERGEABLE_PSEUDO_CLASSES: &[&str] = &[
    ":active",
    ":after",
    ":before",
    ":checked",
    ":disabled",
    ":empty",
    ":enabled",
    ":first-child",
    ":first-letter",
    ":first-line",
    ":first-of-type",
    ":focus",
    ":hover",
    ":lang",
    ":last-child",
    ":last-of-type",
    ":link",
    ":not",
    ":only-child",
    ":only-of-type",
    ":root",
    ":target",
    ":visited",
];

const MERGEABLE_PSEUDO_ELEMENTS: &[&str] = &["::after", "::before", "::first-letter", "::first-line"];

const IE8_MERGEABLE_PSEUDO_CLASSES: &[&str] = &[
    ":after",
    ":before",
    ":first-child",
    ":first-letter",
    ":focus",
    ":hover",
    ":visited",
];

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for Colors {
    fn default() -> Self {
        Self {
            hex_alpha: false,
            opacity: true,
        }
    }
}

impl Default for Properties {
    fn default() -> Self {
        Self {
            background_clip_merging: true,
            background_origin_merging: true,
            background_size_merging: true,
            colors: true,
            ie_bang_hack: false,
            ie_filters: false,
            ie_prefix_hack: false,
            ie_suffix_hack: false,
            merging: true,
            shorter_length_units: false,
            space_after_closing_brace: true,
            url_quotes: true,
            zero_units: true,
        }
    }
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            adjacent_space: false,
            ie7_hack: false,
            mergeable_pseudo_classes: strings(MERGEABLE_PSEUDO_CLASSES),
            mergeable_pseudo_elements: strings(MERGEABLE_PSEUDO_ELEMENTS),
            merge_limit: 8191,
            multiple_pseudo_merging: true,
        }
    }
}

impl Default for Units {
    fn default() -> Self {
        Self {
            ch: true,
            inch: true,
            pc: true,
            pt: true,
            rem: true,
            vh: true,
            vm: true,
            vmax: true,
            vmin: true,
            vw: true,
        }
    }
}

// ============================================================================
// Presets
// ============================================================================

impl Compatibility {
    /// Resolve a preset string such as `"ie9,-units.rem"`.
    pub fn from_preset(source: &str) -> Result<Self> {
        let mut parts = source.split(',').map(str::trim).filter(|p| !p.is_empty());
        let mut compat = Compatibility::default();
        let mut overrides = Vec::new();

        if let Some(first) = parts.next() {
            if first.starts_with('+') || first.starts_with('-') {
                overrides.push(first);
            } else {
                compat = Self::preset(first)?;
            }
        }
        overrides.extend(parts);

        for entry in overrides {
            let (enabled, path) = match entry.as_bytes().first() {
                Some(b'+') => (true, &entry[1..]),
                Some(b'-') => (false, &entry[1..]),
                _ => {
                    return Err(Error::InvalidCompatibility(format!(
                        "expected '+' or '-' before '{entry}'"
                    )));
                }
            };
            compat.set(path, enabled)?;
        }

        Ok(compat)
    }

    /// A named preset without overrides.
    pub fn preset(name: &str) -> Result<Self> {
        let mut compat = Compatibility::default();

        match name {
            "*" => {}
            "ie11" | "ie10" => {
                compat.properties.ie_suffix_hack = true;
            }
            "ie9" => {
                compat.properties.ie_filters = true;
                compat.properties.ie_suffix_hack = true;
            }
            "ie8" | "ie7" => {
                compat.colors.opacity = false;
                compat.properties.background_clip_merging = false;
                compat.properties.background_origin_merging = false;
                compat.properties.background_size_merging = false;
                compat.properties.ie_filters = true;
                compat.properties.ie_prefix_hack = true;
                compat.properties.ie_suffix_hack = true;
                compat.properties.merging = false;
                compat.selectors.mergeable_pseudo_classes = strings(IE8_MERGEABLE_PSEUDO_CLASSES);
                compat.selectors.mergeable_pseudo_elements = Vec::new();
                compat.units.ch = false;
                compat.units.rem = false;
                compat.units.vh = false;
                compat.units.vm = false;
                compat.units.vmax = false;
                compat.units.vmin = false;
                compat.units.vw = false;

                if name == "ie7" {
                    compat.properties.ie_bang_hack = true;
                    compat.selectors.ie7_hack = true;
                }
            }
            other => {
                return Err(Error::InvalidCompatibility(format!("unknown preset '{other}'")));
            }
        }

        Ok(compat)
    }

    /// Switch one boolean flag addressed as `group.flag`.
    pub fn set(&mut self, path: &str, enabled: bool) -> Result<()> {
        let flag = match path {
            "colors.hexAlpha" => &mut self.colors.hex_alpha,
            "colors.opacity" => &mut self.colors.opacity,
            "properties.backgroundClipMerging" => &mut self.properties.background_clip_merging,
            "properties.backgroundOriginMerging" => &mut self.properties.background_origin_merging,
            "properties.backgroundSizeMerging" => &mut self.properties.background_size_merging,
            "properties.colors" => &mut self.properties.colors,
            "properties.ieBangHack" => &mut self.properties.ie_bang_hack,
            "properties.ieFilters" => &mut self.properties.ie_filters,
            "properties.iePrefixHack" => &mut self.properties.ie_prefix_hack,
            "properties.ieSuffixHack" => &mut self.properties.ie_suffix_hack,
            "properties.merging" => &mut self.properties.merging,
            "properties.shorterLengthUnits" => &mut self.properties.shorter_length_units,
            "properties.spaceAfterClosingBrace" => &mut self.properties.space_after_closing_brace,
            "properties.urlQuotes" => &mut self.properties.url_quotes,
            "properties.zeroUnits" => &mut self.properties.zero_units,
            "selectors.adjacentSpace" => &mut self.selectors.adjacent_space,
            "selectors.ie7Hack" => &mut self.selectors.ie7_hack,
            "selectors.multiplePseudoMerging" => &mut self.selectors.multiple_pseudo_merging,
            "units.ch" => &mut self.units.ch,
            "units.in" => &mut self.units.inch,
            "units.pc" => &mut self.units.pc,
            "units.pt" => &mut self.units.pt,
            "units.rem" => &mut self.units.rem,
            "units.vh" => &mut self.units.vh,
            "units.vm" => &mut self.units.vm,
            "units.vmax" => &mut self.units.vmax,
            "units.vmin" => &mut self.units.vmin,
            "units.vw" => &mut self.units.vw,
            other => {
                return Err(Error::InvalidCompatibility(format!("unknown flag '{other}'")));
            }
        };
        *flag = enabled;
        Ok(())
    }
}

impl Units {
    /// Units allowed in values besides the always-supported ones.
    pub fn enabled(&self) -> Vec<&'static str> {
        let optional = [
            ("ch", self.ch),
            ("in", self.inch),
            ("pc", self.pc),
            ("pt", self.pt),
            ("rem", self.rem),
            ("vh", self.vh),
            ("vm", self.vm),
            ("vmax", self.vmax),
            ("vmin", self.vmin),
            ("vw", self.vw),
        ];
        optional
            .into_iter()
            .filter_map(|(unit, enabled)| enabled.then_some(unit))
            .collect()
    }
}

/// Compatibility given either as a preset string or as a full table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CompatibilitySource {
    Preset(String),
    Table(Compatibility),
}

impl Default for CompatibilitySource {
    fn default() -> Self {
        CompatibilitySource::Preset("*".to_string())
    }
}

impl CompatibilitySource {
    pub fn resolve(&self) -> Result<Compatibility> {
        match self {
            CompatibilitySource::Preset(source) => Compatibility::from_preset(source),
            CompatibilitySource::Table(table) => Ok(table.clone()),
        }
    }
}
