//! Value classification used by the optimizers.
//!
//! The [`Validator`] answers "is this fragment a color / length / style
//! keyword / image ..." questions. Unit support depends on the active
//! [`Compatibility`], so a validator is built once per minifier.

use regex::Regex;

use super::Compatibility;
use crate::error::Result;
use crate::patterns::{FUNCTION, HEX_COLOR, NUMBER, TIME};
use crate::util::unprefixed;

/// Units every target browser understands.
const BASE_UNITS: &[&str] = &[
    "%", "cm", "deg", "dpcm", "dpi", "dppx", "em", "ex", "fr", "grad", "hz", "khz", "mm", "ms",
    "px", "q", "rad", "s", "turn", "x",
];

const CALC_FUNCTIONS: &[&str] = &["calc", "clamp", "env", "max", "min", "var"];

const GLOBAL_KEYWORDS: &[&str] = &["inherit", "initial", "revert", "revert-layer", "unset"];

const COLOR_FUNCTIONS: &[&str] = &[
    "color", "color-mix", "hsl", "hsla", "hwb", "lab", "lch", "oklab", "oklch", "rgb", "rgba",
];

const GRADIENTS: &[&str] = &[
    "conic-gradient",
    "linear-gradient",
    "radial-gradient",
    "repeating-conic-gradient",
    "repeating-linear-gradient",
    "repeating-radial-gradient",
];

const IMAGE_FUNCTIONS: &[&str] = &["cross-fade", "element", "image", "image-set", "url"];

const BACKGROUND_ATTACHMENT: &[&str] = &["fixed", "local", "scroll"];
const BACKGROUND_BOX: &[&str] = &["border-box", "content-box", "padding-box", "text"];
const BACKGROUND_POSITION: &[&str] = &["bottom", "center", "left", "right", "top"];
const BACKGROUND_REPEAT: &[&str] = &["no-repeat", "repeat", "repeat-x", "repeat-y", "round", "space"];
const BACKGROUND_SIZE: &[&str] = &["auto", "contain", "cover"];
const LINE_STYLE: &[&str] = &[
    "auto", "dashed", "dotted", "double", "groove", "hidden", "inset", "none", "outset", "ridge",
    "solid",
];
const LINE_WIDTH: &[&str] = &["medium", "thick", "thin"];
const FONT_STYLE: &[&str] = &["italic", "normal", "oblique"];
const FONT_VARIANT: &[&str] = &["normal", "small-caps"];
const FONT_WEIGHT: &[&str] = &[
    "100", "200", "300", "400", "500", "600", "700", "800", "900", "bold", "bolder", "lighter",
    "normal",
];
const FONT_STRETCH: &[&str] = &[
    "condensed",
    "expanded",
    "extra-condensed",
    "extra-expanded",
    "normal",
    "semi-condensed",
    "semi-expanded",
    "ultra-condensed",
    "ultra-expanded",
];
const FONT_SIZE: &[&str] = &[
    "large", "larger", "medium", "small", "smaller", "x-large", "x-small", "xx-large", "xx-small",
    "xxx-large",
];
const SYSTEM_FONTS: &[&str] = &["caption", "icon", "menu", "message-box", "small-caption", "status-bar"];
const LIST_STYLE_POSITION: &[&str] = &["inside", "outside"];
const LIST_STYLE_TYPE: &[&str] = &[
    "armenian",
    "circle",
    "cjk-ideographic",
    "decimal",
    "decimal-leading-zero",
    "disc",
    "georgian",
    "hebrew",
    "hiragana",
    "hiragana-iroha",
    "katakana",
    "katakana-iroha",
    "lower-alpha",
    "lower-greek",
    "lower-latin",
    "lower-roman",
    "none",
    "square",
    "upper-alpha",
    "upper-latin",
    "upper-roman",
];
const TIMING_FUNCTION: &[&str] = &[
    "ease",
    "ease-in",
    "ease-in-out",
    "ease-out",
    "linear",
    "step-end",
    "step-start",
];

/// Classifies value fragments under one compatibility profile.
#[derive(Debug, Clone)]
pub struct Validator {
    unit: Regex,
}

impl Validator {
    pub fn new(compat: &Compatibility) -> Result<Self> {
        let mut units: Vec<&str> = BASE_UNITS.to_vec();
        units.extend(compat.units.enabled());
        // Longest first so `vmax` wins over `vm`
        units.sort_by_key(|unit| std::cmp::Reverse(unit.len()));

        let alternatives = units
            .iter()
            .map(|unit| regex::escape(unit))
            .collect::<Vec<_>>()
            .join("|");
        let unit = Regex::new(&format!(
            r"(?i)^[+-]?(?:\d+\.?\d*|\.\d+)(?:e[+-]?\d+)?(?:{alternatives})$"
        ))?;

        Ok(Self { unit })
    }

    /// A number with a supported unit, a bare number, or a calc-like function.
    pub fn is_unit(&self, value: &str) -> bool {
        self.unit.is_match(value) || is_number(value) || is_calc(value)
    }

    /// Like [`is_unit`](Self::is_unit) but rejects unitless non-zero numbers.
    pub fn is_length(&self, value: &str) -> bool {
        (self.unit.is_match(value) && !is_time(value)) || is_zero(value) || is_calc(value)
    }

    pub fn is_keyword(&self, property: &str, value: &str) -> bool {
        is_keyword(property, value)
    }
}

// ============================================================================
// Generic fragments
// ============================================================================

pub fn is_number(value: &str) -> bool {
    NUMBER.is_match(value)
}

pub fn is_zero(value: &str) -> bool {
    is_number(value) && value.trim_start_matches(['+', '-']).bytes().all(|b| b == b'0' || b == b'.')
}

pub fn is_time(value: &str) -> bool {
    TIME.is_match(value)
}

pub fn is_global(value: &str) -> bool {
    GLOBAL_KEYWORDS.iter().any(|k| k.eq_ignore_ascii_case(value))
}

/// Name of a function call fragment, e.g. `rgb` for `rgb(0,0,0)`.
pub fn function_name(value: &str) -> Option<&str> {
    let captures = FUNCTION.captures(value)?;
    captures.get(1).map(|m| m.as_str())
}

pub fn is_function(value: &str) -> bool {
    function_name(value).is_some()
}

fn is_function_in(value: &str, names: &[&str]) -> bool {
    function_name(value)
        .map(unprefixed)
        .is_some_and(|name| names.iter().any(|n| n.eq_ignore_ascii_case(name)))
}

pub fn is_calc(value: &str) -> bool {
    is_function_in(value, CALC_FUNCTIONS)
}

pub fn is_variable(value: &str) -> bool {
    value.get(..4).is_some_and(|head| head.eq_ignore_ascii_case("var("))
}

pub fn is_url(value: &str) -> bool {
    value.get(..4).is_some_and(|head| head.eq_ignore_ascii_case("url("))
}

pub fn is_gradient(value: &str) -> bool {
    is_function_in(value, GRADIENTS)
        || function_name(value).is_some_and(|name| name.eq_ignore_ascii_case("-webkit-gradient"))
}

/// An `<image>` value: url, gradient, image function or `none`.
pub fn is_image(value: &str) -> bool {
    value.eq_ignore_ascii_case("none") || is_gradient(value) || is_function_in(value, IMAGE_FUNCTIONS)
}

pub fn is_color(value: &str) -> bool {
    if HEX_COLOR.is_match(value) || is_function_in(value, COLOR_FUNCTIONS) {
        return true;
    }
    let lower = value.to_ascii_lowercase();
    lower == "transparent"
        || lower == "currentcolor"
        || cssparser::color::parse_named_color(&lower).is_ok()
}

pub fn is_quoted(value: &str) -> bool {
    value.len() >= 2
        && ((value.starts_with('"') && value.ends_with('"'))
            || (value.starts_with('\'') && value.ends_with('\'')))
}

/// `ident`, `-ident`, `--ident` (no escapes).
pub fn is_identifier(value: &str) -> bool {
    let rest = value.trim_start_matches('-');
    value.len() - rest.len() <= 2
        && rest
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || !c.is_ascii())
        && rest
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii())
}

// ============================================================================
// Property keywords
// ============================================================================

/// Keywords accepted by a (longhand) property.
fn keywords(property: &str) -> &'static [&'static str] {
    let property = unprefixed(property);
    match property {
        "background-attachment" => BACKGROUND_ATTACHMENT,
        "background-clip" | "background-origin" => BACKGROUND_BOX,
        "background-position" => BACKGROUND_POSITION,
        "background-repeat" => BACKGROUND_REPEAT,
        "background-size" => BACKGROUND_SIZE,
        "border-style" | "border-top-style" | "border-right-style" | "border-bottom-style"
        | "border-left-style" | "outline-style" => LINE_STYLE,
        "border-width" | "border-top-width" | "border-right-width" | "border-bottom-width"
        | "border-left-width" | "outline-width" => LINE_WIDTH,
        "font-size" => FONT_SIZE,
        "font-stretch" => FONT_STRETCH,
        "font-style" => FONT_STYLE,
        "font-variant" => FONT_VARIANT,
        "font-weight" => FONT_WEIGHT,
        "font" => SYSTEM_FONTS,
        "list-style-position" => LIST_STYLE_POSITION,
        "list-style-type" => LIST_STYLE_TYPE,
        "transition-timing-function" => TIMING_FUNCTION,
        _ => &[],
    }
}

/// Whether `property` has a closed keyword set to check values against.
pub fn has_keywords(property: &str) -> bool {
    !keywords(property).is_empty()
}

pub fn is_keyword(property: &str, value: &str) -> bool {
    keywords(property).iter().any(|k| k.eq_ignore_ascii_case(value))
}

pub fn is_line_style(value: &str) -> bool {
    LINE_STYLE.iter().any(|k| k.eq_ignore_ascii_case(value))
}

pub fn is_timing_function(value: &str) -> bool {
    is_keyword("transition-timing-function", value)
        || function_name(value).is_some_and(|name| {
            name.eq_ignore_ascii_case("cubic-bezier") || name.eq_ignore_ascii_case("steps")
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator(preset: &str) -> Validator {
        Validator::new(&Compatibility::from_preset(preset).unwrap()).unwrap()
    }

    #[test]
    fn test_units_follow_compatibility() {
        let modern = validator("*");
        assert!(modern.is_unit("1.5rem"));
        assert!(modern.is_unit("10vmax"));
        assert!(modern.is_unit("-.5px"));
        assert!(modern.is_unit("calc(1px + 2em)"));
        assert!(!modern.is_unit("1foo"));

        let ie8 = validator("ie8");
        assert!(!ie8.is_unit("1rem"));
        assert!(ie8.is_unit("1px"));
    }

    #[test]
    fn test_length() {
        let v = validator("*");
        assert!(v.is_length("0"));
        assert!(v.is_length("2px"));
        assert!(!v.is_length("2"));
        assert!(!v.is_length("2s"));
    }

    #[test]
    fn test_colors() {
        assert!(is_color("red"));
        assert!(is_color("RED"));
        assert!(is_color("#fff"));
        assert!(is_color("#ffffff80"));
        assert!(is_color("rgba(0,0,0,.5)"));
        assert!(is_color("currentColor"));
        assert!(!is_color("solid"));
        assert!(!is_color("#ggg"));
    }

    #[test]
    fn test_images() {
        assert!(is_image("url(a.png)"));
        assert!(is_image("-webkit-linear-gradient(red,blue)"));
        assert!(is_image("none"));
        assert!(!is_image("red"));
    }

    #[test]
    fn test_keywords() {
        assert!(is_keyword("border-top-style", "solid"));
        assert!(is_keyword("-webkit-background-clip", "padding-box"));
        assert!(!is_keyword("border-style", "thin"));
        assert!(is_timing_function("cubic-bezier(0,0,1,1)"));
    }

    #[test]
    fn test_identifier() {
        assert!(is_identifier("color"));
        assert!(is_identifier("-webkit-box"));
        assert!(is_identifier("--main"));
        assert!(!is_identifier("1a"));
        assert!(!is_identifier("co lor"));
        assert!(!is_identifier("---x"));
    }

    #[test]
    fn test_zero_and_time() {
        assert!(is_zero("0"));
        assert!(is_zero("-0.0"));
        assert!(!is_zero("0.1"));
        assert!(is_time("1s"));
        assert!(is_time(".5ms"));
    }
}
