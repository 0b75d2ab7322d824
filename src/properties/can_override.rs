//! Whether a later value can replace an earlier one without losing a
//! fallback some target browser still needs.

use crate::compat::validator::{function_name, has_keywords, is_global, is_identifier, is_keyword};
use crate::context::Context;
use crate::token::Value;
use crate::util::{unprefixed, vendor_prefixes_in};
use crate::writer::serialize_value;

use super::descriptor::descriptor;

/// Functions older browsers may not parse; an earlier value without them
/// stays as a fallback.
const RISKY_FUNCTIONS: &[&str] = &[
    "calc",
    "clamp",
    "color",
    "color-mix",
    "conic-gradient",
    "cross-fade",
    "element",
    "env",
    "hwb",
    "image-set",
    "lab",
    "lch",
    "linear-gradient",
    "max",
    "min",
    "oklab",
    "oklch",
    "radial-gradient",
    "repeating-conic-gradient",
    "repeating-linear-gradient",
    "repeating-radial-gradient",
    "var",
];

const OPACITY_FUNCTIONS: &[&str] = &["hsla", "rgba"];

fn functions(values: &[Value]) -> Vec<String> {
    values
        .iter()
        .filter_map(|value| match value {
            Value::Word(word) => function_name(word).map(|name| unprefixed(name).to_ascii_lowercase()),
            _ => None,
        })
        .collect()
}

fn prefixes(values: &[Value]) -> Vec<String> {
    let text = serialize_value(values);
    let mut found: Vec<String> = vendor_prefixes_in(&text).into_iter().map(str::to_string).collect();
    found.sort();
    found
}

fn is_numeric(word: &str) -> bool {
    word.bytes()
        .next()
        .is_some_and(|b| b.is_ascii_digit() || matches!(b, b'.' | b'+' | b'-'))
        && word.bytes().any(|b| b.is_ascii_digit())
}

/// `right` may replace `left` for property `name`.
pub fn can_override(name: &str, left: &[Value], right: &[Value], ctx: &Context) -> bool {
    if right.iter().any(|v| v.as_str().contains("var(")) {
        return false;
    }
    if prefixes(left) != prefixes(right) {
        return false;
    }

    let left_functions = functions(left);
    let right_functions = functions(right);
    let opacity = ctx.compat.colors.opacity;
    for function in &right_functions {
        let risky = RISKY_FUNCTIONS.contains(&function.as_str())
            || (!opacity && OPACITY_FUNCTIONS.contains(&function.as_str()));
        if risky && !left_functions.contains(function) {
            return false;
        }
    }

    let longhand = descriptor(name).is_none_or(|d| !d.is_shorthand());
    let keywords = longhand && has_keywords(name);

    right.iter().all(|value| {
        let Value::Word(word) = value else {
            return true;
        };
        if is_numeric(word) && !ctx.validator.is_unit(word) {
            return false;
        }
        if let Some(hex) = word.strip_prefix('#')
            && matches!(hex.len(), 4 | 8)
            && !ctx.compat.colors.hex_alpha
        {
            return false;
        }
        !(keywords && is_identifier(word) && !is_global(word) && !is_keyword(name, word))
    })
}
