//! Property-specific value shortcuts.

use crate::compat::validator::{is_number, is_zero};
use crate::options::Level1Options;
use crate::patterns::{PROGID, PROGID_EQUALS};
use crate::token::{Property, Value};

/// Properties whose 1-4 values follow the top/right/bottom/left rule.
const BOX_PROPERTIES: &[&str] = &[
    "margin",
    "padding",
    "border-width",
    "border-style",
    "border-color",
    "inset",
    "scroll-margin",
    "scroll-padding",
];

const FONT_PREFIX_KEYWORDS: &[&str] = &[
    "normal",
    "italic",
    "oblique",
    "small-caps",
    "bold",
    "bolder",
    "lighter",
    "ultra-condensed",
    "extra-condensed",
    "condensed",
    "semi-condensed",
    "semi-expanded",
    "expanded",
    "extra-expanded",
    "ultra-expanded",
];

const FONT_SYSTEM: &[&str] = &["caption", "icon", "menu", "message-box", "small-caption", "status-bar"];

pub fn apply(property: &mut Property, name: &str, options: &Level1Options) {
    match name {
        "background" if options.optimize_background => single_none(property, "0 0"),
        "outline" if options.optimize_outline => single_none(property, "0"),
        "box-shadow" if options.replace_multiple_zeros => box_shadow(property),
        "border-radius" if options.optimize_border_radius => border_radius(property),
        "font-weight" if options.optimize_font_weight => font_weight(property),
        "font" if options.optimize_font => font(property),
        "filter" | "-ms-filter" if options.optimize_filter => filter(property),
        _ if BOX_PROPERTIES.contains(&name) && options.replace_multiple_zeros => {
            reduce_box(&mut property.values);
        }
        _ => {}
    }
}

fn single_none(property: &mut Property, reset: &str) {
    if let [Value::Word(word)] = property.values.as_slice()
        && (word.eq_ignore_ascii_case("none") || word.eq_ignore_ascii_case("transparent"))
    {
        property.values = reset.split(' ').map(Value::word).collect();
    }
}

/// Drop trailing box values implied by the ones before them.
///
/// `a b a b` → `a b`, `a b c b` → `a b c`, `a a` → `a`. Lists containing
/// separators are left alone.
pub fn reduce_box(values: &mut Vec<Value>) {
    if values.len() < 2 || values.len() > 4 || values.iter().any(|v| !matches!(v, Value::Word(_))) {
        return;
    }
    if values.len() == 4 && values[3] == values[1] {
        values.pop();
    }
    if values.len() == 3 && values[2] == values[0] {
        values.pop();
    }
    if values.len() == 2 && values[1] == values[0] {
        values.pop();
    }
}

/// `0 0 0 0` → `0 0`; blur and spread may go but both offsets are required.
fn box_shadow(property: &mut Property) {
    if property.values.len() == 4
        && property
            .values
            .iter()
            .all(|v| matches!(v, Value::Word(w) if is_zero(w)))
    {
        property.values.truncate(2);
    }
}

fn border_radius(property: &mut Property) {
    let Some(slash) = property.values.iter().position(Value::is_slash) else {
        reduce_box(&mut property.values);
        return;
    };

    let mut horizontal = property.values[..slash].to_vec();
    let mut vertical = property.values[slash + 1..].to_vec();
    reduce_box(&mut horizontal);
    reduce_box(&mut vertical);

    if horizontal == vertical {
        property.values = horizontal;
    } else {
        horizontal.push(Value::Slash);
        horizontal.extend(vertical);
        property.values = horizontal;
    }
}

fn numeric_weight(word: &str) -> Option<&'static str> {
    if word.eq_ignore_ascii_case("normal") {
        Some("400")
    } else if word.eq_ignore_ascii_case("bold") {
        Some("700")
    } else {
        None
    }
}

fn font_weight(property: &mut Property) {
    if let [Value::Word(word)] = property.values.as_mut_slice()
        && let Some(weight) = numeric_weight(word)
    {
        *word = weight.to_string();
    }
}

/// Rewrite the weight inside a `font` shorthand.
///
/// Only the keywords before the font size count. `normal` is rewritten
/// only when it is the sole prefix keyword, since it could equally be the
/// style, variant or stretch.
fn font(property: &mut Property) {
    if let [Value::Word(word)] = property.values.as_slice()
        && FONT_SYSTEM.iter().any(|k| k.eq_ignore_ascii_case(word))
    {
        return;
    }

    let prefix = property
        .values
        .iter()
        .take_while(|v| match v {
            Value::Word(w) => {
                FONT_PREFIX_KEYWORDS.iter().any(|k| k.eq_ignore_ascii_case(w))
                    || (is_number(w) && !w.contains('.'))
            }
            _ => false,
        })
        .count();
    // The size and family must follow.
    if prefix == 0 || prefix >= property.values.len() {
        return;
    }

    let bold = (0..prefix).find(|&i| property.values[i].as_str().eq_ignore_ascii_case("bold"));
    let target = match bold {
        Some(index) => Some(index),
        None if prefix == 1 && property.values[0].as_str().eq_ignore_ascii_case("normal") => Some(0),
        None => None,
    };

    if let Some(index) = target
        && let Some(weight) = numeric_weight(property.values[index].as_str())
    {
        property.values[index] = Value::word(weight);
    }
}

/// Lowercase the `progid:` prefix and normalize spacing inside the call.
fn filter(property: &mut Property) {
    for value in &mut property.values {
        let Value::Word(word) = value else { continue };
        let (quote, inner) = match word.chars().next() {
            Some(q @ ('"' | '\'')) if word.len() >= 2 && word.ends_with(q) => {
                (Some(q), &word[1..word.len() - 1])
            }
            _ => (None, word.as_str()),
        };
        if !PROGID.is_match(inner) {
            continue;
        }

        let mut normalized = format!("progid:{}", &inner["progid:".len()..]);
        normalized = PROGID_EQUALS.replace_all(&normalized, "=").into_owned();
        normalized = comma_spacing(&normalized);

        *word = match quote {
            Some(q) => format!("{q}{normalized}{q}"),
            None => normalized,
        };
    }
}

/// Exactly one space after every comma.
fn comma_spacing(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 4);
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == ' ' && out.ends_with(',') {
            continue;
        }
        out.push(c);
        if c == ',' {
            while chars.peek() == Some(&' ') {
                chars.next();
            }
            out.push(' ');
        }
    }
    out
}
