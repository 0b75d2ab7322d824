//! Color shortening.
//!
//! Every color in a value is rewritten to its shortest equivalent form:
//! `#FF0000` → `red`, `white` → `#fff`, `rgb(255,254,253)` → `#fffefd`,
//! `rgba(0,0,0,0)` → `transparent` (outside gradients).

use std::collections::HashMap;
use std::sync::LazyLock;

use cssparser::{Parser, ParserInput, Token};

use crate::compat::Compatibility;
use crate::compat::validator::is_gradient;

/// Named colors that can be shorter than their `#rrggbb` form.
const SHORT_NAMES: &[&str] = &[
    "aqua", "azure", "beige", "bisque", "black", "blue", "brown", "coral", "cyan", "gold", "gray",
    "green", "grey", "indigo", "ivory", "khaki", "lime", "linen", "maroon", "navy", "olive",
    "orange", "orchid", "peru", "pink", "plum", "purple", "red", "salmon", "sienna", "silver",
    "snow", "tan", "teal", "tomato", "violet", "wheat", "white", "yellow",
];

/// Shortest color name per RGB triple.
static NAMES_BY_RGB: LazyLock<HashMap<(u8, u8, u8), &'static str>> = LazyLock::new(|| {
    let mut names: HashMap<(u8, u8, u8), &'static str> = HashMap::new();
    for &name in SHORT_NAMES {
        if let Ok(rgb) = cssparser::color::parse_named_color(name) {
            let entry = names.entry(rgb).or_insert(name);
            if name.len() < entry.len() || (name.len() == entry.len() && name < *entry) {
                *entry = name;
            }
        }
    }
    names
});

#[derive(Debug, Clone, Copy, PartialEq)]
struct Rgba {
    red: u8,
    green: u8,
    blue: u8,
    alpha: f32,
}

/// Shorten every color found in `text`.
///
/// Quoted strings and `url(...)` arguments are copied through untouched.
pub fn shorten_colors(text: &str, compat: &Compatibility) -> String {
    shorten_in(text, compat, false)
}

fn shorten_in(text: &str, compat: &Compatibility, in_gradient: bool) -> String {
    let mut out = String::with_capacity(text.len());
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut i = 0;

    while i < chars.len() {
        let (at, c) = chars[i];
        let boundary = i == 0 || !is_ident_char(chars[i - 1].1);

        match c {
            '"' | '\'' => {
                let end = skip_string(&chars, i);
                out.push_str(&text[at..byte_at(text, &chars, end)]);
                i = end;
            }
            '#' if boundary => {
                let mut end = i + 1;
                while end < chars.len() && chars[end].1.is_ascii_alphanumeric() {
                    end += 1;
                }
                let hex = &text[at + 1..byte_at(text, &chars, end)];
                match shorten_hex(hex, compat) {
                    Some(short) => out.push_str(&short),
                    None => out.push_str(&text[at..byte_at(text, &chars, end)]),
                }
                i = end;
            }
            c if boundary && (c.is_ascii_alphabetic() || c == '-') => {
                let mut end = i;
                while end < chars.len() && is_ident_char(chars[end].1) {
                    end += 1;
                }
                let ident = &text[at..byte_at(text, &chars, end)];

                if chars.get(end).is_some_and(|&(_, c)| c == '(') {
                    let close = matching_paren(&chars, end);
                    let call_end = byte_at(text, &chars, close);
                    let call = &text[at..call_end];
                    out.push_str(&shorten_function(ident, call, compat, in_gradient));
                    i = close;
                } else {
                    out.push_str(&shorten_name(ident));
                    i = end;
                }
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }

    out
}

fn shorten_function(name: &str, call: &str, compat: &Compatibility, in_gradient: bool) -> String {
    // Unbalanced calls reach here when a declaration ends inside the parens
    let Some(inner) = call
        .get(name.len() + 1..)
        .and_then(|rest| rest.strip_suffix(')'))
    else {
        return call.to_string();
    };
    let lower = name.to_ascii_lowercase();

    match lower.as_str() {
        "rgb" | "rgba" | "hsl" | "hsla" => match parse_function(&lower, inner) {
            Some(color) => format_color(color, call, compat, in_gradient),
            None => call.to_string(),
        },
        "url" | "var" | "env" => call.to_string(),
        _ => {
            let gradient = in_gradient || is_gradient(call);
            format!("{name}({})", shorten_in(inner, compat, gradient))
        }
    }
}

fn format_color(color: Rgba, original: &str, compat: &Compatibility, in_gradient: bool) -> String {
    if color.alpha >= 1.0 {
        return shortest_opaque(color.red, color.green, color.blue);
    }
    if color.alpha <= 0.0
        && color.red == 0
        && color.green == 0
        && color.blue == 0
        && !in_gradient
        && compat.colors.opacity
    {
        return "transparent".to_string();
    }
    original.to_string()
}

fn shortest_opaque(red: u8, green: u8, blue: u8) -> String {
    let hex = short_hex(red, green, blue);
    match NAMES_BY_RGB.get(&(red, green, blue)) {
        Some(name) if name.len() < hex.len() => name.to_string(),
        _ => hex,
    }
}

fn short_hex(red: u8, green: u8, blue: u8) -> String {
    let doubled = |v: u8| v >> 4 == v & 0x0f;
    if doubled(red) && doubled(green) && doubled(blue) {
        format!("#{:x}{:x}{:x}", red & 0x0f, green & 0x0f, blue & 0x0f)
    } else {
        format!("#{red:02x}{green:02x}{blue:02x}")
    }
}

/// Shorten a hex color given without `#`. `None` when not a color.
pub fn shorten_hex(hex: &str, compat: &Compatibility) -> Option<String> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let lower = hex.to_ascii_lowercase();
    let digit = |i: usize| u8::from_str_radix(&lower[i..i + 1], 16).ok();
    let pair = |i: usize| u8::from_str_radix(&lower[i..i + 2], 16).ok();

    match lower.len() {
        3 => Some(shortest_opaque(digit(0)? * 17, digit(1)? * 17, digit(2)? * 17)),
        6 => Some(shortest_opaque(pair(0)?, pair(2)?, pair(4)?)),
        4 if lower.ends_with('f') => Some(shortest_opaque(digit(0)? * 17, digit(1)? * 17, digit(2)? * 17)),
        8 if lower.ends_with("ff") => Some(shortest_opaque(pair(0)?, pair(2)?, pair(4)?)),
        8 if compat.colors.hex_alpha
            && lower.as_bytes().chunks(2).all(|pair| pair[0] == pair[1]) =>
        {
            let short: String = lower.chars().step_by(2).collect();
            Some(format!("#{short}"))
        }
        4 | 8 => Some(format!("#{lower}")),
        _ => None,
    }
}

/// Replace a named color by its hex form when shorter.
pub fn shorten_name(name: &str) -> String {
    let lower = name.to_ascii_lowercase();
    match cssparser::color::parse_named_color(&lower) {
        Ok((red, green, blue)) => {
            let shortest = shortest_opaque(red, green, blue);
            if shortest.len() < lower.len() {
                shortest
            } else {
                lower
            }
        }
        Err(()) => name.to_string(),
    }
}

// ============================================================================
// rgb() / hsl() parsing
// ============================================================================

/// Parse the arguments of an `rgb[a]()` / `hsl[a]()` call.
fn parse_function(name: &str, args: &str) -> Option<Rgba> {
    let mut input = ParserInput::new(args);
    let mut parser = Parser::new(&mut input);

    // (value, is_percentage)
    let mut components: Vec<(f32, bool)> = Vec::with_capacity(4);

    loop {
        let token = match parser.next() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };
        match token {
            Token::Number { value, .. } => components.push((value, false)),
            Token::Percentage { unit_value, .. } => components.push((unit_value, true)),
            Token::Dimension { value, ref unit, .. } if components.is_empty() && name.starts_with("hsl") => {
                let degrees = match unit.to_ascii_lowercase().as_str() {
                    "deg" => value,
                    "grad" => value * 0.9,
                    "rad" => value.to_degrees(),
                    "turn" => value * 360.0,
                    _ => return None,
                };
                components.push((degrees, false));
            }
            Token::Comma | Token::Delim('/') => {}
            _ => return None,
        }
    }

    let alpha = match components.get(3) {
        Some(&(value, _)) => value.clamp(0.0, 1.0),
        None => 1.0,
    };
    if components.len() < 3 || components.len() > 4 {
        return None;
    }

    let (red, green, blue) = if name.starts_with("rgb") {
        let channel = |(value, percent): (f32, bool)| {
            let value = if percent { value * 255.0 } else { value };
            value.round().clamp(0.0, 255.0) as u8
        };
        (channel(components[0]), channel(components[1]), channel(components[2]))
    } else {
        let (saturation, lightness) = (components[1], components[2]);
        let fraction = |(value, percent): (f32, bool)| {
            if percent { value } else { value / 100.0 }
        };
        hsl_to_rgb(components[0].0, fraction(saturation), fraction(lightness))
    };

    Some(Rgba {
        red,
        green,
        blue,
        alpha,
    })
}

fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> (u8, u8, u8) {
    let hue = hue.rem_euclid(360.0) / 360.0;
    let saturation = saturation.clamp(0.0, 1.0);
    let lightness = lightness.clamp(0.0, 1.0);

    let q = if lightness < 0.5 {
        lightness * (1.0 + saturation)
    } else {
        lightness + saturation - lightness * saturation
    };
    let p = 2.0 * lightness - q;

    let channel = |mut t: f32| {
        if t < 0.0 {
            t += 1.0;
        }
        if t > 1.0 {
            t -= 1.0;
        }
        let value = if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 0.5 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * (2.0 / 3.0 - t) * 6.0
        } else {
            p
        };
        (value * 255.0).round().clamp(0.0, 255.0) as u8
    };

    (
        channel(hue + 1.0 / 3.0),
        channel(hue),
        channel(hue - 1.0 / 3.0),
    )
}

// ============================================================================
// Scanning helpers
// ============================================================================

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '\\' || !c.is_ascii()
}

fn byte_at(text: &str, chars: &[(usize, char)], index: usize) -> usize {
    chars.get(index).map_or(text.len(), |&(at, _)| at)
}

/// Index just past the closing quote of the string starting at `start`.
fn skip_string(chars: &[(usize, char)], start: usize) -> usize {
    let quote = chars[start].1;
    let mut i = start + 1;
    while i < chars.len() {
        match chars[i].1 {
            '\\' => i += 2,
            c if c == quote => return i + 1,
            _ => i += 1,
        }
    }
    chars.len()
}

/// Index just past the `)` matching the `(` at `open`.
fn matching_paren(chars: &[(usize, char)], open: usize) -> usize {
    let mut depth = 0usize;
    let mut i = open;
    while i < chars.len() {
        match chars[i].1 {
            '"' | '\'' => {
                i = skip_string(chars, i);
                continue;
            }
            '\\' => i += 1,
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return i + 1;
                }
            }
            _ => {}
        }
        i += 1;
    }
    chars.len()
}
