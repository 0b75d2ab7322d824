//! Numeric, unit and whitespace rewriting inside a single value fragment.

use crate::context::Context;

/// Units a zero can drop.
const LENGTH_UNITS: &[&str] = &[
    "px", "em", "ex", "ch", "rem", "vw", "vh", "vmin", "vmax", "vm", "cm", "mm", "q", "in", "pt",
    "pc",
];

const ANGLE_UNITS: &[&str] = &["deg", "grad", "rad", "turn"];

/// Functions whose angle arguments accept a unitless zero.
const ZERO_ANGLE_FUNCTIONS: &[&str] = &[
    "rotate", "rotatex", "rotatey", "rotatez", "rotate3d", "skew", "skewx", "skewy", "hue-rotate",
];

const CALC_FUNCTIONS: &[&str] = &["calc", "-webkit-calc", "-moz-calc", "min", "max", "clamp"];

/// Properties where `0` and `0px` differ.
const KEEP_ZERO_UNITS: &[&str] = &["flex", "-ms-flex", "-webkit-flex", "flex-basis", "-webkit-flex-basis"];

/// Rewrite every number in `word`.
///
/// Quoted strings and `url(...)` arguments are copied through untouched;
/// function nesting decides whether zero units can go.
pub fn optimize_numbers(property: &str, word: &str, ctx: &Context) -> String {
    let bytes = word.as_bytes();
    let mut out = String::with_capacity(word.len());
    let mut functions: Vec<String> = Vec::new();
    let mut copied = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'"' | b'\'' => {
                i = skip_string(bytes, i);
                continue;
            }
            b'\\' => {
                i += 2;
                continue;
            }
            b'(' => {
                let name = name_before(word, i);
                if name == "url" {
                    i = skip_parens(bytes, i);
                } else {
                    functions.push(name);
                    i += 1;
                }
                continue;
            }
            b')' => {
                functions.pop();
                i += 1;
                continue;
            }
            _ => {}
        }

        if !starts_number(bytes, i) || !boundary_before(bytes, i) {
            i += 1;
            continue;
        }

        let scanned = scan_number(bytes, i);
        if scanned.unit_end < bytes.len() && is_ident_byte(bytes[scanned.unit_end]) {
            // `1a-b`, `2n+1`: not a dimension
            i = scanned.unit_end + 1;
            continue;
        }

        out.push_str(&word[copied..i]);
        let frame = Frame {
            property,
            function: functions.last().map(String::as_str),
            in_calc: functions.iter().any(|f| CALC_FUNCTIONS.contains(&f.as_str())),
        };
        let number = &word[i..scanned.number_end];
        let unit = &word[scanned.number_end..scanned.unit_end];
        if scanned.exponent {
            out.push_str(number);
            out.push_str(unit);
        } else {
            out.push_str(&rewrite_number(number, unit, &frame, ctx));
        }
        copied = scanned.unit_end;
        i = scanned.unit_end;
    }

    out.push_str(&word[copied..]);
    out
}

struct Frame<'a> {
    property: &'a str,
    function: Option<&'a str>,
    in_calc: bool,
}

fn rewrite_number(number: &str, unit: &str, frame: &Frame, ctx: &Context) -> String {
    let level1 = &ctx.options.level1;
    let unit = unit.to_ascii_lowercase();
    let mut number = number.to_string();

    if let Some(places) = level1.rounding_precision.for_unit(&unit) {
        number = round(&number, places);
    }

    if is_zero_number(&number) {
        let strip_length = LENGTH_UNITS.contains(&unit.as_str())
            && ctx.compat.properties.zero_units
            && !frame.in_calc
            && !KEEP_ZERO_UNITS.contains(&frame.property);
        let strip_angle = ANGLE_UNITS.contains(&unit.as_str())
            && frame.function.is_some_and(|f| ZERO_ANGLE_FUNCTIONS.contains(&f));
        if level1.replace_zero_units && (strip_length || strip_angle) {
            return "0".to_string();
        }
        if unit == "ms" && level1.replace_time_units {
            return "0s".to_string();
        }
        return format!("0{unit}");
    }

    let formatted = format!("{}{unit}", format_number(&number));

    if level1.replace_time_units
        && let Some(shorter) = shorter_time(&number, &unit)
        && shorter.len() < formatted.len()
    {
        return shorter;
    }

    if unit == "px"
        && ctx.compat.properties.shorter_length_units
        && let Some(shorter) = shorter_length(&number, ctx)
        && shorter.len() < formatted.len()
    {
        return shorter;
    }

    formatted
}

/// The other time unit, when exactly representable.
fn shorter_time(number: &str, unit: &str) -> Option<String> {
    match unit {
        "ms" => Some(format!("{}s", format_number(&shift_decimal(number, -3)))),
        "s" => {
            let ms = format_number(&shift_decimal(number, 3));
            (!ms.contains('.')).then(|| format!("{ms}ms"))
        }
        _ => None,
    }
}

/// `pt`, `pc` or `in` for integral pixel values that convert exactly.
fn shorter_length(number: &str, ctx: &Context) -> Option<String> {
    let px: i64 = number.parse().ok()?;
    let units = &ctx.compat.units;
    let mut candidates = Vec::new();
    if units.pt
        && let Some(triple) = px.checked_mul(3)
        && triple % 4 == 0
    {
        candidates.push(format!("{}pt", triple / 4));
    }
    if units.pc && px % 16 == 0 {
        candidates.push(format!("{}pc", px / 16));
    }
    if units.inch && px % 96 == 0 {
        candidates.push(format!("{}in", px / 96));
    }
    candidates.into_iter().min_by_key(String::len)
}

// ============================================================================
// Number text
// ============================================================================

/// Canonical spelling of a plain decimal: `0.50` → `.5`, `-0.0` → `0`, `+1` → `1`.
pub fn format_number(text: &str) -> String {
    let (negative, rest) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let (int, frac) = rest.split_once('.').unwrap_or((rest, ""));
    let int = int.trim_start_matches('0');
    let frac = frac.trim_end_matches('0');

    if int.is_empty() && frac.is_empty() {
        return "0".to_string();
    }

    let mut out = String::with_capacity(text.len());
    if negative {
        out.push('-');
    }
    out.push_str(int);
    if !frac.is_empty() {
        out.push('.');
        out.push_str(frac);
    }
    out
}

fn is_zero_number(text: &str) -> bool {
    text.trim_start_matches(['+', '-'])
        .bytes()
        .all(|b| b == b'0' || b == b'.')
}

/// Round to `places` decimals when the number has more.
fn round(text: &str, places: u32) -> String {
    let decimals = text.split_once('.').map_or(0, |(_, frac)| frac.len());
    if decimals <= places as usize {
        return text.to_string();
    }
    let Ok(value) = text.parse::<f64>() else {
        return text.to_string();
    };
    let factor = 10f64.powi(places as i32);
    let rounded = (value * factor).round() / factor;
    if rounded == 0.0 {
        "0".to_string()
    } else {
        format!("{rounded}")
    }
}

/// Move the decimal point `by` places (positive multiplies).
fn shift_decimal(text: &str, by: i32) -> String {
    let (sign, rest) = match text.as_bytes().first() {
        Some(b'-') => ("-", &text[1..]),
        Some(b'+') => ("", &text[1..]),
        _ => ("", text),
    };
    let (int, frac) = rest.split_once('.').unwrap_or((rest, ""));
    let digits = format!("{int}{frac}");
    let point = int.len() as i32 + by;

    let shifted = if point <= 0 {
        format!("0.{}{digits}", "0".repeat(point.unsigned_abs() as usize))
    } else if point as usize >= digits.len() {
        format!("{digits}{}", "0".repeat(point as usize - digits.len()))
    } else {
        let (head, tail) = digits.split_at(point as usize);
        format!("{head}.{tail}")
    };
    format!("{sign}{shifted}")
}

// ============================================================================
// Whitespace
// ============================================================================

/// Drop spaces next to `(`, `)` and `,` inside functions.
///
/// Inside `calc()`-like functions spaces around `+` and `-` are kept.
pub fn optimize_whitespace(word: &str) -> String {
    if !word.contains(' ') {
        return word.to_string();
    }

    let chars: Vec<char> = word.chars().collect();
    let mut out = String::with_capacity(word.len());
    let mut functions: Vec<String> = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '"' | '\'' => {
                let end = skip_string_chars(&chars, i);
                out.extend(&chars[i..end]);
                i = end;
                continue;
            }
            '\\' => {
                out.extend(&chars[i..(i + 2).min(chars.len())]);
                i += 2;
                continue;
            }
            '(' => {
                let name = name_before(&out, out.len());
                if name == "url" {
                    let end = skip_parens_chars(&chars, i);
                    out.extend(&chars[i..end]);
                    i = end;
                    continue;
                }
                functions.push(name);
            }
            ')' => {
                functions.pop();
            }
            ' ' if !functions.is_empty() => {
                let previous = out.chars().last();
                let next = chars.get(i + 1).copied();
                let in_calc = functions
                    .last()
                    .is_some_and(|f| CALC_FUNCTIONS.contains(&f.as_str()));
                let operator = |ch: Option<char>| in_calc && matches!(ch, Some('*' | '/'));
                let tight_before = matches!(previous, Some('(' | ',' | ' ') | None) || operator(previous);
                let tight_after = matches!(next, Some(')' | ',' | ' ') | None) || operator(next);
                if tight_before || tight_after {
                    i += 1;
                    continue;
                }
            }
            _ => {}
        }
        out.push(c);
        i += 1;
    }

    out
}

// ============================================================================
// Scanning helpers
// ============================================================================

struct Scanned {
    number_end: usize,
    unit_end: usize,
    exponent: bool,
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b'\\' || b >= 0x80
}

fn boundary_before(bytes: &[u8], i: usize) -> bool {
    i == 0 || !(is_ident_byte(bytes[i - 1]) || matches!(bytes[i - 1], b'.' | b'#' | b'%'))
}

fn starts_number(bytes: &[u8], i: usize) -> bool {
    let digit = |at: usize| bytes.get(at).is_some_and(u8::is_ascii_digit);
    match bytes[i] {
        b'0'..=b'9' => true,
        b'.' => digit(i + 1),
        b'+' | b'-' => digit(i + 1) || (bytes.get(i + 1) == Some(&b'.') && digit(i + 2)),
        _ => false,
    }
}

fn scan_number(bytes: &[u8], start: usize) -> Scanned {
    let digit = |at: usize| bytes.get(at).is_some_and(u8::is_ascii_digit);
    let mut i = start;
    if matches!(bytes[i], b'+' | b'-') {
        i += 1;
    }
    while digit(i) {
        i += 1;
    }
    if bytes.get(i) == Some(&b'.') && digit(i + 1) {
        i += 1;
        while digit(i) {
            i += 1;
        }
    }

    let mut exponent = false;
    if matches!(bytes.get(i), Some(b'e' | b'E'))
        && (digit(i + 1) || (matches!(bytes.get(i + 1), Some(b'+' | b'-')) && digit(i + 2)))
    {
        exponent = true;
        i += 2;
        while digit(i) {
            i += 1;
        }
    }

    let number_end = i;
    while bytes.get(i).is_some_and(|b| b.is_ascii_alphabetic() || *b == b'%') {
        i += 1;
    }

    Scanned {
        number_end,
        unit_end: i,
        exponent,
    }
}

/// Lowercased identifier ending at byte `end`.
fn name_before(text: &str, end: usize) -> String {
    let head = &text[..end];
    let start = head
        .rfind(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
        .map_or(0, |at| at + 1);
    head[start..].to_ascii_lowercase()
}

fn skip_string(bytes: &[u8], start: usize) -> usize {
    let quote = bytes[start];
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b if b == quote => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

fn skip_parens(bytes: &[u8], open: usize) -> usize {
    let mut depth = 0usize;
    let mut i = open;
    while i < bytes.len() {
        match bytes[i] {
            b'"' | b'\'' => {
                i = skip_string(bytes, i);
                continue;
            }
            b'\\' => i += 1,
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return i + 1;
                }
            }
            _ => {}
        }
        i += 1;
    }
    bytes.len()
}

fn skip_string_chars(chars: &[char], start: usize) -> usize {
    let quote = chars[start];
    let mut i = start + 1;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            c if c == quote => return i + 1,
            _ => i += 1,
        }
    }
    chars.len()
}

fn skip_parens_chars(chars: &[char], open: usize) -> usize {
    let mut depth = 0usize;
    let mut i = open;
    while i < chars.len() {
        match chars[i] {
            '"' | '\'' => {
                i = skip_string_chars(chars, i);
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Minifier, Options};

    fn numbers_with(property: &str, word: &str, options: Options) -> String {
        let minifier = Minifier::new(options).unwrap();
        let ctx = minifier.context();
        optimize_numbers(property, word, &ctx)
    }

    fn numbers(property: &str, word: &str) -> String {
        numbers_with(property, word, Options::default())
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number("0.50"), ".5");
        assert_eq!(format_number("-0.0"), "0");
        assert_eq!(format_number("+1"), "1");
        assert_eq!(format_number("010.0"), "10");
        assert_eq!(format_number("-0.25"), "-.25");
    }

    #[test]
    fn test_zero_units() {
        assert_eq!(numbers("margin", "0px"), "0");
        assert_eq!(numbers("margin", "-0.0em"), "0");
        assert_eq!(numbers("width", "0%"), "0%");
        assert_eq!(numbers("transition-delay", "0s"), "0s");
        assert_eq!(numbers("flex-basis", "0px"), "0px");
        assert_eq!(numbers("width", "calc(0px + 1em)"), "calc(0px + 1em)");
        assert_eq!(numbers("clip", "rect(0px,1px,0px,0px)"), "rect(0,1px,0,0)");
    }

    #[test]
    fn test_zero_angles() {
        assert_eq!(numbers("transform", "rotate(0deg)"), "rotate(0)");
        assert_eq!(numbers("transform", "skewX(0.0turn)"), "skewX(0)");
        assert_eq!(
            numbers("background", "linear-gradient(0deg,red,blue)"),
            "linear-gradient(0deg,red,blue)"
        );
    }

    #[test]
    fn test_time_units() {
        assert_eq!(numbers("transition", "500ms"), ".5s");
        assert_eq!(numbers("transition", "1500ms"), "1.5s");
        assert_eq!(numbers("transition", "1ms"), "1ms");
        assert_eq!(numbers("transition", "0.001s"), "1ms");
        assert_eq!(numbers("transition", "0.01s"), ".01s");
        assert_eq!(numbers("transition", "2s"), "2s");
        assert_eq!(numbers("transition", "0ms"), "0s");
    }

    #[test]
    fn test_shorter_length_units() {
        let options = Options::from_json(
            r#"{"compatibility": "*,+properties.shorterLengthUnits,+units.pt,+units.in"}"#,
        )
        .unwrap();
        assert_eq!(numbers_with("width", "192px", options.clone()), "2in");
        assert_eq!(numbers_with("width", "12px", options.clone()), "9pt");
        assert_eq!(numbers_with("width", "5px", options), "5px");
        assert_eq!(numbers("width", "192px"), "192px");
    }

    #[test]
    fn test_shorter_length_units_huge_values() {
        let options = Options::from_json(
            r#"{"compatibility": "*,+properties.shorterLengthUnits,+units.pt,+units.in"}"#,
        )
        .unwrap();
        assert_eq!(
            numbers_with("width", "9223372036854775807px", options.clone()),
            "9223372036854775807px"
        );
        assert_eq!(
            numbers_with("width", "9223372036854775792px", options.clone()),
            "576460752303423487pc"
        );
        assert_eq!(
            numbers_with("width", "99999999999999999999px", options),
            "99999999999999999999px"
        );
    }

    #[test]
    fn test_rounding() {
        let options = Options::from_json(r#"{"level1": {"roundingPrecision": 2}}"#).unwrap();
        assert_eq!(numbers_with("width", "1.23456px", options.clone()), "1.23px");
        assert_eq!(numbers_with("width", "0.001px", options.clone()), "0");
        assert_eq!(numbers_with("width", "1.5px", options), "1.5px");

        let per_unit = Options::from_json(r#"{"level1": {"roundingPrecision": {"px": 0}}}"#).unwrap();
        assert_eq!(numbers_with("width", "1.6px 1.66em", per_unit), "2px 1.66em");
    }

    #[test]
    fn test_skips_non_numbers() {
        assert_eq!(numbers("color", "#000"), "#000");
        assert_eq!(numbers("transform", "translate3d(0px,0,0)"), "translate3d(0,0,0)");
        assert_eq!(numbers("background", "url(a0.50px.png)"), "url(a0.50px.png)");
        assert_eq!(numbers("content", "\"0.50px\""), "\"0.50px\"");
        assert_eq!(numbers("font-family", "h1x"), "h1x");
        assert_eq!(numbers("width", "1e3px"), "1e3px");
    }

    #[test]
    fn test_whitespace() {
        assert_eq!(optimize_whitespace("rgb( 1 , 2 , 3 )"), "rgb(1,2,3)");
        assert_eq!(optimize_whitespace("calc( 1px + 2px )"), "calc(1px + 2px)");
        assert_eq!(optimize_whitespace("calc(1px * 2)"), "calc(1px*2)");
        assert_eq!(optimize_whitespace("attr( data-x )"), "attr(data-x)");
        assert_eq!(optimize_whitespace("format( \"a b\" )"), "format(\"a b\")");
        assert_eq!(optimize_whitespace("image-set(url( a.png ) 1x)"), "image-set(url( a.png ) 1x)");
    }

    #[test]
    fn test_shift_decimal() {
        assert_eq!(shift_decimal("500", -3), "0.500");
        assert_eq!(shift_decimal("0.01", 3), "0010");
        assert_eq!(shift_decimal("-1.5", 3), "-1500");
    }
}
