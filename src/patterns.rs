//! Cached regex patterns for value and selector processing.
//!
//! Uses LazyLock to compile patterns once on first use.

use regex::Regex;
use std::sync::LazyLock;

// === Values ===

/// A plain number: `1`, `-.5`, `+2.`, `1e3`
pub static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?$").unwrap());

/// A time value: `1s`, `.5ms`
pub static TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[+-]?(?:\d+\.?\d*|\.\d+)m?s$").unwrap());

/// `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`
pub static HEX_COLOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{4}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})$").unwrap()
});

/// A complete function call; captures the name
pub static FUNCTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^(-?[a-zA-Z_][\w-]*)\(.*\)$").unwrap());

/// `progid:DXImageTransform.Microsoft...` filters
pub static PROGID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^progid:").unwrap());

/// Whitespace around `=` inside legacy filter arguments
pub static PROGID_EQUALS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" ?= ?").unwrap());

// === Selectors ===

/// Default pattern for selectors that must never be merged by body
pub const UNSAFE_SELECTOR_SOURCE: &str = r"\.|\*| :";

/// `<!--` / `-->` markers left over from HTML-embedded stylesheets
pub static HTML_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:<!--|-->)\s*|\s*(?:<!--|-->)\s*$").unwrap());

/// Vendor-prefixed pseudo-class or pseudo-element; captures the prefix
pub static VENDOR_PSEUDO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"::?(-[a-zA-Z]+-)").unwrap());

/// Quoted attribute value that can go unquoted: `[type="text"]`
pub static QUOTED_ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\[([^\]=~|^$*"']+[~|^$*]?=)(?:"([a-zA-Z_][\w-]*)"|'([a-zA-Z_][\w-]*)')(\s+[iIsS])?\]"#)
        .unwrap()
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_patterns() {
        assert!(NUMBER.is_match("1"));
        assert!(NUMBER.is_match("-.5"));
        assert!(NUMBER.is_match("1e3"));
        assert!(!NUMBER.is_match("1px"));
    }

    #[test]
    fn test_function_pattern() {
        let captures = FUNCTION.captures("rgba(0,0,0,.5)").unwrap();
        assert_eq!(&captures[1], "rgba");
        assert!(FUNCTION.is_match("-webkit-calc(1px + 2px)"));
        assert!(!FUNCTION.is_match("solid"));
    }

    #[test]
    fn test_quoted_attribute() {
        let re = &*QUOTED_ATTRIBUTE;
        assert!(re.is_match(r#"[type="text"]"#));
        assert!(re.is_match(r#"[lang|='en']"#));
        assert!(!re.is_match(r#"[title="a b"]"#));
    }

    #[test]
    fn test_vendor_pseudo() {
        let captures = VENDOR_PSEUDO.captures("input::-moz-placeholder").unwrap();
        assert_eq!(&captures[1], "-moz-");
        assert!(!VENDOR_PSEUDO.is_match("a:hover"));
    }
}
