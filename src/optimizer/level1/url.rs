//! `url()` normalization and quote removal.

use crate::compat::Compatibility;
use crate::compat::validator::is_quoted;

/// Properties whose quoted strings must stay quoted.
const KEEP_QUOTES: &[&str] = &[
    "content",
    "quotes",
    "grid",
    "grid-template",
    "grid-template-areas",
    "font-feature-settings",
    "font-variation-settings",
    "font-language-override",
];

/// Identifiers that change meaning once unquoted (`"serif"` is a family name,
/// `serif` the generic family).
const RESERVED: &[&str] = &[
    "inherit",
    "initial",
    "unset",
    "revert",
    "default",
    "none",
    "normal",
    "auto",
    "serif",
    "sans-serif",
    "monospace",
    "cursive",
    "fantasy",
    "system-ui",
    "math",
    "emoji",
    "fangsong",
];

/// Normalize a `url(...)` fragment.
///
/// The prefix is lowercased, line continuations are dropped and quotes
/// removed when the path cannot be misparsed without them.
pub fn normalize_url(word: &str, compat: &Compatibility) -> String {
    let Some(inner) = word.get(4..).and_then(|rest| rest.strip_suffix(')')) else {
        return word.to_string();
    };
    let inner = inner.trim().replace("\\\n", "").replace("\\\r\n", "");

    let path = if is_quoted(&inner) && compat.properties.url_quotes && can_unquote_url(&inner) {
        inner[1..inner.len() - 1].to_string()
    } else {
        inner
    };

    format!("url({path})")
}

fn can_unquote_url(quoted: &str) -> bool {
    let path = &quoted[1..quoted.len() - 1];
    if path.is_empty() {
        return false;
    }
    if path
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '(' | ')' | '"' | '\'' | '\\'))
    {
        return false;
    }
    let lower = path.to_ascii_lowercase();
    !(lower.starts_with("data:") && lower.contains("charset"))
}

/// Strip quotes around a safe identifier (`"Arial"` → `Arial`).
pub fn unquote(property: &str, word: &str) -> String {
    if KEEP_QUOTES.contains(&property) || !is_quoted(word) {
        return word.to_string();
    }
    let inner = &word[1..word.len() - 1];
    let safe = inner
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && inner
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    let reserved = RESERVED.iter().any(|r| r.eq_ignore_ascii_case(inner));

    if safe && !reserved {
        inner.to_string()
    } else {
        word.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize(word: &str) -> String {
        normalize_url(word, &Compatibility::default())
    }

    #[test]
    fn test_url_quotes() {
        assert_eq!(normalize("url(\"a.png\")"), "url(a.png)");
        assert_eq!(normalize("URL( 'a/b.png' )"), "url(a/b.png)");
        assert_eq!(normalize("url(\"a b.png\")"), "url(\"a b.png\")");
        assert_eq!(normalize("url('a(1).png')"), "url('a(1).png')");
        assert_eq!(
            normalize("url(\"data:text/css;charset=utf-8,a\")"),
            "url(\"data:text/css;charset=utf-8,a\")"
        );
        assert_eq!(normalize("url(\"data:image/png;base64,AAA\")"), "url(data:image/png;base64,AAA)");
    }

    #[test]
    fn test_url_quotes_disabled() {
        let mut compat = Compatibility::default();
        compat.properties.url_quotes = false;
        assert_eq!(normalize_url("url(\"a.png\")", &compat), "url(\"a.png\")");
    }

    #[test]
    fn test_line_continuation() {
        assert_eq!(normalize("url(\"a\\\nb.png\")"), "url(ab.png)");
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("font-family", "\"Arial\""), "Arial");
        assert_eq!(unquote("font-family", "'Open-Sans'"), "Open-Sans");
        assert_eq!(unquote("font-family", "\"Times New Roman\""), "\"Times New Roman\"");
        assert_eq!(unquote("font-family", "\"serif\""), "\"serif\"");
        assert_eq!(unquote("font-family", "\"1a\""), "\"1a\"");
        assert_eq!(unquote("content", "\"x\""), "\"x\"");
        assert_eq!(unquote("animation-name", "\"spin\""), "spin");
    }
}
