//! Shared text helpers.

use std::borrow::Cow;
use std::cmp::Ordering;

/// Decode stylesheet bytes to a string.
///
/// This function:
/// 1. First tries UTF-8 (handles BOM automatically via encoding_rs)
/// 2. If malformed, tries the hint encoding (from a leading `@charset`)
/// 3. Falls back to Windows-1252 (common in legacy stylesheets)
///
/// Uses `Cow<str>` to avoid allocation when the input is valid UTF-8.
///
/// # Examples
///
/// ```
/// use trimcss::util::decode_text;
///
/// assert_eq!(decode_text(b"a{color:red}", None), "a{color:red}");
/// assert_eq!(decode_text(b"a{content:\"\xe9\"}", Some("iso-8859-1")), "a{content:\"\u{e9}\"}");
/// ```
pub fn decode_text<'a>(bytes: &'a [u8], hint_encoding: Option<&str>) -> Cow<'a, str> {
    let (result, _encoding, malformed) = encoding_rs::UTF_8.decode(bytes);

    if !malformed {
        return result;
    }

    if let Some(name) = hint_encoding
        && let Some(encoding) = encoding_rs::Encoding::for_label(name.as_bytes())
    {
        let (result, _, _) = encoding.decode(bytes);
        return result;
    }

    let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    result
}

/// Extract the encoding name from a leading `@charset "...";` rule.
///
/// Only a declaration at the very start of the input (after an optional BOM)
/// counts, matching how browsers treat it.
pub fn extract_charset(bytes: &[u8]) -> Option<&str> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let rest = bytes.strip_prefix(b"@charset ")?;

    let quote = *rest.first()?;
    if quote != b'"' && quote != b'\'' {
        return None;
    }

    let end = memchr::memchr(quote, &rest[1..])? + 1;
    std::str::from_utf8(&rest[1..end]).ok()
}

// ============================================================================
// Timing
// ============================================================================

/// Elapsed-time measurement for run statistics.
///
/// On native platforms, uses `Instant`. On WASM, where `Instant` is not
/// available, elapsed time is always zero.
pub struct Stopwatch {
    #[cfg(not(target_arch = "wasm32"))]
    started: std::time::Instant,
}

impl Stopwatch {
    #[cfg(not(target_arch = "wasm32"))]
    pub fn start() -> Self {
        Self {
            started: std::time::Instant::now(),
        }
    }

    #[cfg(target_arch = "wasm32")]
    pub fn start() -> Self {
        Self {}
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn elapsed(&self) -> std::time::Duration {
        self.started.elapsed()
    }

    #[cfg(target_arch = "wasm32")]
    pub fn elapsed(&self) -> std::time::Duration {
        std::time::Duration::ZERO
    }
}

// ============================================================================
// Top-level Splitting
// ============================================================================

/// Split `text` on `separator` occurring outside quotes and brackets.
///
/// Backslash escapes are honored. Empty pieces are kept so callers can
/// decide how to treat them; surrounding whitespace is not trimmed.
pub fn split_top_level(text: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;

    for (i, c) in text.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            _ if quote == Some(c) => quote = None,
            _ if quote.is_some() => {}
            '"' | '\'' => quote = Some(c),
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            _ if c == separator && depth == 0 => {
                parts.push(&text[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);

    parts
}

/// Collapse runs of whitespace outside quotes to a single space and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut pending_space = false;

    for c in text.chars() {
        if quote.is_none() && !escaped && c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space && !out.is_empty() {
            out.push(' ');
        }
        pending_space = false;
        out.push(c);

        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if quote == Some(c) {
            quote = None;
        } else if quote.is_none() && (c == '"' || c == '\'') {
            quote = Some(c);
        }
    }

    out
}

// ============================================================================
// Vendor Prefixes
// ============================================================================

/// Vendor prefix of a name (`-webkit-`), if any.
pub fn vendor_prefix(name: &str) -> Option<&str> {
    let rest = name.strip_prefix('-')?;
    if rest.starts_with('-') {
        return None;
    }
    let end = rest.find('-')?;
    Some(&name[..end + 2])
}

/// Every vendor prefix appearing in a value (`-moz-calc(...)` yields `-moz-`).
pub fn vendor_prefixes_in(text: &str) -> Vec<&str> {
    let mut prefixes: Vec<&str> = Vec::new();
    let bytes = text.as_bytes();

    for (i, &b) in bytes.iter().enumerate() {
        let at_word_start = i == 0 || !(bytes[i - 1].is_ascii_alphanumeric() || bytes[i - 1] == b'-');
        if b == b'-'
            && at_word_start
            && let Some(prefix) = vendor_prefix(&text[i..])
            && prefix.len() > 2
            && prefix[1..prefix.len() - 1].bytes().all(|b| b.is_ascii_alphabetic())
            && !prefixes.contains(&prefix)
        {
            prefixes.push(prefix);
        }
    }

    prefixes
}

/// Name without its vendor prefix (`-webkit-transition` → `transition`).
pub fn unprefixed(name: &str) -> &str {
    match vendor_prefix(name) {
        Some(prefix) => &name[prefix.len()..],
        None => name,
    }
}

// ============================================================================
// Sorting
// ============================================================================

/// Compare strings treating embedded digit runs as numbers (`a2` < `a10`).
pub fn natural_compare(a: &str, b: &str) -> Ordering {
    let mut left = a.as_bytes();
    let mut right = b.as_bytes();

    loop {
        match (left.first(), right.first()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) if l.is_ascii_digit() && r.is_ascii_digit() => {
                let l_len = left.iter().take_while(|b| b.is_ascii_digit()).count();
                let r_len = right.iter().take_while(|b| b.is_ascii_digit()).count();
                let l_num = trim_leading_zeros(&left[..l_len]);
                let r_num = trim_leading_zeros(&right[..r_len]);

                let ordering = l_num.len().cmp(&r_num.len()).then_with(|| l_num.cmp(r_num));
                if ordering != Ordering::Equal {
                    return ordering;
                }
                left = &left[l_len..];
                right = &right[r_len..];
            }
            (Some(l), Some(r)) => {
                if l != r {
                    return l.cmp(r);
                }
                left = &left[1..];
                right = &right[1..];
            }
        }
    }
}

fn trim_leading_zeros(digits: &[u8]) -> &[u8] {
    let zeros = digits.iter().take_while(|&&b| b == b'0').count();
    &digits[zeros.min(digits.len().saturating_sub(1))..]
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_text_fallback() {
        let bytes = b"a{content:\"caf\xe9\"}";
        assert_eq!(decode_text(bytes, None), "a{content:\"caf\u{e9}\"}");
    }

    #[test]
    fn test_extract_charset() {
        assert_eq!(extract_charset(b"@charset \"utf-8\";a{}"), Some("utf-8"));
        assert_eq!(extract_charset(b"\xEF\xBB\xBF@charset 'latin1';"), Some("latin1"));
        assert_eq!(extract_charset(b"a{} @charset \"utf-8\";"), None);
    }

    #[test]
    fn test_split_top_level() {
        assert_eq!(split_top_level("a,b", ','), vec!["a", "b"]);
        assert_eq!(
            split_top_level("a:not(b,c),[d=\",\"],e", ','),
            vec!["a:not(b,c)", "[d=\",\"]", "e"]
        );
        assert_eq!(split_top_level("a;;b", ';'), vec!["a", "", "b"]);
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \n  b  "), "a b");
        assert_eq!(collapse_whitespace("'a   b'  c"), "'a   b' c");
    }

    #[test]
    fn test_vendor_prefix() {
        assert_eq!(vendor_prefix("-webkit-transition"), Some("-webkit-"));
        assert_eq!(vendor_prefix("transition"), None);
        assert_eq!(vendor_prefix("--custom"), None);
        assert_eq!(unprefixed("-moz-border-radius"), "border-radius");
        assert_eq!(vendor_prefixes_in("-moz-calc(1px + 2px) -webkit-linear-gradient(red,blue)"), vec!["-moz-", "-webkit-"]);
        assert!(vendor_prefixes_in("1px -2px").is_empty());
    }

    #[test]
    fn test_natural_compare() {
        assert_eq!(natural_compare("a2", "a10"), Ordering::Less);
        assert_eq!(natural_compare("a10", "a2"), Ordering::Greater);
        assert_eq!(natural_compare("a", "a"), Ordering::Equal);
        assert_eq!(natural_compare(".b", ".a"), Ordering::Greater);
    }
}
