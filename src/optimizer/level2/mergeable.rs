//! Whether a selector list may take part in selector-list merging.
//!
//! A browser drops a whole rule when it does not understand one selector
//! of its list, so joining `a` with `b::-moz-selection` would hide `a`
//! from every other browser. Pseudo tokens are extracted with a scanner
//! that respects quotes, brackets and argument lists, since arguments can
//! hold colons and commas themselves (`:not(a:hover, b)`).

use crate::compat::Selectors;
use crate::token::Selector;
use crate::util::vendor_prefix;

/// Pseudo-classes that take an argument list.
const PSEUDO_CLASSES_WITH_ARGUMENTS: &[&str] = &[
    ":current",
    ":dir",
    ":future",
    ":has",
    ":host",
    ":host-context",
    ":is",
    ":lang",
    ":not",
    ":nth-child",
    ":nth-last-child",
    ":nth-last-of-type",
    ":nth-of-type",
    ":past",
    ":where",
];

const LEGACY_ELEMENTS: &[&str] = &[":after", ":before", ":first-letter", ":first-line"];

const IE7_HACKS: &[&str] = &["*+html", "*:first-child+html"];

#[derive(Debug, PartialEq)]
struct Pseudo<'a> {
    /// Name including its colons (`:hover`, `::before`)
    name: &'a str,
    /// Full token including arguments (`:not(.a)`)
    token: &'a str,
    has_arguments: bool,
    /// Index of the compound selector it belongs to
    compound: usize,
}

impl Pseudo<'_> {
    fn is_element(&self) -> bool {
        self.name.starts_with("::") || LEGACY_ELEMENTS.iter().any(|e| e.eq_ignore_ascii_case(self.name))
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// Pseudo tokens at the top level of one selector.
fn pseudos(selector: &str) -> Vec<Pseudo<'_>> {
    let mut found = Vec::new();
    let bytes = selector.as_bytes();
    let mut compound = 0;
    let mut bracket = 0usize;
    let mut quote: Option<u8> = None;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        if let Some(q) = quote {
            if b == b'\\' {
                i += 1;
            } else if b == q {
                quote = None;
            }
            i += 1;
            continue;
        }
        match b {
            b'\\' => i += 1,
            b'"' | b'\'' => quote = Some(b),
            b'[' => bracket += 1,
            b']' => bracket = bracket.saturating_sub(1),
            b' ' | b'>' | b'+' | b'~' if bracket == 0 => compound += 1,
            b':' if bracket == 0 => {
                let start = i;
                i += if bytes.get(i + 1) == Some(&b':') { 2 } else { 1 };
                let name_start = i;
                while i < bytes.len() && is_name_char(bytes[i] as char) {
                    i += 1;
                }
                let name_end = i;
                let mut has_arguments = false;
                if bytes.get(i) == Some(&b'(') {
                    has_arguments = true;
                    i = argument_end(bytes, i);
                }
                if name_end > name_start {
                    found.push(Pseudo {
                        name: &selector[start..name_end],
                        token: &selector[start..i],
                        has_arguments,
                        compound,
                    });
                }
                continue;
            }
            _ => {}
        }
        i += 1;
    }

    found
}

/// Index just past the `)` closing the group that opens at `open`.
fn argument_end(bytes: &[u8], open: usize) -> usize {
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut i = open;
    while i < bytes.len() {
        let b = bytes[i];
        match (quote, b) {
            (_, b'\\') => i += 1,
            (Some(q), _) if b == q => quote = None,
            (Some(_), _) => {}
            (None, b'"' | b'\'') => quote = Some(b),
            (None, b'(') => depth += 1,
            (None, b')') => {
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

fn is_supported(pseudo: &Pseudo, compat: &Selectors) -> bool {
    let lower = pseudo.name.to_ascii_lowercase();
    let listed = if pseudo.name.starts_with("::") {
        &compat.mergeable_pseudo_elements
    } else {
        &compat.mergeable_pseudo_classes
    };
    if !listed.iter().any(|name| *name == lower) {
        return false;
    }
    !pseudo.has_arguments || PSEUDO_CLASSES_WITH_ARGUMENTS.contains(&lower.as_str())
}

/// Whether one selector is safe to list next to others.
pub fn is_mergeable_selector(selector: &str, compat: &Selectors) -> bool {
    let selector = selector.trim();
    if selector.is_empty()
        || selector.contains("/deep/")
        || IE7_HACKS.iter().any(|hack| selector.starts_with(hack))
    {
        return false;
    }

    let pseudos = pseudos(selector);
    if pseudos.is_empty() {
        return true;
    }
    if pseudos.len() > 1 && !compat.multiple_pseudo_merging {
        return false;
    }

    for (index, pseudo) in pseudos.iter().enumerate() {
        let bare = pseudo.name.trim_start_matches(':');
        if vendor_prefix(bare).is_some() || !is_supported(pseudo, compat) {
            return false;
        }
        if pseudos[..index].iter().any(|other| other.token == pseudo.token) {
            return false;
        }
        let mixed = pseudos.iter().any(|other| {
            other.compound == pseudo.compound && other.is_element() != pseudo.is_element()
        });
        if mixed {
            return false;
        }
    }

    true
}

/// Whether every selector of a list is safe to merge.
pub fn is_mergeable(selectors: &[Selector], compat: &Selectors) -> bool {
    selectors
        .iter()
        .all(|selector| is_mergeable_selector(&selector.text, compat))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mergeable(selector: &str) -> bool {
        is_mergeable_selector(selector, &Selectors::default())
    }

    #[test]
    fn test_plain_selectors() {
        assert!(mergeable("div"));
        assert!(mergeable(".a > .b + p ~ i"));
        assert!(mergeable("a[href=\"x:y\"]"));
        assert!(!mergeable(""));
        assert!(!mergeable(".a /deep/ .b"));
        assert!(!mergeable("*+html .a"));
    }

    #[test]
    fn test_supported_pseudos() {
        assert!(mergeable("div:first-child"));
        assert!(mergeable("a:hover"));
        assert!(mergeable("p::before"));
        assert!(mergeable("p:not(.a)"));
        assert!(!mergeable("div:nth-child(5)"));
        assert!(!mergeable("input::-moz-placeholder"));
        assert!(!mergeable("a:-webkit-any-link"));
        assert!(!mergeable("a:hover(1)"));
    }

    #[test]
    fn test_pseudo_combinations() {
        assert!(mergeable("a:hover:focus"));
        assert!(mergeable("a:hover .b:focus"));
        assert!(!mergeable("a:hover:hover"));
        assert!(!mergeable("a:hover::before"));
        assert!(mergeable("a:hover ::before"));
    }

    #[test]
    fn test_single_pseudo_when_multiple_disabled() {
        let compat = Selectors {
            multiple_pseudo_merging: false,
            ..Selectors::default()
        };
        assert!(is_mergeable_selector("a:hover", &compat));
        assert!(!is_mergeable_selector("a:hover:focus", &compat));
    }

    #[test]
    fn test_pseudo_scanner() {
        let found = pseudos("a:not(b:hover, c)::after");
        let tokens: Vec<&str> = found.iter().map(|p| p.token).collect();
        assert_eq!(tokens, vec![":not(b:hover, c)", "::after"]);
    }

    #[test]
    fn test_list() {
        let compat = Selectors::default();
        assert!(is_mergeable(&[Selector::new("a"), Selector::new("b:hover")], &compat));
        assert!(!is_mergeable(&[Selector::new("a"), Selector::new("b:nth-child(2)")], &compat));
    }
}
