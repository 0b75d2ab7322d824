//! Selector specificity.

use crate::util::split_top_level;

/// `(ids, classes, types)`; compares lexicographically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Specificity(pub u32, pub u32, pub u32);

impl std::ops::Add for Specificity {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0 + other.0, self.1 + other.1, self.2 + other.2)
    }
}

/// Pseudo-classes whose specificity is that of their most specific argument.
const FORWARDING: &[&str] = &[":not", ":is", ":has", ":matches", ":-moz-any", ":-webkit-any"];

/// Pseudo-elements that may be written with a single colon.
const LEGACY_ELEMENTS: &[&str] = &[":after", ":before", ":first-letter", ":first-line"];

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}

/// Byte length of the identifier at the start of `text`, escapes included.
fn ident_len(text: &str) -> usize {
    let mut chars = text.char_indices();
    let mut end = 0;
    while let Some((i, c)) = chars.next() {
        if c == '\\' {
            end = match chars.next() {
                Some((j, escaped)) => j + escaped.len_utf8(),
                None => i + 1,
            };
        } else if is_ident_char(c) {
            end = i + c.len_utf8();
        } else {
            break;
        }
    }
    end
}

/// Byte length of the bracketed group at the start of `text`, brackets included.
fn group_len(text: &str, open: char, close: char) -> usize {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
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
            _ if c == open => depth += 1,
            _ if c == close => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return i + 1;
                }
            }
            _ => {}
        }
    }
    text.len()
}

fn most_specific(list: &str) -> Specificity {
    split_top_level(list, ',')
        .into_iter()
        .map(specificity)
        .max()
        .unwrap_or_default()
}

/// Specificity of a single (comma-free) selector.
pub fn specificity(selector: &str) -> Specificity {
    let mut result = Specificity::default();
    let mut rest = selector.trim();

    while let Some(c) = rest.chars().next() {
        match c {
            '#' => {
                result.0 += 1;
                rest = &rest[1 + ident_len(&rest[1..])..];
            }
            '.' => {
                result.1 += 1;
                rest = &rest[1 + ident_len(&rest[1..])..];
            }
            '[' => {
                result.1 += 1;
                rest = &rest[group_len(rest, '[', ']')..];
            }
            ':' => {
                let element = rest.starts_with("::");
                let start = if element { 2 } else { 1 };
                let name_end = start + ident_len(&rest[start..]);
                let name = rest[..name_end].to_ascii_lowercase();
                rest = &rest[name_end..];

                let arguments = if rest.starts_with('(') {
                    let len = group_len(rest, '(', ')');
                    let group = &rest[1..len];
                    rest = &rest[len..];
                    Some(group.strip_suffix(')').unwrap_or(group).trim())
                } else {
                    None
                };

                let name = name.as_str();
                if element || LEGACY_ELEMENTS.contains(&name) {
                    result.2 += 1;
                } else if FORWARDING.contains(&name) {
                    result = result + most_specific(arguments.unwrap_or(""));
                } else if name.starts_with(":nth-")
                    && let Some((_, of)) = arguments.and_then(|a| a.split_once(" of "))
                {
                    result = result + Specificity(0, 1, 0) + most_specific(of);
                } else if name != ":where" {
                    result.1 += 1;
                }
            }
            '\\' => {
                result.2 += 1;
                rest = &rest[ident_len(rest)..];
            }
            c if is_ident_char(c) && !c.is_ascii_digit() => {
                result.2 += 1;
                rest = &rest[ident_len(rest)..];
            }
            other => rest = &rest[other.len_utf8()..],
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_specificity() {
        assert_eq!(specificity("*"), Specificity(0, 0, 0));
        assert_eq!(specificity("a"), Specificity(0, 0, 1));
        assert_eq!(specificity("ul li"), Specificity(0, 0, 2));
        assert_eq!(specificity(".a.b"), Specificity(0, 2, 0));
        assert_eq!(specificity("#x>a[href]"), Specificity(1, 1, 1));
        assert_eq!(specificity("a:hover"), Specificity(0, 1, 1));
        assert_eq!(specificity("a::before"), Specificity(0, 0, 2));
        assert_eq!(specificity("a:before"), Specificity(0, 0, 2));
    }

    #[test]
    fn test_functional_pseudo_classes() {
        assert_eq!(specificity("a:not(.b)"), Specificity(0, 1, 1));
        assert_eq!(specificity(":is(#a, .b)"), Specificity(1, 0, 0));
        assert_eq!(specificity(":where(#a) b"), Specificity(0, 0, 1));
        assert_eq!(specificity("li:nth-child(2n+1)"), Specificity(0, 1, 1));
        assert_eq!(specificity("li:nth-child(2n of .x)"), Specificity(0, 2, 1));
    }

    #[test]
    fn test_quoted_attribute_contents_ignored() {
        assert_eq!(specificity("a[title=\"#x .y\"]"), Specificity(0, 1, 1));
    }

    #[test]
    fn test_ordering() {
        assert!(specificity("#a") > specificity(".a.b.c"));
        assert!(specificity(".a") > specificity("div p"));
    }
}
