//! Selector, block-scope and at-rule text normalization.

use std::cmp::Ordering;

use crate::compat::Compatibility;
use crate::context::Context;
use crate::options::SortingMethod;
use crate::patterns::{HTML_COMMENT, QUOTED_ATTRIBUTE};
use crate::token::Selector;
use crate::util::{collapse_whitespace, natural_compare};

const IE7_HACKS: &[&str] = &["*+html ", "*:first-child+html "];

/// Normalize a selector list.
///
/// Each selector is whitespace-tidied; duplicates and IE7-only hacks are
/// dropped and the list is sorted. A single invalid selector invalidates
/// the whole list (browsers drop such rules), which is reported as an
/// empty result.
pub fn tidy_rules(selectors: Vec<Selector>, ctx: &mut Context) -> Vec<Selector> {
    let mut tidied: Vec<Selector> = Vec::with_capacity(selectors.len());

    for selector in selectors {
        let mut text = selector.text.as_str();

        let stripped;
        if HTML_COMMENT.is_match(text) {
            ctx.warn(
                format!("Removed HTML comment markers from selector '{text}'"),
                selector.position,
            );
            stripped = HTML_COMMENT.replace_all(text, "").into_owned();
            text = &stripped;
        }

        let Some(tidy) = tidy_selector(text, ctx.compat) else {
            ctx.warn(format!("Invalid selector '{text}' ignored"), selector.position);
            return Vec::new();
        };

        if tidy.is_empty() {
            continue;
        }
        if !ctx.compat.selectors.ie7_hack && IE7_HACKS.iter().any(|hack| tidy.starts_with(hack)) {
            continue;
        }
        if tidied.iter().any(|s| s.text == tidy) {
            continue;
        }

        tidied.push(Selector {
            text: tidy,
            position: selector.position,
        });
    }

    sort_selectors(&mut tidied, ctx.options.level0.selectors_sorting_method);
    tidied
}

pub fn sort_selectors(selectors: &mut [Selector], method: SortingMethod) {
    let compare: fn(&str, &str) -> Ordering = match method {
        SortingMethod::Standard => |a, b| a.cmp(b),
        SortingMethod::Natural => natural_compare,
        SortingMethod::None => return,
    };
    selectors.sort_by(|a, b| compare(&a.text, &b.text));
}

/// Tidy one selector, or `None` when it is malformed.
pub fn tidy_selector(text: &str, compat: &Compatibility) -> Option<String> {
    let mut out = String::with_capacity(text.len());
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut pending_space = false;
    let mut brackets = 0usize;
    let mut parens = 0usize;
    let mut after_combinator = false;
    let mut combinator_followed_by_space = false;

    for c in text.chars() {
        if escaped {
            out.push(c);
            escaped = false;
            continue;
        }
        if let Some(q) = quote {
            out.push(c);
            if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }

        if c.is_whitespace() {
            pending_space = true;
            if after_combinator {
                combinator_followed_by_space = true;
            }
            continue;
        }

        let space = std::mem::take(&mut pending_space) && !out.is_empty();

        if brackets > 0 {
            // Inside `[...]`: drop spaces next to the brackets and operators.
            let operator_like = matches!(c, ']' | '=' | '~' | '|' | '^' | '$' | '*');
            let previous_operator = out.ends_with(['[', '=', '~', '|', '^', '$', '*']);
            if space && !operator_like && !previous_operator {
                out.push(' ');
            }
            match c {
                '[' => brackets += 1,
                ']' => brackets -= 1,
                '"' | '\'' => quote = Some(c),
                '\\' => escaped = true,
                _ => {}
            }
            out.push(c);
            continue;
        }

        match c {
            '>' | '+' | '~' | ',' => {
                out.push(c);
                after_combinator = c == '+';
                combinator_followed_by_space = false;
                continue;
            }
            ')' => {
                parens = parens.checked_sub(1)?;
                out.push(c);
            }
            '(' => {
                parens += 1;
                out.push(c);
                after_combinator = false;
                continue;
            }
            _ => {
                let previous = out.chars().last();
                let after_separator = matches!(previous, Some('>' | '+' | '~' | ',' | '('));
                if space && !after_separator {
                    out.push(' ');
                } else if previous == Some('+')
                    && compat.selectors.adjacent_space
                    && combinator_followed_by_space
                    && c.is_ascii_alphabetic()
                {
                    out.push(' ');
                }
                match c {
                    '[' => brackets += 1,
                    ']' => return None,
                    '"' | '\'' => quote = Some(c),
                    '\\' => escaped = true,
                    '{' | '}' | ';' => return None,
                    _ => {}
                }
                out.push(c);
            }
        }
        after_combinator = false;
    }

    if quote.is_some() || brackets > 0 || parens > 0 || escaped {
        return None;
    }
    if out.ends_with(['>', '+', '~', ',']) {
        return None;
    }

    if out.contains('[') {
        out = QUOTED_ATTRIBUTE
            .replace_all(&out, "[${1}${2}${3}${4}]")
            .into_owned();
    }

    Some(out)
}

/// Tidy the preamble of a block at-rule (`@media`, `@supports`, ...).
pub fn tidy_block(scope: &str) -> String {
    tidy_preamble(scope, true)
}

/// Tidy a statement at-rule (`@import`, `@charset`, ...).
pub fn tidy_at_rule(text: &str) -> String {
    tidy_preamble(text, false)
}

/// Collapse whitespace and drop it next to `(`, `)`, `,` and, inside
/// parentheses, `:`. A space before `(` is kept since `and(` would parse as
/// a function.
fn tidy_preamble(text: &str, colons: bool) -> String {
    let collapsed = collapse_whitespace(text);
    let mut out = String::with_capacity(collapsed.len());
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut parens = 0usize;
    let chars: Vec<char> = collapsed.chars().collect();

    for (i, &c) in chars.iter().enumerate() {
        if escaped {
            escaped = false;
            out.push(c);
            continue;
        }
        if let Some(q) = quote {
            if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            out.push(c);
            continue;
        }

        match c {
            '"' | '\'' => quote = Some(c),
            '\\' => escaped = true,
            '(' => parens += 1,
            ')' => parens = parens.saturating_sub(1),
            ' ' => {
                let previous = out.chars().last();
                let next = chars.get(i + 1).copied();
                let separator = |ch: Option<char>| {
                    matches!(ch, Some(',')) || (colons && parens > 0 && matches!(ch, Some(':')))
                };
                if matches!(previous, Some('(')) || matches!(next, Some(')')) {
                    continue;
                }
                if separator(previous) || separator(next) {
                    continue;
                }
            }
            _ => {}
        }
        out.push(c);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Minifier, Options};

    fn tidy(text: &str) -> Option<String> {
        tidy_selector(text, &Compatibility::default())
    }

    fn tidy_list(selectors: &[&str]) -> Vec<String> {
        let minifier = Minifier::new(Options::default()).unwrap();
        let mut ctx = minifier.context();
        let selectors = selectors.iter().map(|s| Selector::new(*s)).collect();
        tidy_rules(selectors, &mut ctx)
            .into_iter()
            .map(|s| s.text)
            .collect()
    }

    #[test]
    fn test_whitespace() {
        assert_eq!(tidy("  div   >  p  ").as_deref(), Some("div>p"));
        assert_eq!(tidy("a + b ~ c").as_deref(), Some("a+b~c"));
        assert_eq!(tidy("ul  li").as_deref(), Some("ul li"));
        assert_eq!(tidy("a:not( .b , .c )").as_deref(), Some("a:not(.b,.c)"));
        assert_eq!(tidy("li:nth-child( 2n + 1 )").as_deref(), Some("li:nth-child(2n+1)"));
    }

    #[test]
    fn test_attributes() {
        assert_eq!(tidy("[ type = \"text\" ]").as_deref(), Some("[type=text]"));
        assert_eq!(tidy("[title=\"a b\"]").as_deref(), Some("[title=\"a b\"]"));
        assert_eq!(tidy("a[href$='.pdf']").as_deref(), Some("a[href$='.pdf']"));
        assert_eq!(tidy("[lang|=\"en\" i]").as_deref(), Some("[lang|=en i]"));
    }

    #[test]
    fn test_invalid_selectors() {
        assert_eq!(tidy("a >"), None);
        assert_eq!(tidy("a[href"), None);
        assert_eq!(tidy("a:not(.b"), None);
        assert_eq!(tidy("a\"b"), None);
    }

    #[test]
    fn test_adjacent_space() {
        let mut compat = Compatibility::default();
        compat.selectors.adjacent_space = true;
        assert_eq!(tidy_selector("div + nav", &compat).as_deref(), Some("div+ nav"));
        assert_eq!(tidy("div + nav").as_deref(), Some("div+nav"));
    }

    #[test]
    fn test_list_dedupe_sort_and_hacks() {
        assert_eq!(tidy_list(&["b", "a", "b"]), vec!["a", "b"]);
        assert_eq!(tidy_list(&["*+html .a", ".b"]), vec![".b"]);
        assert_eq!(tidy_list(&["<!-- .a", ".b -->"]), vec![".a", ".b"]);
        assert!(tidy_list(&["a", "b >"]).is_empty());
    }

    #[test]
    fn test_natural_sorting() {
        let mut selectors = vec![Selector::new(".a10"), Selector::new(".a2")];
        sort_selectors(&mut selectors, SortingMethod::Natural);
        assert_eq!(selectors[0].text, ".a2");
        sort_selectors(&mut selectors, SortingMethod::Standard);
        assert_eq!(selectors[0].text, ".a10");
    }

    #[test]
    fn test_tidy_block_and_at_rule() {
        assert_eq!(
            tidy_block("@media  screen  and ( max-width : 100px ) ,  print"),
            "@media screen and (max-width:100px),print"
        );
        assert_eq!(tidy_block("@supports not (display: grid)"), "@supports not (display:grid)");
        assert_eq!(
            tidy_at_rule("@import   url( \"a b.css\" )  screen"),
            "@import url(\"a b.css\") screen"
        );
    }
}
