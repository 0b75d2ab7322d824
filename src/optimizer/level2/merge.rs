//! Rule merging: duplicates, neighbors and non-adjacent pairs.
//!
//! Two rules merge either by selector list (bodies concatenate, later
//! declarations last) or by body (selector lists union). Merging two
//! rules that are not neighbors moves declarations past everything in
//! between, so those merges first ask [`can_reorder`].

use std::collections::{HashMap, HashSet};

use tracing::trace;

use super::mergeable::is_mergeable;
use super::reorderable::{
    Declaration, can_reorder, extract, extract_rule, has_hacks, is_bem_element,
};
use crate::context::Context;
use crate::optimizer::level0::sort_selectors;
use crate::properties::optimize_properties;
use crate::token::{Rule, Selector, Token};
use crate::writer::{ToCss, serialize_body, serialize_rules};

/// Union of two selector lists, deduplicated and sorted, if it stays
/// within the merge limit.
fn union(left: &[Selector], right: &[Selector], ctx: &Context) -> Option<Vec<Selector>> {
    let mut joined: Vec<Selector> = left.to_vec();
    for selector in right {
        if !joined.iter().any(|s| s.text == selector.text) {
            joined.push(selector.clone());
        }
    }
    if joined.len() > ctx.compat.selectors.merge_limit {
        return None;
    }
    sort_selectors(&mut joined, ctx.options.level0.selectors_sorting_method);
    Some(joined)
}

fn same_selectors(left: &Rule, right: &Rule) -> bool {
    serialize_rules(&left.selectors) == serialize_rules(&right.selectors)
}

/// Drop a rule when an identical one (selectors and body) follows later.
pub fn remove_duplicates(tokens: &mut Vec<Token>) {
    let mut seen = HashSet::new();
    let mut keep = vec![true; tokens.len()];
    for (index, token) in tokens.iter().enumerate().rev() {
        if let Token::Rule(rule) = token
            && !seen.insert(rule.to_css_string())
        {
            keep[index] = false;
        }
    }

    let mut keep = keep.into_iter();
    tokens.retain(|_| keep.next().unwrap_or(true));
}

/// Merge each rule into its predecessor when they share selectors or body.
pub fn merge_adjacent(tokens: &mut Vec<Token>, ctx: &mut Context) {
    let mut merged: Vec<Token> = Vec::with_capacity(tokens.len());
    let mut last_rule: Option<usize> = None;

    for token in tokens.drain(..) {
        let Token::Rule(rule) = token else {
            last_rule = None;
            merged.push(token);
            continue;
        };

        if let Some(index) = last_rule
            && let Token::Rule(previous) = &mut merged[index]
        {
            if same_selectors(previous, &rule) {
                trace!(selectors = %serialize_rules(&rule.selectors), "merged adjacent by selector");
                previous.body.extend(rule.body);
                optimize_properties(&mut previous.body, ctx, true);
                continue;
            }

            if !previous.body.is_empty()
                && serialize_body(&previous.body) == serialize_body(&rule.body)
                && is_mergeable(&previous.selectors, &ctx.compat.selectors)
                && is_mergeable(&rule.selectors, &ctx.compat.selectors)
                && let Some(joined) = union(&previous.selectors, &rule.selectors, ctx)
            {
                trace!(selectors = %serialize_rules(&joined), "merged adjacent by body");
                previous.selectors = joined;
                continue;
            }
        }

        merged.push(Token::Rule(rule));
        last_rule = Some(merged.len() - 1);
    }

    *tokens = merged;
}

/// Whether `moved` may travel past every token of `between`.
fn can_cross(moved: &[Declaration], between: &[Token], ctx: &mut Context) -> bool {
    between
        .iter()
        .all(|token| can_reorder(moved, &extract(token), ctx))
}

/// Join rules sharing a selector list across the whole list.
///
/// The earlier body moves forward into the later rule when it can cross
/// everything in between; otherwise the later body moves back.
pub fn merge_by_selector(tokens: &mut [Token], ctx: &mut Context) {
    let mut groups: HashMap<String, Vec<usize>> = HashMap::new();
    let mut order = Vec::new();
    for (index, token) in tokens.iter().enumerate() {
        if let Token::Rule(rule) = token
            && !rule.body.is_empty()
        {
            let key = serialize_rules(&rule.selectors);
            let positions = groups.entry(key.clone()).or_default();
            if positions.is_empty() {
                order.push(key);
            }
            positions.push(index);
        }
    }

    for key in order {
        let positions = &groups[&key];
        if positions.len() < 2 {
            continue;
        }

        let mut current = positions[0];
        for &next in &positions[1..] {
            let (Some(earlier), Some(later)) = (tokens[current].as_rule(), tokens[next].as_rule()) else {
                continue;
            };
            if has_hacks(earlier) || has_hacks(later) {
                current = next;
                continue;
            }
            let earlier_declarations = extract_rule(earlier);
            let later_declarations = extract_rule(later);
            let between = &tokens[current + 1..next];

            if can_cross(&earlier_declarations, between, ctx) {
                let body = tokens[current].as_rule_mut().map(|rule| std::mem::take(&mut rule.body));
                if let (Some(body), Some(later)) = (body, tokens[next].as_rule_mut()) {
                    trace!(selectors = %key, "merged forward by selector");
                    let mut joined = body;
                    joined.append(&mut later.body);
                    later.body = joined;
                    optimize_properties(&mut later.body, ctx, true);
                }
                current = next;
            } else if can_cross(&later_declarations, between, ctx) {
                let body = tokens[next].as_rule_mut().map(|rule| std::mem::take(&mut rule.body));
                if let (Some(mut body), Some(earlier)) = (body, tokens[current].as_rule_mut()) {
                    trace!(selectors = %key, "merged backward by selector");
                    earlier.body.append(&mut body);
                    optimize_properties(&mut earlier.body, ctx, true);
                }
            } else {
                current = next;
            }
        }
    }
}

/// Union the selectors of rules sharing a body across the whole list.
///
/// Walks from the end; a later rule folds into the nearest earlier rule
/// with the same body when its declarations can move back past
/// everything in between.
pub fn merge_by_body(tokens: &mut [Token], ctx: &mut Context) {
    let semantic = ctx.options.level2.merge_semantically;
    let mut candidates: HashMap<String, usize> = HashMap::new();

    for index in (0..tokens.len()).rev() {
        let Token::Rule(rule) = &tokens[index] else {
            continue;
        };
        if rule.body.is_empty() {
            continue;
        }

        let selectors = serialize_rules(&rule.selectors);
        if (!semantic && ctx.unsafe_selector.is_match(&selectors)) || (semantic && is_bem_element(rule)) {
            candidates.clear();
        }

        let body = serialize_body(&rule.body);
        if let Some(&later) = candidates.get(&body)
            && let Some(joined) = mergeable_union(&tokens[index], &tokens[later], ctx)
        {
            let moved = tokens[later].as_rule().map(extract_rule).unwrap_or_default();
            if can_cross(&moved, &tokens[index + 1..later], ctx) {
                trace!(selectors = %serialize_rules(&joined), "merged non-adjacent by body");
                if let Some(rule) = tokens[index].as_rule_mut() {
                    rule.selectors = joined;
                }
                if let Some(rule) = tokens[later].as_rule_mut() {
                    rule.body.clear();
                }
            }
        }

        candidates.insert(body, index);
    }
}

fn mergeable_union(earlier: &Token, later: &Token, ctx: &Context) -> Option<Vec<Selector>> {
    let (earlier, later) = (earlier.as_rule()?, later.as_rule()?);
    let compat = &ctx.compat.selectors;
    if !is_mergeable(&earlier.selectors, compat) || !is_mergeable(&later.selectors, compat) {
        return None;
    }
    union(&earlier.selectors, &later.selectors, ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Options;
    use crate::tokenizer::tokenize;
    use crate::writer::write;
    use crate::{Minifier, OptimizationLevel};

    fn run(css: &str, pass: impl Fn(&mut Vec<Token>, &mut Context)) -> String {
        let minifier = Minifier::new(Options::with_level(OptimizationLevel::Two)).unwrap();
        let mut ctx = minifier.context();
        let mut warnings = Vec::new();
        let mut tokens = tokenize(css, &mut warnings);
        pass(&mut tokens, &mut ctx);
        tokens.retain(|token| !matches!(token, Token::Rule(rule) if rule.is_empty()));
        write(&tokens)
    }

    #[test]
    fn test_remove_duplicates() {
        assert_eq!(
            run("a{color:red}p{color:blue}a{color:red}", |tokens, _| remove_duplicates(tokens)),
            "p{color:blue}a{color:red}"
        );
        assert_eq!(
            run("a{color:red}a{color:blue}", |tokens, _| remove_duplicates(tokens)),
            "a{color:red}a{color:blue}"
        );
    }

    #[test]
    fn test_adjacent_by_selector() {
        assert_eq!(run("a{color:red}a{color:#fff}", merge_adjacent), "a{color:#fff}");
        assert_eq!(run("a{color:red}a{top:0}", merge_adjacent), "a{color:red;top:0}");
    }

    #[test]
    fn test_adjacent_by_body() {
        assert_eq!(run("b{color:red}a{color:red}", merge_adjacent), "a,b{color:red}");
        assert_eq!(
            run("div:nth-child(5){color:red}div:last-child{color:red}", merge_adjacent),
            "div:nth-child(5){color:red}div:last-child{color:red}"
        );
        assert_eq!(
            run("div:first-child{color:red}p:first-child{color:red}", merge_adjacent),
            "div:first-child,p:first-child{color:red}"
        );
    }

    #[test]
    fn test_adjacent_stops_at_other_tokens() {
        assert_eq!(
            run("a{color:red}@media print{a{top:0}}a{top:0}", merge_adjacent),
            "a{color:red}@media print{a{top:0}}a{top:0}"
        );
    }

    #[test]
    fn test_by_selector_forward() {
        assert_eq!(
            run("a{color:red}p{top:0}a{margin:0}", |tokens, ctx| merge_by_selector(tokens, ctx)),
            "p{top:0}a{color:red;margin:0}"
        );
    }

    #[test]
    fn test_by_selector_blocked() {
        assert_eq!(
            run(".a{color:red}.b{color:blue}.a{color:green}", |tokens, ctx| merge_by_selector(tokens, ctx)),
            ".a{color:red}.b{color:blue}.a{color:green}"
        );
    }

    #[test]
    fn test_by_body() {
        assert_eq!(
            run("a{color:red}p{top:0}b{color:red}", |tokens, ctx| merge_by_body(tokens, ctx)),
            "a,b{color:red}p{top:0}"
        );
    }

    #[test]
    fn test_by_body_respects_cascade() {
        assert_eq!(
            run("a{color:red}b{color:blue}b{color:red}", |tokens, ctx| merge_by_body(tokens, ctx)),
            "a{color:red}b{color:blue}b{color:red}"
        );
    }

    #[test]
    fn test_by_body_unsafe_selectors() {
        assert_eq!(
            run("a{color:red}.x{top:0}b{color:red}", |tokens, ctx| merge_by_body(tokens, ctx)),
            "a{color:red}.x{top:0}b{color:red}"
        );
    }
}
