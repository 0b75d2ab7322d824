//! Restructuring: hoist a declaration shared by several rules into one
//! new rule ahead of them.
//!
//! ```text
//! a{color:red;top:0}p{margin:0}b{color:red;left:0}
//!   → a,b{color:red}a{top:0}p{margin:0}b{left:0}
//! ```
//!
//! A copy may only travel back past tokens it commutes with, and only
//! declarations that nothing else in their own rule overlaps are
//! considered. Hoists are applied greedily, biggest saving first, and
//! each one shrinks the output, so the loop ends.

use std::collections::HashMap;

use tracing::debug;

use super::mergeable::is_mergeable;
use super::reorderable::{Declaration, can_reorder, extract};
use crate::context::Context;
use crate::optimizer::level0::sort_selectors;
use crate::properties::overlap;
use crate::token::{BodyItem, Property, Rule, Selector, Token};
use crate::writer::{ToCss, serialize_rules};

struct Hoist {
    property: Property,
    key: String,
    /// Rules giving up the declaration, ascending
    occurrences: Vec<usize>,
    selectors: Vec<Selector>,
    saving: usize,
}

pub fn restructure(tokens: &mut Vec<Token>, ctx: &mut Context) {
    let mut hoisted = 0;
    while let Some(hoist) = best_hoist(tokens, ctx) {
        apply(tokens, hoist);
        hoisted += 1;
    }
    if hoisted > 0 {
        debug!(hoisted, "restructured");
    }
}

/// Whether `property` can leave `rule` without reordering it against
/// the rule's other declarations.
fn is_movable(rule: &Rule, property: &Property) -> bool {
    if !property.hack.is_none() || property.has_block() {
        return false;
    }
    let name = property.lower_name();
    rule.properties()
        .filter(|other| !std::ptr::eq(*other, property))
        .all(|other| !overlap(&other.lower_name(), &name))
}

fn candidates(tokens: &[Token], ctx: &Context) -> Vec<(String, Property, Vec<usize>)> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut found: Vec<(String, Property, Vec<usize>)> = Vec::new();

    for (position, token) in tokens.iter().enumerate() {
        let Token::Rule(rule) = token else {
            continue;
        };
        if rule.body.is_empty() || !is_mergeable(&rule.selectors, &ctx.compat.selectors) {
            continue;
        }
        for property in rule.properties() {
            if !is_movable(rule, property) {
                continue;
            }
            let key = property.to_css_string();
            match index.get(&key) {
                Some(&at) => {
                    let positions = &mut found[at].2;
                    if positions.last() != Some(&position) {
                        positions.push(position);
                    }
                }
                None => {
                    index.insert(key.clone(), found.len());
                    found.push((key, property.clone(), vec![position]));
                }
            }
        }
    }

    found.retain(|(_, _, positions)| positions.len() > 1);
    found
}

fn best_hoist(tokens: &[Token], ctx: &mut Context) -> Option<Hoist> {
    let mut best: Option<Hoist> = None;

    for (key, property, positions) in candidates(tokens, ctx) {
        let target = positions[0];
        let mut occurrences = vec![target];
        for &position in &positions[1..] {
            let Some(rule) = tokens[position].as_rule() else {
                continue;
            };
            let selectors = rule.selectors.iter().map(|s| s.text.clone()).collect();
            let moved = [Declaration::new(&property, selectors)];
            let crosses = tokens[target..position]
                .iter()
                .all(|token| can_reorder(&moved, &extract(token), ctx));
            if crosses {
                occurrences.push(position);
            }
        }
        if occurrences.len() < 2 {
            continue;
        }

        let mut selectors: Vec<Selector> = Vec::new();
        for &position in &occurrences {
            let Some(rule) = tokens[position].as_rule() else {
                continue;
            };
            for selector in &rule.selectors {
                if !selectors.iter().any(|s| s.text == selector.text) {
                    selectors.push(selector.clone());
                }
            }
        }
        if selectors.len() > ctx.compat.selectors.merge_limit {
            continue;
        }
        sort_selectors(&mut selectors, ctx.options.level0.selectors_sorting_method);

        let removed: usize = occurrences
            .iter()
            .filter_map(|&position| tokens[position].as_rule())
            .map(|rule| {
                if rule.properties().count() == 1 && rule.body.len() == 1 {
                    rule.to_css_string().len()
                } else {
                    key.len() + 1
                }
            })
            .sum();
        let added = serialize_rules(&selectors).len() + 2 + key.len();
        if removed <= added {
            continue;
        }

        let saving = removed - added;
        if best.as_ref().is_none_or(|current| saving > current.saving) {
            best = Some(Hoist {
                property,
                key,
                occurrences,
                selectors,
                saving,
            });
        }
    }

    best
}

fn apply(tokens: &mut Vec<Token>, hoist: Hoist) {
    for &position in &hoist.occurrences {
        if let Some(rule) = tokens[position].as_rule_mut()
            && let Some(at) = rule.body.iter().position(|item| {
                matches!(item, BodyItem::Property(p) if p.to_css_string() == hoist.key)
            })
        {
            rule.body.remove(at);
        }
    }

    let target = hoist.occurrences[0];
    tokens.insert(
        target,
        Token::Rule(Rule::new(hoist.selectors, vec![BodyItem::Property(hoist.property)])),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Options;
    use crate::tokenizer::tokenize;
    use crate::writer::write;
    use crate::{Minifier, OptimizationLevel};

    fn run(css: &str) -> String {
        let minifier = Minifier::new(Options::with_level(OptimizationLevel::Two)).unwrap();
        let mut ctx = minifier.context();
        let mut warnings = Vec::new();
        let mut tokens = tokenize(css, &mut warnings);
        restructure(&mut tokens, &mut ctx);
        tokens.retain(|token| !matches!(token, Token::Rule(rule) if rule.is_empty()));
        write(&tokens)
    }

    #[test]
    fn test_hoist_shared_declaration() {
        assert_eq!(
            run("a{color:red;top:0}p{margin:0}b{color:red;left:0}"),
            "a,b{color:red}a{top:0}p{margin:0}b{left:0}"
        );
    }

    #[test]
    fn test_hoist_blocked_by_overlap() {
        let css = "a{color:red;top:0}.x{color:blue}.y{color:red;left:0}";
        assert_eq!(run(css), css);
    }

    #[test]
    fn test_not_worth_it() {
        let css = ".first-long-name{top:0;left:0}.second-long-name{top:0;right:0}";
        assert_eq!(run(css), css);
    }

    #[test]
    fn test_related_declaration_in_same_rule() {
        let css = "a{margin:0;margin-top:1px}b{margin:0;margin-top:2px}";
        assert_eq!(run(css), css);
    }
}
