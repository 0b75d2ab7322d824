//! Non-adjacent reduction.
//!
//! A declaration of `a` that a later rule for the very same `a`
//! overrides can never win, whatever sits in between: the later rule has
//! the same specificity and comes last. Such declarations are dropped
//! without moving anything.
//!
//! Multi-selector rules lose a declaration only when every one of their
//! selectors is overridden later on its own.

use std::collections::HashMap;

use tracing::trace;

use crate::context::Context;
use crate::properties::surviving;
use crate::token::{BodyItem, Property, Token};
use crate::writer::serialize_rules;

pub fn reduce_non_adjacent(tokens: &mut [Token], ctx: &mut Context) {
    reduce_whole_lists(tokens, ctx);
    reduce_branches(tokens, ctx);
}

/// Rule positions grouped by their serialized selector list, in first-seen order.
fn groups(tokens: &[Token]) -> Vec<(String, Vec<usize>)> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<usize>)> = Vec::new();
    for (position, token) in tokens.iter().enumerate() {
        let Token::Rule(rule) = token else {
            continue;
        };
        let key = serialize_rules(&rule.selectors);
        match index.get(&key) {
            Some(&group) => groups[group].1.push(position),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push((key, vec![position]));
            }
        }
    }
    groups
}

/// Remove the properties flagged dead, in declaration order.
fn strip(body: &mut Vec<BodyItem>, alive: &mut impl Iterator<Item = bool>) {
    body.retain(|item| match item {
        BodyItem::Property(_) => alive.next().unwrap_or(true),
        BodyItem::Comment(_) => true,
    });
}

fn reduce_whole_lists(tokens: &mut [Token], ctx: &mut Context) {
    for (key, positions) in groups(tokens) {
        if positions.len() < 2 {
            continue;
        }

        let joined: Vec<Property> = positions
            .iter()
            .filter_map(|&position| tokens[position].as_rule())
            .flat_map(|rule| rule.properties().cloned())
            .collect();
        let alive = surviving(&joined, ctx);
        if alive.iter().all(|alive| *alive) {
            continue;
        }

        trace!(selectors = %key, removed = alive.iter().filter(|a| !**a).count(), "reduced non-adjacent");
        let mut alive = alive.into_iter();
        for &position in &positions {
            if let Some(rule) = tokens[position].as_rule_mut() {
                strip(&mut rule.body, &mut alive);
            }
        }
    }
}

fn reduce_branches(tokens: &mut [Token], ctx: &mut Context) {
    for position in 0..tokens.len() {
        let Some(rule) = tokens[position].as_rule() else {
            continue;
        };
        if rule.selectors.len() < 2 {
            continue;
        }

        // Later declarations of each branch on its own
        let later: Vec<Vec<Property>> = rule
            .selectors
            .iter()
            .map(|selector| {
                tokens[position + 1..]
                    .iter()
                    .filter_map(Token::as_rule)
                    .filter(|other| other.selectors.len() == 1 && other.selectors[0].text == selector.text)
                    .flat_map(|other| other.properties().cloned())
                    .collect()
            })
            .collect();
        if later.iter().any(Vec::is_empty) {
            continue;
        }

        let mut alive = Vec::new();
        for property in rule.properties() {
            let overridden = later.iter().all(|branch| {
                let mut list = Vec::with_capacity(branch.len() + 1);
                list.push(property.clone());
                list.extend(branch.iter().cloned());
                !surviving(&list, ctx)[0]
            });
            alive.push(!overridden);
        }
        if alive.iter().all(|alive| *alive) {
            continue;
        }

        if let Some(rule) = tokens[position].as_rule_mut() {
            trace!(selectors = %serialize_rules(&rule.selectors), "reduced overridden branches");
            strip(&mut rule.body, &mut alive.into_iter());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Options;
    use crate::tokenizer::tokenize;
    use crate::writer::write;
    use crate::{Minifier, OptimizationLevel};

    fn reduce(css: &str) -> String {
        let minifier = Minifier::new(Options::with_level(OptimizationLevel::Two)).unwrap();
        let mut ctx = minifier.context();
        let mut warnings = Vec::new();
        let mut tokens = tokenize(css, &mut warnings);
        reduce_non_adjacent(&mut tokens, &mut ctx);
        tokens.retain(|token| !matches!(token, Token::Rule(rule) if rule.is_empty()));
        write(&tokens)
    }

    #[test]
    fn test_same_selector_later_wins() {
        assert_eq!(
            reduce("a{color:red;top:0}.b{color:blue}a{color:green}"),
            "a{top:0}.b{color:blue}a{color:green}"
        );
        assert_eq!(
            reduce("a{margin-top:1px}p{top:0}a{margin:0}"),
            "p{top:0}a{margin:0}"
        );
    }

    #[test]
    fn test_nothing_to_reduce() {
        assert_eq!(reduce("a{color:red}p{top:0}a{top:1px}"), "a{color:red}p{top:0}a{top:1px}");
    }

    #[test]
    fn test_important_survives() {
        assert_eq!(
            reduce("a{color:red!important}p{top:0}a{color:blue}"),
            "a{color:red!important}p{top:0}"
        );
    }

    #[test]
    fn test_branches() {
        assert_eq!(
            reduce("a,b{color:red;top:0}a{color:blue}b{color:green}"),
            "a,b{top:0}a{color:blue}b{color:green}"
        );
        assert_eq!(
            reduce("a,b{color:red}a{color:blue}"),
            "a,b{color:red}a{color:blue}"
        );
    }
}
