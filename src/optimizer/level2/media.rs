//! `@media` and `@font-face` deduplication and media merging.

use std::collections::{HashMap, HashSet};

use tracing::trace;

use super::reorderable::{can_reorder, extract};
use crate::context::Context;
use crate::token::Token;
use crate::writer::{ToCss, serialize_body};

/// Drop repeated `@font-face` rules, keeping the first.
pub fn remove_duplicate_font_rules(tokens: &mut Vec<Token>) {
    let mut seen = HashSet::new();
    tokens.retain(|token| match token {
        Token::AtRuleBlock(block) if block.scope.name() == "font-face" => {
            seen.insert(serialize_body(&block.body))
        }
        _ => true,
    });
}

/// Drop a block when an identical one follows later.
pub fn remove_duplicate_media(tokens: &mut Vec<Token>) {
    let mut seen = HashSet::new();
    let mut keep = vec![true; tokens.len()];
    for (index, token) in tokens.iter().enumerate().rev() {
        if let Token::Block(block) = token
            && !seen.insert(block.to_css_string())
        {
            keep[index] = false;
        }
    }

    let mut keep = keep.into_iter();
    tokens.retain(|_| keep.next().unwrap_or(true));
}

/// Join `@media` blocks with the same query.
///
/// An earlier block moves forward into a later one when its rules can
/// pass everything in between, otherwise the later one moves back.
/// Returns the positions of blocks that received new children; those
/// need optimizing again.
pub fn merge_media(tokens: &mut [Token], ctx: &mut Context) -> Vec<usize> {
    let mut groups: HashMap<String, Vec<usize>> = HashMap::new();
    let mut order = Vec::new();
    for (index, token) in tokens.iter().enumerate() {
        if let Token::Block(block) = token
            && block.scope.name() == "media"
            && !block.children.is_empty()
        {
            let positions = groups.entry(block.scope.text.clone()).or_default();
            if positions.is_empty() {
                order.push(block.scope.text.clone());
            }
            positions.push(index);
        }
    }

    let mut touched = Vec::new();
    for scope in order {
        let positions = &groups[&scope];
        let mut current = positions[0];
        for &next in &positions[1..] {
            let between = &tokens[current + 1..next];
            let earlier = extract(&tokens[current]);
            let forward = between
                .iter()
                .all(|token| can_reorder(&earlier, &extract(token), ctx));

            let (from, into) = if forward {
                (current, next)
            } else {
                let later = extract(&tokens[next]);
                let backward = between
                    .iter()
                    .all(|token| can_reorder(&later, &extract(token), ctx));
                if !backward {
                    current = next;
                    continue;
                }
                (next, current)
            };

            let moved = match tokens[from].as_block_mut() {
                Some(block) => std::mem::take(&mut block.children),
                None => continue,
            };
            if let Some(block) = tokens[into].as_block_mut() {
                trace!(scope = %scope, forward, "merged media");
                if forward {
                    let later = std::mem::replace(&mut block.children, moved);
                    block.children.extend(later);
                } else {
                    block.children.extend(moved);
                }
            }
            touched.retain(|&position| position != from);
            if !touched.contains(&into) {
                touched.push(into);
            }
            current = into;
        }
    }
    touched
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
        tokens.retain(|token| !matches!(token, Token::Block(block) if block.children.is_empty()));
        write(&tokens)
    }

    #[test]
    fn test_duplicate_font_faces() {
        assert_eq!(
            run(
                "@font-face{font-family:A;src:url(a)}@font-face{font-family:A;src:url(a)}",
                |tokens, _| remove_duplicate_font_rules(tokens)
            ),
            "@font-face{font-family:A;src:url(a)}"
        );
    }

    #[test]
    fn test_duplicate_media() {
        assert_eq!(
            run(
                "@media print{a{color:red}}p{top:0}@media print{a{color:red}}",
                |tokens, _| remove_duplicate_media(tokens)
            ),
            "p{top:0}@media print{a{color:red}}"
        );
    }

    #[test]
    fn test_merge_forward() {
        assert_eq!(
            run("@media print{a{color:red}}p{top:0}@media print{b{top:1px}}", |tokens, ctx| {
                merge_media(tokens, ctx);
            }),
            "p{top:0}@media print{a{color:red}b{top:1px}}"
        );
    }

    #[test]
    fn test_merge_backward() {
        assert_eq!(
            run(
                "@media print{.a{color:red}}.b{color:blue}@media print{.c{top:0}}",
                |tokens, ctx| {
                    merge_media(tokens, ctx);
                }
            ),
            "@media print{.a{color:red}.c{top:0}}.b{color:blue}"
        );
    }

    #[test]
    fn test_merge_blocked() {
        let css = "@media print{.a{color:red}}.b{color:blue}@media print{.c{color:green}}";
        assert_eq!(
            run(css, |tokens, ctx| {
                merge_media(tokens, ctx);
            }),
            css
        );
    }

    #[test]
    fn test_touched_positions() {
        let minifier = Minifier::new(Options::with_level(OptimizationLevel::Two)).unwrap();
        let mut ctx = minifier.context();
        let mut warnings = Vec::new();
        let mut tokens = tokenize("@media print{a{top:0}}@media print{b{top:0}}", &mut warnings);
        assert_eq!(merge_media(&mut tokens, &mut ctx), vec![1]);
    }
}
