//! Level 2: cascade-safe merging across rules.
//!
//! Works bottom-up: the children of every nested block are optimized
//! before the list holding the block. For one token list the passes run
//! in this order, each behind its own option:
//!
//! 1. property optimization of every body (overrides, shorthands)
//! 2. duplicate rule removal
//! 3. adjacent merging by selector or by body
//! 4. non-adjacent reduction of overridden declarations
//! 5. non-adjacent merging by selector, then by body
//! 6. restructuring, followed by another adjacent merge
//! 7. `@font-face` and `@media` deduplication
//! 8. media merging, re-optimizing every block that grew
//! 9. empty token removal
//!
//! A merge can expose new opportunities for an earlier pass (a union of
//! selectors may now equal another rule's list), so the sequence repeats
//! until the list stops changing.
//!
//! Keyframe blocks only get property optimization: their percentage
//! selectors do not cascade like ordinary rules.

mod cleanup;
mod media;
mod merge;
mod mergeable;
mod reduce;
mod reorderable;
mod restructure;
pub mod specificity;

pub use mergeable::{is_mergeable, is_mergeable_selector};
pub use reorderable::{Declaration, can_reorder, extract};
pub use specificity::Specificity;

use tracing::debug;

use crate::context::Context;
use crate::properties::optimize_properties;
use crate::token::Token;
use crate::writer::serialize_all;

/// Upper bound on repetitions of the pass sequence for one list.
const MAX_ROUNDS: usize = 8;

/// Run level 2 over a whole stylesheet.
///
/// `with_restructuring` allows the restructuring pass (still subject to
/// `restructureRules`).
pub fn optimize(tokens: &mut Vec<Token>, ctx: &mut Context, with_restructuring: bool) {
    optimize_list(tokens, ctx, with_restructuring);

    if ctx.options.level2.remove_unused_at_rules {
        cleanup::remove_unused_at_rules(tokens);
    }
}

fn optimize_list(tokens: &mut Vec<Token>, ctx: &mut Context, with_restructuring: bool) {
    for token in tokens.iter_mut() {
        match token {
            Token::Block(block) if block.is_keyframes() => {
                for child in block.children.iter_mut() {
                    if let Token::Rule(rule) = child {
                        optimize_properties(&mut rule.body, ctx, true);
                    }
                }
            }
            Token::Block(block) => optimize_list(&mut block.children, ctx, with_restructuring),
            Token::AtRuleBlock(block) => optimize_properties(&mut block.body, ctx, true),
            _ => {}
        }
    }

    for round in 1..=MAX_ROUNDS {
        let before = serialize_all(tokens);
        run_passes(tokens, ctx, with_restructuring);
        if serialize_all(tokens) == before {
            break;
        }
        debug!(round, tokens = tokens.len(), "level 2 round changed the list");
    }
}

fn run_passes(tokens: &mut Vec<Token>, ctx: &mut Context, with_restructuring: bool) {
    let options = ctx.options.level2.clone();

    for token in tokens.iter_mut() {
        if let Token::Rule(rule) = token {
            optimize_properties(&mut rule.body, ctx, true);
        }
    }

    if options.remove_duplicate_rules {
        merge::remove_duplicates(tokens);
    }
    if options.merge_adjacent_rules {
        merge::merge_adjacent(tokens, ctx);
    }
    if options.reduce_non_adjacent_rules {
        reduce::reduce_non_adjacent(tokens, ctx);
    }
    if options.merge_non_adjacent_rules.by_selector() {
        merge::merge_by_selector(tokens, ctx);
    }
    if options.merge_non_adjacent_rules.by_body() {
        merge::merge_by_body(tokens, ctx);
    }
    if options.restructure_rules && with_restructuring {
        restructure::restructure(tokens, ctx);
        if options.merge_adjacent_rules {
            merge::merge_adjacent(tokens, ctx);
        }
    }
    if options.remove_duplicate_font_rules {
        media::remove_duplicate_font_rules(tokens);
    }
    if options.remove_duplicate_media_blocks {
        media::remove_duplicate_media(tokens);
    }
    if options.merge_media {
        for position in media::merge_media(tokens, ctx) {
            if let Some(block) = tokens[position].as_block_mut() {
                optimize_list(&mut block.children, ctx, false);
            }
        }
    }
    if options.remove_empty {
        cleanup::remove_empty(tokens);
    }
}
