//! Level 0: structural cleanup.
//!
//! - regular comments are removed, `/*! ... */` comments kept per
//!   `specialComments`
//! - selectors, block scopes and at-rules are tidied
//! - only the first `@charset` survives, moved to the front
//! - `@import` after other content (or nested in a block) is dropped
//! - rules and blocks left empty are removed
//!
//! Keyframe blocks are cleaned but their percentage selectors are not
//! tidied or sorted.

mod tidy;

pub use tidy::{sort_selectors, tidy_at_rule, tidy_block, tidy_rules, tidy_selector};

use tracing::trace;

use crate::context::Context;
use crate::token::{BodyItem, Comment, Token, Value};

#[derive(Default)]
struct State {
    special_comments: usize,
    charset: Option<usize>,
}

#[derive(Clone, Copy)]
struct Nesting {
    top: bool,
    keyframes: bool,
}

pub fn optimize(tokens: &mut Vec<Token>, ctx: &mut Context) {
    let mut state = State::default();
    optimize_tokens(
        tokens,
        ctx,
        &mut state,
        Nesting {
            top: true,
            keyframes: false,
        },
    );

    if let Some(index) = state.charset
        && index > 0
    {
        let charset = tokens.remove(index);
        tokens.insert(0, charset);
    }
}

fn optimize_tokens(tokens: &mut Vec<Token>, ctx: &mut Context, state: &mut State, nesting: Nesting) {
    let options = &ctx.options.level0;
    let (tidy_selectors, tidy_scopes, tidy_at_rules) =
        (options.tidy_selectors, options.tidy_block_scopes, options.tidy_at_rules);
    let (remove_empty, misplaced_imports, charset) = (
        options.remove_empty,
        options.remove_misplaced_imports,
        options.normalize_charset,
    );

    let mut content_seen = false;
    let old = std::mem::take(tokens);

    for mut token in old {
        let keep = match &mut token {
            Token::Comment(comment) => keep_comment(comment, ctx, state),
            Token::AtRule(at_rule) => {
                if tidy_at_rules {
                    at_rule.text = tidy_at_rule(&at_rule.text);
                }
                let name = at_rule.name().to_ascii_lowercase();

                if name == "charset" && charset {
                    if !nesting.top || state.charset.is_some() {
                        trace!(text = %at_rule.text, "dropping extra @charset");
                        false
                    } else {
                        state.charset = Some(tokens.len());
                        true
                    }
                } else if name == "import" && misplaced_imports && (!nesting.top || content_seen) {
                    ctx.warn(
                        format!("Ignoring '{}' after other content", at_rule.text),
                        at_rule.position,
                    );
                    false
                } else {
                    if !matches!(name.as_str(), "charset" | "import" | "layer") {
                        content_seen = true;
                    }
                    true
                }
            }
            Token::Rule(rule) => {
                content_seen = true;
                if tidy_selectors && !nesting.keyframes {
                    rule.selectors = tidy_rules(std::mem::take(&mut rule.selectors), ctx);
                } else {
                    for selector in &mut rule.selectors {
                        selector.text = selector.text.trim().to_string();
                    }
                }
                clean_body(&mut rule.body, ctx, state);
                !rule.selectors.is_empty() && !(remove_empty && rule.body.is_empty())
            }
            Token::AtRuleBlock(block) => {
                content_seen = true;
                if tidy_scopes {
                    block.scope.text = tidy_block(&block.scope.text);
                }
                clean_body(&mut block.body, ctx, state);
                !(remove_empty && block.body.is_empty())
            }
            Token::Block(block) => {
                content_seen = true;
                if tidy_scopes {
                    block.scope.text = tidy_block(&block.scope.text);
                }
                let inner = Nesting {
                    top: false,
                    keyframes: block.is_keyframes(),
                };
                optimize_tokens(&mut block.children, ctx, state, inner);
                !(remove_empty && block.children.is_empty())
            }
        };

        if keep {
            tokens.push(token);
        }
    }
}

/// Drop regular comments; keep special ones up to the configured count.
fn keep_comment(comment: &Comment, ctx: &Context, state: &mut State) -> bool {
    if !comment.is_special() {
        return false;
    }
    let keep = ctx.options.level0.special_comments.keeps(state.special_comments);
    state.special_comments += 1;
    keep
}

fn clean_body(body: &mut Vec<BodyItem>, ctx: &Context, state: &mut State) {
    body.retain_mut(|item| match item {
        BodyItem::Comment(comment) => keep_comment(comment, ctx, state),
        BodyItem::Property(property) => {
            for value in &mut property.values {
                if let Value::Block(nested) = value {
                    clean_body(nested, ctx, state);
                }
            }
            true
        }
    });
}
