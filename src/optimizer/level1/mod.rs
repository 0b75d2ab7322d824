//! Level 1: per-property rewriting.
//!
//! Every declaration body (rules and flat at-rules) goes through the same
//! pipeline, one property at a time:
//!
//! 1. validity gate: bad names, empty values, disabled hacks, legacy
//!    filters and negative paddings are dropped with a warning
//! 2. value rewriting: urls, quotes, whitespace, numbers and colors
//! 3. property shortcuts (`margin:0 0 0 0` → `margin:0`, ...)
//!
//! Custom properties are never rewritten, though nested property blocks in
//! their values are.

mod color;
mod shortcuts;
mod url;
mod value;

pub use color::{shorten_colors, shorten_hex, shorten_name};
pub use shortcuts::reduce_box;
pub use url::{normalize_url, unquote};
pub use value::{format_number, optimize_numbers, optimize_whitespace};

use tracing::trace;

use crate::compat::validator::{is_identifier, is_number, is_quoted, is_url, is_variable};
use crate::context::Context;
use crate::patterns::PROGID;
use crate::token::{BodyItem, Hack, Property, Token, Value};

/// Color-valued properties besides those with `color` in their name.
const COLOR_PROPERTY_PREFIXES: &[&str] = &[
    "background",
    "border",
    "outline",
    "column-rule",
    "text-decoration",
    "text-emphasis",
];

const COLOR_PROPERTIES: &[&str] = &[
    "box-shadow",
    "text-shadow",
    "fill",
    "stroke",
    "filter",
    "mask",
    "mask-image",
    "stop-color",
    "flood-color",
    "lighting-color",
    "caret-color",
    "scrollbar-color",
];

/// Number syntax differs in these values.
const SKIP_NUMBERS: &[&str] = &["unicode-range", "font-feature-settings", "font-variation-settings"];

pub fn optimize(tokens: &mut Vec<Token>, ctx: &mut Context) {
    let remove_empty = ctx.options.level0.remove_empty;

    for token in tokens.iter_mut() {
        match token {
            Token::Rule(rule) => optimize_body(&mut rule.body, ctx),
            Token::AtRuleBlock(block) => optimize_body(&mut block.body, ctx),
            Token::Block(block) => optimize(&mut block.children, ctx),
            Token::AtRule(_) | Token::Comment(_) => {}
        }
    }

    if remove_empty {
        tokens.retain(|token| match token {
            Token::Rule(rule) => !rule.body.is_empty(),
            Token::AtRuleBlock(block) => !block.body.is_empty(),
            Token::Block(block) => !block.children.is_empty(),
            Token::AtRule(_) | Token::Comment(_) => true,
        });
    }
}

/// Run the property pipeline over one declaration body.
pub fn optimize_body(body: &mut Vec<BodyItem>, ctx: &mut Context) {
    body.retain_mut(|item| match item {
        BodyItem::Comment(_) => true,
        BodyItem::Property(property) => optimize_property(property, ctx),
    });
}

/// Rewrite one property in place; `false` means it must be removed.
fn optimize_property(property: &mut Property, ctx: &mut Context) -> bool {
    if property.is_custom() {
        for value in &mut property.values {
            if let Value::Block(nested) = value {
                optimize_body(nested, ctx);
            }
        }
        return true;
    }

    property.name = property.name.to_ascii_lowercase();
    let name = property.name.clone();

    if !is_valid(property, &name, ctx) {
        return false;
    }

    let options = ctx.options;
    let level1 = &options.level1;
    let colors = ctx.compat.properties.colors && is_color_property(&name);

    for value in &mut property.values {
        let Value::Word(word) = value else { continue };
        let rewritten = if is_url(word) {
            if level1.normalize_urls {
                normalize_url(word, ctx.compat)
            } else {
                word.clone()
            }
        } else if is_quoted(word) {
            if level1.remove_quotes {
                unquote(&name, word)
            } else {
                word.clone()
            }
        } else if is_variable(word) || word.contains("var(") {
            word.clone()
        } else {
            let mut text = if level1.remove_whitespace {
                optimize_whitespace(word)
            } else {
                word.clone()
            };
            if !PROGID.is_match(&text) {
                if !SKIP_NUMBERS.contains(&name.as_str()) {
                    text = optimize_numbers(&name, &text, ctx);
                }
                if colors {
                    text = shorten_colors(&text, ctx.compat);
                }
            }
            text
        };

        if rewritten != *word {
            trace!(property = %name, from = %word, to = %rewritten, "rewrote value");
            *word = rewritten;
        }
    }

    shortcuts::apply(property, &name, level1);
    true
}

/// The validity gate; warns about everything it rejects.
fn is_valid(property: &Property, name: &str, ctx: &mut Context) -> bool {
    let position = property.position;

    if !is_identifier(name) {
        ctx.warn(format!("Invalid property name '{name}' ignored"), position);
        return false;
    }
    if property.values.is_empty() {
        ctx.warn(format!("Empty property '{name}' ignored"), position);
        return false;
    }

    let hacks = &ctx.compat.properties;
    let allowed = match property.hack {
        Hack::None => true,
        Hack::Star | Hack::Underscore => hacks.ie_prefix_hack,
        Hack::Backslash(_) => hacks.ie_suffix_hack,
        Hack::Bang => hacks.ie_bang_hack,
    };
    if !allowed {
        ctx.warn(format!("Unsupported browser hack on '{name}' ignored"), position);
        return false;
    }

    if (name == "filter" || name == "-ms-filter")
        && !ctx.compat.properties.ie_filters
        && property.values.iter().any(|v| {
            let text = v.as_str().trim_start_matches(['"', '\'']);
            PROGID.is_match(text)
        })
    {
        trace!(property = %name, "dropping legacy IE filter");
        return false;
    }

    if name.starts_with("padding")
        && ctx.options.level1.remove_negative_paddings
        && property
            .values
            .iter()
            .any(|v| v.as_str().starts_with('-') && is_negative_number(v.as_str()))
    {
        ctx.warn(format!("Negative padding in '{name}' ignored"), position);
        return false;
    }

    true
}

fn is_negative_number(word: &str) -> bool {
    let digits = word.trim_end_matches(|c: char| c.is_ascii_alphabetic() || c == '%');
    is_number(digits) && !digits.trim_start_matches(['-', '0', '.']).is_empty()
}

fn is_color_property(name: &str) -> bool {
    name.contains("color")
        || COLOR_PROPERTIES.contains(&name)
        || COLOR_PROPERTY_PREFIXES
            .iter()
            .any(|prefix| name == *prefix || name.starts_with(&format!("{prefix}-")))
}
