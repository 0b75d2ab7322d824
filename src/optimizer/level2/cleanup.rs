//! Empty-token removal and unused at-rule removal.

use std::collections::HashSet;

use tracing::trace;

use crate::token::{AtRuleBlock, Block, BodyItem, Property, Token, Value};
use crate::writer::serialize_value;

/// Drop rules without selectors or body, and blocks left with nothing inside.
pub fn remove_empty(tokens: &mut Vec<Token>) {
    tokens.retain(|token| match token {
        Token::Rule(rule) => !rule.is_empty(),
        Token::AtRuleBlock(block) => !block.body.is_empty(),
        Token::Block(block) => !block.children.is_empty(),
        Token::AtRule(_) | Token::Comment(_) => true,
    });
}

// ============================================================================
// Unused at-rules
// ============================================================================

/// Names referenced anywhere in the stylesheet.
#[derive(Default)]
struct Usage {
    animations: HashSet<String>,
    counter_styles: HashSet<String>,
    font_families: Vec<String>,
    namespaces: HashSet<String>,
}

fn unquote(text: &str) -> &str {
    let text = text.trim();
    for quote in ['"', '\''] {
        if let Some(inner) = text.strip_prefix(quote).and_then(|t| t.strip_suffix(quote)) {
            return inner;
        }
    }
    text
}

/// Identifiers inside a value, function arguments included.
fn identifiers(values: &[Value]) -> impl Iterator<Item = String> + '_ {
    values.iter().flat_map(|value| {
        value
            .as_str()
            .split(|c: char| !(c.is_alphanumeric() || c == '-' || c == '_'))
            .filter(|word| !word.is_empty())
            .map(str::to_string)
            .collect::<Vec<_>>()
    })
}

impl Usage {
    fn collect(tokens: &[Token]) -> Self {
        let mut usage = Usage::default();
        usage.visit(tokens);
        usage
    }

    fn visit(&mut self, tokens: &[Token]) {
        for token in tokens {
            match token {
                Token::Rule(rule) => {
                    for selector in &rule.selectors {
                        self.visit_selector(&selector.text);
                    }
                    self.visit_body(&rule.body);
                }
                Token::Block(block) => self.visit(&block.children),
                Token::AtRuleBlock(block) if block.scope.name() == "font-face" => {}
                Token::AtRuleBlock(block) => self.visit_body(&block.body),
                Token::AtRule(_) | Token::Comment(_) => {}
            }
        }
    }

    fn visit_selector(&mut self, selector: &str) {
        let mut start = 0;
        for (at, c) in selector.char_indices() {
            if c == '|' {
                let prefix = selector[start..at].trim_start_matches(['[', '*']);
                if !prefix.is_empty() {
                    self.namespaces.insert(prefix.to_string());
                }
            }
            if !(c.is_alphanumeric() || c == '-' || c == '_') {
                start = at + c.len_utf8();
            }
        }
    }

    fn visit_body(&mut self, body: &[BodyItem]) {
        for property in body.iter().filter_map(BodyItem::as_property) {
            self.visit_property(property);
        }
    }

    fn visit_property(&mut self, property: &Property) {
        let name = property.lower_name();
        let root = crate::util::unprefixed(&name);
        match root {
            "animation" | "animation-name" => self.animations.extend(identifiers(&property.values)),
            "list-style" | "list-style-type" | "content" | "system" | "counter-reset"
            | "counter-increment" => self.counter_styles.extend(identifiers(&property.values)),
            "font" | "font-family" => {
                let value = serialize_value(&property.values).to_ascii_lowercase();
                self.font_families.push(value);
            }
            _ => {}
        }
        for value in &property.values {
            if let Value::Block(body) = value {
                self.visit_body(body);
            }
        }
    }

    fn uses_font(&self, family: &str) -> bool {
        let family = family.to_ascii_lowercase();
        let suffix = format!(" {family}");
        self.font_families.iter().any(|value| {
            value.split(',').any(|segment| {
                let bare = segment.replace(['"', '\''], "");
                let bare = bare.trim();
                bare == family || bare.ends_with(&suffix)
            })
        })
    }
}

/// Name declared by a `@keyframes` or `@counter-style` prelude.
fn declared_name(scope: &str) -> &str {
    let rest = scope.trim_start_matches('@');
    let name_start = rest
        .find(|c: char| c.is_whitespace())
        .map_or(rest.len(), |i| i + 1);
    unquote(&rest[name_start..])
}

fn font_face_family(block: &AtRuleBlock) -> Option<String> {
    block
        .body
        .iter()
        .filter_map(BodyItem::as_property)
        .find(|property| property.lower_name() == "font-family")
        .map(|property| unquote(&serialize_value(&property.values)).to_string())
}

fn is_unused_keyframes(block: &Block, usage: &Usage) -> bool {
    block.is_keyframes() && !usage.animations.contains(declared_name(&block.scope.text))
}

/// Remove `@keyframes`, `@font-face`, `@counter-style` and `@namespace`
/// rules nothing refers to.
pub fn remove_unused_at_rules(tokens: &mut Vec<Token>) {
    let usage = Usage::collect(tokens);
    retain_used(tokens, &usage);
}

fn retain_used(tokens: &mut Vec<Token>, usage: &Usage) {
    tokens.retain(|token| {
        let used = match token {
            Token::Block(block) => !is_unused_keyframes(block, usage),
            Token::AtRuleBlock(block) => match block.scope.name().as_str() {
                "font-face" => font_face_family(block).is_none_or(|family| usage.uses_font(&family)),
                "counter-style" => usage.counter_styles.contains(declared_name(&block.scope.text)),
                _ => true,
            },
            Token::AtRule(at_rule) if at_rule.name().eq_ignore_ascii_case("namespace") => {
                let mut words = at_rule.text.split_whitespace().skip(1);
                match (words.next(), words.next()) {
                    (Some(prefix), Some(_)) => usage.namespaces.contains(prefix),
                    _ => true,
                }
            }
            _ => true,
        };
        if !used {
            trace!(token = ?token, "removed unused at-rule");
        }
        used
    });

    for token in tokens.iter_mut() {
        if let Token::Block(block) = token
            && !block.is_keyframes()
        {
            retain_used(&mut block.children, usage);
        }
    }
}
