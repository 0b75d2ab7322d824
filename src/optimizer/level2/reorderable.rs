//! Whether two tokens may swap places without changing the cascade.
//!
//! Every merge that moves declarations past other tokens asks this first.
//! Tokens are flattened into [`Declaration`]s (nested `@media` contents
//! included) and every pair is checked: two declarations commute when
//! they cannot both apply to one element with equal weight.

use crate::context::Context;
use crate::patterns::VENDOR_PSEUDO;
use crate::properties::overlap;
use crate::token::{Property, Rule, Token};
use crate::writer::{ToCss, serialize_value};

/// One declaration together with the selectors it applies under.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub name: String,
    pub value: String,
    pub important: bool,
    pub selectors: Vec<String>,
}

impl Declaration {
    pub fn new(property: &Property, selectors: Vec<String>) -> Self {
        let mut value = serialize_value(&property.values);
        if !property.hack.is_none() {
            let mut hacked = String::new();
            property.to_css(&mut hacked);
            value = hacked;
        }
        Self {
            name: property.lower_name(),
            value,
            important: property.important,
            selectors,
        }
    }
}

/// Declarations in a rule.
pub fn extract_rule(rule: &Rule) -> Vec<Declaration> {
    let selectors: Vec<String> = rule.selectors.iter().map(|s| s.text.clone()).collect();
    rule.properties()
        .map(|property| Declaration::new(property, selectors.clone()))
        .collect()
}

/// Declarations a token contributes to the cascade.
///
/// Keyframes, `@font-face` and statement at-rules never interact with
/// ordinary rules.
pub fn extract(token: &Token) -> Vec<Declaration> {
    match token {
        Token::Rule(rule) => extract_rule(rule),
        Token::Block(block) if !block.is_keyframes() => {
            block.children.iter().flat_map(extract).collect()
        }
        _ => Vec::new(),
    }
}

/// Whether every declaration on the left commutes with every one on the right.
pub fn can_reorder(left: &[Declaration], right: &[Declaration], ctx: &mut Context) -> bool {
    left.iter()
        .all(|l| right.iter().all(|r| can_reorder_single(l, r, ctx)))
}

pub fn can_reorder_single(left: &Declaration, right: &Declaration, ctx: &mut Context) -> bool {
    if !overlap(&left.name, &right.name) {
        return true;
    }
    if left.name == right.name && left.value == right.value {
        return true;
    }
    if left.important != right.important {
        return true;
    }

    let semantic = ctx.options.level2.merge_semantically;
    for l in &left.selectors {
        for r in &right.selectors {
            if disjoint(l, r, semantic) {
                continue;
            }
            if ctx.specificity(l) == ctx.specificity(r) {
                return false;
            }
        }
    }
    true
}

/// Whether no element can ever match both selectors.
fn disjoint(left: &str, right: &str, semantic: bool) -> bool {
    if left == right {
        return false;
    }
    if let (Some(a), Some(b)) = (simple(left, '#'), simple(right, '#')) {
        return a != b;
    }
    if is_type(left) && is_type(right) {
        return !left.eq_ignore_ascii_case(right);
    }

    let left_prefixes = vendor_pseudos(left);
    let right_prefixes = vendor_pseudos(right);
    if !left_prefixes.is_empty()
        && !right_prefixes.is_empty()
        && left_prefixes.iter().all(|p| !right_prefixes.contains(p))
    {
        return true;
    }

    if semantic
        && let (Some(a), Some(b)) = (simple(left, '.'), simple(right, '.'))
    {
        return bem_block(a) != bem_block(b);
    }
    false
}

fn is_ident(text: &str) -> bool {
    !text.is_empty()
        && !text.starts_with(|c: char| c.is_ascii_digit())
        && text.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Name of a selector made of a single `#id` or `.class`.
fn simple(selector: &str, sigil: char) -> Option<&str> {
    selector.strip_prefix(sigil).filter(|name| is_ident(name))
}

fn is_type(selector: &str) -> bool {
    is_ident(selector) && !selector.starts_with('-')
}

fn vendor_pseudos(selector: &str) -> Vec<&str> {
    VENDOR_PSEUDO
        .captures_iter(selector)
        .filter_map(|captures| captures.get(1))
        .map(|prefix| prefix.as_str())
        .collect()
}

/// Block part of a BEM class name (`card` for `card__title--big`).
pub fn bem_block(class: &str) -> &str {
    let end = [class.find("__"), class.find("--")]
        .into_iter()
        .flatten()
        .min()
        .unwrap_or(class.len());
    &class[..end]
}

/// Whether a rule targets a BEM element (`.block__element`).
pub fn is_bem_element(rule: &Rule) -> bool {
    rule.selectors.iter().any(|selector| selector.text.contains("__"))
}

/// Whether any declaration of a rule carries a browser hack.
pub fn has_hacks(rule: &Rule) -> bool {
    rule.properties().any(|property| !property.hack.is_none())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Minifier, Options};
    use crate::token::{BodyItem, Selector};

    fn rule(selectors: &str, body: &str) -> Token {
        let selectors = selectors.split(',').map(Selector::new).collect();
        let body = body
            .split(';')
            .map(|declaration| {
                let (name, value) = declaration.split_once(':').unwrap();
                BodyItem::Property(Property::from_declaration(name, value, None))
            })
            .collect();
        Token::Rule(Rule::new(selectors, body))
    }

    fn reorderable_with(options: Options, left: &Token, right: &Token) -> bool {
        let minifier = Minifier::new(options).unwrap();
        let mut ctx = minifier.context();
        can_reorder(&extract(left), &extract(right), &mut ctx)
    }

    fn reorderable(left: &Token, right: &Token) -> bool {
        reorderable_with(Options::default(), left, right)
    }

    #[test]
    fn test_unrelated_properties() {
        assert!(reorderable(&rule("a", "color:red"), &rule("a", "margin:0")));
        assert!(reorderable(&rule("a", "margin-top:0"), &rule("a", "margin-left:1px")));
        assert!(!reorderable(&rule("a", "margin:0"), &rule("a", "margin-top:1px")));
        assert!(!reorderable(&rule("a", "border-color:red"), &rule("a", "border:0")));
    }

    #[test]
    fn test_same_value_or_importance() {
        assert!(reorderable(&rule("a", "color:red"), &rule(".b", "color:red")));
        assert!(reorderable(&rule("a", "color:red!important"), &rule(".b", "color:blue")));
    }

    #[test]
    fn test_specificity_decides() {
        assert!(reorderable(&rule("a", "color:red"), &rule("#b", "color:blue")));
        assert!(!reorderable(&rule(".a", "color:red"), &rule(".b", "color:blue")));
        assert!(!reorderable(&rule("a,.x", "color:red"), &rule(".b", "color:blue")));
    }

    #[test]
    fn test_disjoint_selectors() {
        assert!(reorderable(&rule("p", "color:red"), &rule("div", "color:blue")));
        assert!(reorderable(&rule("#a", "color:red"), &rule("#b", "color:blue")));
        assert!(reorderable(
            &rule("::-moz-selection", "color:red"),
            &rule("::-webkit-selection", "color:blue")
        ));
        assert!(!reorderable(&rule("p", "color:red"), &rule("p", "color:blue")));
    }

    #[test]
    fn test_semantic_blocks() {
        let left = rule(".card", "color:red");
        let right = rule(".menu__item", "color:blue");
        assert!(!reorderable(&left, &right));

        let options = Options::from_json(r#"{"level": 2, "level2": {"mergeSemantically": true}}"#).unwrap();
        assert!(reorderable_with(options, &left, &right));
    }

    #[test]
    fn test_bem_block() {
        assert_eq!(bem_block("card__title--big"), "card");
        assert_eq!(bem_block("card--wide"), "card");
        assert_eq!(bem_block("card"), "card");
    }

    #[test]
    fn test_extract_nested_blocks() {
        let media = Token::Block(crate::token::Block {
            scope: crate::token::Scope::new("@media print"),
            children: vec![rule("a", "color:red")],
        });
        let extracted = extract(&media);
        assert_eq!(extracted.len(), 1);
        assert_eq!(extracted[0].selectors, vec!["a".to_string()]);
        assert!(!reorderable(&media, &rule("a", "color:blue")));
        assert!(reorderable(&media, &rule("#b", "color:blue")));
    }
}
