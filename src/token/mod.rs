//! Token tree for stylesheets.
//!
//! The tokenizer produces a `Vec<Token>` and every optimization pass
//! rewrites it in place. Each subtree has exactly one owner (the list it
//! lives in), so passes mutate with `Vec::retain`, `insert` and friends
//! instead of sharing nodes.
//!
//! ## Shape
//!
//! ```text
//! Token::Rule         a, b { color: red }
//! Token::AtRuleBlock  @font-face { src: url(x) }     (flat property body)
//! Token::Block        @media screen { a { ... } }   (nested tokens)
//! Token::AtRule       @import url(x);
//! Token::Comment      /*! license */
//! ```
//!
//! A declaration whose value is itself a block (`--theme: { color: red }`)
//! stores that block as [`Value::Block`], the property-block container.

mod property;

pub use property::{Hack, Property, Value, split_value};

/// A location in the original source (1-based line, 0-based column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A node in the token tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// A statement at-rule without a block (`@import`, `@charset`, `@namespace`).
    AtRule(AtRule),
    /// An at-rule whose body is a flat property list (`@font-face`, `@page`).
    AtRuleBlock(AtRuleBlock),
    /// An at-rule whose body is a nested token list (`@media`, `@supports`, `@keyframes`).
    Block(Block),
    /// A comment, including its `/*` and `*/` delimiters.
    Comment(Comment),
    /// A qualified rule: selector list plus declarations.
    Rule(Rule),
}

impl Token {
    pub fn as_rule(&self) -> Option<&Rule> {
        match self {
            Token::Rule(rule) => Some(rule),
            _ => None,
        }
    }

    pub fn as_rule_mut(&mut self) -> Option<&mut Rule> {
        match self {
            Token::Rule(rule) => Some(rule),
            _ => None,
        }
    }

    pub fn as_block(&self) -> Option<&Block> {
        match self {
            Token::Block(block) => Some(block),
            _ => None,
        }
    }

    pub fn as_block_mut(&mut self) -> Option<&mut Block> {
        match self {
            Token::Block(block) => Some(block),
            _ => None,
        }
    }

    pub fn is_rule(&self) -> bool {
        matches!(self, Token::Rule(_))
    }

    pub fn is_comment(&self) -> bool {
        matches!(self, Token::Comment(_))
    }

    /// Whether this is a statement at-rule with the given name (without `@`).
    pub fn is_at_rule_named(&self, name: &str) -> bool {
        match self {
            Token::AtRule(at_rule) => at_rule.name().eq_ignore_ascii_case(name),
            _ => false,
        }
    }
}

/// One entry of a selector list, e.g. `div > p` in `div > p, a`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    pub text: String,
    pub position: Option<Position>,
}

impl Selector {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            position: None,
        }
    }

    pub fn at(text: impl Into<String>, position: Position) -> Self {
        Self {
            text: text.into(),
            position: Some(position),
        }
    }
}

/// The prelude of a block at-rule, e.g. `@media screen and (min-width:10px)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    pub text: String,
    pub position: Option<Position>,
}

impl Scope {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            position: None,
        }
    }

    /// The at-rule name without `@`, lowercased (`media`, `-webkit-keyframes`).
    pub fn name(&self) -> String {
        at_rule_name(&self.text).to_ascii_lowercase()
    }
}

/// An item inside a declaration body.
#[derive(Debug, Clone, PartialEq)]
pub enum BodyItem {
    Property(Property),
    Comment(Comment),
}

impl BodyItem {
    pub fn as_property(&self) -> Option<&Property> {
        match self {
            BodyItem::Property(property) => Some(property),
            BodyItem::Comment(_) => None,
        }
    }

    pub fn as_property_mut(&mut self) -> Option<&mut Property> {
        match self {
            BodyItem::Property(property) => Some(property),
            BodyItem::Comment(_) => None,
        }
    }
}

/// A qualified rule.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Rule {
    pub selectors: Vec<Selector>,
    pub body: Vec<BodyItem>,
}

impl Rule {
    pub fn new(selectors: Vec<Selector>, body: Vec<BodyItem>) -> Self {
        Self { selectors, body }
    }

    /// Iterate over the declarations, skipping body comments.
    pub fn properties(&self) -> impl Iterator<Item = &Property> {
        self.body.iter().filter_map(BodyItem::as_property)
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty() || self.body.is_empty()
    }
}

/// An at-rule with a flat declaration body.
#[derive(Debug, Clone, PartialEq)]
pub struct AtRuleBlock {
    pub scope: Scope,
    pub body: Vec<BodyItem>,
}

/// An at-rule with nested tokens.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub scope: Scope,
    pub children: Vec<Token>,
}

impl Block {
    /// Keyframe bodies hold percentage selectors, not ordinary rules.
    pub fn is_keyframes(&self) -> bool {
        let name = self.scope.name();
        name == "keyframes" || (name.starts_with('-') && name.ends_with("-keyframes"))
    }
}

/// A statement at-rule, stored without the trailing `;`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtRule {
    pub text: String,
    pub position: Option<Position>,
}

impl AtRule {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            position: None,
        }
    }

    /// The at-rule name without `@` (`import`, `charset`).
    pub fn name(&self) -> &str {
        at_rule_name(&self.text)
    }
}

/// A comment, text includes the delimiters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub text: String,
    pub position: Option<Position>,
}

impl Comment {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            position: None,
        }
    }

    /// `/*! ... */` comments survive minification.
    pub fn is_special(&self) -> bool {
        self.text.starts_with("/*!")
    }
}

fn at_rule_name(text: &str) -> &str {
    let rest = text.strip_prefix('@').unwrap_or(text);
    let end = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
        .unwrap_or(rest.len());
    &rest[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_name() {
        assert_eq!(Scope::new("@media screen").name(), "media");
        assert_eq!(Scope::new("@-webkit-keyframes spin").name(), "-webkit-keyframes");
        assert_eq!(Scope::new("@MEDIA print").name(), "media");
    }

    #[test]
    fn test_keyframes_detection() {
        let block = |scope: &str| Block {
            scope: Scope::new(scope),
            children: Vec::new(),
        };
        assert!(block("@keyframes spin").is_keyframes());
        assert!(block("@-moz-keyframes spin").is_keyframes());
        assert!(!block("@media print").is_keyframes());
    }

    #[test]
    fn test_at_rule_name() {
        assert_eq!(AtRule::new("@import url(a.css)").name(), "import");
        assert_eq!(AtRule::new("@charset \"utf-8\"").name(), "charset");
        assert!(Token::AtRule(AtRule::new("@Charset 'x'")).is_at_rule_named("charset"));
    }
}
