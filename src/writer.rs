//! Compact serialization of the token tree.
//!
//! The optimizer compares rules, bodies and blocks by their serialized
//! form, so the same routines double as equality keys ([`serialize_rules`],
//! [`serialize_body`], [`serialize_all`]). Output is a single line with no
//! optional whitespace and no trailing semicolons.

use crate::token::{
    AtRule, AtRuleBlock, Block, BodyItem, Comment, Hack, Property, Rule, Selector, Token, Value,
};

/// Values that can write themselves as CSS text.
pub trait ToCss {
    /// Write this value as CSS to the buffer.
    fn to_css(&self, buf: &mut String);

    /// Convert to a CSS string (convenience method).
    fn to_css_string(&self) -> String {
        let mut buf = String::new();
        self.to_css(&mut buf);
        buf
    }
}

/// Serialize a whole token list.
pub fn write(tokens: &[Token]) -> String {
    let mut buf = String::new();
    write_tokens(tokens, &mut buf);
    buf
}

/// Key for a token list, used to compare nested block bodies.
pub fn serialize_all(tokens: &[Token]) -> String {
    write(tokens)
}

/// Key for a selector list (`a,b>c`).
pub fn serialize_rules(selectors: &[Selector]) -> String {
    let mut buf = String::new();
    write_selectors(selectors, &mut buf);
    buf
}

/// Key for a declaration body (`color:red;margin:0`).
pub fn serialize_body(body: &[BodyItem]) -> String {
    let mut buf = String::new();
    write_body(body, &mut buf);
    buf
}

/// Serialized value of a property, without name or flags.
pub fn serialize_value(values: &[Value]) -> String {
    let mut buf = String::new();
    write_values(values, &mut buf);
    buf
}

fn write_tokens(tokens: &[Token], buf: &mut String) {
    for token in tokens {
        token.to_css(buf);
    }
}

fn write_selectors(selectors: &[Selector], buf: &mut String) {
    for (i, selector) in selectors.iter().enumerate() {
        if i > 0 {
            buf.push(',');
        }
        buf.push_str(&selector.text);
    }
}

fn write_body(body: &[BodyItem], buf: &mut String) {
    let mut previous_was_property = false;
    for item in body {
        if previous_was_property {
            buf.push(';');
        }
        match item {
            BodyItem::Property(property) => {
                property.to_css(buf);
                previous_was_property = true;
            }
            BodyItem::Comment(comment) => {
                comment.to_css(buf);
                previous_was_property = false;
            }
        }
    }
}

fn write_values(values: &[Value], buf: &mut String) {
    let mut previous: Option<&Value> = None;
    for value in values {
        let needs_space = matches!(
            (previous, value),
            (Some(Value::Word(_) | Value::Block(_)), Value::Word(_) | Value::Block(_))
        );
        if needs_space {
            buf.push(' ');
        }
        value.to_css(buf);
        previous = Some(value);
    }
}

impl ToCss for Token {
    fn to_css(&self, buf: &mut String) {
        match self {
            Token::AtRule(at_rule) => at_rule.to_css(buf),
            Token::AtRuleBlock(block) => block.to_css(buf),
            Token::Block(block) => block.to_css(buf),
            Token::Comment(comment) => comment.to_css(buf),
            Token::Rule(rule) => rule.to_css(buf),
        }
    }
}

impl ToCss for Rule {
    fn to_css(&self, buf: &mut String) {
        write_selectors(&self.selectors, buf);
        buf.push('{');
        write_body(&self.body, buf);
        buf.push('}');
    }
}

impl ToCss for AtRuleBlock {
    fn to_css(&self, buf: &mut String) {
        buf.push_str(&self.scope.text);
        buf.push('{');
        write_body(&self.body, buf);
        buf.push('}');
    }
}

impl ToCss for Block {
    fn to_css(&self, buf: &mut String) {
        buf.push_str(&self.scope.text);
        buf.push('{');
        write_tokens(&self.children, buf);
        buf.push('}');
    }
}

impl ToCss for AtRule {
    fn to_css(&self, buf: &mut String) {
        buf.push_str(&self.text);
        buf.push(';');
    }
}

impl ToCss for Comment {
    fn to_css(&self, buf: &mut String) {
        buf.push_str(&self.text);
    }
}

impl ToCss for Property {
    fn to_css(&self, buf: &mut String) {
        match self.hack {
            Hack::Star => buf.push('*'),
            Hack::Underscore => buf.push('_'),
            _ => {}
        }
        buf.push_str(&self.name);
        buf.push(':');
        write_values(&self.values, buf);
        if let Hack::Backslash(suffix) = &self.hack {
            buf.push('\\');
            buf.push_str(suffix);
        }
        if self.hack == Hack::Bang {
            buf.push_str(" !ie");
        }
        if self.important {
            buf.push_str("!important");
        }
    }
}

impl ToCss for Value {
    fn to_css(&self, buf: &mut String) {
        match self {
            Value::Block(body) => {
                buf.push('{');
                write_body(body, buf);
                buf.push('}');
            }
            other => buf.push_str(other.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{Scope, split_value};

    fn property(name: &str, value: &str) -> BodyItem {
        BodyItem::Property(Property::from_declaration(name, value, None))
    }

    #[test]
    fn test_write_rule() {
        let rule = Rule::new(
            vec![Selector::new("a"), Selector::new("p>b")],
            vec![property("color", "red"), property("margin", "0 auto")],
        );
        assert_eq!(rule.to_css_string(), "a,p>b{color:red;margin:0 auto}");
    }

    #[test]
    fn test_write_separators_without_spaces() {
        let values = split_value("12px / 1.5 arial , serif");
        assert_eq!(serialize_value(&values), "12px/1.5 arial,serif");
    }

    #[test]
    fn test_write_flags_and_hacks() {
        let p = Property::from_declaration("*color", "red !important", None);
        assert_eq!(p.to_css_string(), "*color:red!important");

        let p = Property::from_declaration("color", "red\\9", None);
        assert_eq!(p.to_css_string(), "color:red\\9");

        let p = Property::from_declaration("color", "red !ie", None);
        assert_eq!(p.to_css_string(), "color:red !ie");
    }

    #[test]
    fn test_write_nested_block() {
        let block = Token::Block(Block {
            scope: Scope::new("@media print"),
            children: vec![Token::Rule(Rule::new(
                vec![Selector::new("a")],
                vec![property("display", "none")],
            ))],
        });
        assert_eq!(write(&[block]), "@media print{a{display:none}}");
    }

    #[test]
    fn test_write_body_with_comment() {
        let body = vec![
            property("color", "red"),
            BodyItem::Comment(Comment::new("/*! keep */")),
            property("top", "0"),
        ];
        assert_eq!(serialize_body(&body), "color:red;/*! keep */top:0");
    }
}
