//! Declarations and their value fragments.

use super::{BodyItem, Position};

/// Browser hack attached to a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Hack {
    #[default]
    None,
    /// `*zoom: 1` (IE7 and below)
    Star,
    /// `_height: 1px` (IE6)
    Underscore,
    /// `color: red\9` (IE8 and below); holds the characters after the backslash
    Backslash(String),
    /// `color: red !ie` (IE7 and below)
    Bang,
}

impl Hack {
    pub fn is_none(&self) -> bool {
        matches!(self, Hack::None)
    }

    /// Whether both hacks are of the same kind, ignoring any payload.
    pub fn same_kind(&self, other: &Hack) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

/// One fragment of a declaration value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A word, number, string or function call, e.g. `1px`, `"a b"`, `rgb(0,0,0)`.
    Word(String),
    /// Top-level `,` separating list items or multiplex layers.
    Comma,
    /// Top-level `/`, e.g. `font: 12px/1.5` or `border-radius: 1px / 2px`.
    Slash,
    /// A nested declaration block used as a value (`--mixin: { ... }`).
    Block(Vec<BodyItem>),
}

impl Value {
    pub fn word(text: impl Into<String>) -> Self {
        Value::Word(text.into())
    }

    /// Text of a word fragment or the separator character.
    pub fn as_str(&self) -> &str {
        match self {
            Value::Word(text) => text,
            Value::Comma => ",",
            Value::Slash => "/",
            Value::Block(_) => "",
        }
    }

    pub fn is_comma(&self) -> bool {
        matches!(self, Value::Comma)
    }

    pub fn is_slash(&self) -> bool {
        matches!(self, Value::Slash)
    }

    pub fn is_separator(&self) -> bool {
        matches!(self, Value::Comma | Value::Slash)
    }
}

/// A declaration: `name: value [!important]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub values: Vec<Value>,
    pub important: bool,
    pub hack: Hack,
    pub position: Option<Position>,
}

impl Property {
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            values,
            important: false,
            hack: Hack::None,
            position: None,
        }
    }

    /// Build a property from the raw text on both sides of the colon.
    ///
    /// Extracts the `*`/`_` name hacks, `\9` and `!ie` value hacks and the
    /// `!important` marker, then splits the remaining value into fragments.
    pub fn from_declaration(name: &str, value: &str, position: Option<Position>) -> Self {
        let mut name = name.trim();
        let mut hack = Hack::None;

        if let Some(rest) = name.strip_prefix('*') {
            hack = Hack::Star;
            name = rest;
        } else if let Some(rest) = name.strip_prefix('_') {
            hack = Hack::Underscore;
            name = rest;
        }

        let mut values = split_value(value);
        let mut important = false;

        // Trailing markers may appear in any order: `red\9 !important`, `red !ie`
        loop {
            let Some(Value::Word(last)) = values.last() else {
                break;
            };

            if last.eq_ignore_ascii_case("important")
                && values.len() > 1
                && matches!(&values[values.len() - 2], Value::Word(w) if w == "!")
            {
                values.truncate(values.len() - 2);
                important = true;
                continue;
            }

            if let Some(stripped) = strip_suffix_ignore_case(last, "!important") {
                let stripped = stripped.trim_end().to_string();
                replace_last(&mut values, stripped);
                important = true;
                continue;
            }

            if hack.is_none()
                && let Some(stripped) = strip_suffix_ignore_case(last, "!ie")
            {
                let stripped = stripped.trim_end().to_string();
                replace_last(&mut values, stripped);
                hack = Hack::Bang;
                continue;
            }

            if hack.is_none()
                && let Some(at) = backslash_hack_at(last)
            {
                let suffix = last[at + 1..].to_string();
                let stripped = last[..at].to_string();
                replace_last(&mut values, stripped);
                hack = Hack::Backslash(suffix);
                continue;
            }

            break;
        }

        Self {
            name: name.to_string(),
            values,
            important,
            hack,
            position,
        }
    }

    /// Custom properties (`--name`) are case-sensitive and opaque.
    pub fn is_custom(&self) -> bool {
        self.name.starts_with("--")
    }

    /// Whether the value holds a nested property block.
    pub fn has_block(&self) -> bool {
        self.values.iter().any(|v| matches!(v, Value::Block(_)))
    }

    /// Lowercased property name.
    pub fn lower_name(&self) -> String {
        if self.is_custom() {
            self.name.clone()
        } else {
            self.name.to_ascii_lowercase()
        }
    }
}

/// Replace the last fragment with `text`, dropping it when empty.
fn replace_last(values: &mut Vec<Value>, text: String) {
    values.pop();
    if !text.is_empty() {
        values.push(Value::Word(text));
    }
}

fn strip_suffix_ignore_case<'a>(text: &'a str, suffix: &str) -> Option<&'a str> {
    if text.len() < suffix.len() {
        return None;
    }
    let at = text.len() - suffix.len();
    if text.is_char_boundary(at) && text[at..].eq_ignore_ascii_case(suffix) {
        Some(&text[..at])
    } else {
        None
    }
}

/// Position of the backslash in a trailing `\9`-style hack.
fn backslash_hack_at(word: &str) -> Option<usize> {
    let at = word.rfind('\\')?;
    let suffix = &word[at + 1..];
    if !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()) {
        // `\31 ` style escapes inside words are not hacks; only a short digit tail is.
        if suffix.len() <= 2 && !word[..at].ends_with('\\') {
            return Some(at);
        }
    }
    None
}

/// Split a raw value into fragments at top-level whitespace, commas and slashes.
///
/// Quotes, escapes and bracket nesting are respected: `url(a b)`,
/// `"a, b"` and `calc(1px / 2)` each stay a single fragment.
pub fn split_value(text: &str) -> Vec<Value> {
    let mut values = Vec::new();
    let mut buffer = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    fn flush(buffer: &mut String, values: &mut Vec<Value>) {
        if !buffer.is_empty() {
            values.push(Value::Word(std::mem::take(buffer)));
        }
    }

    for c in text.chars() {
        if escaped {
            buffer.push(c);
            escaped = false;
            continue;
        }

        if c == '\\' {
            buffer.push(c);
            escaped = true;
            continue;
        }

        if let Some(q) = quote {
            buffer.push(c);
            if c == q {
                quote = None;
            }
            continue;
        }

        match c {
            '"' | '\'' => {
                quote = Some(c);
                buffer.push(c);
            }
            '(' | '[' => {
                depth += 1;
                buffer.push(c);
            }
            ')' | ']' => {
                depth = depth.saturating_sub(1);
                buffer.push(c);
            }
            ',' if depth == 0 => {
                flush(&mut buffer, &mut values);
                values.push(Value::Comma);
            }
            '/' if depth == 0 => {
                flush(&mut buffer, &mut values);
                values.push(Value::Slash);
            }
            c if c.is_whitespace() && depth == 0 => flush(&mut buffer, &mut values),
            c if c.is_whitespace() => {
                // Collapse runs inside functions; level-1 trims further.
                if !buffer.ends_with(' ') {
                    buffer.push(' ');
                }
            }
            _ => buffer.push(c),
        }
    }
    flush(&mut buffer, &mut values);

    values
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(values: &[Value]) -> Vec<&str> {
        values.iter().map(Value::as_str).collect()
    }

    #[test]
    fn test_split_value_separators() {
        let values = split_value("12px/1.5 \"Helvetica Neue\", arial");
        assert_eq!(
            words(&values),
            vec!["12px", "/", "1.5", "\"Helvetica Neue\"", ",", "arial"]
        );
    }

    #[test]
    fn test_split_value_keeps_functions_whole() {
        let values = split_value("rgba(0, 0, 0, .5) url(a b.png) calc(1px / 2)");
        assert_eq!(
            words(&values),
            vec!["rgba(0, 0, 0, .5)", "url(a b.png)", "calc(1px / 2)"]
        );
    }

    #[test]
    fn test_important_variants() {
        let p = Property::from_declaration("color", "red !important", None);
        assert!(p.important);
        assert_eq!(words(&p.values), vec!["red"]);

        let p = Property::from_declaration("color", "red!IMPORTANT", None);
        assert!(p.important);
        assert_eq!(words(&p.values), vec!["red"]);

        let p = Property::from_declaration("color", "red ! important", None);
        assert!(p.important);
        assert_eq!(words(&p.values), vec!["red"]);
    }

    #[test]
    fn test_hacks() {
        assert_eq!(Property::from_declaration("*zoom", "1", None).hack, Hack::Star);
        let p = Property::from_declaration("_height", "1px", None);
        assert_eq!(p.hack, Hack::Underscore);
        assert_eq!(p.name, "height");

        let p = Property::from_declaration("color", "red\\9", None);
        assert_eq!(p.hack, Hack::Backslash("9".to_string()));
        assert_eq!(words(&p.values), vec!["red"]);

        let p = Property::from_declaration("color", "red !ie", None);
        assert_eq!(p.hack, Hack::Bang);
        assert_eq!(words(&p.values), vec!["red"]);
    }

    #[test]
    fn test_empty_value() {
        let p = Property::from_declaration("color", "  ", None);
        assert!(p.values.is_empty());
    }
}
