//! Stylesheet tokenizer.
//!
//! A single-pass scanning state machine with three states:
//!
//! - **top**: selectors, at-rule preambles and statement at-rules
//! - **block**: the inside of a nested at-rule (`@media`), scanned as top
//!   level until its closing brace
//! - **body**: declarations of a rule or flat at-rule (`@font-face`)
//!
//! The tokenizer never fails. Malformed input (stray or missing braces,
//! declarations without a colon, unterminated strings) pushes a
//! [`Warning`] and the scanner resynchronizes at the next structural
//! character.

mod chunk;

use tracing::debug;

use crate::error::Warning;
use crate::token::{
    AtRule, AtRuleBlock, Block, BodyItem, Comment, Position, Property, Rule, Scope, Selector, Token,
    Value,
};
use crate::util::{collapse_whitespace, split_top_level, unprefixed};

pub use chunk::CHUNK_SIZE;

/// At-rules whose body is a flat declaration list, matched after
/// stripping any vendor prefix.
const FLAT_AT_RULES: &[&str] = &["counter-style", "font-face", "page", "property", "viewport"];

/// Tokenize a stylesheet, appending problems to `warnings`.
pub fn tokenize(css: &str, warnings: &mut Vec<Warning>) -> Vec<Token> {
    tokenize_chunked(css, CHUNK_SIZE, warnings)
}

/// Tokenize with an explicit chunk size.
pub fn tokenize_chunked(css: &str, chunk_size: usize, warnings: &mut Vec<Warning>) -> Vec<Token> {
    let lines = LineIndex::new(css);
    let mut tokens = Vec::new();

    for (offset, chunk) in chunk::split(css, chunk_size.max(1)) {
        let mut scanner = Scanner {
            src: chunk,
            pos: 0,
            base: offset,
            lines: &lines,
            warnings: &mut *warnings,
        };
        tokens.extend(scanner.tokens(None));
    }

    debug!(tokens = tokens.len(), bytes = css.len(), "tokenized");
    tokens
}

// ============================================================================
// Line Index
// ============================================================================

/// Maps byte offsets to line/column positions.
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(memchr::memchr_iter(b'\n', source.as_bytes()).map(|i| i + 1));
        Self { line_starts }
    }

    /// Position of a byte offset (1-based line, 0-based column).
    pub fn position(&self, offset: usize) -> Position {
        let line = self.line_starts.partition_point(|&start| start <= offset);
        let column = offset - self.line_starts[line - 1];
        Position::new(line as u32, column as u32)
    }
}

// ============================================================================
// Scanner
// ============================================================================

struct Scanner<'a, 'w> {
    src: &'a str,
    pos: usize,
    base: usize,
    lines: &'a LineIndex,
    warnings: &'w mut Vec<Warning>,
}

/// Text accumulated between structural characters, with the offset of
/// its first non-whitespace character.
#[derive(Default)]
struct Buffer {
    text: String,
    start: Option<usize>,
}

impl Buffer {
    fn push(&mut self, text: &str, at: usize) {
        if self.start.is_none() && !text.trim().is_empty() {
            self.start = Some(at);
        }
        self.text.push_str(text);
    }

    /// Stand in for a dropped comment so the text around it stays apart.
    fn separate(&mut self, next: Option<u8>) {
        let after_text = self.text.chars().last().is_some_and(|c| !c.is_whitespace());
        if after_text && next.is_some_and(|b| !b.is_ascii_whitespace()) {
            self.text.push(' ');
        }
    }

    fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    fn take(&mut self) -> (String, Option<usize>) {
        let text = std::mem::take(&mut self.text);
        (text, self.start.take())
    }
}

impl<'a> Scanner<'a, '_> {
    fn peek(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    fn peek_at(&self, n: usize) -> Option<u8> {
        self.src.as_bytes().get(self.pos + n).copied()
    }

    fn position(&self, offset: usize) -> Position {
        self.lines.position(self.base + offset)
    }

    fn warn(&mut self, message: String, offset: usize) {
        let position = self.position(offset);
        tracing::warn!(%position, "{message}");
        self.warnings.push(Warning::new(message, Some(position)));
    }

    /// Consume one character and return it as a slice.
    fn bump(&mut self) -> &'a str {
        let src = self.src;
        let start = self.pos;
        let len = src[start..].chars().next().map_or(1, char::len_utf8);
        self.pos += len;
        &src[start..self.pos]
    }

    /// Consume a `\` escape together with the escaped character.
    fn read_escape(&mut self) -> &'a str {
        let src = self.src;
        let start = self.pos;
        self.pos += 1;
        if self.pos < src.len() {
            self.bump();
        }
        &src[start..self.pos]
    }

    /// Consume a `/* ... */` comment; the cursor is on the `/`.
    fn read_comment(&mut self) -> &'a str {
        let src = self.src;
        let start = self.pos;
        match memchr::memmem::find(&src.as_bytes()[start + 2..], b"*/") {
            Some(end) => self.pos = start + 2 + end + 2,
            None => {
                self.pos = src.len();
                self.warn("Unterminated comment".to_string(), start);
            }
        }
        &src[start..self.pos]
    }

    /// Consume a quoted string; an unescaped newline ends a broken string.
    fn read_string(&mut self) -> &'a str {
        let src = self.src;
        let start = self.pos;
        let bytes = src.as_bytes();
        let quote = bytes[start];
        let mut i = start + 1;
        let mut terminated = false;

        while i < bytes.len() {
            match bytes[i] {
                b'\\' => i += 2,
                b'\n' => break,
                b if b == quote => {
                    i += 1;
                    terminated = true;
                    break;
                }
                _ => i += 1,
            }
        }

        self.pos = i.min(bytes.len());
        if !terminated {
            self.warn("Unterminated string".to_string(), start);
        }
        &src[start..self.pos]
    }

    /// Skip a block whose `{` was already consumed, including nested blocks.
    fn skip_block(&mut self) {
        let mut depth = 1usize;
        while let Some(b) = self.peek() {
            match b {
                b'\\' => {
                    self.read_escape();
                }
                b'/' if self.peek_at(1) == Some(b'*') => {
                    self.read_comment();
                }
                b'"' | b'\'' => {
                    self.read_string();
                }
                b'{' => {
                    depth += 1;
                    self.pos += 1;
                }
                b'}' => {
                    self.pos += 1;
                    depth -= 1;
                    if depth == 0 {
                        return;
                    }
                }
                _ => {
                    self.bump();
                }
            }
        }
    }

    // ------------------------------------------------------------------------
    // top / block
    // ------------------------------------------------------------------------

    /// Scan a token list. `scope` is the opened block (with the offset of
    /// its preamble), or `None` at the top level.
    fn tokens(&mut self, scope: Option<(&str, usize)>) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut buffer = Buffer::default();
        let mut depth = 0usize;

        loop {
            let at = self.pos;
            let Some(b) = self.peek() else {
                self.finish_tokens(scope, &mut buffer, &mut tokens);
                return tokens;
            };

            match b {
                b'/' if self.peek_at(1) == Some(b'*') => {
                    let text = self.read_comment();
                    if buffer.is_blank() {
                        tokens.push(Token::Comment(Comment {
                            text: text.to_string(),
                            position: Some(self.position(at)),
                        }));
                    } else {
                        buffer.separate(self.peek());
                    }
                }
                b'"' | b'\'' => {
                    let text = self.read_string();
                    buffer.push(text, at);
                }
                b'\\' => {
                    let text = self.read_escape();
                    buffer.push(text, at);
                }
                b'(' => {
                    depth += 1;
                    buffer.push(self.bump(), at);
                }
                b')' => {
                    depth = depth.saturating_sub(1);
                    buffer.push(self.bump(), at);
                }
                b';' if depth == 0 => {
                    self.pos += 1;
                    self.statement(&mut buffer, &mut tokens);
                }
                b'{' => {
                    self.pos += 1;
                    depth = 0;
                    let (text, start) = buffer.take();
                    self.open_block(&text, start.unwrap_or(at), &mut tokens);
                }
                b'}' => {
                    self.pos += 1;
                    if scope.is_some() {
                        if !buffer.is_blank() {
                            let (text, start) = buffer.take();
                            self.leftover(&text, start.unwrap_or(at), &mut tokens);
                        }
                        return tokens;
                    }
                    self.warn("Unexpected '}'".to_string(), at);
                    buffer.take();
                    depth = 0;
                }
                _ => {
                    buffer.push(self.bump(), at);
                }
            }
        }
    }

    fn finish_tokens(
        &mut self,
        scope: Option<(&str, usize)>,
        buffer: &mut Buffer,
        tokens: &mut Vec<Token>,
    ) {
        if !buffer.is_blank() {
            let (text, start) = buffer.take();
            self.leftover(&text, start.unwrap_or(self.pos), tokens);
        }
        if let Some((scope, at)) = scope {
            self.warn(format!("Missing '}}' after '{scope}'"), at);
        }
    }

    /// Text left before a `}` or the end of input: a statement at-rule
    /// missing its `;`, or garbage.
    fn leftover(&mut self, text: &str, at: usize, tokens: &mut Vec<Token>) {
        let text = text.trim();
        if text.starts_with('@') {
            tokens.push(Token::AtRule(AtRule {
                text: collapse_whitespace(text),
                position: Some(self.position(at)),
            }));
        } else {
            self.warn(format!("Invalid character(s) '{text}' ignored"), at);
        }
    }

    /// A `;` at top level ends a statement at-rule.
    fn statement(&mut self, buffer: &mut Buffer, tokens: &mut Vec<Token>) {
        let (text, start) = buffer.take();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return;
        }
        let at = start.unwrap_or(self.pos);

        if trimmed.starts_with('@') {
            tokens.push(Token::AtRule(AtRule {
                text: collapse_whitespace(trimmed),
                position: Some(self.position(at)),
            }));
        } else {
            self.warn(format!("Invalid character(s) '{trimmed}' ignored"), at);
        }
    }

    /// Scan the block whose `{` was just consumed.
    fn open_block(&mut self, preamble: &str, at: usize, tokens: &mut Vec<Token>) {
        let preamble = collapse_whitespace(preamble);

        if preamble.starts_with('@') {
            let scope = Scope {
                text: preamble,
                position: Some(self.position(at)),
            };
            let name = scope.name();

            if name.is_empty() {
                self.warn(format!("Invalid at-rule '{}'", scope.text), at);
                self.skip_block();
                return;
            }

            if FLAT_AT_RULES.contains(&unprefixed(&name)) {
                let body = self.body(at);
                tokens.push(Token::AtRuleBlock(AtRuleBlock { scope, body }));
            } else {
                let children = self.tokens(Some((&scope.text, at)));
                tokens.push(Token::Block(Block { scope, children }));
            }
            return;
        }

        let position = self.position(at);
        let selectors = split_top_level(&preamble, ',')
            .into_iter()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| Selector::at(s, position))
            .collect::<Vec<_>>();

        if selectors.is_empty() {
            self.warn("Missing selector before '{'".to_string(), at);
        }

        let body = self.body(at);
        tokens.push(Token::Rule(Rule::new(selectors, body)));
    }

    // ------------------------------------------------------------------------
    // body
    // ------------------------------------------------------------------------

    /// Scan declarations up to the closing `}` of the block opened at `open`.
    fn body(&mut self, open: usize) -> Vec<BodyItem> {
        let mut items = Vec::new();
        let mut buffer = Buffer::default();
        let mut nested: Option<Vec<BodyItem>> = None;
        let mut depth = 0usize;

        loop {
            let at = self.pos;
            let Some(b) = self.peek() else {
                self.declaration(&mut buffer, nested.take(), &mut items);
                self.warn("Missing '}' at end of block".to_string(), open);
                return items;
            };

            match b {
                b'/' if self.peek_at(1) == Some(b'*') => {
                    let text = self.read_comment();
                    if buffer.is_blank() {
                        items.push(BodyItem::Comment(Comment {
                            text: text.to_string(),
                            position: Some(self.position(at)),
                        }));
                    } else {
                        buffer.separate(self.peek());
                    }
                }
                b'"' | b'\'' => {
                    let text = self.read_string();
                    buffer.push(text, at);
                }
                b'\\' => {
                    let text = self.read_escape();
                    buffer.push(text, at);
                }
                b'(' => {
                    depth += 1;
                    buffer.push(self.bump(), at);
                }
                b')' => {
                    depth = depth.saturating_sub(1);
                    buffer.push(self.bump(), at);
                }
                b';' if depth == 0 => {
                    self.pos += 1;
                    self.declaration(&mut buffer, nested.take(), &mut items);
                }
                b'{' => {
                    self.pos += 1;
                    depth = 0;
                    if is_custom_property_start(&buffer.text) && nested.is_none() {
                        nested = Some(self.body(at));
                    } else {
                        let (text, _) = buffer.take();
                        self.warn(format!("Unexpected '{{' after '{}'", text.trim()), at);
                        self.skip_block();
                    }
                }
                b'}' => {
                    self.pos += 1;
                    self.declaration(&mut buffer, nested.take(), &mut items);
                    return items;
                }
                _ => {
                    buffer.push(self.bump(), at);
                }
            }
        }
    }

    fn declaration(
        &mut self,
        buffer: &mut Buffer,
        nested: Option<Vec<BodyItem>>,
        items: &mut Vec<BodyItem>,
    ) {
        let (text, start) = buffer.take();
        let text = text.trim();
        if text.is_empty() && nested.is_none() {
            return;
        }
        let at = start.unwrap_or(self.pos);

        let Some(colon) = find_colon(text) else {
            self.warn(format!("Missing ':' in declaration '{text}'"), at);
            return;
        };

        let name = text[..colon].trim();
        if name.is_empty() {
            self.warn(format!("Missing property name in '{text}'"), at);
            return;
        }

        let mut property =
            Property::from_declaration(name, &text[colon + 1..], Some(self.position(at)));
        if let Some(block) = nested {
            property.values.push(Value::Block(block));
        }
        items.push(BodyItem::Property(property));
    }
}

/// Whether the buffered text is `--name:` waiting for a `{` value.
fn is_custom_property_start(text: &str) -> bool {
    let text = text.trim_start();
    text.starts_with("--")
        && text
            .find(':')
            .is_some_and(|colon| text[colon + 1..].trim().is_empty())
}

/// Offset of the first `:` outside quotes and brackets.
fn find_colon(text: &str) -> Option<usize> {
    let first = split_top_level(text, ':').into_iter().next()?;
    (first.len() < text.len()).then_some(first.len())
}
