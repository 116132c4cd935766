//! The pattern tree (spec §3) and the hand-written recursive-descent parser
//! that produces it (spec §4.C).
//!
//! No regular expressions, no parser-generator, no external combinator
//! crate: a single `Vec<char>` cursor with one character of lookahead is
//! sufficient for the whole grammar, braces-and-quotes included.

use std::collections::HashMap;

use crate::error::MessageFormatError;

/// An ordered sequence of nodes (spec §3). Immutable once parsed, safe to
/// share across concurrent format calls behind an `Arc` (spec §5).
#[derive(Debug, PartialEq)]
pub(crate) struct Pattern(pub Vec<Node>);

#[derive(Debug, PartialEq)]
pub(crate) enum Node {
    /// A run of unescaped text.
    Literal(String),
    /// `{name}`.
    Variable(String),
    /// `{name, type, style?}` where `type` is not a branching type.
    Formatted {
        name: String,
        type_name: String,
        style: Option<String>,
    },
    /// `{name, select|plural|selectordinal, ...}`.
    Branching {
        name: String,
        kind: BranchKind,
        offset: u64,
        branches: HashMap<BranchKey, Pattern>,
    },
    /// The literal `#` inside a plural/selectordinal branch body.
    PluralHash,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BranchKind {
    Select,
    Plural,
    SelectOrdinal,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum BranchKey {
    /// A CLDR plural keyword, a `select` key, or a user-pluralizer keyword.
    Keyword(String),
    /// An explicit `=N` match.
    Exact(i64),
}

const OTHER: &str = "other";

fn is_ws(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

/// Parse a full pattern string into a [`Pattern`] tree.
pub(crate) fn parse(src: &str) -> Result<Pattern, MessageFormatError> {
    let mut parser = Parser {
        chars: src.chars().collect(),
        pos: 0,
    };
    let nodes = parser.parse_nodes(false, false)?;
    match parser.peek() {
        None => Ok(Pattern(nodes)),
        Some(c) => Err(parser.err(format!("unexpected trailing `{c}`"))),
    }
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn err(&self, message: impl Into<String>) -> MessageFormatError {
        MessageFormatError::malformed(message, self.pos)
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if is_ws(c)) {
            self.bump();
        }
    }

    fn expect_char(&mut self, expected: char) -> Result<(), MessageFormatError> {
        match self.bump() {
            Some(c) if c == expected => Ok(()),
            Some(c) => Err(self.err(format!("expected `{expected}`, found `{c}`"))),
            None => Err(self.err(format!("expected `{expected}`, found end of pattern"))),
        }
    }

    /// Shared identifier lexer for argument names, format types, and branch
    /// keywords: everything up to whitespace or a structural character.
    fn parse_identifier(&mut self, what: &'static str) -> Result<String, MessageFormatError> {
        let mut s = String::new();
        while let Some(c) = self.peek() {
            if is_ws(c) || matches!(c, ',' | '{' | '}' | '=' | ':') {
                break;
            }
            s.push(c);
            self.bump();
        }
        if s.is_empty() {
            return Err(self.err(format!("empty {what}")));
        }
        Ok(s)
    }

    fn parse_uint(&mut self) -> Result<u64, MessageFormatError> {
        let mut digits = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                digits.push(c);
                self.bump();
            } else {
                break;
            }
        }
        digits
            .parse()
            .map_err(|_| self.err("expected a non-negative integer"))
    }

    /// Consume one `'...'` sequence (or a bare `''`) starting at the current
    /// `'`, appending the literal text it denotes to `out`. Spec §3
    /// quoting rules: `''` is always a literal apostrophe, even mid-region;
    /// an unterminated region runs to end-of-pattern.
    fn consume_quote_sequence(&mut self, out: &mut String) -> Result<(), MessageFormatError> {
        debug_assert_eq!(self.peek(), Some('\''));
        self.bump();
        if self.peek() == Some('\'') {
            self.bump();
            out.push('\'');
            return Ok(());
        }
        loop {
            match self.peek() {
                None => break,
                Some('\'') => {
                    self.bump();
                    if self.peek() == Some('\'') {
                        self.bump();
                        out.push('\'');
                        continue;
                    }
                    break;
                }
                Some(c) => {
                    out.push(c);
                    self.bump();
                }
            }
        }
        Ok(())
    }

    /// Parse a run of literal/placeholder/plural-hash nodes.
    ///
    /// `hash_active` is true only while directly inside a plural/selectordinal
    /// branch body — a nested `select` branch turns `#` back into an ordinary
    /// character, matching real ICU `MessagePattern` scoping.
    ///
    /// `stop_at_close_brace` is true when parsing a branch body (bounded by
    /// the branch's own `}`, left unconsumed for the caller) and false at the
    /// top level (bounded only by end-of-input).
    fn parse_nodes(
        &mut self,
        hash_active: bool,
        stop_at_close_brace: bool,
    ) -> Result<Vec<Node>, MessageFormatError> {
        let mut nodes = Vec::new();
        let mut literal = String::new();
        loop {
            match self.peek() {
                None => break,
                Some('}') if stop_at_close_brace => break,
                Some('{') => {
                    flush_literal(&mut literal, &mut nodes);
                    nodes.push(self.parse_placeholder()?);
                }
                Some('#') if hash_active => {
                    flush_literal(&mut literal, &mut nodes);
                    self.bump();
                    nodes.push(Node::PluralHash);
                }
                Some('\'') => {
                    self.consume_quote_sequence(&mut literal)?;
                }
                Some(c) => {
                    literal.push(c);
                    self.bump();
                }
            }
        }
        flush_literal(&mut literal, &mut nodes);
        Ok(nodes)
    }

    /// Called with `self.peek() == Some('{')`. Parses through the
    /// placeholder's matching `}` and returns the node it describes.
    fn parse_placeholder(&mut self) -> Result<Node, MessageFormatError> {
        self.expect_char('{')?;
        self.skip_ws();
        let name = self.parse_identifier("argument name")?;
        self.skip_ws();

        match self.peek() {
            Some('}') => {
                self.bump();
                return Ok(Node::Variable(name));
            }
            Some(',') => {
                self.bump();
            }
            Some(c) => return Err(self.err(format!("expected `,` or `}}`, found `{c}`"))),
            None => return Err(self.err("unexpected end of pattern")),
        }

        self.skip_ws();
        let type_name = self.parse_identifier("format type")?;
        self.skip_ws();

        let node = match type_name.as_str() {
            "select" => {
                self.expect_comma_before_tail("select")?;
                let node = self.parse_branching(name, BranchKind::Select)?;
                self.expect_char('}')?;
                return Ok(node);
            }
            "plural" => {
                self.expect_comma_before_tail("plural")?;
                let node = self.parse_branching(name, BranchKind::Plural)?;
                self.expect_char('}')?;
                return Ok(node);
            }
            "selectordinal" => {
                self.expect_comma_before_tail("selectordinal")?;
                let node = self.parse_branching(name, BranchKind::SelectOrdinal)?;
                self.expect_char('}')?;
                return Ok(node);
            }
            _ => {
                let style = match self.peek() {
                    Some(',') => {
                        self.bump();
                        self.skip_ws();
                        Some(self.parse_style_text()?)
                    }
                    _ => None,
                };
                Node::Formatted {
                    name,
                    type_name,
                    style,
                }
            }
        };
        self.expect_char('}')?;
        Ok(node)
    }

    fn expect_comma_before_tail(&mut self, type_name: &str) -> Result<(), MessageFormatError> {
        match self.bump() {
            Some(',') => {
                self.skip_ws();
                Ok(())
            }
            Some(c) => Err(self.err(format!("expected branches after `{type_name}`, found `{c}`"))),
            None => Err(self.err(format!("expected branches after `{type_name}`"))),
        }
    }

    /// Raw text up to (not including) the matching `}`, honoring quote rules
    /// and nested-brace depth but never interpreting nested `{...}` as a
    /// placeholder (spec §4.C: "styles normally have none").
    fn parse_style_text(&mut self) -> Result<String, MessageFormatError> {
        let mut text = String::new();
        let mut depth: u32 = 0;
        loop {
            match self.peek() {
                None => return Err(self.err("unexpected end of pattern in style text")),
                Some('\'') => self.consume_quote_sequence(&mut text)?,
                Some('{') => {
                    depth += 1;
                    text.push('{');
                    self.bump();
                }
                Some('}') => {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                    text.push('}');
                    self.bump();
                }
                Some(c) => {
                    text.push(c);
                    self.bump();
                }
            }
        }
        Ok(text)
    }

    /// Parses `(offset-spec ws)? (branch-key ws '{' sub-pattern '}' ws)+`,
    /// leaving `self.pos` at the placeholder's closing `}`.
    fn parse_branching(
        &mut self,
        name: String,
        kind: BranchKind,
    ) -> Result<Node, MessageFormatError> {
        self.skip_ws();
        let mut offset = 0u64;
        if kind == BranchKind::Plural {
            let save = self.pos;
            match self.parse_identifier("branch key") {
                Ok(ident) if ident == "offset" => {
                    self.skip_ws();
                    self.expect_char(':')?;
                    self.skip_ws();
                    offset = self.parse_uint()?;
                    self.skip_ws();
                }
                _ => self.pos = save,
            }
        }

        let mut branches: HashMap<BranchKey, Pattern> = HashMap::new();
        loop {
            self.skip_ws();
            match self.peek() {
                Some('}') | None => break,
                _ => {}
            }
            let key = self.parse_branch_key(kind)?;
            self.skip_ws();
            self.expect_char('{')?;
            let hash_active = kind != BranchKind::Select;
            let sub_nodes = self.parse_nodes(hash_active, true)?;
            self.expect_char('}')?;
            if branches.contains_key(&key) {
                return Err(self.err(format!("duplicate branch key `{}`", describe_key(&key))));
            }
            branches.insert(key, Pattern(sub_nodes));
        }

        if !branches.contains_key(&BranchKey::Keyword(OTHER.to_owned())) {
            return Err(self.err(format!("missing `{OTHER}` branch")));
        }

        Ok(Node::Branching {
            name,
            kind,
            offset,
            branches,
        })
    }

    fn parse_branch_key(&mut self, kind: BranchKind) -> Result<BranchKey, MessageFormatError> {
        if kind != BranchKind::Select && self.peek() == Some('=') {
            self.bump();
            let mut digits = String::new();
            if self.peek() == Some('-') {
                digits.push('-');
                self.bump();
            }
            while let Some(c) = self.peek() {
                if c.is_ascii_digit() {
                    digits.push(c);
                    self.bump();
                } else {
                    break;
                }
            }
            let n: i64 = digits
                .parse()
                .map_err(|_| self.err("malformed explicit match key, expected `=N`"))?;
            return Ok(BranchKey::Exact(n));
        }
        let ident = self.parse_identifier("branch key")?;
        Ok(BranchKey::Keyword(ident))
    }
}

fn flush_literal(literal: &mut String, nodes: &mut Vec<Node>) {
    if !literal.is_empty() {
        nodes.push(Node::Literal(std::mem::take(literal)));
    }
}

fn describe_key(key: &BranchKey) -> String {
    match key {
        BranchKey::Keyword(k) => k.clone(),
        BranchKey::Exact(n) => format!("={n}"),
    }
}
