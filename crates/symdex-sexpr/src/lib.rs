//! An S-expression tree for KiCad library text, with byte spans for every node.
//!
//! Parsing is a single pass over the input that produces [`Sexpr`] nodes of
//! four kinds: lists, unquoted symbols, quoted strings and numbers. Quoted
//! strings are tokenized as a unit, so parentheses inside them never affect
//! list nesting. Open lists are kept on an explicit stack, so nesting depth is
//! bounded by memory rather than by the call stack.
//!
//! # Querying
//!
//! - [`find_child_list`] / [`find_all_child_lists`] look at direct children only
//! - [`Sexpr::lists_tagged`] collects every nested list with a given head symbol

pub mod kicad;

use std::fmt;

/// Find a direct child list `(name ...)` within a list of [`Sexpr`] nodes.
pub fn find_child_list<'a>(items: &'a [Sexpr], name: &str) -> Option<&'a [Sexpr]> {
    items
        .iter()
        .filter_map(Sexpr::as_list)
        .find(|list| list_tag(list) == Some(name))
}

/// Find all direct child lists `(name ...)` within a list of [`Sexpr`] nodes.
pub fn find_all_child_lists<'a>(items: &'a [Sexpr], name: &str) -> Vec<&'a [Sexpr]> {
    items
        .iter()
        .filter_map(Sexpr::as_list)
        .filter(|list| list_tag(list) == Some(name))
        .collect()
}

/// Head symbol of a list, e.g. `pin` for `(pin passive line ...)`.
pub fn list_tag(items: &[Sexpr]) -> Option<&str> {
    items.first().and_then(Sexpr::as_sym)
}

/// Coerce a number atom into f64.
///
/// KiCad writes whole numbers as ints and everything else as floats.
pub fn number_as_f64(node: &Sexpr) -> Option<f64> {
    node.as_float().or_else(|| node.as_int().map(|v| v as f64))
}

/// Byte span in source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// Start byte offset (inclusive)
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// The kind of S-expression value
#[derive(Debug, Clone, PartialEq)]
pub enum SexprKind {
    /// Unquoted identifier, e.g. `passive` or `pin`
    Symbol(String),
    /// Quoted text with escapes resolved
    String(String),
    Int(i64),
    F64(f64),
    List(Vec<Sexpr>),
}

/// An S-expression value with source span
#[derive(Debug, Clone)]
pub struct Sexpr {
    pub kind: SexprKind,
    pub span: Span,
}

impl PartialEq for Sexpr {
    fn eq(&self, other: &Self) -> bool {
        // Spans are positional metadata, not part of the value.
        self.kind == other.kind
    }
}

impl Drop for Sexpr {
    fn drop(&mut self) {
        // Flatten nested lists before they drop so deep trees never recurse.
        let SexprKind::List(items) = &mut self.kind else {
            return;
        };
        let mut pending = std::mem::take(items);
        while let Some(mut node) = pending.pop() {
            if let SexprKind::List(children) = &mut node.kind {
                pending.append(children);
            }
        }
    }
}

impl Sexpr {
    pub fn with_span(kind: SexprKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Symbol or string text.
    pub fn as_atom(&self) -> Option<&str> {
        match &self.kind {
            SexprKind::Symbol(s) | SexprKind::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_sym(&self) -> Option<&str> {
        match &self.kind {
            SexprKind::Symbol(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.kind {
            SexprKind::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match &self.kind {
            SexprKind::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match &self.kind {
            SexprKind::F64(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Sexpr]> {
        match &self.kind {
            SexprKind::List(items) => Some(items),
            _ => None,
        }
    }

    /// Collect every list at any depth (including `self`) whose head symbol is
    /// `tag`, in document order.
    pub fn lists_tagged<'a>(&'a self, tag: &str) -> Vec<&'a [Sexpr]> {
        let mut out = Vec::new();
        let Some(root) = self.as_list() else {
            return out;
        };
        if list_tag(root) == Some(tag) {
            out.push(root);
        }

        let mut stack = vec![root.iter()];
        while let Some(children) = stack.last_mut() {
            let Some(child) = children.next() else {
                stack.pop();
                continue;
            };
            if let Some(items) = child.as_list() {
                if list_tag(items) == Some(tag) {
                    out.push(items);
                }
                stack.push(items.iter());
            }
        }
        out
    }
}

/// What a lenient parse had to close at end of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Repair {
    /// Start offset of a string that ran to end of input.
    pub open_string: Option<usize>,
    /// Lists still open at end of input.
    pub open_lists: usize,
}

impl Repair {
    pub fn is_clean(&self) -> bool {
        self.open_string.is_none() && self.open_lists == 0
    }
}

/// Single-pass parser over a borrowed input.
pub struct Parser<'a> {
    input: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    pos: usize,
    lenient: bool,
    repair: Repair,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        Parser {
            input,
            chars: input.char_indices().peekable(),
            pos: 0,
            lenient: false,
            repair: Repair::default(),
        }
    }

    /// Close any string or list still open at end of input instead of failing.
    ///
    /// Check [`Parser::repair`] afterwards to see what was closed.
    pub fn lenient(mut self) -> Self {
        self.lenient = true;
        self
    }

    /// Byte offset of the next unread character.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// What lenient parsing closed on the caller's behalf so far.
    pub fn repair(&self) -> Repair {
        self.repair
    }

    /// Parse one expression.
    pub fn parse(&mut self) -> Result<Sexpr, ParseError> {
        self.skip_trivia();
        match self.peek() {
            None => Err(ParseError::UnexpectedEof { at: self.pos }),
            Some('(') => self.parse_list(),
            Some(')') => Err(ParseError::UnexpectedClose { at: self.pos }),
            Some('"') => self.parse_string(),
            Some(_) => self.parse_atom(),
        }
    }

    fn parse_list(&mut self) -> Result<Sexpr, ParseError> {
        // (start offset, items so far) for every list not yet closed.
        let mut open: Vec<(usize, Vec<Sexpr>)> = Vec::new();

        loop {
            self.skip_trivia();
            let node = match self.peek() {
                Some('(') => {
                    open.push((self.pos, Vec::new()));
                    self.bump();
                    continue;
                }
                Some(')') => {
                    let at = self.pos;
                    self.bump();
                    let Some((start, items)) = open.pop() else {
                        return Err(ParseError::UnexpectedClose { at });
                    };
                    self.finish_list(start, items)
                }
                None if self.lenient => {
                    let Some((start, items)) = open.pop() else {
                        return Err(ParseError::UnexpectedEof { at: self.pos });
                    };
                    self.repair.open_lists += 1;
                    self.finish_list(start, items)
                }
                None => {
                    let start = open.last().map_or(self.pos, |(start, _)| *start);
                    return Err(ParseError::UnclosedList { start });
                }
                Some('"') => self.parse_string()?,
                Some(_) => self.parse_atom()?,
            };

            match open.last_mut() {
                Some((_, items)) => items.push(node),
                None => return Ok(node),
            }
        }
    }

    fn finish_list(&self, start: usize, items: Vec<Sexpr>) -> Sexpr {
        if items.len() >= 1000 {
            log::trace!("Parsed list of {} items at offset {start}", items.len());
        }
        Sexpr::with_span(SexprKind::List(items), Span::new(start, self.pos))
    }

    fn parse_atom(&mut self) -> Result<Sexpr, ParseError> {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() || matches!(ch, '(' | ')' | '"') {
                break;
            }
            self.bump();
        }
        if self.pos == start {
            return Err(ParseError::EmptyAtom { at: start });
        }

        let text = &self.input[start..self.pos];
        let span = Span::new(start, self.pos);
        let kind = if let Ok(n) = text.parse::<i64>() {
            SexprKind::Int(n)
        } else if let Some(f) = parse_float(text) {
            SexprKind::F64(f)
        } else {
            SexprKind::Symbol(text.to_string())
        };
        Ok(Sexpr::with_span(kind, span))
    }

    fn parse_string(&mut self) -> Result<Sexpr, ParseError> {
        let start = self.pos;
        self.bump();
        let mut value = String::new();

        loop {
            match self.peek() {
                None => {
                    self.unterminated_string(start)?;
                    break;
                }
                Some('"') => {
                    self.bump();
                    break;
                }
                Some('\\') => {
                    self.bump();
                    let escaped = match self.peek() {
                        None => {
                            self.unterminated_string(start)?;
                            break;
                        }
                        Some('n') => '\n',
                        Some('r') => '\r',
                        Some('t') => '\t',
                        Some(other) => other,
                    };
                    value.push(escaped);
                    self.bump();
                }
                Some(ch) => {
                    value.push(ch);
                    self.bump();
                }
            }
        }

        Ok(Sexpr::with_span(
            SexprKind::String(value),
            Span::new(start, self.pos),
        ))
    }

    fn unterminated_string(&mut self, start: usize) -> Result<(), ParseError> {
        if !self.lenient {
            return Err(ParseError::UnterminatedString { start });
        }
        self.repair.open_string = Some(start);
        Ok(())
    }

    /// Skip whitespace and `;` line comments.
    fn skip_trivia(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.bump();
            } else if ch == ';' {
                while let Some(ch) = self.peek() {
                    self.bump();
                    if ch == '\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, ch)| *ch)
    }

    fn bump(&mut self) {
        if let Some((pos, ch)) = self.chars.next() {
            self.pos = pos + ch.len_utf8();
        }
    }
}

/// Only accept plain decimal notation; `inf`, `nan` and friends stay symbols.
fn parse_float(text: &str) -> Option<f64> {
    let looks_numeric = text
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E'))
        && text.chars().any(|c| c.is_ascii_digit());
    if looks_numeric {
        text.parse().ok()
    } else {
        None
    }
}

/// Parse a string into an S-expression
pub fn parse(input: &str) -> Result<Sexpr, ParseError> {
    log::trace!("Parsing S-expression from {} bytes of input", input.len());
    let result = Parser::new(input).parse();
    if let Err(e) = &result {
        log::trace!("Failed to parse S-expression: {e}");
    }
    result
}

/// Errors that can occur during parsing. Offsets are byte positions in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    UnexpectedEof { at: usize },
    UnexpectedClose { at: usize },
    UnclosedList { start: usize },
    UnterminatedString { start: usize },
    EmptyAtom { at: usize },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::UnexpectedEof { at } => write!(f, "Unexpected end of input at {at}"),
            ParseError::UnexpectedClose { at } => write!(f, "Unexpected ')' at {at}"),
            ParseError::UnclosedList { start } => write!(f, "Unclosed list starting at {start}"),
            ParseError::UnterminatedString { start } => {
                write!(f, "Unterminated string starting at {start}")
            }
            ParseError::EmptyAtom { at } => write!(f, "Empty atom at {at}"),
        }
    }
}

impl std::error::Error for ParseError {}
