//! Splits library text into top-level `(symbol ...)` blocks.
//!
//! The scanner counts parentheses from each `(symbol` marker until the depth
//! returns to zero. It does not tokenize, so by default a parenthesis inside a
//! quoted name (`"A(1)"`) shifts the block boundary. [`ScanOptions::quote_aware`]
//! opts into skipping quoted text while counting.

use std::iter::FusedIterator;

use symdex_sexpr::Span;

/// Literal that opens a symbol definition.
pub const SYMBOL_MARKER: &str = "(symbol";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanOptions {
    /// Ignore `(` and `)` inside `"..."` while tracking depth.
    pub quote_aware: bool,
}

/// One balanced block, borrowed from the scanned source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block<'a> {
    pub text: &'a str,
    pub span: Span,
}

/// Lazy iterator over the top-level symbol blocks of `source`.
///
/// Cloning the scanner (or building a new one) restarts the scan.
#[derive(Debug, Clone)]
pub struct BlockScanner<'a> {
    source: &'a str,
    cursor: usize,
    options: ScanOptions,
    unterminated_at: Option<usize>,
}

impl<'a> BlockScanner<'a> {
    pub fn new(source: &'a str) -> Self {
        Self::with_options(source, ScanOptions::default())
    }

    pub fn with_options(source: &'a str, options: ScanOptions) -> Self {
        Self {
            source,
            cursor: 0,
            options,
            unterminated_at: None,
        }
    }

    /// Offset of a trailing block that never closed, once the scan reached it.
    pub fn unterminated_at(&self) -> Option<usize> {
        self.unterminated_at
    }
}

impl<'a> Iterator for BlockScanner<'a> {
    type Item = Block<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = &self.source[self.cursor..];
        let Some(found) = rest.find(SYMBOL_MARKER) else {
            self.cursor = self.source.len();
            return None;
        };
        let start = self.cursor + found;

        match block_end(self.source.as_bytes(), start, self.options) {
            Some(end) => {
                self.cursor = end;
                Some(Block {
                    text: &self.source[start..end],
                    span: Span::new(start, end),
                })
            }
            None => {
                log::warn!("Dropping unterminated symbol block at offset {start}");
                self.unterminated_at = Some(start);
                self.cursor = self.source.len();
                None
            }
        }
    }
}

impl FusedIterator for BlockScanner<'_> {}

/// Exclusive end offset of the block opened by the `(` at `start`.
///
/// Delimiters are ASCII, so walking bytes never splits a multi-byte character
/// at a reported boundary.
fn block_end(bytes: &[u8], start: usize, options: ScanOptions) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &byte) in bytes[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
            continue;
        }

        match byte {
            b'"' if options.quote_aware => in_string = true,
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(start + offset + 1);
                }
            }
            _ => {}
        }
    }
    None
}
