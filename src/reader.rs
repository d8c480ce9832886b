//! Incremental s-expression reader.
//!
//! A character-at-a-time state machine. `feed` may be called any number of
//! times with successive chunks of input (a line from a terminal, a socket
//! read, a whole file); all state persists between calls and each call
//! returns the top-level forms completed by that chunk. `terminate`
//! consumes the reader, flushing a trailing token and rejecting any
//! structure still open.

use crate::error::{LarkError, LarkResult};
use crate::heap::Heap;
use crate::literal;
use crate::symbol::SymbolTable;
use crate::value::{PairId, Value};

/// The reader's special-character classes. Each field is a set of
/// characters; membership is what matters, not order.
pub struct ReaderConfig {
    pub comment_begin: String,
    pub comment_end: String,
    pub separator: String,
    pub paren_begin: String,
    pub paren_end: String,
    pub quote: String,
    pub escape: String,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        ReaderConfig {
            comment_begin: ";".into(),
            comment_end: "\n".into(),
            separator: " \t\n\r".into(),
            paren_begin: "(".into(),
            paren_end: ")".into(),
            quote: "\"".into(),
            escape: "\\".into(),
        }
    }
}

/// A list under construction: head of the chain plus its last cell, so
/// elements are appended destructively in input order with no reversal pass.
struct ListBuild {
    head: Value,
    tail: Option<PairId>,
}

impl ListBuild {
    fn empty() -> Self {
        ListBuild {
            head: Value::Nil,
            tail: None,
        }
    }
}

pub struct Reader {
    config: ReaderConfig,
    /// Union of all special classes, precomputed.
    special: String,
    in_comment: bool,
    in_quote: bool,
    in_escape: bool,
    /// Partially accumulated token.
    buf: String,
    /// Open lists, innermost last.
    stack: Vec<ListBuild>,
    /// Absolute character offset across all feed calls, for error positions.
    offset: usize,
}

impl Reader {
    pub fn new() -> Self {
        Self::with_config(ReaderConfig::default())
    }

    pub fn with_config(config: ReaderConfig) -> Self {
        let mut special = String::new();
        special.push_str(&config.comment_begin);
        special.push_str(&config.separator);
        special.push_str(&config.paren_begin);
        special.push_str(&config.paren_end);
        special.push_str(&config.quote);
        special.push_str(&config.escape);
        Reader {
            config,
            special,
            in_comment: false,
            in_quote: false,
            in_escape: false,
            buf: String::new(),
            stack: Vec::new(),
            offset: 0,
        }
    }

    /// True while a list or a string is still open, i.e. more input is
    /// needed before the current top-level form can complete.
    pub fn is_open(&self) -> bool {
        !self.stack.is_empty() || self.in_quote
    }

    /// Feed the next chunk of input. Returns the top-level forms this chunk
    /// completed, in input order.
    pub fn feed(
        &mut self,
        text: &str,
        heap: &mut Heap,
        symbols: &mut SymbolTable,
    ) -> LarkResult<Vec<Value>> {
        let mut out = Vec::new();
        for c in text.chars() {
            self.step(c, heap, symbols, &mut out)?;
            self.offset += 1;
        }
        Ok(out)
    }

    /// One transition of the state machine. The cases are checked in strict
    /// priority order; `in_escape` defeats every special meaning of the
    /// next character, including inside strings.
    fn step(
        &mut self,
        c: char,
        heap: &mut Heap,
        symbols: &mut SymbolTable,
        out: &mut Vec<Value>,
    ) -> LarkResult<()> {
        if self.in_comment {
            self.in_comment = !self.config.comment_end.contains(c);
            return Ok(());
        }
        if self.in_escape || !self.special.contains(c) {
            self.buf.push(c);
            self.in_escape = false;
            return Ok(());
        }
        if self.config.escape.contains(c) {
            self.in_escape = true;
            return Ok(());
        }
        if self.in_quote && !self.config.quote.contains(c) {
            // whitespace and parens are ordinary characters inside a string
            self.buf.push(c);
            return Ok(());
        }

        // c is a delimiter: first close the pending token, if any.
        if !self.buf.is_empty() {
            let value = if self.in_quote {
                if !self.config.quote.contains(c) {
                    return Err(LarkError::IllegalClosingQuote(self.offset));
                }
                // raw string, no classification
                Value::Str(heap.alloc_str(std::mem::take(&mut self.buf)))
            } else {
                let token = std::mem::take(&mut self.buf);
                literal::classify(&token, symbols)?
            };
            self.emit(value, heap, out)?;
        }

        // Then act on the delimiter itself.
        if self.config.comment_begin.contains(c) {
            self.in_comment = true;
        } else if self.config.quote.contains(c) {
            self.in_quote = !self.in_quote;
        } else if self.config.paren_begin.contains(c) {
            self.stack.push(ListBuild::empty());
        } else if self.config.paren_end.contains(c) {
            let finished = self
                .stack
                .pop()
                .ok_or(LarkError::StrayClosingParen(self.offset))?;
            self.emit(finished.head, heap, out)?;
        }
        Ok(())
    }

    /// Route a completed value: append it to the innermost open list, or
    /// hand it to the caller as a finished top-level form.
    fn emit(&mut self, value: Value, heap: &mut Heap, out: &mut Vec<Value>) -> LarkResult<()> {
        if !self.append_to_open(value, heap)? {
            tracing::trace!(?value, "top-level form complete");
            out.push(value);
        }
        Ok(())
    }

    /// Destructively append to the innermost open list. Returns false if no
    /// list is open.
    fn append_to_open(&mut self, value: Value, heap: &mut Heap) -> LarkResult<bool> {
        let open = match self.stack.last_mut() {
            Some(open) => open,
            None => return Ok(false),
        };
        let cell = heap.alloc(value, Value::Nil)?;
        match open.tail {
            Some(tail) => heap.set_cdr(tail, Value::Pair(cell)),
            None => open.head = Value::Pair(cell),
        }
        open.tail = Some(cell);
        Ok(true)
    }

    /// Signal end of input. Flushes a trailing buffered token; an open
    /// string or open list is a premature-EOF error carrying the partial
    /// structure for diagnostics. Consuming `self` makes feeding after
    /// termination unrepresentable.
    pub fn terminate(
        mut self,
        heap: &mut Heap,
        symbols: &mut SymbolTable,
    ) -> LarkResult<Option<Value>> {
        if self.in_quote {
            let partial = Value::Str(heap.alloc_str(std::mem::take(&mut self.buf)));
            return Err(LarkError::PrematureEof {
                pos: self.offset,
                partial,
            });
        }
        if !self.stack.is_empty() {
            if !self.buf.is_empty() {
                let token = std::mem::take(&mut self.buf);
                let value = literal::classify(&token, symbols)?;
                self.append_to_open(value, heap)?;
            }
            // Fold the open lists into their parents so the diagnostic
            // carries the whole partial tree.
            while self.stack.len() > 1 {
                let child = match self.stack.pop() {
                    Some(child) => child,
                    None => break,
                };
                self.append_to_open(child.head, heap)?;
            }
            let partial = self.stack.pop().map(|b| b.head).unwrap_or(Value::Nil);
            return Err(LarkError::PrematureEof {
                pos: self.offset,
                partial,
            });
        }
        if !self.buf.is_empty() {
            let token = std::mem::take(&mut self.buf);
            return literal::classify(&token, symbols).map(Some);
        }
        Ok(None)
    }
}

impl Default for Reader {
    fn default() -> Self {
        Self::new()
    }
}

/// Read every form in a string with a throwaway reader.
pub fn read_str(
    input: &str,
    heap: &mut Heap,
    symbols: &mut SymbolTable,
) -> LarkResult<Vec<Value>> {
    let mut reader = Reader::new();
    let mut forms = reader.feed(input, heap, symbols)?;
    if let Some(trailing) = reader.terminate(heap, symbols)? {
        forms.push(trailing);
    }
    Ok(forms)
}
