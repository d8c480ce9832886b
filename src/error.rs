use thiserror::Error;

use crate::value::Value;

/// Errors surfaced by the reader and the evaluator. All of them are fatal
/// to the top-level form in progress; nothing is recovered internally.
#[derive(Debug, Clone, Error)]
pub enum LarkError {
    /// Reader saw `)` with no matching open list. Carries the character
    /// offset of the offending parenthesis.
    #[error("stray closing parenthesis at offset {0}")]
    StrayClosingParen(usize),

    /// Reader expected the quote character to close a string but saw some
    /// other delimiter.
    #[error("illegal closing quote at offset {0}")]
    IllegalClosingQuote(usize),

    /// `terminate()` was called with an open list or an open string.
    /// `partial` is the partially built structure, for diagnostics only.
    #[error("premature end of input at offset {pos}")]
    PrematureEof { pos: usize, partial: Value },

    /// A `#\`-prefixed token named neither a known escape nor exactly one
    /// character.
    #[error("illegal character literal: {0}")]
    IllegalCharLiteral(String),

    /// The evaluator was handed something matching no dispatch case.
    #[error("bad object in expression: {0}")]
    BadObject(String),

    /// Symbol found in no active frame and not in the global namespace.
    #[error("unbound variable '{0}'")]
    Unbound(String),

    /// Assignment targeted `nil` or `t`.
    #[error("cannot rebind constant '{0}'")]
    CannotRebindConstant(String),

    /// Assignment's left-hand side was not a bare symbol.
    #[error("assignment target is not a symbol: {0}")]
    AssignTargetNotSymbol(String),

    /// A function literal's parameter list was neither a flat list of
    /// symbols nor a single capturing symbol.
    #[error("unsupported parameter shape: {0}")]
    UnsupportedParams(String),

    /// Head of an application evaluated to a non-callable value.
    #[error("not callable: {0}")]
    NotCallable(String),

    /// car/cdr of a non-nil atom, arithmetic on a non-number, and the like.
    #[error("type error: {0}")]
    TypeError(String),

    /// Wrong number of arguments to a fixed-arity native function.
    #[error("{name} takes {expected} argument(s), got {got}")]
    NativeArity {
        name: &'static str,
        expected: usize,
        got: usize,
    },

    /// Cons-cell arena capacity exceeded.
    #[error("heap capacity exceeded")]
    HeapOverflow,
}

pub type LarkResult<T> = Result<T, LarkError>;
