//! Literal classification for closed reader tokens.
//!
//! Invoked when the reader closes a token outside a quoted string. Trial
//! order, first match wins: boolean, character literal, integer, float,
//! symbol. Strings never pass through here.

use crate::error::{LarkError, LarkResult};
use crate::symbol::{sym, SymbolTable};
use crate::value::Value;

/// Named character escapes accepted after the `#\` prefix.
fn named_char(name: &str) -> Option<char> {
    match name {
        "newline" => Some('\n'),
        "space" => Some(' '),
        "return" => Some('\r'),
        "tab" => Some('\t'),
        _ => None,
    }
}

/// Classify a raw token into a typed value.
///
/// The token `nil` classifies as the empty-list constant itself, not as a
/// symbol, so downstream identity checks against `Value::Nil` suffice.
pub fn classify(token: &str, symbols: &mut SymbolTable) -> LarkResult<Value> {
    match token {
        "#t" => return Ok(Value::Bool(true)),
        "#f" => return Ok(Value::Bool(false)),
        _ => {}
    }

    if let Some(rest) = token.strip_prefix("#\\") {
        if let Some(c) = named_char(rest) {
            return Ok(Value::Char(c));
        }
        let mut chars = rest.chars();
        return match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(Value::Char(c)),
            _ => Err(LarkError::IllegalCharLiteral(token.to_string())),
        };
    }

    if let Ok(n) = token.parse::<i64>() {
        return Ok(Value::Int(n));
    }

    // The digit guard keeps words like "inf" symbols rather than floats.
    if token.bytes().any(|b| b.is_ascii_digit()) {
        if let Ok(x) = token.parse::<f64>() {
            return Ok(Value::Float(x));
        }
    }

    let id = symbols.intern(token);
    if id == sym::NIL {
        return Ok(Value::Nil);
    }
    Ok(Value::Symbol(id))
}
