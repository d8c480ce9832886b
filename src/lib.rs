//! Lark: an incremental s-expression reader and a tree-walking evaluator
//! for a small Arc-flavored Lisp.
//!
//! The reader (`reader::Reader`) consumes raw text one chunk at a time and
//! produces expression trees; the evaluator (`eval::Interp`) executes one
//! tree against a chain of lexical frames plus a per-interpreter global
//! namespace. Everything is single-threaded and synchronous.

pub mod builtins;
pub mod error;
pub mod eval;
pub mod globals;
pub mod heap;
pub mod literal;
pub mod printer;
pub mod reader;
pub mod symbol;
pub mod value;

pub use error::{LarkError, LarkResult};
pub use value::Value;
