use std::fmt;

/// Unique identifier for an interned symbol.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolId(pub u32);

/// Index into the cons-cell heap.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PairId(pub u32);

/// Index into the heap's string arena.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct StrId(pub u32);

/// Index into the interpreter's closure table.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClosureId(pub u32);

/// Index into the interpreter's native-function table.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeId(pub u32);

/// The fundamental Lark value: discriminant + payload, Copy semantics.
/// Compound data (pairs, strings, closures) lives in arenas and is
/// addressed by index, so structural sharing is the default.
///
/// `Nil` is simultaneously the empty list, false, and "absent". Equality
/// on handles is identity; use `Heap::deep_eq` for structural comparison.
#[derive(Clone, Copy, PartialEq)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Char(char),
    Str(StrId),
    Symbol(SymbolId),
    Pair(PairId),
    Closure(ClosureId),
    Native(NativeId),
}

impl Value {
    pub fn is_nil(self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn is_pair(self) -> bool {
        matches!(self, Value::Pair(_))
    }

    pub fn is_symbol(self) -> bool {
        matches!(self, Value::Symbol(_))
    }

    /// The universal falsity test: only `nil` and `#f` are false.
    /// Everything else, including `0` and `""`, is true.
    pub fn is_false(self) -> bool {
        matches!(self, Value::Nil | Value::Bool(false))
    }

    pub fn as_pair(self) -> Option<PairId> {
        match self {
            Value::Pair(id) => Some(id),
            _ => None,
        }
    }

    pub fn as_symbol(self) -> Option<SymbolId> {
        match self {
            Value::Symbol(id) => Some(id),
            _ => None,
        }
    }

    /// Returns true if this value is an atom (not a pair).
    pub fn is_atom(self) -> bool {
        !self.is_pair()
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "Nil"),
            Value::Bool(b) => write!(f, "Bool({})", b),
            Value::Int(n) => write!(f, "Int({})", n),
            Value::Float(x) => write!(f, "Float({:?})", x),
            Value::Char(c) => write!(f, "Char({:?})", c),
            Value::Str(id) => write!(f, "Str({})", id.0),
            Value::Symbol(id) => write!(f, "Sym({})", id.0),
            Value::Pair(id) => write!(f, "Pair({})", id.0),
            Value::Closure(id) => write!(f, "Closure({})", id.0),
            Value::Native(id) => write!(f, "Native({})", id.0),
        }
    }
}

impl fmt::Debug for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SymbolId({})", self.0)
    }
}

impl fmt::Debug for PairId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PairId({})", self.0)
    }
}

impl fmt::Debug for StrId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StrId({})", self.0)
    }
}

impl fmt::Debug for ClosureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClosureId({})", self.0)
    }
}

impl fmt::Debug for NativeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeId({})", self.0)
    }
}
