//! The global namespace.
//!
//! One mutable table per interpreter (not per process), keyed by *mangled*
//! symbol: the user-visible name prefixed with `_`. Both registration and
//! lookup mangle, so a script can never reach a host-side name that was not
//! explicitly exposed under the prefix.

use rustc_hash::FxHashMap;

use crate::symbol::SymbolTable;
use crate::value::{SymbolId, Value};

const MANGLE_PREFIX: char = '_';

pub struct Globals {
    table: FxHashMap<SymbolId, Value>,
}

impl Globals {
    pub fn new() -> Self {
        Globals {
            table: FxHashMap::default(),
        }
    }

    /// The mangled symbol for a user-visible one, interning it if new.
    pub fn mangle(symbols: &mut SymbolTable, id: SymbolId) -> SymbolId {
        let mangled = format!("{}{}", MANGLE_PREFIX, symbols.name(id));
        symbols.intern(&mangled)
    }

    /// Look up a user-visible symbol. Does not intern: if the mangled name
    /// was never created, the variable is simply unbound.
    pub fn lookup(&self, symbols: &SymbolTable, id: SymbolId) -> Option<Value> {
        let mangled = format!("{}{}", MANGLE_PREFIX, symbols.name(id));
        let key = symbols.lookup(&mangled)?;
        self.table.get(&key).copied()
    }

    /// Create or overwrite the binding for a user-visible symbol.
    pub fn assign(&mut self, symbols: &mut SymbolTable, id: SymbolId, val: Value) {
        let key = Self::mangle(symbols, id);
        self.table.insert(key, val);
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl Default for Globals {
    fn default() -> Self {
        Self::new()
    }
}
