use rustc_hash::FxHashMap;

use crate::value::SymbolId;

/// Well-known symbol IDs, pre-interned at startup.
/// These must match the order of interning in SymbolTable::new().
pub mod sym {
    use crate::value::SymbolId;

    pub const NIL: SymbolId = SymbolId(0);
    pub const T: SymbolId = SymbolId(1);
    pub const QUOTE: SymbolId = SymbolId(2);
    pub const IF: SymbolId = SymbolId(3);
    pub const FN: SymbolId = SymbolId(4);
    pub const ASSIGN: SymbolId = SymbolId(5);
}

/// Interned symbol table. Each unique symbol name maps to a unique SymbolId,
/// so identity comparison replaces text comparison everywhere downstream.
/// Case-insensitive by default: names are folded to lowercase on intern and
/// lookup unless the table was built case-sensitive.
pub struct SymbolTable {
    name_to_id: FxHashMap<String, SymbolId>,
    id_to_name: Vec<String>,
    case_sensitive: bool,
    temp_counter: u64,
}

impl SymbolTable {
    /// Create a case-insensitive symbol table with all well-known symbols
    /// pre-interned. The order MUST match the constants in `sym` above.
    pub fn new() -> Self {
        Self::with_case_sensitivity(false)
    }

    pub fn with_case_sensitivity(case_sensitive: bool) -> Self {
        let names = ["nil", "t", "quote", "if", "fn", "assign"];

        let mut name_to_id = FxHashMap::default();
        let mut id_to_name = Vec::new();

        for (i, name) in names.iter().enumerate() {
            let id = SymbolId(i as u32);
            name_to_id.insert(name.to_string(), id);
            id_to_name.push(name.to_string());
        }

        SymbolTable {
            name_to_id,
            id_to_name,
            case_sensitive,
            temp_counter: 0,
        }
    }

    fn canonicalize(&self, name: &str) -> String {
        if self.case_sensitive {
            name.to_string()
        } else {
            name.to_lowercase()
        }
    }

    /// Intern a symbol name. Returns the existing ID if already interned,
    /// or creates a new one.
    pub fn intern(&mut self, name: &str) -> SymbolId {
        let canonical = self.canonicalize(name);
        if let Some(&id) = self.name_to_id.get(&canonical) {
            return id;
        }
        let id = SymbolId(self.id_to_name.len() as u32);
        self.name_to_id.insert(canonical.clone(), id);
        self.id_to_name.push(canonical);
        id
    }

    /// Look up a symbol name by its ID.
    pub fn name(&self, id: SymbolId) -> &str {
        &self.id_to_name[id.0 as usize]
    }

    /// Look up a symbol ID by name, without interning.
    pub fn lookup(&self, name: &str) -> Option<SymbolId> {
        self.name_to_id.get(&self.canonicalize(name)).copied()
    }

    /// Total number of interned symbols.
    pub fn count(&self) -> usize {
        self.id_to_name.len()
    }

    /// Generate a symbol guaranteed distinct from every previously interned
    /// symbol, for future macro expansion. The generated name contains a
    /// space and starts with a digit, so the reader can never produce it.
    /// (It can still be forged by interning the same text by hand; that is
    /// out of scope.)
    pub fn temporary(&mut self) -> SymbolId {
        loop {
            let name = format!("{}*** temporary", self.temp_counter);
            self.temp_counter += 1;
            if !self.name_to_id.contains_key(&name) {
                return self.intern(&name);
            }
        }
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn intern_is_idempotent() {
        let mut table = SymbolTable::new();
        let a = table.intern("foo");
        let b = table.intern("foo");
        assert_eq!(a, b);
        assert_eq!(table.name(a), "foo");
    }

    #[test]
    fn intern_case_folds_by_default() {
        let mut table = SymbolTable::new();
        let a = table.intern("Foo");
        let b = table.intern("FOO");
        assert_eq!(a, b);
        assert_eq!(table.name(a), "foo");
    }

    #[test]
    fn case_sensitive_table_distinguishes() {
        let mut table = SymbolTable::with_case_sensitivity(true);
        let a = table.intern("Foo");
        let b = table.intern("foo");
        assert_ne!(a, b);
    }

    #[test]
    fn well_known_symbols_are_preinterned() {
        let table = SymbolTable::new();
        assert_eq!(table.lookup("nil"), Some(sym::NIL));
        assert_eq!(table.lookup("t"), Some(sym::T));
        assert_eq!(table.lookup("quote"), Some(sym::QUOTE));
        assert_eq!(table.lookup("if"), Some(sym::IF));
        assert_eq!(table.lookup("fn"), Some(sym::FN));
        assert_eq!(table.lookup("assign"), Some(sym::ASSIGN));
    }

    #[test]
    fn temporaries_are_unique() {
        let mut table = SymbolTable::new();
        let a = table.temporary();
        let b = table.temporary();
        assert_ne!(a, b);
        assert!(table.name(a).contains("*** temporary"));
    }
}
