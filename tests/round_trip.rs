//! Property tests: printing a tree and reading the text back yields an
//! equivalent tree.

use proptest::prelude::*;

use lark::heap::Heap;
use lark::printer::print_val;
use lark::reader::read_str;
use lark::symbol::{sym, SymbolTable};
use lark::value::Value;

/// A heap-independent description of a value, so proptest can generate and
/// shrink trees before any interpreter state exists.
#[derive(Debug, Clone)]
enum Tree {
    Bool(bool),
    Int(i64),
    Float(f64),
    Sym(String),
    Str(String),
    List(Vec<Tree>),
}

fn leaf() -> impl Strategy<Value = Tree> {
    prop_oneof![
        any::<bool>().prop_map(Tree::Bool),
        any::<i64>().prop_map(Tree::Int),
        (prop::num::f64::NORMAL | prop::num::f64::ZERO).prop_map(Tree::Float),
        "[a-z][a-z0-9-]{0,7}".prop_map(Tree::Sym),
        // Nonempty: a bare "" token is dropped by the reader.
        "[a-zA-Z0-9 .!?]{1,12}".prop_map(Tree::Str),
    ]
}

fn tree() -> impl Strategy<Value = Tree> {
    leaf().prop_recursive(3, 32, 6, |inner| {
        prop::collection::vec(inner, 0..6).prop_map(Tree::List)
    })
}

fn build(tree: &Tree, heap: &mut Heap, symbols: &mut SymbolTable) -> Value {
    match tree {
        Tree::Bool(b) => Value::Bool(*b),
        Tree::Int(n) => Value::Int(*n),
        Tree::Float(x) => Value::Float(*x),
        Tree::Sym(name) => {
            let id = symbols.intern(name);
            if id == sym::NIL {
                Value::Nil
            } else {
                Value::Symbol(id)
            }
        }
        Tree::Str(s) => Value::Str(heap.alloc_str(s.clone())),
        Tree::List(items) => {
            let vals: Vec<Value> = items
                .iter()
                .map(|t| build(t, heap, symbols))
                .collect();
            heap.list(&vals).unwrap()
        }
    }
}

proptest! {
    #[test]
    fn print_then_read_is_identity(t in tree()) {
        let mut heap = Heap::new(1 << 20);
        let mut symbols = SymbolTable::new();

        let original = build(&t, &mut heap, &mut symbols);
        let printed = print_val(original, &heap, &symbols);
        let reread = read_str(&printed, &mut heap, &mut symbols)
            .expect("printed form should parse");

        prop_assert_eq!(reread.len(), 1, "printed: {}", printed);
        prop_assert!(
            heap.deep_eq(original, reread[0]),
            "printed: {} reread as: {}",
            printed,
            print_val(reread[0], &heap, &symbols)
        );
    }

    #[test]
    fn reading_never_panics_on_arbitrary_ascii(src in "[ -~\n\t]{0,64}") {
        let mut heap = Heap::new(1 << 20);
        let mut symbols = SymbolTable::new();
        let _ = read_str(&src, &mut heap, &mut symbols);
    }
}
