//! Value printer. For trees of symbols, literals and proper lists the
//! output reads back to an equivalent structure.

use crate::heap::Heap;
use crate::symbol::SymbolTable;
use crate::value::Value;

/// Characters that must be backslash-escaped inside a printed symbol so the
/// reader treats them as ordinary. Mirrors the reader's special set.
const SYMBOL_ESCAPES: &str = "; \t\n\r()\"\\";

/// Print a value to a string.
pub fn print_val(val: Value, heap: &Heap, symbols: &SymbolTable) -> String {
    let mut out = String::new();
    print_inner(val, heap, symbols, &mut out, 0);
    out
}

fn print_inner(val: Value, heap: &Heap, symbols: &SymbolTable, out: &mut String, depth: usize) {
    if depth > 1000 {
        out.push_str("...");
        return;
    }

    match val {
        Value::Nil => out.push_str("nil"),
        Value::Bool(true) => out.push_str("#t"),
        Value::Bool(false) => out.push_str("#f"),
        Value::Int(n) => out.push_str(&n.to_string()),
        // Debug form keeps a decimal point or exponent, so the literal
        // classifier reads it back as a float.
        Value::Float(x) => out.push_str(&format!("{:?}", x)),
        Value::Char(c) => {
            // The token must carry a literal backslash after '#', which in
            // source text means an escaped one.
            out.push_str("#\\\\");
            match c {
                '\n' => out.push_str("newline"),
                ' ' => out.push_str("space"),
                '\r' => out.push_str("return"),
                '\t' => out.push_str("tab"),
                other => out.push(other),
            }
        }
        Value::Str(id) => {
            out.push('"');
            for c in heap.str_content(id).chars() {
                if c == '"' || c == '\\' {
                    out.push('\\');
                }
                out.push(c);
            }
            out.push('"');
        }
        Value::Symbol(id) => {
            for c in symbols.name(id).chars() {
                if SYMBOL_ESCAPES.contains(c) {
                    out.push('\\');
                }
                out.push(c);
            }
        }
        Value::Closure(_) => out.push_str("#<fn>"),
        Value::Native(_) => out.push_str("#<builtin>"),
        Value::Pair(id) => {
            out.push('(');
            print_inner(heap.car(id), heap, symbols, out, depth + 1);
            let mut current = heap.cdr(id);
            loop {
                match current {
                    Value::Nil => break,
                    Value::Pair(pid) => {
                        out.push(' ');
                        print_inner(heap.car(pid), heap, symbols, out, depth + 1);
                        current = heap.cdr(pid);
                    }
                    other => {
                        out.push_str(" . ");
                        print_inner(other, heap, symbols, out, depth + 1);
                        break;
                    }
                }
            }
            out.push(')');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::read_str;
    use pretty_assertions::assert_eq;

    struct Fixture {
        heap: Heap,
        symbols: SymbolTable,
    }

    impl Fixture {
        fn new() -> Self {
            Fixture {
                heap: Heap::new(1 << 16),
                symbols: SymbolTable::new(),
            }
        }

        fn print_of(&mut self, src: &str) -> String {
            let forms = read_str(src, &mut self.heap, &mut self.symbols).unwrap();
            print_val(forms[0], &self.heap, &self.symbols)
        }
    }

    #[test]
    fn atoms() {
        let mut fx = Fixture::new();
        assert_eq!(fx.print_of("nil"), "nil");
        assert_eq!(fx.print_of("42"), "42");
        assert_eq!(fx.print_of("0.5"), "0.5");
        assert_eq!(fx.print_of("#t"), "#t");
        assert_eq!(fx.print_of("foo"), "foo");
    }

    #[test]
    fn floats_read_back_as_floats() {
        let mut fx = Fixture::new();
        let printed = fx.print_of("1.0");
        assert_eq!(printed, "1.0");
        let reread = read_str(&printed, &mut fx.heap, &mut fx.symbols).unwrap();
        assert_eq!(reread[0], Value::Float(1.0));
    }

    #[test]
    fn lists_and_dotted_pairs() {
        let mut fx = Fixture::new();
        assert_eq!(fx.print_of("(a b c)"), "(a b c)");
        assert_eq!(fx.print_of("(a (b) ())"), "(a (b) nil)");
        let a = fx.symbols.intern("a");
        let pair = fx.heap.alloc(Value::Symbol(a), Value::Int(1)).unwrap();
        assert_eq!(
            print_val(Value::Pair(pair), &fx.heap, &fx.symbols),
            "(a . 1)"
        );
    }

    #[test]
    fn strings_are_quoted_and_escaped() {
        let mut fx = Fixture::new();
        let id = fx.heap.alloc_str("say \"hi\"".into());
        assert_eq!(
            print_val(Value::Str(id), &fx.heap, &fx.symbols),
            "\"say \\\"hi\\\"\""
        );
    }

    #[test]
    fn symbols_with_special_characters_are_escaped() {
        let mut fx = Fixture::new();
        let id = fx.symbols.intern("a b");
        let printed = print_val(Value::Symbol(id), &fx.heap, &fx.symbols);
        assert_eq!(printed, "a\\ b");
        let reread = read_str(&printed, &mut fx.heap, &mut fx.symbols).unwrap();
        assert_eq!(reread[0], Value::Symbol(id));
    }

    #[test]
    fn char_literals_read_back() {
        let mut fx = Fixture::new();
        let printed = print_val(Value::Char('\n'), &fx.heap, &fx.symbols);
        assert_eq!(printed, "#\\\\newline");
        let reread = read_str(&printed, &mut fx.heap, &mut fx.symbols).unwrap();
        assert_eq!(reread[0], Value::Char('\n'));
    }
}
