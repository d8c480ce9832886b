//! The tree-walking evaluator.
//!
//! A single classification step turns an expression into a closed `Form`
//! union, then an exhaustive match dispatches. Evaluation is synchronous
//! and recursive; a runaway recursion exhausts the host stack rather than
//! producing a controlled error.

use rustc_hash::FxHashMap;
use tracing::trace;

use crate::builtins;
use crate::error::{LarkError, LarkResult};
use crate::globals::Globals;
use crate::heap::Heap;
use crate::printer;
use crate::symbol::{sym, SymbolTable};
use crate::value::{ClosureId, NativeId, SymbolId, Value};

/// One scope level: symbol to value.
pub type Frame = FxHashMap<SymbolId, Value>;

/// A chain of lexical frames, innermost last. Frames shadow outer frames
/// and the global namespace.
pub struct Env {
    frames: Vec<Frame>,
}

impl Env {
    pub fn new() -> Self {
        Env { frames: Vec::new() }
    }

    pub fn push_frame(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    pub fn lookup(&self, id: SymbolId) -> Option<Value> {
        self.frames.iter().rev().find_map(|f| f.get(&id).copied())
    }

    /// Overwrite the innermost existing binding. Returns false if the
    /// symbol is bound in no frame.
    fn assign_existing(&mut self, id: SymbolId, val: Value) -> bool {
        for frame in self.frames.iter_mut().rev() {
            if let Some(slot) = frame.get_mut(&id) {
                *slot = val;
                return true;
            }
        }
        false
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}

/// A native function exposed to user code.
pub type NativeFn = fn(&mut Interp, &[Value]) -> LarkResult<Value>;

pub struct NativeEntry {
    pub name: &'static str,
    pub func: NativeFn,
}

/// Parameter shapes a function literal may declare. Anything richer
/// (optionals, destructuring) is rejected when the closure is built.
#[derive(Clone)]
enum ParamSpec {
    /// Flat list of symbols, bound positionally.
    Flat(Vec<SymbolId>),
    /// One symbol bound to the whole argument list.
    Rest(SymbolId),
}

#[derive(Clone)]
struct ClosureData {
    params: ParamSpec,
    /// Proper list of body expressions.
    body: Value,
    /// Snapshot of the defining environment, taken at creation time.
    captured: Vec<Frame>,
}

/// The closed union of expression shapes.
enum Form {
    SelfEval(Value),
    Variable(SymbolId),
    Quote(Value),
    If(Value),
    FnLiteral { params: Value, body: Value },
    Assign(Value),
    Application { head: Value, args: Value },
}

const DEFAULT_HEAP_CAPACITY: usize = 1 << 22;

/// One evaluation context: heap, symbols, globals, closures and natives.
/// Independent `Interp`s share nothing, so tests and embeddings can run
/// side by side.
pub struct Interp {
    pub heap: Heap,
    pub symbols: SymbolTable,
    pub globals: Globals,
    closures: Vec<ClosureData>,
    natives: Vec<NativeEntry>,
}

impl Interp {
    /// An interpreter with the standard exposure table installed.
    pub fn new() -> Self {
        Self::with_heap_capacity(DEFAULT_HEAP_CAPACITY)
    }

    pub fn with_heap_capacity(capacity: usize) -> Self {
        let mut interp = Interp {
            heap: Heap::new(capacity),
            symbols: SymbolTable::new(),
            globals: Globals::new(),
            closures: Vec::new(),
            natives: Vec::new(),
        };
        builtins::install(&mut interp);
        interp
    }

    /// Expose a value to user code under `name` (mangled).
    pub fn expose(&mut self, name: &str, val: Value) {
        let id = self.symbols.intern(name);
        self.globals.assign(&mut self.symbols, id, val);
    }

    /// Register a native function and expose it under `name`.
    pub fn expose_native(&mut self, name: &'static str, func: NativeFn) {
        let id = NativeId(self.natives.len() as u32);
        self.natives.push(NativeEntry { name, func });
        self.expose(name, Value::Native(id));
    }

    pub fn native_name(&self, id: NativeId) -> &'static str {
        self.natives[id.0 as usize].name
    }

    /// Render a value for output and error messages.
    pub fn display(&self, val: Value) -> String {
        printer::print_val(val, &self.heap, &self.symbols)
    }

    // ========================================================================
    // Core evaluation
    // ========================================================================

    /// Evaluate one expression tree against an environment.
    pub fn eval(&mut self, expr: Value, env: &mut Env) -> LarkResult<Value> {
        trace!(expr = %self.display(expr), "eval");
        match self.classify_form(expr)? {
            Form::SelfEval(v) => Ok(v),
            Form::Variable(id) => self.var_ref(id, env),
            Form::Quote(x) => Ok(x),
            Form::If(clauses) => self.eval_if(clauses, env),
            Form::FnLiteral { params, body } => self.make_closure(params, body, env),
            Form::Assign(pairs) => self.eval_assign(pairs, env),
            Form::Application { head, args } => self.eval_call(head, args, env),
        }
    }

    /// The single classification step over expression shape.
    fn classify_form(&self, expr: Value) -> LarkResult<Form> {
        match expr {
            Value::Nil
            | Value::Bool(_)
            | Value::Int(_)
            | Value::Float(_)
            | Value::Char(_)
            | Value::Str(_) => Ok(Form::SelfEval(expr)),
            Value::Symbol(id) => {
                if id == sym::T {
                    Ok(Form::SelfEval(expr))
                } else {
                    Ok(Form::Variable(id))
                }
            }
            Value::Pair(pid) => {
                let head = self.heap.car(pid);
                let args = self.heap.cdr(pid);
                if let Value::Symbol(h) = head {
                    if h == sym::QUOTE {
                        return Ok(Form::Quote(self.heap.car_val(args)?));
                    }
                    if h == sym::IF {
                        return Ok(Form::If(args));
                    }
                    if h == sym::FN {
                        return Ok(Form::FnLiteral {
                            params: self.heap.car_val(args)?,
                            body: self.heap.cdr_val(args)?,
                        });
                    }
                    if h == sym::ASSIGN {
                        return Ok(Form::Assign(args));
                    }
                }
                Ok(Form::Application { head, args })
            }
            // Function objects are values, not source.
            Value::Closure(_) | Value::Native(_) => {
                Err(LarkError::BadObject(self.display(expr)))
            }
        }
    }

    /// Frames innermost to outermost, then the mangled name in globals.
    /// No implicit nil default: absence is fatal.
    fn var_ref(&mut self, id: SymbolId, env: &Env) -> LarkResult<Value> {
        if let Some(v) = env.lookup(id) {
            return Ok(v);
        }
        self.globals
            .lookup(&self.symbols, id)
            .ok_or_else(|| LarkError::Unbound(self.symbols.name(id).to_string()))
    }

    /// `(if t1 e1 t2 e2 ... else)` — walk the flat clause list two at a
    /// time; a lone trailing element is the unconditional else branch.
    fn eval_if(&mut self, mut clauses: Value, env: &mut Env) -> LarkResult<Value> {
        while let Value::Pair(pid) = clauses {
            let test = self.heap.car(pid);
            let rest = self.heap.cdr(pid);
            let rest_pid = match rest {
                Value::Nil => return self.eval(test, env),
                Value::Pair(p) => p,
                _ => return Err(LarkError::BadObject("improper if form".into())),
            };
            if !self.eval(test, env)?.is_false() {
                let then = self.heap.car(rest_pid);
                return self.eval(then, env);
            }
            clauses = self.heap.cdr(rest_pid);
        }
        Ok(Value::Nil)
    }

    /// `(fn params body...)` — capture a snapshot of the current frames.
    fn make_closure(&mut self, params: Value, body: Value, env: &Env) -> LarkResult<Value> {
        let spec = self.parse_params(params)?;
        if !self.heap.is_proper_list(body) {
            return Err(LarkError::BadObject("function body is not a proper list".into()));
        }
        let id = ClosureId(self.closures.len() as u32);
        self.closures.push(ClosureData {
            params: spec,
            body,
            captured: env.frames.clone(),
        });
        Ok(Value::Closure(id))
    }

    fn parse_params(&self, params: Value) -> LarkResult<ParamSpec> {
        match params {
            Value::Nil => Ok(ParamSpec::Flat(Vec::new())),
            Value::Symbol(id) => Ok(ParamSpec::Rest(id)),
            Value::Pair(_) => {
                let mut names = Vec::new();
                let mut cur = params;
                while let Value::Pair(pid) = cur {
                    match self.heap.car(pid) {
                        Value::Symbol(id) => names.push(id),
                        other => {
                            return Err(LarkError::UnsupportedParams(self.display(other)))
                        }
                    }
                    cur = self.heap.cdr(pid);
                }
                if !cur.is_nil() {
                    return Err(LarkError::UnsupportedParams(self.display(params)));
                }
                Ok(ParamSpec::Flat(names))
            }
            other => Err(LarkError::UnsupportedParams(self.display(other))),
        }
    }

    /// `(assign tgt val ...)` — pairs left to right, value evaluated before
    /// the target is touched. A binding in some active frame is mutated in
    /// place; otherwise the mangled name goes to the global namespace, so
    /// local shadowing always wins over introducing a new global.
    fn eval_assign(&mut self, mut pairs: Value, env: &mut Env) -> LarkResult<Value> {
        let mut result = Value::Nil;
        while let Value::Pair(pid) = pairs {
            let target = self.heap.car(pid);
            let rest = self.heap.cdr(pid);
            // a trailing lone target assigns nil
            let (value_expr, next) = match rest {
                Value::Pair(rp) => (self.heap.car(rp), self.heap.cdr(rp)),
                _ => (Value::Nil, Value::Nil),
            };
            let value = self.eval(value_expr, env)?;
            let id = match target {
                Value::Nil => return Err(LarkError::CannotRebindConstant("nil".into())),
                Value::Symbol(id) if id == sym::NIL || id == sym::T => {
                    return Err(LarkError::CannotRebindConstant(
                        self.symbols.name(id).to_string(),
                    ))
                }
                Value::Symbol(id) => id,
                other => {
                    return Err(LarkError::AssignTargetNotSymbol(self.display(other)))
                }
            };
            if !env.assign_existing(id, value) {
                self.globals.assign(&mut self.symbols, id, value);
            }
            result = value;
            pairs = next;
        }
        Ok(result)
    }

    /// Function application: head first, then every argument left to right
    /// in the current environment, then the call.
    fn eval_call(&mut self, head: Value, args: Value, env: &mut Env) -> LarkResult<Value> {
        let callee = self.eval(head, env)?;
        let arg_exprs = self
            .heap
            .list_to_vec(args)
            .ok_or_else(|| LarkError::BadObject("improper argument list".into()))?;
        let mut arg_vals = Vec::with_capacity(arg_exprs.len());
        for expr in arg_exprs {
            arg_vals.push(self.eval(expr, env)?);
        }
        self.apply(callee, &arg_vals)
    }

    /// Invoke a callable with already-evaluated arguments.
    pub fn apply(&mut self, callee: Value, args: &[Value]) -> LarkResult<Value> {
        match callee {
            Value::Closure(id) => self.apply_closure(id, args),
            Value::Native(id) => {
                let func = self.natives[id.0 as usize].func;
                func(self, args)
            }
            other => Err(LarkError::NotCallable(self.display(other))),
        }
    }

    /// Bind parameters positionally (zip-style: extras on either side are
    /// tolerated), chain the fresh frame in front of a copy of the captured
    /// snapshot, and evaluate the body for the last value.
    fn apply_closure(&mut self, id: ClosureId, args: &[Value]) -> LarkResult<Value> {
        let data = self.closures[id.0 as usize].clone();
        let mut frame = Frame::default();
        match &data.params {
            ParamSpec::Rest(param) => {
                let list = self.heap.list(args)?;
                frame.insert(*param, list);
            }
            ParamSpec::Flat(names) => {
                for (&param, &arg) in names.iter().zip(args.iter()) {
                    frame.insert(param, arg);
                }
            }
        }
        let mut call_env = Env {
            frames: data.captured,
        };
        call_env.push_frame(frame);

        let mut result = Value::Nil;
        let mut cur = data.body;
        while let Value::Pair(pid) = cur {
            let expr = self.heap.car(pid);
            result = self.eval(expr, &mut call_env)?;
            cur = self.heap.cdr(pid);
        }
        Ok(result)
    }
}

impl Default for Interp {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::read_str;
    use pretty_assertions::assert_eq;

    /// Read and evaluate every form in `src`, returning the last result.
    fn run(interp: &mut Interp, src: &str) -> LarkResult<Value> {
        let forms = read_str(src, &mut interp.heap, &mut interp.symbols)?;
        let mut env = Env::new();
        let mut result = Value::Nil;
        for expr in forms {
            result = interp.eval(expr, &mut env)?;
        }
        Ok(result)
    }

    fn run_fresh(src: &str) -> LarkResult<Value> {
        let mut interp = Interp::new();
        run(&mut interp, src)
    }

    #[test]
    fn literals_self_evaluate() {
        assert_eq!(run_fresh("1").unwrap(), Value::Int(1));
        assert_eq!(run_fresh("0.5").unwrap(), Value::Float(0.5));
        assert_eq!(run_fresh("#t").unwrap(), Value::Bool(true));
        let mut interp = Interp::new();
        let v = run(&mut interp, "\"ab\"").unwrap();
        match v {
            Value::Str(id) => assert_eq!(interp.heap.str_content(id), "ab"),
            other => panic!("expected string, got {:?}", other),
        }
    }

    #[test]
    fn nil_and_t_evaluate_to_themselves() {
        assert_eq!(run_fresh("nil").unwrap(), Value::Nil);
        assert_eq!(run_fresh("t").unwrap(), Value::Symbol(sym::T));
    }

    #[test]
    fn var_ref_through_a_frame() {
        let mut interp = Interp::new();
        let a = interp.symbols.intern("a");
        let mut env = Env::new();
        let mut frame = Frame::default();
        frame.insert(a, Value::Int(42));
        env.push_frame(frame);
        assert_eq!(interp.eval(Value::Symbol(a), &mut env).unwrap(), Value::Int(42));
    }

    #[test]
    fn unbound_variable_is_fatal() {
        assert!(matches!(run_fresh("nosuch"), Err(LarkError::Unbound(_))));
    }

    #[test]
    fn quote_returns_unevaluated() {
        let mut interp = Interp::new();
        let v = run(&mut interp, "(quote (a))").unwrap();
        let a = interp.symbols.intern("a");
        let items = interp.heap.list_to_vec(v).unwrap();
        assert_eq!(items, vec![Value::Symbol(a)]);
    }

    #[test]
    fn if_walks_in_pairs() {
        assert_eq!(run_fresh("(if nil)").unwrap(), Value::Nil);
        assert_eq!(run_fresh("(if t 1 2)").unwrap(), Value::Int(1));
        assert_eq!(run_fresh("(if nil 1 2)").unwrap(), Value::Int(2));
        assert_eq!(run_fresh("(if nil 1 nil 2 3)").unwrap(), Value::Int(3));
        assert_eq!(run_fresh("(if nil 1 t 2 3)").unwrap(), Value::Int(2));
        assert_eq!(run_fresh("(if)").unwrap(), Value::Nil);
    }

    #[test]
    fn zero_and_empty_string_are_truthy() {
        assert_eq!(run_fresh("(if 0 1 2)").unwrap(), Value::Int(1));
        assert_eq!(run_fresh("(if #f 1 2)").unwrap(), Value::Int(2));
    }

    #[test]
    fn fn_call_binds_positionally() {
        // ((fn (a) (if a 1 2)) nil) and with a truthy string
        assert_eq!(
            run_fresh("((fn (a) (if a 1 2)) nil)").unwrap(),
            Value::Int(2)
        );
        assert_eq!(
            run_fresh("((fn (a) (if a 1 2)) \"x\")").unwrap(),
            Value::Int(1)
        );
    }

    #[test]
    fn empty_body_returns_nil() {
        assert_eq!(run_fresh("((fn (a)))").unwrap(), Value::Nil);
    }

    #[test]
    fn body_returns_last_value_in_order() {
        assert_eq!(run_fresh("((fn () 1 2 3))").unwrap(), Value::Int(3));
    }

    #[test]
    fn single_symbol_param_captures_all_args() {
        let mut interp = Interp::new();
        let v = run(&mut interp, "((fn args args) 1 2 3)").unwrap();
        assert_eq!(
            interp.heap.list_to_vec(v),
            Some(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
        );
    }

    #[test]
    fn zip_binding_tolerates_extra_arguments() {
        assert_eq!(run_fresh("((fn (a) a) 1 2 3)").unwrap(), Value::Int(1));
    }

    #[test]
    fn complex_params_are_rejected() {
        assert!(matches!(
            run_fresh("(fn (a (b c)) a)"),
            Err(LarkError::UnsupportedParams(_))
        ));
        assert!(matches!(
            run_fresh("(fn 1 a)"),
            Err(LarkError::UnsupportedParams(_))
        ));
    }

    #[test]
    fn closures_capture_a_snapshot() {
        // The inner fn sees the binding of a at its creation.
        assert_eq!(
            run_fresh("(((fn (a) (fn () a)) 7))").unwrap(),
            Value::Int(7)
        );
    }

    #[test]
    fn assign_creates_a_global() {
        let mut interp = Interp::new();
        run(&mut interp, "(assign x 7)").unwrap();
        // a fresh environment still sees the global
        assert_eq!(run(&mut interp, "x").unwrap(), Value::Int(7));
    }

    #[test]
    fn assign_mutates_a_local_binding_in_place() {
        assert_eq!(
            run_fresh("((fn (a) (assign a 99) a) 1)").unwrap(),
            Value::Int(99)
        );
    }

    #[test]
    fn local_shadowing_wins_over_globals() {
        let mut interp = Interp::new();
        run(&mut interp, "(assign x 1)").unwrap();
        assert_eq!(
            run(&mut interp, "((fn (x) (assign x 2) x) 10)").unwrap(),
            Value::Int(2)
        );
        // the global is untouched
        assert_eq!(run(&mut interp, "x").unwrap(), Value::Int(1));
    }

    #[test]
    fn assign_returns_the_last_value() {
        assert_eq!(run_fresh("(assign x 1 y 2)").unwrap(), Value::Int(2));
        assert_eq!(run_fresh("(assign)").unwrap(), Value::Nil);
    }

    #[test]
    fn assign_pairs_apply_left_to_right() {
        let mut interp = Interp::new();
        run(&mut interp, "(assign x 1 y x)").unwrap();
        assert_eq!(run(&mut interp, "y").unwrap(), Value::Int(1));
    }

    #[test]
    fn constants_cannot_be_rebound() {
        assert!(matches!(
            run_fresh("(assign nil 1)"),
            Err(LarkError::CannotRebindConstant(_))
        ));
        assert!(matches!(
            run_fresh("(assign t 1)"),
            Err(LarkError::CannotRebindConstant(_))
        ));
    }

    #[test]
    fn assign_target_must_be_a_symbol() {
        assert!(matches!(
            run_fresh("(assign 1 2)"),
            Err(LarkError::AssignTargetNotSymbol(_))
        ));
        assert!(matches!(
            run_fresh("(assign (a) 2)"),
            Err(LarkError::AssignTargetNotSymbol(_))
        ));
    }

    #[test]
    fn applying_a_non_callable_fails() {
        assert!(matches!(run_fresh("(1 2)"), Err(LarkError::NotCallable(_))));
    }

    #[test]
    fn exposed_natives_are_reachable() {
        let mut interp = Interp::new();
        let a = interp.symbols.intern("a");
        assert_eq!(
            run(&mut interp, "(car (quote (a b)))").unwrap(),
            Value::Symbol(a)
        );
        assert_eq!(run(&mut interp, "(+ 1 2 3)").unwrap(), Value::Int(6));
    }

    #[test]
    fn t_is_exposed_as_the_true_constant() {
        assert_eq!(run_fresh("(if t 1 2)").unwrap(), Value::Int(1));
    }

    #[test]
    fn arguments_evaluate_left_to_right() {
        let mut interp = Interp::new();
        let v = run(&mut interp, "(list (assign x 1) (assign x 2) x)").unwrap();
        assert_eq!(
            interp.heap.list_to_vec(v),
            Some(vec![Value::Int(1), Value::Int(2), Value::Int(2)])
        );
    }
}
