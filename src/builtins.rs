//! Native functions and constants exposed to user code.
//!
//! The exposure table is fixed and installed once per interpreter: the
//! canonical true constant, a handful of list utilities, and variadic
//! addition. Everything here is reachable only through its mangled name,
//! like any other global.

use crate::error::{LarkError, LarkResult};
use crate::eval::Interp;
use crate::symbol::sym;
use crate::value::Value;

pub fn install(interp: &mut Interp) {
    interp.expose("t", Value::Symbol(sym::T));
    interp.expose_native("car", native_car);
    interp.expose_native("cdr", native_cdr);
    interp.expose_native("cons", native_cons);
    interp.expose_native("list", native_list);
    interp.expose_native("append", native_append);
    interp.expose_native("+", native_add);
}

fn expect_arity(name: &'static str, args: &[Value], expected: usize) -> LarkResult<()> {
    if args.len() != expected {
        return Err(LarkError::NativeArity {
            name,
            expected,
            got: args.len(),
        });
    }
    Ok(())
}

fn native_car(interp: &mut Interp, args: &[Value]) -> LarkResult<Value> {
    expect_arity("car", args, 1)?;
    interp.heap.car_val(args[0])
}

fn native_cdr(interp: &mut Interp, args: &[Value]) -> LarkResult<Value> {
    expect_arity("cdr", args, 1)?;
    interp.heap.cdr_val(args[0])
}

fn native_cons(interp: &mut Interp, args: &[Value]) -> LarkResult<Value> {
    expect_arity("cons", args, 2)?;
    let id = interp.heap.alloc(args[0], args[1])?;
    Ok(Value::Pair(id))
}

fn native_list(interp: &mut Interp, args: &[Value]) -> LarkResult<Value> {
    interp.heap.list(args)
}

/// Copying append of any number of lists; the last argument becomes the
/// shared tail.
fn native_append(interp: &mut Interp, args: &[Value]) -> LarkResult<Value> {
    let (&last, init) = match args.split_last() {
        Some(split) => split,
        None => return Ok(Value::Nil),
    };
    let mut result = last;
    for &list in init.iter().rev() {
        result = interp.heap.append(list, result)?;
    }
    Ok(result)
}

/// Variadic addition over integers and floats; any float argument promotes
/// the result.
fn native_add(interp: &mut Interp, args: &[Value]) -> LarkResult<Value> {
    let mut int_sum: i64 = 0;
    let mut float_sum: f64 = 0.0;
    let mut saw_float = false;
    for &arg in args {
        match arg {
            Value::Int(n) => int_sum += n,
            Value::Float(x) => {
                saw_float = true;
                float_sum += x;
            }
            other => {
                return Err(LarkError::TypeError(format!(
                    "cannot add {}",
                    interp.display(other)
                )))
            }
        }
    }
    if saw_float {
        Ok(Value::Float(float_sum + int_sum as f64))
    } else {
        Ok(Value::Int(int_sum))
    }
}
