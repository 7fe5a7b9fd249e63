//! # Built-in library surface
//!
//! Method tables for the built-in receiver types plus the pre-registered
//! module catalogs and free functions:
//!
//! - **[strings]**: length, upper, lower, trim, contains, split, replace
//! - **[lists]**: push, pop, sort, reverse, sum, min, max, length, map, filter
//! - **[maps]**: keys, values, length, has
//! - **[modules]**: the `math` and `random` module catalogs
//! - **[free]**: the free functions `len` and `help`
//!
//! Every value additionally answers `to_int`, `to_float`, and `to_str`
//! where the conversion is meaningful. Method names outside a receiver's
//! table are runtime errors.

use crate::env::Environment;
use crate::error::ElangError;
use crate::eval::{EvalResult, Evaluator, Signal};
use crate::value::Value;
use std::rc::Rc;

pub mod free;
pub mod lists;
pub mod maps;
pub mod modules;
pub mod strings;

/// A fresh global environment with the free functions registered
pub fn global_env() -> Rc<Environment> {
    let env = Environment::new();
    free::register(&env);
    env
}

/// Dispatch a method call on the dynamic type of the receiver
pub fn call_method(
    ev: &mut Evaluator,
    receiver: &Value,
    method: &str,
    args: &[Value],
    line: u32,
    column: u32,
) -> EvalResult {
    let result = match receiver {
        Value::Str(s) => strings::call(s, method, args),
        Value::List(_) => return lists::call(ev, receiver, method, args, line, column),
        Value::Map(_) => maps::call(receiver, method, args),
        _ => convert(receiver, method, args).unwrap_or_else(|| {
            Err(format!(
                "Unknown method '{}' for {}",
                method,
                receiver.type_name()
            ))
        }),
    };
    result.map_err(|message| Signal::from(ElangError::runtime(message, line, column)))
}

/// The conversions available on any value; None means "not a conversion"
/// so the caller can report an unknown method instead.
pub(crate) fn convert(
    receiver: &Value,
    method: &str,
    args: &[Value],
) -> Option<Result<Value, String>> {
    let result = match method {
        "to_str" => {
            if let Err(err) = expect_args(method, args, 0) {
                return Some(Err(err));
            }
            Ok(Value::Str(receiver.to_string()))
        }
        "to_int" => {
            if let Err(err) = expect_args(method, args, 0) {
                return Some(Err(err));
            }
            match receiver {
                Value::Int(n) => Ok(Value::Int(*n)),
                Value::Float(n) => Ok(Value::Int(*n as i64)),
                Value::Bool(b) => Ok(Value::Int(i64::from(*b))),
                Value::Str(s) => s
                    .trim()
                    .parse::<i64>()
                    .map(Value::Int)
                    .map_err(|_| format!("Cannot convert '{}' to int", s)),
                other => Err(format!("Cannot convert {} to int", other.type_name())),
            }
        }
        "to_float" => {
            if let Err(err) = expect_args(method, args, 0) {
                return Some(Err(err));
            }
            match receiver {
                Value::Int(n) => Ok(Value::Float(*n as f64)),
                Value::Float(n) => Ok(Value::Float(*n)),
                Value::Str(s) => s
                    .trim()
                    .parse::<f64>()
                    .map(Value::Float)
                    .map_err(|_| format!("Cannot convert '{}' to float", s)),
                other => Err(format!("Cannot convert {} to float", other.type_name())),
            }
        }
        _ => return None,
    };
    Some(result)
}

/// Exact argument-count check shared by the method tables
pub(crate) fn expect_args(method: &str, args: &[Value], expected: usize) -> Result<(), String> {
    if args.len() != expected {
        return Err(format!(
            "{} expects {} argument{}, got {}",
            method,
            expected,
            if expected == 1 { "" } else { "s" },
            args.len()
        ));
    }
    Ok(())
}
