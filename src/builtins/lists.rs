//! List methods. Lists are shared and mutable: push, sort, and reverse are
//! visible through every alias of the list.

use crate::error::ElangError;
use crate::eval::{EvalResult, Evaluator, Signal};
use crate::value::Value;

use super::{convert, expect_args};

pub fn call(
    ev: &mut Evaluator,
    receiver: &Value,
    method: &str,
    args: &[Value],
    line: u32,
    column: u32,
) -> EvalResult {
    let Value::List(items) = receiver else {
        unreachable!("dispatch checked the receiver");
    };

    let err = |message: String| Signal::from(ElangError::runtime(message, line, column));

    match method {
        "push" => {
            expect_args(method, args, 1).map_err(err)?;
            items.borrow_mut().push(args[0].clone());
            Ok(receiver.clone())
        }
        "pop" => {
            expect_args(method, args, 0).map_err(err)?;
            items
                .borrow_mut()
                .pop()
                .ok_or_else(|| err("pop from an empty list".to_string()))
        }
        "sort" => {
            expect_args(method, args, 0).map_err(err)?;
            sort_in_place(&mut items.borrow_mut()).map_err(err)?;
            Ok(receiver.clone())
        }
        "reverse" => {
            expect_args(method, args, 0).map_err(err)?;
            items.borrow_mut().reverse();
            Ok(receiver.clone())
        }
        "sum" => {
            expect_args(method, args, 0).map_err(err)?;
            let items = items.borrow();
            let mut int_total: i64 = 0;
            let mut float_total = 0.0;
            let mut saw_float = false;
            for item in items.iter() {
                match item {
                    Value::Int(n) => int_total = int_total.wrapping_add(*n),
                    Value::Float(n) => {
                        saw_float = true;
                        float_total += n;
                    }
                    other => {
                        return Err(err(format!(
                            "sum needs a list of numbers, found a {}",
                            other.type_name()
                        )));
                    }
                }
            }
            if saw_float {
                Ok(Value::Float(float_total + int_total as f64))
            } else {
                Ok(Value::Int(int_total))
            }
        }
        "min" => {
            expect_args(method, args, 0).map_err(err)?;
            extreme(&items.borrow(), method, |ord| ord.is_lt()).map_err(err)
        }
        "max" => {
            expect_args(method, args, 0).map_err(err)?;
            extreme(&items.borrow(), method, |ord| ord.is_gt()).map_err(err)
        }
        "length" => {
            expect_args(method, args, 0).map_err(err)?;
            Ok(Value::Int(items.borrow().len() as i64))
        }
        "map" => {
            expect_args(method, args, 1).map_err(err)?;
            let func = callable_arg(method, args).map_err(err)?;
            // Snapshot first: the callback may touch the list itself
            let snapshot = items.borrow().clone();
            let mut mapped = Vec::with_capacity(snapshot.len());
            for item in snapshot {
                mapped.push(ev.call_value(&func, vec![item], line, column)?);
            }
            Ok(Value::list(mapped))
        }
        "filter" => {
            expect_args(method, args, 1).map_err(err)?;
            let func = callable_arg(method, args).map_err(err)?;
            let snapshot = items.borrow().clone();
            let mut kept = Vec::new();
            for item in snapshot {
                let keep = ev.call_value(&func, vec![item.clone()], line, column)?;
                if keep.is_truthy() {
                    kept.push(item);
                }
            }
            Ok(Value::list(kept))
        }
        _ => convert(receiver, method, args)
            .unwrap_or_else(|| Err(format!("Unknown method '{}' for list", method)))
            .map_err(err),
    }
}

fn callable_arg(method: &str, args: &[Value]) -> Result<Value, String> {
    let func = args[0].clone();
    if !func.is_callable() {
        return Err(format!(
            "{} expects a function, got {}",
            method,
            func.type_name()
        ));
    }
    Ok(func)
}

/// Sorting needs a homogeneous list: all numbers or all strings
fn sort_in_place(items: &mut [Value]) -> Result<(), String> {
    let all_numbers = items
        .iter()
        .all(|v| matches!(v, Value::Int(_) | Value::Float(_)));
    if all_numbers {
        items.sort_by(|a, b| {
            number_of(a)
                .partial_cmp(&number_of(b))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        return Ok(());
    }
    if items.iter().all(|v| matches!(v, Value::Str(_))) {
        items.sort_by(|a, b| match (a, b) {
            (Value::Str(a), Value::Str(b)) => a.cmp(b),
            _ => unreachable!(),
        });
        return Ok(());
    }
    Err("Cannot sort a list with mixed element types".to_string())
}

fn number_of(value: &Value) -> f64 {
    match value {
        Value::Int(n) => *n as f64,
        Value::Float(n) => *n,
        _ => 0.0,
    }
}

fn extreme(
    items: &[Value],
    method: &str,
    wins: fn(std::cmp::Ordering) -> bool,
) -> Result<Value, String> {
    let mut iter = items.iter();
    let Some(first) = iter.next() else {
        return Err(format!("{} of an empty list", method));
    };

    let mut best = first.clone();
    for item in iter {
        let ordering = match (item, &best) {
            (Value::Str(a), Value::Str(b)) => a.cmp(b),
            (a, b) => {
                let (Some(a), Some(b)) = (numeric(a), numeric(b)) else {
                    return Err(format!(
                        "{} needs a list of numbers or strings",
                        method
                    ));
                };
                a.partial_cmp(&b).unwrap_or(std::cmp::Ordering::Equal)
            }
        };
        if wins(ordering) {
            best = item.clone();
        }
    }
    Ok(best)
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Int(n) => Some(*n as f64),
        Value::Float(n) => Some(*n),
        _ => None,
    }
}
