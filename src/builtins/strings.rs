//! String methods. All length and index units are characters, matching
//! iteration and `len`.

use crate::value::Value;

use super::{convert, expect_args};

pub fn call(s: &str, method: &str, args: &[Value]) -> Result<Value, String> {
    match method {
        "length" => {
            expect_args(method, args, 0)?;
            Ok(Value::Int(s.chars().count() as i64))
        }
        "upper" => {
            expect_args(method, args, 0)?;
            Ok(Value::Str(s.to_uppercase()))
        }
        "lower" => {
            expect_args(method, args, 0)?;
            Ok(Value::Str(s.to_lowercase()))
        }
        "trim" => {
            expect_args(method, args, 0)?;
            Ok(Value::Str(s.trim().to_string()))
        }
        "contains" => {
            expect_args(method, args, 1)?;
            let needle = string_arg(method, args, 0)?;
            Ok(Value::Bool(s.contains(needle)))
        }
        "split" => {
            // split() splits on whitespace, split(sep) on the separator
            if args.len() > 1 {
                return Err(format!("split expects 0-1 arguments, got {}", args.len()));
            }
            let parts: Vec<Value> = match args.first() {
                None => s
                    .split_whitespace()
                    .map(|part| Value::Str(part.to_string()))
                    .collect(),
                Some(_) => {
                    let sep = string_arg(method, args, 0)?;
                    if sep.is_empty() {
                        return Err("split separator cannot be empty".to_string());
                    }
                    s.split(sep)
                        .map(|part| Value::Str(part.to_string()))
                        .collect()
                }
            };
            Ok(Value::list(parts))
        }
        "replace" => {
            expect_args(method, args, 2)?;
            let old = string_arg(method, args, 0)?;
            let new = string_arg(method, args, 1)?;
            Ok(Value::Str(s.replace(old, new)))
        }
        _ => {
            let receiver = Value::Str(s.to_string());
            convert(&receiver, method, args)
                .unwrap_or_else(|| Err(format!("Unknown method '{}' for string", method)))
        }
    }
}

fn string_arg<'a>(method: &str, args: &'a [Value], index: usize) -> Result<&'a str, String> {
    match &args[index] {
        Value::Str(s) => Ok(s),
        other => Err(format!(
            "{} expects a string argument, got {}",
            method,
            other.type_name()
        )),
    }
}
