//! Map methods. Iteration-adjacent methods (keys, values) preserve
//! insertion order.

use crate::value::{Key, Value};

use super::{convert, expect_args};

pub fn call(receiver: &Value, method: &str, args: &[Value]) -> Result<Value, String> {
    let Value::Map(entries) = receiver else {
        unreachable!("dispatch checked the receiver");
    };

    match method {
        "keys" => {
            expect_args(method, args, 0)?;
            let keys: Vec<Value> = entries.borrow().keys().map(Key::to_value).collect();
            Ok(Value::list(keys))
        }
        "values" => {
            expect_args(method, args, 0)?;
            let values: Vec<Value> = entries.borrow().values().cloned().collect();
            Ok(Value::list(values))
        }
        "length" => {
            expect_args(method, args, 0)?;
            Ok(Value::Int(entries.borrow().len() as i64))
        }
        "has" => {
            expect_args(method, args, 1)?;
            let key = Key::from_value(&args[0]).ok_or_else(|| {
                format!(
                    "has expects a hashable key, got a {}",
                    args[0].type_name()
                )
            })?;
            Ok(Value::Bool(entries.borrow().contains_key(&key)))
        }
        _ => convert(receiver, method, args)
            .unwrap_or_else(|| Err(format!("Unknown method '{}' for map", method))),
    }
}
