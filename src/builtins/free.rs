//! The free functions available in every environment: `len` and `help`

use crate::env::Environment;
use crate::help;
use crate::value::{Arity, NativeFn, Value};
use std::rc::Rc;

pub fn register(env: &Rc<Environment>) {
    env.define(
        "len".to_string(),
        Value::Native(NativeFn {
            name: "len",
            arity: Arity::Exact(1),
            func: |_, args| match &args[0] {
                Value::Str(s) => Ok(Value::Int(s.chars().count() as i64)),
                Value::List(items) => Ok(Value::Int(items.borrow().len() as i64)),
                other => Err(format!(
                    "len expects a string or a list, got {}",
                    other.type_name()
                )),
            },
        }),
    );

    env.define(
        "help".to_string(),
        Value::Native(NativeFn {
            name: "help",
            arity: Arity::Range(0, 1),
            func: |ev, args| {
                match args.first() {
                    None => ev.write_output(&help::overview()),
                    Some(Value::Str(topic)) => match help::topic(topic) {
                        Some(text) => ev.write_output(&format!("{}\n", text)),
                        None => ev.write_output(&format!(
                            "No help available for '{}'\n",
                            topic
                        )),
                    },
                    Some(other) => {
                        return Err(format!(
                            "help expects a topic name, got {}",
                            other.type_name()
                        ));
                    }
                }
                Ok(Value::Null)
            },
        }),
    );
}
