//! The pre-registered `math` and `random` module catalogs. Each `use`
//! builds a fresh environment populated with native functions.

use crate::env::Environment;
use crate::eval::Evaluator;
use crate::value::{Arity, Module, NativeFn, Value};
use rand::seq::SliceRandom;
use rand::Rng;
use std::rc::Rc;

/// Look up a built-in module catalog by name
pub fn builtin_module(name: &str) -> Option<Value> {
    match name {
        "math" => Some(math_module()),
        "random" => Some(random_module()),
        _ => None,
    }
}

fn native(env: &Rc<Environment>, name: &'static str, arity: Arity, func: NativeImpl) {
    env.define(name.to_string(), Value::Native(NativeFn { name, arity, func }));
}

type NativeImpl = fn(&mut Evaluator, &[Value]) -> Result<Value, String>;

fn math_module() -> Value {
    let env = Environment::new();
    env.define("pi".to_string(), Value::Float(std::f64::consts::PI));
    env.define("e".to_string(), Value::Float(std::f64::consts::E));

    native(&env, "sqrt", Arity::Exact(1), |_, args| {
        let x = number(args, 0, "sqrt")?;
        Ok(Value::Float(x.sqrt()))
    });
    native(&env, "abs", Arity::Exact(1), |_, args| match &args[0] {
        Value::Int(n) => Ok(Value::Int(n.wrapping_abs())),
        Value::Float(n) => Ok(Value::Float(n.abs())),
        other => Err(format!("abs expects a number, got {}", other.type_name())),
    });
    native(&env, "floor", Arity::Exact(1), |_, args| {
        let x = number(args, 0, "floor")?;
        Ok(Value::Int(x.floor() as i64))
    });
    native(&env, "ceil", Arity::Exact(1), |_, args| {
        let x = number(args, 0, "ceil")?;
        Ok(Value::Int(x.ceil() as i64))
    });
    native(&env, "round", Arity::Exact(1), |_, args| {
        let x = number(args, 0, "round")?;
        Ok(Value::Int(x.round() as i64))
    });
    native(&env, "pow", Arity::Exact(2), |_, args| {
        let x = number(args, 0, "pow")?;
        let y = number(args, 1, "pow")?;
        Ok(Value::Float(x.powf(y)))
    });
    native(&env, "sin", Arity::Exact(1), |_, args| {
        Ok(Value::Float(number(args, 0, "sin")?.sin()))
    });
    native(&env, "cos", Arity::Exact(1), |_, args| {
        Ok(Value::Float(number(args, 0, "cos")?.cos()))
    });
    native(&env, "tan", Arity::Exact(1), |_, args| {
        Ok(Value::Float(number(args, 0, "tan")?.tan()))
    });
    native(&env, "log", Arity::Exact(1), |_, args| {
        let x = number(args, 0, "log")?;
        if x <= 0.0 {
            return Err("log expects a positive number".to_string());
        }
        Ok(Value::Float(x.ln()))
    });

    Value::Module(Rc::new(Module {
        name: "math".to_string(),
        env,
    }))
}

fn random_module() -> Value {
    let env = Environment::new();

    native(&env, "randint", Arity::Exact(2), |_, args| {
        let a = integer(args, 0, "randint")?;
        let b = integer(args, 1, "randint")?;
        if a > b {
            return Err(format!("randint: empty range {}..{}", a, b));
        }
        Ok(Value::Int(rand::thread_rng().gen_range(a..=b)))
    });
    native(&env, "random", Arity::Exact(0), |_, _| {
        Ok(Value::Float(rand::thread_rng().gen::<f64>()))
    });
    native(&env, "choice", Arity::Exact(1), |_, args| match &args[0] {
        Value::List(items) => {
            let items = items.borrow();
            items
                .choose(&mut rand::thread_rng())
                .cloned()
                .ok_or_else(|| "choice from an empty list".to_string())
        }
        other => Err(format!("choice expects a list, got {}", other.type_name())),
    });
    native(&env, "shuffle", Arity::Exact(1), |_, args| match &args[0] {
        Value::List(items) => {
            items.borrow_mut().shuffle(&mut rand::thread_rng());
            Ok(args[0].clone())
        }
        other => Err(format!(
            "shuffle expects a list, got {}",
            other.type_name()
        )),
    });
    native(&env, "uniform", Arity::Exact(2), |_, args| {
        let a = number(args, 0, "uniform")?;
        let b = number(args, 1, "uniform")?;
        if a >= b {
            return Err(format!("uniform: empty range {}..{}", a, b));
        }
        Ok(Value::Float(rand::thread_rng().gen_range(a..b)))
    });

    Value::Module(Rc::new(Module {
        name: "random".to_string(),
        env,
    }))
}

fn number(args: &[Value], index: usize, name: &str) -> Result<f64, String> {
    match &args[index] {
        Value::Int(n) => Ok(*n as f64),
        Value::Float(n) => Ok(*n),
        other => Err(format!(
            "{} expects a number, got {}",
            name,
            other.type_name()
        )),
    }
}

fn integer(args: &[Value], index: usize, name: &str) -> Result<i64, String> {
    match &args[index] {
        Value::Int(n) => Ok(*n),
        other => Err(format!(
            "{} expects an integer, got {}",
            name,
            other.type_name()
        )),
    }
}
