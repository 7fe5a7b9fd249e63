// ABOUTME: Tree-walking evaluator: scopes, closures, control flow, and modules

use crate::ast::{BinOp, InterpPart, Node, NodeKind, UnOp};
use crate::builtins;
use crate::commands;
use crate::env::Environment;
use crate::error::ElangError;
use crate::lexer;
use crate::parser;
use crate::value::{Key, Value};
use indexmap::IndexMap;
use std::cell::RefCell;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use std::rc::Rc;

/// User-level call depth bound; crossing it is a clean runtime error
/// instead of a host stack overflow.
const MAX_CALL_DEPTH: usize = 200;

/// Everything that unwinds out of a node: real errors plus the loop and
/// function control signals. Loops intercept Break/Continue, calls
/// intercept Return, and the top level turns strays into runtime errors.
#[derive(Debug)]
pub enum Signal {
    Error(ElangError),
    Return(Value),
    Break { line: u32, column: u32 },
    Continue { line: u32, column: u32 },
}

impl From<ElangError> for Signal {
    fn from(err: ElangError) -> Self {
        Signal::Error(err)
    }
}

pub type EvalResult = Result<Value, Signal>;

pub struct Evaluator {
    base_dir: PathBuf,
    out: Rc<RefCell<dyn Write>>,
    input: Rc<RefCell<dyn BufRead>>,
    depth: usize,
}

impl Evaluator {
    /// Evaluator wired to the process's standard streams
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Evaluator {
            base_dir: base_dir.into(),
            out: Rc::new(RefCell::new(io::stdout())),
            input: Rc::new(RefCell::new(BufReader::new(io::stdin()))),
            depth: 0,
        }
    }

    /// Evaluator with injected streams, used by tests and module loading
    pub fn with_io(
        base_dir: impl Into<PathBuf>,
        out: Rc<RefCell<dyn Write>>,
        input: Rc<RefCell<dyn BufRead>>,
    ) -> Self {
        Evaluator {
            base_dir: base_dir.into(),
            out,
            input,
            depth: 0,
        }
    }

    /// Run a whole source string through lex, parse, and eval
    pub fn run_program(
        &mut self,
        source: &str,
        env: &Rc<Environment>,
    ) -> Result<Value, ElangError> {
        let tokens = lexer::tokenize(source)?;
        let root = parser::parse(tokens)?;
        self.run(&root, env)
    }

    /// Evaluate a parsed program, converting stray control signals into
    /// the runtime errors the language defines for them.
    pub fn run(&mut self, root: &Node, env: &Rc<Environment>) -> Result<Value, ElangError> {
        match self.eval(root, env) {
            Ok(value) => Ok(value),
            Err(Signal::Error(err)) => Err(err),
            Err(Signal::Break { line, column }) => Err(ElangError::runtime(
                "'break' outside of a loop",
                line,
                column,
            )),
            Err(Signal::Continue { line, column }) => Err(ElangError::runtime(
                "'continue' outside of a loop",
                line,
                column,
            )),
            Err(Signal::Return(_)) => Err(ElangError::runtime(
                "'return' outside of a function",
                0,
                0,
            )),
        }
    }

    pub fn eval(&mut self, node: &Node, env: &Rc<Environment>) -> EvalResult {
        match &node.kind {
            NodeKind::Int(n) => Ok(Value::Int(*n)),
            NodeKind::Float(n) => Ok(Value::Float(*n)),
            NodeKind::Str(s) => Ok(Value::Str(s.clone())),
            NodeKind::Bool(b) => Ok(Value::Bool(*b)),
            NodeKind::Null => Ok(Value::Null),

            NodeKind::InterpStr(parts) => {
                let mut text = String::new();
                for part in parts {
                    match part {
                        InterpPart::Lit(lit) => text.push_str(lit),
                        InterpPart::Expr(expr) => {
                            let value = self.eval(expr, env)?;
                            text.push_str(&value.to_string());
                        }
                    }
                }
                Ok(Value::Str(text))
            }

            NodeKind::Ident(name) => env.get(name).ok_or_else(|| {
                ElangError::runtime(
                    format!("Undefined variable '{}'", name),
                    node.line,
                    node.column,
                )
                .into()
            }),

            NodeKind::Assign { name, value } => {
                let value = self.eval(value, env)?;
                env.define(name.clone(), value);
                Ok(Value::Null)
            }

            NodeKind::CompoundAssign { name, op, value } => {
                let current = env.get(name).ok_or_else(|| {
                    Signal::from(ElangError::runtime(
                        format!("Undefined variable '{}'", name),
                        node.line,
                        node.column,
                    ))
                })?;
                let rhs = self.eval(value, env)?;
                let next = binary_op(*op, &current, &rhs, node.line, node.column)?;
                env.define(name.clone(), next);
                Ok(Value::Null)
            }

            NodeKind::Binary { left, op, right } => match op {
                // and/or short-circuit and always yield a boolean
                BinOp::And => {
                    let lhs = self.eval(left, env)?;
                    if !lhs.is_truthy() {
                        return Ok(Value::Bool(false));
                    }
                    let rhs = self.eval(right, env)?;
                    Ok(Value::Bool(rhs.is_truthy()))
                }
                BinOp::Or => {
                    let lhs = self.eval(left, env)?;
                    if lhs.is_truthy() {
                        return Ok(Value::Bool(true));
                    }
                    let rhs = self.eval(right, env)?;
                    Ok(Value::Bool(rhs.is_truthy()))
                }
                _ => {
                    let lhs = self.eval(left, env)?;
                    let rhs = self.eval(right, env)?;
                    Ok(binary_op(*op, &lhs, &rhs, node.line, node.column)?)
                }
            },

            NodeKind::Unary { op, operand } => {
                let value = self.eval(operand, env)?;
                match op {
                    UnOp::Not => Ok(Value::Bool(!value.is_truthy())),
                    UnOp::Neg => match value {
                        Value::Int(n) => Ok(Value::Int(n.wrapping_neg())),
                        Value::Float(n) => Ok(Value::Float(-n)),
                        other => Err(ElangError::runtime(
                            format!("Cannot negate a {}", other.type_name()),
                            node.line,
                            node.column,
                        )
                        .into()),
                    },
                }
            }

            NodeKind::List(elements) => {
                let mut items = Vec::with_capacity(elements.len());
                for element in elements {
                    items.push(self.eval(element, env)?);
                }
                Ok(Value::list(items))
            }

            NodeKind::MapLit(pairs) => {
                let mut entries = IndexMap::with_capacity(pairs.len());
                for (key_expr, value_expr) in pairs {
                    let key_value = self.eval(key_expr, env)?;
                    let key = Key::from_value(&key_value).ok_or_else(|| {
                        Signal::from(ElangError::runtime(
                            format!(
                                "Map keys must be hashable, got a {}",
                                key_value.type_name()
                            ),
                            key_expr.line,
                            key_expr.column,
                        ))
                    })?;
                    let value = self.eval(value_expr, env)?;
                    entries.insert(key, value);
                }
                Ok(Value::map(entries))
            }

            NodeKind::Index { target, index } => {
                let target_value = self.eval(target, env)?;
                let index_value = self.eval(index, env)?;
                self.index_get(&target_value, &index_value, node.line, node.column)
            }

            NodeKind::IndexSet {
                target,
                index,
                value,
            } => {
                let target_value = self.eval(target, env)?;
                let index_value = self.eval(index, env)?;
                let new_value = self.eval(value, env)?;
                self.index_set(&target_value, &index_value, new_value, node.line, node.column)?;
                Ok(Value::Null)
            }

            NodeKind::MethodCall {
                target,
                method,
                args,
            } => {
                let receiver = self.eval(target, env)?;
                let mut arg_values = Vec::with_capacity(args.len());
                for arg in args {
                    arg_values.push(self.eval(arg, env)?);
                }
                if let Value::Module(module) = &receiver {
                    let member = module.env.get(method).ok_or_else(|| {
                        Signal::from(ElangError::runtime(
                            format!("Module '{}' has no member '{}'", module.name, method),
                            node.line,
                            node.column,
                        ))
                    })?;
                    return self.call_value(&member, arg_values, node.line, node.column);
                }
                builtins::call_method(self, &receiver, method, &arg_values, node.line, node.column)
            }

            NodeKind::FieldGet { target, field } => {
                let receiver = self.eval(target, env)?;
                match &receiver {
                    Value::Module(module) => module.env.get(field).ok_or_else(|| {
                        Signal::from(ElangError::runtime(
                            format!("Module '{}' has no member '{}'", module.name, field),
                            node.line,
                            node.column,
                        ))
                    }),
                    Value::Map(entries) => {
                        let key = Key::Str(field.clone());
                        if let Some(value) = entries.borrow().get(&key) {
                            return Ok(value.clone());
                        }
                        builtins::call_method(self, &receiver, field, &[], node.line, node.column)
                    }
                    _ => builtins::call_method(self, &receiver, field, &[], node.line, node.column),
                }
            }

            NodeKind::FnDef {
                name,
                params,
                body,
                return_type: _,
            } => {
                let function = Value::Function(Rc::new(crate::value::Function {
                    name: name.clone(),
                    params: params.clone(),
                    body: (**body).clone(),
                    env: env.clone(),
                }));
                env.define(name.clone(), function);
                Ok(Value::Null)
            }

            NodeKind::Call { name, args } => {
                let callee = env.get(name).ok_or_else(|| {
                    Signal::from(ElangError::runtime(
                        format!("Undefined function '{}'", name),
                        node.line,
                        node.column,
                    ))
                })?;
                let mut arg_values = Vec::with_capacity(args.len());
                for arg in args {
                    arg_values.push(self.eval(arg, env)?);
                }
                self.call_value(&callee, arg_values, node.line, node.column)
            }

            NodeKind::Return(value) => {
                let value = match value {
                    Some(expr) => self.eval(expr, env)?,
                    None => Value::Null,
                };
                Err(Signal::Return(value))
            }

            NodeKind::Lambda { params, body } => Ok(Value::Lambda(Rc::new(
                crate::value::LambdaFn {
                    params: params.clone(),
                    body: (**body).clone(),
                    env: env.clone(),
                },
            ))),

            NodeKind::If {
                cond,
                then,
                otherwise,
            } => {
                let cond_value = self.eval(cond, env)?;
                if cond_value.is_truthy() {
                    self.eval(then, env)
                } else if let Some(branch) = otherwise {
                    self.eval(branch, env)
                } else {
                    Ok(Value::Null)
                }
            }

            NodeKind::While { cond, body } => {
                loop {
                    let cond_value = self.eval(cond, env)?;
                    if !cond_value.is_truthy() {
                        break;
                    }
                    match self.eval(body, env) {
                        Ok(_) => {}
                        Err(Signal::Break { .. }) => break,
                        Err(Signal::Continue { .. }) => continue,
                        Err(other) => return Err(other),
                    }
                }
                Ok(Value::Null)
            }

            NodeKind::ForRange {
                var,
                start,
                end,
                step,
                reverse,
                body,
            } => {
                let start_value = self.eval(start, env)?;
                let end_value = self.eval(end, env)?;
                let start = to_int(&start_value, "Range start", start.line, start.column)?;
                let end = to_int(&end_value, "Range end", end.line, end.column)?;
                let step = match step {
                    Some(expr) => {
                        let value = self.eval(expr, env)?;
                        to_int(&value, "Range step", expr.line, expr.column)?
                    }
                    None => 1,
                };
                if step == 0 {
                    return Err(ElangError::runtime(
                        "Range step cannot be zero",
                        node.line,
                        node.column,
                    )
                    .into());
                }
                let step = step.abs();

                let mut i = start;
                loop {
                    let done = if *reverse { i < end } else { i > end };
                    if done {
                        break;
                    }
                    env.define(var.clone(), Value::Int(i));
                    match self.eval(body, env) {
                        Ok(_) => {}
                        Err(Signal::Break { .. }) => break,
                        Err(Signal::Continue { .. }) => {}
                        Err(other) => return Err(other),
                    }
                    i = if *reverse { i - step } else { i + step };
                }
                Ok(Value::Null)
            }

            NodeKind::ForEach {
                var,
                iterable,
                body,
            } => {
                let source = self.eval(iterable, env)?;
                let items: Vec<Value> = match &source {
                    Value::Str(s) => s
                        .chars()
                        .map(|c| Value::Str(c.to_string()))
                        .collect(),
                    Value::List(items) => items.borrow().clone(),
                    Value::Map(entries) => entries
                        .borrow()
                        .keys()
                        .map(|key| key.to_value())
                        .collect(),
                    other => {
                        return Err(ElangError::runtime(
                            format!("Cannot iterate over a {}", other.type_name()),
                            iterable.line,
                            iterable.column,
                        )
                        .into());
                    }
                };
                for item in items {
                    env.define(var.clone(), item);
                    match self.eval(body, env) {
                        Ok(_) => {}
                        Err(Signal::Break { .. }) => break,
                        Err(Signal::Continue { .. }) => continue,
                        Err(other) => return Err(other),
                    }
                }
                Ok(Value::Null)
            }

            NodeKind::Break => Err(Signal::Break {
                line: node.line,
                column: node.column,
            }),
            NodeKind::Continue => Err(Signal::Continue {
                line: node.line,
                column: node.column,
            }),

            NodeKind::Say { value, ends } => {
                let mut text = String::new();
                if let Some(expr) = value {
                    let value = self.eval(expr, env)?;
                    text = value.to_string();
                }
                for end in ends {
                    text.push_str(end.text());
                }
                self.write_output(&text);
                Ok(Value::Null)
            }

            NodeKind::Take { prompt } => {
                if let Some(expr) = prompt {
                    let value = self.eval(expr, env)?;
                    self.write_output(&value.to_string());
                }
                let mut line = String::new();
                let read = self.input.borrow_mut().read_line(&mut line);
                match read {
                    Ok(_) => {
                        while line.ends_with('\n') || line.ends_with('\r') {
                            line.pop();
                        }
                        Ok(Value::Str(line))
                    }
                    Err(_) => Ok(Value::Str(String::new())),
                }
            }

            NodeKind::Use { module } => {
                let value = self.load_module(module, node.line, node.column)?;
                env.define(module.clone(), value);
                Ok(Value::Null)
            }

            NodeKind::Command { path } => {
                match commands::lookup(path) {
                    Some(text) => self.write_output(&format!("{}\n", text)),
                    None => self.write_output(&format!("Unknown command '{}'\n", path)),
                }
                Ok(Value::Null)
            }

            NodeKind::Block(statements) => {
                let mut last = Value::Null;
                for statement in statements {
                    last = self.eval(statement, env)?;
                }
                Ok(last)
            }
        }
    }

    /// Apply a callable. Functions and lambdas get a fresh frame whose
    /// parent is their captured environment, never the caller's.
    pub fn call_value(
        &mut self,
        callee: &Value,
        args: Vec<Value>,
        line: u32,
        column: u32,
    ) -> EvalResult {
        match callee {
            Value::Function(func) => {
                if args.len() != func.params.len() {
                    return Err(arity_error(
                        &func.name,
                        func.params.len(),
                        args.len(),
                        line,
                        column,
                    ));
                }
                self.enter_call(line, column)?;
                let frame = Environment::with_parent(func.env.clone());
                for (param, arg) in func.params.iter().zip(args) {
                    frame.define(param.clone(), arg);
                }
                let result = self.eval(&func.body, &frame);
                self.depth -= 1;
                match result {
                    Err(Signal::Return(value)) => Ok(value),
                    // Falling off the end of a body returns null
                    Ok(_) => Ok(Value::Null),
                    Err(other) => Err(other),
                }
            }
            Value::Lambda(lambda) => {
                if args.len() != lambda.params.len() {
                    return Err(arity_error(
                        "<lambda>",
                        lambda.params.len(),
                        args.len(),
                        line,
                        column,
                    ));
                }
                self.enter_call(line, column)?;
                let frame = Environment::with_parent(lambda.env.clone());
                for (param, arg) in lambda.params.iter().zip(args) {
                    frame.define(param.clone(), arg);
                }
                let result = self.eval(&lambda.body, &frame);
                self.depth -= 1;
                match result {
                    Err(Signal::Return(value)) => Ok(value),
                    other => other,
                }
            }
            Value::Native(native) => {
                if !native.arity.accepts(args.len()) {
                    return Err(Signal::Error(ElangError::runtime(
                        format!(
                            "{} expects {} argument(s), got {}",
                            native.name, native.arity, args.len()
                        ),
                        line,
                        column,
                    )));
                }
                (native.func)(self, &args)
                    .map_err(|message| ElangError::runtime(message, line, column).into())
            }
            other => Err(ElangError::runtime(
                format!("Value of type {} is not callable", other.type_name()),
                line,
                column,
            )
            .into()),
        }
    }

    fn enter_call(&mut self, line: u32, column: u32) -> Result<(), Signal> {
        self.depth += 1;
        if self.depth > MAX_CALL_DEPTH {
            self.depth -= 1;
            return Err(ElangError::runtime(
                "Maximum recursion depth exceeded",
                line,
                column,
            )
            .into());
        }
        Ok(())
    }

    fn index_get(
        &mut self,
        target: &Value,
        index: &Value,
        line: u32,
        column: u32,
    ) -> EvalResult {
        match target {
            Value::List(items) => {
                let items = items.borrow();
                let i = list_index(index, items.len(), line, column)?;
                Ok(items[i].clone())
            }
            Value::Map(entries) => {
                let key = Key::from_value(index).ok_or_else(|| {
                    Signal::from(ElangError::runtime(
                        format!("Map keys must be hashable, got a {}", index.type_name()),
                        line,
                        column,
                    ))
                })?;
                entries.borrow().get(&key).cloned().ok_or_else(|| {
                    ElangError::runtime(format!("Map has no key {}", key), line, column).into()
                })
            }
            other => Err(ElangError::runtime(
                format!("Cannot index into a {}", other.type_name()),
                line,
                column,
            )
            .into()),
        }
    }

    fn index_set(
        &mut self,
        target: &Value,
        index: &Value,
        value: Value,
        line: u32,
        column: u32,
    ) -> Result<(), Signal> {
        match target {
            Value::List(items) => {
                let mut items = items.borrow_mut();
                let i = list_index(index, items.len(), line, column)?;
                items[i] = value;
                Ok(())
            }
            Value::Map(entries) => {
                let key = Key::from_value(index).ok_or_else(|| {
                    Signal::from(ElangError::runtime(
                        format!("Map keys must be hashable, got a {}", index.type_name()),
                        line,
                        column,
                    ))
                })?;
                entries.borrow_mut().insert(key, value);
                Ok(())
            }
            other => Err(ElangError::runtime(
                format!("Cannot index into a {}", other.type_name()),
                line,
                column,
            )
            .into()),
        }
    }

    /// `use NAME`: built-in catalogs first, then NAME.elang on disk run
    /// through the full pipeline in a fresh environment.
    fn load_module(&mut self, name: &str, line: u32, column: u32) -> EvalResult {
        if let Some(module) = builtins::modules::builtin_module(name) {
            return Ok(module);
        }

        let mut path = self.base_dir.join(format!("{}.elang", name));
        if !path.exists() {
            path = self.base_dir.join("modules").join(format!("{}.elang", name));
        }
        if !path.exists() {
            return Err(ElangError::runtime(
                format!("Cannot find module '{}'", name),
                line,
                column,
            )
            .with_hint(format!(
                "expected {}.elang next to the script or under modules/",
                name
            ))
            .into());
        }

        let source = std::fs::read_to_string(&path).map_err(|err| {
            Signal::from(ElangError::runtime(
                format!("Cannot read module '{}': {}", name, err),
                line,
                column,
            ))
        })?;

        let module_env = builtins::global_env();
        let mut sub = Evaluator::with_io(
            self.base_dir.clone(),
            self.out.clone(),
            self.input.clone(),
        );
        sub.run_program(&source, &module_env).map_err(|err| {
            Signal::from(
                ElangError::runtime(
                    format!("In module '{}': {}", name, err.message()),
                    line,
                    column,
                )
                .with_hint(format!(
                    "{} at line {}, column {} of {}.elang",
                    err.kind_name(),
                    err.position().0,
                    err.position().1,
                    name
                )),
            )
        })?;

        Ok(Value::Module(Rc::new(crate::value::Module {
            name: name.to_string(),
            env: module_env,
        })))
    }

    /// Write program output and flush immediately
    pub fn write_output(&mut self, text: &str) {
        let mut out = self.out.borrow_mut();
        let _ = out.write_all(text.as_bytes());
        let _ = out.flush();
    }
}

fn arity_error(name: &str, expected: usize, actual: usize, line: u32, column: u32) -> Signal {
    ElangError::runtime(
        format!(
            "{} expects {} argument{}, got {}",
            name,
            expected,
            if expected == 1 { "" } else { "s" },
            actual
        ),
        line,
        column,
    )
    .into()
}

fn list_index(index: &Value, len: usize, line: u32, column: u32) -> Result<usize, Signal> {
    let i = to_int(index, "List index", line, column)?;
    if i < 0 || i as usize >= len {
        return Err(ElangError::runtime(
            format!("List index {} out of range (length {})", i, len),
            line,
            column,
        )
        .into());
    }
    Ok(i as usize)
}

fn to_int(value: &Value, what: &str, line: u32, column: u32) -> Result<i64, Signal> {
    match value {
        Value::Int(n) => Ok(*n),
        Value::Float(n) => Ok(*n as i64),
        other => Err(ElangError::runtime(
            format!("{} must be a number, got a {}", what, other.type_name()),
            line,
            column,
        )
        .into()),
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Int(n) => Some(*n as f64),
        Value::Float(n) => Some(*n),
        _ => None,
    }
}

/// Apply a non-short-circuiting binary operator
pub fn binary_op(
    op: BinOp,
    left: &Value,
    right: &Value,
    line: u32,
    column: u32,
) -> Result<Value, ElangError> {
    match op {
        BinOp::Add => add_values(left, right, line, column),
        BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod | BinOp::Pow => {
            numeric_op(op, left, right, line, column)
        }
        BinOp::Eq => Ok(Value::Bool(left == right)),
        BinOp::Ne => Ok(Value::Bool(left != right)),
        BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge => compare(op, left, right, line, column),
        BinOp::And | BinOp::Or => unreachable!("short-circuit ops are handled in eval"),
    }
}

/// `+` concatenates as soon as either side is a string, coercing the other
/// side to its display form; otherwise it is numeric addition.
fn add_values(left: &Value, right: &Value, line: u32, column: u32) -> Result<Value, ElangError> {
    if matches!(left, Value::Str(_)) || matches!(right, Value::Str(_)) {
        return Ok(Value::Str(format!("{}{}", left, right)));
    }
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a.wrapping_add(*b))),
        _ => match (as_f64(left), as_f64(right)) {
            (Some(a), Some(b)) => Ok(Value::Float(a + b)),
            _ => Err(ElangError::runtime(
                format!(
                    "Cannot add {} and {}",
                    left.type_name(),
                    right.type_name()
                ),
                line,
                column,
            )),
        },
    }
}

fn numeric_op(
    op: BinOp,
    left: &Value,
    right: &Value,
    line: u32,
    column: u32,
) -> Result<Value, ElangError> {
    let type_error = || {
        ElangError::runtime(
            format!(
                "Operator '{}' needs numbers, got {} and {}",
                op.symbol(),
                left.type_name(),
                right.type_name()
            ),
            line,
            column,
        )
    };

    if let (Value::Int(a), Value::Int(b)) = (left, right) {
        let (a, b) = (*a, *b);
        return match op {
            BinOp::Sub => Ok(Value::Int(a.wrapping_sub(b))),
            BinOp::Mul => Ok(Value::Int(a.wrapping_mul(b))),
            BinOp::Div => {
                if b == 0 {
                    return Err(ElangError::runtime("Division by zero", line, column));
                }
                // Exact division stays an integer; otherwise promote
                if a % b == 0 {
                    Ok(Value::Int(a / b))
                } else {
                    Ok(Value::Float(a as f64 / b as f64))
                }
            }
            BinOp::Mod => {
                if b == 0 {
                    return Err(ElangError::runtime("Division by zero", line, column));
                }
                Ok(Value::Int(a.wrapping_rem(b)))
            }
            BinOp::Pow => {
                if b >= 0 {
                    match u32::try_from(b).ok().and_then(|exp| a.checked_pow(exp)) {
                        Some(n) => Ok(Value::Int(n)),
                        None => Ok(Value::Float((a as f64).powf(b as f64))),
                    }
                } else {
                    Ok(Value::Float((a as f64).powf(b as f64)))
                }
            }
            _ => unreachable!(),
        };
    }

    let (a, b) = match (as_f64(left), as_f64(right)) {
        (Some(a), Some(b)) => (a, b),
        _ => return Err(type_error()),
    };
    match op {
        BinOp::Sub => Ok(Value::Float(a - b)),
        BinOp::Mul => Ok(Value::Float(a * b)),
        BinOp::Div => {
            if b == 0.0 {
                return Err(ElangError::runtime("Division by zero", line, column));
            }
            Ok(Value::Float(a / b))
        }
        BinOp::Mod => {
            if b == 0.0 {
                return Err(ElangError::runtime("Division by zero", line, column));
            }
            Ok(Value::Float(a % b))
        }
        BinOp::Pow => Ok(Value::Float(a.powf(b))),
        _ => unreachable!(),
    }
}

/// Ordering requires matching types: numbers with numbers, strings with
/// strings. Anything else is a runtime error.
fn compare(
    op: BinOp,
    left: &Value,
    right: &Value,
    line: u32,
    column: u32,
) -> Result<Value, ElangError> {
    let result = if let (Some(a), Some(b)) = (as_f64(left), as_f64(right)) {
        match op {
            BinOp::Lt => a < b,
            BinOp::Gt => a > b,
            BinOp::Le => a <= b,
            BinOp::Ge => a >= b,
            _ => unreachable!(),
        }
    } else if let (Value::Str(a), Value::Str(b)) = (left, right) {
        match op {
            BinOp::Lt => a < b,
            BinOp::Gt => a > b,
            BinOp::Le => a <= b,
            BinOp::Ge => a >= b,
            _ => unreachable!(),
        }
    } else {
        return Err(ElangError::runtime(
            format!(
                "Cannot compare {} and {}",
                left.type_name(),
                right.type_name()
            ),
            line,
            column,
        ));
    };
    Ok(Value::Bool(result))
}
