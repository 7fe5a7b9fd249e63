// ABOUTME: Runtime value types, display-form rendering, and hashable map keys

use crate::ast::Node;
use crate::env::Environment;
use crate::eval::Evaluator;
use indexmap::IndexMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A user-defined function. The captured environment is the one the `fn`
/// statement was evaluated in, never the call site.
#[derive(Debug)]
pub struct Function {
    pub name: String,
    pub params: Vec<String>,
    pub body: Node,
    pub env: Rc<Environment>,
}

/// A lambda with a single-expression body
#[derive(Debug)]
pub struct LambdaFn {
    pub params: Vec<String>,
    pub body: Node,
    pub env: Rc<Environment>,
}

/// A named handle to an environment, produced by `use`
#[derive(Debug)]
pub struct Module {
    pub name: String,
    pub env: Rc<Environment>,
}

/// Accepted argument counts for a native function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    Range(usize, usize),
}

impl Arity {
    pub fn accepts(&self, count: usize) -> bool {
        match self {
            Arity::Exact(n) => count == *n,
            Arity::Range(lo, hi) => (*lo..=*hi).contains(&count),
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exact(n) => write!(f, "{}", n),
            Arity::Range(lo, hi) => write!(f, "{}-{}", lo, hi),
        }
    }
}

/// A host function exposed to programs. Natives receive the evaluator so
/// the few that produce output can reach its writer.
#[derive(Clone, Copy)]
pub struct NativeFn {
    pub name: &'static str,
    pub arity: Arity,
    pub func: fn(&mut Evaluator, &[Value]) -> Result<Value, String>,
}

impl fmt::Debug for NativeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeFn({})", self.name)
    }
}

#[derive(Debug, Clone)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    Null,
    List(Rc<RefCell<Vec<Value>>>),
    Map(Rc<RefCell<IndexMap<Key, Value>>>),
    Function(Rc<Function>),
    Lambda(Rc<LambdaFn>),
    Native(NativeFn),
    Module(Rc<Module>),
}

impl Value {
    pub fn list(items: Vec<Value>) -> Value {
        Value::List(Rc::new(RefCell::new(items)))
    }

    pub fn map(entries: IndexMap<Key, Value>) -> Value {
        Value::Map(Rc::new(RefCell::new(entries)))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Bool(_) => "bool",
            Value::Null => "none",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Function(_) => "function",
            Value::Lambda(_) => "lambda",
            Value::Native(_) => "native function",
            Value::Module(_) => "module",
        }
    }

    /// Truthiness: everything is true except false, none, zero, and the
    /// empty string, list, or map.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Null => false,
            Value::Int(n) => *n != 0,
            Value::Float(n) => *n != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::List(items) => !items.borrow().is_empty(),
            Value::Map(entries) => !entries.borrow().is_empty(),
            _ => true,
        }
    }

    pub fn is_callable(&self) -> bool {
        matches!(
            self,
            Value::Function(_) | Value::Lambda(_) | Value::Native(_)
        )
    }
}

/// Structural equality; numbers compare across int/float, reference types
/// compare by contents for lists and maps and by identity for callables.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                *a as f64 == *b
            }
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Null, Value::Null) => true,
            (Value::List(a), Value::List(b)) => {
                Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow()
            }
            (Value::Map(a), Value::Map(b)) => {
                if Rc::ptr_eq(a, b) {
                    return true;
                }
                let a = a.borrow();
                let b = b.borrow();
                a.len() == b.len()
                    && a.iter().zip(b.iter()).all(|((ka, va), (kb, vb))| {
                        ka == kb && va == vb
                    })
            }
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Lambda(a), Value::Lambda(b)) => Rc::ptr_eq(a, b),
            (Value::Native(a), Value::Native(b)) => a.name == b.name,
            (Value::Module(a), Value::Module(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// The display form used by `say` and string interpolation
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::Str(s) => write!(f, "{}", s),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Null => write!(f, "none"),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Map(entries) => {
                write!(f, "{{")?;
                for (i, (key, value)) in entries.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                write!(f, "}}")
            }
            Value::Function(func) => write!(f, "<fn {}>", func.name),
            Value::Lambda(_) => write!(f, "<lambda>"),
            Value::Native(native) => write!(f, "<native fn {}>", native.name),
            Value::Module(module) => write!(f, "<module {}>", module.name),
        }
    }
}

/// Map keys: any hashable value. Floats key by their bit pattern so a map
/// can be keyed on them without violating Hash/Eq.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Int(i64),
    Float(u64),
    Str(String),
    Bool(bool),
    Null,
}

impl Key {
    pub fn from_value(value: &Value) -> Option<Key> {
        match value {
            Value::Int(n) => Some(Key::Int(*n)),
            Value::Float(n) => Some(Key::Float(n.to_bits())),
            Value::Str(s) => Some(Key::Str(s.clone())),
            Value::Bool(b) => Some(Key::Bool(*b)),
            Value::Null => Some(Key::Null),
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Key::Int(n) => Value::Int(*n),
            Key::Float(bits) => Value::Float(f64::from_bits(*bits)),
            Key::Str(s) => Value::Str(s.clone()),
            Key::Bool(b) => Value::Bool(*b),
            Key::Null => Value::Null,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_primitives() {
        assert_eq!(format!("{}", Value::Int(42)), "42");
        assert_eq!(format!("{}", Value::Float(-2.5)), "-2.5");
        assert_eq!(format!("{}", Value::Str("hi".to_string())), "hi");
        assert_eq!(format!("{}", Value::Bool(true)), "true");
        assert_eq!(format!("{}", Value::Null), "none");
    }

    #[test]
    fn test_display_list_and_map() {
        let list = Value::list(vec![Value::Int(30), Value::Int(40)]);
        assert_eq!(format!("{}", list), "[30, 40]");

        let mut entries = IndexMap::new();
        entries.insert(Key::Str("b".to_string()), Value::Int(2));
        entries.insert(Key::Str("a".to_string()), Value::Int(1));
        // Insertion order, never sorted
        assert_eq!(format!("{}", Value::map(entries)), "{b: 2, a: 1}");
    }

    #[test]
    fn test_truthiness() {
        assert!(!Value::Bool(false).is_truthy());
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Int(0).is_truthy());
        assert!(!Value::Float(0.0).is_truthy());
        assert!(!Value::Str(String::new()).is_truthy());
        assert!(!Value::list(vec![]).is_truthy());
        assert!(!Value::map(IndexMap::new()).is_truthy());

        assert!(Value::Int(-1).is_truthy());
        assert!(Value::Str(" ".to_string()).is_truthy());
        assert!(Value::list(vec![Value::Null]).is_truthy());
    }

    #[test]
    fn test_numeric_equality_across_kinds() {
        assert_eq!(Value::Int(2), Value::Float(2.0));
        assert_ne!(Value::Int(2), Value::Float(2.5));
    }

    #[test]
    fn test_list_equality_is_structural() {
        let a = Value::list(vec![Value::Int(1), Value::Int(2)]);
        let b = Value::list(vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_key_round_trip() {
        for value in [
            Value::Int(7),
            Value::Float(1.5),
            Value::Str("k".to_string()),
            Value::Bool(false),
            Value::Null,
        ] {
            let key = Key::from_value(&value).expect("hashable");
            assert_eq!(key.to_value(), value);
        }
        assert!(Key::from_value(&Value::list(vec![])).is_none());
    }
}
