//! Runtime values and the canonical representation rule.
//!
//! Correctness of a graded example is decided by comparing representation
//! text, so `repr` must be deterministic: one formatter per value category,
//! used for both the expected and the received side.

use super::ast::Stmt;
use super::LangError;
use std::cmp::Ordering;
use std::rc::Rc;

#[derive(Debug, Clone)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Function(Rc<FunctionDef>),
    Builtin(&'static str),
}

/// A user-defined function captured at its `def` site.
#[derive(Debug, PartialEq)]
pub struct FunctionDef {
    pub name: String,
    pub params: Vec<String>,
    pub body: Vec<Stmt>,
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "NoneType",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::List(_) => "list",
            Value::Function(_) => "function",
            Value::Builtin(_) => "builtin_function",
        }
    }

    /// Canonical textual representation.
    pub fn repr(&self) -> String {
        match self {
            Value::None => "None".to_string(),
            Value::Bool(true) => "True".to_string(),
            Value::Bool(false) => "False".to_string(),
            Value::Int(value) => value.to_string(),
            Value::Float(value) => format_float(*value),
            Value::Str(value) => quote_str(value),
            Value::List(items) => {
                let rendered: Vec<String> = items.iter().map(Value::repr).collect();
                format!("[{}]", rendered.join(", "))
            }
            Value::Function(func) => format!("<function {}>", func.name),
            Value::Builtin(name) => format!("<built-in function {name}>"),
        }
    }

    /// Display form: like `repr` except strings appear unquoted.
    pub fn str_value(&self) -> String {
        match self {
            Value::Str(value) => value.clone(),
            other => other.repr(),
        }
    }

    pub fn truthy(&self) -> bool {
        match self {
            Value::None => false,
            Value::Bool(value) => *value,
            Value::Int(value) => *value != 0,
            Value::Float(value) => *value != 0.0,
            Value::Str(value) => !value.is_empty(),
            Value::List(items) => !items.is_empty(),
            Value::Function(_) | Value::Builtin(_) => true,
        }
    }

    /// Numeric view for arithmetic; bools count as 0/1.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(value) => Some(*value),
            Value::Bool(value) => Some(i64::from(*value)),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(value) => Some(*value as f64),
            Value::Float(value) => Some(*value),
            Value::Bool(value) => Some(if *value { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// Value equality with numeric cross-type coercion (`1 == 1.0`).
    pub fn eq(a: &Value, b: &Value) -> bool {
        match (a, b) {
            (Value::Int(x), Value::Int(y)) => x == y,
            (Value::Str(x), Value::Str(y)) => x == y,
            (Value::None, Value::None) => true,
            (Value::List(x), Value::List(y)) => {
                x.len() == y.len() && x.iter().zip(y).all(|(i, j)| Value::eq(i, j))
            }
            (Value::Function(x), Value::Function(y)) => Rc::ptr_eq(x, y),
            (Value::Builtin(x), Value::Builtin(y)) => x == y,
            _ => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            },
        }
    }

    /// Ordering for `<`-family comparisons; defined for numbers, strings and
    /// lists of comparable items.
    pub fn compare(a: &Value, b: &Value) -> Result<Ordering, LangError> {
        match (a, b) {
            (Value::Str(x), Value::Str(y)) => Ok(x.cmp(y)),
            (Value::List(x), Value::List(y)) => {
                for (i, j) in x.iter().zip(y) {
                    match Value::compare(i, j)? {
                        Ordering::Equal => continue,
                        other => return Ok(other),
                    }
                }
                Ok(x.len().cmp(&y.len()))
            }
            _ => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x.partial_cmp(&y).ok_or_else(|| {
                    LangError::Type("nan is not orderable".to_string())
                }),
                _ => Err(LangError::Type(format!(
                    "unsupported comparison between '{}' and '{}'",
                    a.type_name(),
                    b.type_name()
                ))),
            },
        }
    }
}

/// Floats always render with a fractional part so they stay distinguishable
/// from ints (`2.0`, not `2`).
fn format_float(value: f64) -> String {
    if value.is_nan() {
        "nan".to_string()
    } else if value.is_infinite() {
        if value > 0.0 { "inf" } else { "-inf" }.to_string()
    } else if value == value.trunc() && value.abs() < 1e16 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

fn quote_str(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('\'');
    for c in text.chars() {
        match c {
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out.push('\'');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repr_primitives() {
        assert_eq!(Value::None.repr(), "None");
        assert_eq!(Value::Bool(true).repr(), "True");
        assert_eq!(Value::Int(-3).repr(), "-3");
        assert_eq!(Value::Str("a'b".to_string()).repr(), "'a\\'b'");
    }

    #[test]
    fn test_repr_distinguishes_int_and_float() {
        assert_eq!(Value::Int(1).repr(), "1");
        assert_eq!(Value::Float(1.0).repr(), "1.0");
        assert_eq!(Value::Float(1.5).repr(), "1.5");
    }

    #[test]
    fn test_repr_list_is_recursive() {
        let value = Value::List(vec![
            Value::Int(1),
            Value::Str("x".to_string()),
            Value::List(vec![Value::Bool(false)]),
        ]);
        assert_eq!(value.repr(), "[1, 'x', [False]]");
    }

    #[test]
    fn test_eq_numeric_coercion() {
        assert!(Value::eq(&Value::Int(1), &Value::Float(1.0)));
        assert!(Value::eq(&Value::Bool(true), &Value::Int(1)));
        assert!(!Value::eq(&Value::Int(1), &Value::Str("1".to_string())));
    }

    #[test]
    fn test_compare_lists_lexicographically() {
        let a = Value::List(vec![Value::Int(1), Value::Int(2)]);
        let b = Value::List(vec![Value::Int(1), Value::Int(3)]);
        assert_eq!(Value::compare(&a, &b).unwrap(), Ordering::Less);

        let prefix = Value::List(vec![Value::Int(1)]);
        assert_eq!(Value::compare(&prefix, &a).unwrap(), Ordering::Less);
    }

    #[test]
    fn test_compare_mixed_types_faults() {
        assert!(Value::compare(&Value::Int(1), &Value::Str("a".to_string())).is_err());
    }

    #[test]
    fn test_truthiness() {
        assert!(!Value::None.truthy());
        assert!(!Value::Str(String::new()).truthy());
        assert!(Value::List(vec![Value::Int(0)]).truthy());
        assert!(!Value::Float(0.0).truthy());
    }
}
