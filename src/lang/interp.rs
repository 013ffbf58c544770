//! Tree-walking interpreter and the shared execution scope.

use super::ast::{BinOp, CmpOp, Expr, Stmt, UnaryOp};
use super::parser::{parse_expression, parse_program};
use super::value::{FunctionDef, Value};
use super::LangError;
use indexmap::IndexMap;
use std::cmp::Ordering;
use std::io::Write;
use std::rc::Rc;

/// Call-frame limit; deep candidate recursion becomes a fault instead of a
/// native stack overflow.
const MAX_CALL_DEPTH: usize = 64;

/// Upper bound on a materialized `range()` so a huge argument faults instead
/// of exhausting memory.
const MAX_RANGE_LEN: i64 = 1_000_000;

const BUILTIN_NAMES: &[&str] = &[
    "print", "len", "abs", "min", "max", "sum", "range", "str", "repr", "int", "float", "bool",
];

/// The mutable namespace one grading run executes against.
///
/// Created empty, mutated only by running code; insertion order of bindings
/// is preserved. One runner owns exactly one scope for its whole lifetime.
pub struct Scope {
    globals: IndexMap<String, Value>,
}

impl Scope {
    pub fn new() -> Self {
        Scope {
            globals: IndexMap::new(),
        }
    }

    /// Run source for its side effects (run-as-statement).
    pub fn exec(&mut self, source: &str) -> Result<(), LangError> {
        let program = parse_program(source)?;
        let mut interp = Interp::new(&mut self.globals);
        for stmt in &program {
            if let Flow::Return(_) = interp.exec_stmt(stmt)? {
                return Err(LangError::Syntax("'return' outside function".to_string()));
            }
        }
        Ok(())
    }

    /// Evaluate source as a single expression (run-as-expression).
    pub fn eval(&mut self, source: &str) -> Result<Value, LangError> {
        let expr = parse_expression(source)?;
        let mut interp = Interp::new(&mut self.globals);
        interp.eval_expr(&expr)
    }

    /// Insert a binding directly, bypassing candidate code.
    pub fn bind(&mut self, name: &str, value: Value) {
        self.globals.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.globals.get(name)
    }

    pub fn len(&self) -> usize {
        self.globals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.globals.is_empty()
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

/// Control flow outcome of executing a statement.
enum Flow {
    Normal,
    Return(Value),
}

struct Interp<'a> {
    globals: &'a mut IndexMap<String, Value>,
    frames: Vec<IndexMap<String, Value>>,
}

impl<'a> Interp<'a> {
    fn new(globals: &'a mut IndexMap<String, Value>) -> Self {
        Interp {
            globals,
            frames: Vec::new(),
        }
    }

    fn exec_block(&mut self, stmts: &[Stmt]) -> Result<Flow, LangError> {
        for stmt in stmts {
            if let Flow::Return(value) = self.exec_stmt(stmt)? {
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Normal)
    }

    fn exec_stmt(&mut self, stmt: &Stmt) -> Result<Flow, LangError> {
        match stmt {
            Stmt::Assign { target, value } => {
                let value = self.eval_expr(value)?;
                self.assign(target, value);
                Ok(Flow::Normal)
            }
            Stmt::AugAssign { target, op, value } => {
                let current = self.lookup(target)?;
                let rhs = self.eval_expr(value)?;
                let combined = binary_op(*op, &current, &rhs)?;
                self.assign(target, combined);
                Ok(Flow::Normal)
            }
            Stmt::Expr(expr) => {
                self.eval_expr(expr)?;
                Ok(Flow::Normal)
            }
            Stmt::Def { name, params, body } => {
                let func = FunctionDef {
                    name: name.clone(),
                    params: params.clone(),
                    body: body.clone(),
                };
                self.assign(name, Value::Function(Rc::new(func)));
                Ok(Flow::Normal)
            }
            Stmt::Return(expr) => {
                if self.frames.is_empty() {
                    return Err(LangError::Syntax("'return' outside function".to_string()));
                }
                let value = match expr {
                    Some(expr) => self.eval_expr(expr)?,
                    None => Value::None,
                };
                Ok(Flow::Return(value))
            }
            Stmt::If { branches, orelse } => {
                for (cond, body) in branches {
                    if self.eval_expr(cond)?.truthy() {
                        return self.exec_block(body);
                    }
                }
                self.exec_block(orelse)
            }
            Stmt::While { cond, body } => {
                while self.eval_expr(cond)?.truthy() {
                    if let Flow::Return(value) = self.exec_block(body)? {
                        return Ok(Flow::Return(value));
                    }
                }
                Ok(Flow::Normal)
            }
            Stmt::For { target, iter, body } => {
                let items = self.iterable(iter)?;
                for item in items {
                    self.assign(target, item);
                    if let Flow::Return(value) = self.exec_block(body)? {
                        return Ok(Flow::Return(value));
                    }
                }
                Ok(Flow::Normal)
            }
        }
    }

    fn iterable(&mut self, expr: &Expr) -> Result<Vec<Value>, LangError> {
        match self.eval_expr(expr)? {
            Value::List(items) => Ok(items),
            Value::Str(text) => Ok(text.chars().map(|c| Value::Str(c.to_string())).collect()),
            other => Err(LangError::Type(format!(
                "'{}' object is not iterable",
                other.type_name()
            ))),
        }
    }

    fn assign(&mut self, name: &str, value: Value) {
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(name.to_string(), value);
        } else {
            self.globals.insert(name.to_string(), value);
        }
    }

    fn lookup(&self, name: &str) -> Result<Value, LangError> {
        if let Some(frame) = self.frames.last() {
            if let Some(value) = frame.get(name) {
                return Ok(value.clone());
            }
        }
        if let Some(value) = self.globals.get(name) {
            return Ok(value.clone());
        }
        if let Some(builtin) = BUILTIN_NAMES.iter().copied().find(|n| *n == name) {
            return Ok(Value::Builtin(builtin));
        }
        Err(LangError::Name(name.to_string()))
    }

    fn eval_expr(&mut self, expr: &Expr) -> Result<Value, LangError> {
        match expr {
            Expr::None => Ok(Value::None),
            Expr::Bool(value) => Ok(Value::Bool(*value)),
            Expr::Int(value) => Ok(Value::Int(*value)),
            Expr::Float(value) => Ok(Value::Float(*value)),
            Expr::Str(value) => Ok(Value::Str(value.clone())),
            Expr::Name(name) => self.lookup(name),
            Expr::List(items) => {
                let values = items
                    .iter()
                    .map(|item| self.eval_expr(item))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::List(values))
            }
            Expr::Unary { op, operand } => {
                let value = self.eval_expr(operand)?;
                unary_op(*op, &value)
            }
            Expr::Binary { op, left, right } => {
                let left = self.eval_expr(left)?;
                let right = self.eval_expr(right)?;
                binary_op(*op, &left, &right)
            }
            Expr::And { left, right } => {
                let left = self.eval_expr(left)?;
                if left.truthy() {
                    self.eval_expr(right)
                } else {
                    Ok(left)
                }
            }
            Expr::Or { left, right } => {
                let left = self.eval_expr(left)?;
                if left.truthy() {
                    Ok(left)
                } else {
                    self.eval_expr(right)
                }
            }
            Expr::Compare { op, left, right } => {
                let left = self.eval_expr(left)?;
                let right = self.eval_expr(right)?;
                compare_op(*op, &left, &right)
            }
            Expr::Call { func, args } => {
                let callee = self.eval_expr(func)?;
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.eval_expr(arg)?);
                }
                self.call(callee, values)
            }
            Expr::Index { value, index } => {
                let container = self.eval_expr(value)?;
                let index = self.eval_expr(index)?;
                index_op(&container, &index)
            }
        }
    }

    fn call(&mut self, callee: Value, args: Vec<Value>) -> Result<Value, LangError> {
        match callee {
            Value::Function(func) => {
                if args.len() != func.params.len() {
                    return Err(LangError::Arity {
                        func: func.name.clone(),
                        expected: func.params.len(),
                        given: args.len(),
                    });
                }
                if self.frames.len() >= MAX_CALL_DEPTH {
                    return Err(LangError::RecursionLimit);
                }
                let mut frame = IndexMap::new();
                for (param, arg) in func.params.iter().zip(args) {
                    frame.insert(param.clone(), arg);
                }
                self.frames.push(frame);
                let flow = self.exec_block(&func.body);
                self.frames.pop();
                match flow? {
                    Flow::Return(value) => Ok(value),
                    Flow::Normal => Ok(Value::None),
                }
            }
            Value::Builtin(name) => self.call_builtin(name, args),
            other => Err(LangError::Type(format!(
                "'{}' object is not callable",
                other.type_name()
            ))),
        }
    }

    fn call_builtin(&mut self, name: &'static str, args: Vec<Value>) -> Result<Value, LangError> {
        match name {
            "print" => {
                let rendered: Vec<String> = args.iter().map(Value::str_value).collect();
                let mut stdout = std::io::stdout();
                stdout
                    .write_all(rendered.join(" ").as_bytes())
                    .and_then(|_| stdout.write_all(b"\n"))
                    .and_then(|_| stdout.flush())
                    .map_err(|e| LangError::Io(e.to_string()))?;
                Ok(Value::None)
            }
            "len" => {
                let value = one_arg(name, args)?;
                match value {
                    Value::Str(text) => Ok(Value::Int(text.chars().count() as i64)),
                    Value::List(items) => Ok(Value::Int(items.len() as i64)),
                    other => Err(LangError::Type(format!(
                        "object of type '{}' has no len()",
                        other.type_name()
                    ))),
                }
            }
            "abs" => {
                let value = one_arg(name, args)?;
                match value {
                    Value::Float(f) => Ok(Value::Float(f.abs())),
                    other => match other.as_i64() {
                        Some(i) => i
                            .checked_abs()
                            .map(Value::Int)
                            .ok_or_else(|| LangError::Value("integer overflow".to_string())),
                        None => Err(LangError::Type(format!(
                            "bad operand type for abs(): '{}'",
                            other.type_name()
                        ))),
                    },
                }
            }
            "min" => fold_extremum(name, args, Ordering::Less),
            "max" => fold_extremum(name, args, Ordering::Greater),
            "sum" => {
                let value = one_arg(name, args)?;
                match value {
                    Value::List(items) => {
                        let mut total = Value::Int(0);
                        for item in &items {
                            total = binary_op(BinOp::Add, &total, item)?;
                        }
                        Ok(total)
                    }
                    other => Err(LangError::Type(format!(
                        "'{}' object is not iterable",
                        other.type_name()
                    ))),
                }
            }
            "range" => builtin_range(args),
            "str" => {
                let value = one_arg(name, args)?;
                Ok(Value::Str(value.str_value()))
            }
            "repr" => {
                let value = one_arg(name, args)?;
                Ok(Value::Str(value.repr()))
            }
            "int" => {
                let value = one_arg(name, args)?;
                match &value {
                    Value::Int(i) => Ok(Value::Int(*i)),
                    Value::Bool(b) => Ok(Value::Int(i64::from(*b))),
                    Value::Float(f) => {
                        let truncated = f.trunc();
                        if truncated >= i64::MIN as f64 && truncated <= i64::MAX as f64 {
                            Ok(Value::Int(truncated as i64))
                        } else {
                            Err(LangError::Value("float too large to convert to int".to_string()))
                        }
                    }
                    Value::Str(text) => text.trim().parse::<i64>().map(Value::Int).map_err(|_| {
                        LangError::Value(format!(
                            "invalid literal for int() with base 10: '{}'",
                            text.trim()
                        ))
                    }),
                    other => Err(LangError::Type(format!(
                        "int() argument must be a string or a number, not '{}'",
                        other.type_name()
                    ))),
                }
            }
            "float" => {
                let value = one_arg(name, args)?;
                match &value {
                    Value::Str(text) => text.trim().parse::<f64>().map(Value::Float).map_err(|_| {
                        LangError::Value(format!(
                            "could not convert string to float: '{}'",
                            text.trim()
                        ))
                    }),
                    other => other.as_f64().map(Value::Float).ok_or_else(|| {
                        LangError::Type(format!(
                            "float() argument must be a string or a number, not '{}'",
                            other.type_name()
                        ))
                    }),
                }
            }
            "bool" => {
                let value = one_arg(name, args)?;
                Ok(Value::Bool(value.truthy()))
            }
            _ => Err(LangError::Name(name.to_string())),
        }
    }
}

fn one_arg(name: &str, mut args: Vec<Value>) -> Result<Value, LangError> {
    if args.len() != 1 {
        return Err(LangError::Arity {
            func: name.to_string(),
            expected: 1,
            given: args.len(),
        });
    }
    Ok(args.remove(0))
}

/// Shared scaffolding for `min`/`max`: one list argument or two-plus scalars.
fn fold_extremum(name: &str, args: Vec<Value>, keep: Ordering) -> Result<Value, LangError> {
    let items = match args.len() {
        0 => {
            return Err(LangError::Arity {
                func: name.to_string(),
                expected: 1,
                given: 0,
            })
        }
        1 => match args.into_iter().next() {
            Some(Value::List(items)) => items,
            Some(other) => {
                return Err(LangError::Type(format!(
                    "'{}' object is not iterable",
                    other.type_name()
                )))
            }
            None => Vec::new(),
        },
        _ => args,
    };
    let mut iter = items.into_iter();
    let mut best = iter
        .next()
        .ok_or_else(|| LangError::Value(format!("{name}() arg is an empty sequence")))?;
    for item in iter {
        if Value::compare(&item, &best)? == keep {
            best = item;
        }
    }
    Ok(best)
}

fn builtin_range(args: Vec<Value>) -> Result<Value, LangError> {
    let ints: Vec<i64> = args
        .iter()
        .map(|v| {
            v.as_i64().ok_or_else(|| {
                LangError::Type(format!(
                    "'{}' object cannot be interpreted as an integer",
                    v.type_name()
                ))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let (start, stop, step) = match ints.as_slice() {
        [stop] => (0, *stop, 1),
        [start, stop] => (*start, *stop, 1),
        [start, stop, step] => (*start, *stop, *step),
        _ => {
            return Err(LangError::Arity {
                func: "range".to_string(),
                expected: 3,
                given: ints.len(),
            })
        }
    };
    if step == 0 {
        return Err(LangError::Value("range() arg 3 must not be zero".to_string()));
    }

    let mut items = Vec::new();
    let mut current = start;
    while (step > 0 && current < stop) || (step < 0 && current > stop) {
        items.push(Value::Int(current));
        if items.len() as i64 > MAX_RANGE_LEN {
            return Err(LangError::Value("range() result is too large".to_string()));
        }
        current = match current.checked_add(step) {
            Some(next) => next,
            None => break,
        };
    }
    Ok(Value::List(items))
}

fn unary_op(op: UnaryOp, value: &Value) -> Result<Value, LangError> {
    match op {
        UnaryOp::Not => Ok(Value::Bool(!value.truthy())),
        UnaryOp::Neg => match value {
            Value::Float(f) => Ok(Value::Float(-f)),
            other => match other.as_i64() {
                Some(i) => i
                    .checked_neg()
                    .map(Value::Int)
                    .ok_or_else(|| LangError::Value("integer overflow".to_string())),
                None => Err(LangError::Type(format!(
                    "bad operand type for unary -: '{}'",
                    other.type_name()
                ))),
            },
        },
        UnaryOp::Pos => match value {
            Value::Float(f) => Ok(Value::Float(*f)),
            other => match other.as_i64() {
                Some(i) => Ok(Value::Int(i)),
                None => Err(LangError::Type(format!(
                    "bad operand type for unary +: '{}'",
                    other.type_name()
                ))),
            },
        },
    }
}

pub(crate) fn binary_op(op: BinOp, left: &Value, right: &Value) -> Result<Value, LangError> {
    match op {
        BinOp::Add => match (left, right) {
            (Value::Str(a), Value::Str(b)) => Ok(Value::Str(format!("{a}{b}"))),
            (Value::List(a), Value::List(b)) => {
                let mut joined = a.clone();
                joined.extend(b.iter().cloned());
                Ok(Value::List(joined))
            }
            _ => numeric_op(op, left, right),
        },
        BinOp::Mul => match (left, right) {
            (Value::Str(text), other) | (other, Value::Str(text)) if other.as_i64().is_some() => {
                let count = other.as_i64().unwrap_or(0).max(0) as usize;
                Ok(Value::Str(text.repeat(count)))
            }
            (Value::List(items), other) | (other, Value::List(items))
                if other.as_i64().is_some() =>
            {
                let count = other.as_i64().unwrap_or(0).max(0) as usize;
                let mut repeated = Vec::with_capacity(items.len() * count);
                for _ in 0..count {
                    repeated.extend(items.iter().cloned());
                }
                Ok(Value::List(repeated))
            }
            _ => numeric_op(op, left, right),
        },
        _ => numeric_op(op, left, right),
    }
}

fn numeric_op(op: BinOp, left: &Value, right: &Value) -> Result<Value, LangError> {
    if let (Some(a), Some(b)) = (left.as_i64(), right.as_i64()) {
        return int_op(op, a, b);
    }
    if let (Some(a), Some(b)) = (left.as_f64(), right.as_f64()) {
        return float_op(op, a, b);
    }
    Err(LangError::Type(format!(
        "unsupported operand type(s) for {}: '{}' and '{}'",
        op,
        left.type_name(),
        right.type_name()
    )))
}

fn int_op(op: BinOp, a: i64, b: i64) -> Result<Value, LangError> {
    let overflow = || LangError::Value("integer overflow".to_string());
    match op {
        BinOp::Add => a.checked_add(b).map(Value::Int).ok_or_else(overflow),
        BinOp::Sub => a.checked_sub(b).map(Value::Int).ok_or_else(overflow),
        BinOp::Mul => a.checked_mul(b).map(Value::Int).ok_or_else(overflow),
        BinOp::Div => {
            if b == 0 {
                Err(LangError::ZeroDivision)
            } else {
                Ok(Value::Float(a as f64 / b as f64))
            }
        }
        BinOp::FloorDiv => {
            if b == 0 {
                Err(LangError::ZeroDivision)
            } else {
                // Quotient rounds toward negative infinity
                let quotient = a / b;
                let adjusted = if a % b != 0 && (a < 0) != (b < 0) {
                    quotient - 1
                } else {
                    quotient
                };
                Ok(Value::Int(adjusted))
            }
        }
        BinOp::Mod => {
            if b == 0 {
                Err(LangError::ZeroDivision)
            } else {
                // Result carries the sign of the divisor
                let remainder = a % b;
                let adjusted = if remainder != 0 && (remainder < 0) != (b < 0) {
                    remainder + b
                } else {
                    remainder
                };
                Ok(Value::Int(adjusted))
            }
        }
        BinOp::Pow => {
            if b < 0 {
                Ok(Value::Float((a as f64).powf(b as f64)))
            } else {
                let exponent = u32::try_from(b).map_err(|_| overflow())?;
                a.checked_pow(exponent).map(Value::Int).ok_or_else(overflow)
            }
        }
    }
}

fn float_op(op: BinOp, a: f64, b: f64) -> Result<Value, LangError> {
    match op {
        BinOp::Add => Ok(Value::Float(a + b)),
        BinOp::Sub => Ok(Value::Float(a - b)),
        BinOp::Mul => Ok(Value::Float(a * b)),
        BinOp::Div => {
            if b == 0.0 {
                Err(LangError::ZeroDivision)
            } else {
                Ok(Value::Float(a / b))
            }
        }
        BinOp::FloorDiv => {
            if b == 0.0 {
                Err(LangError::ZeroDivision)
            } else {
                Ok(Value::Float((a / b).floor()))
            }
        }
        BinOp::Mod => {
            if b == 0.0 {
                Err(LangError::ZeroDivision)
            } else {
                Ok(Value::Float(a - b * (a / b).floor()))
            }
        }
        BinOp::Pow => Ok(Value::Float(a.powf(b))),
    }
}

fn compare_op(op: CmpOp, left: &Value, right: &Value) -> Result<Value, LangError> {
    let result = match op {
        CmpOp::Eq => Value::eq(left, right),
        CmpOp::Ne => !Value::eq(left, right),
        CmpOp::Lt => Value::compare(left, right)? == Ordering::Less,
        CmpOp::Le => Value::compare(left, right)? != Ordering::Greater,
        CmpOp::Gt => Value::compare(left, right)? == Ordering::Greater,
        CmpOp::Ge => Value::compare(left, right)? != Ordering::Less,
    };
    Ok(Value::Bool(result))
}

fn index_op(container: &Value, index: &Value) -> Result<Value, LangError> {
    let position = match index.as_i64() {
        Some(i) => i,
        None => {
            return Err(LangError::Type(format!(
                "indices must be integers, not '{}'",
                index.type_name()
            )))
        }
    };
    match container {
        Value::List(items) => {
            let resolved = resolve_index(position, items.len())
                .ok_or_else(|| LangError::Index("list".to_string()))?;
            Ok(items[resolved].clone())
        }
        Value::Str(text) => {
            let chars: Vec<char> = text.chars().collect();
            let resolved = resolve_index(position, chars.len())
                .ok_or_else(|| LangError::Index("string".to_string()))?;
            Ok(Value::Str(chars[resolved].to_string()))
        }
        other => Err(LangError::Type(format!(
            "'{}' object is not subscriptable",
            other.type_name()
        ))),
    }
}

/// Map a possibly negative index onto `0..len`.
fn resolve_index(index: i64, len: usize) -> Option<usize> {
    let len = len as i64;
    let resolved = if index < 0 { index + len } else { index };
    if resolved < 0 || resolved >= len {
        None
    } else {
        Some(resolved as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(scope: &mut Scope, source: &str) -> Value {
        scope.eval(source).unwrap()
    }

    #[test]
    fn test_exec_empty_program_is_noop() {
        let mut scope = Scope::new();
        scope.exec("").unwrap();
        assert!(scope.is_empty());
    }

    #[test]
    fn test_assignment_mutates_scope() {
        let mut scope = Scope::new();
        scope.exec("foo = 1").unwrap();
        assert_eq!(eval(&mut scope, "foo").repr(), "1");
    }

    #[test]
    fn test_undefined_name_message() {
        let mut scope = Scope::new();
        let err = scope.exec("foo = bar").unwrap_err();
        assert_eq!(err.to_string(), "name 'bar' is not defined");
    }

    #[test]
    fn test_arithmetic_semantics() {
        let mut scope = Scope::new();
        assert_eq!(eval(&mut scope, "7 // 2").repr(), "3");
        assert_eq!(eval(&mut scope, "-7 // 2").repr(), "-4");
        assert_eq!(eval(&mut scope, "-7 % 3").repr(), "2");
        assert_eq!(eval(&mut scope, "7 % -3").repr(), "-2");
        assert_eq!(eval(&mut scope, "7 / 2").repr(), "3.5");
        assert_eq!(eval(&mut scope, "2 ** 10").repr(), "1024");
        assert_eq!(eval(&mut scope, "2 ** -1").repr(), "0.5");
        assert_eq!(eval(&mut scope, "-2 ** 2").repr(), "-4");
    }

    #[test]
    fn test_division_by_zero_faults() {
        let mut scope = Scope::new();
        let err = scope.eval("1 / 0").unwrap_err();
        assert_eq!(err.to_string(), "division by zero");
        assert!(scope.eval("1 // 0").is_err());
        assert!(scope.eval("1 % 0").is_err());
    }

    #[test]
    fn test_integer_overflow_is_fault_not_panic() {
        let mut scope = Scope::new();
        scope.exec("big = 9223372036854775807").unwrap();
        assert!(scope.eval("big + 1").is_err());
    }

    #[test]
    fn test_function_definition_and_call() {
        let mut scope = Scope::new();
        scope.exec("def double(x):\n  return x * 2").unwrap();
        assert_eq!(eval(&mut scope, "double(21)").repr(), "42");
    }

    #[test]
    fn test_function_locals_do_not_leak() {
        let mut scope = Scope::new();
        scope
            .exec("def f(x):\n  local = x + 1\n  return local\ny = f(1)")
            .unwrap();
        assert_eq!(eval(&mut scope, "y").repr(), "2");
        assert!(scope.eval("local").is_err());
        assert!(scope.eval("x").is_err());
    }

    #[test]
    fn test_recursion_works_and_is_bounded() {
        let mut scope = Scope::new();
        scope
            .exec("def fact(n):\n  if n <= 1:\n    return 1\n  return n * fact(n - 1)")
            .unwrap();
        assert_eq!(eval(&mut scope, "fact(10)").repr(), "3628800");

        scope.exec("def loop(n):\n  return loop(n + 1)").unwrap();
        let err = scope.eval("loop(0)").unwrap_err();
        assert_eq!(err, LangError::RecursionLimit);
    }

    #[test]
    fn test_while_and_for_loops() {
        let mut scope = Scope::new();
        scope
            .exec("total = 0\nfor n in range(5):\n  total += n")
            .unwrap();
        assert_eq!(eval(&mut scope, "total").repr(), "10");

        scope.exec("i = 0\nwhile i < 3:\n  i = i + 1").unwrap();
        assert_eq!(eval(&mut scope, "i").repr(), "3");
    }

    #[test]
    fn test_short_circuit_yields_operand() {
        let mut scope = Scope::new();
        assert_eq!(eval(&mut scope, "0 or 'fallback'").repr(), "'fallback'");
        assert_eq!(eval(&mut scope, "1 and 2").repr(), "2");
        // Right side must not evaluate when the left decides
        assert_eq!(eval(&mut scope, "0 and missing").repr(), "0");
        assert_eq!(eval(&mut scope, "1 or missing").repr(), "1");
    }

    #[test]
    fn test_builtins() {
        let mut scope = Scope::new();
        assert_eq!(eval(&mut scope, "len('abc')").repr(), "3");
        assert_eq!(eval(&mut scope, "len([1, 2])").repr(), "2");
        assert_eq!(eval(&mut scope, "abs(-3)").repr(), "3");
        assert_eq!(eval(&mut scope, "min([4, 2, 9])").repr(), "2");
        assert_eq!(eval(&mut scope, "max(1, 5, 3)").repr(), "5");
        assert_eq!(eval(&mut scope, "sum([1, 2, 3])").repr(), "6");
        assert_eq!(eval(&mut scope, "range(3)").repr(), "[0, 1, 2]");
        assert_eq!(eval(&mut scope, "range(4, 0, -2)").repr(), "[4, 2]");
        assert_eq!(eval(&mut scope, "str(12)").repr(), "'12'");
        assert_eq!(eval(&mut scope, "repr('x')").repr(), "'\\'x\\''");
        assert_eq!(eval(&mut scope, "int('7')").repr(), "7");
        assert_eq!(eval(&mut scope, "float(2)").repr(), "2.0");
        assert_eq!(eval(&mut scope, "bool([])").repr(), "False");
    }

    #[test]
    fn test_indexing() {
        let mut scope = Scope::new();
        scope.exec("xs = [10, 20, 30]").unwrap();
        assert_eq!(eval(&mut scope, "xs[0]").repr(), "10");
        assert_eq!(eval(&mut scope, "xs[-1]").repr(), "30");
        assert_eq!(eval(&mut scope, "'abc'[1]").repr(), "'b'");
        let err = scope.eval("xs[3]").unwrap_err();
        assert_eq!(err.to_string(), "list index out of range");
    }

    #[test]
    fn test_return_outside_function_faults() {
        let mut scope = Scope::new();
        assert!(scope.exec("return 1").is_err());
    }

    #[test]
    fn test_bind_and_get() {
        let mut scope = Scope::new();
        scope.bind("YOUR_SOLUTION", Value::Str("foo = 1".to_string()));
        assert_eq!(eval(&mut scope, "YOUR_SOLUTION").repr(), "'foo = 1'");
        assert!(scope.get("YOUR_SOLUTION").is_some());
    }
}
