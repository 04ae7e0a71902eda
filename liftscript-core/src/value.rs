//! Runtime values in LiftScript
//!
//! Values are numbers, weights, booleans, text (string literals passed
//! to functions) and undefined. Each operator is defined per pair of
//! tags; every other pairing is a type error.

use crate::{ScriptError, Unit, Weight};
use serde::{Deserialize, Serialize};

/// Runtime value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Value {
    Number(f64),
    Weight(Weight),
    Bool(bool),
    Text(String),
    Undefined,
}

/// Arithmetic operators understood by the value model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl ArithOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
            ArithOp::Mul => "*",
            ArithOp::Div => "/",
            ArithOp::Rem => "%",
        }
    }

    fn apply(self, l: f64, r: f64) -> Result<f64, ScriptError> {
        match self {
            ArithOp::Add => Ok(l + r),
            ArithOp::Sub => Ok(l - r),
            ArithOp::Mul => Ok(l * r),
            ArithOp::Div | ArithOp::Rem if r == 0.0 => Err(ScriptError::div_zero()),
            ArithOp::Div => Ok(l / r),
            ArithOp::Rem => Ok(l % r),
        }
    }
}

/// Comparison operators understood by the value model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CmpOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            CmpOp::Eq => "==",
            CmpOp::Ne => "!=",
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
        }
    }

    pub fn is_equality(&self) -> bool {
        matches!(self, CmpOp::Eq | CmpOp::Ne)
    }

    fn ordered(self, l: f64, r: f64) -> bool {
        match self {
            CmpOp::Eq => l == r,
            CmpOp::Ne => l != r,
            CmpOp::Lt => l < r,
            CmpOp::Le => l <= r,
            CmpOp::Gt => l > r,
            CmpOp::Ge => l >= r,
        }
    }
}

impl Value {
    // ========== Safe Accessors (never panic) ==========

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_weight(&self) -> Option<Weight> {
        match self {
            Value::Weight(w) => Some(*w),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "Number",
            Value::Weight(_) => "Weight",
            Value::Bool(_) => "Bool",
            Value::Text(_) => "Text",
            Value::Undefined => "Undefined",
        }
    }

    // ========== Coercion ==========

    /// Truthiness used by `&&`, `||`, `!` and conditions
    pub fn truthy(&self) -> bool {
        match self {
            Value::Number(n) => *n != 0.0,
            Value::Weight(w) => !w.is_zero(),
            Value::Bool(b) => *b,
            Value::Text(s) => !s.is_empty(),
            Value::Undefined => false,
        }
    }

    // ========== Operators ==========

    pub fn arith(&self, op: ArithOp, rhs: &Value) -> Result<Value, ScriptError> {
        match (self, rhs) {
            (Value::Number(l), Value::Number(r)) => op.apply(*l, *r).map(Value::Number),
            (Value::Weight(l), Value::Number(r)) => {
                let value = op.apply(l.value, *r)?;
                Ok(Value::Weight(Weight::new(value, l.unit)))
            }
            (Value::Number(l), Value::Weight(r)) => match op {
                ArithOp::Add | ArithOp::Sub | ArithOp::Mul => {
                    let value = op.apply(*l, r.value)?;
                    Ok(Value::Weight(Weight::new(value, r.unit)))
                }
                ArithOp::Div | ArithOp::Rem => Err(ScriptError::invalid_operation(
                    "Invalid operation between number and weight",
                )),
            },
            (Value::Weight(l), Value::Weight(r)) => match op {
                ArithOp::Add | ArithOp::Sub => {
                    let r = r.convert_to(l.unit);
                    let value = op.apply(l.value, r.value)?;
                    Ok(Value::Weight(Weight::new(value, l.unit)))
                }
                ArithOp::Mul | ArithOp::Div | ArithOp::Rem => Err(
                    ScriptError::invalid_operation("Invalid operation between weights"),
                ),
            },
            (l, r) => Err(ScriptError::invalid_operation(format!(
                "Cannot apply '{}' to {} and {}",
                op.symbol(),
                l.type_name(),
                r.type_name()
            ))),
        }
    }

    pub fn compare(&self, op: CmpOp, rhs: &Value) -> Result<bool, ScriptError> {
        match (self, rhs) {
            (Value::Number(l), Value::Number(r)) => Ok(op.ordered(*l, *r)),
            (Value::Weight(l), Value::Weight(r)) => {
                let r = r.convert_to(l.unit);
                match op {
                    CmpOp::Eq => Ok(l.approx_eq(&r)),
                    CmpOp::Ne => Ok(!l.approx_eq(&r)),
                    _ => Ok(op.ordered(l.value, r.value)),
                }
            }
            (Value::Bool(l), Value::Bool(r)) if op.is_equality() => {
                Ok((l == r) == (op == CmpOp::Eq))
            }
            (Value::Text(l), Value::Text(r)) if op.is_equality() => {
                Ok((l == r) == (op == CmpOp::Eq))
            }
            (Value::Undefined, other) | (other, Value::Undefined) if op.is_equality() => {
                Ok(other.is_undefined() == (op == CmpOp::Eq))
            }
            (l, r) => Err(ScriptError::invalid_operation(format!(
                "Cannot compare {} and {} with '{}'",
                l.type_name(),
                r.type_name(),
                op.symbol()
            ))),
        }
    }

    pub fn negate(&self) -> Result<Value, ScriptError> {
        match self {
            Value::Number(n) => Ok(Value::Number(-n)),
            Value::Weight(w) => Ok(Value::Weight(w.map(|v| -v))),
            other => Err(ScriptError::type_error("Number or Weight", other.type_name())),
        }
    }

    /// Treat a bare number as a weight in `unit`
    pub fn into_weight(self, unit: Unit) -> Result<Value, ScriptError> {
        match self {
            Value::Number(n) => Ok(Value::Weight(Weight::new(n, unit))),
            Value::Weight(w) => Ok(Value::Weight(w)),
            Value::Undefined => Ok(Value::Undefined),
            other => Err(ScriptError::type_error("Weight", other.type_name())),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Number(n) => f.write_str(&crate::unit::format_magnitude(*n)),
            Value::Weight(w) => write!(f, "{}", w),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Text(s) => write!(f, "{}", s),
            Value::Undefined => f.write_str("undefined"),
        }
    }
}

// ========== Conversions ==========

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Number(n as f64)
    }
}

impl From<Weight> for Value {
    fn from(w: Weight) -> Self {
        Value::Weight(w)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Undefined)
    }
}
