//! Core math functions
//!
//! Each applies to a Number, or to a Weight's magnitude keeping its unit.

use liftscript_plugin::prelude::*;

pub struct Floor;
pub struct Ceil;
pub struct Round;
pub struct Abs;

static X_ARGS: [ArgMeta; 1] = [ArgMeta::required("x", "Number | Weight", "Value")];

static FLOOR_EXAMPLES: [&str; 2] = ["floor(3.7)", "floor(102.5lb)"];
static CEIL_EXAMPLES: [&str; 2] = ["ceil(3.2)", "ceil(61.2kg)"];
static ROUND_EXAMPLES: [&str; 2] = ["round(3.5)", "round(w * 0.9)"];
static ABS_EXAMPLES: [&str; 1] = ["abs(cr - r)"];

fn map_magnitude(func: &str, arg: &Value, f: impl FnOnce(f64) -> f64) -> Result<Value, ScriptError> {
    match arg {
        Value::Number(n) => Ok(Value::Number(f(*n))),
        Value::Weight(w) => Ok(Value::Weight(w.map(f))),
        other => Err(ScriptError::arg_type(func, "x", "Number or Weight", other.type_name())),
    }
}

impl FunctionPlugin for Floor {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "floor",
            description: "Largest whole value not above x",
            usage: "floor(x)",
            arity: Arity::Exact(1),
            args: &X_ARGS,
            returns: "Number | Weight",
            examples: &FLOOR_EXAMPLES,
            category: "math",
        }
    }

    fn call(&self, args: &[Value], _ctx: &EvalContext) -> Result<Value, ScriptError> {
        map_magnitude("floor", &args[0], f64::floor)
    }
}

impl FunctionPlugin for Ceil {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "ceil",
            description: "Smallest whole value not below x",
            usage: "ceil(x)",
            arity: Arity::Exact(1),
            args: &X_ARGS,
            returns: "Number | Weight",
            examples: &CEIL_EXAMPLES,
            category: "math",
        }
    }

    fn call(&self, args: &[Value], _ctx: &EvalContext) -> Result<Value, ScriptError> {
        map_magnitude("ceil", &args[0], f64::ceil)
    }
}

impl FunctionPlugin for Round {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "round",
            description: "Round to the nearest whole value (halves away from zero)",
            usage: "round(x)",
            arity: Arity::Exact(1),
            args: &X_ARGS,
            returns: "Number | Weight",
            examples: &ROUND_EXAMPLES,
            category: "math",
        }
    }

    fn call(&self, args: &[Value], _ctx: &EvalContext) -> Result<Value, ScriptError> {
        map_magnitude("round", &args[0], f64::round)
    }
}

impl FunctionPlugin for Abs {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "abs",
            description: "Absolute value",
            usage: "abs(x)",
            arity: Arity::Exact(1),
            args: &X_ARGS,
            returns: "Number | Weight",
            examples: &ABS_EXAMPLES,
            category: "math",
        }
    }

    fn call(&self, args: &[Value], _ctx: &EvalContext) -> Result<Value, ScriptError> {
        map_magnitude("abs", &args[0], f64::abs)
    }
}
