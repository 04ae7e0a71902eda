//! Aggregate functions

use liftscript_plugin::prelude::*;
use liftscript_core::{ArithOp, CmpOp};

pub struct Min;
pub struct Max;
pub struct Sum;

static VALUES_ARGS: [ArgMeta; 1] = [ArgMeta::required("values", "Number... | Weight...", "Values of one kind")];
static MIN_EXAMPLES: [&str; 2] = ["min(5, r)", "min(w, 100lb)"];
static MAX_EXAMPLES: [&str; 2] = ["max(cr, 1)", "max(w - 10lb, 45lb)"];
static SUM_EXAMPLES: [&str; 1] = ["sum(1, 2, 3)"];

/// Pick the extreme value; all arguments must share one kind. Weights
/// come back in the first argument's unit.
fn extreme(func: &str, args: &[Value], keep: CmpOp) -> Result<Value, ScriptError> {
    let first = &args[0];
    let kind = first.type_name();
    if !matches!(first, Value::Number(_) | Value::Weight(_)) {
        return Err(ScriptError::arg_type(func, "values", "Number or Weight", kind));
    }

    let mut best = first.clone();
    for arg in &args[1..] {
        if arg.type_name() != kind {
            return Err(ScriptError::arg_type(func, "values", kind, arg.type_name()));
        }
        if arg.compare(keep, &best)? {
            best = arg.clone();
        }
    }

    Ok(match (first, best) {
        (Value::Weight(f), Value::Weight(b)) => Value::Weight(b.convert_to(f.unit)),
        (_, best) => best,
    })
}

impl FunctionPlugin for Min {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "min",
            description: "Smallest of two or more values of the same kind",
            usage: "min(a, b, ...)",
            arity: Arity::AtLeast(2),
            args: &VALUES_ARGS,
            returns: "Number | Weight",
            examples: &MIN_EXAMPLES,
            category: "aggregate",
        }
    }

    fn call(&self, args: &[Value], _ctx: &EvalContext) -> Result<Value, ScriptError> {
        extreme("min", args, CmpOp::Lt)
    }
}

impl FunctionPlugin for Max {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "max",
            description: "Largest of two or more values of the same kind",
            usage: "max(a, b, ...)",
            arity: Arity::AtLeast(2),
            args: &VALUES_ARGS,
            returns: "Number | Weight",
            examples: &MAX_EXAMPLES,
            category: "aggregate",
        }
    }

    fn call(&self, args: &[Value], _ctx: &EvalContext) -> Result<Value, ScriptError> {
        extreme("max", args, CmpOp::Gt)
    }
}

impl FunctionPlugin for Sum {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "sum",
            description: "Sum of values, following the rules of '+'",
            usage: "sum(a, b, ...)",
            arity: Arity::AtLeast(1),
            args: &VALUES_ARGS,
            returns: "Number | Weight",
            examples: &SUM_EXAMPLES,
            category: "aggregate",
        }
    }

    fn call(&self, args: &[Value], _ctx: &EvalContext) -> Result<Value, ScriptError> {
        let mut total = args[0].clone();
        if !matches!(total, Value::Number(_) | Value::Weight(_)) {
            return Err(ScriptError::arg_type("sum", "values", "Number or Weight", total.type_name()));
        }
        for arg in &args[1..] {
            total = total.arith(ArithOp::Add, arg)?;
        }
        Ok(total)
    }
}
