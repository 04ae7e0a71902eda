//! History accessors over per-set series
//!
//! Series are supplied by the caller in `EvalContext::history` and are
//! indexed from 1. Without an index the current `setIndex` binding is used.

use liftscript_plugin::prelude::*;

pub const COMPLETED_REPS: &str = "completedReps";
pub const REPS: &str = "reps";
pub const WEIGHTS: &str = "weights";
pub const SET_INDEX: &str = "setIndex";

pub struct CompletedReps;
pub struct Reps;
pub struct Weights;
pub struct AllCompleted;

static INDEX_ARGS: [ArgMeta; 1] = [ArgMeta::optional("set", "Number", "1-based set number (default: setIndex)")];
static COMPLETED_REPS_EXAMPLES: [&str; 2] = ["completedReps(1)", "completedReps() >= r"];
static REPS_EXAMPLES: [&str; 1] = ["reps(3)"];
static WEIGHTS_EXAMPLES: [&str; 1] = ["weights(1) + 5lb"];
static ALL_COMPLETED_EXAMPLES: [&str; 1] = ["allCompleted()"];

fn resolve_index(func: &str, args: &[Value], ctx: &EvalContext) -> Result<usize, ScriptError> {
    let raw = match args.first() {
        Some(Value::Number(n)) => *n,
        Some(other) => return Err(ScriptError::arg_type(func, "set", "Number", other.type_name())),
        None => match ctx.get_binding(SET_INDEX) {
            Some(Value::Number(n)) => *n,
            Some(other) => return Err(ScriptError::type_error("Number", other.type_name())),
            None => return Err(ScriptError::undefined_var(SET_INDEX)),
        },
    };
    if raw < 1.0 || raw.fract() != 0.0 || !raw.is_finite() {
        return Err(ScriptError::domain_error(format!("{}() set must be a whole number from 1, got {}", func, raw)));
    }
    Ok(raw as usize)
}

fn lookup(func: &str, series: &str, args: &[Value], ctx: &EvalContext) -> Result<Value, ScriptError> {
    let index = resolve_index(func, args, ctx)?;
    Ok(ctx.history_entry(series, index).cloned().unwrap_or(Value::Undefined))
}

impl FunctionPlugin for CompletedReps {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: COMPLETED_REPS,
            description: "Reps completed in a set of the previous workout",
            usage: "completedReps([set])",
            arity: Arity::Range(0, 1),
            args: &INDEX_ARGS,
            returns: "Number | Undefined",
            examples: &COMPLETED_REPS_EXAMPLES,
            category: "history",
        }
    }

    fn call(&self, args: &[Value], ctx: &EvalContext) -> Result<Value, ScriptError> {
        lookup(COMPLETED_REPS, COMPLETED_REPS, args, ctx)
    }
}

impl FunctionPlugin for Reps {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: REPS,
            description: "Target reps of a set",
            usage: "reps([set])",
            arity: Arity::Range(0, 1),
            args: &INDEX_ARGS,
            returns: "Number | Undefined",
            examples: &REPS_EXAMPLES,
            category: "history",
        }
    }

    fn call(&self, args: &[Value], ctx: &EvalContext) -> Result<Value, ScriptError> {
        lookup(REPS, REPS, args, ctx)
    }
}

impl FunctionPlugin for Weights {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: WEIGHTS,
            description: "Weight used in a set",
            usage: "weights([set])",
            arity: Arity::Range(0, 1),
            args: &INDEX_ARGS,
            returns: "Weight | Undefined",
            examples: &WEIGHTS_EXAMPLES,
            category: "history",
        }
    }

    fn call(&self, args: &[Value], ctx: &EvalContext) -> Result<Value, ScriptError> {
        lookup(WEIGHTS, WEIGHTS, args, ctx)
    }
}

impl FunctionPlugin for AllCompleted {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "allCompleted",
            description: "True when every set reached its target reps",
            usage: "allCompleted()",
            arity: Arity::Exact(0),
            args: &[],
            returns: "Bool",
            examples: &ALL_COMPLETED_EXAMPLES,
            category: "history",
        }
    }

    fn call(&self, _args: &[Value], ctx: &EvalContext) -> Result<Value, ScriptError> {
        let targets = ctx.history_series(REPS);
        let done = ctx.history_series(COMPLETED_REPS);
        if targets.is_empty() {
            return Ok(Value::Bool(false));
        }
        let all = targets.iter().enumerate().all(|(i, target)| {
            match (done.get(i), target) {
                (Some(Value::Number(c)), Value::Number(t)) => c >= t,
                _ => false,
            }
        });
        Ok(Value::Bool(all))
    }
}
