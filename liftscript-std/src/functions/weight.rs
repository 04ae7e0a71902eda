//! Weight functions: equipment rounding and unit conversion

use liftscript_plugin::prelude::*;
use crate::Equipment;
use std::sync::Arc;

/// `roundWeight(x)`: nearest weight loadable with the configured plates
pub struct RoundWeight {
    equipment: Arc<Equipment>,
}

impl RoundWeight {
    pub fn new(equipment: Arc<Equipment>) -> Self {
        Self { equipment }
    }
}

pub struct Convert;
pub struct WeightFn;

static ROUND_WEIGHT_ARGS: [ArgMeta; 1] = [
    ArgMeta::required("x", "Weight | Number", "Weight to round; a Number is taken in the active unit"),
];
static ROUND_WEIGHT_EXAMPLES: [&str; 2] = ["roundWeight(w * 1.05)", "roundWeight(137)"];

static CONVERT_ARGS: [ArgMeta; 2] = [
    ArgMeta::required("x", "Weight | Number", "Weight to convert; a Number is taken in the active unit"),
    ArgMeta::required("unit", "Text", "Target unit (\"lb\" or \"kg\")"),
];
static CONVERT_EXAMPLES: [&str; 2] = ["convert(100kg, \"lb\")", "convert(w, \"kg\")"];

static WEIGHT_ARGS: [ArgMeta; 1] = [ArgMeta::required("x", "Number", "Magnitude in the active unit")];
static WEIGHT_EXAMPLES: [&str; 1] = ["weight(135)"];

fn as_weight(func: &str, arg: &Value, ctx: &EvalContext) -> Result<Weight, ScriptError> {
    match arg {
        Value::Weight(w) => Ok(*w),
        Value::Number(n) => Ok(Weight::new(*n, ctx.unit)),
        other => Err(ScriptError::arg_type(func, "x", "Weight or Number", other.type_name())),
    }
}

impl FunctionPlugin for RoundWeight {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "roundWeight",
            description: "Round to the nearest weight the bar and plates can make",
            usage: "roundWeight(x)",
            arity: Arity::Exact(1),
            args: &ROUND_WEIGHT_ARGS,
            returns: "Weight",
            examples: &ROUND_WEIGHT_EXAMPLES,
            category: "weight",
        }
    }

    fn call(&self, args: &[Value], ctx: &EvalContext) -> Result<Value, ScriptError> {
        let w = as_weight("roundWeight", &args[0], ctx)?;
        self.equipment.round(w).map(Value::Weight)
    }
}

impl FunctionPlugin for Convert {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "convert",
            description: "Express a weight in another unit",
            usage: "convert(x, unit)",
            arity: Arity::Exact(2),
            args: &CONVERT_ARGS,
            returns: "Weight",
            examples: &CONVERT_EXAMPLES,
            category: "weight",
        }
    }

    fn call(&self, args: &[Value], ctx: &EvalContext) -> Result<Value, ScriptError> {
        let w = as_weight("convert", &args[0], ctx)?;
        let unit: Unit = match args[1].as_text() {
            Some(s) => s.parse()?,
            None => return Err(ScriptError::arg_type("convert", "unit", "Text", args[1].type_name())),
        };
        Ok(Value::Weight(w.convert_to(unit)))
    }
}

impl FunctionPlugin for WeightFn {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "weight",
            description: "Turn a number into a weight in the active unit",
            usage: "weight(x)",
            arity: Arity::Exact(1),
            args: &WEIGHT_ARGS,
            returns: "Weight",
            examples: &WEIGHT_EXAMPLES,
            category: "weight",
        }
    }

    fn call(&self, args: &[Value], ctx: &EvalContext) -> Result<Value, ScriptError> {
        as_weight("weight", &args[0], ctx).map(Value::Weight)
    }
}
