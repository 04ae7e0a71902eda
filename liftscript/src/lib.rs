//! LiftScript - workout progression scripts
//!
//! Scripts compute the weight or reps of a set from the lifter's history.
//! Parse once with [`Script::parse`] (or through a [`ParseCache`]), then
//! evaluate against an [`EvalContext`] as often as needed.

pub mod ast;
pub mod lexer;
pub mod parser;
mod env;
mod eval;
mod script;
mod cache;

pub use ast::{Program, Stmt, StmtKind, Expr, ExprKind, Span};
pub use env::{Environment, STATE_PREFIX};
pub use eval::{Evaluation, Mode};
pub use script::Script;
pub use cache::{ParseCache, DEFAULT_CACHE_LIMIT};
pub use parser::MAX_DEPTH;

pub use liftscript_core::{codes, ScriptError, ErrorKind, Position, Value, Weight, Unit};
pub use liftscript_plugin::{EvalContext, FunctionRegistry, WeightFinalizer};
pub use liftscript_std::{Settings, ScriptBindings};

use liftscript_plugin::DEFAULT_MAX_ITERATIONS;
use liftscript_std::Equipment;
use serde_json::Value as JsonValue;
use std::sync::Arc;

/// Parse `source` into a reusable script
pub fn parse(source: &str) -> Result<Script, ScriptError> {
    Script::parse(source)
}

/// Evaluate `script` in a fresh environment
pub fn evaluate(script: &Script, mode: Mode, ctx: &EvalContext) -> Result<Evaluation, ScriptError> {
    script.evaluate(mode, ctx)
}

/// Main LiftScript engine: a function table plus the unit, rounding and
/// limits every context it hands out starts with
pub struct Engine {
    registry: Arc<FunctionRegistry>,
    unit: Unit,
    finalizer: Option<WeightFinalizer>,
    max_iterations: usize,
}

impl Engine {
    pub fn new(registry: FunctionRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            unit: Unit::Lb,
            finalizer: None,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Standard library, unit and plate rounding taken from `settings`
    pub fn with_settings(settings: &Settings) -> Self {
        let equipment = Arc::new(Equipment::new(settings.units, settings));
        Self {
            registry: Arc::new(liftscript_std::load_standard_library(FunctionRegistry::new(), equipment.clone())),
            unit: settings.units,
            finalizer: Some(equipment.finalizer()),
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = unit;
        self
    }

    /// Leave weight results unrounded
    pub fn without_rounding(mut self) -> Self {
        self.finalizer = None;
        self
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    /// A fresh context; callers add bindings, state and history
    pub fn context(&self) -> EvalContext {
        let ctx = EvalContext::new(self.registry.clone())
            .with_unit(self.unit)
            .with_max_iterations(self.max_iterations);
        match &self.finalizer {
            Some(f) => ctx.with_finalizer(f.clone()),
            None => ctx,
        }
    }

    pub fn parse(&self, source: &str) -> Result<Script, ScriptError> {
        Script::parse(source)
    }

    pub fn evaluate(&self, script: &Script, mode: Mode, ctx: &EvalContext) -> Result<Evaluation, ScriptError> {
        script.evaluate(mode, ctx)
    }

    /// Parse and evaluate one source against workout bindings
    pub fn eval(&self, source: &str, mode: Mode, bindings: &ScriptBindings) -> Result<Evaluation, ScriptError> {
        let script = self.parse(source)?;
        let ctx = bindings.apply(self.context());
        script.evaluate(mode, &ctx)
    }

    pub fn help(&self, name: &str) -> Option<JsonValue> {
        self.registry.help(name)
    }

    pub fn list_functions(&self, category: Option<&str>) -> Vec<JsonValue> {
        self.registry.list_functions(category)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::with_settings(&Settings::default())
    }
}

/// Build a binding map: `bindings! { day: 3, w: Weight::lb(135.0) }`
#[macro_export]
macro_rules! bindings {
    {} => { std::collections::HashMap::<String, $crate::Value>::new() };
    { $($key:ident : $value:expr),* $(,)? } => {{
        let mut map = std::collections::HashMap::new();
        $(
            map.insert(stringify!($key).to_string(), $crate::Value::from($value));
        )*
        map
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use liftscript_core::codes;

    fn engine() -> Engine {
        Engine::default()
    }

    #[test]
    fn test_weight_script_rounds_to_plates() {
        let engine = engine();
        let bindings = ScriptBindings::empty(1).with_set(Weight::lb(130.0), 5.0, Some(5.0));
        let eval = engine.eval("cr >= r ? w + 7lb : w", Mode::Weight, &bindings).unwrap();
        assert_eq!(eval.value, Value::Weight(Weight::lb(135.0)));
    }

    #[test]
    fn test_without_rounding() {
        let engine = engine().without_rounding();
        let eval = engine.eval("w + 7lb", Mode::Weight, &ScriptBindings::empty(1)).unwrap();
        assert_eq!(eval.value, Value::Weight(Weight::lb(7.0)));
    }

    #[test]
    fn test_context_carries_engine_settings() {
        let engine = Engine::with_settings(&Settings::default().with_units(Unit::Kg)).with_max_iterations(5);
        let ctx = engine.context();
        assert_eq!(ctx.unit, Unit::Kg);
        assert_eq!(ctx.max_iterations, 5);
        assert!(ctx.finalizer.is_some());
    }

    #[test]
    fn test_round_weight_and_finalizer_agree() {
        let engine = Engine::with_settings(&Settings::default().with_units(Unit::Kg));
        let ctx = engine.context().with_binding("x", Weight::kg(61.3));
        let run = |src: &str| engine.evaluate(&engine.parse(src).unwrap(), Mode::Weight, &ctx).unwrap().value;
        let explicit = run("roundWeight(x)");
        let finalized = run("x");
        assert_eq!(explicit, Value::Weight(Weight::kg(60.0)));
        assert_eq!(explicit, finalized);
    }

    #[test]
    fn test_bindings_macro() {
        let engine = engine();
        let ctx = engine.context().with_bindings(bindings! { day: 3, week: 2 });
        let script = engine.parse("day * week").unwrap();
        assert_eq!(engine.evaluate(&script, Mode::Reps, &ctx).unwrap().value, Value::Number(6.0));
    }

    #[test]
    fn test_unknown_function_suggests() {
        let engine = engine();
        let script = parse("roundweigth(w)").unwrap();
        let ctx = engine.context().with_binding("w", Weight::lb(100.0));
        let err = evaluate(&script, Mode::Weight, &ctx).unwrap_err();
        assert_eq!(err.code, codes::UNDEFINED_FUNC);
        assert!(err.suggestion.unwrap().contains("roundWeight"));
    }

    #[test]
    fn test_help_and_listing() {
        let engine = engine();
        assert!(engine.help("roundWeight").is_some());
        assert!(engine.help("nope").is_none());
        assert_eq!(engine.list_functions(None).len(), engine.registry().len());
    }
}
