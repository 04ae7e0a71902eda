//! Parsed script handle

use crate::ast::Program;
use crate::env::Environment;
use crate::eval::{self, Evaluation, Mode};
use crate::parser;
use liftscript_core::ScriptError;
use liftscript_plugin::EvalContext;
use tracing::debug;

/// An immutable parsed script, reusable across evaluations
#[derive(Debug, Clone, PartialEq)]
pub struct Script {
    source: String,
    program: Program,
}

impl Script {
    pub fn parse(source: &str) -> Result<Self, ScriptError> {
        let program = parser::parse_source(source).inspect_err(|e| {
            debug!(code = %e.code, "parse failed");
        })?;
        debug!(statements = program.statements.len(), chars = source.chars().count(), "parsed script");
        Ok(Self { source: source.to_string(), program })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Evaluate in a fresh environment
    pub fn evaluate(&self, mode: Mode, ctx: &EvalContext) -> Result<Evaluation, ScriptError> {
        let mut env = Environment::new();
        self.evaluate_in(mode, ctx, &mut env)
    }

    /// Evaluate in `env`, keeping its locals and state from earlier runs.
    /// A failed run leaves `env` untouched.
    pub fn evaluate_in(&self, mode: Mode, ctx: &EvalContext, env: &mut Environment) -> Result<Evaluation, ScriptError> {
        eval::evaluate(&self.program, env, ctx, mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use liftscript_core::Value;
    use liftscript_plugin::FunctionRegistry;
    use std::sync::Arc;

    #[test]
    fn test_reuse_across_contexts() {
        let script = Script::parse("day + 1").unwrap();
        let registry = Arc::new(FunctionRegistry::new());
        for day in 1..=3 {
            let ctx = EvalContext::new(registry.clone()).with_binding("day", day);
            let v = script.evaluate(Mode::Reps, &ctx).unwrap().value;
            assert_eq!(v, Value::Number(day as f64 + 1.0));
        }
        assert_eq!(script.source(), "day + 1");
    }

    #[test]
    fn test_evaluate_in_keeps_environment() {
        let ctx = EvalContext::new(Arc::new(FunctionRegistry::new()));
        let mut env = Environment::new();
        Script::parse("x = 2\nstate.n = 1").unwrap().evaluate_in(Mode::Reps, &ctx, &mut env).unwrap();
        let eval = Script::parse("state.n + x").unwrap().evaluate_in(Mode::Reps, &ctx, &mut env).unwrap();
        assert_eq!(eval.value, Value::Number(3.0));
        assert_eq!(eval.state.get("n"), Some(&Value::Number(1.0)));
    }

    #[test]
    fn test_failed_run_leaves_environment() {
        let ctx = EvalContext::new(Arc::new(FunctionRegistry::new()));
        let mut env = Environment::new();
        Script::parse("state.n = 1").unwrap().evaluate_in(Mode::Reps, &ctx, &mut env).unwrap();
        let before = env.clone();

        let err = Script::parse("state.n = 5\nx = 1\n1 / 0")
            .unwrap()
            .evaluate_in(Mode::Reps, &ctx, &mut env)
            .unwrap_err();
        assert_eq!(err.code, liftscript_core::codes::DIV_ZERO);
        assert_eq!(env, before);
        assert!(env.get_local("x").is_none());
        assert_eq!(env.get_state("n"), Some(&Value::Number(1.0)));
    }
}
