//! Script evaluator
//!
//! Tree-walking over an immutable `Program`. Locals and `state.*`
//! writes go to the `Environment`; the context is only read.

use crate::ast::*;
use crate::env::{state_key, Environment};
use liftscript_core::{ScriptError, Value};
use liftscript_plugin::EvalContext;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// What the script computes, which decides how its result is checked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Reps,
    Weight,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Reps => "reps",
            Mode::Weight => "weight",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = ScriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "reps" => Ok(Mode::Reps),
            "weight" => Ok(Mode::Weight),
            other => Err(ScriptError::invalid_request(format!("Unknown mode '{}'", other))
                .with_suggestion("Use 'reps' or 'weight'")),
        }
    }
}

/// Outcome of one evaluation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub value: Value,
    /// `state.*` values written so far through this environment
    pub state: HashMap<String, Value>,
    pub locals: HashMap<String, Value>,
}

enum Flow {
    Normal(Value),
    Return(Value),
}

struct Evaluator<'a> {
    ctx: &'a EvalContext,
    env: &'a mut Environment,
    iterations: usize,
}

/// Evaluate `program` against `ctx`, recording writes in `env`.
/// On failure `env` is left as it was.
pub fn evaluate(
    program: &Program,
    env: &mut Environment,
    ctx: &EvalContext,
    mode: Mode,
) -> Result<Evaluation, ScriptError> {
    debug!(mode = %mode, statements = program.statements.len(), "evaluating script");

    let mut scratch = env.clone();
    let evaluation = run(program, &mut scratch, ctx, mode)?;
    *env = scratch;
    Ok(evaluation)
}

fn run(
    program: &Program,
    env: &mut Environment,
    ctx: &EvalContext,
    mode: Mode,
) -> Result<Evaluation, ScriptError> {
    let mut evaluator = Evaluator { ctx, env: &mut *env, iterations: 0 };
    let raw = match evaluator.exec_statements(&program.statements)? {
        Flow::Normal(v) | Flow::Return(v) => v,
    };
    let iterations = evaluator.iterations;

    let at = program
        .statements
        .last()
        .map(|s| s.span)
        .unwrap_or(program.span)
        .position();
    let value = finish(raw, mode, ctx).map_err(|e| e.or_at(at))?;

    debug!(mode = %mode, iterations, result = %value, "evaluation finished");
    Ok(Evaluation {
        value,
        state: env.state().clone(),
        locals: env.locals().clone(),
    })
}

/// Check the raw script value against the mode
fn finish(value: Value, mode: Mode, ctx: &EvalContext) -> Result<Value, ScriptError> {
    match (mode, value) {
        (Mode::Reps, v @ (Value::Number(_) | Value::Undefined)) => Ok(v),
        (Mode::Weight, v @ (Value::Number(_) | Value::Weight(_) | Value::Undefined)) => {
            match v.into_weight(ctx.unit)? {
                Value::Weight(w) => Ok(Value::Weight(ctx.finalize_weight(w)?)),
                other => Ok(other),
            }
        }
        (mode, other) => Err(ScriptError::mode_mismatch(mode.as_str(), other.type_name())),
    }
}

impl<'a> Evaluator<'a> {
    fn exec_statements(&mut self, statements: &[Stmt]) -> Result<Flow, ScriptError> {
        let mut last = Value::Undefined;
        for stmt in statements {
            match self.exec(stmt)? {
                Flow::Return(v) => return Ok(Flow::Return(v)),
                Flow::Normal(v) => last = v,
            }
        }
        Ok(Flow::Normal(last))
    }

    fn exec(&mut self, stmt: &Stmt) -> Result<Flow, ScriptError> {
        match &stmt.kind {
            StmtKind::Expr(e) => Ok(Flow::Normal(self.eval(e)?)),
            StmtKind::Assign { target, value } => {
                let v = self.eval(value)?;
                self.assign(target, v);
                Ok(Flow::Normal(Value::Undefined))
            }
            StmtKind::If { cond, then_block, else_branch } => {
                if self.eval(cond)?.truthy() {
                    self.exec_statements(&then_block.statements)
                } else {
                    match else_branch {
                        Some(ElseBranch::Block(block)) => self.exec_statements(&block.statements),
                        Some(ElseBranch::If(nested)) => self.exec(nested),
                        None => Ok(Flow::Normal(Value::Undefined)),
                    }
                }
            }
            StmtKind::For { var, from, to, body } => {
                let start = self.loop_bound(from)?;
                let end = self.loop_bound(to)?;
                let mut i = start;
                while i <= end {
                    self.tick(stmt.span)?;
                    self.env.set_local(var.as_str(), Value::Number(i));
                    if let Flow::Return(v) = self.exec_statements(&body.statements)? {
                        return Ok(Flow::Return(v));
                    }
                    i += 1.0;
                }
                Ok(Flow::Normal(Value::Undefined))
            }
            StmtKind::While { cond, body } => {
                while self.eval(cond)?.truthy() {
                    self.tick(stmt.span)?;
                    if let Flow::Return(v) = self.exec_statements(&body.statements)? {
                        return Ok(Flow::Return(v));
                    }
                }
                Ok(Flow::Normal(Value::Undefined))
            }
            StmtKind::Return(e) => Ok(Flow::Return(self.eval(e)?)),
        }
    }

    fn tick(&mut self, span: Span) -> Result<(), ScriptError> {
        self.iterations += 1;
        if self.iterations > self.ctx.max_iterations {
            warn!(limit = self.ctx.max_iterations, line = span.line, "loop iteration limit exceeded");
            return Err(ScriptError::iteration_limit(self.ctx.max_iterations).at(span.position()));
        }
        Ok(())
    }

    fn loop_bound(&mut self, expr: &Expr) -> Result<f64, ScriptError> {
        match self.eval(expr)? {
            Value::Number(n) if n.is_finite() && n.fract() == 0.0 => Ok(n),
            Value::Number(n) => Err(ScriptError::type_error("whole Number loop bound", &n.to_string())
                .at(expr.span.position())),
            other => Err(ScriptError::type_error("Number", other.type_name()).at(expr.span.position())),
        }
    }

    fn assign(&mut self, target: &str, value: Value) {
        match state_key(target) {
            Some(key) => self.env.set_state(key, value),
            None => self.env.set_local(target, value),
        }
    }

    fn lookup(&self, name: &str) -> Option<Value> {
        let found = match state_key(name) {
            Some(key) => self.env.get_state(key).or_else(|| self.ctx.get_state(key)),
            None => self.env.get_local(name).or_else(|| self.ctx.get_binding(name)),
        };
        found.cloned()
    }

    fn eval(&mut self, expr: &Expr) -> Result<Value, ScriptError> {
        let at = expr.span.position();
        match &expr.kind {
            ExprKind::Literal(lit) => Ok(match lit {
                Literal::Number(n) => Value::Number(*n),
                Literal::Weight(w) => Value::Weight(*w),
                Literal::Bool(b) => Value::Bool(*b),
                Literal::Text(s) => Value::Text(s.clone()),
            }),
            ExprKind::Ident(name) => self
                .lookup(name)
                .ok_or_else(|| ScriptError::undefined_var(name).at(at)),
            ExprKind::Unary(op, operand) => {
                let v = self.eval(operand)?;
                let result = match op {
                    UnaryOp::Neg => v.negate(),
                    UnaryOp::Plus => match v {
                        Value::Number(_) | Value::Weight(_) => Ok(v),
                        other => Err(ScriptError::type_error("Number or Weight", other.type_name())),
                    },
                    UnaryOp::Not => Ok(Value::Bool(!v.truthy())),
                };
                result.map_err(|e| e.or_at(at))
            }
            ExprKind::Binary(left, op, right) => {
                let l = self.eval(left)?;
                let r = self.eval(right)?;
                l.arith(*op, &r).map_err(|e| e.or_at(at))
            }
            ExprKind::Logical(left, op, right) => {
                let l = self.eval(left)?.truthy();
                let result = match op {
                    LogicalOp::And => l && self.eval(right)?.truthy(),
                    LogicalOp::Or => l || self.eval(right)?.truthy(),
                };
                Ok(Value::Bool(result))
            }
            ExprKind::Compare { first, rest } => {
                let mut left = self.eval(first)?;
                for (op, operand) in rest {
                    let right = self.eval(operand)?;
                    if !left.compare(*op, &right).map_err(|e| e.or_at(at))? {
                        return Ok(Value::Bool(false));
                    }
                    left = right;
                }
                Ok(Value::Bool(true))
            }
            ExprKind::Call { name, args } => {
                let values = args
                    .iter()
                    .map(|a| self.eval(a))
                    .collect::<Result<Vec<_>, _>>()?;
                self.ctx
                    .registry
                    .call_function(name, &values, self.ctx)
                    .map_err(|e| e.or_at(at))
            }
            ExprKind::Conditional { cond, then, otherwise } => {
                if self.eval(cond)?.truthy() {
                    self.eval(then)
                } else {
                    self.eval(otherwise)
                }
            }
        }
    }
}
