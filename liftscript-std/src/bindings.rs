//! Workout bindings
//!
//! Builds the context bindings and history series scripts read for one
//! set of one exercise: `day`, `week`, `setIndex`, `ns` (number of sets)
//! and the shorthands `w`, `r`, `cr` for the current set.

use crate::functions::{COMPLETED_REPS, REPS, SET_INDEX, WEIGHTS};
use liftscript_core::{Value, Weight};
use liftscript_plugin::EvalContext;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScriptBindings {
    pub day: usize,
    pub week: Option<usize>,
    /// 1-based index of the set being computed
    pub set_index: usize,
    pub weights: Vec<Weight>,
    pub reps: Vec<f64>,
    pub completed_reps: Vec<Option<f64>>,
}

impl ScriptBindings {
    /// Bindings for editing a script outside a workout: no sets recorded
    pub fn empty(day: usize) -> Self {
        Self { day, set_index: 1, ..Self::default() }
    }

    pub fn with_set_index(mut self, set_index: usize) -> Self {
        self.set_index = set_index;
        self
    }

    pub fn with_week(mut self, week: usize) -> Self {
        self.week = Some(week);
        self
    }

    /// Record one set: the weight, target reps and what was completed
    pub fn with_set(mut self, weight: Weight, reps: f64, completed: Option<f64>) -> Self {
        self.weights.push(weight);
        self.reps.push(reps);
        self.completed_reps.push(completed);
        self
    }

    /// Install these bindings into `ctx`. Shorthands for a set that has
    /// no data default to zero so editor validation still succeeds.
    pub fn apply(&self, ctx: EvalContext) -> EvalContext {
        let i = self.set_index.checked_sub(1);
        let at = |i: Option<usize>| i.and_then(|i| self.reps.get(i)).copied();

        let w = i.and_then(|i| self.weights.get(i)).copied().unwrap_or(Weight::new(0.0, ctx.unit));
        let r = at(i).unwrap_or(0.0);
        let cr = i.and_then(|i| self.completed_reps.get(i)).copied().flatten().unwrap_or(0.0);

        let mut ctx = ctx
            .with_binding("day", self.day)
            .with_binding(SET_INDEX, self.set_index)
            .with_binding("ns", self.reps.len())
            .with_binding("w", w)
            .with_binding("r", r)
            .with_binding("cr", cr)
            .with_history(WEIGHTS, self.weights.iter().copied().map(Value::Weight).collect())
            .with_history(REPS, self.reps.iter().copied().map(Value::Number).collect())
            .with_history(COMPLETED_REPS, self.completed_reps.iter().copied().map(Value::from).collect());
        if let Some(week) = self.week {
            ctx = ctx.with_binding("week", week);
        }
        ctx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use liftscript_plugin::FunctionRegistry;
    use std::sync::Arc;

    fn ctx() -> EvalContext {
        EvalContext::new(Arc::new(FunctionRegistry::new()))
    }

    #[test]
    fn test_empty_bindings_default_to_zero() {
        let ctx = ScriptBindings::empty(3).apply(ctx());
        assert_eq!(ctx.get_binding("day"), Some(&Value::Number(3.0)));
        assert_eq!(ctx.get_binding("ns"), Some(&Value::Number(0.0)));
        assert_eq!(ctx.get_binding("w"), Some(&Value::Weight(Weight::lb(0.0))));
        assert_eq!(ctx.get_binding("cr"), Some(&Value::Number(0.0)));
        assert!(ctx.get_binding("week").is_none());
    }

    #[test]
    fn test_current_set_shorthands() {
        let ctx = ScriptBindings::empty(1)
            .with_set(Weight::lb(135.0), 5.0, Some(5.0))
            .with_set(Weight::lb(155.0), 3.0, Some(2.0))
            .with_set_index(2)
            .with_week(4)
            .apply(ctx());
        assert_eq!(ctx.get_binding("w"), Some(&Value::Weight(Weight::lb(155.0))));
        assert_eq!(ctx.get_binding("r"), Some(&Value::Number(3.0)));
        assert_eq!(ctx.get_binding("cr"), Some(&Value::Number(2.0)));
        assert_eq!(ctx.get_binding("ns"), Some(&Value::Number(2.0)));
        assert_eq!(ctx.get_binding("week"), Some(&Value::Number(4.0)));
        assert_eq!(ctx.history_entry(COMPLETED_REPS, 1), Some(&Value::Number(5.0)));
    }

    #[test]
    fn test_missing_completion_is_undefined() {
        let ctx = ScriptBindings::empty(1)
            .with_set(Weight::kg(60.0), 5.0, None)
            .apply(ctx());
        assert_eq!(ctx.history_entry(COMPLETED_REPS, 1), Some(&Value::Undefined));
    }
}
