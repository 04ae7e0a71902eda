//! Evaluation Context
//!
//! Everything the caller supplies for one evaluation: bindings, the
//! `state.*` store, per-set history, the function table and the active
//! unit. The engine borrows it for the duration of a call and keeps
//! nothing afterwards.

use liftscript_core::{ScriptError, Unit, Value, Weight};
use crate::FunctionRegistry;
use std::collections::HashMap;
use std::sync::Arc;

/// Default cap on loop iterations per evaluation
pub const DEFAULT_MAX_ITERATIONS: usize = 10_000;

/// Final transform applied to weight-mode results (e.g. plate rounding)
pub type WeightFinalizer = Arc<dyn Fn(Weight) -> Result<Weight, ScriptError> + Send + Sync>;

/// Evaluation context passed to the evaluator and to functions
#[derive(Clone)]
pub struct EvalContext {
    pub unit: Unit,
    pub bindings: HashMap<String, Value>,
    pub state: HashMap<String, Value>,
    pub history: HashMap<String, Vec<Value>>,
    pub registry: Arc<FunctionRegistry>,
    pub max_iterations: usize,
    pub finalizer: Option<WeightFinalizer>,
}

impl EvalContext {
    pub fn new(registry: Arc<FunctionRegistry>) -> Self {
        Self {
            unit: Unit::Lb,
            bindings: HashMap::new(),
            state: HashMap::new(),
            history: HashMap::new(),
            registry,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            finalizer: None,
        }
    }

    pub fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = unit;
        self
    }

    pub fn with_bindings(mut self, bindings: HashMap<String, Value>) -> Self {
        self.bindings = bindings;
        self
    }

    pub fn with_binding(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.bindings.insert(name.into(), value.into());
        self
    }

    /// Caller-owned `state.*` variables, keyed without the `state.` prefix
    pub fn with_state(mut self, state: HashMap<String, Value>) -> Self {
        self.state = state;
        self
    }

    pub fn with_history(mut self, name: impl Into<String>, series: Vec<Value>) -> Self {
        self.history.insert(name.into(), series);
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_finalizer(mut self, finalizer: WeightFinalizer) -> Self {
        self.finalizer = Some(finalizer);
        self
    }

    pub fn get_binding(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }

    pub fn get_state(&self, name: &str) -> Option<&Value> {
        self.state.get(name)
    }

    /// 1-based entry of a history series; `None` when absent
    pub fn history_entry(&self, series: &str, index: usize) -> Option<&Value> {
        index.checked_sub(1)
            .and_then(|i| self.history.get(series).and_then(|s| s.get(i)))
    }

    pub fn history_series(&self, series: &str) -> &[Value] {
        self.history.get(series).map(|s| s.as_slice()).unwrap_or(&[])
    }

    /// Apply the finalizer, if any, to a weight-mode result
    pub fn finalize_weight(&self, weight: Weight) -> Result<Weight, ScriptError> {
        match &self.finalizer {
            Some(f) => f(weight),
            None => Ok(weight),
        }
    }
}

impl std::fmt::Debug for EvalContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvalContext")
            .field("unit", &self.unit)
            .field("bindings", &self.bindings)
            .field("state", &self.state)
            .field("history", &self.history)
            .field("registry", &self.registry)
            .field("max_iterations", &self.max_iterations)
            .field("finalizer", &self.finalizer.is_some())
            .finish()
    }
}
