//! Binding environment
//!
//! Locals are script-scoped. State is the caller-owned store addressed
//! as `state.name`; it survives across evaluations when the same
//! environment is passed back in.

use liftscript_core::Value;
use std::collections::HashMap;

pub const STATE_PREFIX: &str = "state.";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Environment {
    locals: HashMap<String, Value>,
    state: HashMap<String, Value>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from previously saved state
    pub fn with_state(state: HashMap<String, Value>) -> Self {
        Self { locals: HashMap::new(), state }
    }

    pub fn get_local(&self, name: &str) -> Option<&Value> {
        self.locals.get(name)
    }

    pub fn set_local(&mut self, name: impl Into<String>, value: Value) {
        self.locals.insert(name.into(), value);
    }

    pub fn get_state(&self, name: &str) -> Option<&Value> {
        self.state.get(name)
    }

    pub fn set_state(&mut self, name: impl Into<String>, value: Value) {
        self.state.insert(name.into(), value);
    }

    pub fn locals(&self) -> &HashMap<String, Value> {
        &self.locals
    }

    pub fn state(&self) -> &HashMap<String, Value> {
        &self.state
    }

    /// Drop locals, keep state
    pub fn clear_locals(&mut self) {
        self.locals.clear();
    }
}

/// `state.weight` -> `Some("weight")`
pub fn state_key(name: &str) -> Option<&str> {
    name.strip_prefix(STATE_PREFIX).filter(|key| !key.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_key() {
        assert_eq!(state_key("state.weight"), Some("weight"));
        assert_eq!(state_key("weight"), None);
        assert_eq!(state_key("stateful"), None);
    }

    #[test]
    fn test_clear_locals_keeps_state() {
        let mut env = Environment::new();
        env.set_local("x", Value::Number(1.0));
        env.set_state("w", Value::Number(2.0));
        env.clear_locals();
        assert!(env.get_local("x").is_none());
        assert_eq!(env.get_state("w"), Some(&Value::Number(2.0)));
    }
}
