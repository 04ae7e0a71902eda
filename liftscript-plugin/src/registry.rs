//! Function Registry
//!
//! The function table handed to the evaluator for one call. Names are
//! matched case-insensitively; later registrations override earlier ones.

use crate::{EvalContext, FunctionMeta, FunctionPlugin};
use liftscript_core::{ScriptError, Value};
use serde_json::{json, Value as JsonValue};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Table of callable functions
#[derive(Clone, Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, Arc<dyn FunctionPlugin>>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self { functions: HashMap::new() }
    }

    pub fn with_function<F: FunctionPlugin + 'static>(mut self, f: F) -> Self {
        self.register(f);
        self
    }

    pub fn register<F: FunctionPlugin + 'static>(&mut self, f: F) {
        let name = f.meta().name.to_lowercase();
        self.functions.insert(name, Arc::new(f));
    }

    pub fn get_function(&self, name: &str) -> Option<&dyn FunctionPlugin> {
        self.functions.get(&name.to_lowercase()).map(|f| f.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(&name.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Look up `name`, check the argument count, then call it
    pub fn call_function(&self, name: &str, args: &[Value], ctx: &EvalContext) -> Result<Value, ScriptError> {
        let f = match self.get_function(name) {
            Some(f) => f,
            None => {
                let similar = self.find_similar_functions(name);
                let mut err = ScriptError::undefined_func(name);
                if !similar.is_empty() {
                    let suggestions: Vec<&str> = similar.iter().take(5).map(|s| s.as_str()).collect();
                    err = err.with_suggestion(format!("Similar: {}", suggestions.join(", ")));
                }
                return Err(err);
            }
        };

        let meta = f.meta();
        if !meta.arity.accepts(args.len()) {
            return Err(ScriptError::arg_count(meta.name, meta.arity, args.len())
                .with_suggestion(format!("Usage: {}", meta.usage)));
        }

        tracing::trace!(function = meta.name, argc = args.len(), "calling function");
        f.call(args, ctx)
    }

    /// Find function names similar to the given name (for error suggestions)
    fn find_similar_functions(&self, name: &str) -> Vec<String> {
        let name_lower = name.to_lowercase();
        let mut matches: Vec<(String, usize)> = self.functions.iter()
            .filter_map(|(key, f)| {
                let score = Self::similarity_score(&name_lower, key);
                if score > 0 {
                    Some((f.meta().name.to_string(), score))
                } else {
                    None
                }
            })
            .collect();

        // Higher score first, then alphabetical for a stable order
        matches.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        matches.into_iter().map(|(name, _)| name).collect()
    }

    fn similarity_score(query: &str, candidate: &str) -> usize {
        let mut score = 0;

        if candidate.starts_with(query) {
            score += 100;
        } else if candidate.contains(query) {
            score += 50;
        } else if query.contains(candidate) {
            score += 30;
        }

        let query_chars: HashSet<char> = query.chars().collect();
        let candidate_chars: HashSet<char> = candidate.chars().collect();
        let common = query_chars.intersection(&candidate_chars).count();

        // Require most of the query's letters before anything counts
        if score == 0 && common * 3 < query_chars.len() * 2 {
            return 0;
        }
        score += common * 2;

        let len_diff = query.len().abs_diff(candidate.len());
        if len_diff < 5 && score > 0 {
            score += 5 - len_diff;
        }

        score
    }

    // ========== Introspection ==========

    pub fn help(&self, name: &str) -> Option<JsonValue> {
        self.get_function(name).map(|f| Self::function_to_help(&f.meta()))
    }

    fn function_to_help(meta: &FunctionMeta) -> JsonValue {
        json!({
            "name": meta.name,
            "description": meta.description,
            "usage": meta.usage,
            "arity": meta.arity.to_string(),
            "args": meta.args,
            "returns": meta.returns,
            "examples": meta.examples,
            "category": meta.category,
        })
    }

    /// Summaries of every function, optionally limited to one category,
    /// sorted by name
    pub fn list_functions(&self, category: Option<&str>) -> Vec<JsonValue> {
        let mut metas: Vec<FunctionMeta> = self.functions.values()
            .map(|f| f.meta())
            .filter(|m| category.map_or(true, |c| m.category == c))
            .collect();
        metas.sort_by_key(|m| m.name);
        metas.into_iter()
            .map(|m| json!({
                "name": m.name,
                "description": m.description,
                "usage": m.usage,
                "category": m.category,
            }))
            .collect()
    }
}

impl std::fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.functions.keys().collect();
        names.sort();
        f.debug_struct("FunctionRegistry").field("functions", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ArgMeta, Arity};
    use liftscript_core::codes;

    struct Double;

    static DOUBLE_ARGS: [ArgMeta; 1] = [ArgMeta::required("x", "Number", "Value to double")];

    impl FunctionPlugin for Double {
        fn meta(&self) -> FunctionMeta {
            FunctionMeta {
                name: "double",
                description: "Twice the value",
                usage: "double(x)",
                arity: Arity::Exact(1),
                args: &DOUBLE_ARGS,
                returns: "Number",
                examples: &["double(2)"],
                category: "test",
            }
        }

        fn call(&self, args: &[Value], _ctx: &EvalContext) -> Result<Value, ScriptError> {
            args[0].arith(liftscript_core::ArithOp::Mul, &Value::Number(2.0))
        }
    }

    fn ctx(registry: FunctionRegistry) -> EvalContext {
        EvalContext::new(Arc::new(registry))
    }

    #[test]
    fn test_call_case_insensitive() {
        let c = ctx(FunctionRegistry::new().with_function(Double));
        let r = c.registry.call_function("DOUBLE", &[Value::Number(21.0)], &c).unwrap();
        assert_eq!(r, Value::Number(42.0));
    }

    #[test]
    fn test_arity_checked_before_call() {
        let c = ctx(FunctionRegistry::new().with_function(Double));
        let err = c.registry.call_function("double", &[], &c).unwrap_err();
        assert_eq!(err.code, codes::ARG_COUNT);
        assert_eq!(err.message, "double() expects 1 arguments, got 0");
    }

    #[test]
    fn test_unknown_function_suggests() {
        let c = ctx(FunctionRegistry::new().with_function(Double));
        let err = c.registry.call_function("doubel", &[Value::Number(1.0)], &c).unwrap_err();
        assert_eq!(err.code, codes::UNDEFINED_FUNC);
        assert!(err.suggestion.unwrap().contains("double"));
    }

    #[test]
    fn test_list_and_help() {
        let registry = FunctionRegistry::new().with_function(Double);
        assert_eq!(registry.list_functions(Some("test")).len(), 1);
        assert!(registry.list_functions(Some("math")).is_empty());
        let help = registry.help("double").unwrap();
        assert_eq!(help["usage"], "double(x)");
        assert!(registry.help("nope").is_none());
    }

    #[test]
    fn test_arity_accepts() {
        assert!(Arity::AtLeast(2).accepts(5));
        assert!(!Arity::AtLeast(2).accepts(1));
        assert!(Arity::Range(0, 1).accepts(0));
        assert!(!Arity::Range(0, 1).accepts(2));
    }
}
