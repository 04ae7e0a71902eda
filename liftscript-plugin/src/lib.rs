//! LiftScript Plugin System
//!
//! Provides the seam through which callers supply the function table:
//! - `FunctionPlugin`: a named, pure rule over values
//! - `FunctionRegistry`: the table handed to one evaluation
//! - `EvalContext`: bindings, state, history and unit for one evaluation

mod traits;
mod registry;
mod context;

pub use traits::{FunctionPlugin, FunctionMeta, ArgMeta, Arity};
pub use registry::FunctionRegistry;
pub use context::{EvalContext, WeightFinalizer, DEFAULT_MAX_ITERATIONS};

/// Re-export core types for plugin authors
pub mod prelude {
    pub use crate::{
        FunctionPlugin, FunctionMeta, ArgMeta, Arity,
        FunctionRegistry, EvalContext,
    };
    pub use liftscript_core::prelude::*;
}
