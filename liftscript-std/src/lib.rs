//! LiftScript Standard Library

pub mod functions;
mod settings;
mod equipment;
mod bindings;

pub use settings::{Settings, SettingsError, Plate, Bars};
pub use equipment::Equipment;
pub use bindings::ScriptBindings;

use liftscript_plugin::FunctionRegistry;
use std::sync::Arc;

/// Load the standard library into `registry`; `roundWeight` rounds with
/// `equipment`
pub fn load_standard_library(registry: FunctionRegistry, equipment: Arc<Equipment>) -> FunctionRegistry {
    registry
        .with_function(functions::Floor)
        .with_function(functions::Ceil)
        .with_function(functions::Round)
        .with_function(functions::Abs)
        .with_function(functions::Min)
        .with_function(functions::Max)
        .with_function(functions::Sum)
        .with_function(functions::RoundWeight::new(equipment))
        .with_function(functions::Convert)
        .with_function(functions::WeightFn)
        .with_function(functions::CompletedReps)
        .with_function(functions::Reps)
        .with_function(functions::Weights)
        .with_function(functions::AllCompleted)
}

/// Create registry with standard library
pub fn standard_registry(settings: &Settings) -> FunctionRegistry {
    let equipment = Arc::new(Equipment::new(settings.units, settings));
    load_standard_library(FunctionRegistry::new(), equipment)
}
