//! Built-in function implementations

mod math;
mod aggregate;
mod weight;
mod history;

pub use math::*;
pub use aggregate::*;
pub use weight::*;
pub use history::*;
