//! Exhaustive action-order search over the core sequence evaluator.

mod config;
mod engine;
mod error;
mod report;

pub use config::*;
pub use engine::*;
pub use error::*;
pub use report::*;
