//! Outcome-driven training of influence weights.

mod config;
mod error;
mod optimizer;
mod sample;
mod trainer;

pub use config::*;
pub use error::*;
pub use optimizer::*;
pub use sample::*;
pub use trainer::*;
