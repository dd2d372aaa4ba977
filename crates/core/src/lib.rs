//! Core sequencing model. Keep this crate free of IO and platform concerns.

pub mod attributes;
pub mod catalog;
pub mod choice;
pub mod deck;
pub mod error;
pub mod evaluator;
pub mod hero;
pub mod influence;
pub mod rng;
pub mod scalar;

pub use attributes::*;
pub use catalog::*;
pub use choice::*;
pub use deck::*;
pub use error::*;
pub use evaluator::*;
pub use hero::*;
pub use influence::*;
pub use rng::*;
pub use scalar::*;
