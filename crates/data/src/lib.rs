//! Catalog, hero template and weight snapshot loading.

pub mod load;
pub mod schema;
pub mod snapshot;

pub use load::*;
pub use schema::*;
pub use snapshot::*;
