//! Schema model building

mod builder;
mod elements;
mod schema_model;

pub use builder::build_model;
pub use elements::*;
pub use schema_model::*;
