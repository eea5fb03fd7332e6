//! Data models

pub mod schema;
pub mod prediction;

pub use schema::*;
pub use prediction::*;
