//! `partstock-core`: shared building blocks for the inventory engine.
//!
//! This crate contains **pure** primitives (no IO).

pub mod error;
pub mod value_object;

pub use error::{StockError, StockResult};
pub use value_object::ValueObject;
