//! Component inventory engine.
//!
//! Category stores hold schema-fixed component records and implement identity
//! matching, quantity aggregation, filtering, and shortfall computation. A
//! registry groups categories and reconciles one inventory against another.
//! Everything here is deterministic, in-memory logic (no IO).

pub mod category;
pub mod registry;
pub mod session;
pub mod units;

pub use category::{BoundOp, CategoryStore, NAME_FIELD, Query, Record, Schema};
pub use registry::Registry;
pub use session::Session;
