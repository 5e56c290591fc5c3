//! Infrastructure layer: persisted text form, files, and netlist import.

pub mod netlist_import;
pub mod persistence;

pub use netlist_import::{ImportedProject, NetlistComponent};
pub use persistence::PersistenceError;
