//! Persistence boundary: the line-oriented text form of a registry.
//!
//! The codec is pure string ↔ registry conversion; the file store performs the
//! whole-file reads and writes around it.

pub mod codec;
pub mod file_store;

use thiserror::Error;

use partstock_core::StockError;

pub use codec::{decode_into, encode};
pub use file_store::{load, save};

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("io error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A record line appeared before any category header.
    #[error("line {line}: record outside of any category")]
    OrphanRecord { line: usize },

    /// A category header is the last line of the input.
    #[error("category {category} has no format line")]
    MissingSchema { category: String },

    /// A line was rejected by the engine.
    #[error("line {line}: {source}")]
    Invalid {
        line: usize,
        #[source]
        source: StockError,
    },

    /// A component list line is not `reference,value,footprint`.
    #[error("line {line}: expected `reference,value,footprint`")]
    MalformedEntry { line: usize },
}
