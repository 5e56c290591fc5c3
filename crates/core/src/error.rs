//! Inventory error model.

use thiserror::Error;

/// Result type used across the inventory engine.
pub type StockResult<T> = Result<T, StockError>;

/// Engine-level error.
///
/// Every variant is a local, recoverable condition that is reported to the
/// invoking layer. Nothing in the engine auto-corrects input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StockError {
    /// A record's field count does not match its category's schema.
    #[error("incorrect format: `{record}`, expected: `{format}`")]
    FormatMismatch { record: String, format: String },

    /// The quantity field is not a non-negative integer.
    #[error("invalid quantity `{0}`")]
    InvalidQuantity(String),

    /// A schema string cannot describe a category.
    #[error("invalid format `{0}`: needs at least one key field and a quantity field")]
    InvalidSchema(String),

    /// A category name cannot be represented.
    #[error("invalid category name `{0}`")]
    InvalidCategoryName(String),

    /// A query references a field the schema does not have.
    #[error("no field `{field}` in {category}")]
    UnknownField { category: String, field: String },

    /// A bound filter uses an operator other than `>=` / `<=`.
    #[error("no such operation: `{0}`")]
    UnknownOperator(String),

    /// A value's suffix is absent from the multiplier table.
    #[error("no such units: `{0}`")]
    UnrecognizedUnit(String),

    /// A value's numeric part does not parse.
    #[error("invalid number `{0}`")]
    InvalidNumber(String),

    /// A subtract targets an identity key with no existing record.
    #[error("no such component: `{record}` in {category}")]
    NoSuchComponent { category: String, record: String },

    /// A subtract requests more than the existing record holds.
    #[error("cannot subtract `{record}` from existing {available} in {category}")]
    InsufficientQuantity {
        category: String,
        record: String,
        available: u64,
    },

    /// Aggregating a record would exceed the largest storable quantity.
    #[error("quantity overflow adding `{record}` to {category}")]
    QuantityOverflow { category: String, record: String },

    /// An operation targets a category the registry does not hold.
    #[error("category {0} does not exist")]
    UnknownCategory(String),

    /// A category with the same name already exists.
    #[error("category {0} already exists")]
    DuplicateCategory(String),

    /// Two stores with different schemas were compared.
    #[error("format mismatch: {left} <> {right}")]
    SchemaMismatch { left: String, right: String },

    /// A bulk subtraction would leave shortfalls; nothing was changed.
    #[error("cannot subtract: {records} component(s) in {categories} category(ies) are short")]
    InsufficientStock { categories: usize, records: usize },
}

impl StockError {
    pub fn format_mismatch(record: impl Into<String>, format: impl Into<String>) -> Self {
        Self::FormatMismatch {
            record: record.into(),
            format: format.into(),
        }
    }

    pub fn unknown_field(category: impl Into<String>, field: impl Into<String>) -> Self {
        Self::UnknownField {
            category: category.into(),
            field: field.into(),
        }
    }

    pub fn no_such_component(category: impl Into<String>, record: impl Into<String>) -> Self {
        Self::NoSuchComponent {
            category: category.into(),
            record: record.into(),
        }
    }

    pub fn unknown_category(name: impl Into<String>) -> Self {
        Self::UnknownCategory(name.into())
    }

    pub fn duplicate_category(name: impl Into<String>) -> Self {
        Self::DuplicateCategory(name.into())
    }
}
