//! The two live inventories of an interactive session.

use partstock_core::StockResult;

use crate::registry::Registry;

/// Stock on hand and the project bill of materials.
///
/// Passed explicitly to whatever drives the engine; there is no global state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub stock: Registry,
    pub project: Registry,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Components the project needs that stock cannot supply.
    pub fn shortfall(&self) -> StockResult<Registry> {
        self.stock.difference(&self.project)
    }

    /// Take the project's components out of stock (all or nothing).
    pub fn consume_project(&mut self) -> StockResult<()> {
        self.stock.subtract_other(&self.project)
    }
}
