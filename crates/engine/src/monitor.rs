//! Stock monitor: advisory low-stock queries over the stock store.

use std::sync::Arc;

use labstock_catalog::{Component, StockState};
use labstock_core::{DomainResult, LabId};

use crate::store::StockStore;

/// Read-only view flagging components at or below their minimum threshold.
///
/// Consistent with the store's latest committed state at call time; no
/// linearizability guarantee across concurrent adjustments (this is an
/// advisory query, callers re-check before acting).
pub struct StockMonitor<S: StockStore> {
    stock: Arc<S>,
}

impl<S: StockStore> StockMonitor<S> {
    pub fn new(stock: Arc<S>) -> Self {
        Self { stock }
    }

    /// Components where `quantity <= min_stock_level`, optionally scoped to
    /// one lab. Sorted by name like the underlying lists.
    pub fn list_low_stock(&self, lab_id: Option<LabId>) -> DomainResult<Vec<Component>> {
        let components = match lab_id {
            Some(id) => self.stock.list_by_lab(id)?,
            None => self.stock.list()?,
        };
        Ok(components.into_iter().filter(Component::is_low).collect())
    }

    /// Components with no stock at all.
    pub fn list_out_of_stock(&self, lab_id: Option<LabId>) -> DomainResult<Vec<Component>> {
        Ok(self
            .list_low_stock(lab_id)?
            .into_iter()
            .filter(|c| c.stock_state() == StockState::OutOfStock)
            .collect())
    }
}
