//! The inventory transaction engine: issue, return, restock, cascade deletes.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use labstock_catalog::{Category, Component, Lab, NewComponent};
use labstock_core::{
    CategoryId, ComponentId, DomainError, DomainResult, LabId, TransactionId,
};
use labstock_ledger::{NewTransaction, Transaction, TransactionStatus};

use crate::catalog_store::CatalogStore;
use crate::ledger_store::{InMemoryLedger, TransactionLedger};
use crate::locks::{self, ComponentLocks};
use crate::monitor::StockMonitor;
use crate::store::{InMemoryStockStore, StockStore};

/// Issue request: allocate units of a component to a requester.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRequest {
    pub component_id: ComponentId,
    pub person_name: String,
    pub purpose: String,
    pub quantity: u32,
    pub campus: Option<String>,
    pub notes: Option<String>,
}

/// Orchestrates the stock store, transaction ledger and per-component locks.
///
/// Every stock-mutating operation runs its read-validate-mutate sequence
/// under the target component's mutex, so a concurrent pair of issues can
/// never both pass the stock check, and stock and ledger writes always land
/// together.
pub struct InventoryEngine<S: StockStore, L: TransactionLedger> {
    catalog: CatalogStore,
    stock: Arc<S>,
    ledger: Arc<L>,
    locks: ComponentLocks,
}

/// Fully in-memory engine, the default wiring for tests and embedding.
pub type InMemoryEngine = InventoryEngine<InMemoryStockStore, InMemoryLedger>;

impl InMemoryEngine {
    pub fn in_memory() -> Self {
        Self::new(InMemoryStockStore::new(), InMemoryLedger::new())
    }
}

impl Default for InMemoryEngine {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl<S: StockStore, L: TransactionLedger> InventoryEngine<S, L> {
    pub fn new(stock: S, ledger: L) -> Self {
        Self {
            catalog: CatalogStore::new(),
            stock: Arc::new(stock),
            ledger: Arc::new(ledger),
            locks: ComponentLocks::new(),
        }
    }

    /// Read-only monitor over the same stock store.
    pub fn monitor(&self) -> StockMonitor<S> {
        StockMonitor::new(Arc::clone(&self.stock))
    }

    // ---- administrative registration -------------------------------------

    pub fn register_lab(
        &self,
        name: impl Into<String>,
        location: impl Into<String>,
        description: impl Into<String>,
    ) -> DomainResult<Lab> {
        let lab = Lab::new(LabId::new(), name, location, description, Utc::now())?;
        self.catalog.insert_lab(lab.clone())?;
        Ok(lab)
    }

    pub fn register_category(
        &self,
        name: impl Into<String>,
        description: impl Into<String>,
        lab_id: LabId,
    ) -> DomainResult<Category> {
        let category = Category::new(CategoryId::new(), name, description, lab_id, Utc::now())?;
        self.catalog.insert_category(category.clone())?;
        Ok(category)
    }

    /// Register a component under an existing category.
    ///
    /// The denormalized `lab_id` must match the owning category's lab;
    /// divergence is invalid input, never silently repaired.
    pub fn register_component(&self, draft: NewComponent) -> DomainResult<Component> {
        let category = self.catalog.get_category(draft.category_id)?;
        if category.lab_id != draft.lab_id {
            return Err(DomainError::invalid_input(
                "component lab does not match the owning category's lab",
            ));
        }
        let component = Component::new(ComponentId::new(), draft, Utc::now())?;
        self.stock.insert(component.clone())?;
        Ok(component)
    }

    // ---- stock-mutating entry points --------------------------------------

    /// Issue units of a component, creating exactly one new transaction.
    pub fn issue(&self, request: IssueRequest) -> DomainResult<Transaction> {
        if request.quantity == 0 {
            return Err(DomainError::invalid_input("issue quantity must be positive"));
        }
        if request.person_name.trim().is_empty() {
            return Err(DomainError::invalid_input("person name cannot be empty"));
        }
        if request.purpose.trim().is_empty() {
            return Err(DomainError::invalid_input("purpose cannot be empty"));
        }

        let lock = self.locks.handle(request.component_id)?;
        let _guard = locks::acquire(&lock)?;

        // Everything below is exclusive per component: the stock check and
        // the paired stock/ledger writes cannot interleave with another
        // issue, return, restock or delete on this component.
        let component = self.stock.get(request.component_id)?;
        if request.quantity > component.quantity {
            return Err(DomainError::insufficient_stock(
                request.quantity,
                component.quantity,
            ));
        }

        let now = Utc::now();
        let quantity_before = component.quantity;
        let quantity_after =
            self.stock
                .adjust(request.component_id, -i64::from(request.quantity), now)?;

        let transaction = Transaction::open(
            TransactionId::new(),
            NewTransaction {
                component_id: component.id,
                lab_id: component.lab_id,
                campus: request.campus,
                person_name: request.person_name,
                purpose: request.purpose,
                qty_issued: request.quantity,
                quantity_before,
                quantity_after,
                notes: request.notes,
            },
            now,
        );

        let transaction = match transaction.and_then(|tx| self.ledger.append(tx)) {
            Ok(tx) => tx,
            Err(err) => {
                // The ledger write failed after the stock write; put the
                // units back so store and ledger stay in agreement.
                self.stock
                    .adjust(request.component_id, i64::from(request.quantity), now)?;
                return Err(err);
            }
        };

        tracing::info!(
            transaction_id = %transaction.id,
            component_id = %component.id,
            quantity = request.quantity,
            stock_after = quantity_after,
            "issued components"
        );
        Ok(transaction)
    }

    /// Return units against an existing transaction.
    pub fn accept_return(
        &self,
        transaction_id: TransactionId,
        quantity: u32,
        note: Option<String>,
    ) -> DomainResult<Transaction> {
        // Resolve the owning component without the lock; the authoritative
        // re-read happens under it.
        let preliminary = self.ledger.get(transaction_id)?;

        let lock = self.locks.handle(preliminary.component_id)?;
        let _guard = locks::acquire(&lock)?;

        let transaction = self.ledger.get(transaction_id)?;
        if transaction.status == TransactionStatus::Completed {
            return Err(DomainError::already_completed(transaction_id));
        }
        if quantity == 0 || quantity > transaction.pending_qty {
            return Err(DomainError::invalid_return(
                quantity,
                transaction.pending_qty,
            ));
        }

        let component = self.stock.get(transaction.component_id)?;
        let now = Utc::now();
        let quantity_before = component.quantity;
        let quantity_after =
            self.stock
                .adjust(transaction.component_id, i64::from(quantity), now)?;

        let updated = match self.ledger.apply_return(
            transaction_id,
            quantity,
            quantity_before,
            quantity_after,
            note.as_deref(),
            now,
        ) {
            Ok(tx) => tx,
            Err(err) => {
                // Compensate the stock write; the units we just added are
                // still there, so this cannot underflow.
                self.stock
                    .adjust(transaction.component_id, -i64::from(quantity), now)?;
                return Err(err);
            }
        };

        tracing::info!(
            transaction_id = %transaction_id,
            component_id = %transaction.component_id,
            quantity,
            pending = updated.pending_qty,
            status = ?updated.status,
            "accepted return"
        );
        Ok(updated)
    }

    /// Administrative restock. Goes through the same single mutation path and
    /// lock as issue/return.
    pub fn restock(&self, component_id: ComponentId, quantity: u32) -> DomainResult<u32> {
        if quantity == 0 {
            return Err(DomainError::invalid_input(
                "restock quantity must be positive",
            ));
        }

        let lock = self.locks.handle(component_id)?;
        let _guard = locks::acquire(&lock)?;

        let new_quantity = self.stock.adjust(component_id, i64::from(quantity), Utc::now())?;
        tracing::info!(component_id = %component_id, quantity, stock_after = new_quantity, "restocked component");
        Ok(new_quantity)
    }

    // ---- cascade deletes ---------------------------------------------------

    /// Delete a component and its transactions.
    ///
    /// Exclusive with in-flight issue/return on the component: the lock is
    /// held across both removals, and in-flight callers that lose the race
    /// observe `NotFound` rather than a dangling transaction.
    pub fn delete_component(&self, component_id: ComponentId) -> DomainResult<()> {
        let lock = self.locks.handle(component_id)?;
        {
            let _guard = locks::acquire(&lock)?;
            self.stock.remove(component_id)?;
            let removed = self.ledger.remove_by_component(component_id)?;
            tracing::info!(component_id = %component_id, transactions_removed = removed, "deleted component");
        }
        self.locks.retire(component_id)?;
        Ok(())
    }

    /// Delete a category and cascade over its components.
    pub fn delete_category(&self, category_id: CategoryId) -> DomainResult<()> {
        let category = self.catalog.remove_category(category_id)?;
        for component in self.stock.list_by_category(category.id)? {
            self.delete_component(component.id)?;
        }
        tracing::info!(category_id = %category_id, "deleted category");
        Ok(())
    }

    /// Delete a lab and cascade over its categories, components and
    /// transactions.
    pub fn delete_lab(&self, lab_id: LabId) -> DomainResult<()> {
        self.catalog.remove_lab(lab_id)?;
        for category in self.catalog.list_categories(Some(lab_id))? {
            self.catalog.remove_category(category.id)?;
        }
        for component in self.stock.list_by_lab(lab_id)? {
            self.delete_component(component.id)?;
        }
        tracing::info!(lab_id = %lab_id, "deleted lab");
        Ok(())
    }

    // ---- read surface --------------------------------------------------------

    pub fn lab(&self, id: LabId) -> DomainResult<Lab> {
        self.catalog.get_lab(id)
    }

    pub fn labs(&self) -> DomainResult<Vec<Lab>> {
        self.catalog.list_labs()
    }

    pub fn category(&self, id: CategoryId) -> DomainResult<Category> {
        self.catalog.get_category(id)
    }

    pub fn categories(&self, lab_id: Option<LabId>) -> DomainResult<Vec<Category>> {
        self.catalog.list_categories(lab_id)
    }

    pub fn component(&self, id: ComponentId) -> DomainResult<Component> {
        self.stock.get(id)
    }

    pub fn components(&self) -> DomainResult<Vec<Component>> {
        self.stock.list()
    }

    pub fn components_by_lab(&self, lab_id: LabId) -> DomainResult<Vec<Component>> {
        self.stock.list_by_lab(lab_id)
    }

    pub fn transaction(&self, id: TransactionId) -> DomainResult<Transaction> {
        self.ledger.get(id)
    }

    pub fn transactions(&self) -> DomainResult<Vec<Transaction>> {
        self.ledger.list()
    }

    pub fn transactions_for_component(
        &self,
        component_id: ComponentId,
    ) -> DomainResult<Vec<Transaction>> {
        self.ledger.list_by_component(component_id)
    }

    pub fn transactions_for_lab(&self, lab_id: LabId) -> DomainResult<Vec<Transaction>> {
        self.ledger.list_by_lab(lab_id)
    }

    pub fn recent_transactions(&self, limit: usize) -> DomainResult<Vec<Transaction>> {
        self.ledger.recent(limit)
    }
}
