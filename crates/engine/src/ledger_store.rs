//! Transaction ledger: append-mutate log of issue/return events.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use labstock_core::{ComponentId, DomainError, DomainResult, LabId, TransactionId};
use labstock_ledger::Transaction;

/// Storage seam for the transaction ledger.
///
/// Records are created only by issues and mutated only through
/// `apply_return`; removal happens only as part of a cascade delete.
pub trait TransactionLedger: Send + Sync {
    /// Append a freshly opened transaction. Fails on duplicate id.
    fn append(&self, transaction: Transaction) -> DomainResult<Transaction>;

    /// Apply a return against an existing transaction and return the updated
    /// record. All validation (missing, completed, over-return) happens
    /// before any mutation.
    fn apply_return(
        &self,
        id: TransactionId,
        qty: u32,
        quantity_before: u32,
        quantity_after: u32,
        note: Option<&str>,
        now: DateTime<Utc>,
    ) -> DomainResult<Transaction>;

    /// Fetch one transaction.
    fn get(&self, id: TransactionId) -> DomainResult<Transaction>;

    /// All transactions, most recent issue first.
    fn list(&self) -> DomainResult<Vec<Transaction>>;

    /// Transactions against one component, most recent issue first.
    fn list_by_component(&self, component_id: ComponentId) -> DomainResult<Vec<Transaction>>;

    /// Transactions within one lab, most recent issue first.
    fn list_by_lab(&self, lab_id: LabId) -> DomainResult<Vec<Transaction>>;

    /// The `limit` most recently issued transactions.
    fn recent(&self, limit: usize) -> DomainResult<Vec<Transaction>>;

    /// Cascade support: drop every transaction for a component, returning how
    /// many were removed.
    fn remove_by_component(&self, component_id: ComponentId) -> DomainResult<usize>;
}

/// In-memory transaction ledger.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    transactions: RwLock<HashMap<TransactionId, Transaction>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn newest_first(mut items: Vec<Transaction>) -> Vec<Transaction> {
        items.sort_by(|a, b| b.issue_date.cmp(&a.issue_date));
        items
    }
}

impl TransactionLedger for InMemoryLedger {
    fn append(&self, transaction: Transaction) -> DomainResult<Transaction> {
        let mut transactions = self
            .transactions
            .write()
            .map_err(|_| DomainError::conflict("ledger lock poisoned"))?;
        if transactions.contains_key(&transaction.id) {
            return Err(DomainError::conflict(format!(
                "transaction {} already exists",
                transaction.id
            )));
        }
        transactions.insert(transaction.id, transaction.clone());
        Ok(transaction)
    }

    fn apply_return(
        &self,
        id: TransactionId,
        qty: u32,
        quantity_before: u32,
        quantity_after: u32,
        note: Option<&str>,
        now: DateTime<Utc>,
    ) -> DomainResult<Transaction> {
        let mut transactions = self
            .transactions
            .write()
            .map_err(|_| DomainError::conflict("ledger lock poisoned"))?;
        let transaction = transactions
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("transaction", id))?;

        transaction.apply_return(qty, quantity_before, quantity_after, note, now)?;
        Ok(transaction.clone())
    }

    fn get(&self, id: TransactionId) -> DomainResult<Transaction> {
        let transactions = self
            .transactions
            .read()
            .map_err(|_| DomainError::conflict("ledger lock poisoned"))?;
        transactions
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found("transaction", id))
    }

    fn list(&self) -> DomainResult<Vec<Transaction>> {
        let transactions = self
            .transactions
            .read()
            .map_err(|_| DomainError::conflict("ledger lock poisoned"))?;
        Ok(Self::newest_first(
            transactions.values().cloned().collect(),
        ))
    }

    fn list_by_component(&self, component_id: ComponentId) -> DomainResult<Vec<Transaction>> {
        let transactions = self
            .transactions
            .read()
            .map_err(|_| DomainError::conflict("ledger lock poisoned"))?;
        Ok(Self::newest_first(
            transactions
                .values()
                .filter(|t| t.component_id == component_id)
                .cloned()
                .collect(),
        ))
    }

    fn list_by_lab(&self, lab_id: LabId) -> DomainResult<Vec<Transaction>> {
        let transactions = self
            .transactions
            .read()
            .map_err(|_| DomainError::conflict("ledger lock poisoned"))?;
        Ok(Self::newest_first(
            transactions
                .values()
                .filter(|t| t.lab_id == lab_id)
                .cloned()
                .collect(),
        ))
    }

    fn recent(&self, limit: usize) -> DomainResult<Vec<Transaction>> {
        let mut items = self.list()?;
        items.truncate(limit);
        Ok(items)
    }

    fn remove_by_component(&self, component_id: ComponentId) -> DomainResult<usize> {
        let mut transactions = self
            .transactions
            .write()
            .map_err(|_| DomainError::conflict("ledger lock poisoned"))?;
        let before = transactions.len();
        transactions.retain(|_, t| t.component_id != component_id);
        Ok(before - transactions.len())
    }
}
