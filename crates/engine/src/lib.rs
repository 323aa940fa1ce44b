//! Inventory transaction engine.
//!
//! Orchestrates the stock store, the transaction ledger and the per-component
//! lock registry behind two stock-mutating entry points (issue, return) plus
//! administrative restock and cascade deletes. Every mutating operation
//! validates against current state first and then applies its writes as one
//! exclusive unit per component, so aggregate stock and the ledger never
//! diverge.

pub mod catalog_store;
pub mod engine;
pub mod ledger_store;
pub mod locks;
pub mod monitor;
pub mod store;

pub use catalog_store::CatalogStore;
pub use engine::{InMemoryEngine, InventoryEngine, IssueRequest};
pub use ledger_store::{InMemoryLedger, TransactionLedger};
pub use locks::ComponentLocks;
pub use monitor::StockMonitor;
pub use store::{InMemoryStockStore, StockStore};
