//! Ledger domain module: issue/return transactions and their lifecycle.
//!
//! Status is never set externally; it is a pure function of the issued and
//! returned quantities. All mutation goes through [`Transaction::apply_return`],
//! which validates before touching any state.

pub mod transaction;

pub use transaction::{LastAction, NewTransaction, Transaction, TransactionStatus};
