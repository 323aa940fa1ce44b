use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use labstock_core::{ComponentId, DomainError, DomainResult, Entity, LabId, TransactionId};

/// Which operation most recently touched a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LastAction {
    Issue,
    Return,
}

/// Transaction lifecycle status, derived from quantities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionStatus {
    #[serde(rename = "Issued")]
    Issued,
    #[serde(rename = "Partially Returned")]
    PartiallyReturned,
    #[serde(rename = "Completed")]
    Completed,
}

impl TransactionStatus {
    /// Pure derivation from (qty_issued, qty_returned).
    ///
    /// Callers must uphold `qty_returned <= qty_issued`.
    pub fn derive(qty_issued: u32, qty_returned: u32) -> Self {
        debug_assert!(qty_returned <= qty_issued);
        if qty_returned == 0 {
            TransactionStatus::Issued
        } else if qty_returned < qty_issued {
            TransactionStatus::PartiallyReturned
        } else {
            TransactionStatus::Completed
        }
    }
}

/// Creation payload for an issue transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    pub component_id: ComponentId,
    pub lab_id: LabId,
    pub campus: Option<String>,
    pub person_name: String,
    pub purpose: String,
    pub qty_issued: u32,
    /// Component stock immediately before the issue was applied.
    pub quantity_before: u32,
    /// Component stock immediately after the issue was applied.
    pub quantity_after: u32,
    pub notes: Option<String>,
}

/// One issue with its running return tally.
///
/// Created only by an issue; mutated only by returns against it. The
/// before/after stock snapshots surround the most recent mutation and exist
/// for audit, not for deriving current stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub component_id: ComponentId,
    pub lab_id: LabId,
    pub campus: Option<String>,
    pub person_name: String,
    pub purpose: String,
    /// Fixed at creation, immutable thereafter.
    pub qty_issued: u32,
    /// Monotonically non-decreasing.
    pub qty_returned: u32,
    /// Always `qty_issued - qty_returned`.
    pub pending_qty: u32,
    pub status: TransactionStatus,
    pub issue_date: DateTime<Utc>,
    pub quantity_before: u32,
    pub quantity_after: u32,
    /// Quantity moved by the most recent action (issue or return).
    pub transaction_quantity: u32,
    pub last_action: LastAction,
    pub notes: String,
    pub last_updated: DateTime<Utc>,
}

impl Transaction {
    /// Open a new transaction for an issue.
    ///
    /// Zero-quantity issues and blank requester/purpose are rejected before
    /// any state exists.
    pub fn open(id: TransactionId, draft: NewTransaction, now: DateTime<Utc>) -> DomainResult<Self> {
        if draft.qty_issued == 0 {
            return Err(DomainError::invalid_input("issue quantity must be positive"));
        }
        if draft.person_name.trim().is_empty() {
            return Err(DomainError::invalid_input("person name cannot be empty"));
        }
        if draft.purpose.trim().is_empty() {
            return Err(DomainError::invalid_input("purpose cannot be empty"));
        }
        Ok(Self {
            id,
            component_id: draft.component_id,
            lab_id: draft.lab_id,
            campus: draft.campus,
            person_name: draft.person_name,
            purpose: draft.purpose,
            qty_issued: draft.qty_issued,
            qty_returned: 0,
            pending_qty: draft.qty_issued,
            status: TransactionStatus::Issued,
            issue_date: now,
            quantity_before: draft.quantity_before,
            quantity_after: draft.quantity_after,
            transaction_quantity: draft.qty_issued,
            last_action: LastAction::Issue,
            notes: draft.notes.unwrap_or_default(),
            last_updated: now,
        })
    }

    /// Apply a return of `qty` units against this transaction.
    ///
    /// Validates everything before mutating: a failed return leaves the
    /// transaction untouched. `quantity_before`/`quantity_after` are the
    /// component stock snapshots surrounding the paired stock adjustment.
    pub fn apply_return(
        &mut self,
        qty: u32,
        quantity_before: u32,
        quantity_after: u32,
        note: Option<&str>,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        if self.status == TransactionStatus::Completed {
            return Err(DomainError::already_completed(self.id));
        }
        if qty == 0 || qty > self.pending_qty {
            return Err(DomainError::invalid_return(qty, self.pending_qty));
        }

        self.qty_returned += qty;
        self.pending_qty = self.qty_issued - self.qty_returned;
        self.status = TransactionStatus::derive(self.qty_issued, self.qty_returned);
        self.quantity_before = quantity_before;
        self.quantity_after = quantity_after;
        self.transaction_quantity = qty;
        self.last_action = LastAction::Return;
        self.last_updated = now;
        if let Some(note) = note.filter(|n| !n.trim().is_empty()) {
            if self.notes.is_empty() {
                self.notes = format!("Return: {note}");
            } else {
                self.notes.push_str(&format!("\nReturn: {note}"));
            }
        }

        Ok(())
    }
}

impl Entity for Transaction {
    type Id = TransactionId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn open(qty_issued: u32) -> Transaction {
        Transaction::open(
            TransactionId::new(),
            NewTransaction {
                component_id: ComponentId::new(),
                lab_id: LabId::new(),
                campus: None,
                person_name: "Alice".to_string(),
                purpose: "experiment".to_string(),
                qty_issued,
                quantity_before: 100,
                quantity_after: 100u32.saturating_sub(qty_issued),
                notes: None,
            },
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn open_starts_fully_pending() {
        let tx = open(5);
        assert_eq!(tx.qty_returned, 0);
        assert_eq!(tx.pending_qty, 5);
        assert_eq!(tx.status, TransactionStatus::Issued);
        assert_eq!(tx.last_action, LastAction::Issue);
    }

    #[test]
    fn zero_quantity_issue_is_rejected() {
        let err = Transaction::open(
            TransactionId::new(),
            NewTransaction {
                component_id: ComponentId::new(),
                lab_id: LabId::new(),
                campus: None,
                person_name: "Alice".to_string(),
                purpose: "experiment".to_string(),
                qty_issued: 0,
                quantity_before: 10,
                quantity_after: 10,
                notes: None,
            },
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[test]
    fn partial_then_full_return_walks_the_lifecycle() {
        let mut tx = open(5);
        tx.apply_return(2, 95, 97, None, Utc::now()).unwrap();
        assert_eq!(tx.status, TransactionStatus::PartiallyReturned);
        assert_eq!(tx.pending_qty, 3);

        tx.apply_return(3, 97, 100, Some("all back"), Utc::now())
            .unwrap();
        assert_eq!(tx.status, TransactionStatus::Completed);
        assert_eq!(tx.pending_qty, 0);
        assert!(tx.notes.contains("Return: all back"));
    }

    #[test]
    fn completed_is_terminal() {
        let mut tx = open(2);
        tx.apply_return(2, 8, 10, None, Utc::now()).unwrap();

        let before = tx.clone();
        let err = tx.apply_return(1, 10, 11, None, Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::AlreadyCompleted(_)));
        assert_eq!(tx, before);
    }

    #[test]
    fn over_return_leaves_state_unchanged() {
        let mut tx = open(5);
        let before = tx.clone();
        let err = tx.apply_return(6, 95, 101, None, Utc::now()).unwrap_err();
        assert_eq!(
            err,
            DomainError::invalid_return(6, 5),
        );
        assert_eq!(tx, before);
    }

    #[test]
    fn status_derivation_table() {
        assert_eq!(TransactionStatus::derive(5, 0), TransactionStatus::Issued);
        assert_eq!(
            TransactionStatus::derive(5, 3),
            TransactionStatus::PartiallyReturned
        );
        assert_eq!(TransactionStatus::derive(5, 5), TransactionStatus::Completed);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: whatever sequence of returns is attempted, the ledger
        /// invariant `qty_returned + pending_qty == qty_issued` holds and
        /// `qty_returned` never exceeds `qty_issued`.
        #[test]
        fn return_sequences_preserve_invariants(
            qty_issued in 1u32..500,
            attempts in prop::collection::vec(0u32..600, 0..20)
        ) {
            let mut tx = open(qty_issued);

            for qty in attempts {
                // Failures must not disturb state; successes must keep it consistent.
                let _ = tx.apply_return(qty, 0, qty, None, Utc::now());

                prop_assert_eq!(tx.qty_returned + tx.pending_qty, tx.qty_issued);
                prop_assert!(tx.qty_returned <= tx.qty_issued);
                prop_assert_eq!(
                    tx.status,
                    TransactionStatus::derive(tx.qty_issued, tx.qty_returned)
                );
            }
        }
    }
}
