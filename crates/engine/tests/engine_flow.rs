//! End-to-end engine tests: issue/return lifecycle, audit snapshots,
//! cascade deletes and the stock monitor.

use labstock_catalog::NewComponent;
use labstock_core::{DomainError, LabId};
use labstock_engine::{InMemoryEngine, IssueRequest};
use labstock_ledger::{LastAction, TransactionStatus};

struct Fixture {
    engine: InMemoryEngine,
    lab_id: LabId,
    component_id: labstock_core::ComponentId,
}

fn setup(quantity: u32, min_stock_level: u32) -> Fixture {
    let engine = InMemoryEngine::in_memory();
    let lab = engine
        .register_lab("Electronics Lab", "Block B", "teaching lab")
        .unwrap();
    let category = engine
        .register_category("Test Equipment", "", lab.id)
        .unwrap();
    let component = engine
        .register_component(NewComponent {
            name: "Multimeter".to_string(),
            category_id: category.id,
            lab_id: lab.id,
            quantity,
            min_stock_level,
            unit: "pcs".to_string(),
            component_type: Some("Instrument".to_string()),
            description: String::new(),
        })
        .unwrap();
    Fixture {
        engine,
        lab_id: lab.id,
        component_id: component.id,
    }
}

fn issue(f: &Fixture, quantity: u32) -> labstock_ledger::Transaction {
    f.engine
        .issue(IssueRequest {
            component_id: f.component_id,
            person_name: "Alice".to_string(),
            purpose: "experiment".to_string(),
            quantity,
            campus: None,
            notes: None,
        })
        .unwrap()
}

#[test]
fn issue_then_full_return_round_trips_stock() {
    let f = setup(10, 0);

    let tx = issue(&f, 5);
    assert_eq!(tx.status, TransactionStatus::Issued);
    assert_eq!(tx.quantity_before, 10);
    assert_eq!(tx.quantity_after, 5);
    assert_eq!(f.engine.component(f.component_id).unwrap().quantity, 5);

    let tx = f.engine.accept_return(tx.id, 5, None).unwrap();
    assert_eq!(tx.status, TransactionStatus::Completed);
    assert_eq!(tx.last_action, LastAction::Return);
    assert_eq!(tx.quantity_before, 5);
    assert_eq!(tx.quantity_after, 10);
    assert_eq!(f.engine.component(f.component_id).unwrap().quantity, 10);
}

#[test]
fn issue_rejects_insufficient_stock_without_mutation() {
    let f = setup(3, 0);

    let err = f
        .engine
        .issue(IssueRequest {
            component_id: f.component_id,
            person_name: "Alice".to_string(),
            purpose: "experiment".to_string(),
            quantity: 4,
            campus: None,
            notes: None,
        })
        .unwrap_err();

    assert_eq!(err, DomainError::insufficient_stock(4, 3));
    assert_eq!(f.engine.component(f.component_id).unwrap().quantity, 3);
    assert!(f.engine.transactions().unwrap().is_empty());
}

#[test]
fn issue_validates_inputs_before_touching_state() {
    let f = setup(5, 0);

    for (person, purpose, quantity) in [
        ("", "experiment", 1u32),
        ("Alice", "  ", 1),
        ("Alice", "experiment", 0),
    ] {
        let err = f
            .engine
            .issue(IssueRequest {
                component_id: f.component_id,
                person_name: person.to_string(),
                purpose: purpose.to_string(),
                quantity,
                campus: None,
                notes: None,
            })
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)), "{err}");
    }

    assert_eq!(f.engine.component(f.component_id).unwrap().quantity, 5);
    assert!(f.engine.transactions().unwrap().is_empty());
}

#[test]
fn over_return_fails_and_leaves_all_state_unchanged() {
    let f = setup(10, 0);
    let tx = issue(&f, 4);

    let err = f.engine.accept_return(tx.id, 5, None).unwrap_err();
    assert_eq!(err, DomainError::invalid_return(5, 4));

    assert_eq!(f.engine.transaction(tx.id).unwrap(), tx);
    assert_eq!(f.engine.component(f.component_id).unwrap().quantity, 6);
}

#[test]
fn completed_transaction_rejects_further_returns() {
    let f = setup(10, 0);
    let tx = issue(&f, 2);
    f.engine.accept_return(tx.id, 2, None).unwrap();

    let err = f.engine.accept_return(tx.id, 1, None).unwrap_err();
    assert!(matches!(err, DomainError::AlreadyCompleted(_)));
    assert_eq!(f.engine.component(f.component_id).unwrap().quantity, 10);

    let stored = f.engine.transaction(tx.id).unwrap();
    assert_eq!(stored.status, TransactionStatus::Completed);
    assert_eq!(stored.pending_qty, 0);
}

#[test]
fn return_against_unknown_transaction_is_not_found() {
    let f = setup(10, 0);
    let err = f
        .engine
        .accept_return(labstock_core::TransactionId::new(), 1, None)
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
}

#[test]
fn monitor_tracks_the_low_stock_scenario() {
    // Component quantity=10, min_stock_level=3. Issue 8 → low. Return 5 → not low.
    let f = setup(10, 3);
    let monitor = f.engine.monitor();

    let tx = issue(&f, 8);
    assert_eq!(f.engine.component(f.component_id).unwrap().quantity, 2);
    let low = monitor.list_low_stock(Some(f.lab_id)).unwrap();
    assert_eq!(low.len(), 1);
    assert_eq!(low[0].id, f.component_id);

    let tx = f.engine.accept_return(tx.id, 5, None).unwrap();
    assert_eq!(tx.status, TransactionStatus::PartiallyReturned);
    assert_eq!(tx.pending_qty, 3);
    assert_eq!(f.engine.component(f.component_id).unwrap().quantity, 7);
    assert!(monitor.list_low_stock(Some(f.lab_id)).unwrap().is_empty());
}

#[test]
fn monitor_scopes_to_the_requested_lab() {
    let f = setup(0, 0);
    let other = setup(0, 0);

    let monitor = f.engine.monitor();
    assert_eq!(monitor.list_low_stock(None).unwrap().len(), 1);
    assert!(monitor.list_low_stock(Some(other.lab_id)).unwrap().is_empty());
    assert_eq!(monitor.list_out_of_stock(Some(f.lab_id)).unwrap().len(), 1);
}

#[test]
fn restock_goes_through_the_single_mutation_path() {
    let f = setup(1, 5);

    assert_eq!(f.engine.restock(f.component_id, 9).unwrap(), 10);
    assert!(matches!(
        f.engine.restock(f.component_id, 0).unwrap_err(),
        DomainError::InvalidInput(_)
    ));
}

#[test]
fn component_lab_must_match_category_lab() {
    let f = setup(1, 0);
    let stray_lab = f.engine.register_lab("Stray", "", "").unwrap();
    let category = f.engine.categories(Some(f.lab_id)).unwrap()[0].clone();

    let err = f
        .engine
        .register_component(NewComponent {
            name: "Mismatched".to_string(),
            category_id: category.id,
            lab_id: stray_lab.id,
            quantity: 0,
            min_stock_level: 0,
            unit: "pcs".to_string(),
            component_type: None,
            description: String::new(),
        })
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidInput(_)));
}

#[test]
fn deleting_a_component_cascades_to_its_transactions() {
    let f = setup(10, 0);
    let tx = issue(&f, 3);

    f.engine.delete_component(f.component_id).unwrap();

    assert!(matches!(
        f.engine.component(f.component_id).unwrap_err(),
        DomainError::NotFound { .. }
    ));
    assert!(matches!(
        f.engine.transaction(tx.id).unwrap_err(),
        DomainError::NotFound { .. }
    ));
    // Returns against the cascaded transaction fail cleanly.
    assert!(matches!(
        f.engine.accept_return(tx.id, 1, None).unwrap_err(),
        DomainError::NotFound { .. }
    ));
}

#[test]
fn deleting_a_lab_cascades_through_categories_and_components() {
    let f = setup(10, 0);
    issue(&f, 2);
    issue(&f, 1);

    f.engine.delete_lab(f.lab_id).unwrap();

    assert!(f.engine.labs().unwrap().is_empty());
    assert!(f.engine.categories(None).unwrap().is_empty());
    assert!(f.engine.components().unwrap().is_empty());
    assert!(f.engine.transactions().unwrap().is_empty());
}

#[test]
fn ledger_queries_order_newest_first_and_honor_limit() {
    let f = setup(10, 0);
    issue(&f, 1);
    issue(&f, 2);
    issue(&f, 3);

    let all = f.engine.transactions().unwrap();
    assert_eq!(all.len(), 3);
    assert!(all[0].issue_date >= all[1].issue_date);
    assert!(all[1].issue_date >= all[2].issue_date);

    let recent = f.engine.recent_transactions(2).unwrap();
    assert_eq!(recent.len(), 2);
    assert!(recent[0].issue_date >= recent[1].issue_date);
}

#[test]
fn return_notes_are_appended_to_the_transaction() {
    let f = setup(10, 0);
    let tx = f
        .engine
        .issue(IssueRequest {
            component_id: f.component_id,
            person_name: "Alice".to_string(),
            purpose: "experiment".to_string(),
            quantity: 4,
            campus: Some("North".to_string()),
            notes: Some("handle with care".to_string()),
        })
        .unwrap();
    assert_eq!(tx.campus.as_deref(), Some("North"));

    let tx = f
        .engine
        .accept_return(tx.id, 1, Some("one probe bent".to_string()))
        .unwrap();
    assert!(tx.notes.contains("handle with care"));
    assert!(tx.notes.contains("Return: one probe bent"));
    assert_eq!(tx.transaction_quantity, 1);
}
