//! End-to-end coverage of §8's concrete scenarios that exercise the default rule set through
//! an actual `Store` commit, as opposed to each rule's own unit tests which call `evaluate`
//! directly against a hand-built view and change list.

use std::sync::Arc;

use colonycore_base::{CancellationToken, CoreError};
use colonycore_model::{ApprovalStatus, Stage};
use colonycore_rules::default_rules_engine;
use colonycore_store::{DriverConfig, Store};
use colonycore_testkit::{facility, housing_unit, organism, procedure, protocol};

fn store() -> Store {
    Store::open(DriverConfig::Memory, Arc::new(default_rules_engine())).expect("open store")
}

#[test]
fn housing_overflow_blocks_the_second_organism_and_neither_persists() {
    let store = store();
    let cancel = CancellationToken::new();

    let facility_id = store
        .run_in_transaction(&cancel, |txn| -> Result<_, CoreError> { txn.create(facility()) })
        .expect("create facility")
        .0;
    let housing_id = store
        .run_in_transaction(&cancel, |txn| -> Result<_, CoreError> {
            txn.create(housing_unit(facility_id, 1))
        })
        .expect("create housing unit")
        .0;

    let result = store.run_in_transaction(&cancel, |txn| -> Result<_, CoreError> {
        txn.create(organism(Some(housing_id.clone())))?;
        txn.create(organism(Some(housing_id.clone())))
    });

    let err = result.expect_err("overflow must be blocked");
    match err {
        CoreError::RuleViolation(violations) => {
            assert!(violations.violations.iter().any(|v| v.rule == "housing_capacity"));
        }
        other => panic!("expected a rule violation, got {other:?}"),
    }
    assert!(store.list::<colonycore_model::Organism>().is_empty());
}

#[test]
fn leaving_a_terminal_stage_blocks_the_commit() {
    let store = store();
    let cancel = CancellationToken::new();

    let mut retired = organism(None);
    retired.stage = Stage::Retired;
    let organism_id = store
        .run_in_transaction(&cancel, |txn| -> Result<_, CoreError> { txn.create(retired) })
        .expect("create organism")
        .0;

    let result = store.run_in_transaction(&cancel, |txn| -> Result<_, CoreError> {
        txn.update::<colonycore_model::Organism>(&organism_id, |o| o.stage = Stage::Adult)
    });

    let err = result.expect_err("leaving a terminal stage must be blocked");
    match err {
        CoreError::RuleViolation(violations) => {
            assert!(violations.violations.iter().any(|v| v.rule == "lifecycle_transition"));
        }
        other => panic!("expected a rule violation, got {other:?}"),
    }
}

#[test]
fn a_procedure_naming_an_uncovered_organism_is_blocked() {
    let store = store();
    let cancel = CancellationToken::new();

    let mut approved = protocol(0);
    approved.status = ApprovalStatus::Approved;
    let protocol_id = store
        .run_in_transaction(&cancel, |txn| -> Result<_, CoreError> { txn.create(approved) })
        .expect("create protocol")
        .0;
    let organism_id = store
        .run_in_transaction(&cancel, |txn| -> Result<_, CoreError> { txn.create(organism(None)) })
        .expect("create organism")
        .0;

    let result = store.run_in_transaction(&cancel, |txn| -> Result<_, CoreError> {
        txn.create(procedure(protocol_id.clone(), vec![organism_id.clone()]))
    });

    let err = result.expect_err("uncovered organism must block the procedure");
    match err {
        CoreError::RuleViolation(violations) => {
            assert!(violations.violations.iter().any(|v| v.rule == "protocol_coverage"));
        }
        other => panic!("expected a rule violation, got {other:?}"),
    }
}
