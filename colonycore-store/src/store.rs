use std::sync::Arc;

use colonycore_base::{CancellationToken, Clock, CoreError, CoreResult, EntityId, SystemClock};

use crate::driver::{Driver, DriverConfig};
use crate::snapshot::{EntityMap, Snapshot};
use crate::transaction::Transaction;
use crate::view::{RuleEvaluator, RuleView};

use parking_lot::RwLock;

/// The transactional store: snapshot reads, read-write transactions, and driver-backed
/// persistence, over the heterogeneous entity set (§4.1).
///
/// Readers take the shared half of `snapshot`, clone the `Arc`, and release immediately
/// (§5: "never block each other"). Writers take the exclusive half only for the final swap;
/// the user-supplied mutator and the rules pass both run against a private working copy with
/// no lock held, so a slow mutator does not stall readers — it only delays other writers,
/// which are serialized by the same lock.
pub struct Store {
    snapshot: RwLock<Arc<Snapshot>>,
    driver: Driver,
    evaluator: Arc<dyn RuleEvaluator>,
    clock: Arc<dyn Clock>,
}

impl Store {
    pub fn open(config: DriverConfig, evaluator: Arc<dyn RuleEvaluator>) -> CoreResult<Store> {
        Store::open_with_clock(config, evaluator, Arc::new(SystemClock))
    }

    pub fn open_with_clock(
        config: DriverConfig,
        evaluator: Arc<dyn RuleEvaluator>,
        clock: Arc<dyn Clock>,
    ) -> CoreResult<Store> {
        let (driver, snapshot) = Driver::open(config)?;
        Ok(Store { snapshot: RwLock::new(Arc::new(snapshot)), driver, evaluator, clock })
    }

    /// Begins a transaction, invokes `f` with a handle into a private working copy, then
    /// either commits (running the Rules Engine against the post-image and, if nothing
    /// blocks, swapping the working copy in and persisting it) or rolls back.
    ///
    /// `f`'s own error is wrapped as `CoreError::User` and the transaction is rolled back
    /// unchanged; a blocking rule violation rolls back and returns `CoreError::RuleViolation`
    /// carrying the full `RuleResult`; a persistence failure after a clean rule pass reverts
    /// the in-memory snapshot to its prior value and returns `CoreError::Store`.
    pub fn run_in_transaction<T, E>(
        &self,
        cancel: &CancellationToken,
        f: impl FnOnce(&mut Transaction) -> Result<T, E>,
    ) -> CoreResult<(T, colonycore_base::RuleResult)>
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        if cancel.is_cancelled() {
            return Err(CoreError::store(std::io::Error::other("transaction cancelled before start")));
        }

        let current = self.snapshot.read().clone();
        let mut txn = Transaction::new((*current).clone(), self.clock.as_ref());
        let outcome = match f(&mut txn) {
            Ok(value) => value,
            Err(err) => {
                let err = CoreError::user(err);
                debug_assert!(err.aborts_transaction(), "a caller's mutator error is always a hard abort");
                tracing::warn!(target: "colonycore", "transaction callback failed, rolling back: {err}");
                return Err(err);
            }
        };

        if cancel.is_cancelled() {
            return Err(CoreError::store(std::io::Error::other(
                "transaction cancelled before commit",
            )));
        }

        let (working, changes) = txn.into_parts();
        let view = RuleView::new(Arc::new(working.clone()));
        let rule_result = self.evaluator.evaluate(&view, &changes)?;

        if rule_result.has_blocking() {
            tracing::warn!(target: "colonycore", violations = rule_result.violations.len(), "commit blocked by rule violations");
            return Err(CoreError::RuleViolation(rule_result));
        }

        if let Err(err) = self.driver.persist(&working) {
            tracing::error!(target: "colonycore", "persistence failed, snapshot left unchanged: {err}");
            return Err(err);
        }

        *self.snapshot.write() = Arc::new(working);
        tracing::debug!(target: "colonycore", changes = changes.len(), "transaction committed");
        Ok((outcome, rule_result))
    }

    /// Invokes `f` with a read-only view of a point-in-time snapshot. No locks are held
    /// during `f` itself — only during the `Arc` clone that precedes it.
    pub fn view<T>(&self, _cancel: &CancellationToken, f: impl FnOnce(&RuleView) -> T) -> T {
        let snapshot = self.snapshot.read().clone();
        f(&RuleView::new(snapshot))
    }

    pub fn get<E: EntityMap>(&self, id: &EntityId) -> Option<E> {
        let snapshot = self.snapshot.read().clone();
        E::map(&snapshot).get(id).cloned()
    }

    pub fn list<E: EntityMap>(&self) -> Vec<E> {
        let snapshot = self.snapshot.read().clone();
        E::map(&snapshot).values().cloned().collect()
    }

    /// Deterministic bulk replace, bypassing the Rules Engine; used by fixtures and driver
    /// migration, not by ordinary callers.
    pub fn import_state(&self, snapshot: Snapshot) -> CoreResult<()> {
        self.driver.persist(&snapshot)?;
        *self.snapshot.write() = Arc::new(snapshot);
        Ok(())
    }

    pub fn export_state(&self) -> Snapshot {
        (*self.snapshot.read().clone()).clone()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::view::NoopEvaluator;
    use chrono::Utc;
    use colonycore_model::{Base, Facility};

    fn facility() -> Facility {
        Facility {
            base: Base::new(EntityId::default(), Utc::now()),
            code: "F1".into(),
            name: "Main".into(),
            zone: "north".into(),
            access_policy: "restricted".into(),
            environment_baselines: Default::default(),
            housing_unit_ids: vec![],
            project_ids: vec![],
        }
    }

    fn store() -> Store {
        Store::open(DriverConfig::Memory, Arc::new(NoopEvaluator)).expect("open store")
    }

    #[test]
    fn committed_create_is_visible_to_later_reads() {
        let store = store();
        let cancel = CancellationToken::new();
        let (id, _) = store
            .run_in_transaction(&cancel, |txn| -> Result<EntityId, CoreError> {
                txn.create(facility())
            })
            .expect("commit");

        let fetched: Facility = store.get(&id).expect("present after commit");
        assert_eq!(fetched.code, "F1");
    }

    #[test]
    fn a_failed_mutator_rolls_back_without_touching_the_snapshot() {
        let store = store();
        let cancel = CancellationToken::new();
        let result = store.run_in_transaction(&cancel, |txn| -> Result<(), CoreError> {
            txn.create(facility())?;
            Err(CoreError::validation("caller changed its mind"))
        });
        assert!(result.is_err());
        assert!(store.list::<Facility>().is_empty());
    }

    #[test]
    fn reads_returned_from_the_store_do_not_alias_state() {
        let store = store();
        let cancel = CancellationToken::new();
        let (id, _) = store
            .run_in_transaction(&cancel, |txn| -> Result<EntityId, CoreError> {
                txn.create(facility())
            })
            .expect("commit");

        let mut fetched: Facility = store.get(&id).expect("present");
        fetched.name = "mutated locally".into();

        let refetched: Facility = store.get(&id).expect("present");
        assert_eq!(refetched.name, "Main");
    }

    #[test]
    fn export_then_import_round_trips_through_a_fresh_store() {
        let store = store();
        let cancel = CancellationToken::new();
        store
            .run_in_transaction(&cancel, |txn| -> Result<EntityId, CoreError> {
                txn.create(facility())
            })
            .expect("commit");

        let exported = store.export_state();
        let other = store();
        other.import_state(exported).expect("import");
        assert_eq!(other.list::<Facility>().len(), 1);
    }
}
