use colonycore_base::{Clock, CoreError, CoreResult, EntityId};
use colonycore_model::Entity;

use crate::change::{Action, Change, ChangePayload};
use crate::snapshot::{EntityMap, Snapshot};

/// A handle into one transaction's in-flight working copy. Every mutator runs against this
/// private copy with no lock held (§5); the Store only takes an exclusive section to swap
/// the finished copy in.
pub struct Transaction<'a> {
    working: Snapshot,
    changes: Vec<Change>,
    clock: &'a dyn Clock,
}

impl<'a> Transaction<'a> {
    pub(crate) fn new(working: Snapshot, clock: &'a dyn Clock) -> Self {
        Transaction { working, changes: Vec::new(), clock }
    }

    /// A view of the in-flight working copy, reflecting every mutation issued so far in this
    /// transaction.
    pub fn snapshot(&self) -> &Snapshot {
        &self.working
    }

    pub fn get<E: EntityMap>(&self, id: &EntityId) -> Option<E> {
        E::map(&self.working).get(id).cloned()
    }

    pub fn list<E: EntityMap>(&self) -> Vec<E> {
        E::map(&self.working).values().cloned().collect()
    }

    /// Assigns an id if the caller left one blank, stamps `created_at`/`updated_at`, validates,
    /// and enlists a `Create` change. A caller-supplied id that already exists is a validation
    /// error (global per-type uniqueness, §3's "Uniqueness" invariant).
    pub fn create<E: EntityMap>(&mut self, mut entity: E) -> CoreResult<EntityId> {
        let now = self.clock.now();
        if entity.base().id.is_blank() {
            entity.base_mut().id = EntityId::generate();
        } else if E::map(&self.working).contains_key(&entity.base().id) {
            return Err(CoreError::validation(format!(
                "{} with id {} already exists",
                E::KIND.as_str(),
                entity.base().id
            )));
        }
        entity.base_mut().created_at = now;
        entity.base_mut().updated_at = now;
        entity.validate()?;

        let id = entity.base().id.clone();
        let after = ChangePayload::of(entity.clone().into());
        E::map_mut(&mut self.working).insert(id.clone(), entity);
        self.changes.push(Change::new(E::KIND, Action::Create, ChangePayload::Absent, after));
        Ok(id)
    }

    /// Applies `mutator` to a defensive copy of the existing record, validates the result,
    /// stamps `updated_at`, and enlists an `Update` change.
    pub fn update<E: EntityMap>(
        &mut self,
        id: &EntityId,
        mutator: impl FnOnce(&mut E),
    ) -> CoreResult<()> {
        let before = E::map(&self.working)
            .get(id)
            .cloned()
            .ok_or_else(|| CoreError::not_found(E::KIND.as_str(), id.to_string()))?;

        let mut after = before.clone();
        mutator(&mut after);
        after.base_mut().updated_at = self.clock.now();
        after.validate()?;

        let before_payload = ChangePayload::of(before.into());
        let after_payload = ChangePayload::of(after.clone().into());
        E::map_mut(&mut self.working).insert(id.clone(), after);
        self.changes.push(Change::new(E::KIND, Action::Update, before_payload, after_payload));
        Ok(())
    }

    /// Removes the record and enlists a `Delete` change carrying its pre-image. Does not
    /// cascade: dangling references left on other entities surface as referential violations
    /// at the next commit (§9's open-question decision).
    pub fn delete<E: EntityMap>(&mut self, id: &EntityId) -> CoreResult<()> {
        let removed = E::map_mut(&mut self.working)
            .remove(id)
            .ok_or_else(|| CoreError::not_found(E::KIND.as_str(), id.to_string()))?;

        self.changes.push(Change::new(
            E::KIND,
            Action::Delete,
            ChangePayload::of(removed.into()),
            ChangePayload::Absent,
        ));
        Ok(())
    }

    pub(crate) fn into_parts(self) -> (Snapshot, Vec<Change>) {
        (self.working, self.changes)
    }
}
