//! Cache Table Module
//!
//! The per-kind mapping from entity identifier to the latest known entity.
//! Entries are shared out as `Arc`s so an unchanged entry hands every reader
//! the same allocation.

use std::collections::HashMap;
use std::sync::Arc;

use crate::entities::{Entity, EntityId};

// == Cache Table ==
/// In-memory map from identifier to the latest known entity of one kind.
///
/// One entry per identifier: an update replaces, never appends. Entries are
/// never removed once known — soft delete is a field flip on the entity,
/// not an absence.
#[derive(Debug)]
pub struct CacheTable<E: Entity> {
    entries: HashMap<EntityId, Arc<E>>,
}

impl<E: Entity> CacheTable<E> {
    // == Constructor ==
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    // == Get ==
    /// Returns the cached entity, sharing the stored allocation.
    pub fn get(&self, id: &EntityId) -> Option<Arc<E>> {
        self.entries.get(id).cloned()
    }

    // == Insert ==
    /// Stores a full entity as returned by the backend.
    ///
    /// Completion-time last-writer-wins, guarded by revision: when the
    /// incoming entity carries a revision older than the cached one, the
    /// incoming value is discarded and the cached entry kept. Returns the
    /// entry now in the table and whether the incoming value was applied.
    pub fn insert(&mut self, entity: E) -> (Arc<E>, bool) {
        let id = entity.id().clone();

        if let Some(existing) = self.entries.get(&id) {
            if is_stale(existing.revision(), entity.revision()) {
                return (existing.clone(), false);
            }
        }

        let entry = Arc::new(entity);
        self.entries.insert(id, entry.clone());
        (entry, true)
    }

    // == Merge ==
    /// Shallow-merges an update into the cached entry.
    ///
    /// Starts from the prior cached entity, overwrites only the fields
    /// present in `patch`, and adopts provenance (updated_by/at, revision,
    /// deleted) from the backend echo — this preserves cached fields the
    /// backend does not echo back. When nothing was cached for `id`, the
    /// echo itself is inserted. A stale echo (older revision than cached)
    /// is discarded.
    pub fn merge(&mut self, id: &EntityId, patch: &E::Patch, echo: E) -> (Arc<E>, bool) {
        match self.entries.get(id) {
            Some(existing) => {
                if is_stale(existing.revision(), echo.revision()) {
                    return (existing.clone(), false);
                }
                let mut next = (**existing).clone();
                next.apply_patch(patch);
                *next.provenance_mut() = echo.provenance().clone();
                let entry = Arc::new(next);
                self.entries.insert(id.clone(), entry.clone());
                (entry, true)
            }
            None => self.insert(echo),
        }
    }

    // == Length ==
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // == Iteration ==
    /// All cached entries, in no particular order.
    pub fn values(&self) -> impl Iterator<Item = &Arc<E>> {
        self.entries.values()
    }

    /// All known identifiers, in no particular order.
    pub fn ids(&self) -> impl Iterator<Item = &EntityId> {
        self.entries.keys()
    }
}

impl<E: Entity> Default for CacheTable<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Revision 0 means the backend does not version this record, which
/// disables the guard.
fn is_stale(cached: u64, incoming: u64) -> bool {
    incoming != 0 && cached > incoming
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Client, Provenance};

    fn client(id: &str, name: &str, revision: u64) -> Client {
        let mut provenance = Provenance::new("U1");
        provenance.revision = revision;
        Client {
            id: EntityId::from(id),
            name: name.into(),
            email: None,
            phone: None,
            address: None,
            notes: None,
            provenance,
        }
    }

    #[test]
    fn test_insert_and_get() {
        let mut table = CacheTable::new();
        let (entry, applied) = table.insert(client("C1", "Ada", 1));

        assert!(applied);
        assert_eq!(entry.name, "Ada");
        assert_eq!(table.len(), 1);
        assert!(Arc::ptr_eq(&table.get(&EntityId::from("C1")).unwrap(), &entry));
    }

    #[test]
    fn test_insert_replaces_never_appends() {
        let mut table = CacheTable::new();
        table.insert(client("C1", "Ada", 1));
        table.insert(client("C1", "Ada Moreau", 2));

        assert_eq!(table.len(), 1);
        assert_eq!(table.get(&EntityId::from("C1")).unwrap().name, "Ada Moreau");
    }

    #[test]
    fn test_stale_insert_is_discarded() {
        let mut table = CacheTable::new();
        table.insert(client("C1", "newer", 5));
        let (entry, applied) = table.insert(client("C1", "older", 3));

        assert!(!applied);
        assert_eq!(entry.name, "newer");
    }

    #[test]
    fn test_unversioned_insert_always_applies() {
        let mut table = CacheTable::new();
        table.insert(client("C1", "first", 0));
        let (_, applied) = table.insert(client("C1", "second", 0));
        assert!(applied);
    }

    #[test]
    fn test_merge_preserves_unpatched_fields() {
        use crate::entities::ClientPatch;

        let mut table = CacheTable::new();
        let mut cached = client("C1", "Ada", 1);
        cached.email = Some("ada@example.com".into());
        table.insert(cached);

        // The echo omits the email, as a sparse backend response would
        let patch = ClientPatch {
            notes: Some("prefers mornings".into()),
            ..ClientPatch::default()
        };
        let (merged, applied) = table.merge(&EntityId::from("C1"), &patch, client("C1", "Ada", 2));

        assert!(applied);
        assert_eq!(merged.email.as_deref(), Some("ada@example.com"));
        assert_eq!(merged.notes.as_deref(), Some("prefers mornings"));
        assert_eq!(merged.revision(), 2);
    }

    #[test]
    fn test_merge_without_prior_entry_inserts_echo() {
        use crate::entities::ClientPatch;

        let mut table = CacheTable::new();
        let (entry, applied) = table.merge(
            &EntityId::from("C9"),
            &ClientPatch::default(),
            client("C9", "Niko", 1),
        );

        assert!(applied);
        assert_eq!(entry.name, "Niko");
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_get_unknown_id() {
        let table: CacheTable<Client> = CacheTable::new();
        assert!(table.get(&EntityId::from("nope")).is_none());
    }
}
