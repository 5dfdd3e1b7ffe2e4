/// Entity handles and the per-run entity registry.
///
/// Entities are the domain's clients or jobs. The kernel never inspects
/// their payload; it only threads opaque handles through scheduling and
/// wait queues. The registry maps handles to payloads so that every
/// entity still alive at the end of a replication can be found and
/// disposed of.

use std::collections::BTreeMap;

/// Opaque handle to a live entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityId(u64);

impl EntityId {
    /// Wrap a raw id. Mostly useful in tests; live handles come from
    /// [`EntityRegistry::create`].
    #[inline]
    pub const fn new(raw: u64) -> Self {
        EntityId(raw)
    }

    /// Return the raw id.
    #[inline]
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "C{}", self.0)
    }
}

/// Registry of live entities, owned by the replication controller.
///
/// Handles are never reused within a run, so a stale handle held by a
/// dropped event resolves to `None` instead of aliasing a new entity.
/// Iteration order is deterministic (ascending handle).
#[derive(Debug, Clone, Default)]
pub struct EntityRegistry<T> {
    entities: BTreeMap<EntityId, T>,
    next: u64,
}

impl<T> EntityRegistry<T> {
    /// Create an empty registry.
    pub fn new() -> Self {
        EntityRegistry {
            entities: BTreeMap::new(),
            next: 0,
        }
    }

    /// Register a new entity and return its handle.
    pub fn create(&mut self, payload: T) -> EntityId {
        let id = EntityId(self.next);
        self.next += 1;
        self.entities.insert(id, payload);
        id
    }

    /// Look up an entity.
    pub fn get(&self, id: EntityId) -> Option<&T> {
        self.entities.get(&id)
    }

    /// Look up an entity mutably.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        self.entities.get_mut(&id)
    }

    /// Remove an entity, returning its payload if it was alive.
    pub fn dispose(&mut self, id: EntityId) -> Option<T> {
        self.entities.remove(&id)
    }

    /// Remove and return every live entity, in ascending handle order.
    ///
    /// End-of-replication cleanup: the controller feeds the drained
    /// payloads through the model's dispose hook.
    pub fn drain(&mut self) -> impl Iterator<Item = (EntityId, T)> {
        std::mem::take(&mut self.entities).into_iter()
    }

    /// Number of live entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns `true` if no entities are alive.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_get() {
        let mut reg: EntityRegistry<&str> = EntityRegistry::new();
        let a = reg.create("alpha");
        let b = reg.create("beta");
        assert_ne!(a, b);
        assert_eq!(reg.get(a), Some(&"alpha"));
        assert_eq!(reg.get(b), Some(&"beta"));
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn test_dispose() {
        let mut reg: EntityRegistry<u32> = EntityRegistry::new();
        let a = reg.create(7);
        assert_eq!(reg.dispose(a), Some(7));
        assert_eq!(reg.dispose(a), None);
        assert!(reg.is_empty());
    }

    #[test]
    fn test_handles_not_reused() {
        let mut reg: EntityRegistry<u32> = EntityRegistry::new();
        let a = reg.create(1);
        reg.dispose(a);
        let b = reg.create(2);
        assert_ne!(a, b);
        // Stale handle resolves to nothing.
        assert_eq!(reg.get(a), None);
    }

    #[test]
    fn test_drain() {
        let mut reg: EntityRegistry<u32> = EntityRegistry::new();
        reg.create(10);
        reg.create(20);
        let drained: Vec<(EntityId, u32)> = reg.drain().collect();
        assert_eq!(drained.len(), 2);
        assert!(reg.is_empty());
        assert!(drained[0].0 < drained[1].0);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", EntityId::new(3)), "C3");
    }
}
