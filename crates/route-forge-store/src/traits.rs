use route_forge_core::reconcile::{ReconcilePlan, RetiredLedger};
use route_forge_core::types::{
    Exposure, Route, RouteGroup, RouteIdentity, RoutePath, RouteSet, ServiceKey,
};

use crate::error::StoreError;

/// Durable home of the curated route groups and the retired ledger.
///
/// Implementations handle:
/// - Loading the persisted groups into memory
/// - Writing the full in-memory set back in one `save`
///
/// Every mutator works in memory only; `save` is the single operation that
/// touches persistent state.
pub trait RouteStore {
    /// Loads all persisted groups, replacing the in-memory state.
    ///
    /// Fails as a whole on the first malformed descriptor.
    fn load(&mut self) -> Result<&RouteSet, StoreError>;

    /// Writes the in-memory state back.
    fn save(&mut self) -> Result<(), StoreError>;

    fn route_set(&self) -> &RouteSet;

    fn route_set_mut(&mut self) -> &mut RouteSet;

    fn retired(&self) -> &RetiredLedger;

    fn retired_mut(&mut self) -> &mut RetiredLedger;

    /// Exact lookup; `None` when the group is unknown.
    fn group_for(&self, key: &ServiceKey, path: &RoutePath) -> Option<&RouteGroup> {
        self.route_set().group_for(key, path)
    }

    /// Inserts a group, replacing an existing one with the same key.
    fn add_group(&mut self, group: RouteGroup) {
        self.route_set_mut().add_group(group);
    }

    /// Applies the drop and restore steps of a reconciliation plan.
    fn apply_plan(&mut self, plan: &ReconcilePlan) {
        let mut ledger = std::mem::take(self.retired_mut());
        plan.apply(self.route_set_mut(), &mut ledger);
        *self.retired_mut() = ledger;
    }

    /// Records a decision, creating the group when absent.
    fn record(&mut self, id: &RouteIdentity, exposure: Exposure) -> Option<Route> {
        self.route_set_mut().insert_route(id, exposure)
    }
}

/// A store that never touches disk.
#[derive(Debug, Clone, Default)]
pub struct MemoryRouteStore {
    set: RouteSet,
    retired: RetiredLedger,
    saves: usize,
}

impl MemoryRouteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_set(set: RouteSet) -> Self {
        Self {
            set,
            ..Self::default()
        }
    }

    /// How many times `save` was called.
    pub fn saves(&self) -> usize {
        self.saves
    }
}

impl RouteStore for MemoryRouteStore {
    fn load(&mut self) -> Result<&RouteSet, StoreError> {
        Ok(&self.set)
    }

    fn save(&mut self) -> Result<(), StoreError> {
        self.saves += 1;
        Ok(())
    }

    fn route_set(&self) -> &RouteSet {
        &self.set
    }

    fn route_set_mut(&mut self) -> &mut RouteSet {
        &mut self.set
    }

    fn retired(&self) -> &RetiredLedger {
        &self.retired
    }

    fn retired_mut(&mut self) -> &mut RetiredLedger {
        &mut self.retired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use route_forge_core::reconcile::ReconcileEngine;
    use route_forge_core::types::{Endpoint, HttpMethod};

    fn id(s: &str) -> RouteIdentity {
        s.parse().unwrap()
    }

    fn users_get() -> Endpoint {
        Endpoint::new(ServiceKey::new("app", "users").unwrap())
            .with_operation(RoutePath::new("/users").unwrap(), HttpMethod::Get)
    }

    #[test]
    fn dropped_route_returns_through_ledger() {
        let mut store = MemoryRouteStore::new();
        store.record(&id("app/users /users GET"), Exposure::Protected);

        let plan = ReconcileEngine::plan(store.route_set(), store.retired(), &[]);
        store.apply_plan(&plan);
        assert!(store.route_set().is_empty());
        assert_eq!(store.retired().get(&id("app/users /users GET")), Some(Exposure::Protected));

        let plan = ReconcileEngine::plan(store.route_set(), store.retired(), &[users_get()]);
        assert_eq!(plan.restore_count(), 1);
        store.apply_plan(&plan);
        assert_eq!(
            store.route_set().exposure(&id("app/users /users GET")),
            Some(Exposure::Protected)
        );
        assert!(store.retired().is_empty());
    }

    #[test]
    fn apply_plan_matches_in_memory_apply() {
        let mut store = MemoryRouteStore::new();
        store.record(&id("app/users /users GET"), Exposure::Public);
        store.record(&id("app/users /users POST"), Exposure::Public);
        store.record(&id("app/orders /orders GET"), Exposure::Public);

        let plan = ReconcileEngine::plan(store.route_set(), store.retired(), &[users_get()]);

        let mut expected_set = store.route_set().clone();
        let mut expected_ledger = store.retired().clone();
        plan.apply(&mut expected_set, &mut expected_ledger);

        store.apply_plan(&plan);
        assert_eq!(store.route_set(), &expected_set);
        assert_eq!(store.retired(), &expected_ledger);
    }
}
