use std::collections::BTreeMap;

use super::exposure::Exposure;
use super::identity::RouteIdentity;
use super::route::Route;
use super::route_group::RouteGroup;
use super::route_path::RoutePath;
use super::service_key::ServiceKey;

type GroupKey = (ServiceKey, RoutePath);

/// Ordered collection of route groups keyed by `(module, service, path)`.
///
/// Iteration is always in key order, which keeps reconciliation plans and
/// synthesized configs deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteSet {
    groups: BTreeMap<GroupKey, RouteGroup>,
}

impl RouteSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn group_for(&self, key: &ServiceKey, path: &RoutePath) -> Option<&RouteGroup> {
        self.groups.get(&(key.clone(), path.clone()))
    }

    pub fn group_for_mut(&mut self, key: &ServiceKey, path: &RoutePath) -> Option<&mut RouteGroup> {
        self.groups.get_mut(&(key.clone(), path.clone()))
    }

    /// Inserts a group, returning the one it replaced.
    pub fn add_group(&mut self, group: RouteGroup) -> Option<RouteGroup> {
        let k = (group.key().clone(), group.path().clone());
        self.groups.insert(k, group)
    }

    pub fn remove_group(&mut self, key: &ServiceKey, path: &RoutePath) -> Option<RouteGroup> {
        self.groups.remove(&(key.clone(), path.clone()))
    }

    /// Inserts a route into its group, creating the group when absent.
    ///
    /// An existing group is reused so the decisions of its other routes are
    /// untouched. Returns the replaced route, if any.
    pub fn insert_route(&mut self, id: &RouteIdentity, exposure: Exposure) -> Option<Route> {
        self.groups
            .entry((id.key.clone(), id.path.clone()))
            .or_insert_with(|| RouteGroup::new(id.key.clone(), id.path.clone()))
            .add(Route::new(id.method, exposure))
    }

    /// Removes a single route. A group left without routes is removed too.
    pub fn remove_route(&mut self, id: &RouteIdentity) -> Option<Route> {
        let k = (id.key.clone(), id.path.clone());
        let group = self.groups.get_mut(&k)?;
        let removed = group.remove(id.method);
        if group.is_empty() {
            self.groups.remove(&k);
        }
        removed
    }

    pub fn contains(&self, id: &RouteIdentity) -> bool {
        self.exposure(id).is_some()
    }

    pub fn exposure(&self, id: &RouteIdentity) -> Option<Exposure> {
        self.group_for(&id.key, &id.path)?.exposure(id.method)
    }

    /// Groups in key order.
    pub fn iter(&self) -> impl Iterator<Item = &RouteGroup> {
        self.groups.values()
    }

    /// Every route identity in the set, in key then method order.
    pub fn identities(&self) -> impl Iterator<Item = RouteIdentity> + '_ {
        self.groups.values().flat_map(RouteGroup::identities)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of routes across all groups.
    pub fn route_count(&self) -> usize {
        self.groups.values().map(RouteGroup::len).sum()
    }

    /// Whether any route requires authentication.
    pub fn requires_auth(&self) -> bool {
        self.groups.values().any(RouteGroup::has_protected)
    }
}

impl FromIterator<RouteGroup> for RouteSet {
    fn from_iter<I: IntoIterator<Item = RouteGroup>>(iter: I) -> Self {
        let mut set = Self::new();
        for group in iter {
            set.add_group(group);
        }
        set
    }
}

impl<'a> IntoIterator for &'a RouteSet {
    type Item = &'a RouteGroup;
    type IntoIter = std::collections::btree_map::Values<'a, GroupKey, RouteGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.values()
    }
}
