use serde::{Deserialize, Serialize};

use crate::error::RouteError;

use super::exposure::Exposure;
use super::http_method::HttpMethod;
use super::identity::{self, RouteIdentity};
use super::route::Route;
use super::route_path::RoutePath;
use super::service_key::ServiceKey;

/// All routes sharing `(module, service, path)`, differing only by method.
///
/// This is the unit of on-disk storage. Routes are kept sorted by method and
/// each method appears at most once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GroupRecord", into = "GroupRecord")]
pub struct RouteGroup {
    key: ServiceKey,
    path: RoutePath,
    routes: Vec<Route>,
}

impl RouteGroup {
    /// Creates an empty group.
    pub fn new(key: ServiceKey, path: RoutePath) -> Self {
        Self {
            key,
            path,
            routes: Vec::new(),
        }
    }

    /// Creates a group from a list of routes, rejecting duplicate methods.
    pub fn with_routes(
        key: ServiceKey,
        path: RoutePath,
        routes: Vec<Route>,
    ) -> Result<Self, RouteError> {
        let mut group = Self::new(key, path);
        for route in routes {
            if group.route(route.method).is_some() {
                return Err(RouteError::DuplicateMethod {
                    path: group.path.to_string(),
                    method: route.method.to_string(),
                });
            }
            group.add(route);
        }
        Ok(group)
    }

    pub fn key(&self) -> &ServiceKey {
        &self.key
    }

    pub fn path(&self) -> &RoutePath {
        &self.path
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Inserts a route, replacing the decision of an existing route with the
    /// same method. Returns the replaced route, if any.
    pub fn add(&mut self, route: Route) -> Option<Route> {
        match self.routes.binary_search_by(|r| r.method.cmp(&route.method)) {
            Ok(idx) => Some(std::mem::replace(&mut self.routes[idx], route)),
            Err(idx) => {
                self.routes.insert(idx, route);
                None
            }
        }
    }

    /// Removes the route for `method`, returning it.
    pub fn remove(&mut self, method: HttpMethod) -> Option<Route> {
        let idx = self
            .routes
            .binary_search_by(|r| r.method.cmp(&method))
            .ok()?;
        Some(self.routes.remove(idx))
    }

    pub fn route(&self, method: HttpMethod) -> Option<&Route> {
        self.routes
            .binary_search_by(|r| r.method.cmp(&method))
            .ok()
            .map(|idx| &self.routes[idx])
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Routes the gateway should forward.
    pub fn exposed_routes(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter().filter(|r| r.exposure.is_exposed())
    }

    pub fn has_exposed(&self) -> bool {
        self.exposed_routes().next().is_some()
    }

    pub fn has_protected(&self) -> bool {
        self.routes.iter().any(|r| r.exposure.is_protected())
    }

    /// Identity of the route for `method` in this group.
    pub fn identity(&self, method: HttpMethod) -> RouteIdentity {
        RouteIdentity::new(self.key.clone(), self.path.clone(), method)
    }

    /// Identities of every route in this group, in method order.
    pub fn identities(&self) -> impl Iterator<Item = RouteIdentity> + '_ {
        self.routes.iter().map(|r| self.identity(r.method))
    }

    /// External path on the gateway: `/{module}/{service}{path}`.
    pub fn gateway_target(&self) -> String {
        identity::gateway_target(&self.key, &self.path)
    }

    /// Exposure for `method`, or `None` when the group has no such route.
    pub fn exposure(&self, method: HttpMethod) -> Option<Exposure> {
        self.route(method).map(|r| r.exposure)
    }
}

#[derive(Serialize, Deserialize)]
struct GroupRecord {
    #[serde(alias = "application")]
    module: String,
    service: String,
    path: RoutePath,
    #[serde(default)]
    routes: Vec<Route>,
}

impl TryFrom<GroupRecord> for RouteGroup {
    type Error = RouteError;

    fn try_from(r: GroupRecord) -> Result<Self, Self::Error> {
        let key = ServiceKey::new(r.module, r.service)?;
        Self::with_routes(key, r.path, r.routes)
    }
}

impl From<RouteGroup> for GroupRecord {
    fn from(g: RouteGroup) -> Self {
        Self {
            module: g.key.module().to_string(),
            service: g.key.service().to_string(),
            path: g.path,
            routes: g.routes,
        }
    }
}
