use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::types::{
    Endpoint, Exposure, RouteGroup, RouteIdentity, RoutePath, RouteSet, ServiceKey, Visibility,
};

// ---------------------------------------------------------------------------
// RetiredLedger
// ---------------------------------------------------------------------------

/// Decisions of routes that reconciliation removed.
///
/// When an identity reappears in a later reconciliation, its decision is
/// restored from here instead of being asked again.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RetiredLedger {
    entries: BTreeMap<RouteIdentity, Exposure>,
}

impl RetiredLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remembers the decision for `id`, overwriting an older one.
    pub fn retire(&mut self, id: RouteIdentity, exposure: Exposure) {
        self.entries.insert(id, exposure);
    }

    /// Remembers every route of a group.
    pub fn retire_group(&mut self, group: &RouteGroup) {
        for route in group.routes() {
            self.retire(group.identity(route.method), route.exposure);
        }
    }

    pub fn get(&self, id: &RouteIdentity) -> Option<Exposure> {
        self.entries.get(id).copied()
    }

    /// Removes and returns the decision for `id`.
    pub fn take(&mut self, id: &RouteIdentity) -> Option<Exposure> {
        self.entries.remove(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RouteIdentity, &Exposure)> {
        self.entries.iter()
    }
}

// ---------------------------------------------------------------------------
// ReconcileStep
// ---------------------------------------------------------------------------

/// A single change reconciliation makes to the known route set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step")]
#[non_exhaustive]
pub enum ReconcileStep {
    /// No endpoint declares the group's service any more, or none of its routes.
    DropGroup { key: ServiceKey, path: RoutePath },
    /// The endpoint no longer declares this route.
    DropRoute { identity: RouteIdentity },
    /// A previously retired route is declared again.
    RestoreRoute {
        identity: RouteIdentity,
        exposure: Exposure,
    },
}

impl fmt::Display for ReconcileStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DropGroup { key, path } => write!(f, "DROP group '{key} {path}'"),
            Self::DropRoute { identity } => write!(f, "DROP route '{identity}'"),
            Self::RestoreRoute { identity, exposure } => {
                write!(f, "RESTORE route '{identity}' as {exposure}")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// NewRoute
// ---------------------------------------------------------------------------

/// A declared route with no decision yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRoute {
    pub identity: RouteIdentity,
    /// Name of the endpoint that declared it.
    pub endpoint: String,
    pub visibility: Visibility,
}

// ---------------------------------------------------------------------------
// ReconcilePlan
// ---------------------------------------------------------------------------

/// Outcome of reconciling known routes against dependency endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcilePlan {
    /// Drops in key order, then restorations in endpoint order.
    pub steps: Vec<ReconcileStep>,
    /// Routes that need a decision, in endpoint then declaration order.
    pub new_routes: Vec<NewRoute>,
}

impl ReconcilePlan {
    /// True when the plan changes nothing and asks nothing.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty() && self.new_routes.is_empty()
    }

    /// Number of drop steps (groups and routes).
    pub fn drop_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| {
                matches!(
                    s,
                    ReconcileStep::DropGroup { .. } | ReconcileStep::DropRoute { .. }
                )
            })
            .count()
    }

    pub fn restore_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s, ReconcileStep::RestoreRoute { .. }))
            .count()
    }

    /// Applies the steps to an in-memory set and ledger.
    ///
    /// Dropped decisions move into the ledger; restored ones move back out.
    pub fn apply(&self, set: &mut RouteSet, ledger: &mut RetiredLedger) {
        for step in &self.steps {
            match step {
                ReconcileStep::DropGroup { key, path } => {
                    if let Some(group) = set.remove_group(key, path) {
                        ledger.retire_group(&group);
                        info!(
                            group = %format!("{key} {path}"),
                            routes = group.len(),
                            "route group retired"
                        );
                    }
                }
                ReconcileStep::DropRoute { identity } => {
                    if let Some(route) = set.remove_route(identity) {
                        ledger.retire(identity.clone(), route.exposure);
                        info!(route = %identity, exposure = %route.exposure, "route retired");
                    }
                }
                ReconcileStep::RestoreRoute { identity, exposure } => {
                    ledger.take(identity);
                    set.insert_route(identity, *exposure);
                    info!(route = %identity, %exposure, "route restored");
                }
            }
        }
    }
}

impl fmt::Display for ReconcilePlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Reconcile plan ({} steps, {} new routes)",
            self.steps.len(),
            self.new_routes.len()
        )?;
        for (i, step) in self.steps.iter().enumerate() {
            writeln!(f, "  {}. {step}", i + 1)?;
        }
        for route in &self.new_routes {
            writeln!(f, "  NEW {}", route.identity)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ReconcileEngine
// ---------------------------------------------------------------------------

/// Pure planner diffing known route groups against dependency endpoints.
pub struct ReconcileEngine;

impl ReconcileEngine {
    /// Computes the plan. No I/O, no side effects.
    ///
    /// Endpoints sharing a `(module, service)` are merged. Duplicate
    /// declarations of an identity count once, at their first position.
    pub fn plan(
        known: &RouteSet,
        retired: &RetiredLedger,
        endpoints: &[Endpoint],
    ) -> ReconcilePlan {
        let mut declared: BTreeMap<&ServiceKey, BTreeSet<RouteIdentity>> = BTreeMap::new();
        for endpoint in endpoints {
            declared
                .entry(&endpoint.key)
                .or_default()
                .extend(endpoint.identities());
        }

        let mut steps = Vec::new();
        for group in known.iter() {
            let Some(ids) = declared.get(group.key()) else {
                steps.push(ReconcileStep::DropGroup {
                    key: group.key().clone(),
                    path: group.path().clone(),
                });
                continue;
            };
            let stale: Vec<RouteIdentity> =
                group.identities().filter(|id| !ids.contains(id)).collect();
            if stale.is_empty() {
                continue;
            }
            if stale.len() == group.len() {
                steps.push(ReconcileStep::DropGroup {
                    key: group.key().clone(),
                    path: group.path().clone(),
                });
            } else {
                steps.extend(
                    stale
                        .into_iter()
                        .map(|identity| ReconcileStep::DropRoute { identity }),
                );
            }
        }

        let mut seen = HashSet::new();
        let mut new_routes = Vec::new();
        for endpoint in endpoints {
            for identity in endpoint.identities() {
                if known.contains(&identity) || !seen.insert(identity.clone()) {
                    continue;
                }
                match retired.get(&identity) {
                    Some(exposure) => {
                        steps.push(ReconcileStep::RestoreRoute { identity, exposure })
                    }
                    None => new_routes.push(NewRoute {
                        identity,
                        endpoint: endpoint.name.clone(),
                        visibility: endpoint.visibility,
                    }),
                }
            }
        }

        let plan = ReconcilePlan { steps, new_routes };
        debug!(
            known = known.route_count(),
            endpoints = endpoints.len(),
            drops = plan.drop_count(),
            restores = plan.restore_count(),
            new = plan.new_routes.len(),
            "reconciliation planned"
        );
        for step in &plan.steps {
            debug!(%step, "plan step");
        }
        plan
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HttpMethod;

    fn key(m: &str, s: &str) -> ServiceKey {
        ServiceKey::new(m, s).unwrap()
    }

    fn path(p: &str) -> RoutePath {
        RoutePath::new(p).unwrap()
    }

    fn id(s: &str) -> RouteIdentity {
        s.parse().unwrap()
    }

    #[test]
    fn empty_inputs_give_empty_plan() {
        let plan = ReconcileEngine::plan(&RouteSet::new(), &RetiredLedger::new(), &[]);
        assert!(plan.is_empty());
    }

    #[test]
    fn fresh_endpoint_yields_new_routes_in_order() {
        let e = Endpoint::new(key("app", "users"))
            .with_operation(path("/users"), HttpMethod::Get)
            .with_operation(path("/users/{id}"), HttpMethod::Get);
        let plan = ReconcileEngine::plan(&RouteSet::new(), &RetiredLedger::new(), &[e]);
        assert!(plan.steps.is_empty());
        let ids: Vec<String> = plan.new_routes.iter().map(|r| r.identity.to_string()).collect();
        assert_eq!(ids, vec!["app/users /users GET", "app/users /users/{id} GET"]);
        assert_eq!(plan.new_routes[0].endpoint, "rest");
    }

    #[test]
    fn duplicates_count_once() {
        let e = Endpoint::new(key("app", "users"))
            .with_operation(path("/users"), HttpMethod::Get)
            .with_operation(path("/users"), HttpMethod::Get);
        let plan = ReconcileEngine::plan(&RouteSet::new(), &RetiredLedger::new(), &[e]);
        assert_eq!(plan.new_routes.len(), 1);
    }

    #[test]
    fn unmatched_group_is_dropped() {
        let mut known = RouteSet::new();
        known.insert_route(&id("app/orders /orders GET"), Exposure::Public);
        let plan = ReconcileEngine::plan(&known, &RetiredLedger::new(), &[]);
        assert_eq!(
            plan.steps,
            vec![ReconcileStep::DropGroup {
                key: key("app", "orders"),
                path: path("/orders"),
            }]
        );
    }

    #[test]
    fn partially_stale_group_drops_routes() {
        let mut known = RouteSet::new();
        known.insert_route(&id("app/users /users GET"), Exposure::Public);
        known.insert_route(&id("app/users /users POST"), Exposure::Protected);
        let e = Endpoint::new(key("app", "users")).with_operation(path("/users"), HttpMethod::Get);
        let plan = ReconcileEngine::plan(&known, &RetiredLedger::new(), &[e]);
        assert_eq!(
            plan.steps,
            vec![ReconcileStep::DropRoute {
                identity: id("app/users /users POST")
            }]
        );
        assert!(plan.new_routes.is_empty());
    }

    #[test]
    fn endpoint_without_operations_drops_all_groups() {
        let mut known = RouteSet::new();
        known.insert_route(&id("app/users /users GET"), Exposure::Public);
        let e = Endpoint::new(key("app", "users"));
        let plan = ReconcileEngine::plan(&known, &RetiredLedger::new(), &[e]);
        assert!(matches!(plan.steps[0], ReconcileStep::DropGroup { .. }));
    }

    #[test]
    fn retired_decision_is_restored_not_asked() {
        let mut ledger = RetiredLedger::new();
        ledger.retire(id("app/users /users GET"), Exposure::Protected);
        let e = Endpoint::new(key("app", "users")).with_operation(path("/users"), HttpMethod::Get);
        let plan = ReconcileEngine::plan(&RouteSet::new(), &ledger, &[e]);
        assert!(plan.new_routes.is_empty());
        assert_eq!(
            plan.steps,
            vec![ReconcileStep::RestoreRoute {
                identity: id("app/users /users GET"),
                exposure: Exposure::Protected,
            }]
        );
    }

    #[test]
    fn apply_moves_decisions_through_ledger() {
        let mut known = RouteSet::new();
        known.insert_route(&id("app/users /users GET"), Exposure::Protected);
        let mut ledger = RetiredLedger::new();

        let plan = ReconcileEngine::plan(&known, &ledger, &[]);
        plan.apply(&mut known, &mut ledger);
        assert!(known.is_empty());
        assert_eq!(ledger.get(&id("app/users /users GET")), Some(Exposure::Protected));

        let e = Endpoint::new(key("app", "users")).with_operation(path("/users"), HttpMethod::Get);
        let plan = ReconcileEngine::plan(&known, &ledger, &[e]);
        plan.apply(&mut known, &mut ledger);
        assert!(ledger.is_empty());
        assert_eq!(
            known.exposure(&id("app/users /users GET")),
            Some(Exposure::Protected)
        );
    }

    #[test]
    fn step_display() {
        let step = ReconcileStep::DropRoute {
            identity: id("app/users /users GET"),
        };
        assert_eq!(step.to_string(), "DROP route 'app/users /users GET'");
    }

    #[test]
    fn ledger_serializes_as_identity_map() {
        let mut ledger = RetiredLedger::new();
        ledger.retire(id("app/users /users GET"), Exposure::Public);
        let json = serde_json::to_value(&ledger).unwrap();
        assert_eq!(json, serde_json::json!({ "app/users /users GET": "public" }));
    }
}
