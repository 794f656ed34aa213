use route_forge_core::reconcile::{ReconcileEngine, ReconcileStep, RetiredLedger};
use route_forge_core::session::{Answers, Choice, SessionState};
use route_forge_core::types::*;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn key(m: &str, s: &str) -> ServiceKey {
    ServiceKey::new(m, s).unwrap()
}

fn path(p: &str) -> RoutePath {
    RoutePath::new(p).unwrap()
}

fn id(s: &str) -> RouteIdentity {
    s.parse().unwrap()
}

fn users_endpoint() -> Endpoint {
    Endpoint::new(key("app", "users"))
        .with_operation(path("/users"), HttpMethod::Get)
        .with_operation(path("/users"), HttpMethod::Post)
        .with_operation(path("/users/{id}"), HttpMethod::Get)
}

/// Runs one full reconcile-then-answer cycle, answering every question with `choice`.
fn cycle(set: &mut RouteSet, ledger: &mut RetiredLedger, endpoints: &[Endpoint], choice: Choice) {
    let plan = ReconcileEngine::plan(set, ledger, endpoints);
    plan.apply(set, ledger);
    let mut state = SessionState::open(&plan.new_routes);
    let answers: Answers = state
        .session()
        .map(|s| {
            s.questions
                .iter()
                .map(|q| (q.id.clone(), choice.as_str().to_string()))
                .collect()
        })
        .unwrap_or_default();
    state.apply(&answers, set).unwrap();
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

/// Scenario: a brand new dependency produces one question per operation.
#[test]
fn scenario_new_dependency_asks_per_operation() {
    let plan = ReconcileEngine::plan(&RouteSet::new(), &RetiredLedger::new(), &[users_endpoint()]);
    let ids: Vec<String> = plan.new_routes.iter().map(|r| r.identity.to_string()).collect();
    assert_eq!(
        ids,
        vec![
            "app/users /users GET",
            "app/users /users POST",
            "app/users /users/{id} GET",
        ]
    );
}

/// Scenario: reconciling twice with the same endpoints asks nothing the second time.
#[test]
fn scenario_second_reconcile_is_quiet() {
    let mut set = RouteSet::new();
    let mut ledger = RetiredLedger::new();
    cycle(&mut set, &mut ledger, &[users_endpoint()], Choice::ExposeWithoutAuth);

    let plan = ReconcileEngine::plan(&set, &ledger, &[users_endpoint()]);
    assert!(plan.is_empty(), "unexpected plan:\n{plan}");
}

/// Scenario: hidden answers are remembered and not asked again.
#[test]
fn scenario_hidden_is_remembered() {
    let mut set = RouteSet::new();
    let mut ledger = RetiredLedger::new();
    cycle(&mut set, &mut ledger, &[users_endpoint()], Choice::Hidden);
    assert_eq!(set.route_count(), 3);

    let plan = ReconcileEngine::plan(&set, &ledger, &[users_endpoint()]);
    assert!(plan.new_routes.is_empty());
}

/// Scenario: a dependency disappears, then comes back; its decisions return.
#[test]
fn scenario_removed_then_reappearing_service() {
    let mut set = RouteSet::new();
    let mut ledger = RetiredLedger::new();
    cycle(&mut set, &mut ledger, &[users_endpoint()], Choice::ExposeWithAuth);

    let plan = ReconcileEngine::plan(&set, &ledger, &[]);
    assert_eq!(plan.drop_count(), 2);
    plan.apply(&mut set, &mut ledger);
    assert!(set.is_empty());

    let plan = ReconcileEngine::plan(&set, &ledger, &[users_endpoint()]);
    assert!(plan.new_routes.is_empty());
    assert_eq!(plan.restore_count(), 3);
    plan.apply(&mut set, &mut ledger);
    assert_eq!(
        set.exposure(&id("app/users /users POST")),
        Some(Exposure::Protected)
    );
}

/// Scenario: an operation is removed from one group while the others stay.
#[test]
fn scenario_single_operation_removed() {
    let mut set = RouteSet::new();
    let mut ledger = RetiredLedger::new();
    cycle(&mut set, &mut ledger, &[users_endpoint()], Choice::ExposeWithoutAuth);

    let shrunk = Endpoint::new(key("app", "users"))
        .with_operation(path("/users"), HttpMethod::Get)
        .with_operation(path("/users/{id}"), HttpMethod::Get);
    let plan = ReconcileEngine::plan(&set, &ledger, &[shrunk]);
    assert_eq!(
        plan.steps,
        vec![ReconcileStep::DropRoute {
            identity: id("app/users /users POST")
        }]
    );
    plan.apply(&mut set, &mut ledger);
    assert_eq!(set.len(), 2);
    assert!(!set.contains(&id("app/users /users POST")));
}

/// Scenario: two endpoints of the same service are merged for staleness.
#[test]
fn scenario_split_endpoints_are_merged() {
    let mut set = RouteSet::new();
    let mut ledger = RetiredLedger::new();
    cycle(&mut set, &mut ledger, &[users_endpoint()], Choice::ExposeWithoutAuth);

    let first = Endpoint::new(key("app", "users")).with_operation(path("/users"), HttpMethod::Get);
    let mut second = Endpoint::new(key("app", "users"))
        .with_operation(path("/users"), HttpMethod::Post)
        .with_operation(path("/users/{id}"), HttpMethod::Get);
    second.name = "admin".into();
    let plan = ReconcileEngine::plan(&set, &ledger, &[first, second]);
    assert!(plan.is_empty());
}

/// Scenario: new routes from a second service keep endpoint order.
#[test]
fn scenario_new_routes_follow_endpoint_order() {
    let orders =
        Endpoint::new(key("app", "orders")).with_operation(path("/orders"), HttpMethod::Get);
    let plan = ReconcileEngine::plan(
        &RouteSet::new(),
        &RetiredLedger::new(),
        &[orders, users_endpoint()],
    );
    assert_eq!(plan.new_routes[0].identity.to_string(), "app/orders /orders GET");
    assert_eq!(plan.new_routes.len(), 4);
}
