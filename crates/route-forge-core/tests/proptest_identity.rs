use proptest::prelude::*;
use route_forge_core::reconcile::{ReconcileEngine, ReconcilePlan, RetiredLedger};
use route_forge_core::types::{Endpoint, HttpMethod, RouteIdentity, RoutePath, RouteSet, ServiceKey};

fn method() -> impl Strategy<Value = HttpMethod> {
    prop::sample::select(HttpMethod::ALL.to_vec())
}

fn operation() -> impl Strategy<Value = (String, HttpMethod)> {
    ("/[a-z]{1,6}(/\\{[a-z]{1,4}\\})?", method())
}

fn endpoint_from(ops: &[(String, HttpMethod)]) -> Endpoint {
    ops.iter().fold(
        Endpoint::new(ServiceKey::new("app", "svc").unwrap()),
        |e, (p, m)| e.with_operation(RoutePath::new(p.clone()).unwrap(), *m),
    )
}

fn plan_fresh(endpoints: &[Endpoint]) -> ReconcilePlan {
    ReconcileEngine::plan(&RouteSet::new(), &RetiredLedger::new(), endpoints)
}

proptest! {
    #[test]
    fn identity_text_roundtrip(
        module in "[a-z][a-z0-9_.-]{0,10}",
        service in "[a-z][a-z0-9_-]{0,10}",
        (p, m) in operation(),
    ) {
        let id = RouteIdentity::new(
            ServiceKey::new(&module, &service).unwrap(),
            RoutePath::new(p).unwrap(),
            m,
        );
        let back: RouteIdentity = id.to_string().parse().unwrap();
        prop_assert_eq!(id, back);
    }

    #[test]
    fn declaration_order_does_not_change_identities(
        ops in prop::collection::vec(operation(), 1..12),
        seed in any::<u64>(),
    ) {
        let mut shuffled = ops.clone();
        // deterministic rotation + duplication of the first element
        let n = shuffled.len();
        shuffled.rotate_left((seed as usize) % n);
        shuffled.push(ops[0].clone());

        let a = plan_fresh(&[endpoint_from(&ops)]);
        let b = plan_fresh(&[endpoint_from(&shuffled)]);

        let mut ids_a: Vec<_> = a.new_routes.iter().map(|r| r.identity.clone()).collect();
        let mut ids_b: Vec<_> = b.new_routes.iter().map(|r| r.identity.clone()).collect();
        ids_a.sort();
        ids_b.sort();
        prop_assert_eq!(ids_a, ids_b);
    }

    #[test]
    fn new_routes_are_unique(ops in prop::collection::vec(operation(), 0..16)) {
        let plan = plan_fresh(&[endpoint_from(&ops)]);
        let mut ids: Vec<_> = plan.new_routes.iter().map(|r| r.identity.clone()).collect();
        let before = ids.len();
        ids.sort();
        ids.dedup();
        prop_assert_eq!(before, ids.len());
    }

    #[test]
    fn reconcile_is_idempotent(ops in prop::collection::vec(operation(), 0..12)) {
        let endpoints = [endpoint_from(&ops)];
        let mut set = RouteSet::new();
        let mut ledger = RetiredLedger::new();
        let first = ReconcileEngine::plan(&set, &ledger, &endpoints);
        first.apply(&mut set, &mut ledger);
        for route in &first.new_routes {
            set.insert_route(&route.identity, Default::default());
        }
        let second = ReconcileEngine::plan(&set, &ledger, &endpoints);
        prop_assert!(second.is_empty());
    }
}
