use route_forge_core::reconcile::ReconcileEngine;
use route_forge_core::types::{Endpoint, Exposure, HttpMethod, RouteIdentity, RoutePath, ServiceKey};
use route_forge_store::{FsRouteStore, RouteStore, StoreError};
use tempfile::TempDir;

fn id(s: &str) -> RouteIdentity {
    s.parse().unwrap()
}

fn write(dir: &TempDir, rel: &str, content: &str) {
    let path = dir.path().join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn users_get() -> Endpoint {
    Endpoint::new(ServiceKey::new("app", "users").unwrap())
        .with_operation(RoutePath::new("/users").unwrap(), HttpMethod::Get)
}

fn orders_get() -> Endpoint {
    Endpoint::new(ServiceKey::new("app", "orders").unwrap())
        .with_operation(RoutePath::new("/orders").unwrap(), HttpMethod::Get)
}

fn descriptor_count(dir: &TempDir) -> usize {
    glob::glob(&format!("{}/**/*.route.yaml", dir.path().display()))
        .unwrap()
        .count()
}

#[test]
fn missing_root_is_created() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("codefly/routes");
    let store = FsRouteStore::open(&root).unwrap();
    assert!(root.is_dir());
    assert!(store.route_set().is_empty());
}

#[test]
fn save_then_load_preserves_decisions() {
    let dir = TempDir::new().unwrap();
    let mut store = FsRouteStore::open(dir.path()).unwrap();
    store.record(&id("app/users /users GET"), Exposure::Public);
    store.record(&id("app/users /users POST"), Exposure::Protected);
    store.record(&id("app/users /users/{id} DELETE"), Exposure::Hidden);
    store.save().unwrap();
    assert_eq!(descriptor_count(&dir), 2);

    let reloaded = FsRouteStore::open(dir.path()).unwrap();
    assert_eq!(reloaded.route_set(), store.route_set());
}

#[test]
fn loads_hand_written_descriptor_with_application_alias() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "custom/users.route.yaml",
        concat!(
            "application: app\nservice: users\npath: /users\nroutes:\n",
            "  - method: get\n    exposed: true\n    protected: true\n",
        ),
    );
    write(&dir, "README.md", "not a descriptor");

    let mut store = FsRouteStore::open(dir.path()).unwrap();
    let key = ServiceKey::new("app", "users").unwrap();
    let path = RoutePath::new("/users").unwrap();
    let group = store.group_for(&key, &path).unwrap();
    assert_eq!(group.exposure(HttpMethod::Get), Some(Exposure::Protected));

    // hand-written files keep their location
    store.save().unwrap();
    assert!(dir.path().join("custom/users.route.yaml").is_file());
    assert_eq!(descriptor_count(&dir), 1);
}

#[test]
fn malformed_descriptor_fails_whole_load() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "app/users/ok.route.yaml",
        "module: app\nservice: users\npath: /users\nroutes: []\n",
    );
    write(
        &dir,
        "app/users/bad.route.yaml",
        "module: app\nservice: users\npath: users\nroutes: []\n",
    );
    let err = FsRouteStore::open(dir.path()).unwrap_err();
    match err {
        StoreError::Parse { path, .. } => assert!(path.ends_with("bad.route.yaml")),
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn protected_but_hidden_is_rejected() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "x.route.yaml",
        concat!(
            "module: app\nservice: users\npath: /users\nroutes:\n",
            "  - method: GET\n    exposed: false\n    protected: true\n",
        ),
    );
    assert!(matches!(
        FsRouteStore::open(dir.path()),
        Err(StoreError::Parse { .. })
    ));
}

#[test]
fn duplicate_group_is_rejected() {
    let dir = TempDir::new().unwrap();
    let body = "module: app\nservice: users\npath: /users\nroutes: []\n";
    write(&dir, "a.route.yaml", body);
    write(&dir, "b.route.yaml", body);
    assert!(matches!(
        FsRouteStore::open(dir.path()),
        Err(StoreError::DuplicateGroup { .. })
    ));
}

#[test]
fn retired_group_file_is_deleted_and_ledger_saved() {
    let dir = TempDir::new().unwrap();
    let mut store = FsRouteStore::open(dir.path()).unwrap();
    store.record(&id("app/orders /orders GET"), Exposure::Protected);
    store.record(&id("app/users /users GET"), Exposure::Public);
    store.save().unwrap();
    assert_eq!(descriptor_count(&dir), 2);

    let plan = ReconcileEngine::plan(store.route_set(), store.retired(), &[users_get()]);
    store.apply_plan(&plan);
    store.save().unwrap();
    assert_eq!(descriptor_count(&dir), 1);
    assert!(!dir.path().join("app/orders").exists());
    assert!(dir.path().join(".retired.yaml").is_file());

    let mut reloaded = FsRouteStore::open(dir.path()).unwrap();
    assert_eq!(
        reloaded.retired().get(&id("app/orders /orders GET")),
        Some(Exposure::Protected)
    );
    let plan = ReconcileEngine::plan(
        reloaded.route_set(),
        reloaded.retired(),
        &[users_get(), orders_get()],
    );
    assert_eq!(plan.restore_count(), 1);
    reloaded.apply_plan(&plan);
    reloaded.save().unwrap();
    assert!(!dir.path().join(".retired.yaml").exists());
    assert_eq!(descriptor_count(&dir), 2);
}

#[test]
fn save_is_byte_stable() {
    let dir = TempDir::new().unwrap();
    let mut store = FsRouteStore::open(dir.path()).unwrap();
    store.record(&id("app/users /users DELETE"), Exposure::Hidden);
    store.record(&id("app/users /users GET"), Exposure::Public);
    store.save().unwrap();
    let file = store.descriptor_path(
        &ServiceKey::new("app", "users").unwrap(),
        &RoutePath::new("/users").unwrap(),
    );
    let first = std::fs::read_to_string(&file).unwrap();

    let mut reloaded = FsRouteStore::open(dir.path()).unwrap();
    reloaded.save().unwrap();
    assert_eq!(std::fs::read_to_string(&file).unwrap(), first);
    assert!(first.find("GET").unwrap() < first.find("DELETE").unwrap());
}
