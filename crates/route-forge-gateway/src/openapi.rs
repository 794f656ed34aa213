use route_forge_core::types::{Endpoint, HttpMethod, RouteGroup, RouteSet};
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

const OPENAPI_VERSION: &str = "3.0.3";
const BEARER_SCHEME: &str = "bearerAuth";

/// Combines dependency API documents into one document for the gateway.
///
/// Only exposed routes appear, under their gateway path. Operations come from
/// the dependency's embedded document when it has one, otherwise a stub is
/// generated.
#[derive(Debug, Clone)]
pub struct OpenApiCombiner {
    title: String,
    version: String,
}

impl OpenApiCombiner {
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            version: version.into(),
        }
    }

    pub fn combine(&self, routes: &RouteSet, endpoints: &[Endpoint]) -> Value {
        let mut paths = Map::new();
        let mut schemas = Map::new();
        let mut protected = false;

        for group in routes {
            let docs: Vec<&Value> = endpoints
                .iter()
                .filter(|e| &e.key == group.key())
                .filter_map(|e| e.openapi.as_ref())
                .collect();

            let mut item = Map::new();
            for route in group.exposed_routes() {
                let mut operation = docs
                    .iter()
                    .find_map(|doc| source_operation(doc, group, route.method))
                    .unwrap_or_else(|| stub_operation(group, route.method));
                if route.exposure.is_protected() {
                    protected = true;
                    if let Value::Object(op) = &mut operation {
                        op.insert("security".into(), json!([{ BEARER_SCHEME: [] }]));
                    }
                }
                item.insert(route.method.openapi_key().to_string(), operation);
            }
            if item.is_empty() {
                continue;
            }
            for doc in &docs {
                merge_schemas(&mut schemas, doc);
            }
            paths.insert(group.gateway_target(), Value::Object(item));
        }

        let mut doc = json!({
            "openapi": OPENAPI_VERSION,
            "info": { "title": self.title, "version": self.version },
            "paths": Value::Object(paths),
        });
        let mut components = Map::new();
        if !schemas.is_empty() {
            components.insert("schemas".into(), Value::Object(schemas));
        }
        if protected {
            components.insert(
                "securitySchemes".into(),
                json!({
                    BEARER_SCHEME: { "type": "http", "scheme": "bearer", "bearerFormat": "JWT" }
                }),
            );
        }
        if !components.is_empty() {
            doc["components"] = Value::Object(components);
        }
        debug!(
            paths = doc["paths"].as_object().map_or(0, Map::len),
            "combined API document built"
        );
        doc
    }
}

fn source_operation(doc: &Value, group: &RouteGroup, method: HttpMethod) -> Option<Value> {
    doc.get("paths")?
        .get(group.path().as_str())?
        .get(method.openapi_key())
        .cloned()
}

fn stub_operation(group: &RouteGroup, method: HttpMethod) -> Value {
    json!({
        "summary": format!("{method} {} of {}", group.path(), group.key()),
        "responses": { "default": { "description": "Response of the upstream service" } },
    })
}

fn merge_schemas(into: &mut Map<String, Value>, doc: &Value) {
    let Some(src) = doc
        .get("components")
        .and_then(|c| c.get("schemas"))
        .and_then(Value::as_object)
    else {
        return;
    };
    for (name, schema) in src {
        match into.get(name) {
            Some(existing) if existing != schema => {
                warn!(schema = %name, "conflicting schema definitions, keeping the first");
            }
            Some(_) => {}
            None => {
                into.insert(name.clone(), schema.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use route_forge_core::types::{Exposure, RoutePath, ServiceKey};

    fn users_endpoint() -> Endpoint {
        Endpoint::new(ServiceKey::new("app", "users").unwrap())
            .with_operation(RoutePath::new("/users").unwrap(), HttpMethod::Get)
            .with_openapi(json!({
                "openapi": "3.0.3",
                "paths": {
                    "/users": {
                        "get": {
                            "operationId": "listUsers",
                            "responses": { "200": { "$ref": "#/components/schemas/User" } }
                        },
                        "post": { "operationId": "createUser" }
                    }
                },
                "components": { "schemas": { "User": { "type": "object" } } }
            }))
    }

    #[test]
    fn copies_operations_and_rewrites_paths() {
        let mut set = RouteSet::new();
        set.insert_route(&"app/users /users GET".parse().unwrap(), Exposure::Public);
        set.insert_route(&"app/users /users POST".parse().unwrap(), Exposure::Hidden);

        let doc = OpenApiCombiner::new("gateway", "1.0.0").combine(&set, &[users_endpoint()]);
        let item = &doc["paths"]["/app/users/users"];
        assert_eq!(item["get"]["operationId"], "listUsers");
        assert!(item.get("post").is_none());
        assert_eq!(doc["components"]["schemas"]["User"]["type"], "object");
        assert!(doc["components"].get("securitySchemes").is_none());
    }

    #[test]
    fn stub_and_bearer_for_protected_without_source() {
        let mut set = RouteSet::new();
        set.insert_route(&"app/orders /orders DELETE".parse().unwrap(), Exposure::Protected);
        let doc = OpenApiCombiner::new("gateway", "1.0.0").combine(&set, &[]);
        let op = &doc["paths"]["/app/orders/orders"]["delete"];
        assert_eq!(op["summary"], "DELETE /orders of app/orders");
        assert_eq!(op["security"], json!([{ "bearerAuth": [] }]));
        assert_eq!(
            doc["components"]["securitySchemes"]["bearerAuth"]["scheme"],
            "bearer"
        );
    }

    #[test]
    fn hidden_only_groups_are_absent() {
        let mut set = RouteSet::new();
        set.insert_route(&"app/users /users GET".parse().unwrap(), Exposure::Hidden);
        let doc = OpenApiCombiner::new("gateway", "1.0.0").combine(&set, &[users_endpoint()]);
        assert_eq!(doc["paths"], json!({}));
        assert!(doc.get("components").is_none());
    }
}
