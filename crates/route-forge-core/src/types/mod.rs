pub mod endpoint;
pub mod exposure;
pub mod http_method;
pub mod identity;
pub mod route;
pub mod route_group;
pub mod route_path;
pub mod route_set;
pub mod service_key;

pub use endpoint::{Endpoint, Operation, Visibility, DEFAULT_ENDPOINT_NAME};
pub use exposure::Exposure;
pub use http_method::HttpMethod;
pub use identity::RouteIdentity;
pub use route::Route;
pub use route_group::RouteGroup;
pub use route_path::RoutePath;
pub use route_set::RouteSet;
pub use service_key::ServiceKey;
