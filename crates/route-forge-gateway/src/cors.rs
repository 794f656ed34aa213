use serde::{Deserialize, Serialize};

use crate::headers;

/// `extra_config` key of the global CORS policy.
pub const CORS_KEY: &str = "security/cors";

/// Cross-origin policy applied to every forwarded endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorsPolicy {
    pub allow_origins: Vec<String>,
    pub allow_methods: Vec<String>,
    pub allow_headers: Vec<String>,
    pub expose_headers: Vec<String>,
    pub max_age: String,
}

impl Default for CorsPolicy {
    /// Any origin, the four CRUD verbs, standard request headers plus the
    /// user identity headers.
    fn default() -> Self {
        let mut allow_headers: Vec<String> = ["Content-Type", "Origin", "Authorization", "Accept"]
            .map(String::from)
            .to_vec();
        allow_headers.extend(headers::user_headers());
        Self {
            allow_origins: vec!["*".to_string()],
            allow_methods: ["GET", "POST", "PUT", "DELETE"].map(String::from).to_vec(),
            allow_headers,
            expose_headers: vec!["Content-Length".to_string(), "Content-Type".to_string()],
            max_age: "12h".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy() {
        let cors = CorsPolicy::default();
        assert_eq!(cors.allow_origins, vec!["*"]);
        assert_eq!(cors.allow_methods, vec!["GET", "POST", "PUT", "DELETE"]);
        assert_eq!(cors.allow_headers.len(), 9);
        assert_eq!(cors.allow_headers[4], headers::USER_AUTH_ID);
        assert_eq!(cors.max_age, "12h");
    }

    #[test]
    fn serialized_field_names() {
        let v = serde_json::to_value(CorsPolicy::default()).unwrap();
        for key in [
            "allow_origins",
            "allow_methods",
            "allow_headers",
            "expose_headers",
            "max_age",
        ] {
            assert!(v.get(key).is_some(), "missing {key}");
        }
    }
}
