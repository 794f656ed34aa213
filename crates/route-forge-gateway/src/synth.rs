use std::collections::BTreeMap;

use route_forge_core::types::RouteSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cors::{CorsPolicy, CORS_KEY};
use crate::error::SynthesisError;
use crate::headers;
use crate::network::NetworkResolver;
use crate::validator::{AuthValidator, AuthValidators, VALIDATOR_KEY};

/// Default port the gateway listens on.
pub const DEFAULT_PORT: u16 = 8080;

/// Where a rule forwards to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Backend {
    pub url_pattern: String,
    pub hosts: Vec<String>,
}

/// One forwarded endpoint of the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForwardingRule {
    pub endpoint: String,
    pub method: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub input_headers: Vec<String>,
    pub backend: Backend,
    #[serde(default)]
    pub extra_config: BTreeMap<String, serde_json::Value>,
}

impl ForwardingRule {
    pub fn is_protected(&self) -> bool {
        self.extra_config.contains_key(VALIDATOR_KEY)
    }
}

/// The declarative document consumed by the gateway process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub port: u16,
    pub rest_group: Vec<ForwardingRule>,
    pub extra_config: BTreeMap<String, serde_json::Value>,
}

impl GatewayConfig {
    /// Indented JSON with a trailing newline.
    ///
    /// Struct fields keep declaration order and maps are key-sorted, so equal
    /// configs always encode to equal bytes.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, SynthesisError> {
        let mut bytes = serde_json::to_vec_pretty(self).map_err(|e| SynthesisError::Encode {
            message: e.to_string(),
        })?;
        bytes.push(b'\n');
        Ok(bytes)
    }
}

/// Builds the gateway config from curated routes and resolved addresses.
#[derive(Debug, Clone)]
pub struct Synthesizer {
    port: u16,
    validator: Option<AuthValidator>,
    cors: CorsPolicy,
}

impl Default for Synthesizer {
    fn default() -> Self {
        Self::new(DEFAULT_PORT)
    }
}

impl Synthesizer {
    pub fn new(port: u16) -> Self {
        Self {
            port,
            validator: None,
            cors: CorsPolicy::default(),
        }
    }

    /// Validator attached to protected routes.
    pub fn with_validator(mut self, validator: Option<AuthValidator>) -> Self {
        self.validator = validator;
        self
    }

    /// Attaches the selected validator of a provider set to protected routes.
    pub fn with_validators(self, validators: &AuthValidators) -> Self {
        self.with_validator(validators.selected().cloned())
    }

    pub fn with_cors(mut self, cors: CorsPolicy) -> Self {
        self.cors = cors;
        self
    }

    /// Emits one rule per exposed route, in route-set order.
    ///
    /// Groups without exposed routes are skipped and never resolved.
    pub fn synthesize(
        &self,
        routes: &RouteSet,
        resolver: &dyn NetworkResolver,
    ) -> Result<GatewayConfig, SynthesisError> {
        let validator = match &self.validator {
            Some(v) => Some(serde_json::to_value(v).map_err(|e| SynthesisError::Encode {
                message: e.to_string(),
            })?),
            None => None,
        };

        let mut rules = Vec::new();
        for group in routes {
            if !group.has_exposed() {
                continue;
            }
            let service = group.key().to_string();
            let hosts = resolver
                .resolve(group.key())
                .ok_or_else(|| SynthesisError::UnresolvedBackend {
                    service: service.clone(),
                })?;
            if hosts.is_empty() {
                return Err(SynthesisError::EmptyAddresses { service });
            }

            for route in group.exposed_routes() {
                let mut rule = ForwardingRule {
                    endpoint: group.gateway_target(),
                    method: route.method.to_string(),
                    input_headers: Vec::new(),
                    backend: Backend {
                        url_pattern: group.path().to_string(),
                        hosts: hosts.to_vec(),
                    },
                    extra_config: BTreeMap::new(),
                };
                if route.exposure.is_protected() {
                    let v = validator.clone().ok_or_else(|| SynthesisError::MissingAuthProvider {
                        route: group.identity(route.method).to_string(),
                    })?;
                    rule.extra_config.insert(VALIDATOR_KEY.to_string(), v);
                    rule.input_headers = headers::user_headers();
                }
                rules.push(rule);
            }
        }

        let mut extra_config = BTreeMap::new();
        extra_config.insert(
            CORS_KEY.to_string(),
            serde_json::to_value(&self.cors).map_err(|e| SynthesisError::Encode {
                message: e.to_string(),
            })?,
        );

        debug!(
            rules = rules.len(),
            protected = rules.iter().filter(|r| r.is_protected()).count(),
            "gateway config synthesized"
        );
        Ok(GatewayConfig {
            port: self.port,
            rest_group: rules,
            extra_config,
        })
    }
}
