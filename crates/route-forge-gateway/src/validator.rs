use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SynthesisError;
use crate::headers;

/// `extra_config` key of a rule's JWT validator.
pub const VALIDATOR_KEY: &str = "auth/validator";

/// JWT settings of an identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtSettings {
    pub audience: String,
    /// Issuer base URL; the JWKS lives under `/.well-known/jwks.json`.
    pub url: String,
}

/// A configured identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthProvider {
    pub name: String,
    pub jwt: JwtSettings,
}

/// Configured providers and which one protects routes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSettings {
    /// Name of the selected provider; the first one when unset.
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub providers: Vec<AuthProvider>,
}

impl AuthSettings {
    /// Picks the provider attached to protected routes.
    ///
    /// `Ok(None)` when no provider is configured at all.
    pub fn selected(&self) -> Result<Option<&AuthProvider>, SynthesisError> {
        match &self.provider {
            Some(name) => self
                .providers
                .iter()
                .find(|p| &p.name == name)
                .map(Some)
                .ok_or_else(|| SynthesisError::UnknownAuthProvider { name: name.clone() }),
            None => Ok(self.providers.first()),
        }
    }

    /// One validator per configured provider, with the selection marked.
    pub fn validators(&self) -> Result<AuthValidators, SynthesisError> {
        let selected = self.selected()?.map(|p| p.name.clone());
        let entries: Vec<ProviderValidator> = self
            .providers
            .iter()
            .map(|p| ProviderValidator {
                provider: p.name.clone(),
                validator: AuthValidator::from_provider(p),
            })
            .collect();
        let selected = selected.and_then(|name| entries.iter().position(|e| e.provider == name));
        let validators = AuthValidators { entries, selected };
        if let Some(v) = validators.selected() {
            debug!(
                providers = validators.len(),
                jwk_url = %v.jwk_url,
                "auth validators derived"
            );
        }
        Ok(validators)
    }

    /// Validator of the selected provider.
    pub fn validator(&self) -> Result<Option<AuthValidator>, SynthesisError> {
        Ok(self.validators()?.selected().cloned())
    }
}

/// A provider's name and the validator derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderValidator {
    pub provider: String,
    pub validator: AuthValidator,
}

/// Validators of all configured providers, in configuration order.
///
/// Several may coexist; only the selected one protects routes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthValidators {
    entries: Vec<ProviderValidator>,
    selected: Option<usize>,
}

impl AuthValidators {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProviderValidator> {
        self.entries.iter()
    }

    /// Lookup by provider name.
    pub fn get(&self, provider: &str) -> Option<&AuthValidator> {
        self.entries
            .iter()
            .find(|e| e.provider == provider)
            .map(|e| &e.validator)
    }

    pub fn selected(&self) -> Option<&AuthValidator> {
        self.selected.map(|i| &self.entries[i].validator)
    }

    pub fn selected_provider(&self) -> Option<&str> {
        self.selected.map(|i| self.entries[i].provider.as_str())
    }

    pub fn providers(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.provider.clone()).collect()
    }
}

/// JWT validation fragment attached to protected rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthValidator {
    pub alg: String,
    pub audience: Vec<String>,
    pub jwk_url: String,
    pub cache: bool,
    pub propagate_claims: Vec<[String; 2]>,
}

impl AuthValidator {
    pub fn from_provider(provider: &AuthProvider) -> Self {
        Self {
            alg: "RS256".to_string(),
            audience: vec![provider.jwt.audience.clone()],
            jwk_url: format!(
                "{}/.well-known/jwks.json",
                provider.jwt.url.trim_end_matches('/')
            ),
            cache: true,
            propagate_claims: vec![["sub".to_string(), headers::USER_AUTH_ID.to_string()]],
        }
    }
}
