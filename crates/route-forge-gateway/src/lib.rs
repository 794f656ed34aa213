pub mod cors;
pub mod error;
pub mod headers;
pub mod network;
pub mod openapi;
pub mod synth;
pub mod validator;

pub use cors::CorsPolicy;
pub use error::SynthesisError;
pub use network::{NetworkMapping, NetworkMappings, NetworkResolver};
pub use openapi::OpenApiCombiner;
pub use synth::{Backend, ForwardingRule, GatewayConfig, Synthesizer, DEFAULT_PORT};
pub use validator::{
    AuthProvider, AuthSettings, AuthValidator, AuthValidators, JwtSettings, ProviderValidator,
};
