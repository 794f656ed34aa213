pub mod agent;
pub mod collaborators;
pub mod error;
pub mod identity;

pub use agent::{
    AgentSettings, DeployReport, GatewayAgent, GatewayAgentBuilder, InitReport, LoadReport,
    Rendered, SyncReport,
};
pub use collaborators::{
    BuildContext, CollaboratorError, CommandBuilder, CommandDeployer, DeployContext, Deployer,
    ImageBuilder, NoopBuilder, NoopDeployer,
};
pub use error::AgentError;
pub use identity::{AgentPaths, ServiceIdentity};
