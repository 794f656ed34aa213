use route_forge_core::session::SessionError;
use route_forge_gateway::SynthesisError;
use route_forge_store::StoreError;

use crate::collaborators::CollaboratorError;

/// Errors returned by agent calls, tagged with the phase that failed.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// The route store could not be loaded.
    #[error("cannot load routes: {0}")]
    Load(#[source] StoreError),

    /// Reconciliation could not be persisted.
    #[error("cannot reconcile routes: {0}")]
    Reconcile(#[source] StoreError),

    /// Answers were rejected; nothing was applied.
    #[error("cannot apply answers: {0}")]
    Session(#[from] SessionError),

    /// Applied decisions could not be saved.
    #[error("cannot save decisions: {0}")]
    Save(#[source] StoreError),

    /// The session record or endpoint snapshot could not be read or written.
    #[error("cannot access agent state: {0}")]
    State(#[source] StoreError),

    /// The gateway config could not be synthesized; nothing was written.
    #[error("cannot synthesize gateway config: {0}")]
    Synthesis(#[from] SynthesisError),

    /// A synthesized artifact could not be written.
    #[error("cannot write {artifact}: {source}")]
    Write {
        artifact: &'static str,
        #[source]
        source: StoreError,
    },

    /// The image build collaborator failed.
    #[error("build failed: {0}")]
    Build(#[source] CollaboratorError),

    /// The deploy collaborator failed.
    #[error("deploy failed: {0}")]
    Deploy(#[source] CollaboratorError),
}

impl AgentError {
    /// Name of the agent call phase the error belongs to.
    pub fn phase(&self) -> &'static str {
        match self {
            Self::Load(_) => "load",
            Self::Reconcile(_) | Self::State(_) => "init",
            Self::Session(_) | Self::Save(_) => "sync",
            Self::Synthesis(_) | Self::Write { .. } | Self::Deploy(_) => "deploy",
            Self::Build(_) => "build",
        }
    }

    /// The underlying store error, when there is one.
    pub fn store_error(&self) -> Option<&StoreError> {
        match self {
            Self::Load(e) | Self::Reconcile(e) | Self::Save(e) | Self::State(e) => Some(e),
            Self::Write { source, .. } => Some(source),
            _ => None,
        }
    }
}
