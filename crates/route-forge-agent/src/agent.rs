use route_forge_core::reconcile::{ReconcileEngine, ReconcilePlan};
use route_forge_core::session::{Answers, Decision, Question, SessionState};
use route_forge_core::types::{Endpoint, RouteSet};
use route_forge_gateway::{
    AuthSettings, AuthValidators, GatewayConfig, NetworkResolver, OpenApiCombiner, Synthesizer,
    DEFAULT_PORT,
};
use route_forge_store::{FsRouteStore, RouteStore, StagedFile, StateStore, StoreError};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::collaborators::{
    BuildContext, DeployContext, Deployer, ImageBuilder, NoopBuilder, NoopDeployer,
};
use crate::error::AgentError;
use crate::identity::{AgentPaths, ServiceIdentity};

/// Caller-provided settings that shape agent behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentSettings {
    pub port: u16,
    /// Carried for the caller; watching is done elsewhere.
    pub watch: bool,
    pub auth: AuthSettings,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            watch: false,
            auth: AuthSettings::default(),
        }
    }
}

/// Outcome of `load`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub groups: usize,
    pub routes: usize,
    pub requires_auth: bool,
    pub watch: bool,
    /// Whether a session is waiting for answers.
    pub pending_session: bool,
}

/// Outcome of `init`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InitReport {
    pub plan: ReconcilePlan,
    /// Questions of the opened session; empty when nothing is new.
    pub questions: Vec<Question>,
}

/// Outcome of `sync`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// False when there was no open session.
    pub applied: bool,
    pub decisions: Vec<Decision>,
}

/// Synthesized artifacts, not yet written.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub config: GatewayConfig,
    pub config_bytes: Vec<u8>,
    pub openapi: serde_json::Value,
    /// One per configured auth provider.
    pub validators: AuthValidators,
}

/// Outcome of `deploy`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeployReport {
    pub rules: usize,
    pub protected: usize,
    /// Providers with a derived validator, in configuration order.
    pub auth_providers: Vec<String>,
    pub config_path: String,
    pub openapi_path: String,
}

/// Drives Load / Init / Sync / Build / Deploy for one gateway service.
///
/// Usage:
/// ```rust,ignore
/// let mut agent = GatewayAgent::builder()
///     .with_identity(ServiceIdentity::new("app", "gateway", "1.0.0"))
///     .with_paths(AgentPaths::under("services/gateway"))
///     .build();
/// agent.load()?;
/// let report = agent.init(&endpoints)?;
/// ```
pub struct GatewayAgent<S: RouteStore = FsRouteStore> {
    identity: ServiceIdentity,
    paths: AgentPaths,
    settings: AgentSettings,
    store: S,
    state: StateStore,
    builder: Box<dyn ImageBuilder>,
    deployer: Box<dyn Deployer>,
    loaded: bool,
}

/// Builder for `GatewayAgent`.
pub struct GatewayAgentBuilder {
    identity: ServiceIdentity,
    paths: AgentPaths,
    settings: AgentSettings,
    builder: Box<dyn ImageBuilder>,
    deployer: Box<dyn Deployer>,
}

impl GatewayAgentBuilder {
    fn new() -> Self {
        Self {
            identity: ServiceIdentity::default(),
            paths: AgentPaths::default(),
            settings: AgentSettings::default(),
            builder: Box::new(NoopBuilder),
            deployer: Box::new(NoopDeployer),
        }
    }

    pub fn with_identity(mut self, identity: ServiceIdentity) -> Self {
        self.identity = identity;
        self
    }

    pub fn with_paths(mut self, paths: AgentPaths) -> Self {
        self.paths = paths;
        self
    }

    pub fn with_settings(mut self, settings: AgentSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Set the image build collaborator. Defaults to a no-op.
    pub fn with_builder<B: ImageBuilder + 'static>(mut self, builder: B) -> Self {
        self.builder = Box::new(builder);
        self
    }

    /// Set the deploy collaborator. Defaults to a no-op.
    pub fn with_deployer<D: Deployer + 'static>(mut self, deployer: D) -> Self {
        self.deployer = Box::new(deployer);
        self
    }

    /// Builds an agent over the filesystem store at `paths.routing`.
    pub fn build(self) -> GatewayAgent<FsRouteStore> {
        let store = FsRouteStore::new(&self.paths.routing);
        self.build_with_store(store)
    }

    /// Builds an agent over a caller-provided store.
    pub fn build_with_store<S: RouteStore>(self, store: S) -> GatewayAgent<S> {
        GatewayAgent {
            state: StateStore::new(&self.paths.state),
            identity: self.identity,
            paths: self.paths,
            settings: self.settings,
            store,
            builder: self.builder,
            deployer: self.deployer,
            loaded: false,
        }
    }
}

impl GatewayAgent<FsRouteStore> {
    pub fn builder() -> GatewayAgentBuilder {
        GatewayAgentBuilder::new()
    }
}

impl<S: RouteStore> GatewayAgent<S> {
    pub fn identity(&self) -> &ServiceIdentity {
        &self.identity
    }

    pub fn paths(&self) -> &AgentPaths {
        &self.paths
    }

    pub fn settings(&self) -> &AgentSettings {
        &self.settings
    }

    pub fn routes(&self) -> &RouteSet {
        self.store.route_set()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Loads the route store, creating the routing directory if needed.
    pub fn load(&mut self) -> Result<LoadReport, AgentError> {
        let set = self.store.load().map_err(AgentError::Load)?;
        let report = LoadReport {
            groups: set.len(),
            routes: set.route_count(),
            requires_auth: set.requires_auth(),
            watch: self.settings.watch,
            pending_session: self
                .state
                .load_session()
                .map_err(AgentError::State)?
                .is_some(),
        };
        self.loaded = true;
        info!(
            service = %self.identity,
            groups = report.groups,
            routes = report.routes,
            requires_auth = report.requires_auth,
            "routes loaded"
        );
        Ok(report)
    }

    fn ensure_loaded(&mut self) -> Result<(), AgentError> {
        if !self.loaded {
            self.load()?;
        }
        Ok(())
    }

    /// Saves the store; on failure, reloads it so memory matches disk again.
    fn save_store(&mut self) -> Result<(), StoreError> {
        let Err(err) = self.store.save() else {
            return Ok(());
        };
        self.loaded = false;
        match self.store.load() {
            Ok(_) => self.loaded = true,
            Err(reload) => warn!(error = %reload, "route store reload failed after save error"),
        }
        Err(err)
    }

    /// Reconciles against dependency endpoints and opens a session for the
    /// routes that need a decision.
    ///
    /// Drops and restorations are saved before the session is opened. With
    /// nothing new, any previous session record is cleared.
    pub fn init(&mut self, endpoints: &[Endpoint]) -> Result<InitReport, AgentError> {
        self.ensure_loaded()?;

        let plan = ReconcileEngine::plan(self.store.route_set(), self.store.retired(), endpoints);
        self.store.apply_plan(&plan);
        self.save_store().map_err(AgentError::Reconcile)?;
        self.state
            .save_endpoints(endpoints)
            .map_err(AgentError::State)?;

        let questions = match SessionState::open(&plan.new_routes) {
            SessionState::AwaitingAnswers(session) => {
                self.state.save_session(&session).map_err(AgentError::State)?;
                session.questions
            }
            _ => {
                self.state.clear_session().map_err(AgentError::State)?;
                Vec::new()
            }
        };

        info!(
            drops = plan.drop_count(),
            restores = plan.restore_count(),
            questions = questions.len(),
            "routes reconciled"
        );
        Ok(InitReport { plan, questions })
    }

    /// Questions of the open session, if any.
    pub fn pending_questions(&self) -> Result<Vec<Question>, AgentError> {
        Ok(self
            .state
            .load_session()
            .map_err(AgentError::State)?
            .map(|s| s.questions)
            .unwrap_or_default())
    }

    /// Applies answers to the open session, saves, then clears the session.
    ///
    /// Without an open session this is a successful no-op. A rejected answer
    /// set changes nothing.
    pub fn sync(&mut self, answers: &Answers) -> Result<SyncReport, AgentError> {
        self.ensure_loaded()?;

        let record = self.state.load_session().map_err(AgentError::State)?;
        let mut state = SessionState::from_record(record);
        if !state.is_awaiting() {
            debug!("no open session");
            return Ok(SyncReport {
                applied: false,
                decisions: Vec::new(),
            });
        }

        let decisions = state.apply(answers, self.store.route_set_mut())?;
        self.save_store().map_err(AgentError::Save)?;
        self.state.clear_session().map_err(AgentError::State)?;
        info!(decisions = decisions.len(), "answers applied");
        Ok(SyncReport {
            applied: true,
            decisions,
        })
    }

    pub fn build(&self) -> Result<(), AgentError> {
        self.builder
            .build(&BuildContext {
                identity: &self.identity,
                root: &self.paths.root,
            })
            .map_err(AgentError::Build)
    }

    /// Synthesizes the gateway config and API document without writing them.
    pub fn render(&mut self, resolver: &dyn NetworkResolver) -> Result<Rendered, AgentError> {
        self.ensure_loaded()?;

        let validators = self.settings.auth.validators()?;
        let config = Synthesizer::new(self.settings.port)
            .with_validators(&validators)
            .synthesize(self.store.route_set(), resolver)?;
        let config_bytes = config.to_json_bytes()?;

        let endpoints = self.state.load_endpoints().map_err(AgentError::State)?;
        let openapi = OpenApiCombiner::new(self.identity.to_string(), &self.identity.version)
            .combine(self.store.route_set(), &endpoints);

        Ok(Rendered {
            config,
            config_bytes,
            openapi,
            validators,
        })
    }

    /// Synthesizes, writes the config and API document, then hands the
    /// config to the deploy collaborator.
    ///
    /// Both files are staged before either is renamed into place, and the
    /// config goes last. A synthesis or staging failure leaves the previous
    /// config untouched.
    pub fn deploy(&mut self, resolver: &dyn NetworkResolver) -> Result<DeployReport, AgentError> {
        let rendered = self.render(resolver)?;
        let mut openapi_bytes = serde_json::to_vec_pretty(&rendered.openapi).map_err(|e| {
            route_forge_gateway::SynthesisError::Encode {
                message: e.to_string(),
            }
        })?;
        openapi_bytes.push(b'\n');

        let config_write = |source: StoreError| AgentError::Write {
            artifact: "gateway config",
            source,
        };
        let openapi_write = |source: StoreError| AgentError::Write {
            artifact: "API document",
            source,
        };
        let staged_config =
            StagedFile::stage(&self.paths.gateway_config, &rendered.config_bytes)
                .map_err(config_write)?;
        let staged_openapi =
            StagedFile::stage(&self.paths.openapi, &openapi_bytes).map_err(openapi_write)?;
        staged_openapi.commit().map_err(openapi_write)?;
        staged_config.commit().map_err(config_write)?;

        self.deployer
            .deploy(&DeployContext {
                identity: &self.identity,
                root: &self.paths.root,
                config_path: &self.paths.gateway_config,
                config: &rendered.config_bytes,
            })
            .map_err(AgentError::Deploy)?;

        let report = DeployReport {
            rules: rendered.config.rest_group.len(),
            protected: rendered
                .config
                .rest_group
                .iter()
                .filter(|r| r.is_protected())
                .count(),
            auth_providers: rendered.validators.providers(),
            config_path: self.paths.gateway_config.display().to_string(),
            openapi_path: self.paths.openapi.display().to_string(),
        };
        info!(rules = report.rules, protected = report.protected, "gateway config deployed");
        Ok(report)
    }
}
