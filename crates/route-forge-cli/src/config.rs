use std::path::{Path, PathBuf};

use route_forge_agent::{
    AgentPaths, AgentSettings, CommandBuilder, CommandDeployer, GatewayAgent, ServiceIdentity,
};
use route_forge_gateway::{AuthSettings, DEFAULT_PORT};
use route_forge_store::FsRouteStore;
use serde::{Deserialize, Serialize};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// CLI configuration loaded from config.toml.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CliConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub auth: AuthSettings,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub build: CommandConfig,
    #[serde(default)]
    pub deploy: CommandConfig,
}

/// The gateway service identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_module")]
    pub module: String,
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            module: default_module(),
            name: default_name(),
            version: default_version(),
            port: default_port(),
        }
    }
}

/// Filesystem layout. Relative entries resolve against `root`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathsConfig {
    pub root: Option<PathBuf>,
    pub routing: Option<PathBuf>,
    pub state: Option<PathBuf>,
    pub gateway_config: Option<PathBuf>,
    pub openapi: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default)]
    pub watch: bool,
}

/// An external command run as a build or deploy step.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommandConfig {
    pub command: Option<String>,
}

fn default_module() -> String {
    ServiceIdentity::default().module
}

fn default_name() -> String {
    ServiceIdentity::default().name
}

fn default_version() -> String {
    ServiceIdentity::default().version
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

/// Discovery order for config file:
/// 1. `--config <path>` (explicit)
/// 2. `ROUTE_FORGE_CONFIG` env var
/// 3. `./config.toml` (project-local)
/// 4. `$XDG_CONFIG_HOME/route-forge/config.toml`
/// 5. `~/.config/route-forge/config.toml`
pub fn load_config(explicit_path: Option<&Path>) -> Result<CliConfig, CliError> {
    if let Some(path) = explicit_path {
        return load_config_from_path(path);
    }

    if let Ok(env_path) = std::env::var("ROUTE_FORGE_CONFIG") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return load_config_from_path(&path);
        }
    }

    let local = PathBuf::from("config.toml");
    if local.exists() {
        return load_config_from_path(&local);
    }

    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
        let path = PathBuf::from(xdg).join("route-forge/config.toml");
        if path.exists() {
            return load_config_from_path(&path);
        }
    }

    if let Some(home) = std::env::var_os("HOME") {
        let path = PathBuf::from(home).join(".config/route-forge/config.toml");
        if path.exists() {
            return load_config_from_path(&path);
        }
    }

    Ok(CliConfig::default())
}

fn load_config_from_path(path: &Path) -> Result<CliConfig, CliError> {
    let contents = std::fs::read_to_string(path).map_err(|e| CliError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    toml::from_str(&contents).map_err(|e| CliError::Config {
        message: format!("failed to parse {}: {}", path.display(), e),
    })
}

/// Resolve the agent's filesystem layout from config + CLI overrides.
///
/// `--root` takes precedence over `[paths].root`.
pub fn resolve_paths(config: &CliConfig, global: &GlobalOpts) -> AgentPaths {
    let root = global
        .root
        .clone()
        .or_else(|| config.paths.root.clone())
        .unwrap_or_else(|| PathBuf::from("."));
    let mut paths = AgentPaths::under(&root);
    let under_root = |p: &PathBuf| root.join(p);
    if let Some(p) = &config.paths.routing {
        paths.routing = under_root(p);
    }
    if let Some(p) = &config.paths.state {
        paths.state = under_root(p);
    }
    if let Some(p) = &config.paths.gateway_config {
        paths.gateway_config = under_root(p);
    }
    if let Some(p) = &config.paths.openapi {
        paths.openapi = under_root(p);
    }
    paths
}

/// Per-invocation overrides that sit above the config file.
#[derive(Debug, Clone, Copy, Default)]
pub struct Overrides {
    pub port: Option<u16>,
    pub watch: bool,
}

/// Build the agent described by the config, wired with any configured
/// build and deploy commands.
pub fn build_agent(
    config: &CliConfig,
    global: &GlobalOpts,
    overrides: Overrides,
) -> GatewayAgent<FsRouteStore> {
    let service = &config.service;
    let mut builder = GatewayAgent::builder()
        .with_identity(ServiceIdentity::new(
            &service.module,
            &service.name,
            &service.version,
        ))
        .with_paths(resolve_paths(config, global))
        .with_settings(AgentSettings {
            port: overrides.port.unwrap_or(service.port),
            watch: overrides.watch || config.agent.watch,
            auth: config.auth.clone(),
        });
    if let Some(command) = &config.build.command {
        builder = builder.with_builder(CommandBuilder::new(command));
    }
    if let Some(command) = &config.deploy.command {
        builder = builder.with_deployer(CommandDeployer::new(command));
    }
    builder.build()
}
