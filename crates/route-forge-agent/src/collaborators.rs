use std::fmt;
use std::path::Path;
use std::process::Command;

use tracing::{debug, info};

use crate::identity::ServiceIdentity;

/// Failure of an external build or deploy step.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CollaboratorError {
    /// The command could not be started.
    Spawn { command: String, message: String },
    /// The command ran and exited unsuccessfully.
    Failed { command: String, code: Option<i32> },
}

impl fmt::Display for CollaboratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spawn { command, message } => write!(f, "cannot run '{command}': {message}"),
            Self::Failed {
                command,
                code: Some(code),
            } => write!(f, "'{command}' exited with status {code}"),
            Self::Failed { command, code: None } => {
                write!(f, "'{command}' was terminated by a signal")
            }
        }
    }
}

impl std::error::Error for CollaboratorError {}

/// What a build step gets to work with.
#[derive(Debug, Clone, Copy)]
pub struct BuildContext<'a> {
    pub identity: &'a ServiceIdentity,
    pub root: &'a Path,
}

/// What a deploy step gets to work with.
#[derive(Debug, Clone, Copy)]
pub struct DeployContext<'a> {
    pub identity: &'a ServiceIdentity,
    pub root: &'a Path,
    /// Where the gateway config was written.
    pub config_path: &'a Path,
    /// The exact bytes that were written.
    pub config: &'a [u8],
}

/// Produces the gateway image.
pub trait ImageBuilder {
    fn build(&self, ctx: &BuildContext<'_>) -> Result<(), CollaboratorError>;
}

/// Ships a synthesized gateway config.
pub trait Deployer {
    fn deploy(&self, ctx: &DeployContext<'_>) -> Result<(), CollaboratorError>;
}

/// Builder that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopBuilder;

impl ImageBuilder for NoopBuilder {
    fn build(&self, ctx: &BuildContext<'_>) -> Result<(), CollaboratorError> {
        debug!(service = %ctx.identity, "no build command configured");
        Ok(())
    }
}

/// Deployer that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDeployer;

impl Deployer for NoopDeployer {
    fn deploy(&self, ctx: &DeployContext<'_>) -> Result<(), CollaboratorError> {
        debug!(service = %ctx.identity, "no deploy command configured");
        Ok(())
    }
}

/// Runs a shell command as the build step.
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    command: String,
}

impl CommandBuilder {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl ImageBuilder for CommandBuilder {
    fn build(&self, ctx: &BuildContext<'_>) -> Result<(), CollaboratorError> {
        let mut cmd = shell(&self.command, ctx.identity, ctx.root);
        run(&self.command, &mut cmd)
    }
}

/// Runs a shell command as the deploy step.
///
/// The command finds the config through `ROUTE_FORGE_GATEWAY_CONFIG`.
#[derive(Debug, Clone)]
pub struct CommandDeployer {
    command: String,
}

impl CommandDeployer {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl Deployer for CommandDeployer {
    fn deploy(&self, ctx: &DeployContext<'_>) -> Result<(), CollaboratorError> {
        let mut cmd = shell(&self.command, ctx.identity, ctx.root);
        cmd.env("ROUTE_FORGE_GATEWAY_CONFIG", ctx.config_path);
        run(&self.command, &mut cmd)
    }
}

fn shell(command: &str, identity: &ServiceIdentity, root: &Path) -> Command {
    let mut cmd = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C");
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c");
        c
    };
    cmd.arg(command)
        .current_dir(root)
        .env("ROUTE_FORGE_SERVICE", &identity.name)
        .env("ROUTE_FORGE_MODULE", &identity.module)
        .env("ROUTE_FORGE_VERSION", &identity.version);
    cmd
}

fn run(command: &str, cmd: &mut Command) -> Result<(), CollaboratorError> {
    info!(%command, "running external command");
    let status = cmd.status().map_err(|e| CollaboratorError::Spawn {
        command: command.to_string(),
        message: e.to_string(),
    })?;
    if status.success() {
        Ok(())
    } else {
        Err(CollaboratorError::Failed {
            command: command.to_string(),
            code: status.code(),
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn identity() -> ServiceIdentity {
        ServiceIdentity::new("app", "gateway", "1.2.3")
    }

    #[test]
    fn command_builder_sees_identity_env() {
        let dir = tempfile::tempdir().unwrap();
        let id = identity();
        let builder = CommandBuilder::new(
            "echo \"$ROUTE_FORGE_MODULE/$ROUTE_FORGE_SERVICE@$ROUTE_FORGE_VERSION\" > built.txt",
        );
        builder
            .build(&BuildContext {
                identity: &id,
                root: dir.path(),
            })
            .unwrap();
        let out = std::fs::read_to_string(dir.path().join("built.txt")).unwrap();
        assert_eq!(out.trim(), "app/gateway@1.2.3");
    }

    #[test]
    fn command_deployer_sees_config_path() {
        let dir = tempfile::tempdir().unwrap();
        let id = identity();
        let config_path = dir.path().join("routing.json");
        std::fs::write(&config_path, "{}").unwrap();
        let deployer = CommandDeployer::new("cp \"$ROUTE_FORGE_GATEWAY_CONFIG\" deployed.json");
        deployer
            .deploy(&DeployContext {
                identity: &id,
                root: dir.path(),
                config_path: &config_path,
                config: b"{}",
            })
            .unwrap();
        assert!(dir.path().join("deployed.json").is_file());
    }

    #[test]
    fn non_zero_exit_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let id = identity();
        let err = CommandBuilder::new("exit 3")
            .build(&BuildContext {
                identity: &id,
                root: dir.path(),
            })
            .unwrap_err();
        assert_eq!(
            err,
            CollaboratorError::Failed {
                command: "exit 3".into(),
                code: Some(3)
            }
        );
    }
}
