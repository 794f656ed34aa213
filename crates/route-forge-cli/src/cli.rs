use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

/// Curates which dependency routes a gateway exposes and synthesizes its config.
///
/// RouteForge reconciles the routes a gateway already knows with the endpoints
/// its dependencies publish, asks about the new ones, and writes a
/// deterministic gateway config from the decisions.
#[derive(Parser)]
#[command(
    name = "route-forge",
    version,
    about = "Curates dependency routes and synthesizes API gateway configs",
    after_help = "Use 'route-forge <command> --help' for more information about a command.",
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Global options available to all subcommands.
#[derive(Args, Debug)]
pub struct GlobalOpts {
    /// Configuration file path [env: ROUTE_FORGE_CONFIG]
    #[arg(short = 'c', long = "config", global = true, env = "ROUTE_FORGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Gateway service root; overrides [paths].root [env: ROUTE_FORGE_ROOT]
    #[arg(short = 'C', long = "root", global = true, env = "ROUTE_FORGE_ROOT")]
    pub root: Option<PathBuf>,

    /// Output format: human (default), json, plain
    #[arg(
        long,
        global = true,
        default_value = "human",
        value_parser = ["human", "json", "plain"]
    )]
    pub format: String,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long = "verbose", global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all non-error output
    #[arg(short = 'q', long = "quiet", global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output [env: NO_COLOR]
    #[arg(long = "no-color", global = true, env = "NO_COLOR")]
    pub no_color: bool,
}

/// Top-level subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Load the route store and summarize it
    Load(LoadArgs),

    /// Reconcile routes against dependency endpoints and open a decision session
    Init(InitArgs),

    /// Show the questions of the open decision session
    Questions,

    /// Answer the open decision session and save the decisions
    Sync(SyncArgs),

    /// Run the configured image build command
    Build,

    /// Synthesize the gateway config and run the configured deploy command
    Deploy(DeployArgs),

    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}

// ---------------------------------------------------------------------------
// Individual command argument structs
// ---------------------------------------------------------------------------

/// Arguments for `route-forge load`.
#[derive(Args)]
pub struct LoadArgs {
    /// Report the watch flag as set, regardless of [agent].watch
    #[arg(short = 'w', long = "watch")]
    pub watch: bool,
}

/// Arguments for `route-forge init`.
#[derive(Args)]
pub struct InitArgs {
    /// Dependency endpoints file (YAML or JSON list)
    #[arg(short = 'e', long = "endpoints")]
    pub endpoints: PathBuf,
}

/// Arguments for `route-forge sync`.
#[derive(Args)]
pub struct SyncArgs {
    /// Answers file: a YAML or JSON map of question id to choice
    #[arg(long = "answers")]
    pub answers: Option<PathBuf>,

    /// A single answer as <question-id>=<choice>; repeatable
    #[arg(short = 'a', long = "answer", value_name = "ID=CHOICE")]
    pub answer: Vec<String>,
}

/// Arguments for `route-forge deploy`.
#[derive(Args)]
pub struct DeployArgs {
    /// Network mappings file (YAML or JSON list)
    #[arg(short = 'n', long = "network")]
    pub network: PathBuf,

    /// Print the gateway config instead of writing and deploying it
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Gateway listen port; overrides [service].port
    #[arg(short = 'p', long = "port")]
    pub port: Option<u16>,
}

/// Arguments for `route-forge completions`.
#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
