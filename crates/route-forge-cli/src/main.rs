mod cli;
mod commands;
mod config;
// The Diagnostic derive writes label fields rustc reports as never read.
#[allow(unused_assignments)]
mod diagnostic;
mod error;
mod input;
mod output;
mod progress;

use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = cli::Cli::parse();
    init_tracing(&cli.global);
    let output = output::OutputContext::from_global(&cli.global);

    let result = match cli.command {
        cli::Commands::Load(args) => commands::load::run(args, &cli.global, &output),
        cli::Commands::Init(args) => commands::init::run(args, &cli.global, &output),
        cli::Commands::Questions => commands::questions::run(&cli.global, &output),
        cli::Commands::Sync(args) => commands::sync::run(args, &cli.global, &output),
        cli::Commands::Build => commands::build::run(&cli.global, &output),
        cli::Commands::Deploy(args) => commands::deploy::run(args, &cli.global, &output),
        cli::Commands::Completions(args) => commands::completions::run(args),
    };

    match result {
        Ok(()) => std::process::exit(error::ExitCode::Success as i32),
        Err(e) => {
            output.print_error(&e);
            std::process::exit(e.exit_code() as i32);
        }
    }
}

/// Log to stderr. `RUST_LOG` wins; otherwise `-v` counts pick the level.
fn init_tracing(global: &cli::GlobalOpts) {
    let level = match (global.quiet, global.verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .with_ansi(!global.no_color)
        .try_init();
}
