//! wheelyard CLI - Build the Python wheels a release-hosted index is missing

use std::io::IsTerminal;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use wheelyard::ops::plan::PlanError;
use wheelyard::resolver::ResolveError;
use wheelyard::util::diagnostic::{emit, suggestions, Diagnostic, MatrixSyntaxError};
use wheelyard::util::process::ProcessError;
use wheelyard::util::GlobalContext;

fn main() {
    let cli = Cli::parse();
    let color = !cli.no_color && std::io::stderr().is_terminal();

    if let Err(e) = run(cli, color) {
        report(&e, color);
        std::process::exit(1);
    }
}

fn run(cli: Cli, color: bool) -> Result<()> {
    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("wheelyard=debug")
    } else {
        EnvFilter::new("wheelyard=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_ansi(color)
        .with_writer(std::io::stderr)
        .init();

    let ctx = GlobalContext::new()?;

    // Execute command
    match cli.command {
        Commands::Plan(args) => commands::plan::execute(&ctx, args),
        Commands::Build(args) => commands::build::execute(&ctx, args),
        Commands::Render(args) => commands::render::execute(&ctx, args),
        Commands::Cibuildwheel(args) => commands::cibuildwheel::execute(&ctx, args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}

/// Print an error, with suggestions where the cause is known.
fn report(err: &anyhow::Error, color: bool) {
    if let Some(e) = err.downcast_ref::<ResolveError>() {
        emit(&e.to_diagnostic(), color);
        return;
    }
    if let Some(e) = err.downcast_ref::<MatrixSyntaxError>() {
        eprintln!("{}", e.render());
        return;
    }

    let suggestion = if let Some(e) = err.downcast_ref::<PlanError>() {
        Some(match e {
            PlanError::MissingMatrix { .. } => suggestions::NO_MATRIX,
            PlanError::NoReleaseSource { .. } => suggestions::NO_RELEASES,
        })
    } else if err.chain().any(|c| c.is::<reqwest::Error>()) {
        Some(suggestions::FETCH_FAILED)
    } else if err.chain().any(|c| c.is::<ProcessError>()) {
        Some(suggestions::BUILD_FAILED)
    } else {
        None
    };

    match suggestion {
        Some(suggestion) => {
            let mut diag = Diagnostic::error(format!("{:#}", err));
            diag = diag.with_suggestion(suggestion);
            emit(&diag, color);
        }
        None => eprintln!("error: {:#}", err),
    }
}
