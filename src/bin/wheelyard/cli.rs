//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use wheelyard::core::{Abi, Target};
use wheelyard::ops::ReleaseSource;

/// wheelyard - Build the Python wheels a release-hosted index is missing
#[derive(Parser)]
#[command(name = "wheelyard")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show which wheels are missing and how they would be built
    Plan(PlanArgs),

    /// Build the missing wheels
    Build(BuildArgs),

    /// Render the published wheels into a package index
    Render(RenderArgs),

    /// Build one target of one revision with cibuildwheel
    Cibuildwheel(CibuildwheelArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Where published wheels are read from.
#[derive(Args)]
pub struct ReleaseArgs {
    /// Read the release feed from a saved JSON file
    #[arg(long, value_name = "FILE", conflicts_with = "repository")]
    pub releases: Option<PathBuf>,

    /// GitHub repository whose releases host the wheels
    #[arg(long, value_name = "OWNER/NAME")]
    pub repository: Option<String>,
}

impl ReleaseArgs {
    pub fn source(&self) -> Option<ReleaseSource> {
        match (&self.releases, &self.repository) {
            (Some(file), _) => Some(ReleaseSource::File(file.clone())),
            (None, Some(repository)) => Some(ReleaseSource::Repository(repository.clone())),
            (None, None) => None,
        }
    }
}

#[derive(Args)]
pub struct PlanArgs {
    /// Build matrix (default: builds.toml)
    #[arg(long, value_name = "FILE")]
    pub builds: Option<PathBuf>,

    #[command(flatten)]
    pub release: ReleaseArgs,

    /// Print the plan as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct BuildArgs {
    /// Build matrix (default: builds.toml)
    #[arg(long, value_name = "FILE")]
    pub builds: Option<PathBuf>,

    #[command(flatten)]
    pub release: ReleaseArgs,

    /// Only show what would be built
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Directory repositories are cloned into (default: repos)
    #[arg(long, value_name = "DIR")]
    pub repo_dir: Option<PathBuf>,

    /// Directory finished wheels are written to (default: wheels)
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}

#[derive(Args)]
pub struct RenderArgs {
    /// Directory to write the index to
    pub target: PathBuf,

    #[command(flatten)]
    pub release: ReleaseArgs,
}

#[derive(Args)]
pub struct CibuildwheelArgs {
    /// Git repository; GitHub repositories may use the short form (owner/name)
    pub repository: String,

    /// Full sha1/sha256 revision to check out
    pub revision: String,

    /// Target to build wheels for
    pub target: Target,

    /// ABI to build for; can be passed multiple times (default: cp310..cp314)
    #[arg(long)]
    pub abi: Vec<Abi>,

    /// Directory repositories are cloned into (default: repos)
    #[arg(long, value_name = "DIR")]
    pub repo_dir: Option<PathBuf>,

    /// Directory finished wheels are written to (default: wheels)
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: Shell,
}
