//! Implementation of `wheelyard plan`.

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result};
use thiserror::Error;

use crate::builder::plan::{group_gaps, ExecutionPlan};
use crate::core::matrix::BuildMatrix;
use crate::core::release::ReleaseSnapshot;
use crate::resolver::errors::ResolveError;
use crate::resolver::gaps::find_gaps;
use crate::sources::git::infer_repository;
use crate::sources::github::fetch_releases;
use crate::util::fs::read_to_string;
use crate::util::GlobalContext;

/// Inputs the plan cannot be computed without.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("build matrix not found: {}", path.display())]
    MissingMatrix { path: PathBuf },

    #[error("no release feed configured: {reason}")]
    NoReleaseSource { reason: String },
}

/// Where the published release feed comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseSource {
    /// A saved copy of the releases API response
    File(PathBuf),
    /// A GitHub repository (`owner/name` or URL)
    Repository(String),
}

/// Options for the plan command.
#[derive(Debug, Clone, Default)]
pub struct PlanOptions {
    /// Build matrix (default: config, then `builds.toml`)
    pub builds: Option<PathBuf>,

    /// Release feed (default: `net.repository`, then the current git remote)
    pub releases: Option<ReleaseSource>,
}

/// The pure core: everything in `matrix` not yet in `snapshot`, grouped.
pub fn plan_builds(
    snapshot: &ReleaseSnapshot,
    matrix: &BuildMatrix,
) -> Result<ExecutionPlan, ResolveError> {
    let gaps = find_gaps(matrix, snapshot)?;
    Ok(group_gaps(gaps))
}

/// Pick the release source from options, config or the git remote.
pub fn release_source(ctx: &GlobalContext, explicit: Option<&ReleaseSource>) -> Result<ReleaseSource> {
    if let Some(source) = explicit {
        return Ok(source.clone());
    }
    if let Some(repository) = &ctx.config().net.repository {
        return Ok(ReleaseSource::Repository(repository.clone()));
    }

    let repository = infer_repository(ctx.cwd()).map_err(|e| PlanError::NoReleaseSource {
        reason: format!("{:#}", e),
    })?;
    tracing::debug!("inferred release repository {}", repository);
    Ok(ReleaseSource::Repository(repository))
}

/// Load the published wheels.
pub fn load_snapshot(ctx: &GlobalContext, source: &ReleaseSource) -> Result<ReleaseSnapshot> {
    let snapshot = match source {
        ReleaseSource::File(path) => {
            let path = ctx.resolve_path(path);
            let content = read_to_string(&path)?;
            ReleaseSnapshot::from_json(&content)
                .with_context(|| format!("invalid release feed: {}", path.display()))?
        }
        ReleaseSource::Repository(repository) => {
            let releases = fetch_releases(repository, &ctx.config().net)?;
            ReleaseSnapshot::from_releases(&releases)
        }
    };

    if !snapshot.skipped().is_empty() {
        tracing::warn!(
            "{} release asset(s) were skipped",
            snapshot.skipped().len()
        );
    }
    Ok(snapshot)
}

/// Load the build matrix named by options or config.
pub fn load_matrix(ctx: &GlobalContext, builds: Option<&PathBuf>) -> Result<BuildMatrix> {
    let path = builds
        .map(PathBuf::as_path)
        .unwrap_or_else(|| ctx.config().build.builds());
    let path = ctx.resolve_path(path);
    if !path.exists() {
        return Err(PlanError::MissingMatrix { path }.into());
    }
    BuildMatrix::load(&path)
}

/// Compute the execution plan.
pub fn plan(ctx: &GlobalContext, opts: &PlanOptions) -> Result<ExecutionPlan> {
    // Matrix first: a broken matrix should not cost a network round trip.
    let matrix = load_matrix(ctx, opts.builds.as_ref())?;
    let source = release_source(ctx, opts.releases.as_ref())?;
    let snapshot = load_snapshot(ctx, &source)?;

    let plan = plan_builds(&snapshot, &matrix)?;
    tracing::debug!(
        "plan: {} group(s), {} build(s), {} pass(es), {} wheel(s)",
        plan.groups.len(),
        plan.build_count(),
        plan.pass_count(),
        plan.wheel_count()
    );
    Ok(plan)
}

/// Human readable plan.
pub fn format_plan(plan: &ExecutionPlan) -> String {
    if plan.is_empty() {
        return "Nothing to build!\n".to_string();
    }

    let mut out = String::new();
    for group in &plan.groups {
        let _ = writeln!(out, "{} ({})", group.package, group.repository);
        for build in &group.builds {
            let _ = writeln!(out, "  {} @ {}", build.version, build.revision.short());
            for pass in &build.passes {
                let abis: Vec<&str> = pass.abis.iter().map(|abi| abi.as_str()).collect();
                let native = if pass.target.is_native() {
                    ""
                } else {
                    " (non native)"
                };
                let _ = writeln!(out, "    {}: {}{}", pass.target, abis.join(", "), native);
            }
        }
    }

    let _ = writeln!(
        out,
        "\n{} wheel(s) in {} pass(es) across {} checkout(s)",
        plan.wheel_count(),
        plan.pass_count(),
        plan.build_count()
    );
    out
}
