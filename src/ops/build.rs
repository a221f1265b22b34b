//! Implementation of `wheelyard build` and `wheelyard cibuildwheel`.

use std::path::PathBuf;

use anyhow::{bail, Result};

use crate::builder::executor::{BuildRunner, CibuildwheelRunner, ExecutionSummary, PlanExecutor};
use crate::core::abi::Abi;
use crate::core::matrix::{Repository, Revision};
use crate::core::target::Target;
use crate::ops::plan::{plan, PlanOptions};
use crate::util::fs::create_ignored_folder;
use crate::util::GlobalContext;

/// Options for the build command.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Matrix and release feed selection
    pub plan: PlanOptions,

    /// Only report what would be built
    pub dry_run: bool,

    /// Clone directory (default: `build.repo_dir`)
    pub repo_dir: Option<PathBuf>,

    /// Wheel output directory (default: `build.output_dir`)
    pub output_dir: Option<PathBuf>,
}

/// Options for building a single pass.
#[derive(Debug, Clone)]
pub struct SinglePassOptions {
    pub repository: Repository,
    pub revision: Revision,
    pub target: Target,

    /// Empty means the default ABIs
    pub abis: Vec<Abi>,

    pub repo_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
}

fn work_dirs(
    ctx: &GlobalContext,
    repo_dir: Option<&PathBuf>,
    output_dir: Option<&PathBuf>,
) -> (PathBuf, PathBuf) {
    let build = &ctx.config().build;
    let repo_dir = repo_dir.map(PathBuf::as_path).unwrap_or(build.repo_dir());
    let output_dir = output_dir
        .map(PathBuf::as_path)
        .unwrap_or(build.output_dir());
    (ctx.resolve_path(repo_dir), ctx.resolve_path(output_dir))
}

/// Plan the missing wheels and build them.
pub fn build(ctx: &GlobalContext, opts: &BuildOptions) -> Result<ExecutionSummary> {
    let plan = plan(ctx, &opts.plan)?;
    let (repo_dir, output_dir) = work_dirs(ctx, opts.repo_dir.as_ref(), opts.output_dir.as_ref());

    PlanExecutor::new(CibuildwheelRunner::new(), repo_dir, output_dir)
        .dry_run(opts.dry_run)
        .execute(&plan)
}

/// Build one target of one revision, bypassing planning.
pub fn build_single(ctx: &GlobalContext, opts: &SinglePassOptions) -> Result<()> {
    let (repo_dir, output_dir) = work_dirs(ctx, opts.repo_dir.as_ref(), opts.output_dir.as_ref());
    build_single_with(
        &mut CibuildwheelRunner::new(),
        opts,
        &repo_dir,
        &output_dir,
    )
}

fn build_single_with<R: BuildRunner>(
    runner: &mut R,
    opts: &SinglePassOptions,
    repo_dir: &std::path::Path,
    output_dir: &std::path::Path,
) -> Result<()> {
    if !opts.target.is_native() {
        bail!(
            "`{}` wheels cannot be built on this host ({})",
            opts.target,
            std::env::consts::OS
        );
    }

    let abis = if opts.abis.is_empty() {
        Abi::defaults()
    } else {
        opts.abis.clone()
    };

    create_ignored_folder(repo_dir)?;
    create_ignored_folder(output_dir)?;

    let source = runner.prepare(repo_dir, &opts.repository)?;
    runner.checkout(&source, &opts.revision)?;

    tracing::info!("Building {} @ {}", opts.repository.stem(), opts.revision);
    runner.build(&source, output_dir, opts.target, &abis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::REVISION_A;
    use crate::util::Config;
    use std::path::Path;
    use tempfile::TempDir;

    #[derive(Default)]
    struct RecordingRunner {
        calls: Vec<String>,
    }

    impl BuildRunner for RecordingRunner {
        fn prepare(&mut self, repo_dir: &Path, repository: &Repository) -> Result<PathBuf> {
            self.calls.push(format!("prepare {}", repository));
            Ok(repo_dir.join(repository.stem()))
        }

        fn checkout(&mut self, _source: &Path, revision: &Revision) -> Result<()> {
            self.calls.push(format!("checkout {}", revision));
            Ok(())
        }

        fn build(
            &mut self,
            source: &Path,
            _output_dir: &Path,
            target: Target,
            abis: &[Abi],
        ) -> Result<()> {
            self.calls.push(format!(
                "build {} {} {}",
                source.file_name().unwrap().to_string_lossy(),
                target,
                abis.len()
            ));
            Ok(())
        }
    }

    fn native_target() -> Option<Target> {
        Target::ALL.into_iter().find(|t| t.is_native())
    }

    fn options(target: Target, abis: Vec<Abi>) -> SinglePassOptions {
        SinglePassOptions {
            repository: Repository::parse("example/pkg-a").unwrap(),
            revision: Revision::parse(REVISION_A).unwrap(),
            target,
            abis,
            repo_dir: None,
            output_dir: None,
        }
    }

    #[test]
    fn test_work_dirs_prefer_options() {
        let ctx = GlobalContext::with_config(PathBuf::from("/work"), Config::default());

        let (repo_dir, output_dir) = work_dirs(&ctx, None, None);
        assert_eq!(repo_dir, Path::new("/work/repos"));
        assert_eq!(output_dir, Path::new("/work/wheels"));

        let custom = PathBuf::from("/elsewhere/out");
        let (_, output_dir) = work_dirs(&ctx, None, Some(&custom));
        assert_eq!(output_dir, custom);
    }

    #[test]
    fn test_single_pass_uses_default_abis() {
        let Some(target) = native_target() else {
            return;
        };
        let tmp = TempDir::new().unwrap();
        let mut runner = RecordingRunner::default();

        build_single_with(
            &mut runner,
            &options(target, Vec::new()),
            &tmp.path().join("repos"),
            &tmp.path().join("wheels"),
        )
        .unwrap();

        assert_eq!(
            runner.calls,
            [
                "prepare https://github.com/example/pkg-a".to_string(),
                format!("checkout {}", REVISION_A),
                format!("build pkg-a {} {}", target, Abi::defaults().len()),
            ]
        );
        assert!(tmp.path().join("wheels/.gitignore").exists());
    }

    #[test]
    fn test_single_pass_rejects_foreign_target() {
        let Some(foreign) = Target::ALL.into_iter().find(|t| !t.is_native()) else {
            return;
        };
        let tmp = TempDir::new().unwrap();
        let mut runner = RecordingRunner::default();

        let err = build_single_with(
            &mut runner,
            &options(foreign, vec![Abi::Cp312]),
            &tmp.path().join("repos"),
            &tmp.path().join("wheels"),
        )
        .unwrap_err();

        assert!(err.to_string().contains("cannot be built on this host"));
        assert!(runner.calls.is_empty());
    }
}
