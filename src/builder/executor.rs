//! Execution plan runner.
//!
//! Walks an [`ExecutionPlan`] in order: one checkout per build, one build
//! tool invocation per pass. Passes the host cannot build are reported and
//! skipped. Execution is sequential; builds of one group share a clone.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};

use crate::builder::cibuildwheel::{find_cibuildwheel, CibuildwheelPass};
use crate::builder::plan::{Build, BuildGroup, ExecutionPlan};
use crate::core::abi::Abi;
use crate::core::matrix::{Repository, Revision};
use crate::core::target::Target;
use crate::sources::git::GitCheckout;
use crate::util::fs::create_ignored_folder;

/// The side effects of running a plan.
pub trait BuildRunner {
    /// Make a clone of `repository` available under `repo_dir`; returns its
    /// working tree.
    fn prepare(&mut self, repo_dir: &Path, repository: &Repository) -> Result<PathBuf>;

    /// Check out `revision` in a prepared working tree.
    fn checkout(&mut self, source: &Path, revision: &Revision) -> Result<()>;

    /// Build the wheels of one pass into `output_dir`.
    fn build(&mut self, source: &Path, output_dir: &Path, target: Target, abis: &[Abi])
        -> Result<()>;
}

/// Runs git through libgit2 and builds with cibuildwheel.
#[derive(Debug, Default)]
pub struct CibuildwheelRunner {
    program: Option<PathBuf>,
}

impl CibuildwheelRunner {
    pub fn new() -> Self {
        Self::default()
    }

    fn program(&mut self) -> Result<PathBuf> {
        match &self.program {
            Some(program) => Ok(program.clone()),
            None => {
                let program = find_cibuildwheel()?;
                self.program = Some(program.clone());
                Ok(program)
            }
        }
    }
}

impl BuildRunner for CibuildwheelRunner {
    fn prepare(&mut self, repo_dir: &Path, repository: &Repository) -> Result<PathBuf> {
        let checkout = GitCheckout::clone_or_fetch(repo_dir, repository)?;
        Ok(checkout.path().to_path_buf())
    }

    fn checkout(&mut self, source: &Path, revision: &Revision) -> Result<()> {
        GitCheckout::open(source)?.checkout(revision)
    }

    fn build(
        &mut self,
        source: &Path,
        output_dir: &Path,
        target: Target,
        abis: &[Abi],
    ) -> Result<()> {
        let pass = CibuildwheelPass {
            source_dir: source,
            output_dir,
            target,
            abis,
        };
        let program = self.program()?;
        pass.command(&program)
            .status_and_check()
            .with_context(|| format!("failed to build {} wheels in {}", target, source.display()))
    }
}

/// Totals of an execution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionSummary {
    /// Passes in the plan
    pub passes: usize,
    /// Passes the host can build
    pub native_passes: usize,
    /// Passes actually run
    pub built: usize,
}

/// Plan executor.
pub struct PlanExecutor<R> {
    runner: R,
    repo_dir: PathBuf,
    output_dir: PathBuf,
    dry_run: bool,
    host_os: String,
}

impl<R: BuildRunner> PlanExecutor<R> {
    /// Create an executor. Paths should be absolute: the build tool runs
    /// inside the checkout.
    pub fn new(runner: R, repo_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        PlanExecutor {
            runner,
            repo_dir: repo_dir.into(),
            output_dir: output_dir.into(),
            dry_run: false,
            host_os: std::env::consts::OS.to_string(),
        }
    }

    /// Only report what would be done.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Override the host operating system (`std::env::consts::OS` naming).
    pub fn host_os(mut self, os: impl Into<String>) -> Self {
        self.host_os = os.into();
        self
    }

    pub fn into_runner(self) -> R {
        self.runner
    }

    fn is_native(&self, target: Target) -> bool {
        target.is_native_on(&self.host_os)
    }

    fn has_native_pass(&self, build: &Build) -> bool {
        build.passes.iter().any(|pass| self.is_native(pass.target))
    }

    /// Execute a plan.
    pub fn execute(&mut self, plan: &ExecutionPlan) -> Result<ExecutionSummary> {
        let start = Instant::now();
        let mut summary = ExecutionSummary {
            passes: plan.pass_count(),
            ..Default::default()
        };

        if plan.is_empty() {
            tracing::info!("Nothing to build!");
            return Ok(summary);
        }

        summary.native_passes = plan
            .groups
            .iter()
            .flat_map(|g| &g.builds)
            .flat_map(|b| &b.passes)
            .filter(|p| self.is_native(p.target))
            .count();

        if !self.dry_run && summary.native_passes == 0 {
            tracing::info!("All build passes ({}) have been skipped!", summary.passes);
            return Ok(summary);
        }

        tracing::info!(
            "Build passes to be performed: {} / {}",
            summary.native_passes,
            summary.passes
        );

        if !self.dry_run {
            create_ignored_folder(&self.repo_dir)?;
            create_ignored_folder(&self.output_dir)?;
        }

        for group in &plan.groups {
            summary.built += self.execute_group(group)?;
        }

        tracing::info!(
            "Finished {} build pass(es) in {:.2}s",
            summary.built,
            start.elapsed().as_secs_f64()
        );

        Ok(summary)
    }

    fn execute_group(&mut self, group: &BuildGroup) -> Result<usize> {
        tracing::info!("Building {}", group.package);

        let needs_source =
            !self.dry_run && group.builds.iter().any(|build| self.has_native_pass(build));
        let source = if needs_source {
            Some(self.runner.prepare(&self.repo_dir, &group.repository)?)
        } else {
            None
        };

        let mut built = 0;
        for build in &group.builds {
            tracing::info!("=> Building {} ({})", build.version, build.revision);

            let source = match &source {
                Some(source) if self.has_native_pass(build) => {
                    self.runner.checkout(source, &build.revision)?;
                    Some(source.as_path())
                }
                _ => None,
            };

            for pass in &build.passes {
                let abis: Vec<&str> = pass.abis.iter().map(|abi| abi.as_str()).collect();
                if !self.is_native(pass.target) {
                    tracing::info!(
                        "=> => Skip (non native): {} with {}",
                        pass.target,
                        abis.join(", ")
                    );
                    continue;
                }

                tracing::info!("=> => Build: {} with {}", pass.target, abis.join(", "));
                if let Some(source) = source {
                    self.runner
                        .build(source, &self.output_dir, pass.target, &pass.abis)?;
                    built += 1;
                }
            }
        }

        Ok(built)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::plan::group_gaps;
    use crate::resolver::gaps::GapUnit;
    use crate::core::version::Version;
    use crate::test_support::{REVISION_A, REVISION_B};
    use tempfile::TempDir;

    /// Records calls instead of running anything.
    #[derive(Default)]
    struct RecordingRunner {
        calls: Vec<String>,
    }

    impl BuildRunner for RecordingRunner {
        fn prepare(&mut self, repo_dir: &Path, repository: &Repository) -> Result<PathBuf> {
            self.calls.push(format!("prepare {}", repository.stem()));
            Ok(repo_dir.join(repository.stem()))
        }

        fn checkout(&mut self, _source: &Path, revision: &Revision) -> Result<()> {
            self.calls.push(format!("checkout {}", revision.short()));
            Ok(())
        }

        fn build(
            &mut self,
            _source: &Path,
            _output_dir: &Path,
            target: Target,
            abis: &[Abi],
        ) -> Result<()> {
            let abis: Vec<&str> = abis.iter().map(|abi| abi.as_str()).collect();
            self.calls.push(format!("build {} {}", target, abis.join(",")));
            Ok(())
        }
    }

    fn gap(version: &str, revision: &str, target: Target, abi: Abi) -> GapUnit {
        GapUnit {
            package: "pkg".to_string(),
            repository: Repository::parse("example/pkg").unwrap(),
            revision: Revision::parse(revision).unwrap(),
            version: Version::parse(version).unwrap(),
            target,
            abi,
        }
    }

    fn plan() -> ExecutionPlan {
        group_gaps(vec![
            gap("1.0", REVISION_A, Target::ManylinuxArmv7l, Abi::Cp312),
            gap("1.0", REVISION_A, Target::ManylinuxArmv7l, Abi::Cp313t),
            gap("1.0", REVISION_A, Target::MacosxUniversal2, Abi::Cp312),
            gap("2.0", REVISION_B, Target::MacosxUniversal2, Abi::Cp312),
        ])
    }

    #[test]
    fn test_linux_host_skips_macos_passes() {
        let tmp = TempDir::new().unwrap();
        let mut executor = PlanExecutor::new(
            RecordingRunner::default(),
            tmp.path().join("repos"),
            tmp.path().join("wheels"),
        )
        .host_os("linux");

        let summary = executor.execute(&plan()).unwrap();
        assert_eq!(
            summary,
            ExecutionSummary {
                passes: 3,
                native_passes: 1,
                built: 1,
            }
        );

        let calls = executor.into_runner().calls;
        assert_eq!(
            calls,
            [
                "prepare pkg".to_string(),
                format!("checkout {}", &REVISION_A[..12]),
                "build manylinux_armv7l cp312,cp313t".to_string(),
            ]
        );
        assert!(tmp.path().join("repos/.gitignore").exists());
        assert!(tmp.path().join("wheels/.gitignore").exists());
    }

    #[test]
    fn test_dry_run_executes_nothing() {
        let tmp = TempDir::new().unwrap();
        let mut executor = PlanExecutor::new(
            RecordingRunner::default(),
            tmp.path().join("repos"),
            tmp.path().join("wheels"),
        )
        .host_os("macos")
        .dry_run(true);

        let summary = executor.execute(&plan()).unwrap();
        assert_eq!(summary.native_passes, 2);
        assert_eq!(summary.built, 0);
        assert!(executor.into_runner().calls.is_empty());
        assert!(!tmp.path().join("repos").exists());
    }

    #[test]
    fn test_no_native_passes() {
        let tmp = TempDir::new().unwrap();
        let mut executor = PlanExecutor::new(
            RecordingRunner::default(),
            tmp.path().join("repos"),
            tmp.path().join("wheels"),
        )
        .host_os("windows");

        let summary = executor.execute(&plan()).unwrap();
        assert_eq!(summary.native_passes, 0);
        assert!(executor.into_runner().calls.is_empty());
        assert!(!tmp.path().join("wheels").exists());
    }

    #[test]
    fn test_empty_plan() {
        let mut executor =
            PlanExecutor::new(RecordingRunner::default(), "repos", "wheels").host_os("linux");
        let summary = executor.execute(&ExecutionPlan::default()).unwrap();
        assert_eq!(summary, ExecutionSummary::default());
    }
}
