//! `wheelyard build` command

use anyhow::Result;

use crate::cli::BuildArgs;
use wheelyard::ops::build::{build, BuildOptions};
use wheelyard::ops::plan::PlanOptions;
use wheelyard::util::GlobalContext;

pub fn execute(ctx: &GlobalContext, args: BuildArgs) -> Result<()> {
    let opts = BuildOptions {
        plan: PlanOptions {
            builds: args.builds,
            releases: args.release.source(),
        },
        dry_run: args.dry_run,
        repo_dir: args.repo_dir,
        output_dir: args.output_dir,
    };

    let summary = build(ctx, &opts)?;

    if args.dry_run {
        eprintln!(
            "    Dry run: {} of {} pass(es) would be built",
            summary.native_passes, summary.passes
        );
    } else if summary.built > 0 {
        eprintln!("    Finished {} pass(es)", summary.built);
    }

    Ok(())
}
