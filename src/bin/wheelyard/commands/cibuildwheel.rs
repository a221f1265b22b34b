//! `wheelyard cibuildwheel` command
//!
//! Plumbing: builds one target of one revision without consulting the
//! build matrix or the release feed.

use anyhow::{anyhow, Result};

use crate::cli::CibuildwheelArgs;
use wheelyard::core::{Repository, Revision};
use wheelyard::ops::build::{build_single, SinglePassOptions};
use wheelyard::util::GlobalContext;

pub fn execute(ctx: &GlobalContext, args: CibuildwheelArgs) -> Result<()> {
    let repository = Repository::parse(&args.repository)
        .ok_or_else(|| anyhow!("invalid repository `{}`", args.repository))?;
    let revision = Revision::parse(&args.revision).ok_or_else(|| {
        anyhow!(
            "invalid revision `{}`: expected a full sha1 or sha256 commit id",
            args.revision
        )
    })?;

    let opts = SinglePassOptions {
        repository,
        revision,
        target: args.target,
        abis: args.abi,
        repo_dir: args.repo_dir,
        output_dir: args.output_dir,
    };

    build_single(ctx, &opts)
}
