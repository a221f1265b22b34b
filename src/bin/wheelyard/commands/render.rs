//! `wheelyard render` command

use anyhow::Result;

use crate::cli::RenderArgs;
use wheelyard::ops::render::{render, RenderOptions};
use wheelyard::util::GlobalContext;

pub fn execute(ctx: &GlobalContext, args: RenderArgs) -> Result<()> {
    let opts = RenderOptions {
        target: args.target,
        releases: args.release.source(),
    };

    let summary = render(ctx, &opts)?;
    eprintln!(
        "    Rendered {} package(s) with {} wheel(s)",
        summary.packages, summary.wheels
    );

    Ok(())
}
