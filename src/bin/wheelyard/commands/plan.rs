//! `wheelyard plan` command

use anyhow::{Context, Result};

use crate::cli::PlanArgs;
use wheelyard::ops::plan::{format_plan, plan, PlanOptions};
use wheelyard::util::GlobalContext;

pub fn execute(ctx: &GlobalContext, args: PlanArgs) -> Result<()> {
    let opts = PlanOptions {
        builds: args.builds,
        releases: args.release.source(),
    };

    let plan = plan(ctx, &opts)?;

    if args.json {
        let json = serde_json::to_string_pretty(&plan).context("failed to serialize plan")?;
        println!("{}", json);
    } else {
        print!("{}", format_plan(&plan));
    }

    Ok(())
}
