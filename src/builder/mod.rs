//! Build planning and execution.
//!
//! `plan` turns missing wheels into an execution plan and is pure;
//! `executor` and `cibuildwheel` carry it out.

pub mod cibuildwheel;
pub mod executor;
pub mod plan;

pub use executor::{BuildRunner, CibuildwheelRunner, ExecutionSummary, PlanExecutor};
pub use plan::{group_gaps, Build, BuildGroup, BuildPass, ExecutionPlan};
