//! High-level operations.
//!
//! This module contains the implementation of wheelyard commands.

pub mod build;
pub mod plan;
pub mod render;

pub use build::{build, build_single, BuildOptions, SinglePassOptions};
pub use plan::{format_plan, plan, plan_builds, PlanOptions, ReleaseSource};
pub use render::{render, render_index, RenderOptions, RenderSummary};
