//! wheelyard - Plans and builds the Python wheels a release-hosted index is missing
//!
//! This crate provides the core library functionality for wheelyard:
//! reading published wheels, finding the gaps against a build matrix,
//! grouping them into an execution plan, and carrying that plan out.

pub mod builder;
pub mod core;
pub mod ops;
pub mod resolver;
pub mod sources;
pub mod util;

/// Fixtures for wheelyard unit tests.
#[cfg(test)]
pub mod test_support;

pub use builder::{group_gaps, ExecutionPlan};
pub use core::{Abi, BuildMatrix, ReleaseSnapshot, Target, Version, Wheel};
pub use resolver::{find_gaps, GapUnit, ResolveError, SatisfactionIndex};
pub use util::context::GlobalContext;
