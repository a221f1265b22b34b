//! Command implementations

pub mod build;
pub mod cibuildwheel;
pub mod completions;
pub mod plan;
pub mod render;
