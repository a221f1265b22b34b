//! Build gap resolution.
//!
//! The resolver is pure and deterministic: all I/O (fetching the release
//! feed, reading the matrix) happens before it runs.

pub mod errors;
pub mod gaps;
pub mod index;

pub use errors::ResolveError;
pub use gaps::{find_gaps, resolve_gaps, GapUnit};
pub use index::{SatisfactionIndex, SatisfactionKey};
