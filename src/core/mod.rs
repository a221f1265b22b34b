//! Core data structures for wheelyard.
//!
//! This module contains the value types everything else works with:
//! - Versions, ABIs, targets and platform keys
//! - Wheel filenames and published release assets
//! - The declarative build matrix

pub mod abi;
pub mod matrix;
pub mod ordering;
pub mod platform;
pub mod release;
pub mod target;
pub mod version;
pub mod wheel;

pub use abi::Abi;
pub use matrix::{BuildMatrix, DesiredEntry, MatrixError, Repository, Revision};
pub use platform::{normalize, NormalizedPlatform, PlatformFamily, UnhandledPlatformError};
pub use release::{Release, ReleaseSnapshot, Wheel};
pub use target::Target;
pub use version::Version;
pub use wheel::{MalformedArtifactError, WheelFilename, WheelTag};
