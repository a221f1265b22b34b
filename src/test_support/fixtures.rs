//! Test fixtures for common test scenarios.
//!
//! Shared constants for release feeds and build matrices.

/// A valid SHA-256 hex digest.
pub const SHA256_A: &str = "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08";

/// Upload time used for every fixture asset.
pub const CREATED_AT: &str = "2025-01-02T03:04:05Z";

/// Full commit ids; `REVISION_A` sorts before `REVISION_B`.
pub const REVISION_A: &str = "0123456789abcdef0123456789abcdef01234567";
pub const REVISION_B: &str = "89abcdef0123456789abcdef0123456789abcdef";

/// One package, two builds: explicit ABIs on one target, then defaults on
/// both targets.
pub const SAMPLE_MATRIX: &str = r#"
[[build]]
package = "pkg_a"
repository = "example/pkg-a"

[[build.builds]]
revision = "0123456789abcdef0123456789abcdef01234567"
version = "1.0"
targets = ["manylinux_armv7l"]
abis = ["cp310", "cp311", "cp313t"]

[[build.builds]]
revision = "89abcdef0123456789abcdef0123456789abcdef"
version = "2.0"
targets = ["manylinux_armv7l", "macosx_universal2"]
"#;
