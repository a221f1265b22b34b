//! cibuildwheel invocation.
//!
//! cibuildwheel is configured entirely through `CIBW_*` environment
//! variables; one invocation builds every ABI of one pass.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::abi::Abi;
use crate::core::target::Target;
use crate::util::process::{find_executable, ProcessBuilder};

/// Executable name looked up on PATH.
pub const CIBUILDWHEEL: &str = "cibuildwheel";

/// Build frontend passed to cibuildwheel.
pub const BUILD_FRONTEND: &str = "build";

/// Pinned manylinux image for armv7l builds.
pub const MANYLINUX_ARMV7L_IMAGE: &str = "quay.io/pypa/manylinux_2_31_armv7l\
     @sha256:3d1bb16c69d0acafcb90fdbaa5e1b9a2d6634089006d76e2427ca6cdae136be0";

/// One cibuildwheel run: a checked out source tree, a target and its ABIs.
#[derive(Debug, Clone)]
pub struct CibuildwheelPass<'a> {
    pub source_dir: &'a Path,
    pub output_dir: &'a Path,
    pub target: Target,
    pub abis: &'a [Abi],
}

impl CibuildwheelPass<'_> {
    /// Environment cibuildwheel reads its configuration from.
    pub fn env(&self) -> BTreeMap<&'static str, String> {
        let build: Vec<String> = self.target.build_identifiers(self.abis).collect();

        BTreeMap::from([
            ("CIBW_PLATFORM", self.target.build_platform().to_string()),
            ("CIBW_ARCHS", self.target.arch().to_string()),
            ("CIBW_BUILD", build.join(" ")),
            ("CIBW_BUILD_FRONTEND", BUILD_FRONTEND.to_string()),
            (
                "CIBW_OUTPUT_DIR",
                self.output_dir.to_string_lossy().into_owned(),
            ),
            (
                "CIBW_MANYLINUX_ARMV7L_IMAGE",
                MANYLINUX_ARMV7L_IMAGE.to_string(),
            ),
        ])
    }

    /// The command for this pass, run from the source tree.
    pub fn command(&self, program: &Path) -> ProcessBuilder {
        self.env()
            .into_iter()
            .fold(ProcessBuilder::new(program), |cmd, (key, value)| {
                cmd.env(key, value)
            })
            .cwd(self.source_dir)
    }
}

/// Locate cibuildwheel on PATH.
pub fn find_cibuildwheel() -> Result<PathBuf> {
    let program = find_executable(CIBUILDWHEEL)
        .with_context(|| format!("`{}` cannot be found in PATH", CIBUILDWHEEL))?;

    let output = ProcessBuilder::new(&program)
        .arg("--version")
        .exec_and_check()?;
    tracing::debug!(
        "using {} {}",
        program.display(),
        String::from_utf8_lossy(&output.stdout).trim()
    );

    Ok(program)
}
