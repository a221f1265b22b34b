//! Build targets - where a wheel runs.
//!
//! A Target is one platform/architecture pair the build tool can produce
//! wheels for. Targets are compared by their tag string.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::core::abi::Abi;
use crate::core::platform::{NormalizedPlatform, PlatformFamily};

/// Unknown target in a build request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown target `{0}` (known: {known})", known = Target::known_list())]
pub struct TargetError(pub String);

/// A known build target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    /// 32-bit ARM Linux (glibc), built under emulation.
    ManylinuxArmv7l,
    /// macOS fat binary (x86_64 + arm64).
    MacosxUniversal2,
}

impl Target {
    /// Every known target.
    pub const ALL: [Target; 2] = [Target::ManylinuxArmv7l, Target::MacosxUniversal2];

    pub const fn as_str(self) -> &'static str {
        match self {
            Target::ManylinuxArmv7l => "manylinux_armv7l",
            Target::MacosxUniversal2 => "macosx_universal2",
        }
    }

    pub const fn family(self) -> PlatformFamily {
        match self {
            Target::ManylinuxArmv7l => PlatformFamily::Manylinux,
            Target::MacosxUniversal2 => PlatformFamily::Macosx,
        }
    }

    /// Architecture as cibuildwheel names it.
    pub const fn arch(self) -> &'static str {
        match self {
            Target::ManylinuxArmv7l => "armv7l",
            Target::MacosxUniversal2 => "universal2",
        }
    }

    /// Platform as cibuildwheel names it.
    pub const fn build_platform(self) -> &'static str {
        match self {
            Target::ManylinuxArmv7l => "linux",
            Target::MacosxUniversal2 => "macos",
        }
    }

    /// Key under which published wheels for this target are indexed.
    pub fn normalized(self) -> NormalizedPlatform {
        NormalizedPlatform::new(self.family(), self.arch())
    }

    /// Whether the host can build this target.
    ///
    /// Linux targets run through cibuildwheel's container emulation, so any
    /// Linux host qualifies; macOS targets need a macOS host.
    pub fn is_native(self) -> bool {
        self.is_native_on(std::env::consts::OS)
    }

    pub fn is_native_on(self, os: &str) -> bool {
        match self.family() {
            PlatformFamily::Manylinux | PlatformFamily::Musllinux => os == "linux",
            PlatformFamily::Macosx => os == "macos",
        }
    }

    /// cibuildwheel build identifiers, one per ABI (`cp312-manylinux_armv7l`).
    pub fn build_identifiers(self, abis: &[Abi]) -> impl Iterator<Item = String> + '_ {
        abis.iter()
            .map(move |abi| format!("{}-{}", abi, self.as_str()))
    }

    fn known_list() -> String {
        Target::ALL
            .iter()
            .map(|target| target.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Ord for Target {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl PartialOrd for Target {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Target {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Target::ALL
            .into_iter()
            .find(|target| target.as_str() == lowered)
            .ok_or_else(|| TargetError(s.to_string()))
    }
}

impl Serialize for Target {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Target {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
