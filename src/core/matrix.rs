//! Build matrix parsing and validation.
//!
//! The build matrix declares which wheels should exist:
//!
//! ```toml
//! [[build]]
//! package = "curl_cffi"
//! repository = "lexiforest/curl_cffi"
//!
//! [[build.builds]]
//! revision = "0123456789abcdef0123456789abcdef01234567"
//! version = "0.13.0"
//! targets = ["manylinux_armv7l"]
//! abis = ["cp310", "cp313t"]
//! ```
//!
//! The same structure is accepted as JSON. Every entry is validated up
//! front; one bad entry rejects the whole matrix.

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::core::abi::{Abi, AbiError};
use crate::core::target::{Target, TargetError};
use crate::core::version::{Version, VersionError};
use crate::core::wheel::canonicalize_name;
use crate::util::diagnostic::MatrixSyntaxError;
use crate::util::hash::{is_hex_digest, HashAlgorithm};

/// Invalid desired build.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatrixError {
    #[error("build group {group}: package name is empty")]
    EmptyPackage { group: usize },

    #[error("build group {group} (`{package}`): invalid repository `{value}`")]
    InvalidRepository {
        group: usize,
        package: String,
        value: String,
    },

    #[error("`{package}` build {build}: invalid revision `{revision}` (expected a 40 or 64 digit hex object name)")]
    InvalidRevision {
        package: String,
        build: usize,
        revision: String,
    },

    #[error("`{package}` build {build}: {source}")]
    InvalidVersion {
        package: String,
        build: usize,
        #[source]
        source: VersionError,
    },

    #[error("`{package}` build {build}: {source}")]
    UnknownTarget {
        package: String,
        build: usize,
        #[source]
        source: TargetError,
    },

    #[error("`{package}` build {build}: {source}")]
    UnknownAbi {
        package: String,
        build: usize,
        #[source]
        source: AbiError,
    },

    #[error("`{package}` build {build}: no targets listed")]
    NoTargets { package: String, build: usize },
}

/// A git object name (SHA-1 or SHA-256).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Revision(String);

impl Revision {
    pub fn parse(value: &str) -> Option<Self> {
        let allowed = [HashAlgorithm::Sha1, HashAlgorithm::Sha256];
        allowed
            .iter()
            .any(|algorithm| is_hex_digest(value, algorithm.digest_len()))
            .then(|| Revision(value.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated form for log output.
    pub fn short(&self) -> &str {
        &self.0[..12]
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A git remote. GitHub short forms (`owner/name`) are expanded.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Repository(String);

impl Repository {
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if !value.contains('/') {
            return None;
        }
        if !value.contains(':') {
            return Some(Repository(format!("https://github.com/{}", value)));
        }
        if value.contains("://") {
            Url::parse(value).ok()?;
        }
        Some(Repository(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Directory name a clone of this remote gets (`curl_cffi` for
    /// `https://github.com/lexiforest/curl_cffi.git`).
    pub fn stem(&self) -> &str {
        let last = self
            .0
            .trim_end_matches('/')
            .rsplit(['/', ':'])
            .next()
            .unwrap_or(&self.0);
        last.strip_suffix(".git").unwrap_or(last)
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Top level of the build matrix document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildMatrix {
    #[serde(default)]
    pub build: Vec<BuildGroupSpec>,
}

/// One package and the builds wanted for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildGroupSpec {
    pub package: String,
    pub repository: String,
    #[serde(default)]
    pub builds: Vec<BuildSpec>,
}

/// One revision of a package and the wheels wanted for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildSpec {
    pub revision: String,
    pub version: String,
    #[serde(default)]
    pub targets: Vec<String>,
    /// Defaults to every plain CPython ABI when absent.
    #[serde(default)]
    pub abis: Option<Vec<String>>,
}

/// A validated desired build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredEntry {
    pub package: String,
    pub repository: Repository,
    pub revision: Revision,
    pub version: Version,
    pub targets: Vec<Target>,
    pub abis: Vec<Abi>,
}

impl BuildMatrix {
    /// Load a build matrix, picking the format by file extension.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read build matrix: {}", path.display()))?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let matrix = if is_json {
            Self::from_json(&content)
        } else {
            Self::parse_toml(&path.display().to_string(), &content)
        };

        matrix.with_context(|| format!("failed to parse build matrix: {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Self::parse_toml("builds.toml", content)
    }

    fn parse_toml(name: &str, content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            MatrixSyntaxError::new(name, content, e.message(), e.span()).into()
        })
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Validate every entry, failing on the first invalid one.
    pub fn desired_entries(&self) -> Result<Vec<DesiredEntry>, MatrixError> {
        let mut entries = Vec::new();

        for (group_index, group) in self.build.iter().enumerate() {
            let package = canonicalize_name(&group.package);
            if package.is_empty() {
                return Err(MatrixError::EmptyPackage { group: group_index });
            }

            let repository = Repository::parse(&group.repository).ok_or_else(|| {
                MatrixError::InvalidRepository {
                    group: group_index,
                    package: package.clone(),
                    value: group.repository.clone(),
                }
            })?;

            for (build_index, build) in group.builds.iter().enumerate() {
                entries.push(build.validate(&package, &repository, build_index)?);
            }
        }

        Ok(entries)
    }
}

impl BuildSpec {
    fn validate(
        &self,
        package: &str,
        repository: &Repository,
        build: usize,
    ) -> Result<DesiredEntry, MatrixError> {
        let revision =
            Revision::parse(&self.revision).ok_or_else(|| MatrixError::InvalidRevision {
                package: package.to_string(),
                build,
                revision: self.revision.clone(),
            })?;

        let version = Version::parse(&self.version).map_err(|source| {
            MatrixError::InvalidVersion {
                package: package.to_string(),
                build,
                source,
            }
        })?;

        if self.targets.is_empty() {
            return Err(MatrixError::NoTargets {
                package: package.to_string(),
                build,
            });
        }

        let targets = self
            .targets
            .iter()
            .map(|target| target.parse::<Target>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| MatrixError::UnknownTarget {
                package: package.to_string(),
                build,
                source,
            })?;

        let abis = match &self.abis {
            Some(abis) => abis
                .iter()
                .map(|abi| abi.parse::<Abi>())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|source| MatrixError::UnknownAbi {
                    package: package.to_string(),
                    build,
                    source,
                })?,
            None => Abi::defaults(),
        };

        Ok(DesiredEntry {
            package: package.to_string(),
            repository: repository.clone(),
            revision,
            version,
            targets,
            abis,
        })
    }
}
