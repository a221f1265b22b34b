//! Wheel filename parsing.
//!
//! A wheel filename encodes everything the resolver needs to know about a
//! published artifact:
//!
//! ```text
//! {name}-{version}(-{build})?-{python}-{abi}-{platform}.whl
//! ```
//!
//! Each of the last three components may be a dot-separated set
//! (`py2.py3`), which expands to the cartesian product of tags.

use std::collections::BTreeSet;
use std::fmt;

use thiserror::Error;

use crate::core::version::Version;

/// File suffix of wheel artifacts.
pub const WHEEL_SUFFIX: &str = ".whl";

/// A filename that is not a well-formed wheel name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed wheel filename `{filename}`: {reason}")]
pub struct MalformedArtifactError {
    pub filename: String,
    pub reason: String,
}

impl MalformedArtifactError {
    fn new(filename: &str, reason: impl Into<String>) -> Self {
        MalformedArtifactError {
            filename: filename.to_string(),
            reason: reason.into(),
        }
    }
}

/// Canonical form of a package name: lower-case, with runs of `-`, `_` and
/// `.` collapsed to a single `-`.
pub fn canonicalize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_separator = false;
    for ch in name.trim().chars() {
        if matches!(ch, '-' | '_' | '.') {
            pending_separator = true;
            continue;
        }
        if pending_separator && !out.is_empty() {
            out.push('-');
        }
        pending_separator = false;
        out.push(ch.to_ascii_lowercase());
    }
    out
}

/// Interpreter component of a tag, e.g. `cp312` or `py3`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InterpreterTag {
    /// Implementation letters (`cp`, `py`, `pp`).
    pub family: String,
    /// Major version digit.
    pub major: u32,
    /// Minor version digits, absent for generic tags like `py3`.
    pub minor: Option<u32>,
    /// Trailing non-numeric suffix, usually empty.
    pub variant: String,
}

impl InterpreterTag {
    pub fn parse(tag: &str) -> Option<Self> {
        let digits_at = tag.find(|c: char| c.is_ascii_digit())?;
        let (family, rest) = tag.split_at(digits_at);
        if family.is_empty() || !family.chars().all(|c| c.is_ascii_alphabetic()) {
            return None;
        }

        let digits_end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let (digits, variant) = rest.split_at(digits_end);

        let major = digits[..1].parse().ok()?;
        let minor = match &digits[1..] {
            "" => None,
            minor => Some(minor.parse().ok()?),
        };

        Some(InterpreterTag {
            family: family.to_string(),
            major,
            minor,
            variant: variant.to_string(),
        })
    }
}

impl fmt::Display for InterpreterTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.family, self.major)?;
        if let Some(minor) = self.minor {
            write!(f, "{}", minor)?;
        }
        f.write_str(&self.variant)
    }
}

/// One expanded (interpreter, abi, platform) triple.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WheelTag {
    pub interpreter: InterpreterTag,
    pub abi: String,
    pub platform: String,
}

impl fmt::Display for WheelTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.interpreter, self.abi, self.platform)
    }
}

/// A parsed wheel filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WheelFilename {
    pub package: String,
    pub version: Version,
    pub build: Option<String>,
    pub tags: BTreeSet<WheelTag>,
}

impl WheelFilename {
    /// Parse a wheel filename into package, version and expanded tags.
    pub fn parse(filename: &str) -> Result<Self, MalformedArtifactError> {
        let stem = filename
            .strip_suffix(WHEEL_SUFFIX)
            .ok_or_else(|| MalformedArtifactError::new(filename, "missing `.whl` suffix"))?;

        let parts: Vec<&str> = stem.split('-').collect();
        let (name, version, build, python, abi, platform) = match parts.as_slice() {
            [name, version, python, abi, platform] => {
                (*name, *version, None, *python, *abi, *platform)
            }
            [name, version, build, python, abi, platform] => {
                (*name, *version, Some(*build), *python, *abi, *platform)
            }
            _ => {
                return Err(MalformedArtifactError::new(
                    filename,
                    format!("expected 5 or 6 dash-separated parts, found {}", parts.len()),
                ))
            }
        };

        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
        {
            return Err(MalformedArtifactError::new(
                filename,
                format!("invalid project name `{}`", name),
            ));
        }

        let version = Version::parse(version)
            .map_err(|e| MalformedArtifactError::new(filename, e.to_string()))?;

        if let Some(build) = build {
            if !build.starts_with(|c: char| c.is_ascii_digit()) {
                return Err(MalformedArtifactError::new(
                    filename,
                    format!("build tag `{}` must start with a digit", build),
                ));
            }
        }

        let mut tags = BTreeSet::new();
        for interpreter in python.split('.') {
            let interpreter = InterpreterTag::parse(interpreter).ok_or_else(|| {
                MalformedArtifactError::new(
                    filename,
                    format!("invalid interpreter tag `{}`", interpreter),
                )
            })?;
            for abi in abi.split('.') {
                for platform in platform.split('.') {
                    if abi.is_empty() || platform.is_empty() {
                        return Err(MalformedArtifactError::new(filename, "empty tag component"));
                    }
                    tags.insert(WheelTag {
                        interpreter: interpreter.clone(),
                        abi: abi.to_string(),
                        platform: platform.to_string(),
                    });
                }
            }
        }

        Ok(WheelFilename {
            package: canonicalize_name(name),
            version,
            build: build.map(str::to_string),
            tags,
        })
    }
}
