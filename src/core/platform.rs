//! Platform tag normalization.
//!
//! Published wheels carry precise platform tags such as
//! `manylinux_2_31_armv7l` or `macosx_11_0_universal2`. For satisfaction
//! purposes these collapse to a coarse key of family plus architecture; the
//! minimum glibc/OS version in between is discarded, so two tags that differ
//! only in that qualifier are interchangeable.

use std::fmt;

use serde::{Serialize, Serializer};
use thiserror::Error;

/// A platform tag that matches no known family.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unhandled platform tag `{tag}`")]
pub struct UnhandledPlatformError {
    pub tag: String,
}

/// Coarse platform family sharing compatibility semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PlatformFamily {
    Manylinux,
    Musllinux,
    Macosx,
}

impl PlatformFamily {
    /// Every recognized family.
    pub const ALL: [PlatformFamily; 3] = [
        PlatformFamily::Manylinux,
        PlatformFamily::Musllinux,
        PlatformFamily::Macosx,
    ];

    /// Tag prefix identifying this family.
    pub const fn prefix(self) -> &'static str {
        match self {
            PlatformFamily::Manylinux => "manylinux",
            PlatformFamily::Musllinux => "musllinux",
            PlatformFamily::Macosx => "macosx",
        }
    }
}

impl fmt::Display for PlatformFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Family + architecture key, e.g. `manylinux_armv7l`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NormalizedPlatform {
    family: PlatformFamily,
    arch: String,
}

impl NormalizedPlatform {
    pub fn new(family: PlatformFamily, arch: impl Into<String>) -> Self {
        NormalizedPlatform {
            family,
            arch: arch.into(),
        }
    }

    pub fn family(&self) -> PlatformFamily {
        self.family
    }

    pub fn arch(&self) -> &str {
        &self.arch
    }
}

impl fmt::Display for NormalizedPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.family, self.arch)
    }
}

impl Serialize for NormalizedPlatform {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Normalize a raw platform tag to its family + architecture key.
///
/// The longest matching family prefix wins; the architecture is everything
/// after the last underscore.
pub fn normalize(tag: &str) -> Result<NormalizedPlatform, UnhandledPlatformError> {
    // TODO: add win/ios/android families once a target needs them.
    let family = PlatformFamily::ALL
        .into_iter()
        .filter(|family| tag.starts_with(family.prefix()))
        .max_by_key(|family| family.prefix().len())
        .ok_or_else(|| UnhandledPlatformError {
            tag: tag.to_string(),
        })?;

    let arch = match tag.rsplit_once('_') {
        Some((_, arch)) if !arch.is_empty() => arch,
        _ => {
            return Err(UnhandledPlatformError {
                tag: tag.to_string(),
            })
        }
    };

    Ok(NormalizedPlatform::new(family, arch))
}
