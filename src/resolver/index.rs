//! Satisfaction index over published wheels.
//!
//! Maps (package, version, platform key) to the set of ABI tags already
//! published for it. Built once from a release snapshot and read-only
//! afterwards.

use std::collections::{BTreeMap, BTreeSet};

use crate::core::abi::{Abi, STABLE_ABI};
use crate::core::platform::{normalize, NormalizedPlatform};
use crate::core::release::Wheel;
use crate::core::target::Target;
use crate::core::version::Version;
use crate::core::wheel::WheelTag;
use crate::resolver::errors::ResolveError;

/// Lookup key: one package release on one platform family/architecture.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SatisfactionKey {
    pub package: String,
    pub version: Version,
    pub platform: NormalizedPlatform,
}

impl SatisfactionKey {
    pub fn new(package: impl Into<String>, version: Version, platform: NormalizedPlatform) -> Self {
        SatisfactionKey {
            package: package.into(),
            version,
            platform,
        }
    }
}

/// Published ABIs per satisfaction key.
#[derive(Debug, Clone, Default)]
pub struct SatisfactionIndex {
    published: BTreeMap<SatisfactionKey, BTreeSet<String>>,
}

impl SatisfactionIndex {
    /// Index every tag of every wheel.
    ///
    /// Fails on the first platform tag outside the known families: silently
    /// dropping it could report a build as needed or satisfied without
    /// knowing either.
    pub fn from_wheels<'a>(
        wheels: impl IntoIterator<Item = &'a Wheel>,
    ) -> Result<Self, ResolveError> {
        let mut index = SatisfactionIndex::default();
        for wheel in wheels {
            index
                .insert(wheel.package(), wheel.version(), wheel.tags())
                .map_err(|source| ResolveError::UnhandledPlatform {
                    filename: wheel.filename().to_string(),
                    source,
                })?;
        }

        tracing::debug!("satisfaction index: {} keys", index.published.len());
        Ok(index)
    }

    fn insert<'a>(
        &mut self,
        package: &str,
        version: &Version,
        tags: impl IntoIterator<Item = &'a WheelTag>,
    ) -> Result<(), crate::core::platform::UnhandledPlatformError> {
        for tag in tags {
            let key = SatisfactionKey::new(package, version.clone(), normalize(&tag.platform)?);
            self.published
                .entry(key)
                .or_default()
                .insert(tag.abi.clone());
        }
        Ok(())
    }

    /// ABI tags published for a key, if any.
    pub fn published_abis(&self, key: &SatisfactionKey) -> Option<&BTreeSet<String>> {
        self.published.get(key)
    }

    /// Whether a wheel for `abi` on `target` is already published, directly or
    /// through the stable ABI.
    pub fn is_satisfied(&self, package: &str, version: &Version, target: Target, abi: Abi) -> bool {
        let key = SatisfactionKey::new(package, version.clone(), target.normalized());
        match self.published_abis(&key) {
            Some(published) => {
                published.contains(abi.as_str())
                    || (abi.accepts_stable_abi() && published.contains(STABLE_ABI))
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.published.len()
    }

    pub fn is_empty(&self) -> bool {
        self.published.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &SatisfactionKey> {
        self.published.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::wheel;

    fn index(names: &[&str]) -> Result<SatisfactionIndex, ResolveError> {
        let wheels: Vec<Wheel> = names.iter().map(|name| wheel(name)).collect();
        SatisfactionIndex::from_wheels(&wheels)
    }

    #[test]
    fn test_collects_abis_per_key() {
        let index = index(&[
            "pkg-1.0-cp312-cp312-manylinux_2_17_armv7l.whl",
            "pkg-1.0-cp313-cp313t-manylinux_2_31_armv7l.whl",
            "pkg-1.0-cp312-cp312-macosx_11_0_universal2.whl",
        ])
        .unwrap();

        assert_eq!(index.len(), 2);
        let key = SatisfactionKey::new(
            "pkg",
            Version::parse("1.0").unwrap(),
            Target::ManylinuxArmv7l.normalized(),
        );
        let abis: Vec<&str> = index
            .published_abis(&key)
            .unwrap()
            .iter()
            .map(String::as_str)
            .collect();
        assert_eq!(abis, ["cp312", "cp313t"]);
    }

    #[test]
    fn test_order_independent() {
        let forward = index(&[
            "pkg-1.0-cp312-cp312-manylinux_2_17_armv7l.whl",
            "pkg-1.0-cp39-abi3-manylinux_2_31_armv7l.whl",
        ])
        .unwrap();
        let backward = index(&[
            "pkg-1.0-cp39-abi3-manylinux_2_31_armv7l.whl",
            "pkg-1.0-cp312-cp312-manylinux_2_17_armv7l.whl",
        ])
        .unwrap();
        assert_eq!(forward.published, backward.published);
    }

    #[test]
    fn test_abi3_satisfies_plain_cpython() {
        let index = index(&["pkg-1.0-cp39-abi3-manylinux_2_31_armv7l.whl"]).unwrap();
        let version = Version::parse("1.0").unwrap();

        for abi in Abi::ALL {
            let satisfied = index.is_satisfied("pkg", &version, Target::ManylinuxArmv7l, abi);
            assert_eq!(satisfied, abi.accepts_stable_abi(), "{abi}");
        }
        assert!(!index.is_satisfied("pkg", &version, Target::MacosxUniversal2, Abi::Cp312));
    }

    #[test]
    fn test_unhandled_platform_aborts() {
        let err = index(&[
            "pkg-1.0-cp312-cp312-manylinux_2_17_armv7l.whl",
            "pkg-1.0-cp312-cp312-windows_amd64.whl",
        ])
        .unwrap_err();

        match err {
            ResolveError::UnhandledPlatform { filename, source } => {
                assert_eq!(filename, "pkg-1.0-cp312-cp312-windows_amd64.whl");
                assert_eq!(source.tag, "windows_amd64");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
