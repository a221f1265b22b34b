//! Published release assets.
//!
//! The release feed is the JSON returned by the GitHub releases API: a list
//! of releases, each with zero or more assets. Only wheel assets matter
//! here. A single bad asset never blocks the rest of the feed; it is logged,
//! recorded in [`ReleaseSnapshot::skipped`] and left out.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::ordering::{self, tag_sort_keys, TagSortKey};
use crate::core::version::Version;
use crate::core::wheel::{MalformedArtifactError, WheelFilename, WheelTag, WHEEL_SUFFIX};
use crate::util::hash::{Digest, DigestError};

/// A release object from the feed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Release {
    #[serde(default)]
    pub tag_name: Option<String>,

    /// GitHub sends `null` for releases without uploads.
    #[serde(default)]
    pub assets: Option<Vec<Asset>>,
}

/// A release asset record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Asset {
    /// Artifact filename
    pub name: String,

    /// Public download URL
    pub browser_download_url: String,

    /// `algorithm:hexdigest`; older assets have none
    #[serde(default)]
    pub digest: Option<String>,

    /// ISO-8601 upload timestamp
    pub created_at: String,
}

/// Why a single asset was left out of the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecoverableDataError {
    #[error("asset has no digest")]
    MissingDigest,

    #[error(transparent)]
    Digest(#[from] DigestError),

    #[error(transparent)]
    Malformed(#[from] MalformedArtifactError),

    #[error("invalid timestamp `{value}`: {reason}")]
    Timestamp { value: String, reason: String },
}

/// An asset that was skipped while building a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedAsset {
    pub name: String,
    pub reason: RecoverableDataError,
}

/// A published wheel with its parsed metadata.
#[derive(Debug, Clone)]
pub struct Wheel {
    filename: String,
    url: String,
    digest: Digest,
    created_at: DateTime<Utc>,
    parsed: WheelFilename,
    sort_keys: Vec<TagSortKey>,
}

impl Wheel {
    /// Build a wheel from an asset record.
    pub fn from_asset(asset: &Asset) -> Result<Self, RecoverableDataError> {
        let digest = asset
            .digest
            .as_deref()
            .ok_or(RecoverableDataError::MissingDigest)?;
        let digest = Digest::parse(digest)?;

        let created_at = DateTime::parse_from_rfc3339(&asset.created_at)
            .map_err(|e| RecoverableDataError::Timestamp {
                value: asset.created_at.clone(),
                reason: e.to_string(),
            })?
            .with_timezone(&Utc);

        Wheel::new(
            &asset.name,
            &asset.browser_download_url,
            digest,
            created_at,
        )
        .map_err(RecoverableDataError::from)
    }

    pub fn new(
        filename: &str,
        url: &str,
        digest: Digest,
        created_at: DateTime<Utc>,
    ) -> Result<Self, MalformedArtifactError> {
        let parsed = WheelFilename::parse(filename)?;
        let sort_keys = tag_sort_keys(&parsed.tags);
        Ok(Wheel {
            filename: filename.to_string(),
            url: url.to_string(),
            digest,
            created_at,
            parsed,
            sort_keys,
        })
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn digest(&self) -> &Digest {
        &self.digest
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Canonical package name.
    pub fn package(&self) -> &str {
        &self.parsed.package
    }

    pub fn version(&self) -> &Version {
        &self.parsed.version
    }

    pub fn tags(&self) -> &BTreeSet<WheelTag> {
        &self.parsed.tags
    }

    pub fn sort_keys(&self) -> &[TagSortKey] {
        &self.sort_keys
    }
}

/// All wheels known from a release feed, grouped by package.
#[derive(Debug, Clone, Default)]
pub struct ReleaseSnapshot {
    packages: BTreeMap<String, Vec<Wheel>>,
    skipped: Vec<SkippedAsset>,
}

impl ReleaseSnapshot {
    /// Parse a release feed, skipping (and logging) assets that cannot be used.
    pub fn from_releases(releases: &[Release]) -> Self {
        let mut snapshot = ReleaseSnapshot::default();

        for release in releases {
            for asset in release.assets.iter().flatten() {
                if !asset.name.ends_with(WHEEL_SUFFIX) {
                    continue;
                }

                match Wheel::from_asset(asset) {
                    Ok(wheel) => snapshot.insert(wheel),
                    Err(reason) => {
                        tracing::warn!("skipping asset `{}`: {}", asset.name, reason);
                        snapshot.skipped.push(SkippedAsset {
                            name: asset.name.clone(),
                            reason,
                        });
                    }
                }
            }
        }

        for wheels in snapshot.packages.values_mut() {
            ordering::sort_listing(wheels);
        }

        tracing::debug!(
            "release snapshot: {} packages, {} wheels, {} skipped",
            snapshot.packages.len(),
            snapshot.wheels().count(),
            snapshot.skipped.len()
        );

        snapshot
    }

    /// Parse a release feed from its JSON text.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let releases: Vec<Release> = serde_json::from_str(json)?;
        Ok(ReleaseSnapshot::from_releases(&releases))
    }

    fn insert(&mut self, wheel: Wheel) {
        self.packages
            .entry(wheel.package().to_string())
            .or_default()
            .push(wheel);
    }

    /// Wheels per package, each list in listing order.
    pub fn packages(&self) -> &BTreeMap<String, Vec<Wheel>> {
        &self.packages
    }

    /// All wheels, in listing order.
    pub fn wheels(&self) -> impl Iterator<Item = &Wheel> {
        self.packages.values().flatten()
    }

    pub fn skipped(&self) -> &[SkippedAsset] {
        &self.skipped
    }

    /// Latest published version per package.
    pub fn latest_versions(&self) -> BTreeMap<String, Version> {
        ordering::latest_versions(self.wheels())
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{asset, release, SHA256_A};

    #[test]
    fn test_snapshot_groups_by_package() {
        let releases = vec![
            release(vec![
                asset("Foo_Bar-1.0-cp312-cp312-macosx_11_0_universal2.whl"),
                asset("foo_bar-2.0-cp312-cp312-macosx_11_0_universal2.whl"),
            ]),
            release(vec![asset("other-0.1-cp39-abi3-manylinux_2_31_armv7l.whl")]),
        ];

        let snapshot = ReleaseSnapshot::from_releases(&releases);
        assert!(snapshot.skipped().is_empty());
        assert_eq!(snapshot.packages().len(), 2);

        let foo = &snapshot.packages()["foo-bar"];
        assert_eq!(foo[0].version().to_string(), "2.0");
        assert_eq!(snapshot.latest_versions()["foo-bar"].to_string(), "2.0");
    }

    #[test]
    fn test_non_wheel_assets_are_ignored() {
        let releases = vec![release(vec![asset("foo-1.0.tar.gz")])];
        let snapshot = ReleaseSnapshot::from_releases(&releases);
        assert!(snapshot.is_empty());
        assert!(snapshot.skipped().is_empty());
    }

    #[test]
    fn test_bad_assets_are_skipped() {
        let mut unsupported = asset("foo-1.0-cp312-cp312-macosx_11_0_universal2.whl");
        unsupported.digest = Some("crc32:deadbeef".to_string());
        let mut missing = asset("foo-1.1-cp312-cp312-macosx_11_0_universal2.whl");
        missing.digest = None;
        let mut late = asset("foo-1.2-cp312-cp312-macosx_11_0_universal2.whl");
        late.created_at = "yesterday".to_string();

        let releases = vec![release(vec![
            unsupported,
            missing,
            late,
            asset("foo-notaversion-cp312-cp312-macosx_11_0_universal2.whl"),
            asset("foo-2.0-cp312-cp312-macosx_11_0_universal2.whl"),
        ])];

        let snapshot = ReleaseSnapshot::from_releases(&releases);
        assert_eq!(snapshot.skipped().len(), 4);
        assert_eq!(snapshot.wheels().count(), 1);
        assert!(matches!(
            snapshot.skipped()[0].reason,
            RecoverableDataError::Digest(DigestError::UnsupportedAlgorithm(_))
        ));
        assert_eq!(
            snapshot.skipped()[1].reason,
            RecoverableDataError::MissingDigest
        );
        assert!(matches!(
            snapshot.skipped()[2].reason,
            RecoverableDataError::Timestamp { .. }
        ));
        assert!(matches!(
            snapshot.skipped()[3].reason,
            RecoverableDataError::Malformed(_)
        ));
    }

    #[test]
    fn test_from_json_handles_null_assets() {
        let json = format!(
            r#"[
                {{"tag_name": "empty", "assets": null}},
                {{"tag_name": "v1", "assets": [{{
                    "name": "pkg-1.0-cp312-cp312-macosx_11_0_universal2.whl",
                    "browser_download_url": "https://example.invalid/pkg.whl",
                    "digest": "sha256:{}",
                    "created_at": "2025-01-02T03:04:05Z"
                }}]}}
            ]"#,
            SHA256_A
        );

        let snapshot = ReleaseSnapshot::from_json(&json).unwrap();
        let wheel = snapshot.wheels().next().unwrap();
        assert_eq!(wheel.digest().hex(), SHA256_A);
        assert_eq!(wheel.created_at().to_rfc3339(), "2025-01-02T03:04:05+00:00");
    }
}
