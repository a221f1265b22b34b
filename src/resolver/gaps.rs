//! Gap resolution: desired builds minus published wheels.

use serde::Serialize;

use crate::core::abi::Abi;
use crate::core::matrix::{BuildMatrix, DesiredEntry, Repository, Revision};
use crate::core::release::ReleaseSnapshot;
use crate::core::target::Target;
use crate::core::version::Version;
use crate::resolver::errors::ResolveError;
use crate::resolver::index::SatisfactionIndex;

/// One wheel that is wanted but not published.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct GapUnit {
    pub package: String,
    pub repository: Repository,
    pub revision: Revision,
    pub version: Version,
    pub target: Target,
    pub abi: Abi,
}

/// Every (target, ABI) pair of every entry that the index does not satisfy,
/// in matrix order.
pub fn resolve_gaps(entries: &[DesiredEntry], index: &SatisfactionIndex) -> Vec<GapUnit> {
    let mut gaps = Vec::new();

    for entry in entries {
        for &target in &entry.targets {
            for &abi in &entry.abis {
                if index.is_satisfied(&entry.package, &entry.version, target, abi) {
                    tracing::debug!(
                        "{} {} {}-{}: published",
                        entry.package,
                        entry.version,
                        abi,
                        target
                    );
                    continue;
                }

                gaps.push(GapUnit {
                    package: entry.package.clone(),
                    repository: entry.repository.clone(),
                    revision: entry.revision.clone(),
                    version: entry.version.clone(),
                    target,
                    abi,
                });
            }
        }
    }

    gaps
}

/// Validate the matrix, index the snapshot and list what is missing.
///
/// The matrix is validated in full before the snapshot is looked at, so a
/// bad entry is reported even when the feed is also unusable.
pub fn find_gaps(
    matrix: &BuildMatrix,
    snapshot: &ReleaseSnapshot,
) -> Result<Vec<GapUnit>, ResolveError> {
    let entries = matrix.desired_entries()?;
    let index = SatisfactionIndex::from_wheels(snapshot.wheels())?;
    let gaps = resolve_gaps(&entries, &index);

    tracing::info!(
        "{} desired entries, {} missing wheels",
        entries.len(),
        gaps.len()
    );
    Ok(gaps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::matrix::MatrixError;
    use crate::core::release::Wheel;
    use crate::test_support::{asset, release, wheel, REVISION_A, SAMPLE_MATRIX};

    fn entries() -> Vec<DesiredEntry> {
        BuildMatrix::from_toml(SAMPLE_MATRIX)
            .unwrap()
            .desired_entries()
            .unwrap()
    }

    fn index(names: &[&str]) -> SatisfactionIndex {
        let wheels: Vec<Wheel> = names.iter().map(|name| wheel(name)).collect();
        SatisfactionIndex::from_wheels(&wheels).unwrap()
    }

    #[test]
    fn test_stable_abi_leaves_free_threaded_gap() {
        let entries = &entries()[..1];
        let index = index(&["pkg_a-1.0-cp39-abi3-manylinux_2_31_armv7l.whl"]);

        let gaps = resolve_gaps(entries, &index);
        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps[0].package, "pkg-a");
        assert_eq!(gaps[0].target, Target::ManylinuxArmv7l);
        assert_eq!(gaps[0].abi, Abi::Cp313t);
        assert_eq!(gaps[0].revision.as_str(), REVISION_A);
    }

    #[test]
    fn test_nothing_published_means_everything_missing() {
        let entries = entries();
        let gaps = resolve_gaps(&entries, &SatisfactionIndex::default());

        let expected: usize = entries.iter().map(|e| e.targets.len() * e.abis.len()).sum();
        assert_eq!(gaps.len(), expected);
    }

    #[test]
    fn test_exact_abi_match_on_other_platform_version() {
        let entries = &entries()[..1];
        // manylinux_2_17 and manylinux_2_31 share a key.
        let index = index(&[
            "pkg_a-1.0-cp310-cp310-manylinux_2_17_armv7l.whl",
            "pkg_a-1.0-cp311-cp311-manylinux_2_17_armv7l.whl",
            "pkg_a-1.0-cp313-cp313t-manylinux_2_17_armv7l.whl",
        ]);
        assert!(resolve_gaps(entries, &index).is_empty());
    }

    #[test]
    fn test_other_version_does_not_satisfy() {
        let entries = &entries()[..1];
        let index = index(&["pkg_a-1.0.1-cp39-abi3-manylinux_2_31_armv7l.whl"]);
        assert_eq!(resolve_gaps(entries, &index).len(), 3);
    }

    #[test]
    fn test_gaps_are_unsatisfied_subset_of_desired() {
        let entries = entries();
        let index = index(&[
            "pkg_a-2.0-cp312-cp312-manylinux_2_31_armv7l.whl",
            "pkg_a-2.0-cp39-abi3-macosx_11_0_universal2.whl",
        ]);

        for gap in resolve_gaps(&entries, &index) {
            let entry = entries
                .iter()
                .find(|e| e.version == gap.version)
                .unwrap();
            assert!(entry.targets.contains(&gap.target));
            assert!(entry.abis.contains(&gap.abi));
            assert!(!index.is_satisfied(&gap.package, &gap.version, gap.target, gap.abi));
        }
    }

    #[test]
    fn test_matrix_errors_come_first() {
        let mut matrix = BuildMatrix::from_toml(SAMPLE_MATRIX).unwrap();
        matrix.build[0].builds[0].targets = vec!["windows_amd64".to_string()];
        let snapshot = ReleaseSnapshot::from_releases(&[release(vec![asset(
            "pkg_a-1.0-cp312-cp312-win_amd64.whl",
        )])]);

        let err = find_gaps(&matrix, &snapshot).unwrap_err();
        assert!(matches!(
            err,
            ResolveError::Matrix(MatrixError::UnknownTarget { .. })
        ));
    }

    #[test]
    fn test_unhandled_published_platform_is_fatal() {
        let matrix = BuildMatrix::from_toml(SAMPLE_MATRIX).unwrap();
        let snapshot = ReleaseSnapshot::from_releases(&[release(vec![asset(
            "pkg_a-1.0-cp312-cp312-win_amd64.whl",
        )])]);

        let err = find_gaps(&matrix, &snapshot).unwrap_err();
        assert!(matches!(err, ResolveError::UnhandledPlatform { .. }));
    }
}
