//! Execution plan generation.
//!
//! An ExecutionPlan groups missing wheels so that each repository revision is
//! checked out once and the build tool runs once per (revision, target):
//!
//! ```text
//! BuildGroup (package, repository)
//!   Build (version, revision)
//!     BuildPass (target, [abi, ...])
//! ```

use serde::Serialize;

use crate::core::abi::Abi;
use crate::core::matrix::{Repository, Revision};
use crate::core::target::Target;
use crate::core::version::Version;
use crate::resolver::gaps::GapUnit;

/// A complete execution plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExecutionPlan {
    /// Groups in (package, repository) order
    pub groups: Vec<BuildGroup>,
}

/// All builds for one package from one repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildGroup {
    pub package: String,
    pub repository: Repository,
    /// Builds in (version, revision) order; never empty
    pub builds: Vec<Build>,
}

/// One checkout of a revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Build {
    pub version: Version,
    pub revision: Revision,
    /// Passes in target order; never empty
    pub passes: Vec<BuildPass>,
}

/// One build tool invocation for a target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildPass {
    pub target: Target,
    /// Sorted and duplicate-free; never empty
    pub abis: Vec<Abi>,
}

impl ExecutionPlan {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of checkouts the plan needs.
    pub fn build_count(&self) -> usize {
        self.groups.iter().map(|g| g.builds.len()).sum()
    }

    /// Number of build tool invocations the plan needs.
    pub fn pass_count(&self) -> usize {
        self.groups
            .iter()
            .flat_map(|g| &g.builds)
            .map(|b| b.passes.len())
            .sum()
    }

    /// Number of wheels the plan produces.
    pub fn wheel_count(&self) -> usize {
        self.groups
            .iter()
            .flat_map(|g| &g.builds)
            .flat_map(|b| &b.passes)
            .map(|p| p.abis.len())
            .sum()
    }
}

/// Fold gap units into an execution plan.
///
/// Units are sorted once by (package, repository, version, revision, target,
/// abi) and then appended to the tree in a single pass: a new group, build or
/// pass starts exactly when its key differs from the previous unit's.
pub fn group_gaps(mut gaps: Vec<GapUnit>) -> ExecutionPlan {
    gaps.sort_by(|a, b| {
        (&a.package, &a.repository, &a.version, &a.revision, a.target, a.abi).cmp(&(
            &b.package,
            &b.repository,
            &b.version,
            &b.revision,
            b.target,
            b.abi,
        ))
    });

    let mut plan = ExecutionPlan::default();

    for gap in gaps {
        let new_group = plan
            .groups
            .last()
            .map_or(true, |g| g.package != gap.package || g.repository != gap.repository);
        if new_group {
            plan.groups.push(BuildGroup {
                package: gap.package.clone(),
                repository: gap.repository.clone(),
                builds: Vec::new(),
            });
        }
        let group = last(&mut plan.groups);

        let new_build = group
            .builds
            .last()
            .map_or(true, |b| b.version != gap.version || b.revision != gap.revision);
        if new_build {
            group.builds.push(Build {
                version: gap.version.clone(),
                revision: gap.revision.clone(),
                passes: Vec::new(),
            });
        }
        let build = last(&mut group.builds);

        match build.passes.last_mut() {
            Some(pass) if pass.target == gap.target => {
                // Sorted input: a duplicate can only be the last ABI.
                if pass.abis.last() != Some(&gap.abi) {
                    pass.abis.push(gap.abi);
                }
            }
            _ => build.passes.push(BuildPass {
                target: gap.target,
                abis: vec![gap.abi],
            }),
        }
    }

    plan
}

/// Last element of a list that was just pushed to.
fn last<T>(items: &mut [T]) -> &mut T {
    let index = items.len() - 1;
    &mut items[index]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{REVISION_A, REVISION_B};

    fn gap(package: &str, version: &str, revision: &str, target: Target, abi: Abi) -> GapUnit {
        GapUnit {
            package: package.to_string(),
            repository: Repository::parse(&format!("example/{}", package)).unwrap(),
            revision: Revision::parse(revision).unwrap(),
            version: Version::parse(version).unwrap(),
            target,
            abi,
        }
    }

    #[test]
    fn test_empty() {
        let plan = group_gaps(Vec::new());
        assert!(plan.is_empty());
        assert_eq!(plan.wheel_count(), 0);
    }

    #[test]
    fn test_abis_merge_into_one_pass() {
        let plan = group_gaps(vec![
            gap("pkg", "1.0", REVISION_A, Target::ManylinuxArmv7l, Abi::Cp313t),
            gap("pkg", "1.0", REVISION_A, Target::ManylinuxArmv7l, Abi::Cp310),
            gap("pkg", "1.0", REVISION_A, Target::ManylinuxArmv7l, Abi::Cp313),
            gap("pkg", "1.0", REVISION_A, Target::ManylinuxArmv7l, Abi::Cp310),
        ]);

        assert_eq!(plan.groups.len(), 1);
        assert_eq!(plan.build_count(), 1);
        assert_eq!(plan.pass_count(), 1);
        let pass = &plan.groups[0].builds[0].passes[0];
        assert_eq!(pass.abis, [Abi::Cp310, Abi::Cp313, Abi::Cp313t]);
    }

    #[test]
    fn test_nesting_and_order() {
        let plan = group_gaps(vec![
            gap("zeta", "1.0", REVISION_A, Target::MacosxUniversal2, Abi::Cp312),
            gap("alpha", "2.0", REVISION_B, Target::MacosxUniversal2, Abi::Cp312),
            gap("alpha", "1.0", REVISION_A, Target::MacosxUniversal2, Abi::Cp311),
            gap("alpha", "1.0", REVISION_A, Target::ManylinuxArmv7l, Abi::Cp311),
            gap("alpha", "1.0", REVISION_B, Target::ManylinuxArmv7l, Abi::Cp311),
        ]);

        let packages: Vec<&str> = plan.groups.iter().map(|g| g.package.as_str()).collect();
        assert_eq!(packages, ["alpha", "zeta"]);

        let alpha = &plan.groups[0];
        let builds: Vec<(String, &str)> = alpha
            .builds
            .iter()
            .map(|b| (b.version.to_string(), b.revision.as_str()))
            .collect();
        assert_eq!(
            builds,
            [
                ("1.0".to_string(), REVISION_A),
                ("1.0".to_string(), REVISION_B),
                ("2.0".to_string(), REVISION_B),
            ]
        );

        let targets: Vec<Target> = alpha.builds[0].passes.iter().map(|p| p.target).collect();
        assert_eq!(targets, [Target::MacosxUniversal2, Target::ManylinuxArmv7l]);
    }

    #[test]
    fn test_versions_order_numerically() {
        let plan = group_gaps(vec![
            gap("pkg", "1.10", REVISION_A, Target::ManylinuxArmv7l, Abi::Cp312),
            gap("pkg", "1.9", REVISION_A, Target::ManylinuxArmv7l, Abi::Cp312),
        ]);
        let versions: Vec<String> = plan.groups[0]
            .builds
            .iter()
            .map(|b| b.version.to_string())
            .collect();
        assert_eq!(versions, ["1.9", "1.10"]);
    }

    #[test]
    fn test_no_unit_lost_or_duplicated() {
        let mut gaps = Vec::new();
        for (version, revision) in [("1.0", REVISION_A), ("2.0", REVISION_B)] {
            for target in Target::ALL {
                for abi in Abi::ALL {
                    gaps.push(gap("pkg", version, revision, target, abi));
                }
            }
        }
        let total = gaps.len();
        let mut shuffled = gaps.clone();
        shuffled.reverse();
        shuffled.extend(gaps.iter().take(5).cloned());

        let plan = group_gaps(shuffled);
        assert_eq!(plan.wheel_count(), total);
        // One pass per distinct (package, repository, version, revision, target).
        assert_eq!(plan.pass_count(), 2 * Target::ALL.len());
        assert_eq!(plan, group_gaps(gaps));
    }

    #[test]
    fn test_plan_serializes() {
        let plan = group_gaps(vec![gap(
            "pkg",
            "1.0",
            REVISION_A,
            Target::ManylinuxArmv7l,
            Abi::Cp313t,
        )]);
        let json = serde_json::to_value(&plan).unwrap();
        let pass = &json["groups"][0]["builds"][0]["passes"][0];
        assert_eq!(pass["target"], "manylinux_armv7l");
        assert_eq!(pass["abis"][0], "cp313t");
        assert_eq!(json["groups"][0]["builds"][0]["version"], "1.0");
    }
}
