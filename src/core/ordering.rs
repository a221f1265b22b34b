//! Listing order for published wheels.
//!
//! Wheels are listed by package name ascending, then version descending (the
//! newest release first), then by the sorted set of their interpreter tag
//! keys so that output is deterministic. The "latest" version of a package
//! is the version of its first wheel in this order.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::core::release::Wheel;
use crate::core::version::Version;
use crate::core::wheel::{InterpreterTag, WheelTag};

/// Per-tag sort key: (interpreter family, major, minor, variant).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TagSortKey {
    pub family: String,
    pub major: u32,
    pub minor: Option<u32>,
    pub variant: String,
}

impl From<&InterpreterTag> for TagSortKey {
    fn from(tag: &InterpreterTag) -> Self {
        TagSortKey {
            family: tag.family.clone(),
            major: tag.major,
            minor: tag.minor,
            variant: tag.variant.clone(),
        }
    }
}

/// Sorted, de-duplicated sort keys for a tag set.
pub fn tag_sort_keys<'a>(tags: impl IntoIterator<Item = &'a WheelTag>) -> Vec<TagSortKey> {
    let mut keys: Vec<TagSortKey> = tags
        .into_iter()
        .map(|tag| TagSortKey::from(&tag.interpreter))
        .collect();
    keys.sort();
    keys.dedup();
    keys
}

/// Total order used for release listings.
pub fn compare_listing(a: &Wheel, b: &Wheel) -> Ordering {
    a.package()
        .cmp(b.package())
        .then_with(|| b.version().cmp(a.version()))
        .then_with(|| a.sort_keys().cmp(b.sort_keys()))
}

/// Sort wheels into listing order.
pub fn sort_listing(wheels: &mut [Wheel]) {
    wheels.sort_by(compare_listing);
}

/// Latest version per package.
pub fn latest_versions<'a>(
    wheels: impl IntoIterator<Item = &'a Wheel>,
) -> BTreeMap<String, Version> {
    let mut latest: BTreeMap<String, Version> = BTreeMap::new();
    for wheel in wheels {
        match latest.get_mut(wheel.package()) {
            Some(current) if *current >= *wheel.version() => {}
            Some(current) => *current = wheel.version().clone(),
            None => {
                latest.insert(wheel.package().to_string(), wheel.version().clone());
            }
        }
    }
    latest
}
