//! Interpreter ABI identifiers.
//!
//! A requested ABI names the interpreter binary interface a wheel is built
//! against (`cp312`, `cp313t`, ...). Each known ABI carries its decomposed
//! parts so comparisons never re-parse strings.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// The literal ABI token for CPython's stable ABI.
pub const STABLE_ABI: &str = "abi3";

/// Unknown ABI in a build request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown ABI `{0}` (known: {known})", known = Abi::known_list())]
pub struct AbiError(pub String);

/// Interpreter build variant encoded as an ABI suffix.
///
/// Variants order after the plain build: `cp312` < `cp312m` < `cp312t`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AbiVariant {
    /// Regular build, no suffix.
    Default,
    /// Legacy `m` (pymalloc) suffix.
    Pymalloc,
    /// Free-threaded `t` suffix.
    FreeThreaded,
}

impl AbiVariant {
    pub fn suffix(self) -> &'static str {
        match self {
            AbiVariant::Default => "",
            AbiVariant::Pymalloc => "m",
            AbiVariant::FreeThreaded => "t",
        }
    }
}

/// Decomposed form of an ABI tag: (interpreter, major, minor, variant).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AbiParts {
    pub interpreter: &'static str,
    pub major: u8,
    pub minor: u8,
    pub variant: AbiVariant,
}

/// A known, buildable interpreter ABI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Abi {
    Cp310,
    Cp311,
    Cp312,
    Cp313,
    Cp313t,
    Cp314,
    Cp314t,
}

impl Abi {
    /// Every ABI a build can request.
    pub const ALL: [Abi; 7] = [
        Abi::Cp310,
        Abi::Cp311,
        Abi::Cp312,
        Abi::Cp313,
        Abi::Cp313t,
        Abi::Cp314,
        Abi::Cp314t,
    ];

    /// ABIs built when a request names none: every plain (non-variant) ABI.
    pub fn defaults() -> Vec<Abi> {
        Abi::ALL
            .into_iter()
            .filter(|abi| abi.parts().variant == AbiVariant::Default)
            .collect()
    }

    pub const fn parts(self) -> AbiParts {
        const fn cp(minor: u8, variant: AbiVariant) -> AbiParts {
            AbiParts {
                interpreter: "cp",
                major: 3,
                minor,
                variant,
            }
        }

        match self {
            Abi::Cp310 => cp(10, AbiVariant::Default),
            Abi::Cp311 => cp(11, AbiVariant::Default),
            Abi::Cp312 => cp(12, AbiVariant::Default),
            Abi::Cp313 => cp(13, AbiVariant::Default),
            Abi::Cp313t => cp(13, AbiVariant::FreeThreaded),
            Abi::Cp314 => cp(14, AbiVariant::Default),
            Abi::Cp314t => cp(14, AbiVariant::FreeThreaded),
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Abi::Cp310 => "cp310",
            Abi::Cp311 => "cp311",
            Abi::Cp312 => "cp312",
            Abi::Cp313 => "cp313",
            Abi::Cp313t => "cp313t",
            Abi::Cp314 => "cp314",
            Abi::Cp314t => "cp314t",
        }
    }

    /// Whether a published `abi3` wheel also serves this ABI.
    ///
    /// The stable ABI links against every CPython 3.x except the
    /// free-threaded and legacy-suffixed builds.
    pub fn accepts_stable_abi(self) -> bool {
        let parts = self.parts();
        parts.interpreter == "cp" && parts.major == 3 && parts.variant == AbiVariant::Default
    }

    fn known_list() -> String {
        Abi::ALL
            .iter()
            .map(|abi| abi.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Ord for Abi {
    fn cmp(&self, other: &Self) -> Ordering {
        self.parts().cmp(&other.parts())
    }
}

impl PartialOrd for Abi {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Abi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Abi {
    type Err = AbiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Abi::ALL
            .into_iter()
            .find(|abi| abi.as_str() == lowered)
            .ok_or_else(|| AbiError(s.to_string()))
    }
}

impl Serialize for Abi {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Abi {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known() {
        assert_eq!("cp313t".parse::<Abi>().unwrap(), Abi::Cp313t);
        assert_eq!("CP310".parse::<Abi>().unwrap(), Abi::Cp310);
    }

    #[test]
    fn test_parse_unknown() {
        let err = "cp27mu".parse::<Abi>().unwrap_err();
        assert!(err.to_string().contains("cp27mu"));
        assert!(err.to_string().contains("cp310"));
    }

    #[test]
    fn test_variant_sorts_after_plain() {
        assert!(Abi::Cp312 < Abi::Cp313);
        assert!(Abi::Cp313 < Abi::Cp313t);
        assert!(Abi::Cp313t < Abi::Cp314);
    }

    #[test]
    fn test_sort_is_idempotent() {
        let mut abis = vec![Abi::Cp314t, Abi::Cp310, Abi::Cp313t, Abi::Cp313];
        abis.sort();
        let once = abis.clone();
        abis.sort();
        assert_eq!(abis, once);
        assert_eq!(once, [Abi::Cp310, Abi::Cp313, Abi::Cp313t, Abi::Cp314t]);
    }

    #[test]
    fn test_stable_abi_compatibility() {
        assert!(Abi::Cp310.accepts_stable_abi());
        assert!(Abi::Cp314.accepts_stable_abi());
        assert!(!Abi::Cp313t.accepts_stable_abi());
        assert!(!Abi::Cp314t.accepts_stable_abi());
    }

    #[test]
    fn test_defaults_exclude_variants() {
        assert_eq!(
            Abi::defaults(),
            [Abi::Cp310, Abi::Cp311, Abi::Cp312, Abi::Cp313, Abi::Cp314]
        );
    }
}
