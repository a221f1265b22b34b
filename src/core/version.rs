//! Release version identifiers.
//!
//! Python packages are versioned under PEP 440 rather than semver, so wheel
//! filenames routinely carry versions like `2025.10.22`, `1.0rc1` or
//! `3.2.post1`. This module implements the subset of PEP 440 that release
//! assets actually use: epoch, release segments, pre/post/dev releases and
//! local labels.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Error returned when a version string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid version `{input}`: {reason}")]
pub struct VersionError {
    pub input: String,
    pub reason: &'static str,
}

/// Pre-release phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PreRelease {
    Alpha(u64),
    Beta(u64),
    Rc(u64),
}

/// One dot-separated segment of a local version label.
///
/// Alphanumeric segments sort before numeric ones.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LocalSegment {
    Text(String),
    Number(u64),
}

/// A parsed release version.
#[derive(Debug, Clone)]
pub struct Version {
    epoch: u64,
    release: Vec<u64>,
    pre: Option<PreRelease>,
    post: Option<u64>,
    dev: Option<u64>,
    local: Vec<LocalSegment>,
}

impl Version {
    /// Create a final release from its numeric segments.
    pub fn new(release: impl Into<Vec<u64>>) -> Self {
        let mut release = release.into();
        if release.is_empty() {
            release.push(0);
        }
        Version {
            epoch: 0,
            release,
            pre: None,
            post: None,
            dev: None,
            local: Vec::new(),
        }
    }

    /// Parse a version string.
    pub fn parse(s: &str) -> Result<Self, VersionError> {
        Parser::new(s).parse()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn release(&self) -> &[u64] {
        &self.release
    }

    pub fn pre(&self) -> Option<PreRelease> {
        self.pre
    }

    pub fn post(&self) -> Option<u64> {
        self.post
    }

    pub fn dev(&self) -> Option<u64> {
        self.dev
    }

    pub fn local(&self) -> &[LocalSegment] {
        &self.local
    }

    /// Release segments without trailing zeros, used for comparison and hashing.
    fn trimmed_release(&self) -> &[u64] {
        let end = self
            .release
            .iter()
            .rposition(|&n| n != 0)
            .map_or(0, |i| i + 1);
        &self.release[..end]
    }

    fn pre_key(&self) -> PhaseKey<PreRelease> {
        match (self.pre, self.post, self.dev) {
            // A bare dev release (1.0.dev1) sorts before 1.0a1.
            (None, None, Some(_)) => PhaseKey::Before,
            (None, _, _) => PhaseKey::After,
            (Some(pre), _, _) => PhaseKey::At(pre),
        }
    }

    fn post_key(&self) -> PhaseKey<u64> {
        self.post.map_or(PhaseKey::Before, PhaseKey::At)
    }

    fn dev_key(&self) -> PhaseKey<u64> {
        self.dev.map_or(PhaseKey::After, PhaseKey::At)
    }
}

/// Sentinel-wrapped ordering key for optional version phases.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum PhaseKey<T> {
    Before,
    At(T),
    After,
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.epoch
            .cmp(&other.epoch)
            .then_with(|| self.trimmed_release().cmp(other.trimmed_release()))
            .then_with(|| self.pre_key().cmp(&other.pre_key()))
            .then_with(|| self.post_key().cmp(&other.post_key()))
            .then_with(|| self.dev_key().cmp(&other.dev_key()))
            .then_with(|| self.local.cmp(&other.local))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.epoch.hash(state);
        self.trimmed_release().hash(state);
        self.pre.hash(state);
        self.post.hash(state);
        self.dev.hash(state);
        self.local.hash(state);
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.epoch != 0 {
            write!(f, "{}!", self.epoch)?;
        }

        let release: Vec<String> = self.release.iter().map(u64::to_string).collect();
        write!(f, "{}", release.join("."))?;

        match self.pre {
            Some(PreRelease::Alpha(n)) => write!(f, "a{}", n)?,
            Some(PreRelease::Beta(n)) => write!(f, "b{}", n)?,
            Some(PreRelease::Rc(n)) => write!(f, "rc{}", n)?,
            None => {}
        }
        if let Some(post) = self.post {
            write!(f, ".post{}", post)?;
        }
        if let Some(dev) = self.dev {
            write!(f, ".dev{}", dev)?;
        }

        if !self.local.is_empty() {
            let local: Vec<String> = self
                .local
                .iter()
                .map(|segment| match segment {
                    LocalSegment::Text(s) => s.clone(),
                    LocalSegment::Number(n) => n.to_string(),
                })
                .collect();
            write!(f, "+{}", local.join("."))?;
        }

        Ok(())
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Version::parse(s)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Version::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Hand-written scanner over the lower-cased input.
struct Parser<'a> {
    input: &'a str,
    lowered: String,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Parser {
            input,
            lowered: input.trim().to_ascii_lowercase(),
            pos: 0,
        }
    }

    fn error(&self, reason: &'static str) -> VersionError {
        VersionError {
            input: self.input.to_string(),
            reason,
        }
    }

    fn rest(&self) -> &str {
        &self.lowered[self.pos..]
    }

    fn eat(&mut self, prefix: &str) -> bool {
        if self.rest().starts_with(prefix) {
            self.pos += prefix.len();
            true
        } else {
            false
        }
    }

    fn eat_separator(&mut self) -> bool {
        self.eat(".") || self.eat("-") || self.eat("_")
    }

    fn number(&mut self) -> Option<u64> {
        let digits = self.rest().bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 {
            return None;
        }
        let value = self.rest()[..digits].parse().ok()?;
        self.pos += digits;
        Some(value)
    }

    /// Numeric suffix of a phase; an implicit number is zero.
    fn phase_number(&mut self) -> u64 {
        let save = self.pos;
        self.eat_separator();
        match self.number() {
            Some(n) => n,
            None => {
                self.pos = save;
                0
            }
        }
    }

    fn parse(mut self) -> Result<Version, VersionError> {
        if self.lowered.is_empty() {
            return Err(self.error("empty version"));
        }

        self.eat("v");

        let first = self.number().ok_or_else(|| self.error("expected a number"))?;
        let (epoch, mut release) = if self.eat("!") {
            let n = self
                .number()
                .ok_or_else(|| self.error("expected release after epoch"))?;
            (first, vec![n])
        } else {
            (0, vec![first])
        };

        loop {
            let save = self.pos;
            if self.eat(".") {
                if let Some(n) = self.number() {
                    release.push(n);
                    continue;
                }
            }
            self.pos = save;
            break;
        }

        let pre = self.parse_pre();
        let post = self.parse_post();
        let dev = self.parse_dev();
        let local = self.parse_local()?;

        if !self.rest().is_empty() {
            return Err(self.error("unexpected trailing characters"));
        }

        Ok(Version {
            epoch,
            release,
            pre,
            post,
            dev,
            local,
        })
    }

    fn parse_pre(&mut self) -> Option<PreRelease> {
        let save = self.pos;
        self.eat_separator();

        // Longest spellings first so `alpha` is not read as `a` + `lpha`.
        const SPELLINGS: &[(&str, fn(u64) -> PreRelease)] = &[
            ("alpha", PreRelease::Alpha),
            ("beta", PreRelease::Beta),
            ("preview", PreRelease::Rc),
            ("pre", PreRelease::Rc),
            ("rc", PreRelease::Rc),
            ("a", PreRelease::Alpha),
            ("b", PreRelease::Beta),
            ("c", PreRelease::Rc),
        ];

        for (spelling, make) in SPELLINGS {
            if self.eat(spelling) {
                return Some(make(self.phase_number()));
            }
        }

        self.pos = save;
        None
    }

    fn parse_post(&mut self) -> Option<u64> {
        let save = self.pos;

        // Implicit post release: `1.0-1`.
        if self.eat("-") {
            if let Some(n) = self.number() {
                return Some(n);
            }
            self.pos = save;
        }

        self.eat_separator();
        for spelling in ["post", "rev", "r"] {
            if self.eat(spelling) {
                return Some(self.phase_number());
            }
        }

        self.pos = save;
        None
    }

    fn parse_dev(&mut self) -> Option<u64> {
        let save = self.pos;
        self.eat_separator();
        if self.eat("dev") {
            return Some(self.phase_number());
        }
        self.pos = save;
        None
    }

    fn parse_local(&mut self) -> Result<Vec<LocalSegment>, VersionError> {
        if !self.eat("+") {
            return Ok(Vec::new());
        }

        let label = self.rest().to_string();
        self.pos = self.lowered.len();

        label
            .split(['.', '-', '_'])
            .map(|segment| {
                if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_alphanumeric()) {
                    Err(self.error("invalid local version label"))
                } else if let Ok(n) = segment.parse() {
                    Ok(LocalSegment::Number(n))
                } else {
                    Ok(LocalSegment::Text(segment.to_string()))
                }
            })
            .collect()
    }
}
