//! Hash algorithms and hex digests.
//!
//! Release assets advertise their content hash as `algorithm:hexdigest`, and
//! git revisions are SHA-1 or SHA-256 object names. Both are validated here
//! against the digest length of the named algorithm.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use sha2::{Digest as _, Sha224, Sha256, Sha384, Sha512};
use thiserror::Error;

/// Digest parsing error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DigestError {
    #[error("digest `{0}` is not of the form `algorithm:hexdigest`")]
    Format(String),

    #[error("unsupported hash algorithm `{0}`")]
    UnsupportedAlgorithm(String),

    #[error("{algorithm} digest must be {expected} hex characters, found `{digest}`")]
    InvalidDigest {
        algorithm: HashAlgorithm,
        expected: usize,
        digest: String,
    },
}

/// A recognized hash algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HashAlgorithm {
    Md5,
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithm {
    pub const fn as_str(self) -> &'static str {
        match self {
            HashAlgorithm::Md5 => "md5",
            HashAlgorithm::Sha1 => "sha1",
            HashAlgorithm::Sha224 => "sha224",
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha384 => "sha384",
            HashAlgorithm::Sha512 => "sha512",
        }
    }

    /// Digest size in bytes.
    pub fn digest_len(self) -> usize {
        match self {
            HashAlgorithm::Md5 => 16,
            HashAlgorithm::Sha1 => 20,
            HashAlgorithm::Sha224 => Sha224::output_size(),
            HashAlgorithm::Sha256 => Sha256::output_size(),
            HashAlgorithm::Sha384 => Sha384::output_size(),
            HashAlgorithm::Sha512 => Sha512::output_size(),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HashAlgorithm {
    type Err = DigestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "md5" => Ok(HashAlgorithm::Md5),
            "sha1" => Ok(HashAlgorithm::Sha1),
            "sha224" => Ok(HashAlgorithm::Sha224),
            "sha256" => Ok(HashAlgorithm::Sha256),
            "sha384" => Ok(HashAlgorithm::Sha384),
            "sha512" => Ok(HashAlgorithm::Sha512),
            other => Err(DigestError::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

/// Whether `s` is hex-encoded and exactly `len` bytes long once decoded.
pub fn is_hex_digest(s: &str, len: usize) -> bool {
    s.len() == len * 2 && hex::decode(s).is_ok()
}

/// A content digest with its algorithm.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Digest {
    algorithm: HashAlgorithm,
    hex: String,
}

impl Digest {
    pub fn new(algorithm: HashAlgorithm, hex: &str) -> Result<Self, DigestError> {
        let expected = algorithm.digest_len();
        if !is_hex_digest(hex, expected) {
            return Err(DigestError::InvalidDigest {
                algorithm,
                expected: expected * 2,
                digest: hex.to_string(),
            });
        }
        Ok(Digest {
            algorithm,
            hex: hex.to_ascii_lowercase(),
        })
    }

    /// Parse the `algorithm:hexdigest` form used by the release API.
    pub fn parse(s: &str) -> Result<Self, DigestError> {
        let (algorithm, hex) = s
            .split_once(':')
            .ok_or_else(|| DigestError::Format(s.to_string()))?;
        Digest::new(algorithm.parse()?, hex)
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    pub fn hex(&self) -> &str {
        &self.hex
    }

    /// The `algorithm=hexdigest` form package indexes put in URL fragments.
    pub fn fragment(&self) -> String {
        format!("{}={}", self.algorithm, self.hex)
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.hex)
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HELLO_SHA256: &str = "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824";

    #[test]
    fn test_parse_digest() {
        let digest = Digest::parse(&format!("sha256:{}", HELLO_SHA256)).unwrap();
        assert_eq!(digest.algorithm(), HashAlgorithm::Sha256);
        assert_eq!(digest.fragment(), format!("sha256={}", HELLO_SHA256));
    }

    #[test]
    fn test_digest_lengths() {
        assert_eq!(HashAlgorithm::Sha256.digest_len(), 32);
        assert_eq!(HashAlgorithm::Sha512.digest_len(), 64);
        assert!(matches!(
            Digest::parse("sha256:abcd"),
            Err(DigestError::InvalidDigest { expected: 64, .. })
        ));
    }

    #[test]
    fn test_unsupported_algorithm() {
        assert_eq!(
            Digest::parse("crc32:deadbeef"),
            Err(DigestError::UnsupportedAlgorithm("crc32".to_string()))
        );
        assert!(matches!(Digest::parse("deadbeef"), Err(DigestError::Format(_))));
    }

    #[test]
    fn test_is_hex_digest() {
        assert!(is_hex_digest(&"a".repeat(40), 20));
        assert!(!is_hex_digest(&"g".repeat(40), 20));
        assert!(!is_hex_digest(&"a".repeat(41), 20));
    }
}
