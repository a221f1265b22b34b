//! Test utilities for wheelyard unit tests.
//!
//! Builders for release feed records so tests can describe a feed by
//! filenames alone.

pub mod fixtures;

use crate::core::release::{Asset, Release, Wheel};

// Re-export fixtures for convenience
pub use fixtures::*;

/// A well-formed asset record for `name`.
pub fn asset(name: &str) -> Asset {
    Asset {
        name: name.to_string(),
        browser_download_url: format!("https://example.invalid/{}", name),
        digest: Some(format!("sha256:{}", SHA256_A)),
        created_at: CREATED_AT.to_string(),
    }
}

/// A release holding `assets`.
pub fn release(assets: Vec<Asset>) -> Release {
    Release {
        tag_name: Some("wheels".to_string()),
        assets: Some(assets),
    }
}

/// A parsed wheel; panics on malformed filenames.
pub fn wheel(filename: &str) -> Wheel {
    Wheel::from_asset(&asset(filename))
        .unwrap_or_else(|e| panic!("bad fixture wheel `{}`: {}", filename, e))
}

/// JSON text of a feed with a single release holding `filenames`.
pub fn releases_json(filenames: &[&str]) -> String {
    let assets = filenames.iter().map(|name| asset(name)).collect();
    serde_json::to_string(&[release(assets)]).unwrap_or_else(|e| panic!("{}", e))
}
