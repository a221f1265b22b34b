//! Release feed from the GitHub REST API.

use std::sync::LazyLock;

use anyhow::{anyhow, bail, Context, Result};
use regex::Regex;

use crate::core::release::Release;
use crate::util::config::NetConfig;

/// Media type requested from the API.
pub const ACCEPT: &str = "application/vnd.github+json";

/// Pinned REST API version.
pub const API_VERSION: &str = "2022-11-28";

/// Environment variable holding an optional API token.
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Releases per page; only the first page is read.
const PER_PAGE: u32 = 100;

static SLUG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:https://github\.com/|ssh://git@github\.com/|git@github\.com:)?([\w.-]+/[\w.-]+?)(?:\.git)?/?$",
    )
    .expect("slug pattern is valid")
});

/// `owner/name` of a GitHub repository given as short form, URL or SSH remote.
pub fn repository_slug(value: &str) -> Option<String> {
    SLUG_RE
        .captures(value.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Releases endpoint for a repository slug.
pub fn releases_url(api_url: &str, slug: &str) -> String {
    format!(
        "{}/repos/{}/releases?per_page={}",
        api_url.trim_end_matches('/'),
        slug,
        PER_PAGE
    )
}

/// Fetch the release feed of `repository`.
pub fn fetch_releases(repository: &str, net: &NetConfig) -> Result<Vec<Release>> {
    let slug = repository_slug(repository)
        .ok_or_else(|| anyhow!("`{}` is not a GitHub repository", repository))?;
    let url = releases_url(net.api_url(), &slug);

    tracing::info!("Fetching releases of {}", slug);

    let client = reqwest::blocking::Client::builder()
        .user_agent(concat!("wheelyard/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("failed to create HTTP client")?;

    let mut request = client
        .get(&url)
        .header(reqwest::header::ACCEPT, ACCEPT)
        .header("X-GitHub-Api-Version", API_VERSION);
    if let Some(token) = std::env::var(TOKEN_ENV).ok().filter(|t| !t.is_empty()) {
        request = request.bearer_auth(token);
    }

    let response = request
        .send()
        .with_context(|| format!("failed to fetch releases from {}", url))?;

    if !response.status().is_success() {
        bail!(
            "failed to fetch releases from {}: HTTP {}",
            url,
            response.status()
        );
    }

    let releases: Vec<Release> = response
        .json()
        .with_context(|| format!("invalid release feed from {}", url))?;

    tracing::debug!("fetched {} releases", releases.len());
    Ok(releases)
}
