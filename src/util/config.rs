//! Configuration file support for wheelyard.
//!
//! Two configuration file locations are read:
//! - Global: `~/.wheelyard/config.toml` - User-wide defaults
//! - Project: `.wheelyard/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config, and command line
//! flags take precedence over both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default build matrix path.
pub const DEFAULT_BUILDS: &str = "builds.toml";

/// Default clone directory.
pub const DEFAULT_REPO_DIR: &str = "repos";

/// Default wheel output directory.
pub const DEFAULT_OUTPUT_DIR: &str = "wheels";

/// Default GitHub REST API root.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// wheelyard configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Build settings
    pub build: BuildConfig,

    /// Network settings
    pub net: NetConfig,
}

/// Build-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Build matrix file
    pub builds: Option<PathBuf>,

    /// Directory repositories are cloned into
    pub repo_dir: Option<PathBuf>,

    /// Directory finished wheels are written to
    pub output_dir: Option<PathBuf>,
}

/// Network-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NetConfig {
    /// GitHub REST API root
    pub api_url: Option<String>,

    /// Repository whose releases host the wheels (`owner/name` or URL)
    pub repository: Option<String>,
}

impl BuildConfig {
    pub fn builds(&self) -> &Path {
        self.builds.as_deref().unwrap_or(Path::new(DEFAULT_BUILDS))
    }

    pub fn repo_dir(&self) -> &Path {
        self.repo_dir.as_deref().unwrap_or(Path::new(DEFAULT_REPO_DIR))
    }

    pub fn output_dir(&self) -> &Path {
        self.output_dir
            .as_deref()
            .unwrap_or(Path::new(DEFAULT_OUTPUT_DIR))
    }
}

impl NetConfig {
    pub fn api_url(&self) -> &str {
        self.api_url
            .as_deref()
            .unwrap_or(DEFAULT_API_URL)
            .trim_end_matches('/')
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.build.builds.is_some() {
            self.build.builds = other.build.builds;
        }
        if other.build.repo_dir.is_some() {
            self.build.repo_dir = other.build.repo_dir;
        }
        if other.build.output_dir.is_some() {
            self.build.output_dir = other.build.output_dir;
        }

        if other.net.api_url.is_some() {
            self.net.api_url = other.net.api_url;
        }
        if other.net.repository.is_some() {
            self.net.repository = other.net.repository;
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.wheelyard/config.toml)
/// 2. Global config (~/.wheelyard/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        config.merge(Config::load_or_default(global_path));
    }

    config.merge(Config::load_or_default(project_path));

    config
}

/// Get the global wheelyard config directory (~/.wheelyard).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".wheelyard"))
}

/// Get the global config path (~/.wheelyard/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.wheelyard/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".wheelyard").join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.build.builds(), Path::new("builds.toml"));
        assert_eq!(config.build.repo_dir(), Path::new("repos"));
        assert_eq!(config.build.output_dir(), Path::new("wheels"));
        assert_eq!(config.net.api_url(), "https://api.github.com");
        assert!(config.net.repository.is_none());
    }

    #[test]
    fn test_config_load() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.toml");

        std::fs::write(
            &config_path,
            r#"
[build]
builds = "matrix/builds.json"
output_dir = "dist"

[net]
api_url = "https://ghe.example.invalid/api/v3/"
repository = "example/wheels"
"#,
        )
        .unwrap();

        let config = Config::load(&config_path).unwrap();
        assert_eq!(config.build.builds(), Path::new("matrix/builds.json"));
        assert_eq!(config.build.repo_dir(), Path::new("repos"));
        assert_eq!(config.build.output_dir(), Path::new("dist"));
        assert_eq!(config.net.api_url(), "https://ghe.example.invalid/api/v3");
        assert_eq!(config.net.repository.as_deref(), Some("example/wheels"));
    }

    #[test]
    fn test_project_overrides_global() {
        let tmp = TempDir::new().unwrap();
        let global = tmp.path().join("global.toml");
        let project = tmp.path().join("project.toml");

        std::fs::write(
            &global,
            "[build]\nrepo_dir = \"/cache/repos\"\n[net]\nrepository = \"a/b\"\n",
        )
        .unwrap();
        std::fs::write(&project, "[net]\nrepository = \"c/d\"\n").unwrap();

        let config = load_config(Some(&global), &project);
        assert_eq!(config.build.repo_dir(), Path::new("/cache/repos"));
        assert_eq!(config.net.repository.as_deref(), Some("c/d"));
    }

    #[test]
    fn test_broken_config_falls_back() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[build\n").unwrap();

        let config = load_config(None, &path);
        assert!(config.build.builds.is_none());
    }
}
