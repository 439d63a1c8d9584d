use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level configuration loaded from .contributions.toml.
///
/// All fields are optional — the defaults reproduce the stock site setup.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// GitHub login whose merged pull requests are listed
    pub author: String,
    /// Base URL of the GitHub REST API
    pub api_base_url: String,
    /// HTML file containing the contribution markers
    pub target: PathBuf,
    /// Heading rendered at the top of the contributions block
    pub heading: String,
    /// `owner/repo` names never shown (case-sensitive)
    pub excluded_repos: BTreeSet<String>,
    /// Category rules in display order; first match wins
    pub categories: Vec<CategoryRule>,
    pub markers: Markers,
}

/// Sentinel comments delimiting the generated region of the target file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Markers {
    pub start: String,
    pub end: String,
}

/// A named bucket for repositories, with an optional external link shown
/// next to its label.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CategoryRule {
    pub name: String,
    #[serde(default)]
    pub link: Option<CategoryLink>,
    #[serde(rename = "match")]
    pub matcher: RepoMatcher,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CategoryLink {
    pub text: String,
    pub url: String,
}

/// Predicate over a repository full name (`owner/repo`).
///
/// In TOML: `match = { contains = "odin" }`, `match = { owner = "eclipse-vertx" }`, ...
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepoMatcher {
    /// Full name contains the substring
    Contains(String),
    /// Owner segment equals the value
    Owner(String),
    /// Full name equals the value
    Exact(String),
    /// Full name starts with the value
    Prefix(String),
}

impl RepoMatcher {
    pub fn matches(&self, repo: &str) -> bool {
        match self {
            RepoMatcher::Contains(needle) => repo.contains(needle.as_str()),
            RepoMatcher::Owner(owner) => repo
                .split_once('/')
                .map(|(repo_owner, _)| repo_owner == owner)
                .unwrap_or(false),
            RepoMatcher::Exact(name) => repo == name,
            RepoMatcher::Prefix(prefix) => repo.starts_with(prefix.as_str()),
        }
    }
}

impl CategoryRule {
    pub fn matches(&self, repo: &str) -> bool {
        self.matcher.matches(repo)
    }
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            start: "<!-- BEGIN CONTRIBUTIONS -->".to_string(),
            end: "<!-- END CONTRIBUTIONS -->".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            author: "akshaypatidar1999".to_string(),
            api_base_url: "https://api.github.com".to_string(),
            target: PathBuf::from("index.html"),
            heading: "Open Source Contributions".to_string(),
            excluded_repos: ["dream11/odin", "dream11/homebrew-tools"]
                .into_iter()
                .map(String::from)
                .collect(),
            categories: vec![
                CategoryRule {
                    name: "Odin".to_string(),
                    link: Some(CategoryLink {
                        text: "dream-horizon-org.github.io/odin".to_string(),
                        url: "https://dream-horizon-org.github.io/odin/".to_string(),
                    }),
                    matcher: RepoMatcher::Contains("odin".to_string()),
                },
                CategoryRule {
                    name: "Vert.x".to_string(),
                    link: Some(CategoryLink {
                        text: "vertx.io".to_string(),
                        url: "https://vertx.io/".to_string(),
                    }),
                    matcher: RepoMatcher::Contains("vertx".to_string()),
                },
            ],
            markers: Markers::default(),
        }
    }
}

impl Config {
    /// Load configuration from .contributions.toml in the current directory.
    /// Returns the default config if the file doesn't exist.
    pub fn load() -> Result<Config, ConfigError> {
        let path = Path::new(".contributions.toml");
        if path.exists() {
            Self::load_from(path)
        } else {
            Ok(Config::default())
        }
    }

    /// Load from a specific path.
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }
}
