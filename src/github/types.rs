use serde::Deserialize;

/// A merged pull request as listed in the contributions block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestRecord {
    /// `owner/repo`
    pub repository_full_name: String,
    /// PR number within the repository
    pub number: u64,
    /// PR title, unescaped
    pub title: String,
    /// Link to the PR on github.com
    pub url: String,
}

/// Components of a PR `html_url`, e.g. https://github.com/{owner}/{repo}/pull/{number}.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrUrl {
    pub owner: String,
    pub repo: String,
    pub pr_number: u64,
}

impl PrUrl {
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

/// One page of `GET /search/issues`.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
pub struct SearchItem {
    pub html_url: String,
    pub title: String,
}
