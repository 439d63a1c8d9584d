use crate::config::CategoryLink;
use crate::github::PullRequestRecord;

/// All PRs of one repository, newest number first.
#[derive(Debug, Clone)]
pub struct RepoGroup {
    /// `owner/repo`
    pub name: String,
    pub pull_requests: Vec<PullRequestRecord>,
}

/// A display section: a category name, its optional link and the
/// repositories that fell into it.
#[derive(Debug, Clone)]
pub struct Category {
    pub name: String,
    pub link: Option<CategoryLink>,
    pub repos: Vec<RepoGroup>,
}

/// Non-empty categories in display order.
#[derive(Debug, Clone, Default)]
pub struct CategorizedResult {
    pub categories: Vec<Category>,
}

impl CategorizedResult {
    pub fn total_prs(&self) -> usize {
        self.categories
            .iter()
            .flat_map(|c| &c.repos)
            .map(|r| r.pull_requests.len())
            .sum()
    }

    pub fn total_repos(&self) -> usize {
        self.categories.iter().map(|c| c.repos.len()).sum()
    }
}
