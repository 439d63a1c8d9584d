pub mod types;

pub use types::{Category, CategorizedResult, RepoGroup};

use std::collections::HashMap;
use tracing::debug;

use crate::config::CategoryRule;
use crate::github::PullRequestRecord;

/// Name of the implicit fallback category.
pub const OTHER_CATEGORY: &str = "Other";

/// Group PRs by repository, then bucket each repository under the first
/// rule that matches its full name ("Other" when none do).
///
/// Repositories within a category are ordered by PR count, descending, with
/// ties kept in first-seen order. PRs within a repository are ordered by
/// number, descending. Empty categories are dropped and "Other" comes last.
pub fn categorize(records: Vec<PullRequestRecord>, rules: &[CategoryRule]) -> CategorizedResult {
    let mut repos: Vec<RepoGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for record in records {
        let slot = *index
            .entry(record.repository_full_name.clone())
            .or_insert_with(|| {
                repos.push(RepoGroup {
                    name: record.repository_full_name.clone(),
                    pull_requests: Vec::new(),
                });
                repos.len() - 1
            });
        repos[slot].pull_requests.push(record);
    }

    // One bucket per rule plus the fallback at the end. A rule named like the
    // fallback feeds the fallback bucket so "Other" is rendered once.
    let fallback = rules.len();
    let mut buckets: Vec<Vec<RepoGroup>> = (0..=fallback).map(|_| Vec::new()).collect();
    for mut repo in repos {
        let bucket = rules
            .iter()
            .position(|rule| rule.matches(&repo.name))
            .filter(|&i| rules[i].name != OTHER_CATEGORY)
            .unwrap_or(fallback);
        debug!(repo = %repo.name, prs = repo.pull_requests.len(), bucket, "categorized repository");
        repo.pull_requests.sort_by(|a, b| b.number.cmp(&a.number));
        buckets[bucket].push(repo);
    }

    let categories = buckets
        .into_iter()
        .enumerate()
        .filter(|(_, repos)| !repos.is_empty())
        .map(|(i, mut repos)| {
            // sort_by is stable: equal counts keep first-seen order
            repos.sort_by(|a, b| b.pull_requests.len().cmp(&a.pull_requests.len()));
            match rules.get(i) {
                Some(rule) => Category {
                    name: rule.name.clone(),
                    link: rule.link.clone(),
                    repos,
                },
                None => Category {
                    name: OTHER_CATEGORY.to_string(),
                    link: None,
                    repos,
                },
            }
        })
        .collect();

    CategorizedResult { categories }
}
