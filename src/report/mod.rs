pub mod html;

use crate::categorize::CategorizedResult;
use colored::Colorize;

/// Format the run summary shown on the terminal.
///
/// Category Name
///   owner/repo ........ 3 PRs
///
/// 12 PRs across 5 repos in 3 sections
fn summary_lines(result: &CategorizedResult) -> Vec<String> {
    let mut lines = Vec::new();
    for category in &result.categories {
        lines.push(category.name.bold().to_string());
        for repo in &category.repos {
            lines.push(format!(
                "  {} {}",
                repo.name,
                html::count_label(repo.pull_requests.len()).dimmed()
            ));
        }
        lines.push(String::new());
    }
    lines.push(
        format!(
            "{} PRs across {} repos in {} sections",
            result.total_prs(),
            result.total_repos(),
            result.categories.len()
        )
        .green()
        .bold()
        .to_string(),
    );
    lines
}

/// Print the run summary to stdout.
pub fn print_summary(result: &CategorizedResult) {
    println!();
    for line in summary_lines(result) {
        println!("{line}");
    }
    println!();
}
