mod categorize;
mod config;
mod github;
mod patch;
mod report;

use clap::Parser;
use config::Config;
use std::path::PathBuf;
use tracing::{debug, info, info_span, warn};
use tracing_subscriber::EnvFilter;

/// contributions-sync — renders a GitHub user's merged pull requests into the
/// marked contributions section of a static HTML page.
#[derive(Parser, Debug)]
#[command(name = "contributions-sync", version, about)]
struct Cli {
    /// Config file (defaults to .contributions.toml in the current directory, if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// GitHub login whose merged PRs are listed
    #[arg(short, long)]
    author: Option<String>,

    /// HTML file containing the contribution markers
    #[arg(short, long)]
    target: Option<PathBuf>,

    /// Base URL of the GitHub REST API
    #[arg(long)]
    api_base_url: Option<String>,

    /// Print the generated block instead of patching the target file
    #[arg(long)]
    dry_run: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let default_level = if cli.quiet { "warn" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    info!("loading configuration");
    let mut config = match cli.config.as_deref() {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(author) = cli.author {
        config.author = author;
    }
    if let Some(target) = cli.target {
        config.target = target;
    }
    if let Some(api_base_url) = cli.api_base_url {
        config.api_base_url = api_base_url;
    }
    debug!(?config, "resolved configuration");

    run(&config, cli.dry_run, cli.quiet).await
}

/// Fetch, categorize, render and patch, in that order.
///
/// Returns early without touching the target file when the author has no
/// merged PRs left after exclusions.
async fn run(config: &Config, dry_run: bool, quiet: bool) -> Result<(), Box<dyn std::error::Error>> {
    let _main_span = info_span!("sync", author = %config.author).entered();

    info!("fetching merged pull requests from GitHub");
    let client = github::SearchClient::new(config);
    let records = client.fetch_all_merged_pull_requests(&config.author).await?;
    if records.is_empty() {
        warn!("no merged PRs found, skipping update");
        return Ok(());
    }

    let categorized = categorize::categorize(records, &config.categories);
    info!(
        prs = categorized.total_prs(),
        repos = categorized.total_repos(),
        sections = categorized.categories.len(),
        "categorized pull requests"
    );
    if !quiet {
        report::print_summary(&categorized);
    }

    let fragment = report::html::render(&categorized, &config.markers, &config.heading);
    if dry_run {
        println!("{fragment}");
        info!("dry run, target file left untouched");
        return Ok(());
    }

    patch::patch(&config.target, &config.markers, &fragment)?;
    info!(path = %config.target.display(), "done");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;
    use std::fs;
    use std::io::Write;

    const PAGE: &str = "<html>\n<body>\n      <!-- BEGIN CONTRIBUTIONS -->\n      stale\n      <!-- END CONTRIBUTIONS -->\n</body>\n</html>\n";

    fn target_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(PAGE.as_bytes()).unwrap();
        file
    }

    fn test_config(server: &MockServer, target: &std::path::Path) -> Config {
        Config {
            api_base_url: server.base_url(),
            target: target.to_path_buf(),
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn test_run_without_prs_leaves_target_untouched() {
        let server = MockServer::start_async().await;
        let search = server
            .mock_async(|when, then| {
                when.method(GET).path("/search/issues");
                then.status(200).json_body(json!({ "total_count": 0, "items": [] }));
            })
            .await;
        let file = target_file();

        run(&test_config(&server, file.path()), false, true).await.unwrap();

        assert_eq!(search.hits_async().await, 1);
        assert_eq!(fs::read_to_string(file.path()).unwrap(), PAGE);
    }

    #[tokio::test]
    async fn test_run_with_only_excluded_prs_leaves_target_untouched() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/search/issues");
                then.status(200).json_body(json!({
                    "total_count": 2,
                    "items": [
                        { "html_url": "https://github.com/dream11/odin/pull/3", "title": "Fix build" },
                        { "html_url": "https://github.com/dream11/homebrew-tools/pull/1", "title": "Bump" },
                    ],
                }));
            })
            .await;
        let file = target_file();

        run(&test_config(&server, file.path()), false, true).await.unwrap();

        assert_eq!(fs::read_to_string(file.path()).unwrap(), PAGE);
    }

    #[tokio::test]
    async fn test_run_rewrites_marked_region() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/search/issues");
                then.status(200).json_body(json!({
                    "total_count": 2,
                    "items": [
                        { "html_url": "https://github.com/dream-horizon-org/odin/pull/12", "title": "Add <retry> & backoff" },
                        { "html_url": "https://github.com/rust-lang/rust/pull/4", "title": "Fix typo" },
                    ],
                }));
            })
            .await;
        let file = target_file();
        let config = test_config(&server, file.path());

        run(&config, false, true).await.unwrap();

        let content = fs::read_to_string(file.path()).unwrap();
        assert!(content.starts_with("<html>\n<body>\n      <!-- BEGIN CONTRIBUTIONS -->\n"));
        assert!(content.ends_with("      <!-- END CONTRIBUTIONS -->\n</body>\n</html>\n"));
        assert!(!content.contains("stale"));
        assert!(content.contains("<!-- Odin -->"));
        assert!(content.contains("<!-- Other -->"));
        assert!(content.contains("Add &lt;retry&gt; &amp; backoff"));
        assert!(content.contains(r#"href="https://github.com/rust-lang/rust/pull/4""#));

        // The rewritten block still carries both markers, so a second run patches it again.
        run(&config, false, true).await.unwrap();
        assert_eq!(fs::read_to_string(file.path()).unwrap(), content);
    }

    #[tokio::test]
    async fn test_run_dry_run_leaves_target_untouched() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/search/issues");
                then.status(200).json_body(json!({
                    "total_count": 1,
                    "items": [{ "html_url": "https://github.com/a/b/pull/1", "title": "t" }],
                }));
            })
            .await;
        let file = target_file();

        run(&test_config(&server, file.path()), true, true).await.unwrap();

        assert_eq!(fs::read_to_string(file.path()).unwrap(), PAGE);
    }

    #[tokio::test]
    async fn test_run_fails_without_markers() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/search/issues");
                then.status(200).json_body(json!({
                    "total_count": 1,
                    "items": [{ "html_url": "https://github.com/a/b/pull/1", "title": "t" }],
                }));
            })
            .await;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"<html></html>\n").unwrap();

        let err = run(&test_config(&server, file.path()), false, true).await.unwrap_err();

        assert!(err.to_string().contains("BEGIN CONTRIBUTIONS"));
        assert_eq!(fs::read_to_string(file.path()).unwrap(), "<html></html>\n");
    }
}
