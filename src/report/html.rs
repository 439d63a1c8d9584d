use crate::categorize::{Category, CategorizedResult, RepoGroup};
use crate::config::Markers;

const CHEVRON_SVG: &str = concat!(
    r#"<svg class="repo-chevron" viewBox="0 0 24 24" fill="none" "#,
    r#"stroke="currentColor" stroke-width="2">"#,
    r#"<polyline points="9 18 15 12 9 6"/></svg>"#,
);

/// Escape text for insertion into HTML. `&` goes first so the entities
/// produced by the later substitutions are left alone.
pub fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// "1 PR", otherwise "N PRs".
pub fn count_label(count: usize) -> String {
    if count == 1 {
        "1 PR".to_string()
    } else {
        format!("{count} PRs")
    }
}

/// Render the contributions block, markers included, so the output can be
/// found again on the next run.
///
/// Lines are joined with `\n` and there is no trailing newline.
pub fn render(categorized: &CategorizedResult, markers: &Markers, heading: &str) -> String {
    let mut lines: Vec<String> = vec![
        format!("      {}", markers.start),
        r#"      <div class="contributions">"#.to_string(),
        format!("        <h2>{heading}</h2>"),
        String::new(),
    ];

    for category in &categorized.categories {
        render_category(&mut lines, category);
    }

    lines.push("      </div>".to_string());
    lines.push(format!("      {}", markers.end));
    lines.join("\n")
}

fn render_category(lines: &mut Vec<String>, category: &Category) {
    lines.push(format!("        <!-- {} -->", category.name));
    lines.push(r#"        <div class="org-section">"#.to_string());
    match &category.link {
        Some(link) => lines.push(format!(
            r#"          <div class="org-label">{} <a href="{}" target="_blank" rel="noopener">{}</a></div>"#,
            category.name, link.url, link.text
        )),
        None => lines.push(format!(
            r#"          <div class="org-label">{}</div>"#,
            category.name
        )),
    }
    lines.push(r#"          <div class="repo-list">"#.to_string());
    lines.push(String::new());

    for repo in &category.repos {
        lines.push(render_repo(repo));
        lines.push(String::new());
    }

    lines.push("          </div>".to_string());
    lines.push("        </div>".to_string());
    lines.push(String::new());
}

fn render_repo(repo: &RepoGroup) -> String {
    let pr_links: String = repo
        .pull_requests
        .iter()
        .map(|pr| {
            format!(
                r#"<a class="pr-item" href="{}" target="_blank" rel="noopener"><span class="pr-badge">merged</span>{}</a>"#,
                pr.url,
                escape(&pr.title)
            )
        })
        .collect();

    format!(
        r#"            <details class="repo-item"><summary>{}<span class="repo-name">{}</span><span class="repo-count">{}</span></summary><div class="pr-list">{}</div></details>"#,
        CHEVRON_SVG,
        repo.name,
        count_label(repo.pull_requests.len()),
        pr_links
    )
}
