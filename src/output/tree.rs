//! Discovery tree rendering
//!
//! Every page except the seed was admitted from exactly one parent, so the
//! resolved pages form a tree rooted at the seed.

use crate::output::report::{CrawlReport, PageRecord};
use std::collections::{HashMap, HashSet};
use std::fmt::Write;

/// Renders the discovery tree of a report
///
/// Each line shows the URL followed by depth, state, request latency and the
/// number of links found on the page. Siblings are sorted by URL.
pub fn format_tree(report: &CrawlReport) -> String {
    let mut children: HashMap<&str, Vec<&PageRecord>> = HashMap::new();
    let mut roots: Vec<&PageRecord> = Vec::new();
    let known: HashSet<&str> = report.pages.iter().map(|p| p.url.as_str()).collect();

    for page in &report.pages {
        match page.parent.as_deref() {
            Some(parent) if known.contains(parent) => {
                children.entry(parent).or_default().push(page);
            }
            _ => roots.push(page),
        }
    }

    for siblings in children.values_mut() {
        siblings.sort_by(|a, b| a.url.cmp(&b.url));
    }
    roots.sort_by(|a, b| a.depth.cmp(&b.depth).then_with(|| a.url.cmp(&b.url)));

    let mut out = String::new();
    for root in roots {
        let _ = writeln!(out, "{}", describe(root));
        render_children(&mut out, root, &children, "");
    }
    out
}

fn render_children(
    out: &mut String,
    page: &PageRecord,
    children: &HashMap<&str, Vec<&PageRecord>>,
    prefix: &str,
) {
    let Some(kids) = children.get(page.url.as_str()) else {
        return;
    };

    for (i, child) in kids.iter().enumerate() {
        let last = i + 1 == kids.len();
        let (branch, indent) = if last {
            ("└── ", "    ")
        } else {
            ("├── ", "│   ")
        };
        let _ = writeln!(out, "{}{}{}", prefix, branch, describe(child));
        render_children(out, child, children, &format!("{}{}", prefix, indent));
    }
}

fn describe(page: &PageRecord) -> String {
    let mut line = format!("{} [depth {}, {}", page.url, page.depth, page.state);
    if let Some(code) = page.status_code {
        let _ = write!(line, " {}", code);
    }
    if let Some(latency) = page.request_time {
        let _ = write!(line, ", {}ms", latency.as_millis());
    }
    let _ = write!(line, ", {} links]", page.links_found);
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::report::RunStatus;
    use crate::output::stats::CrawlStats;
    use crate::state::PageState;
    use std::time::Duration;

    fn page(url: &str, depth: u32, parent: Option<&str>, links: usize) -> PageRecord {
        PageRecord {
            url: url.to_string(),
            depth,
            parent: parent.map(str::to_string),
            state: PageState::Fetched,
            status_code: Some(200),
            request_time: Some(Duration::from_millis(5)),
            worker_time: Duration::from_millis(6),
            links_found: links,
            error: None,
        }
    }

    fn report(pages: Vec<PageRecord>) -> CrawlReport {
        CrawlReport {
            seed_url: "https://a/".to_string(),
            status: RunStatus::Completed,
            started_at: chrono::Utc::now(),
            elapsed: Duration::from_millis(50),
            max_workers: 3,
            max_depth: 2,
            peak_concurrency: 2,
            pages,
            stats: CrawlStats::default(),
        }
    }

    #[test]
    fn test_tree_layout() {
        let report = report(vec![
            page("https://a/", 0, None, 2),
            page("https://c/", 1, Some("https://a/"), 0),
            page("https://b/", 1, Some("https://a/"), 1),
            page("https://d/", 2, Some("https://b/"), 0),
        ]);

        let tree = format_tree(&report);
        let expected = "\
https://a/ [depth 0, Fetched 200, 5ms, 2 links]
├── https://b/ [depth 1, Fetched 200, 5ms, 1 links]
│   └── https://d/ [depth 2, Fetched 200, 5ms, 0 links]
└── https://c/ [depth 1, Fetched 200, 5ms, 0 links]
";
        assert_eq!(tree, expected);
    }

    #[test]
    fn test_orphans_are_rendered_as_roots() {
        let report = report(vec![
            page("https://a/", 0, None, 1),
            page("https://x/", 2, Some("https://missing/"), 0),
        ]);
        let tree = format_tree(&report);
        assert_eq!(tree.lines().count(), 2);
        assert!(tree.lines().nth(1).unwrap().starts_with("https://x/"));
    }

    #[test]
    fn test_empty_report() {
        assert!(format_tree(&report(vec![])).is_empty());
    }
}
