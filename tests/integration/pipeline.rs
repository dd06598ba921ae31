//! Fetch, parse, collect references and render a report against the mock tracker.

use std::sync::Arc;

use jira_refs::{
	GitHubRepo, IssueReferences, LatexReport, Project, ProjectStore, ReportOptions, ReportSection, RepositoryHistory, mock_github::MockGitHubClient,
	mock_jira::MockJiraClient,
};

use crate::{
	assert_traced,
	fixtures::{link, raw_issue},
	tracing_utils::capture,
};

fn mock_project(n: usize) -> Arc<MockJiraClient> {
	let client = Arc::new(MockJiraClient::new());
	for i in 1..=n {
		let mut issue = raw_issue(&format!("PDFBOX-{i}"), &format!("Broken since r{}00", i), &[("dev", "see http://markmail.org/t/1")]);
		if i == 1 {
			link(&mut issue, "Duplicate", "PDFBOX-2");
		}
		client.add_issue(issue);
	}
	client
}

#[tokio::test]
async fn fetch_walks_pages_until_empty() {
	let (traces, _guard) = capture();
	let client = mock_project(7);
	let dir = tempfile::tempdir().unwrap();
	let project = Project::new(client, ProjectStore::new(dir.path(), "PDFBOX"), 3);

	let fetched = project.fetch_issues_raw(0, true).await.unwrap();
	assert_eq!(fetched.len(), 7);

	let log = traces.log();
	assert_traced!(log, "search_issues");
	assert_traced!(log, "fetch_remote_links");
	assert_eq!(log.search_offsets(), vec![0, 3, 6, 9]);
	assert_eq!(std::fs::read_dir(dir.path().join("Projects/PDFBOX/Issues_raw")).unwrap().count(), 7);
}

#[tokio::test]
async fn remote_link_failure_is_a_warning() {
	let (traces, _guard) = capture();
	let client = mock_project(2);
	client.fail_remote_links("PDFBOX-2");
	let dir = tempfile::tempdir().unwrap();
	let project = Project::new(client, ProjectStore::new(dir.path(), "PDFBOX"), 100);

	let fetched = project.fetch_issues_raw(0, false).await.unwrap();
	assert_eq!(fetched.len(), 2);

	let log = traces.log();
	let warnings = log.warnings();
	assert_eq!(warnings.len(), 1);
	assert_eq!(warnings[0].fields.issue_key.as_deref(), Some("PDFBOX-2"));
}

#[tokio::test]
async fn parse_then_collect_references() {
	let client = mock_project(2);
	let dir = tempfile::tempdir().unwrap();
	let project = Project::new(client, ProjectStore::new(dir.path(), "PDFBOX"), 100);
	project.fetch_issues_raw(0, true).await.unwrap();

	let records = project.parse_issues(None).unwrap();
	assert_eq!(records.len(), 2);
	assert_eq!(records[0].issuelinks[0].issue_key, "PDFBOX-2");

	let references = IssueReferences::collect(&records[0], &Default::default());
	project.store().save_references(&references).unwrap();
	let stored = project.store().load_references("PDFBOX-1").unwrap().unwrap();
	assert_eq!(stored.total.revisions.iter().collect::<Vec<_>>(), vec!["100"]);
	assert_eq!(stored.total.mailing_lists.len(), 1);
	assert_eq!(stored, references);
}

#[tokio::test]
async fn report_includes_connected_issue() {
	let client = mock_project(2);
	let dir = tempfile::tempdir().unwrap();
	let project = Project::new(client.clone(), ProjectStore::new(dir.path(), "PDFBOX"), 100);

	let options = ReportOptions {
		bots: vec!["dev".to_string()],
		exclude: vec![ReportSection::Attachments],
	};
	let report = LatexReport::load(&project, "PDFBOX-1", options).await.unwrap();
	let tex = report.render().unwrap();
	let path = project.store().save_report(report.issue_key(), &tex).unwrap();

	assert_eq!(path, dir.path().join("Reports/PDFBOX-1.tex"));
	assert!(tex.contains(r"\chapter{Root issue PDFBOX{-}1}"));
	assert!(tex.contains(r"\chapter{Connected issue PDFBOX{-}2}"));
	assert!(!tex.contains(r"\section{Attachments}"));
	// every comment is from the bot
	assert_eq!(tex.matches("No comments").count(), 2);
	// both issues were fetched on demand and cached
	assert!(dir.path().join("Projects/PDFBOX/Issues/PDFBOX-2.json").is_file());
	assert!(client.get_call_log().contains(&"fetch_issue(PDFBOX-2)".to_string()));
}

#[tokio::test]
async fn report_with_github_activity() {
	let (traces, _guard) = capture();
	let client = mock_project(2);
	let github = Arc::new(MockGitHubClient::new());
	github.add_commit("apache", "pdfbox", "abcdef0123456789", "bob", "2012-03-06T10:00:00Z", "PDFBOX-2: fix the duplicate");
	github.add_commit("apache", "pdfbox", "0000000fffffffff", "bob", "2012-03-07T10:00:00Z", "PDFBOX-9: unrelated");
	github.add_pull_request("apache", "pdfbox", 11, "Fix for PDFBOX-1", "", "open", "carol", "2012-03-08T00:00:00Z");
	let dir = tempfile::tempdir().unwrap();
	let project = Project::new(client, ProjectStore::new(dir.path(), "PDFBOX"), 100);
	let history = RepositoryHistory::new(github.clone(), ProjectStore::new(dir.path(), "PDFBOX"), GitHubRepo::parse("https://github.com/apache/pdfbox").unwrap());

	let report = LatexReport::load(&project, "PDFBOX-1", ReportOptions::default()).await.unwrap();
	let tex = report.with_history(&history).await.unwrap().render().unwrap();

	assert!(tex.contains(r"\item Commit \textbf{abcdef0} by \textbf{bob} (2012{-}03{-}06): PDFBOX{-}2: fix the duplicate"));
	assert!(!tex.contains("unrelated"));
	assert!(tex.contains(r"\subsection{Pull request 11}"));
	assert_eq!(tex.matches("No related commits").count(), 1);
	assert_eq!(tex.matches("No pull requests").count(), 1);

	// the repository is listed once; every further lookup is served from the cache
	let calls = github.get_call_log();
	assert_eq!(calls.iter().filter(|c| c.starts_with("fetch_commits")).count(), 1);
	assert_eq!(calls.iter().filter(|c| c.starts_with("fetch_pull_requests")).count(), 1);
	assert!(dir.path().join("Projects/PDFBOX/Commits/all.json").is_file());
	assert!(dir.path().join("Projects/PDFBOX/PullRequests/all.json").is_file());

	let log = traces.log();
	assert_traced!(log, "fetch_commits");
	assert!(log.find("loaded GitHub activity").is_some());
}

#[tokio::test]
async fn report_with_unknown_repository_fails() {
	let client = mock_project(1);
	let dir = tempfile::tempdir().unwrap();
	let project = Project::new(client, ProjectStore::new(dir.path(), "PDFBOX"), 100);
	let history = RepositoryHistory::new(Arc::new(MockGitHubClient::new()), ProjectStore::new(dir.path(), "PDFBOX"), GitHubRepo::parse("apache/nope").unwrap());

	let report = LatexReport::load(&project, "PDFBOX-1", ReportOptions::default()).await.unwrap();
	assert!(report.with_history(&history).await.is_err());
}
