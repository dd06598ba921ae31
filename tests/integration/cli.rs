use std::collections::BTreeMap;

use jira_refs::{ExtractionResult, github::CommitRecord};

use crate::{
	fixtures::{raw_issue, run, run_with_stdin},
	tracing_utils::TraceLog,
};

#[test]
fn refs_text_prints_json() {
	let dir = tempfile::tempdir().unwrap();
	let trace_file = dir.path().join("trace.json");
	let output = run(dir.path(), &["refs", "PDFBOX", "--text", "fixed in r1234, see PDFBOX-42 and https://example.com/a"], &[("JIRA_REFS_TRACE_FILE", trace_file.as_path())]);
	assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

	let result: ExtractionResult = serde_json::from_slice(&output.stdout).unwrap();
	assert_eq!(result.revisions.into_iter().collect::<Vec<_>>(), vec!["1234"]);
	assert_eq!(result.other_issues.into_iter().collect::<Vec<_>>(), vec!["PDFBOX-42"]);
	assert_eq!(result.urls.into_iter().collect::<Vec<_>>(), vec!["https://example.com/a"]);

	let log = TraceLog::from_file(&trace_file);
	let event = log.find("classified text").expect("classification is traced");
	assert_eq!(event.fields.project.as_deref(), Some("PDFBOX"));
	assert_eq!(event.fields.found, Some(3));
}

#[test]
fn refs_over_stored_issues() {
	let dir = tempfile::tempdir().unwrap();
	let store = jira_refs::ProjectStore::new(dir.path(), "PDFBOX");
	let raw = raw_issue("PDFBOX-5", "see r99", &[("dev", "http://mail-archives.apache.org/m")]);
	store.save_issue(&jira_refs::IssueRecord::from(&raw)).unwrap();

	let output = run(dir.path(), &["refs", "PDFBOX"], &[]);
	assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

	let totals: BTreeMap<String, ExtractionResult> = serde_json::from_slice(&output.stdout).unwrap();
	assert_eq!(totals["PDFBOX-5"].revisions.len(), 1);
	assert_eq!(totals["PDFBOX-5"].mailing_lists.len(), 1);
	assert!(dir.path().join("Projects/PDFBOX/References/PDFBOX-5.json").is_file());
}

#[test]
fn refs_without_parsed_issues_fails() {
	let dir = tempfile::tempdir().unwrap();
	let output = run(dir.path(), &["refs", "PDFBOX"], &[]);
	assert!(!output.status.success());
	assert!(String::from_utf8_lossy(&output.stderr).contains("No parsed issues for PDFBOX"));
}

#[test]
fn escape_reads_stdin() {
	let dir = tempfile::tempdir().unwrap();
	let output = run_with_stdin(dir.path(), &["escape"], &[], Some("50% of {code}a_b{code}"));
	assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
	assert_eq!(String::from_utf8_lossy(&output.stdout), "50\\% of \\begin{lstlisting}a_b\\end{lstlisting}\\ \n");
}

#[test]
fn escape_strict_rejects_unbalanced_noformat() {
	let dir = tempfile::tempdir().unwrap();
	let output = run(dir.path(), &["escape", "--strict", "--text", "{noformat}open"], &[]);
	assert!(!output.status.success());
}

#[test]
fn github_served_from_cache() {
	let dir = tempfile::tempdir().unwrap();
	let store = jira_refs::ProjectStore::new(dir.path(), "PDFBOX");
	let commit = |sha: &str, message: &str| CommitRecord {
		sha: sha.to_string(),
		short_sha: sha[..7].to_string(),
		author: "bob".to_string(),
		date: "2012-03-06".to_string(),
		message: message.to_string(),
	};
	store.save_commits(None, &[commit("aaaaaaa111", "PDFBOX-5: fix"), commit("bbbbbbb222", "PDFBOX-6: other")]).unwrap();
	store.save_pull_requests(None, &[]).unwrap();

	let output = run(dir.path(), &["github", "PDFBOX", "--repository", "apache/pdfbox", "--issue", "PDFBOX-5"], &[]);
	assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

	let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
	let commits: Vec<CommitRecord> = serde_json::from_value(value["commits"].clone()).unwrap();
	assert_eq!(commits, vec![commit("aaaaaaa111", "PDFBOX-5: fix")]);
	assert_eq!(value["pull_requests"], serde_json::json!([]));
}

#[test]
fn github_without_repository_fails() {
	let dir = tempfile::tempdir().unwrap();
	let output = run(dir.path(), &["github", "PDFBOX"], &[]);
	assert!(!output.status.success());
	assert!(String::from_utf8_lossy(&output.stderr).contains("No GitHub repository given"));
}
