//! Mock Jira client for testing purposes.
//!
//! Issues live in memory, grouped by project and kept in insertion order, which is the order
//! search pages return them in. Every call emits a `tracing` event with target `mock_jira` and
//! is recorded in a call log.

use std::{
	collections::{BTreeMap, HashSet},
	sync::Mutex,
};

use async_trait::async_trait;
use color_eyre::eyre::{Result, bail, eyre};
use tracing::instrument;

use crate::{
	issue::{RawIssue, RawRemoteLink},
	jira::{JiraClient, SearchPage},
};

/// Mock Jira client that stores all state in memory.
/// Thread-safe for use in async contexts.
#[derive(Default)]
pub struct MockJiraClient {
	/// Issues per project key, in search order
	issues: Mutex<BTreeMap<String, Vec<RawIssue>>>,

	/// Remote links per issue key
	remote_links: Mutex<BTreeMap<String, Vec<RawRemoteLink>>>,

	/// Issue keys whose remote-link requests fail
	failing_remote_links: Mutex<HashSet<String>>,

	/// Call log for debugging
	call_log: Mutex<Vec<String>>,
}

impl MockJiraClient {
	pub fn new() -> Self {
		Self::default()
	}

	/// Add an issue; its project is taken from `fields.project.key`.
	pub fn add_issue(&self, issue: RawIssue) {
		let project = issue.fields.project.key.clone();
		self.issues.lock().unwrap().entry(project).or_default().push(issue);
	}

	pub fn set_remote_links(&self, issue_key: &str, links: Vec<RawRemoteLink>) {
		self.remote_links.lock().unwrap().insert(issue_key.to_string(), links);
	}

	/// Make remote-link requests for `issue_key` return an error.
	pub fn fail_remote_links(&self, issue_key: &str) {
		self.failing_remote_links.lock().unwrap().insert(issue_key.to_string());
	}

	pub fn get_call_log(&self) -> Vec<String> {
		self.call_log.lock().unwrap().clone()
	}

	pub fn clear_call_log(&self) {
		self.call_log.lock().unwrap().clear();
	}

	fn log_call(&self, call: &str) {
		self.call_log.lock().unwrap().push(call.to_string());
	}
}

/// `project=KEY` is the only JQL the mock understands.
fn parse_project_jql(jql: &str) -> Result<&str> {
	jql.strip_prefix("project=").map(str::trim).filter(|p| !p.is_empty()).ok_or_else(|| eyre!("Unsupported JQL in mock: {jql}"))
}

#[async_trait]
impl JiraClient for MockJiraClient {
	#[instrument(skip(self, _fields), name = "MockJiraClient::search_issues")]
	async fn search_issues(&self, jql: &str, start_at: u64, max_results: u32, _fields: &str) -> Result<SearchPage> {
		tracing::info!(target: "mock_jira", jql, start_at, max_results, "search_issues");
		self.log_call(&format!("search_issues({jql}, {start_at}, {max_results})"));

		let project = parse_project_jql(jql)?;
		let issues = self.issues.lock().unwrap();
		let all = issues.get(project).map(Vec::as_slice).unwrap_or_default();

		let page = all.iter().skip(start_at as usize).take(max_results as usize).cloned().collect();
		Ok(SearchPage {
			start_at,
			max_results: max_results as u64,
			total: all.len() as u64,
			issues: page,
		})
	}

	#[instrument(skip(self, _fields), name = "MockJiraClient::fetch_issue")]
	async fn fetch_issue(&self, issue_key: &str, _fields: &str) -> Result<RawIssue> {
		tracing::info!(target: "mock_jira", issue_key, "fetch_issue");
		self.log_call(&format!("fetch_issue({issue_key})"));

		let issues = self.issues.lock().unwrap();
		issues.values().flatten().find(|i| i.key == issue_key).cloned().ok_or_else(|| eyre!("Issue not found: {issue_key}"))
	}

	#[instrument(skip(self), name = "MockJiraClient::fetch_remote_links")]
	async fn fetch_remote_links(&self, issue_key: &str) -> Result<Vec<RawRemoteLink>> {
		tracing::info!(target: "mock_jira", issue_key, "fetch_remote_links");
		self.log_call(&format!("fetch_remote_links({issue_key})"));

		if self.failing_remote_links.lock().unwrap().contains(issue_key) {
			bail!("Failed to fetch remote links of {issue_key}: 500 Internal Server Error");
		}
		Ok(self.remote_links.lock().unwrap().get(issue_key).cloned().unwrap_or_default())
	}
}
