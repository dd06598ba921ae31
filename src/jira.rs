use std::sync::Arc;

use async_trait::async_trait;
use color_eyre::eyre::{Result, bail};
use reqwest::Client;
use serde::Deserialize;

use crate::{
	config::AppConfig,
	issue::{RawIssue, RawRemoteLink},
};

/// One page of `/rest/api/2/search`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
	#[serde(default)]
	pub start_at: u64,
	#[serde(default)]
	pub max_results: u64,
	#[serde(default)]
	pub total: u64,
	#[serde(default)]
	pub issues: Vec<RawIssue>,
}

/// Issues gathered by a fetch run, in the order the server returned them.
///
/// Duplicates across pages are kept: the server may shift results while paginating.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FetchedIssues(Vec<RawIssue>);

impl FetchedIssues {
	pub fn iter(&self) -> std::slice::Iter<'_, RawIssue> {
		self.0.iter()
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn into_inner(self) -> Vec<RawIssue> {
		self.0
	}

	pub(crate) fn extend(&mut self, issues: impl IntoIterator<Item = RawIssue>) {
		self.0.extend(issues);
	}
}

impl<'a> IntoIterator for &'a FetchedIssues {
	type IntoIter = std::slice::Iter<'a, RawIssue>;
	type Item = &'a RawIssue;

	fn into_iter(self) -> Self::IntoIter {
		self.iter()
	}
}

//==============================================================================
// Jira Client Trait
//==============================================================================

/// Read-only Jira REST operations.
/// Implemented by the HTTP client and by the in-memory mock used in tests.
#[async_trait]
pub trait JiraClient: Send + Sync {
	/// Run a JQL search, returning at most `max_results` issues starting at `start_at`.
	async fn search_issues(&self, jql: &str, start_at: u64, max_results: u32, fields: &str) -> Result<SearchPage>;

	/// Fetch a single issue by key
	async fn fetch_issue(&self, issue_key: &str, fields: &str) -> Result<RawIssue>;

	/// Fetch the remote links of an issue. Not available through search.
	async fn fetch_remote_links(&self, issue_key: &str) -> Result<Vec<RawRemoteLink>>;
}

/// Type alias for a boxed JiraClient
pub type BoxedJiraClient = Arc<dyn JiraClient>;

//==============================================================================
// Real Jira Client Implementation
//==============================================================================

/// Jira REST v2 client over HTTP
pub struct RealJiraClient {
	http_client: Client,
	server: String,
	token: Option<String>,
}

impl RealJiraClient {
	pub fn new(config: &AppConfig) -> Self {
		Self {
			http_client: Client::new(),
			server: config.server.trim_end_matches('/').to_string(),
			token: config.token.clone(),
		}
	}

	fn get(&self, api_url: &str) -> reqwest::RequestBuilder {
		let request = self.http_client.get(api_url).header("User-Agent", "jira_refs").header("Accept", "application/json");
		match &self.token {
			Some(token) => request.bearer_auth(token),
			None => request,
		}
	}

	fn api_url(&self, path: &str) -> String {
		format!("{}/rest/api/2/{path}", self.server)
	}
}

#[async_trait]
impl JiraClient for RealJiraClient {
	async fn search_issues(&self, jql: &str, start_at: u64, max_results: u32, fields: &str) -> Result<SearchPage> {
		let api_url = self.api_url(&format!(
			"search?jql={}&startAt={start_at}&maxResults={max_results}&validateQuery=strict&fields={}",
			urlencoding::encode(jql),
			urlencoding::encode(fields)
		));

		let res = self.get(&api_url).send().await?;

		if !res.status().is_success() {
			let status = res.status();
			let body = res.text().await.unwrap_or_default();
			bail!("Failed to search issues: {status} - {body}");
		}

		let page = res.json::<SearchPage>().await?;
		Ok(page)
	}

	async fn fetch_issue(&self, issue_key: &str, fields: &str) -> Result<RawIssue> {
		let api_url = self.api_url(&format!("issue/{}?fields={}", urlencoding::encode(issue_key), urlencoding::encode(fields)));

		let res = self.get(&api_url).send().await?;

		if !res.status().is_success() {
			let status = res.status();
			let body = res.text().await.unwrap_or_default();
			bail!("Failed to fetch issue {issue_key}: {status} - {body}");
		}

		let issue = res.json::<RawIssue>().await?;
		Ok(issue)
	}

	async fn fetch_remote_links(&self, issue_key: &str) -> Result<Vec<RawRemoteLink>> {
		let api_url = self.api_url(&format!("issue/{}/remotelink", urlencoding::encode(issue_key)));

		let res = self.get(&api_url).send().await?;

		if !res.status().is_success() {
			let status = res.status();
			let body = res.text().await.unwrap_or_default();
			bail!("Failed to fetch remote links of {issue_key}: {status} - {body}");
		}

		let links = res.json::<Vec<RawRemoteLink>>().await?;
		Ok(links)
	}
}

/// JQL selecting every issue of `project`.
pub fn project_jql(project: &str) -> String {
	format!("project={project}")
}
