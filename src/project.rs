//! Fetching and parsing the issues of one Jira project.

use color_eyre::eyre::Result;
use tracing::instrument;

use crate::{
	issue::{ISSUE_FIELDS, IssueRecord, RawIssue},
	jira::{BoxedJiraClient, FetchedIssues, project_jql},
	store::ProjectStore,
};

pub struct Project {
	client: BoxedJiraClient,
	store: ProjectStore,
	page_size: u32,
}

impl Project {
	pub fn new(client: BoxedJiraClient, store: ProjectStore, page_size: u32) -> Self {
		Self {
			client,
			store,
			page_size: page_size.max(1),
		}
	}

	pub fn key(&self) -> &str {
		self.store.project()
	}

	pub fn store(&self) -> &ProjectStore {
		&self.store
	}

	/// Fetch every issue of the project page by page, starting at page `start_block`.
	///
	/// Stops at the first empty page. Each page is saved to `Issues_raw/` as soon as it arrives when `save` is set.
	#[instrument(skip(self), fields(project = %self.key()))]
	pub async fn fetch_issues_raw(&self, start_block: u64, save: bool) -> Result<FetchedIssues> {
		tracing::info!("fetching issues, this may take a while");
		let jql = project_jql(self.key());
		let mut issues = FetchedIssues::default();
		let mut block = start_block;

		loop {
			let start_at = block * self.page_size as u64;
			let mut page = self.client.search_issues(&jql, start_at, self.page_size, ISSUE_FIELDS).await?.issues;
			if page.is_empty() {
				break;
			}
			block += 1;

			for issue in &mut page {
				self.attach_remote_links(issue).await;
			}
			if save {
				self.store.save_issues_raw(&page)?;
			}
			issues.extend(page);
			tracing::info!(fetched = issues.len(), "fetched page");
		}

		tracing::info!(total = issues.len(), saved = save, "finished fetching issues");
		Ok(issues)
	}

	/// Fetch one issue with its remote links.
	#[instrument(skip(self), fields(project = %self.key()))]
	pub async fn fetch_issue_raw(&self, issue_key: &str, save: bool) -> Result<RawIssue> {
		let mut issue = self.client.fetch_issue(issue_key, ISSUE_FIELDS).await?;
		self.attach_remote_links(&mut issue).await;
		if save {
			self.store.save_issues_raw(std::slice::from_ref(&issue))?;
		}
		Ok(issue)
	}

	/// Remote links are best effort: a failed request leaves the issue without any.
	async fn attach_remote_links(&self, issue: &mut RawIssue) {
		issue.remotelinks = match self.client.fetch_remote_links(&issue.key).await {
			Ok(links) => links,
			Err(e) => {
				tracing::warn!(issue_key = %issue.key, error = %e, "failed to retrieve remote links");
				Vec::new()
			}
		};
	}

	/// Turn raw issues into records and store them in `Issues/`.
	///
	/// With `issues_raw` set to `None` (or an empty list) the raw issues are read from `Issues_raw/`.
	#[instrument(skip_all, fields(project = %self.key()))]
	pub fn parse_issues(&self, issues_raw: Option<&[RawIssue]>) -> Result<Vec<IssueRecord>> {
		tracing::info!("parsing issues");
		let loaded;
		let issues_raw = match issues_raw {
			Some(issues) if !issues.is_empty() => issues,
			_ => {
				loaded = self.store.load_issues_raw()?;
				&loaded[..]
			}
		};

		let mut records = Vec::with_capacity(issues_raw.len());
		for (count, raw) in issues_raw.iter().enumerate() {
			let record = IssueRecord::from(raw);
			self.store.save_issue(&record)?;
			records.push(record);
			if (count + 1) % 100 == 0 {
				tracing::info!(parsed = count + 1, "parsing");
			}
		}
		tracing::info!(total = records.len(), "finished parsing issues");
		Ok(records)
	}

	/// Parse one issue, fetching it first if it is not in `Issues_raw/`.
	#[instrument(skip(self), fields(project = %self.key()))]
	pub async fn parse_issue(&self, issue_key: &str) -> Result<IssueRecord> {
		let raw = match self.store.load_issue_raw(issue_key)? {
			Some(raw) => raw,
			None => self.fetch_issue_raw(issue_key, true).await?,
		};
		let record = IssueRecord::from(&raw);
		self.store.save_issue(&record)?;
		Ok(record)
	}

	/// The stored record, parsing (and fetching) it on a miss.
	pub async fn load_issue(&self, issue_key: &str) -> Result<IssueRecord> {
		match self.store.load_issue(issue_key)? {
			Some(record) => Ok(record),
			None => self.parse_issue(issue_key).await,
		}
	}
}
