//! On-disk layout:
//!
//! ```text
//! <root>/Projects/<project>/Issues_raw/<key>.json    raw tracker payloads
//! <root>/Projects/<project>/Issues/<key>.json        parsed IssueRecord
//! <root>/Projects/<project>/References/<key>.json    IssueReferences
//! <root>/Projects/<project>/Commits/all.json          every commit of the linked repository
//! <root>/Projects/<project>/Commits/<key>.json        commits addressing one issue
//! <root>/Projects/<project>/PullRequests/all.json     every pull request, with comments
//! <root>/Projects/<project>/PullRequests/<key>.json   pull requests mentioning one issue
//! <root>/Reports/<key>.tex                            LaTeX reports
//! ```

use std::path::{Path, PathBuf};

use color_eyre::eyre::{Result, WrapErr};
use serde::{Serialize, de::DeserializeOwned};
use tracing::instrument;

use crate::{
	github::{CommitRecord, PullRequestRecord},
	issue::{IssueRecord, RawIssue},
	report::IssueReferences,
};

/// Create `dir` and its parents if they do not exist yet.
pub fn create_dir_if_necessary(dir: &Path) -> Result<()> {
	if !dir.is_dir() {
		std::fs::create_dir_all(dir).wrap_err_with(|| format!("Failed to create directory {}", dir.display()))?;
	}
	Ok(())
}

/// Write `value` as 2-space indented JSON, creating the parent directory.
pub fn save_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<()> {
	if let Some(parent) = path.parent() {
		create_dir_if_necessary(parent)?;
	}
	let content = serde_json::to_string_pretty(value)?;
	std::fs::write(path, content).wrap_err_with(|| format!("Failed to write {}", path.display()))?;
	Ok(())
}

pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
	let content = std::fs::read_to_string(path).wrap_err_with(|| format!("Failed to read {}", path.display()))?;
	serde_json::from_str(&content).wrap_err_with(|| format!("Malformed JSON in {}", path.display()))
}

/// Files of one project under a data root.
#[derive(Clone, Debug)]
pub struct ProjectStore {
	root: PathBuf,
	project: String,
}

impl ProjectStore {
	pub fn new(root: impl Into<PathBuf>, project: &str) -> Self {
		Self {
			root: root.into(),
			project: project.to_string(),
		}
	}

	pub fn project(&self) -> &str {
		&self.project
	}

	pub fn project_dir(&self) -> PathBuf {
		self.root.join("Projects").join(&self.project)
	}

	pub fn issues_raw_dir(&self) -> PathBuf {
		self.project_dir().join("Issues_raw")
	}

	pub fn issues_dir(&self) -> PathBuf {
		self.project_dir().join("Issues")
	}

	pub fn references_dir(&self) -> PathBuf {
		self.project_dir().join("References")
	}

	pub fn commits_dir(&self) -> PathBuf {
		self.project_dir().join("Commits")
	}

	pub fn pull_requests_dir(&self) -> PathBuf {
		self.project_dir().join("PullRequests")
	}

	pub fn reports_dir(&self) -> PathBuf {
		self.root.join("Reports")
	}

	pub fn report_path(&self, issue_key: &str) -> PathBuf {
		self.reports_dir().join(format!("{issue_key}.tex"))
	}

	#[instrument(skip_all, fields(project = %self.project, count = issues.len()))]
	pub fn save_issues_raw(&self, issues: &[RawIssue]) -> Result<()> {
		let dir = self.issues_raw_dir();
		create_dir_if_necessary(&dir)?;
		for issue in issues {
			save_json(issue, &json_path(&dir, &issue.key))?;
		}
		tracing::debug!("saved raw issues");
		Ok(())
	}

	/// Every stored raw issue, sorted by file name. Missing directory means none.
	pub fn load_issues_raw(&self) -> Result<Vec<RawIssue>> {
		load_all(&self.issues_raw_dir())
	}

	pub fn load_issue_raw(&self, issue_key: &str) -> Result<Option<RawIssue>> {
		load_if_exists(&json_path(&self.issues_raw_dir(), issue_key))
	}

	pub fn save_issue(&self, record: &IssueRecord) -> Result<()> {
		save_json(record, &json_path(&self.issues_dir(), &record.issue_key))
	}

	pub fn load_issue(&self, issue_key: &str) -> Result<Option<IssueRecord>> {
		load_if_exists(&json_path(&self.issues_dir(), issue_key))
	}

	pub fn load_issues(&self) -> Result<Vec<IssueRecord>> {
		load_all(&self.issues_dir())
	}

	pub fn save_references(&self, references: &IssueReferences) -> Result<()> {
		save_json(references, &json_path(&self.references_dir(), &references.issue_key))
	}

	pub fn load_references(&self, issue_key: &str) -> Result<Option<IssueReferences>> {
		load_if_exists(&json_path(&self.references_dir(), issue_key))
	}

	/// Save to `all.json`, or to `<issue_key>.json` when the list is for one issue.
	pub fn save_commits(&self, issue_key: Option<&str>, commits: &[CommitRecord]) -> Result<()> {
		save_json(commits, &json_path(&self.commits_dir(), issue_key.unwrap_or(ALL)))
	}

	/// The full commit list, if it was cached before.
	pub fn load_commits(&self) -> Result<Option<Vec<CommitRecord>>> {
		load_if_exists(&json_path(&self.commits_dir(), ALL))
	}

	pub fn save_pull_requests(&self, issue_key: Option<&str>, pull_requests: &[PullRequestRecord]) -> Result<()> {
		save_json(pull_requests, &json_path(&self.pull_requests_dir(), issue_key.unwrap_or(ALL)))
	}

	pub fn load_pull_requests(&self) -> Result<Option<Vec<PullRequestRecord>>> {
		load_if_exists(&json_path(&self.pull_requests_dir(), ALL))
	}

	pub fn save_report(&self, issue_key: &str, tex: &str) -> Result<PathBuf> {
		let dir = self.reports_dir();
		create_dir_if_necessary(&dir)?;
		let path = self.report_path(issue_key);
		std::fs::write(&path, tex).wrap_err_with(|| format!("Failed to write {}", path.display()))?;
		Ok(path)
	}
}

/// File stem of a repository-wide list.
const ALL: &str = "all";

fn json_path(dir: &Path, issue_key: &str) -> PathBuf {
	dir.join(format!("{issue_key}.json"))
}

fn load_if_exists<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
	if !path.is_file() {
		return Ok(None);
	}
	load_json(path).map(Some)
}

fn load_all<T: DeserializeOwned>(dir: &Path) -> Result<Vec<T>> {
	if !dir.is_dir() {
		return Ok(Vec::new());
	}
	let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
		.wrap_err_with(|| format!("Failed to list {}", dir.display()))?
		.filter_map(|entry| entry.ok().map(|e| e.path()))
		.filter(|path| path.extension().is_some_and(|ext| ext == "json"))
		.collect();
	paths.sort();
	paths.iter().map(|path| load_json(path)).collect()
}
