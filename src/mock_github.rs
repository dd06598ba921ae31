//! Mock GitHub client for testing purposes.
//!
//! Repositories exist once something was added to them; any other repository answers like the
//! real API does for an unknown one. Every call emits a `tracing` event with target `mock_github`
//! and is recorded in a call log.

use std::{collections::HashMap, sync::Mutex};

use async_trait::async_trait;
use color_eyre::eyre::{Result, bail};
use tracing::instrument;

use crate::github::{GitHubClient, GitHubComment, GitHubCommit, GitHubCommitAuthor, GitHubCommitDetail, GitHubPullRequest, GitHubUser};

/// Key for looking up repository contents by owner/repo
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
struct RepoKey {
	owner: String,
	repo: String,
}

impl RepoKey {
	fn new(owner: &str, repo: &str) -> Self {
		Self {
			owner: owner.to_string(),
			repo: repo.to_string(),
		}
	}
}

#[derive(Clone, Debug, Default)]
struct MockRepoData {
	/// Newest first, like the commits endpoint
	commits: Vec<GitHubCommit>,
	pull_requests: Vec<GitHubPullRequest>,
	/// Comments per pull request number
	comments: HashMap<u64, Vec<GitHubComment>>,
}

/// Mock GitHub client that stores all state in memory.
/// Thread-safe for use in async contexts.
#[derive(Default)]
pub struct MockGitHubClient {
	repos: Mutex<HashMap<RepoKey, MockRepoData>>,

	/// Call log for debugging
	call_log: Mutex<Vec<String>>,
}

impl MockGitHubClient {
	pub fn new() -> Self {
		Self::default()
	}

	/// Add a commit on top of the history; `date` is an ISO 8601 timestamp.
	pub fn add_commit(&self, owner: &str, repo: &str, sha: &str, author: &str, date: &str, message: &str) {
		let commit = GitHubCommit {
			sha: sha.to_string(),
			commit: GitHubCommitDetail {
				message: message.to_string(),
				author: GitHubCommitAuthor {
					name: author.to_string(),
					date: date.to_string(),
				},
			},
		};
		let mut repos = self.repos.lock().unwrap();
		repos.entry(RepoKey::new(owner, repo)).or_default().commits.insert(0, commit);
	}

	#[expect(clippy::too_many_arguments)]
	pub fn add_pull_request(&self, owner: &str, repo: &str, number: u64, title: &str, body: &str, state: &str, author: &str, created_at: &str) {
		let pull_request = GitHubPullRequest {
			number,
			title: title.to_string(),
			body: if body.is_empty() { None } else { Some(body.to_string()) },
			user: GitHubUser { login: author.to_string() },
			state: state.to_string(),
			created_at: created_at.to_string(),
		};
		let mut repos = self.repos.lock().unwrap();
		repos.entry(RepoKey::new(owner, repo)).or_default().pull_requests.push(pull_request);
	}

	pub fn add_comment(&self, owner: &str, repo: &str, number: u64, body: &str, author: &str, created_at: &str) {
		let comment = GitHubComment {
			body: Some(body.to_string()),
			user: GitHubUser { login: author.to_string() },
			created_at: created_at.to_string(),
		};
		let mut repos = self.repos.lock().unwrap();
		repos.entry(RepoKey::new(owner, repo)).or_default().comments.entry(number).or_default().push(comment);
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

	fn with_repo<T>(&self, owner: &str, repo: &str, f: impl FnOnce(&MockRepoData) -> T) -> Result<T> {
		let repos = self.repos.lock().unwrap();
		match repos.get(&RepoKey::new(owner, repo)) {
			Some(data) => Ok(f(data)),
			None => bail!("Failed to fetch {owner}/{repo}: 404 Not Found - {{\"message\":\"Not Found\"}}"),
		}
	}
}

#[async_trait]
impl GitHubClient for MockGitHubClient {
	#[instrument(skip(self), name = "MockGitHubClient::fetch_commits")]
	async fn fetch_commits(&self, owner: &str, repo: &str) -> Result<Vec<GitHubCommit>> {
		tracing::info!(target: "mock_github", owner, repo, "fetch_commits");
		self.log_call(&format!("fetch_commits({owner}, {repo})"));

		self.with_repo(owner, repo, |data| data.commits.clone())
	}

	#[instrument(skip(self), name = "MockGitHubClient::fetch_pull_requests")]
	async fn fetch_pull_requests(&self, owner: &str, repo: &str) -> Result<Vec<GitHubPullRequest>> {
		tracing::info!(target: "mock_github", owner, repo, "fetch_pull_requests");
		self.log_call(&format!("fetch_pull_requests({owner}, {repo})"));

		self.with_repo(owner, repo, |data| data.pull_requests.clone())
	}

	#[instrument(skip(self), name = "MockGitHubClient::fetch_comments")]
	async fn fetch_comments(&self, owner: &str, repo: &str, number: u64) -> Result<Vec<GitHubComment>> {
		tracing::info!(target: "mock_github", owner, repo, number, "fetch_comments");
		self.log_call(&format!("fetch_comments({owner}, {repo}, {number})"));

		self.with_repo(owner, repo, |data| data.comments.get(&number).cloned().unwrap_or_default())
	}
}
