use std::{fmt, sync::Arc};

use async_trait::async_trait;
use color_eyre::eyre::{Result, bail, eyre};
use reqwest::Client;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{config::GitHubConfig, refs::extract_issues};

/// Items per page requested from list endpoints; GitHub caps this at 100.
const PER_PAGE: u32 = 100;

#[derive(Clone, Debug, Deserialize)]
pub struct GitHubUser {
	pub login: String,
}

/// Entry of `GET /repos/{owner}/{repo}/commits`.
#[derive(Clone, Debug, Deserialize)]
pub struct GitHubCommit {
	pub sha: String,
	pub commit: GitHubCommitDetail,
}

#[derive(Clone, Debug, Deserialize)]
pub struct GitHubCommitDetail {
	pub message: String,
	pub author: GitHubCommitAuthor,
}

/// Git author, as opposed to the GitHub account that pushed.
#[derive(Clone, Debug, Deserialize)]
pub struct GitHubCommitAuthor {
	pub name: String,
	/// ISO 8601 timestamp
	pub date: String,
}

/// Entry of `GET /repos/{owner}/{repo}/pulls`.
#[derive(Clone, Debug, Deserialize)]
pub struct GitHubPullRequest {
	pub number: u64,
	pub title: String,
	pub body: Option<String>,
	pub user: GitHubUser,
	pub state: String, // "open" or "closed"
	pub created_at: String,
}

/// Conversation comment of an issue or pull request.
#[derive(Clone, Debug, Deserialize)]
pub struct GitHubComment {
	pub body: Option<String>,
	pub user: GitHubUser,
	pub created_at: String,
}

/// Cached form of a commit.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
pub struct CommitRecord {
	pub sha: String,
	pub short_sha: String,
	pub author: String,
	/// `YYYY-MM-DD`
	pub date: String,
	pub message: String,
}

impl From<&GitHubCommit> for CommitRecord {
	fn from(c: &GitHubCommit) -> Self {
		Self {
			sha: c.sha.clone(),
			short_sha: c.sha.chars().take(7).collect(),
			author: c.commit.author.name.clone(),
			date: date_part(&c.commit.author.date),
			message: c.commit.message.clone(),
		}
	}
}

impl CommitRecord {
	/// Commits addressing an issue start their message with `<KEY>:`.
	pub fn addresses(&self, issue_key: &str) -> bool {
		self.message.strip_prefix(issue_key).is_some_and(|rest| rest.starts_with(':'))
	}
}

/// Cached form of a pull request with its conversation.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
pub struct PullRequestRecord {
	pub number: u64,
	pub title: String,
	pub author: String,
	pub status: String,
	/// `YYYY-MM-DD`
	pub date: String,
	pub body: String,
	pub comments: Vec<PullRequestComment>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
pub struct PullRequestComment {
	pub author: String,
	pub date: String,
	pub body: String,
}

impl From<&GitHubComment> for PullRequestComment {
	fn from(c: &GitHubComment) -> Self {
		Self {
			author: c.user.login.clone(),
			date: date_part(&c.created_at),
			body: c.body.clone().unwrap_or_default(),
		}
	}
}

impl PullRequestRecord {
	pub fn new(pr: &GitHubPullRequest, comments: &[GitHubComment]) -> Self {
		Self {
			number: pr.number,
			title: pr.title.clone(),
			author: pr.user.login.clone(),
			status: pr.state.clone(),
			date: date_part(&pr.created_at),
			body: pr.body.clone().unwrap_or_default(),
			comments: comments.iter().map(PullRequestComment::from).collect(),
		}
	}

	/// Whether `issue_key` of `project` appears in the title or the body.
	pub fn mentions(&self, issue_key: &str, project: &str) -> bool {
		mentions(&self.title, self.body.as_str(), issue_key, project)
	}
}

impl GitHubPullRequest {
	pub fn mentions(&self, issue_key: &str, project: &str) -> bool {
		mentions(&self.title, self.body.as_deref().unwrap_or_default(), issue_key, project)
	}
}

fn mentions(title: &str, body: &str, issue_key: &str, project: &str) -> bool {
	extract_issues(title, project).contains(issue_key) || extract_issues(body, project).contains(issue_key)
}

/// Date part of an ISO 8601 timestamp.
fn date_part(timestamp: &str) -> String {
	timestamp.split('T').next().unwrap_or(timestamp).to_string()
}

/// `owner/repo` of a GitHub repository.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GitHubRepo {
	pub owner: String,
	pub repo: String,
}

impl GitHubRepo {
	/// Accepts `owner/repo`, `github.com/owner/repo` and `https://github.com/owner/repo(.git)`.
	pub fn parse(s: &str) -> Result<Self> {
		let s = s.trim();
		let path = s.strip_prefix("https://").or_else(|| s.strip_prefix("http://")).unwrap_or(s);
		let path = path.strip_prefix("github.com/").unwrap_or(path);
		let path = path.trim_end_matches('/');
		let path = path.strip_suffix(".git").unwrap_or(path);

		match path.split('/').collect::<Vec<_>>().as_slice() {
			[owner, repo] if !owner.is_empty() && !repo.is_empty() => Ok(Self {
				owner: owner.to_string(),
				repo: repo.to_string(),
			}),
			_ => Err(eyre!("Invalid GitHub repository {s:?}. Expected: https://github.com/owner/repo")),
		}
	}
}

impl fmt::Display for GitHubRepo {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}/{}", self.owner, self.repo)
	}
}

//==============================================================================
// GitHub Client Trait
//==============================================================================

/// Read-only GitHub operations needed to relate commits and pull requests to issues.
/// Implemented by the HTTP client and by the in-memory mock used in tests.
#[async_trait]
pub trait GitHubClient: Send + Sync {
	/// Every commit on the default branch, newest first
	async fn fetch_commits(&self, owner: &str, repo: &str) -> Result<Vec<GitHubCommit>>;

	/// Every pull request, open and closed
	async fn fetch_pull_requests(&self, owner: &str, repo: &str) -> Result<Vec<GitHubPullRequest>>;

	/// Conversation comments of an issue or pull request
	async fn fetch_comments(&self, owner: &str, repo: &str, number: u64) -> Result<Vec<GitHubComment>>;
}

/// Type alias for a boxed GitHubClient
pub type BoxedGitHubClient = Arc<dyn GitHubClient>;

//==============================================================================
// Real GitHub Client Implementation
//==============================================================================

/// GitHub REST client over HTTP
pub struct RealGitHubClient {
	http_client: Client,
	github_token: Option<String>,
}

impl RealGitHubClient {
	pub fn new(config: &GitHubConfig) -> Self {
		Self {
			http_client: Client::new(),
			github_token: config.token.clone(),
		}
	}

	fn get(&self, api_url: &str) -> reqwest::RequestBuilder {
		let request = self.http_client.get(api_url).header("User-Agent", "jira_refs").header("Accept", "application/vnd.github+json");
		match &self.github_token {
			Some(token) => request.header("Authorization", format!("token {token}")),
			None => request,
		}
	}

	/// Follow `page=1,2,..` until a page comes back empty.
	async fn fetch_all_pages<T: DeserializeOwned>(&self, api_url: &str, what: &str) -> Result<Vec<T>> {
		let separator = if api_url.contains('?') { '&' } else { '?' };
		let mut items = Vec::new();
		for page in 1.. {
			let res = self.get(&format!("{api_url}{separator}per_page={PER_PAGE}&page={page}")).send().await?;

			if !res.status().is_success() {
				let status = res.status();
				let body = res.text().await.unwrap_or_default();
				bail!("Failed to fetch {what}: {status} - {body}");
			}

			let batch = res.json::<Vec<T>>().await?;
			if batch.is_empty() {
				break;
			}
			items.extend(batch);
		}
		Ok(items)
	}
}

#[async_trait]
impl GitHubClient for RealGitHubClient {
	async fn fetch_commits(&self, owner: &str, repo: &str) -> Result<Vec<GitHubCommit>> {
		let api_url = format!("https://api.github.com/repos/{owner}/{repo}/commits");
		self.fetch_all_pages(&api_url, "commits").await
	}

	async fn fetch_pull_requests(&self, owner: &str, repo: &str) -> Result<Vec<GitHubPullRequest>> {
		let api_url = format!("https://api.github.com/repos/{owner}/{repo}/pulls?state=all");
		self.fetch_all_pages(&api_url, "pull requests").await
	}

	async fn fetch_comments(&self, owner: &str, repo: &str, number: u64) -> Result<Vec<GitHubComment>> {
		let api_url = format!("https://api.github.com/repos/{owner}/{repo}/issues/{number}/comments");
		self.fetch_all_pages(&api_url, &format!("comments of #{number}")).await
	}
}
