//! Commits and pull requests of the GitHub repository behind a Jira project, cached per project.

use color_eyre::eyre::Result;
use tracing::instrument;

use crate::{
	github::{BoxedGitHubClient, CommitRecord, GitHubRepo, PullRequestRecord},
	store::ProjectStore,
};

pub struct RepositoryHistory {
	client: BoxedGitHubClient,
	store: ProjectStore,
	repo: GitHubRepo,
}

impl RepositoryHistory {
	pub fn new(client: BoxedGitHubClient, store: ProjectStore, repo: GitHubRepo) -> Self {
		Self { client, store, repo }
	}

	pub fn repo(&self) -> &GitHubRepo {
		&self.repo
	}

	/// Commits addressing `issue_key`, or all of them.
	///
	/// Served from `Commits/all.json`; the full list is fetched and cached on the first call.
	pub async fn commits(&self, issue_key: Option<&str>) -> Result<Vec<CommitRecord>> {
		let commits = match self.store.load_commits()? {
			Some(commits) => commits,
			None => self.fetch_commits(None, true).await?,
		};
		Ok(match issue_key {
			Some(key) => commits.into_iter().filter(|c| c.addresses(key)).collect(),
			None => commits,
		})
	}

	/// Fetch commits from GitHub, bypassing the cache.
	///
	/// With `save`, the result goes to `Commits/<issue_key>.json`, or to `all.json` without a key.
	#[instrument(skip(self), fields(project = %self.store.project(), repo = %self.repo))]
	pub async fn fetch_commits(&self, issue_key: Option<&str>, save: bool) -> Result<Vec<CommitRecord>> {
		tracing::info!("fetching commits, this may take a while");
		let raw = self.client.fetch_commits(&self.repo.owner, &self.repo.repo).await?;
		let commits: Vec<CommitRecord> = raw.iter().map(CommitRecord::from).filter(|c| issue_key.is_none_or(|key| c.addresses(key))).collect();

		if save {
			self.store.save_commits(issue_key, &commits)?;
		}
		tracing::info!(total = commits.len(), "fetched commits");
		Ok(commits)
	}

	/// Pull requests mentioning `issue_key` in their title or body, or all of them.
	///
	/// Served from `PullRequests/all.json`; the full list is fetched and cached on the first call.
	pub async fn pull_requests(&self, issue_key: Option<&str>) -> Result<Vec<PullRequestRecord>> {
		let pull_requests = match self.store.load_pull_requests()? {
			Some(pull_requests) => pull_requests,
			None => self.fetch_pull_requests(None, true).await?,
		};
		let project = self.store.project();
		Ok(match issue_key {
			Some(key) => pull_requests.into_iter().filter(|pr| pr.mentions(key, project)).collect(),
			None => pull_requests,
		})
	}

	/// Fetch pull requests with their comments from GitHub, bypassing the cache.
	///
	/// Comments are only requested for pull requests that pass the `issue_key` filter.
	#[instrument(skip(self), fields(project = %self.store.project(), repo = %self.repo))]
	pub async fn fetch_pull_requests(&self, issue_key: Option<&str>, save: bool) -> Result<Vec<PullRequestRecord>> {
		tracing::info!("fetching pull requests, this may take a while");
		let project = self.store.project();
		let raw = self.client.fetch_pull_requests(&self.repo.owner, &self.repo.repo).await?;

		let mut pull_requests = Vec::new();
		for pr in raw.iter().filter(|pr| issue_key.is_none_or(|key| pr.mentions(key, project))) {
			let comments = self.client.fetch_comments(&self.repo.owner, &self.repo.repo, pr.number).await?;
			pull_requests.push(PullRequestRecord::new(pr, &comments));
		}

		if save {
			self.store.save_pull_requests(issue_key, &pull_requests)?;
		}
		tracing::info!(total = pull_requests.len(), "fetched pull requests");
		Ok(pull_requests)
	}
}
