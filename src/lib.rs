//! Reference extraction and LaTeX reports for Jira issues.
//!
//! The core is [`refs`] (classifying URLs, revision ids and issue links found in free text) and
//! [`markup`] (escaping Jira wiki text for LaTeX while keeping code listings verbatim). The rest is
//! plumbing around a Jira project: fetching, storing, parsing and reporting, optionally joined with
//! the commits and pull requests of its GitHub repository.

pub mod config;
pub mod github;
pub mod history;
pub mod issue;
pub mod jira;
pub mod markup;
pub mod mock_github;
pub mod mock_jira;
pub mod project;
pub mod refs;
pub mod report;
pub mod store;

pub use config::AppConfig;
pub use github::{BoxedGitHubClient, GitHubClient, GitHubRepo, RealGitHubClient};
pub use history::RepositoryHistory;
pub use issue::{IssueRecord, RawIssue};
pub use jira::{BoxedJiraClient, FetchedIssues, JiraClient, RealJiraClient};
pub use markup::{MarkupError, escape_with_listings, extract_listings};
pub use project::Project;
pub use refs::{Classifier, ExtractionResult, classify};
pub use report::{IssueReferences, LatexReport, ReportOptions, ReportSection};
pub use store::ProjectStore;
