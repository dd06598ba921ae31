//! Layered settings: built-in defaults, then an optional TOML file, then `JIRA_REFS__*` environment variables.

use std::path::{Path, PathBuf};

use color_eyre::eyre::{Result, WrapErr};
use serde::Deserialize;
use smart_default::SmartDefault;

use crate::{
	refs::{Classifier, DEFAULT_MAILING_LIST_KEYS, DEFAULT_REVISION_HOST},
	report::{ReportOptions, ReportSection},
};

pub const APP_NAME: &str = "jira_refs";
pub const ENV_PREFIX: &str = "JIRA_REFS";

#[derive(Clone, Debug, Deserialize, PartialEq, SmartDefault)]
#[serde(default)]
pub struct AppConfig {
	/// Base URL of the Jira instance.
	#[default(String::from("https://issues.apache.org/jira/"))]
	pub server: String,
	/// Sent as a bearer token when set. Anonymous access otherwise.
	pub token: Option<String>,
	/// Root under which `Projects/` and `Reports/` are created.
	#[default(PathBuf::from("."))]
	pub data_dir: PathBuf,
	/// Issues per search request.
	#[default(100)]
	pub page_size: u32,
	pub references: ReferencesConfig,
	pub report: ReportConfig,
	pub github: GitHubConfig,
}

#[derive(Clone, Debug, Deserialize, PartialEq, SmartDefault)]
#[serde(default)]
pub struct ReferencesConfig {
	#[default(DEFAULT_MAILING_LIST_KEYS.iter().map(|s| s.to_string()).collect())]
	pub mailing_list_keys: Vec<String>,
	/// URLs on this host are revision links, not generic URLs. Empty disables the filter.
	#[default(String::from(DEFAULT_REVISION_HOST))]
	pub revision_host: String,
	#[default(true)]
	pub detect_commit_hashes: bool,
}

impl ReferencesConfig {
	pub fn classifier(&self) -> Classifier {
		Classifier {
			mailing_list_keys: self.mailing_list_keys.clone(),
			revision_host: (!self.revision_host.is_empty()).then(|| self.revision_host.clone()),
			detect_commit_hashes: self.detect_commit_hashes,
		}
	}
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReportConfig {
	/// Comment authors left out of reports.
	pub bots: Vec<String>,
	/// Report sections left out: `summary`, `description`, `attachments`, `commits`, `comments`,
	/// `pull_requests`, `other_issues`.
	pub exclude: Vec<ReportSection>,
	/// Run `pdflatex` on the generated `.tex`.
	pub compile_pdf: bool,
}

/// Repository whose commits and pull requests are related to the issues.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct GitHubConfig {
	/// `owner/repo` or `https://github.com/owner/repo`. Unset leaves reports without GitHub sections.
	pub repository: Option<String>,
	/// Personal access token. Anonymous requests are heavily rate limited.
	pub token: Option<String>,
}

impl ReportConfig {
	/// Options from the config, extended with `bots` and `exclude` given on the command line.
	pub fn options(&self, bots: &[String], exclude: &[ReportSection]) -> ReportOptions {
		let mut options = ReportOptions {
			bots: self.bots.clone(),
			exclude: self.exclude.clone(),
		};
		options.bots.extend(bots.iter().cloned());
		options.exclude.extend(exclude.iter().copied());
		options
	}
}

impl AppConfig {
	/// Load settings. An explicit `path` must exist; the XDG location is optional.
	pub fn load(path: Option<&Path>) -> Result<Self> {
		let mut builder = config::Config::builder();
		match path {
			Some(path) => {
				builder = builder.add_source(config::File::from(path).required(true));
			}
			None => {
				if let Some(found) = default_config_path() {
					tracing::debug!(path = %found.display(), "using config file");
					builder = builder.add_source(config::File::from(found.as_path()).required(false));
				}
			}
		}
		let env = config::Environment::with_prefix(ENV_PREFIX)
			.separator("__")
			.list_separator(",")
			.with_list_parse_key("references.mailing_list_keys")
			.with_list_parse_key("report.bots")
			.with_list_parse_key("report.exclude")
			.try_parsing(true);
		builder = builder.add_source(env);

		let settings = builder.build().wrap_err("failed to read configuration")?;
		settings.try_deserialize().wrap_err("configuration is not correctly formatted")
	}
}

fn default_config_path() -> Option<PathBuf> {
	xdg::BaseDirectories::with_prefix(APP_NAME).find_config_file("config.toml")
}
