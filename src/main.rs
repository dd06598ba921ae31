use std::{collections::BTreeMap, io::Read as _, path::PathBuf, sync::Arc};

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr, bail};
use jira_refs::{
	AppConfig, GitHubRepo, IssueReferences, LatexReport, Project, ProjectStore, RealGitHubClient, RealJiraClient, ReportSection, RepositoryHistory,
	markup::{LatexEscaper, Pairing, escape_with_listings_using},
	report::compile_pdf,
};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _};

/// When set, trace events are written as JSON lines to this file instead of stderr.
const TRACE_FILE_ENV: &str = "JIRA_REFS_TRACE_FILE";

#[derive(Parser)]
#[command(author, version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_HASH"), ")"), about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
	#[command(subcommand)]
	command: Commands,
	/// Config file; defaults to $XDG_CONFIG_HOME/jira_refs/config.toml when present
	#[arg(long, global = true)]
	config: Option<PathBuf>,
	/// Overrides `data_dir` from the config
	#[arg(long, global = true)]
	data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
	/// Download every issue of a project into Projects/<project>/Issues_raw
	Fetch(FetchArgs),
	/// Turn raw issues into compact records in Projects/<project>/Issues
	Parse(ParseArgs),
	/// Print the references found in text or in stored issues, as JSON
	Refs(RefsArgs),
	/// Escape Jira text for LaTeX, keeping code listings verbatim
	Escape(EscapeArgs),
	/// Write a LaTeX report for an issue and its linked issues into Reports/
	Report(ReportArgs),
	/// Print the commits and pull requests of the GitHub repository related to an issue, as JSON
	Github(GithubArgs),
}

#[derive(Args)]
struct FetchArgs {
	project: String,
	/// Page to start at; pages hold `page_size` issues
	#[arg(long, default_value_t = 0)]
	start_block: u64,
	#[arg(long)]
	no_save: bool,
}

#[derive(Args)]
struct ParseArgs {
	project: String,
	/// Parse only this issue, fetching it if needed
	#[arg(long)]
	issue: Option<String>,
}

#[derive(Args)]
struct RefsArgs {
	project: String,
	/// Only this issue, fetching and parsing it if needed
	#[arg(long, conflicts_with = "text")]
	issue: Option<String>,
	/// Classify this text instead of stored issues
	#[arg(long)]
	text: Option<String>,
}

#[derive(Args)]
struct EscapeArgs {
	/// Read from stdin when absent
	#[arg(long)]
	text: Option<String>,
	/// Fail on an odd number of {noformat} markers
	#[arg(long)]
	strict: bool,
}

#[derive(Args)]
struct ReportArgs {
	project: String,
	issue: String,
	/// Comment author to leave out; repeatable
	#[arg(long = "bot")]
	bots: Vec<String>,
	/// Section to leave out; repeatable
	#[arg(long, value_enum)]
	exclude: Vec<ReportSection>,
	/// Also run pdflatex on the result
	#[arg(long)]
	pdf: bool,
	/// GitHub repository whose commits and pull requests are added; overrides `github.repository`
	#[arg(long)]
	github: Option<String>,
}

#[derive(Args)]
struct GithubArgs {
	project: String,
	/// Only commits and pull requests related to this issue
	#[arg(long)]
	issue: Option<String>,
	/// Overrides `github.repository`
	#[arg(long)]
	repository: Option<String>,
	/// Fetch again instead of using Commits/all.json and PullRequests/all.json
	#[arg(long)]
	refresh: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;
	init_tracing()?;

	let cli = Cli::parse();
	let mut config = AppConfig::load(cli.config.as_deref())?;
	if let Some(data_dir) = cli.data_dir {
		config.data_dir = data_dir;
	}

	match cli.command {
		Commands::Fetch(args) => {
			let project = open_project(&config, &args.project);
			let fetched = project.fetch_issues_raw(args.start_block, !args.no_save).await?;
			println!("{}: fetched {} issues", args.project, fetched.len());
		}
		Commands::Parse(args) => {
			let project = open_project(&config, &args.project);
			match args.issue {
				Some(key) => {
					let record = project.parse_issue(&key).await?;
					println!("{}", serde_json::to_string_pretty(&record)?);
				}
				None => {
					let records = project.parse_issues(None)?;
					println!("{}: parsed {} issues", args.project, records.len());
				}
			}
		}
		Commands::Refs(args) => refs(&config, args).await?,
		Commands::Github(args) => github(&config, args).await?,
		Commands::Escape(args) => {
			let text = match args.text {
				Some(text) => text,
				None => {
					let mut buf = String::new();
					std::io::stdin().read_to_string(&mut buf).wrap_err("failed to read stdin")?;
					buf
				}
			};
			let pairing = if args.strict { Pairing::Strict } else { Pairing::Lenient };
			println!("{}", escape_with_listings_using(&text, &LatexEscaper, pairing)?);
		}
		Commands::Report(args) => {
			let project = open_project(&config, &args.project);
			let options = config.report.options(&args.bots, &args.exclude);
			let mut report = LatexReport::load(&project, &args.issue, options).await?;
			if let Some(history) = open_history(&config, &args.project, args.github.as_deref())? {
				report = report.with_history(&history).await?;
			}
			let path = project.store().save_report(report.issue_key(), &report.render()?)?;
			if args.pdf || config.report.compile_pdf {
				compile_pdf(&path)?;
			}
			tracing::info!(path = %path.display(), "report written");
			println!("{}", path.display());
		}
	}

	Ok(())
}

async fn github(config: &AppConfig, args: GithubArgs) -> Result<()> {
	let Some(history) = open_history(config, &args.project, args.repository.as_deref())? else {
		bail!("No GitHub repository given; pass --repository or set `github.repository` in the config");
	};
	let issue = args.issue.as_deref();
	let (commits, pull_requests) = if args.refresh {
		(history.fetch_commits(issue, true).await?, history.fetch_pull_requests(issue, true).await?)
	} else {
		(history.commits(issue).await?, history.pull_requests(issue).await?)
	};
	tracing::info!(repo = %history.repo(), commits = commits.len(), pull_requests = pull_requests.len(), "loaded GitHub activity");
	let output = serde_json::json!({ "commits": commits, "pull_requests": pull_requests });
	println!("{}", serde_json::to_string_pretty(&output)?);
	Ok(())
}

async fn refs(config: &AppConfig, args: RefsArgs) -> Result<()> {
	let classifier = config.references.classifier();

	if let Some(text) = args.text {
		let result = classifier.classify(&text, &args.project);
		tracing::info!(project = %args.project, found = result.len(), "classified text");
		println!("{}", serde_json::to_string_pretty(&result)?);
		return Ok(());
	}

	let project = open_project(config, &args.project);
	let records = match args.issue {
		Some(key) => vec![project.load_issue(&key).await?],
		None => project.store().load_issues()?,
	};
	if records.is_empty() {
		bail!("No parsed issues for {}; run `parse {}` first", args.project, args.project);
	}

	let mut totals = BTreeMap::new();
	for record in &records {
		let references = IssueReferences::collect(record, &classifier);
		project.store().save_references(&references)?;
		totals.insert(references.issue_key.clone(), references.total);
	}
	tracing::info!(project = %args.project, issues = totals.len(), "collected references");
	println!("{}", serde_json::to_string_pretty(&totals)?);
	Ok(())
}

fn open_project(config: &AppConfig, project: &str) -> Project {
	let client = Arc::new(RealJiraClient::new(config));
	Project::new(client, ProjectStore::new(&config.data_dir, project), config.page_size)
}

/// `None` when neither the command line nor the config names a repository.
fn open_history(config: &AppConfig, project: &str, repository: Option<&str>) -> Result<Option<RepositoryHistory>> {
	let Some(repository) = repository.or(config.github.repository.as_deref()) else {
		return Ok(None);
	};
	let repo = GitHubRepo::parse(repository)?;
	let client = Arc::new(RealGitHubClient::new(&config.github));
	Ok(Some(RepositoryHistory::new(client, ProjectStore::new(&config.data_dir, project), repo)))
}

fn init_tracing() -> Result<()> {
	let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(option_env!("LOG_DIRECTIVES").unwrap_or("info")))?;

	match std::env::var_os(TRACE_FILE_ENV) {
		Some(path) => {
			let file = std::fs::File::create(&path).wrap_err_with(|| format!("failed to create trace file {}", path.to_string_lossy()))?;
			tracing_subscriber::registry().with(filter).with(fmt::layer().json().with_writer(std::sync::Mutex::new(file))).init();
		}
		None => {
			tracing_subscriber::registry().with(filter).with(fmt::layer().with_writer(std::io::stderr)).init();
		}
	}
	Ok(())
}
