//! LaTeX report for an issue and the issues it links to.

use std::{collections::BTreeMap, fmt::Write as _, path::Path, process::Command};

use clap::ValueEnum;
use color_eyre::eyre::{Result, bail};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
	github::{CommitRecord, PullRequestRecord},
	history::RepositoryHistory,
	issue::{Comment, IssueRecord},
	markup::{Escaper, LatexEscaper, MarkupError, escape_with_listings},
	project::Project,
};

const PACKAGES: [&str; 7] = ["a4wide", "listings", "xcolor", "courier", "tabularx", "hyperref", "spverbatim"];

const LSTSET: &str = concat!(
	"tabsize = 4,",
	"showstringspaces = false,",
	"numbers = left,",
	r"commentstyle = \color{darkgreen} \ttfamily,",
	r"keywordstyle = \color{blue} \ttfamily,",
	r"stringstyle = \color{red} \ttfamily,",
	r"rulecolor = \color{black} \ttfamily,",
	r"basicstyle = \footnotesize \ttfamily,",
	"frame = single,",
	"breaklines = true,",
	r"literate = {\$}{{\textcolor{blue}{\$}}}1,",
	r"numberstyle = \tiny"
);

/// Parts of the report that can be left out.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, ValueEnum, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum ReportSection {
	#[display("Summary")]
	Summary,
	#[display("Description")]
	Description,
	#[display("Attachments")]
	Attachments,
	#[display("Commits")]
	Commits,
	#[display("Comments")]
	Comments,
	#[display("Pull requests")]
	#[value(name = "pull_requests")]
	PullRequests,
	/// The chapters of linked issues
	#[display("Connected issues")]
	#[value(name = "other_issues")]
	OtherIssues,
}

#[derive(Clone, Debug, Default)]
pub struct ReportOptions {
	/// Comment authors to leave out
	pub bots: Vec<String>,
	pub exclude: Vec<ReportSection>,
}

impl ReportOptions {
	fn includes(&self, section: ReportSection) -> bool {
		!self.exclude.contains(&section)
	}
}

/// GitHub activity related to one issue.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IssueActivity {
	pub commits: Vec<CommitRecord>,
	pub pull_requests: Vec<PullRequestRecord>,
}

/// An issue with its linked issues, ready to render.
#[derive(Clone, Debug)]
pub struct LatexReport {
	root: IssueRecord,
	connected: Vec<IssueRecord>,
	options: ReportOptions,
	/// Per issue key; `None` when no repository is linked, which drops the GitHub sections
	activity: Option<BTreeMap<String, IssueActivity>>,
}

impl LatexReport {
	/// Bot comments are dropped and comment bodies cleaned up front.
	pub fn new(root: IssueRecord, connected: Vec<IssueRecord>, options: ReportOptions) -> Self {
		let prepare = |record: IssueRecord| record.without_comments_by(&options.bots).with_clean_comment_bodies();
		let root = prepare(root);
		let connected = connected.into_iter().map(prepare).collect();
		Self {
			root,
			connected,
			options,
			activity: None,
		}
	}

	/// Load `issue_key` and every issue it links to from the project store, fetching what is missing.
	///
	/// A linked issue that cannot be loaded is skipped with a warning.
	#[instrument(skip(project, options), fields(project = %project.key()))]
	pub async fn load(project: &Project, issue_key: &str, options: ReportOptions) -> Result<Self> {
		let root = project.load_issue(issue_key).await?;
		let mut connected = Vec::new();
		for key in root.linked_issue_keys() {
			match project.load_issue(&key).await {
				Ok(record) => connected.push(record),
				Err(e) => tracing::warn!(issue_key = %key, error = %e, "skipping connected issue"),
			}
		}
		Ok(Self::new(root, connected, options))
	}

	/// Relate commits and pull requests of the repository to every issue of the report.
	#[instrument(skip_all, fields(issue_key = %self.root.issue_key, repo = %history.repo()))]
	pub async fn with_history(self, history: &RepositoryHistory) -> Result<Self> {
		let mut activity = BTreeMap::new();
		for record in std::iter::once(&self.root).chain(&self.connected) {
			let key = record.issue_key.as_str();
			let commits = history.commits(Some(key)).await?;
			let pull_requests = history.pull_requests(Some(key)).await?;
			activity.insert(key.to_string(), IssueActivity { commits, pull_requests });
		}
		tracing::info!(issues = activity.len(), "loaded GitHub activity");
		Ok(self.with_activity(activity))
	}

	pub fn with_activity(mut self, activity: BTreeMap<String, IssueActivity>) -> Self {
		self.activity = Some(activity);
		self
	}

	pub fn issue_key(&self) -> &str {
		&self.root.issue_key
	}

	pub fn render(&self) -> Result<String, MarkupError> {
		let mut doc = String::new();
		self.write_preamble(&mut doc);

		doc.push_str("\\begin{document}\n");
		doc.push_str("\\maketitle\n");
		doc.push_str("\\tableofcontents\n");

		self.write_issue(&mut doc, &self.root, true)?;
		if self.options.includes(ReportSection::OtherIssues) {
			for issue in &self.connected {
				self.write_issue(&mut doc, issue, false)?;
			}
		}

		doc.push_str("\\end{document}\n");
		Ok(doc)
	}

	fn write_preamble(&self, doc: &mut String) {
		let root = &self.root;
		doc.push_str("\\documentclass{report}\n");
		for package in PACKAGES {
			let _ = writeln!(doc, "\\usepackage{{{package}}}");
		}
		doc.push_str("\\UseRawInputEncoding\n");
		let _ = writeln!(doc, "\\title{{{}}}", LatexEscaper.escape(&root.issue_key));
		let _ = writeln!(doc, "\\author{{{}}}", LatexEscaper.escape(root.author.as_deref().unwrap_or("no author")));
		let _ = writeln!(doc, "\\date{{{}}}", LatexEscaper.escape(creation_date(&root.created)));
		let _ = writeln!(doc, "\\lstset{{{LSTSET}}}");
		doc.push_str("\\definecolor{darkgreen}{rgb}{0,0.6,0}\n");
	}

	fn write_issue(&self, doc: &mut String, issue: &IssueRecord, root_issue: bool) -> Result<(), MarkupError> {
		let kind = if root_issue { "Root issue" } else { "Connected issue" };
		let _ = writeln!(doc, "\\chapter{{{kind} {}}}", LatexEscaper.escape(&issue.issue_key));

		if self.options.includes(ReportSection::Summary) {
			section(doc, ReportSection::Summary);
			doc.push_str(&escape_with_listings(&issue.summary)?);
			doc.push('\n');
		}

		if self.options.includes(ReportSection::Description) {
			section(doc, ReportSection::Description);
			doc.push_str(&escape_with_listings(&issue.description)?);
			doc.push('\n');
		}

		if self.options.includes(ReportSection::Attachments) {
			section(doc, ReportSection::Attachments);
			let items: Vec<String> = issue.attachments.iter().map(|a| hyperlink(&a.content, &a.filename)).collect();
			enumerate(doc, &items, "No attachments");
		}

		let activity = self.activity.as_ref().map(|a| a.get(&issue.issue_key).cloned().unwrap_or_default());

		if let Some(activity) = &activity
			&& self.options.includes(ReportSection::Commits)
		{
			section(doc, ReportSection::Commits);
			let items: Vec<String> = activity.commits.iter().map(commit_item).collect();
			enumerate(doc, &items, "No related commits");
		}

		if self.options.includes(ReportSection::Comments) {
			section(doc, ReportSection::Comments);
			let items = issue.comments.iter().map(comment_item).collect::<Result<Vec<_>, _>>()?;
			enumerate(doc, &items, "No comments");
		}

		if let Some(activity) = &activity
			&& self.options.includes(ReportSection::PullRequests)
		{
			section(doc, ReportSection::PullRequests);
			if activity.pull_requests.is_empty() {
				doc.push_str("No pull requests\n");
			}
			for pr in &activity.pull_requests {
				write_pull_request(doc, pr);
			}
		}
		Ok(())
	}
}

/// `Commit <short sha> by <author> (<date>): <message>`
fn commit_item(commit: &CommitRecord) -> String {
	format!(
		"Commit \\textbf{{{}}} by \\textbf{{{}}} ({}): {}",
		LatexEscaper.escape(&commit.short_sha),
		LatexEscaper.escape(&commit.author),
		LatexEscaper.escape(&commit.date),
		LatexEscaper.escape(&commit.message)
	)
}

fn write_pull_request(doc: &mut String, pr: &PullRequestRecord) {
	let _ = writeln!(doc, "\\subsection{{Pull request {}}}", pr.number);
	for (label, value) in [("Title", &pr.title), ("Author", &pr.author), ("Date", &pr.date), ("Status", &pr.status)] {
		let _ = writeln!(doc, "\\textbf{{{label}}}: {}\\\\", LatexEscaper.escape(value));
	}
	doc.push_str("\\textbf{Comments}: ");
	let items: Vec<String> = pr
		.comments
		.iter()
		.map(|c| format!("\\textbf{{{}}} ({}): {}", LatexEscaper.escape(&c.author), LatexEscaper.escape(&c.date), LatexEscaper.escape(&c.body.replace('\r', "\n"))))
		.collect();
	enumerate(doc, &items, "No comments");
}

fn section(doc: &mut String, section: ReportSection) {
	let _ = writeln!(doc, "\\section{{{section}}}");
}

fn enumerate(doc: &mut String, items: &[String], when_empty: &str) {
	if items.is_empty() {
		doc.push_str(when_empty);
		doc.push('\n');
		return;
	}
	doc.push_str("\\begin{enumerate}\n");
	for item in items {
		let _ = writeln!(doc, "\\item {item}");
	}
	doc.push_str("\\end{enumerate}\n");
}

fn comment_item(comment: &Comment) -> Result<String, MarkupError> {
	let author = LatexEscaper.escape(&format!("{}: ", comment.author));
	Ok(format!("\\textbf{{{author}}}{}", escape_with_listings(&comment.body)?))
}

/// `\href` with an underlined, escaped description. The URL goes in as is.
fn hyperlink(url: &str, description: &str) -> String {
	format!("\\href{{{url}}}{{\\underline{{{}}}}}", LatexEscaper.escape(description))
}

/// Date part of a Jira timestamp (`2010-01-02T10:00:00.000+0000` -> `2010-01-02`).
fn creation_date(created: &str) -> &str {
	created.split('T').next().unwrap_or(created)
}

/// Run `pdflatex` twice next to `tex_path`, so the table of contents is filled in.
#[instrument]
pub fn compile_pdf(tex_path: &Path) -> Result<()> {
	let dir = tex_path.parent().unwrap_or_else(|| Path::new("."));
	for _ in 0..2 {
		let status = Command::new("pdflatex").arg("-interaction=nonstopmode").arg("-output-directory").arg(dir).arg(tex_path).status()?;
		if !status.success() {
			bail!("pdflatex failed on {} with {status}", tex_path.display());
		}
	}
	Ok(())
}
