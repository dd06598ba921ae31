//! URL extraction from free text.

use std::{collections::BTreeSet, sync::LazyLock};

use fancy_regex::{Regex, RegexBuilder};

use super::{issue_link::extract_issues, normalize::normalize};

/// Host serving revision pages; links to it are revisions, not references.
pub const DEFAULT_REVISION_HOST: &str = "svn.apache.org";

/// Diego Perini's URL pattern (https://gist.github.com/dperini/729294), kept case-sensitive.
///
/// - scheme is optional, `//` is not
/// - optional `user:pass@`
/// - host is either a public IPv4 literal (private and reserved ranges rejected by the lookaheads)
///   or dot-separated labels ending in a TLD of at least two letters, with an optional trailing dot
/// - optional 2-5 digit port, then an optional `[/?#]`-led tail of non-whitespace
///
/// The userinfo group backtracks quadratically inside long whitespace-free tokens, hence the raised limit.
static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
	RegexBuilder::new(concat!(
		r"(?:(?:(?:https?|ftp):)?//)",
		r"(?:\S+(?::\S*)?@)?",
		r"(?:",
		r"(?!(?:10|127)(?:\.\d{1,3}){3})",
		r"(?!(?:169\.254|192\.168)(?:\.\d{1,3}){2})",
		r"(?!172\.(?:1[6-9]|2\d|3[0-1])(?:\.\d{1,3}){2})",
		r"(?:[1-9]\d?|1\d\d|2[01]\d|22[0-3])",
		r"(?:\.(?:1?\d{1,2}|2[0-4]\d|25[0-5])){2}",
		r"(?:\.(?:[1-9]\d?|1\d\d|2[0-4]\d|25[0-4]))",
		r"|",
		r"(?:(?:[a-z0-9\x{00a1}-\x{ffff}][a-z0-9\x{00a1}-\x{ffff}_-]{0,62})?[a-z0-9\x{00a1}-\x{ffff}]\.)+",
		r"(?:[a-z\x{00a1}-\x{ffff}]{2,}\.?)",
		r")",
		r"(?::\d{2,5})?",
		r"(?:[/?#]\S*)?",
	))
	.backtrack_limit(URL_BACKTRACK_LIMIT)
	.build()
	.expect("URL_PATTERN: hardcoded regex is valid")
});

const URL_BACKTRACK_LIMIT: usize = 10_000_000;

/// A single trailing character in this set is a false capture of the surrounding sentence.
const TRAILING_PUNCTUATION: [char; 6] = ['.', '\\', '?', ',', ':', '/'];

/// Which post-match filters to apply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UrlFilters {
	/// Drop URLs pointing at this host. `None` keeps revision links.
	pub revision_host: Option<String>,
	/// Drop URLs that contain an issue key of the project.
	pub issue_urls: bool,
}

impl Default for UrlFilters {
	fn default() -> Self {
		Self {
			revision_host: Some(DEFAULT_REVISION_HOST.to_string()),
			issue_urls: true,
		}
	}
}

impl UrlFilters {
	/// No filtering at all: every cleaned match is returned.
	pub fn none() -> Self {
		Self {
			revision_host: None,
			issue_urls: false,
		}
	}
}

/// Extract unique URLs from `text`, dropping revision-server links and links to other issues of `project`.
pub fn extract_urls(text: &str, project: &str) -> BTreeSet<String> {
	extract_urls_with(text, project, &UrlFilters::default())
}

/// [`extract_urls`] with explicit filters.
///
/// Every stage builds a fresh set, so two matches that only differ by a stripped character collapse into one.
pub fn extract_urls_with(text: &str, project: &str, filters: &UrlFilters) -> BTreeSet<String> {
	if text.is_empty() {
		return BTreeSet::new();
	}
	let text = normalize(text);

	let matches = find_all(&text);

	// schemeless `//host` captures are noise
	let urls: BTreeSet<String> = matches.into_iter().filter(|url| url.starts_with("http")).collect();
	let urls: BTreeSet<String> = urls.into_iter().map(strip_trailing_punctuation).collect();
	let urls: BTreeSet<String> = urls.into_iter().map(strip_unbalanced_paren).collect();

	let urls: BTreeSet<String> = match &filters.revision_host {
		Some(host) => urls.into_iter().filter(|url| !has_host(url, host)).collect(),
		None => urls,
	};

	if filters.issue_urls {
		urls.into_iter().filter(|url| extract_issues(url, project).is_empty()).collect()
	} else {
		urls
	}
}

/// All non-overlapping matches, left to right.
///
/// A search that exceeds the backtrack limit resumes after the first `//` it started from, so one
/// pathological token does not hide the URLs that follow it.
fn find_all(text: &str) -> BTreeSet<String> {
	let mut matches = BTreeSet::new();
	let mut pos = 0;
	while pos < text.len() {
		match URL_PATTERN.find_from_pos(text, pos) {
			Ok(Some(m)) => {
				matches.insert(m.as_str().to_string());
				pos = m.end();
			}
			Ok(None) => break,
			Err(e) => {
				let Some(slashes) = text[pos..].find("//") else { break };
				tracing::warn!(error = %e, offset = pos + slashes, "URL matching aborted, skipping candidate");
				pos += slashes + 2;
			}
		}
	}
	matches
}

fn strip_trailing_punctuation(mut url: String) -> String {
	if url.ends_with(TRAILING_PUNCTUATION) {
		url.pop();
	}
	url
}

/// `(see http://a.com/x)` captures the closing paren. Only one level is stripped.
fn strip_unbalanced_paren(mut url: String) -> String {
	if url.ends_with(')') && !url.contains('(') {
		url.pop();
	}
	url
}

fn has_host(url: &str, host: &str) -> bool {
	match url::Url::parse(url) {
		Ok(parsed) => parsed.host_str().is_some_and(|h| h.eq_ignore_ascii_case(host)),
		Err(_) => false,
	}
}
