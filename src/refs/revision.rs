//! Version-control revision references.

use std::{collections::BTreeSet, sync::LazyLock};

use regex::Regex;

use super::error::RevisionError;

/// Base of the web view that serves revisions by number.
pub const DEFAULT_REVISION_BASE: &str = "https://svn.apache.org";

/// `r1234`, `Rev. 1234`, `revision 1234`, `Commit 1234`; only the number is captured.
static SVN_REVISION: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"(?:r|[Rr]ev\. |[Rr]evision |[Cc]ommit )([0-9]+)").expect("SVN_REVISION: hardcoded regex is valid"));

/// Bare full-length git hashes. Catches any 40-char lowercase hex run, so it is off-switchable.
static GIT_COMMIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9a-f]{40}").expect("GIT_COMMIT: hardcoded regex is valid"));

static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]+").expect("DIGITS: hardcoded regex is valid"));

/// Extract revision numbers and commit hashes mentioned in `text`.
pub fn extract_revisions(text: &str) -> BTreeSet<String> {
	extract_revisions_with(text, true)
}

/// [`extract_revisions`], optionally without the commit-hash heuristic.
pub fn extract_revisions_with(text: &str, detect_commit_hashes: bool) -> BTreeSet<String> {
	if text.is_empty() {
		return BTreeSet::new();
	}
	let mut revisions: BTreeSet<String> = SVN_REVISION.captures_iter(text).map(|caps| caps[1].to_string()).collect();
	if detect_commit_hashes {
		revisions.extend(GIT_COMMIT.find_iter(text).map(|m| m.as_str().to_string()));
	}
	revisions
}

/// Numeric id of a revision reference: its first run of digits.
pub fn revision_id(revision: &str) -> Result<u64, RevisionError> {
	let digits = DIGITS.find(revision).ok_or_else(|| RevisionError::NoDigits { revision: revision.to_string() })?;
	digits.as_str().parse().map_err(|_| RevisionError::Overflow { revision: revision.to_string() })
}

/// Web URL of a revision, `<base>/r<id>`.
pub fn revision_url(revision: &str, base: &str) -> Result<String, RevisionError> {
	let id = revision_id(revision)?;
	Ok(format!("{}/r{id}", base.trim_end_matches('/')))
}
