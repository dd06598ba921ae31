//! Partitioning of extracted references into buckets.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{
	issue_link::extract_issues,
	revision::extract_revisions_with,
	urls::{DEFAULT_REVISION_HOST, UrlFilters, extract_urls_with},
};

/// Substrings marking a mailing-list archive link.
pub const DEFAULT_MAILING_LIST_KEYS: [&str; 2] = ["mail-archives", "markmail"];

/// References found in a piece of text.
///
/// `urls`, `mailing_lists` and `pdf_documents` are pairwise disjoint: the latter two are carved out of
/// the URL set, mailing lists first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
	pub urls: BTreeSet<String>,
	pub revisions: BTreeSet<String>,
	pub mailing_lists: BTreeSet<String>,
	pub pdf_documents: BTreeSet<String>,
	pub other_issues: BTreeSet<String>,
}

impl ExtractionResult {
	pub fn is_empty(&self) -> bool {
		self.urls.is_empty() && self.revisions.is_empty() && self.mailing_lists.is_empty() && self.pdf_documents.is_empty() && self.other_issues.is_empty()
	}

	/// Total number of references over all buckets.
	pub fn len(&self) -> usize {
		self.urls.len() + self.revisions.len() + self.mailing_lists.len() + self.pdf_documents.len() + self.other_issues.len()
	}

	/// Bucket-wise union.
	///
	/// The union of two partitions is not necessarily a partition: the same URL can be classified
	/// differently only if the classifier settings differ, which callers merging results avoid.
	pub fn merge(&mut self, other: &ExtractionResult) {
		self.urls.extend(other.urls.iter().cloned());
		self.revisions.extend(other.revisions.iter().cloned());
		self.mailing_lists.extend(other.mailing_lists.iter().cloned());
		self.pdf_documents.extend(other.pdf_documents.iter().cloned());
		self.other_issues.extend(other.other_issues.iter().cloned());
	}
}

/// Reference classifier with its tunables.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Classifier {
	pub mailing_list_keys: Vec<String>,
	pub revision_host: Option<String>,
	pub detect_commit_hashes: bool,
}

impl Default for Classifier {
	fn default() -> Self {
		Self {
			mailing_list_keys: DEFAULT_MAILING_LIST_KEYS.iter().map(|k| k.to_string()).collect(),
			revision_host: Some(DEFAULT_REVISION_HOST.to_string()),
			detect_commit_hashes: true,
		}
	}
}

impl Classifier {
	/// Extract all references from `text` and split the URLs into mailing lists, PDF documents and the rest.
	///
	/// Order matters: a URL that is both a mailing-list link and a `.pdf` ends up in `mailing_lists`.
	/// `other_issues` is computed from the original text, independently of the URL pipeline.
	pub fn classify(&self, text: &str, project: &str) -> ExtractionResult {
		let filters = UrlFilters {
			revision_host: self.revision_host.clone(),
			issue_urls: true,
		};
		let mut urls = extract_urls_with(text, project, &filters);
		let revisions = extract_revisions_with(text, self.detect_commit_hashes);

		let mailing_lists = filter_mailing_lists(&urls, &self.mailing_list_keys);
		urls.retain(|url| !mailing_lists.contains(url));

		let pdf_documents = filter_pdf_documents(&urls);
		urls.retain(|url| !pdf_documents.contains(url));

		let other_issues = extract_issues(text, project);

		ExtractionResult {
			urls,
			revisions,
			mailing_lists,
			pdf_documents,
			other_issues,
		}
	}
}

/// [`Classifier::classify`] with default settings.
pub fn classify(text: &str, project: &str) -> ExtractionResult {
	Classifier::default().classify(text, project)
}

/// URLs containing any of `keys` (case-sensitive substring match).
pub fn filter_mailing_lists<S: AsRef<str>>(urls: &BTreeSet<String>, keys: &[S]) -> BTreeSet<String> {
	urls.iter().filter(|url| keys.iter().any(|key| url.contains(key.as_ref()))).cloned().collect()
}

/// URLs ending in `.pdf` (case-sensitive).
pub fn filter_pdf_documents(urls: &BTreeSet<String>) -> BTreeSet<String> {
	urls.iter().filter(|url| url.ends_with(".pdf")).cloned().collect()
}
