//! Reference extraction from issue-tracker text.
//!
//! Free text (issue descriptions, comment bodies) is scanned for URLs, revision ids and links to
//! other issues of the same project. URLs are then split into mailing-list links, PDF documents and
//! generic links by ordered subtraction, see [`Classifier::classify`].
//!
//! Everything here is a best-effort heuristic over pure functions; empty input yields empty results.

mod classify;
pub use classify::{Classifier, DEFAULT_MAILING_LIST_KEYS, ExtractionResult, classify, filter_mailing_lists, filter_pdf_documents};

mod error;
pub use error::RevisionError;

mod issue_link;
pub use issue_link::extract_issues;

mod normalize;
pub use normalize::normalize;

mod revision;
pub use revision::{DEFAULT_REVISION_BASE, extract_revisions, extract_revisions_with, revision_id, revision_url};

mod urls;
pub use urls::{DEFAULT_REVISION_HOST, UrlFilters, extract_urls, extract_urls_with};
