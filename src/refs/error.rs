use miette::Diagnostic;

/// Error type for revision handling.
#[derive(Debug, Diagnostic, thiserror::Error, PartialEq, Eq)]
pub enum RevisionError {
	#[error("revision `{revision}` contains no digits")]
	#[diagnostic(code(jira_refs::refs::revision_without_digits), help("revisions look like `r1234`, `Rev. 1234` or `commit 1234`"))]
	NoDigits { revision: String },

	#[error("revision number in `{revision}` does not fit into 64 bits")]
	#[diagnostic(code(jira_refs::refs::revision_overflow))]
	Overflow { revision: String },
}
