use miette::Diagnostic;

/// Error type for markup conversion.
#[derive(Debug, Diagnostic, thiserror::Error, PartialEq, Eq)]
pub enum MarkupError {
	#[error("placeholder `{key}` did not survive escaping")]
	#[diagnostic(
		code(jira_refs::markup::missing_placeholder),
		help("the escaper must leave letters, digits, `<`, `>` and `!` untouched, otherwise code listings cannot be restored")
	)]
	MissingPlaceholder { key: String },

	#[error("found {count} noformat markers, expected an even number")]
	#[diagnostic(code(jira_refs::markup::unbalanced_noformat), help("every {{noformat}} needs a closing {{noformat}}"))]
	UnbalancedNoformat { count: usize },
}
