//! Pairing of `{noformat}` markers into verbatim blocks.
//!
//! Jira uses the same `{noformat}` token to open and close a block, so markers are paired by
//! alternation: first one opens, next one closes, and so on.

use super::error::MarkupError;

pub const VERBATIM_BEGIN: &str = r"\begin{spverbatim}";
pub const VERBATIM_END: &str = r"\end{spverbatim}\ ";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum NoformatState {
	AwaitBegin,
	AwaitEnd,
}

impl NoformatState {
	fn toggle(self) -> Self {
		match self {
			NoformatState::AwaitBegin => NoformatState::AwaitEnd,
			NoformatState::AwaitEnd => NoformatState::AwaitBegin,
		}
	}

	fn directive(self) -> &'static str {
		match self {
			NoformatState::AwaitBegin => VERBATIM_BEGIN,
			NoformatState::AwaitEnd => VERBATIM_END,
		}
	}
}

/// What to do with an odd number of markers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Pairing {
	/// Convert anyway; the last block is left open.
	#[default]
	Lenient,
	/// Fail with [`MarkupError::UnbalancedNoformat`].
	Strict,
}

/// Replace every occurrence of `marker` by alternating begin/end verbatim directives.
pub fn pair_noformat(text: &str, marker: &str, pairing: Pairing) -> Result<String, MarkupError> {
	if marker.is_empty() {
		return Ok(text.to_string());
	}
	let mut out = String::with_capacity(text.len());
	let mut state = NoformatState::AwaitBegin;
	let mut count = 0;

	let mut rest = text;
	while let Some(pos) = rest.find(marker) {
		out.push_str(&rest[..pos]);
		out.push_str(state.directive());
		state = state.toggle();
		count += 1;
		rest = &rest[pos + marker.len()..];
	}
	out.push_str(rest);

	if state == NoformatState::AwaitEnd {
		match pairing {
			Pairing::Strict => return Err(MarkupError::UnbalancedNoformat { count }),
			Pairing::Lenient => tracing::warn!(count, "odd number of noformat markers, last verbatim block left open"),
		}
	}
	Ok(out)
}
