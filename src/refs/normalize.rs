//! Text cleanup run before URL matching.
//!
//! The URL pattern treats whitespace as a hard boundary but happily swallows brackets,
//! angle brackets, quotes and backslashes. Hand-typed or pre-formatted links
//! (`[http://a.com]`, `<http://a.com>`, `"http://a.com"`) would leak those characters
//! into the match, so they are blanked out first.

/// Sequences replaced with a single space. The literal `\n` escape must come before the lone backslash.
const BOUNDARY_BREAKERS: [&str; 7] = [r"\n", "[", "]", "<", ">", "\\", "\""];

/// Replace every boundary-breaking character with a space. All other characters are left untouched.
pub fn normalize(text: &str) -> String {
	if text.is_empty() {
		return String::new();
	}
	BOUNDARY_BREAKERS.iter().fold(text.to_string(), |acc, pat| acc.replace(pat, " "))
}
