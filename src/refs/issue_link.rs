use std::collections::BTreeSet;

/// Extract every `<project>-<number>` token, e.g. `PDFBOX-1234`.
///
/// The project key is matched literally and case-sensitively; there are no word boundaries,
/// so `XPDFBOX-1` yields `PDFBOX-1`. Matches are leftmost and non-overlapping.
pub fn extract_issues(text: &str, project: &str) -> BTreeSet<String> {
	let mut issues = BTreeSet::new();
	if text.is_empty() || project.is_empty() {
		return issues;
	}
	let prefix = format!("{project}-");

	let mut pos = 0;
	while let Some(found) = text[pos..].find(&prefix) {
		let start = pos + found;
		let digits_from = start + prefix.len();
		let digits = text[digits_from..].bytes().take_while(u8::is_ascii_digit).count();
		if digits > 0 {
			issues.insert(text[start..digits_from + digits].to_string());
			pos = digits_from + digits;
		} else {
			// retry from the next char: `A-A-A-1` holds `A-A-1` for project `A-A`
			pos = start + text[start..].chars().next().map_or(1, char::len_utf8);
		}
	}
	issues
}
