//! Conversion of Jira wiki markup to LaTeX.
//!
//! Code listings must reach the output verbatim, while everything around them must be escaped.
//! Listings are therefore cut out into placeholders ([`extract_listings`]), the remaining text is
//! escaped, and the listings are put back in place of their placeholders.

mod error;
pub use error::MarkupError;

mod escape;
pub use escape::{Escaper, LatexEscaper, NoEscape};

mod listing;
pub use listing::{HARD_WRAP_WIDTH, LISTING_BEGIN, LISTING_END, Listing, ProtectedText, extract_listings, hard_wrap, placeholder};

mod noformat;
pub use noformat::{Pairing, VERBATIM_BEGIN, VERBATIM_END, pair_noformat};

/// Raw Jira marker for preformatted text.
pub const NOFORMAT_MARKER: &str = "{noformat}";

/// Escape `text` for LaTeX, converting `{code}` listings and `{noformat}` blocks to their LaTeX environments.
pub fn escape_with_listings(text: &str) -> Result<String, MarkupError> {
	escape_with_listings_using(text, &LatexEscaper, Pairing::Lenient)
}

/// [`escape_with_listings`] with an explicit escaper and noformat pairing policy.
///
/// `{noformat}` markers are paired on the escaped text before listings are restored, so markers
/// inside code listings are never touched.
pub fn escape_with_listings_using<E: Escaper>(text: &str, escaper: &E, pairing: Pairing) -> Result<String, MarkupError> {
	let protected = extract_listings(text, true);
	let escaped = escaper.escape(&protected.text());
	let marker = escaper.escape(NOFORMAT_MARKER);
	let paired = pair_noformat(&escaped, &marker, pairing)?;
	restore_listings(&paired, &protected.listings)
}

/// Put every listing back at the first occurrence of its placeholder.
///
/// Placeholders are located in `text` only, never inside already restored listing content.
pub fn restore_listings(text: &str, listings: &[Listing]) -> Result<String, MarkupError> {
	let mut spans = Vec::with_capacity(listings.len());
	for listing in listings {
		let start = text.find(&listing.key).ok_or_else(|| MarkupError::MissingPlaceholder { key: listing.key.clone() })?;
		spans.push((start, start + listing.key.len(), listing.content.as_str()));
	}
	spans.sort_by_key(|(start, ..)| *start);

	let mut out = String::with_capacity(text.len() + spans.iter().map(|(.., content)| content.len()).sum::<usize>());
	let mut last_end = 0;
	for (start, end, content) in spans {
		out.push_str(&text[last_end..start]);
		out.push_str(content);
		last_end = end;
	}
	out.push_str(&text[last_end..]);
	Ok(out)
}
