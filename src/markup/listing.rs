//! Extraction of `{code}` blocks into indexed placeholders.

use std::{fmt, sync::LazyLock};

use regex::Regex;

/// `{code:<lang>}...{code}` or `{code}...{code}`. Language and body are matched lazily.
static CODE_BLOCK: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"(?s)(?:\{code:(.*?)\}|\{code\})(.*?)\{code\}").expect("CODE_BLOCK: hardcoded regex is valid"));

const PLACEHOLDER_PREFIX: &str = "<<!PDFGEN";
const PLACEHOLDER_SUFFIX: &str = "!>>";

/// Longest line the LaTeX renderer copes with before failing with "Dimension too large".
pub const HARD_WRAP_WIDTH: usize = 400;

pub const LISTING_BEGIN: &str = r"\begin{lstlisting}";
pub const LISTING_END: &str = r"\end{lstlisting}\ ";

/// Placeholder token for the `index`-th listing, e.g. `<<!PDFGEN3!>>`.
pub fn placeholder(index: usize) -> String {
	format!("{PLACEHOLDER_PREFIX}{index}{PLACEHOLDER_SUFFIX}")
}

/// A code block cut out of the text, and the placeholder standing in for it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Listing {
	pub index: usize,
	pub key: String,
	pub content: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
	Text(String),
	Placeholder(usize),
}

/// Text with every code block replaced by its placeholder, plus the blocks in discovery order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProtectedText {
	segments: Vec<Segment>,
	pub listings: Vec<Listing>,
}

impl ProtectedText {
	/// Flatten the segments into a single string with placeholders inline.
	pub fn text(&self) -> String {
		self.to_string()
	}
}

impl fmt::Display for ProtectedText {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for segment in &self.segments {
			match segment {
				Segment::Text(s) => f.write_str(s)?,
				Segment::Placeholder(index) => f.write_str(&placeholder(*index))?,
			}
		}
		Ok(())
	}
}

/// Cut every `{code}` block out of `text`.
///
/// Blocks are numbered from 1 in the order they are found. Because placeholders never contain `{code`,
/// the leftmost remaining block after each substitution is simply the next match in the original text,
/// so a single left-to-right scan yields the same numbering as repeated search-and-replace.
///
/// With `to_latex`, openers become `\begin{lstlisting}` (with `[language=..]` when given) and the
/// closer becomes `\end{lstlisting}\ `. Content longer than [`HARD_WRAP_WIDTH`] characters gets a
/// newline every [`HARD_WRAP_WIDTH`] characters regardless of word boundaries.
pub fn extract_listings(text: &str, to_latex: bool) -> ProtectedText {
	let mut segments = Vec::new();
	let mut listings = Vec::new();
	let mut last_end = 0;

	for (i, caps) in CODE_BLOCK.captures_iter(text).enumerate() {
		let index = i + 1;
		let Some(whole) = caps.get(0) else { continue };
		if whole.start() > last_end {
			segments.push(Segment::Text(text[last_end..whole.start()].to_string()));
		}
		segments.push(Segment::Placeholder(index));
		last_end = whole.end();

		let content = if to_latex {
			let body = caps.get(2).map_or("", |m| m.as_str());
			match caps.get(1) {
				Some(language) => format!("{LISTING_BEGIN}[language={}]{body}{LISTING_END}", language.as_str()),
				None => format!("{LISTING_BEGIN}{body}{LISTING_END}"),
			}
		} else {
			whole.as_str().to_string()
		};

		listings.push(Listing {
			index,
			key: placeholder(index),
			content: hard_wrap(&content, HARD_WRAP_WIDTH),
		});
	}
	if last_end < text.len() {
		segments.push(Segment::Text(text[last_end..].to_string()));
	}

	ProtectedText { segments, listings }
}

/// Insert `\n` after every `width` characters, if the content is longer than `width`.
pub fn hard_wrap(content: &str, width: usize) -> String {
	if width == 0 || content.chars().count() <= width {
		return content.to_string();
	}
	let chars: Vec<char> = content.chars().collect();
	chars.chunks(width).map(|chunk| chunk.iter().collect::<String>()).collect::<Vec<_>>().join("\n")
}
