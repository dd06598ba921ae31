/// A character-escaping pass applied to text outside code listings.
///
/// Implementations must leave ASCII letters, digits, `<`, `>` and `!` unchanged, which is what
/// listing placeholders are made of.
pub trait Escaper {
	fn escape(&self, text: &str) -> String;
}

/// LaTeX escaping, equivalent to pylatex's `escape_latex`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LatexEscaper;

impl LatexEscaper {
	fn replacement(c: char) -> Option<&'static str> {
		Some(match c {
			'&' => r"\&",
			'%' => r"\%",
			'$' => r"\$",
			'#' => r"\#",
			'_' => r"\_",
			'{' => r"\{",
			'}' => r"\}",
			'~' => r"\textasciitilde{}",
			'^' => r"\^{}",
			'\\' => r"\textbackslash{}",
			'\n' => "\\newline%\n",
			'-' => r"{-}",
			'\u{a0}' => "~",
			'[' => r"{[}",
			']' => r"{]}",
			_ => return None,
		})
	}
}

impl Escaper for LatexEscaper {
	fn escape(&self, text: &str) -> String {
		let mut out = String::with_capacity(text.len());
		for c in text.chars() {
			match Self::replacement(c) {
				Some(r) => out.push_str(r),
				None => out.push(c),
			}
		}
		out
	}
}

/// Leaves text untouched.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoEscape;

impl Escaper for NoEscape {
	fn escape(&self, text: &str) -> String {
		text.to_string()
	}
}
