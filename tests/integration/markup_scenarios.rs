use jira_refs::{
	escape_with_listings, extract_listings,
	markup::{HARD_WRAP_WIDTH, restore_listings},
};

#[test]
fn code_block_becomes_placeholder() {
	let protected = extract_listings("{code:java}int x = 1;{code}", true);
	assert_eq!(protected.text(), "<<!PDFGEN1!>>");
	assert_eq!(protected.listings.len(), 1);
	assert_eq!(protected.listings[0].content, r"\begin{lstlisting}[language=java]int x = 1;\end{lstlisting}\ ");
}

#[test]
fn placeholders_round_trip_without_latex() {
	let text = "before {code}a{code} middle {code:xml}<b/>{code} after";
	let protected = extract_listings(text, false);
	assert_eq!(protected.text(), "before <<!PDFGEN1!>> middle <<!PDFGEN2!>> after");
	assert_eq!(restore_listings(&protected.text(), &protected.listings).unwrap(), text);
}

#[test]
fn long_listing_is_hard_wrapped() {
	let body = "x".repeat(HARD_WRAP_WIDTH + 1);
	let protected = extract_listings(&format!("{{code}}{body}{{code}}"), false);
	let content = &protected.listings[0].content;
	let first_line = content.lines().next().unwrap();
	assert_eq!(first_line.chars().count(), HARD_WRAP_WIDTH);
	assert_eq!(content.matches('\n').count(), 1);
}

#[test]
fn escaped_report_text() {
	let text = "Stack trace:\n{noformat}at Foo_Bar{noformat}\nfix: {code}if (a && b) {}{code}";
	let escaped = escape_with_listings(text).unwrap();
	assert!(escaped.contains(r"\begin{spverbatim}at Foo\_Bar\end{spverbatim}\ "));
	assert!(escaped.contains(r"\begin{lstlisting}if (a && b) {}\end{lstlisting}\ "));
	assert!(escaped.starts_with(r"Stack trace:\newline%"));
}
