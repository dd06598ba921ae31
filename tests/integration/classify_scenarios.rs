use jira_refs::{
	Classifier, classify,
	refs::{extract_issues, extract_revisions, extract_urls, normalize},
};
use rstest::rstest;

const PROJECT: &str = "PDFBOX";

fn set(items: &[&str]) -> std::collections::BTreeSet<String> {
	items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn mixed_comment_is_partitioned() {
	let result = classify("See https://example.com/doc.pdf and http://mail-archives.apache.org/x and PDFBOX-42, fixed in r1234.", PROJECT);
	assert_eq!(result.pdf_documents, set(&["https://example.com/doc.pdf"]));
	assert_eq!(result.mailing_lists, set(&["http://mail-archives.apache.org/x"]));
	assert_eq!(result.revisions, set(&["1234"]));
	assert_eq!(result.other_issues, set(&["PDFBOX-42"]));
	assert!(result.urls.is_empty());
}

#[rstest]
#[case::trailing_period("read http://a.com/page. now", "http://a.com/page")]
#[case::balanced_paren("see http://a.com/(wiki)", "http://a.com/(wiki)")]
#[case::unbalanced_paren("(see http://a.com/wiki)", "http://a.com/wiki")]
fn url_cleanup(#[case] text: &str, #[case] expected: &str) {
	assert_eq!(extract_urls(text, PROJECT), set(&[expected]));
}

#[test]
fn empty_input_everywhere() {
	assert_eq!(normalize(""), "");
	assert!(extract_urls("", PROJECT).is_empty());
	assert!(extract_revisions("").is_empty());
	assert!(extract_issues("", PROJECT).is_empty());
	assert!(classify("", PROJECT).is_empty());
}

#[test]
fn url_buckets_are_disjoint() {
	let text = "http://markmail.org/a.pdf http://mail-archives.apache.org/b https://example.org/c.pdf https://example.org/d \
	            https://svn.apache.org/viewvc?rev=5 https://issues.apache.org/jira/browse/PDFBOX-9";
	let result = classify(text, PROJECT);
	assert!(result.urls.is_disjoint(&result.mailing_lists));
	assert!(result.urls.is_disjoint(&result.pdf_documents));
	assert!(result.mailing_lists.is_disjoint(&result.pdf_documents));
	// mailing-list match wins over the .pdf suffix
	assert!(result.mailing_lists.contains("http://markmail.org/a.pdf"));
	assert_eq!(result.urls, set(&["https://example.org/d"]));
}

#[test]
fn custom_classifier_settings() {
	let classifier = Classifier {
		mailing_list_keys: vec!["lists.example".to_string()],
		revision_host: None,
		detect_commit_hashes: false,
	};
	let text = "https://lists.example/thread/1 https://svn.apache.org/r10 0123456789abcdef0123456789abcdef01234567";
	let result = classifier.classify(text, PROJECT);
	assert_eq!(result.mailing_lists, set(&["https://lists.example/thread/1"]));
	assert_eq!(result.urls, set(&["https://svn.apache.org/r10"]));
	// the path of the kept svn link still yields its revision, the bare hash does not
	assert_eq!(result.revisions, set(&["10"]));
}

#[test]
fn classification_is_deterministic() {
	let text = "r1 r2 Revision 3 commit 4 http://b.org http://a.org PDFBOX-2 PDFBOX-1";
	let first = serde_json::to_string(&classify(text, PROJECT)).unwrap();
	let second = serde_json::to_string(&classify(text, PROJECT)).unwrap();
	assert_eq!(first, second);
}
