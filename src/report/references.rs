use serde::{Deserialize, Serialize};

use crate::{
	issue::IssueRecord,
	refs::{Classifier, ExtractionResult},
};

/// References found in one issue, per body, plus their union.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct IssueReferences {
	pub issue_key: String,
	pub description: ExtractionResult,
	pub comments: Vec<CommentReferences>,
	pub total: ExtractionResult,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct CommentReferences {
	pub author: String,
	pub created: String,
	pub references: ExtractionResult,
}

impl IssueReferences {
	/// Classify the description and every comment of `record` against the record's own project.
	pub fn collect(record: &IssueRecord, classifier: &Classifier) -> Self {
		let project = &record.project.key;
		let description = classifier.classify(&record.description, project);
		let mut total = description.clone();

		let comments = record
			.comments
			.iter()
			.map(|comment| {
				let references = classifier.classify(&comment.body, project);
				total.merge(&references);
				CommentReferences {
					author: comment.author.clone(),
					created: comment.created.clone(),
					references,
				}
			})
			.collect();

		Self {
			issue_key: record.issue_key.clone(),
			description,
			comments,
			total,
		}
	}
}
