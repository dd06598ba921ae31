//! Issue payloads as returned by the tracker, and the compact record kept on disk.

use serde::{Deserialize, Serialize};

/// Fields requested for every issue.
pub const ISSUE_FIELDS: &str = "comment,attachment,issuelinks,status,issuetype,summary,description,created,updated,project,creator";

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct RawIssue {
	pub key: String,
	pub fields: RawFields,
	/// Not part of the search payload; filled in from a separate request.
	#[serde(default)]
	pub remotelinks: Vec<RawRemoteLink>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct RawFields {
	pub project: RawProject,
	pub creator: Option<RawUser>,
	pub created: String,
	pub updated: String,
	pub status: RawNamed,
	#[serde(default)]
	pub summary: String,
	/// Jira sends `null` for issues without a description.
	pub description: Option<String>,
	#[serde(default)]
	pub attachment: Vec<RawAttachment>,
	#[serde(default)]
	pub issuelinks: Vec<RawIssueLink>,
	#[serde(default)]
	pub comment: RawComments,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct RawProject {
	pub key: String,
	pub name: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct RawUser {
	pub name: Option<String>,
	#[serde(rename = "displayName")]
	pub display_name: Option<String>,
}

impl RawUser {
	/// Login name, falling back to the display name on servers that hide logins.
	pub fn login(&self) -> Option<String> {
		self.name.clone().or_else(|| self.display_name.clone())
	}
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct RawNamed {
	pub name: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct RawAttachment {
	pub filename: String,
	pub content: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct RawIssueLink {
	#[serde(rename = "type")]
	pub link_type: RawNamed,
	#[serde(rename = "inwardIssue")]
	pub inward_issue: Option<RawIssueKey>,
	#[serde(rename = "outwardIssue")]
	pub outward_issue: Option<RawIssueKey>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct RawIssueKey {
	pub key: String,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct RawComments {
	#[serde(default)]
	pub comments: Vec<RawComment>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct RawComment {
	pub author: Option<RawUser>,
	pub created: String,
	pub updated: String,
	#[serde(default)]
	pub body: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct RawRemoteLink {
	pub object: RawRemoteObject,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct RawRemoteObject {
	#[serde(default)]
	pub title: String,
	pub url: String,
}

//==============================================================================
// Compact record
//==============================================================================

/// What is kept of an issue after parsing, stored as `Projects/<project>/Issues/<key>.json`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct IssueRecord {
	pub issue_key: String,
	pub project: ProjectInfo,
	pub author: Option<String>,
	pub created: String,
	pub updated: String,
	pub status: String,
	pub summary: String,
	pub description: String,
	pub attachments: Vec<Attachment>,
	pub issuelinks: Vec<IssueLink>,
	pub remotelinks: Vec<RemoteLink>,
	pub comments: Vec<Comment>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct ProjectInfo {
	pub key: String,
	pub name: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Attachment {
	pub filename: String,
	/// URL of the attachment content
	pub content: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct IssueLink {
	/// e.g. "Duplicate", "Blocker"
	#[serde(rename = "type")]
	pub link_type: String,
	pub issue_key: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct RemoteLink {
	pub title: String,
	pub url: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Comment {
	pub author: String,
	pub created: String,
	pub updated: String,
	pub body: String,
}

impl From<&RawIssue> for IssueRecord {
	fn from(raw: &RawIssue) -> Self {
		let fields = &raw.fields;
		Self {
			issue_key: raw.key.clone(),
			project: ProjectInfo {
				key: fields.project.key.clone(),
				name: fields.project.name.clone(),
			},
			author: fields.creator.as_ref().and_then(RawUser::login),
			created: fields.created.clone(),
			updated: fields.updated.clone(),
			status: fields.status.name.clone(),
			summary: fields.summary.clone(),
			description: fields.description.clone().unwrap_or_default(),
			attachments: fields
				.attachment
				.iter()
				.map(|a| Attachment {
					filename: a.filename.clone(),
					content: a.content.clone(),
				})
				.collect(),
			issuelinks: fields
				.issuelinks
				.iter()
				.filter_map(|link| {
					// a link always points one way; skip malformed ones without either side
					let other = link.inward_issue.as_ref().or(link.outward_issue.as_ref())?;
					Some(IssueLink {
						link_type: link.link_type.name.clone(),
						issue_key: other.key.clone(),
					})
				})
				.collect(),
			remotelinks: raw
				.remotelinks
				.iter()
				.map(|link| RemoteLink {
					title: link.object.title.clone(),
					url: link.object.url.clone(),
				})
				.collect(),
			comments: fields
				.comment
				.comments
				.iter()
				.map(|c| Comment {
					author: c.author.as_ref().and_then(RawUser::login).unwrap_or_default(),
					created: c.created.clone(),
					updated: c.updated.clone(),
					body: c.body.clone(),
				})
				.collect(),
		}
	}
}

impl IssueRecord {
	/// Drop comments written by any of `authors` (bots, CI accounts).
	pub fn without_comments_by<S: AsRef<str>>(mut self, authors: &[S]) -> Self {
		self.comments.retain(|c| !authors.iter().any(|a| a.as_ref() == c.author));
		self
	}

	/// Turn carriage returns into newlines and drop non-breaking spaces in comment bodies; both break LaTeX output.
	pub fn with_clean_comment_bodies(mut self) -> Self {
		for comment in &mut self.comments {
			comment.body = comment.body.replace('\r', "\n").replace('\u{a0}', "");
		}
		self
	}

	/// Keys of the issues this one links to, in link order.
	pub fn linked_issue_keys(&self) -> Vec<String> {
		self.issuelinks.iter().map(|l| l.issue_key.clone()).collect()
	}
}
