//! Shared test fixtures for integration tests: issue payloads and a way to run the binary.

use std::{
	path::Path,
	process::{Command, Output, Stdio},
};

use jira_refs::RawIssue;

/// Raw issue of `project` as the search endpoint returns it.
pub fn raw_issue(key: &str, description: &str, comments: &[(&str, &str)]) -> RawIssue {
	let project = key.split('-').next().unwrap();
	let comments: Vec<serde_json::Value> = comments
		.iter()
		.map(|(author, body)| {
			serde_json::json!({
				"author": { "name": author, "displayName": author },
				"created": "2012-03-04T05:06:07.000+0000",
				"updated": "2012-03-04T05:06:07.000+0000",
				"body": body,
			})
		})
		.collect();
	let value = serde_json::json!({
		"key": key,
		"fields": {
			"project": { "key": project, "name": project },
			"creator": { "name": "reporter" },
			"created": "2012-03-04T05:06:07.000+0000",
			"updated": "2012-03-05T05:06:07.000+0000",
			"status": { "name": "Open" },
			"summary": format!("Summary of {key}"),
			"description": description,
			"attachment": [],
			"issuelinks": [],
			"comment": { "comments": comments },
		}
	});
	serde_json::from_value(value).unwrap()
}

/// Link `issue` to `other` the way Jira reports an outward link.
pub fn link(issue: &mut RawIssue, link_type: &str, other: &str) {
	let link = serde_json::json!({ "type": { "name": link_type }, "outwardIssue": { "key": other } });
	issue.fields.issuelinks.push(serde_json::from_value(link).unwrap());
}

/// Run the binary with an isolated config home and data dir.
pub fn run(data_dir: &Path, args: &[&str], envs: &[(&str, &Path)]) -> Output {
	run_with_stdin(data_dir, args, envs, None)
}

pub fn run_with_stdin(data_dir: &Path, args: &[&str], envs: &[(&str, &Path)], stdin: Option<&str>) -> Output {
	let mut cmd = Command::new(env!("CARGO_BIN_EXE_jira_refs"));
	cmd.arg("--data-dir").arg(data_dir).args(args);
	cmd.env("XDG_CONFIG_HOME", data_dir.join("config")).env_remove("RUST_LOG");
	for (key, value) in envs {
		cmd.env(key, value);
	}
	cmd.stdin(if stdin.is_some() { Stdio::piped() } else { Stdio::null() });
	cmd.stdout(Stdio::piped()).stderr(Stdio::piped());

	let mut child = cmd.spawn().unwrap();
	if let Some(input) = stdin {
		use std::io::Write;
		child.stdin.take().unwrap().write_all(input.as_bytes()).unwrap();
	}
	child.wait_with_output().unwrap()
}
