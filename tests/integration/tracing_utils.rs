//! Utilities for capturing and verifying tracing output in integration tests.
//!
//! Trace events are JSON lines, either from the binary (when `JIRA_REFS_TRACE_FILE` is set) or
//! from an in-process subscriber installed with [`capture`]. The mock clients emit `tracing::info!`
//! events with target "mock_jira" or "mock_github" named after the called method;
//! [`TraceLog::has_mock_call`] looks for those.

use std::{
	fs, io,
	path::Path,
	sync::{Arc, Mutex},
};

use serde::Deserialize;
use tracing_subscriber::{EnvFilter, fmt::MakeWriter, layer::SubscriberExt as _};

/// A single trace event from the JSON log
#[derive(Debug, Deserialize)]
pub struct TraceEvent {
	pub level: String,
	/// The target module (e.g., "mock_jira")
	pub target: String,
	pub fields: TraceFields,
}

#[derive(Debug, Deserialize)]
pub struct TraceFields {
	pub message: Option<String>,
	pub jql: Option<String>,
	pub start_at: Option<u64>,
	pub max_results: Option<u64>,
	pub issue_key: Option<String>,
	pub project: Option<String>,
	pub found: Option<u64>,
}

/// Parsed trace log that provides verification methods
pub struct TraceLog {
	events: Vec<TraceEvent>,
}

impl TraceLog {
	pub fn from_json_lines(content: &str) -> Self {
		let events = content.lines().filter(|line| !line.is_empty()).filter_map(|line| serde_json::from_str(line).ok()).collect();
		Self { events }
	}

	pub fn from_file(path: &Path) -> Self {
		Self::from_json_lines(&fs::read_to_string(path).unwrap_or_default())
	}

	/// Check if a mock method was called
	pub fn has_mock_call(&self, method_name: &str) -> bool {
		self.mock_calls().iter().any(|e| e.fields.message.as_deref() == Some(method_name))
	}

	/// `start_at` of every search request, in call order
	pub fn search_offsets(&self) -> Vec<u64> {
		self.mock_calls().iter().filter(|e| e.fields.message.as_deref() == Some("search_issues")).filter_map(|e| e.fields.start_at).collect()
	}

	/// Get all mock call events for debugging
	pub fn mock_calls(&self) -> Vec<&TraceEvent> {
		self.events.iter().filter(|e| e.target == "mock_jira" || e.target == "mock_github").collect()
	}

	pub fn find(&self, message: &str) -> Option<&TraceEvent> {
		self.events.iter().find(|e| e.fields.message.as_deref() == Some(message))
	}

	pub fn warnings(&self) -> Vec<&TraceEvent> {
		self.events.iter().filter(|e| e.level == "WARN").collect()
	}
}

/// In-memory sink for the JSON formatter.
#[derive(Clone, Default)]
pub struct TraceBuffer(Arc<Mutex<Vec<u8>>>);

impl TraceBuffer {
	pub fn log(&self) -> TraceLog {
		TraceLog::from_json_lines(&String::from_utf8_lossy(&self.0.lock().unwrap()))
	}
}

impl io::Write for TraceBuffer {
	fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
		self.0.lock().unwrap().extend_from_slice(buf);
		Ok(buf.len())
	}

	fn flush(&mut self) -> io::Result<()> {
		Ok(())
	}
}

impl<'a> MakeWriter<'a> for TraceBuffer {
	type Writer = TraceBuffer;

	fn make_writer(&'a self) -> Self::Writer {
		self.clone()
	}
}

/// Record JSON trace events of the current thread until the guard is dropped.
pub fn capture() -> (TraceBuffer, tracing::subscriber::DefaultGuard) {
	let buffer = TraceBuffer::default();
	let subscriber = tracing_subscriber::registry().with(EnvFilter::new("info")).with(tracing_subscriber::fmt::layer().json().with_writer(buffer.clone()));
	(buffer, tracing::subscriber::set_default(subscriber))
}

/// Assert that a mock method was called
#[macro_export]
macro_rules! assert_traced {
	($log:expr, $method:expr) => {
		assert!(
			$log.has_mock_call($method),
			"Expected mock call '{}' to be traced, but it wasn't. Mock calls:\n{:#?}",
			$method,
			$log.mock_calls()
		);
	};
}
