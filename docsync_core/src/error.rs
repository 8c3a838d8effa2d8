use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::tutorial::TutorialViolation;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum SyncError {
	#[error(transparent)]
	#[diagnostic(code(docsync::io_error))]
	Io(#[from] std::io::Error),

	#[error("failed to read `{}`", .path.display())]
	#[diagnostic(code(docsync::read))]
	Read {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("failed to write `{}`", .path.display())]
	#[diagnostic(code(docsync::write))]
	Write {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("failure to parse markdown: {0}")]
	#[diagnostic(code(docsync::markdown))]
	Markdown(String),

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(docsync::config_parse),
		help("check that docsync.toml is valid TOML with `target`, [tutorial] and [sources] entries")
	)]
	ConfigParse(String),

	#[error("{}", missing_inputs_message(.roots, .files))]
	#[diagnostic(
		code(docsync::missing_inputs),
		help(
			"check out the upstream repositories next to this project, install the packaged \
			 docs, or point the SYNC_SOURCE_* variables at them; restore any listed files"
		)
	)]
	MissingInputs {
		/// Labels of source roots that could not be found.
		roots: Vec<String>,
		/// Labels of required files missing from roots that do exist.
		files: Vec<String>,
	},

	#[error("tutorial structure validation failed: {}", join_violations(.0))]
	#[diagnostic(
		code(docsync::tutorial_structure),
		help("tutorial parts must be `## Part N: Title` headings numbered 1, 2, 3, ...")
	)]
	TutorialStructure(Vec<TutorialViolation>),
}

impl SyncError {
	/// Returns true for strict-mode validation failures, as opposed to I/O or
	/// configuration failures.
	pub fn is_validation_failure(&self) -> bool {
		matches!(
			self,
			Self::MissingInputs { .. } | Self::TutorialStructure(_)
		)
	}
}

fn missing_inputs_message(roots: &[String], files: &[String]) -> String {
	let mut parts = Vec::new();
	if !roots.is_empty() {
		parts.push(format!(
			"missing required sources in strict mode: {}",
			roots.join(", ")
		));
	}
	if !files.is_empty() {
		parts.push(format!(
			"missing required source files in strict mode: {}",
			files.join(", ")
		));
	}
	parts.join("; ")
}

pub(crate) fn join_violations(violations: &[TutorialViolation]) -> String {
	violations
		.iter()
		.map(ToString::to_string)
		.collect::<Vec<_>>()
		.join("; ")
}

pub type SyncResult<T> = Result<T, SyncError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
