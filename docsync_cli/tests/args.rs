use std::ffi::OsStr;
use std::path::PathBuf;

use clap::Parser;
use docsync_cli::DocsyncCli;
use docsync_cli::OutputFormat;
use docsync_core::AnyEmptyResult;
use rstest::rstest;
use similar_asserts::assert_eq;

#[test]
fn defaults() {
	let cli = DocsyncCli::parse_from(["docsync"]);

	assert!(!cli.strict);
	assert!(!cli.verbose);
	assert_eq!(cli.format, OutputFormat::Text);
	assert_eq!(cli.log_filter(), "docsync=info");
}

#[test]
fn all_flags() {
	let cli = DocsyncCli::parse_from([
		"docsync",
		"--path",
		"site",
		"--target",
		"out",
		"--strict",
		"-v",
		"--no-color",
		"--format",
		"json",
	]);

	assert_eq!(cli.path, Some(PathBuf::from("site")));
	assert_eq!(cli.target, Some(PathBuf::from("out")));
	assert!(cli.strict);
	assert!(cli.no_color);
	assert_eq!(cli.format, OutputFormat::Json);
	assert_eq!(cli.log_filter(), "docsync=debug");
}

#[rstest]
#[case::unknown_format(&["docsync", "--format", "yaml"])]
#[case::unknown_flag(&["docsync", "--watch"])]
fn rejects_invalid_arguments(#[case] args: &[&str]) {
	assert!(DocsyncCli::try_parse_from(args).is_err());
}

#[test]
fn flags_override_environment() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let cli = DocsyncCli::parse_from([
		OsStr::new("docsync"),
		OsStr::new("--path"),
		tmp.path().as_os_str(),
		OsStr::new("--target"),
		OsStr::new("out"),
		OsStr::new("--strict"),
	]);

	let config = cli.sync_config(|key| {
		match key {
			"CI" => Some("false".to_string()),
			"SYNC_SOURCE_DOCS" => Some("/env/docs".to_string()),
			"TUTORIAL_EXPECTED_PARTS" => Some("3".to_string()),
			_ => None,
		}
	})?;

	assert!(config.strict);
	assert_eq!(config.target_dir, tmp.path().join("out"));
	assert_eq!(config.expected_tutorial_parts, Some(3));
	assert_eq!(config.overrides.len(), 1);

	Ok(())
}
