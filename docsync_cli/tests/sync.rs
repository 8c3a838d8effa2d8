mod common;

use common::Upstream;
use docsync_core::AnyEmptyResult;
use predicates::prelude::PredicateBooleanExt;
use serde_json::Value;

#[test]
fn sync_publishes_and_rewrites_links() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let upstream = Upstream::create(tmp.path())?;

	let mut cmd = common::docsync_cmd();
	upstream.apply(&mut cmd);
	cmd.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("Synced 18 files"))
		.stdout(predicates::str::contains("Tutorial split into 2 parts"));

	let target = tmp.path().join("src/content/docs/delivery-process");
	let methodology = std::fs::read_to_string(target.join("guides/methodology.md"))?;
	assert_eq!(
		methodology,
		"---\ntitle: \"Methodology\"\nsidebar:\n  order: 1\n---\nSee \
		 [config](/delivery-process/guides/configuration/#presets).\n"
	);
	assert!(target.join("tutorial/01-setup.md").is_file());
	assert!(target.join("tutorial/02-build.md").is_file());
	assert!(target.join("product-areas/index.md").is_file());

	Ok(())
}

#[test]
fn strict_mode_fails_when_a_root_is_missing() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let upstream = Upstream::create(tmp.path())?;

	let mut cmd = common::docsync_cmd();
	upstream.apply(&mut cmd);
	cmd.env("SYNC_SOURCE_DOCS_LIVE", tmp.path().join("missing"))
		.arg("--path")
		.arg(tmp.path())
		.arg("--strict")
		.assert()
		.code(1)
		.stderr(predicates::str::contains("missing required sources in strict mode"))
		.stderr(predicates::str::contains("delivery-process/docs-live"));

	assert!(!tmp.path().join("src/content/docs/delivery-process").exists());

	Ok(())
}

#[test]
fn ci_implies_strict_mode_for_missing_files() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let upstream = Upstream::create(tmp.path())?;
	std::fs::remove_file(upstream.path("docs/CONFIGURATION.md"))?;

	let mut cmd = common::docsync_cmd();
	upstream.apply(&mut cmd);
	cmd.env("CI", "true")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(1)
		.stderr(predicates::str::contains("missing required source files in strict mode"))
		.stderr(predicates::str::contains("CONFIGURATION.md"));

	Ok(())
}

#[test]
fn lenient_mode_warns_about_missing_files() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let upstream = Upstream::create(tmp.path())?;
	std::fs::remove_file(upstream.path("docs/CONFIGURATION.md"))?;

	let mut cmd = common::docsync_cmd();
	upstream.apply(&mut cmd);
	cmd.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stderr(predicates::str::contains(
			"Missing recommended source files: delivery-process/docs/CONFIGURATION.md",
		))
		.stdout(predicates::str::contains("Synced 17 files"))
		.stdout(predicates::str::contains("warning(s):"));

	Ok(())
}

#[test]
fn strict_mode_fails_on_tutorial_structure() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let upstream = Upstream::create(tmp.path())?;

	let mut cmd = common::docsync_cmd();
	upstream.apply(&mut cmd);
	cmd.env("TUTORIAL_EXPECTED_PARTS", "10")
		.arg("--path")
		.arg(tmp.path())
		.arg("--strict")
		.assert()
		.code(1)
		.stderr(predicates::str::contains("expected 10 parts, found 2"));

	Ok(())
}

#[test]
fn non_numeric_expected_parts_disables_the_count_check() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let upstream = Upstream::create(tmp.path())?;

	let mut cmd = common::docsync_cmd();
	upstream.apply(&mut cmd);
	cmd.env("TUTORIAL_EXPECTED_PARTS", "any")
		.arg("--path")
		.arg(tmp.path())
		.arg("--strict")
		.assert()
		.success();

	Ok(())
}

#[test]
fn json_format_prints_the_report() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let upstream = Upstream::create(tmp.path())?;

	let mut cmd = common::docsync_cmd();
	upstream.apply(&mut cmd);
	let output = cmd
		.arg("--path")
		.arg(tmp.path())
		.arg("--target")
		.arg("out")
		.arg("--format")
		.arg("json")
		.output()?;
	assert!(output.status.success());

	let report: Value = serde_json::from_slice(&output.stdout)?;
	assert_eq!(report["tutorial_parts"], 2);
	assert_eq!(report["written"].as_array().map(Vec::len), Some(18));
	assert_eq!(report["written"][0], "guides/methodology.md");
	assert_eq!(report["warnings"], Value::Array(vec![]));
	assert!(tmp.path().join("out/tutorial/index.md").is_file());

	Ok(())
}

#[test]
fn config_file_sets_target_and_sources() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let upstream = Upstream::create(tmp.path())?;
	std::fs::write(
		tmp.path().join("docsync.toml"),
		"target = \"site-docs\"\n\n[tutorial]\nexpected_parts = 2\n\n[sources]\ndocs = \
		 \"upstream/docs\"\ndocs-live = \"upstream/docs-live\"\ndocs-generated = \
		 \"upstream/docs-generated\"\ntutorial = \"upstream/tutorial.md\"\n",
	)?;

	let mut cmd = common::docsync_cmd();
	cmd.arg("--path")
		.arg(tmp.path())
		.arg("--strict")
		.assert()
		.success();

	assert!(tmp.path().join("site-docs/guides/methodology.md").is_file());
	assert!(upstream.path("docs").is_dir());

	Ok(())
}

#[test]
fn invalid_config_file_exits_with_code_two() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("docsync.toml"), "target = [")?;

	let mut cmd = common::docsync_cmd();
	cmd.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("failed to parse config file"));

	Ok(())
}

#[test]
fn verbose_logs_each_file() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let upstream = Upstream::create(tmp.path())?;

	let mut cmd = common::docsync_cmd();
	upstream.apply(&mut cmd);
	cmd.arg("--path")
		.arg(tmp.path())
		.arg("--verbose")
		.assert()
		.success()
		.stderr(predicates::str::contains("METHODOLOGY.md → guides/methodology.md"));

	let mut quiet = common::docsync_cmd();
	upstream.apply(&mut quiet);
	quiet
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stderr(predicates::str::contains("→").not());

	Ok(())
}
