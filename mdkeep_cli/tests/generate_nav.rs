mod common;

use std::path::Path;

use mdkeep_core::AnyEmptyResult;
use similar_asserts::assert_eq;

const README: &str = "# Project\n\n## Navigation\nstale\n\n## License\nMIT\n";

fn setup(root: &Path) -> AnyEmptyResult {
	std::fs::write(root.join("README.md"), README)?;
	std::fs::create_dir_all(root.join("docs/guide"))?;
	std::fs::write(root.join("docs/index.md"), "# Docs\n")?;
	std::fs::write(root.join("docs/guide/getting started.md"), "# Start\n")?;
	Ok(())
}

#[test]
fn generate_nav_writes_section() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	setup(tmp.path())?;

	common::mdkeep_cmd()
		.arg("generate-nav")
		.arg("--root")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains(
			"Updated section `## Navigation` in README.md",
		));

	let content = std::fs::read_to_string(tmp.path().join("README.md"))?;
	assert_eq!(
		content,
		"# Project\n\n## Navigation\n- **guide/:**\n    - [getting started.md](docs/guide/getting%20started.md)\n  - [index.md](docs/index.md)\n## License\nMIT\n"
	);

	Ok(())
}

#[test]
fn generate_nav_twice_is_a_noop() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	setup(tmp.path())?;

	common::mdkeep_cmd()
		.arg("generate-nav")
		.arg("--root")
		.arg(tmp.path())
		.assert()
		.success();
	let first = std::fs::read_to_string(tmp.path().join("README.md"))?;

	common::mdkeep_cmd()
		.arg("generate-nav")
		.arg("--root")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("is already up to date"));

	let second = std::fs::read_to_string(tmp.path().join("README.md"))?;
	assert_eq!(first, second);

	Ok(())
}

#[test]
fn generate_nav_dry_run_does_not_write() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	setup(tmp.path())?;

	common::mdkeep_cmd()
		.arg("generate-nav")
		.arg("--dry-run")
		.arg("--root")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains(
			"Would update section `## Navigation` in README.md",
		))
		.stderr(predicates::str::contains("+  - [index.md](docs/index.md)"))
		.stderr(predicates::str::contains("-stale"));

	let content = std::fs::read_to_string(tmp.path().join("README.md"))?;
	assert_eq!(content, README);

	Ok(())
}

#[test]
fn generate_nav_accepts_original_action_name() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	setup(tmp.path())?;

	common::mdkeep_cmd()
		.arg("generate_nav")
		.arg("--root")
		.arg(tmp.path())
		.arg("--exclude")
		.arg("guide")
		.assert()
		.success();

	let content = std::fs::read_to_string(tmp.path().join("README.md"))?;
	assert_eq!(
		content,
		"# Project\n\n## Navigation\n  - [index.md](docs/index.md)\n## License\nMIT\n"
	);

	Ok(())
}

#[test]
fn generate_nav_flags_override_config() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	setup(tmp.path())?;
	std::fs::write(
		tmp.path().join("mdkeep.toml"),
		"[nav]\ntitle = \"## Contents\"\nexclude = [\"index.md\"]\n",
	)?;
	std::fs::write(
		tmp.path().join("NOTES.md"),
		"# Notes\n\n## Contents\n\n## Pages\nold\n",
	)?;

	common::mdkeep_cmd()
		.arg("generate-nav")
		.arg("--root")
		.arg(tmp.path())
		.arg("--output")
		.arg("NOTES.md")
		.arg("--title")
		.arg("## Pages")
		.assert()
		.success()
		.stdout(predicates::str::contains(
			"Updated section `## Pages` in NOTES.md",
		));

	let content = std::fs::read_to_string(tmp.path().join("NOTES.md"))?;
	assert_eq!(
		content,
		"# Notes\n\n## Contents\n\n## Pages\n- **guide/:**\n    - [getting started.md](docs/guide/getting%20started.md)\n"
	);
	assert_eq!(std::fs::read_to_string(tmp.path().join("README.md"))?, README);

	Ok(())
}

#[test]
fn generate_nav_reports_missing_header() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	setup(tmp.path())?;

	common::mdkeep_cmd()
		.arg("generate-nav")
		.arg("--root")
		.arg(tmp.path())
		.arg("--title")
		.arg("## Missing")
		.assert()
		.success()
		.stdout(predicates::str::contains(
			"Header `## Missing` not found in README.md; nothing written",
		));

	let content = std::fs::read_to_string(tmp.path().join("README.md"))?;
	assert_eq!(content, README);

	Ok(())
}

#[test]
fn generate_nav_skips_missing_target() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	setup(tmp.path())?;

	common::mdkeep_cmd()
		.arg("generate-nav")
		.arg("--root")
		.arg(tmp.path())
		.arg("--dir")
		.arg("missing")
		.assert()
		.code(1)
		.stderr(predicates::str::contains("target directory not found"));

	let content = std::fs::read_to_string(tmp.path().join("README.md"))?;
	assert_eq!(content, README);

	Ok(())
}

#[test]
fn generate_nav_missing_document_is_an_error() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	setup(tmp.path())?;

	common::mdkeep_cmd()
		.arg("generate-nav")
		.arg("--root")
		.arg(tmp.path())
		.arg("--output")
		.arg("MISSING.md")
		.assert()
		.code(2)
		.stderr(predicates::str::contains("document not found"));

	Ok(())
}

#[test]
fn generate_nav_rejects_invalid_config() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	setup(tmp.path())?;
	std::fs::write(tmp.path().join("mdkeep.toml"), "[nav]\ntitel = \"typo\"\n")?;

	common::mdkeep_cmd()
		.arg("generate-nav")
		.arg("--root")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("failed to parse config file"));

	Ok(())
}
