mod common;

use mdkeep_core::AnyEmptyResult;

#[test]
fn no_subcommand_prints_usage() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let readme = "# Project\n\n## Navigation\nstale\n";
	std::fs::write(tmp.path().join("README.md"), readme)?;
	std::fs::create_dir_all(tmp.path().join("docs"))?;
	std::fs::write(tmp.path().join("docs/a.md"), "")?;

	common::mdkeep_cmd()
		.arg("--root")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("Usage:"))
		.stdout(predicates::str::contains("generate-nav"))
		.stdout(predicates::str::contains("modify-recent"))
		.stdout(predicates::str::contains("convert-wiki-links"));

	let content = std::fs::read_to_string(tmp.path().join("README.md"))?;
	similar_asserts::assert_eq!(content, readme);

	Ok(())
}

#[test]
fn unknown_subcommand_fails() {
	common::mdkeep_cmd()
		.arg("publish")
		.assert()
		.failure()
		.stderr(predicates::str::contains("unrecognized subcommand"));
}
