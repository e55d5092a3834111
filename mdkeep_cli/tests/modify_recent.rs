mod common;

use std::path::Path;
use std::process::Command;

use mdkeep_core::AnyEmptyResult;
use similar_asserts::assert_eq;

const README: &str = "# Project\n\n## Recently Modified\nstale\n\n## License\nMIT\n";

fn git_available() -> bool {
	Command::new("git")
		.arg("--version")
		.output()
		.is_ok_and(|output| output.status.success())
}

fn git(root: &Path, args: &[&str]) -> AnyEmptyResult {
	let output = Command::new("git")
		.args([
			"-c",
			"user.name=Jane",
			"-c",
			"user.email=jane@example.com",
			"-c",
			"commit.gpgsign=false",
		])
		.args(args)
		.current_dir(root)
		.env("GIT_CONFIG_NOSYSTEM", "1")
		.env("GIT_AUTHOR_DATE", "2024-01-01T12:00:00+0000")
		.env("GIT_COMMITTER_DATE", "2024-01-01T12:00:00+0000")
		.output()?;

	if !output.status.success() {
		return Err(String::from_utf8_lossy(&output.stderr).into_owned().into());
	}

	Ok(())
}

#[test]
fn modify_recent_outside_repository_fails() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("README.md"), README)?;

	// Exits 2 whether git is missing or refuses to run outside a repository.
	common::mdkeep_cmd()
		.arg("modify-recent")
		.arg("--root")
		.arg(tmp.path())
		.env("GIT_CEILING_DIRECTORIES", tmp.path())
		.assert()
		.code(2);

	let content = std::fs::read_to_string(tmp.path().join("README.md"))?;
	assert_eq!(content, README);

	Ok(())
}

#[test]
fn modify_recent_skips_missing_root() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::mdkeep_cmd()
		.arg("modify-recent")
		.arg("--root")
		.arg(tmp.path().join("nope"))
		.assert()
		.code(1)
		.stderr(predicates::str::contains("root directory not found"));

	Ok(())
}

#[test]
fn modify_recent_lists_commits_under_target() -> AnyEmptyResult {
	if !git_available() {
		return Ok(());
	}

	let tmp = tempfile::tempdir()?;
	let root = tmp.path();
	std::fs::create_dir_all(root.join("docs"))?;
	std::fs::write(root.join("README.md"), README)?;
	std::fs::write(root.join("docs/guide.md"), "# Guide\n")?;
	std::fs::write(root.join("main.rs"), "fn main() {}\n")?;

	git(root, &["init", "--quiet"])?;
	git(root, &["add", "README.md", "docs/guide.md"])?;
	git(root, &["commit", "--quiet", "-m", "Add guide"])?;
	git(root, &["add", "main.rs"])?;
	git(root, &["commit", "--quiet", "-m", "Add code"])?;

	common::mdkeep_cmd()
		.arg("modify_recent")
		.arg("--root")
		.arg(root)
		.arg("--num_commits")
		.arg("5")
		.env("GIT_CEILING_DIRECTORIES", root)
		.assert()
		.success()
		.stdout(predicates::str::contains(
			"Updated section `## Recently Modified` in README.md",
		));

	let content = std::fs::read_to_string(root.join("README.md"))?;
	assert_eq!(
		content,
		"# Project\n\n## Recently Modified\n### 2024-01-01 Jane : Add guide\n- ✨ [guide.md](docs/guide.md)\n## License\nMIT\n"
	);

	common::mdkeep_cmd()
		.arg("modify-recent")
		.arg("--root")
		.arg(root)
		.env("GIT_CEILING_DIRECTORIES", root)
		.assert()
		.success()
		.stdout(predicates::str::contains("is already up to date"));

	Ok(())
}

#[test]
fn modify_recent_limits_commit_count() -> AnyEmptyResult {
	if !git_available() {
		return Ok(());
	}

	let tmp = tempfile::tempdir()?;
	let root = tmp.path();
	std::fs::create_dir_all(root.join("docs"))?;
	std::fs::write(root.join("README.md"), README)?;

	git(root, &["init", "--quiet"])?;
	git(root, &["add", "README.md"])?;
	git(root, &["commit", "--quiet", "-m", "Initial"])?;
	std::fs::write(root.join("docs/old.md"), "old\n")?;
	git(root, &["add", "docs/old.md"])?;
	git(root, &["commit", "--quiet", "-m", "Add old"])?;
	std::fs::write(root.join("docs/new.md"), "new\n")?;
	git(root, &["add", "docs/new.md"])?;
	git(root, &["commit", "--quiet", "-m", "Add new"])?;

	common::mdkeep_cmd()
		.arg("modify-recent")
		.arg("--root")
		.arg(root)
		.arg("--num-commits")
		.arg("1")
		.env("GIT_CEILING_DIRECTORIES", root)
		.assert()
		.success();

	let content = std::fs::read_to_string(root.join("README.md"))?;
	assert!(content.contains("### 2024-01-01 Jane : Add new\n- ✨ [new.md](docs/new.md)\n"));
	assert!(!content.contains("Add old"));

	Ok(())
}

#[test]
fn modify_recent_refuses_title_ended_by_commit_headings() -> AnyEmptyResult {
	if !git_available() {
		return Ok(());
	}

	let tmp = tempfile::tempdir()?;
	let root = tmp.path();
	let readme = "# Project\n\n### Recent\nstale\n";
	std::fs::write(root.join("README.md"), readme)?;
	std::fs::create_dir_all(root.join("docs"))?;
	std::fs::write(root.join("docs/notes.md"), "notes\n")?;

	git(root, &["init", "--quiet"])?;
	git(root, &["add", "docs/notes.md"])?;
	git(root, &["commit", "--quiet", "-m", "Add notes"])?;

	for _ in 0..2 {
		common::mdkeep_cmd()
			.arg("modify-recent")
			.arg("--root")
			.arg(root)
			.arg("--title")
			.arg("### Recent")
			.env("GIT_CEILING_DIRECTORIES", root)
			.assert()
			.code(1)
			.stderr(predicates::str::contains("would end the section `### Recent`"));
	}

	let content = std::fs::read_to_string(root.join("README.md"))?;
	assert_eq!(content, readme);

	Ok(())
}
