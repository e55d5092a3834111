use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum MdkeepError {
	#[error(transparent)]
	#[diagnostic(code(mdkeep::io_error))]
	Io(#[from] std::io::Error),

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(mdkeep::config_parse),
		help("check that mdkeep.toml is valid TOML with [nav], [recent] and/or [wiki] sections")
	)]
	ConfigParse(String),

	#[error("document not found: `{path}`")]
	#[diagnostic(
		code(mdkeep::document_not_found),
		help("create the document with the section header first, e.g. `## Navigation`")
	)]
	DocumentNotFound { path: String },

	#[error("the `git` executable could not be found")]
	#[diagnostic(
		code(mdkeep::git_not_found),
		help("install git and make sure it is available on your PATH")
	)]
	GitNotFound,

	#[error("git log failed with status {status}: {stderr}")]
	#[diagnostic(
		code(mdkeep::git_command),
		help("run mdkeep from inside a git working tree or pass `--root` pointing at one")
	)]
	GitCommand { status: String, stderr: String },

	#[error("symlink cycle detected at: `{path}`")]
	#[diagnostic(
		code(mdkeep::symlink_cycle),
		help("remove the circular symlink or exclude this path")
	)]
	SymlinkCycle { path: String },

	#[error("failed to replace `{path}`: {reason}")]
	#[diagnostic(code(mdkeep::persist))]
	Persist { path: String, reason: String },
}

pub type MdkeepResult<T> = Result<T, MdkeepError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
