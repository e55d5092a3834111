use std::fmt;
use std::path::Path;
use std::process::Command;
use std::sync::LazyLock;

use regex::Regex;

use crate::MdkeepError;
use crate::MdkeepResult;

/// Separator between the date, author and subject fields of a commit header
/// line.
pub const HEADER_SEPARATOR: &str = "|||";

/// Matches a `--name-status` line: status letter, optional similarity score,
/// tab, path and an optional second tab-separated path.
static NAME_STATUS_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^([AMDRTC])(\d+)?\t(.+?)(?:\t(.+))?$").expect("invalid name-status regex")
});

/// The change type reported for one path in a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeStatus {
	Added,
	Modified,
	Deleted,
	Renamed,
	TypeChanged,
	Copied,
}

impl ChangeStatus {
	pub fn from_code(code: char) -> Option<Self> {
		let status = match code {
			'A' => Self::Added,
			'M' => Self::Modified,
			'D' => Self::Deleted,
			'R' => Self::Renamed,
			'T' => Self::TypeChanged,
			'C' => Self::Copied,
			_ => return None,
		};

		Some(status)
	}

	pub fn code(self) -> char {
		match self {
			Self::Added => 'A',
			Self::Modified => 'M',
			Self::Deleted => 'D',
			Self::Renamed => 'R',
			Self::TypeChanged => 'T',
			Self::Copied => 'C',
		}
	}

	/// Renamed and copied entries report both a source and a destination path.
	pub fn has_two_paths(self) -> bool {
		matches!(self, Self::Renamed | Self::Copied)
	}
}

impl fmt::Display for ChangeStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.code())
	}
}

/// One changed path within a commit.
///
/// Renamed and copied entries always carry a `new_path`; every other status
/// never does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEntry {
	status: ChangeStatus,
	score: Option<u32>,
	path: String,
	new_path: Option<String>,
}

impl ChangeEntry {
	/// Build an entry, returning `None` when a renamed or copied entry is
	/// missing its destination path. A second path on any other status is
	/// dropped.
	pub fn new(
		status: ChangeStatus,
		score: Option<u32>,
		path: impl Into<String>,
		new_path: Option<String>,
	) -> Option<Self> {
		let new_path = if status.has_two_paths() {
			Some(new_path.filter(|p| !p.is_empty())?)
		} else {
			None
		};

		Some(Self {
			status,
			score,
			path: path.into(),
			new_path,
		})
	}

	pub fn status(&self) -> ChangeStatus {
		self.status
	}

	/// Similarity score reported with renames and copies (`R100` → `100`).
	pub fn score(&self) -> Option<u32> {
		self.score
	}

	/// The changed path. For renames and copies this is the source path.
	pub fn path(&self) -> &str {
		&self.path
	}

	/// The destination path of a rename or copy.
	pub fn new_path(&self) -> Option<&str> {
		self.new_path.as_deref()
	}
}

/// A commit header together with the paths it changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
	/// Commit date as printed by `--date=short` (`YYYY-MM-DD`).
	pub date: String,
	pub author: String,
	pub message: String,
	pub changes: Vec<ChangeEntry>,
}

/// Split a header line into date, author and subject.
///
/// Only the first two separators are significant, so a subject may itself
/// contain the separator. Returns `None` for lines with fewer than three
/// fields.
pub fn parse_header_line(line: &str) -> Option<(&str, &str, &str)> {
	let mut fields = line.splitn(3, HEADER_SEPARATOR);
	let date = fields.next()?;
	let author = fields.next()?;
	let message = fields.next()?;
	Some((date, author, message))
}

/// Parse a single `--name-status` line.
pub fn parse_name_status_line(line: &str) -> Option<ChangeEntry> {
	let caps = NAME_STATUS_REGEX.captures(line)?;
	let status = caps[1].chars().next().and_then(ChangeStatus::from_code)?;
	let score = caps.get(2).and_then(|m| m.as_str().parse().ok());
	let new_path = caps.get(4).map(|m| m.as_str().to_string());

	ChangeEntry::new(status, score, &caps[3], new_path)
}

/// Parse `git log --name-status` output produced with the
/// `%ad|||%an|||%s` pretty format into commit records, keeping log order.
///
/// Lines that are neither a header nor a name-status line are ignored, as are
/// name-status lines that appear before the first header.
pub fn parse_commit_log(log: &str) -> Vec<CommitRecord> {
	let mut commits: Vec<CommitRecord> = Vec::new();
	// Whether name-status lines should attach to the last pushed commit.
	let mut open = false;

	for line in log.lines() {
		let line = line.strip_suffix('\r').unwrap_or(line);

		if line.contains(HEADER_SEPARATOR) {
			match parse_header_line(line) {
				Some((date, author, message)) => {
					commits.push(CommitRecord {
						date: date.to_string(),
						author: author.to_string(),
						message: message.to_string(),
						changes: Vec::new(),
					});
					open = true;
				}
				None => {
					tracing::debug!("ignoring malformed commit header: {line}");
					open = false;
				}
			}
			continue;
		}

		let Some(change) = parse_name_status_line(line) else {
			continue;
		};

		match commits.last_mut() {
			Some(commit) if open => commit.changes.push(change),
			_ => tracing::debug!("ignoring change outside of a commit: {line}"),
		}
	}

	commits
}

/// Something that can produce raw commit log text for a working directory.
pub trait HistorySource {
	/// Return the log of the `count` most recent commits reachable from the
	/// working tree at `root`, in the `%ad|||%an|||%s` + `--name-status`
	/// format, most recent first.
	fn commit_log(&self, root: &Path, count: usize) -> MdkeepResult<String>;
}

/// Reads history by running the `git` executable.
#[derive(Debug, Clone)]
pub struct GitCli {
	program: String,
}

impl Default for GitCli {
	fn default() -> Self {
		Self::new()
	}
}

impl GitCli {
	pub fn new() -> Self {
		Self {
			program: "git".to_string(),
		}
	}

	/// Use a different executable, e.g. an absolute path to git.
	pub fn with_program(program: impl Into<String>) -> Self {
		Self {
			program: program.into(),
		}
	}

	fn log_args(count: usize) -> Vec<String> {
		vec![
			"-c".to_string(),
			"core.quotepath=false".to_string(),
			"log".to_string(),
			format!("-{count}"),
			format!("--pretty=format:%ad{HEADER_SEPARATOR}%an{HEADER_SEPARATOR}%s"),
			"--date=short".to_string(),
			"--name-status".to_string(),
		]
	}
}

impl HistorySource for GitCli {
	fn commit_log(&self, root: &Path, count: usize) -> MdkeepResult<String> {
		tracing::debug!("reading {count} commit(s) of history in {}", root.display());

		let output = Command::new(&self.program)
			.args(Self::log_args(count))
			.current_dir(root)
			.output()
			.map_err(|e| {
				if e.kind() == std::io::ErrorKind::NotFound {
					MdkeepError::GitNotFound
				} else {
					MdkeepError::Io(e)
				}
			})?;

		if !output.status.success() {
			return Err(MdkeepError::GitCommand {
				status: output
					.status
					.code()
					.map_or_else(|| "unknown".to_string(), |code| code.to_string()),
				stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
			});
		}

		Ok(String::from_utf8_lossy(&output.stdout).into_owned())
	}
}
