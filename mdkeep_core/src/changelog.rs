use crate::history::ChangeEntry;
use crate::history::ChangeStatus;
use crate::history::CommitRecord;
use crate::wiki_links::encode_spaces;

/// Emoji shown in front of a change entry, if its status has one.
pub fn status_emoji(status: ChangeStatus) -> Option<&'static str> {
	match status {
		ChangeStatus::Added => Some("✨"),
		ChangeStatus::Modified => Some("🔨"),
		ChangeStatus::Deleted => Some("🗑️"),
		ChangeStatus::Renamed => Some("🚚"),
		ChangeStatus::TypeChanged | ChangeStatus::Copied => None,
	}
}

/// A repository-relative directory prefix used to select change entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetFilter {
	prefix: String,
}

impl TargetFilter {
	/// Build a filter from a forward-slash path. Leading `./` and trailing `/`
	/// are ignored; an empty prefix or `.` selects every path.
	pub fn new(prefix: &str) -> Self {
		let mut prefix = prefix.trim().replace('\\', "/");
		while let Some(rest) = prefix.strip_prefix("./") {
			prefix = rest.to_string();
		}
		let prefix = prefix.trim_end_matches('/');
		let prefix = if prefix == "." { "" } else { prefix };

		Self {
			prefix: prefix.to_string(),
		}
	}

	/// Whether `path` is the prefix itself or lies below it. Surrounding
	/// quotes and spaces, as git prints for unusual names, are ignored.
	pub fn matches(&self, path: &str) -> bool {
		if self.prefix.is_empty() {
			return true;
		}

		let path = path.trim_matches(|c| c == '"' || c == ' ');
		path.strip_prefix(self.prefix.as_str())
			.is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
	}

	/// Renames and copies are selected when either of their paths matches.
	pub fn matches_entry(&self, entry: &ChangeEntry) -> bool {
		self.matches(entry.path()) || entry.new_path().is_some_and(|path| self.matches(path))
	}
}

/// Render the commits as markdown, keeping only entries under `filter`.
///
/// Each commit with at least one selected entry becomes a
/// `### {date} {author} : {message}` heading followed by one bullet per
/// entry. Commits without selected entries are left out entirely.
pub fn render_changes(commits: &[CommitRecord], filter: &TargetFilter) -> String {
	let mut lines = Vec::new();

	for commit in commits {
		let entries: Vec<String> = commit
			.changes
			.iter()
			.filter(|entry| filter.matches_entry(entry))
			.map(render_entry)
			.collect();

		if entries.is_empty() {
			continue;
		}

		lines.push(format!(
			"### {} {} : {}",
			commit.date, commit.author, commit.message
		));
		lines.extend(entries);
	}

	lines.join("\n")
}

/// Render a single change entry as a list item.
pub fn render_entry(entry: &ChangeEntry) -> String {
	let body = match (entry.status(), entry.new_path()) {
		(ChangeStatus::Renamed, Some(new_path)) => {
			format!(
				"{} <- {}",
				file_link(new_path),
				file_name(entry.path())
			)
		}
		(ChangeStatus::Copied, Some(new_path)) => file_link(new_path),
		// Deleted files have nothing left to link to.
		(ChangeStatus::Deleted, _) => entry.path().to_string(),
		_ => file_link(entry.path()),
	};

	match status_emoji(entry.status()) {
		Some(emoji) => format!("- {emoji} {body}"),
		None => format!("- {body}"),
	}
}

fn file_link(path: &str) -> String {
	let path = path.trim_matches('"');
	format!("[{}]({})", file_name(path), encode_spaces(path))
}

fn file_name(path: &str) -> &str {
	let path = path.trim_matches('"').trim_end_matches('/');
	path.rsplit('/').next().unwrap_or(path)
}
