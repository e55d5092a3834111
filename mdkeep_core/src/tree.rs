use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;

use crate::MdkeepResult;
use crate::wiki_links::encode_spaces;

/// Options for a navigation tree walk.
///
/// The value is immutable once built; every walk receives it explicitly so
/// two walks over the same project can use different exclusions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeOptions {
	exclude: Vec<String>,
}

impl TreeOptions {
	pub fn new<I, S>(exclude: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			exclude: exclude.into_iter().map(Into::into).collect(),
		}
	}

	/// Names skipped during the walk. Matching is exact and applies to the
	/// entry's own file name at any depth.
	pub fn exclude(&self) -> &[String] {
		&self.exclude
	}

	pub fn is_excluded(&self, name: &str) -> bool {
		self.exclude.iter().any(|excluded| excluded == name)
	}
}

/// A node of the walked directory tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
	pub name: String,
	pub path: PathBuf,
	pub is_dir: bool,
	/// Sorted children. Always empty for files.
	pub children: Vec<DirectoryEntry>,
}

impl DirectoryEntry {
	fn sort_key(&self) -> (bool, &str) {
		(!self.is_dir, self.name.as_str())
	}
}

/// Read the children of `dir` recursively, directories first, then by name.
///
/// Entries that are neither files nor directories (broken symlinks, sockets,
/// ...) are logged and skipped. A symlink pointing back at one of its own
/// parent directories is listed without children. Other symlinked
/// directories are listed in full, even when their target is also reached
/// directly.
pub fn read_tree(dir: &Path, options: &TreeOptions) -> MdkeepResult<Vec<DirectoryEntry>> {
	let mut ancestors = HashSet::new();
	read_dir_sorted(dir, options, &mut ancestors)
}

fn read_dir_sorted(
	dir: &Path,
	options: &TreeOptions,
	ancestors: &mut HashSet<PathBuf>,
) -> MdkeepResult<Vec<DirectoryEntry>> {
	let canonical = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
	if ancestors.contains(&canonical) {
		tracing::warn!("symlink cycle detected at {}, skipping", dir.display());
		return Ok(Vec::new());
	}

	ancestors.insert(canonical.clone());
	let entries = read_children(dir, options, ancestors);
	ancestors.remove(&canonical);

	entries
}

fn read_children(
	dir: &Path,
	options: &TreeOptions,
	ancestors: &mut HashSet<PathBuf>,
) -> MdkeepResult<Vec<DirectoryEntry>> {
	let mut entries = Vec::new();

	for entry in std::fs::read_dir(dir)? {
		let entry = entry?;
		let path = entry.path();
		let name = entry.file_name().to_string_lossy().into_owned();

		if options.is_excluded(&name) {
			continue;
		}

		let Ok(metadata) = std::fs::metadata(&path) else {
			tracing::warn!("unknown file type: {}", path.display());
			continue;
		};

		if metadata.is_dir() {
			let children = read_dir_sorted(&path, options, ancestors)?;
			entries.push(DirectoryEntry {
				name,
				path,
				is_dir: true,
				children,
			});
		} else if metadata.is_file() {
			entries.push(DirectoryEntry {
				name,
				path,
				is_dir: false,
				children: Vec::new(),
			});
		} else {
			tracing::warn!("unknown file type: {}", path.display());
		}
	}

	entries.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
	Ok(entries)
}

/// Render walked entries as a nested markdown list.
///
/// Directories become `- **name/:**` at the current depth and their contents
/// follow one level deeper. Files become `- [name](path)` one level deeper
/// than the current depth, where `path` is relative to `root`.
pub fn render_tree(entries: &[DirectoryEntry], root: &Path) -> Vec<String> {
	let mut lines = Vec::new();
	render_level(entries, root, 0, &mut lines);
	lines
}

fn render_level(entries: &[DirectoryEntry], root: &Path, level: usize, lines: &mut Vec<String>) {
	for entry in entries {
		if entry.is_dir {
			lines.push(format!("{}- **{}/:**", indent(level), entry.name));
			render_level(&entry.children, root, level + 1, lines);
		} else {
			let rel_path = encode_spaces(&relative_link_path(&entry.path, root));
			lines.push(format!("{}- [{}]({rel_path})", indent(level + 1), entry.name));
		}
	}
}

fn indent(level: usize) -> String {
	"  ".repeat(level)
}

/// Express `path` relative to `root` with forward slashes.
pub fn relative_link_path(path: &Path, root: &Path) -> String {
	let relative = path.strip_prefix(root).unwrap_or(path);
	relative
		.components()
		.map(|component| component.as_os_str().to_string_lossy())
		.collect::<Vec<_>>()
		.join("/")
}

/// Walk `root/target_dir` and return its navigation list lines.
pub fn create_links(
	root: &Path,
	target_dir: &Path,
	options: &TreeOptions,
) -> MdkeepResult<Vec<String>> {
	let entries = read_tree(&root.join(target_dir), options)?;
	Ok(render_tree(&entries, root))
}
