use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::path::PathBuf;

use ignore::gitignore::Gitignore;
use ignore::gitignore::GitignoreBuilder;

use crate::MdkeepError;
use crate::MdkeepResult;
use crate::changelog::TargetFilter;
use crate::changelog::render_changes;
use crate::config::MdkeepConfig;
use crate::history::HistorySource;
use crate::history::parse_commit_log;
use crate::section::SectionChange;
use crate::section::plan_section;
use crate::section::write_atomic;
use crate::tree::TreeOptions;
use crate::tree::create_links;
use crate::wiki_links::convert_wiki_links;
use crate::wiki_links::find_wiki_links;

/// Whether computed changes are written to disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WriteMode {
	#[default]
	Write,
	/// Compute every change but leave all files untouched.
	DryRun,
}

/// Why an operation stopped before producing output.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SkipReason {
	/// The project root does not exist or is not a directory.
	RootNotFound(PathBuf),
	/// The directory to list does not exist or is not a directory.
	TargetNotFound(PathBuf),
	/// The generated body contains `heading`, which would end the section
	/// titled `title`.
	HeadingInBody { title: String, heading: String },
}

impl fmt::Display for SkipReason {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::RootNotFound(path) => write!(f, "root directory not found at {}", path.display()),
			Self::TargetNotFound(path) => {
				write!(f, "target directory not found at {}", path.display())
			}
			Self::HeadingInBody { title, heading } => {
				write!(
					f,
					"generated heading `{heading}` would end the section `{title}`; use a \
					 higher-level title such as `## {}`",
					title.trim_start_matches('#').trim()
				)
			}
		}
	}
}

/// The new content computed for a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
	pub path: PathBuf,
	pub original: String,
	pub updated: String,
}

/// The result of writing a generated section into a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionOutcome {
	/// The section changed. The file was written unless running dry.
	Updated(FileChange),
	/// The section already held the generated content.
	Unchanged { path: PathBuf },
	/// The document has no such header; nothing was written.
	HeaderNotFound { path: PathBuf },
	/// A configuration problem stopped the operation; nothing was written.
	Skipped(SkipReason),
}

/// Request for a navigation section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavRequest {
	pub output: PathBuf,
	pub target_dir: PathBuf,
	pub title: String,
	pub options: TreeOptions,
}

/// Request for a recent changes section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentRequest {
	pub output: PathBuf,
	pub target_dir: String,
	pub title: String,
	pub commits: usize,
}

/// Counts from a batch wiki link conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionSummary {
	/// Files with a matching extension that were read.
	pub scanned: usize,
	/// Files whose content changed, in path order.
	pub changes: Vec<FileChange>,
}

impl ConversionSummary {
	pub fn converted(&self) -> usize {
		self.changes.len()
	}
}

/// The result of a batch wiki link conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionOutcome {
	Converted(ConversionSummary),
	Skipped(SkipReason),
}

/// A documentation root together with its configuration.
///
/// Every operation validates the root before touching anything, so a
/// `Project` may be built for a path that does not exist yet.
#[derive(Debug, Clone)]
pub struct Project {
	root: PathBuf,
	config: MdkeepConfig,
}

impl Project {
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self::with_config(root, MdkeepConfig::default())
	}

	pub fn with_config(root: impl Into<PathBuf>, config: MdkeepConfig) -> Self {
		Self {
			root: root.into(),
			config,
		}
	}

	/// Build a project, loading the discovered config file at `root` when
	/// the root exists and has one.
	pub fn load(root: impl Into<PathBuf>) -> MdkeepResult<Self> {
		let root = root.into();
		let config = if root.is_dir() {
			MdkeepConfig::load(&root)?.unwrap_or_default()
		} else {
			MdkeepConfig::default()
		};

		Ok(Self::with_config(root, config))
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	pub fn config(&self) -> &MdkeepConfig {
		&self.config
	}

	/// Resolve a document path against the root.
	pub fn resolve(&self, path: &Path) -> PathBuf {
		if path.is_absolute() {
			path.to_path_buf()
		} else {
			self.root.join(path)
		}
	}

	/// The navigation request described by the config.
	pub fn nav_request(&self) -> NavRequest {
		let nav = &self.config.nav;
		NavRequest {
			output: nav.output.clone(),
			target_dir: nav.dir.clone(),
			title: nav.title.clone(),
			options: nav.tree_options(),
		}
	}

	/// The recent changes request described by the config.
	pub fn recent_request(&self) -> RecentRequest {
		let recent = &self.config.recent;
		RecentRequest {
			output: recent.output.clone(),
			target_dir: recent.dir.clone(),
			title: recent.title.clone(),
			commits: recent.commits,
		}
	}

	fn check_root(&self) -> Result<(), SkipReason> {
		if self.root.is_dir() {
			Ok(())
		} else {
			tracing::error!("root directory not found at {}", self.root.display());
			Err(SkipReason::RootNotFound(self.root.clone()))
		}
	}

	/// Render the navigation list for `target_dir` (relative to the root).
	pub fn nav_links(
		&self,
		target_dir: &Path,
		options: &TreeOptions,
	) -> MdkeepResult<Result<String, SkipReason>> {
		if let Err(reason) = self.check_root() {
			return Ok(Err(reason));
		}

		let target = self.root.join(target_dir);
		if !target.is_dir() {
			tracing::error!("target directory not found at {}", target.display());
			return Ok(Err(SkipReason::TargetNotFound(target)));
		}

		let links = create_links(&self.root, target_dir, options)?;
		tracing::debug!("rendered {} navigation line(s)", links.len());
		Ok(Ok(links.join("\n")))
	}

	/// Render the recent changes list for `target_dir` from the last
	/// `commits` commits. History errors are returned as-is.
	pub fn recent_changes(
		&self,
		source: &dyn HistorySource,
		commits: usize,
		target_dir: &str,
	) -> MdkeepResult<Result<String, SkipReason>> {
		if let Err(reason) = self.check_root() {
			return Ok(Err(reason));
		}

		let log = source.commit_log(&self.root, commits)?;
		let records = parse_commit_log(&log);
		tracing::debug!("parsed {} commit(s)", records.len());

		Ok(Ok(render_changes(&records, &TargetFilter::new(target_dir))))
	}

	/// Write the navigation list into the section titled `request.title`.
	pub fn generate_nav_links(
		&self,
		request: &NavRequest,
		mode: WriteMode,
	) -> MdkeepResult<SectionOutcome> {
		match self.nav_links(&request.target_dir, &request.options)? {
			Ok(body) => self.update_section(&request.output, &request.title, &body, mode),
			Err(reason) => Ok(SectionOutcome::Skipped(reason)),
		}
	}

	/// Write the recent changes list into the section titled
	/// `request.title`.
	pub fn generate_recently_modified(
		&self,
		source: &dyn HistorySource,
		request: &RecentRequest,
		mode: WriteMode,
	) -> MdkeepResult<SectionOutcome> {
		match self.recent_changes(source, request.commits, &request.target_dir)? {
			Ok(body) => self.update_section(&request.output, &request.title, &body, mode),
			Err(reason) => Ok(SectionOutcome::Skipped(reason)),
		}
	}

	fn update_section(
		&self,
		output: &Path,
		title: &str,
		body: &str,
		mode: WriteMode,
	) -> MdkeepResult<SectionOutcome> {
		let path = self.resolve(output);

		let outcome = match plan_section(&path, title, body)? {
			SectionChange::HeaderNotFound => {
				tracing::warn!("header `{}` not found in {}", title.trim(), path.display());
				SectionOutcome::HeaderNotFound { path }
			}
			SectionChange::HeadingInBody { heading } => {
				let reason = SkipReason::HeadingInBody {
					title: title.trim().to_string(),
					heading,
				};
				tracing::error!("{reason} in {}", path.display());
				SectionOutcome::Skipped(reason)
			}
			SectionChange::Unchanged => SectionOutcome::Unchanged { path },
			SectionChange::Changed { original, updated } => {
				if mode == WriteMode::Write {
					write_atomic(&path, &updated)?;
					tracing::info!("updated section `{}` in {}", title.trim(), path.display());
				}

				SectionOutcome::Updated(FileChange {
					path,
					original,
					updated,
				})
			}
		};

		Ok(outcome)
	}

	/// Convert wiki links in every file under the root whose extension is
	/// `extension`.
	///
	/// Hidden directories and paths ignored by the root `.gitignore` are
	/// skipped. All files are collected before any is rewritten.
	pub fn convert_wiki_links(
		&self,
		extension: &str,
		mode: WriteMode,
	) -> MdkeepResult<ConversionOutcome> {
		if let Err(reason) = self.check_root() {
			return Ok(ConversionOutcome::Skipped(reason));
		}

		let extension = extension.trim_start_matches('.');
		let files = collect_files(&self.root, extension)?;
		let mut summary = ConversionSummary {
			scanned: files.len(),
			changes: Vec::new(),
		};

		for path in files {
			let Ok(original) = String::from_utf8(std::fs::read(&path)?) else {
				tracing::warn!("skipping {}: not valid UTF-8", path.display());
				continue;
			};
			let link_count = find_wiki_links(&original).len();
			if link_count == 0 {
				continue;
			}

			let updated = convert_wiki_links(&original).into_owned();
			tracing::debug!("converting {link_count} wiki link(s) in {}", path.display());

			if mode == WriteMode::Write {
				write_atomic(&path, &updated)?;
			}

			summary.changes.push(FileChange {
				path,
				original,
				updated,
			});
		}

		tracing::info!(
			"converted {} of {} file(s) in {}",
			summary.converted(),
			summary.scanned,
			self.root.display()
		);

		Ok(ConversionOutcome::Converted(summary))
	}
}

/// Collect the files under `root` with the given extension, sorted.
fn collect_files(root: &Path, extension: &str) -> MdkeepResult<Vec<PathBuf>> {
	let mut files = Vec::new();
	let mut walk = WalkState::default();
	let gitignore = build_gitignore(root);

	walk_dir(root, extension, &gitignore, &mut files, &mut walk)?;
	files.sort();
	Ok(files)
}

/// Canonical directories seen during a walk.
#[derive(Default)]
struct WalkState {
	/// Directories above the one being walked.
	ancestors: HashSet<PathBuf>,
	/// Every directory walked so far.
	walked: HashSet<PathBuf>,
}

/// Build a `Gitignore` matcher from the root `.gitignore` file (if any).
fn build_gitignore(root: &Path) -> Gitignore {
	let mut builder = GitignoreBuilder::new(root);
	let gitignore_path = root.join(".gitignore");
	if gitignore_path.is_file() {
		if let Some(e) = builder.add(&gitignore_path) {
			tracing::warn!("ignoring invalid .gitignore rules: {e}");
		}
	}

	builder.build().unwrap_or_else(|_| Gitignore::empty())
}

/// Walk `dir`, failing only when a symlink leads back to one of its own
/// parents. A directory already walked through another path is skipped.
fn walk_dir(
	dir: &Path,
	extension: &str,
	gitignore: &Gitignore,
	files: &mut Vec<PathBuf>,
	walk: &mut WalkState,
) -> MdkeepResult<()> {
	let canonical = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
	if walk.ancestors.contains(&canonical) {
		return Err(MdkeepError::SymlinkCycle {
			path: dir.display().to_string(),
		});
	}

	if !walk.walked.insert(canonical.clone()) {
		tracing::debug!("{} was already walked, skipping", dir.display());
		return Ok(());
	}

	walk.ancestors.insert(canonical.clone());
	let result = walk_children(dir, extension, gitignore, files, walk);
	walk.ancestors.remove(&canonical);

	result
}

fn walk_children(
	dir: &Path,
	extension: &str,
	gitignore: &Gitignore,
	files: &mut Vec<PathBuf>,
	walk: &mut WalkState,
) -> MdkeepResult<()> {
	let mut children = Vec::new();
	for entry in std::fs::read_dir(dir)? {
		let entry = entry?;
		let is_symlink = entry.file_type()?.is_symlink();
		children.push((is_symlink, entry.path()));
	}
	// Real directories first so their own paths win over symlinked ones.
	children.sort();

	for (_, path) in children {
		let is_dir = path.is_dir();

		if is_dir && is_hidden(&path) {
			continue;
		}

		if gitignore.matched(&path, is_dir).is_ignore() {
			continue;
		}

		if is_dir {
			walk_dir(&path, extension, gitignore, files, walk)?;
		} else if path.is_file() && has_extension(&path, extension) {
			files.push(path);
		}
	}

	Ok(())
}

fn is_hidden(path: &Path) -> bool {
	path.file_name()
		.and_then(|name| name.to_str())
		.is_some_and(|name| name.starts_with('.'))
}

fn has_extension(path: &Path, extension: &str) -> bool {
	path.extension()
		.and_then(|ext| ext.to_str())
		.is_some_and(|ext| ext == extension)
}
