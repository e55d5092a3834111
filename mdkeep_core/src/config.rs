use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::MdkeepError;
use crate::MdkeepResult;
use crate::tree::TreeOptions;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] =
	["mdkeep.toml", ".mdkeep.toml", ".config/mdkeep.toml"];

pub const DEFAULT_OUTPUT: &str = "README.md";
pub const DEFAULT_TARGET_DIR: &str = "docs";
pub const DEFAULT_NAV_TITLE: &str = "## Navigation";
pub const DEFAULT_RECENT_TITLE: &str = "## Recently Modified";
pub const DEFAULT_COMMIT_COUNT: usize = 15;
pub const DEFAULT_EXTENSION: &str = "md";

/// Configuration loaded from an `mdkeep.toml` file.
///
/// ```toml
/// [nav]
/// output = "README.md"
/// dir = "docs"
/// title = "## Navigation"
/// exclude = [".DS_Store", "assets"]
///
/// [recent]
/// output = "README.md"
/// dir = "docs"
/// title = "## Recently Modified"
/// commits = 15
///
/// [wiki]
/// extension = "md"
/// ```
///
/// Every key is optional. Relative `output` paths are resolved against the
/// project root.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct MdkeepConfig {
	#[serde(default)]
	pub nav: NavConfig,
	#[serde(default)]
	pub recent: RecentConfig,
	#[serde(default)]
	pub wiki: WikiConfig,
}

/// Settings for the navigation section.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct NavConfig {
	/// Document holding the navigation section.
	pub output: PathBuf,
	/// Directory, relative to the root, whose files are listed.
	pub dir: PathBuf,
	/// Header line introducing the section, e.g. `## Navigation`.
	pub title: String,
	/// File and directory names left out of the listing.
	pub exclude: Vec<String>,
}

impl Default for NavConfig {
	fn default() -> Self {
		Self {
			output: PathBuf::from(DEFAULT_OUTPUT),
			dir: PathBuf::from(DEFAULT_TARGET_DIR),
			title: DEFAULT_NAV_TITLE.to_string(),
			exclude: Vec::new(),
		}
	}
}

impl NavConfig {
	pub fn tree_options(&self) -> TreeOptions {
		TreeOptions::new(self.exclude.iter().cloned())
	}
}

/// Settings for the recent changes section.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct RecentConfig {
	/// Document holding the recent changes section.
	pub output: PathBuf,
	/// Repository-relative directory whose changes are listed.
	pub dir: String,
	/// Header line introducing the section.
	pub title: String,
	/// Number of most recent commits to read.
	pub commits: usize,
}

impl Default for RecentConfig {
	fn default() -> Self {
		Self {
			output: PathBuf::from(DEFAULT_OUTPUT),
			dir: DEFAULT_TARGET_DIR.to_string(),
			title: DEFAULT_RECENT_TITLE.to_string(),
			commits: DEFAULT_COMMIT_COUNT,
		}
	}
}

/// Settings for wiki link conversion.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct WikiConfig {
	/// Extension, without the dot, of the files to convert.
	pub extension: String,
}

impl Default for WikiConfig {
	fn default() -> Self {
		Self {
			extension: DEFAULT_EXTENSION.to_string(),
		}
	}
}

impl MdkeepConfig {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if no config file exists.
	pub fn load(root: &Path) -> MdkeepResult<Option<MdkeepConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		tracing::debug!("loading config from {}", config_path.display());
		let content = std::fs::read_to_string(&config_path)?;
		let config = Self::parse(&content)?;

		Ok(Some(config))
	}

	/// Parse config file content.
	pub fn parse(content: &str) -> MdkeepResult<MdkeepConfig> {
		toml::from_str(content).map_err(|e| MdkeepError::ConfigParse(e.to_string()))
	}
}
