use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Keep README navigation, recent changes and wiki links in sync with your docs.",
	long_about = "mdkeep regenerates the generated parts of a project's markdown documents.\n\nIt \
	              rewrites the body under a chosen header with a navigation list of a docs \
	              folder or with the files touched by recent commits, and converts wiki-style \
	              [[links]] into portable markdown links.\n\nQuick start:\n  mdkeep \
	              generate-nav        List docs/ under `## Navigation` in README.md\n  mdkeep \
	              modify-recent       List recent changes under `## Recently Modified`\n  mdkeep \
	              convert-wiki-links  Rewrite [[links]] in every markdown file"
)]
pub struct MdkeepCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Path to the project root directory. Defaults to the current directory.
	#[arg(long, short, global = true)]
	pub root: Option<PathBuf>,

	/// Enable verbose output.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,

	/// Preview changes without writing files. Prints a diff of every
	/// document that would change.
	#[arg(long, global = true, default_value_t = false)]
	pub dry_run: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Write a navigation list of a directory into a document section.
	///
	/// Walks the directory recursively, listing subdirectories before files
	/// and both by name, and replaces the body under the section header with
	/// the resulting nested list of links.
	#[command(alias = "generate_nav")]
	GenerateNav {
		/// Document holding the section, relative to the root.
		#[arg(long, short)]
		output: Option<PathBuf>,

		/// Directory to list, relative to the root.
		#[arg(long, short)]
		dir: Option<PathBuf>,

		/// Header line introducing the section, e.g. `## Navigation`.
		#[arg(long, short)]
		title: Option<String>,

		/// File or directory name to leave out of the listing. Repeat the
		/// flag to exclude several names.
		#[arg(long, short = 'x')]
		exclude: Vec<String>,
	},
	/// Write the files changed by recent commits into a document section.
	///
	/// Reads the history with `git log --name-status`, keeps the entries under
	/// the target directory and replaces the body under the section header
	/// with one heading per commit followed by its changed files.
	#[command(alias = "modify_recent")]
	ModifyRecent {
		/// Document holding the section, relative to the root.
		#[arg(long, short)]
		output: Option<PathBuf>,

		/// Number of most recent commits to read.
		#[arg(long, short, alias = "num_commits")]
		num_commits: Option<usize>,

		/// Repository-relative directory whose changes are listed.
		#[arg(long, short)]
		dir: Option<String>,

		/// Header line introducing the section, e.g. `## Recently Modified`.
		#[arg(long, short)]
		title: Option<String>,
	},
	/// Convert `[[wiki links]]` into markdown links in every matching file.
	///
	/// Walks the root, skipping hidden directories and paths ignored by the
	/// root `.gitignore`, and rewrites each file whose extension matches.
	#[command(alias = "convert_wiki_links")]
	ConvertWikiLinks {
		/// Extension of the files to convert, without the dot.
		#[arg(long, short)]
		ext: Option<String>,
	},
}
