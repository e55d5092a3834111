//! `mdkeep_core` is the core library for [mdkeep](https://docs.rs/mdkeep_cli). It keeps the generated parts of a project's markdown documents current: a navigation list of every file under a docs directory, a change log of the files touched by recent commits, and the conversion of wiki-style `[[links]]` into portable markdown links.
//!
//! ## Processing Pipeline
//!
//! ```text
//! docs/ directory ─→ tree (walk + sort) ─────────────┐
//!                                                    ├─→ section (replace body under a header)
//! git log ─→ history (parse) ─→ changelog (render) ──┘
//!
//! *.md files ─→ wiki_links (rewrite [[target|alias]])
//! ```
//!
//! ## Modules
//!
//! - [`config`]: Configuration loading from `mdkeep.toml`.
//! - [`tree`]: Directory walking and nested navigation list rendering.
//! - [`history`]: Commit log parsing and the [`HistorySource`] seam over `git`.
//! - [`changelog`]: Rendering parsed commits as an emoji-annotated change list.
//! - [`section`]: Locating and replacing a header-delimited section, with atomic writes.
//! - [`wiki_links`]: Wiki link to markdown link conversion.
//! - [`project`]: The [`Project`] coordinator tying the pieces to a root directory.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mdkeep_core::GitCli;
//! use mdkeep_core::Project;
//! use mdkeep_core::WriteMode;
//!
//! let project = Project::load(".").unwrap();
//!
//! let nav = project.nav_request();
//! project.generate_nav_links(&nav, WriteMode::Write).unwrap();
//!
//! let recent = project.recent_request();
//! project
//! 	.generate_recently_modified(&GitCli::new(), &recent, WriteMode::Write)
//! 	.unwrap();
//! ```

pub use changelog::*;
pub use config::*;
pub use error::*;
pub use history::*;
pub use project::*;
pub use section::*;
pub use tree::*;
pub use wiki_links::*;

pub mod changelog;
pub mod config;
#[allow(unused_assignments)]
mod error;
pub mod history;
pub mod project;
pub mod section;
pub mod tree;
pub mod wiki_links;
