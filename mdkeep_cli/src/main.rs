use std::path::Path;
use std::path::PathBuf;
use std::process;

use clap::CommandFactory;
use clap::Parser;
use mdkeep_cli::Commands;
use mdkeep_cli::MdkeepCli;
use mdkeep_core::AnyResult;
use mdkeep_core::ConversionOutcome;
use mdkeep_core::GitCli;
use mdkeep_core::Project;
use mdkeep_core::SectionOutcome;
use mdkeep_core::SkipReason;
use mdkeep_core::TreeOptions;
use mdkeep_core::WriteMode;
use owo_colors::OwoColorize;
use similar::ChangeTag;
use similar::TextDiff;
use tracing_subscriber::EnvFilter;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,yellow) => {
		if color_enabled() {
			format!("{}", $text.yellow())
		} else {
			format!("{}", $text)
		}
	};
}

/// How a command finished when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunStatus {
	Done,
	/// A configuration problem stopped the command; nothing was written.
	Skipped,
}

fn main() {
	let args = MdkeepCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	// Install miette's fancy handler for rich error diagnostics.
	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	init_tracing(args.verbose, use_color);

	let result = match &args.command {
		Some(Commands::GenerateNav {
			output,
			dir,
			title,
			exclude,
		}) => run_generate_nav(&args, output.as_ref(), dir.as_ref(), title.as_ref(), exclude),
		Some(Commands::ModifyRecent {
			output,
			num_commits,
			dir,
			title,
		}) => {
			run_modify_recent(
				&args,
				output.as_ref(),
				*num_commits,
				dir.as_ref(),
				title.as_ref(),
			)
		}
		Some(Commands::ConvertWikiLinks { ext }) => run_convert_wiki_links(&args, ext.as_ref()),
		None => {
			if let Err(e) = MdkeepCli::command().print_help() {
				eprintln!("{} {e}", colored!("error:", red));
				process::exit(2);
			}
			return;
		}
	};

	match result {
		Ok(RunStatus::Done) => {}
		Ok(RunStatus::Skipped) => process::exit(1),
		Err(e) => {
			// Try to render through miette for rich diagnostics with help text
			// and error codes.
			match e.downcast::<mdkeep_core::MdkeepError>() {
				Ok(mdkeep_err) => {
					let report: miette::Report = (*mdkeep_err).into();
					eprintln!("{report:?}");
				}
				Err(e) => {
					eprintln!("{} {e}", colored!("error:", red));
				}
			}
			process::exit(2);
		}
	}
}

/// Log to stderr. `RUST_LOG` takes precedence over `--verbose`.
fn init_tracing(verbose: bool, use_color: bool) {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
		let level = if verbose { "debug" } else { "info" };
		EnvFilter::new(format!("warn,mdkeep={level}"))
	});

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(use_color)
		.with_target(verbose)
		.without_time()
		.init();
}

fn resolve_root(args: &MdkeepCli) -> PathBuf {
	args.root
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

fn load_project(args: &MdkeepCli) -> AnyResult<Project> {
	let project = Project::load(resolve_root(args))?;
	tracing::debug!("project root: {}", project.root().display());
	Ok(project)
}

fn write_mode(args: &MdkeepCli) -> WriteMode {
	if args.dry_run {
		WriteMode::DryRun
	} else {
		WriteMode::Write
	}
}

fn run_generate_nav(
	args: &MdkeepCli,
	output: Option<&PathBuf>,
	dir: Option<&PathBuf>,
	title: Option<&String>,
	exclude: &[String],
) -> AnyResult<RunStatus> {
	let project = load_project(args)?;
	let mut request = project.nav_request();

	if let Some(output) = output {
		request.output.clone_from(output);
	}
	if let Some(dir) = dir {
		request.target_dir.clone_from(dir);
	}
	if let Some(title) = title {
		request.title.clone_from(title);
	}
	if !exclude.is_empty() {
		request.options = TreeOptions::new(exclude.iter().cloned());
	}

	let outcome = project.generate_nav_links(&request, write_mode(args))?;
	Ok(report_section(
		project.root(),
		&request.title,
		outcome,
		args.dry_run,
	))
}

fn run_modify_recent(
	args: &MdkeepCli,
	output: Option<&PathBuf>,
	num_commits: Option<usize>,
	dir: Option<&String>,
	title: Option<&String>,
) -> AnyResult<RunStatus> {
	let project = load_project(args)?;
	let mut request = project.recent_request();

	if let Some(output) = output {
		request.output.clone_from(output);
	}
	if let Some(num_commits) = num_commits {
		request.commits = num_commits;
	}
	if let Some(dir) = dir {
		request.target_dir.clone_from(dir);
	}
	if let Some(title) = title {
		request.title.clone_from(title);
	}

	let outcome = project.generate_recently_modified(&GitCli::new(), &request, write_mode(args))?;
	Ok(report_section(
		project.root(),
		&request.title,
		outcome,
		args.dry_run,
	))
}

fn run_convert_wiki_links(args: &MdkeepCli, ext: Option<&String>) -> AnyResult<RunStatus> {
	let project = load_project(args)?;
	let extension = ext.map_or(project.config().wiki.extension.as_str(), String::as_str);

	let summary = match project.convert_wiki_links(extension, write_mode(args))? {
		ConversionOutcome::Converted(summary) => summary,
		ConversionOutcome::Skipped(reason) => return Ok(report_skip(&reason)),
	};

	for change in &summary.changes {
		let file = make_relative(&change.path, project.root());
		if args.dry_run {
			println!("{}", colored!(format!("Would convert {file}"), yellow));
			print_diff(&change.original, &change.updated);
		} else {
			println!("{}", colored!(format!("Converted {file}"), green));
		}
	}

	let verb = if args.dry_run {
		"Would convert"
	} else {
		"Converted"
	};
	println!(
		"{verb} {} of {} file(s)",
		summary.converted(),
		summary.scanned
	);

	Ok(RunStatus::Done)
}

fn report_section(root: &Path, title: &str, outcome: SectionOutcome, dry_run: bool) -> RunStatus {
	let title = title.trim();

	match outcome {
		SectionOutcome::Updated(change) => {
			let file = make_relative(&change.path, root);
			if dry_run {
				println!(
					"{}",
					colored!(format!("Would update section `{title}` in {file}"), yellow)
				);
				print_diff(&change.original, &change.updated);
			} else {
				println!(
					"{}",
					colored!(format!("Updated section `{title}` in {file}"), green)
				);
			}
			RunStatus::Done
		}
		SectionOutcome::Unchanged { path } => {
			println!(
				"Section `{title}` in {} is already up to date",
				make_relative(&path, root)
			);
			RunStatus::Done
		}
		SectionOutcome::HeaderNotFound { path } => {
			println!(
				"{}",
				colored!(
					format!(
						"Header `{title}` not found in {}; nothing written",
						make_relative(&path, root)
					),
					yellow
				)
			);
			RunStatus::Done
		}
		SectionOutcome::Skipped(reason) => report_skip(&reason),
	}
}

fn report_skip(reason: &SkipReason) -> RunStatus {
	eprintln!("{} {reason}; nothing written", colored!("skipped:", yellow));
	RunStatus::Skipped
}

fn print_diff(current: &str, expected: &str) {
	let diff = TextDiff::from_lines(current, expected);
	for change in diff.iter_all_changes() {
		match change.tag() {
			ChangeTag::Delete => {
				eprint!("  {}", colored!(format!("-{change}"), red));
			}
			ChangeTag::Insert => {
				eprint!("  {}", colored!(format!("+{change}"), green));
			}
			ChangeTag::Equal => {
				eprint!("   {change}");
			}
		}
	}
}

/// Make a path relative to root for display purposes.
fn make_relative(path: &Path, root: &Path) -> String {
	path.strip_prefix(root)
		.unwrap_or(path)
		.display()
		.to_string()
}
