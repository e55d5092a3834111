use std::io::Write;
use std::ops::Range;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::MdkeepError;
use crate::MdkeepResult;

/// Deepest markdown heading level.
const MAX_HEADING_LEVEL: usize = 6;

/// The result of computing a section replacement for a document on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionChange {
	/// The section body differs from the new body.
	Changed { original: String, updated: String },
	/// The section already holds the new body.
	Unchanged,
	/// The header does not occur in the document.
	HeaderNotFound,
	/// The new body contains `heading`, which would end the section early
	/// and make the next run insert the body again.
	HeadingInBody { heading: String },
}

/// The ATX heading level of `line`, e.g. `2` for `## Title`.
pub fn heading_level(line: &str) -> Option<usize> {
	let line = line.trim_end_matches(['\r', '\n']);
	let level = line.bytes().take_while(|b| *b == b'#').count();
	if level == 0 || level > MAX_HEADING_LEVEL {
		return None;
	}

	match line.as_bytes().get(level) {
		None | Some(b' ' | b'\t') => Some(level),
		Some(_) => None,
	}
}

/// Whether `line` is a heading closing the section introduced by `header`,
/// a trimmed header line of level `header_level`.
fn ends_section(line: &str, header: &str, header_level: usize) -> bool {
	line.trim() != header && heading_level(line).is_some_and(|level| level <= header_level)
}

/// The first line of `body` that would end the section introduced by
/// `header` if it were written below it.
pub fn ending_heading<'a>(header: &str, body: &'a str) -> Option<&'a str> {
	let header = header.trim();
	let header_level = heading_level(header).unwrap_or(MAX_HEADING_LEVEL);
	body.lines().find(|line| ends_section(line, header, header_level))
}

#[derive(Clone, Copy)]
enum ScanState {
	Scanning,
	InSection { start: usize },
	Done { start: usize, end: usize },
}

/// Locate the body of the section introduced by `header`.
///
/// The body starts after the first line equal to `header` (ignoring
/// surrounding whitespace) and ends before the next heading of the same or a
/// higher level, or at the end of the document. Returns the byte range of
/// the body.
pub fn find_section(content: &str, header: &str) -> Option<Range<usize>> {
	let header = header.trim();
	let header_level = heading_level(header).unwrap_or(MAX_HEADING_LEVEL);
	let mut state = ScanState::Scanning;
	let mut offset = 0;

	for line in content.split_inclusive('\n') {
		let line_start = offset;
		offset += line.len();

		match state {
			ScanState::Scanning => {
				if line.trim() == header {
					state = ScanState::InSection { start: offset };
				}
			}
			ScanState::InSection { start } => {
				if ends_section(line, header, header_level) {
					state = ScanState::Done {
						start,
						end: line_start,
					};
					break;
				}
			}
			ScanState::Done { .. } => break,
		}
	}

	match state {
		ScanState::Scanning => None,
		ScanState::InSection { start } => Some(start..content.len()),
		ScanState::Done { start, end } => Some(start..end),
	}
}

/// Replace the body of the section introduced by `header` with `body`.
///
/// The new body is written as a single block terminated by a newline. When
/// the header is missing, `None` is returned and nothing is inserted.
pub fn replace_section(content: &str, header: &str, body: &str) -> Option<String> {
	let range = find_section(content, header)?;
	let before = &content[..range.start];
	let after = &content[range.end..];

	let mut result = String::with_capacity(before.len() + body.len() + after.len() + 2);
	result.push_str(before);
	// The header may be the last line of a document without a trailing newline.
	if !before.ends_with('\n') {
		result.push('\n');
	}
	result.push_str(body);
	result.push('\n');
	result.push_str(after);

	Some(result)
}

/// Read the document at `path` and compute the replacement of the section
/// introduced by `header`. Nothing is written.
///
/// A body holding a heading of the header's level or higher is refused, as
/// the section would end at that heading and never match the body again.
pub fn plan_section(path: &Path, header: &str, body: &str) -> MdkeepResult<SectionChange> {
	if !path.is_file() {
		return Err(MdkeepError::DocumentNotFound {
			path: path.display().to_string(),
		});
	}

	let original = std::fs::read_to_string(path)?;
	if find_section(&original, header).is_none() {
		return Ok(SectionChange::HeaderNotFound);
	}

	if let Some(heading) = ending_heading(header, body) {
		return Ok(SectionChange::HeadingInBody {
			heading: heading.trim().to_string(),
		});
	}

	let Some(updated) = replace_section(&original, header, body) else {
		return Ok(SectionChange::HeaderNotFound);
	};

	if updated == original {
		return Ok(SectionChange::Unchanged);
	}

	Ok(SectionChange::Changed { original, updated })
}

/// Write `content` to a temporary file next to `path`, then rename it over
/// `path`. The temporary file is removed on every error path.
pub fn write_atomic(path: &Path, content: &str) -> MdkeepResult<()> {
	let dir = match path.parent() {
		Some(parent) if !parent.as_os_str().is_empty() => parent,
		_ => Path::new("."),
	};

	let mut temp = NamedTempFile::new_in(dir)?;
	temp.write_all(content.as_bytes())?;
	temp.as_file().sync_all()?;

	if let Ok(metadata) = std::fs::metadata(path) {
		std::fs::set_permissions(temp.path(), metadata.permissions())?;
	}

	temp.persist(path).map_err(|e| {
		MdkeepError::Persist {
			path: path.display().to_string(),
			reason: e.error.to_string(),
		}
	})?;

	Ok(())
}
