use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Captures;
use regex::Regex;

/// Matches `![[target]]` (group 1) or `[[target]]` (group 2). The lazy body
/// keeps adjacent tokens apart and `.` never crosses a line break.
static WIKI_LINK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"!\[\[(.+?)\]\]|\[\[(.+?)\]\]").expect("invalid wiki link regex")
});

/// A single `[[target|alias]]` token, optionally prefixed with `!` for
/// embedded images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WikiLink<'a> {
	pub is_image: bool,
	pub target: &'a str,
	pub alias: Option<&'a str>,
}

impl<'a> WikiLink<'a> {
	/// Split the text between the brackets on the first `|`. An empty alias
	/// counts as no alias.
	pub fn parse(inner: &'a str, is_image: bool) -> Self {
		let (target, alias) = match inner.split_once('|') {
			Some((target, alias)) => (target, Some(alias.trim()).filter(|a| !a.is_empty())),
			None => (inner, None),
		};

		Self {
			is_image,
			target: target.trim(),
			alias,
		}
	}

	/// The link destination with spaces percent-encoded.
	pub fn url(&self) -> String {
		encode_spaces(self.target)
	}

	/// The visible text: the alias when present, otherwise the target.
	pub fn text(&self) -> String {
		match self.alias {
			Some(alias) => alias.to_string(),
			None => self.url().replace("%20", " "),
		}
	}

	/// Render as a standard markdown link, or image when `is_image` is set.
	pub fn to_markdown(&self) -> String {
		let prefix = if self.is_image { "!" } else { "" };
		format!("{prefix}[{}]({})", self.text(), self.url())
	}
}

/// Replace every wiki link in `content` with standard markdown link syntax.
/// Text outside of the tokens is returned untouched, and unterminated `[[`
/// sequences pass through as-is.
pub fn convert_wiki_links(content: &str) -> Cow<'_, str> {
	WIKI_LINK_REGEX.replace_all(content, |caps: &Captures<'_>| {
		let link = match (caps.get(1), caps.get(2)) {
			(Some(image), _) => WikiLink::parse(image.as_str(), true),
			(None, Some(link)) => WikiLink::parse(link.as_str(), false),
			(None, None) => return caps[0].to_string(),
		};
		link.to_markdown()
	})
}

/// Collect the wiki links found in `content` in document order.
pub fn find_wiki_links(content: &str) -> Vec<WikiLink<'_>> {
	WIKI_LINK_REGEX
		.captures_iter(content)
		.filter_map(|caps| {
			match (caps.get(1), caps.get(2)) {
				(Some(image), _) => Some(WikiLink::parse(image.as_str(), true)),
				(None, Some(link)) => Some(WikiLink::parse(link.as_str(), false)),
				(None, None) => None,
			}
		})
		.collect()
}

/// Percent-encode spaces so a path can be used as a markdown link target.
pub fn encode_spaces(path: &str) -> String {
	path.replace(' ', "%20")
}
