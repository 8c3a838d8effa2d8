use std::fmt;
use std::ops::Range;
use std::path::Path;

use markdown::ParseOptions;
use markdown::mdast::Node;
use markdown::to_mdast;
use tracing::trace;

use crate::SyncError;
use crate::SyncResult;
use crate::link::LinkResolver;
use crate::link::is_relative_link;

/// Title used when a document has no top-level heading.
pub const UNTITLED: &str = "Untitled";

/// Per-document inputs to [`transform_document`].
#[derive(Debug, Clone, Default)]
pub struct TransformOptions<'a> {
	/// Absolute path of the source file, used to resolve relative links.
	pub containing_file: Option<&'a Path>,
	pub description: Option<String>,
	pub sidebar_order: Option<u32>,
	pub sidebar_label: Option<String>,
	/// Emit `editUrl: false` so the site hides its "edit this page" link.
	pub suppress_edit_link: bool,
}

/// The metadata header written above every published document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontMatter {
	pub title: String,
	pub description: Option<String>,
	pub sidebar_label: Option<String>,
	pub sidebar_order: Option<u32>,
	pub suppress_edit_link: bool,
}

impl fmt::Display for FrontMatter {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		writeln!(f, "---")?;
		writeln!(f, "title: {}", quote(&self.title))?;
		if let Some(description) = &self.description {
			writeln!(f, "description: {}", quote(description))?;
		}
		if self.sidebar_label.is_some() || self.sidebar_order.is_some() {
			writeln!(f, "sidebar:")?;
			if let Some(label) = &self.sidebar_label {
				writeln!(f, "  label: {}", quote(label))?;
			}
			if let Some(order) = self.sidebar_order {
				writeln!(f, "  order: {order}")?;
			}
		}
		if self.suppress_edit_link {
			writeln!(f, "editUrl: false")?;
		}
		writeln!(f, "---")
	}
}

/// YAML double-quoted scalar.
fn quote(value: &str) -> String {
	format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

/// A document ready to be written: front matter followed by the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformedDocument {
	pub front_matter: FrontMatter,
	/// The rewritten body without its title heading.
	pub body: String,
}

impl TransformedDocument {
	pub fn title(&self) -> &str {
		&self.front_matter.title
	}

	/// Final file contents. Non-empty bodies end with exactly one newline.
	pub fn render(&self) -> String {
		let body = self.body.trim_end_matches(['\n', '\r']);
		if body.is_empty() {
			self.front_matter.to_string()
		} else {
			format!("{}{body}\n", self.front_matter)
		}
	}
}

/// Extract the title, drop the title heading, rewrite links and attach front
/// matter. The result depends only on the inputs, so repeated runs produce
/// identical output.
pub fn transform_document(
	content: &str,
	options: &TransformOptions<'_>,
	resolver: &LinkResolver,
) -> SyncResult<TransformedDocument> {
	let tree = parse_markdown(content)?;
	let heading = find_title_heading(content, &tree);
	let title = heading
		.as_ref()
		.map_or(UNTITLED, |heading| heading.title)
		.to_string();
	let stripped = match heading {
		Some(heading) => remove_range(content, heading.removal),
		None => content.to_string(),
	};
	let body = rewrite_links(&stripped, options.containing_file, resolver)?;

	Ok(TransformedDocument {
		front_matter: FrontMatter {
			title,
			description: options.description.clone(),
			sidebar_label: options.sidebar_label.clone(),
			sidebar_order: options.sidebar_order,
			suppress_edit_link: options.suppress_edit_link,
		},
		body,
	})
}

pub(crate) fn parse_markdown(content: &str) -> SyncResult<Node> {
	to_mdast(content, &ParseOptions::gfm()).map_err(|e| SyncError::Markdown(e.to_string()))
}

/// The text of the first top-level `# ` heading, or [`UNTITLED`].
pub fn extract_title(content: &str) -> SyncResult<String> {
	let tree = parse_markdown(content)?;
	Ok(find_title_heading(content, &tree)
		.map_or(UNTITLED, |heading| heading.title)
		.to_string())
}

/// Remove the first top-level `# ` heading and the blank lines after it.
/// Later top-level headings are left in place.
pub fn strip_title_heading(content: &str) -> SyncResult<String> {
	let tree = parse_markdown(content)?;
	Ok(match find_title_heading(content, &tree) {
		Some(heading) => remove_range(content, heading.removal),
		None => content.to_string(),
	})
}

#[derive(Debug, Clone)]
struct TitleHeading<'a> {
	title: &'a str,
	/// The heading line plus any blank lines that follow it.
	removal: Range<usize>,
}

/// Find the first ATX level-one heading among the document's top-level
/// blocks. Headings in code blocks, quotes and lists are not candidates.
fn find_title_heading<'a>(content: &'a str, tree: &Node) -> Option<TitleHeading<'a>> {
	tree.children()?.iter().find_map(|node| {
		let Node::Heading(heading) = node else {
			return None;
		};
		if heading.depth != 1 {
			return None;
		}

		let position = heading.position.as_ref()?;
		let line_start = content[..position.start.offset]
			.rfind('\n')
			.map_or(0, |index| index + 1);
		let line_end = content[position.start.offset..]
			.find('\n')
			.map_or(content.len(), |index| position.start.offset + index);
		let line = content[line_start..line_end].trim();
		let title = line.strip_prefix('#')?;
		if !title.starts_with([' ', '\t']) || title.trim().is_empty() {
			return None;
		}

		let mut removal_end = line_end;
		while let Some(rest) = content.get(removal_end..) {
			if rest.starts_with('\n') {
				removal_end += 1;
			} else if rest.starts_with("\r\n") {
				removal_end += 2;
			} else {
				break;
			}
		}

		Some(TitleHeading {
			title: title.trim(),
			removal: line_start..removal_end,
		})
	})
}

fn remove_range(content: &str, range: Range<usize>) -> String {
	let mut result = String::with_capacity(content.len() - range.len());
	result.push_str(&content[..range.start]);
	result.push_str(&content[range.end..]);
	result
}

/// Pass every link, image and definition destination through `resolver`. Rewritten
/// destinations are replaced in place; every other byte is preserved.
pub fn rewrite_links(
	content: &str,
	containing_file: Option<&Path>,
	resolver: &LinkResolver,
) -> SyncResult<String> {
	let tree = parse_markdown(content)?;
	let mut destinations = Vec::new();
	collect_destinations(&tree, &mut destinations);

	let mut edits: Vec<(Range<usize>, String)> = Vec::new();
	for Destination { url, span, syntax } in destinations {
		let Some(rewrite) = resolver.rewrite(&url, containing_file) else {
			if is_relative_link(&url) {
				trace!(%url, "relative link left unchanged");
			}
			continue;
		};
		let Some(range) = locate_destination(content, span, syntax) else {
			trace!(%url, "link destination not found in source, skipping");
			continue;
		};

		trace!(from = %url, to = %rewrite.url, kind = ?rewrite.kind, "rewrote link");
		edits.push((range, format_destination(&rewrite.url)));
	}

	// Apply from the end so earlier offsets stay valid.
	edits.sort_by(|a, b| b.0.start.cmp(&a.0.start));
	let mut result = content.to_string();
	for (range, replacement) in edits {
		result.replace_range(range, &replacement);
	}

	Ok(result)
}

/// Where a destination sits in its node's source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DestinationSyntax {
	/// `[text](url)` or `![alt](url)`.
	Inline,
	/// `[label]: url`.
	Definition,
}

struct Destination {
	url: String,
	span: Range<usize>,
	syntax: DestinationSyntax,
}

fn collect_destinations(node: &Node, destinations: &mut Vec<Destination>) {
	let found = match node {
		Node::Link(link) => Some((&link.url, &link.position, DestinationSyntax::Inline)),
		Node::Image(image) => Some((&image.url, &image.position, DestinationSyntax::Inline)),
		Node::Definition(definition) => {
			Some((
				&definition.url,
				&definition.position,
				DestinationSyntax::Definition,
			))
		}
		_ => None,
	};
	if let Some((url, Some(position), syntax)) = found {
		destinations.push(Destination {
			url: url.clone(),
			span: position.start.offset..position.end.offset,
			syntax,
		});
	}

	if let Some(children) = node.children() {
		for child in children {
			collect_destinations(child, destinations);
		}
	}
}

/// Byte range of the destination inside the node spanning `span`. Autolinks
/// and bare URLs have no written destination and yield `None`.
fn locate_destination(
	content: &str,
	span: Range<usize>,
	syntax: DestinationSyntax,
) -> Option<Range<usize>> {
	let source = content.get(span.clone())?;
	let marker = match syntax {
		DestinationSyntax::Inline => {
			let close = link_text_end(source)?;
			if !source.ends_with(')') || !source[close..].starts_with("](") {
				return None;
			}
			close
		}
		DestinationSyntax::Definition => source.find("]:")?,
	};

	let after = &source[marker + 2..];
	let leading = after.len() - after.trim_start().len();
	let start = marker + 2 + leading;
	let length = destination_length(&source[start..], syntax)?;

	Some(span.start + start..span.start + start + length)
}

/// Offset of the `]` that closes the link text opened by the first `[`.
/// Nested brackets, escapes and code spans inside the text are skipped.
fn link_text_end(source: &str) -> Option<usize> {
	let bytes = source.as_bytes();
	let mut index = source.find('[')?;
	let mut depth = 0usize;

	while index < bytes.len() {
		match bytes[index] {
			b'\\' => index += 1,
			b'`' => {
				let run = bytes[index..].iter().take_while(|byte| **byte == b'`').count();
				let fence = &source[index..index + run];
				index += run;
				if let Some(close) = source[index..].find(fence) {
					index += close + run;
				}
				continue;
			}
			b'[' => depth += 1,
			b']' => {
				depth = depth.saturating_sub(1);
				if depth == 0 {
					return Some(index);
				}
			}
			_ => {}
		}
		index += 1;
	}

	None
}

fn destination_length(rest: &str, syntax: DestinationSyntax) -> Option<usize> {
	if let Some(inner) = rest.strip_prefix('<') {
		return Some(inner.find('>')? + 2);
	}

	let mut depth = 0usize;
	for (index, ch) in rest.char_indices() {
		match ch {
			'(' => depth += 1,
			')' if depth == 0 && syntax == DestinationSyntax::Inline => return Some(index),
			')' => depth = depth.saturating_sub(1),
			ch if ch.is_whitespace() => return Some(index),
			_ => {}
		}
	}

	Some(rest.len())
}

/// Wrap destinations that would not survive as a bare inline destination.
fn format_destination(url: &str) -> String {
	if url.contains(|ch: char| ch.is_whitespace() || ch == '(' || ch == ')') {
		format!("<{url}>")
	} else {
		url.to_string()
	}
}
