//! Splitting the tutorial article into one page per part.
//!
//! Parts are introduced by second-level headings of the form
//! `## Part <N>: <Title>`. [`parse_part_heading`] is the only place that knows
//! this format.

use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

use markdown::mdast::Node;
use regex::Regex;
use tracing::warn;

use crate::SyncError;
use crate::SyncResult;
use crate::link::LinkResolver;
use crate::transform::TransformOptions;
use crate::transform::TransformedDocument;
use crate::transform::parse_markdown;
use crate::transform::transform_document;

static PART_HEADING: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^## Part (\d+):\s*(.+)$").expect("valid regex"));
/// `## Part` followed by a colon, a numeral or a spelled-out number.
static PART_LIKE_HEADING: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(
		r"(?i)^##\s+part\s*(?::|#?\s*(?:\d+|one|two|three|four|five|six|seven|eight|nine|ten|eleven|twelve)\b)",
	)
	.expect("valid regex")
});
static NON_ALPHANUMERIC: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("valid regex"));

/// How a single line relates to the part heading format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartHeading<'a> {
	Part { number: u32, title: &'a str },
	/// Looks like a part heading but does not follow `## Part <N>: <Title>`.
	Malformed,
	NotAPart,
}

/// Classify one line of the tutorial.
pub fn parse_part_heading(line: &str) -> PartHeading<'_> {
	if let Some(captures) = PART_HEADING.captures(line) {
		let number = captures[1].parse::<u32>().ok();
		let title = captures.get(2).map_or("", |m| m.as_str()).trim();
		return match number {
			Some(number) if !title.is_empty() => PartHeading::Part { number, title },
			_ => PartHeading::Malformed,
		};
	}

	if PART_LIKE_HEADING.is_match(line) {
		PartHeading::Malformed
	} else {
		PartHeading::NotAPart
	}
}

/// A part marker found in the tutorial, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TutorialPart {
	pub number: u32,
	pub title: String,
	/// Byte offset of the heading line.
	pub start: usize,
}

/// A heading that resembles a part marker but could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedHeading {
	/// 1-indexed line number.
	pub line: usize,
	pub text: String,
}

/// Every part marker and near-miss in a tutorial.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartScan {
	pub parts: Vec<TutorialPart>,
	pub malformed: Vec<MalformedHeading>,
}

/// Collect part headings among the top-level `##` headings of `content`.
/// Headings inside code blocks, quotes and lists are never candidates.
pub fn scan_parts(content: &str) -> SyncResult<PartScan> {
	let tree = parse_markdown(content)?;
	let mut scan = PartScan::default();

	for node in tree.children().into_iter().flatten() {
		let Node::Heading(heading) = node else {
			continue;
		};
		if heading.depth != 2 {
			continue;
		}
		let Some(position) = heading.position.as_ref() else {
			continue;
		};

		let offset = position.start.offset;
		let start = content[..offset].rfind('\n').map_or(0, |index| index + 1);
		let end = content[offset..]
			.find('\n')
			.map_or(content.len(), |index| offset + index);
		let line = content[start..end].trim();

		match parse_part_heading(line) {
			PartHeading::Part { number, title } => {
				scan.parts.push(TutorialPart {
					number,
					title: title.to_string(),
					start,
				});
			}
			PartHeading::Malformed => {
				scan.malformed.push(MalformedHeading {
					line: position.start.line,
					text: line.to_string(),
				});
			}
			PartHeading::NotAPart => {}
		}
	}

	Ok(scan)
}

/// A structural problem with the tutorial's part sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TutorialViolation {
	NoParts,
	MalformedHeading { line: usize, heading: String },
	NonSequential { expected: u32, found: u32 },
	CountMismatch { expected: usize, found: usize },
}

impl fmt::Display for TutorialViolation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::NoParts => write!(f, "no \"## Part N:\" headings found"),
			Self::MalformedHeading { line, heading } => {
				write!(f, "malformed part heading on line {line}: \"{heading}\"")
			}
			Self::NonSequential { expected, found } => {
				write!(
					f,
					"part numbering is non-sequential (expected Part {expected}, found Part \
					 {found})"
				)
			}
			Self::CountMismatch { expected, found } => {
				write!(f, "expected {expected} parts, found {found}")
			}
		}
	}
}

/// Check the scanned parts. All violations are collected; only the first
/// numbering gap is reported. With no parts at all, the count check is
/// skipped.
pub fn validate_parts(scan: &PartScan, expected_parts: Option<usize>) -> Vec<TutorialViolation> {
	let mut violations: Vec<TutorialViolation> = scan
		.malformed
		.iter()
		.map(|heading| {
			TutorialViolation::MalformedHeading {
				line: heading.line,
				heading: heading.text.clone(),
			}
		})
		.collect();

	if scan.parts.is_empty() {
		violations.push(TutorialViolation::NoParts);
		return violations;
	}

	let gap = scan
		.parts
		.iter()
		.zip(1u32..)
		.find(|(part, expected)| part.number != *expected);
	if let Some((part, expected)) = gap {
		violations.push(TutorialViolation::NonSequential {
			expected,
			found: part.number,
		});
	}

	if let Some(expected) = expected_parts {
		if scan.parts.len() != expected {
			violations.push(TutorialViolation::CountMismatch {
				expected,
				found: scan.parts.len(),
			});
		}
	}

	violations
}

/// Controls how strictly [`split_tutorial`] treats structural problems.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SplitOptions {
	/// Number of parts the tutorial must have. `None` skips the count check.
	pub expected_parts: Option<usize>,
	/// Fail on any violation instead of warning and splitting anyway.
	pub strict: bool,
}

/// One output page of the split tutorial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TutorialPage {
	pub file_name: String,
	pub document: TransformedDocument,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitTutorial {
	/// The content before the first part, or the whole article when no parts
	/// were found.
	pub introduction: Option<TutorialPage>,
	pub parts: Vec<TutorialPage>,
	/// Violations tolerated in lenient mode.
	pub violations: Vec<TutorialViolation>,
}

impl SplitTutorial {
	/// All pages in sidebar order.
	pub fn pages(&self) -> impl Iterator<Item = &TutorialPage> {
		self.introduction.iter().chain(self.parts.iter())
	}
}

/// Split the tutorial into an introduction and one page per part.
///
/// In strict mode any violation is returned as
/// [`SyncError::TutorialStructure`]. Otherwise violations are logged and the
/// parts that were found are still emitted; with no parts at all the whole
/// article becomes a single page.
pub fn split_tutorial(
	content: &str,
	source: Option<&Path>,
	options: SplitOptions,
	resolver: &LinkResolver,
) -> SyncResult<SplitTutorial> {
	let scan = scan_parts(content)?;
	let violations = validate_parts(&scan, options.expected_parts);

	if !violations.is_empty() {
		if options.strict {
			return Err(SyncError::TutorialStructure(violations));
		}
		warn!(
			"Tutorial structure validation failed: {}",
			crate::error::join_violations(&violations)
		);
	}

	let parts = scan.parts;
	let Some(first) = parts.first() else {
		warn!("Tutorial fallback: copying tutorial as a single page");
		let document = transform_document(
			content,
			&TransformOptions {
				containing_file: source,
				sidebar_order: Some(0),
				..TransformOptions::default()
			},
			resolver,
		)?;
		return Ok(SplitTutorial {
			introduction: Some(TutorialPage {
				file_name: "index.md".to_string(),
				document,
			}),
			parts: Vec::new(),
			violations,
		});
	};

	let intro = content[..first.start].trim();
	let introduction = if intro.is_empty() {
		None
	} else {
		let document = transform_document(
			intro,
			&TransformOptions {
				containing_file: source,
				sidebar_order: Some(0),
				sidebar_label: Some("Introduction".to_string()),
				..TransformOptions::default()
			},
			resolver,
		)?;
		Some(TutorialPage {
			file_name: "index.md".to_string(),
			document,
		})
	};

	let mut pages = Vec::with_capacity(parts.len());
	for (index, part) in parts.iter().enumerate() {
		let end = parts.get(index + 1).map_or(content.len(), |next| next.start);
		let section = promote_part_heading(content[part.start..end].trim(), &part.title);
		let document = transform_document(
			&section,
			&TransformOptions {
				containing_file: source,
				sidebar_order: Some(part.number),
				sidebar_label: Some(format!("Part {}: {}", part.number, part.title)),
				..TransformOptions::default()
			},
			resolver,
		)?;
		pages.push(TutorialPage {
			file_name: part_file_name(part.number, &part.title),
			document,
		});
	}

	Ok(SplitTutorial {
		introduction,
		parts: pages,
		violations,
	})
}

/// Replace the `## Part N: Title` line with a `# Title` heading so the part
/// title becomes the page title.
fn promote_part_heading(section: &str, title: &str) -> String {
	let rest = section.find('\n').map_or("", |index| &section[index..]);
	format!("# {title}{rest}")
}

/// Lower-case `title` and collapse every run of other characters into one
/// hyphen, dropping trailing hyphens.
pub fn slugify(title: &str) -> String {
	let lower = title.to_lowercase();
	NON_ALPHANUMERIC
		.replace_all(&lower, "-")
		.trim_end_matches('-')
		.to_string()
}

/// `01-project-setup.md` for part 1 titled "Project Setup".
pub fn part_file_name(number: u32, title: &str) -> String {
	let slug = slugify(title);
	if slug.is_empty() {
		format!("{number:02}.md")
	} else {
		format!("{number:02}-{slug}.md")
	}
}
