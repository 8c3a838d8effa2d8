//! The static registry of everything the pipeline publishes.
//!
//! Hand-authored documents, the published site sections and the link rewrite
//! rules all live here. Literal link rewrites for manual documents are derived
//! from [`GUIDES`] and [`REFERENCE`] by [`literal_rules`], so a document only
//! has to be registered once.

use crate::route::Route;

/// Slug under which every synced page is published.
pub const SITE_SLUG: &str = "delivery-process";

const REPOSITORY_BLOB_URL: &str = "https://github.com/libar-dev/delivery-process/blob/main/";
const REPOSITORY_TREE_URL: &str = "https://github.com/libar-dev/delivery-process/tree/main/";

/// A hand-authored document from the upstream `docs` directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManualDoc {
	/// File name inside the docs root, e.g. `METHODOLOGY.md`.
	pub source: &'static str,
	/// Published file stem and URL segment.
	pub slug: &'static str,
	/// Position in the section sidebar.
	pub order: u32,
}

/// The sections manual documents are grouped into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManualSection {
	Guides,
	Reference,
}

impl ManualSection {
	pub const ALL: [ManualSection; 2] = [ManualSection::Guides, ManualSection::Reference];

	/// Output directory and URL segment of the section.
	pub fn directory(self) -> &'static str {
		match self {
			Self::Guides => "guides",
			Self::Reference => "reference",
		}
	}

	/// Documents registered under this section, in sidebar order.
	pub fn docs(self) -> &'static [ManualDoc] {
		match self {
			Self::Guides => GUIDES,
			Self::Reference => REFERENCE,
		}
	}

	/// Find the document registered for `source` in this section.
	pub fn find(self, source: &str) -> Option<&'static ManualDoc> {
		self.docs().iter().find(|doc| doc.source == source)
	}

	/// Published route of a document in this section.
	pub fn route(self, doc: &ManualDoc) -> Route {
		Route::section(self.directory(), doc.slug)
	}
}

pub const GUIDES: &[ManualDoc] = &[
	ManualDoc {
		source: "METHODOLOGY.md",
		slug: "methodology",
		order: 1,
	},
	ManualDoc {
		source: "CONFIGURATION.md",
		slug: "configuration",
		order: 2,
	},
	ManualDoc {
		source: "SESSION-GUIDES.md",
		slug: "session-guides",
		order: 3,
	},
	ManualDoc {
		source: "GHERKIN-PATTERNS.md",
		slug: "gherkin-patterns",
		order: 4,
	},
	ManualDoc {
		source: "ANNOTATION-GUIDE.md",
		slug: "annotation-guide",
		order: 5,
	},
	ManualDoc {
		source: "PUBLISHING.md",
		slug: "publishing",
		order: 6,
	},
];

pub const REFERENCE: &[ManualDoc] = &[
	ManualDoc {
		source: "ARCHITECTURE.md",
		slug: "architecture",
		order: 1,
	},
	ManualDoc {
		source: "PROCESS-API.md",
		slug: "process-api",
		order: 2,
	},
	ManualDoc {
		source: "PROCESS-GUARD.md",
		slug: "process-guard",
		order: 3,
	},
	ManualDoc {
		source: "VALIDATION.md",
		slug: "validation",
		order: 4,
	},
	ManualDoc {
		source: "TAXONOMY.md",
		slug: "taxonomy",
		order: 5,
	},
];

/// Output subdirectories owned by the pipeline, one per published section.
/// Their contents are cleared before every run; anything else under the
/// target is hand-maintained.
pub const SECTIONS: [&str; 6] = [
	"tutorial",
	"guides",
	"reference",
	"product-areas",
	"decisions",
	"generated",
];

pub fn sync_subdirs() -> impl Iterator<Item = &'static str> {
	SECTIONS.into_iter()
}

/// Where a literal rewrite points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkDestination {
	/// A path on the published site, relative to [`SITE_SLUG`].
	Site(&'static str),
	/// A file in the upstream repository browser.
	Blob(&'static str),
	/// A directory in the upstream repository browser.
	Tree(&'static str),
}

impl LinkDestination {
	pub fn url(self) -> String {
		match self {
			Self::Site(path) => Route::site(path).into_string(),
			Self::Blob(path) => format!("{REPOSITORY_BLOB_URL}{path}"),
			Self::Tree(path) => format!("{REPOSITORY_TREE_URL}{path}"),
		}
	}
}

/// Rewrites that are not backed by a manual document.
const EXTRA_LINK_REWRITES: &[(&str, LinkDestination)] = &[
	("./INDEX.md", LinkDestination::Site("")),
	("../README.md", LinkDestination::Site("getting-started")),
	("../CHANGELOG.md", LinkDestination::Blob("CHANGELOG.md")),
	("../SECURITY.md", LinkDestination::Blob("SECURITY.md")),
	("../CLAUDE.md", LinkDestination::Blob("CLAUDE.md")),
	("../src/taxonomy/", LinkDestination::Tree("src/taxonomy/")),
	(
		"../tests/features/validation/fsm-validator.feature",
		LinkDestination::Blob("tests/features/validation/fsm-validator.feature"),
	),
	(
		"../tests/features/behavior/session-handoffs.feature",
		LinkDestination::Blob("tests/features/behavior/session-handoffs.feature"),
	),
];

/// An exact link target and its replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralRule {
	pub from: String,
	pub to: String,
}

/// Derive the ordered literal rewrite table: every manual document as
/// `./<source>`, followed by the fixed extra rewrites.
pub fn literal_rules() -> Vec<LiteralRule> {
	let manual = ManualSection::ALL.into_iter().flat_map(|section| {
		section.docs().iter().map(move |doc| {
			LiteralRule {
				from: format!("./{}", doc.source),
				to: section.route(doc).into_string(),
			}
		})
	});
	let extra = EXTRA_LINK_REWRITES.iter().map(|(from, to)| {
		LiteralRule {
			from: (*from).to_string(),
			to: to.url(),
		}
	});

	manual.chain(extra).collect()
}

/// Rewrites any relative link whose path starts with `prefix`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefixRule {
	pub prefix: &'static str,
	pub target_prefix: &'static str,
	/// Drop `prefix` before joining, so `delivery-process/specs/x` becomes
	/// `<target>specs/x`.
	pub strip_prefix: bool,
}

pub const PREFIX_RULES: &[PrefixRule] = &[
	PrefixRule {
		prefix: "delivery-process/",
		target_prefix: REPOSITORY_BLOB_URL,
		strip_prefix: true,
	},
	PrefixRule {
		prefix: "src/",
		target_prefix: REPOSITORY_BLOB_URL,
		strip_prefix: false,
	},
	PrefixRule {
		prefix: "tests/",
		target_prefix: REPOSITORY_BLOB_URL,
		strip_prefix: false,
	},
	PrefixRule {
		prefix: "specs/",
		target_prefix: REPOSITORY_BLOB_URL,
		strip_prefix: false,
	},
	PrefixRule {
		prefix: "decisions/",
		target_prefix: REPOSITORY_BLOB_URL,
		strip_prefix: false,
	},
];
