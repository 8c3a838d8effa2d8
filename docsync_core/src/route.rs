//! Structural mapping from upstream source files to published site routes.
//!
//! A source file's route depends only on which root it lives under and its
//! path relative to that root. Each root carries a small rule table; the first
//! rule that matches decides the route.

use std::path::Path;

use derive_more::Deref;
use derive_more::Display;

use crate::manifest::ManualSection;
use crate::manifest::SITE_SLUG;
use crate::source::ResolvedSources;
use crate::source::SourceRoot;

/// A canonical absolute site path such as `/delivery-process/guides/methodology/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deref, Display)]
pub struct Route(String);

impl Route {
	/// Route of `path` below the site slug. An empty path is the site root.
	pub fn site(path: &str) -> Self {
		let path = path.trim_matches('/');
		if path.is_empty() {
			Self(format!("/{SITE_SLUG}/"))
		} else {
			Self(format!("/{SITE_SLUG}/{path}/"))
		}
	}

	/// Route of `slug` inside `section`. An empty slug is the section index.
	pub fn section(section: &str, slug: &str) -> Self {
		if slug.is_empty() {
			Self::site(section)
		} else {
			Self::site(&format!("{section}/{slug}"))
		}
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	pub fn into_string(self) -> String {
		self.0
	}
}

#[derive(Debug, Clone, Copy)]
enum RouteRule {
	/// One file at a fixed relative path.
	File {
		path: &'static str,
		route: &'static str,
	},
	/// Any markdown file below `dir`, published as `section/<slug>/`.
	Directory {
		dir: &'static str,
		section: &'static str,
	},
	/// Documents registered in the manifest for a manual section.
	Manual(ManualSection),
}

const DOCS_RULES: &[RouteRule] = &[
	RouteRule::File {
		path: "INDEX.md",
		route: "",
	},
	RouteRule::File {
		path: "README.md",
		route: "getting-started",
	},
	RouteRule::Manual(ManualSection::Guides),
	RouteRule::Manual(ManualSection::Reference),
];

const DOCS_LIVE_RULES: &[RouteRule] = &[
	RouteRule::File {
		path: "PRODUCT-AREAS.md",
		route: "product-areas",
	},
	RouteRule::File {
		path: "DECISIONS.md",
		route: "decisions",
	},
	RouteRule::Directory {
		dir: "product-areas",
		section: "product-areas",
	},
	RouteRule::Directory {
		dir: "decisions",
		section: "decisions",
	},
];

const DOCS_GENERATED_RULES: &[RouteRule] = &[
	RouteRule::File {
		path: "BUSINESS-RULES.md",
		route: "generated/business-rules",
	},
	RouteRule::File {
		path: "TAXONOMY.md",
		route: "generated/taxonomy",
	},
	RouteRule::File {
		path: "docs/REFERENCE-SAMPLE.md",
		route: "generated/reference-sample",
	},
	RouteRule::Directory {
		dir: "business-rules",
		section: "generated/business-rules",
	},
	RouteRule::Directory {
		dir: "taxonomy",
		section: "generated/taxonomy",
	},
];

fn route_rules(root: SourceRoot) -> &'static [RouteRule] {
	match root {
		SourceRoot::Docs => DOCS_RULES,
		SourceRoot::DocsLive => DOCS_LIVE_RULES,
		SourceRoot::DocsGenerated => DOCS_GENERATED_RULES,
		// The tutorial is a single file; its parts are not link targets.
		SourceRoot::Tutorial => &[],
	}
}

impl RouteRule {
	fn apply(self, relative: &str) -> Option<Route> {
		match self {
			Self::File { path, route } => (relative == path).then(|| Route::site(route)),
			Self::Directory { dir, section } => {
				let rest = strip_prefix_ignore_case(relative, dir)?.strip_prefix('/')?;
				let file_name = rest.rsplit('/').next()?;
				let stem = strip_markdown_extension(file_name)?;
				if stem.is_empty() {
					return None;
				}
				Some(Route::section(section, &stem.to_lowercase()))
			}
			Self::Manual(section) => section.find(relative).map(|doc| section.route(doc)),
		}
	}
}

/// Path of `path` relative to `root` with `/` separators, or `None` when
/// `path` is outside `root` or is `root` itself.
pub fn source_relative_path(root: &Path, path: &Path) -> Option<String> {
	let relative = path.strip_prefix(root).ok()?;
	let relative = relative.to_string_lossy().replace('\\', "/");
	(!relative.is_empty()).then_some(relative)
}

/// The published route of a source file, if it lies under a resolved root
/// and one of that root's rules covers it.
pub fn route_for_source_file(sources: &ResolvedSources, path: &Path) -> Option<Route> {
	sources.iter().find_map(|(root, root_path)| {
		let relative = source_relative_path(root_path, path)?;
		route_rules(root)
			.iter()
			.find_map(|rule| rule.apply(&relative))
	})
}

fn strip_prefix_ignore_case<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
	let head = value.get(..prefix.len())?;
	head.eq_ignore_ascii_case(prefix)
		.then(|| &value[prefix.len()..])
}

/// File stem of a `.md` file name, matching the extension case-insensitively.
pub(crate) fn strip_markdown_extension(file_name: &str) -> Option<&str> {
	let split = file_name.len().checked_sub(3)?;
	let extension = file_name.get(split..)?;
	extension
		.eq_ignore_ascii_case(".md")
		.then(|| &file_name[..split])
}
