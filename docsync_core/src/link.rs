//! Rewriting link targets found in upstream markdown.
//!
//! Resolution runs in tiers and stops at the first hit:
//!
//! 1. literal rules from the manifest, matched verbatim (a `#fragment` or
//!    `?query` after the key is carried over);
//! 2. structural resolution, which resolves a relative link against the file
//!    containing it and maps the target to its published [`Route`];
//! 3. prefix rules pointing at the upstream repository browser.
//!
//! Links that are absolute, fragment-only or carry a URI scheme only ever
//! match literal rules.
//!
//! [`Route`]: crate::route::Route

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::manifest::LiteralRule;
use crate::manifest::PREFIX_RULES;
use crate::manifest::PrefixRule;
use crate::manifest::literal_rules;
use crate::route::route_for_source_file;
use crate::source::ResolvedSources;
use crate::source::normalize_path;

static URI_SCHEME: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"(?i)^[a-z][a-z0-9+.-]*:").expect("valid regex"));

/// A link target split at its first `?` or `#`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkTarget<'a> {
	pub path: &'a str,
	/// The first `?` or `#` and everything after it, or an empty string.
	pub suffix: &'a str,
}

pub fn split_link_target(url: &str) -> LinkTarget<'_> {
	match url.find(['?', '#']) {
		Some(index) => {
			LinkTarget {
				path: &url[..index],
				suffix: &url[index..],
			}
		}
		None => {
			LinkTarget {
				path: url,
				suffix: "",
			}
		}
	}
}

/// Whether a link path is outside the reach of structural and prefix
/// rewriting: empty, site-absolute, fragment-only or scheme-qualified.
pub fn is_absolute_or_special(path: &str) -> bool {
	path.is_empty() || path.starts_with('/') || path.starts_with('#') || URI_SCHEME.is_match(path)
}

/// Which resolution tier produced a rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteKind {
	Literal,
	Structural,
	Prefix,
}

/// A rewritten link target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
	pub url: String,
	pub kind: RewriteKind,
}

/// Decides how link targets are rewritten for one run.
///
/// The resolver is immutable once built and holds no per-file state, so the
/// same instance serves every document.
#[derive(Debug, Clone)]
pub struct LinkResolver {
	sources: ResolvedSources,
	literal_rules: Vec<LiteralRule>,
	prefix_rules: Vec<PrefixRule>,
}

impl LinkResolver {
	/// A resolver using the manifest's rules.
	pub fn new(sources: ResolvedSources) -> Self {
		Self::with_rules(sources, literal_rules(), PREFIX_RULES.to_vec())
	}

	pub fn with_rules(
		sources: ResolvedSources,
		literal_rules: Vec<LiteralRule>,
		prefix_rules: Vec<PrefixRule>,
	) -> Self {
		Self {
			sources,
			literal_rules,
			prefix_rules,
		}
	}

	pub fn sources(&self) -> &ResolvedSources {
		&self.sources
	}

	/// The rewritten target of `url`, or `None` to leave it untouched.
	/// Without a `containing_file` the structural tier is skipped.
	pub fn resolve(&self, url: &str, containing_file: Option<&Path>) -> Option<String> {
		self.rewrite(url, containing_file).map(|rewrite| rewrite.url)
	}

	/// Like [`Self::resolve`], also reporting which tier matched.
	pub fn rewrite(&self, url: &str, containing_file: Option<&Path>) -> Option<Rewrite> {
		if let Some(url) = self.apply_literal(url) {
			return Some(Rewrite {
				url,
				kind: RewriteKind::Literal,
			});
		}

		if let Some(url) = containing_file.and_then(|file| self.resolve_structural(url, file)) {
			return Some(Rewrite {
				url,
				kind: RewriteKind::Structural,
			});
		}

		self.apply_prefix(url).map(|url| {
			Rewrite {
				url,
				kind: RewriteKind::Prefix,
			}
		})
	}

	fn apply_literal(&self, url: &str) -> Option<String> {
		self.literal_rules.iter().find_map(|rule| {
			let rest = url.strip_prefix(rule.from.as_str())?;
			(rest.is_empty() || rest.starts_with(['#', '?'])).then(|| format!("{}{rest}", rule.to))
		})
	}

	/// Resolve `url` against the directory of `containing_file` and map the
	/// target to the route it is published under.
	pub fn resolve_structural(&self, url: &str, containing_file: &Path) -> Option<String> {
		let target = split_link_target(url);
		if is_absolute_or_special(target.path) {
			return None;
		}

		let directory = normalize_path(containing_file.parent()?);
		let target_path = normalize_path(&directory.join(target.path));
		let route = route_for_source_file(&self.sources, &target_path)?;

		Some(format!("{route}{}", target.suffix))
	}

	fn apply_prefix(&self, url: &str) -> Option<String> {
		let target = split_link_target(url);
		if is_absolute_or_special(target.path) {
			return None;
		}

		let path = target.path.strip_prefix("./").unwrap_or(target.path);
		let rule = self
			.prefix_rules
			.iter()
			.find(|rule| path.starts_with(rule.prefix))?;
		let remainder = if rule.strip_prefix {
			&path[rule.prefix.len()..]
		} else {
			path
		};

		Some(format!("{}{remainder}{}", rule.target_prefix, target.suffix))
	}
}

/// Whether a published link still points at a relative path. Targets that are
/// absolute, fragment-only or scheme-qualified count as resolved.
pub fn is_relative_link(url: &str) -> bool {
	!is_absolute_or_special(split_link_target(url).path)
}
