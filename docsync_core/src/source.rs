//! Locating the upstream inputs.
//!
//! Each [`SourceRoot`] has an ordered list of candidate locations. The first
//! candidate that exists wins, unless an explicit override is configured, in
//! which case the override is the only candidate considered.

use std::collections::BTreeMap;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use tracing::debug;
use tracing::warn;

use crate::manifest::ManualSection;

/// A named upstream input: a directory of markdown or a single file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SourceRoot {
	/// Hand-authored guides and reference documents.
	Docs,
	/// Product area and decision documents generated from the live codebase.
	DocsLive,
	/// Business rules, taxonomy and the reference sample.
	DocsGenerated,
	/// The long-form tutorial article.
	Tutorial,
}

/// Where to look for a source root, relative to the project root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceCandidates {
	/// Upstream checked out as a sibling of this project.
	pub local: &'static str,
	/// Upstream checked out inside this project, as CI does it.
	pub ci: &'static str,
	/// Upstream installed as a package dependency.
	pub packaged: Option<&'static str>,
}

impl SourceRoot {
	pub const ALL: [SourceRoot; 4] = [
		SourceRoot::Docs,
		SourceRoot::DocsLive,
		SourceRoot::DocsGenerated,
		SourceRoot::Tutorial,
	];

	pub fn key(self) -> &'static str {
		match self {
			Self::Docs => "docs",
			Self::DocsLive => "docs-live",
			Self::DocsGenerated => "docs-generated",
			Self::Tutorial => "tutorial",
		}
	}

	pub fn from_key(key: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|root| root.key() == key)
	}

	/// Human-readable name used in diagnostics.
	pub fn label(self) -> &'static str {
		match self {
			Self::Docs => "delivery-process/docs",
			Self::DocsLive => "delivery-process/docs-live",
			Self::DocsGenerated => "delivery-process/docs-generated",
			Self::Tutorial => "delivery-process-tutorials/TUTORIAL-ARTICLE-v1.md",
		}
	}

	/// Environment variable that overrides discovery for this root.
	pub fn env_var(self) -> &'static str {
		match self {
			Self::Docs => "SYNC_SOURCE_DOCS",
			Self::DocsLive => "SYNC_SOURCE_DOCS_LIVE",
			Self::DocsGenerated => "SYNC_SOURCE_DOCS_GENERATED",
			Self::Tutorial => "SYNC_SOURCE_TUTORIAL",
		}
	}

	pub fn candidates(self) -> SourceCandidates {
		match self {
			Self::Docs => {
				SourceCandidates {
					local: "../delivery-process/docs",
					ci: "./delivery-process/docs",
					packaged: Some("node_modules/@libar-dev/delivery-process/docs"),
				}
			}
			Self::DocsLive => {
				SourceCandidates {
					local: "../delivery-process/docs-live",
					ci: "./delivery-process/docs-live",
					packaged: Some("node_modules/@libar-dev/delivery-process/docs-live"),
				}
			}
			Self::DocsGenerated => {
				SourceCandidates {
					local: "../delivery-process/docs-generated",
					ci: "./delivery-process/docs-generated",
					packaged: Some("node_modules/@libar-dev/delivery-process/docs-generated"),
				}
			}
			Self::Tutorial => {
				SourceCandidates {
					local: "../delivery-process-tutorials/TUTORIAL-ARTICLE-v1.md",
					ci: "./delivery-process-tutorials/TUTORIAL-ARTICLE-v1.md",
					packaged: None,
				}
			}
		}
	}
}

/// Explicit locations that replace discovery, keyed by root.
pub type SourceOverrides = BTreeMap<SourceRoot, PathBuf>;

/// Resolve a single root. An override is final: when it does not exist the
/// root is unresolved, even if a discovered candidate would have existed.
pub fn resolve_source(
	project_root: &Path,
	candidates: &SourceCandidates,
	override_path: Option<&Path>,
) -> Option<PathBuf> {
	if let Some(path) = override_path {
		let path = normalize_path(&project_root.join(path));
		return path.exists().then_some(path);
	}

	[Some(candidates.local), Some(candidates.ci), candidates.packaged]
		.into_iter()
		.flatten()
		.map(|candidate| normalize_path(&project_root.join(candidate)))
		.find(|path| path.exists())
}

/// The resolved location of every source root for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedSources {
	roots: BTreeMap<SourceRoot, PathBuf>,
}

impl ResolvedSources {
	/// Resolve every known root against `project_root`.
	pub fn resolve(project_root: &Path, overrides: &SourceOverrides) -> Self {
		let mut resolved = Self::default();

		for root in SourceRoot::ALL {
			let override_path = overrides.get(&root).map(PathBuf::as_path);
			match resolve_source(project_root, &root.candidates(), override_path) {
				Some(path) => {
					debug!("Source {}: {}", root.key(), path.display());
					resolved.roots.insert(root, path);
				}
				None => warn!("Source {}: NOT FOUND", root.key()),
			}
		}

		resolved
	}

	/// Bind `root` to an already known location.
	#[must_use]
	pub fn with(mut self, root: SourceRoot, path: impl AsRef<Path>) -> Self {
		self.roots.insert(root, normalize_path(path.as_ref()));
		self
	}

	pub fn get(&self, root: SourceRoot) -> Option<&Path> {
		self.roots.get(&root).map(PathBuf::as_path)
	}

	/// Resolved roots in declaration order.
	pub fn iter(&self) -> impl Iterator<Item = (SourceRoot, &Path)> {
		self.roots.iter().map(|(root, path)| (*root, path.as_path()))
	}

	/// Required roots that could not be found.
	pub fn missing_roots(&self) -> Vec<SourceRoot> {
		SourceRoot::ALL
			.into_iter()
			.filter(|root| !self.roots.contains_key(root))
			.collect()
	}

	/// Required files absent from a root that does exist. Files of missing
	/// roots are not reported here; [`Self::missing_roots`] covers them.
	pub fn missing_files(&self) -> Vec<RequiredFile> {
		required_files()
			.into_iter()
			.filter(|file| {
				self.get(file.root)
					.is_some_and(|root| !root.join(file.relative_path).exists())
			})
			.collect()
	}
}

/// A file that must exist under a resolved root for a complete build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequiredFile {
	pub root: SourceRoot,
	pub relative_path: &'static str,
}

impl RequiredFile {
	pub fn label(&self) -> String {
		format!("{}/{}", self.root.label(), self.relative_path)
	}
}

/// Every manual document plus the index files of the generated roots.
pub fn required_files() -> Vec<RequiredFile> {
	let manual = ManualSection::ALL.into_iter().flat_map(|section| {
		section.docs().iter().map(|doc| {
			RequiredFile {
				root: SourceRoot::Docs,
				relative_path: doc.source,
			}
		})
	});
	let indexes = [
		(SourceRoot::DocsLive, "PRODUCT-AREAS.md"),
		(SourceRoot::DocsLive, "DECISIONS.md"),
		(SourceRoot::DocsGenerated, "BUSINESS-RULES.md"),
		(SourceRoot::DocsGenerated, "TAXONOMY.md"),
	]
	.into_iter()
	.map(|(root, relative_path)| RequiredFile {
		root,
		relative_path,
	});

	manual.chain(indexes).collect()
}

/// Lexically normalize `path`, dropping `.` and folding `..` without touching
/// the filesystem.
pub fn normalize_path(path: &Path) -> PathBuf {
	let mut normalized = PathBuf::new();

	for component in path.components() {
		match component {
			Component::CurDir => {}
			Component::ParentDir => {
				match normalized.components().next_back() {
					Some(Component::Normal(_)) => {
						normalized.pop();
					}
					Some(Component::RootDir | Component::Prefix(_)) => {}
					_ => normalized.push(".."),
				}
			}
			other => normalized.push(other.as_os_str()),
		}
	}

	normalized
}
