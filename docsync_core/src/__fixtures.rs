use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;

use tempfile::TempDir;

use crate::GUIDES;
use crate::REFERENCE;
use crate::ResolvedSources;
use crate::SourceRoot;
use crate::SyncConfig;

pub(crate) const TUTORIAL: &str = "# Tutorial\n\nIntro text.\n\n## Part 1: Setup\n\nStep \
                                   one.\n\n## Part 2: Build\n\nStep two.\n";

pub(crate) const METHODOLOGY: &str = "# Methodology\n\nRead the [config](./CONFIGURATION.md) \
                                      and the [guard rules](./PROCESS-GUARD.md#rules).\n\nSee \
                                      [areas](../docs-live/product-areas/ANNOTATION.md), the \
                                      [changelog](../CHANGELOG.md), the \
                                      [spec](delivery-process/specs/process.feature) and \
                                      [home](./INDEX.md).\n\n![diagram](src/diagram.png)\n";

/// Upstream checkouts placed next to a site project, as on a developer
/// machine:
///
/// ```text
/// <tmp>/site/                              project root
/// <tmp>/delivery-process/docs/             manual docs
/// <tmp>/delivery-process/docs-live/        product areas and decisions
/// <tmp>/delivery-process/docs-generated/   generated reference
/// <tmp>/delivery-process-tutorials/        tutorial article
/// ```
pub(crate) struct Fixture {
	pub dir: TempDir,
}

impl Fixture {
	/// A project with every required input present.
	pub fn complete() -> Self {
		let fixture = Self::empty();

		for doc in GUIDES.iter().chain(REFERENCE) {
			let title = doc.slug.replace('-', " ");
			fixture.write_upstream(
				&format!("delivery-process/docs/{}", doc.source),
				&format!("# {title}\n\nAbout {title}.\n"),
			);
		}
		fixture.write_upstream("delivery-process/docs/METHODOLOGY.md", METHODOLOGY);

		fixture.write_upstream(
			"delivery-process/docs-live/PRODUCT-AREAS.md",
			"# Product Areas\n\n- [Annotation](product-areas/ANNOTATION.md)\n",
		);
		fixture.write_upstream(
			"delivery-process/docs-live/product-areas/ANNOTATION.md",
			"# Annotation\n\nBack to the [guide](../../docs/ANNOTATION-GUIDE.md).\n",
		);
		fixture.write_upstream(
			"delivery-process/docs-live/DECISIONS.md",
			"# Decisions\n\n- [ADR-001](decisions/ADR-001-tags.md)\n",
		);
		fixture.write_upstream(
			"delivery-process/docs-live/decisions/ADR-001-tags.md",
			"# ADR-001: Tags\n\nAccepted.\n",
		);
		fixture.write_upstream(
			"delivery-process/docs-generated/BUSINESS-RULES.md",
			"# Business Rules\n\n- [Core](business-rules/Core.md)\n",
		);
		fixture.write_upstream(
			"delivery-process/docs-generated/business-rules/Core.md",
			"# Core\n\nRules.\n",
		);
		fixture.write_upstream(
			"delivery-process/docs-generated/TAXONOMY.md",
			"# Taxonomy\n\n- [Tags](taxonomy/tags.md)\n",
		);
		fixture.write_upstream(
			"delivery-process/docs-generated/taxonomy/tags.md",
			"# Tags\n\nSee the [overview](../TAXONOMY.md).\n",
		);
		fixture.write_upstream(
			"delivery-process/docs-generated/docs/REFERENCE-SAMPLE.md",
			"# Reference Sample\n\nSample.\n",
		);
		fixture.write_upstream(
			"delivery-process-tutorials/TUTORIAL-ARTICLE-v1.md",
			TUTORIAL,
		);

		fixture
	}

	/// Only the project directory.
	pub fn empty() -> Self {
		let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
		std::fs::create_dir_all(dir.path().join("site"))
			.unwrap_or_else(|e| panic!("create site: {e}"));
		Self { dir }
	}

	pub fn project_root(&self) -> PathBuf {
		self.dir.path().join("site")
	}

	pub fn target_dir(&self) -> PathBuf {
		self.project_root().join("content")
	}

	pub fn upstream(&self, relative: &str) -> PathBuf {
		self.dir.path().join(relative)
	}

	pub fn write_upstream(&self, relative: &str, content: &str) {
		write_file(&self.upstream(relative), content);
	}

	pub fn remove_upstream(&self, relative: &str) {
		std::fs::remove_file(self.upstream(relative))
			.unwrap_or_else(|e| panic!("remove {relative}: {e}"));
	}

	pub fn write_output(&self, relative: &str, content: &str) {
		write_file(&self.target_dir().join(relative), content);
	}

	pub fn read_output(&self, relative: &str) -> String {
		std::fs::read_to_string(self.target_dir().join(relative))
			.unwrap_or_else(|e| panic!("read {relative}: {e}"))
	}

	pub fn config(&self) -> SyncConfig {
		SyncConfig {
			target_dir: self.target_dir(),
			expected_tutorial_parts: Some(2),
			..SyncConfig::new(self.project_root())
		}
	}

	pub fn sources(&self) -> ResolvedSources {
		ResolvedSources::default()
			.with(SourceRoot::Docs, self.upstream("delivery-process/docs"))
			.with(SourceRoot::DocsLive, self.upstream("delivery-process/docs-live"))
			.with(
				SourceRoot::DocsGenerated,
				self.upstream("delivery-process/docs-generated"),
			)
			.with(
				SourceRoot::Tutorial,
				self.upstream("delivery-process-tutorials/TUTORIAL-ARTICLE-v1.md"),
			)
	}

	/// Every file under the target directory, keyed by relative path.
	pub fn output_tree(&self) -> BTreeMap<String, String> {
		let mut tree = BTreeMap::new();
		collect_tree(&self.target_dir(), &self.target_dir(), &mut tree);
		tree
	}
}

fn write_file(path: &Path, content: &str) {
	if let Some(parent) = path.parent() {
		std::fs::create_dir_all(parent).unwrap_or_else(|e| panic!("create dir: {e}"));
	}
	std::fs::write(path, content).unwrap_or_else(|e| panic!("write {}: {e}", path.display()));
}

fn collect_tree(root: &Path, directory: &Path, tree: &mut BTreeMap<String, String>) {
	let Ok(entries) = std::fs::read_dir(directory) else {
		return;
	};

	for entry in entries.flatten() {
		let path = entry.path();
		if path.is_dir() {
			collect_tree(root, &path, tree);
		} else if let Ok(content) = std::fs::read_to_string(&path) {
			let relative = path
				.strip_prefix(root)
				.unwrap_or(&path)
				.to_string_lossy()
				.replace('\\', "/");
			tree.insert(relative, content);
		}
	}
}

/// Sources rooted at fixed absolute paths, for tests that never touch disk.
pub(crate) fn virtual_sources() -> ResolvedSources {
	ResolvedSources::default()
		.with(SourceRoot::Docs, "/up/delivery-process/docs")
		.with(SourceRoot::DocsLive, "/up/delivery-process/docs-live")
		.with(
			SourceRoot::DocsGenerated,
			"/up/delivery-process/docs-generated",
		)
		.with(
			SourceRoot::Tutorial,
			"/up/delivery-process-tutorials/TUTORIAL-ARTICLE-v1.md",
		)
}
