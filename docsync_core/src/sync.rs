//! The sync pipeline: validate inputs, clear owned output directories, then
//! publish every section in a fixed order.

use std::path::Path;
use std::path::PathBuf;

use serde::Serialize;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::SyncError;
use crate::SyncResult;
use crate::config::SyncConfig;
use crate::link::LinkResolver;
use crate::manifest::ManualSection;
use crate::manifest::sync_subdirs;
use crate::source::RequiredFile;
use crate::source::ResolvedSources;
use crate::source::SourceRoot;
use crate::transform::TransformOptions;
use crate::transform::TransformedDocument;
use crate::transform::transform_document;
use crate::tutorial::SplitOptions;
use crate::tutorial::SplitTutorial;
use crate::tutorial::split_tutorial;

/// What a sync run did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
	pub target_dir: PathBuf,
	/// Written files relative to `target_dir`, in write order.
	pub written: Vec<PathBuf>,
	/// Every warning logged during the run.
	pub warnings: Vec<String>,
	/// Number of tutorial parts published.
	pub tutorial_parts: usize,
}

/// Run the whole pipeline described by `config`.
///
/// Missing inputs and tutorial structure problems are checked before anything
/// under the target directory is touched. In strict mode they abort the run
/// with a validation error; otherwise they are reported as warnings and the
/// affected sections are skipped or published on a best-effort basis.
pub fn run_sync(config: &SyncConfig) -> SyncResult<SyncReport> {
	info!("Starting content sync");
	info!("Target: {}", config.target_dir.display());
	info!("Strict mode: {}", if config.strict { "ON" } else { "OFF" });

	let sources = ResolvedSources::resolve(&config.project_root, &config.overrides);
	let mut syncer = Syncer {
		config,
		resolver: LinkResolver::new(sources),
		report: SyncReport {
			target_dir: config.target_dir.clone(),
			..SyncReport::default()
		},
	};

	syncer.validate_sources()?;
	let tutorial = syncer.prepare_tutorial()?;

	for subdir in sync_subdirs() {
		clean_dir(&config.target_dir.join(subdir))?;
	}

	syncer.sync_manual_docs()?;
	syncer.sync_product_areas()?;
	syncer.sync_decisions()?;
	syncer.sync_generated()?;
	syncer.sync_tutorial(tutorial)?;

	info!("Done");
	Ok(syncer.report)
}

struct Syncer<'a> {
	config: &'a SyncConfig,
	resolver: LinkResolver,
	report: SyncReport,
}

/// Front matter settings shared by every page of the generated sections.
fn generated_page(order: u32, label: Option<&str>) -> TransformOptions<'static> {
	TransformOptions {
		sidebar_order: Some(order),
		sidebar_label: label.map(ToString::to_string),
		suppress_edit_link: true,
		..TransformOptions::default()
	}
}

impl Syncer<'_> {
	fn sources(&self) -> &ResolvedSources {
		self.resolver.sources()
	}

	fn warn(&mut self, message: String) {
		warn!("{message}");
		self.report.warnings.push(message);
	}

	/// Check roots and files together so a strict failure lists everything
	/// that is missing.
	fn validate_sources(&mut self) -> SyncResult<()> {
		let roots: Vec<String> = self
			.sources()
			.missing_roots()
			.into_iter()
			.map(|root| root.label().to_string())
			.collect();
		let files: Vec<String> = self
			.sources()
			.missing_files()
			.iter()
			.map(RequiredFile::label)
			.collect();

		if self.config.strict && !(roots.is_empty() && files.is_empty()) {
			return Err(SyncError::MissingInputs { roots, files });
		}

		if !roots.is_empty() {
			self.warn(format!("Missing recommended sources: {}", roots.join(", ")));
			warn!("Continuing because strict mode is disabled");
		}
		if !files.is_empty() {
			self.warn(format!(
				"Missing recommended source files: {}",
				files.join(", ")
			));
			warn!("Continuing because strict mode is disabled");
		}

		Ok(())
	}

	/// Read and split the tutorial ahead of cleanup so a strict structure
	/// failure leaves the previous output intact.
	fn prepare_tutorial(&self) -> SyncResult<Option<SplitTutorial>> {
		let Some(path) = self.sources().get(SourceRoot::Tutorial) else {
			return Ok(None);
		};

		let content = read_source(path)?;
		let options = SplitOptions {
			expected_parts: self.config.expected_tutorial_parts,
			strict: self.config.strict,
		};
		split_tutorial(&content, Some(path), options, &self.resolver).map(Some)
	}

	fn sync_manual_docs(&mut self) -> SyncResult<()> {
		let Some(docs) = self.sources().get(SourceRoot::Docs).map(Path::to_path_buf) else {
			self.warn(format!(
				"{}/ not found, skipping manual docs",
				SourceRoot::Docs.label()
			));
			return Ok(());
		};

		info!("Syncing manual docs...");
		for section in ManualSection::ALL {
			ensure_dir(&self.config.target_dir.join(section.directory()))?;
			for doc in section.docs() {
				let source = docs.join(doc.source);
				if !source.is_file() {
					self.warn(format!("{} not found", doc.source));
					continue;
				}

				let destination = Path::new(section.directory()).join(format!("{}.md", doc.slug));
				let options = TransformOptions {
					sidebar_order: Some(doc.order),
					..TransformOptions::default()
				};
				self.copy_and_transform(&source, &destination, options)?;
			}
		}

		Ok(())
	}

	fn sync_product_areas(&mut self) -> SyncResult<()> {
		let Some(live) = self.live_root("product areas") else {
			return Ok(());
		};

		info!("Syncing product areas...");
		let target = Path::new("product-areas");
		ensure_dir(&self.config.target_dir.join(target))?;

		let index = live.join("PRODUCT-AREAS.md");
		if index.is_file() {
			self.copy_and_transform(
				&index,
				&target.join("index.md"),
				generated_page(0, Some("Overview")),
			)?;
		}

		let directory = live.join("product-areas");
		for (order, file) in (1..).zip(list_markdown_files(&directory)?) {
			self.copy_and_transform(
				&directory.join(&file),
				&target.join(file.to_lowercase()),
				generated_page(order, None),
			)?;
		}

		Ok(())
	}

	fn sync_decisions(&mut self) -> SyncResult<()> {
		let Some(live) = self.live_root("decisions") else {
			return Ok(());
		};

		info!("Syncing architecture decisions...");
		let target = Path::new("decisions");
		ensure_dir(&self.config.target_dir.join(target))?;

		let index = live.join("DECISIONS.md");
		if index.is_file() {
			self.copy_and_transform(
				&index,
				&target.join("index.md"),
				generated_page(0, Some("Overview")),
			)?;
		}

		let directory = live.join("decisions");
		for (order, file) in (1..).zip(list_markdown_files(&directory)?) {
			self.copy_and_transform(
				&directory.join(&file),
				&target.join(file.to_lowercase()),
				generated_page(order, None),
			)?;
		}

		Ok(())
	}

	fn live_root(&mut self, what: &str) -> Option<PathBuf> {
		let root = self
			.sources()
			.get(SourceRoot::DocsLive)
			.map(Path::to_path_buf);
		if root.is_none() {
			self.warn(format!(
				"{}/ not found, skipping {what}",
				SourceRoot::DocsLive.label()
			));
		}
		root
	}

	fn sync_generated(&mut self) -> SyncResult<()> {
		let Some(generated) = self
			.sources()
			.get(SourceRoot::DocsGenerated)
			.map(Path::to_path_buf)
		else {
			self.warn(format!(
				"{}/ not found, skipping generated docs",
				SourceRoot::DocsGenerated.label()
			));
			return Ok(());
		};

		info!("Syncing generated reference docs...");
		let target = Path::new("generated");
		ensure_dir(&self.config.target_dir.join(target))?;

		self.sync_generated_group(&generated, "BUSINESS-RULES.md", "business-rules", 0, "Business Rules")?;
		self.sync_generated_group(&generated, "TAXONOMY.md", "taxonomy", 10, "Taxonomy")?;

		let sample = generated.join("docs").join("REFERENCE-SAMPLE.md");
		if sample.is_file() {
			self.copy_and_transform(
				&sample,
				&target.join("reference-sample.md"),
				generated_page(20, None),
			)?;
		}

		Ok(())
	}

	/// Publish `index` as `generated/<directory>/index.md` at `index_order`,
	/// followed by the markdown files of the matching source subdirectory.
	/// Nothing is published when the index is missing.
	fn sync_generated_group(
		&mut self,
		generated: &Path,
		index: &str,
		directory: &str,
		index_order: u32,
		label: &str,
	) -> SyncResult<()> {
		let index = generated.join(index);
		if !index.is_file() {
			return Ok(());
		}

		let target = Path::new("generated").join(directory);
		ensure_dir(&self.config.target_dir.join(&target))?;
		self.copy_and_transform(
			&index,
			&target.join("index.md"),
			generated_page(index_order, Some(label)),
		)?;

		let source_directory = generated.join(directory);
		for (order, file) in (index_order + 1..).zip(list_markdown_files(&source_directory)?) {
			self.copy_and_transform(
				&source_directory.join(&file),
				&target.join(file.to_lowercase()),
				generated_page(order, None),
			)?;
		}

		Ok(())
	}

	fn sync_tutorial(&mut self, tutorial: Option<SplitTutorial>) -> SyncResult<()> {
		let Some(tutorial) = tutorial else {
			self.warn(format!(
				"{} not found, skipping tutorial",
				SourceRoot::Tutorial.label()
			));
			return Ok(());
		};

		info!("Syncing and splitting tutorial...");
		// Already logged while splitting.
		if !tutorial.violations.is_empty() {
			self.report.warnings.push(format!(
				"Tutorial structure validation failed: {}",
				crate::error::join_violations(&tutorial.violations)
			));
		}
		if tutorial.parts.is_empty() {
			self.report
				.warnings
				.push("Tutorial fallback: copying tutorial as a single page".to_string());
		}

		let target = Path::new("tutorial");
		ensure_dir(&self.config.target_dir.join(target))?;
		for page in tutorial.pages() {
			self.write_document(&target.join(&page.file_name), &page.document)?;
		}

		self.report.tutorial_parts = tutorial.parts.len();
		if !tutorial.parts.is_empty() {
			info!("Tutorial split into {} parts", tutorial.parts.len());
		}

		Ok(())
	}

	/// Read `source`, transform it and write it to `destination`, relative to
	/// the target directory.
	fn copy_and_transform(
		&mut self,
		source: &Path,
		destination: &Path,
		options: TransformOptions<'_>,
	) -> SyncResult<()> {
		let content = read_source(source)?;
		let options = TransformOptions {
			containing_file: Some(source),
			..options
		};
		let document = transform_document(&content, &options, &self.resolver)?;
		debug!(
			"{} → {}",
			source.file_name().unwrap_or_default().to_string_lossy(),
			destination.display()
		);
		self.write_document(destination, &document)
	}

	fn write_document(&mut self, destination: &Path, document: &TransformedDocument) -> SyncResult<()> {
		let path = self.config.target_dir.join(destination);
		if let Some(parent) = path.parent() {
			ensure_dir(parent)?;
		}
		std::fs::write(&path, document.render()).map_err(|source| {
			SyncError::Write {
				path: path.clone(),
				source,
			}
		})?;
		self.report.written.push(destination.to_path_buf());

		Ok(())
	}
}

fn read_source(path: &Path) -> SyncResult<String> {
	std::fs::read_to_string(path).map_err(|source| {
		SyncError::Read {
			path: path.to_path_buf(),
			source,
		}
	})
}

fn ensure_dir(path: &Path) -> SyncResult<()> {
	std::fs::create_dir_all(path).map_err(|source| {
		SyncError::Write {
			path: path.to_path_buf(),
			source,
		}
	})
}

/// Remove everything inside `path` but keep the directory itself. A missing
/// directory is left alone.
pub fn clean_dir(path: &Path) -> SyncResult<()> {
	if !path.is_dir() {
		return Ok(());
	}

	let entries = std::fs::read_dir(path).map_err(|source| {
		SyncError::Read {
			path: path.to_path_buf(),
			source,
		}
	})?;
	for entry in entries {
		let entry = entry?;
		let entry_path = entry.path();
		let removed = if entry.file_type()?.is_dir() {
			std::fs::remove_dir_all(&entry_path)
		} else {
			std::fs::remove_file(&entry_path)
		};
		removed.map_err(|source| {
			SyncError::Write {
				path: entry_path,
				source,
			}
		})?;
	}

	Ok(())
}

/// Names of the `.md` files directly inside `directory`, sorted. A missing
/// directory has none.
fn list_markdown_files(directory: &Path) -> SyncResult<Vec<String>> {
	if !directory.is_dir() {
		return Ok(Vec::new());
	}

	let entries = std::fs::read_dir(directory).map_err(|source| {
		SyncError::Read {
			path: directory.to_path_buf(),
			source,
		}
	})?;
	let mut files = Vec::new();
	for entry in entries {
		let entry = entry?;
		if !entry.file_type()?.is_file() {
			continue;
		}
		if let Some(name) = entry.file_name().to_str() {
			if name.ends_with(".md") {
				files.push(name.to_string());
			}
		}
	}
	files.sort();

	Ok(files)
}
