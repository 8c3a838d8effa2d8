use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::SyncError;
use crate::SyncResult;
use crate::source::SourceOverrides;
use crate::source::SourceRoot;

/// Output directory used when nothing else is configured, relative to the
/// project root.
pub const DEFAULT_TARGET: &str = "src/content/docs/delivery-process";

/// Number of tutorial parts expected when nothing else is configured.
pub const DEFAULT_EXPECTED_TUTORIAL_PARTS: usize = 10;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] =
	["docsync.toml", ".docsync.toml", ".config/docsync.toml"];

/// Environment variable holding the expected tutorial part count.
pub const EXPECTED_PARTS_ENV_VAR: &str = "TUTORIAL_EXPECTED_PARTS";

/// Environment variable that switches on strict mode when set to `true`.
pub const CI_ENV_VAR: &str = "CI";

/// Contents of a `docsync.toml` file. Every key is optional.
///
/// ```toml
/// target = "src/content/docs/delivery-process"
///
/// [tutorial]
/// expected_parts = 10
///
/// [sources]
/// docs = "../delivery-process/docs"
/// docs-live = "../delivery-process/docs-live"
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ConfigFile {
	/// Output directory, relative to the project root.
	#[serde(default)]
	pub target: Option<PathBuf>,
	#[serde(default)]
	pub tutorial: TutorialConfig,
	/// Source root overrides keyed by root name, relative to the project root.
	#[serde(default)]
	pub sources: BTreeMap<String, PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct TutorialConfig {
	#[serde(default)]
	pub expected_parts: Option<usize>,
}

impl ConfigFile {
	/// Find the first existing config file candidate in `root`.
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if there is none.
	pub fn load(root: &Path) -> SyncResult<Option<Self>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		let content = std::fs::read_to_string(&config_path).map_err(|source| {
			SyncError::Read {
				path: config_path.clone(),
				source,
			}
		})?;
		let config: Self =
			toml::from_str(&content).map_err(|e| SyncError::ConfigParse(e.to_string()))?;

		Ok(Some(config))
	}

	/// The `[sources]` table keyed by [`SourceRoot`]. Unknown names are an
	/// error.
	pub fn overrides(&self) -> SyncResult<SourceOverrides> {
		self.sources
			.iter()
			.map(|(key, path)| {
				SourceRoot::from_key(key)
					.map(|root| (root, path.clone()))
					.ok_or_else(|| {
						let known: Vec<&str> = SourceRoot::ALL.iter().map(|root| root.key()).collect();
						SyncError::ConfigParse(format!(
							"unknown source `{key}` in [sources], expected one of: {}",
							known.join(", ")
						))
					})
			})
			.collect()
	}
}

/// Everything a sync run needs to know, passed explicitly to
/// [`run_sync`](crate::run_sync).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
	/// Directory that candidate and override paths are resolved against.
	pub project_root: PathBuf,
	/// Where published documents are written.
	pub target_dir: PathBuf,
	/// Treat missing inputs and tutorial violations as fatal.
	pub strict: bool,
	/// `None` disables the tutorial part count check.
	pub expected_tutorial_parts: Option<usize>,
	pub overrides: SourceOverrides,
}

impl SyncConfig {
	/// Built-in defaults for `project_root`.
	pub fn new(project_root: impl Into<PathBuf>) -> Self {
		let project_root = project_root.into();
		Self {
			target_dir: project_root.join(DEFAULT_TARGET),
			project_root,
			strict: false,
			expected_tutorial_parts: Some(DEFAULT_EXPECTED_TUTORIAL_PARTS),
			overrides: SourceOverrides::new(),
		}
	}

	/// Defaults overlaid with the project's config file, if it has one.
	pub fn load(project_root: impl Into<PathBuf>) -> SyncResult<Self> {
		let mut config = Self::new(project_root);
		if let Some(file) = ConfigFile::load(&config.project_root)? {
			config.apply_file(&file)?;
		}

		Ok(config)
	}

	pub fn apply_file(&mut self, file: &ConfigFile) -> SyncResult<()> {
		let overrides = file.overrides()?;
		if let Some(target) = &file.target {
			self.target_dir = self.project_root.join(target);
		}
		if let Some(expected) = file.tutorial.expected_parts {
			self.expected_tutorial_parts = Some(expected);
		}
		self.overrides.extend(overrides);

		Ok(())
	}

	/// Overlay environment settings. `lookup` returns the value of a variable;
	/// unset and empty variables are ignored. A `TUTORIAL_EXPECTED_PARTS`
	/// value that is not a number disables the part count check.
	pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
		let lookup = |key: &str| lookup(key).filter(|value| !value.is_empty());

		for root in SourceRoot::ALL {
			if let Some(path) = lookup(root.env_var()) {
				self.overrides.insert(root, PathBuf::from(path));
			}
		}

		if let Some(value) = lookup(EXPECTED_PARTS_ENV_VAR) {
			self.expected_tutorial_parts = value.trim().parse().ok();
		}

		if lookup(CI_ENV_VAR).as_deref() == Some("true") {
			self.strict = true;
		}
	}
}
