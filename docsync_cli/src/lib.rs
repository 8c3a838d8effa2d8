use std::path::PathBuf;

use clap::Parser;
use clap::ValueEnum;
use docsync_core::SyncConfig;
use docsync_core::SyncResult;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Publish the delivery-process documentation into the site content tree.",
	long_about = "docsync copies the upstream delivery-process documentation into this site: it \
	              finds the upstream checkouts, rewrites cross-document links to published \
	              routes, adds front matter and splits the tutorial into one page per \
	              part.\n\nSources are looked up next to the project, inside it, then under \
	              node_modules. Set SYNC_SOURCE_DOCS, SYNC_SOURCE_DOCS_LIVE, \
	              SYNC_SOURCE_DOCS_GENERATED or SYNC_SOURCE_TUTORIAL to point at a specific \
	              location.\n\nExit codes:\n  0  success\n  1  strict validation failed\n  2  \
	              any other error"
)]
#[allow(clippy::struct_excessive_bools)]
pub struct DocsyncCli {
	/// Path to the project root directory.
	#[arg(long, short)]
	pub path: Option<PathBuf>,

	/// Output directory, relative to the project root. Defaults to
	/// `src/content/docs/delivery-process`.
	#[arg(long, short)]
	pub target: Option<PathBuf>,

	/// Fail when a required source or file is missing or the tutorial is
	/// malformed. Implied when `CI=true`.
	#[arg(long, default_value_t = false)]
	pub strict: bool,

	/// Log every file as it is written.
	#[arg(long, short, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, default_value_t = false)]
	pub no_color: bool,

	/// Output format for the run summary. Use `text` for human-readable
	/// output or `json` for programmatic consumption.
	#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
	pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
	#[default]
	Text,
	Json,
}

impl DocsyncCli {
	pub fn project_root(&self) -> PathBuf {
		self.path
			.clone()
			.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
	}

	/// Default `tracing` directive when `RUST_LOG` is not set.
	pub fn log_filter(&self) -> &'static str {
		if self.verbose {
			"docsync=debug"
		} else {
			"docsync=info"
		}
	}

	/// Build the run configuration: defaults, then `docsync.toml`, then the
	/// environment read through `lookup`, then command line flags.
	pub fn sync_config(&self, lookup: impl Fn(&str) -> Option<String>) -> SyncResult<SyncConfig> {
		let mut config = SyncConfig::load(self.project_root())?;
		config.apply_env(lookup);

		if let Some(target) = &self.target {
			config.target_dir = config.project_root.join(target);
		}
		if self.strict {
			config.strict = true;
		}

		Ok(config)
	}
}
