#![allow(dead_code)]

use std::path::Path;
use std::path::PathBuf;

use assert_cmd::Command;
use insta_cmd::get_cargo_bin;

const SOURCE_ENV_VARS: [&str; 4] = [
	"SYNC_SOURCE_DOCS",
	"SYNC_SOURCE_DOCS_LIVE",
	"SYNC_SOURCE_DOCS_GENERATED",
	"SYNC_SOURCE_TUTORIAL",
];

/// The binary with color off and none of the caller's sync settings leaking in.
pub fn docsync_cmd() -> Command {
	let mut cmd = Command::new(get_cargo_bin("docsync"));
	cmd.env("NO_COLOR", "1")
		.env_remove("CI")
		.env_remove("RUST_LOG")
		.env_remove("TUTORIAL_EXPECTED_PARTS");
	for var in SOURCE_ENV_VARS {
		cmd.env_remove(var);
	}
	cmd
}

/// Upstream inputs written under `<root>/upstream`, addressed through the
/// `SYNC_SOURCE_*` variables.
pub struct Upstream {
	pub root: PathBuf,
}

pub const GUIDES: [&str; 6] = [
	"METHODOLOGY.md",
	"CONFIGURATION.md",
	"SESSION-GUIDES.md",
	"GHERKIN-PATTERNS.md",
	"ANNOTATION-GUIDE.md",
	"PUBLISHING.md",
];

pub const REFERENCE: [&str; 5] = [
	"ARCHITECTURE.md",
	"PROCESS-API.md",
	"PROCESS-GUARD.md",
	"VALIDATION.md",
	"TAXONOMY.md",
];

impl Upstream {
	pub fn create(root: &Path) -> std::io::Result<Self> {
		let upstream = Self {
			root: root.join("upstream"),
		};

		for file in GUIDES.iter().chain(&REFERENCE) {
			upstream.write(&format!("docs/{file}"), "# Guide\n\nContent.\n")?;
		}
		upstream.write(
			"docs/METHODOLOGY.md",
			"# Methodology\n\nSee [config](./CONFIGURATION.md#presets).\n",
		)?;
		upstream.write("docs-live/PRODUCT-AREAS.md", "# Product Areas\n")?;
		upstream.write("docs-live/DECISIONS.md", "# Decisions\n")?;
		upstream.write("docs-generated/BUSINESS-RULES.md", "# Business Rules\n")?;
		upstream.write("docs-generated/TAXONOMY.md", "# Taxonomy\n")?;
		upstream.write(
			"tutorial.md",
			"# Tutorial\n\nIntro text.\n\n## Part 1: Setup\n\nStep one.\n\n## Part 2: \
			 Build\n\nStep two.\n",
		)?;

		Ok(upstream)
	}

	pub fn path(&self, relative: &str) -> PathBuf {
		self.root.join(relative)
	}

	pub fn write(&self, relative: &str, content: &str) -> std::io::Result<()> {
		let path = self.path(relative);
		if let Some(parent) = path.parent() {
			std::fs::create_dir_all(parent)?;
		}
		std::fs::write(path, content)
	}

	/// Point every source root at this upstream tree.
	pub fn apply(&self, cmd: &mut Command) {
		cmd.env("SYNC_SOURCE_DOCS", self.path("docs"))
			.env("SYNC_SOURCE_DOCS_LIVE", self.path("docs-live"))
			.env("SYNC_SOURCE_DOCS_GENERATED", self.path("docs-generated"))
			.env("SYNC_SOURCE_TUTORIAL", self.path("tutorial.md"))
			.env("TUTORIAL_EXPECTED_PARTS", "2");
	}
}
