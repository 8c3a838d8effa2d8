use std::process;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use clap::Parser;
use docsync_cli::DocsyncCli;
use docsync_cli::OutputFormat;
use docsync_core::SyncReport;
use docsync_core::run_sync;
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

static USE_COLOR: AtomicBool = AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,yellow) => {
		if color_enabled() {
			format!("{}", $text.yellow())
		} else {
			format!("{}", $text)
		}
	};
}

fn main() {
	let args = DocsyncCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, Ordering::Relaxed);
	}

	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	init_tracing(&args, use_color);

	let result = args
		.sync_config(|key| std::env::var(key).ok())
		.and_then(|config| run_sync(&config));

	match result {
		Ok(report) => {
			if let Err(e) = print_report(&report, args.format) {
				eprintln!("{} {e}", colored!("error:", red));
				process::exit(2);
			}
		}
		Err(error) => {
			let code = if error.is_validation_failure() { 1 } else { 2 };
			let report: miette::Report = error.into();
			eprintln!("{report:?}");
			process::exit(code);
		}
	}
}

/// Logs go to stderr so stdout only carries the run summary.
fn init_tracing(args: &DocsyncCli, use_color: bool) {
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_filter()));

	fmt()
		.with_env_filter(env_filter)
		.with_target(false)
		.with_ansi(use_color)
		.with_writer(std::io::stderr)
		.init();
}

fn print_report(report: &SyncReport, format: OutputFormat) -> Result<(), serde_json::Error> {
	match format {
		OutputFormat::Json => {
			println!("{}", serde_json::to_string_pretty(report)?);
		}
		OutputFormat::Text => {
			println!(
				"{} Synced {} files into {}",
				colored!("✓", green),
				report.written.len(),
				report.target_dir.display()
			);
			if report.tutorial_parts > 0 {
				println!("Tutorial split into {} parts", report.tutorial_parts);
			}
			if !report.warnings.is_empty() {
				println!(
					"{}",
					colored!(format!("{} warning(s):", report.warnings.len()), yellow)
				);
				for warning in &report.warnings {
					println!("  - {warning}");
				}
			}
		}
	}

	Ok(())
}
