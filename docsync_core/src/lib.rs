//! `docsync_core` publishes the documentation of the upstream
//! `delivery-process` repositories into a static site's content tree. It finds
//! the upstream inputs, rewrites their cross-document links to published
//! routes, attaches front matter and splits the long-form tutorial into one
//! page per part.
//!
//! ## Pipeline
//!
//! ```text
//! Source roots (sibling checkout → CI checkout → installed package, or an override)
//!   → Validation (required roots and files together; strict mode stops here)
//!   → Cleanup (contents of every owned output directory)
//!   → Sections (guides + reference, product areas, decisions, generated, tutorial)
//!       → Document transformer (title, front matter, link rewriting)
//! ```
//!
//! ## Modules
//!
//! - [`manifest`]: The registry of manual documents, site sections and link
//!   rewrite rules.
//! - [`source`]: Locating the source roots.
//! - [`route`]: Mapping source files to their published routes.
//! - [`link`]: The tiered link resolver.
//! - [`transform`]: Turning one markdown file into a published page.
//! - [`tutorial`]: Splitting the tutorial into parts.
//! - [`config`]: Defaults, `docsync.toml` and environment settings.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docsync_core::SyncConfig;
//! use docsync_core::run_sync;
//!
//! let mut config = SyncConfig::load(".").unwrap();
//! config.strict = true;
//!
//! let report = run_sync(&config).unwrap();
//! println!("wrote {} files", report.written.len());
//! ```

pub use config::*;
pub use error::*;
pub use link::*;
pub use manifest::*;
pub use route::*;
pub use source::*;
pub use sync::*;
pub use transform::*;
pub use tutorial::*;

pub mod config;
mod error;
pub mod link;
pub mod manifest;
pub mod route;
pub mod source;
mod sync;
pub mod transform;
pub mod tutorial;

#[cfg(test)]
mod __fixtures;
