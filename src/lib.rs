//! # imgseq-pdf
//!
//! Download a numbered image sequence from a URL pattern and, optionally,
//! bind it into a single PDF with one page per image.
//!
//! Give it the link to any image of a set, e.g.
//! `http://host/set/img_000123.jpg`, and it fetches `img_000001.jpg`,
//! `img_000002.jpg`, … one at a time until the server answers `404`.
//!
//! ## Pipeline Overview
//!
//! ```text
//! link
//!  │
//!  ├─ 1. Locator  split into base path / prefix / 6 digits / extension
//!  ├─ 2. Acquire  sequential blocking GETs, bodies streamed to disk
//!  └─ 3. Compile  one page per image, sized at 96 DPI (0.264583 mm/px)
//! ```
//!
//! Files land in `downloaded/<prefix>/`, the PDF in
//! `downloaded/<prefix>/<prefix>.pdf` (one trailing `_` dropped from the
//! prefix).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use imgseq_pdf::{run_session, AcquireConfig, HttpFetcher, NoopProgressCallback};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AcquireConfig::default();
//!     let fetcher = HttpFetcher::new(&config)?;
//!     let out = run_session(
//!         "http://host/set/img_000001.jpg",
//!         true,
//!         &config,
//!         &fetcher,
//!         &NoopProgressCallback,
//!     )?;
//!     eprintln!("saved {} images", out.acquisition.paths.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `imgseq` binary (anyhow + indicatif + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod locator;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod session;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{AcquireConfig, AcquireConfigBuilder};
pub use error::{HttpStatusWarning, ImgSeqError};
pub use locator::Locator;
pub use pipeline::acquire::{acquire, AcquireOutput, StopReason};
pub use pipeline::compile::{compile, CompiledDocument, Orientation, PageSize, MM_PER_PX};
pub use pipeline::fetch::{Fetched, Fetcher, HttpFetcher};
pub use progress::{NoopProgressCallback, ProgressCallback};
pub use session::{document_path, run_session, CompileOutcome, SessionOutput};
