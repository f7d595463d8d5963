//! Progress-callback trait for acquisition and compile events.
//!
//! Pass a `&dyn ProgressCallback` to [`crate::pipeline::acquire::acquire`],
//! [`crate::pipeline::compile::compile`] or [`crate::session::run_session`]
//! to receive events as each image is saved and each page is added. The
//! library never prints; the binary turns these events into terminal lines.
//!
//! # Example
//!
//! ```rust
//! use imgseq_pdf::ProgressCallback;
//! use std::path::Path;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! struct Counter(AtomicUsize);
//!
//! impl ProgressCallback for Counter {
//!     fn on_image_saved(&self, _index: u64, _path: &Path, _bytes: u64) {
//!         self.0.fetch_add(1, Ordering::SeqCst);
//!     }
//! }
//!
//! let counter = Counter(AtomicUsize::new(0));
//! counter.on_image_saved(1, Path::new("img_000001.jpg"), 512);
//! assert_eq!(counter.0.load(Ordering::SeqCst), 1);
//! ```

use crate::pipeline::acquire::StopReason;
use std::path::Path;

/// Receives pipeline events. Every method defaults to a no-op, so
/// implementations only override what they care about.
pub trait ProgressCallback: Send + Sync {
    /// Called once the output directory exists, before the first request.
    fn on_acquire_start(&self, directory: &Path) {
        let _ = directory;
    }

    /// Called just before the request for `index` is sent.
    fn on_request(&self, index: u64, url: &str) {
        let _ = (index, url);
    }

    /// Called after an image has been fully written to `path`.
    fn on_image_saved(&self, index: u64, path: &Path, bytes: u64) {
        let _ = (index, path, bytes);
    }

    /// Called once the loop stops without a fatal error.
    fn on_acquire_complete(&self, saved: usize, stop: &StopReason) {
        let _ = (saved, stop);
    }

    /// Called after page `page_num` (1-indexed) has been laid out.
    fn on_page_added(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ProgressCallback for NoopProgressCallback {}
