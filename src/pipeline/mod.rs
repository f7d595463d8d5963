//! Pipeline stages for turning an image sequence into a PDF.
//!
//! ## Data Flow
//!
//! ```text
//! fetch ──▶ acquire ──▶ embed ──▶ compile
//! (GET)     (loop+save)  (XObject) (pages)
//! ```
//!
//! 1. [`fetch`]   — the transport seam: one blocking GET, status + body
//! 2. [`acquire`] — walk the sequence until `404`, streaming bodies to disk
//! 3. [`embed`]   — sniff each saved file and build its image XObject
//! 4. [`compile`] — one page per image, sized from its pixel dimensions

pub mod acquire;
pub mod compile;
pub mod embed;
pub mod fetch;
