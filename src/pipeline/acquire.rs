//! Sequential acquisition: fetch `<prefix>000001<ext>`, `<prefix>000002<ext>`,
//! … until the server says the next one does not exist.
//!
//! The loop has two states, fetching and stopped. The only normal exit is a
//! `404`. Any other non-success status also stops the loop but is reported as
//! a [`HttpStatusWarning`]. Connection failures and local write failures are
//! fatal and propagate immediately; files saved before them stay on disk.

use crate::config::AcquireConfig;
use crate::error::{HttpStatusWarning, ImgSeqError};
use crate::locator::Locator;
use crate::pipeline::fetch::{Fetched, Fetcher};
use crate::progress::ProgressCallback;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const CHUNK_SIZE: usize = 64 * 1024;

/// Why the acquisition loop ended without a fatal error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// The server answered `404` for `index`: end of the sequence.
    NotFound { index: u64 },
    /// The server answered with an unexpected status; partial results kept.
    HttpStatus(HttpStatusWarning),
    /// The configured `max_images` cap was reached.
    LimitReached { limit: usize },
}

impl StopReason {
    /// The transfer warning to surface to the user, if any.
    pub fn warning(&self) -> Option<&HttpStatusWarning> {
        match self {
            StopReason::HttpStatus(w) => Some(w),
            _ => None,
        }
    }
}

/// Result of a completed acquisition.
#[derive(Debug, Clone)]
pub struct AcquireOutput {
    /// `<output_root>/<folder>` where the images were written.
    pub directory: PathBuf,
    /// Saved images, in index order.
    pub paths: Vec<PathBuf>,
    pub stop: StopReason,
}

/// Output directory for a locator: `<output_root>/<folder name>`.
pub fn output_dir(locator: &Locator, config: &AcquireConfig) -> PathBuf {
    config.output_root.join(locator.folder_name())
}

/// Download the sequence described by `locator`.
///
/// Returns every saved path in index order, plus why the loop stopped.
pub fn acquire(
    locator: &Locator,
    config: &AcquireConfig,
    fetcher: &dyn Fetcher,
    progress: &dyn ProgressCallback,
) -> Result<AcquireOutput, ImgSeqError> {
    let directory = output_dir(locator, config);
    std::fs::create_dir_all(&directory).map_err(|source| ImgSeqError::CreateDir {
        path: directory.clone(),
        source,
    })?;
    info!(
        "Acquiring {}{}{} into {}",
        locator.base_path(),
        locator.prefix(),
        locator.extension(),
        directory.display()
    );
    progress.on_acquire_start(&directory);

    let mut paths = Vec::new();
    let mut index = config.start_index;

    let stop = loop {
        if let Some(limit) = config.max_images {
            if paths.len() >= limit {
                break StopReason::LimitReached { limit };
            }
        }

        let url = locator.url_for(index);
        progress.on_request(index, &url);
        let mut fetched = fetcher.get(&url)?;

        if fetched.is_not_found() {
            break StopReason::NotFound { index };
        }
        if !fetched.is_success() {
            let warning = HttpStatusWarning {
                url,
                status: fetched.status,
            };
            warn!("{warning}; keeping {} saved image(s)", paths.len());
            break StopReason::HttpStatus(warning);
        }

        let path = directory.join(locator.file_name_for(index));
        let bytes = save_body(&mut fetched, &url, &path)?;
        debug!("Saved {} ({} bytes)", path.display(), bytes);
        progress.on_image_saved(index, &path, bytes);

        paths.push(path);
        index = index.checked_add(1).ok_or_else(|| {
            ImgSeqError::InvalidConfig(format!("sequence index overflows after {index}"))
        })?;
    };

    info!("Acquisition stopped after {} image(s): {:?}", paths.len(), stop);
    progress.on_acquire_complete(paths.len(), &stop);

    Ok(AcquireOutput {
        directory,
        paths,
        stop,
    })
}

/// Stream a response body into a newly created file.
///
/// Read failures are transfer errors; create/write/flush failures are
/// write errors. Both handles are dropped on every return path.
fn save_body(fetched: &mut Fetched, url: &str, path: &Path) -> Result<u64, ImgSeqError> {
    let write_err = |source| ImgSeqError::FileWrite {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(write_err)?;
    let mut writer = BufWriter::new(file);
    let mut chunk = vec![0u8; CHUNK_SIZE];
    let mut written: u64 = 0;

    loop {
        match fetched.body.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => {
                writer.write_all(&chunk[..n]).map_err(write_err)?;
                written += n as u64;
            }
            Err(ref e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => {
                return Err(ImgSeqError::Transfer {
                    url: url.to_string(),
                    reason: format!("read error: {e}"),
                });
            }
        }
    }

    writer.flush().map_err(write_err)?;
    Ok(written)
}
