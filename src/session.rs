//! One complete run: parse the link, acquire the sequence, optionally bind it.
//!
//! Acquisition failures are fatal and returned as `Err`. A compile failure
//! is not: the downloaded images are still a useful result, so it is
//! reported through [`CompileOutcome::Failed`] alongside them.

use crate::config::AcquireConfig;
use crate::error::ImgSeqError;
use crate::locator::Locator;
use crate::pipeline::acquire::{self, AcquireOutput};
use crate::pipeline::compile::{self, CompiledDocument};
use crate::pipeline::fetch::Fetcher;
use crate::progress::ProgressCallback;
use std::path::PathBuf;
use tracing::{info, warn};

/// What happened to the optional compile step.
#[derive(Debug)]
pub enum CompileOutcome {
    /// The user did not ask for a PDF; no document file was created.
    Declined,
    /// A PDF was requested but no image was downloaded.
    NothingToCompile,
    Written(CompiledDocument),
    /// Compile failed; the downloaded images are untouched.
    Failed(ImgSeqError),
}

/// Everything a session produced.
#[derive(Debug)]
pub struct SessionOutput {
    pub acquisition: AcquireOutput,
    pub compile: CompileOutcome,
}

/// Document path for a locator: `<output_root>/<folder>/<folder>.pdf`.
pub fn document_path(locator: &Locator, config: &AcquireConfig) -> PathBuf {
    acquire::output_dir(locator, config).join(format!("{}.pdf", locator.folder_name()))
}

/// Run a full session for the link in `input`.
///
/// A malformed link fails before the output directory is created or any
/// request is sent.
pub fn run_session(
    input: &str,
    compile_requested: bool,
    config: &AcquireConfig,
    fetcher: &dyn Fetcher,
    progress: &dyn ProgressCallback,
) -> Result<SessionOutput, ImgSeqError> {
    let locator = Locator::parse(input)?;
    info!("Starting session for {}", input.trim());

    let acquisition = acquire::acquire(&locator, config, fetcher, progress)?;

    let compile = if !compile_requested {
        CompileOutcome::Declined
    } else if acquisition.paths.is_empty() {
        CompileOutcome::NothingToCompile
    } else {
        let output = document_path(&locator, config);
        match compile::compile(&acquisition.paths, &output, progress) {
            Ok(doc) => CompileOutcome::Written(doc),
            Err(e) => {
                warn!("Compile failed: {}", e);
                CompileOutcome::Failed(e)
            }
        }
    };

    Ok(SessionOutput {
        acquisition,
        compile,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::acquire::tests::{Reply, ScriptedFetcher};
    use crate::progress::NoopProgressCallback;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;
    use tempfile::TempDir;

    fn png_bytes(w: u32, h: u32) -> Vec<u8> {
        let mut buf = Vec::new();
        RgbImage::from_pixel(w, h, Rgb([1, 2, 3]))
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    fn fetcher_with_pngs(locator: &Locator, count: u64) -> ScriptedFetcher {
        let mut f = ScriptedFetcher::default();
        for i in 1..=count {
            f = f.reply(&locator.url_for(i), Reply::Body(200, png_bytes(10 * i as u32, 20)));
        }
        f
    }

    fn config_in(tmp: &TempDir) -> AcquireConfig {
        AcquireConfig::builder()
            .output_root(tmp.path().join("downloaded"))
            .build()
            .unwrap()
    }

    #[test]
    fn malformed_link_makes_no_requests() {
        let tmp = TempDir::new().unwrap();
        let fetcher = ScriptedFetcher::default();

        let err = run_session(
            "http://example.com/file.png",
            true,
            &config_in(&tmp),
            &fetcher,
            &NoopProgressCallback,
        )
        .unwrap_err();

        assert!(matches!(err, ImgSeqError::InvalidLocator { .. }));
        assert!(fetcher.requests.borrow().is_empty());
        assert!(!tmp.path().join("downloaded").exists());
    }

    #[test]
    fn declined_compile_writes_no_document() {
        let tmp = TempDir::new().unwrap();
        let link = "http://host/set/img_000123.png";
        let locator = Locator::parse(link).unwrap();
        let config = config_in(&tmp);

        let out = run_session(
            link,
            false,
            &config,
            &fetcher_with_pngs(&locator, 3),
            &NoopProgressCallback,
        )
        .unwrap();

        assert_eq!(out.acquisition.paths.len(), 3);
        assert!(matches!(out.compile, CompileOutcome::Declined));
        assert!(!document_path(&locator, &config).exists());
    }

    #[test]
    fn accepted_compile_writes_document_next_to_images() {
        let tmp = TempDir::new().unwrap();
        let link = "http://host/set/img_000123.png";
        let locator = Locator::parse(link).unwrap();
        let config = config_in(&tmp);

        let out = run_session(
            link,
            true,
            &config,
            &fetcher_with_pngs(&locator, 2),
            &NoopProgressCallback,
        )
        .unwrap();

        let expected = tmp.path().join("downloaded").join("img").join("img.pdf");
        match out.compile {
            CompileOutcome::Written(doc) => {
                assert_eq!(doc.path, expected);
                assert_eq!(doc.pages.len(), 2);
            }
            other => panic!("expected Written, got {other:?}"),
        }
        assert_eq!(lopdf::Document::load(&expected).unwrap().get_pages().len(), 2);
    }

    #[test]
    fn nothing_to_compile_when_sequence_is_empty() {
        let tmp = TempDir::new().unwrap();
        let out = run_session(
            "http://host/set/img_000001.png",
            true,
            &config_in(&tmp),
            &ScriptedFetcher::default(),
            &NoopProgressCallback,
        )
        .unwrap();
        assert!(matches!(out.compile, CompileOutcome::NothingToCompile));
    }

    #[test]
    fn compile_failure_keeps_downloads() {
        let tmp = TempDir::new().unwrap();
        let link = "http://host/set/img_000001.png";
        let locator = Locator::parse(link).unwrap();
        // Server returns HTML with a 200 for the second image.
        let fetcher = fetcher_with_pngs(&locator, 1).reply(
            &locator.url_for(2),
            Reply::Body(200, b"<html>oops</html>".to_vec()),
        );

        let out = run_session(link, true, &config_in(&tmp), &fetcher, &NoopProgressCallback)
            .unwrap();

        assert_eq!(out.acquisition.paths.len(), 2);
        assert!(out.acquisition.paths.iter().all(|p| p.exists()));
        match out.compile {
            CompileOutcome::Failed(ImgSeqError::Decode { path, .. }) => {
                assert_eq!(path, out.acquisition.paths[1])
            }
            other => panic!("expected Decode failure, got {other:?}"),
        }
    }

    #[test]
    fn transfer_error_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let link = "http://host/set/img_000001.png";
        let locator = Locator::parse(link).unwrap();
        let fetcher = ScriptedFetcher::default().reply(&locator.url_for(1), Reply::ConnectionRefused);

        let err = run_session(link, true, &config_in(&tmp), &fetcher, &NoopProgressCallback)
            .unwrap_err();
        assert!(matches!(err, ImgSeqError::Transfer { .. }));
    }
}
