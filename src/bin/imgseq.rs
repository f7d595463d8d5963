//! CLI binary for imgseq-pdf.
//!
//! Takes no flags: it asks for the link and the compile choice, then prints
//! one line per saved image. Defaults can be changed through `IMGSEQ_*`
//! environment variables; `RUST_LOG` controls diagnostic logging on stderr.

use anyhow::{Context, Result};
use imgseq_pdf::{
    prompts, run_session, AcquireConfig, CompileOutcome, HttpFetcher, ImgSeqError,
    ProgressCallback, StopReason,
};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Mutex;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Spinner on stdout while requests are in flight, with a permanent line
/// written above it for every saved image and for the stop reason.
///
/// The spinner is hidden when stdout is not a terminal; the result lines
/// are written either way.
struct CliProgressCallback {
    bar: ProgressBar,
    out: Mutex<Box<dyn Write + Send>>,
}

impl CliProgressCallback {
    fn new() -> Self {
        Self::with_output(ProgressDrawTarget::stdout(), Box::new(io::stdout()))
    }

    fn with_output(target: ProgressDrawTarget, out: Box<dyn Write + Send>) -> Self {
        let bar = ProgressBar::with_draw_target(None, target);
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  ⏱ {elapsed}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Downloading");
        bar.enable_steady_tick(Duration::from_millis(80));
        Self {
            bar,
            out: Mutex::new(out),
        }
    }

    fn line(&self, text: String) {
        self.bar.suspend(|| {
            if let Ok(mut out) = self.out.lock() {
                let _ = writeln!(out, "{text}");
                let _ = out.flush();
            }
        });
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressCallback for CliProgressCallback {
    fn on_acquire_start(&self, directory: &Path) {
        self.line(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Saving into {}", directory.display()))
        ));
    }

    fn on_request(&self, index: u64, _url: &str) {
        self.bar.set_message(format!("image {index}"));
    }

    fn on_image_saved(&self, _index: u64, path: &Path, bytes: u64) {
        self.line(format!(
            "  {} Saved: {}  {}",
            green("✓"),
            path.display(),
            dim(&format!("{:.1} KiB", bytes as f64 / 1024.0)),
        ));
    }

    fn on_acquire_complete(&self, saved: usize, stop: &StopReason) {
        let line = match stop {
            StopReason::NotFound { .. } => {
                format!("{} No more images to download ({saved} saved).", green("✔"))
            }
            StopReason::HttpStatus(w) => format!("{} {w} ({saved} saved).", cyan("⚠")),
            StopReason::LimitReached { limit } => {
                format!("{} Stopped at the limit of {limit} images.", cyan("⚠"))
            }
        };
        self.line(line);
        self.bar.set_prefix("Binding");
        self.bar.set_message("");
    }

    fn on_page_added(&self, page_num: usize, total_pages: usize) {
        self.bar.set_message(format!("page {page_num}/{total_pages}"));
    }
}

/// Report a fatal session error once, on stdout next to the progress lines.
fn report_fatal(out: &mut impl Write, e: &ImgSeqError) -> ExitCode {
    let _ = writeln!(out, "{} Download aborted: {e}", red("✘"));
    ExitCode::FAILURE
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let config = AcquireConfig::from_env().context("Invalid IMGSEQ_* environment")?;

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();
    let link = prompts::read_locator(&mut input, &mut output).context("Failed to read the link")?;
    let compile = prompts::read_compile_choice(&mut input, &mut output)
        .context("Failed to read the compile choice")?;

    let fetcher = HttpFetcher::new(&config).context("Failed to set up HTTP")?;
    let progress = CliProgressCallback::new();
    let result = run_session(&link, compile, &config, &fetcher, &progress);
    progress.finish();

    let session = match result {
        Ok(s) => s,
        Err(e) => return Ok(report_fatal(&mut io::stdout(), &e)),
    };

    println!("\n---\n");
    match session.compile {
        CompileOutcome::Declined => println!("The images were not bound into a PDF."),
        CompileOutcome::NothingToCompile => {
            println!("{} No images were downloaded, nothing to bind.", cyan("⚠"))
        }
        CompileOutcome::Written(doc) => println!(
            "{} PDF saved as: {}  {}",
            green("✔"),
            bold(&doc.path.display().to_string()),
            dim(&format!("{} pages", doc.pages.len())),
        ),
        CompileOutcome::Failed(e) => println!("{} Failed to create the PDF: {e}", red("✘")),
    }

    Ok(ExitCode::SUCCESS)
}
