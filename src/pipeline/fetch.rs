//! Transport seam: one blocking GET per sequence index.
//!
//! [`Fetcher`] is the only place the acquisition loop touches the network.
//! [`HttpFetcher`] is the real implementation; tests swap in an in-memory
//! script so the loop can be driven without sockets.

use crate::config::AcquireConfig;
use crate::error::ImgSeqError;
use std::io::Read;
use tracing::debug;

/// Status line plus a streaming body.
///
/// The body is read to completion (or dropped) before the next request,
/// so at most one connection is open at a time.
pub struct Fetched {
    pub status: u16,
    pub body: Box<dyn Read>,
}

impl Fetched {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }
}

/// Issues a single GET. Connection-level failures are
/// [`ImgSeqError::Transfer`]; any HTTP status, including errors, is a
/// successful fetch.
pub trait Fetcher {
    fn get(&self, url: &str) -> Result<Fetched, ImgSeqError>;
}

/// Blocking `reqwest` client with no custom headers, no auth and no retry.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new(config: &AcquireConfig) -> Result<Self, ImgSeqError> {
        // `timeout(None)` disables reqwest's 30 s blocking default.
        let client = reqwest::blocking::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ImgSeqError::Transfer {
                url: String::new(),
                reason: format!("cannot build HTTP client: {e}"),
            })?;
        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    fn get(&self, url: &str) -> Result<Fetched, ImgSeqError> {
        let response = self.client.get(url).send().map_err(|e| {
            let reason = if e.is_timeout() {
                format!("timed out: {e}")
            } else {
                e.to_string()
            };
            ImgSeqError::Transfer {
                url: url.to_string(),
                reason,
            }
        })?;

        let status = response.status().as_u16();
        debug!("GET {} → {}", url, status);

        Ok(Fetched {
            status,
            body: Box::new(response),
        })
    }
}
