//! Configuration for the acquisition step.
//!
//! All knobs live in [`AcquireConfig`], built through
//! [`AcquireConfigBuilder`] or read from the environment with
//! [`AcquireConfig::from_env`]. The binary takes no flags; the environment
//! is the only way to change the defaults there.

use crate::error::ImgSeqError;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable overriding [`AcquireConfig::output_root`].
pub const ENV_OUTPUT_DIR: &str = "IMGSEQ_OUTPUT_DIR";
/// Environment variable overriding [`AcquireConfig::start_index`].
pub const ENV_START_INDEX: &str = "IMGSEQ_START_INDEX";
/// Environment variable overriding [`AcquireConfig::request_timeout_secs`].
pub const ENV_TIMEOUT_SECS: &str = "IMGSEQ_TIMEOUT_SECS";
/// Environment variable overriding [`AcquireConfig::max_images`].
pub const ENV_MAX_IMAGES: &str = "IMGSEQ_MAX_IMAGES";

/// Settings for one acquisition run.
///
/// # Example
/// ```rust
/// use imgseq_pdf::AcquireConfig;
///
/// let config = AcquireConfig::builder()
///     .output_root("scans")
///     .max_images(50)
///     .build()
///     .unwrap();
/// assert_eq!(config.start_index, 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquireConfig {
    /// Root under which `<folder>/` is created. Default: `downloaded`.
    pub output_root: PathBuf,

    /// First sequence index requested. Default: 1.
    pub start_index: u64,

    /// Per-request timeout in seconds. Default: `None`, requests block
    /// until the server answers or the connection fails.
    pub request_timeout_secs: Option<u64>,

    /// Stop after this many saved images even if the server has more.
    /// Default: `None` (only a `404` ends the sequence).
    pub max_images: Option<usize>,
}

impl Default for AcquireConfig {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from("downloaded"),
            start_index: 1,
            request_timeout_secs: None,
            max_images: None,
        }
    }
}

impl AcquireConfig {
    /// Create a new builder seeded with the defaults.
    pub fn builder() -> AcquireConfigBuilder {
        AcquireConfigBuilder {
            config: Self::default(),
        }
    }

    /// Read overrides from `IMGSEQ_*` environment variables.
    pub fn from_env() -> Result<Self, ImgSeqError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ImgSeqError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Self::builder();

        if let Some(dir) = non_empty(lookup(ENV_OUTPUT_DIR)) {
            builder = builder.output_root(dir);
        }
        if let Some(v) = non_empty(lookup(ENV_START_INDEX)) {
            builder = builder.start_index(parse_number(ENV_START_INDEX, &v)?);
        }
        if let Some(v) = non_empty(lookup(ENV_TIMEOUT_SECS)) {
            builder = builder.request_timeout_secs(parse_number(ENV_TIMEOUT_SECS, &v)?);
        }
        if let Some(v) = non_empty(lookup(ENV_MAX_IMAGES)) {
            builder = builder.max_images(parse_number(ENV_MAX_IMAGES, &v)?);
        }

        builder.build()
    }

    /// Request timeout as a `Duration`, if one is configured.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ImgSeqError> {
    value
        .parse()
        .map_err(|_| ImgSeqError::InvalidConfig(format!("{key} must be a number, got '{value}'")))
}

/// Builder for [`AcquireConfig`].
#[derive(Debug)]
pub struct AcquireConfigBuilder {
    config: AcquireConfig,
}

impl AcquireConfigBuilder {
    pub fn output_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.output_root = root.into();
        self
    }

    pub fn start_index(mut self, index: u64) -> Self {
        self.config.start_index = index;
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = Some(secs);
        self
    }

    pub fn max_images(mut self, n: usize) -> Self {
        self.config.max_images = Some(n);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<AcquireConfig, ImgSeqError> {
        let c = &self.config;
        if c.start_index == 0 {
            return Err(ImgSeqError::InvalidConfig(
                "start index must be ≥ 1".into(),
            ));
        }
        if c.max_images == Some(0) {
            return Err(ImgSeqError::InvalidConfig(
                "max images must be ≥ 1 when set".into(),
            ));
        }
        if c.request_timeout_secs == Some(0) {
            return Err(ImgSeqError::InvalidConfig(
                "request timeout must be ≥ 1 second when set".into(),
            ));
        }
        if c.output_root.as_os_str().is_empty() {
            return Err(ImgSeqError::InvalidConfig(
                "output root must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}
