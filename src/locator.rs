//! Source locator parsing: split the user's link into a reusable template.
//!
//! The user pastes the link to *any* image of a set, e.g.
//! `http://host/set/img_000123.jpg`. Only the parts around the six digits
//! matter: the base path, the prefix and the extension are reused for every
//! request and every local file name. The digits themselves are discarded;
//! the sequence always starts from the configured start index.

use crate::error::ImgSeqError;
use once_cell::sync::Lazy;
use regex::Regex;

/// Width of the zero-padded sequence number.
pub const SEQUENCE_WIDTH: usize = 6;

static RE_LOCATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.*/)([^/]*?)(\d{6})(\.[a-z]+)$").unwrap());

/// A parsed `<base_path><prefix><6 digits><extension>` template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    base_path: String,
    prefix: String,
    extension: String,
}

impl Locator {
    /// Parse a user-supplied link. No I/O happens here.
    ///
    /// Surrounding whitespace is ignored. Anything that does not end in
    /// `/<prefix><6 digits>.<lowercase ext>` is rejected.
    pub fn parse(input: &str) -> Result<Self, ImgSeqError> {
        let trimmed = input.trim();
        let caps = RE_LOCATOR
            .captures(trimmed)
            .ok_or_else(|| ImgSeqError::InvalidLocator {
                input: trimmed.to_string(),
            })?;

        Ok(Self {
            base_path: caps[1].to_string(),
            prefix: caps[2].to_string(),
            extension: caps[4].to_string(),
        })
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Extension including the leading dot, e.g. `.jpg`.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Directory / document name: the prefix minus one trailing `_`.
    pub fn folder_name(&self) -> &str {
        self.prefix.strip_suffix('_').unwrap_or(&self.prefix)
    }

    /// Local file name for `index`, e.g. `img_000004.jpg`.
    pub fn file_name_for(&self, index: u64) -> String {
        format!(
            "{}{:0width$}{}",
            self.prefix,
            index,
            self.extension,
            width = SEQUENCE_WIDTH
        )
    }

    /// Remote URL for `index`.
    pub fn url_for(&self, index: u64) -> String {
        format!("{}{}", self.base_path, self.file_name_for(index))
    }
}
