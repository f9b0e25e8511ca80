//! Query building module
//!
//! Turns the raw search form (free text plus page-count fields typed by the
//! user) into a [`QueryDescriptor`], the normalized request sent to the search
//! service. Everything here is pure so it can be tested without a network.

use crate::error::InputError;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Result count used when the user never touches the selector
pub const DEFAULT_RESULT_COUNT: u32 = 10;
/// Smallest selectable result count
pub const MIN_RESULT_COUNT: u32 = 10;
/// Largest selectable result count
pub const MAX_RESULT_COUNT: u32 = 100;
/// Result counts move in steps of this size
pub const RESULT_COUNT_STEP: u32 = 10;

/// Whether `count` is one of the values the result selector offers
pub fn is_valid_result_count(count: u32) -> bool {
    (MIN_RESULT_COUNT..=MAX_RESULT_COUNT).contains(&count) && count % RESULT_COUNT_STEP == 0
}

/// Parse a result count typed by the user, accepting only selectable values
pub fn parse_result_count(raw: &str) -> Result<u32, InputError> {
    let trimmed = raw.trim();
    match trimmed.parse() {
        Ok(count) if is_valid_result_count(count) => Ok(count),
        _ => Err(InputError::InvalidResultCount(trimmed.to_string())),
    }
}

/// Search form fields exactly as the user entered them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawInput {
    /// Free-text keywords
    pub text: String,
    /// Desired number of results, already constrained by the selector
    pub result_count: u32,
    /// Minimum page count field
    pub min_pages: String,
    /// Maximum page count field, empty for no limit
    pub max_pages: String,
}

impl RawInput {
    /// Create form input with untouched page fields
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            result_count: DEFAULT_RESULT_COUNT,
            min_pages: "0".to_string(),
            max_pages: String::new(),
        }
    }

    /// Set result count
    pub fn with_result_count(mut self, count: u32) -> Self {
        self.result_count = count;
        self
    }

    /// Set the minimum pages field
    pub fn with_min_pages(mut self, raw: impl Into<String>) -> Self {
        self.min_pages = raw.into();
        self
    }

    /// Set the maximum pages field
    pub fn with_max_pages(mut self, raw: impl Into<String>) -> Self {
        self.max_pages = raw.into();
        self
    }

    /// Check if the search text is blank
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Normalized search request.
///
/// Serializes directly into the service's query string: `max_pages` is left
/// out entirely when unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryDescriptor {
    /// Search text as typed
    #[serde(rename = "query")]
    pub text: String,
    /// Desired result count
    #[serde(rename = "num_results")]
    pub result_count: u32,
    /// Minimum page count filter
    pub min_pages: u32,
    /// Maximum page count filter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_pages: Option<u32>,
}

impl QueryDescriptor {
    /// Build a descriptor from form input, coercing the page fields.
    ///
    /// Only blank text is rejected here; the result count is passed through.
    pub fn from_raw(raw: &RawInput) -> Result<Self, InputError> {
        if raw.is_blank() {
            return Err(InputError::EmptyText);
        }

        Ok(Self {
            text: raw.text.clone(),
            result_count: raw.result_count,
            min_pages: parse_min_pages(&raw.min_pages),
            max_pages: parse_max_pages(&raw.max_pages),
        })
    }

    /// True when a maximum is set below the minimum
    pub fn has_inverted_page_range(&self) -> bool {
        self.max_pages.is_some_and(|max| max < self.min_pages)
    }
}

/// Read the integer at the start of a page field, the way browsers read
/// number inputs: "2.5" is 2, "40 pages" is 40. Values too large for a page
/// count saturate. `None` when the field does not start with a digit.
fn leading_integer(raw: &str) -> Option<u32> {
    let trimmed = raw.trim();
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let digits_end = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    let digits = &unsigned[..digits_end];
    if digits.is_empty() {
        return None;
    }
    Some(digits.parse().unwrap_or(u32::MAX))
}

/// Parse the minimum pages field. Anything without a leading non-negative
/// integer counts as zero.
pub fn parse_min_pages(raw: &str) -> u32 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0;
    }
    match leading_integer(trimmed) {
        Some(pages) => pages,
        None => {
            warn!("Ignoring invalid minimum page count '{}'", trimmed);
            0
        }
    }
}

/// Parse the maximum pages field. Blank means no limit.
pub fn parse_max_pages(raw: &str) -> Option<u32> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let pages = leading_integer(trimmed);
    if pages.is_none() {
        warn!("Ignoring invalid maximum page count '{}'", trimmed);
    }
    pages
}

/// Client-side checks applied before a request is issued
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationRules {
    /// Reject `max_pages < min_pages` locally instead of leaving it to the service
    pub reject_inverted_page_range: bool,
}

impl ValidationRules {
    /// Build a descriptor and apply the configured rules
    pub fn check(&self, raw: &RawInput) -> Result<QueryDescriptor, InputError> {
        let descriptor = QueryDescriptor::from_raw(raw)?;

        if self.reject_inverted_page_range && descriptor.has_inverted_page_range() {
            return Err(InputError::InvertedPageRange {
                min: descriptor.min_pages,
                max: descriptor.max_pages.unwrap_or_default(),
            });
        }

        Ok(descriptor)
    }
}

impl From<&crate::config::SearchSettings> for ValidationRules {
    fn from(settings: &crate::config::SearchSettings) -> Self {
        Self {
            reject_inverted_page_range: settings.reject_inverted_page_range,
        }
    }
}
