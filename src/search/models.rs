//! Search outcome and lifecycle models

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Status shown before the first search
pub const READY_MESSAGE: &str = "Ready to search.";
/// Status shown while a request is in flight
pub const SEARCHING_MESSAGE: &str = "Searching for PDFs...";
/// Status used when the service answers without a message
pub const COMPLETE_MESSAGE: &str = "Search complete.";
/// Status used when an in-flight search is abandoned
pub const CANCELLED_MESSAGE: &str = "Search was cancelled.";

/// Successful body returned by the search service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceReply {
    /// Matching document URLs, best first
    pub links: Vec<String>,
    /// Optional human-readable summary
    #[serde(default)]
    pub message: Option<String>,
}

/// Result of one completed search
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchOutcome {
    links: Vec<String>,
    status_message: String,
    #[serde(with = "duration_ms")]
    elapsed: Duration,
}

impl SearchOutcome {
    /// Build an outcome from a service reply. Blank messages get the default.
    pub fn from_reply(reply: ServiceReply, elapsed: Duration) -> Self {
        let status_message = reply
            .message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| COMPLETE_MESSAGE.to_string());

        Self {
            links: reply.links,
            status_message,
            elapsed,
        }
    }

    pub fn links(&self) -> &[String] {
        &self.links
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    /// Time spent waiting on the service
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

/// Lifecycle of the search form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "result", rename_all = "snake_case")]
pub enum SearchState {
    /// Nothing searched yet
    #[default]
    Idle,
    /// Request in flight
    Searching,
    /// Service answered; links may be empty
    Succeeded(SearchOutcome),
    /// Request failed with a user-facing message
    Failed(String),
}

impl SearchState {
    /// Status line for this state
    pub fn status_message(&self) -> &str {
        match self {
            SearchState::Idle => READY_MESSAGE,
            SearchState::Searching => SEARCHING_MESSAGE,
            SearchState::Succeeded(outcome) => outcome.status_message(),
            SearchState::Failed(message) => message,
        }
    }

    /// Links to display. Empty for every state but a successful one.
    pub fn links(&self) -> &[String] {
        match self {
            SearchState::Succeeded(outcome) => outcome.links(),
            _ => &[],
        }
    }

    pub fn is_searching(&self) -> bool {
        matches!(self, SearchState::Searching)
    }

    /// True once a search has finished, either way
    pub fn is_terminal(&self) -> bool {
        matches!(self, SearchState::Succeeded(_) | SearchState::Failed(_))
    }
}

mod duration_ms {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }
}
