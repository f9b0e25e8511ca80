//! pdf-search: client for a page-count-aware PDF search service
//!
//! Turns free-text keywords and page-count limits into a single request to
//! the search service and tracks the result as an explicit search state.

pub mod config;
pub mod error;
pub mod network;
pub mod query;
pub mod report;
pub mod search;

pub use config::Settings;
pub use error::{InputError, ServiceError};
pub use network::HttpClient;
pub use query::{QueryDescriptor, RawInput, ValidationRules};
pub use search::{Orchestrator, SearchOutcome, SearchService, SearchState};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
