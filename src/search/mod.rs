//! Search orchestration module
//!
//! Owns the search lifecycle: validates form input, issues a single request
//! to the search service and maps the answer into a [`SearchState`].

mod executor;
mod models;
mod service;

pub use executor::Orchestrator;
pub use models::*;
pub use service::SearchService;
