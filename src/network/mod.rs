//! HTTP networking module
//!
//! Provides the reqwest-backed [`SearchService`](crate::search::SearchService)
//! that talks to the PDF search endpoint.

mod client;

pub use client::HttpClient;
