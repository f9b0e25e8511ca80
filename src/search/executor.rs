//! Search execution and lifecycle management

use super::models::{SearchOutcome, SearchState, CANCELLED_MESSAGE};
use super::service::SearchService;
use crate::error::{InputError, ServiceError};
use crate::query::{QueryDescriptor, RawInput, ValidationRules};
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Drives one search at a time against a [`SearchService`].
///
/// The current [`SearchState`] lives in a watch channel: the orchestrator is
/// the only writer, renderers [`subscribe`](Orchestrator::subscribe) to it.
pub struct Orchestrator<S> {
    /// Backend that answers searches
    service: S,
    /// Checks applied before issuing a request
    rules: ValidationRules,
    /// Upper bound on a single search, on top of any transport timeout
    max_duration: Option<Duration>,
    state: watch::Sender<SearchState>,
}

impl<S: SearchService> Orchestrator<S> {
    /// Create an idle orchestrator
    pub fn new(service: S) -> Self {
        let (state, _) = watch::channel(SearchState::Idle);
        Self {
            service,
            rules: ValidationRules::default(),
            max_duration: None,
            state,
        }
    }

    /// Set validation rules
    pub fn with_rules(mut self, rules: ValidationRules) -> Self {
        self.rules = rules;
        self
    }

    /// Bound how long a search may stay in flight
    pub fn with_max_duration(mut self, limit: Duration) -> Self {
        self.max_duration = Some(limit);
        self
    }

    /// Snapshot of the current state
    pub fn state(&self) -> SearchState {
        self.state.borrow().clone()
    }

    /// Receive every state transition
    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state.subscribe()
    }

    /// Whether a new search may be submitted right now
    pub fn can_submit(&self, raw: &RawInput) -> bool {
        !raw.is_blank() && !self.state.borrow().is_searching()
    }

    /// Run a search for the given form input and return the resulting state.
    ///
    /// Blank text and submissions made while another search is in flight
    /// leave the state untouched and issue no request.
    pub async fn search(&self, raw: &RawInput) -> SearchState {
        let descriptor = match self.rules.check(raw) {
            Ok(descriptor) => descriptor,
            Err(InputError::EmptyText) => {
                debug!("Ignoring search with blank text");
                return self.state();
            }
            Err(err) => {
                warn!("Rejected search input: {}", err);
                let failed = SearchState::Failed(err.to_string());
                if !self.replace_unless_searching(failed.clone()) {
                    return self.state();
                }
                return failed;
            }
        };

        let Some(in_flight) = InFlight::begin(&self.state) else {
            debug!("Search already in flight, ignoring submission");
            return self.state();
        };

        let next = self.run(&descriptor).await;
        in_flight.finish(next.clone());
        next
    }

    async fn run(&self, descriptor: &QueryDescriptor) -> SearchState {
        info!(
            "Searching for '{}' (results: {}, pages: {}..{})",
            descriptor.text,
            descriptor.result_count,
            descriptor.min_pages,
            descriptor
                .max_pages
                .map(|max| max.to_string())
                .unwrap_or_default()
        );

        let start = Instant::now();
        let result = match self.max_duration {
            Some(limit) => match timeout(limit, self.service.search(descriptor)).await {
                Ok(result) => result,
                Err(_) => Err(ServiceError::Timeout),
            },
            None => self.service.search(descriptor).await,
        };
        let elapsed = start.elapsed();

        match result {
            Ok(reply) => {
                let outcome = SearchOutcome::from_reply(reply, elapsed);
                info!(
                    "Search returned {} links in {:?}",
                    outcome.links().len(),
                    elapsed
                );
                SearchState::Succeeded(outcome)
            }
            Err(err) => {
                warn!("Search failed after {:?}: {}", elapsed, err);
                SearchState::Failed(err.user_message())
            }
        }
    }

    fn replace_unless_searching(&self, next: SearchState) -> bool {
        self.state.send_if_modified(move |state| {
            if state.is_searching() {
                return false;
            }
            *state = next;
            true
        })
    }
}

/// Marks the state as searching for as long as it lives.
///
/// Dropping it without [`finish`](InFlight::finish) (the search future was
/// cancelled) resolves the state to a failure so it never stays searching.
struct InFlight<'a> {
    state: &'a watch::Sender<SearchState>,
    finished: bool,
}

impl<'a> InFlight<'a> {
    /// Atomically move to searching, unless a search is already running
    fn begin(state: &'a watch::Sender<SearchState>) -> Option<Self> {
        let started = state.send_if_modified(|current| {
            if current.is_searching() {
                return false;
            }
            *current = SearchState::Searching;
            true
        });

        started.then_some(Self {
            state,
            finished: false,
        })
    }

    fn finish(mut self, next: SearchState) {
        self.state.send_replace(next);
        self.finished = true;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.finished {
            warn!("Search dropped while in flight");
            self.state
                .send_replace(SearchState::Failed(CANCELLED_MESSAGE.to_string()));
        }
    }
}
