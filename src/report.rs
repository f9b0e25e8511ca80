//! Plain-text rendering of the search state for terminals

use crate::search::SearchState;

/// Shown under the status when a finished search found nothing
pub const NO_MATCHES_MESSAGE: &str = "No PDFs matched your filters.";

/// Render a state as lines of text.
///
/// The variant decides what is shown, so "not searched yet", "searching" and
/// "searched but found nothing" each read differently even though all three
/// have no links.
pub fn render(state: &SearchState) -> Vec<String> {
    match state {
        SearchState::Idle | SearchState::Searching => vec![state.status_message().to_string()],
        SearchState::Succeeded(outcome) if outcome.is_empty() => vec![
            outcome.status_message().to_string(),
            NO_MATCHES_MESSAGE.to_string(),
        ],
        SearchState::Succeeded(outcome) => {
            let mut lines = Vec::with_capacity(outcome.links().len() + 2);
            lines.push(outcome.status_message().to_string());
            lines.push(String::new());
            lines.extend(
                outcome
                    .links()
                    .iter()
                    .enumerate()
                    .map(|(i, link)| format!("{:>3}. {}", i + 1, link)),
            );
            lines
        }
        SearchState::Failed(message) => vec![format!("Error: {}", message)],
    }
}
