//! Session list filtering.

use super::model::SessionSummary;

/// Sessions whose name contains `term`, ignoring case. A blank term matches all.
pub fn search_sessions(sessions: &[SessionSummary], term: &str) -> Vec<SessionSummary> {
    filter(sessions, term, false)
}

/// Like [`search_sessions`], restricted to favorites.
pub fn favorite_sessions(sessions: &[SessionSummary], term: &str) -> Vec<SessionSummary> {
    filter(sessions, term, true)
}

fn filter(sessions: &[SessionSummary], term: &str, favorites_only: bool) -> Vec<SessionSummary> {
    let term = term.trim().to_lowercase();
    sessions
        .iter()
        .filter(|s| !favorites_only || s.is_favorite)
        .filter(|s| term.is_empty() || s.name.to_lowercase().contains(&term))
        .cloned()
        .collect()
}
