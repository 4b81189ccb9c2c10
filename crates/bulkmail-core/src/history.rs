//! Server-side send history.

use bulkmail_api::HistoryEntry;

/// Reorders history as returned by the server (oldest first) to latest first.
#[must_use]
pub fn latest_first(mut entries: Vec<HistoryEntry>) -> Vec<HistoryEntry> {
    entries.reverse();
    entries
}

/// Entries whose recipient or subject contains `query`, ignoring case.
#[must_use]
pub fn filter<'a>(entries: &'a [HistoryEntry], query: &str) -> Vec<&'a HistoryEntry> {
    let query = query.to_lowercase();
    entries
        .iter()
        .filter(|entry| {
            query.is_empty()
                || entry.recruiter_email.to_lowercase().contains(&query)
                || entry.subject.to_lowercase().contains(&query)
        })
        .collect()
}
