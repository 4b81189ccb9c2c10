//! Read-only views over recorded send outcomes.

use serde::Serialize;

use crate::send::{BatchId, SendOutcome};

/// Success and failure counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResultSummary {
    /// Outcomes with status success.
    pub success: usize,
    /// Outcomes with status failed.
    pub failed: usize,
}

impl ResultSummary {
    /// Total number of outcomes.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.success + self.failed
    }
}

/// Outcomes matching `query`, in the order they were recorded.
///
/// Matching is a case-insensitive substring test against the recipient, the
/// error detail and the status label. The query is not trimmed; only an
/// empty query matches everything.
#[must_use]
pub fn filter<'a>(results: &'a [SendOutcome], query: &str) -> Vec<&'a SendOutcome> {
    let query = query.to_lowercase();
    if query.is_empty() {
        return results.iter().collect();
    }

    results
        .iter()
        .filter(|outcome| {
            outcome.recipient.to_lowercase().contains(&query)
                || outcome
                    .error
                    .as_deref()
                    .is_some_and(|e| e.to_lowercase().contains(&query))
                || outcome.status.as_str().contains(&query)
        })
        .collect()
}

/// Counts successes and failures.
#[must_use]
pub fn summarize(results: &[SendOutcome]) -> ResultSummary {
    results
        .iter()
        .fold(ResultSummary::default(), |mut summary, outcome| {
            if outcome.is_success() {
                summary.success += 1;
            } else {
                summary.failed += 1;
            }
            summary
        })
}

/// Distinct batch ids, in first-seen order.
#[must_use]
pub fn batches(results: &[SendOutcome]) -> Vec<&BatchId> {
    let mut seen: Vec<&BatchId> = Vec::new();
    for id in results.iter().filter_map(|o| o.batch_id.as_ref()) {
        if !seen.contains(&id) {
            seen.push(id);
        }
    }
    seen
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample() -> Vec<SendOutcome> {
        let first = BatchId::from("batch-1");
        let second = BatchId::from("batch-2");
        vec![
            SendOutcome::success("alice@example.com", Some(first.clone())),
            SendOutcome::failure("bob@corp.io", "Mailbox FULL", Some(first)),
            SendOutcome::success("carol@corp.io", Some(second)),
        ]
    }

    #[test]
    fn empty_query_returns_all_in_order() {
        let results = sample();
        let all = filter(&results, "");
        assert_eq!(all.len(), 3);
        assert_eq!(all[2].recipient, "carol@corp.io");
    }

    #[test]
    fn whitespace_is_part_of_the_query() {
        let results = sample();
        assert!(filter(&results, "  ").is_empty());
        assert!(filter(&results, " bob ").is_empty());
        assert_eq!(filter(&results, "mailbox full").len(), 1);
    }

    #[test]
    fn matches_recipient_case_insensitively() {
        let results = sample();
        let hits = filter(&results, "CORP");
        let names: Vec<&str> = hits.iter().map(|o| o.recipient.as_str()).collect();
        assert_eq!(names, vec!["bob@corp.io", "carol@corp.io"]);
    }

    #[test]
    fn matches_error_and_status() {
        let results = sample();
        assert_eq!(filter(&results, "mailbox full").len(), 1);
        assert_eq!(filter(&results, "success").len(), 2);
        assert_eq!(filter(&results, "failed")[0].recipient, "bob@corp.io");
    }

    #[test]
    fn no_match_is_empty_and_leaves_input() {
        let results = sample();
        let before = results.clone();
        assert!(filter(&results, "nobody").is_empty());
        assert_eq!(results, before);
    }

    #[test]
    fn summary_counts() {
        let summary = summarize(&sample());
        assert_eq!(summary, ResultSummary { success: 2, failed: 1 });
        assert_eq!(summary.total(), 3);
        assert_eq!(summarize(&[]), ResultSummary::default());
    }

    #[test]
    fn batches_first_seen() {
        let mut results = sample();
        results.push(SendOutcome::success("dan@x.com", None));
        let ids: Vec<&str> = batches(&results).iter().map(|b| b.as_str()).collect();
        assert_eq!(ids, vec!["batch-1", "batch-2"]);
    }
}
