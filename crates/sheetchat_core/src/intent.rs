//! Utterance classification.
//!
//! Keywords are checked in a fixed priority order regardless of where they
//! appear in the text: "plot", then "show", then "download". Anything else is
//! a plain question.

use tracing::debug;

use crate::types::QueryIntent;

const PRIORITY: [(&str, QueryIntent); 3] = [
    ("plot", QueryIntent::Plot),
    ("show", QueryIntent::Show),
    ("download", QueryIntent::Download),
];

/// Classify an utterance into a query intent.
pub fn classify(utterance: &str) -> QueryIntent {
    let lower = utterance.to_lowercase();
    let intent = PRIORITY
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, intent)| *intent)
        .unwrap_or(QueryIntent::Answer);

    debug!(?intent, "Classified utterance");
    intent
}
