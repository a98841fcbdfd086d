pub mod store;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::recommend::RecommendationResult;
use crate::tree::Answer;

pub use store::{InMemoryResultStore, ResultStore, StoreError};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShareRecord {
    pub share_id: String,
    pub tree_id: String,
    pub tree_fingerprint: String,
    pub result: RecommendationResult,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    pub created_at: DateTime<Utc>,
}

pub fn share_id_candidate(
    tree_id: &str,
    answers: &[Answer],
    created_at: DateTime<Utc>,
    attempt: u32,
    length: usize,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(tree_id.as_bytes());
    for answer in answers {
        hasher.update(b"\0");
        hasher.update(answer.to_string().as_bytes());
    }
    hasher.update(
        created_at
            .timestamp_nanos_opt()
            .unwrap_or_else(|| created_at.timestamp_micros())
            .to_be_bytes(),
    );
    hasher.update(attempt.to_be_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest.chars().take(length.clamp(4, digest.len())).collect()
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::share_id_candidate;
    use crate::tree::Answer;

    #[test]
    fn candidates_are_deterministic_and_vary_by_attempt() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).single().expect("timestamp");
        let answers = vec![Answer::new("q1", "opt1")];
        let first = share_id_candidate("tree", &answers, at, 0, 10);
        assert_eq!(first, share_id_candidate("tree", &answers, at, 0, 10));
        assert_ne!(first, share_id_candidate("tree", &answers, at, 1, 10));
        assert_eq!(first.len(), 10);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn length_is_clamped() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).single().expect("timestamp");
        assert_eq!(share_id_candidate("t", &[], at, 0, 1).len(), 4);
        assert_eq!(share_id_candidate("t", &[], at, 0, 500).len(), 64);
    }
}
