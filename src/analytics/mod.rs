pub mod sink;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use sink::{emit, AnalyticsSink, MemorySink, TracingSink};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AnalyticsEventKind {
    TreeStarted,
    RecommendationCompleted,
    RecommendationFailed,
    ResultShared,
    ResultViewed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsEvent {
    pub kind: AnalyticsEventKind,
    pub tree_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl AnalyticsEvent {
    pub fn new(kind: AnalyticsEventKind, tree_id: impl Into<String>) -> Self {
        Self {
            kind,
            tree_id: tree_id.into(),
            detail: None,
            recorded_at: Utc::now(),
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}
