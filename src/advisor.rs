use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::analytics::{emit, AnalyticsEvent, AnalyticsEventKind, AnalyticsSink};
use crate::config::ShareConfig;
use crate::recommend::{calculate, CalculationError};
use crate::share::{share_id_candidate, ResultStore, ShareRecord, StoreError};
use crate::tree::{next_step, Answer, DecisionTree, Question, TreeRepository, WalkStep};

#[derive(Debug, Error)]
pub enum AdvisorError {
    #[error("decision tree not found: {0}")]
    TreeNotFound(String),
    #[error(transparent)]
    Calculation(#[from] CalculationError),
    #[error("could not allocate a unique share id after {0} attempts")]
    ShareIdExhausted(u32),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("failed fingerprinting tree: {0}")]
    Fingerprint(#[from] serde_json::Error),
}

pub struct Advisor {
    trees: Arc<dyn TreeRepository>,
    store: Arc<dyn ResultStore>,
    sinks: Vec<Arc<dyn AnalyticsSink>>,
    share: ShareConfig,
}

impl Advisor {
    pub fn new(
        trees: Arc<dyn TreeRepository>,
        store: Arc<dyn ResultStore>,
        share: ShareConfig,
    ) -> Self {
        Self {
            trees,
            store,
            sinks: Vec::new(),
            share,
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn AnalyticsSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn tree(&self, tree_id: &str) -> Result<Arc<DecisionTree>, AdvisorError> {
        self.trees
            .get(tree_id)
            .ok_or_else(|| AdvisorError::TreeNotFound(tree_id.to_string()))
    }

    pub async fn start(&self, tree_id: &str) -> Result<Arc<DecisionTree>, AdvisorError> {
        let tree = self.tree(tree_id)?;
        emit(
            &self.sinks,
            AnalyticsEvent::new(AnalyticsEventKind::TreeStarted, tree_id),
        )
        .await;
        Ok(tree)
    }

    pub fn next_question(
        &self,
        tree_id: &str,
        answers: &[Answer],
    ) -> Result<Option<Question>, AdvisorError> {
        let tree = self.tree(tree_id)?;
        let step = next_step(&tree, answers)?;
        Ok(match step {
            WalkStep::Ask(question) => Some(question.clone()),
            WalkStep::Complete => None,
        })
    }

    pub async fn recommend(
        &self,
        tree_id: &str,
        answers: &[Answer],
        metadata: BTreeMap<String, String>,
    ) -> Result<ShareRecord, AdvisorError> {
        let tree = self.tree(tree_id)?;
        let result = match calculate(&tree, answers) {
            Ok(result) => result,
            Err(err) => {
                debug!("recommendation for {tree_id} failed: {err}");
                emit(
                    &self.sinks,
                    AnalyticsEvent::new(AnalyticsEventKind::RecommendationFailed, tree_id)
                        .with_detail(err.code()),
                )
                .await;
                return Err(err.into());
            }
        };
        info!(
            "recommended {} for tree {tree_id} ({} confidence)",
            result.recommendation, result.confidence
        );
        emit(
            &self.sinks,
            AnalyticsEvent::new(AnalyticsEventKind::RecommendationCompleted, tree_id)
                .with_detail(result.recommendation.clone()),
        )
        .await;

        let created_at = Utc::now();
        let max_attempts = self.share.max_attempts.max(1);
        let mut record = ShareRecord {
            share_id: String::new(),
            tree_id: tree.id.clone(),
            tree_fingerprint: tree.fingerprint()?,
            result,
            metadata,
            created_at,
        };
        for attempt in 0..max_attempts {
            record.share_id = share_id_candidate(
                &tree.id,
                answers,
                created_at,
                attempt,
                self.share.id_length,
            );
            match self.store.insert(record.clone()) {
                Ok(()) => {
                    emit(
                        &self.sinks,
                        AnalyticsEvent::new(AnalyticsEventKind::ResultShared, tree_id)
                            .with_detail(record.share_id.clone()),
                    )
                    .await;
                    return Ok(record);
                }
                Err(StoreError::Collision(id)) => {
                    warn!("share id collision on {id}, retrying");
                }
                Err(err) => return Err(err.into()),
            }
        }
        Err(AdvisorError::ShareIdExhausted(max_attempts))
    }

    pub async fn shared(&self, share_id: &str) -> Result<Option<ShareRecord>, AdvisorError> {
        let record = self.store.get(share_id)?;
        if let Some(record) = &record {
            emit(
                &self.sinks,
                AnalyticsEvent::new(AnalyticsEventKind::ResultViewed, record.tree_id.clone())
                    .with_detail(share_id),
            )
            .await;
        }
        Ok(record)
    }
}
