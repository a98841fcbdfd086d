use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tracing::{info, warn};

use crate::analytics::{AnalyticsEvent, AnalyticsEventKind};

#[async_trait]
pub trait AnalyticsSink: Send + Sync {
    async fn record(&self, event: &AnalyticsEvent) -> Result<()>;
}

pub struct TracingSink;

#[async_trait]
impl AnalyticsSink for TracingSink {
    async fn record(&self, event: &AnalyticsEvent) -> Result<()> {
        info!(
            kind = ?event.kind,
            tree = %event.tree_id,
            detail = event.detail.as_deref().unwrap_or(""),
            "analytics event"
        );
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<AnalyticsEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AnalyticsEvent> {
        self.events
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    pub fn counts(&self) -> BTreeMap<AnalyticsEventKind, usize> {
        let mut counts = BTreeMap::new();
        for event in self.events() {
            *counts.entry(event.kind).or_insert(0) += 1;
        }
        counts
    }
}

#[async_trait]
impl AnalyticsSink for MemorySink {
    async fn record(&self, event: &AnalyticsEvent) -> Result<()> {
        self.events
            .lock()
            .map_err(|_| anyhow!("analytics buffer mutex poisoned"))?
            .push(event.clone());
        Ok(())
    }
}

pub async fn emit(sinks: &[Arc<dyn AnalyticsSink>], event: AnalyticsEvent) {
    for sink in sinks {
        if let Err(err) = sink.record(&event).await {
            warn!("failed recording analytics event {:?}: {err}", event.kind);
        }
    }
}
