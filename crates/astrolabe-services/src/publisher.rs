// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Where ingress shards send what each event produced.

use astrolabe_radar::LifecycleEvent;
use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::info;

use crate::errors::{ServiceError, ServiceResult};
use crate::pipeline::DecisionOutcome;

/// Everything one inbound event (or one sweep of one shard) produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngressReport {
    pub lifecycle_events: Vec<LifecycleEvent>,
    pub outcomes: Vec<DecisionOutcome>,
}

impl IngressReport {
    pub fn is_empty(&self) -> bool {
        self.lifecycle_events.is_empty() && self.outcomes.is_empty()
    }

    pub(crate) fn extend(&mut self, other: IngressReport) {
        self.lifecycle_events.extend(other.lifecycle_events);
        self.outcomes.extend(other.outcomes);
    }
}

/// Downstream consumer of ingress reports. Only non-empty reports are published.
#[async_trait]
pub trait OutcomePublisher: Send + Sync {
    async fn publish(&self, report: &IngressReport) -> ServiceResult<()>;
}

/// Forwards reports into a bounded channel.
pub struct ChannelPublisher {
    tx: mpsc::Sender<IngressReport>,
}

impl ChannelPublisher {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<IngressReport>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }
}

#[async_trait]
impl OutcomePublisher for ChannelPublisher {
    async fn publish(&self, report: &IngressReport) -> ServiceResult<()> {
        self.tx
            .send(report.clone())
            .await
            .map_err(|_| ServiceError::Closed("report receiver dropped".to_string()))
    }
}

/// Writes every report to the log and nowhere else.
#[derive(Debug, Default)]
pub struct TracingPublisher;

#[async_trait]
impl OutcomePublisher for TracingPublisher {
    async fn publish(&self, report: &IngressReport) -> ServiceResult<()> {
        for event in &report.lifecycle_events {
            info!(
                target: "astrolabe-services",
                "Track '{}' {} (incident {}, suppressed: {})",
                event.track_id,
                event.transition,
                event.incident_id,
                event.alert_suppressed
            );
        }
        for outcome in &report.outcomes {
            info!(target: "astrolabe-services", "Decision: {:?}", outcome);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_publisher_delivers_and_reports_closed() {
        let (publisher, mut rx) = ChannelPublisher::new(4);
        let report = IngressReport::default();
        publisher.publish(&report).await.unwrap();
        assert_eq!(rx.recv().await, Some(report.clone()));

        drop(rx);
        assert!(matches!(
            publisher.publish(&report).await,
            Err(ServiceError::Closed(_))
        ));
    }
}
