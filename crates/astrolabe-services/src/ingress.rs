// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Async event ingestion boundary.

Raw messages are decoded and validated on the caller's task, then routed by
entity key (track or subsystem id) to one of N shard workers. A key always
maps to the same shard, and each shard drains its bounded queue in order, so
events for one entity are applied strictly in arrival order. Every track's
lifecycle lives on exactly one shard.
*/

use std::hash::BuildHasher;
use std::sync::Arc;

use astrolabe_config::{IngressConfig, IngressEncoding, RuntimeConfig};
use astrolabe_observability::failure_tags;
use astrolabe_radar::{Detection, LifecycleEvent, RadarLifecycle};
use astrolabe_serialization::{EventCodec, WireEncoding};
use astrolabe_structures::{EventKind, EventTarget, InboundEvent, NowMs};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::errors::{ServiceError, ServiceResult};
use crate::pipeline::DecisionPipeline;
use crate::publisher::{IngressReport, OutcomePublisher};

type Reply = oneshot::Sender<ServiceResult<IngressReport>>;

enum ShardCommand {
    Event {
        event: InboundEvent,
        reply: Option<Reply>,
    },
    Sweep {
        now: NowMs,
        reply: Option<Reply>,
    },
}

pub struct EventIngress;

impl EventIngress {
    /// Start `config.shards` workers on the current tokio runtime.
    pub fn spawn(
        config: &IngressConfig,
        runtime: RuntimeConfig,
        pipeline: Arc<DecisionPipeline>,
        publisher: Arc<dyn OutcomePublisher>,
    ) -> ServiceResult<IngressHandle> {
        if config.shards == 0 || config.channel_capacity == 0 {
            return Err(ServiceError::Load(
                "ingress needs at least one shard with a non-zero queue".to_string(),
            ));
        }

        let mut senders = Vec::with_capacity(config.shards);
        let mut workers = Vec::with_capacity(config.shards);
        for index in 0..config.shards {
            let (tx, rx) = mpsc::channel(config.channel_capacity);
            let shard = Shard {
                index,
                lifecycle: RadarLifecycle::new(runtime)?,
                pipeline: Arc::clone(&pipeline),
                publisher: Arc::clone(&publisher),
            };
            workers.push(tokio::spawn(shard.run(rx)));
            senders.push(tx);
        }

        let codec = match config.encoding {
            IngressEncoding::Auto => None,
            IngressEncoding::StructuredRecord => Some(WireEncoding::StructuredRecord.codec()),
            IngressEncoding::BinaryProtocol => Some(WireEncoding::BinaryProtocol.codec()),
        };

        info!(
            target: "astrolabe-services",
            "Event ingress started with {} shards (queue {}, encoding {:?})",
            config.shards,
            config.channel_capacity,
            config.encoding
        );
        Ok(IngressHandle {
            senders,
            workers,
            codec,
            router: ahash::RandomState::new(),
        })
    }
}

/// Submission side of a running ingress.
pub struct IngressHandle {
    senders: Vec<mpsc::Sender<ShardCommand>>,
    workers: Vec<JoinHandle<()>>,
    codec: Option<Box<dyn EventCodec>>,
    router: ahash::RandomState,
}

impl IngressHandle {
    pub fn shard_count(&self) -> usize {
        self.senders.len()
    }

    /// Shard that owns `entity_key`.
    pub fn shard_for(&self, entity_key: &str) -> usize {
        (BuildHasher::hash_one(&self.router, entity_key) % self.senders.len() as u64) as usize
    }

    /// Decode and enqueue one raw message. Returns once it is queued.
    ///
    /// Malformed messages are rejected here and never reach a shard.
    pub async fn submit(&self, bytes: &[u8]) -> ServiceResult<()> {
        let event = self.decode(bytes)?;
        self.enqueue(event, None).await
    }

    /// Decode, enqueue and wait for the report of one raw message.
    pub async fn process(&self, bytes: &[u8]) -> ServiceResult<IngressReport> {
        let event = self.decode(bytes)?;
        let (reply, rx) = oneshot::channel();
        self.enqueue(event, Some(reply)).await?;
        rx.await
            .map_err(|_| ServiceError::Closed("shard dropped the reply".to_string()))?
    }

    /// Re-evaluate every track's timers at `now` on every shard.
    pub async fn sweep(&self, now: NowMs) -> ServiceResult<IngressReport> {
        let mut pending = Vec::with_capacity(self.senders.len());
        for (index, sender) in self.senders.iter().enumerate() {
            let (reply, rx) = oneshot::channel();
            sender
                .send(ShardCommand::Sweep {
                    now,
                    reply: Some(reply),
                })
                .await
                .map_err(|_| shard_closed(index))?;
            pending.push(rx);
        }

        let mut combined = IngressReport::default();
        for rx in pending {
            let report = rx
                .await
                .map_err(|_| ServiceError::Closed("shard dropped the reply".to_string()))??;
            combined.extend(report);
        }
        Ok(combined)
    }

    /// Close every shard queue and wait for the workers to drain and exit.
    pub async fn shutdown(self) -> ServiceResult<()> {
        let Self {
            senders, workers, ..
        } = self;
        drop(senders);

        let mut failures = 0;
        for (index, worker) in workers.into_iter().enumerate() {
            if let Err(err) = worker.await {
                failures += 1;
                error!(
                    target: "astrolabe-services",
                    "{} Shard {} did not exit cleanly: {}",
                    failure_tags::INGRESS_SHUTDOWN_FAILED,
                    index,
                    err
                );
            }
        }
        if failures > 0 {
            return Err(ServiceError::Internal(format!(
                "{} ingress shard(s) failed during shutdown",
                failures
            )));
        }
        info!(target: "astrolabe-services", "Event ingress stopped");
        Ok(())
    }

    fn decode(&self, bytes: &[u8]) -> ServiceResult<InboundEvent> {
        let detected;
        let codec: &dyn EventCodec = match &self.codec {
            Some(codec) => codec.as_ref(),
            None => {
                detected = WireEncoding::detect(bytes)?.codec();
                detected.as_ref()
            }
        };
        let event = codec.decode_event(bytes)?;
        event.validate()?;
        Ok(event)
    }

    async fn enqueue(&self, event: InboundEvent, reply: Option<Reply>) -> ServiceResult<()> {
        let index = self.shard_for(event.target.entity_key());
        self.senders[index]
            .send(ShardCommand::Event { event, reply })
            .await
            .map_err(|_| shard_closed(index))
    }
}

fn shard_closed(index: usize) -> ServiceError {
    error!(
        target: "astrolabe-services",
        "{} Shard {} is no longer accepting events",
        failure_tags::SHARD_CLOSED,
        index
    );
    ServiceError::Closed(format!("ingress shard {} is closed", index))
}

/// One worker: the sole owner of the lifecycles of the tracks routed to it.
struct Shard {
    index: usize,
    lifecycle: RadarLifecycle,
    pipeline: Arc<DecisionPipeline>,
    publisher: Arc<dyn OutcomePublisher>,
}

impl Shard {
    async fn run(mut self, mut rx: mpsc::Receiver<ShardCommand>) {
        debug!(target: "astrolabe-services", "Shard {} running", self.index);
        while let Some(command) = rx.recv().await {
            let (result, reply) = match command {
                ShardCommand::Event { event, reply } => (self.handle_event(&event), reply),
                ShardCommand::Sweep { now, reply } => (Ok(self.sweep(now)), reply),
            };

            if let Ok(report) = &result {
                if !report.is_empty() {
                    if let Err(err) = self.publisher.publish(report).await {
                        error!(
                            target: "astrolabe-services",
                            "{} Shard {} could not publish report: {}",
                            failure_tags::PUBLISH_FAILED,
                            self.index,
                            err
                        );
                    }
                }
            }
            if let Err(err) = &result {
                warn!(
                    target: "astrolabe-services",
                    "Shard {} rejected event: {}",
                    self.index,
                    err
                );
            }
            if let Some(reply) = reply {
                // The caller may have stopped waiting; the event is applied regardless.
                let _ = reply.send(result);
            }
        }
        debug!(
            target: "astrolabe-services",
            "Shard {} drained, tracking {} contacts",
            self.index,
            self.lifecycle.len()
        );
    }

    fn handle_event(&mut self, event: &InboundEvent) -> ServiceResult<IngressReport> {
        let lifecycle_events = match (&event.kind, &event.target) {
            (EventKind::Detection, _) => {
                let detection = Detection::try_from(event)?;
                self.lifecycle
                    .observe_detection(&detection, event.observed_at_ms)?
            }
            (EventKind::Acknowledge, EventTarget::Track(track_id)) => {
                self.lifecycle.acknowledge(track_id, event.observed_at_ms)?
            }
            (EventKind::Start | EventKind::Stop, _) => {
                let outcome = self.pipeline.on_subsystem_command(event)?;
                return Ok(IngressReport {
                    lifecycle_events: Vec::new(),
                    outcomes: vec![outcome],
                });
            }
            (EventKind::Acknowledge, EventTarget::Subsystem(id)) => {
                return Err(ServiceError::InvalidInput(format!(
                    "acknowledge must target a track, not subsystem '{}'",
                    id
                )))
            }
        };
        Ok(self.decide(lifecycle_events))
    }

    fn sweep(&mut self, now: NowMs) -> IngressReport {
        let lifecycle_events = self.lifecycle.sweep(now);
        self.decide(lifecycle_events)
    }

    fn decide(&self, lifecycle_events: Vec<LifecycleEvent>) -> IngressReport {
        let outcomes = lifecycle_events
            .iter()
            .flat_map(|event| self.pipeline.on_lifecycle_event(event))
            .collect();
        IngressReport {
            lifecycle_events,
            outcomes,
        }
    }
}
