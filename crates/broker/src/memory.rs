//! In-memory topic-exchange broker.
//!
//! Used by tests and the single-process demo binary. Delivery semantics
//! mirror a production AMQP adapter: per-queue FIFO, at-least-once delivery
//! with redelivery on handler failure, and dead-letter routing after the
//! configured number of attempts. Durability is per-process; a production
//! adapter maps the same declarations onto broker-native durable queues.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use contracts::MessageEnvelope;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::{BrokerError, Result};
use crate::publisher::EventPublisher;
use crate::routing;
use crate::subscriber::{
    DeadLetterConfig, Delivery, EventSubscriber, HandlerError, MessageHandler, QueueConfig,
    RetryPolicy,
};

struct Binding {
    pattern: String,
    queue_name: String,
}

struct QueueState {
    tx: mpsc::UnboundedSender<Delivery>,
    rx: Option<mpsc::UnboundedReceiver<Delivery>>,
    /// Messages queued plus in flight; zero means the queue is drained.
    depth: Arc<AtomicUsize>,
}

#[derive(Default)]
struct BrokerInner {
    bindings: HashMap<String, Vec<Binding>>,
    queues: HashMap<String, QueueState>,
}

impl BrokerInner {
    fn queue_entry(&mut self, queue_name: &str) -> &mut QueueState {
        self.queues
            .entry(queue_name.to_string())
            .or_insert_with(|| {
                let (tx, rx) = mpsc::unbounded_channel();
                QueueState {
                    tx,
                    rx: Some(rx),
                    depth: Arc::new(AtomicUsize::new(0)),
                }
            })
    }
}

/// In-memory broker implementing both sides of the transport contract.
#[derive(Clone, Default)]
pub struct InMemoryBroker {
    inner: Arc<Mutex<BrokerInner>>,
    fail_publish: Arc<AtomicBool>,
    tasks: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl InMemoryBroker {
    /// Creates a new broker with no exchanges, queues, or consumers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a durable queue and binds it to an exchange without
    /// starting a consumer. Messages published before a consumer attaches
    /// are retained in the queue.
    pub fn declare_and_bind(&self, queue_name: &str, exchange: &str, binding_key: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.queue_entry(queue_name);
        inner
            .bindings
            .entry(exchange.to_string())
            .or_default()
            .push(Binding {
                pattern: binding_key.to_string(),
                queue_name: queue_name.to_string(),
            });
    }

    /// Simulates broker unavailability: while set, every publish fails
    /// synchronously with [`BrokerError::ConnectionUnavailable`].
    pub fn set_fail_publish(&self, fail: bool) {
        self.fail_publish.store(fail, Ordering::SeqCst);
    }

    /// Returns the number of messages queued or in flight for a queue.
    pub fn queue_depth(&self, queue_name: &str) -> usize {
        self.inner
            .lock()
            .unwrap()
            .queues
            .get(queue_name)
            .map(|q| q.depth.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    /// Returns true if every queue is fully drained.
    pub fn is_idle(&self) -> bool {
        self.inner
            .lock()
            .unwrap()
            .queues
            .values()
            .all(|q| q.depth.load(Ordering::SeqCst) == 0)
    }

    /// Waits until every queue is drained or the timeout elapses.
    ///
    /// Returns true if the broker went idle. Cascading deliveries are
    /// covered: a handler's own publishes raise the depth before its
    /// delivery is acknowledged.
    pub async fn settle(&self, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if self.is_idle() {
                return true;
            }
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    /// Aborts all consumer tasks.
    pub fn shutdown(&self) {
        for task in self.tasks.lock().unwrap().drain(..) {
            task.abort();
        }
    }

    async fn dead_letter(
        &self,
        config: &Option<DeadLetterConfig>,
        queue_name: &str,
        envelope: MessageEnvelope,
        reason: &str,
    ) {
        metrics::counter!("broker_dead_lettered_total").increment(1);
        match config {
            Some(dl) => {
                tracing::warn!(
                    queue = queue_name,
                    message_id = %envelope.message_id,
                    reason,
                    dead_letter_exchange = %dl.exchange,
                    "message dead-lettered"
                );
                if let Err(e) = self.publish(envelope, &dl.exchange, &dl.routing_key).await {
                    tracing::error!(error = %e, "failed to publish to dead-letter exchange");
                }
            }
            None => {
                tracing::warn!(
                    queue = queue_name,
                    message_id = %envelope.message_id,
                    reason,
                    "poison message dropped, no dead-letter exchange configured"
                );
            }
        }
    }
}

#[async_trait]
impl EventPublisher for InMemoryBroker {
    async fn publish(
        &self,
        envelope: MessageEnvelope,
        exchange: &str,
        routing_key: &str,
    ) -> Result<()> {
        if self.fail_publish.load(Ordering::SeqCst) {
            return Err(BrokerError::ConnectionUnavailable);
        }

        let matched: Vec<(mpsc::UnboundedSender<Delivery>, Arc<AtomicUsize>, String)> = {
            let inner = self.inner.lock().unwrap();
            let Some(bindings) = inner.bindings.get(exchange) else {
                tracing::debug!(exchange, routing_key, "publish to exchange with no bindings");
                metrics::counter!("broker_unroutable_total").increment(1);
                return Ok(());
            };

            let mut seen = Vec::new();
            let mut matched = Vec::new();
            for binding in bindings {
                if routing::matches(&binding.pattern, routing_key)
                    && !seen.contains(&binding.queue_name)
                {
                    seen.push(binding.queue_name.clone());
                    if let Some(queue) = inner.queues.get(&binding.queue_name) {
                        matched.push((
                            queue.tx.clone(),
                            Arc::clone(&queue.depth),
                            binding.queue_name.clone(),
                        ));
                    }
                }
            }
            matched
        };

        if matched.is_empty() {
            tracing::debug!(exchange, routing_key, "message is unroutable, dropped");
            metrics::counter!("broker_unroutable_total").increment(1);
            return Ok(());
        }

        for (tx, depth, queue_name) in matched {
            depth.fetch_add(1, Ordering::SeqCst);
            tx.send(Delivery::new(envelope.clone()))
                .map_err(|_| BrokerError::QueueClosed(queue_name))?;
        }

        metrics::counter!("broker_published_total").increment(1);
        Ok(())
    }
}

#[async_trait]
impl EventSubscriber for InMemoryBroker {
    async fn subscribe(&self, config: QueueConfig, handler: Arc<dyn MessageHandler>) -> Result<()> {
        let (mut rx, tx_requeue, depth) = {
            let mut inner = self.inner.lock().unwrap();

            let queue = inner.queue_entry(&config.queue_name);
            let rx = queue
                .rx
                .take()
                .ok_or_else(|| BrokerError::ConsumerExists(config.queue_name.clone()))?;
            let tx_requeue = queue.tx.clone();
            let depth = Arc::clone(&queue.depth);

            inner
                .bindings
                .entry(config.exchange.clone())
                .or_default()
                .push(Binding {
                    pattern: config.binding_key.clone(),
                    queue_name: config.queue_name.clone(),
                });

            (rx, tx_requeue, depth)
        };

        let broker = self.clone();
        let task = tokio::spawn(async move {
            while let Some(delivery) = rx.recv().await {
                let attempt = delivery.redelivered + 1;
                let result = handler.handle(&delivery).await;

                match result {
                    Ok(()) => {
                        metrics::counter!("broker_delivered_total").increment(1);
                        tracing::debug!(
                            queue = %config.queue_name,
                            handler = handler.name(),
                            message_id = %delivery.envelope.message_id,
                            "message acknowledged"
                        );
                    }
                    Err(HandlerError::Reject(reason)) => {
                        broker
                            .dead_letter(
                                &config.dead_letter,
                                &config.queue_name,
                                delivery.envelope.clone(),
                                &reason,
                            )
                            .await;
                    }
                    Err(HandlerError::Retry(reason)) => match config.retry {
                        RetryPolicy::DropOnError => {
                            metrics::counter!("broker_dropped_total").increment(1);
                            tracing::warn!(
                                queue = %config.queue_name,
                                handler = handler.name(),
                                reason,
                                "handler failed, message dropped"
                            );
                        }
                        RetryPolicy::RetryThenDeadLetter { max_attempts } => {
                            if attempt < max_attempts {
                                metrics::counter!("broker_redelivered_total").increment(1);
                                tracing::warn!(
                                    queue = %config.queue_name,
                                    handler = handler.name(),
                                    attempt,
                                    reason,
                                    "handler failed, redelivering"
                                );
                                let mut redelivery = delivery.clone();
                                redelivery.redelivered += 1;
                                depth.fetch_add(1, Ordering::SeqCst);
                                let _ = tx_requeue.send(redelivery);
                            } else {
                                broker
                                    .dead_letter(
                                        &config.dead_letter,
                                        &config.queue_name,
                                        delivery.envelope.clone(),
                                        &reason,
                                    )
                                    .await;
                            }
                        }
                    },
                }

                depth.fetch_sub(1, Ordering::SeqCst);
            }
        });

        self.tasks.lock().unwrap().push(task);
        Ok(())
    }
}
