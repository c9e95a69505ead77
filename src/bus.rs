//! Synchronous in-process publish/subscribe bus for domain events.
//!
//! Handlers are invoked in registration order, to completion, before
//! [`EventBus::publish`] returns. A handler reacts by returning follow-up
//! events; these are appended to an in-process FIFO queue and dispatched
//! within the same `publish` call, which models re-entrant publication
//! (e.g. conflict detection republishing) without unbounded recursion.
//! Correctness of the loop depends on handlers guarding against repeat
//! triggers, not on the bus deduplicating anything.

use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::{DomainEvent, DomainEventKind};
use crate::error::Result;

/// A subscriber on the bus.
///
/// Returns any follow-up events to dispatch after the current one. By the
/// time `handle` returns, every store mutation it performed is visible to
/// the next handler in the chain.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: &DomainEvent) -> Result<Vec<DomainEvent>>;
}

/// Publish/subscribe dispatcher for [`DomainEvent`]s.
pub struct EventBus {
    subscribers: RwLock<HashMap<DomainEventKind, Vec<Arc<dyn EventHandler>>>>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self {
            subscribers: RwLock::new(HashMap::new()),
        }
    }

    /// Register a handler for one event kind, preserving registration order.
    pub async fn subscribe(&self, kind: DomainEventKind, handler: Arc<dyn EventHandler>) {
        let mut subscribers = self.subscribers.write().await;
        subscribers.entry(kind).or_default().push(handler);
    }

    /// Dispatch an event and every follow-up it causes, in order, before
    /// returning. Events with no subscribers are dropped silently.
    pub async fn publish(&self, event: DomainEvent) -> Result<()> {
        let mut queue = VecDeque::new();
        queue.push_back(event);

        while let Some(event) = queue.pop_front() {
            let handlers = {
                let subscribers = self.subscribers.read().await;
                subscribers.get(&event.kind()).cloned().unwrap_or_default()
            };
            debug!(
                kind = %event.kind(),
                event_id = %event.event_id(),
                handlers = handlers.len(),
                "dispatching domain event"
            );
            for handler in handlers {
                let follow_ups = handler.handle(&event).await?;
                queue.extend(follow_ups);
            }
        }

        Ok(())
    }
}
