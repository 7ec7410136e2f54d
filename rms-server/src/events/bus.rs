//! Domain Event Bus
//!
//! 进程内发布/订阅。`publish` 立即返回，投递在独立任务里按订阅顺序
//! 串行执行；单个订阅者出错只记日志，不影响其余订阅者，也不回传给
//! 发布方。没有重放、没有持久化，进程重启后在途事件即丢失。

use dashmap::DashMap;
use futures::future::BoxFuture;
use shared::event::{DomainEvent, EventKind};
use std::sync::Arc;

use crate::utils::AppError;

/// Boxed async subscriber. Handlers own their event copy.
pub type EventHandler =
    Arc<dyn Fn(DomainEvent) -> BoxFuture<'static, Result<(), AppError>> + Send + Sync>;

struct NamedHandler {
    name: &'static str,
    handler: EventHandler,
}

/// Registry of subscribers keyed by event kind; cheap to clone
#[derive(Clone, Default)]
pub struct EventBus {
    subscribers: Arc<DashMap<EventKind, Vec<NamedHandler>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `kind`. The name is only used in logs.
    pub fn subscribe(&self, kind: EventKind, name: &'static str, handler: EventHandler) {
        self.subscribers
            .entry(kind)
            .or_default()
            .push(NamedHandler { name, handler });
        tracing::debug!(event = %kind, subscriber = name, "subscriber registered");
    }

    /// Fire-and-forget publish. Delivery happens on a spawned task so the
    /// publisher's request path never waits on subscribers.
    pub fn publish(&self, event: DomainEvent) {
        let bus = self.clone();
        tokio::spawn(async move {
            bus.dispatch(event).await;
        });
    }

    /// Deliver to all subscribers of the event's kind, in registration
    /// order. Exposed for tests that need delivery to have finished.
    pub async fn dispatch(&self, event: DomainEvent) {
        let kind = event.kind();

        // Clone the handler list out of the map entry; holding a DashMap
        // guard across an await point can deadlock.
        let handlers: Vec<(&'static str, EventHandler)> = match self.subscribers.get(&kind) {
            Some(entry) => entry
                .iter()
                .map(|h| (h.name, Arc::clone(&h.handler)))
                .collect(),
            None => Vec::new(),
        };

        if handlers.is_empty() {
            tracing::debug!(event = %kind, "no subscribers");
            return;
        }

        for (name, handler) in handlers {
            if let Err(e) = handler(event.clone()).await {
                tracing::error!(event = %kind, subscriber = name, error = %e, "subscriber failed");
            }
        }
    }
}
