use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, error, warn};

use super::envelope::{decode_event, RawPayload};
use crate::messages::{BackendEvent, EventMethod};

pub type Handler = Arc<dyn Fn(BackendEvent) + Send + Sync>;

/// Result of routing one inbound message. Every variant is a normal outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Delivered,
    UnknownMethod,
    Unhandled,
    DecodeFailed,
}

/// One handler per event method; registering again replaces the old one.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: Mutex<HashMap<EventMethod, Handler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when an earlier handler was replaced.
    pub fn register(&self, method: EventMethod, handler: Handler) -> bool {
        let replaced = self.handlers.lock().insert(method, handler).is_some();
        if replaced {
            debug!(method = %method, "handler replaced");
        }
        replaced
    }

    pub fn remove(&self, method: EventMethod) -> bool {
        self.handlers.lock().remove(&method).is_some()
    }

    pub fn clear(&self) {
        self.handlers.lock().clear();
    }

    pub fn contains(&self, method: EventMethod) -> bool {
        self.handlers.lock().contains_key(&method)
    }

    pub fn len(&self) -> usize {
        self.handlers.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.lock().is_empty()
    }

    pub fn dispatch(&self, method: &str, raw: RawPayload) -> DispatchOutcome {
        debug!(method, "收到后端消息");

        let Ok(event_method) = method.parse::<EventMethod>() else {
            warn!(method, "unknown backend method, message dropped");
            return DispatchOutcome::UnknownMethod;
        };

        // Clone out so the lock is released before the handler runs; handlers
        // are free to call back into the bridge.
        let handler = self.handlers.lock().get(&event_method).cloned();
        let Some(handler) = handler else {
            warn!(method, "未注册的消息处理器");
            return DispatchOutcome::Unhandled;
        };

        match decode_event(event_method, raw) {
            Ok(event) => {
                handler(event);
                DispatchOutcome::Delivered
            }
            Err(err) => {
                error!(error = %err, "解析后端数据错误");
                DispatchOutcome::DecodeFailed
            }
        }
    }
}
