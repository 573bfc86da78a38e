//! 前后端通信桥梁
//!
//! The bridge is the only path between UI state and the native backend:
//! - `send`: wraps a `Command` in an envelope and hands it to the transport
//!   picked at construction (host channel, or the dev simulator)
//! - `on` / `off`: one handler per backend event method
//! - `handle_backend_message`: entry point the host calls for inbound events
//!
//! Protocol-level failures are logged and swallowed; nothing here is fatal.

pub mod envelope;
pub mod registry;
pub mod simulator;
pub mod transport;

pub use envelope::{Envelope, RawPayload};
pub use registry::{DispatchOutcome, Handler, HandlerRegistry};
pub use simulator::{Simulator, DEFAULT_SIMULATOR_DELAY, SAMPLE_WORD};
pub use transport::{
    ChannelHost, HostCapabilities, HostChannel, Transport, TransportError, TransportKind,
};

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, error, info};

use crate::messages::{BackendEvent, Command, EventMethod};

// ============================================================
// 错误类型定义
// ============================================================

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("消息编码失败 ({method}): {source}")]
    Encode {
        method: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("解析后端数据错误 ({method}): {source}")]
    Decode {
        method: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Transport(#[from] TransportError),
}

pub type BridgeResult<T> = Result<T, BridgeError>;

// ============================================================
// Bridge
// ============================================================

struct BridgeInner {
    registry: Arc<HandlerRegistry>,
    transport: Transport,
}

/// Cheap-to-clone handle; every clone talks to the same registry and transport.
#[derive(Clone)]
pub struct Bridge {
    inner: Arc<BridgeInner>,
}

impl Bridge {
    pub fn new(host: HostCapabilities, simulator_delay: Duration) -> Self {
        let registry = Arc::new(HandlerRegistry::new());
        let simulator = Simulator::new(Arc::downgrade(&registry), simulator_delay);
        let transport = Transport::probe(&host, simulator);

        info!(transport = ?transport.kind(), "WebViewBridge 初始化完成");

        Self {
            inner: Arc::new(BridgeInner {
                registry,
                transport,
            }),
        }
    }

    /// Bridge with no host channels, answering from the simulator.
    pub fn simulated(delay: Duration) -> Self {
        Self::new(HostCapabilities::none(), delay)
    }

    pub fn transport_kind(&self) -> TransportKind {
        self.inner.transport.kind()
    }

    /// Fire-and-forget send; failures are logged.
    pub fn send(&self, command: Command) {
        if let Err(err) = self.try_send(&command) {
            error!(method = %command.method(), error = %err, "failed to send command");
        }
    }

    pub fn try_send(&self, command: &Command) -> BridgeResult<()> {
        let envelope = Envelope::from_command(command)?;
        debug!(method = %envelope.method, "sending command");
        self.inner.transport.deliver(command, &envelope)
    }

    /// Registers `handler` for `method`, replacing any existing one.
    pub fn on<F>(&self, method: EventMethod, handler: F)
    where
        F: Fn(BackendEvent) + Send + Sync + 'static,
    {
        self.inner.registry.register(method, Arc::new(handler));
    }

    pub fn off(&self, method: EventMethod) {
        self.inner.registry.remove(method);
    }

    pub fn has_handler(&self, method: EventMethod) -> bool {
        self.inner.registry.contains(method)
    }

    /// Drops every handler. Stores hold bridge clones inside their handlers,
    /// so this is also what releases them at shutdown.
    pub fn clear_handlers(&self) {
        self.inner.registry.clear();
    }

    /// Inbound entry point for the host. `data` may be JSON text or a parsed value.
    pub fn handle_backend_message(
        &self,
        method: &str,
        data: impl Into<RawPayload>,
    ) -> DispatchOutcome {
        self.inner.registry.dispatch(method, data.into())
    }
}

impl std::fmt::Debug for Bridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bridge")
            .field("transport", &self.transport_kind())
            .field("handlers", &self.inner.registry.len())
            .finish()
    }
}
