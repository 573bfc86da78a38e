// 宿主通道
// WebKit (GTK WebView): window.webkit.messageHandlers.bridge
// Chromium (WebView2):  window.chrome.webview
// 两者都不存在时走开发模拟器

use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;

use super::envelope::Envelope;
use super::simulator::Simulator;
use super::BridgeResult;
use crate::messages::Command;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("宿主通道已关闭")]
    Closed,

    #[error("宿主通道错误: {0}")]
    Host(String),
}

/// A message channel exposed by the webview host.
pub trait HostChannel: Send + Sync {
    fn post_message(&self, message: &str) -> Result<(), TransportError>;
}

/// What the host exposes; each slot is a capability probe result.
#[derive(Clone, Default)]
pub struct HostCapabilities {
    pub webkit: Option<Arc<dyn HostChannel>>,
    pub chromium: Option<Arc<dyn HostChannel>>,
}

impl HostCapabilities {
    /// No host channels: the bridge falls back to the simulator.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_webkit(mut self, channel: Arc<dyn HostChannel>) -> Self {
        self.webkit = Some(channel);
        self
    }

    pub fn with_chromium(mut self, channel: Arc<dyn HostChannel>) -> Self {
        self.chromium = Some(channel);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    WebKit,
    Chromium,
    Simulator,
}

pub enum Transport {
    WebKit(Arc<dyn HostChannel>),
    Chromium(Arc<dyn HostChannel>),
    Simulator(Simulator),
}

impl Transport {
    /// First available wins: WebKit, then Chromium, then the simulator.
    pub fn probe(host: &HostCapabilities, simulator: Simulator) -> Self {
        if let Some(channel) = &host.webkit {
            return Transport::WebKit(Arc::clone(channel));
        }
        if let Some(channel) = &host.chromium {
            return Transport::Chromium(Arc::clone(channel));
        }
        Transport::Simulator(simulator)
    }

    pub fn kind(&self) -> TransportKind {
        match self {
            Transport::WebKit(_) => TransportKind::WebKit,
            Transport::Chromium(_) => TransportKind::Chromium,
            Transport::Simulator(_) => TransportKind::Simulator,
        }
    }

    pub fn deliver(&self, command: &Command, envelope: &Envelope) -> BridgeResult<()> {
        match self {
            Transport::WebKit(channel) | Transport::Chromium(channel) => {
                let message = envelope.encode()?;
                channel.post_message(&message)?;
                Ok(())
            }
            Transport::Simulator(simulator) => {
                simulator.respond(command);
                Ok(())
            }
        }
    }
}

impl fmt::Debug for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Transport").field(&self.kind()).finish()
    }
}

/// Host channel backed by an unbounded Tokio mpsc queue.
///
/// Embedding hosts drain the receiver and forward each JSON message to the
/// native backend.
#[derive(Clone)]
pub struct ChannelHost {
    sender: mpsc::UnboundedSender<String>,
}

impl ChannelHost {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl HostChannel for ChannelHost {
    fn post_message(&self, message: &str) -> Result<(), TransportError> {
        self.sender
            .send(message.to_string())
            .map_err(|_| TransportError::Closed)
    }
}
